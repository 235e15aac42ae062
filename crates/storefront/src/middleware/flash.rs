//! One-shot flash messages kept in the session.

use tower_sessions::Session;

use crate::models::{Flash, session_keys};

/// Queue a message for the next rendered page.
///
/// # Errors
///
/// Returns an error if the session cannot be read or modified.
pub async fn push_flash(
    session: &Session,
    flash: Flash,
) -> Result<(), tower_sessions::session::Error> {
    let mut pending: Vec<Flash> = session.get(session_keys::FLASH).await?.unwrap_or_default();
    pending.push(flash);
    session.insert(session_keys::FLASH, pending).await
}

/// Remove and return every pending message. Session errors read as "none".
pub async fn take_flashes(session: &Session) -> Vec<Flash> {
    session
        .remove::<Vec<Flash>>(session_keys::FLASH)
        .await
        .ok()
        .flatten()
        .unwrap_or_default()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use tower_sessions::MemoryStore;

    use super::*;

    #[tokio::test]
    async fn test_flashes_are_consumed_once() {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);

        push_flash(&session, Flash::success("Welcome")).await.unwrap();
        push_flash(&session, Flash::info("Heads up")).await.unwrap();

        let flashes = take_flashes(&session).await;
        assert_eq!(flashes, vec![Flash::success("Welcome"), Flash::info("Heads up")]);
        assert!(take_flashes(&session).await.is_empty());
    }
}
