use async_trait::async_trait;
use parking_lot::Mutex;
use studyhub_core::SessionStorage;
use studyhub_domain::{Result, Session};

/// Session storage that forgets everything when the process exits.
#[derive(Debug, Default)]
pub struct MemorySessionStorage {
    session: Mutex<Option<Session>>,
}

impl MemorySessionStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStorage for MemorySessionStorage {
    async fn store(&self, session: &Session) -> Result<()> {
        *self.session.lock() = Some(session.clone());
        Ok(())
    }

    async fn retrieve(&self) -> Result<Option<Session>> {
        Ok(self.session.lock().clone())
    }

    async fn clear(&self) -> Result<()> {
        self.session.lock().take();
        Ok(())
    }
}
