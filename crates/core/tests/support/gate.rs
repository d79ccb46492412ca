//! One-shot barrier for holding a fake call open.

use std::sync::Arc;

use tokio::sync::Semaphore;

/// A call that passes through the gate blocks until [`Gate::release`].
#[derive(Debug)]
pub struct Gate {
    entered: Semaphore,
    released: Semaphore,
}

impl Gate {
    pub fn closed() -> Arc<Self> {
        Arc::new(Self { entered: Semaphore::new(0), released: Semaphore::new(0) })
    }

    /// Called by the fake: signal arrival, then wait for release.
    pub async fn pass(&self) {
        self.entered.add_permits(1);
        self.released.acquire().await.expect("gate closed").forget();
    }

    /// Wait until a call is parked at the gate.
    pub async fn entered(&self) {
        self.entered.acquire().await.expect("gate closed").forget();
    }

    pub fn release(&self) {
        self.released.add_permits(1);
    }
}
