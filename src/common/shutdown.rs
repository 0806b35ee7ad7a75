use tokio::sync::watch;

/// One-shot shutdown signal shared by background tasks.
pub struct Shutdown {
    sender: watch::Sender<bool>,
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

impl Shutdown {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(false);
        Self {
            sender,
        }
    }

    pub fn shutdown(&self) {
        self.sender.send_replace(true);
    }

    pub fn is_shutdown(&self) -> bool {
        *self.sender.borrow()
    }

    /// Resolves once `shutdown` has been called, including before the wait started.
    pub async fn wait(&self) {
        let mut receiver = self.sender.subscribe();
        loop {
            if *receiver.borrow_and_update() {
                return;
            }
            if receiver.changed().await.is_err() {
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_wait_after_shutdown() {
        let shutdown = Shutdown::new();
        assert!(!shutdown.is_shutdown());
        shutdown.shutdown();
        assert!(shutdown.is_shutdown());
        shutdown.wait().await;
    }
}
