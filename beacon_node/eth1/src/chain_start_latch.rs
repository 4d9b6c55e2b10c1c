use tokio::sync::watch;

/// Chain-start payload, broadcast exactly once (C9).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainStart {
    pub genesis_time: u64,
}

/// A single-assignment event with fan-out: every [`ChainStartLatch::subscribe`] caller gets its
/// own `watch::Receiver`, so each sees the one firing regardless of when it subscribed.
pub struct ChainStartLatch {
    tx: watch::Sender<Option<ChainStart>>,
    rx: watch::Receiver<Option<ChainStart>>,
}

impl ChainStartLatch {
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(None);
        ChainStartLatch { tx, rx }
    }

    /// Fires the latch. Subsequent calls are no-ops: the first genesis time wins.
    pub fn fire(&self, genesis_time: u64) {
        if self.rx.borrow().is_some() {
            return;
        }
        let _ = self.tx.send(Some(ChainStart { genesis_time }));
    }

    pub fn has_fired(&self) -> bool {
        self.rx.borrow().is_some()
    }

    /// Resolves immediately if the latch has already fired; otherwise waits for it to fire.
    pub async fn wait(&self) -> ChainStart {
        let mut rx = self.rx.clone();
        loop {
            if let Some(start) = *rx.borrow() {
                return start;
            }
            if rx.changed().await.is_err() {
                // Sender dropped without ever firing; this only happens at process shutdown.
                futures::pending!();
            }
        }
    }
}

impl Default for ChainStartLatch {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn already_fired_resolves_immediately() {
        let latch = ChainStartLatch::new();
        latch.fire(42);
        assert_eq!(latch.wait().await, ChainStart { genesis_time: 42 });
    }

    #[tokio::test]
    async fn second_fire_does_not_override_the_first() {
        let latch = ChainStartLatch::new();
        latch.fire(1);
        latch.fire(2);
        assert_eq!(latch.wait().await, ChainStart { genesis_time: 1 });
    }

    #[tokio::test]
    async fn waiter_unblocks_on_fire() {
        let latch = ChainStartLatch::new();
        let waiter = async { latch.wait().await };
        let firer = async {
            latch.fire(7);
        };
        let (start, _) = futures::join!(waiter, firer);
        assert_eq!(start, ChainStart { genesis_time: 7 });
    }
}
