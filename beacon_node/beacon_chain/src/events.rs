use tokio::sync::{mpsc, watch};
use types::{Attestation, Hash256};

/// The two consumer-facing streams of C8: a watched value for head/activation-style "tell me
/// when this changes" subscribers, and a zero-capacity rendezvous channel for `LatestAttestation`
/// (§4.7: "the channel has capacity zero... so back-pressure is explicit").
pub struct ChainEvents {
    head_tx: watch::Sender<Hash256>,
    head_rx: watch::Receiver<Hash256>,
    attestation_tx: mpsc::Sender<Attestation>,
    attestation_rx: parking_lot::Mutex<Option<mpsc::Receiver<Attestation>>>,
}

impl ChainEvents {
    pub fn new(genesis_head: Hash256) -> Self {
        let (head_tx, head_rx) = watch::channel(genesis_head);
        let (attestation_tx, attestation_rx) = mpsc::channel(0);
        ChainEvents {
            head_tx,
            head_rx,
            attestation_tx,
            attestation_rx: parking_lot::Mutex::new(Some(attestation_rx)),
        }
    }

    pub fn announce_head(&self, root: Hash256) {
        let _ = self.head_tx.send(root);
    }

    pub fn subscribe_head(&self) -> watch::Receiver<Hash256> {
        self.head_rx.clone()
    }

    /// Blocks until a reader is ready, propagating back-pressure to whatever called
    /// `process_attestation`, per §4.7.
    pub async fn deliver_attestation(&self, attestation: Attestation) {
        // Ignored if `LatestAttestation` has no active subscriber: there is nobody to deliver to
        // and the sender is therefore never full.
        let _ = self.attestation_tx.send(attestation).await;
    }

    /// Only one subscriber may read the rendezvous channel at a time, matching §4.7's
    /// "single-reader" contract; a second call while one is already active returns `None`.
    pub fn take_attestation_receiver(&self) -> Option<mpsc::Receiver<Attestation>> {
        self.attestation_rx.lock().take()
    }
}
