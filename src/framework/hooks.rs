use std::sync::Arc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::mpsc::{channel, Receiver, Sender};
use tokio::sync::RwLock;
use tracing::warn;

use super::FrameworkEvent;

/// Fan-out of framework events to any number of subscribers.
#[derive(Clone, Default)]
pub struct EventHooks {
    listeners: Arc<RwLock<Vec<Sender<FrameworkEvent>>>>,
}

impl EventHooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn register(&self, listener: Sender<FrameworkEvent>) {
        self.listeners.write().await.push(listener);
    }

    pub async fn subscribe(&self, capacity: usize) -> Receiver<FrameworkEvent> {
        let (tx, rx) = channel::<FrameworkEvent>(capacity);
        self.register(tx).await;
        rx
    }

    pub async fn len(&self) -> usize {
        self.listeners.read().await.len()
    }

    /// Never waits on a subscriber. A full subscriber misses the event.
    pub async fn trigger(&self, event: FrameworkEvent) {
        let listeners = { self.listeners.read().await.clone() };
        let mut closed = false;

        for listener in listeners.iter() {
            match listener.try_send(event.clone()) {
                Ok(()) => (),
                Err(TrySendError::Full(_)) => warn!("Hook subscriber is full, dropping event"),
                Err(TrySendError::Closed(_)) => closed = true,
            }
        }

        if closed {
            self.listeners.write().await.retain(|listener| !listener.is_closed());
        }
    }
}
