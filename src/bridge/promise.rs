use futures::channel::oneshot;
use log::debug;

use super::types::BridgeError;

/// One-shot resolution callback handed to a callback-style operation.
///
/// Consuming `resolve` guarantees the awaiting side is resumed at most once.
/// Dropping an unresolved resolver fails the awaiter with
/// [`BridgeError::Abandoned`].
pub struct Resolver<T> {
    sender: oneshot::Sender<T>,
}

impl<T> Resolver<T> {
    pub fn resolve(self, value: T) {
        if self.sender.send(value).is_err() {
            debug!("Resolved a promise whose awaiter is gone");
        }
    }
}

impl<T> std::fmt::Debug for Resolver<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver")
            .field("awaited", &!self.sender.is_canceled())
            .finish()
    }
}

/// Awaits a callback-driven operation.
///
/// `start` receives a [`Resolver`] and must arrange for it to be called once
/// with the value the awaiting task should resume with.
pub async fn promise<T, F>(start: F) -> Result<T, BridgeError>
where
    F: FnOnce(Resolver<T>),
{
    let (sender, receiver) = oneshot::channel();
    start(Resolver { sender });
    receiver.await.map_err(|_| BridgeError::Abandoned)
}
