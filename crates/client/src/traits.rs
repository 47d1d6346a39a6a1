use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::error::BusError;

/// Publishes JSON object bodies on a fixed topic.
///
/// The trait is the seam between the bus transport and the driver loops,
/// so drivers can be exercised against in-memory publishers in tests.
#[async_trait]
pub trait MessagePublisher: Send + Sync {
    /// The topic this publisher is tied to.
    fn topic(&self) -> &str;

    /// Publish one JSON object body. Returns the encoded body size in bytes.
    async fn publish(&self, body: &Map<String, Value>) -> Result<usize, BusError>;
}

/// Blanket implementation so `Arc<dyn MessagePublisher>` can be used directly.
#[async_trait]
impl<T: MessagePublisher + ?Sized> MessagePublisher for Arc<T> {
    fn topic(&self) -> &str {
        (**self).topic()
    }

    async fn publish(&self, body: &Map<String, Value>) -> Result<usize, BusError> {
        (**self).publish(body).await
    }
}
