pub mod client;
pub mod config;
pub mod error;
pub mod message;
pub mod traits;
pub mod transport;

pub use client::{BusClient, TopicPublisher, TopicSubscriber};
pub use config::{Attach, BusConfig};
pub use error::BusError;
pub use message::BusMessage;
pub use traits::MessagePublisher;
pub use transport::Transport;
