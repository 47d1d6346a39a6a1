use std::collections::HashSet;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::mpsc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info};
use zeromq::prelude::*;
use zeromq::{PubSocket, SubSocket};

use crate::config::{Attach, BusConfig};
use crate::error::BusError;
use crate::message::BusMessage;
use crate::traits::MessagePublisher;
use crate::transport::Transport;

/// Capacity of a subscriber's message and error channels.
const CHANNEL_CAPACITY: usize = 64;

/// Connection factory for one bus endpoint.
///
/// A client owns the publisher and subscriber handles created from it:
/// handles must be closed before the client itself.
pub struct BusClient {
    config: BusConfig,
    transport: Transport,
    subscribed: HashSet<String>,
}

impl BusClient {
    /// Construct a client from the opaque `bus` table of the app config.
    ///
    /// The table is deserialized into [`BusConfig`] here; callers hand it
    /// over verbatim without inspecting it.
    pub fn new(config: toml::Value) -> Result<Self, BusError> {
        let config: BusConfig = config.try_into()?;
        let transport = Transport::parse(&config.endpoint)?;
        info!(endpoint = %transport, "initializing bus client");
        Ok(Self {
            config,
            transport,
            subscribed: HashSet::new(),
        })
    }

    /// The endpoint this client attaches to.
    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    /// Create a publisher tied to one topic.
    ///
    /// Binds the PUB socket unless the config forces connect mode.
    pub async fn publisher(&mut self, topic: &str) -> Result<TopicPublisher, BusError> {
        let mut socket = PubSocket::new();
        let endpoint = self.transport.endpoint();

        match self.config.attach {
            Attach::Auto | Attach::Bind => {
                self.transport.ensure_ipc_dir()?;
                self.transport.remove_stale_socket()?;
                info!(topic, endpoint = %endpoint, "binding PUB socket");
                socket.bind(&endpoint).await?;
            }
            Attach::Connect => {
                info!(topic, endpoint = %endpoint, "connecting PUB socket");
                socket.connect(&endpoint).await?;
            }
        }

        Ok(TopicPublisher {
            topic: topic.to_string(),
            socket: Mutex::new(socket),
        })
    }

    /// Create a subscriber handle for one topic.
    ///
    /// At most one active subscriber per topic per client. Connects the SUB
    /// socket unless the config forces bind mode, subscribes to the topic
    /// prefix, and spawns the pump task feeding the handle's channels.
    pub async fn subscriber(&mut self, topic: &str) -> Result<TopicSubscriber, BusError> {
        if !self.subscribed.insert(topic.to_string()) {
            return Err(BusError::DuplicateSubscription(topic.to_string()));
        }

        let mut socket = SubSocket::new();
        let endpoint = self.transport.endpoint();

        match self.config.attach {
            Attach::Auto | Attach::Connect => {
                info!(topic, endpoint = %endpoint, "connecting SUB socket");
                socket.connect(&endpoint).await?;
            }
            Attach::Bind => {
                self.transport.ensure_ipc_dir()?;
                self.transport.remove_stale_socket()?;
                info!(topic, endpoint = %endpoint, "binding SUB socket");
                socket.bind(&endpoint).await?;
            }
        }
        socket.subscribe(topic).await?;

        let (msg_tx, msg_rx) = mpsc::channel(CHANNEL_CAPACITY);
        let (err_tx, err_rx) = mpsc::channel(CHANNEL_CAPACITY);
        let pump_topic = topic.to_string();
        let pump = tokio::spawn(async move {
            loop {
                let handle_gone = match socket.recv().await {
                    Ok(zmq_msg) => match BusMessage::from_zmq(&zmq_msg) {
                        Ok(msg) => msg_tx.send(msg).await.is_err(),
                        Err(e) => err_tx.send(e).await.is_err(),
                    },
                    Err(e) => err_tx.send(BusError::Zmq(e)).await.is_err(),
                };
                // A closed channel means the handle was dropped.
                if handle_gone {
                    break;
                }
            }
            debug!(topic = %pump_topic, "subscriber pump exited");
        });

        Ok(TopicSubscriber {
            topic: topic.to_string(),
            messages: msg_rx,
            errors: err_rx,
            pump,
        })
    }

    /// Close the client. Handles created from it must be closed first.
    pub fn close(self) {
        debug!(endpoint = %self.transport, "bus client closed");
    }
}

/// PUB socket tied to a single topic.
pub struct TopicPublisher {
    topic: String,
    socket: Mutex<PubSocket>,
}

impl TopicPublisher {
    /// Close the publisher. The socket is torn down on drop.
    pub fn close(self) {
        debug!(topic = %self.topic, "publisher closed");
    }
}

#[async_trait]
impl MessagePublisher for TopicPublisher {
    fn topic(&self) -> &str {
        &self.topic
    }

    /// Publish a JSON body as a two-frame [topic, body] message.
    async fn publish(&self, body: &Map<String, Value>) -> Result<usize, BusError> {
        let message = BusMessage::new(self.topic.clone(), body.clone());
        let (zmq_msg, size) = message.to_zmq()?;

        let mut socket = self.socket.lock().await;
        socket.send(zmq_msg).await?;

        debug!(topic = %self.topic, bytes = size, "published message");
        Ok(size)
    }
}

/// SUB socket handle for one topic.
///
/// A background pump task reads the socket and feeds the message and error
/// channels; it exits when the handle is closed or dropped.
pub struct TopicSubscriber {
    /// The subscribed topic prefix.
    pub topic: String,

    /// Message-notification channel.
    pub messages: mpsc::Receiver<BusMessage>,

    /// Error-notification channel.
    pub errors: mpsc::Receiver<BusError>,

    pump: JoinHandle<()>,
}

impl TopicSubscriber {
    /// Close the handle, stopping the pump task.
    pub fn close(self) {
        self.pump.abort();
        debug!(topic = %self.topic, "subscriber closed");
    }
}
