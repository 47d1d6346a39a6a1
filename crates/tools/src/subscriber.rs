//! Subscriber driver: fans out one receive loop per (context, topic) handle.

use std::collections::HashMap;

use tokio::sync::mpsc;
use tracing::{debug, error, info};

use edgebus_client::{BusClient, BusError, BusMessage, TopicSubscriber};
use edgebus_config::AppConfig;

use crate::error::ToolError;
use crate::shutdown::{self, Shutdown, ShutdownSignal};
use crate::watch;

/// One (topic, handle) record.
struct SubscriberEntry {
    context: String,
    subscriber: TopicSubscriber,
}

/// All clients and handles built from the configured subscriber contexts.
struct BusSubscriptions {
    clients: Vec<BusClient>,
    entries: Vec<SubscriberEntry>,
}

impl BusSubscriptions {
    /// One client per context, one subscriber handle per (context, topic).
    ///
    /// Any failure here is fatal to the whole process: the driver has not
    /// fanned out yet and a partially constructed topology is not useful.
    async fn build(config: &AppConfig) -> Result<Self, ToolError> {
        let mut clients = Vec::new();
        let mut entries = Vec::new();

        for index in 0..config.subscriber_count() {
            let ctx = config.subscriber_by_index(index)?;
            let label = ctx.label(index);
            let mut client = BusClient::new(ctx.bus_config())?;
            for topic in ctx.topics() {
                info!(context = %label, topic = %topic, "creating subscriber");
                let subscriber = client.subscriber(topic).await?;
                entries.push(SubscriberEntry {
                    context: label.clone(),
                    subscriber,
                });
            }
            clients.push(client);
        }

        Ok(Self { clients, entries })
    }
}

/// Run the subscriber driver until the shutdown token trips.
///
/// Builds the full subscription topology, spawns one receive loop per
/// handle, registers the configuration watch, then joins every loop.
/// Handles are closed by their loops; owning clients are closed last.
pub async fn run(
    config: &AppConfig,
    shutdown: Shutdown,
    signal: ShutdownSignal,
) -> Result<(), ToolError> {
    let BusSubscriptions { clients, entries } = BusSubscriptions::build(config).await?;

    let mut tasks = Vec::with_capacity(entries.len());
    for entry in entries {
        let sig = signal.clone();
        tasks.push(tokio::spawn(receive_loop(entry, sig)));
    }

    let _watchers = watch::register(config, shutdown.clone())?;

    if tasks.is_empty() {
        info!("no subscriber topics configured, waiting for termination");
        let mut sig = signal.clone();
        shutdown::triggered(&mut sig).await;
    }

    for task in tasks {
        match task.await {
            Ok(total) => debug!(messages = total, "receive loop joined"),
            Err(e) => error!(error = %e, "receive task aborted"),
        }
    }

    for client in clients {
        client.close();
    }
    Ok(())
}

/// Drive one subscriber handle until shutdown, then close it.
async fn receive_loop(entry: SubscriberEntry, mut signal: ShutdownSignal) -> u64 {
    let SubscriberEntry {
        context,
        mut subscriber,
    } = entry;

    info!(context = %context, topic = %subscriber.topic, "starting receive loop");
    let counts = receive_messages(
        &context,
        &subscriber.topic,
        &mut subscriber.messages,
        &mut subscriber.errors,
        &mut signal,
    )
    .await;

    let total: u64 = counts.values().sum();
    info!(context = %context, topic = %subscriber.topic, messages = total, "receive loop ended");
    subscriber.close();
    total
}

/// Core receive loop over a handle's message and error channels.
///
/// Logs every message with a per-topic running count and every error as it
/// occurs; errors never end the loop. Returns the per-topic counts. Kept
/// free of socket types so tests can drive it from plain channels.
pub(crate) async fn receive_messages(
    context: &str,
    topic: &str,
    messages: &mut mpsc::Receiver<BusMessage>,
    errors: &mut mpsc::Receiver<BusError>,
    signal: &mut ShutdownSignal,
) -> HashMap<String, u64> {
    let mut counts: HashMap<String, u64> = HashMap::new();

    loop {
        tokio::select! {
            msg = messages.recv() => match msg {
                Some(msg) => {
                    let count = counts.entry(msg.topic.clone()).or_insert(0);
                    *count += 1;
                    info!(context, topic = %msg.topic, count = *count, "received message");
                    debug!(context, topic = %msg.topic, body = ?msg.body, "message body");
                }
                // The pump is gone; nothing more will arrive.
                None => break,
            },
            err = errors.recv() => match err {
                Some(e) => error!(context, topic, error = %e, "error receiving message"),
                None => break,
            },
            _ = shutdown::triggered(signal) => break,
        }
    }

    counts
}
