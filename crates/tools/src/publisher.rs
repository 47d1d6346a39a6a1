//! Publisher driver: republishes a JSON message template on configured topics.

use std::path::Path;
use std::time::Duration;

use serde_json::{Map, Value};
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

use edgebus_client::{BusClient, MessagePublisher};
use edgebus_config::AppConfig;

use crate::error::ToolError;
use crate::shutdown::{self, Shutdown, ShutdownSignal};
use crate::watch;

/// Run the publisher driver to completion.
///
/// Resolves the configured publisher context, loads the message template,
/// then spawns one task per topic. The configuration watch is registered
/// only after every task is launched. Per-topic failures abort that task
/// alone; the driver fails only when startup fails or every task failed.
pub async fn run(
    config: &AppConfig,
    shutdown: Shutdown,
    signal: ShutdownSignal,
) -> Result<(), ToolError> {
    let ctx = config.publisher_by_name(&config.app.publisher)?;
    // Loaded before any task spawns: a malformed template must abort every
    // topic without a single publish.
    let template = load_template(&config.app.message_path())?;
    let interval = config.app.interval();
    let settle = config.app.settle();

    info!(
        publisher = %ctx.name,
        topics = ctx.topics().len(),
        interval_secs = config.app.interval_secs,
        "starting publish tasks"
    );

    let mut tasks = Vec::with_capacity(ctx.topics().len());
    for topic in ctx.topics() {
        let topic = topic.clone();
        let bus = ctx.bus_config();
        let template = template.clone();
        let sig = signal.clone();
        let task = tokio::spawn({
            let topic = topic.clone();
            async move {
                let result = publish_topic(topic.clone(), bus, template, interval, settle, sig).await;
                if let Err(e) = &result {
                    error!(topic = %topic, error = %e, "publish task failed");
                }
                result
            }
        });
        tasks.push((topic, task));
    }

    let _watchers = watch::register(config, shutdown.clone())?;

    let total = tasks.len();
    let mut failed = 0usize;
    for (topic, task) in tasks {
        match task.await {
            Ok(Ok(())) => {}
            Ok(Err(_)) => failed += 1,
            Err(e) => {
                error!(topic = %topic, error = %e, "publish task aborted");
                failed += 1;
            }
        }
    }

    if total > 0 && failed == total {
        return Err(ToolError::AllPublishersFailed(total));
    }
    if failed > 0 {
        warn!(failed, total, "some publish tasks failed");
    }
    Ok(())
}

/// Load and decode the message template. The root must be a JSON object.
pub(crate) fn load_template(path: &Path) -> Result<Map<String, Value>, ToolError> {
    let raw = std::fs::read_to_string(path)?;
    match serde_json::from_str::<Value>(&raw)? {
        Value::Object(map) => {
            info!(path = %path.display(), bytes = raw.len(), "loaded message template");
            Ok(map)
        }
        _ => Err(ToolError::TemplateNotObject),
    }
}

/// One topic's publish task: client, publisher, routing field, settle,
/// then the publish loop.
async fn publish_topic(
    topic: String,
    bus: toml::Value,
    template: Map<String, Value>,
    interval: Option<Duration>,
    settle: Duration,
    mut signal: ShutdownSignal,
) -> Result<(), ToolError> {
    let mut client = BusClient::new(bus)?;
    let publisher = client.publisher(&topic).await?;
    let body = inject_routing_field(template, &topic)?;

    // Give late subscribers a moment to attach before the first publish.
    tokio::select! {
        _ = tokio::time::sleep(settle) => {}
        _ = shutdown::triggered(&mut signal) => return Ok(()),
    }

    let result = publish_loop(&publisher, &body, interval, &mut signal).await;

    publisher.close();
    client.close();
    result
}

/// Publish once, then (with an interval) republish on that cadence until
/// the shutdown token trips. Without an interval the task publishes once
/// and stays alive until externally terminated.
pub(crate) async fn publish_loop(
    publisher: &dyn MessagePublisher,
    body: &Map<String, Value>,
    interval: Option<Duration>,
    signal: &mut ShutdownSignal,
) -> Result<(), ToolError> {
    let bytes = publisher.publish(body).await?;
    info!(topic = publisher.topic(), bytes, "published message");

    let Some(every) = interval else {
        shutdown::triggered(signal).await;
        return Ok(());
    };

    let mut ticker = tokio::time::interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The initial publish consumed the first slot.
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let bytes = publisher.publish(body).await?;
                info!(topic = publisher.topic(), bytes, "published message");
            }
            _ = shutdown::triggered(signal) => break,
        }
    }
    Ok(())
}

/// Inject the routing field downstream bridges key on.
///
/// Telemetry topics (`RT`/`NRT` prefix) carry a reconstructed `sourcetopic`
/// built from the slash-split name: `RT/read/flowmeter/PL0/D13` becomes
/// `/flowmeter/PL0/D13/read`. Every other topic carries a `data_topic`
/// naming the topic itself.
pub(crate) fn inject_routing_field(
    mut body: Map<String, Value>,
    topic: &str,
) -> Result<Map<String, Value>, ToolError> {
    if topic.starts_with("RT") || topic.starts_with("NRT") {
        let parts: Vec<&str> = topic.split('/').collect();
        if parts.len() < 5 {
            return Err(ToolError::MalformedTopic(topic.to_string()));
        }
        let source = format!("/{}/{}/{}/{}", parts[2], parts[3], parts[4], parts[1]);
        body.insert("sourcetopic".to_string(), Value::String(source));
    } else {
        body.insert("data_topic".to_string(), Value::String(topic.to_string()));
    }
    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use edgebus_client::BusError;

    use crate::shutdown;

    fn sample_template() -> Map<String, Value> {
        let mut body = Map::new();
        body.insert("flow_rate".into(), Value::from(12.7));
        body.insert("status".into(), Value::from("good"));
        body
    }

    // ── Routing field ───────────────────────────────────────────────

    #[test]
    fn telemetry_topic_gets_sourcetopic() {
        let body = inject_routing_field(sample_template(), "RT/read/flowmeter/PL0/D13").unwrap();
        assert_eq!(body["sourcetopic"], "/flowmeter/PL0/D13/read");
        assert!(!body.contains_key("data_topic"));
        // The template's own fields survive.
        assert_eq!(body["status"], "good");
    }

    #[test]
    fn nrt_prefix_is_telemetry_too() {
        let body = inject_routing_field(sample_template(), "NRT/write/valve/PL1/D02").unwrap();
        assert_eq!(body["sourcetopic"], "/valve/PL1/D02/write");
    }

    #[test]
    fn other_topics_get_data_topic() {
        let body = inject_routing_field(sample_template(), "camera/stream1").unwrap();
        assert_eq!(body["data_topic"], "camera/stream1");
        assert!(!body.contains_key("sourcetopic"));
    }

    #[test]
    fn short_telemetry_topic_is_an_error() {
        let result = inject_routing_field(sample_template(), "RT/read/flowmeter");
        assert!(matches!(
            result,
            Err(ToolError::MalformedTopic(topic)) if topic == "RT/read/flowmeter"
        ));
    }

    // ── Template loading ────────────────────────────────────────────

    #[test]
    fn template_roundtrip_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("message.json");
        std::fs::write(&path, r#"{"flow_rate": 12.7, "status": "good"}"#).unwrap();

        let template = load_template(&path).unwrap();
        assert_eq!(template["status"], "good");
    }

    #[test]
    fn malformed_template_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("message.json");
        std::fs::write(&path, r#"{"flow_rate": "#).unwrap();

        assert!(matches!(
            load_template(&path),
            Err(ToolError::TemplateParse(_))
        ));
    }

    #[test]
    fn non_object_template_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("message.json");
        std::fs::write(&path, "[1, 2, 3]").unwrap();

        assert!(matches!(
            load_template(&path),
            Err(ToolError::TemplateNotObject)
        ));
    }

    #[test]
    fn missing_template_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.json");

        assert!(matches!(load_template(&path), Err(ToolError::TemplateIo(_))));
    }

    // ── Publish loop ────────────────────────────────────────────────

    /// In-memory publisher counting publishes.
    struct MockPublisher {
        topic: String,
        published: AtomicUsize,
    }

    impl MockPublisher {
        fn new(topic: &str) -> Self {
            Self {
                topic: topic.to_string(),
                published: AtomicUsize::new(0),
            }
        }

        fn count(&self) -> usize {
            self.published.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl MessagePublisher for MockPublisher {
        fn topic(&self) -> &str {
            &self.topic
        }

        async fn publish(&self, _body: &Map<String, Value>) -> Result<usize, BusError> {
            self.published.fetch_add(1, Ordering::SeqCst);
            Ok(42)
        }
    }

    #[tokio::test]
    async fn publishes_exactly_once_without_interval() {
        let publisher = std::sync::Arc::new(MockPublisher::new("telemetry/plant0"));
        let (trigger, signal) = shutdown::channel();

        let task = tokio::spawn({
            let publisher = publisher.clone();
            let mut signal = signal.clone();
            async move {
                publish_loop(&*publisher, &sample_template(), None, &mut signal).await
            }
        });

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(publisher.count(), 1, "one-shot mode publishes exactly once");

        trigger.trigger();
        tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .expect("loop should end on shutdown")
            .unwrap()
            .unwrap();
        assert_eq!(publisher.count(), 1, "no publish after termination");
    }

    #[tokio::test]
    async fn republishes_on_the_configured_cadence() {
        let publisher = std::sync::Arc::new(MockPublisher::new("telemetry/plant0"));
        let (trigger, signal) = shutdown::channel();

        let task = tokio::spawn({
            let publisher = publisher.clone();
            let mut signal = signal.clone();
            async move {
                publish_loop(
                    &*publisher,
                    &sample_template(),
                    Some(Duration::from_millis(50)),
                    &mut signal,
                )
                .await
            }
        });

        // Initial publish plus at least two ticks.
        tokio::time::sleep(Duration::from_millis(180)).await;
        trigger.trigger();
        tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .expect("loop should end on shutdown")
            .unwrap()
            .unwrap();

        let count = publisher.count();
        assert!(count >= 3, "expected at least 3 publishes, got {count}");

        tokio::time::sleep(Duration::from_millis(120)).await;
        assert_eq!(publisher.count(), count, "no publish after termination");
    }

    #[tokio::test]
    async fn publish_error_aborts_the_loop() {
        /// Publisher that fails on every publish.
        struct FailingPublisher;

        #[async_trait]
        impl MessagePublisher for FailingPublisher {
            fn topic(&self) -> &str {
                "telemetry/plant0"
            }

            async fn publish(&self, _body: &Map<String, Value>) -> Result<usize, BusError> {
                Err(BusError::Frame("socket gone".into()))
            }
        }

        let (_trigger, mut signal) = shutdown::channel();
        let result = publish_loop(&FailingPublisher, &sample_template(), None, &mut signal).await;
        assert!(matches!(result, Err(ToolError::Bus(_))));
    }
}
