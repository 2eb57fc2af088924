use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use std::sync::Arc;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layered};
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// WARN and ERROR lines recorded by a [`CaptureLayer`].
#[derive(Debug, Clone, Default)]
pub struct CapturedLogs {
    lines: Arc<Mutex<Vec<String>>>,
}

impl CapturedLogs {
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }

    pub fn clear(&self) {
        self.lines.lock().clear();
    }
}

pub struct CaptureLayer {
    logs: CapturedLogs,
}

impl CaptureLayer {
    pub fn new(logs: CapturedLogs) -> Self {
        Self { logs }
    }
}

/// Renders one event as `LEVEL target: message key=value ...`.
#[derive(Default)]
struct LineVisitor {
    message: Option<String>,
    fields: String,
}

impl LineVisitor {
    fn into_line(self, metadata: &tracing::Metadata<'_>) -> String {
        format!(
            "{} {}: {}{}",
            metadata.level(),
            metadata.target(),
            self.message.as_deref().unwrap_or("(no message)"),
            self.fields
        )
    }
}

impl Visit for LineVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        match field.name() {
            "message" => self.message = Some(format!("{value:?}")),
            name => {
                let _ = write!(self.fields, " {name}={value:?}");
            }
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        match field.name() {
            "message" => self.message = Some(value.to_string()),
            name => {
                let _ = write!(self.fields, " {name}={value}");
            }
        }
    }
}

impl<S: Subscriber> tracing_subscriber::Layer<S> for CaptureLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if *metadata.level() > Level::WARN {
            return;
        }

        let mut visitor = LineVisitor::default();
        event.record(&mut visitor);
        self.logs.lines.lock().push(visitor.into_line(metadata));
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_level")]
    pub level: String,

    #[serde(default)]
    pub json_output: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            json_output: false,
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

/// Install the global subscriber. Panics if one is already set.
pub fn init_subscriber(config: &TelemetryConfig) {
    if let Err(e) = try_init_subscriber(config) {
        panic!("failed to install tracing subscriber: {e}");
    }
}

/// Like [`init_subscriber`], but leaves an existing global subscriber alone.
pub fn try_init_subscriber(config: &TelemetryConfig) -> Result<(), TryInitError> {
    let filter = env_filter(&config.level);

    if config.json_output {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer())
            .try_init()
    }
}

pub type CaptureSubscriber = Layered<CaptureLayer, Layered<EnvFilter, Registry>>;

/// A subscriber for scoped use (`tracing::subscriber::with_default`) that
/// records WARN and ERROR events into the returned [`CapturedLogs`].
pub fn capture_subscriber(level: &str) -> (CaptureSubscriber, CapturedLogs) {
    let logs = CapturedLogs::default();
    let subscriber = tracing_subscriber::registry()
        .with(EnvFilter::new(level))
        .with(CaptureLayer::new(logs.clone()));
    (subscriber, logs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TelemetryConfig::default();
        assert_eq!(config.level, "info");
        assert!(!config.json_output);
    }

    #[test]
    fn test_try_init_only_once() {
        let config = TelemetryConfig {
            level: "warn".to_string(),
            json_output: true,
        };
        let _ = try_init_subscriber(&config);
        assert!(try_init_subscriber(&config).is_err());
    }

    #[test]
    fn test_config_from_json() {
        let config: TelemetryConfig = serde_json::from_str(r#"{"json_output": true}"#).unwrap();
        assert_eq!(config.level, "info");
        assert!(config.json_output);
    }

    #[test]
    fn test_capture_keeps_warn_and_error_only() {
        let (subscriber, logs) = capture_subscriber("trace");

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!("ignored");
            tracing::warn!("careful");
            tracing::error!(code = 7, "broken");
        });

        let lines = logs.lines();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("WARN "));
        assert!(lines[0].ends_with(": careful"));
        assert!(lines[1].starts_with("ERROR "));
        assert!(lines[1].ends_with(": broken code=7"));

        logs.clear();
        assert!(logs.lines().is_empty());
    }

    #[test]
    fn test_capture_renders_fields() {
        let (subscriber, logs) = capture_subscriber("warn");

        tracing::subscriber::with_default(subscriber, || {
            tracing::warn!(event = "error", error = %"disk full", count = 2, "no listeners");
            tracing::error!(reason = "bare");
        });

        let lines = logs.lines();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with(": no listeners event=error error=disk full count=2"));
        assert!(lines[1].ends_with(": (no message) reason=bare"));
    }

    #[test]
    fn test_capture_respects_filter() {
        let (subscriber, logs) = capture_subscriber("error");

        tracing::subscriber::with_default(subscriber, || {
            tracing::warn!("filtered out");
            tracing::error!("kept");
        });

        assert_eq!(logs.lines().len(), 1);
    }
}
