mod subscriber;

pub use subscriber::{
    capture_subscriber, init_subscriber, try_init_subscriber, CaptureLayer, CaptureSubscriber,
    CapturedLogs, TelemetryConfig,
};
