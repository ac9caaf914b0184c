//! Playback instrumentation shared between the controller and the audio thread

pub mod callback_monitor;

pub use callback_monitor::{CallbackMonitor, CallbackStats, MonitoredCallback};
