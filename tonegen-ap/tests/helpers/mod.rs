//! Shared test utilities for tonegen-ap integration tests

#![allow(dead_code)]

pub mod mock_engine;

pub use mock_engine::{EngineCall, FailPoint, MockEngine};

use std::time::Duration;
use tonegen_ap::SessionConfig;

/// Reference schedule with the play duration shortened to zero
pub fn instant_config() -> SessionConfig {
    SessionConfig {
        play_duration: Duration::ZERO,
        ..SessionConfig::default()
    }
}
