//! # Tonegen Audio Player Library (tonegen-ap)
//!
//! Stereo sine-tone generator that streams to the default output device and
//! reopens the stream at each configured sample rate.
//!
//! **Architecture:** precomputed wavetable → real-time render callback →
//! audio engine (cpal in production, scripted engines in tests), driven by a
//! session controller with an explicit stream lifecycle state machine.

pub mod audio;
pub mod engine;
pub mod error;
pub mod playback;
pub mod session;

pub use error::{Error, ErrorCode, Result};
pub use session::{SessionConfig, SessionController, SessionReport};
