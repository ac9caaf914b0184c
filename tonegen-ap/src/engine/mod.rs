//! Audio engine seam
//!
//! The session controller drives every engine through [`AudioEngine`]: one
//! engine-wide initialize/terminate pair around any number of streams, each
//! taken through open → start → stop → close. [`CpalEngine`] is the
//! production implementation; tests script their own.

pub mod cpal_engine;

pub use cpal_engine::CpalEngine;

use crate::audio::{DeviceInfo, RenderCallback, StreamRequest};
use crate::error::Result;
use std::time::Duration;

/// Operations the session consumes from an audio engine
pub trait AudioEngine {
    /// Open stream handle; exactly one exists at a time
    type Stream;

    /// Acquire engine-wide state. Must precede every other call.
    fn initialize(&mut self) -> Result<()>;

    /// Release engine-wide state. Called exactly once per session.
    fn terminate(&mut self) -> Result<()>;

    /// Default output device, or `None` when the host has none
    fn default_output_device(&mut self) -> Result<Option<DeviceInfo>>;

    /// Whether the host can switch the device's nominal sample rate
    fn supports_hardware_rate_negotiation(&self) -> bool;

    /// Open an output stream bound to `callback`; the stream is not yet running
    fn open_stream<C>(&mut self, request: &StreamRequest, callback: C) -> Result<Self::Stream>
    where
        C: RenderCallback + Send + 'static;

    fn start_stream(&mut self, stream: &mut Self::Stream) -> Result<()>;

    fn stop_stream(&mut self, stream: &mut Self::Stream) -> Result<()>;

    /// Close the stream and release the device
    fn close_stream(&mut self, stream: Self::Stream) -> Result<()>;

    /// Block the controlling thread while the callback runs
    fn sleep(&mut self, duration: Duration);
}
