//! Stream descriptors and the render callback contract
//!
//! These types are what the session hands to an [`AudioEngine`](crate::engine::AudioEngine):
//! which device, what format, and the callback the engine drives.

use std::time::Duration;

/// Output is always interleaved stereo
pub const CHANNEL_COUNT: u16 = 2;

/// Output sample format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleFormat {
    /// 32-bit IEEE float, nominal range [-1.0, 1.0]
    Float32,
}

/// Default output device as reported by the engine
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceInfo {
    /// Engine-specific identifier (cpal: device name)
    pub id: String,
    pub name: String,
    /// Lowest latency the device advertises for interactive output
    pub default_low_output_latency: Duration,
    pub default_sample_rate: u32,
}

/// Host-specific negotiation block
///
/// Present only when the host can switch the device's nominal sample rate.
/// Without it the engine may resample internally, which is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostNegotiation {
    /// Change the hardware rate to the requested one rather than resampling
    ForceHardwareRate,
}

/// Output side of a stream configuration
#[derive(Debug, Clone, PartialEq)]
pub struct OutputParameters {
    pub device: DeviceInfo,
    pub channel_count: u16,
    pub sample_format: SampleFormat,
    pub suggested_latency: Duration,
    pub host_negotiation: Option<HostNegotiation>,
}

impl OutputParameters {
    /// Stereo float32 output on `device` at its default low latency
    pub fn stereo_float(device: DeviceInfo, host_negotiation: Option<HostNegotiation>) -> Self {
        let suggested_latency = device.default_low_output_latency;
        Self {
            device,
            channel_count: CHANNEL_COUNT,
            sample_format: SampleFormat::Float32,
            suggested_latency,
            host_negotiation,
        }
    }
}

/// Everything needed to open one output stream
#[derive(Debug, Clone, PartialEq)]
pub struct StreamRequest {
    pub parameters: OutputParameters,
    pub sample_rate: u32,
    pub frames_per_buffer: u32,
}

/// What the callback asks the engine to do next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackResult {
    /// Keep invoking the callback
    Continue,
    /// Drain queued output, then stop
    Complete,
    /// Stop as soon as possible, discarding queued output
    Abort,
}

/// Timing metadata for one callback invocation
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StreamTimeInfo {
    /// Time until the first sample of this buffer reaches the DAC, if known
    pub output_latency: Option<Duration>,
}

/// Engine status flags for one callback invocation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusFlags {
    pub output_underflow: bool,
    pub output_overflow: bool,
    pub priming_output: bool,
}

/// Real-time render contract
///
/// Invoked by the engine on its own thread once per buffer period with an
/// interleaved output slice of `frames * channels` samples. Implementations
/// must not allocate, block, lock or log, and must run in time proportional
/// to the slice length.
pub trait RenderCallback {
    fn render(
        &mut self,
        output: &mut [f32],
        time: &StreamTimeInfo,
        flags: StatusFlags,
    ) -> CallbackResult;
}

impl<C: RenderCallback + ?Sized> RenderCallback for Box<C> {
    fn render(
        &mut self,
        output: &mut [f32],
        time: &StreamTimeInfo,
        flags: StatusFlags,
    ) -> CallbackResult {
        (**self).render(output, time, flags)
    }
}
