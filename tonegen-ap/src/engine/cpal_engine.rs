//! Audio engine backed by cpal
//!
//! Maps the session's stream lifecycle onto cpal:
//! - initialize/terminate acquire and release the default host
//! - open builds a paused f32 output stream with a fixed buffer size
//! - start/stop map to play/pause; close drops the stream

use crate::audio::{
    CallbackResult, DeviceInfo, RenderCallback, StatusFlags, StreamRequest, StreamTimeInfo,
};
use crate::engine::AudioEngine;
use crate::error::{Error, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{BufferSize, Device, Host, SampleRate, Stream, StreamConfig, SupportedBufferSize};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tonegen_common::config::DEFAULT_FRAMES_PER_BUFFER;
use tracing::{debug, error, info, warn};

/// Host whose backend switches the device's nominal rate when a stream opens
const RATE_SWITCHING_HOST: &str = "CoreAudio";

/// cpal-backed [`AudioEngine`]
#[derive(Default)]
pub struct CpalEngine {
    host: Option<Host>,
    /// Default output device from the last query
    device: Option<Device>,
}

/// Open cpal stream plus the error counter its error callback feeds
pub struct CpalStream {
    stream: Stream,
    sample_rate: u32,
    error_count: Arc<AtomicU32>,
}

impl CpalEngine {
    pub fn new() -> Self {
        Self::default()
    }

    fn host(&self) -> Result<&Host> {
        self.host
            .as_ref()
            .ok_or_else(|| Error::InvalidState("audio engine not initialized".to_string()))
    }

    /// Resolve a device previously reported by `default_output_device`
    fn device_for(&self, info: &DeviceInfo) -> Result<Device> {
        if let Some(device) = &self.device {
            if device.name().ok().as_deref() == Some(info.id.as_str()) {
                return Ok(device.clone());
            }
        }

        let mut devices = self
            .host()?
            .output_devices()
            .map_err(|e| Error::DeviceQuery(format!("Failed to enumerate devices: {}", e)))?;

        devices
            .find(|d| d.name().ok().as_deref() == Some(info.id.as_str()))
            .ok_or_else(|| Error::DeviceQuery(format!("Device '{}' not found", info.id)))
    }
}

/// Lowest advertised latency: minimum buffer at the default rate
fn low_output_latency(buffer_size: &SupportedBufferSize, sample_rate: u32) -> Duration {
    let frames = match buffer_size {
        SupportedBufferSize::Range { min, .. } if *min > 0 => *min,
        _ => DEFAULT_FRAMES_PER_BUFFER,
    };
    Duration::from_secs_f64(frames as f64 / sample_rate.max(1) as f64)
}

/// Fail the open when the device cannot run `sample_rate` without resampling
fn ensure_native_rate(device: &Device, sample_rate: u32, channels: u16) -> Result<()> {
    let mut configs = device.supported_output_configs().map_err(|e| Error::StreamOpen {
        sample_rate,
        reason: format!("Failed to get device configs: {}", e),
    })?;

    let native = configs.any(|range| {
        range.channels() >= channels
            && range.min_sample_rate().0 <= sample_rate
            && range.max_sample_rate().0 >= sample_rate
    });

    if native {
        Ok(())
    } else {
        Err(Error::StreamOpen {
            sample_rate,
            reason: "device cannot switch to this rate".to_string(),
        })
    }
}

impl AudioEngine for CpalEngine {
    type Stream = CpalStream;

    fn initialize(&mut self) -> Result<()> {
        if self.host.is_some() {
            return Err(Error::Initialization("already initialized".to_string()));
        }

        let host = cpal::default_host();
        info!("Audio host: {}", host.id().name());
        self.host = Some(host);
        Ok(())
    }

    fn terminate(&mut self) -> Result<()> {
        self.device = None;
        match self.host.take() {
            Some(host) => {
                debug!("Released audio host {}", host.id().name());
                Ok(())
            }
            None => Err(Error::Termination("audio engine not initialized".to_string())),
        }
    }

    fn default_output_device(&mut self) -> Result<Option<DeviceInfo>> {
        let Some(device) = self.host()?.default_output_device() else {
            return Ok(None);
        };

        let name = device
            .name()
            .map_err(|e| Error::DeviceQuery(format!("Failed to read device name: {}", e)))?;
        let default_config = device
            .default_output_config()
            .map_err(|e| Error::DeviceQuery(format!("Failed to get default config: {}", e)))?;

        let default_sample_rate = default_config.sample_rate().0;
        let info = DeviceInfo {
            id: name.clone(),
            name,
            default_low_output_latency: low_output_latency(
                default_config.buffer_size(),
                default_sample_rate,
            ),
            default_sample_rate,
        };

        debug!(
            "Default output device: {} ({} Hz, low latency {:.2}ms)",
            info.name,
            info.default_sample_rate,
            info.default_low_output_latency.as_secs_f64() * 1000.0
        );

        self.device = Some(device);
        Ok(Some(info))
    }

    fn supports_hardware_rate_negotiation(&self) -> bool {
        self.host
            .as_ref()
            .is_some_and(|host| host.id().name() == RATE_SWITCHING_HOST)
    }

    fn open_stream<C>(&mut self, request: &StreamRequest, callback: C) -> Result<CpalStream>
    where
        C: RenderCallback + Send + 'static,
    {
        let sample_rate = request.sample_rate;
        let parameters = &request.parameters;
        let device = self.device_for(&parameters.device)?;

        if parameters.host_negotiation.is_some() {
            ensure_native_rate(&device, sample_rate, parameters.channel_count)?;
        }

        // cpal takes a buffer size rather than a latency target
        let config = StreamConfig {
            channels: parameters.channel_count,
            sample_rate: SampleRate(sample_rate),
            buffer_size: BufferSize::Fixed(request.frames_per_buffer),
        };
        debug!(
            "Opening stream: {:?}, suggested latency {:.2}ms",
            config,
            parameters.suggested_latency.as_secs_f64() * 1000.0
        );

        let error_count = Arc::new(AtomicU32::new(0));
        let error_flag = Arc::clone(&error_count);
        let mut callback = callback;
        // cpal cannot stop a stream from inside the callback; after a
        // non-Continue result the stream plays silence until stopped
        let mut finished = false;

        let stream = device
            .build_output_stream(
                &config,
                move |data: &mut [f32], info: &cpal::OutputCallbackInfo| {
                    if finished {
                        data.fill(0.0);
                        return;
                    }
                    let timestamp = info.timestamp();
                    let time = StreamTimeInfo {
                        output_latency: timestamp.playback.duration_since(&timestamp.callback),
                    };
                    let result = callback.render(data, &time, StatusFlags::default());
                    finished = result != CallbackResult::Continue;
                },
                move |err| {
                    error!("Audio stream error: {}", err);
                    error_flag.fetch_add(1, Ordering::Relaxed);
                },
                None, // No timeout
            )
            .map_err(|e| Error::StreamOpen {
                sample_rate,
                reason: e.to_string(),
            })?;

        // Some backends start playing on build; hold it until start_stream
        if let Err(e) = stream.pause() {
            debug!("Backend could not pause freshly built stream: {}", e);
        }

        Ok(CpalStream {
            stream,
            sample_rate,
            error_count,
        })
    }

    fn start_stream(&mut self, stream: &mut CpalStream) -> Result<()> {
        stream
            .stream
            .play()
            .map_err(|e| Error::StreamStart(e.to_string()))?;
        debug!("Stream at {} Hz started", stream.sample_rate);
        Ok(())
    }

    fn stop_stream(&mut self, stream: &mut CpalStream) -> Result<()> {
        stream
            .stream
            .pause()
            .map_err(|e| Error::StreamStop(e.to_string()))?;
        debug!("Stream at {} Hz stopped", stream.sample_rate);
        Ok(())
    }

    fn close_stream(&mut self, stream: CpalStream) -> Result<()> {
        let errors = stream.error_count.load(Ordering::Relaxed);
        if errors > 0 {
            warn!(
                "Stream at {} Hz reported {} errors while running",
                stream.sample_rate, errors
            );
        }
        drop(stream.stream);
        Ok(())
    }

    fn sleep(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}
