//! Streaming session controller
//!
//! For each configured sample rate, in order: query the default output device,
//! open a stereo float32 stream bound to a fresh [`SineOscillator`], start it,
//! let it play for the configured duration, stop it and close it. Any failure
//! aborts the remaining rates; the engine is torn down exactly once either way.

pub mod guard;
pub mod state;

pub use guard::EngineGuard;
pub use state::SessionState;

use crate::audio::{
    HostNegotiation, OutputParameters, SineOscillator, StreamRequest, Wavetable, TABLE_SIZE,
};
use crate::engine::AudioEngine;
use crate::error::{Error, Result};
use crate::playback::{CallbackMonitor, CallbackStats, MonitoredCallback};
use std::sync::Arc;
use std::time::Duration;
use tonegen_common::config::{
    SessionSettings, DEFAULT_FRAMES_PER_BUFFER, DEFAULT_PLAY_DURATION_SECS, DEFAULT_SAMPLE_RATES,
};
use tracing::{error, info, warn};

/// Playback schedule for one session
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub sample_rates: Vec<u32>,
    pub frames_per_buffer: u32,
    pub play_duration: Duration,
    pub hardware_rate_negotiation: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            sample_rates: DEFAULT_SAMPLE_RATES.to_vec(),
            frames_per_buffer: DEFAULT_FRAMES_PER_BUFFER,
            play_duration: Duration::from_secs(DEFAULT_PLAY_DURATION_SECS),
            hardware_rate_negotiation: true,
        }
    }
}

impl From<&SessionSettings> for SessionConfig {
    fn from(settings: &SessionSettings) -> Self {
        Self {
            sample_rates: settings.sample_rates.clone(),
            frames_per_buffer: settings.frames_per_buffer,
            play_duration: settings.play_duration(),
            hardware_rate_negotiation: settings.hardware_rate_negotiation,
        }
    }
}

impl SessionConfig {
    fn validate(&self) -> Result<()> {
        fn invalid(msg: &str) -> Result<()> {
            Err(Error::Config(tonegen_common::Error::Config(msg.to_string())))
        }

        if self.sample_rates.is_empty() {
            return invalid("no sample rates to play");
        }
        if self.sample_rates.contains(&0) {
            return invalid("sample rate must be positive");
        }
        if self.frames_per_buffer == 0 {
            return invalid("frames per buffer must be positive");
        }
        Ok(())
    }
}

/// Outcome of one sample rate
#[derive(Debug, Clone, PartialEq)]
pub struct IterationReport {
    pub sample_rate: u32,
    pub device: String,
    pub host_negotiation: Option<HostNegotiation>,
    pub stats: CallbackStats,
}

/// Outcome of a successful session: one entry per configured rate
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionReport {
    pub iterations: Vec<IterationReport>,
}

impl SessionReport {
    pub fn sample_rates(&self) -> Vec<u32> {
        self.iterations.iter().map(|i| i.sample_rate).collect()
    }
}

/// Drives the stream lifecycle for every configured sample rate
pub struct SessionController<E: AudioEngine> {
    engine: E,
    config: SessionConfig,
    /// Built once, shared read-only with every stream's callback
    wavetable: Arc<Wavetable>,
    monitor: Arc<CallbackMonitor>,
    state: SessionState,
}

impl<E: AudioEngine> SessionController<E> {
    pub fn new(engine: E, config: SessionConfig) -> Self {
        let wavetable = Arc::new(Wavetable::generate(TABLE_SIZE));
        let monitor = Arc::new(CallbackMonitor::new(
            config.sample_rates.first().copied().unwrap_or(DEFAULT_SAMPLE_RATES[0]),
            config.frames_per_buffer,
        ));

        Self {
            engine,
            config,
            wavetable,
            monitor,
            state: SessionState::Idle,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn wavetable(&self) -> &Arc<Wavetable> {
        &self.wavetable
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn into_engine(self) -> E {
        self.engine
    }

    /// Play every configured rate in order
    ///
    /// Succeeds only when every rate completed its full open → start → stop →
    /// close cycle. On failure the engine is torn down before the error returns
    /// and the state is `Failed` with the error's code.
    pub fn run(&mut self) -> Result<SessionReport> {
        self.state = SessionState::Idle;

        let outcome = match self.config.validate() {
            Ok(()) => match EngineGuard::acquire(&mut self.engine) {
                Ok(mut engine) => {
                    let outcome = run_rates(
                        &mut *engine,
                        &self.config,
                        &self.wavetable,
                        &self.monitor,
                        &mut self.state,
                    );
                    engine.release();
                    outcome
                }
                Err(e) => Err(e),
            },
            Err(e) => Err(e),
        };

        match outcome {
            Ok(iterations) => {
                self.state.transition(SessionState::Done)?;
                info!("Test finished.");
                Ok(SessionReport { iterations })
            }
            Err(e) => {
                // Every non-terminal state may fail, and run() starts from Idle
                self.state = SessionState::Failed(e.code());
                error!("Session failed in state {}: {}", self.state, e);
                Err(e)
            }
        }
    }
}

fn run_rates<E: AudioEngine>(
    engine: &mut E,
    config: &SessionConfig,
    wavetable: &Arc<Wavetable>,
    monitor: &Arc<CallbackMonitor>,
    state: &mut SessionState,
) -> Result<Vec<IterationReport>> {
    let mut iterations = Vec::with_capacity(config.sample_rates.len());

    for (index, &sample_rate) in config.sample_rates.iter().enumerate() {
        if index > 0 {
            state.transition(SessionState::Idle)?;
        }
        iterations.push(run_rate(engine, config, sample_rate, wavetable, monitor, state)?);
    }

    Ok(iterations)
}

fn run_rate<E: AudioEngine>(
    engine: &mut E,
    config: &SessionConfig,
    sample_rate: u32,
    wavetable: &Arc<Wavetable>,
    monitor: &Arc<CallbackMonitor>,
    state: &mut SessionState,
) -> Result<IterationReport> {
    info!(
        "Output sine wave: sample_rate={} Hz, frames_per_buffer={}",
        sample_rate, config.frames_per_buffer
    );

    let device = engine
        .default_output_device()?
        .ok_or(Error::NoDefaultOutputDevice)?;
    let device_name = device.name.clone();

    let host_negotiation =
        if config.hardware_rate_negotiation && engine.supports_hardware_rate_negotiation() {
            Some(HostNegotiation::ForceHardwareRate)
        } else {
            info!("Hardware sample rate switching not exercised on this host");
            None
        };

    let request = StreamRequest {
        parameters: OutputParameters::stereo_float(device, host_negotiation),
        sample_rate,
        frames_per_buffer: config.frames_per_buffer,
    };

    // Fresh phases for every rate; the table is shared, never rebuilt
    monitor.reset(sample_rate, config.frames_per_buffer);
    let callback = MonitoredCallback::new(
        SineOscillator::new(Arc::clone(wavetable)),
        Arc::clone(monitor),
    );

    let mut stream = engine.open_stream(&request, callback)?;
    state.transition(SessionState::Opened)?;

    if let Err(e) = engine.start_stream(&mut stream) {
        close_after_failure(engine, stream);
        return Err(e);
    }
    state.transition(SessionState::Started)?;

    info!("Play for {:?}", config.play_duration);
    engine.sleep(config.play_duration);

    if let Err(e) = engine.stop_stream(&mut stream) {
        close_after_failure(engine, stream);
        return Err(e);
    }
    state.transition(SessionState::Stopped)?;

    engine.close_stream(stream)?;
    state.transition(SessionState::Closed)?;

    let stats = monitor.stats();
    info!(
        "Stream at {} Hz closed: {} callbacks, {} frames, {} irregular intervals",
        sample_rate, stats.callback_count, stats.frames_rendered, stats.irregular_intervals
    );

    Ok(IterationReport {
        sample_rate,
        device: device_name,
        host_negotiation,
        stats,
    })
}

/// Best-effort close of a stream whose start or stop failed
fn close_after_failure<E: AudioEngine>(engine: &mut E, stream: E::Stream) {
    if let Err(e) = engine.close_stream(stream) {
        warn!("Closing stream after failure also failed: {}", e);
    }
}
