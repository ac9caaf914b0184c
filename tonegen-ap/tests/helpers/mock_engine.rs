//! Scripted audio engine for lifecycle tests
//!
//! Records every call the session makes, fails on demand at any lifecycle
//! step, and drives the installed render callback during `sleep` the way a
//! real engine would drive it from its audio thread.

use std::time::Duration;
use tonegen_ap::audio::{
    DeviceInfo, HostNegotiation, RenderCallback, StatusFlags, StreamRequest, StreamTimeInfo,
    CHANNEL_COUNT,
};
use tonegen_ap::engine::AudioEngine;
use tonegen_ap::{Error, Result};

/// One call made by the session, in order
#[derive(Debug, Clone, PartialEq)]
pub enum EngineCall {
    Initialize,
    Terminate,
    DefaultOutputDevice,
    Open {
        stream: u32,
        sample_rate: u32,
        frames_per_buffer: u32,
        channel_count: u16,
        host_negotiation: Option<HostNegotiation>,
    },
    Start(u32),
    Stop(u32),
    Close(u32),
    Sleep(Duration),
}

/// Lifecycle step to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailPoint {
    Initialize,
    /// Device query reports an error
    DeviceQuery,
    /// Device query succeeds with no device
    NoDevice,
    Open,
    Start,
    Stop,
    Close,
    Terminate,
}

/// Handle returned by [`MockEngine::open_stream`]
#[derive(Debug)]
pub struct MockStream {
    id: u32,
}

pub struct MockEngine {
    pub calls: Vec<EngineCall>,
    /// First buffer rendered by each started stream, tagged with its sample rate
    pub first_buffers: Vec<(u32, Vec<f32>)>,
    /// Buffers rendered per `sleep`
    pub renders_per_sleep: usize,
    pub hardware_rate_negotiation: bool,
    failures: Vec<(FailPoint, usize)>,
    hits: Vec<(FailPoint, usize)>,
    callback: Option<Box<dyn RenderCallback + Send>>,
    running: Option<(u32, u32, u32)>,
    next_stream: u32,
}

impl Default for MockEngine {
    fn default() -> Self {
        Self {
            calls: Vec::new(),
            first_buffers: Vec::new(),
            renders_per_sleep: 3,
            hardware_rate_negotiation: false,
            failures: Vec::new(),
            hits: Vec::new(),
            callback: None,
            running: None,
            next_stream: 1,
        }
    }
}

impl MockEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the `occurrence`-th (zero-based) call at `point`
    pub fn failing_at(mut self, point: FailPoint, occurrence: usize) -> Self {
        self.failures.push((point, occurrence));
        self
    }

    pub fn with_hardware_rate_negotiation(mut self) -> Self {
        self.hardware_rate_negotiation = true;
        self
    }

    pub fn count(&self, predicate: impl Fn(&EngineCall) -> bool) -> usize {
        self.calls.iter().filter(|call| predicate(call)).count()
    }

    pub fn terminate_count(&self) -> usize {
        self.count(|call| matches!(call, EngineCall::Terminate))
    }

    pub fn opened_rates(&self) -> Vec<u32> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                EngineCall::Open { sample_rate, .. } => Some(*sample_rate),
                _ => None,
            })
            .collect()
    }

    /// Count this call at `point` and report whether it should fail
    fn should_fail(&mut self, point: FailPoint) -> bool {
        let occurrence = match self.hits.iter_mut().find(|(p, _)| *p == point) {
            Some((_, count)) => {
                *count += 1;
                *count - 1
            }
            None => {
                self.hits.push((point, 1));
                0
            }
        };
        self.failures.contains(&(point, occurrence))
    }
}

impl AudioEngine for MockEngine {
    type Stream = MockStream;

    fn initialize(&mut self) -> Result<()> {
        self.calls.push(EngineCall::Initialize);
        if self.should_fail(FailPoint::Initialize) {
            return Err(Error::Initialization("injected init failure".into()));
        }
        Ok(())
    }

    fn terminate(&mut self) -> Result<()> {
        self.calls.push(EngineCall::Terminate);
        self.callback = None;
        self.running = None;
        if self.should_fail(FailPoint::Terminate) {
            return Err(Error::Termination("injected teardown failure".into()));
        }
        Ok(())
    }

    fn default_output_device(&mut self) -> Result<Option<DeviceInfo>> {
        self.calls.push(EngineCall::DefaultOutputDevice);
        if self.should_fail(FailPoint::DeviceQuery) {
            return Err(Error::DeviceQuery("injected query failure".into()));
        }
        if self.should_fail(FailPoint::NoDevice) {
            return Ok(None);
        }
        Ok(Some(DeviceInfo {
            id: "mock".into(),
            name: "Mock Output".into(),
            default_low_output_latency: Duration::from_millis(5),
            default_sample_rate: 48_000,
        }))
    }

    fn supports_hardware_rate_negotiation(&self) -> bool {
        self.hardware_rate_negotiation
    }

    fn open_stream<C>(&mut self, request: &StreamRequest, callback: C) -> Result<MockStream>
    where
        C: RenderCallback + Send + 'static,
    {
        let id = self.next_stream;
        self.next_stream += 1;
        self.calls.push(EngineCall::Open {
            stream: id,
            sample_rate: request.sample_rate,
            frames_per_buffer: request.frames_per_buffer,
            channel_count: request.parameters.channel_count,
            host_negotiation: request.parameters.host_negotiation,
        });
        if self.should_fail(FailPoint::Open) {
            return Err(Error::StreamOpen {
                sample_rate: request.sample_rate,
                reason: "injected open failure".into(),
            });
        }

        assert!(self.callback.is_none(), "a second stream opened while one is open");
        self.callback = Some(Box::new(callback));
        self.running = Some((id, request.sample_rate, request.frames_per_buffer));
        Ok(MockStream { id })
    }

    fn start_stream(&mut self, stream: &mut MockStream) -> Result<()> {
        self.calls.push(EngineCall::Start(stream.id));
        if self.should_fail(FailPoint::Start) {
            return Err(Error::StreamStart("injected start failure".into()));
        }
        Ok(())
    }

    fn stop_stream(&mut self, stream: &mut MockStream) -> Result<()> {
        self.calls.push(EngineCall::Stop(stream.id));
        if self.should_fail(FailPoint::Stop) {
            return Err(Error::StreamStop("injected stop failure".into()));
        }
        Ok(())
    }

    fn close_stream(&mut self, stream: MockStream) -> Result<()> {
        self.calls.push(EngineCall::Close(stream.id));
        self.callback = None;
        self.running = None;
        if self.should_fail(FailPoint::Close) {
            return Err(Error::StreamClose("injected close failure".into()));
        }
        Ok(())
    }

    fn sleep(&mut self, duration: Duration) {
        self.calls.push(EngineCall::Sleep(duration));

        let (Some(callback), Some((_, sample_rate, frames))) =
            (self.callback.as_mut(), self.running)
        else {
            return;
        };

        let mut buffer = vec![0.0f32; frames as usize * CHANNEL_COUNT as usize];
        for i in 0..self.renders_per_sleep {
            callback.render(&mut buffer, &StreamTimeInfo::default(), StatusFlags::default());
            if i == 0 {
                self.first_buffers.push((sample_rate, buffer.clone()));
            }
        }
    }
}
