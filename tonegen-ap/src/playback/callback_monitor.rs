//! Audio callback timing monitor
//!
//! Counts callback invocations and rendered frames, and flags callbacks that
//! arrive far from the expected `frames_per_buffer / sample_rate` period.
//! The controller reads a snapshot after each stream stops.

use crate::audio::{CallbackResult, RenderCallback, StatusFlags, StreamTimeInfo, CHANNEL_COUNT};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// Audio callback timing monitor
///
/// **Design:** Lock-free for use in real-time audio callback
pub struct CallbackMonitor {
    /// Start time for monotonic elapsed time calculation
    start_time: Instant,

    /// Last callback elapsed time (nanoseconds since start_time, 0 = none yet)
    last_callback_ns: AtomicU64,

    /// Total callback invocations
    callback_count: AtomicU64,

    /// Total frames written by the wrapped callback
    frames_rendered: AtomicU64,

    /// Count of intervals deviating from expected by more than the tolerance
    irregular_intervals: AtomicU64,

    /// Expected interval between callbacks (nanoseconds)
    expected_interval_ns: AtomicU64,

    /// Tolerance for irregular interval detection (nanoseconds)
    tolerance_ns: AtomicU64,
}

impl CallbackMonitor {
    /// Create a monitor expecting one callback per `frames_per_buffer` frames
    pub fn new(sample_rate: u32, frames_per_buffer: u32) -> Self {
        let monitor = Self {
            start_time: Instant::now(),
            last_callback_ns: AtomicU64::new(0),
            callback_count: AtomicU64::new(0),
            frames_rendered: AtomicU64::new(0),
            irregular_intervals: AtomicU64::new(0),
            expected_interval_ns: AtomicU64::new(0),
            tolerance_ns: AtomicU64::new(0),
        };
        monitor.reset(sample_rate, frames_per_buffer);
        monitor
    }

    /// Clear counters and retarget the expected interval
    ///
    /// Only call while no stream is running.
    pub fn reset(&self, sample_rate: u32, frames_per_buffer: u32) {
        let expected_interval_ns =
            ((frames_per_buffer as f64 / sample_rate.max(1) as f64) * 1_000_000_000.0) as u64;

        // Host buffer scheduling jitters, so allow half a period either way
        let tolerance_ns = expected_interval_ns / 2;

        self.last_callback_ns.store(0, Ordering::Relaxed);
        self.callback_count.store(0, Ordering::Relaxed);
        self.frames_rendered.store(0, Ordering::Relaxed);
        self.irregular_intervals.store(0, Ordering::Relaxed);
        self.expected_interval_ns.store(expected_interval_ns, Ordering::Relaxed);
        self.tolerance_ns.store(tolerance_ns, Ordering::Relaxed);

        debug!(
            "CallbackMonitor reset: sample_rate={}, frames_per_buffer={}, expected_interval={:.3}ms, tolerance={:.3}ms",
            sample_rate,
            frames_per_buffer,
            expected_interval_ns as f64 / 1_000_000.0,
            tolerance_ns as f64 / 1_000_000.0
        );
    }

    /// Record callback invocation (call at start of audio callback)
    ///
    /// **REAL-TIME SAFE**: Only atomic operations, no logging, no system calls
    pub fn record_callback(&self, frames: usize) {
        // Offset by one so a callback at the exact start instant still counts as "seen"
        let now_ns = self.start_time.elapsed().as_nanos() as u64 + 1;
        let last_ns = self.last_callback_ns.swap(now_ns, Ordering::Relaxed);
        self.callback_count.fetch_add(1, Ordering::Relaxed);
        self.frames_rendered.fetch_add(frames as u64, Ordering::Relaxed);

        // Skip first callback (no previous timestamp)
        if last_ns == 0 {
            return;
        }

        let actual_interval_ns = now_ns.saturating_sub(last_ns);
        let expected_interval_ns = self.expected_interval_ns.load(Ordering::Relaxed);
        let tolerance_ns = self.tolerance_ns.load(Ordering::Relaxed);

        if actual_interval_ns.abs_diff(expected_interval_ns) > tolerance_ns {
            self.irregular_intervals.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Get current statistics
    pub fn stats(&self) -> CallbackStats {
        CallbackStats {
            callback_count: self.callback_count.load(Ordering::Relaxed),
            frames_rendered: self.frames_rendered.load(Ordering::Relaxed),
            irregular_intervals: self.irregular_intervals.load(Ordering::Relaxed),
            expected_interval_us: self.expected_interval_ns.load(Ordering::Relaxed) / 1_000,
        }
    }
}

/// Callback statistics snapshot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallbackStats {
    pub callback_count: u64,
    pub frames_rendered: u64,
    pub irregular_intervals: u64,
    pub expected_interval_us: u64,
}

/// Render callback that records timing before delegating
pub struct MonitoredCallback<C> {
    inner: C,
    monitor: Arc<CallbackMonitor>,
}

impl<C> MonitoredCallback<C> {
    pub fn new(inner: C, monitor: Arc<CallbackMonitor>) -> Self {
        Self { inner, monitor }
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }
}

impl<C: RenderCallback> RenderCallback for MonitoredCallback<C> {
    fn render(
        &mut self,
        output: &mut [f32],
        time: &StreamTimeInfo,
        flags: StatusFlags,
    ) -> CallbackResult {
        self.monitor
            .record_callback(output.len() / CHANNEL_COUNT as usize);
        self.inner.render(output, time, flags)
    }
}
