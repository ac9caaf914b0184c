//! Signal path: wavetable, render callback contract and stream descriptors

pub mod oscillator;
pub mod types;
pub mod wavetable;

pub use oscillator::{PhaseAccumulator, SineOscillator, LEFT_PHASE_STEP, RIGHT_PHASE_STEP};
pub use types::{
    CallbackResult, DeviceInfo, HostNegotiation, OutputParameters, RenderCallback, SampleFormat,
    StatusFlags, StreamRequest, StreamTimeInfo, CHANNEL_COUNT,
};
pub use wavetable::{Wavetable, TABLE_SIZE};
