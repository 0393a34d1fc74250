//! Sample hand-off, synthetic sources and the processing loop

pub mod buffer;
pub mod generator;
pub mod monitor;

pub use buffer::{IqConsumer, IqProducer, IqRingBuffer};
pub use monitor::SpectrumMonitor;
