//! Time-frequency history for waterfall rendering

pub mod buffer;

pub use buffer::{WaterfallBuffer, WaterfallConfig, WaterfallFrame};
