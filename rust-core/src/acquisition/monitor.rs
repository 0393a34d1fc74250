//! Spectrum monitor: engine + waterfall driven from one acquisition stream
//!
//! Each sample block goes through the spectrum engine and the resulting
//! spectrum is pushed into the waterfall. Running/paused state belongs to
//! whoever drives the monitor; stopping is simply not calling it.

use tracing::debug;

use super::buffer::IqConsumer;
use crate::error::{Result, SpectrumError};
use crate::spectrum::{EngineConfig, SampleBlock, Spectrum, SpectrumEngine};
use crate::waterfall::{WaterfallBuffer, WaterfallConfig};

/// Spectrum engine and waterfall history sharing one FFT size
#[derive(Debug)]
pub struct SpectrumMonitor {
    engine: SpectrumEngine,
    waterfall: WaterfallBuffer,
    latest: Option<Spectrum>,
}

impl SpectrumMonitor {
    /// Create a monitor; both configs must agree on the FFT size
    pub fn new(engine_config: EngineConfig, waterfall_config: WaterfallConfig) -> Result<Self> {
        if engine_config.fft_size != waterfall_config.fft_size {
            return Err(SpectrumError::invalid(
                "fft_size",
                waterfall_config.fft_size,
                format!("the engine FFT size {}", engine_config.fft_size),
            ));
        }

        Ok(Self {
            engine: SpectrumEngine::new(engine_config)?,
            waterfall: WaterfallBuffer::from_config(waterfall_config)?,
            latest: None,
        })
    }

    /// Process one block and append its spectrum to the waterfall
    pub fn ingest(&mut self, block: &SampleBlock<'_>) -> Result<&Spectrum> {
        let spectrum = self.engine.process_block(block)?;
        self.waterfall.push(&spectrum.magnitude_db)?;
        Ok(self.latest.insert(spectrum))
    }

    /// Process every complete FFT-size block waiting in the ring buffer
    ///
    /// # Returns
    /// Number of blocks processed
    pub fn drain(
        &mut self,
        consumer: &mut IqConsumer,
        sample_rate: f64,
        center_frequency: Option<f64>,
    ) -> Result<usize> {
        let fft_size = self.engine.fft_size();
        let mut processed = 0;

        while let Some(samples) = consumer.read_block(fft_size) {
            let block = SampleBlock {
                samples: &samples,
                sample_rate,
                center_frequency,
            };
            self.ingest(&block)?;
            processed += 1;
        }

        Ok(processed)
    }

    /// Blank the waterfall and drop the engine's peak-hold trace
    pub fn clear(&mut self) {
        debug!("monitor cleared");
        self.waterfall.clear();
        self.engine.reset_peak_hold();
    }

    /// Most recent spectrum, if any block has been processed
    pub fn latest(&self) -> Option<&Spectrum> {
        self.latest.as_ref()
    }

    pub fn engine(&self) -> &SpectrumEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut SpectrumEngine {
        &mut self.engine
    }

    pub fn waterfall(&self) -> &WaterfallBuffer {
        &self.waterfall
    }
}
