//! Periodic ADC batch sampling and noise estimation.
//!
//! Event flow mirrors the hardware: an interval-timer tick launches a batch
//! transfer ([`Sampler::on_interval_elapsed`]), and the transfer-completion
//! interrupt reduces the batch to a [`NoiseEstimate`]
//! ([`Sampler::on_batch_complete`]). Per batch the state machine runs
//! `Idle -> Sampling -> Idle`; a tick that lands mid-batch is dropped and
//! counted rather than double-triggering.
//!
//! Both handlers run in interrupt context and do bounded work: one pass
//! over the batch, no blocking, no allocation.

use crate::config;
use crate::error::{ConfigError, SampleError};
use crate::hal::{AnalogSource, BatchTransferEngine, IntervalTimer};
use crate::latest::Latest;
use crate::math;
use fugit::MillisDurationU32;

/// Averaged sound level derived from one completed batch.
/// Immutable once computed; superseded by the next batch.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NoiseEstimate {
    /// Mean voltage over the valid samples.
    pub average_volts: f32,
    /// Mean level in dB relative to the reference level.
    pub average_db: f32,
    /// Samples excluded for carrying the hardware invalid flag.
    pub invalid_samples: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    Sampling,
}

/// The sampling pipeline. Owns its hardware collaborators; publishes into a
/// shared [`Latest`] cell read by the foreground orchestrator.
pub struct Sampler<A, E, T> {
    adc: A,
    transfer: E,
    timer: T,
    batch_size: usize,
    state: State,
    overruns: u32,
    estimate: &'static Latest<NoiseEstimate>,
}

impl<A, E, T> Sampler<A, E, T>
where
    A: AnalogSource,
    E: BatchTransferEngine,
    T: IntervalTimer,
{
    pub fn new(adc: A, transfer: E, timer: T, estimate: &'static Latest<NoiseEstimate>) -> Self {
        Self {
            adc,
            transfer,
            timer,
            batch_size: 0,
            state: State::Idle,
            overruns: 0,
            estimate,
        }
    }

    /// Program the conversion rate, batch length and trigger interval.
    ///
    /// Arms the periodic trigger but does not start it; call
    /// [`Sampler::start`] once the orchestrator is ready. On error nothing
    /// has been armed and sampling must not be started.
    pub fn configure(
        &mut self,
        sample_rate_hz: u32,
        batch_size: usize,
        interval: MillisDurationU32,
    ) -> Result<(), ConfigError> {
        let clock = self.adc.clock_hz();
        if sample_rate_hz == 0 || sample_rate_hz > clock {
            return Err(ConfigError::RateOutOfRange);
        }
        if batch_size == 0 || batch_size > config::adc::MAX_BATCH {
            return Err(ConfigError::BatchSizeOutOfRange);
        }
        if interval > self.timer.max_period() {
            return Err(ConfigError::PeriodOutOfRange);
        }

        self.adc.set_clock_divisor(clock / sample_rate_hz);
        self.timer.set_period(interval);
        self.batch_size = batch_size;

        log::debug!(
            "sampler configured: {} Hz, {} samples per batch, {} ms interval",
            sample_rate_hz,
            batch_size,
            interval.to_millis()
        );
        Ok(())
    }

    /// Start periodic triggering.
    pub fn start(&mut self) {
        self.timer.run(true);
    }

    /// Stop periodic triggering. A batch already in flight still completes.
    pub fn stop(&mut self) {
        self.timer.run(false);
    }

    /// Interval-timer event: launch the next batch transfer.
    ///
    /// If the previous batch has not drained yet, this tick is dropped, the
    /// overrun counter increments, and no second transfer starts.
    pub fn on_interval_elapsed(&mut self) -> Result<(), SampleError> {
        if self.state == State::Sampling || self.transfer.is_busy() {
            self.overruns = self.overruns.wrapping_add(1);
            log::warn!("interval tick dropped, transfer busy ({} overruns)", self.overruns);
            return Err(SampleError::Overrun);
        }

        self.transfer.launch(self.batch_size);
        self.adc.run(true);
        self.state = State::Sampling;
        Ok(())
    }

    /// Transfer-completion event: halt the converter and reduce the batch
    /// to a [`NoiseEstimate`], publishing it for the orchestrator.
    ///
    /// Yields [`SampleError::AllSamplesInvalid`] instead of an estimate when
    /// no valid sample remains; nothing is published that cycle.
    pub fn on_batch_complete(&mut self) -> Result<NoiseEstimate, SampleError> {
        if self.state != State::Sampling {
            return Err(SampleError::SpuriousCompletion);
        }
        self.adc.run(false);
        self.state = State::Idle;

        let estimate = self.transfer.with_completed(estimate_batch)?;
        self.estimate.publish(estimate);

        log::debug!(
            "batch complete: {} V avg, {} dB, {} invalid",
            estimate.average_volts,
            estimate.average_db,
            estimate.invalid_samples
        );
        Ok(estimate)
    }

    /// Ticks dropped because a batch was still in flight.
    pub fn overrun_count(&self) -> u32 {
        self.overruns
    }

    /// Most recently published estimate, if any.
    pub fn latest_estimate(&self) -> Option<NoiseEstimate> {
        self.estimate.get()
    }
}

/// Mean the valid samples of one batch and convert to volts and dB.
///
/// Accumulates in u32, which cannot overflow for any batch within
/// [`config::adc::MAX_BATCH`] (checked at compile time in `config`).
fn estimate_batch(samples: &[u16]) -> Result<NoiseEstimate, SampleError> {
    let mut sum: u32 = 0;
    let mut valid: u32 = 0;
    for &raw in samples {
        if raw & config::adc::INVALID_BIT == 0 {
            sum += u32::from(raw);
            valid += 1;
        }
    }
    if valid == 0 {
        return Err(SampleError::AllSamplesInvalid);
    }

    #[allow(clippy::cast_precision_loss)]
    let mean = sum as f32 / valid as f32;
    let average_volts = math::volts_from_count(mean);
    // a zero mean would put log10 out of domain; surface it, never NaN
    let average_db = math::decibels(average_volts).ok_or(SampleError::AllSamplesInvalid)?;

    Ok(NoiseEstimate {
        average_volts,
        average_db,
        invalid_samples: samples.len() - valid as usize,
    })
}
