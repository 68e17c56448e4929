//! Capability interfaces implemented by hardware adapters.
//!
//! The core never touches registers. A platform crate wraps its ADC, DMA
//! channel, timer and UART in these traits and forwards the matching
//! interrupts to [`Sampler::on_interval_elapsed`](crate::sampler::Sampler::on_interval_elapsed),
//! [`Sampler::on_batch_complete`](crate::sampler::Sampler::on_batch_complete)
//! and [`SentenceReader::feed`](crate::nmea::SentenceReader::feed).
//!
//! Everything here is called from interrupt context: implementations must
//! complete in bounded time and must not block or allocate.

use fugit::MillisDurationU32;

/// A free-running analog converter feeding the batch-transfer source.
pub trait AnalogSource {
    /// Conversion clock, in Hz. Fixed hardware property; the divisor
    /// programmed by [`AnalogSource::set_clock_divisor`] divides this.
    fn clock_hz(&self) -> u32;

    /// Program the conversion clock divisor.
    fn set_clock_divisor(&mut self, divisor: u32);

    /// Start or halt conversions.
    fn run(&mut self, enabled: bool);
}

/// A one-shot transfer engine moving samples from the analog source into a
/// buffer it owns (read pointer fixed at the sample FIFO, write pointer
/// incrementing). The buffer must hold at least
/// [`config::adc::MAX_BATCH`](crate::config::adc::MAX_BATCH) samples.
pub trait BatchTransferEngine {
    /// True while a launched transfer has not yet completed.
    fn is_busy(&self) -> bool;

    /// Arm a transfer of `len` samples into the engine's buffer.
    /// Only called when not busy; the buffer is the engine's alone until
    /// the completion event fires.
    fn launch(&mut self, len: usize);

    /// Borrow the most recently completed batch for the duration of `f`.
    /// Only called after the completion event, before the next launch.
    fn with_completed<R>(&mut self, f: impl FnOnce(&[u16]) -> R) -> R;
}

/// A periodic trigger timer.
pub trait IntervalTimer {
    /// Longest period the timer counter can represent.
    fn max_period(&self) -> MillisDurationU32;

    /// Program the trigger period. Only called with a period within
    /// [`IntervalTimer::max_period`].
    fn set_period(&mut self, period: MillisDurationU32);

    /// Start or stop periodic triggering.
    fn run(&mut self, enabled: bool);
}

/// A received-byte source (UART receive side).
pub trait ByteStream {
    /// Next received byte, or `None` when no data is ready.
    fn read_byte(&mut self) -> Option<u8>;
}
