use thiserror::Error;

/// Setup failures. `configure` arms nothing when one of these is returned,
/// and the caller must not proceed to start sampling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Requested sample rate is zero or above the conversion clock.
    #[error("sample rate not representable by the conversion clock")]
    RateOutOfRange,

    /// Requested trigger interval exceeds the timer's counter range.
    #[error("trigger interval exceeds the timer counter range")]
    PeriodOutOfRange,

    /// Requested batch size is zero or above the transfer buffer capacity.
    #[error("batch size outside the transfer buffer capacity")]
    BatchSizeOutOfRange,
}

/// Recoverable per-cycle sampling failures. None of these stop the pipeline;
/// the next interval tick proceeds normally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SampleError {
    /// An interval tick arrived while the previous batch was still in
    /// flight. The tick is dropped and counted; no second transfer starts.
    #[error("interval tick dropped, previous batch still in flight")]
    Overrun,

    /// Every sample in the batch carried the hardware invalid flag (or the
    /// mean was not a positive voltage). No estimate is published.
    #[error("no valid samples in batch")]
    AllSamplesInvalid,

    /// A completion event arrived without a matching launch. Ignored.
    #[error("batch completion without a transfer in flight")]
    SpuriousCompletion,
}

/// Recoverable sentence-decoding failures. The offending line contributes no
/// fix; framing continues with the next line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NmeaError {
    /// A coordinate field was shorter than its whole-degree width, not
    /// numeric, or paired with an unknown hemisphere letter.
    #[error("malformed coordinate field")]
    MalformedCoordinate,
}
