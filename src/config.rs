/// ADC configuration
pub mod adc {
    /// Conversion result width. The RP2040-class converter produces 12-bit
    /// codes in the low bits of each 16-bit FIFO entry.
    pub const RESOLUTION_BITS: u32 = 12;

    /// A set bit 15 in a FIFO entry marks an invalid/overrange conversion.
    pub const INVALID_BIT: u16 = 1 << 15;

    /// Largest representable raw code
    pub const MAX_COUNT: u16 = (1 << RESOLUTION_BITS) - 1;

    /// Full-scale input voltage
    pub const FULL_SCALE_VOLTS: f32 = 3.3;

    /// Raw code to volts
    pub const VOLTS_PER_COUNT: f32 = FULL_SCALE_VOLTS / MAX_COUNT as f32;

    /// Capacity every transfer engine's batch buffer must provide.
    /// The configured batch size may be anything in `1..=MAX_BATCH`.
    pub const MAX_BATCH: usize = 256;

    const _: () = assert!(RESOLUTION_BITS < u16::BITS, "codes must fit below the invalid bit");
    const _: () = assert!(MAX_BATCH > 0);
    // largest possible batch sum must fit the u32 accumulator
    const _: () = assert!((MAX_BATCH as u64) * (MAX_COUNT as u64) <= u32::MAX as u64);
}

/// Noise estimate configuration
pub mod noise {
    /// Microphone voltage corresponding to 0 dB on the reported scale.
    pub const DB_REFERENCE_VOLTS: f32 = 0.00226;
}

/// NMEA ingestion configuration
pub mod nmea {
    /// Line buffer capacity. Lines reaching this length are frame-terminated
    /// early and flagged truncated.
    pub const LINE_CAP: usize = 256;

    /// Fix-data sentence prefix (6 characters, first comma-delimited field).
    pub const GGA_PREFIX: &str = "$GPGGA";

    /// Bytes of time-of-day text carried in a fix report (hhmmss.sss)
    pub const TIME_LEN: usize = 10;

    /// Whole-degree digits in a latitude field (ddmm.mmmm)
    pub const LAT_DEGREE_DIGITS: usize = 2;

    /// Whole-degree digits in a longitude field (dddmm.mmmm)
    pub const LON_DEGREE_DIGITS: usize = 3;

    // NMEA 0183 caps sentences at 82 characters; anything shorter than that
    // would truncate well-formed traffic
    const _: () = assert!(LINE_CAP >= 82);
}
