//! NMEA byte-stream framing and GGA fix decoding.
//!
//! [`SentenceReader::feed`] accumulates UART bytes into a line buffer and
//! frames a line on newline or on a full buffer (truncation is recoverable:
//! the clipped line is still attempted). Framed lines go through
//! [`parse_line`], which distinguishes three outcomes the orchestrator
//! cares about: not a fix sentence at all, a fix sentence reporting no
//! solution, and a usable fix.

use crate::config;
use crate::error::NmeaError;
use crate::hal::ByteStream;
use crate::latest::Latest;
use heapless::{String, Vec};

/// One decoded position fix. Superseded by the next recognized sentence;
/// the core keeps no history.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FixReport {
    /// UTC time-of-day text as transmitted (hhmmss\[.sss\]).
    pub time_of_day: String<{ config::nmea::TIME_LEN }>,
    /// Decimal degrees, south negative.
    pub latitude_deg: f64,
    /// Decimal degrees, west negative.
    pub longitude_deg: f64,
    /// 0 = no fix; positive values identify the positioning method.
    /// Always positive here, since quality-0 sentences decode to
    /// [`LineOutcome::NoFix`].
    pub fix_quality: u8,
    pub satellites: u8,
    pub horizontal_dilution: f32,
    pub altitude_m: f32,
    pub geoid_separation_m: f32,
}

/// Decode result for one framed line.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LineOutcome {
    /// Not a fix-data sentence.
    NotRecognized,
    /// A fix-data sentence reporting no valid solution.
    NoFix,
    /// A valid fix, already published for the orchestrator.
    Fix(FixReport),
}

/// A framed line, handed out by [`SentenceReader::feed`].
#[derive(Debug, Clone, PartialEq)]
pub struct CompletedLine {
    pub outcome: Result<LineOutcome, NmeaError>,
    /// The line hit the buffer capacity and was frame-terminated early.
    pub truncated: bool,
}

/// The sentence-reading pipeline. Fed one byte per UART event; publishes
/// fixes into a shared [`Latest`] cell read by the foreground orchestrator.
pub struct SentenceReader {
    line: Vec<u8, { config::nmea::LINE_CAP }>,
    truncated_lines: u32,
    fix: &'static Latest<FixReport>,
}

impl SentenceReader {
    pub fn new(fix: &'static Latest<FixReport>) -> Self {
        Self {
            line: Vec::new(),
            truncated_lines: 0,
            fix,
        }
    }

    /// Byte-arrival event: accumulate one byte.
    ///
    /// Returns the framed line when `byte` terminates one (newline, or a
    /// byte that no longer fits the buffer), `None` otherwise. The buffer
    /// resets for the next line regardless of the outcome; after a
    /// truncation the remainder of the logical line frames as a line of
    /// its own, which simply decodes as unrecognized.
    pub fn feed(&mut self, byte: u8) -> Option<CompletedLine> {
        if byte == b'\n' {
            return Some(self.complete(false));
        }
        if self.line.push(byte).is_err() {
            self.truncated_lines = self.truncated_lines.wrapping_add(1);
            log::warn!("NMEA line truncated at {} bytes", self.line.len());
            return Some(self.complete(true));
        }
        None
    }

    /// Drain ready bytes from `stream` until a line completes or the
    /// stream runs dry.
    pub fn poll<S: ByteStream>(&mut self, stream: &mut S) -> Option<CompletedLine> {
        while let Some(byte) = stream.read_byte() {
            if let Some(done) = self.feed(byte) {
                return Some(done);
            }
        }
        None
    }

    /// Lines frame-terminated early because they hit the buffer capacity.
    pub fn truncated_line_count(&self) -> u32 {
        self.truncated_lines
    }

    /// Most recently published fix, if any.
    pub fn latest_fix(&self) -> Option<FixReport> {
        self.fix.get()
    }

    fn complete(&mut self, truncated: bool) -> CompletedLine {
        let outcome = match core::str::from_utf8(&self.line) {
            Ok(text) => parse_line(text),
            Err(_) => Ok(LineOutcome::NotRecognized),
        };
        if let Ok(LineOutcome::Fix(report)) = &outcome {
            self.fix.publish(report.clone());
        }
        self.line.clear();
        CompletedLine { outcome, truncated }
    }
}

/// Decode one complete line.
///
/// Anything without the [`config::nmea::GGA_PREFIX`] first field is
/// `NotRecognized`. Recognized sentences with quality 0 are `NoFix`;
/// their coordinate fields (typically empty) are not touched. Numeric
/// fields other than the coordinates are permissive: a field that fails to
/// parse reads as zero and decoding continues.
pub fn parse_line(line: &str) -> Result<LineOutcome, NmeaError> {
    let line = line.trim_end_matches('\r');
    // the checksum is not verified; split it off so the last field parses
    let line = match line.split_once('*') {
        Some((body, _checksum)) => body,
        None => line,
    };

    let mut fields = line.split(',');
    if fields.next() != Some(config::nmea::GGA_PREFIX) {
        return Ok(LineOutcome::NotRecognized);
    }

    let time = fields.next().unwrap_or("");
    let lat = fields.next().unwrap_or("");
    let ns = fields.next().unwrap_or("");
    let lon = fields.next().unwrap_or("");
    let ew = fields.next().unwrap_or("");
    let fix_quality: u8 = lenient(fields.next());
    let satellites: u8 = lenient(fields.next());
    let horizontal_dilution: f32 = lenient(fields.next());
    let altitude_m: f32 = lenient(fields.next());
    let _altitude_unit = fields.next();
    let geoid_separation_m: f32 = lenient(fields.next());

    if fix_quality == 0 {
        return Ok(LineOutcome::NoFix);
    }

    let latitude_deg = decimal_degrees(lat, first_char(ns)?)?;
    let longitude_deg = decimal_degrees(lon, first_char(ew)?)?;

    let mut time_of_day = String::new();
    let clipped = time.get(..config::nmea::TIME_LEN.min(time.len())).unwrap_or("");
    // cannot fail: clipped to the string's capacity
    let _ = time_of_day.push_str(clipped);

    Ok(LineOutcome::Fix(FixReport {
        time_of_day,
        latitude_deg,
        longitude_deg,
        fix_quality,
        satellites,
        horizontal_dilution,
        altitude_m,
        geoid_separation_m,
    }))
}

/// Convert a degrees-and-minutes NMEA field to signed decimal degrees.
///
/// The first 2 (N/S) or 3 (E/W) characters are whole degrees, the rest is
/// minutes: `"4807.038", 'N'` is 48 + 7.038/60 degrees. Short, non-numeric
/// or non-ASCII input is rejected up front instead of sliced blindly.
pub fn decimal_degrees(text: &str, hemisphere: char) -> Result<f64, NmeaError> {
    let degree_digits = match hemisphere {
        'N' | 'S' => config::nmea::LAT_DEGREE_DIGITS,
        'E' | 'W' => config::nmea::LON_DEGREE_DIGITS,
        _ => return Err(NmeaError::MalformedCoordinate),
    };
    if !text.is_ascii() || text.len() < degree_digits {
        return Err(NmeaError::MalformedCoordinate);
    }

    let (whole, minutes) = text.split_at(degree_digits);
    let whole: u32 = whole.parse().map_err(|_| NmeaError::MalformedCoordinate)?;
    let minutes: f64 = if minutes.is_empty() {
        0.0
    } else {
        minutes.parse().map_err(|_| NmeaError::MalformedCoordinate)?
    };

    let decimal = f64::from(whole) + minutes / 60.0;
    Ok(match hemisphere {
        'S' | 'W' => -decimal,
        _ => decimal,
    })
}

/// Permissive numeric field: missing or unparseable text reads as zero.
fn lenient<T: core::str::FromStr + Default>(field: Option<&str>) -> T {
    field.and_then(|text| text.trim().parse().ok()).unwrap_or_default()
}

fn first_char(field: &str) -> Result<char, NmeaError> {
    field.chars().next().ok_or(NmeaError::MalformedCoordinate)
}
