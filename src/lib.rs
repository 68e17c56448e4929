//! Portable core for a microphone noise logger with GPS geolocation.
//!
//! Two independent event-driven pipelines:
//!
//! - [`sampler`]: a periodic timer tick launches a fixed-length ADC batch
//!   transfer; the completion event reduces the batch to a [`sampler::NoiseEstimate`]
//!   (average voltage and decibel level over the valid samples).
//! - [`nmea`]: UART bytes are framed into lines and recognized GGA sentences
//!   are decoded into [`nmea::FixReport`] values in decimal degrees.
//!
//! The core never touches hardware directly. A platform adapter implements
//! the capability traits in [`hal`] and forwards its interrupts to the event
//! handlers; the foreground orchestrator pulls results through the
//! [`latest::Latest`] cells. This keeps every pipeline testable on the host
//! with fake implementations.

#![cfg_attr(not(test), no_std)]
#![warn(
    clippy::cast_lossless,
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss,
    clippy::ptr_as_ptr
)]

pub mod config;
pub mod error;
pub mod hal;
pub mod latest;
pub mod math;
pub mod nmea;
pub mod sampler;
