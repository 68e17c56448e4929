//! End-to-end exercise of both pipelines against scripted fake hardware,
//! the way a platform adapter would drive them: configure, then replay the
//! interrupt sequence and read results through the pull accessors.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use fugit::ExtU32;
use noisefix::config;
use noisefix::error::SampleError;
use noisefix::hal::{AnalogSource, BatchTransferEngine, ByteStream, IntervalTimer};
use noisefix::latest::Latest;
use noisefix::nmea::{FixReport, LineOutcome, SentenceReader};
use noisefix::sampler::{NoiseEstimate, Sampler};

/// Fake ADC: records the programmed divisor and run state.
#[derive(Default)]
struct FakeAdc {
    divisor: u32,
    running: bool,
}

/// Fake DMA channel: `launch` copies from a scripted sample source; the
/// test flips `busy` to model transfer latency.
#[derive(Default)]
struct FakeDma {
    busy: bool,
    source: std::vec::Vec<u16>,
    batch: std::vec::Vec<u16>,
}

/// Fake PWM-as-interval-timer: 262 ms maximum period like the original
/// part's wrap counter at its prescale.
#[derive(Default)]
struct FakeTimer {
    period_ms: u32,
    running: bool,
}

/// Shared handle so the test can poke fake state the sampler owns.
struct Shared<T>(Rc<RefCell<T>>);

impl<T> Shared<T> {
    fn new(inner: T) -> Self {
        Self(Rc::new(RefCell::new(inner)))
    }
    fn handle(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

impl AnalogSource for Shared<FakeAdc> {
    fn clock_hz(&self) -> u32 {
        48_000_000
    }
    fn set_clock_divisor(&mut self, divisor: u32) {
        self.0.borrow_mut().divisor = divisor;
    }
    fn run(&mut self, enabled: bool) {
        self.0.borrow_mut().running = enabled;
    }
}

impl BatchTransferEngine for Shared<FakeDma> {
    fn is_busy(&self) -> bool {
        self.0.borrow().busy
    }
    fn launch(&mut self, len: usize) {
        let mut dma = self.0.borrow_mut();
        dma.busy = true;
        let batch = dma.source[..len].to_vec();
        dma.batch = batch;
    }
    fn with_completed<R>(&mut self, f: impl FnOnce(&[u16]) -> R) -> R {
        f(&self.0.borrow().batch)
    }
}

impl IntervalTimer for Shared<FakeTimer> {
    fn max_period(&self) -> fugit::MillisDurationU32 {
        262.millis()
    }
    fn set_period(&mut self, period: fugit::MillisDurationU32) {
        self.0.borrow_mut().period_ms = period.to_millis();
    }
    fn run(&mut self, enabled: bool) {
        self.0.borrow_mut().running = enabled;
    }
}

/// Fake UART receive side fed from a byte queue.
struct FakeUart {
    rx: VecDeque<u8>,
}

impl FakeUart {
    fn new() -> Self {
        Self {
            rx: VecDeque::new(),
        }
    }
    fn receive(&mut self, bytes: &[u8]) {
        self.rx.extend(bytes);
    }
}

impl ByteStream for FakeUart {
    fn read_byte(&mut self) -> Option<u8> {
        self.rx.pop_front()
    }
}

#[test]
fn measurement_cycle_produces_estimates_in_order() {
    static ESTIMATE: Latest<NoiseEstimate> = Latest::new();

    let adc = Shared::new(FakeAdc::default());
    let dma = Shared::new(FakeDma::default());
    let timer = Shared::new(FakeTimer::default());
    let (adc_h, dma_h, timer_h) = (adc.handle(), dma.handle(), timer.handle());

    let mut sampler = Sampler::new(adc, dma, timer, &ESTIMATE);
    sampler.configure(100_000, 100, 250.millis()).unwrap();

    // 48 MHz conversion clock divided down to the requested rate
    assert_eq!(adc_h.0.borrow().divisor, 480);
    assert_eq!(timer_h.0.borrow().period_ms, 250);
    assert!(!timer_h.0.borrow().running);

    sampler.start();
    assert!(timer_h.0.borrow().running);

    // first interval: a quiet batch
    dma_h.0.borrow_mut().source = vec![100; 100];
    sampler.on_interval_elapsed().unwrap();
    assert!(adc_h.0.borrow().running);

    dma_h.0.borrow_mut().busy = false;
    let quiet = sampler.on_batch_complete().unwrap();
    assert!(!adc_h.0.borrow().running);

    // second interval: a loud batch supersedes the first estimate
    dma_h.0.borrow_mut().source = vec![2000; 100];
    sampler.on_interval_elapsed().unwrap();
    dma_h.0.borrow_mut().busy = false;
    let loud = sampler.on_batch_complete().unwrap();

    assert!(loud.average_db > quiet.average_db);
    assert_eq!(sampler.latest_estimate(), Some(loud));

    let expected_volts = 2000.0 * config::adc::VOLTS_PER_COUNT;
    assert!((loud.average_volts - expected_volts).abs() < 1e-5);
    let expected_db = 20.0 * (expected_volts / config::noise::DB_REFERENCE_VOLTS).log10();
    assert!((loud.average_db - expected_db).abs() < 1e-3);
}

#[test]
fn slow_transfer_drops_ticks_without_double_triggering() {
    static ESTIMATE: Latest<NoiseEstimate> = Latest::new();

    let adc = Shared::new(FakeAdc::default());
    let dma = Shared::new(FakeDma::default());
    let timer = Shared::new(FakeTimer::default());
    let dma_h = dma.handle();

    let mut sampler = Sampler::new(adc, dma, timer, &ESTIMATE);
    sampler.configure(100_000, 50, 250.millis()).unwrap();
    sampler.start();

    dma_h.0.borrow_mut().source = vec![500; 50];
    sampler.on_interval_elapsed().unwrap();

    // transfer still in flight across two more ticks
    assert_eq!(sampler.on_interval_elapsed(), Err(SampleError::Overrun));
    assert_eq!(sampler.on_interval_elapsed(), Err(SampleError::Overrun));
    assert_eq!(sampler.overrun_count(), 2);

    // once it drains, the cycle resumes and the batch is intact
    dma_h.0.borrow_mut().busy = false;
    let estimate = sampler.on_batch_complete().unwrap();
    assert_eq!(estimate.invalid_samples, 0);
    assert_eq!(sampler.latest_estimate(), Some(estimate));
}

#[test]
fn all_invalid_batch_publishes_nothing() {
    static ESTIMATE: Latest<NoiseEstimate> = Latest::new();

    let adc = Shared::new(FakeAdc::default());
    let dma = Shared::new(FakeDma::default());
    let timer = Shared::new(FakeTimer::default());
    let dma_h = dma.handle();

    let mut sampler = Sampler::new(adc, dma, timer, &ESTIMATE);
    sampler.configure(100_000, 100, 250.millis()).unwrap();
    sampler.start();

    dma_h.0.borrow_mut().source = vec![config::adc::INVALID_BIT; 100];
    sampler.on_interval_elapsed().unwrap();
    dma_h.0.borrow_mut().busy = false;

    assert_eq!(
        sampler.on_batch_complete(),
        Err(SampleError::AllSamplesInvalid)
    );
    assert_eq!(sampler.latest_estimate(), None);
}

#[test]
fn fix_assembles_across_split_uart_reads() {
    static FIX: Latest<FixReport> = Latest::new();

    let mut uart = FakeUart::new();
    let mut reader = SentenceReader::new(&FIX);

    // a burst ending mid-sentence
    uart.receive(b"$GPRMC,123519,A,4807.038,N,01131.000,E\r\n$GPGGA,123519,4807.038");
    let done = reader.poll(&mut uart).unwrap();
    assert_eq!(done.outcome, Ok(LineOutcome::NotRecognized));
    // the GGA sentence is incomplete, nothing more frames yet
    assert_eq!(reader.poll(&mut uart), None);
    assert_eq!(reader.latest_fix(), None);

    // the rest of the sentence arrives
    uart.receive(b",N,01131.000,E,1,08,0.9,545.4,M,46.9,M\r\n");
    let done = reader.poll(&mut uart).unwrap();
    assert!(matches!(done.outcome, Ok(LineOutcome::Fix(_))));

    let fix = reader.latest_fix().unwrap();
    assert_eq!(fix.fix_quality, 1);
    assert_eq!(fix.satellites, 8);
    assert!((fix.latitude_deg - 48.1173).abs() < 1e-4);
    assert!((fix.longitude_deg - 11.5167).abs() < 1e-4);
}

#[test]
fn later_fix_supersedes_earlier_one() {
    static FIX: Latest<FixReport> = Latest::new();

    let mut uart = FakeUart::new();
    let mut reader = SentenceReader::new(&FIX);

    uart.receive(b"$GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M\n");
    uart.receive(b"$GPGGA,123520,4807.038,S,01131.000,W,2,09,0.8,545.0,M,46.9,M\n");
    while reader.poll(&mut uart).is_some() {}

    let fix = reader.latest_fix().unwrap();
    assert_eq!(fix.time_of_day.as_str(), "123520");
    assert_eq!(fix.fix_quality, 2);
    assert!(fix.latitude_deg < 0.0);
    assert!(fix.longitude_deg < 0.0);
}
