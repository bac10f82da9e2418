//! The scan cycle controller.
//!
//! One cycle is scan -> enrich -> aggregate -> rank -> render. Cycles run
//! strictly one after another with a fixed delay between the end of one cycle
//! and the start of the next. A failed scan skips rendering and is retried
//! after the normal delay; it never stops the loop.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;

use crate::aggregate::Aggregator;
use crate::config::SurveyConfig;
use crate::domain::EnrichedDetection;
use crate::error::{ControllerError, ProviderResult, ScanError};
use crate::port::ScanProvider;
use crate::rank::rank;
use crate::render::Renderer;

/// Where the controller is in its loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    /// Waiting for the next cycle.
    Idle,
    /// A cycle is in flight.
    Scanning,
}

/// What a single cycle produced.
#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    /// The result was ranked and handed to the renderer.
    Rendered {
        /// 1-based count of successful cycles so far.
        scan_number: u64,
        groups: usize,
        detections: usize,
    },
    /// The provider failed; nothing was rendered.
    Failed(ScanError),
}

/// Counters reported when the loop stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub cycles: u64,
    pub succeeded: u64,
    pub failed: u64,
}

/// Requests that a running controller stop.
///
/// The loop stops between cycles; a scan already in flight is allowed to
/// finish. A request made while the controller is waiting ends the wait.
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl ShutdownHandle {
    pub fn shutdown(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_shutdown(&self) -> bool {
        *self.tx.borrow()
    }
}

/// Owns the scan provider and drives the survey loop.
pub struct ScanController<P: ScanProvider, R: Renderer> {
    /// `None` only while a scan runs on the blocking pool.
    provider: Option<P>,
    renderer: R,
    aggregator: Aggregator,
    interval: Duration,
    state: ControllerState,
    scan_number: u64,
    summary: RunSummary,
    shutdown_tx: Arc<watch::Sender<bool>>,
    shutdown_rx: watch::Receiver<bool>,
}

impl<P: ScanProvider, R: Renderer> ScanController<P, R> {
    pub fn new(provider: P, renderer: R, config: &SurveyConfig) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        Self {
            provider: Some(provider),
            renderer,
            aggregator: Aggregator::new(config.hidden_policy.clone()),
            interval: config.interval(),
            state: ControllerState::Idle,
            scan_number: 0,
            summary: RunSummary::default(),
            shutdown_tx: Arc::new(shutdown_tx),
            shutdown_rx,
        }
    }

    /// A handle that stops [`run`](Self::run) from another task.
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            tx: Arc::clone(&self.shutdown_tx),
        }
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn summary(&self) -> RunSummary {
        self.summary
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn provider(&self) -> Option<&P> {
        self.provider.as_ref()
    }

    /// Run cycles until shut down.
    ///
    /// Provider failures are reported and retried; only a lost provider or a
    /// failed render ends the loop with an error. The provider is closed on
    /// every exit path.
    pub async fn run(&mut self) -> Result<RunSummary, ControllerError> {
        let mut shutdown = self.shutdown_rx.clone();
        tracing::info!(
            interval_ms = self.interval.as_millis() as u64,
            interface = self
                .provider
                .as_ref()
                .map(ScanProvider::interface)
                .unwrap_or_default(),
            "starting scan loop"
        );

        let outcome = loop {
            if *shutdown.borrow_and_update() {
                break Ok(());
            }

            if let Err(e) = self.run_cycle().await {
                break Err(e);
            }

            tokio::select! {
                () = tokio::time::sleep(self.interval) => {}
                _ = shutdown.changed() => {}
            }
        };

        if let Some(provider) = self.provider.as_mut() {
            provider.close();
        }

        let summary = self.summary;
        tracing::info!(
            cycles = summary.cycles,
            succeeded = summary.succeeded,
            failed = summary.failed,
            "scan loop stopped"
        );
        outcome.map(|()| summary)
    }

    /// Run exactly one cycle.
    pub async fn run_cycle(&mut self) -> Result<CycleOutcome, ControllerError> {
        self.state = ControllerState::Scanning;
        let started = Instant::now();

        let Some(mut provider) = self.provider.take() else {
            self.state = ControllerState::Idle;
            let reason = "no provider available".to_owned();
            return Err(ControllerError::ProviderLost(reason));
        };

        // The scan blocks for as long as the driver takes, so it runs on the
        // blocking pool and hands the provider back when done.
        let joined = tokio::task::spawn_blocking(move || {
            let scanned = scan_and_enrich(&mut provider);
            (provider, scanned)
        })
        .await;

        let (provider, scanned) = match joined {
            Ok(pair) => pair,
            Err(e) => {
                self.state = ControllerState::Idle;
                return Err(ControllerError::ProviderLost(e.to_string()));
            }
        };
        self.provider = Some(provider);
        self.summary.cycles += 1;

        let detections = match scanned {
            Ok(detections) => detections,
            Err(err) => {
                self.summary.failed += 1;
                self.state = ControllerState::Idle;
                tracing::warn!(
                    error = %err,
                    "Error scanning networks. Retrying in {} milliseconds.",
                    self.interval.as_millis()
                );
                return Ok(CycleOutcome::Failed(err));
            }
        };

        let result = rank(self.aggregator.aggregate(detections));
        self.scan_number += 1;
        let rendered = self.renderer.render(&result, self.scan_number);
        self.state = ControllerState::Idle;
        rendered?;

        self.summary.succeeded += 1;
        tracing::debug!(
            scan_number = self.scan_number,
            groups = result.groups.len(),
            detections = result.detection_count(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "scan cycle complete"
        );

        Ok(CycleOutcome::Rendered {
            scan_number: self.scan_number,
            groups: result.groups.len(),
            detections: result.detection_count(),
        })
    }
}

/// Scan once and resolve every detection's channel.
///
/// Any channel that cannot be resolved fails the whole scan.
fn scan_and_enrich<P: ScanProvider>(provider: &mut P) -> ProviderResult<Vec<EnrichedDetection>> {
    let detections = provider.scan()?;
    detections
        .into_iter()
        .map(|detection| {
            let channel = provider.frequency_to_channel(detection.frequency_hz)?;
            Ok(EnrichedDetection::new(detection, channel))
        })
        .collect()
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::HiddenNetworkPolicy;
    use crate::domain::{Detection, MacAddress, ScanResult};
    use crate::render::TerminalRenderer;
    use std::collections::VecDeque;
    use std::io;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;

    const UNKNOWN_FREQ_HZ: f64 = 9.9e9;

    struct FakeProvider {
        script: VecDeque<ProviderResult<Vec<Detection>>>,
        /// How long each scan blocks its thread.
        scan_delay: Duration,
        scan_starts: Arc<Mutex<Vec<std::time::Instant>>>,
        scans: Arc<AtomicUsize>,
        closed: Arc<AtomicBool>,
    }

    impl FakeProvider {
        fn new(script: Vec<ProviderResult<Vec<Detection>>>) -> Self {
            Self {
                script: script.into(),
                scan_delay: Duration::ZERO,
                scan_starts: Arc::default(),
                scans: Arc::new(AtomicUsize::new(0)),
                closed: Arc::new(AtomicBool::new(false)),
            }
        }
    }

    impl ScanProvider for FakeProvider {
        fn interface(&self) -> &str {
            "wlan-test"
        }

        fn scan(&mut self) -> ProviderResult<Vec<Detection>> {
            let started = std::time::Instant::now();
            self.scan_starts.lock().unwrap().push(started);
            self.scans.fetch_add(1, Ordering::SeqCst);
            if !self.scan_delay.is_zero() {
                std::thread::sleep(self.scan_delay);
            }
            self.script.pop_front().unwrap_or_else(|| Ok(Vec::new()))
        }

        fn frequency_to_channel(&self, frequency_hz: f64) -> ProviderResult<u16> {
            if frequency_hz == UNKNOWN_FREQ_HZ {
                Err(ScanError::ChannelUnresolved { frequency_hz })
            } else {
                Ok(6)
            }
        }

        fn close(&mut self) {
            self.closed.store(true, Ordering::SeqCst);
        }
    }

    /// Records every render and stops the controller after `stop_after`.
    #[derive(Default)]
    struct RecordingRenderer {
        renders: Arc<Mutex<Vec<(Instant, u64, ScanResult)>>>,
        stop_after: Option<(usize, ShutdownHandle)>,
    }

    impl Renderer for RecordingRenderer {
        fn render(&mut self, result: &ScanResult, scan_number: u64) -> io::Result<()> {
            let mut renders = self.renders.lock().unwrap();
            renders.push((Instant::now(), scan_number, result.clone()));
            if let Some((limit, handle)) = &self.stop_after {
                if renders.len() >= *limit {
                    handle.shutdown();
                }
            }
            Ok(())
        }
    }

    /// Shared sink for captured log output.
    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl LogBuffer {
        fn contents(&self) -> String {
            let bytes = self.0.lock().unwrap();
            String::from_utf8_lossy(&bytes).into_owned()
        }
    }

    type TestController = ScanController<FakeProvider, RecordingRenderer>;

    fn controller(provider: FakeProvider, interval_ms: u64) -> TestController {
        let config = SurveyConfig::builder().interval_ms(interval_ms).build();
        ScanController::new(provider, RecordingRenderer::default(), &config)
    }

    fn detection(ssid: &str, id: u8, power_dbm: i32) -> Detection {
        let mac = MacAddress([0x02, 0, 0, 0, 0, id]);
        Detection::new(mac, ssid, 2.437e9, power_dbm)
    }

    fn busy() -> ScanError {
        ScanError::ScanFailed {
            reason: "Device or resource busy".into(),
        }
    }

    #[tokio::test]
    async fn cycle_groups_and_ranks() {
        let scan = vec![
            detection("A", 1, -40),
            detection("B", 2, -30),
            detection("A", 3, -70),
            detection("", 4, -20),
            detection("A", 5, -55),
        ];
        let mut controller = controller(FakeProvider::new(vec![Ok(scan)]), 1000);

        let outcome = controller.run_cycle().await.unwrap();

        assert_eq!(
            outcome,
            CycleOutcome::Rendered {
                scan_number: 1,
                groups: 2,
                detections: 4,
            }
        );
        assert_eq!(controller.state(), ControllerState::Idle);

        let renders = controller.renderer().renders.lock().unwrap();
        let result = &renders[0].2;
        let names: Vec<&str> = result.groups.iter().map(|g| g.ssid.as_str()).collect();
        assert_eq!(names, ["A", "B"]);

        let group_a = result.group("A").unwrap();
        let powers: Vec<i32> = group_a.detections.iter().map(|d| d.power_dbm()).collect();
        assert_eq!(powers, [-70, -55, -40]);
        assert_eq!(group_a.detections[0].channel(), 6);
        assert!(result.group("").is_none());
    }

    #[tokio::test]
    async fn hidden_policy_comes_from_config() {
        let provider = FakeProvider::new(vec![Ok(vec![detection("", 1, -40)])]);
        let config = SurveyConfig::builder()
            .hidden_policy(HiddenNetworkPolicy::label_default())
            .build();
        let renderer = RecordingRenderer::default();
        let mut controller = ScanController::new(provider, renderer, &config);
        assert_eq!(controller.aggregator.policy(), &config.hidden_policy);

        controller.run_cycle().await.unwrap();

        let renders = controller.renderer().renders.lock().unwrap();
        assert_eq!(renders[0].2.group("HIDDEN").map(|g| g.len()), Some(1));
    }

    #[tokio::test]
    async fn zero_detections_render_header_and_footer_only() {
        let provider = FakeProvider::new(vec![Ok(Vec::new())]);
        let renderer = TerminalRenderer::new(Vec::new(), 1000, false);
        let config = SurveyConfig::default();
        let mut controller = ScanController::new(provider, renderer, &config);

        let outcome = controller.run_cycle().await.unwrap();
        assert_eq!(
            outcome,
            CycleOutcome::Rendered {
                scan_number: 1,
                groups: 0,
                detections: 0,
            }
        );

        let rule = "-".repeat(105);
        let out = String::from_utf8(controller.renderer.into_inner()).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], rule);
        assert!(lines[1].starts_with("SSID"));
        assert_eq!(lines[2], rule);
        assert_eq!(lines[3], rule);
        assert_eq!(lines[4], "Scan number: 1; Scan interval: 1000");
    }

    #[tokio::test]
    async fn provider_failure_renders_nothing() {
        let mut controller = controller(FakeProvider::new(vec![Err(busy())]), 1000);

        let outcome = controller.run_cycle().await.unwrap();

        assert_eq!(outcome, CycleOutcome::Failed(busy()));
        assert_eq!(controller.state(), ControllerState::Idle);
        assert!(controller.provider().is_some());
        assert!(controller.renderer().renders.lock().unwrap().is_empty());
        assert_eq!(
            controller.summary(),
            RunSummary {
                cycles: 1,
                succeeded: 0,
                failed: 1,
            }
        );
    }

    #[tokio::test]
    async fn failed_cycle_logs_retry_diagnostic() {
        let logs = LogBuffer::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let mut controller = controller(FakeProvider::new(vec![Err(busy())]), 1000);
        controller.run_cycle().await.unwrap();

        let logs = logs.contents();
        assert!(logs.contains("WARN"), "{logs}");
        assert!(
            logs.contains("Error scanning networks. Retrying in 1000 milliseconds."),
            "{logs}"
        );
        assert!(logs.contains("Device or resource busy"), "{logs}");
    }

    #[tokio::test]
    async fn unresolved_channel_fails_whole_cycle() {
        let mut unknown = detection("B", 2, -50);
        unknown.frequency_hz = UNKNOWN_FREQ_HZ;
        let scan = vec![detection("A", 1, -40), unknown];
        let mut controller = controller(FakeProvider::new(vec![Ok(scan)]), 1000);

        let outcome = controller.run_cycle().await.unwrap();

        assert!(matches!(
            outcome,
            CycleOutcome::Failed(ScanError::ChannelUnresolved { .. })
        ));
        assert!(controller.renderer().renders.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn scan_numbers_count_successes_only() {
        let provider = FakeProvider::new(vec![Ok(Vec::new()), Err(busy()), Ok(Vec::new())]);
        let mut controller = controller(provider, 1000);

        for _ in 0..3 {
            controller.run_cycle().await.unwrap();
        }

        let renders = controller.renderer().renders.lock().unwrap();
        let numbers: Vec<u64> = renders.iter().map(|r| r.1).collect();
        assert_eq!(numbers, [1, 2]);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_cycle_retries_after_interval() {
        let interval = Duration::from_millis(1000);
        let provider = FakeProvider::new(vec![Ok(Vec::new()), Err(busy()), Ok(Vec::new())]);
        let scans = Arc::clone(&provider.scans);
        let closed = Arc::clone(&provider.closed);

        let mut controller = controller(provider, 1000);
        controller.renderer.stop_after = Some((2, controller.shutdown_handle()));

        let start = Instant::now();
        let summary = controller.run().await.unwrap();

        assert_eq!(
            summary,
            RunSummary {
                cycles: 3,
                succeeded: 2,
                failed: 1,
            }
        );
        assert_eq!(scans.load(Ordering::SeqCst), 3);
        assert!(closed.load(Ordering::SeqCst));

        // success, wait, failure, wait, success: two fixed delays apart.
        let renders = controller.renderer().renders.lock().unwrap();
        assert_eq!(renders[0].0 - start, Duration::ZERO);
        assert_eq!(renders[1].0 - renders[0].0, interval * 2);
        assert_eq!(start.elapsed(), interval * 2);
    }

    #[tokio::test]
    async fn delay_counts_from_end_of_previous_cycle() {
        let mut provider = FakeProvider::new(Vec::new());
        provider.scan_delay = Duration::from_millis(80);
        let starts = Arc::clone(&provider.scan_starts);

        let mut controller = controller(provider, 100);
        controller.renderer.stop_after = Some((3, controller.shutdown_handle()));
        controller.run().await.unwrap();

        // 80 ms of scanning plus the full 100 ms wait between starts.
        let starts = starts.lock().unwrap();
        assert_eq!(starts.len(), 3);
        for pair in starts.windows(2) {
            let gap = pair[1] - pair[0];
            assert!(gap >= Duration::from_millis(180), "scans {gap:?} apart");
        }
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_during_wait_ends_wait_early() {
        let provider = FakeProvider::new(vec![Ok(Vec::new())]);
        let closed = Arc::clone(&provider.closed);
        let mut controller = controller(provider, 60_000);
        let handle = controller.shutdown_handle();

        let start = Instant::now();
        let stopper = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            handle.shutdown();
        });
        let summary = controller.run().await.unwrap();
        stopper.await.unwrap();

        assert_eq!(summary.cycles, 1);
        assert!(start.elapsed() < Duration::from_secs(60));
        assert!(closed.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn shutdown_before_start_runs_no_cycle() {
        let provider = FakeProvider::new(Vec::new());
        let scans = Arc::clone(&provider.scans);
        let mut controller = controller(provider, 1000);
        let handle = controller.shutdown_handle();
        handle.shutdown();
        assert!(handle.is_shutdown());

        let summary = controller.run().await.unwrap();

        assert_eq!(summary, RunSummary::default());
        assert_eq!(scans.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn render_failure_stops_the_loop() {
        struct BrokenPipe;
        impl Renderer for BrokenPipe {
            fn render(&mut self, _: &ScanResult, _: u64) -> io::Result<()> {
                Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
            }
        }

        let provider = FakeProvider::new(vec![Ok(Vec::new())]);
        let closed = Arc::clone(&provider.closed);
        let config = SurveyConfig::default();
        let mut controller = ScanController::new(provider, BrokenPipe, &config);

        let err = controller.run().await.unwrap_err();

        assert!(matches!(err, ControllerError::Render(_)));
        assert_eq!(controller.state(), ControllerState::Idle);
        assert!(closed.load(Ordering::SeqCst));
    }
}
