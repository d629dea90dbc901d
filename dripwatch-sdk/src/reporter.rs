//! The Reporter type for periodically publishing infusion status.

use std::sync::Arc;
use std::time::Duration;

use dripwatch_types::Status;

use crate::clock::{Clock, SystemClock};
use crate::output::Output;
use crate::session::Session;

/// Periodically computes the status of a [`Session`] and emits it to outputs.
///
/// The reporter plays the part of the status poller: it reads the clock,
/// asks the session for its status and hands the result to every output.
///
/// # Example
///
/// ```rust,no_run
/// use dripwatch_sdk::{Calibration, Output, Reporter, Session, SystemClock, Clock};
/// use std::time::Duration;
///
/// #[tokio::main]
/// async fn main() {
///     let session = Session::with_calibration(Calibration::default());
///
///     let reporter = Reporter::builder()
///         .output(Output::file("status.json"))
///         .interval(Duration::from_secs(1))
///         .build(session.clone());
///
///     // Start background emission
///     let handle = reporter.start();
///
///     // Record drips as the sensor reports them
///     session.record_drip(SystemClock.now()).unwrap();
///
///     tokio::time::sleep(Duration::from_secs(5)).await;
///     handle.stop();
/// }
/// ```
#[derive(Debug)]
pub struct Reporter {
    session: Session,
    clock: Arc<dyn Clock>,
    outputs: Arc<Vec<Output>>,
    interval: Duration,
}

impl Reporter {
    /// Create a reporter with default settings: no outputs, a one second
    /// interval and the system clock.
    pub fn new(session: Session) -> Self {
        ReporterBuilder::new().build(session)
    }

    /// Create a builder for configuring the reporter.
    pub fn builder() -> ReporterBuilder {
        ReporterBuilder::new()
    }

    /// The session being reported on.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Compute the status right now.
    ///
    /// Useful if you want to emit status manually rather than using the
    /// background emission.
    pub fn collect(&self) -> Status {
        self.session.status(self.clock.now())
    }

    /// Start background emission of status reports.
    ///
    /// This spawns a tokio task that reports once per interval, starting
    /// immediately. Returns a handle that can be used to stop the emission.
    #[cfg(feature = "tokio")]
    pub fn start(&self) -> EmissionHandle {
        use tokio::sync::watch;

        let (stop_tx, stop_rx) = watch::channel(false);
        let session = self.session.clone();
        let clock = self.clock.clone();
        let outputs = self.outputs.clone();
        let interval = self.interval;

        tokio::spawn(async move {
            let mut interval_timer = tokio::time::interval(interval);
            let mut stop_rx = stop_rx;

            loop {
                tokio::select! {
                    _ = interval_timer.tick() => {
                        let status = session.status(clock.now());
                        emit_all(&outputs, &status).await;
                    }
                    changed = stop_rx.changed() => {
                        // Sender dropped or stop requested
                        if changed.is_err() || *stop_rx.borrow() {
                            break;
                        }
                    }
                }
            }
        });

        EmissionHandle { stop_tx }
    }

    /// Emit the current status to all outputs immediately.
    #[cfg(feature = "tokio")]
    pub async fn emit_now(&self) -> Status {
        let status = self.collect();
        emit_all(&self.outputs, &status).await;
        status
    }
}

#[cfg(feature = "tokio")]
async fn emit_all(outputs: &[Output], status: &Status) {
    for output in outputs {
        if let Err(e) = output.emit(status).await {
            tracing::warn!(output = %output.describe(), error = %e, "Failed to emit status");
        }
    }
}

/// Builder for configuring a Reporter.
#[derive(Debug, Default)]
pub struct ReporterBuilder {
    outputs: Vec<Output>,
    interval: Option<Duration>,
    clock: Option<Arc<dyn Clock>>,
}

impl ReporterBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an output destination.
    ///
    /// Multiple outputs can be added; each report is emitted to all of them.
    pub fn output(mut self, output: Output) -> Self {
        self.outputs.push(output);
        self
    }

    /// Set the emission interval.
    ///
    /// Defaults to 1 second if not specified.
    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = Some(interval);
        self
    }

    /// Set the clock used to timestamp status queries.
    ///
    /// Must be the same time base the drips are recorded with. Defaults to
    /// [`SystemClock`].
    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Some(Arc::new(clock));
        self
    }

    /// Build the reporter for `session`.
    pub fn build(self, session: Session) -> Reporter {
        Reporter {
            session,
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            outputs: Arc::new(self.outputs),
            interval: self.interval.unwrap_or(Duration::from_secs(1)),
        }
    }
}

/// Handle for controlling background emission.
///
/// Drop this handle to stop emission, or call `stop()` explicitly.
#[cfg(feature = "tokio")]
#[derive(Debug)]
pub struct EmissionHandle {
    stop_tx: tokio::sync::watch::Sender<bool>,
}

#[cfg(feature = "tokio")]
impl EmissionHandle {
    /// Stop background emission.
    pub fn stop(self) {
        let _ = self.stop_tx.send(true);
    }
}

#[cfg(all(test, feature = "tokio"))]
mod tests {
    use super::*;
    use crate::calibration::Calibration;
    use crate::clock::ManualClock;
    use dripwatch_types::Timestamp;

    #[test]
    fn default_interval_is_one_second() {
        let reporter = Reporter::new(Session::new());
        assert_eq!(reporter.interval, Duration::from_secs(1));
        assert!(reporter.outputs.is_empty());
    }

    #[test]
    fn builder_sets_interval_and_outputs() {
        let reporter = Reporter::builder()
            .output(Output::file("status1.json"))
            .output(Output::tcp("localhost:9090"))
            .interval(Duration::from_millis(250))
            .build(Session::new());

        assert_eq!(reporter.interval, Duration::from_millis(250));
        assert_eq!(reporter.outputs.len(), 2);
    }

    #[test]
    fn collect_uses_configured_clock() {
        let clock = ManualClock::new(Timestamp::from_secs(0));
        let session = Session::with_calibration(Calibration::default());
        let reporter = Reporter::builder().clock(clock.clone()).build(session.clone());

        assert_eq!(reporter.collect(), Status::Waiting);

        session.record_drip(clock.now()).unwrap();
        clock.advance(Duration::from_secs(90));

        let status = reporter.collect();
        assert_eq!(status.stats().unwrap().time_elapsed_minutes, 1.5);
    }

    #[test]
    fn collect_on_unconfigured_session() {
        let reporter = Reporter::new(Session::new());
        assert_eq!(reporter.collect(), Status::NotConfigured);
    }

    #[test]
    fn collect_follows_reset() {
        let session = Session::with_calibration(Calibration::default());
        let reporter = Reporter::new(session.clone());
        assert!(reporter.session().is_configured());

        session.reset();
        assert_eq!(reporter.collect(), Status::NotConfigured);
    }

    #[tokio::test]
    async fn emit_now_sends_to_every_output() {
        let (first, mut rx1) = Output::channel(4);
        let (second, mut rx2) = Output::channel(4);
        let reporter = Reporter::builder()
            .output(first)
            .output(second)
            .clock(ManualClock::default())
            .build(Session::with_calibration(Calibration::default()));

        let status = reporter.emit_now().await;
        assert_eq!(status, Status::Waiting);
        assert_eq!(rx1.recv().await, Some(Status::Waiting));
        assert_eq!(rx2.recv().await, Some(Status::Waiting));
    }

    #[tokio::test]
    async fn failing_output_does_not_block_others() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let dead_addr = listener.local_addr().unwrap().to_string();
        drop(listener);

        let (channel, mut rx) = Output::channel(4);
        let reporter = Reporter::builder()
            .output(Output::tcp(dead_addr))
            .output(channel)
            .build(Session::new());

        reporter.emit_now().await;
        assert_eq!(rx.recv().await, Some(Status::NotConfigured));
    }

    #[tokio::test(start_paused = true)]
    async fn background_emission_reports_each_interval() {
        let clock = ManualClock::default();
        let session = Session::with_calibration(Calibration::default());
        let (output, mut rx) = Output::channel(16);

        let reporter = Reporter::builder()
            .output(output)
            .interval(Duration::from_secs(1))
            .clock(clock.clone())
            .build(session.clone());

        let handle = reporter.start();

        // First tick fires immediately
        assert_eq!(rx.recv().await, Some(Status::Waiting));

        session.record_drip(clock.now()).unwrap();
        let status = rx.recv().await.unwrap();
        assert_eq!(status.stats().unwrap().total_drips, 1);

        handle.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn stop_ends_emission() {
        let (output, mut rx) = Output::channel(16);
        let reporter = Reporter::builder()
            .output(output)
            .interval(Duration::from_millis(100))
            .build(Session::new());

        let handle = reporter.start();
        assert!(rx.recv().await.is_some());

        handle.stop();
        // The task exits and drops its outputs, closing the channel
        drop(reporter);
        while rx.recv().await.is_some() {}
        assert!(rx.recv().await.is_none());
    }
}
