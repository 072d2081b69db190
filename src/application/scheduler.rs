use crate::application::dto::AuditRequest;
use crate::application::use_cases::AuditCredentialsUseCase;
use crate::application::Notifier;
use crate::credential_audit::domain::{ApplicationView, ThresholdSet};
use crate::ports::inbound::{CredentialAuditPort, RunOutcome, ServiceReport};
use crate::ports::outbound::DirectoryRepository;
use crate::shared::{AuditError, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveTime, Timelike, Utc};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;
use tracing::Instrument;
use uuid::Uuid;

/// Wall-clock time (UTC) of the daily check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailySchedule {
    time: NaiveTime,
}

impl DailySchedule {
    pub fn new(hour: u32, minute: u32) -> std::result::Result<Self, String> {
        NaiveTime::from_hms_opt(hour, minute, 0)
            .map(|time| Self { time })
            .ok_or_else(|| format!("{:02}:{:02} is not a time of day", hour, minute))
    }

    /// Parses `HH:MM` (24-hour)
    pub fn parse(input: &str) -> std::result::Result<Self, String> {
        let (hour, minute) = input
            .trim()
            .split_once(':')
            .ok_or_else(|| "expected HH:MM".to_string())?;
        let hour = hour
            .parse::<u32>()
            .map_err(|_| format!("'{}' is not an hour", hour))?;
        let minute = minute
            .parse::<u32>()
            .map_err(|_| format!("'{}' is not a minute", minute))?;
        Self::new(hour, minute)
    }

    /// First fire instant strictly after `now`
    pub fn next_after(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let today = now.date_naive().and_time(self.time).and_utc();
        if today > now {
            today
        } else {
            today + chrono::Duration::days(1)
        }
    }
}

impl Default for DailySchedule {
    fn default() -> Self {
        Self {
            time: NaiveTime::from_hms_opt(9, 0, 0).unwrap_or_default(),
        }
    }
}

impl fmt::Display for DailySchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02} UTC", self.time.hour(), self.time.minute())
    }
}

/// What started a run; recorded on the run's span
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunTrigger {
    Schedule,
    Manual,
    Cli,
}

impl fmt::Display for RunTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunTrigger::Schedule => write!(f, "schedule"),
            RunTrigger::Manual => write!(f, "manual"),
            RunTrigger::Cli => write!(f, "cli"),
        }
    }
}

/// Marks the scheduler busy for as long as it is alive
struct RunGuard<'a> {
    running: &'a AtomicBool,
}

impl<'a> RunGuard<'a> {
    fn acquire(running: &'a AtomicBool) -> Option<Self> {
        running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { running })
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Release);
    }
}

/// The pipeline a run executes, shared with the tasks that run it
struct Pipeline<D> {
    use_case: AuditCredentialsUseCase<D>,
    notifier: Notifier,
    thresholds: ThresholdSet,
    running: AtomicBool,
}

impl<D> Pipeline<D>
where
    D: DirectoryRepository + 'static,
{
    async fn run(&self, trigger: RunTrigger) -> RunOutcome {
        let Some(_guard) = RunGuard::acquire(&self.running) else {
            tracing::warn!(%trigger, "credential check already running, trigger skipped");
            return RunOutcome::Skipped;
        };

        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("credential_check", %run_id, %trigger);

        async {
            tracing::info!("credential check started");
            match self.run_body().await {
                Ok(outcome) => outcome,
                Err(e) => {
                    let kind = e
                        .downcast_ref::<AuditError>()
                        .map(AuditError::kind)
                        .unwrap_or("internal");
                    tracing::error!(kind, error = %e, "credential check failed");
                    RunOutcome::Failed {
                        error: e.to_string(),
                    }
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn run_body(&self) -> Result<RunOutcome> {
        let report = self
            .use_case
            .execute(AuditRequest::new(self.thresholds.clone()))
            .await?;

        let items = report.notification_items();
        self.notifier.notify(&items).await?;

        Ok(RunOutcome::Completed {
            applications_scanned: report.applications_scanned,
            applications_flagged: report.flagged.len(),
            notified: report.has_findings(),
        })
    }
}

/// CredentialScheduler - drives the audit daily and on demand.
///
/// At most one run is in flight; a trigger arriving meanwhile is skipped.
/// Failures inside a run are logged and reported as [`RunOutcome::Failed`]
/// and never stop later runs. Every run executes on its own task, so neither
/// stopping the timer nor dropping the caller's future cancels a run midway.
pub struct CredentialScheduler<D> {
    pipeline: Arc<Pipeline<D>>,
    schedule: DailySchedule,
    timer: Mutex<Option<JoinHandle<()>>>,
}

impl<D> CredentialScheduler<D>
where
    D: DirectoryRepository + 'static,
{
    pub fn new(
        use_case: AuditCredentialsUseCase<D>,
        notifier: Notifier,
        thresholds: ThresholdSet,
        schedule: DailySchedule,
    ) -> Self {
        Self {
            pipeline: Arc::new(Pipeline {
                use_case,
                notifier,
                thresholds,
                running: AtomicBool::new(false),
            }),
            schedule,
            timer: Mutex::new(None),
        }
    }

    /// Starts the daily timer. Calling it again while started does nothing.
    pub fn start(&self) {
        let mut timer = self.timer.lock().unwrap_or_else(|e| e.into_inner());
        if timer.is_some() {
            return;
        }

        let pipeline = Arc::clone(&self.pipeline);
        *timer = Some(tokio::spawn(timer_loop(pipeline, self.schedule)));
        tracing::info!(schedule = %self.schedule, "scheduler started");
    }

    /// Cancels the timer; an in-flight run is left to finish
    pub fn stop_scheduler(&self) {
        let handle = self
            .timer
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        if let Some(handle) = handle {
            handle.abort();
            tracing::info!("scheduler stopped");
        }
    }

    pub fn is_scheduled(&self) -> bool {
        self.timer
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
    }

    pub fn is_running(&self) -> bool {
        self.pipeline.running.load(Ordering::Acquire)
    }

    /// Runs the pipeline once unless a run is already in progress.
    ///
    /// The run is detached from the caller: if this future is dropped the
    /// run still goes to completion or failure.
    pub async fn run(&self, trigger: RunTrigger) -> RunOutcome {
        let pipeline = Arc::clone(&self.pipeline);
        let handle = tokio::spawn(async move { pipeline.run(trigger).await });

        match handle.await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(%trigger, error = %e, "credential check task ended abnormally");
                RunOutcome::Failed {
                    error: format!("credential check task ended abnormally: {}", e),
                }
            }
        }
    }
}

async fn timer_loop<D>(pipeline: Arc<Pipeline<D>>, schedule: DailySchedule)
where
    D: DirectoryRepository + 'static,
{
    loop {
        let now = Utc::now();
        let next = schedule.next_after(now);
        let wait = (next - now).to_std().unwrap_or_default();
        tracing::debug!(next_run = %next, "waiting for next scheduled check");

        tokio::time::sleep(wait).await;

        // detached so stopping the timer never cancels a run
        let pipeline = Arc::clone(&pipeline);
        tokio::spawn(async move {
            pipeline.run(RunTrigger::Schedule).await;
        });
    }
}

#[async_trait]
impl<D> CredentialAuditPort for CredentialScheduler<D>
where
    D: DirectoryRepository + 'static,
{
    async fn list_applications(&self) -> Result<Vec<ApplicationView>> {
        self.pipeline.use_case.list_applications(Utc::now()).await
    }

    async fn list_expiring(&self, thresholds: &ThresholdSet) -> Result<Vec<ApplicationView>> {
        let report = self
            .pipeline
            .use_case
            .execute(AuditRequest::new(thresholds.clone()))
            .await?;
        Ok(report.flagged)
    }

    async fn run_immediate_check(&self) -> RunOutcome {
        self.run(RunTrigger::Manual).await
    }

    async fn test_services(&self) -> Result<ServiceReport> {
        let notifier = &self.pipeline.notifier;
        let applications = self.pipeline.use_case.list_applications(Utc::now()).await?;

        if !notifier.test_connection().await {
            return Err(AuditError::delivery(format!(
                "{} backend failed its connection check",
                notifier.backend_name()
            ))
            .into());
        }

        tracing::info!(
            applications = applications.len(),
            backend = notifier.backend_name(),
            "service check passed"
        );

        Ok(ServiceReport {
            applications_visible: applications.len(),
            delivery_backend: notifier.backend_name().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::outbound::formatters::EmailReportFormatter;
    use crate::credential_audit::domain::{
        ApplicationRecord, DirectoryEntity, PasswordCredentialRecord, ServicePrincipalRecord,
    };
    use crate::ports::outbound::{DeliveryBackend, EmailMessage};
    use chrono::{Duration, TimeZone};
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration as StdDuration;
    use tokio::sync::Notify;

    /// Directory returning one application whose secret expires in `days`
    struct StubDirectory {
        days: i64,
        fail: bool,
        calls: Arc<AtomicUsize>,
        gate: Option<Arc<Notify>>,
    }

    impl StubDirectory {
        fn expiring_in(days: i64) -> Self {
            Self {
                days,
                fail: false,
                calls: Arc::new(AtomicUsize::new(0)),
                gate: None,
            }
        }
    }

    #[async_trait]
    impl DirectoryRepository for StubDirectory {
        async fn list_service_principals(&self) -> Result<Vec<ServicePrincipalRecord>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            if self.fail {
                return Err(AuditError::auth("invalid_client").into());
            }
            Ok(vec![DirectoryEntity {
                id: "obj".to_string(),
                app_id: "app".to_string(),
                display_name: Some("Payroll".to_string()),
                password_credentials: vec![PasswordCredentialRecord {
                    key_id: "k".to_string(),
                    display_name: None,
                    end_date_time: Some(Utc::now() + Duration::days(self.days) - Duration::hours(1)),
                }],
                key_credentials: vec![],
            }])
        }

        async fn list_applications(&self) -> Result<Vec<ApplicationRecord>> {
            Ok(vec![])
        }
    }

    #[derive(Clone, Default)]
    struct CountingBackend {
        sent: Arc<AtomicUsize>,
        healthy: bool,
        delay: Option<StdDuration>,
    }

    #[async_trait]
    impl DeliveryBackend for CountingBackend {
        async fn send(&self, _message: &EmailMessage) -> Result<()> {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.sent.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn test_connection(&self) -> bool {
            self.healthy
        }

        fn backend_name(&self) -> &'static str {
            "counting"
        }
    }

    fn scheduler(
        directory: StubDirectory,
        backend: CountingBackend,
    ) -> Arc<CredentialScheduler<StubDirectory>> {
        Arc::new(CredentialScheduler::new(
            AuditCredentialsUseCase::new(directory),
            Notifier::new(
                Box::new(backend),
                Box::new(EmailReportFormatter::new()),
                "credwatch@example.com".to_string(),
                vec!["ops@example.com".to_string()],
            ),
            ThresholdSet::default(),
            DailySchedule::default(),
        ))
    }

    #[test]
    fn test_daily_schedule_parse() {
        assert_eq!(DailySchedule::parse("07:05").unwrap().to_string(), "07:05 UTC");
        assert_eq!(DailySchedule::default().to_string(), "09:00 UTC");
        assert!(DailySchedule::parse("24:00").is_err());
        assert!(DailySchedule::parse("9").is_err());
        assert!(DailySchedule::parse("aa:10").is_err());
    }

    #[test]
    fn test_next_after_same_day_and_rollover() {
        let schedule = DailySchedule::new(9, 0).unwrap();
        let morning = Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap();
        let at_nine = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap();
        let evening = Utc.with_ymd_and_hms(2026, 3, 1, 20, 0, 0).unwrap();

        assert_eq!(schedule.next_after(morning), at_nine);
        assert_eq!(
            schedule.next_after(at_nine),
            Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap()
        );
        assert_eq!(
            schedule.next_after(evening),
            Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap()
        );
    }

    #[tokio::test]
    async fn test_run_completes_and_notifies() {
        let backend = CountingBackend::default();
        let scheduler = scheduler(StubDirectory::expiring_in(5), backend.clone());

        let outcome = scheduler.run_immediate_check().await;

        assert_eq!(
            outcome,
            RunOutcome::Completed {
                applications_scanned: 1,
                applications_flagged: 1,
                notified: true,
            }
        );
        assert_eq!(backend.sent.load(Ordering::SeqCst), 1);
        assert!(!scheduler.is_running());
    }

    #[tokio::test]
    async fn test_nothing_flagged_sends_nothing() {
        let backend = CountingBackend::default();
        let scheduler = scheduler(StubDirectory::expiring_in(60), backend.clone());

        let outcome = scheduler.run_immediate_check().await;

        assert!(matches!(
            outcome,
            RunOutcome::Completed { notified: false, .. }
        ));
        assert_eq!(backend.sent.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_failure_is_reported_not_raised() {
        let mut directory = StubDirectory::expiring_in(5);
        directory.fail = true;
        let scheduler = scheduler(directory, CountingBackend::default());

        let outcome = scheduler.run(RunTrigger::Schedule).await;
        assert!(outcome.is_failure());

        // the guard was released, so the next trigger runs again
        assert!(scheduler.run(RunTrigger::Manual).await.is_failure());
    }

    #[tokio::test]
    async fn test_overlapping_trigger_is_skipped() {
        let gate = Arc::new(Notify::new());
        let mut directory = StubDirectory::expiring_in(5);
        directory.gate = Some(Arc::clone(&gate));
        let calls = Arc::clone(&directory.calls);
        let scheduler = scheduler(directory, CountingBackend::default());

        let first = {
            let scheduler = Arc::clone(&scheduler);
            tokio::spawn(async move { scheduler.run(RunTrigger::Schedule).await })
        };
        while calls.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }
        assert!(scheduler.is_running());

        assert_eq!(scheduler.run(RunTrigger::Manual).await, RunOutcome::Skipped);

        gate.notify_one();
        assert!(matches!(
            first.await.unwrap(),
            RunOutcome::Completed { .. }
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_dropped_caller_does_not_cancel_the_run() {
        let backend = CountingBackend {
            delay: Some(StdDuration::from_millis(100)),
            ..Default::default()
        };
        let sent = Arc::clone(&backend.sent);
        let scheduler = scheduler(StubDirectory::expiring_in(5), backend);

        // the caller gives up while the report is being sent
        let abandoned =
            tokio::time::timeout(StdDuration::from_millis(20), scheduler.run_immediate_check())
                .await;
        assert!(abandoned.is_err());
        assert!(scheduler.is_running());

        let deadline = tokio::time::Instant::now() + StdDuration::from_secs(5);
        while scheduler.is_running() && tokio::time::Instant::now() < deadline {
            tokio::time::sleep(StdDuration::from_millis(10)).await;
        }

        assert!(!scheduler.is_running());
        assert_eq!(sent.load(Ordering::SeqCst), 1);
        // a later trigger is not blocked by the abandoned one
        assert!(matches!(
            scheduler.run_immediate_check().await,
            RunOutcome::Completed { .. }
        ));
        assert_eq!(sent.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_start_and_stop() {
        let scheduler = scheduler(StubDirectory::expiring_in(5), CountingBackend::default());

        scheduler.start();
        scheduler.start();
        assert!(scheduler.is_scheduled());

        scheduler.stop_scheduler();
        assert!(!scheduler.is_scheduled());
    }

    #[tokio::test]
    async fn test_services_reports_backend_health() {
        let healthy = CountingBackend {
            healthy: true,
            ..Default::default()
        };
        let report = scheduler(StubDirectory::expiring_in(5), healthy)
            .test_services()
            .await
            .unwrap();
        assert_eq!(report.applications_visible, 1);
        assert_eq!(report.delivery_backend, "counting");

        let err = scheduler(StubDirectory::expiring_in(5), CountingBackend::default())
            .test_services()
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AuditError>(),
            Some(AuditError::Delivery { .. })
        ));
    }

    #[tokio::test]
    async fn test_services_propagates_directory_failure() {
        let mut directory = StubDirectory::expiring_in(5);
        directory.fail = true;
        let healthy = CountingBackend {
            healthy: true,
            ..Default::default()
        };

        let err = scheduler(directory, healthy).test_services().await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AuditError>(),
            Some(AuditError::Auth { .. })
        ));
    }
}
