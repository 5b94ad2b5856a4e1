//! Concurrent execution harness.
//!
//! Runs the sequence {pre-process, login, enable, operation, disconnect,
//! post-process} for every context in a collection, across a fixed-size
//! pool of workers pulling from a shared queue. One device failing is
//! logged and abandoned; the rest proceed. Cancellation is different:
//! it aborts in-flight stages and queued work promptly, because an
//! operator interrupt means stop, not "this device is broken".

use std::future::Future;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use log::info;
use secrecy::SecretString;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::banner;
use crate::context::ExecutionContext;
use crate::error::Error;
use crate::session::{EnableOptions, LoginOptions};
use crate::transport::Credentials;

/// Which lifecycle operation the run performs on every device, between
/// enable and disconnect.
#[derive(Debug, Clone)]
pub enum FleetOperation {
    /// Erase the startup configuration (optionally the VLAN database)
    /// and reload.
    FactoryReset { erase_vlan: bool },

    /// Archive each device's running configuration.
    SaveConfig,

    /// Push each device's prepared configuration file. `path` overrides
    /// the per-device default; it only makes sense for single-device
    /// runs.
    PushConfig { path: Option<PathBuf> },
}

/// Credentials and operation for one harness invocation.
pub struct RunSpec {
    pub credentials: Credentials,
    pub enable_passwords: Vec<SecretString>,
    pub operation: FleetOperation,
}

/// Harness tuning.
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    /// Fixed worker-pool size.
    pub workers: usize,

    /// Login dialog options applied to every device.
    pub login: LoginOptions,

    /// Enable dialog options applied to every device.
    pub enable: EnableOptions,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            workers: 10,
            login: LoginOptions::default(),
            enable: EnableOptions::default(),
        }
    }
}

/// How one device's run ended.
#[derive(Debug)]
pub enum DeviceOutcome {
    /// Every stage completed.
    Completed,

    /// A stage failed; remaining stages were skipped.
    Failed(Error),

    /// The run was cancelled before or during this device's sequence.
    Cancelled,
}

/// One device's entry in the run report.
#[derive(Debug)]
pub struct DeviceReport {
    pub device: String,
    pub outcome: DeviceOutcome,
}

/// Aggregate result of one harness invocation.
#[derive(Debug)]
pub struct RunReport {
    /// Wall-clock time for the whole run.
    pub elapsed: Duration,

    /// Per-device outcomes, in completion order.
    pub reports: Vec<DeviceReport>,
}

impl RunReport {
    /// Devices whose whole sequence completed.
    pub fn completed(&self) -> usize {
        self.reports
            .iter()
            .filter(|r| matches!(r.outcome, DeviceOutcome::Completed))
            .count()
    }

    /// Devices that failed at some stage.
    pub fn failed(&self) -> usize {
        self.failures().count()
    }

    /// Iterate over the failed devices.
    pub fn failures(&self) -> impl Iterator<Item = &DeviceReport> {
        self.reports
            .iter()
            .filter(|r| matches!(r.outcome, DeviceOutcome::Failed(_)))
    }

    /// Whether the run was cut short by cancellation.
    pub fn was_cancelled(&self) -> bool {
        self.reports
            .iter()
            .any(|r| matches!(r.outcome, DeviceOutcome::Cancelled))
    }
}

/// The worker-pool harness.
pub struct Harness {
    config: HarnessConfig,
}

impl Default for Harness {
    fn default() -> Self {
        Self::new(HarnessConfig::default())
    }
}

impl Harness {
    pub fn new(config: HarnessConfig) -> Self {
        Self { config }
    }

    /// Run `spec` against every context, blocking until each device has
    /// completed, failed, or been cancelled.
    pub async fn run(
        &self,
        contexts: Vec<ExecutionContext>,
        spec: RunSpec,
        cancel: CancellationToken,
    ) -> RunReport {
        let start = Instant::now();
        let total = contexts.len();

        let (tx, rx) = mpsc::channel(total.max(1));
        for ctx in contexts {
            // Capacity covers the whole fleet; this never blocks.
            let _ = tx.send(ctx).await;
        }
        drop(tx);

        let queue = Arc::new(tokio::sync::Mutex::new(rx));
        let spec = Arc::new(spec);
        let reports = Arc::new(Mutex::new(Vec::with_capacity(total)));

        let workers = self.config.workers.min(total).max(1);
        info!("starting run: {total} devices across {workers} workers");

        let mut pool = JoinSet::new();
        for _ in 0..workers {
            let queue = queue.clone();
            let spec = spec.clone();
            let cancel = cancel.clone();
            let reports = reports.clone();
            let login = self.config.login.clone();
            let enable = self.config.enable.clone();

            pool.spawn(async move {
                loop {
                    let job = { queue.lock().await.recv().await };
                    let Some(mut ctx) = job else { break };

                    let outcome = if cancel.is_cancelled() {
                        DeviceOutcome::Cancelled
                    } else {
                        run_device(&mut ctx, &spec, &login, &enable, &cancel).await
                    };

                    let device = ctx.name().to_string();
                    reports.lock().unwrap().push(DeviceReport { device, outcome });
                }
            });
        }

        while pool.join_next().await.is_some() {}

        let elapsed = start.elapsed();
        info!("run finished in {:.2}s", elapsed.as_secs_f64());

        let reports = Arc::try_unwrap(reports)
            .expect("all workers joined")
            .into_inner()
            .unwrap();
        RunReport { elapsed, reports }
    }
}

/// Guard a stage future with the cancellation token. `None` means the
/// token fired first.
async fn stage<T>(cancel: &CancellationToken, fut: impl Future<Output = T>) -> Option<T> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => None,
        result = fut => Some(result),
    }
}

enum DriveEnd {
    Completed,
    Cancelled,
}

/// One device's full sequence, with the token checked at every stage
/// boundary and selected against every in-flight stage.
async fn drive(
    ctx: &mut ExecutionContext,
    spec: &RunSpec,
    login: &LoginOptions,
    enable: &EnableOptions,
    cancel: &CancellationToken,
) -> Result<DriveEnd, Error> {
    let Some(result) = stage(cancel, ctx.login(&spec.credentials, login)).await else {
        return Ok(DriveEnd::Cancelled);
    };
    result?;

    let Some(result) = stage(cancel, ctx.enable(&spec.enable_passwords, enable)).await else {
        return Ok(DriveEnd::Cancelled);
    };
    result?;

    let Some(result) = (match &spec.operation {
        FleetOperation::FactoryReset { erase_vlan } => {
            stage(cancel, ctx.factory_reset(*erase_vlan)).await
        }
        FleetOperation::SaveConfig => {
            stage(cancel, async { ctx.save_config().await.map(|_| ()) }).await
        }
        FleetOperation::PushConfig { path } => {
            stage(cancel, ctx.push_config(path.as_deref())).await
        }
    }) else {
        return Ok(DriveEnd::Cancelled);
    };
    result?;

    ctx.disconnect(false).await;
    Ok(DriveEnd::Completed)
}

/// Run one device start to finish. Teardown happens on every path.
async fn run_device(
    ctx: &mut ExecutionContext,
    spec: &RunSpec,
    login: &LoginOptions,
    enable: &EnableOptions,
    cancel: &CancellationToken,
) -> DeviceOutcome {
    if let Err(e) = ctx.pre_process() {
        report_failure(ctx, &e);
        return DeviceOutcome::Failed(e);
    }

    let outcome = match drive(ctx, spec, login, enable, cancel).await {
        Ok(DriveEnd::Completed) => DeviceOutcome::Completed,
        Ok(DriveEnd::Cancelled) => {
            ctx.disconnect(true).await;
            DeviceOutcome::Cancelled
        }
        Err(e) => {
            report_failure(ctx, &e);
            ctx.disconnect(true).await;
            DeviceOutcome::Failed(e)
        }
    };

    ctx.post_process();
    outcome
}

fn report_failure(ctx: &ExecutionContext, error: &Error) {
    banner::error(&format!("{}: {error}", ctx.name()));
    eprintln!(
        "see {} for the full session transcript",
        ctx.transcript_path().display()
    );
    log::error!("{}: {error}", ctx.name());
}
