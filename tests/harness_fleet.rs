//! Harness-level behavior across a fleet of scripted devices.

mod support;

use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;

use termfleet::{
    Credentials, DeviceOutcome, EnableOptions, Error, ExecutionContext, FleetOperation, Harness,
    HarnessConfig, RunSpec, SessionError,
};

use support::{ScriptedDevice, Step};

/// A device that logs in straight to a privileged prompt, answers the
/// enable fresh-prompt return, and serves one running-config capture.
fn healthy_script() -> Vec<Step> {
    vec![
        Step::Send("\r\nUsername: "),
        Step::Expect("op\r"),
        Step::Send("Password: "),
        Step::Expect("pw\r"),
        Step::Expect("\r"),
        Step::Send("\r\nrouter#"),
        Step::Expect("\r"),
        Step::Send("\r\nrouter#"),
        Step::Expect("show running-config\r"),
        Step::Send("hostname router\r\nend\r\nrouter#"),
    ]
}

/// A device that logs in unprivileged and then goes silent, so enable
/// times out through both attempts.
fn silent_after_login_script() -> Vec<Step> {
    vec![
        Step::Send("\r\nUsername: "),
        Step::Expect("op\r"),
        Step::Send("Password: "),
        Step::Expect("pw\r"),
        Step::Expect("\r"),
        Step::Send("\r\nrouter>"),
    ]
}

fn spec() -> RunSpec {
    RunSpec {
        credentials: Credentials::new("op", "pw"),
        enable_passwords: vec![],
        operation: FleetOperation::SaveConfig,
    }
}

fn config() -> HarnessConfig {
    HarnessConfig {
        workers: 3,
        enable: EnableOptions {
            attempts: 2,
            disable_paging: false,
        },
        ..HarnessConfig::default()
    }
}

#[tokio::test]
async fn one_enable_failure_does_not_disturb_the_rest() {
    let dir = tempfile::tempdir().unwrap();

    let good1 = ScriptedDevice::spawn(healthy_script()).await;
    let good2 = ScriptedDevice::spawn(healthy_script()).await;
    let bad = ScriptedDevice::spawn(silent_after_login_script()).await;

    let contexts = vec![
        ExecutionContext::new(good1.descriptor("r1"), "fleet-test")
            .base_dir(dir.path())
            .timeout(Duration::from_millis(800)),
        ExecutionContext::new(bad.descriptor("r2"), "fleet-test")
            .base_dir(dir.path())
            .timeout(Duration::from_millis(800)),
        ExecutionContext::new(good2.descriptor("r3"), "fleet-test")
            .base_dir(dir.path())
            .timeout(Duration::from_millis(800)),
    ];

    let report = Harness::new(config())
        .run(contexts, spec(), CancellationToken::new())
        .await;

    assert_eq!(report.reports.len(), 3);
    assert_eq!(report.completed(), 2);
    assert_eq!(report.failed(), 1);
    assert!(!report.was_cancelled());

    let failure = report.failures().next().unwrap();
    assert_eq!(failure.device, "r2");
    assert!(matches!(
        failure.outcome,
        DeviceOutcome::Failed(Error::Session(SessionError::EnableFailed { .. }))
    ));

    // Every device, including the failed one, was set up and torn down.
    let log_dir = dir.path().join("logs").join("fleet-test");
    for name in ["r1", "r2", "r3"] {
        assert!(log_dir.join(format!("{name}.log")).is_file());
        assert!(log_dir.join(format!("{name}.stdout")).is_file());
    }

    // Only the devices that completed have archived configurations.
    let archive_dir = dir.path().join("config_archive").join("fleet-test");
    assert!(archive_dir.join("r1.cfg").is_file());
    assert!(archive_dir.join("r3.cfg").is_file());
    assert!(!archive_dir.join("r2.cfg").exists());
}

#[tokio::test]
async fn cancellation_aborts_in_flight_and_queued_work() {
    let dir = tempfile::tempdir().unwrap();

    // Both devices present a username prompt and then stall forever.
    let stall1 = ScriptedDevice::spawn(vec![Step::Send("\r\nUsername: ")]).await;
    let stall2 = ScriptedDevice::spawn(vec![Step::Send("\r\nUsername: ")]).await;

    let contexts = vec![
        ExecutionContext::new(stall1.descriptor("r1"), "cancel-test")
            .base_dir(dir.path())
            .timeout(Duration::from_secs(30)),
        ExecutionContext::new(stall2.descriptor("r2"), "cancel-test")
            .base_dir(dir.path())
            .timeout(Duration::from_secs(30)),
    ];

    // One worker: the second device is still queued when the token fires.
    let harness = Harness::new(HarnessConfig {
        workers: 1,
        ..HarnessConfig::default()
    });

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        trigger.cancel();
    });

    let start = Instant::now();
    let report = harness.run(contexts, spec(), cancel).await;

    // The 30s expect timeout never ran its course.
    assert!(start.elapsed() < Duration::from_secs(5));
    assert_eq!(report.reports.len(), 2);
    assert!(report.was_cancelled());
    assert_eq!(report.completed(), 0);
    assert_eq!(report.failed(), 0);
}
