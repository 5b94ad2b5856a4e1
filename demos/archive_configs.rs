//! Archive the running configuration of every selected pod device.
//!
//! ```sh
//! export TERMFLEET_USERNAME=operator
//! export TERMFLEET_PASSWORD=secret
//! export TERMFLEET_ENABLE_PASSWORDS=secret
//! export TERMFLEET_PODS=1,2,3
//! cargo run --example archive_configs
//! ```
//!
//! Configurations land in `config_archive/<run>/<device>.cfg`. Exits
//! non-zero if any device failed.

use std::path::Path;
use std::process::ExitCode;

use secrecy::SecretString;
use tokio_util::sync::CancellationToken;

use termfleet::{
    default_execution_name, Credentials, ExecutionContext, FleetOperation, Harness, Inventory,
    RunSpec,
};

fn env(name: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| panic!("{name} must be set"))
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();

    let inventory_path =
        std::env::var("TERMFLEET_INVENTORY").unwrap_or_else(|_| "inventory.json".to_string());
    let inventory = match Inventory::from_json_file(Path::new(&inventory_path)) {
        Ok(inventory) => inventory,
        Err(e) => {
            eprintln!("cannot load inventory: {e}");
            return ExitCode::FAILURE;
        }
    };

    let pods: Vec<u32> = std::env::var("TERMFLEET_PODS")
        .unwrap_or_else(|_| "1".to_string())
        .split(',')
        .map(|n| n.trim().parse().expect("numeric pod list"))
        .collect();

    let devices = match inventory.pod_routers(&pods, &[1, 2, 3, 4]) {
        Ok(devices) => devices,
        Err(e) => {
            eprintln!("inventory lookup failed: {e}");
            return ExitCode::FAILURE;
        }
    };

    let run = default_execution_name();
    let contexts: Vec<_> = devices
        .into_iter()
        .map(|d| ExecutionContext::new(d, run.clone()))
        .collect();

    let spec = RunSpec {
        credentials: Credentials::new(env("TERMFLEET_USERNAME"), env("TERMFLEET_PASSWORD")),
        enable_passwords: env("TERMFLEET_ENABLE_PASSWORDS")
            .split(',')
            .map(|p| SecretString::from(p.to_string()))
            .collect(),
        operation: FleetOperation::SaveConfig,
    };

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("interrupt received, aborting the run");
            interrupt.cancel();
        }
    });

    let report = Harness::default().run(contexts, spec, cancel).await;
    println!(
        "Elapsed time: {:.2}s ({} completed, {} failed)",
        report.elapsed.as_secs_f64(),
        report.completed(),
        report.failed()
    );

    if report.failed() > 0 || report.was_cancelled() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
