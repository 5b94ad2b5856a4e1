//! Factory-reset every selected pod device, ten at a time.
//!
//! ```sh
//! export TERMFLEET_USERNAME=operator
//! export TERMFLEET_PASSWORD=secret
//! export TERMFLEET_ENABLE_PASSWORDS=secret,fallback
//! export TERMFLEET_PODS=1,2
//! cargo run --example factory_reset
//! ```
//!
//! Reads the inventory from `inventory.json` (override with
//! `TERMFLEET_INVENTORY`). Ctrl-C aborts the whole run. Exits non-zero
//! if any device failed.

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

fn env_list(name: &str, default: &str) -> Vec<u32> {
    std::env::var(name)
        .unwrap_or_else(|_| default.to_string())
        .split(',')
        .map(|n| n.trim().parse().expect("numeric list"))
        .collect()
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

    let pods = env_list("TERMFLEET_PODS", "1");
    let devices = match inventory
        .pod_routers(&pods, &[1, 2, 3, 4])
        .and_then(|mut routers| {
            let switches = inventory.pod_switches(&pods, &[1])?;
            routers.extend(switches);
            Ok(routers)
        }) {
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
        operation: FleetOperation::FactoryReset { erase_vlan: true },
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
