//! # termfleet
//!
//! Bulk console automation for network device fleets reachable through
//! terminal-server relays.
//!
//! termfleet drives routers and switches through their interactive
//! command-line dialog over telnet relay connections: login, privilege
//! escalation, factory reset, configuration push, and configuration
//! archival - then runs that state machine across a whole fleet with a
//! bounded worker pool, per-device failure isolation, and prompt
//! cancellation.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::path::Path;
//!
//! use termfleet::{
//!     Credentials, ExecutionContext, FleetOperation, Harness, Inventory, RunSpec,
//! };
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), termfleet::Error> {
//!     let inventory = Inventory::from_json_file(Path::new("inventory.json"))?;
//!     let devices = inventory.pod_routers(&[1, 2], &[1, 2, 3, 4])?;
//!
//!     let contexts: Vec<_> = devices
//!         .into_iter()
//!         .map(ExecutionContext::with_default_run)
//!         .collect();
//!
//!     let spec = RunSpec {
//!         credentials: Credentials::new("operator", "secret"),
//!         enable_passwords: vec!["secret".to_string().into()],
//!         operation: FleetOperation::FactoryReset { erase_vlan: true },
//!     };
//!
//!     let report = Harness::default()
//!         .run(contexts, spec, CancellationToken::new())
//!         .await;
//!     println!("{} devices, {} failed", report.reports.len(), report.failed());
//!     Ok(())
//! }
//! ```

pub mod banner;
pub mod channel;
pub mod context;
pub mod error;
pub mod harness;
pub mod inventory;
pub mod logging;
pub mod session;
pub mod transport;

// Re-export main types for convenience
pub use context::{default_execution_name, ExecutionContext};
pub use error::{Error, InventoryError, Result, SessionError, TransportError};
pub use harness::{
    DeviceOutcome, DeviceReport, FleetOperation, Harness, HarnessConfig, RunReport, RunSpec,
};
pub use inventory::{DeviceDescriptor, Inventory};
pub use session::{CaptureMode, EnableOptions, LoginOptions, Session, SessionConfig};
pub use transport::{Credentials, TransportConfig};
