//! Inventory lookup: mapping logical pod/router/switch numbers to relay
//! endpoints.
//!
//! The session and harness treat this purely as an opaque source of
//! [`DeviceDescriptor`]s. Lookups validate every requested index before
//! materializing a single descriptor, so a failed call never yields a
//! partial list.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::InventoryError;

/// Identity and relay endpoint of one device. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceDescriptor {
    /// Device name, e.g. `pod1-r2`. Also names the per-device log,
    /// transcript, config and archive files.
    pub name: String,

    /// Terminal-server host used to reach the device's console line.
    pub host: String,

    /// Terminal-server TCP port, as text.
    pub port: String,
}

impl DeviceDescriptor {
    pub fn new(
        name: impl Into<String>,
        host: impl Into<String>,
        port: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            host: host.into(),
            port: port.into(),
        }
    }
}

/// One pod's devices, in instance order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Pod {
    #[serde(default)]
    pub routers: Vec<DeviceDescriptor>,

    #[serde(default)]
    pub switches: Vec<DeviceDescriptor>,
}

/// The provisioned device inventory.
///
/// Pods are keyed by their number; a pod listed in `reserved` exists but
/// may not be used (under construction, loaned out). Requesting it is a
/// distinct error from requesting a number that was never provisioned.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Inventory {
    pods: BTreeMap<u32, Pod>,

    #[serde(default)]
    reserved: Vec<u32>,
}

impl Inventory {
    pub fn new(pods: BTreeMap<u32, Pod>, reserved: Vec<u32>) -> Self {
        Self { pods, reserved }
    }

    /// Load the inventory from a JSON data file.
    pub fn from_json_file(path: &Path) -> Result<Self, InventoryError> {
        let text = std::fs::read_to_string(path).map_err(|source| InventoryError::DataFile {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Resolve a pod number, distinguishing reserved from unprovisioned.
    fn pod(&self, number: u32) -> Result<&Pod, InventoryError> {
        if self.reserved.contains(&number) {
            return Err(InventoryError::PodReserved(number));
        }
        self.pods
            .get(&number)
            .ok_or(InventoryError::PodOutOfRange(number))
    }

    /// Descriptors for the given router instances in the given pods.
    ///
    /// Returns exactly `pods.len() * routers.len()` descriptors, ordered
    /// pod-major. Router instance numbers are 1-based.
    pub fn pod_routers(
        &self,
        pods: &[u32],
        routers: &[u32],
    ) -> Result<Vec<DeviceDescriptor>, InventoryError> {
        self.collect(pods, routers, |pod| &pod.routers, |n| {
            InventoryError::RouterOutOfRange(n)
        })
    }

    /// Descriptors for the given switch instances in the given pods.
    ///
    /// Returns exactly `pods.len() * switches.len()` descriptors, ordered
    /// pod-major. Switch instance numbers are 1-based.
    pub fn pod_switches(
        &self,
        pods: &[u32],
        switches: &[u32],
    ) -> Result<Vec<DeviceDescriptor>, InventoryError> {
        self.collect(pods, switches, |pod| &pod.switches, |n| {
            InventoryError::SwitchOutOfRange(n)
        })
    }

    /// Terminal-server endpoints for the given pods, one per pod, on the
    /// standard telnet port. A pod with no provisioned devices is treated
    /// as out of range.
    pub fn pod_terminal_servers(
        &self,
        pods: &[u32],
    ) -> Result<Vec<DeviceDescriptor>, InventoryError> {
        let mut resolved = Vec::with_capacity(pods.len());
        for &number in pods {
            let pod = self.pod(number)?;
            let first = pod
                .routers
                .first()
                .ok_or(InventoryError::PodOutOfRange(number))?;
            resolved.push(DeviceDescriptor::new(
                first.host.clone(),
                first.host.clone(),
                "23",
            ));
        }
        Ok(resolved)
    }

    /// Shared validate-then-build walk for instance lookups.
    fn collect(
        &self,
        pods: &[u32],
        instances: &[u32],
        select: fn(&Pod) -> &Vec<DeviceDescriptor>,
        out_of_range: fn(u32) -> InventoryError,
    ) -> Result<Vec<DeviceDescriptor>, InventoryError> {
        // Validate every index first; never return a partial list.
        let mut resolved = Vec::with_capacity(pods.len());
        for &number in pods {
            let pod = self.pod(number)?;
            for &instance in instances {
                if instance == 0 || instance as usize > select(pod).len() {
                    return Err(out_of_range(instance));
                }
            }
            resolved.push(pod);
        }

        let mut out = Vec::with_capacity(pods.len() * instances.len());
        for pod in resolved {
            for &instance in instances {
                out.push(select(pod)[instance as usize - 1].clone());
            }
        }
        Ok(out)
    }
}
