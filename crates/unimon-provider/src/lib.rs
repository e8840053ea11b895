//! Provider contract for monitoring backends, plus the Zabbix adapter.
//!
//! Code consuming monitoring data is written once against
//! [`MonitorProvider`] and works with any adapter. Adapters translate their
//! backend's wire records into the unified `unimon-common` model; nothing
//! provider-specific crosses the trait boundary.

pub mod error;
pub mod zabbix;


use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use unimon_common::{Event, HostGroup, Severity};

pub use error::ProviderError;
pub use zabbix::ZabbixProvider;

/// Contract every concrete monitoring adapter implements.
///
/// All operations are synchronous and block until the backend answers; no
/// timeout is imposed by this layer. One instance holds one authenticated
/// backend session for its lifetime. Instances may be moved between
/// threads, but concurrent use of a single instance is not guaranteed safe:
/// callers needing concurrency serialize calls or use one instance per
/// thread.
pub trait MonitorProvider: Send {
    /// Provider label (e.g. `"zabbix"`).
    fn name(&self) -> &str;

    /// The IP range of the backend's single discovery rule, verbatim.
    fn get_discovery_ip_range(&self) -> Result<String>;

    /// Activates every discovery rule, optionally resetting its IP range.
    fn start_discovery(&self, ip_range: Option<&str>) -> Result<()>;

    /// Deactivates every discovery rule.
    fn stop_discovery(&self) -> Result<()>;

    /// Current problems as unified events, optionally filtered by severity
    /// set and by backend group ids. `None` means no restriction in that
    /// dimension. Each call returns a fresh snapshot.
    fn get_problems(
        &self,
        severities: Option<&[Severity]>,
        groups: Option<&[String]>,
    ) -> Result<Vec<Event>>;

    /// Per-host-group problem counts and worst severity, optionally
    /// filtered by severity set. Groups appear in first-encountered order.
    fn get_summary(&self, severities: Option<&[Severity]>) -> Result<Vec<HostGroup>>;

    /// Runs the configured installer script for the given OS family and
    /// returns its exit code verbatim; interpreting a nonzero code is the
    /// caller's business.
    fn install_agent(&self, os: &str, host: &str, user: &str, password: &str) -> Result<i32>;

    /// Creates a host in the given groups and returns its backend id.
    fn add_host(&self, host: &str, groups: &[String]) -> Result<String>;

    fn delete_host(&self, host_id: &str) -> Result<()>;

    fn get_host_id(&self, host_name: &str) -> Result<String>;

    fn get_host_name(&self, host_id: &str) -> Result<String>;

    /// Names of all host groups a host can be assigned to, excluding groups
    /// that exist only as template-association artifacts.
    fn get_available_host_groups(&self) -> Result<Vec<String>>;
}

/// Adapter-specific configuration shared by every provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Directory passed to installer scripts as their first argument.
    pub repo_path: PathBuf,
    /// Installer script for Windows hosts.
    pub windows_installer: String,
    /// Installer script for Linux hosts.
    pub linux_installer: String,
    /// Prefix joined with a group name to locate the template associated
    /// with that group.
    pub template_filter: String,
}

/// Builds a connected provider from its type label.
///
/// # Errors
///
/// Returns [`ProviderError::UnsupportedProvider`] if `provider_type` is not
/// `"zabbix"`; connection and authentication failures propagate from the
/// backend client unchanged.
pub fn build_provider(
    provider_type: &str,
    endpoint: &str,
    username: &str,
    password: &str,
    config: ProviderConfig,
) -> error::Result<Box<dyn MonitorProvider>> {
    match provider_type {
        "zabbix" => Ok(Box::new(ZabbixProvider::connect(
            endpoint, username, password, config,
        )?)),
        _ => Err(ProviderError::UnsupportedProvider(
            provider_type.to_string(),
        )),
    }
}
