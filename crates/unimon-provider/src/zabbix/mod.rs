//! Zabbix adapter: translates the frontend's resource API into the unified
//! monitoring model.

pub mod client;

use crate::error::ProviderError;
use crate::{MonitorProvider, ProviderConfig};
use anyhow::{Context, Result};
use client::{ResourceClient, ZabbixClient};
use serde::{Deserialize, Deserializer};
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::net::IpAddr;
use std::path::PathBuf;
use std::process::Command;
use unimon_common::{Event, EventKind, HostGroup, Severity, UnimonError};

const DRULE_STATUS_ACTIVE: u8 = 0;
const DRULE_STATUS_DISABLED: u8 = 1;
const AGENT_INTERFACE_TYPE: u8 = 1;
const AGENT_PORT: &str = "10050";
const ALL_PRIORITIES: [u8; 6] = [0, 1, 2, 3, 4, 5];

/// Maps a Zabbix trigger priority onto the universal scale.
///
/// Priorities 0-5 are the only values Zabbix defines; anything else is an
/// adapter-level defect, never a caller-facing error.
fn severity_from_priority(priority: u8) -> Option<Severity> {
    match priority {
        0 | 1 => Some(Severity::Info),
        2 | 3 => Some(Severity::Warning),
        4 | 5 => Some(Severity::Critical),
        _ => None,
    }
}

/// Translates a requested severity set into Zabbix priority codes.
///
/// `None` requests every priority. `NoSeverity` has no backend counterpart
/// and contributes no codes, so a filter consisting only of it restricts
/// the query to nothing.
fn priorities_for(severities: Option<&[Severity]>) -> Vec<u8> {
    let Some(severities) = severities else {
        return ALL_PRIORITIES.to_vec();
    };
    let mut priorities = Vec::new();
    for severity in severities {
        match severity {
            Severity::Info => priorities.extend([0, 1]),
            Severity::Warning => priorities.extend([2, 3]),
            Severity::Critical => priorities.extend([4, 5]),
            Severity::NoSeverity => {}
        }
    }
    priorities
}

/// Appends the bracketed tag annotation to a trigger description:
/// `tag` alone for empty values, `tag:value` otherwise, nothing at all
/// when there are no tags.
fn annotated_text(description: &str, tags: &[RawTag]) -> String {
    if tags.is_empty() {
        return description.to_string();
    }
    let rendered: Vec<String> = tags
        .iter()
        .map(|tag| {
            if tag.value.is_empty() {
                tag.tag.clone()
            } else {
                format!("{}:{}", tag.tag, tag.value)
            }
        })
        .collect();
    format!("{} [ {} ]", description, rendered.join(", "))
}

// Zabbix serializes numeric fields as strings; mocks and older frontends
// use plain numbers. Accept both.
fn u8_from_int_or_string<'de, D>(deserializer: D) -> std::result::Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u8),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::Text(s) => s.parse().map_err(serde::de::Error::custom),
    }
}

#[derive(Debug, Deserialize)]
struct RawProblem {
    eventid: String,
    objectid: String,
    #[serde(default)]
    tags: Vec<RawTag>,
}

#[derive(Debug, Deserialize)]
struct RawTag {
    tag: String,
    #[serde(default)]
    value: String,
}

#[derive(Debug, Deserialize)]
struct RawTrigger {
    #[serde(default)]
    description: String,
    #[serde(deserialize_with = "u8_from_int_or_string")]
    priority: u8,
    #[serde(default)]
    hosts: Vec<RawTriggerHost>,
    #[serde(default)]
    groups: Vec<RawGroup>,
}

#[derive(Debug, Deserialize)]
struct RawTriggerHost {
    name: String,
}

#[derive(Debug, Clone, Deserialize)]
struct RawGroup {
    groupid: String,
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct RawHost {
    hostid: String,
    #[serde(default)]
    host: String,
}

#[derive(Debug, Deserialize)]
struct RawTemplate {
    templateid: String,
}

#[derive(Debug, Deserialize)]
struct RawDiscoveryRule {
    druleid: String,
    #[serde(default)]
    iprange: String,
}

#[derive(Debug, Deserialize)]
struct CreatedHosts {
    hostids: Vec<String>,
}

/// One problem joined to its defining trigger, normalized and ready for
/// either event translation or group aggregation.
struct ResolvedProblem {
    event_id: String,
    severity: Severity,
    host: String,
    text: String,
    groups: Vec<RawGroup>,
}

/// Adapter for a Zabbix-style backend.
///
/// Owns one authenticated [`ResourceClient`] for its lifetime. All methods
/// are synchronous passthroughs to the backend plus translation; nothing is
/// cached between calls.
pub struct ZabbixProvider {
    client: Box<dyn ResourceClient>,
    repo_path: PathBuf,
    windows_installer: String,
    linux_installer: String,
    template_filter: String,
}

impl ZabbixProvider {
    /// Connects to the frontend and authenticates. A failed handshake
    /// propagates as the backend's own error, unwrapped.
    pub fn connect(
        endpoint: &str,
        username: &str,
        password: &str,
        config: ProviderConfig,
    ) -> std::result::Result<Self, ProviderError> {
        let client = ZabbixClient::connect(endpoint, username, password)?;
        Ok(Self::new(Box::new(client), config))
    }

    /// Builds the adapter around an already constructed client. This is the
    /// injection point for alternative transports and for tests.
    pub fn new(client: Box<dyn ResourceClient>, config: ProviderConfig) -> Self {
        Self {
            client,
            repo_path: config.repo_path,
            windows_installer: config.windows_installer,
            linux_installer: config.linux_installer,
            template_filter: config.template_filter,
        }
    }

    fn discovery_rules(&self) -> Result<Vec<RawDiscoveryRule>> {
        let raw = self.client.get("drule", json!({ "output": "extend" }))?;
        Ok(serde_json::from_value(raw).context("Failed to parse discovery rule records")?)
    }

    fn set_discovery_status(&self, status: u8, ip_range: Option<&str>) -> Result<()> {
        let rules = self.discovery_rules()?;
        if rules.is_empty() {
            return Err(UnimonError::NoDiscoveryRules.into());
        }
        for rule in rules {
            let mut params = json!({ "druleid": rule.druleid, "status": status });
            if let Some(range) = ip_range {
                params["iprange"] = json!(range);
            }
            self.client.update("drule", params)?;
        }
        Ok(())
    }

    /// Fetches current problems and joins each to its defining trigger.
    ///
    /// One `problem.get`, then one bulk `trigger.get` restricted to
    /// monitored, non-dependent triggers; problems whose trigger falls
    /// outside that set are dropped without error.
    fn fetch_problems(
        &self,
        severities: Option<&[Severity]>,
        groups: Option<&[String]>,
    ) -> Result<Vec<ResolvedProblem>> {
        let mut params = json!({
            "output": "extend",
            "severities": priorities_for(severities),
            "selectTags": "extend",
        });
        if let Some(groups) = groups {
            params["groupids"] = json!(groups);
        }

        let raw = self.client.get("problem", params)?;
        let problems: Vec<RawProblem> =
            serde_json::from_value(raw).context("Failed to parse problem records")?;
        if problems.is_empty() {
            return Ok(Vec::new());
        }

        let trigger_ids: Vec<&str> = problems.iter().map(|p| p.objectid.as_str()).collect();
        let raw = self.client.get(
            "trigger",
            json!({
                "triggerids": trigger_ids,
                "output": "extend",
                "monitored": 1,
                "skipDependent": 1,
                "preservekeys": 1,
                "selectHosts": ["name"],
                "selectGroups": ["groupid", "name"],
            }),
        )?;
        let triggers: HashMap<String, RawTrigger> =
            serde_json::from_value(raw).context("Failed to parse trigger records")?;

        let mut resolved = Vec::new();
        for problem in problems {
            let Some(trigger) = triggers.get(&problem.objectid) else {
                tracing::debug!(
                    "Dropping problem {}: trigger {} is disabled or dependent",
                    problem.eventid,
                    problem.objectid
                );
                continue;
            };
            let Some(severity) = severity_from_priority(trigger.priority) else {
                tracing::warn!(
                    "Skipping problem {}: trigger {} has undefined priority {}",
                    problem.eventid,
                    problem.objectid,
                    trigger.priority
                );
                continue;
            };
            resolved.push(ResolvedProblem {
                severity,
                host: trigger
                    .hosts
                    .first()
                    .map(|host| host.name.clone())
                    .unwrap_or_default(),
                text: annotated_text(&trigger.description, &problem.tags),
                groups: trigger.groups.clone(),
                event_id: problem.eventid,
            });
        }
        Ok(resolved)
    }

    pub(crate) fn installer_script(&self, os: &str) -> std::result::Result<&str, UnimonError> {
        match os {
            "Windows" => Ok(&self.windows_installer),
            "Linux" => Ok(&self.linux_installer),
            _ => Err(UnimonError::UnsupportedOs(os.to_string())),
        }
    }
}

impl MonitorProvider for ZabbixProvider {
    fn name(&self) -> &str {
        "zabbix"
    }

    fn get_discovery_ip_range(&self) -> Result<String> {
        let mut rules = self.discovery_rules()?;
        if rules.len() != 1 {
            return Err(UnimonError::DiscoveryRuleCount(rules.len()).into());
        }
        Ok(rules.remove(0).iprange)
    }

    fn start_discovery(&self, ip_range: Option<&str>) -> Result<()> {
        self.set_discovery_status(DRULE_STATUS_ACTIVE, ip_range)
    }

    fn stop_discovery(&self) -> Result<()> {
        self.set_discovery_status(DRULE_STATUS_DISABLED, None)
    }

    fn get_problems(
        &self,
        severities: Option<&[Severity]>,
        groups: Option<&[String]>,
    ) -> Result<Vec<Event>> {
        let problems = self.fetch_problems(severities, groups)?;
        Ok(problems
            .into_iter()
            .map(|problem| {
                Event::new(
                    EventKind::Problem,
                    true,
                    problem.severity,
                    problem.host,
                    problem.text,
                    problem.event_id,
                )
            })
            .collect())
    }

    fn get_summary(&self, severities: Option<&[Severity]>) -> Result<Vec<HostGroup>> {
        let problems = self.fetch_problems(severities, None)?;

        // One accumulator per group id, in first-encountered order. A
        // trigger in several groups counts in every one of them.
        let mut ordered: Vec<HostGroup> = Vec::new();
        let mut slots: HashMap<String, usize> = HashMap::new();
        for problem in &problems {
            for group in &problem.groups {
                let slot = *slots.entry(group.groupid.clone()).or_insert_with(|| {
                    ordered.push(HostGroup::new(&group.name, &group.groupid));
                    ordered.len() - 1
                });
                ordered[slot].count_problem(problem.severity)?;
            }
        }
        Ok(ordered)
    }

    fn install_agent(&self, os: &str, host: &str, user: &str, password: &str) -> Result<i32> {
        let script = self.installer_script(os)?;
        let output = Command::new(script)
            .arg(&self.repo_path)
            .arg(host)
            .arg(user)
            .arg(password)
            .output()
            .map_err(|err| {
                UnimonError::derived(format!("Failed to run installer \"{script}\""), err)
            })?;
        tracing::debug!(
            "Installer {} for {} finished: {}\nstdout: {}\nstderr: {}",
            script,
            host,
            output.status,
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
        output
            .status
            .code()
            .context("Installer terminated by a signal")
    }

    fn add_host(&self, host: &str, groups: &[String]) -> Result<String> {
        let raw = self.client.get(
            "hostgroup",
            json!({ "output": "extend", "filter": { "name": groups } }),
        )?;
        let group_records: Vec<RawGroup> =
            serde_json::from_value(raw).context("Failed to parse host group records")?;
        let group_refs: Vec<Value> = group_records
            .iter()
            .map(|group| json!({ "groupid": group.groupid }))
            .collect();

        let mut template_refs: Vec<Value> = Vec::new();
        for name in groups {
            let raw = self.client.get(
                "template",
                json!({
                    "output": "extend",
                    "filter": { "host": format!("{} {}", self.template_filter, name) },
                }),
            )?;
            let templates: Vec<RawTemplate> =
                serde_json::from_value(raw).context("Failed to parse template records")?;
            template_refs.extend(
                templates
                    .into_iter()
                    .map(|template| json!({ "templateid": template.templateid })),
            );
        }

        let interface = if host.parse::<IpAddr>().is_ok() {
            json!({
                "type": AGENT_INTERFACE_TYPE,
                "main": 1,
                "useip": 1,
                "ip": host,
                "dns": "",
                "port": AGENT_PORT,
            })
        } else {
            json!({
                "type": AGENT_INTERFACE_TYPE,
                "main": 1,
                "useip": 0,
                "ip": "",
                "dns": host,
                "port": AGENT_PORT,
            })
        };

        let raw = self.client.create(
            "host",
            json!({
                "host": host,
                "groups": group_refs,
                "templates": template_refs,
                "interfaces": [interface],
            }),
        )?;
        let created: CreatedHosts =
            serde_json::from_value(raw).context("Failed to parse host.create response")?;
        created
            .hostids
            .into_iter()
            .next()
            .context("host.create returned no host id")
    }

    fn delete_host(&self, host_id: &str) -> Result<()> {
        self.client.delete("host", json!([host_id]))?;
        Ok(())
    }

    fn get_host_id(&self, host_name: &str) -> Result<String> {
        let raw = self.client.get(
            "host",
            json!({ "output": "extend", "filter": { "host": [host_name] } }),
        )?;
        let hosts: Vec<RawHost> =
            serde_json::from_value(raw).context("Failed to parse host records")?;
        let record = hosts
            .into_iter()
            .next()
            .with_context(|| format!("No host named \"{host_name}\""))?;
        Ok(record.hostid)
    }

    fn get_host_name(&self, host_id: &str) -> Result<String> {
        let raw = self.client.get(
            "host",
            json!({ "output": "extend", "hostids": [host_id] }),
        )?;
        let hosts: Vec<RawHost> =
            serde_json::from_value(raw).context("Failed to parse host records")?;
        let record = hosts
            .into_iter()
            .next()
            .with_context(|| format!("No host with id \"{host_id}\""))?;
        Ok(record.host)
    }

    fn get_available_host_groups(&self) -> Result<Vec<String>> {
        let raw = self.client.get("hostgroup", json!({ "output": "extend" }))?;
        let all: Vec<RawGroup> =
            serde_json::from_value(raw).context("Failed to parse host group records")?;

        let raw = self.client.get(
            "hostgroup",
            json!({ "output": "extend", "templated_hosts": 1 }),
        )?;
        let templated: Vec<RawGroup> =
            serde_json::from_value(raw).context("Failed to parse template group records")?;
        let template_names: HashSet<String> =
            templated.into_iter().map(|group| group.name).collect();

        Ok(all
            .into_iter()
            .map(|group| group.name)
            .filter(|name| !template_names.contains(name))
            .collect())
    }
}
