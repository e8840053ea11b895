use crate::error::UnimonError;
use serde::{Deserialize, Serialize};

/// Universal severity scale, ordered from lowest to highest.
///
/// `NoSeverity` is the neutral bottom element: a fresh [`HostGroup`] starts
/// there, and an [`Event`] carrying it renders without a glyph.
///
/// # Examples
///
/// ```
/// use unimon_common::types::Severity;
///
/// let sev: Severity = "warning".parse().unwrap();
/// assert_eq!(sev, Severity::Warning);
/// assert_eq!(sev.to_string(), "warning");
/// assert!(Severity::Critical > Severity::Info);
/// assert!(Severity::NoSeverity < Severity::Info);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[serde(rename = "none")]
    NoSeverity,
    Info,
    Warning,
    Critical,
}

impl Severity {
    /// Display glyph prefixed to rendered events and host groups.
    /// `NoSeverity` renders no glyph at all.
    pub fn icon(&self) -> &'static str {
        match self {
            Severity::NoSeverity => "",
            Severity::Info => "\u{2139}",
            Severity::Warning => "\u{26a0}",
            Severity::Critical => "\u{26d4}",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::NoSeverity => write!(f, "none"),
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Critical => write!(f, "critical"),
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = UnimonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" => Ok(Severity::NoSeverity),
            "info" => Ok(Severity::Info),
            "warning" => Ok(Severity::Warning),
            "critical" => Ok(Severity::Critical),
            _ => Err(UnimonError::UnsupportedSeverity(s.to_string())),
        }
    }
}

/// What an [`Event`] reports: a new problem, or the resolution of one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Resolution,
    Problem,
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventKind::Resolution => write!(f, "resolution"),
            EventKind::Problem => write!(f, "problem"),
        }
    }
}

impl std::str::FromStr for EventKind {
    type Err = UnimonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "resolution" => Ok(EventKind::Resolution),
            "problem" => Ok(EventKind::Problem),
            _ => Err(UnimonError::UnsupportedEventKind(s.to_string())),
        }
    }
}

/// One normalized monitoring occurrence.
///
/// Events are immutable: adapters build them fresh for every query response
/// and never cache or patch them afterwards. The typed fields make the
/// construction-time validation of the kind/severity/detail triple a
/// compile-time guarantee; raw provider values are validated where they are
/// parsed, not here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Problem or resolution.
    pub kind: EventKind,
    /// Whether `text` carries a full description rather than a terse one.
    pub detailed: bool,
    pub severity: Severity,
    /// Display name of the affected host.
    pub host: String,
    /// Human-readable description, composed by the adapter.
    pub text: String,
    /// Provider-assigned identifier, opaque to this layer.
    pub id: String,
}

impl Event {
    pub fn new(
        kind: EventKind,
        detailed: bool,
        severity: Severity,
        host: impl Into<String>,
        text: impl Into<String>,
        id: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            detailed,
            severity,
            host: host.into(),
            text: text.into(),
            id: id.into(),
        }
    }
}

impl std::fmt::Display for Event {
    /// Single-line form: severity glyph (omitted for `NoSeverity`), host,
    /// text.
    ///
    /// # Examples
    ///
    /// ```
    /// use unimon_common::types::{Event, EventKind, Severity};
    ///
    /// let event = Event::new(EventKind::Problem, true, Severity::Critical, "web-01", "High CPU usage", "42");
    /// assert_eq!(event.to_string(), "\u{26d4} web-01: High CPU usage");
    /// ```
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let icon = self.severity.icon();
        if icon.is_empty() {
            write!(f, "{}: {}", self.host, self.text)
        } else {
            write!(f, "{} {}: {}", icon, self.host, self.text)
        }
    }
}

/// Problem counts broken down by the three countable severities.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblemCounts {
    pub info: u64,
    pub warning: u64,
    pub critical: u64,
}

impl ProblemCounts {
    /// Count for one severity; `NoSeverity` always reads zero.
    pub fn get(&self, severity: Severity) -> u64 {
        match severity {
            Severity::NoSeverity => 0,
            Severity::Info => self.info,
            Severity::Warning => self.warning,
            Severity::Critical => self.critical,
        }
    }
}

/// Accumulator of problem counts and worst severity for one host group.
///
/// Built adapter-side while composing a summary response and handed to the
/// caller as a finished snapshot; [`HostGroup::count_problem`] is the sole
/// mutator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostGroup {
    /// Display name of the group.
    pub name: String,
    /// Provider-assigned identifier.
    pub id: String,
    severity: Severity,
    problems: u64,
    problems_by_severity: ProblemCounts,
}

impl HostGroup {
    pub fn new(name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
            severity: Severity::NoSeverity,
            problems: 0,
            problems_by_severity: ProblemCounts::default(),
        }
    }

    /// Worst severity folded in so far; `NoSeverity` until the first count.
    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// Total problems counted so far.
    pub fn problems(&self) -> u64 {
        self.problems
    }

    pub fn problems_by_severity(&self) -> ProblemCounts {
        self.problems_by_severity
    }

    /// Folds one problem into the accumulator: bumps the total, the
    /// per-severity counter, and the worst severity seen.
    ///
    /// Only `Info`, `Warning` and `Critical` are countable;
    /// [`Severity::NoSeverity`] fails with
    /// [`UnimonError::UnsupportedProblemSeverity`].
    pub fn count_problem(&mut self, severity: Severity) -> Result<(), UnimonError> {
        match severity {
            Severity::NoSeverity => {
                return Err(UnimonError::UnsupportedProblemSeverity(severity));
            }
            Severity::Info => self.problems_by_severity.info += 1,
            Severity::Warning => self.problems_by_severity.warning += 1,
            Severity::Critical => self.problems_by_severity.critical += 1,
        }
        self.problems += 1;
        self.severity = self.severity.max(severity);
        Ok(())
    }
}

impl std::fmt::Display for HostGroup {
    /// Group name prefixed by the glyph of its current worst severity.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.severity.icon(), self.name)
    }
}
