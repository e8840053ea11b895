//! Unified monitoring data model shared by every provider adapter.
//!
//! The model is deliberately small: a totally ordered [`types::Severity`]
//! scale, an immutable [`types::Event`] value describing one monitoring
//! occurrence, and a [`types::HostGroup`] accumulator folding per-group
//! problem counts. Adapters translate backend-specific records into these
//! types; consumers never see provider wire formats.

pub mod error;
pub mod types;

pub use error::UnimonError;
pub use types::{Event, EventKind, HostGroup, ProblemCounts, Severity};
