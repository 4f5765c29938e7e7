pub mod delta;
pub mod org;
pub mod repo;

pub use delta::DeltaSpec;
pub use org::OrgSpec;
pub use repo::{RepoRevSpec, RepoSpec};

use std::collections::BTreeMap;
use thiserror::Error;

/// Named string parameters substituted into a route template.
pub type RouteVars = BTreeMap<String, String>;

pub const REPO_SPEC_VAR: &str = "RepoSpec";
pub const REV_VAR: &str = "Rev";
pub const DELTA_HEAD_REV_VAR: &str = "DeltaHeadRev";
pub const ORG_SPEC_VAR: &str = "OrgSpec";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SpecError {
    #[error("Missing route variable: {0}")]
    MissingVar(&'static str),

    #[error("Empty repository spec")]
    EmptyRepoSpec,

    #[error("Invalid repository spec: {0}")]
    InvalidRepoSpec(String),

    #[error("Invalid revision {rev:?}: {reason}")]
    InvalidRev { rev: String, reason: &'static str },

    #[error("Empty org spec")]
    EmptyOrgSpec,

    #[error("Invalid org name {0:?}: names may not start with '$'")]
    InvalidOrgName(String),

    #[error("Invalid org user id: {0}")]
    InvalidOrgId(String),

    #[error("Malformed cross-repo head revision {value:?}: {reason}")]
    MalformedHeadRev { value: String, reason: String },
}

/// Look up a required route variable.
pub(crate) fn require_var<'a>(vars: &'a RouteVars, name: &'static str) -> Result<&'a str, SpecError> {
    vars.get(name)
        .map(String::as_str)
        .ok_or(SpecError::MissingVar(name))
}
