use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{require_var, RouteVars, SpecError, REPO_SPEC_VAR, REV_VAR};

/// Prefix marking a numeric repository id in a path component (e.g. `R$42`).
const REPO_ID_PREFIX: &str = "R$";

/// Separator between a revision and its resolved commit id (`master===abc123`).
const COMMIT_ID_SEPARATOR: &str = "===";

/// Identifies a repository, either by URI or by numeric id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RepoSpec {
    /// Repository URI, e.g. `github.com/gorilla/mux`
    Uri(String),
    /// Numeric repository id
    Id(u32),
}

impl RepoSpec {
    /// The URL path component for this repository.
    pub fn path_component(&self) -> String {
        match self {
            RepoSpec::Uri(uri) => uri.clone(),
            RepoSpec::Id(rid) => format!("{REPO_ID_PREFIX}{rid}"),
        }
    }

    /// Parse a string produced by [`RepoSpec::path_component`].
    pub fn parse(path_component: &str) -> Result<RepoSpec, SpecError> {
        if path_component.is_empty() {
            return Err(SpecError::EmptyRepoSpec);
        }
        match path_component.strip_prefix(REPO_ID_PREFIX) {
            Some(id) => match id.parse::<u32>() {
                Ok(rid) if rid > 0 => Ok(RepoSpec::Id(rid)),
                _ => Err(SpecError::InvalidRepoSpec(path_component.to_string())),
            },
            None => Ok(RepoSpec::Uri(path_component.to_string())),
        }
    }

    pub fn route_vars(&self) -> RouteVars {
        let mut vars = RouteVars::new();
        vars.insert(REPO_SPEC_VAR.to_string(), self.path_component());
        vars
    }

    /// Whether this spec can be encoded and decoded again unchanged.
    fn validate(&self) -> Result<(), SpecError> {
        match self {
            RepoSpec::Uri(uri) if uri.is_empty() => Err(SpecError::EmptyRepoSpec),
            RepoSpec::Uri(uri) if uri.starts_with(REPO_ID_PREFIX) => {
                Err(SpecError::InvalidRepoSpec(uri.clone()))
            }
            RepoSpec::Id(0) => Err(SpecError::InvalidRepoSpec(self.path_component())),
            _ => Ok(()),
        }
    }
}

impl fmt::Display for RepoSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path_component())
    }
}

impl FromStr for RepoSpec {
    type Err = SpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RepoSpec::parse(s)
    }
}

/// A repository plus a revision within it.
///
/// The revision is validated on construction: it may not contain `:` (which
/// would make a same-repository delta head ambiguous with the cross-repository
/// encoding) or the `===` commit id separator. Every value of this type
/// therefore round-trips through [`RepoRevSpec::route_vars`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawRepoRevSpec", into = "RawRepoRevSpec")]
pub struct RepoRevSpec {
    repo: RepoSpec,
    rev: String,
    commit_id: Option<String>,
}

impl RepoRevSpec {
    pub fn new(repo: RepoSpec, rev: impl Into<String>) -> Result<RepoRevSpec, SpecError> {
        repo.validate()?;
        let rev = rev.into();
        validate_rev_part(&rev)?;
        Ok(RepoRevSpec {
            repo,
            rev,
            commit_id: None,
        })
    }

    /// Attach the absolute commit id that `rev` resolved to.
    pub fn with_commit_id(mut self, commit_id: impl Into<String>) -> Result<RepoRevSpec, SpecError> {
        let commit_id = commit_id.into();
        if self.rev.is_empty() {
            return Err(SpecError::InvalidRev {
                rev: commit_id,
                reason: "commit id given without a revision",
            });
        }
        validate_rev_part(&commit_id)?;
        self.commit_id = if commit_id.is_empty() {
            None
        } else {
            Some(commit_id)
        };
        Ok(self)
    }

    pub fn repo(&self) -> &RepoSpec {
        &self.repo
    }

    pub fn rev(&self) -> &str {
        &self.rev
    }

    pub fn commit_id(&self) -> Option<&str> {
        self.commit_id.as_deref()
    }

    /// The URL path component for the revision (`rev` or `rev===commit`).
    pub fn rev_path_component(&self) -> String {
        match &self.commit_id {
            Some(commit_id) => format!("{}{COMMIT_ID_SEPARATOR}{}", self.rev, commit_id),
            None => self.rev.clone(),
        }
    }

    /// Build a spec from a repository and a revision path component.
    pub fn from_path_components(repo: RepoSpec, rev_path_component: &str) -> Result<RepoRevSpec, SpecError> {
        match rev_path_component.split_once(COMMIT_ID_SEPARATOR) {
            Some((rev, commit_id)) => RepoRevSpec::new(repo, rev)?.with_commit_id(commit_id),
            None => RepoRevSpec::new(repo, rev_path_component),
        }
    }

    pub fn route_vars(&self) -> RouteVars {
        let mut vars = self.repo.route_vars();
        vars.insert(REV_VAR.to_string(), self.rev_path_component());
        vars
    }

    /// Inverse of [`RepoRevSpec::route_vars`]. A missing `Rev` means the
    /// default revision.
    pub fn from_route_vars(vars: &RouteVars) -> Result<RepoRevSpec, SpecError> {
        let repo = RepoSpec::parse(require_var(vars, REPO_SPEC_VAR)?)?;
        let rev = vars.get(REV_VAR).map(String::as_str).unwrap_or_default();
        RepoRevSpec::from_path_components(repo, rev)
    }
}

impl fmt::Display for RepoRevSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.repo, self.rev_path_component())
    }
}

fn validate_rev_part(value: &str) -> Result<(), SpecError> {
    let reason = if value.contains(':') {
        "revisions may not contain ':'"
    } else if value.contains(COMMIT_ID_SEPARATOR) {
        "revisions may not contain '==='"
    } else {
        return Ok(());
    };
    Err(SpecError::InvalidRev {
        rev: value.to_string(),
        reason,
    })
}

/// JSON shape of a repo/rev pair as sent by the API.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct RawRepoRevSpec {
    #[serde(rename = "URI", skip_serializing_if = "String::is_empty")]
    uri: String,
    #[serde(rename = "RID", skip_serializing_if = "is_zero")]
    rid: u32,
    rev: String,
    #[serde(rename = "CommitID", skip_serializing_if = "String::is_empty")]
    commit_id: String,
}

fn is_zero(n: &u32) -> bool {
    *n == 0
}

impl TryFrom<RawRepoRevSpec> for RepoRevSpec {
    type Error = SpecError;

    fn try_from(raw: RawRepoRevSpec) -> Result<Self, Self::Error> {
        let repo = if !raw.uri.is_empty() {
            RepoSpec::Uri(raw.uri)
        } else if raw.rid > 0 {
            RepoSpec::Id(raw.rid)
        } else {
            return Err(SpecError::EmptyRepoSpec);
        };
        let spec = RepoRevSpec::new(repo, raw.rev)?;
        if raw.commit_id.is_empty() {
            Ok(spec)
        } else {
            spec.with_commit_id(raw.commit_id)
        }
    }
}

impl From<RepoRevSpec> for RawRepoRevSpec {
    fn from(spec: RepoRevSpec) -> Self {
        let (uri, rid) = match spec.repo {
            RepoSpec::Uri(uri) => (uri, 0),
            RepoSpec::Id(rid) => (String::new(), rid),
        };
        RawRepoRevSpec {
            uri,
            rid,
            rev: spec.rev,
            commit_id: spec.commit_id.unwrap_or_default(),
        }
    }
}
