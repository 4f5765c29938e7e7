use base64::engine::general_purpose::URL_SAFE;
use base64::Engine;

use super::repo::{RepoRevSpec, RepoSpec};
use super::{require_var, RouteVars, SpecError, DELTA_HEAD_REV_VAR, REPO_SPEC_VAR};

/// Separates the encoded head repository from the head revision. Never
/// produced by the URL-safe base64 alphabet.
const CROSS_REPO_SEPARATOR: char = ':';

/// Specifies a delta: all changes between two revisions, possibly in two
/// different repositories.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeltaSpec {
    pub base: RepoRevSpec,
    pub head: RepoRevSpec,
}

/// How the head side travels in the `DeltaHeadRev` route variable.
#[derive(Debug, PartialEq, Eq)]
enum HeadRev<'a> {
    /// Head lives in the base repository; only its revision is sent.
    SameRepo { rev: String },
    /// Head lives elsewhere; its repository is embedded as base64.
    CrossRepo { repo: &'a RepoSpec, rev: String },
}

impl HeadRev<'_> {
    fn encode(&self) -> String {
        match self {
            HeadRev::SameRepo { rev } => rev.clone(),
            HeadRev::CrossRepo { repo, rev } => format!(
                "{}{CROSS_REPO_SEPARATOR}{}",
                URL_SAFE.encode(repo.path_component()),
                rev
            ),
        }
    }
}

impl DeltaSpec {
    pub fn new(base: RepoRevSpec, head: RepoRevSpec) -> DeltaSpec {
        DeltaSpec { base, head }
    }

    /// Whether base and head refer to different repositories.
    pub fn is_cross_repo(&self) -> bool {
        self.base.repo().path_component() != self.head.repo().path_component()
    }

    fn head_rev(&self) -> HeadRev<'_> {
        let rev = self.head.rev_path_component();
        if self.is_cross_repo() {
            HeadRev::CrossRepo {
                repo: self.head.repo(),
                rev,
            }
        } else {
            HeadRev::SameRepo { rev }
        }
    }

    /// Route variables for URLs addressing this delta: the base's
    /// `RepoSpec` and `Rev`, plus `DeltaHeadRev`.
    pub fn route_vars(&self) -> RouteVars {
        let mut vars = self.base.route_vars();
        vars.insert(DELTA_HEAD_REV_VAR.to_string(), self.head_rev().encode());
        vars
    }

    /// Inverse of [`DeltaSpec::route_vars`].
    pub fn from_route_vars(vars: &RouteVars) -> Result<DeltaSpec, SpecError> {
        let base = RepoRevSpec::from_route_vars(vars)?;
        let head_rev = require_var(vars, DELTA_HEAD_REV_VAR)?;

        let head = match head_rev.split_once(CROSS_REPO_SEPARATOR) {
            Some((repo_b64, rev)) => {
                let repo_pc = URL_SAFE
                    .decode(repo_b64)
                    .map_err(|e| malformed(head_rev, e.to_string()))?;
                let repo_pc = String::from_utf8(repo_pc)
                    .map_err(|e| malformed(head_rev, e.to_string()))?;
                let repo = RepoSpec::parse(&repo_pc)?;
                RepoRevSpec::from_path_components(repo, rev)?
            }
            None => {
                let repo = RepoSpec::parse(require_var(vars, REPO_SPEC_VAR)?)?;
                RepoRevSpec::from_path_components(repo, head_rev)?
            }
        };

        Ok(DeltaSpec { base, head })
    }
}

fn malformed(value: &str, reason: String) -> SpecError {
    SpecError::MalformedHeadRev {
        value: value.to_string(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rr(repo: &str, rev: &str) -> RepoRevSpec {
        RepoRevSpec::new(RepoSpec::Uri(repo.to_string()), rev).unwrap()
    }

    #[test]
    fn test_same_repo_route_vars() {
        let ds = DeltaSpec::new(rr("github.com/foo/bar", "v1"), rr("github.com/foo/bar", "v2"));
        let vars = ds.route_vars();
        assert_eq!(vars.get("RepoSpec").map(String::as_str), Some("github.com/foo/bar"));
        assert_eq!(vars.get("Rev").map(String::as_str), Some("v1"));
        assert_eq!(vars.get("DeltaHeadRev").map(String::as_str), Some("v2"));
        assert!(!ds.is_cross_repo());
        assert_eq!(DeltaSpec::from_route_vars(&vars).unwrap(), ds);
    }

    #[test]
    fn test_cross_repo_route_vars() {
        let ds = DeltaSpec::new(rr("github.com/foo/bar", "master"), rr("github.com/fork/bar", "topic"));
        let vars = ds.route_vars();
        let head_rev = vars.get("DeltaHeadRev").unwrap();
        assert_eq!(head_rev, "Z2l0aHViLmNvbS9mb3JrL2Jhcg==:topic");
        assert_eq!(head_rev.matches(':').count(), 1);
        assert!(ds.is_cross_repo());
        assert_eq!(DeltaSpec::from_route_vars(&vars).unwrap(), ds);
    }

    #[test]
    fn test_cross_repo_with_id_and_commit() {
        let head = RepoRevSpec::new(RepoSpec::Id(12), "dev")
            .unwrap()
            .with_commit_id("abc")
            .unwrap();
        let ds = DeltaSpec::new(rr("a/b", "master"), head);
        let vars = ds.route_vars();
        assert!(vars["DeltaHeadRev"].ends_with(":dev===abc"));
        assert_eq!(DeltaSpec::from_route_vars(&vars).unwrap(), ds);
    }

    #[test]
    fn test_decode_bad_base64() {
        let mut vars = rr("a/b", "v1").route_vars();
        vars.insert("DeltaHeadRev".into(), "!!notbase64:v2".into());
        let err = DeltaSpec::from_route_vars(&vars).unwrap_err();
        assert!(matches!(err, SpecError::MalformedHeadRev { .. }));
    }

    #[test]
    fn test_decode_invalid_embedded_repo() {
        let mut vars = rr("a/b", "v1").route_vars();
        vars.insert("DeltaHeadRev".into(), format!("{}:v2", URL_SAFE.encode("R$x")));
        let err = DeltaSpec::from_route_vars(&vars).unwrap_err();
        assert!(matches!(err, SpecError::InvalidRepoSpec(_)));
    }

    #[test]
    fn test_decode_missing_head_rev() {
        let vars = rr("a/b", "v1").route_vars();
        assert_eq!(
            DeltaSpec::from_route_vars(&vars),
            Err(SpecError::MissingVar(DELTA_HEAD_REV_VAR))
        );
    }

    #[test]
    fn test_decode_missing_base_repo() {
        let mut vars = RouteVars::new();
        vars.insert("DeltaHeadRev".into(), "v2".into());
        assert!(DeltaSpec::from_route_vars(&vars).is_err());
    }
}
