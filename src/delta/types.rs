use serde::{Deserialize, Serialize};

use super::diff::DiffStat;
use super::order::{sort_changes, Change};
use crate::spec::{DeltaSpec, RepoRevSpec};
use crate::types::{null_as_default, Build, Commit, Def, ListOptions, Person, Repo, SourceUnit};

/// A source unit as it appears in the base and head of a delta.
pub type UnitDelta = Change<SourceUnit>;

/// A definition as it appears in the base and head of a delta.
pub type DefDelta = Change<Def>;

/// Order unit deltas for display: added, then changed, then deleted, each
/// by (type, name).
pub fn sort_unit_deltas(units: Vec<UnitDelta>) -> Vec<UnitDelta> {
    sort_changes(units)
}

/// The difference between two commits, possibly in two separate
/// repositories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Delta {
    pub base: RepoRevSpec,
    pub head: RepoRevSpec,
    #[serde(default)]
    pub base_commit: Option<Commit>,
    #[serde(default)]
    pub head_commit: Option<Commit>,
    #[serde(default)]
    pub base_repo: Option<Repo>,
    #[serde(default)]
    pub head_repo: Option<Repo>,
    #[serde(default)]
    pub base_build: Option<Build>,
    #[serde(default)]
    pub head_build: Option<Build>,
}

/// Combined outcome of a delta's base and head builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildsStatus {
    /// Both builds are present and ended successfully.
    BothSucceeded,
    /// At least one present build ended in failure.
    Failed,
    /// A build is missing or has not finished; nothing has failed.
    Undetermined,
}

impl Delta {
    pub fn delta_spec(&self) -> DeltaSpec {
        DeltaSpec::new(self.base.clone(), self.head.clone())
    }

    /// True iff both the base and head builds are present and ended
    /// successfully.
    pub fn base_and_head_builds_successful(&self) -> bool {
        self.build_status() == BuildsStatus::BothSucceeded
    }

    pub fn build_status(&self) -> BuildsStatus {
        let builds = [self.base_build.as_ref(), self.head_build.as_ref()];
        if builds.iter().flatten().any(|b| b.failure) {
            BuildsStatus::Failed
        } else if builds.iter().all(|b| b.is_some_and(|b| b.success)) {
            BuildsStatus::BothSucceeded
        } else {
            BuildsStatus::Undetermined
        }
    }
}

/// Definitions added/changed/deleted in a delta.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct DeltaDefs {
    #[serde(deserialize_with = "null_as_default")]
    pub defs: Vec<DefDelta>,

    /// Overall diffstat as computed by the server. Not subject to
    /// pagination, so it is not the sum of `defs`.
    pub diff_stat: DiffStat,
}

impl DeltaDefs {
    /// Order defs for display: added, then changed, then deleted, each by
    /// (unit type, unit, path).
    pub fn sorted(mut self) -> DeltaDefs {
        self.defs = sort_changes(self.defs);
        self
    }
}

/// A person (registered user or committer email address) affected by a
/// delta, with the defs that are the reason why.
///
/// When listed as an author, the defs are ones the person committed. When
/// listed as a client, they are defs the person uses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeltaAffectedPerson {
    #[serde(flatten)]
    pub person: Person,

    #[serde(rename = "Defs", default, deserialize_with = "null_as_default")]
    pub defs: Vec<Def>,
}

/// Identifies a source unit by type and name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UnitId {
    pub unit_type: String,
    pub name: String,
}

impl UnitId {
    pub fn matches_unit(&self, unit: &SourceUnit) -> bool {
        unit.unit_type == self.unit_type && unit.name == self.name
    }

    pub fn matches_def(&self, def: &Def) -> bool {
        def.unit_type == self.unit_type && def.unit == self.name
    }
}

/// Restricts delta listings to a single source unit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DeltaFilter {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub unit: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub unit_type: String,
}

impl DeltaFilter {
    /// The unit to filter by; only set when both type and name are given.
    pub fn unit_id(&self) -> Option<UnitId> {
        if self.unit.is_empty() || self.unit_type.is_empty() {
            return None;
        }
        Some(UnitId {
            unit_type: self.unit_type.clone(),
            name: self.unit.clone(),
        })
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DeltaGetOptions {}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DeltaListUnitsOptions {}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DeltaListDefsOptions {
    #[serde(flatten)]
    pub filter: DeltaFilter,
    #[serde(flatten)]
    pub list: ListOptions,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DeltaListFilesOptions {
    /// Whether files should have their contents code-formatted
    /// (syntax-highlighted and reference-linked) if they contain code.
    pub formatted: bool,

    /// Only return files whose name matches this.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub filter: String,

    #[serde(flatten)]
    pub delta_filter: DeltaFilter,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DeltaListAffectedAuthorsOptions {
    #[serde(flatten)]
    pub filter: DeltaFilter,
    #[serde(flatten)]
    pub list: ListOptions,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DeltaListAffectedClientsOptions {
    #[serde(flatten)]
    pub filter: DeltaFilter,
    #[serde(flatten)]
    pub list: ListOptions,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::query_pairs;
    use crate::spec::RepoSpec;

    fn rr(repo: &str, rev: &str) -> RepoRevSpec {
        RepoRevSpec::new(RepoSpec::Uri(repo.into()), rev).unwrap()
    }

    fn delta(base_build: Option<Build>, head_build: Option<Build>) -> Delta {
        Delta {
            base: rr("a/b", "v1"),
            head: rr("a/b", "v2"),
            base_commit: None,
            head_commit: None,
            base_repo: None,
            head_repo: None,
            base_build,
            head_build,
        }
    }

    fn build(success: bool) -> Build {
        Build {
            success,
            failure: !success,
            ..Default::default()
        }
    }

    #[test]
    fn test_builds_both_successful() {
        let d = delta(Some(build(true)), Some(build(true)));
        assert!(d.base_and_head_builds_successful());
        assert_eq!(d.build_status(), BuildsStatus::BothSucceeded);
    }

    #[test]
    fn test_failed_base_absent_head() {
        let d = delta(Some(build(false)), None);
        assert!(!d.base_and_head_builds_successful());
        assert_eq!(d.build_status(), BuildsStatus::Failed);
    }

    #[test]
    fn test_absent_builds_are_undetermined() {
        let d = delta(Some(build(true)), None);
        assert!(!d.base_and_head_builds_successful());
        assert_eq!(d.build_status(), BuildsStatus::Undetermined);
        assert_eq!(delta(None, None).build_status(), BuildsStatus::Undetermined);
    }

    #[test]
    fn test_unfinished_build_is_undetermined() {
        let running = Build::default();
        let d = delta(Some(build(true)), Some(running));
        assert_eq!(d.build_status(), BuildsStatus::Undetermined);
    }

    #[test]
    fn test_delta_spec() {
        let d = delta(None, None);
        let ds = d.delta_spec();
        assert_eq!(ds.base, d.base);
        assert_eq!(ds.head, d.head);
    }

    #[test]
    fn test_decode_delta() {
        let d: Delta = serde_json::from_str(
            r#"{"Base":{"URI":"a/b","Rev":"v1"},"Head":{"URI":"a/b","Rev":"v2"},"BaseBuild":{"BID":3,"Success":true},"HeadBuild":null}"#,
        )
        .unwrap();
        assert_eq!(d.base.rev(), "v1");
        assert_eq!(d.base_build.as_ref().map(|b| b.bid), Some(3));
        assert!(d.head_build.is_none());
    }

    #[test]
    fn test_decode_delta_defs() {
        let defs: DeltaDefs = serde_json::from_str(
            r#"{"Defs":[{"Base":null,"Head":{"Path":"A"}},{"Base":{"Path":"B"},"Head":null}],"DiffStat":{"Added":5,"Changed":1,"Deleted":2}}"#,
        )
        .unwrap();
        assert_eq!(defs.defs.len(), 2);
        assert!(defs.defs[0].added());
        assert!(defs.defs[1].deleted());
        assert_eq!(defs.diff_stat, DiffStat::new(5, 1, 2));
    }

    #[test]
    fn test_delta_defs_sorted_keeps_diff_stat() {
        let defs = DeltaDefs {
            defs: vec![
                Change::Deleted {
                    base: Def {
                        path: "A".into(),
                        ..Default::default()
                    },
                },
                Change::Added {
                    head: Def {
                        path: "Z".into(),
                        ..Default::default()
                    },
                },
            ],
            diff_stat: DiffStat::new(9, 9, 9),
        };
        let sorted = defs.sorted();
        assert!(sorted.defs[0].added());
        assert!(sorted.defs[1].deleted());
        assert_eq!(sorted.diff_stat, DiffStat::new(9, 9, 9));
    }

    #[test]
    fn test_decode_affected_person() {
        let p: DeltaAffectedPerson = serde_json::from_str(
            r#"{"Login":"alice","Email":"a@example.com","Defs":[{"Path":"F"}]}"#,
        )
        .unwrap();
        assert_eq!(p.person.login, "alice");
        assert_eq!(p.defs[0].path, "F");

        let p: DeltaAffectedPerson = serde_json::from_str(r#"{"Login":"bob","Defs":null}"#).unwrap();
        assert!(p.defs.is_empty());
    }

    #[test]
    fn test_filter_unit_id_requires_both() {
        let mut f = DeltaFilter {
            unit: "github.com/a/b".into(),
            ..Default::default()
        };
        assert!(f.unit_id().is_none());
        f.unit_type = "GoPackage".into();
        let id = f.unit_id().unwrap();
        assert!(id.matches_def(&Def {
            unit_type: "GoPackage".into(),
            unit: "github.com/a/b".into(),
            ..Default::default()
        }));
        assert!(!id.matches_unit(&SourceUnit::default()));
    }

    #[test]
    fn test_list_files_options_query() {
        let opt = DeltaListFilesOptions {
            formatted: true,
            filter: String::new(),
            delta_filter: DeltaFilter {
                unit: "u".into(),
                unit_type: "t".into(),
            },
        };
        let mut pairs = query_pairs(&opt).unwrap();
        pairs.sort();
        assert_eq!(
            pairs,
            vec![
                ("Formatted".to_string(), "true".to_string()),
                ("Unit".to_string(), "u".to_string()),
                ("UnitType".to_string(), "t".to_string()),
            ]
        );
    }

    #[test]
    fn test_list_defs_options_query() {
        let opt = DeltaListDefsOptions {
            list: ListOptions {
                page: Some(2),
                per_page: None,
            },
            ..Default::default()
        };
        assert_eq!(
            query_pairs(&opt).unwrap(),
            vec![("Page".to_string(), "2".to_string())]
        );
    }
}
