//! Classification and ordering of base/head record pairs.
//!
//! A record present only in the head was added, one present only in the
//! base was deleted, and one present in both was changed. Listings order
//! records by category (added, then changed, then deleted) and then by the
//! natural key of the entity that still exists: the head, or the base for
//! deleted records.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;

use crate::types::{Def, SourceUnit};

/// One entity as it appears in the base and head of a delta.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change<T> {
    Added { head: T },
    Changed { base: T, head: T },
    Deleted { base: T },
}

/// Category of a [`Change`]. Declaration order is listing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ChangeKind {
    Added,
    Changed,
    Deleted,
}

impl<T> Change<T> {
    /// Pair up the two sides. Returns `None` when both are absent.
    pub fn from_sides(base: Option<T>, head: Option<T>) -> Option<Change<T>> {
        match (base, head) {
            (None, Some(head)) => Some(Change::Added { head }),
            (Some(base), Some(head)) => Some(Change::Changed { base, head }),
            (Some(base), None) => Some(Change::Deleted { base }),
            (None, None) => None,
        }
    }

    pub fn kind(&self) -> ChangeKind {
        match self {
            Change::Added { .. } => ChangeKind::Added,
            Change::Changed { .. } => ChangeKind::Changed,
            Change::Deleted { .. } => ChangeKind::Deleted,
        }
    }

    /// Not present in base, present in head.
    pub fn added(&self) -> bool {
        self.kind() == ChangeKind::Added
    }

    /// Present in both base and head.
    pub fn changed(&self) -> bool {
        self.kind() == ChangeKind::Changed
    }

    /// Present in base, not present in head.
    pub fn deleted(&self) -> bool {
        self.kind() == ChangeKind::Deleted
    }

    pub fn base(&self) -> Option<&T> {
        match self {
            Change::Added { .. } => None,
            Change::Changed { base, .. } | Change::Deleted { base } => Some(base),
        }
    }

    pub fn head(&self) -> Option<&T> {
        match self {
            Change::Added { head } | Change::Changed { head, .. } => Some(head),
            Change::Deleted { .. } => None,
        }
    }

    /// The side that orders this record: the head, unless it was deleted.
    pub fn current(&self) -> &T {
        match self {
            Change::Added { head } | Change::Changed { head, .. } => head,
            Change::Deleted { base } => base,
        }
    }
}

/// Lexicographic identity of an entity within a listing.
pub trait NaturalKey {
    type Key<'a>: Ord
    where
        Self: 'a;

    fn natural_key(&self) -> Self::Key<'_>;
}

impl NaturalKey for SourceUnit {
    type Key<'a> = (&'a str, &'a str);

    /// (type, name)
    fn natural_key(&self) -> Self::Key<'_> {
        (self.unit_type.as_str(), self.name.as_str())
    }
}

impl NaturalKey for Def {
    type Key<'a> = (&'a str, &'a str, &'a str);

    /// (unit type, unit, path)
    fn natural_key(&self) -> Self::Key<'_> {
        (
            self.unit_type.as_str(),
            self.unit.as_str(),
            self.path.as_str(),
        )
    }
}

impl<T: NaturalKey> Change<T> {
    pub fn sort_key(&self) -> (ChangeKind, T::Key<'_>) {
        (self.kind(), self.current().natural_key())
    }

    /// Listing order: category rank first, then natural key.
    pub fn listing_cmp(&self, other: &Change<T>) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

/// Order changes for display. The sort is stable, so records with equal keys
/// keep their relative order.
pub fn sort_changes<T: NaturalKey>(mut changes: Vec<Change<T>>) -> Vec<Change<T>> {
    changes.sort_by(Change::listing_cmp);
    changes
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Sides<T> {
    base: Option<T>,
    head: Option<T>,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct SidesRef<'a, T> {
    base: Option<&'a T>,
    head: Option<&'a T>,
}

impl<T: Serialize> Serialize for Change<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        SidesRef {
            base: self.base(),
            head: self.head(),
        }
        .serialize(serializer)
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Change<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let sides = Sides::<T>::deserialize(deserializer)?;
        Change::from_sides(sides.base, sides.head)
            .ok_or_else(|| D::Error::custom("delta record has neither base nor head"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(unit_type: &str, name: &str) -> SourceUnit {
        SourceUnit {
            unit_type: unit_type.to_string(),
            name: name.to_string(),
            ..Default::default()
        }
    }

    fn def(unit_type: &str, unit: &str, path: &str) -> Def {
        Def {
            unit_type: unit_type.to_string(),
            unit: unit.to_string(),
            path: path.to_string(),
            ..Default::default()
        }
    }

    fn added<T>(head: T) -> Change<T> {
        Change::Added { head }
    }

    fn changed<T: Clone>(x: T) -> Change<T> {
        Change::Changed {
            base: x.clone(),
            head: x,
        }
    }

    fn deleted<T>(base: T) -> Change<T> {
        Change::Deleted { base }
    }

    #[test]
    fn test_classification_is_exclusive() {
        let cases = [
            added(unit("t", "a")),
            changed(unit("t", "b")),
            deleted(unit("t", "c")),
        ];
        for c in &cases {
            let flags = [c.added(), c.changed(), c.deleted()];
            assert_eq!(flags.iter().filter(|f| **f).count(), 1, "{c:?}");
        }
        assert!(cases[0].added() && cases[0].base().is_none());
        assert!(cases[1].changed() && cases[1].base().is_some() && cases[1].head().is_some());
        assert!(cases[2].deleted() && cases[2].head().is_none());
    }

    #[test]
    fn test_from_sides() {
        assert!(Change::<u8>::from_sides(None, None).is_none());
        assert_eq!(Change::from_sides(None, Some(1)), Some(Change::Added { head: 1 }));
        assert_eq!(Change::from_sides(Some(1), None), Some(Change::Deleted { base: 1 }));
        assert_eq!(
            Change::from_sides(Some(1), Some(2)),
            Some(Change::Changed { base: 1, head: 2 })
        );
    }

    #[test]
    fn test_sort_units_partitions_by_category() {
        let input = vec![
            deleted(unit("GoPackage", "a")),
            changed(unit("GoPackage", "z")),
            added(unit("PipPackage", "b")),
            deleted(unit("GoPackage", "0")),
            added(unit("GoPackage", "y")),
            changed(unit("GoPackage", "c")),
            added(unit("GoPackage", "b")),
        ];
        let sorted = sort_changes(input);
        let got: Vec<(ChangeKind, &str, &str)> = sorted
            .iter()
            .map(|c| (c.kind(), c.current().unit_type.as_str(), c.current().name.as_str()))
            .collect();
        assert_eq!(
            got,
            vec![
                (ChangeKind::Added, "GoPackage", "b"),
                (ChangeKind::Added, "GoPackage", "y"),
                (ChangeKind::Added, "PipPackage", "b"),
                (ChangeKind::Changed, "GoPackage", "c"),
                (ChangeKind::Changed, "GoPackage", "z"),
                (ChangeKind::Deleted, "GoPackage", "0"),
                (ChangeKind::Deleted, "GoPackage", "a"),
            ]
        );
    }

    #[test]
    fn test_changed_orders_by_head() {
        let a = Change::Changed {
            base: unit("t", "zzz"),
            head: unit("t", "a"),
        };
        let b = Change::Changed {
            base: unit("t", "aaa"),
            head: unit("t", "b"),
        };
        assert_eq!(a.listing_cmp(&b), Ordering::Less);
    }

    #[test]
    fn test_sort_defs_by_unit_type_unit_path() {
        let input = vec![
            added(def("GoPackage", "u2", "A")),
            added(def("GoPackage", "u1", "B")),
            added(def("GoPackage", "u1", "A")),
            added(def("CommonJSPackage", "u9", "Z")),
        ];
        let sorted = sort_changes(input);
        let paths: Vec<(&str, &str)> = sorted
            .iter()
            .map(|c| (c.current().unit.as_str(), c.current().path.as_str()))
            .collect();
        assert_eq!(paths, vec![("u9", "Z"), ("u1", "A"), ("u1", "B"), ("u2", "A")]);
    }

    #[test]
    fn test_equal_keys_keep_input_order() {
        let first = Change::Changed {
            base: def("t", "u", "p"),
            head: Def {
                name: "first".into(),
                ..def("t", "u", "p")
            },
        };
        let second = Change::Changed {
            base: def("t", "u", "p"),
            head: Def {
                name: "second".into(),
                ..def("t", "u", "p")
            },
        };
        assert_eq!(first.listing_cmp(&second), Ordering::Equal);
        let sorted = sort_changes(vec![first.clone(), second.clone()]);
        assert_eq!(sorted, vec![first, second]);
    }

    #[test]
    fn test_ordering_is_transitive_over_all_triples() {
        let pool = vec![
            added(unit("a", "1")),
            added(unit("b", "0")),
            changed(unit("a", "1")),
            changed(unit("a", "0")),
            deleted(unit("a", "0")),
            deleted(unit("c", "9")),
        ];
        for x in &pool {
            for y in &pool {
                assert_eq!(x.listing_cmp(y), y.listing_cmp(x).reverse());
                for z in &pool {
                    if x.listing_cmp(y) != Ordering::Greater && y.listing_cmp(z) != Ordering::Greater {
                        assert_ne!(x.listing_cmp(z), Ordering::Greater);
                    }
                }
            }
        }
    }

    #[test]
    fn test_wire_format() {
        let c: Change<SourceUnit> =
            serde_json::from_str(r#"{"Base":null,"Head":{"Name":"p","Type":"GoPackage"}}"#).unwrap();
        assert!(c.added());
        assert_eq!(c.current().name, "p");

        let d: Change<SourceUnit> = serde_json::from_str(r#"{"Base":{"Name":"q"}}"#).unwrap();
        assert!(d.deleted());

        let json = serde_json::to_value(&d).unwrap();
        assert!(json["Head"].is_null());
        assert_eq!(json["Base"]["Name"], "q");
    }

    #[test]
    fn test_wire_format_rejects_empty_pair() {
        let res: Result<Change<SourceUnit>, _> = serde_json::from_str(r#"{"Base":null,"Head":null}"#);
        assert!(res.is_err());
        let res: Result<Change<SourceUnit>, _> = serde_json::from_str("{}");
        assert!(res.is_err());
    }
}
