//! Entities returned by the API that this crate only carries around.
//!
//! Field names follow the server's JSON encoding. Every field defaults so
//! that additions on the server side never break decoding.

use serde::{Deserialize, Deserializer, Serialize};

/// Decode JSON `null` (a nil slice on the server) as the default value.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A repository hosted on or mirrored by the server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Repo {
    #[serde(rename = "URI")]
    pub uri: String,
    #[serde(rename = "RID")]
    pub rid: u32,
    pub name: String,
    pub description: String,
    pub default_branch: String,
    pub fork: bool,
    pub private: bool,
}

/// A commit author or committer signature.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Signature {
    pub name: String,
    pub email: String,
    pub date: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Commit {
    #[serde(rename = "ID")]
    pub id: String,
    pub author: Signature,
    pub committer: Option<Signature>,
    pub message: String,
}

/// A build of a repository at a commit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Build {
    #[serde(rename = "BID")]
    pub bid: u64,
    pub repo: String,
    #[serde(rename = "CommitID")]
    pub commit_id: String,
    /// Whether the build ended successfully
    pub success: bool,
    /// Whether the build ended in failure
    pub failure: bool,
    pub started_at: Option<String>,
    pub ended_at: Option<String>,
}

/// A registered user or a committer email address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Person {
    pub email: String,
    pub login: String,
    #[serde(rename = "UID")]
    pub uid: u32,
    pub full_name: String,
    #[serde(rename = "AvatarURL")]
    pub avatar_url: String,
}

impl Person {
    /// Best human-readable handle for this person.
    pub fn display_name(&self) -> &str {
        [&self.login, &self.full_name, &self.email]
            .into_iter()
            .find(|s| !s.is_empty())
            .map(String::as_str)
            .unwrap_or("(unknown)")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct User {
    #[serde(rename = "UID")]
    pub uid: u32,
    pub login: String,
    pub name: String,
    pub is_organization: bool,
    #[serde(rename = "AvatarURL")]
    pub avatar_url: String,
    pub location: String,
    pub company: String,
    #[serde(rename = "HomepageURL")]
    pub homepage_url: String,
}

/// A named, typed grouping of source code (a package, a module, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct SourceUnit {
    pub name: String,
    #[serde(rename = "Type")]
    pub unit_type: String,
    pub repo: String,
    #[serde(rename = "CommitID")]
    pub commit_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub files: Vec<String>,
    pub dir: String,
}

/// A named program entity (function, type, variable, ...) within a unit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Def {
    pub repo: String,
    #[serde(rename = "CommitID")]
    pub commit_id: String,
    pub unit_type: String,
    pub unit: String,
    pub path: String,
    pub name: String,
    pub kind: String,
    pub file: String,
    pub def_start: u32,
    pub def_end: u32,
    pub exported: bool,
}

/// Pagination parameters shared by list endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ListOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_page: Option<u32>,
}
