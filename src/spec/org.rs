use std::fmt;
use std::str::FromStr;

use super::{RouteVars, SpecError, ORG_SPEC_VAR};

const ORG_ID_PREFIX: char = '$';

/// Specifies an organization by name, or by the user id of the "user"
/// record backing it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OrgSpec {
    ByName(String),
    ById(u32),
}

impl OrgSpec {
    /// Build a spec from the two-field form used by older callers. The
    /// name takes priority over the id.
    ///
    /// # Panics
    ///
    /// Panics if `org` is empty and `uid` is zero, or if `org` starts
    /// with `$`.
    pub fn from_parts(org: &str, uid: u32) -> OrgSpec {
        if !org.is_empty() {
            assert!(!org.starts_with(ORG_ID_PREFIX), "OrgSpec name {org:?} starts with '$'");
            OrgSpec::ByName(org.to_string())
        } else if uid > 0 {
            OrgSpec::ById(uid)
        } else {
            panic!("empty OrgSpec");
        }
    }

    /// Name-based spec for a name taken from user input. Names may not be
    /// empty or start with `$`, which marks a user id.
    pub fn by_name(name: impl Into<String>) -> Result<OrgSpec, SpecError> {
        let name = name.into();
        if name.is_empty() {
            return Err(SpecError::EmptyOrgSpec);
        }
        if name.starts_with(ORG_ID_PREFIX) {
            return Err(SpecError::InvalidOrgName(name));
        }
        Ok(OrgSpec::ByName(name))
    }

    /// The URL path component that specifies the org: the name, or `$`
    /// followed by the user id.
    ///
    /// # Panics
    ///
    /// Panics on an empty name or a zero id. Either means the calling code
    /// built the value from nothing. Also panics on a name starting with
    /// `$`, which would decode as a user id.
    pub fn path_component(&self) -> String {
        match self {
            OrgSpec::ByName(name) if name.starts_with(ORG_ID_PREFIX) => {
                panic!("OrgSpec name {name:?} starts with '$'")
            }
            OrgSpec::ByName(name) if !name.is_empty() => name.clone(),
            OrgSpec::ById(uid) if *uid > 0 => format!("{ORG_ID_PREFIX}{uid}"),
            _ => panic!("empty OrgSpec"),
        }
    }

    pub fn route_vars(&self) -> RouteVars {
        let mut vars = RouteVars::new();
        vars.insert(ORG_SPEC_VAR.to_string(), self.path_component());
        vars
    }

    /// Parse a string produced by [`OrgSpec::path_component`].
    pub fn parse(path_component: &str) -> Result<OrgSpec, SpecError> {
        if path_component.is_empty() {
            return Err(SpecError::EmptyOrgSpec);
        }
        match path_component.strip_prefix(ORG_ID_PREFIX) {
            Some(id) => match id.parse::<u32>() {
                Ok(uid) if uid > 0 => Ok(OrgSpec::ById(uid)),
                _ => Err(SpecError::InvalidOrgId(id.to_string())),
            },
            None => Ok(OrgSpec::ByName(path_component.to_string())),
        }
    }

    pub fn from_route_vars(vars: &RouteVars) -> Result<OrgSpec, SpecError> {
        let pc = vars
            .get(ORG_SPEC_VAR)
            .ok_or(SpecError::MissingVar(ORG_SPEC_VAR))?;
        OrgSpec::parse(pc)
    }
}

impl fmt::Display for OrgSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path_component())
    }
}

impl FromStr for OrgSpec {
    type Err = SpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrgSpec::parse(s)
    }
}
