use reqwest::Url;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::spec::RouteVars;

#[derive(Debug, Error)]
pub enum RouteError {
    #[error("Route {route:?} requires variable {var}")]
    MissingVar { route: Route, var: String },

    #[error("Unterminated variable in route template {0:?}")]
    BadTemplate(&'static str),

    #[error("Failed to build URL: {0}")]
    Url(String),

    #[error("Failed to encode query options: {0}")]
    Query(#[from] serde_json::Error),
}

/// Named API endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Delta,
    DeltaUnits,
    DeltaDefs,
    DeltaFiles,
    DeltaAffectedAuthors,
    DeltaAffectedClients,
    Org,
    OrgMembers,
    OrgSettings,
    OrgSettingsUpdate,
}

impl Route {
    /// Path template relative to the API root. `{Name}` is replaced by the
    /// route variable `Name`.
    pub fn template(self) -> &'static str {
        match self {
            Route::Delta => "repos/{RepoSpec}@{Rev}/.deltas/{DeltaHeadRev}",
            Route::DeltaUnits => "repos/{RepoSpec}@{Rev}/.deltas/{DeltaHeadRev}/.units",
            Route::DeltaDefs => "repos/{RepoSpec}@{Rev}/.deltas/{DeltaHeadRev}/.defs",
            Route::DeltaFiles => "repos/{RepoSpec}@{Rev}/.deltas/{DeltaHeadRev}/.files",
            Route::DeltaAffectedAuthors => {
                "repos/{RepoSpec}@{Rev}/.deltas/{DeltaHeadRev}/.affected-authors"
            }
            Route::DeltaAffectedClients => {
                "repos/{RepoSpec}@{Rev}/.deltas/{DeltaHeadRev}/.affected-clients"
            }
            Route::Org => "orgs/{OrgSpec}",
            Route::OrgMembers => "orgs/{OrgSpec}/members",
            Route::OrgSettings | Route::OrgSettingsUpdate => "orgs/{OrgSpec}/settings",
        }
    }

    /// Substitute route variables into the template.
    pub fn expand(self, vars: &RouteVars) -> Result<String, RouteError> {
        let template = self.template();
        let mut out = String::with_capacity(template.len() + 32);
        let mut rest = template;

        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            let close = after.find('}').ok_or(RouteError::BadTemplate(template))?;
            let name = &after[..close];
            let value = vars.get(name).ok_or_else(|| RouteError::MissingVar {
                route: self,
                var: name.to_string(),
            })?;
            push_escaped(&mut out, value);
            rest = &after[close + 1..];
        }
        out.push_str(rest);
        Ok(out)
    }
}

/// Route variables may carry `/` (repository URIs, branch names) and are
/// inserted raw; only characters that would end the path are escaped.
fn push_escaped(out: &mut String, value: &str) {
    for c in value.chars() {
        match c {
            '%' => out.push_str("%25"),
            '?' => out.push_str("%3F"),
            '#' => out.push_str("%23"),
            ' ' => out.push_str("%20"),
            _ => out.push(c),
        }
    }
}

/// Build the full URL for `route` under `base`, appending `opt` (if any) as
/// query parameters.
pub fn url<T: Serialize + ?Sized>(
    base: &Url,
    route: Route,
    vars: &RouteVars,
    opt: Option<&T>,
) -> Result<Url, RouteError> {
    let mut url = base
        .join(&route.expand(vars)?)
        .map_err(|e| RouteError::Url(e.to_string()))?;
    if let Some(opt) = opt {
        let pairs = query_pairs(opt)?;
        if !pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(pairs);
        }
    }
    Ok(url)
}

/// Flatten an options struct into query parameters. Null, empty and `false`
/// values are omitted.
///
/// Supported shapes are structs (including `#[serde(flatten)]` fields),
/// scalars, and sequences of scalars, which repeat the key. A nested struct
/// field is flattened under its own field names, so its parent's key is
/// lost; flatten it explicitly instead.
pub fn query_pairs<T: Serialize + ?Sized>(opt: &T) -> Result<Vec<(String, String)>, RouteError> {
    let mut pairs = Vec::new();
    collect_pairs(None, serde_json::to_value(opt)?, &mut pairs);
    Ok(pairs)
}

fn collect_pairs(key: Option<&str>, value: Value, pairs: &mut Vec<(String, String)>) {
    match (key, value) {
        (_, Value::Object(map)) => {
            for (k, v) in map {
                collect_pairs(Some(k.as_str()), v, pairs);
            }
        }
        (Some(key), Value::Array(items)) => {
            for item in items {
                collect_pairs(Some(key), item, pairs);
            }
        }
        (Some(key), Value::String(s)) if !s.is_empty() => pairs.push((key.to_string(), s)),
        (Some(key), Value::Number(n)) => pairs.push((key.to_string(), n.to_string())),
        (Some(key), Value::Bool(true)) => pairs.push((key.to_string(), "true".to_string())),
        _ => {}
    }
}
