use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::types::{ListOptions, User};

/// An organization. Organizations are backed by a "user" record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Org {
    #[serde(flatten)]
    pub user: User,
}

/// An org's configuration settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OrgSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan: Option<PlanSettings>,
}

/// Billing plan settings, passed through as the server defines them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlanSettings(pub Map<String, Value>);

#[derive(Debug, Clone, Default, Serialize)]
pub struct OrgListMembersOptions {
    #[serde(flatten)]
    pub list: ListOptions,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_org() {
        let org: Org =
            serde_json::from_str(r#"{"UID":42,"Login":"acme","IsOrganization":true}"#).unwrap();
        assert_eq!(org.user.uid, 42);
        assert!(org.user.is_organization);
    }

    #[test]
    fn test_settings_omit_empty_plan() {
        let json = serde_json::to_value(OrgSettings::default()).unwrap();
        assert_eq!(json, serde_json::json!({}));

        let settings: OrgSettings = serde_json::from_str(r#"{"Plan":{"Seats":5}}"#).unwrap();
        assert_eq!(settings.plan.unwrap().0["Seats"], 5);
    }
}
