//! Organization endpoints.

pub mod types;

pub use types::{Org, OrgListMembersOptions, OrgSettings, PlanSettings};

use reqwest::Method;
use tracing::{debug, instrument};

use crate::client::{Client, ClientError, Response};
use crate::router::Route;
use crate::spec::OrgSpec;
use crate::types::Person;

/// Access to the organization-related endpoints.
pub struct OrgsService<'a> {
    client: &'a Client,
}

impl<'a> OrgsService<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Fetch an organization.
    #[instrument(skip(self, org), fields(org = %org))]
    pub async fn get(&self, org: &OrgSpec) -> Result<(Org, Response), ClientError> {
        let url = self.client.url::<()>(Route::Org, &org.route_vars(), None)?;
        let req = self.client.new_request::<()>(Method::GET, url, None)?;
        self.client.send_json(req).await
    }

    /// List members of an organization.
    #[instrument(skip(self, org, opt), fields(org = %org))]
    pub async fn list_members(
        &self,
        org: &OrgSpec,
        opt: Option<&OrgListMembersOptions>,
    ) -> Result<(Vec<Person>, Response), ClientError> {
        let url = self.client.url(Route::OrgMembers, &org.route_vars(), opt)?;
        let req = self.client.new_request::<()>(Method::GET, url, None)?;
        let (members, resp): (Option<Vec<Person>>, _) = self.client.send_json(req).await?;
        let members = members.unwrap_or_default();
        debug!(members = members.len(), "fetched org members");
        Ok((members, resp))
    }

    /// Fetch an org's configuration settings.
    #[instrument(skip(self, org), fields(org = %org))]
    pub async fn get_settings(&self, org: &OrgSpec) -> Result<(OrgSettings, Response), ClientError> {
        let url = self.client.url::<()>(Route::OrgSettings, &org.route_vars(), None)?;
        let req = self.client.new_request::<()>(Method::GET, url, None)?;
        let (settings, resp): (Option<OrgSettings>, _) = self.client.send_json(req).await?;
        Ok((settings.unwrap_or_default(), resp))
    }

    /// Update an org's configuration settings.
    #[instrument(skip(self, org, settings), fields(org = %org))]
    pub async fn update_settings(
        &self,
        org: &OrgSpec,
        settings: &OrgSettings,
    ) -> Result<Response, ClientError> {
        let url = self
            .client
            .url::<()>(Route::OrgSettingsUpdate, &org.route_vars(), None)?;
        let req = self.client.new_request(Method::PUT, url, Some(settings))?;
        let resp = self.client.send_empty(req).await?;
        debug!(status = %resp.status, "updated org settings");
        Ok(resp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::testing::FakeTransport;
    use crate::types::ListOptions;

    #[tokio::test]
    async fn test_get_org_by_id() {
        let fake = FakeTransport::new(200, r#"{"UID":42,"Login":"acme"}"#);
        let client = fake.client();
        let (org, _) = client.orgs().get(&OrgSpec::ById(42)).await.unwrap();
        assert_eq!(org.user.login, "acme");

        let req = fake.only_request();
        assert_eq!(req.method, Method::GET);
        assert_eq!(req.url.as_str(), "https://sourcegraph.example/.api/orgs/$42");
    }

    #[tokio::test]
    async fn test_list_members_with_paging() {
        let fake = FakeTransport::new(200, r#"[{"Login":"alice"},{"Email":"b@example.com"}]"#);
        let client = fake.client();
        let opt = OrgListMembersOptions {
            list: ListOptions {
                page: None,
                per_page: Some(50),
            },
        };
        let (members, _) = client
            .orgs()
            .list_members(&OrgSpec::ByName("acme".into()), Some(&opt))
            .await
            .unwrap();
        assert_eq!(members.len(), 2);
        assert_eq!(members[1].display_name(), "b@example.com");

        let req = fake.only_request();
        assert_eq!(req.url.path(), "/.api/orgs/acme/members");
        assert_eq!(req.url.query(), Some("PerPage=50"));
    }

    #[tokio::test]
    async fn test_get_settings_null() {
        let fake = FakeTransport::new(200, "null");
        let client = fake.client();
        let (settings, _) = client
            .orgs()
            .get_settings(&OrgSpec::ByName("acme".into()))
            .await
            .unwrap();
        assert!(settings.plan.is_none());
    }

    #[tokio::test]
    async fn test_update_settings_puts_body() {
        let fake = FakeTransport::new(204, "");
        let client = fake.client();
        let mut plan = serde_json::Map::new();
        plan.insert("Seats".into(), 10.into());
        let settings = OrgSettings {
            plan: Some(PlanSettings(plan)),
        };
        let resp = client
            .orgs()
            .update_settings(&OrgSpec::ByName("acme".into()), &settings)
            .await
            .unwrap();
        assert_eq!(resp.status.as_u16(), 204);

        let req = fake.only_request();
        assert_eq!(req.method, Method::PUT);
        assert_eq!(req.url.path(), "/.api/orgs/acme/settings");
        assert_eq!(req.body.unwrap()["Plan"]["Seats"], 10);
    }

    #[tokio::test]
    async fn test_update_settings_forbidden() {
        let fake = FakeTransport::new(403, "forbidden");
        let client = fake.client();
        let err = client
            .orgs()
            .update_settings(&OrgSpec::ById(1), &OrgSettings::default())
            .await
            .unwrap_err();
        assert_eq!(err.response().unwrap().status.as_u16(), 403);
    }
}
