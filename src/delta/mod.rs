//! Delta endpoints. A delta is all of the changes between two commits,
//! possibly from two different repositories: file diffs, definition-level
//! diffs, and the people affected.

pub mod diff;
pub mod order;
pub mod types;

pub use diff::{DeltaFiles, DiffStat, FileDiff, Hunk};
pub use order::{sort_changes, Change, ChangeKind, NaturalKey};
pub use types::{
    sort_unit_deltas, BuildsStatus, DefDelta, Delta, DeltaAffectedPerson, DeltaDefs, DeltaFilter,
    DeltaGetOptions, DeltaListAffectedAuthorsOptions, DeltaListAffectedClientsOptions,
    DeltaListDefsOptions, DeltaListFilesOptions, DeltaListUnitsOptions, UnitDelta, UnitId,
};

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, instrument};

use crate::client::{Client, ClientError, Response};
use crate::router::Route;
use crate::spec::DeltaSpec;

/// Access to the delta-related endpoints.
pub struct DeltasService<'a> {
    client: &'a Client,
}

impl<'a> DeltasService<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    async fn get_json<T, O>(
        &self,
        route: Route,
        ds: &DeltaSpec,
        opt: Option<&O>,
    ) -> Result<(T, Response), ClientError>
    where
        T: DeserializeOwned,
        O: Serialize,
    {
        let url = self.client.url(route, &ds.route_vars(), opt)?;
        let req = self.client.new_request::<()>(Method::GET, url, None)?;
        self.client.send_json(req).await
    }

    /// Fetch a summary of a delta.
    #[instrument(skip(self, ds, opt), fields(base = %ds.base, head = %ds.head))]
    pub async fn get(
        &self,
        ds: &DeltaSpec,
        opt: Option<&DeltaGetOptions>,
    ) -> Result<(Delta, Response), ClientError> {
        let (delta, resp): (Delta, _) = self.get_json(Route::Delta, ds, opt).await?;
        debug!(build_status = ?delta.build_status(), "fetched delta");
        Ok((delta, resp))
    }

    /// List units added/changed/deleted in a delta.
    #[instrument(skip(self, ds, opt), fields(base = %ds.base, head = %ds.head))]
    pub async fn list_units(
        &self,
        ds: &DeltaSpec,
        opt: Option<&DeltaListUnitsOptions>,
    ) -> Result<(Vec<UnitDelta>, Response), ClientError> {
        let (units, resp): (Option<Vec<UnitDelta>>, _) =
            self.get_json(Route::DeltaUnits, ds, opt).await?;
        let units = units.unwrap_or_default();
        debug!(units = units.len(), "fetched unit deltas");
        Ok((units, resp))
    }

    /// List definitions added/changed/deleted in a delta.
    #[instrument(skip(self, ds, opt), fields(base = %ds.base, head = %ds.head))]
    pub async fn list_defs(
        &self,
        ds: &DeltaSpec,
        opt: Option<&DeltaListDefsOptions>,
    ) -> Result<(DeltaDefs, Response), ClientError> {
        let (defs, resp): (Option<DeltaDefs>, _) = self.get_json(Route::DeltaDefs, ds, opt).await?;
        let defs = defs.unwrap_or_default();
        debug!(defs = defs.defs.len(), "fetched def deltas");
        Ok((defs, resp))
    }

    /// Fetch the file diff for a delta.
    #[instrument(skip(self, ds, opt), fields(base = %ds.base, head = %ds.head))]
    pub async fn list_files(
        &self,
        ds: &DeltaSpec,
        opt: Option<&DeltaListFilesOptions>,
    ) -> Result<(DeltaFiles, Response), ClientError> {
        let (files, resp): (Option<DeltaFiles>, _) =
            self.get_json(Route::DeltaFiles, ds, opt).await?;
        let files = files.unwrap_or_default();
        debug!(files = files.file_diffs.len(), "fetched file diffs");
        Ok((files, resp))
    }

    /// List authors whose code is added/deleted/changed in a delta.
    #[instrument(skip(self, ds, opt), fields(base = %ds.base, head = %ds.head))]
    pub async fn list_affected_authors(
        &self,
        ds: &DeltaSpec,
        opt: Option<&DeltaListAffectedAuthorsOptions>,
    ) -> Result<(Vec<DeltaAffectedPerson>, Response), ClientError> {
        let (authors, resp): (Option<Vec<DeltaAffectedPerson>>, _) =
            self.get_json(Route::DeltaAffectedAuthors, ds, opt).await?;
        let authors = authors.unwrap_or_default();
        debug!(authors = authors.len(), "fetched affected authors");
        Ok((authors, resp))
    }

    /// List clients whose code is affected by a delta.
    #[instrument(skip(self, ds, opt), fields(base = %ds.base, head = %ds.head))]
    pub async fn list_affected_clients(
        &self,
        ds: &DeltaSpec,
        opt: Option<&DeltaListAffectedClientsOptions>,
    ) -> Result<(Vec<DeltaAffectedPerson>, Response), ClientError> {
        let (clients, resp): (Option<Vec<DeltaAffectedPerson>>, _) =
            self.get_json(Route::DeltaAffectedClients, ds, opt).await?;
        let clients = clients.unwrap_or_default();
        debug!(clients = clients.len(), "fetched affected clients");
        Ok((clients, resp))
    }
}
