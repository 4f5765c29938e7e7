//! Client for the Sourcegraph API: deltas between revisions, organizations,
//! and the codecs that address them in API routes.

pub mod client;
pub mod config;
pub mod delta;
pub mod org;
pub mod report;
pub mod router;
pub mod spec;
pub mod types;

pub use client::{Client, ClientError, HttpTransport, Transport};
pub use config::Config;
pub use spec::{DeltaSpec, OrgSpec, RepoRevSpec, RepoSpec, RouteVars, SpecError};
