use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing::{debug, info, info_span};
use tracing_subscriber::EnvFilter;

use srcgraph::delta::{
    sort_unit_deltas, DeltaFilter, DeltaListAffectedAuthorsOptions,
    DeltaListAffectedClientsOptions, DeltaListDefsOptions, DeltaListFilesOptions,
};
use srcgraph::report::{self, Report};
use srcgraph::{Client, Config, DeltaSpec, OrgSpec, RepoRevSpec, RepoSpec, SpecError};

/// srcgraph: query deltas and organizations on a Sourcegraph server.
#[derive(Parser, Debug)]
#[command(name = "srcgraph", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the changes between two revisions
    Delta {
        /// Base revision as repo@rev (e.g., github.com/foo/bar@v1.0)
        base: String,

        /// Head revision as repo@rev, or a bare rev in the base repository
        head: String,

        #[arg(short, long, value_enum, default_value_t = DeltaListing::Summary)]
        list: DeltaListing,

        /// Restrict listings to units of this type (requires --unit)
        #[arg(long, requires = "unit")]
        unit_type: Option<String>,

        /// Restrict listings to the unit with this name (requires --unit-type)
        #[arg(long, requires = "unit_type")]
        unit: Option<String>,

        /// Optional output file path for markdown report
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show an organization by name or by $<uid>
    Org {
        spec: String,

        #[arg(short, long, value_enum, default_value_t = OrgListing::Info)]
        list: OrgListing,

        /// Optional output file path for markdown report
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the route variables addressing a delta, without contacting the server
    RouteVars { base: String, head: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum DeltaListing {
    Summary,
    Units,
    Defs,
    Files,
    Authors,
    Clients,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OrgListing {
    Info,
    Members,
    Settings,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::RouteVars { base, head } => {
            let ds = parse_delta_spec(&base, &head)?;
            for (name, value) in ds.route_vars() {
                println!("{name}={value}");
            }
        }
        Command::Delta {
            base,
            head,
            list,
            unit_type,
            unit,
            output,
        } => {
            let _span = info_span!("delta", base = %base, head = %head).entered();
            let ds = parse_delta_spec(&base, &head)?;
            let filter = DeltaFilter {
                unit: unit.unwrap_or_default(),
                unit_type: unit_type.unwrap_or_default(),
            };

            info!("loading configuration");
            let config = Config::load()?;
            let client = Client::new(&config)?;
            debug!(base_url = %client.base_url(), "created client");

            let built_report = run_delta(&client, &ds, list, filter).await?;
            report::output(&built_report, output.as_deref())?;
        }
        Command::Org { spec, list, output } => {
            let _span = info_span!("org", spec = %spec).entered();
            let org: OrgSpec = spec.parse()?;

            info!("loading configuration");
            let config = Config::load()?;
            let client = Client::new(&config)?;

            let built_report = run_org(&client, &org, list).await?;
            report::output(&built_report, output.as_deref())?;
        }
    }

    info!("done");
    Ok(())
}

async fn run_delta(
    client: &Client,
    ds: &DeltaSpec,
    list: DeltaListing,
    filter: DeltaFilter,
) -> Result<Report, Box<dyn std::error::Error>> {
    let subtitle = if ds.is_cross_repo() {
        "cross-repository"
    } else {
        "same repository"
    };
    let mut built_report = Report::new(format!("Delta {}..{}", ds.base, ds.head), subtitle);
    let deltas = client.deltas();
    let unit_id = filter.unit_id();

    info!(listing = ?list, "fetching delta");
    match list {
        DeltaListing::Summary => {
            let (delta, _) = deltas.get(ds, None).await?;
            built_report.push(report::summary_section(&delta));
        }
        DeltaListing::Units => {
            let (units, _) = deltas.list_units(ds, None).await?;
            let units = match &unit_id {
                Some(id) => units.into_iter().filter(|u| id.matches_unit(u.current())).collect(),
                None => units,
            };
            built_report.push(report::units_section(&sort_unit_deltas(units)));
        }
        DeltaListing::Defs => {
            let opt = DeltaListDefsOptions {
                filter,
                ..Default::default()
            };
            let (defs, _) = deltas.list_defs(ds, Some(&opt)).await?;
            built_report.push(report::defs_section(&defs.sorted()));
        }
        DeltaListing::Files => {
            let opt = DeltaListFilesOptions {
                delta_filter: filter,
                ..Default::default()
            };
            let (files, _) = deltas.list_files(ds, Some(&opt)).await?;
            info!(stat = ?files.diff_stat(), "summed file diffs");
            built_report.push(report::files_section(&files));
        }
        DeltaListing::Authors => {
            let opt = DeltaListAffectedAuthorsOptions {
                filter,
                ..Default::default()
            };
            let (authors, _) = deltas.list_affected_authors(ds, Some(&opt)).await?;
            built_report.push(report::people_section("Affected authors", &authors));
        }
        DeltaListing::Clients => {
            let opt = DeltaListAffectedClientsOptions {
                filter,
                ..Default::default()
            };
            let (clients, _) = deltas.list_affected_clients(ds, Some(&opt)).await?;
            built_report.push(report::people_section("Affected clients", &clients));
        }
    }
    Ok(built_report)
}

async fn run_org(
    client: &Client,
    org: &OrgSpec,
    list: OrgListing,
) -> Result<Report, Box<dyn std::error::Error>> {
    let mut built_report = Report::new(format!("Organization {org}"), client.base_url().as_str());
    let orgs = client.orgs();

    info!(listing = ?list, "fetching organization");
    match list {
        OrgListing::Info => {
            let (info, _) = orgs.get(org).await?;
            built_report.push(report::org_section(&info));
        }
        OrgListing::Members => {
            let (members, _) = orgs.list_members(org, None).await?;
            built_report.push(report::members_section(&members));
        }
        OrgListing::Settings => {
            let (settings, _) = orgs.get_settings(org).await?;
            built_report.push(report::settings_section(&settings));
        }
    }
    Ok(built_report)
}

/// Parse `repo@rev`. A missing `@` means the repository's default revision.
fn parse_repo_rev(arg: &str) -> Result<RepoRevSpec, SpecError> {
    let (repo, rev) = arg.rsplit_once('@').unwrap_or((arg, ""));
    RepoRevSpec::from_path_components(RepoSpec::parse(repo)?, rev)
}

/// Parse the base and head arguments of a delta. A head without `@` is a
/// revision in the base repository.
fn parse_delta_spec(base: &str, head: &str) -> Result<DeltaSpec, SpecError> {
    let base = parse_repo_rev(base)?;
    let head = if head.contains('@') {
        parse_repo_rev(head)?
    } else {
        RepoRevSpec::from_path_components(base.repo().clone(), head)?
    };
    Ok(DeltaSpec::new(base, head))
}
