pub mod types;

pub use types::{Entry, EntryKind, Report, Section};

use colored::Colorize;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::delta::{
    BuildsStatus, DeltaAffectedPerson, DeltaDefs, DeltaFiles, DiffStat, Delta, UnitDelta,
};
use crate::org::{Org, OrgSettings};
use crate::types::Person;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to write report file: {0}")]
    FileWrite(#[from] std::io::Error),
}

impl Report {
    pub fn new(title: impl Into<String>, subtitle: impl Into<String>) -> Self {
        Report {
            title: title.into(),
            subtitle: subtitle.into(),
            sections: Vec::new(),
        }
    }

    pub fn push(&mut self, section: Section) {
        self.sections.push(section);
    }
}

/// Overview of a delta: resolved commits and build outcome.
pub fn summary_section(delta: &Delta) -> Section {
    let mut entries = Vec::new();
    for (side, commit) in [("base", &delta.base_commit), ("head", &delta.head_commit)] {
        if let Some(commit) = commit {
            let subject = commit.message.lines().next().unwrap_or_default();
            entries.push(Entry::info(format!("{side} commit {}", short_id(&commit.id))).with_detail(subject));
        }
    }
    let builds = match delta.build_status() {
        BuildsStatus::BothSucceeded => "both builds succeeded",
        BuildsStatus::Failed => "a build failed",
        BuildsStatus::Undetermined => "build status unknown",
    };
    entries.push(Entry::info(builds));

    Section {
        heading: "Delta".to_string(),
        stat: None,
        entries,
    }
}

/// Units added/changed/deleted, in the order given.
pub fn units_section(units: &[UnitDelta]) -> Section {
    let entries = units
        .iter()
        .map(|u| Entry {
            kind: u.kind().into(),
            text: u.current().name.clone(),
            detail: Some(u.current().unit_type.clone()),
        })
        .collect();
    Section {
        heading: format!("Source units ({})", units.len()),
        stat: None,
        entries,
    }
}

/// Defs added/changed/deleted, with the server's overall diffstat.
pub fn defs_section(defs: &DeltaDefs) -> Section {
    let entries = defs
        .defs
        .iter()
        .map(|d| {
            let def = d.current();
            Entry {
                kind: d.kind().into(),
                text: def.path.clone(),
                detail: Some(format!("{} {}", def.unit_type, def.unit)),
            }
        })
        .collect();
    Section {
        heading: format!("Definitions ({})", defs.defs.len()),
        stat: Some(defs.diff_stat),
        entries,
    }
}

/// Per-file diffstats plus their sum.
pub fn files_section(files: &DeltaFiles) -> Section {
    let entries = files
        .file_diffs
        .iter()
        .map(|f| {
            let kind = if f.is_new() {
                EntryKind::Added
            } else if f.is_deleted() {
                EntryKind::Deleted
            } else {
                EntryKind::Changed
            };
            Entry {
                kind,
                text: f.name().to_string(),
                detail: Some(format_stat(f.stat())),
            }
        })
        .collect();
    Section {
        heading: format!("Files ({})", files.file_diffs.len()),
        stat: Some(files.diff_stat()),
        entries,
    }
}

pub fn people_section(heading: &str, people: &[DeltaAffectedPerson]) -> Section {
    let entries = people
        .iter()
        .map(|p| Entry::info(p.person.display_name()).with_detail(format!("{} defs", p.defs.len())))
        .collect();
    Section {
        heading: format!("{heading} ({})", people.len()),
        stat: None,
        entries,
    }
}

pub fn org_section(org: &Org) -> Section {
    let user = &org.user;
    let mut entries = vec![Entry::info(format!("login {}", user.login))];
    if !user.name.is_empty() {
        entries.push(Entry::info(format!("name {}", user.name)));
    }
    entries.push(Entry::info(format!("uid {}", user.uid)));
    if !user.homepage_url.is_empty() {
        entries.push(Entry::info(format!("homepage {}", user.homepage_url)));
    }
    Section {
        heading: "Organization".to_string(),
        stat: None,
        entries,
    }
}

pub fn members_section(members: &[Person]) -> Section {
    Section {
        heading: format!("Members ({})", members.len()),
        stat: None,
        entries: members.iter().map(|m| Entry::info(m.display_name())).collect(),
    }
}

pub fn settings_section(settings: &OrgSettings) -> Section {
    let entries = match &settings.plan {
        Some(plan) => plan
            .0
            .iter()
            .map(|(k, v)| Entry::info(format!("plan.{k} = {v}")))
            .collect(),
        None => vec![Entry::info("no plan settings")],
    };
    Section {
        heading: "Settings".to_string(),
        stat: None,
        entries,
    }
}

/// Output the report to terminal (default) or to a markdown file.
#[instrument(skip(report), fields(title = %report.title))]
pub fn output(report: &Report, output_path: Option<&Path>) -> Result<(), ReportError> {
    match output_path {
        None => {
            debug!("writing report to terminal");
            print_terminal_report(report);
            Ok(())
        }
        Some(path) => {
            debug!(path = %path.display(), "writing report to file");
            write_markdown_report(report, path)
        }
    }
}

fn format_stat(stat: DiffStat) -> String {
    format!("+{} ~{} -{}", stat.added, stat.changed, stat.deleted)
}

fn short_id(id: &str) -> &str {
    id.get(..12).unwrap_or(id)
}

fn print_terminal_report(report: &Report) {
    println!();
    println!("{}", report.title.bold());
    println!("{}", report.subtitle);
    println!();

    for section in &report.sections {
        println!("═══ {} ═══", section.heading);
        if let Some(stat) = section.stat {
            println!(
                "Diffstat: {} {} {}",
                format!("+{}", stat.added).green(),
                format!("~{}", stat.changed).yellow(),
                format!("-{}", stat.deleted).red()
            );
        }
        if section.entries.is_empty() {
            println!("  Nothing.");
        }
        for entry in &section.entries {
            match &entry.detail {
                Some(detail) => println!("  {} {} ({})", colorize_kind(entry.kind), entry.text, detail.dimmed()),
                None => println!("  {} {}", colorize_kind(entry.kind), entry.text),
            }
        }
        println!();
    }
}

fn render_markdown(report: &Report) -> String {
    let mut md = String::new();
    md.push_str(&format!("# {}\n\n", report.title));
    md.push_str(&format!("{}\n\n", report.subtitle));

    for section in &report.sections {
        md.push_str(&format!("## {}\n\n", section.heading));
        if let Some(stat) = section.stat {
            md.push_str(&format!("**Diffstat: {}**\n\n", format_stat(stat)));
        }
        if section.entries.is_empty() {
            md.push_str("Nothing.\n\n");
            continue;
        }
        for entry in &section.entries {
            match &entry.detail {
                Some(detail) => md.push_str(&format!("- `{}` {} ({})\n", entry.kind, entry.text, detail)),
                None => md.push_str(&format!("- `{}` {}\n", entry.kind, entry.text)),
            }
        }
        md.push('\n');
    }
    md
}

fn write_markdown_report(report: &Report, path: &Path) -> Result<(), ReportError> {
    std::fs::write(path, render_markdown(report))?;
    Ok(())
}

fn colorize_kind(kind: EntryKind) -> colored::ColoredString {
    let marker = kind.to_string();
    match kind {
        EntryKind::Added => marker.green().bold(),
        EntryKind::Changed => marker.yellow().bold(),
        EntryKind::Deleted => marker.red().bold(),
        EntryKind::Info => marker.normal(),
    }
}
