//! Sakai direct API CLI binary.
//!
//! A command-line interface for browsing sites, assignments, members and
//! grades through the Sakai direct API.

use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use sakai_direct::cli::{Cli, Command};
use sakai_direct::output::PrettyPrint;
use sakai_direct::{
    Assignment, AssignmentCollection, Config, Get, Gradebook, GradebookEntry, LocalCache, Member,
    MembershipCollection, Session, Site, SiteCollection, SiteListQuery,
};
use serde::Serialize;
use tabled::{Table, Tabled};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(if cli.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::WARN
        })
        .init();

    let config = match config_from_cli(&cli) {
        Some(c) => c,
        None => {
            eprintln!("Error: Sakai configuration required: no base URL");
            eprintln!("Hint: Set SAKAI_URL or pass --url");
            return ExitCode::FAILURE;
        }
    };

    let session = match Session::connect(&config).await {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!("Hint: Check SAKAI_URL, SAKAI_USERNAME and SAKAI_PASSWORD");
            return ExitCode::FAILURE;
        }
    };

    let cache = LocalCache::new(config.cache_dir.clone());
    match run(&session, &cache, cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn config_from_cli(cli: &Cli) -> Option<Config> {
    let mut config = Config::new(cli.url.clone()?);
    config.username = cli.username.clone();
    config.password = cli.password.clone();
    if let Some(secs) = cli.timeout {
        config.timeout = Duration::from_secs(secs);
    }
    if let Some(dir) = &cli.cache_dir {
        config.cache_dir = dir.clone();
    }
    Some(config)
}

async fn run(session: &Session, cache: &LocalCache, cli: Cli) -> sakai_direct::Result<()> {
    let json = cli.json;
    match cli.command {
        Command::Session => {
            let user = session.active_user().await?;
            if json {
                let status = serde_json::json!({ "active": user.is_some(), "userId": user });
                println!("{}", serde_json::to_string_pretty(&status)?);
            } else {
                match user {
                    Some(user) => println!("Active session for {user}"),
                    None => println!("No active session"),
                }
            }
        }
        Command::Sites { course_only } => {
            let sites = SiteCollection::fetch(session, &SiteListQuery { course_only }).await?;
            output_list(sites.as_slice(), json, |s| SiteRow::from(s))?;
        }
        Command::Site { site_id } => {
            let site = Site::get(session, &site_id).await?;
            output_single(&site, json)?;
        }
        Command::Assignments { site_id } => {
            let assignments = AssignmentCollection::fetch(session, &site_id).await?;
            output_list(assignments.as_slice(), json, |a| AssignmentRow::from(a))?;
        }
        Command::Assignment { assignment_id } => {
            let assignment = Assignment::get(session, &assignment_id).await?;
            output_single(&assignment, json)?;
        }
        Command::Members { site_id } => {
            let members = MembershipCollection::fetch_cached(session, &site_id, cache).await?;
            output_list(members.as_slice(), json, |m| MemberRow::from(m))?;
        }
        Command::Grades {
            site_id,
            assignment,
            user,
        } => {
            let gradebook = Gradebook::fetch(session, &site_id, cache).await?;
            let entries: Vec<&GradebookEntry> = match (&assignment, &user) {
                (Some(name), _) => gradebook.grades_for_assignment(name),
                (None, Some(user_id)) => gradebook.grades_for_user(user_id),
                (None, None) => gradebook.distinct_entries().collect(),
            };
            let entries: Vec<&GradebookEntry> = entries
                .into_iter()
                .filter(|e| user.as_deref().map_or(true, |u| e.user_id == u))
                .collect();
            output_list(&entries, json, |e| GradeRow::from(*e))?;
        }
    }
    Ok(())
}

fn output_single<T: Serialize + PrettyPrint>(item: &T, json: bool) -> sakai_direct::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(item)?);
    } else {
        println!("{}", item.pretty_print());
    }
    Ok(())
}

fn output_list<T, R, F>(items: &[T], json: bool, to_row: F) -> sakai_direct::Result<()>
where
    T: Serialize,
    R: Tabled,
    F: Fn(&T) -> R,
{
    if json {
        println!("{}", serde_json::to_string_pretty(items)?);
    } else {
        let rows: Vec<R> = items.iter().map(to_row).collect();
        println!("{}", Table::new(rows));
        println!("\n{} total", items.len());
    }
    Ok(())
}

// Table row types for non-JSON output

fn time_cell(value: Option<chrono::DateTime<chrono::Local>>) -> String {
    value
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_default()
}

#[derive(Tabled)]
struct SiteRow {
    id: String,
    title: String,
    #[tabled(rename = "type")]
    site_type: String,
    term: String,
}

impl From<&Site> for SiteRow {
    fn from(s: &Site) -> Self {
        Self {
            id: s.id().to_string(),
            title: s.title().unwrap_or_default().to_string(),
            site_type: s.site_type().unwrap_or_default().to_string(),
            term: s.term().map(|t| t.to_string()).unwrap_or_default(),
        }
    }
}

#[derive(Tabled)]
struct AssignmentRow {
    id: String,
    title: String,
    status: String,
    due: String,
}

impl From<&Assignment> for AssignmentRow {
    fn from(a: &Assignment) -> Self {
        Self {
            id: a.id().to_string(),
            title: a.title().unwrap_or_default().to_string(),
            status: a.status().unwrap_or_default().to_string(),
            due: time_cell(a.due_time()),
        }
    }
}

#[derive(Tabled)]
struct MemberRow {
    eid: String,
    name: String,
    role: String,
    email: String,
}

impl From<&Member> for MemberRow {
    fn from(m: &Member) -> Self {
        Self {
            eid: m.user_eid().unwrap_or(m.user_id()).to_string(),
            name: m.name().unwrap_or_default().to_string(),
            role: m.role().unwrap_or_default().to_string(),
            email: m.email().unwrap_or_default().to_string(),
        }
    }
}

#[derive(Tabled)]
struct GradeRow {
    assignment: String,
    user: String,
    grade: String,
}

impl From<&GradebookEntry> for GradeRow {
    fn from(e: &GradebookEntry) -> Self {
        Self {
            assignment: e.assignment_name.clone(),
            user: e.user_id.clone(),
            grade: e.grade_text().unwrap_or_default(),
        }
    }
}
