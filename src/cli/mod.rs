//! CLI argument parsing types.
//!
//! This module provides the command-line interface structure for the `sakai` binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Sakai direct API command-line interface.
#[derive(Parser, Debug)]
#[command(name = "sakai", about = "Sakai direct API CLI", version)]
pub struct Cli {
    /// Output results as JSON instead of a table.
    #[arg(long, global = true, default_value = "false")]
    pub json: bool,

    /// Enable debug logging on stderr.
    #[arg(short, long, global = true, default_value = "false")]
    pub verbose: bool,

    /// Base URL of the direct API (e.g. https://lms.example.edu/direct).
    #[arg(long, global = true, env = "SAKAI_URL")]
    pub url: Option<String>,

    /// Login name.
    #[arg(long, global = true, env = "SAKAI_USERNAME")]
    pub username: Option<String>,

    /// Password.
    #[arg(long, global = true, env = "SAKAI_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Request timeout in seconds.
    #[arg(long, global = true, env = "SAKAI_TIMEOUT_SECS")]
    pub timeout: Option<u64>,

    /// Directory searched for `{site_id}-gradebook.json` and `{site_id}-members.json`.
    #[arg(long, global = true, env = "SAKAI_CACHE_DIR")]
    pub cache_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Report whether the server considers the session active.
    Session,

    /// List sites visible to the user.
    Sites {
        /// Only list course sites.
        #[arg(long)]
        course_only: bool,
    },

    /// Show a single site.
    Site {
        /// The site ID.
        #[arg(env = "SAKAI_SITE_ID")]
        site_id: String,
    },

    /// List the assignments of a site.
    Assignments {
        /// The site ID.
        #[arg(env = "SAKAI_SITE_ID")]
        site_id: String,
    },

    /// Show a single assignment.
    Assignment {
        /// The assignment ID.
        assignment_id: String,
    },

    /// List the members of a site.
    Members {
        /// The site ID.
        #[arg(env = "SAKAI_SITE_ID")]
        site_id: String,
    },

    /// Show gradebook entries for a site.
    Grades {
        /// The site ID.
        #[arg(env = "SAKAI_SITE_ID")]
        site_id: String,

        /// Only show grades for this gradebook item (exact name).
        #[arg(long, env = "SAKAI_ASSIGNMENT_NAME")]
        assignment: Option<String>,

        /// Only show grades for this user ID.
        #[arg(long)]
        user: Option<String>,
    },
}
