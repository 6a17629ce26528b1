use std::time::Duration;

use clap::{Parser, Subcommand};

/// Operations CLI for the Fretwire transcription pipeline
#[derive(Debug, Parser)]
#[command(name = "fretwirectl", version, about)]
pub struct Cli {
    /// Base URL of the Fretwire API server
    #[arg(
        long,
        global = true,
        env = "FRETWIRE_SERVER",
        default_value = "http://localhost:8600"
    )]
    pub server: String,

    /// Bearer token for the admin API
    #[arg(long, global = true, env = "FRETWIRE_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Polling cadence while watching a job (e.g. "3s", "500ms")
    #[arg(
        long,
        global = true,
        value_parser = humantime::parse_duration,
        default_value = "3s"
    )]
    pub interval: Duration,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// One-shot processing status for a segment
    Status {
        /// Segment UUID
        segment_id: String,
    },
    /// Fetch and print the full segment record
    Show {
        /// Segment UUID
        segment_id: String,
    },
    /// Trigger a transcription redo and watch it to completion
    Redo {
        /// Segment UUID
        segment_id: String,
        /// Restart the entire processing chain (download, audio
        /// extraction, transcription), not just the transcription step
        #[arg(long)]
        full: bool,
        /// Trigger only; do not watch the job
        #[arg(long)]
        no_watch: bool,
    },
    /// Abort in-flight processing for a segment
    Abort {
        /// Segment UUID
        segment_id: String,
    },
    /// Queue a catalog-wide bulk download
    DownloadAll {
        /// Watch the bulk job until it finishes
        #[arg(long)]
        watch: bool,
    },
    /// List catalog courses
    Courses {
        #[arg(long, default_value_t = 1)]
        page: u64,
        #[arg(long, default_value_t = 25)]
        per_page: u64,
        /// Filter courses by title
        #[arg(long)]
        query: Option<String>,
    },
    /// Manage transcript reviews
    Review {
        #[command(subcommand)]
        action: ReviewAction,
    },
}

#[derive(Debug, Subcommand)]
pub enum ReviewAction {
    /// Attach or replace the review on a segment
    Submit {
        /// Segment UUID
        segment_id: String,
        /// Verdict: approved, needs_revision, or rejected
        #[arg(long)]
        status: String,
        /// Free-text feedback for the editor
        #[arg(long, default_value = "")]
        feedback: String,
    },
    /// Remove the review from a segment
    Clear {
        /// Segment UUID
        segment_id: String,
    },
}
