use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde_json::Value;
use tracing::warn;

use fretwire_core::api::types::ReviewSubmission;
use fretwire_core::monitor::adapters::adapt_segment_status;
use fretwire_core::{
    ApiClient, JobMonitor, MonitorEvent, MonitorPolicy, MonitorSubscription,
    Reconciled,
};
use fretwire_model::{
    JobHandle, JobScope, ProgressSnapshot, ReviewStatus, SegmentId,
    SessionStatus,
};

use crate::cli::{Cli, Command, ReviewAction};
use crate::render;

pub async fn run(args: Cli) -> Result<()> {
    let client = ApiClient::new(args.server.as_str())?;
    if let Some(token) = &args.token {
        client.set_token(Some(token.clone())).await;
    }
    let client = Arc::new(client);
    let interval = args.interval;

    match args.command {
        Command::Status { segment_id } => status(&client, &segment_id).await,
        Command::Show { segment_id } => show(&client, &segment_id).await,
        Command::Redo {
            segment_id,
            full,
            no_watch,
        } => redo(client, interval, &segment_id, full, no_watch).await,
        Command::Abort { segment_id } => abort(&client, &segment_id).await,
        Command::DownloadAll { watch } => {
            download_all(client, interval, watch).await
        }
        Command::Courses {
            page,
            per_page,
            query,
        } => courses(&client, page, per_page, query.as_deref()).await,
        Command::Review { action } => review(&client, action).await,
    }
}

async fn status(client: &ApiClient, raw_id: &str) -> Result<()> {
    let id = SegmentId::from_string(raw_id)?;
    let value = client.segment_status(id).await?;

    let wire_status = value
        .pointer("/segment/status")
        .and_then(Value::as_str)
        .unwrap_or("unknown");
    println!("segment {id}: {wire_status}");
    if let Some(pct) = value.get("progress_percentage").and_then(Value::as_f64)
    {
        println!("  progress: {pct:.0}%");
    }
    if let Some(message) = value
        .pointer("/segment/error_message")
        .and_then(Value::as_str)
    {
        println!("  error: {message}");
    }

    let mut snapshot = ProgressSnapshot::default();
    snapshot.apply(adapt_segment_status(&value));
    if snapshot.is_terminal() {
        println!("  processing finished");
    } else {
        println!("  still in flight");
    }
    Ok(())
}

async fn show(client: &ApiClient, raw_id: &str) -> Result<()> {
    let id = SegmentId::from_string(raw_id)?;
    let segment = client.fetch_segment(id).await?;
    println!("{}", render::segment(&segment));
    Ok(())
}

async fn redo(
    client: Arc<ApiClient>,
    interval: Duration,
    raw_id: &str,
    full: bool,
    no_watch: bool,
) -> Result<()> {
    let id = SegmentId::from_string(raw_id)?;
    let outcome = if full {
        client.restart_processing(id).await
    } else {
        client.redo_transcription(id).await
    }
    .context("trigger failed - the job never started")?;

    if let Some(message) = &outcome.message {
        println!("{message}");
    }
    if no_watch {
        return Ok(());
    }

    let mut policy = MonitorPolicy::for_scope(JobScope::SingleSegment);
    policy.poll_interval = interval;
    let sub = JobMonitor::spawn_seeded(
        JobHandle::single_segment(id),
        outcome.seed.clone(),
        client,
        policy,
    );
    finish(watch_events(sub).await)
}

async fn abort(client: &ApiClient, raw_id: &str) -> Result<()> {
    let id = SegmentId::from_string(raw_id)?;
    client.abort_processing(id).await?;
    println!("abort requested for segment {id}");
    Ok(())
}

async fn download_all(
    client: Arc<ApiClient>,
    interval: Duration,
    watch: bool,
) -> Result<()> {
    let outcome = client
        .download_all_courses()
        .await
        .context("trigger failed - the bulk job never started")?;

    if let Some(message) = &outcome.message {
        println!("{message}");
    }
    println!(
        "queued {} downloads across {} courses ({} segments)",
        outcome.queued_downloads, outcome.total_courses, outcome.total_segments
    );
    if !watch {
        return Ok(());
    }

    let mut policy = MonitorPolicy::for_scope(JobScope::GlobalBulk);
    policy.poll_interval = interval;
    let sub = JobMonitor::spawn_seeded(
        JobHandle::global_bulk(),
        outcome.seed.clone(),
        client,
        policy,
    );
    finish(watch_events(sub).await)
}

async fn courses(
    client: &ApiClient,
    page: u64,
    per_page: u64,
    query: Option<&str>,
) -> Result<()> {
    let listing = client.list_courses(page, per_page, query).await?;
    if listing.items.is_empty() {
        println!("no courses found");
        return Ok(());
    }
    print!("{}", render::course_rows(&listing.items));
    println!(
        "page {} of {} ({} courses)",
        listing.page,
        listing.page_count(),
        listing.total
    );
    Ok(())
}

async fn review(client: &ApiClient, action: ReviewAction) -> Result<()> {
    match action {
        ReviewAction::Submit {
            segment_id,
            status,
            feedback,
        } => {
            let id = SegmentId::from_string(&segment_id)?;
            let status: ReviewStatus = status.parse()?;
            let segment = client
                .submit_review(id, &ReviewSubmission { feedback, status })
                .await?;
            println!("review recorded");
            println!("{}", render::segment(&segment));
        }
        ReviewAction::Clear { segment_id } => {
            let id = SegmentId::from_string(&segment_id)?;
            let segment = client.clear_review(id).await?;
            println!("review cleared");
            println!("{}", render::segment(&segment));
        }
    }
    Ok(())
}

/// Drain monitor events to the terminal and return the terminal status.
async fn watch_events(mut sub: MonitorSubscription) -> SessionStatus {
    let mut outcome = SessionStatus::Running;
    while let Some(event) = sub.recv().await {
        match event {
            MonitorEvent::Progress(snapshot) => {
                println!("{}", render::progress_line(&snapshot));
            }
            MonitorEvent::PollError {
                consecutive,
                message,
            } => {
                warn!(consecutive, %message, "status poll failed");
            }
            MonitorEvent::Terminal { status, snapshot } => {
                outcome = status;
                println!("{}", render::terminal_line(status, &snapshot));
            }
            MonitorEvent::Reconciled(Reconciled::Segment(segment)) => {
                println!("{}", render::segment(&segment));
            }
            MonitorEvent::Reconciled(Reconciled::Catalog(courses)) => {
                print!("{}", render::course_rows(&courses));
            }
            MonitorEvent::ReconcileFailed { message } => {
                eprintln!("could not confirm final state: {message}");
                eprintln!(
                    "re-run `fretwirectl status` once the server is reachable"
                );
            }
        }
    }
    outcome
}

fn finish(outcome: SessionStatus) -> Result<()> {
    match outcome {
        SessionStatus::Running | SessionStatus::CompletedSuccess => Ok(()),
        SessionStatus::StalledTimeout => {
            bail!("job stalled: no forward progress - restart it with `redo` if needed")
        }
        SessionStatus::AbsoluteTimeout => {
            bail!("job exceeded its time limit")
        }
        SessionStatus::Error => {
            bail!("monitoring failed: repeated status poll errors")
        }
    }
}
