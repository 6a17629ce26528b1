#![allow(dead_code)]

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Semaphore;

use fretwire_core::{JobStatusApi, MonitorError, Result};
use fretwire_model::{
    Course, CourseId, JobHandle, PartialSnapshot, Segment, SegmentId,
    SegmentStatus,
};

/// One scripted poll response. The script repeats its last step once
/// exhausted.
#[derive(Clone)]
pub enum PollStep {
    Ok(Vec<PartialSnapshot>),
    Err(String),
}

/// Test double for the status source: replays a script, counts polls,
/// and can gate polls behind a semaphore for in-flight control.
pub struct ScriptedApi {
    script: Vec<PollStep>,
    poll_count: AtomicUsize,
    segment: Mutex<Option<Segment>>,
    courses: Vec<Course>,
    gate: Option<Arc<Semaphore>>,
}

impl ScriptedApi {
    pub fn new(script: Vec<PollStep>) -> Self {
        assert!(!script.is_empty(), "script must not be empty");
        ScriptedApi {
            script,
            poll_count: AtomicUsize::new(0),
            segment: Mutex::new(None),
            courses: Vec::new(),
            gate: None,
        }
    }

    pub fn with_segment(self, segment: Segment) -> Self {
        *self.segment.lock().unwrap() = Some(segment);
        self
    }

    pub fn with_courses(mut self, courses: Vec<Course>) -> Self {
        self.courses = courses;
        self
    }

    /// Every poll must first acquire a permit from `gate`.
    pub fn with_gate(mut self, gate: Arc<Semaphore>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn polls(&self) -> usize {
        self.poll_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl JobStatusApi for ScriptedApi {
    async fn poll(&self, _handle: &JobHandle) -> Result<Vec<PartialSnapshot>> {
        let n = self.poll_count.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            let permit = gate.acquire().await.expect("gate closed");
            permit.forget();
        }
        let step = self.script[n.min(self.script.len() - 1)].clone();
        match step {
            PollStep::Ok(partials) => Ok(partials),
            PollStep::Err(message) => Err(MonitorError::Api(message)),
        }
    }

    async fn reconcile_segment(&self, _id: SegmentId) -> Result<Segment> {
        self.segment
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| MonitorError::Api("no segment scripted".into()))
    }

    async fn reconcile_catalog(&self) -> Result<Vec<Course>> {
        Ok(self.courses.clone())
    }
}

pub fn make_segment(status: SegmentStatus) -> Segment {
    Segment {
        id: SegmentId::new(),
        course_id: CourseId::new(),
        title: "Lesson 12: Hybrid Picking".into(),
        position: 12,
        status,
        is_processing: status.is_active(),
        error_message: None,
        transcript_url: matches!(status, SegmentStatus::Completed)
            .then(|| "https://cdn.example/transcripts/12.vtt".to_string()),
        audio_url: Some("https://cdn.example/audio/12.flac".to_string()),
        progress_percentage: None,
        timing: None,
        transcription: None,
        review: None,
        updated_at: Utc::now(),
    }
}

pub fn make_course(title: &str) -> Course {
    Course {
        id: CourseId::new(),
        source: None,
        title: title.to_string(),
        segment_count: 40,
        completed_segments: 40,
    }
}

/// Shorthand for a fully specified counter reading.
pub fn counters(
    total: u64,
    succeeded: u64,
    failed: u64,
    skipped: u64,
    processing: u64,
    queued: u64,
) -> PartialSnapshot {
    PartialSnapshot {
        total: Some(total),
        succeeded: Some(succeeded),
        failed: Some(failed),
        skipped: Some(skipped),
        processing: Some(processing),
        queued: Some(queued),
        ..Default::default()
    }
}
