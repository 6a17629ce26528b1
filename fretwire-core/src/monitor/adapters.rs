//! Per-endpoint adapters feeding the canonical progress snapshot.
//!
//! Each status endpoint has its own field names; the idiosyncrasies are
//! isolated here so the snapshot merge stays endpoint-agnostic. All
//! numeric reads follow the defensive coercion policy in [`crate::wire`].

use std::collections::BTreeMap;

use serde_json::Value;
use uuid::Uuid;

use fretwire_model::{PartialSnapshot, SegmentStatus, TargetProgress};

use crate::wire;

/// `GET /segments/{id}/status` - a single job reads as a one-unit
/// snapshot so the same detector logic covers every scope.
pub fn adapt_segment_status(value: &Value) -> PartialSnapshot {
    let segment = value.get("segment").unwrap_or(&Value::Null);
    let status = SegmentStatus::from_wire(
        wire::str_field(segment, "status").unwrap_or(""),
    );
    let is_processing =
        wire::bool_field(segment, "is_processing") || status.is_active();
    let queued = status == SegmentStatus::Queued;

    PartialSnapshot {
        total: Some(1),
        succeeded: Some(u64::from(status == SegmentStatus::Completed)),
        failed: Some(u64::from(matches!(
            status,
            SegmentStatus::Failed | SegmentStatus::Aborted
        ))),
        skipped: Some(0),
        queued: Some(u64::from(queued)),
        processing: Some(u64::from(
            !queued && !status.is_terminal() && is_processing,
        )),
        per_target: BTreeMap::new(),
    }
}

/// `GET /catalog/bulk-download-status` - overall total plus the
/// per-course completion map.
pub fn adapt_bulk_status(value: &Value) -> PartialSnapshot {
    let mut per_target = BTreeMap::new();
    if let Some(Value::Object(map)) = value.get("course_progress") {
        for (key, entry) in map {
            // Keys that are not course IDs are ignored, not fatal.
            let Ok(id) = Uuid::parse_str(key) else {
                continue;
            };
            per_target.insert(
                id,
                TargetProgress {
                    completed: wire::u64_field(entry, "completed"),
                    total: wire::u64_field(entry, "total"),
                },
            );
        }
    }
    PartialSnapshot {
        total: value
            .get("total_segments")
            .map(|v| wire::coerce_u64(Some(v))),
        per_target,
        ..Default::default()
    }
}

/// `GET /catalog/bulk-download-stats` - the five outcome counters. The
/// `success` key is a counter here, not the response envelope flag.
pub fn adapt_bulk_stats(value: &Value) -> PartialSnapshot {
    let counter = |key: &str| {
        value.get(key).map(|v| wire::coerce_u64(Some(v)))
    };
    PartialSnapshot {
        succeeded: counter("success"),
        failed: counter("failed"),
        skipped: counter("skipped"),
        processing: counter("processing"),
        queued: counter("queued"),
        ..Default::default()
    }
}

/// Trigger responses carry a `stats` object worth seeding the snapshot
/// with, so the first poll starts from the announced scope.
pub fn adapt_trigger_stats(value: &Value) -> PartialSnapshot {
    let stats = value.get("stats").unwrap_or(&Value::Null);
    PartialSnapshot {
        total: stats
            .get("total_segments")
            .map(|v| wire::coerce_u64(Some(v))),
        queued: stats
            .get("queued_downloads")
            .map(|v| wire::coerce_u64(Some(v))),
        ..Default::default()
    }
}
