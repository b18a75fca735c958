//! Result and status types returned by the capture orchestrator.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::territory::Territory;
use crate::geometry::ValidationFailure;

/// Whether a capture is in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CaptureStatus {
    Idle,
    Capturing,
}

/// How the previous capture ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CaptureOutcome {
    Completed,
    Cancelled,
    Failed,
}

/// Totals accumulated across the orchestrator's lifetime.
///
/// `total_distance_meters` covers the active capture only and drops back to 0
/// whenever a capture ends. Area and count accumulate across captures.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureStats {
    pub total_distance_meters: f64,
    pub total_area_sq_meters: f64,
    pub capture_count: u64,
}

/// Outcome of `start_capture`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StartStatus {
    Started,
    AlreadyCapturing,
    InvalidCoordinates,
    LowAccuracy,
}

impl StartStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StartStatus::Started => "Capture started",
            StartStatus::AlreadyCapturing => "Already capturing",
            StartStatus::InvalidCoordinates => "Invalid GPS coordinates",
            StartStatus::LowAccuracy => "Low GPS accuracy",
        }
    }

    pub fn is_started(&self) -> bool {
        *self == StartStatus::Started
    }
}

impl fmt::Display for StartStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a fix was or was not appended to the trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PointStatus {
    Added,
    LoopDetected,
    NotCapturing,
    InvalidCoordinates,
    LowAccuracy,
    TooClose,
    FinalizePending,
}

impl PointStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PointStatus::Added => "Point added",
            PointStatus::LoopDetected => "Loop detected",
            PointStatus::NotCapturing => "Not capturing",
            PointStatus::InvalidCoordinates => "Invalid GPS coordinates",
            PointStatus::LowAccuracy => "Low GPS accuracy",
            PointStatus::TooClose => "Point too close",
            PointStatus::FinalizePending => "Loop already detected",
        }
    }
}

impl fmt::Display for PointStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of `add_point`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointResult {
    pub added: bool,
    pub loop_detected: bool,
    pub reason: PointStatus,
}

impl PointResult {
    pub(crate) fn rejected(reason: PointStatus) -> Self {
        Self {
            added: false,
            loop_detected: false,
            reason,
        }
    }
}

/// Result of finalizing a capture.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "result", rename_all = "camelCase")]
pub enum CaptureResult {
    Captured { territory: Territory },
    Failed { reason: ValidationFailure, area: f64 },
    NotCapturing,
}

impl CaptureResult {
    pub fn is_success(&self) -> bool {
        matches!(self, CaptureResult::Captured { .. })
    }

    pub fn territory(&self) -> Option<&Territory> {
        match self {
            CaptureResult::Captured { territory } => Some(territory),
            _ => None,
        }
    }
}

/// Read-only view of the orchestrator for the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureSnapshot {
    pub status: CaptureStatus,
    pub path_length: usize,
    pub distance_meters: f64,
    pub duration_ms: i64,
    pub captured_count: usize,
    /// A loop was detected and finalization is scheduled
    pub finalize_pending: bool,
    pub last_outcome: Option<CaptureOutcome>,
}
