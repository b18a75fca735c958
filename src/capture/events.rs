//! Capture lifecycle events and observers.
//!
//! Events are delivered synchronously, in order, to every subscribed
//! observer. A `PathUpdate` always precedes the loop or result event raised by
//! the same call.

use std::sync::mpsc::Sender;

use log::info;
use serde::Serialize;

use super::state::CaptureStats;
use super::territory::Territory;
use crate::GeoPoint;
use crate::geometry::ValidationFailure;

/// A capture lifecycle event.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum CaptureEvent {
    /// The trail or the capture status changed.
    PathUpdate {
        path: Vec<GeoPoint>,
        is_capturing: bool,
        stats: CaptureStats,
    },
    /// The trail closed into a loop; finalization is scheduled.
    LoopDetected { path: Vec<GeoPoint> },
    /// A territory was captured.
    CaptureSuccess { territory: Territory },
    /// The closed ring failed validation. `path` is the unsimplified trail.
    CaptureFailure {
        reason: ValidationFailure,
        area: f64,
        path: Vec<GeoPoint>,
    },
}

impl CaptureEvent {
    /// Event name, matching the serialized `type` tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            CaptureEvent::PathUpdate { .. } => "pathUpdate",
            CaptureEvent::LoopDetected { .. } => "loopDetected",
            CaptureEvent::CaptureSuccess { .. } => "captureSuccess",
            CaptureEvent::CaptureFailure { .. } => "captureFailure",
        }
    }
}

/// Receives capture events.
pub trait CaptureObserver {
    fn on_event(&mut self, event: &CaptureEvent);
}

/// Queue events on a channel for a consumer that polls.
impl CaptureObserver for Sender<CaptureEvent> {
    fn on_event(&mut self, event: &CaptureEvent) {
        // A dropped receiver just means nobody is listening any more
        let _ = self.send(event.clone());
    }
}

/// Discards every event.
pub struct NoopObserver;

impl CaptureObserver for NoopObserver {
    fn on_event(&mut self, _event: &CaptureEvent) {}
}

/// Logs a one-line summary of every event.
pub struct LoggingObserver;

impl CaptureObserver for LoggingObserver {
    fn on_event(&mut self, event: &CaptureEvent) {
        match event {
            CaptureEvent::PathUpdate {
                path, is_capturing, ..
            } => info!(
                "path update: {} points, capturing={}",
                path.len(),
                is_capturing
            ),
            CaptureEvent::LoopDetected { path } => {
                info!("loop detected after {} points", path.len())
            }
            CaptureEvent::CaptureSuccess { territory } => info!(
                "captured {}: {:.0} m², {} points",
                territory.id, territory.area_sq_meters, territory.simplified_point_count
            ),
            CaptureEvent::CaptureFailure { reason, area, .. } => {
                info!("capture failed: {} ({:.0} m²)", reason, area)
            }
        }
    }
}
