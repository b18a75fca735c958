//! End-to-end tests for the capture orchestrator

use std::sync::mpsc::{self, Receiver};

use territory_capture::capture::{AUTO_FINALIZE_DELAY_MS, NoopObserver};
use territory_capture::geo_utils::{haversine_distance, offset_meters};
use territory_capture::{
    CaptureConfig, CaptureError, CaptureEvent, CaptureOrchestrator, CaptureOutcome, CaptureResult,
    CaptureStats, CaptureStatus, Clock, GeoPoint, GpsFix, IngestOutcome, ManualClock, PointStatus,
    Rejection, StartStatus, ValidationFailure,
};

const START_MS: i64 = 1_700_000_000_000;
const FIX_INTERVAL_MS: i64 = 2_000;

/// A 43 m square walked counter-clockwise; the last fix is 4 m short of the start.
const SQUARE: [(f64, f64); 12] = [
    (14.0, 0.0),
    (29.0, 0.0),
    (43.0, 0.0),
    (43.0, 14.0),
    (43.0, 29.0),
    (43.0, 43.0),
    (29.0, 43.0),
    (14.0, 43.0),
    (0.0, 43.0),
    (0.0, 29.0),
    (0.0, 16.0),
    (0.0, 4.0),
];

/// Two 40 m lobes crossing at (20, 20).
const FIGURE_EIGHT: [(f64, f64); 15] = [
    (10.0, 10.0),
    (20.0, 20.0),
    (30.0, 30.0),
    (40.0, 40.0),
    (40.0, 30.0),
    (40.0, 20.0),
    (40.0, 10.0),
    (40.0, 0.0),
    (30.0, 10.0),
    (20.0, 20.0),
    (10.0, 30.0),
    (0.0, 40.0),
    (0.0, 30.0),
    (0.0, 20.0),
    (0.0, 8.0),
];

fn origin() -> GeoPoint {
    GeoPoint::new(21.1458, 79.0882)
}

struct Harness {
    orchestrator: CaptureOrchestrator,
    clock: ManualClock,
    events: Receiver<CaptureEvent>,
}

impl Harness {
    fn new() -> Self {
        Self::with_config(CaptureConfig::default())
    }

    fn with_config(config: CaptureConfig) -> Self {
        let clock = ManualClock::new(START_MS);
        let mut orchestrator =
            CaptureOrchestrator::with_clock(config, Box::new(clock.clone())).unwrap();
        let (tx, rx) = mpsc::channel();
        orchestrator.subscribe(Box::new(tx));
        Self {
            orchestrator,
            clock,
            events: rx,
        }
    }

    fn fix(&self, east: f64, north: f64, accuracy: f64) -> GpsFix {
        self.fix_from(origin(), east, north, accuracy)
    }

    fn fix_from(&self, base: GeoPoint, east: f64, north: f64, accuracy: f64) -> GpsFix {
        let p = offset_meters(&base, east, north);
        GpsFix::new(p.latitude, p.longitude, accuracy, self.clock.now_ms())
    }

    fn start(&mut self) -> StartStatus {
        self.start_at(origin())
    }

    fn start_at(&mut self, base: GeoPoint) -> StartStatus {
        let fix = self.fix_from(base, 0.0, 0.0, 5.0);
        self.orchestrator.start_capture(&fix)
    }

    /// Advance the clock one fix interval, then add the fix at the offset.
    fn walk(&mut self, east: f64, north: f64) -> territory_capture::PointResult {
        self.walk_from(origin(), east, north)
    }

    fn walk_from(
        &mut self,
        base: GeoPoint,
        east: f64,
        north: f64,
    ) -> territory_capture::PointResult {
        self.clock.advance(FIX_INTERVAL_MS);
        let fix = self.fix_from(base, east, north, 5.0);
        self.orchestrator.add_point(&fix)
    }

    fn drain(&self) -> Vec<CaptureEvent> {
        self.events.try_iter().collect()
    }
}

fn count(events: &[CaptureEvent], name: &str) -> usize {
    events.iter().filter(|e| e.as_str() == name).count()
}

// ============================================================================
// Successful capture
// ============================================================================

#[test]
fn test_square_loop_auto_finalizes() {
    let mut h = Harness::new();
    assert_eq!(h.start(), StartStatus::Started);

    for (i, &(east, north)) in SQUARE.iter().enumerate() {
        let result = h.walk(east, north);
        assert!(result.added, "fix {} rejected: {}", i + 1, result.reason);
        let is_last = i == SQUARE.len() - 1;
        assert_eq!(result.loop_detected, is_last, "fix {}", i + 1);
    }

    let loop_at = h.clock.now_ms();
    assert_eq!(h.orchestrator.next_deadline(), Some(loop_at + AUTO_FINALIZE_DELAY_MS));
    assert!(h.orchestrator.state().finalize_pending);

    h.clock.advance(AUTO_FINALIZE_DELAY_MS - 1);
    assert!(h.orchestrator.poll().is_none());
    assert!(h.orchestrator.is_capturing());

    h.clock.advance(1);
    let result = h.orchestrator.poll().expect("finalize should run");
    let territory = result.territory().expect("capture should succeed").clone();

    assert!(
        territory.area_sq_meters > 1_400.0 && territory.area_sq_meters < 1_700.0,
        "area was {}",
        territory.area_sq_meters
    );
    assert!(territory.simplified_point_count <= 12);
    assert_eq!(territory.simplified_point_count, territory.polygon.len());
    assert_eq!(territory.raw_point_count, 13);
    assert_eq!(territory.polygon.first(), territory.polygon.last());
    assert_eq!(
        territory.duration_ms,
        SQUARE.len() as i64 * FIX_INTERVAL_MS + AUTO_FINALIZE_DELAY_MS
    );
    assert_eq!(territory.captured_at_epoch_ms, h.clock.now_ms());
    assert!(territory.distance_meters > 141.0);
    assert!(territory.id.starts_with(&format!("territory-{}-", h.clock.now_ms())));
    assert_eq!(territory.owner_id, "user-1");
    assert!(!territory.overlaps_existing());

    let center = offset_meters(&origin(), 21.5, 21.5);
    assert!(haversine_distance(&territory.center, &center) < 10.0);

    let events = h.drain();
    assert_eq!(count(&events, "loopDetected"), 1);
    assert_eq!(count(&events, "captureSuccess"), 1);
    assert_eq!(count(&events, "captureFailure"), 0);

    assert!(!h.orchestrator.is_capturing());
    assert!(h.orchestrator.poll().is_none());
    assert_eq!(h.orchestrator.captured_territories(), &[territory.clone()]);

    let stats = h.orchestrator.stats();
    assert_eq!(stats.capture_count, 1);
    assert_eq!(stats.total_area_sq_meters, territory.area_sq_meters);
    assert_eq!(stats.total_distance_meters, 0.0);

    let state = h.orchestrator.state();
    assert_eq!(state.status, CaptureStatus::Idle);
    assert_eq!(state.captured_count, 1);
    assert_eq!(state.last_outcome, Some(CaptureOutcome::Completed));
}

#[test]
fn test_points_after_loop_are_rejected_until_finalized() {
    let mut h = Harness::new();
    h.start();
    for &(east, north) in &SQUARE {
        h.walk(east, north);
    }

    let result = h.walk(10.0, 0.0);
    assert!(!result.added);
    assert_eq!(result.reason, PointStatus::FinalizePending);
    assert_eq!(result.reason.to_string(), "Loop already detected");
    assert_eq!(h.orchestrator.active_path().len(), 13);
}

#[test]
fn test_event_order_for_loop_and_success() {
    let mut h = Harness::new();
    h.start();
    for &(east, north) in &SQUARE[..SQUARE.len() - 1] {
        h.walk(east, north);
    }
    h.drain();

    let (east, north) = SQUARE[SQUARE.len() - 1];
    h.walk(east, north);
    let names: Vec<&str> = h.drain().iter().map(|e| e.as_str()).collect();
    assert_eq!(names, vec!["pathUpdate", "loopDetected"]);

    h.clock.advance(AUTO_FINALIZE_DELAY_MS);
    h.orchestrator.poll();
    let events = h.drain();
    let names: Vec<&str> = events.iter().map(|e| e.as_str()).collect();
    assert_eq!(names, vec!["pathUpdate", "captureSuccess"]);

    match &events[0] {
        CaptureEvent::PathUpdate {
            path,
            is_capturing,
            stats,
        } => {
            assert!(path.is_empty());
            assert!(!is_capturing);
            assert_eq!(stats.capture_count, 1);
        }
        other => panic!("expected path update, got {:?}", other),
    }
}

#[test]
fn test_manual_complete_without_loop() {
    let mut h = Harness::new();
    h.start();
    // Stop before the trail closes
    for &(east, north) in &SQUARE[..9] {
        h.walk(east, north);
    }
    assert!(h.orchestrator.next_deadline().is_none());

    let result = h.orchestrator.complete_capture();
    assert!(result.is_success(), "got {:?}", result);
    assert!(!h.orchestrator.is_capturing());
    assert_eq!(h.orchestrator.captured_territories().len(), 1);
}

// ============================================================================
// Rejections
// ============================================================================

#[test]
fn test_low_accuracy_always_rejected() {
    let mut h = Harness::new();

    let poor = h.fix(0.0, 0.0, 35.0);
    assert_eq!(h.orchestrator.start_capture(&poor), StartStatus::LowAccuracy);
    assert!(!h.orchestrator.is_capturing());

    h.start();
    for i in 1..=5 {
        h.clock.advance(FIX_INTERVAL_MS);
        let fix = h.fix(i as f64 * 10.0, 0.0, 35.0);
        let result = h.orchestrator.add_point(&fix);
        assert!(!result.added);
        assert_eq!(result.reason, PointStatus::LowAccuracy);
        assert_eq!(result.reason.to_string(), "Low GPS accuracy");
    }
    assert_eq!(h.orchestrator.active_path().len(), 1);
}

#[test]
fn test_point_too_close() {
    let mut h = Harness::new();
    h.start();

    let result = h.walk(2.0, 2.0);
    assert!(!result.added);
    assert_eq!(result.reason, PointStatus::TooClose);
    assert_eq!(h.orchestrator.raw_trail().len(), 1);

    assert_eq!(h.walk(10.0, 0.0).reason, PointStatus::Added);
    assert_eq!(h.orchestrator.raw_trail().len(), 2);
}

#[test]
fn test_invalid_coordinates() {
    let mut h = Harness::new();

    let nan = GpsFix::new(f64::NAN, 79.0, 5.0, START_MS);
    assert_eq!(
        h.orchestrator.start_capture(&nan),
        StartStatus::InvalidCoordinates
    );

    h.start();
    let off_world = GpsFix::new(95.0, 79.0, 5.0, START_MS);
    let result = h.orchestrator.add_point(&off_world);
    assert_eq!(result.reason, PointStatus::InvalidCoordinates);
    assert_eq!(result.reason.to_string(), "Invalid GPS coordinates");
}

#[test]
fn test_state_errors_are_benign() {
    let mut h = Harness::new();

    let result = h.walk(10.0, 0.0);
    assert!(!result.added);
    assert_eq!(result.reason, PointStatus::NotCapturing);
    assert_eq!(h.orchestrator.complete_capture(), CaptureResult::NotCapturing);
    assert!(!h.orchestrator.cancel_capture());

    assert_eq!(h.start(), StartStatus::Started);
    assert_eq!(h.start(), StartStatus::AlreadyCapturing);
    assert_eq!(h.orchestrator.active_path().len(), 1);
}

// ============================================================================
// Failure and cancellation
// ============================================================================

#[test]
fn test_figure_eight_fails_self_intersecting() {
    let mut h = Harness::new();
    h.start();

    for &(east, north) in &FIGURE_EIGHT {
        let result = h.walk(east, north);
        assert!(result.added);
        assert!(!result.loop_detected);
    }
    h.drain();

    let result = h.orchestrator.complete_capture();
    assert_eq!(
        result,
        CaptureResult::Failed {
            reason: ValidationFailure::SelfIntersecting,
            area: 0.0,
        }
    );
    assert!(!h.orchestrator.is_capturing());
    assert_eq!(h.orchestrator.state().last_outcome, Some(CaptureOutcome::Failed));
    assert!(h.orchestrator.captured_territories().is_empty());

    let events = h.drain();
    let names: Vec<&str> = events.iter().map(|e| e.as_str()).collect();
    assert_eq!(names, vec!["pathUpdate", "captureFailure"]);
    match &events[1] {
        CaptureEvent::CaptureFailure { reason, path, .. } => {
            assert_eq!(reason.to_string(), "Path cannot cross itself");
            // The unsimplified trail, start included
            assert_eq!(path.len(), FIGURE_EIGHT.len() + 1);
        }
        other => panic!("expected capture failure, got {:?}", other),
    }

    // Ready for another attempt
    assert_eq!(h.start(), StartStatus::Started);
}

#[test]
fn test_too_small_capture_fails() {
    let mut h = Harness::new();
    h.start();
    h.walk(8.0, 0.0);
    h.walk(8.0, 8.0);
    h.walk(0.0, 8.0);

    match h.orchestrator.complete_capture() {
        CaptureResult::Failed {
            reason: ValidationFailure::TooSmall { area },
            area: reported,
        } => {
            assert_eq!(area, reported);
            assert!(area < 100.0);
        }
        other => panic!("expected too small, got {:?}", other),
    }
    assert_eq!(h.orchestrator.stats(), CaptureStats::default());
}

#[test]
fn test_cancel_twice_is_idempotent() {
    let mut h = Harness::new();
    h.start();
    h.walk(10.0, 0.0);
    h.walk(20.0, 0.0);
    h.drain();

    assert!(h.orchestrator.cancel_capture());
    let first = h.drain();
    assert_eq!(first.len(), 1);
    assert_eq!(first[0].as_str(), "pathUpdate");

    assert!(!h.orchestrator.cancel_capture());
    assert!(h.drain().is_empty());

    let state = h.orchestrator.state();
    assert_eq!(state.status, CaptureStatus::Idle);
    assert_eq!(state.path_length, 0);
    assert_eq!(state.last_outcome, Some(CaptureOutcome::Cancelled));
    assert_eq!(h.orchestrator.stats().total_distance_meters, 0.0);
}

#[test]
fn test_cancel_suppresses_pending_finalize() {
    let mut h = Harness::new();
    h.start();
    for &(east, north) in &SQUARE {
        h.walk(east, north);
    }
    assert!(h.orchestrator.next_deadline().is_some());

    assert!(h.orchestrator.cancel_capture());
    assert!(h.orchestrator.next_deadline().is_none());

    h.clock.advance(10 * AUTO_FINALIZE_DELAY_MS);
    assert!(h.orchestrator.poll().is_none());

    let events = h.drain();
    assert_eq!(count(&events, "captureSuccess"), 0);
    assert_eq!(count(&events, "captureFailure"), 0);
    assert!(h.orchestrator.captured_territories().is_empty());
}

#[test]
fn test_restart_after_loop_drops_stale_finalize() {
    let mut h = Harness::new();
    h.start();
    for &(east, north) in &SQUARE {
        h.walk(east, north);
    }
    h.orchestrator.cancel_capture();
    h.start();

    // The new capture has a single point; no finalize may fire for it
    h.clock.advance(AUTO_FINALIZE_DELAY_MS);
    assert!(h.orchestrator.poll().is_none());
    assert!(h.orchestrator.is_capturing());
    assert_eq!(h.orchestrator.active_path().len(), 1);
}

// ============================================================================
// Territories
// ============================================================================

fn capture_square(h: &mut Harness, base: GeoPoint) -> CaptureResult {
    assert_eq!(h.start_at(base), StartStatus::Started);
    for &(east, north) in &SQUARE {
        h.walk_from(base, east, north);
    }
    h.clock.advance(AUTO_FINALIZE_DELAY_MS);
    h.orchestrator.poll().expect("finalize should run")
}

#[test]
fn test_second_capture_records_overlap() {
    let mut h = Harness::new();
    let first = capture_square(&mut h, origin());
    let first_id = first.territory().unwrap().id.clone();

    // Same walk, started 15 m east and 10 m north
    h.clock.advance(60_000);
    let second = capture_square(&mut h, offset_meters(&origin(), 15.0, 10.0));
    let second = second.territory().unwrap();

    assert_ne!(second.id, first_id);
    assert_eq!(second.overlapping_ids, vec![first_id.clone()]);

    // Overlap is informational: both are kept
    assert_eq!(h.orchestrator.captured_territories().len(), 2);
    assert_eq!(h.orchestrator.stats().capture_count, 2);

    let inside = offset_meters(&origin(), 20.0, 20.0);
    let hit = h.orchestrator.territories().territory_at(&inside).unwrap();
    assert_eq!(hit.id, first_id);
    assert!(h.orchestrator.territories().get(&second.id).is_some());
}

#[test]
fn test_clear_territories() {
    let mut h = Harness::new();
    capture_square(&mut h, origin());

    h.start();
    h.walk(10.0, 0.0);
    h.orchestrator.clear_territories();

    assert!(h.orchestrator.captured_territories().is_empty());
    assert_eq!(h.orchestrator.stats(), CaptureStats::default());
    // The active capture is untouched
    assert!(h.orchestrator.is_capturing());
    assert_eq!(h.orchestrator.active_path().len(), 2);
}

#[test]
fn test_territory_serializes_camel_case() {
    let mut h = Harness::new();
    let result = capture_square(&mut h, origin());

    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["result"], "captured");
    assert!(json["territory"]["areaSqMeters"].as_f64().unwrap() > 1_400.0);
    assert_eq!(json["territory"]["ownerId"], "user-1");
    assert!(json["territory"]["overlappingIds"].as_array().unwrap().is_empty());
}

// ============================================================================
// Configuration and ingestion
// ============================================================================

#[test]
fn test_invalid_config_rejected() {
    let config = CaptureConfig {
        min_capture_area: 1_000.0,
        max_capture_area: 10.0,
        ..CaptureConfig::default()
    };
    assert!(matches!(
        CaptureOrchestrator::with_config(config),
        Err(CaptureError::InvalidConfig { .. })
    ));

    let config = CaptureConfig {
        smoothing_window: 0,
        ..CaptureConfig::default()
    };
    assert!(CaptureOrchestrator::with_config(config).is_err());
}

#[test]
fn test_custom_config_owner_and_threshold() {
    let config = CaptureConfig {
        gps_accuracy_threshold: 40.0,
        owner_id: "runner-7".to_string(),
        ..CaptureConfig::default()
    };
    let mut h = Harness::with_config(config);
    h.start();

    h.clock.advance(FIX_INTERVAL_MS);
    let fix = h.fix(10.0, 0.0, 35.0);
    assert!(h.orchestrator.add_point(&fix).added);
    assert_eq!(h.orchestrator.config().owner_id, "runner-7");
}

#[test]
fn test_ingest_pipeline() {
    let mut h = Harness::new();

    // Idle fixes are conditioned but not recorded
    let idle = h.fix(0.0, 0.0, 5.0);
    assert!(matches!(h.orchestrator.ingest(&idle), IngestOutcome::Tracked(_)));

    h.start();

    // 1 km in 1 s
    h.clock.advance(1_000);
    let jump = h.fix(1_000.0, 0.0, 5.0);
    assert_eq!(
        h.orchestrator.ingest(&jump),
        IngestOutcome::Rejected(Rejection::Outlier)
    );

    h.clock.advance(3_000);
    let poor = h.fix(20.0, 0.0, 60.0);
    assert_eq!(
        h.orchestrator.ingest(&poor),
        IngestOutcome::Rejected(Rejection::Gated)
    );

    let walk = h.fix(0.0, 20.0, 5.0);
    match h.orchestrator.ingest(&walk) {
        IngestOutcome::Point(result) => assert_eq!(result.reason, PointStatus::Added),
        other => panic!("expected a trail point, got {:?}", other),
    }

    // The trail holds the smoothed position, pulled back toward the start
    let added = h.orchestrator.active_path()[1];
    let distance = haversine_distance(&origin(), &added);
    assert!(distance > 5.0 && distance < 20.0, "distance was {}", distance);
}

#[test]
fn test_ingested_trail_is_not_smoothed_twice() {
    let mut h = Harness::new();
    h.start();

    for east in [30.0, 60.0, 90.0, 120.0] {
        h.clock.advance(10_000);
        let fix = h.fix(east, 0.0, 5.0);
        match h.orchestrator.ingest(&fix) {
            IngestOutcome::Point(result) => assert_eq!(result.reason, PointStatus::Added),
            other => panic!("expected a trail point, got {:?}", other),
        }
    }

    // Past the smoothing window the trail still matches the conditioned fixes
    let conditioned: Vec<GeoPoint> = h.orchestrator.raw_trail().iter().map(GpsFix::point).collect();
    assert_eq!(conditioned.len(), 5);
    assert_eq!(h.orchestrator.active_path(), conditioned.as_slice());
}

#[test]
fn test_noop_observer_alongside_channel() {
    let mut h = Harness::new();
    h.orchestrator.subscribe(Box::new(NoopObserver));

    h.start();
    assert!(h.orchestrator.cancel_capture());

    let events = h.drain();
    assert_eq!(count(&events, "pathUpdate"), 2);
}
