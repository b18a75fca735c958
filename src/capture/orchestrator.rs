//! The capture state machine.
//!
//! `Idle → Capturing → {Completed, Cancelled, Failed} → Idle`. One trail is
//! active at a time. Every operation runs to completion and never fails hard:
//! misuse and bad input come back as status values, and every failure path
//! returns the orchestrator to `Idle`.

use log::{debug, info, warn};

use super::config::CaptureConfig;
use super::events::{CaptureEvent, CaptureObserver};
use super::scheduler::{AUTO_FINALIZE_DELAY_MS, Clock, FinalizeTimer, SystemClock};
use super::state::{
    CaptureOutcome, CaptureResult, CaptureSnapshot, CaptureStats, CaptureStatus, PointResult,
    PointStatus, StartStatus,
};
use super::territory::{Territory, TerritoryStore, generate_territory_id};
use crate::conditioner::{GpsProcessor, ProcessedFix, Rejection, smooth_trail};
use crate::error::{OptionExt, Result};
use crate::geo_utils::haversine_distance;
use crate::geometry::{
    ValidationFailure, centroid, close_ring, detect_loop_closure, simplify, validate_area,
};
use crate::{GeoPoint, GpsFix};

/// What `ingest` did with a raw fix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IngestOutcome {
    /// Dropped by the signal conditioner.
    Rejected(Rejection),
    /// Conditioned while idle; nothing was recorded.
    Tracked(ProcessedFix),
    /// Conditioned and offered to the active trail.
    Point(PointResult),
}

/// The trail of the capture in progress.
#[derive(Debug)]
struct ActiveCapture {
    /// Smoothed trail shown to the user
    trail: Vec<GeoPoint>,
    /// Accepted fixes, unsmoothed
    raw: Vec<GpsFix>,
    started_at_ms: i64,
    loop_detected: bool,
}

impl ActiveCapture {
    fn new(fix: &GpsFix, started_at_ms: i64) -> Self {
        Self {
            trail: vec![fix.point()],
            raw: vec![*fix],
            started_at_ms,
            loop_detected: false,
        }
    }

    fn resmooth(&mut self, window: usize) {
        let points: Vec<GeoPoint> = self.raw.iter().map(GpsFix::point).collect();
        let accuracies: Vec<f64> = self.raw.iter().map(|f| f.accuracy).collect();
        self.trail = smooth_trail(&points, &accuracies, window);
    }
}

/// Owns the active trail, the captured territories and the capture statistics.
///
/// # Example
/// ```
/// use territory_capture::{CaptureConfig, CaptureOrchestrator, GpsFix, ManualClock};
///
/// let clock = ManualClock::new(0);
/// let mut orchestrator =
///     CaptureOrchestrator::with_clock(CaptureConfig::default(), Box::new(clock.clone())).unwrap();
///
/// assert!(orchestrator.start_capture(&GpsFix::new(21.1458, 79.0882, 5.0, 0)).is_started());
/// assert!(orchestrator.is_capturing());
/// assert!(orchestrator.cancel_capture());
/// assert!(!orchestrator.is_capturing());
/// ```
pub struct CaptureOrchestrator {
    config: CaptureConfig,
    clock: Box<dyn Clock + Send>,
    processor: GpsProcessor,
    observers: Vec<Box<dyn CaptureObserver + Send>>,
    active: Option<ActiveCapture>,
    territories: TerritoryStore,
    stats: CaptureStats,
    finalize_timer: FinalizeTimer,
    last_outcome: Option<CaptureOutcome>,
}

impl Default for CaptureOrchestrator {
    fn default() -> Self {
        Self::new()
    }
}

impl CaptureOrchestrator {
    /// Create an orchestrator with default configuration and the system clock.
    pub fn new() -> Self {
        Self::build(CaptureConfig::default(), Box::new(SystemClock))
    }

    /// Create an orchestrator with custom configuration and the system clock.
    pub fn with_config(config: CaptureConfig) -> Result<Self> {
        Self::with_clock(config, Box::new(SystemClock))
    }

    /// Create an orchestrator with custom configuration and time source.
    pub fn with_clock(config: CaptureConfig, clock: Box<dyn Clock + Send>) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config, clock))
    }

    fn build(config: CaptureConfig, clock: Box<dyn Clock + Send>) -> Self {
        Self {
            processor: GpsProcessor::new(&config.conditioner),
            config,
            clock,
            observers: Vec::new(),
            active: None,
            territories: TerritoryStore::new(),
            stats: CaptureStats::default(),
            finalize_timer: FinalizeTimer::new(),
            last_outcome: None,
        }
    }

    /// Register an observer. Observers receive events in subscription order.
    pub fn subscribe(&mut self, observer: Box<dyn CaptureObserver + Send>) {
        self.observers.push(observer);
    }

    pub fn config(&self) -> &CaptureConfig {
        &self.config
    }

    // ========================================================================
    // Capture Lifecycle
    // ========================================================================

    /// Start a new capture at `fix`.
    ///
    /// Ignored (with a logged warning) when already capturing or when the
    /// fix is unusable.
    pub fn start_capture(&mut self, fix: &GpsFix) -> StartStatus {
        if self.active.is_some() {
            warn!("start_capture ignored: already capturing");
            return StartStatus::AlreadyCapturing;
        }
        if !fix.is_well_formed() {
            warn!("start_capture ignored: invalid starting position");
            return StartStatus::InvalidCoordinates;
        }
        if fix.accuracy > self.config.gps_accuracy_threshold {
            warn!(
                "start_capture ignored: accuracy {:.1}m exceeds {:.1}m",
                fix.accuracy, self.config.gps_accuracy_threshold
            );
            return StartStatus::LowAccuracy;
        }

        let now = self.clock.now_ms();
        self.active = Some(ActiveCapture::new(fix, now));
        self.finalize_timer.cancel();
        self.processor.reset();
        // The starting fix anchors the outlier reference and the smoother
        if let Err(rejection) = self.processor.process(fix, true) {
            debug!("Starting fix not conditioned: {}", rejection);
        }

        info!(
            "Capture started at ({:.6}, {:.6})",
            fix.latitude, fix.longitude
        );
        self.notify_path_update();
        StartStatus::Started
    }

    /// Offer a fix to the active trail.
    ///
    /// Once the trail holds `smoothing_window` points it is re-smoothed from
    /// the accepted fixes.
    pub fn add_point(&mut self, fix: &GpsFix) -> PointResult {
        self.append_point(fix, true)
    }

    fn append_point(&mut self, fix: &GpsFix, resmooth: bool) -> PointResult {
        let config = &self.config;
        let Some(active) = self.active.as_mut() else {
            return PointResult::rejected(PointStatus::NotCapturing);
        };
        if active.loop_detected {
            return PointResult::rejected(PointStatus::FinalizePending);
        }
        if !fix.is_well_formed() {
            return PointResult::rejected(PointStatus::InvalidCoordinates);
        }
        if fix.accuracy > config.gps_accuracy_threshold {
            return PointResult::rejected(PointStatus::LowAccuracy);
        }

        let point = fix.point();
        let step = match active.trail.last() {
            Some(last) => haversine_distance(last, &point),
            None => 0.0,
        };
        if step < config.min_point_distance {
            debug!("Point too close: {:.1}m", step);
            return PointResult::rejected(PointStatus::TooClose);
        }

        active.raw.push(*fix);
        active.trail.push(point);
        if resmooth && active.trail.len() >= config.smoothing_window {
            active.resmooth(config.smoothing_window);
        }

        let loop_detected = detect_loop_closure(
            &active.trail,
            config.min_loop_distance,
            config.loop_closure_threshold,
        );
        active.loop_detected = loop_detected;
        let loop_path = loop_detected.then(|| active.trail.clone());

        self.stats.total_distance_meters += step;
        self.notify_path_update();

        if let Some(path) = loop_path {
            info!("Loop detected after {} points", path.len());
            self.emit(CaptureEvent::LoopDetected { path });
            let now = self.clock.now_ms();
            self.finalize_timer.schedule(now, AUTO_FINALIZE_DELAY_MS);
            return PointResult {
                added: true,
                loop_detected: true,
                reason: PointStatus::LoopDetected,
            };
        }

        PointResult {
            added: true,
            loop_detected: false,
            reason: PointStatus::Added,
        }
    }

    /// Condition a raw fix, then offer it to the trail when capturing.
    ///
    /// Conditioned positions are appended as they are; the trail is not
    /// smoothed a second time.
    pub fn ingest(&mut self, fix: &GpsFix) -> IngestOutcome {
        let capturing = self.active.is_some();
        match self.processor.process(fix, capturing) {
            Err(rejection) => {
                debug!("Fix rejected by conditioner: {}", rejection);
                IngestOutcome::Rejected(rejection)
            }
            Ok(processed) if !capturing => IngestOutcome::Tracked(processed),
            Ok(processed) => IngestOutcome::Point(self.append_point(&processed.to_fix(), false)),
        }
    }

    /// Run a scheduled finalize if it is due.
    ///
    /// Returns the capture result when a finalize ran.
    pub fn poll(&mut self) -> Option<CaptureResult> {
        let now = self.clock.now_ms();
        if !self.finalize_timer.take_due(now) || self.active.is_none() {
            return None;
        }
        Some(self.finalize())
    }

    /// When the scheduled finalize becomes due, if one is pending.
    pub fn next_deadline(&self) -> Option<i64> {
        self.finalize_timer.deadline()
    }

    /// Finalize the active capture now.
    pub fn complete_capture(&mut self) -> CaptureResult {
        if self.active.is_none() {
            return CaptureResult::NotCapturing;
        }
        self.finalize()
    }

    /// Abandon the active capture. Returns false when idle.
    pub fn cancel_capture(&mut self) -> bool {
        if self.active.is_none() {
            return false;
        }

        self.end_capture(CaptureOutcome::Cancelled);
        info!("Capture cancelled");
        self.notify_path_update();
        true
    }

    /// Drop all territories and zero the statistics.
    pub fn clear_territories(&mut self) {
        self.territories.clear();
        self.stats = CaptureStats::default();
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn is_capturing(&self) -> bool {
        self.active.is_some()
    }

    pub fn state(&self) -> CaptureSnapshot {
        let (status, path_length, duration_ms, finalize_pending) = match &self.active {
            Some(active) => (
                CaptureStatus::Capturing,
                active.trail.len(),
                self.clock.now_ms() - active.started_at_ms,
                self.finalize_timer.is_pending(),
            ),
            None => (CaptureStatus::Idle, 0, 0, false),
        };

        CaptureSnapshot {
            status,
            path_length,
            distance_meters: self.stats.total_distance_meters,
            duration_ms,
            captured_count: self.territories.len(),
            finalize_pending,
            last_outcome: self.last_outcome,
        }
    }

    pub fn captured_territories(&self) -> &[Territory] {
        self.territories.as_slice()
    }

    /// The store, for spatial queries over captured territories.
    pub fn territories(&self) -> &TerritoryStore {
        &self.territories
    }

    /// The smoothed trail of the active capture, empty when idle.
    pub fn active_path(&self) -> &[GeoPoint] {
        self.active.as_ref().map(|a| a.trail.as_slice()).unwrap_or(&[])
    }

    /// Accepted fixes of the active capture, empty when idle.
    pub fn raw_trail(&self) -> &[GpsFix] {
        self.active.as_ref().map(|a| a.raw.as_slice()).unwrap_or(&[])
    }

    pub fn stats(&self) -> CaptureStats {
        self.stats
    }

    // ========================================================================
    // Finalize Protocol
    // ========================================================================

    fn finalize(&mut self) -> CaptureResult {
        let Some(active) = self.active.as_ref() else {
            return CaptureResult::NotCapturing;
        };

        let ring = close_ring(&active.trail);
        let simplified = simplify(&ring, self.config.simplification_tolerance);
        let validation = validate_area(
            &simplified,
            self.config.min_capture_area,
            self.config.max_capture_area,
        );

        let territory = validation.and_then(|area| {
            self.build_territory(active, simplified, area)
                .map_err(|e| {
                    warn!("Could not build territory: {}", e);
                    ValidationFailure::TooFewPoints
                })
        });

        match territory {
            Ok(territory) => self.commit(territory),
            Err(reason) => self.fail(reason),
        }
    }

    fn build_territory(
        &self,
        active: &ActiveCapture,
        polygon: Vec<GeoPoint>,
        area: f64,
    ) -> Result<Territory> {
        let center = centroid(&polygon)
            .ok_or_insufficient_points("territory centroid", polygon.len(), 1)?;
        let now = self.clock.now_ms();

        let overlapping_ids: Vec<String> = self
            .territories
            .find_overlapping(&polygon)
            .into_iter()
            .map(|t| t.id.clone())
            .collect();
        if !overlapping_ids.is_empty() {
            warn!(
                "Territory overlaps {} existing capture(s)",
                overlapping_ids.len()
            );
        }

        Ok(Territory {
            id: generate_territory_id(now),
            owner_id: self.config.owner_id.clone(),
            simplified_point_count: polygon.len(),
            polygon,
            center,
            area_sq_meters: area,
            captured_at_epoch_ms: now,
            duration_ms: now - active.started_at_ms,
            distance_meters: self.stats.total_distance_meters,
            raw_point_count: active.raw.len(),
            overlapping_ids,
        })
    }

    fn commit(&mut self, territory: Territory) -> CaptureResult {
        self.territories.insert(territory.clone());
        self.stats.capture_count += 1;
        self.stats.total_area_sq_meters += territory.area_sq_meters;
        self.end_capture(CaptureOutcome::Completed);

        info!(
            "Territory captured: {:.0} m², {} points",
            territory.area_sq_meters, territory.simplified_point_count
        );
        self.notify_path_update();
        self.emit(CaptureEvent::CaptureSuccess {
            territory: territory.clone(),
        });
        CaptureResult::Captured { territory }
    }

    fn fail(&mut self, reason: ValidationFailure) -> CaptureResult {
        let path = self.end_capture(CaptureOutcome::Failed);
        let area = reason.area();

        info!("Capture failed: {} ({:.0} m²)", reason, area);
        self.notify_path_update();
        self.emit(CaptureEvent::CaptureFailure { reason, area, path });
        CaptureResult::Failed { reason, area }
    }

    /// Clear the trail, cancel any pending finalize and return to idle.
    ///
    /// Returns the discarded trail.
    fn end_capture(&mut self, outcome: CaptureOutcome) -> Vec<GeoPoint> {
        let trail = self.active.take().map(|a| a.trail).unwrap_or_default();
        self.finalize_timer.cancel();
        self.processor.reset();
        self.stats.total_distance_meters = 0.0;
        self.last_outcome = Some(outcome);
        trail
    }

    // ========================================================================
    // Events
    // ========================================================================

    fn notify_path_update(&mut self) {
        let event = CaptureEvent::PathUpdate {
            path: self.active_path().to_vec(),
            is_capturing: self.active.is_some(),
            stats: self.stats,
        };
        self.emit(event);
    }

    fn emit(&mut self, event: CaptureEvent) {
        for observer in self.observers.iter_mut() {
            observer.on_event(&event);
        }
    }
}
