//! Location tracking duty-cycle advice.
//!
//! Maps what the user is doing and how much battery is left to the update
//! cadence the position source should run at. Advice only: nothing here
//! throttles the source.

use serde::{Deserialize, Serialize};

/// Battery percentage below which idle tracking drops to low power.
pub const LOW_BATTERY_PERCENT: u8 = 20;

/// What the user is doing, as seen by the tracking policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActivityState {
    Capturing,
    Idle,
    Background,
}

/// Accuracy level requested from the position source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AccuracyTier {
    High,
    Balanced,
}

/// Recommended position source settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingProfile {
    pub accuracy: AccuracyTier,
    pub time_interval_ms: u32,
    pub distance_interval_meters: f64,
    pub show_background_indicator: bool,
}

impl TrackingProfile {
    /// Highest accuracy, shortest interval. Used whenever a capture is active.
    pub const CAPTURING: TrackingProfile = TrackingProfile {
        accuracy: AccuracyTier::High,
        time_interval_ms: 2_000,
        distance_interval_meters: 5.0,
        show_background_indicator: true,
    };

    pub const LOW_POWER: TrackingProfile = TrackingProfile {
        accuracy: AccuracyTier::Balanced,
        time_interval_ms: 10_000,
        distance_interval_meters: 20.0,
        show_background_indicator: false,
    };

    pub const BALANCED: TrackingProfile = TrackingProfile {
        accuracy: AccuracyTier::Balanced,
        time_interval_ms: 5_000,
        distance_interval_meters: 10.0,
        show_background_indicator: false,
    };
}

/// Recommend tracking settings for an activity state and battery level (0-100).
pub fn recommend_tracking(activity: ActivityState, battery_percent: u8) -> TrackingProfile {
    match activity {
        ActivityState::Capturing => TrackingProfile::CAPTURING,
        _ if battery_percent < LOW_BATTERY_PERCENT => TrackingProfile::LOW_POWER,
        _ => TrackingProfile::BALANCED,
    }
}
