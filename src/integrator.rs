// Sensify - Motion Integrator
//
// Dead-reckoning speed estimate from linear acceleration. This is a
// heuristic: there is no error-correction term, drift is unbounded over
// time, and it is no substitute for GPS-derived speed. State is kept in the
// working unit (km/h-equivalent); mph conversion happens at presentation.

use crate::config::*;
use crate::error::{Result, SensifyError};
use crate::events::Sample;

// ---------------------------------------------------------------------------
// Modes & units
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MotionMode {
    #[default]
    Walking,
    Cycling,
    Driving,
}

impl MotionMode {
    pub fn sensitivity(&self) -> f64 {
        match self {
            Self::Walking => WALKING_SENSITIVITY,
            Self::Cycling => CYCLING_SENSITIVITY,
            Self::Driving => DRIVING_SENSITIVITY,
        }
    }

    pub fn max_speed(&self) -> f64 {
        match self {
            Self::Walking => WALKING_MAX_SPEED,
            Self::Cycling => CYCLING_MAX_SPEED,
            Self::Driving => DRIVING_MAX_SPEED,
        }
    }

    /// Walking -> Cycling -> Driving -> Walking.
    pub fn next(&self) -> Self {
        match self {
            Self::Walking => Self::Cycling,
            Self::Cycling => Self::Driving,
            Self::Driving => Self::Walking,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Walking => "walking",
            Self::Cycling => "cycling",
            Self::Driving => "driving",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpeedUnit {
    #[default]
    KilometersPerHour,
    MilesPerHour,
}

impl SpeedUnit {
    /// Converts a km/h value into this unit.
    pub fn from_kmh(&self, kmh: f64) -> f64 {
        match self {
            Self::KilometersPerHour => kmh,
            Self::MilesPerHour => kmh * KMH_TO_MPH,
        }
    }

    pub fn toggle(&self) -> Self {
        match self {
            Self::KilometersPerHour => Self::MilesPerHour,
            Self::MilesPerHour => Self::KilometersPerHour,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::KilometersPerHour => "km/h",
            Self::MilesPerHour => "mph",
        }
    }
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, PartialEq)]
pub struct IntegratorConfig {
    pub gravity: f64,
    /// Changes in net acceleration smaller than this are treated as jitter.
    pub noise_epsilon: f64,
    /// Weight given to the previous smoothed speed.
    pub alpha: f64,
}

impl Default for IntegratorConfig {
    fn default() -> Self {
        Self {
            gravity: GRAVITY,
            noise_epsilon: NOISE_EPSILON,
            alpha: SMOOTHING_ALPHA,
        }
    }
}

impl IntegratorConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.gravity.is_finite() || self.gravity < 0.0 {
            return Err(SensifyError::InvalidConfig(format!(
                "gravity must be a non-negative number, got {}",
                self.gravity
            )));
        }
        if !self.noise_epsilon.is_finite() || self.noise_epsilon < 0.0 {
            return Err(SensifyError::InvalidConfig(format!(
                "noise epsilon must be a non-negative number, got {}",
                self.noise_epsilon
            )));
        }
        if !(0.0..1.0).contains(&self.alpha) {
            return Err(SensifyError::InvalidConfig(format!(
                "smoothing alpha must lie in [0, 1), got {}",
                self.alpha
            )));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct IntegratorState {
    pub smoothed_speed: f64,
    pub last_sample_timestamp: Option<u64>,
    pub last_net_acceleration: f64,
    pub mode: MotionMode,
}

impl IntegratorState {
    pub fn new(mode: MotionMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// Zeroes every field but keeps the mode.
    pub fn reset(&self) -> Self {
        Self::new(self.mode)
    }
}

/// Advances the estimate by one sample.
///
/// The first sample only seeds the timestamp and reference acceleration.
/// A sample whose net acceleration sits within `noise_epsilon` of the
/// reference only refreshes the timestamp; the reference stays anchored to
/// the last accepted value so slow ramps still get through.
pub fn integrate(prev: IntegratorState, sample: &Sample, config: &IntegratorConfig) -> IntegratorState {
    let total = sample.magnitude();
    let net = total - config.gravity;

    let Some(last_ts) = prev.last_sample_timestamp else {
        return IntegratorState {
            last_sample_timestamp: Some(sample.timestamp_ms),
            last_net_acceleration: net,
            ..prev
        };
    };

    if (net - prev.last_net_acceleration).abs() < config.noise_epsilon {
        return IntegratorState {
            last_sample_timestamp: Some(sample.timestamp_ms),
            ..prev
        };
    }

    // Out-of-order timestamps contribute no time.
    let delta_s = sample.timestamp_ms.saturating_sub(last_ts) as f64 / 1000.0;
    let speed_change = net * prev.mode.sensitivity() * delta_s;
    let raw = (prev.smoothed_speed + speed_change).clamp(0.0, prev.mode.max_speed());
    let smoothed = config.alpha * prev.smoothed_speed + (1.0 - config.alpha) * raw;

    IntegratorState {
        // A convex blend of two in-range values stays in range; clamp anyway
        // so float rounding can never leave the mode's window.
        smoothed_speed: smoothed.clamp(0.0, prev.mode.max_speed()),
        last_sample_timestamp: Some(sample.timestamp_ms),
        last_net_acceleration: net,
        mode: prev.mode,
    }
}
