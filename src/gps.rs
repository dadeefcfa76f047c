// Sensify - GPS speed & distance tracking
//
// Unlike the accelerometer integrator this uses platform-reported speed and
// great-circle distance between fixes, so it does not drift.

use crate::config::*;
use crate::events::GpsFix;

/// Great-circle distance in kilometres.
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let (phi1, phi2) = (lat1.to_radians(), lat2.to_radians());
    let d_phi = (lat2 - lat1).to_radians();
    let d_lambda = (lon2 - lon1).to_radians();

    let a = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    // Rounding can push `a` a hair past 1 for antipodal points.
    2.0 * EARTH_RADIUS_KM * a.min(1.0).sqrt().asin()
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrackerConfig {
    /// Exponential smoothing factor applied to each new speed reading.
    pub smoothing: f64,
    /// Reported speeds below this (m/s) read as standing still.
    pub stationary_mps: f64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            smoothing: GPS_SMOOTHING_FACTOR,
            stationary_mps: GPS_STATIONARY_SPEED_MPS,
        }
    }
}

/// Running trip summary. Speeds are km/h.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GpsTrack {
    pub current_speed_kmh: f64,
    pub total_distance_km: f64,
    pub average_speed_kmh: f64,
    pub last_position: Option<(f64, f64)>,
    pub started_ms: Option<u64>,
}

impl GpsTrack {
    pub fn advance(&self, fix: &GpsFix, config: &TrackerConfig) -> Self {
        let leg = self
            .last_position
            .map(|(lat, lon)| haversine_km(lat, lon, fix.latitude, fix.longitude))
            .unwrap_or(0.0);
        let total_distance_km = self.total_distance_km + leg;

        let reported_kmh = match fix.speed_mps {
            Some(mps) if mps >= config.stationary_mps => mps * MPS_TO_KMH,
            _ => 0.0,
        };
        let current_speed_kmh =
            self.current_speed_kmh + config.smoothing * (reported_kmh - self.current_speed_kmh);

        let started_ms = self.started_ms.unwrap_or(fix.timestamp_ms);
        let elapsed_h = fix.timestamp_ms.saturating_sub(started_ms) as f64 / 3_600_000.0;
        let average_speed_kmh = if elapsed_h > 0.0 {
            total_distance_km / elapsed_h
        } else {
            0.0
        };

        Self {
            current_speed_kmh,
            total_distance_km,
            average_speed_kmh,
            last_position: Some((fix.latitude, fix.longitude)),
            started_ms: Some(started_ms),
        }
    }
}
