// Sensify - GPS Speedometer Screen

use embedded_graphics::pixelcolor::Rgb888;

use crate::config::*;
use crate::error::Result;
use crate::events::{Effect, GpsFix};
use crate::gps::{GpsTrack, TrackerConfig};
use crate::integrator::SpeedUnit;
use crate::present::{self, Gauge, Presenter};
use crate::reducer::Reducer;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GpsSpeedState {
    pub track: GpsTrack,
    pub unit: SpeedUnit,
}

impl GpsSpeedState {
    pub fn current_speed(&self) -> f64 {
        self.unit.from_kmh(self.track.current_speed_kmh)
    }

    pub fn average_speed(&self) -> f64 {
        self.unit.from_kmh(self.track.average_speed_kmh)
    }

    /// Switching units keeps the trip; only the display changes.
    pub fn toggle_unit(&self) -> Self {
        Self {
            track: self.track,
            unit: self.unit.toggle(),
        }
    }
}

pub struct GpsSpeedometer {
    config: TrackerConfig,
    /// Gauge full scale in km/h.
    full_scale_kmh: f64,
}

impl Default for GpsSpeedometer {
    fn default() -> Self {
        Self::new(TrackerConfig::default(), GPS_GAUGE_FULL_SCALE_KMH)
    }
}

impl GpsSpeedometer {
    pub fn new(config: TrackerConfig, full_scale_kmh: f64) -> Self {
        Self {
            config,
            full_scale_kmh,
        }
    }
}

impl Reducer for GpsSpeedometer {
    type Sample = GpsFix;
    type State = GpsSpeedState;

    fn initial_state(&self) -> GpsSpeedState {
        GpsSpeedState::default()
    }

    fn reduce(&self, state: &GpsSpeedState, fix: &GpsFix, _effects: &mut Vec<Effect>) -> Result<GpsSpeedState> {
        Ok(GpsSpeedState {
            track: state.track.advance(fix.validate()?, &self.config),
            unit: state.unit,
        })
    }

    fn changed(&self, published: &GpsSpeedState, next: &GpsSpeedState) -> bool {
        // Two-decimal display.
        let shown = |v: f64| (v * 100.0).round() as i64;
        published.unit != next.unit
            || shown(published.track.current_speed_kmh) != shown(next.track.current_speed_kmh)
            || shown(published.track.total_distance_km) != shown(next.track.total_distance_km)
    }
}

impl Presenter for GpsSpeedometer {
    fn gauge(&self, state: &GpsSpeedState) -> Gauge {
        let fraction = present::bar_height(state.track.current_speed_kmh, self.full_scale_kmh, 1.0);
        Gauge::new(fraction, Rgb888::new(0x22, 0x8b, 0xe6))
    }
}
