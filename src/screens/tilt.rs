// Sensify - Tilt Game / Surface Level Screen
//
// The y axis, clamped to [-1, 1], drives one of two bars. The tilt game
// grows the top bar on a positive tilt; the surface-level detector mirrors
// it onto the bottom bar.

use embedded_graphics::pixelcolor::Rgb888;

use crate::classifier::OrderedStates;
use crate::config::*;
use crate::error::Result;
use crate::events::{Effect, Sample};
use crate::present::{self, Gauge, Presenter};
use crate::reducer::Reducer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TiltVariant {
    #[default]
    TiltGame,
    SurfaceLevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TiltState {
    pub tilt: f64,
    pub angle_deg: i32,
    pub top_bar_px: f64,
    pub bottom_bar_px: f64,
    pub level_ordinal: usize,
}

impl TiltState {
    pub fn is_level(&self) -> bool {
        self.tilt == 0.0
    }
}

pub struct TiltMeter {
    variant: TiltVariant,
    levels: OrderedStates<()>,
    max_bar_px: f64,
}

impl TiltMeter {
    /// `levels` buckets the absolute angle in degrees.
    pub fn new(variant: TiltVariant, levels: OrderedStates<()>) -> Self {
        Self {
            variant,
            levels,
            max_bar_px: TILT_BAR_MAX_PX,
        }
    }

    pub fn with_default_levels(variant: TiltVariant) -> Result<Self> {
        let levels = OrderedStates::from_labels(&[
            (0.0, "LEVEL"),
            (5.0, "SLIGHT"),
            (30.0, "TILTED"),
            (TILT_FULL_SCALE_DEG, "STEEP"),
        ])?;
        Ok(Self::new(variant, levels))
    }

    pub fn level_label(&self, state: &TiltState) -> &str {
        self.levels
            .get(state.level_ordinal)
            .map(|s| s.label.as_str())
            .unwrap_or("")
    }
}

impl Reducer for TiltMeter {
    type Sample = Sample;
    type State = TiltState;

    fn initial_state(&self) -> TiltState {
        TiltState::default()
    }

    fn reduce(&self, _state: &TiltState, sample: &Sample, _effects: &mut Vec<Effect>) -> Result<TiltState> {
        let tilt = sample.validate()?.y.clamp(-1.0, 1.0);
        // Halves round toward +inf, so -22.5 reads as -22.
        let angle_deg = (tilt * TILT_FULL_SCALE_DEG + 0.5).floor() as i32;
        let height = present::bar_height(tilt, 1.0, self.max_bar_px);

        let raises_top = match self.variant {
            TiltVariant::TiltGame => tilt > 0.0,
            TiltVariant::SurfaceLevel => tilt < 0.0,
        };
        let (top_bar_px, bottom_bar_px) = if tilt == 0.0 {
            (0.0, 0.0)
        } else if raises_top {
            (height, 0.0)
        } else {
            (0.0, height)
        };

        Ok(TiltState {
            tilt,
            angle_deg,
            top_bar_px,
            bottom_bar_px,
            level_ordinal: self.levels.classify(angle_deg.unsigned_abs() as f64).ordinal,
        })
    }

    fn changed(&self, published: &TiltState, next: &TiltState) -> bool {
        published.angle_deg != next.angle_deg
            || (published.top_bar_px - next.top_bar_px).abs() >= 1.0
            || (published.bottom_bar_px - next.bottom_bar_px).abs() >= 1.0
    }
}

impl Presenter for TiltMeter {
    fn gauge(&self, state: &TiltState) -> Gauge {
        Gauge::new(state.tilt.abs(), Rgb888::new(0xe7, 0x4c, 0x3c))
    }
}
