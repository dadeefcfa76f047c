// Sensify - Presentation Adapter
//
// Maps published state to visual parameters. Every mapping is a pure
// function of its inputs so screens can be checked without a display.

use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};

use crate::config::*;
use crate::reducer::Reducer;

// ---------------------------------------------------------------------------
// Scalar mappings
// ---------------------------------------------------------------------------

pub fn lerp_color(from: Rgb888, to: Rgb888, t: f64) -> Rgb888 {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
    Rgb888::new(mix(from.r(), to.r()), mix(from.g(), to.g()), mix(from.b(), to.b()))
}

/// Colour at a (possibly fractional) ordinal along a ramp, as when an
/// animation is midway between two states.
pub fn color_ramp(colors: &[Rgb888], position: f64) -> Option<Rgb888> {
    let last = colors.len().checked_sub(1)?;
    let position = if position.is_nan() { 0.0 } else { position.clamp(0.0, last as f64) };
    let lower = position.floor() as usize;
    let upper = (lower + 1).min(last);
    Some(lerp_color(colors[lower], colors[upper], position - lower as f64))
}

/// Bar height proportional to `value / full_scale`, clamped to `[0, max_px]`.
pub fn bar_height(value: f64, full_scale: f64, max_px: f64) -> f64 {
    if full_scale <= 0.0 || !value.is_finite() {
        return 0.0;
    }
    (value.abs() / full_scale).clamp(0.0, 1.0) * max_px
}

/// Whole percent, floored and capped at 100.
pub fn percent(value: f64, full_scale: f64) -> u8 {
    if full_scale <= 0.0 || !value.is_finite() || value <= 0.0 {
        return 0;
    }
    ((value / full_scale) * 100.0).floor().min(100.0) as u8
}

pub fn opacity(progress: f64) -> f64 {
    if progress.is_nan() {
        0.0
    } else {
        progress.clamp(0.0, 1.0)
    }
}

// ---------------------------------------------------------------------------
// Gauge
// ---------------------------------------------------------------------------

/// Horizontal fill bar, the common visual every screen can reduce to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gauge {
    pub fraction: f64,
    pub fill: Rgb888,
    pub track: Rgb888,
}

impl Gauge {
    pub fn new(fraction: f64, fill: Rgb888) -> Self {
        Self {
            fraction: opacity(fraction),
            fill,
            track: Rgb888::new(0xd0, 0xd0, 0xd0),
        }
    }

    /// Fills the target's bounding box: track first, then the filled part.
    pub fn draw<D>(&self, target: &mut D) -> core::result::Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb888>,
    {
        let area = target.bounding_box();
        area.into_styled(PrimitiveStyle::with_fill(self.track))
            .draw(target)?;

        let width = (area.size.width as f64 * self.fraction).round() as u32;
        if width > 0 {
            Rectangle::new(area.top_left, Size::new(width, area.size.height))
                .into_styled(PrimitiveStyle::with_fill(self.fill))
                .draw(target)?;
        }
        Ok(())
    }
}

/// Screens that can express their state as a gauge.
pub trait Presenter: Reducer {
    fn gauge(&self, state: &Self::State) -> Gauge;
}

// ---------------------------------------------------------------------------
// Frame buffer
// ---------------------------------------------------------------------------

/// In-memory RGB frame, the host stand-in for a panel.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameBuffer {
    size: Size,
    pixels: Vec<Rgb888>,
}

impl FrameBuffer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            size: Size::new(width, height),
            pixels: vec![Rgb888::BLACK; (width * height) as usize],
        }
    }

    pub fn screen() -> Self {
        Self::new(SCREEN_WIDTH, SCREEN_HEIGHT)
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgb888> {
        if x < self.size.width && y < self.size.height {
            self.pixels.get((y * self.size.width + x) as usize).copied()
        } else {
            None
        }
    }

    pub fn count(&self, color: Rgb888) -> usize {
        self.pixels.iter().filter(|&&p| p == color).count()
    }
}

impl OriginDimensions for FrameBuffer {
    fn size(&self) -> Size {
        self.size
    }
}

impl DrawTarget for FrameBuffer {
    type Color = Rgb888;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> core::result::Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let (w, h) = (self.size.width as i32, self.size.height as i32);
        for Pixel(point, color) in pixels {
            if (0..w).contains(&point.x) && (0..h).contains(&point.y) {
                self.pixels[(point.y * w + point.x) as usize] = color;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lerp_endpoints_and_midpoint() {
        let black = Rgb888::BLACK;
        let white = Rgb888::WHITE;
        assert_eq!(lerp_color(black, white, 0.0), black);
        assert_eq!(lerp_color(black, white, 1.0), white);
        assert_eq!(lerp_color(black, white, 0.5), Rgb888::new(128, 128, 128));
        assert_eq!(lerp_color(black, white, 7.0), white);
    }

    #[test]
    fn test_color_ramp_is_deterministic() {
        let ramp = [Rgb888::BLACK, Rgb888::new(100, 0, 0), Rgb888::WHITE];
        assert_eq!(color_ramp(&ramp, 1.0), Some(Rgb888::new(100, 0, 0)));
        assert_eq!(color_ramp(&ramp, 9.0), Some(Rgb888::WHITE));
        assert_eq!(color_ramp(&ramp, 0.5), color_ramp(&ramp, 0.5));
        assert_eq!(color_ramp(&[], 0.0), None);
    }

    #[test]
    fn test_bar_height_and_percent() {
        assert_eq!(bar_height(-0.5, 1.0, 350.0), 175.0);
        assert_eq!(bar_height(3.0, 1.0, 350.0), 350.0);
        assert_eq!(percent(150.0, 200.0), 75);
        assert_eq!(percent(999.0, 200.0), 100);
        assert_eq!(percent(-3.0, 200.0), 0);
    }

    #[test]
    fn test_gauge_fills_proportionally() {
        let mut fb = FrameBuffer::new(100, 4);
        let fill = Rgb888::new(0x22, 0x8b, 0xe6);
        Gauge::new(0.25, fill).draw(&mut fb).unwrap();
        assert_eq!(fb.count(fill), 25 * 4);
        assert_eq!(fb.pixel(24, 0), Some(fill));
        assert_eq!(fb.pixel(25, 0), Some(Rgb888::new(0xd0, 0xd0, 0xd0)));
        assert_eq!(fb.pixel(100, 0), None);
    }
}
