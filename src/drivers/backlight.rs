// Sensify - Backlight Driver
//
// Screen brightness follows the ambient light level.

pub trait Backlight {
    /// `level` is 0.0 (off) to 1.0 (full).
    fn set_brightness(&mut self, level: f64) -> anyhow::Result<()>;
}

#[derive(Debug, Default)]
pub struct LogBacklight;

impl Backlight for LogBacklight {
    fn set_brightness(&mut self, level: f64) -> anyhow::Result<()> {
        log::info!("brightness -> {:.0} %", level * 100.0);
        Ok(())
    }
}
