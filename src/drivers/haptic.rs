// Sensify - Haptic Driver
//
// Vibration output. The platform binding is out of scope; the host build
// logs the requested pattern.

pub trait Haptics {
    /// `pattern` alternates pause/vibrate durations in milliseconds.
    fn vibrate(&mut self, pattern: &[u64]);
}

#[derive(Debug, Default)]
pub struct LogHaptics;

impl Haptics for LogHaptics {
    fn vibrate(&mut self, pattern: &[u64]) {
        let total: u64 = pattern.iter().sum();
        log::info!("vibrate {:?} ({} ms)", pattern, total);
    }
}
