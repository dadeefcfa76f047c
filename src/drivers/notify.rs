// Sensify - Alert / Notification Driver

/// Fire-and-forget user-visible alerts. No acknowledgment is expected.
pub trait Alerts {
    fn present_alert(&mut self, title: &str, body: &str);
}

#[derive(Debug, Default)]
pub struct LogAlerts;

impl Alerts for LogAlerts {
    fn present_alert(&mut self, title: &str, body: &str) {
        log::warn!("[alert] {}: {}", title, body);
    }
}
