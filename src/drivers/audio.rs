// Sensify - Audio Driver
//
// Alert-sound playback behind a trait; the host build only logs.

pub trait Audio {
    /// Rewinds and starts the loaded alert sound.
    fn play_sound(&mut self) -> anyhow::Result<()>;

    fn stop_sound(&mut self) -> anyhow::Result<()>;
}

#[derive(Debug, Default)]
pub struct LogAudio;

impl Audio for LogAudio {
    fn play_sound(&mut self) -> anyhow::Result<()> {
        log::info!("alert sound: play");
        Ok(())
    }

    fn stop_sound(&mut self) -> anyhow::Result<()> {
        log::info!("alert sound: stop");
        Ok(())
    }
}
