// Sensify - Effect Dispatcher
//
// Performs the side effects reducers emit. Sound playback is limited to one
// concurrent instance per detection episode: a `PlaySound` while already
// playing is suppressed until the matching `StopSound`.

use std::fmt::Debug;

use crate::drivers::audio::Audio;
use crate::drivers::backlight::Backlight;
use crate::drivers::haptic::Haptics;
use crate::drivers::notify::Alerts;
use crate::events::Effect;
use crate::reducer::StateSink;

pub struct EffectDispatcher<H, A, N, B> {
    haptics: H,
    audio: A,
    alerts: N,
    backlight: B,
    playing: bool,
}

impl<H: Haptics, A: Audio, N: Alerts, B: Backlight> EffectDispatcher<H, A, N, B> {
    pub fn new(haptics: H, audio: A, alerts: N, backlight: B) -> Self {
        Self {
            haptics,
            audio,
            alerts,
            backlight,
            playing: false,
        }
    }

    pub fn dispatch(&mut self, effect: &Effect) {
        match effect {
            Effect::Vibrate(pattern) => self.haptics.vibrate(pattern),
            Effect::PlaySound => {
                if self.playing {
                    log::debug!("alert sound already playing; start suppressed");
                    return;
                }
                match self.audio.play_sound() {
                    Ok(()) => self.playing = true,
                    Err(e) => log::warn!("error playing sound: {}", e),
                }
            }
            Effect::StopSound => {
                if !self.playing {
                    return;
                }
                self.playing = false;
                if let Err(e) = self.audio.stop_sound() {
                    log::warn!("error stopping sound: {}", e);
                }
            }
            Effect::PresentAlert { title, body } => self.alerts.present_alert(title, body),
            Effect::SetBrightness(level) => {
                if let Err(e) = self.backlight.set_brightness(level.clamp(0.0, 1.0)) {
                    log::warn!("error setting brightness: {}", e);
                }
            }
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn haptics(&self) -> &H {
        &self.haptics
    }

    pub fn audio(&self) -> &A {
        &self.audio
    }

    pub fn alerts(&self) -> &N {
        &self.alerts
    }

    pub fn backlight(&self) -> &B {
        &self.backlight
    }
}

impl<S, H, A, N, B> StateSink<S> for EffectDispatcher<H, A, N, B>
where
    S: Debug,
    H: Haptics,
    A: Audio,
    N: Alerts,
    B: Backlight,
{
    fn on_state_change(&mut self, state: &S) {
        log::debug!("state -> {:?}", state);
    }

    fn on_effect(&mut self, effect: &Effect) {
        self.dispatch(effect);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        calls: Vec<String>,
        fail_play: bool,
    }

    impl Haptics for Recorder {
        fn vibrate(&mut self, pattern: &[u64]) {
            self.calls.push(format!("vibrate {:?}", pattern));
        }
    }

    impl Audio for Recorder {
        fn play_sound(&mut self) -> anyhow::Result<()> {
            if self.fail_play {
                anyhow::bail!("sound not loaded");
            }
            self.calls.push("play".into());
            Ok(())
        }

        fn stop_sound(&mut self) -> anyhow::Result<()> {
            self.calls.push("stop".into());
            Ok(())
        }
    }

    impl Alerts for Recorder {
        fn present_alert(&mut self, title: &str, _body: &str) {
            self.calls.push(format!("alert {}", title));
        }
    }

    impl Backlight for Recorder {
        fn set_brightness(&mut self, level: f64) -> anyhow::Result<()> {
            self.calls.push(format!("brightness {}", level));
            Ok(())
        }
    }

    fn dispatcher() -> EffectDispatcher<Recorder, Recorder, Recorder, Recorder> {
        EffectDispatcher::new(
            Recorder::default(),
            Recorder::default(),
            Recorder::default(),
            Recorder::default(),
        )
    }

    #[test]
    fn test_second_play_is_suppressed() {
        let mut d = dispatcher();
        d.dispatch(&Effect::PlaySound);
        d.dispatch(&Effect::PlaySound);
        assert_eq!(d.audio().calls, vec!["play"]);
        d.dispatch(&Effect::StopSound);
        d.dispatch(&Effect::PlaySound);
        assert_eq!(d.audio().calls, vec!["play", "stop", "play"]);
    }

    #[test]
    fn test_stop_without_play_is_ignored() {
        let mut d = dispatcher();
        d.dispatch(&Effect::StopSound);
        assert!(d.audio().calls.is_empty());
    }

    #[test]
    fn test_failed_play_does_not_mark_playing() {
        let mut d = EffectDispatcher::new(
            Recorder::default(),
            Recorder {
                fail_play: true,
                ..Recorder::default()
            },
            Recorder::default(),
            Recorder::default(),
        );
        d.dispatch(&Effect::PlaySound);
        assert!(!d.is_playing());
    }

    #[test]
    fn test_routes_vibration_and_alerts() {
        let mut d = dispatcher();
        d.dispatch(&Effect::Vibrate(vec![200, 100, 200]));
        d.dispatch(&Effect::alert("Potential Fall Detected", "Are you okay?"));
        assert_eq!(d.haptics().calls, vec!["vibrate [200, 100, 200]"]);
        assert_eq!(d.alerts().calls, vec!["alert Potential Fall Detected"]);
    }

    #[test]
    fn test_brightness_is_clamped() {
        let mut d = dispatcher();
        d.dispatch(&Effect::SetBrightness(0.6));
        d.dispatch(&Effect::SetBrightness(1.7));
        assert_eq!(d.backlight().calls, vec!["brightness 0.6", "brightness 1"]);
    }
}
