// Sensify - Host Demo Entry Point
//
// Sequence:
//   1. Load the emergency contact (saving a default on first run).
//   2. Show that an unavailable sensor is reported, not subscribed.
//   3. Run every screen against a simulated sensor fed by its own thread.
//
// Timestamps are logical (tick x update interval); the generator threads
// tick much faster than real time so the whole tour takes a few seconds.

use std::f64::consts::PI;
use std::fmt::Debug;
use std::time::Duration;

use anyhow::Context;

use sensify::config::*;
use sensify::contact::EmergencyContact;
use sensify::drivers::audio::LogAudio;
use sensify::drivers::backlight::LogBacklight;
use sensify::drivers::haptic::LogHaptics;
use sensify::drivers::notify::LogAlerts;
use sensify::drivers::sensor::SimulatedSensor;
use sensify::drivers::storage::MemoryStore;
use sensify::effects::EffectDispatcher;
use sensify::events::{GpsFix, Sample, SensorKind};
use sensify::integrator::MotionMode;
use sensify::present::{FrameBuffer, Presenter};
use sensify::reducer::{Reducer, ReducerStatus, StreamReducer};
use sensify::screens::ball::{BallConfig, BallGame};
use sensify::screens::fall::{FallConfig, FallDetector};
use sensify::screens::gps_speed::GpsSpeedometer;
use sensify::screens::light::LightMeter;
use sensify::screens::magnet::{MagnetConfig, MagnetDetector};
use sensify::screens::speed::Speedometer;
use sensify::screens::steps::StepCounter;
use sensify::screens::tilt::{TiltMeter, TiltVariant};
use sensify::tasks;

type Dispatcher = EffectDispatcher<LogHaptics, LogAudio, LogAlerts, LogBacklight>;

/// Wall-clock pause between generated samples.
const DEMO_TICK: Duration = Duration::from_millis(2);
const DEMO_POLL: Duration = Duration::from_millis(10);

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------
fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Sensify starting");

    // ---- Emergency contact -----------------------------------------------
    let mut store = MemoryStore::new();
    let mut contact = EmergencyContact::load(&store).context("loading emergency contact")?;
    if contact.number().is_none() {
        contact.save(&mut store, "(555) 010-4477")?;
    }
    log::info!("emergency contact: {}", contact.display());

    // ---- Unavailable sensor ----------------------------------------------
    let mut missing = StreamReducer::new(
        SimulatedSensor::<Sample>::unavailable(SensorKind::Magnetometer),
        MagnetDetector::new(MagnetConfig::default())?,
    );
    if missing.probe() == ReducerStatus::Unavailable {
        log::info!("magnetometer screen shows: Magnetometer is not available on this device");
    }

    let mut dispatcher = Dispatcher::new(LogHaptics, LogAudio, LogAlerts, LogBacklight);

    // Rejecting a bad number keeps the saved one.
    if let Err(e) = contact.save(&mut store, "12345") {
        if let Some(alert) = e.user_alert() {
            dispatcher.dispatch(&alert);
        }
    }

    // ---- Permission denied -------------------------------------------------
    let denied = SimulatedSensor::<GpsFix>::new(SensorKind::Location);
    denied.deny_permission();
    let mut gps_screen = StreamReducer::new(denied, GpsSpeedometer::default());
    if let Err(e) = gps_screen.start(GPS_UPDATE_INTERVAL_MS) {
        if let Some(alert) = e.user_alert() {
            dispatcher.dispatch(&alert);
        }
        log::info!("gps screen status: {:?}", gps_screen.status());
    }

    // ---- Screens -----------------------------------------------------------
    let light = run_demo_xyz(
        "light",
        LightMeter::default(),
        SensorKind::Light,
        LIGHT_UPDATE_INTERVAL_MS,
        60,
        // Dawn to full sun, about one decade of lux every 1.5 s.
        |t| (10f64.powf(t as f64 / 1500.0) - 1.0, 0.0, 0.0),
        &mut dispatcher,
    )?;
    log::info!("light: {:.0} lx, {}", light.lux, LightMeter::default().message(&light));

    let magnet = run_demo_xyz(
        "magnet",
        MagnetDetector::new(MagnetConfig::default())?,
        SensorKind::Magnetometer,
        MAGNET_UPDATE_INTERVAL_MS,
        80,
        // Field ramps up past the entry threshold and back down.
        |t| (0.0, 0.0, 150.0 * (PI * t as f64 / 8000.0).sin()),
        &mut dispatcher,
    )?;
    log::info!("magnet: {} ({} %)", magnet.status_text(), magnet.strength_pct);

    let tilt_meter = TiltMeter::with_default_levels(TiltVariant::SurfaceLevel)?;
    let tilt = run_demo_xyz(
        "tilt",
        tilt_meter,
        SensorKind::Accelerometer,
        ACCEL_UPDATE_INTERVAL_MS,
        40,
        |t| (0.0, 0.3 * (t as f64 / 600.0).sin(), 1.0),
        &mut dispatcher,
    )?;
    log::info!("tilt: {}°", tilt.angle_deg);

    let steps = run_demo_xyz(
        "steps",
        StepCounter::default(),
        SensorKind::Accelerometer,
        ACCEL_UPDATE_INTERVAL_MS,
        400,
        // Alternating swing, one stride every 600 ms.
        |t| if (t / 600) % 2 == 0 { (0.0, 0.0, 1.0) } else { (0.0, 0.8, 1.2) },
        &mut dispatcher,
    )?;
    log::info!("steps: {}", steps.steps);

    let fall_detector = FallDetector::new(FallConfig::default(), &contact)?;
    let fall = run_demo_xyz(
        "fall",
        fall_detector,
        SensorKind::Accelerometer,
        ACCEL_UPDATE_INTERVAL_MS,
        250,
        |t| if t == 1_000 { (3.0, 1.0, 0.5) } else { (0.02, 0.01, 0.0) },
        &mut dispatcher,
    )?;
    log::info!("fall: {} detected, {} escalated", fall.falls_detected, fall.escalations);

    let speed = run_demo_xyz(
        "speed",
        Speedometer::new(Default::default(), MotionMode::Walking)?,
        SensorKind::Accelerometer,
        ACCEL_UPDATE_INTERVAL_MS,
        100,
        |t| (0.0, 0.0, 9.81 + 0.5 * (t as f64 / 300.0).sin()),
        &mut dispatcher,
    )?;
    log::info!("speed: {:.2} {}", speed.display_speed(), speed.unit.label());

    let ball_game = BallGame::new(BallConfig::default())?;
    let ball = run_demo_xyz(
        "ball",
        ball_game,
        SensorKind::Accelerometer,
        BALL_UPDATE_INTERVAL_MS,
        (BALL_WIN_DURATION_MS / BALL_UPDATE_INTERVAL_MS) + 10,
        |_| (0.0, 0.0, 1.0),
        &mut dispatcher,
    )?;
    log::info!("ball: won = {}", ball.won);

    let gps = run_demo(
        "gps",
        GpsSpeedometer::default(),
        SensorKind::Location,
        GPS_UPDATE_INTERVAL_MS,
        40,
        // Heading east along the equator at ~14 m/s.
        |i| GpsFix {
            latitude: 0.0,
            longitude: i as f64 * 0.000_063,
            speed_mps: Some(14.0),
            timestamp_ms: i * GPS_UPDATE_INTERVAL_MS,
        },
        &mut dispatcher,
    )?;
    log::info!(
        "gps: {:.1} {} now, {:.2} km travelled",
        gps.current_speed(),
        gps.unit.label(),
        gps.track.total_distance_km
    );

    log::info!("Sensify done");
    Ok(())
}

// ---------------------------------------------------------------------------
// Demo helpers
// ---------------------------------------------------------------------------

/// Runs one screen end to end and returns its final state.
fn run_demo<R, F>(
    name: &str,
    reducer: R,
    kind: SensorKind,
    interval_ms: u64,
    samples: u64,
    produce: F,
    dispatcher: &mut Dispatcher,
) -> anyhow::Result<R::State>
where
    R: Reducer + Presenter,
    R::Sample: Clone + Send + 'static,
    R::State: Debug,
    F: FnMut(u64) -> R::Sample + Send + 'static,
{
    log::info!("---- {} screen ----", name);
    let sensor = SimulatedSensor::<R::Sample>::new(kind);
    let mut screen = StreamReducer::new(sensor.clone(), reducer);
    let mut frame = FrameBuffer::screen();

    screen.start(interval_ms)?;
    let generator = tasks::sensor::spawn_sensor_task(sensor, DEMO_TICK, samples, produce)
        .with_context(|| format!("spawning {name} sensor task"))?;

    let budget = DEMO_TICK * samples as u32 + DEMO_POLL;
    let mut report = tasks::ui::run_screen(&mut screen, dispatcher, &mut frame, budget, DEMO_POLL);

    generator
        .join()
        .map_err(|_| anyhow::anyhow!("{name} sensor task panicked"))?;
    let tail = screen.pump(dispatcher);
    report.processed += tail.processed;
    report.published += tail.published;
    report.dropped += tail.dropped;
    screen.stop_with(dispatcher);

    log::info!(
        "{}: {} samples, {} published, {} dropped",
        name,
        report.processed,
        report.published,
        report.dropped
    );
    Ok(screen.state().clone())
}

/// Three-axis variant; `produce` receives the logical timestamp.
fn run_demo_xyz<R, F>(
    name: &str,
    reducer: R,
    kind: SensorKind,
    interval_ms: u64,
    samples: u64,
    mut produce: F,
    dispatcher: &mut Dispatcher,
) -> anyhow::Result<R::State>
where
    R: Reducer<Sample = Sample> + Presenter,
    R::State: Debug,
    F: FnMut(u64) -> (f64, f64, f64) + Send + 'static,
{
    run_demo(
        name,
        reducer,
        kind,
        interval_ms,
        samples,
        move |i| {
            let t = i * interval_ms;
            let (x, y, z) = produce(t);
            Sample::new(x, y, z, t)
        },
        dispatcher,
    )
}
