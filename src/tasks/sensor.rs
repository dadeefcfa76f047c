// Sensify - Sensor Task
//
// Drives a simulated sensor from its own thread at a fixed interval, the
// way a platform binding delivers readings. Exits once every listener has
// gone or the sample budget is spent.

use std::io;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::drivers::sensor::SimulatedSensor;

pub fn spawn_sensor_task<T, F>(
    sensor: SimulatedSensor<T>,
    interval: Duration,
    max_samples: u64,
    mut produce: F,
) -> io::Result<JoinHandle<()>>
where
    T: Clone + Send + 'static,
    F: FnMut(u64) -> T + Send + 'static,
{
    thread::Builder::new()
        .name(format!("sensor-{}", sensor.kind_of()))
        .spawn(move || {
            log::debug!("{} task started", sensor.kind_of());

            for tick in 0..max_samples {
                let tick_start = Instant::now();

                if sensor.emit(produce(tick)) == 0 {
                    log::debug!("{} has no listeners; exiting sensor task", sensor.kind_of());
                    return;
                }

                // Sleep for the remainder of the sampling interval.
                let elapsed = tick_start.elapsed();
                if elapsed < interval {
                    thread::sleep(interval - elapsed);
                }
            }
        })
}
