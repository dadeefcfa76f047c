// Sensify - UI Task
//
// Polls one screen's reducer on the calling thread, pushes published state
// into the sink and redraws the gauge into the frame buffer.

use std::thread;
use std::time::{Duration, Instant};

use crate::present::{FrameBuffer, Presenter};
use crate::reducer::{PumpReport, Reducer, SampleSource, StateSink, StreamReducer};

/// Runs the screen for `duration`, polling every `poll_interval`.
/// Returns the totals across all polls.
pub fn run_screen<Src, R, K>(
    screen: &mut StreamReducer<Src, R>,
    sink: &mut K,
    frame: &mut FrameBuffer,
    duration: Duration,
    poll_interval: Duration,
) -> PumpReport
where
    Src: SampleSource,
    R: Reducer<Sample = Src::Sample> + Presenter,
    K: StateSink<R::State>,
{
    let started = Instant::now();
    let mut totals = PumpReport::default();

    loop {
        let report = screen.pump(sink);
        totals.processed += report.processed;
        totals.dropped += report.dropped;
        totals.published += report.published;

        if report.published > 0 {
            // Infallible target.
            let _ = screen.reducer().gauge(screen.state()).draw(frame);
        }

        if started.elapsed() >= duration {
            break;
        }
        thread::sleep(poll_interval);
    }

    totals
}
