//! Headless frame loop
//!
//! [`run_frames`] plays the foreground role: at the display frame rate it takes
//! the latest published snapshot and hands it to a [`RenderSink`] with the
//! overlay lines. [`LogSink`] draws to the log, for runs without a window.

use std::thread;
use std::time::{Duration, Instant};

use tracing::info;

use crate::configuration::config::InfoRequest;
use crate::simulation::clock::{ClockStatus, SimulationClock};
use crate::simulation::snapshot::Snapshot;
use crate::visualization::render::{overlay_lines, RenderSink};

/// Sink that writes each frame to the log instead of a window
#[derive(Debug, Default)]
pub struct LogSink {
    pub frames: u64,
}

impl RenderSink for LogSink {
    fn draw(&mut self, snapshot: &Snapshot, overlay: &[String]) {
        self.frames += 1;
        for body in &snapshot.bodies {
            info!(
                frame = self.frames,
                body = %body.name,
                x = body.x_vis.x,
                y = body.x_vis.y,
                path_points = body.trajectory.len(),
                "draw"
            );
        }
        for line in overlay {
            info!(frame = self.frames, "{line}");
        }
    }
}

/// Foreground loop: draw the latest snapshot `frames` times at `fps`
///
/// Stops early if the stepper halts. Returns the status observed at the end.
pub fn run_frames(
    clock: &SimulationClock,
    sink: &mut dyn RenderSink,
    frames: u64,
    fps: u32,
    info: &[InfoRequest],
) -> ClockStatus {
    let frame_time = Duration::from_secs_f64(1.0 / fps.max(1) as f64);

    for _ in 0..frames {
        let started = Instant::now();

        let snapshot = clock.snapshot();
        let overlay = overlay_lines(&snapshot, info);
        sink.draw(&snapshot, &overlay);

        if clock.status() == ClockStatus::Halted {
            break;
        }

        // frame pacing
        if let Some(rest) = frame_time.checked_sub(started.elapsed()) {
            thread::sleep(rest);
        }
    }

    clock.status()
}
