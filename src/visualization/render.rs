//! Render-side interface
//!
//! A renderer receives one [`Snapshot`] per frame plus the overlay lines
//! produced from the configured info requests. Drawing surfaces, windows and
//! input handling live behind [`RenderSink`] implementations.

use crate::configuration::config::InfoRequest;
use crate::simulation::snapshot::Snapshot;

/// Consumer of published snapshots
pub trait RenderSink {
    fn draw(&mut self, snapshot: &Snapshot, overlay: &[String]);
}

/// Text for each requested overlay item
pub fn overlay_lines(snapshot: &Snapshot, info: &[InfoRequest]) -> Vec<String> {
    info.iter()
        .map(|request| match request {
            InfoRequest::Days => format!("Days: {:.0}", snapshot.elapsed_days()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn days_overlay_converts_seconds() {
        let snapshot = Snapshot {
            elapsed: 86_400.0 * 365.0,
            ..Default::default()
        };
        assert_eq!(overlay_lines(&snapshot, &[InfoRequest::Days]), vec!["Days: 365".to_string()]);
        assert!(overlay_lines(&snapshot, &[]).is_empty());
    }
}
