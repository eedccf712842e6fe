//! End-of-run summary.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use daisy_core::StepStatistics;
use daisy_world::Simulation;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub seed: u64,
    pub width: i32,
    pub height: i32,
    pub ticks: u64,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub final_statistics: StepStatistics,
    pub min_temperature: f64,
    pub max_temperature: f64,
    pub mean_light_percent: f64,
    pub mean_dark_percent: f64,
}

impl RunSummary {
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write run summary {}", path.display()))?;
        info!(path = %path.display(), "Run summary written");
        Ok(())
    }
}

/// Running aggregates over the statistics of every tick
#[derive(Debug, Clone)]
pub struct SummaryTracker {
    started_at: DateTime<Utc>,
    ticks: u64,
    min_temperature: f64,
    max_temperature: f64,
    light_percent_sum: f64,
    dark_percent_sum: f64,
}

impl SummaryTracker {
    pub fn new(initial_temperature: f64) -> Self {
        Self {
            started_at: Utc::now(),
            ticks: 0,
            min_temperature: initial_temperature,
            max_temperature: initial_temperature,
            light_percent_sum: 0.0,
            dark_percent_sum: 0.0,
        }
    }

    pub fn observe(&mut self, stats: &StepStatistics) {
        self.ticks += 1;
        self.min_temperature = self.min_temperature.min(stats.temperature);
        self.max_temperature = self.max_temperature.max(stats.temperature);
        self.light_percent_sum += stats.light_percent;
        self.dark_percent_sum += stats.dark_percent;
    }

    pub fn finish(&self, sim: &Simulation) -> RunSummary {
        let mean = |sum: f64| {
            if self.ticks > 0 {
                sum / self.ticks as f64
            } else {
                0.0
            }
        };

        RunSummary {
            seed: sim.seed(),
            width: sim.width(),
            height: sim.height(),
            ticks: self.ticks,
            started_at: self.started_at,
            finished_at: Utc::now(),
            final_statistics: sim.statistics(),
            min_temperature: self.min_temperature,
            max_temperature: self.max_temperature,
            mean_light_percent: mean(self.light_percent_sum),
            mean_dark_percent: mean(self.dark_percent_sum),
        }
    }
}

/// Log the summary as one structured event
pub fn emit_summary(summary: &RunSummary) {
    let elapsed = summary.finished_at - summary.started_at;
    info!(
        event = "run_summary",
        seed = summary.seed,
        width = summary.width,
        height = summary.height,
        ticks = summary.ticks,
        elapsed_ms = elapsed.num_milliseconds(),
        final_temperature = format!("{:.3}", summary.final_statistics.temperature),
        final_light_percent = format!("{:.3}", summary.final_statistics.light_percent),
        final_dark_percent = format!("{:.3}", summary.final_statistics.dark_percent),
        min_temperature = format!("{:.3}", summary.min_temperature),
        max_temperature = format!("{:.3}", summary.max_temperature),
        mean_light_percent = format!("{:.3}", summary.mean_light_percent),
        mean_dark_percent = format!("{:.3}", summary.mean_dark_percent),
        "Run complete"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracker_aggregates() {
        let mut tracker = SummaryTracker::new(15.0);
        tracker.observe(&StepStatistics::from_counts(1, 1, 0, 3, 15.25));
        tracker.observe(&StepStatistics::from_counts(2, 0, 2, 2, 14.75));

        let sim = Simulation::initialize(2, 2, 3, 15.0).unwrap();
        let summary = tracker.finish(&sim);

        assert_eq!(summary.ticks, 2);
        assert_eq!(summary.min_temperature, 14.75);
        assert_eq!(summary.max_temperature, 15.25);
        assert_eq!(summary.mean_dark_percent, 12.5);
        assert_eq!(summary.mean_light_percent, 25.0);
        assert_eq!(summary.seed, 3);
        assert!(summary.finished_at >= summary.started_at);
    }

    #[test]
    fn test_empty_run() {
        let tracker = SummaryTracker::new(20.0);
        let sim = Simulation::initialize(1, 1, 0, 20.0).unwrap();
        let summary = tracker.finish(&sim);
        assert_eq!(summary.ticks, 0);
        assert_eq!(summary.mean_light_percent, 0.0);
        assert_eq!(summary.min_temperature, 20.0);
        assert_eq!(summary.final_statistics.barren_count, 1);
    }

    #[test]
    fn test_summary_json() {
        let tracker = SummaryTracker::new(15.0);
        let sim = Simulation::initialize(3, 3, 9, 15.0).unwrap();
        let summary = tracker.finish(&sim);

        let json = serde_json::to_string(&summary).unwrap();
        let parsed: RunSummary = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.width, 3);
        assert_eq!(parsed.final_statistics, summary.final_statistics);
    }
}
