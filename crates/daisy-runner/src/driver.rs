//! Fixed-cadence driver around the simulation engine.

use crate::stats_log::StatsLog;
use crate::summary::{RunSummary, SummaryTracker};
use anyhow::Result;
use daisy_core::{StepStatistics, TemperatureEvent};
use daisy_world::Simulation;
use std::future::Future;
use std::io::Write;
use tokio::time::{interval, Duration, Instant, MissedTickBehavior};
use tracing::{debug, info, instrument, trace};

/// Turns elapsed frame time into discrete ticks.
///
/// At most one tick fires per frame; leftover time carries over.
#[derive(Debug, Clone)]
pub struct TickAccumulator {
    tick_time: f64,
    remaining: f64,
}

impl TickAccumulator {
    pub fn new(tick_time: Duration) -> Self {
        let tick_time = tick_time.as_secs_f64();
        Self {
            tick_time,
            remaining: tick_time,
        }
    }

    /// Feed `delta` of elapsed time; true when a tick is due
    pub fn advance(&mut self, delta: Duration) -> bool {
        self.remaining -= delta.as_secs_f64();
        if self.remaining < 0.0 {
            self.remaining += self.tick_time;
            true
        } else {
            false
        }
    }

    pub fn remaining(&self) -> f64 {
        self.remaining
    }
}

pub struct Driver<W: Write> {
    sim: Simulation,
    log: StatsLog<W>,
    events: Vec<TemperatureEvent>,
    next_event: usize,
    tracker: SummaryTracker,
    log_every: u64,
}

impl<W: Write> Driver<W> {
    pub fn new(sim: Simulation, log: StatsLog<W>, mut events: Vec<TemperatureEvent>, log_every: u64) -> Self {
        events.sort_by_key(|event| event.at_tick);
        let tracker = SummaryTracker::new(sim.temperature());

        Self {
            sim,
            log,
            events,
            next_event: 0,
            tracker,
            log_every,
        }
    }

    pub fn simulation(&self) -> &Simulation {
        &self.sim
    }

    /// Apply due temperature events, step once and record the result
    pub fn tick(&mut self) -> Result<StepStatistics> {
        let tick = self.sim.tick();
        while let Some(event) = self.events.get(self.next_event) {
            if event.at_tick > tick {
                break;
            }
            self.sim.adjust_temperature(event.delta);
            self.next_event += 1;
        }

        let stats = self.sim.step();
        self.log.record(&stats)?;
        self.tracker.observe(&stats);

        debug!(
            tick = stats.tick,
            light_percent = stats.light_percent,
            dark_percent = stats.dark_percent,
            temperature = stats.temperature,
            "Tick"
        );

        if self.log_every > 0 && stats.tick % self.log_every == 0 {
            self.emit_population_snapshot(&stats);
            self.log.flush()?;
        }

        Ok(stats)
    }

    fn emit_population_snapshot(&self, stats: &StepStatistics) {
        info!(
            event = "population_snapshot",
            tick = stats.tick,
            temperature = format!("{:.3}", stats.temperature),
            white = format!("{:.3}%", stats.light_percent),
            black = format!("{:.3}%", stats.dark_percent),
            barren = format!("{:.3}%", stats.barren_percent()),
            death_rate = format!("{:.3}", self.sim.death_rate()),
            "Population snapshot"
        );
    }

    /// Run `ticks` steps back to back
    #[instrument(skip(self))]
    pub fn run_batch(&mut self, ticks: u64) -> Result<()> {
        info!("Running {} ticks in batch mode", ticks);
        for _ in 0..ticks {
            self.tick()?;
        }
        Ok(())
    }

    /// Run in real time until `num_ticks` ticks are done or `shutdown` resolves.
    ///
    /// The first tick fires immediately; after that a frame timer feeds the
    /// elapsed wall-clock time into a [`TickAccumulator`].
    #[instrument(skip(self, shutdown))]
    pub async fn run_realtime(
        &mut self,
        num_ticks: Option<u64>,
        tick_interval: Duration,
        frame_interval: Duration,
        shutdown: impl Future<Output = ()>,
    ) -> Result<()> {
        info!(
            tick_ms = tick_interval.as_millis() as u64,
            frame_ms = frame_interval.as_millis() as u64,
            "Running in real time"
        );

        let done = |ticks: u64| num_ticks.is_some_and(|limit| ticks >= limit);
        let mut ticks = 0;

        if done(ticks) {
            return Ok(());
        }
        self.tick()?;
        ticks += 1;

        let mut accumulator = TickAccumulator::new(tick_interval);
        let mut frames = interval(frame_interval);
        frames.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut last_frame = Instant::now();

        tokio::pin!(shutdown);

        while !done(ticks) {
            tokio::select! {
                _ = frames.tick() => {
                    let now = Instant::now();
                    let delta = now - last_frame;
                    last_frame = now;

                    if accumulator.advance(delta) {
                        trace!(carry = accumulator.remaining(), "Tick due");
                        self.tick()?;
                        ticks += 1;
                    }
                }
                _ = &mut shutdown => {
                    info!(ticks, "Stopping simulation");
                    break;
                }
            }
        }

        Ok(())
    }

    /// Flush the log and summarise the run
    pub fn finish(mut self) -> Result<(RunSummary, W)> {
        self.log.flush()?;
        let summary = self.tracker.finish(&self.sim);
        info!(rows = self.log.rows(), "Statistics log closed");
        Ok((summary, self.log.into_inner()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn driver(events: Vec<TemperatureEvent>) -> Driver<Vec<u8>> {
        let sim = Simulation::initialize(10, 10, 42, 15.0).unwrap();
        Driver::new(sim, StatsLog::new(Vec::new()), events, 0)
    }

    #[test]
    fn test_accumulator_cadence() {
        let mut acc = TickAccumulator::new(Duration::from_millis(100));
        let frame = Duration::from_millis(30);

        let fired: Vec<bool> = (0..8).map(|_| acc.advance(frame)).collect();
        // 100ms budget: frames at 30, 60, 90 stay positive, 120 crosses
        assert_eq!(fired, vec![false, false, false, true, false, false, true, false]);
    }

    #[test]
    fn test_accumulator_single_tick_per_frame() {
        let mut acc = TickAccumulator::new(Duration::from_millis(100));
        assert!(acc.advance(Duration::from_millis(350)));
        assert!(acc.remaining() < 0.0);
        // the backlog drains one tick per frame
        assert!(acc.advance(Duration::ZERO));
        assert!(acc.advance(Duration::ZERO));
        assert!(!acc.advance(Duration::ZERO));
    }

    #[test]
    fn test_batch_writes_row_per_tick() {
        let mut driver = driver(vec![]);
        driver.run_batch(25).unwrap();
        assert_eq!(driver.simulation().tick(), 25);

        let (summary, output) = driver.finish().unwrap();
        assert_eq!(summary.ticks, 25);

        let output = String::from_utf8(output).unwrap();
        let rows: Vec<&str> = output.lines().collect();
        assert_eq!(rows.len(), 25);
        for row in rows {
            let fields: Vec<f64> = row.split(',').map(|f| f.parse().unwrap()).collect();
            assert_eq!(fields.len(), 3);
            assert!(fields[0] + fields[1] <= 100.0);
        }
    }

    #[test]
    fn test_events_applied_before_their_tick() {
        let events = vec![TemperatureEvent::heat(3), TemperatureEvent::cool(1), TemperatureEvent::heat(3)];
        let mut driven = driver(events);

        let mut manual = Simulation::initialize(10, 10, 42, 15.0).unwrap();
        for tick in 0..6 {
            match tick {
                1 => manual.adjust_temperature(-1.0),
                3 => {
                    manual.adjust_temperature(1.0);
                    manual.adjust_temperature(1.0);
                }
                _ => {}
            }
            let expected = manual.step();
            assert_eq!(driven.tick().unwrap(), expected);
        }
    }

    #[test]
    fn test_matches_undriven_engine() {
        let mut driven = driver(vec![]);
        let mut manual = Simulation::initialize(10, 10, 42, 15.0).unwrap();
        for _ in 0..40 {
            assert_eq!(driven.tick().unwrap(), manual.step());
        }
    }

    #[tokio::test]
    async fn test_realtime_stops_at_tick_limit() {
        let mut driver = driver(vec![]);
        driver
            .run_realtime(
                Some(3),
                Duration::from_millis(5),
                Duration::from_millis(1),
                std::future::pending::<()>(),
            )
            .await
            .unwrap();
        assert_eq!(driver.simulation().tick(), 3);
    }

    #[tokio::test]
    async fn test_realtime_stops_on_shutdown() {
        let mut driver = driver(vec![]);
        driver
            .run_realtime(
                None,
                Duration::from_secs(3600),
                Duration::from_millis(1),
                tokio::time::sleep(Duration::from_millis(20)),
            )
            .await
            .unwrap();
        // only the immediate first tick fits before shutdown
        assert_eq!(driver.simulation().tick(), 1);
    }
}
