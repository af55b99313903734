use std::time::Duration;

use bevy::prelude::{Resource, Timer, TimerMode};
use log::info;
use rand::Rng;

use crate::engine::models::{Metrics, MissionStatus};

/// Upper bound of the simulated vehicle speed (kts)
pub const MAX_SPEED_KTS: f64 = 25.0;
/// Battery drained per mission tick (%)
pub const BATTERY_DRAIN_PER_TICK: f64 = 0.5;

/// Repeating timer that drives the metrics simulation.
///
/// Held only while a mission is running; dropping it releases the clock.
#[derive(Debug)]
pub struct MissionClock {
    timer: Timer,
    started_at: chrono::DateTime<chrono::Utc>,
}

impl MissionClock {
    fn acquire(interval: Duration) -> Self {
        info!("Mission clock acquired ({:?} interval)", interval);
        Self {
            timer: Timer::new(interval, TimerMode::Repeating),
            started_at: chrono::Utc::now(),
        }
    }

    /// Number of whole intervals elapsed during this tick
    fn advance(&mut self, delta: Duration) -> u32 {
        self.timer.tick(delta);
        self.timer.times_finished_this_tick()
    }
}

impl Drop for MissionClock {
    fn drop(&mut self) {
        info!("Mission clock released");
    }
}

#[derive(Resource, Debug)]
pub struct MissionState {
    status: MissionStatus,
    metrics: Metrics,
    initial_metrics: Metrics,
    tick_interval: Duration,
    clock: Option<MissionClock>,
}

impl Default for MissionState {
    fn default() -> Self {
        Self::new(Metrics::default(), Duration::from_secs(1))
    }
}

impl MissionState {
    pub fn new(initial_metrics: Metrics, tick_interval: Duration) -> Self {
        Self {
            status: MissionStatus::Idle,
            metrics: initial_metrics,
            initial_metrics,
            tick_interval,
            clock: None,
        }
    }

    pub fn status(&self) -> MissionStatus {
        self.status
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub fn is_running(&self) -> bool {
        self.status == MissionStatus::Running
    }

    pub fn has_clock(&self) -> bool {
        self.clock.is_some()
    }

    pub fn started_at(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        self.clock.as_ref().map(|c| c.started_at)
    }

    pub fn can_start(&self, waypoint_count: usize) -> bool {
        waypoint_count > 0 && !self.is_running()
    }

    /// Starts the mission if there is a route and it is not already running
    pub fn start(&mut self, waypoint_count: usize) -> bool {
        if !self.can_start(waypoint_count) {
            return false;
        }
        self.status = MissionStatus::Running;
        self.clock = Some(MissionClock::acquire(self.tick_interval));
        info!("Mission started with {} waypoints", waypoint_count);
        true
    }

    /// Advances the simulation by `delta`, applying one metrics step per elapsed interval
    pub fn tick<R: Rng>(&mut self, delta: Duration, rng: &mut R) {
        let Some(clock) = self.clock.as_mut() else {
            return;
        };

        let steps = clock.advance(delta);
        for _ in 0..steps {
            self.metrics = step_metrics(&self.metrics, rng);
            if self.metrics.battery <= 0.0 {
                self.status = MissionStatus::Completed;
                self.clock = None;
                info!("Battery depleted, mission completed");
                break;
            }
        }
    }

    pub fn reset(&mut self) {
        self.clock = None;
        self.status = MissionStatus::Idle;
        self.metrics = self.initial_metrics;
        info!("Mission reset");
    }
}

/// One simulation step of the vehicle telemetry
pub fn step_metrics<R: Rng>(prev: &Metrics, rng: &mut R) -> Metrics {
    Metrics {
        battery: (prev.battery - BATTERY_DRAIN_PER_TICK).max(0.0),
        wind_speed: (prev.wind_speed + (rng.random::<f64>() - 0.5) * 2.0).max(0.0),
        speed: (prev.speed + (rng.random::<f64>() - 0.3) * 3.0).clamp(0.0, MAX_SPEED_KTS),
        temperature: prev.temperature + (rng.random::<f64>() - 0.5) * 0.5,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    const SECOND: Duration = Duration::from_secs(1);

    #[test]
    fn test_cannot_start_without_waypoints() {
        let mut mission = MissionState::default();
        assert!(!mission.start(0));
        assert_eq!(mission.status(), MissionStatus::Idle);
        assert!(!mission.has_clock());
    }

    #[test]
    fn test_start_acquires_clock_once() {
        let mut mission = MissionState::default();
        assert!(mission.start(2));
        assert!(mission.is_running());
        assert!(mission.has_clock());
        assert!(mission.started_at().is_some());

        // Already running
        assert!(!mission.start(2));
        assert!(!mission.can_start(2));
    }

    #[test]
    fn test_tick_without_clock_is_inert() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut mission = MissionState::default();
        mission.tick(Duration::from_secs(10), &mut rng);
        assert_eq!(*mission.metrics(), Metrics::default());
    }

    #[test]
    fn test_tick_steps_once_per_interval() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut mission = MissionState::default();
        mission.start(1);

        mission.tick(Duration::from_millis(400), &mut rng);
        assert_eq!(mission.metrics().battery, 85.0);

        mission.tick(Duration::from_millis(700), &mut rng);
        assert_eq!(mission.metrics().battery, 84.5);

        mission.tick(3 * SECOND, &mut rng);
        assert_eq!(mission.metrics().battery, 83.0);
    }

    #[test]
    fn test_metrics_stay_in_bounds() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut metrics = Metrics::default();
        for _ in 0..500 {
            let next = step_metrics(&metrics, &mut rng);
            assert!(next.battery >= 0.0);
            assert!(next.wind_speed >= 0.0);
            assert!((0.0..=MAX_SPEED_KTS).contains(&next.speed));
            assert!((next.temperature - metrics.temperature).abs() <= 0.25);
            metrics = next;
        }
        assert_eq!(metrics.battery, 0.0);
    }

    #[test]
    fn test_depleted_battery_completes_mission() {
        let mut rng = StdRng::seed_from_u64(1);
        let initial = Metrics { battery: 1.0, ..Metrics::default() };
        let mut mission = MissionState::new(initial, SECOND);
        mission.start(3);

        mission.tick(SECOND, &mut rng);
        assert!(mission.is_running());
        mission.tick(5 * SECOND, &mut rng);
        assert_eq!(mission.status(), MissionStatus::Completed);
        assert!(!mission.has_clock());
        assert_eq!(mission.metrics().battery, 0.0);

        // No updates after the clock is gone
        let frozen = *mission.metrics();
        mission.tick(5 * SECOND, &mut rng);
        assert_eq!(*mission.metrics(), frozen);
    }

    #[test]
    fn test_reset_releases_clock_and_restores_metrics() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut mission = MissionState::default();
        mission.start(1);
        mission.tick(4 * SECOND, &mut rng);
        assert_ne!(*mission.metrics(), Metrics::default());

        mission.reset();
        assert_eq!(mission.status(), MissionStatus::Idle);
        assert!(!mission.has_clock());
        assert_eq!(*mission.metrics(), Metrics::default());

        mission.tick(4 * SECOND, &mut rng);
        assert_eq!(*mission.metrics(), Metrics::default());
    }
}
