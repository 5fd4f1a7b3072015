//! Tick statistics

use std::collections::VecDeque;

use glam::Vec3;

const DEFAULT_SAMPLES: usize = 120;

/// Summary of the forces produced in one tick
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TickSample {
    /// Mean force magnitude
    pub mean_force: f32,
    /// Largest force magnitude
    pub max_force: f32,
    /// Agents whose force used the whole budget
    pub saturated: usize,
    /// Agents in the tick
    pub agents: usize,
}

/// Rolling statistics over recent ticks
#[derive(Debug)]
pub struct TickStats {
    samples: VecDeque<TickSample>,
    max_samples: usize,
    avg_force: f32,
    peak_force: f32,
    saturation_ratio: f32,
    total_ticks: u64,
}

impl TickStats {
    /// Create a new tracker
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_SAMPLES)
    }

    /// Create a tracker keeping at most `max_samples` ticks
    pub fn with_capacity(max_samples: usize) -> Self {
        let max_samples = max_samples.max(1);
        Self {
            samples: VecDeque::with_capacity(max_samples),
            max_samples,
            avg_force: 0.0,
            peak_force: 0.0,
            saturation_ratio: 0.0,
            total_ticks: 0,
        }
    }

    /// Record a tick's forces. `max_forces` yields each agent's force budget
    /// in the same order.
    pub fn record_tick(
        &mut self,
        forces: &[Vec3],
        max_forces: impl IntoIterator<Item = f32>,
    ) -> TickSample {
        let mut sample = TickSample {
            agents: forces.len(),
            ..Default::default()
        };

        let mut total = 0.0;
        for (force, max_force) in forces.iter().zip(max_forces) {
            let length = force.length();
            total += length;
            sample.max_force = sample.max_force.max(length);
            if max_force > 0.0 && length >= max_force * (1.0 - 1e-4) {
                sample.saturated += 1;
            }
        }
        if !forces.is_empty() {
            sample.mean_force = total / forces.len() as f32;
        }

        self.total_ticks += 1;
        if self.samples.len() >= self.max_samples {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
        self.update_stats();

        sample
    }

    fn update_stats(&mut self) {
        if self.samples.is_empty() {
            return;
        }

        let mut force_sum = 0.0;
        let mut peak = 0.0_f32;
        let mut saturated = 0;
        let mut agents = 0;

        for sample in &self.samples {
            force_sum += sample.mean_force;
            peak = peak.max(sample.max_force);
            saturated += sample.saturated;
            agents += sample.agents;
        }

        self.avg_force = force_sum / self.samples.len() as f32;
        self.peak_force = peak;
        // Guard against division by zero
        self.saturation_ratio = if agents > 0 {
            saturated as f32 / agents as f32
        } else {
            0.0
        };
    }

    /// Average of the per-tick mean force
    pub fn avg_force(&self) -> f32 {
        self.avg_force
    }

    /// Largest force seen in the window
    pub fn peak_force(&self) -> f32 {
        self.peak_force
    }

    /// Share of agent-ticks that hit the force budget
    pub fn saturation_ratio(&self) -> f32 {
        self.saturation_ratio
    }

    /// Ticks recorded since creation
    pub fn total_ticks(&self) -> u64 {
        self.total_ticks
    }

    /// Most recent sample
    pub fn last(&self) -> Option<&TickSample> {
        self.samples.back()
    }

    /// Get a formatted stats string
    pub fn format_stats(&self) -> String {
        format!(
            "Tick: {} | Force: {:.3} avg, {:.3} peak | Saturated: {:.1}%",
            self.total_ticks,
            self.avg_force,
            self.peak_force,
            self.saturation_ratio * 100.0
        )
    }
}

impl Default for TickStats {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_tick() {
        let mut stats = TickStats::new();
        let sample = stats.record_tick(&[], []);
        assert_eq!(sample, TickSample::default());
        assert_eq!(stats.total_ticks(), 1);
        assert_eq!(stats.saturation_ratio(), 0.0);
    }

    #[test]
    fn test_saturation_count() {
        let mut stats = TickStats::new();
        let forces = [Vec3::new(2.0, 0.0, 0.0), Vec3::new(0.0, 0.5, 0.0)];
        let sample = stats.record_tick(&forces, [2.0, 2.0]);

        assert_eq!(sample.saturated, 1);
        assert_eq!(sample.agents, 2);
        assert!((sample.mean_force - 1.25).abs() < 1e-6);
        assert!((stats.peak_force() - 2.0).abs() < 1e-6);
        assert!((stats.saturation_ratio() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_window_drops_old_ticks() {
        let mut stats = TickStats::with_capacity(2);
        stats.record_tick(&[Vec3::new(9.0, 0.0, 0.0)], [10.0]);
        stats.record_tick(&[Vec3::X], [10.0]);
        stats.record_tick(&[Vec3::X], [10.0]);

        assert_eq!(stats.total_ticks(), 3);
        assert!((stats.peak_force() - 1.0).abs() < 1e-6);
        assert!((stats.avg_force() - 1.0).abs() < 1e-6);
        assert!(stats.format_stats().starts_with("Tick: 3"));
    }
}
