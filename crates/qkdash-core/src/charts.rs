//! Chart registry: logical metric names, redraw modes, comparison panel.
//!
//! The registry does not draw anything. It maps a metric name to a redraw
//! mode and queues redraw commands for the host renderer to drain each
//! frame. Live numeric telemetry always redraws silently so rapid polling
//! never stutters; comparison panels redraw animated on user-visible
//! milestones (first render, testbed completion).

use std::collections::VecDeque;

use rand::Rng;

/// How a chart redraw should be presented by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedrawMode {
    /// In-place data swap, no transition. Used by high-frequency telemetry.
    Silent,
    /// Full animated redraw. Used for milestones like testbed completion.
    Animated,
}

/// One queued redraw for the host renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedrawCommand {
    pub name: String,
    pub mode: RedrawMode,
}

#[derive(Debug, Clone)]
struct ChartSpec {
    name: String,
    mode: RedrawMode,
}

/// Categories of the performance comparison panel.
pub const COMPARISON_CATEGORIES: [&str; 3] = ["speed", "reliability", "efficiency"];

const COMPARISON_BASELINES: [(&str, [f64; 3]); 2] = [
    ("classical", [85.0, 90.0, 80.0]),
    ("quantum", [70.0, 95.0, 88.0]),
];

/// Maximum perturbation applied around a comparison baseline value.
const COMPARISON_JITTER: f64 = 5.0;

/// Synthetic performance comparison data, one series per backend family.
#[derive(Debug, Clone)]
pub struct ComparisonPanel {
    pub series: Vec<(String, [f64; 3])>,
}

/// Maps metric names to redraw modes and queues redraw commands.
#[derive(Debug, Clone, Default)]
pub struct ChartRegistry {
    charts: Vec<ChartSpec>,
    pending: VecDeque<RedrawCommand>,
    comparison: Option<ComparisonPanel>,
}

impl ChartRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a chart under a logical name. Re-registering replaces the
    /// mode; the first registration queues an animated first render.
    pub fn register(&mut self, name: &str, mode: RedrawMode) {
        if let Some(spec) = self.charts.iter_mut().find(|s| s.name == name) {
            spec.mode = mode;
            return;
        }
        self.charts.push(ChartSpec {
            name: name.to_string(),
            mode,
        });
        self.pending.push_back(RedrawCommand {
            name: name.to_string(),
            mode: RedrawMode::Animated,
        });
    }

    /// Queue a redraw in the chart's registered mode. Unknown names are
    /// ignored (the caller registered every chart it updates).
    pub fn update(&mut self, name: &str) {
        if let Some(spec) = self.charts.iter().find(|s| s.name == name) {
            self.pending.push_back(RedrawCommand {
                name: spec.name.clone(),
                mode: spec.mode,
            });
        } else {
            log::debug!("redraw requested for unregistered chart {name:?}");
        }
    }

    /// Drain queued redraw commands in issue order.
    pub fn drain_commands(&mut self) -> Vec<RedrawCommand> {
        self.pending.drain(..).collect()
    }

    /// Regenerate the comparison panel.
    ///
    /// The values are synthetic: a bounded random perturbation around fixed
    /// per-series baselines, regenerated on every testbed completion to
    /// visually convey run-to-run variability. They are illustrative flavor,
    /// not measured data — wiring real per-category metrics in means
    /// replacing this one function.
    pub fn refresh_comparison(&mut self) -> &ComparisonPanel {
        let mut rng = rand::rng();
        let series = COMPARISON_BASELINES
            .iter()
            .map(|(name, baseline)| {
                let mut values = [0.0; 3];
                for (slot, base) in values.iter_mut().zip(baseline) {
                    let jitter = rng.random_range(-COMPARISON_JITTER..=COMPARISON_JITTER);
                    *slot = (base + jitter).clamp(0.0, 100.0);
                }
                (name.to_string(), values)
            })
            .collect();
        self.update("comparison");
        self.comparison.insert(ComparisonPanel { series })
    }

    pub fn comparison(&self) -> Option<&ComparisonPanel> {
        self.comparison.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_registration_queues_animated_render() {
        let mut reg = ChartRegistry::new();
        reg.register("qber", RedrawMode::Silent);
        let cmds = reg.drain_commands();
        assert_eq!(cmds.len(), 1);
        assert_eq!(cmds[0].mode, RedrawMode::Animated);
    }

    #[test]
    fn telemetry_updates_stay_silent() {
        let mut reg = ChartRegistry::new();
        reg.register("qber", RedrawMode::Silent);
        reg.drain_commands();

        for _ in 0..5 {
            reg.update("qber");
        }
        let cmds = reg.drain_commands();
        assert_eq!(cmds.len(), 5);
        assert!(cmds.iter().all(|c| c.mode == RedrawMode::Silent));
    }

    #[test]
    fn reregistering_swaps_mode_without_duplicate_first_render() {
        let mut reg = ChartRegistry::new();
        reg.register("comparison", RedrawMode::Silent);
        reg.drain_commands();
        reg.register("comparison", RedrawMode::Animated);
        assert!(reg.drain_commands().is_empty());

        reg.update("comparison");
        assert_eq!(reg.drain_commands()[0].mode, RedrawMode::Animated);
    }

    #[test]
    fn unknown_chart_update_is_ignored() {
        let mut reg = ChartRegistry::new();
        reg.update("nope");
        assert!(reg.drain_commands().is_empty());
    }

    #[test]
    fn comparison_values_stay_within_jitter_bounds() {
        let mut reg = ChartRegistry::new();
        reg.register("comparison", RedrawMode::Animated);
        reg.drain_commands();

        for _ in 0..20 {
            let panel = reg.refresh_comparison().clone();
            assert_eq!(panel.series.len(), 2);
            for ((_, values), (_, baseline)) in panel.series.iter().zip(&COMPARISON_BASELINES) {
                for (v, b) in values.iter().zip(baseline) {
                    assert!((v - b).abs() <= COMPARISON_JITTER + 1e-9);
                    assert!((0.0..=100.0).contains(v));
                }
            }
        }
    }

    #[test]
    fn refresh_comparison_queues_animated_redraw() {
        let mut reg = ChartRegistry::new();
        reg.register("comparison", RedrawMode::Animated);
        reg.drain_commands();
        reg.refresh_comparison();
        let cmds = reg.drain_commands();
        assert_eq!(cmds.len(), 1);
        assert_eq!(cmds[0].name, "comparison");
        assert_eq!(cmds[0].mode, RedrawMode::Animated);
    }
}
