#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Read-only statistics collector that samples the world once per tick.

mod metrics;

use cleaning_sim_core::{AnalyticsInputs, Event, StatsReport, StopReason, TickSample};

pub use metrics::{clean_percentage, summarize};

/// Pure analytics system that records per-tick samples and publishes reports.
#[derive(Debug, Default)]
pub struct Analytics {
    history: Vec<TickSample>,
    completion_tick: Option<u64>,
    last_report: Option<StatsReport>,
}

impl Analytics {
    /// Creates a new analytics system with an empty history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the last report published by the system, if any.
    #[must_use]
    pub fn last_report(&self) -> Option<&StatsReport> {
        self.last_report.as_ref()
    }

    /// Samples recorded so far, one per observed tick, oldest first.
    #[must_use]
    pub fn history(&self) -> &[TickSample] {
        &self.history
    }

    /// First tick at which no dirty cell remained, once observed.
    #[must_use]
    pub fn completion_tick(&self) -> Option<u64> {
        self.completion_tick
    }

    /// Consumes world events and records a sample when a tick was observed.
    ///
    /// Several `TimeAdvanced` events in one batch still produce a single
    /// sample, taken from `inputs` as they stand after the batch.
    pub fn handle(&mut self, events: &[Event], inputs: &AnalyticsInputs) {
        let tick_observed = events
            .iter()
            .any(|event| matches!(event, Event::TimeAdvanced { .. }));
        if !tick_observed {
            return;
        }

        if self.completion_tick.is_none() && inputs.dirty_cells_remaining == 0 {
            self.completion_tick = Some(inputs.tick);
        }

        self.history.push(metrics::sample(inputs));
    }

    /// Computes a report from the current inputs and keeps it as the latest.
    pub fn publish(
        &mut self,
        inputs: &AnalyticsInputs,
        stop_reason: Option<StopReason>,
    ) -> &StatsReport {
        let report = summarize(inputs, self.completion_tick, stop_reason);
        self.last_report.insert(report)
    }
}

#[cfg(test)]
mod tests {
    use super::Analytics;
    use cleaning_sim_core::{AgentMode, AgentView, AnalyticsInputs, Event};

    fn inputs(tick: u64, remaining: u32) -> AnalyticsInputs {
        AnalyticsInputs {
            tick,
            mode: AgentMode::SingleAgent,
            initial_dirty_cells: 4,
            dirty_cells_remaining: remaining,
            agents: AgentView::default(),
        }
    }

    #[test]
    fn completion_tick_is_latched_once() {
        let mut analytics = Analytics::new();
        analytics.handle(&[Event::TimeAdvanced { tick: 1 }], &inputs(1, 2));
        assert_eq!(analytics.completion_tick(), None);

        analytics.handle(&[Event::TimeAdvanced { tick: 2 }], &inputs(2, 0));
        analytics.handle(&[Event::TimeAdvanced { tick: 3 }], &inputs(3, 0));
        assert_eq!(analytics.completion_tick(), Some(2));
        assert_eq!(analytics.history().len(), 3);
    }
}
