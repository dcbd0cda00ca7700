//! Bounded rolling time series behind every live chart.
//!
//! A feed owns one label axis shared by one or more numeric channels and a
//! strict sliding window: appending at capacity evicts the oldest sample
//! from the labels and from every channel before the push, so the label and
//! value lengths agree after every call and never exceed the window.

use std::collections::VecDeque;

/// Shared window size for the live telemetry charts.
pub const LIVE_WINDOW: usize = 20;

/// A label axis plus one or more numeric channels, windowed FIFO.
#[derive(Debug, Clone)]
pub struct TelemetryFeed {
    window: usize,
    labels: VecDeque<String>,
    channels: Vec<VecDeque<f64>>,
}

impl TelemetryFeed {
    /// Feed with `channels` value channels and the default live window.
    pub fn new(channels: usize) -> Self {
        Self::with_window(channels, LIVE_WINDOW)
    }

    pub fn with_window(channels: usize, window: usize) -> Self {
        Self {
            window,
            labels: VecDeque::with_capacity(window),
            channels: vec![VecDeque::with_capacity(window); channels.max(1)],
        }
    }

    /// Append one sample across all channels under a shared label.
    ///
    /// Missing values default to 0 (callers clamp, the feed never
    /// validates); extra values are ignored. Evicts the oldest sample first
    /// when the window is full.
    pub fn append_row(&mut self, label: impl Into<String>, values: &[f64]) {
        if self.labels.len() >= self.window {
            self.labels.pop_front();
            for channel in &mut self.channels {
                channel.pop_front();
            }
        }
        self.labels.push_back(label.into());
        for (i, channel) in self.channels.iter_mut().enumerate() {
            channel.push_back(values.get(i).copied().unwrap_or(0.0));
        }
    }

    /// Single-channel convenience for the common case.
    pub fn append(&mut self, label: impl Into<String>, value: f64) {
        self.append_row(label, &[value]);
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }

    /// Ordered values of one channel, oldest first.
    pub fn values(&self, channel: usize) -> Vec<f64> {
        self.channels
            .get(channel)
            .map(|c| c.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Latest value of one channel.
    pub fn latest(&self, channel: usize) -> Option<f64> {
        self.channels.get(channel).and_then(|c| c.back().copied())
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    pub fn window(&self) -> usize {
        self.window
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_and_values_stay_aligned() {
        let mut feed = TelemetryFeed::new(2);
        for i in 0..50 {
            feed.append_row(format!("t{i}"), &[i as f64, (i * 2) as f64]);
            assert_eq!(feed.len(), feed.values(0).len());
            assert_eq!(feed.len(), feed.values(1).len());
            assert!(feed.len() <= LIVE_WINDOW);
        }
    }

    #[test]
    fn window_evicts_oldest_first() {
        let mut feed = TelemetryFeed::new(1);
        for i in 0..25 {
            feed.append(format!("t{i}"), i as f64);
        }
        assert_eq!(feed.len(), LIVE_WINDOW);
        // Samples 0..5 evicted; 5 is now the oldest.
        assert_eq!(feed.values(0)[0], 5.0);
        assert_eq!(feed.labels().next(), Some("t5"));
        assert_eq!(feed.latest(0), Some(24.0));
    }

    #[test]
    fn missing_channel_values_default_to_zero() {
        let mut feed = TelemetryFeed::new(3);
        feed.append_row("t0", &[1.0]);
        assert_eq!(feed.values(1), vec![0.0]);
        assert_eq!(feed.values(2), vec![0.0]);
    }

    #[test]
    fn out_of_range_channel_reads_empty() {
        let feed = TelemetryFeed::new(1);
        assert!(feed.values(7).is_empty());
        assert_eq!(feed.latest(7), None);
    }

    #[test]
    fn custom_window_is_respected() {
        let mut feed = TelemetryFeed::with_window(1, 3);
        for i in 0..10 {
            feed.append(format!("t{i}"), i as f64);
        }
        assert_eq!(feed.values(0), vec![7.0, 8.0, 9.0]);
    }
}
