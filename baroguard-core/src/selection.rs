//! Selection Controller
//!
//! Holds the instance whose data is published and decides which input
//! feeds wake the cycle.
//!
//! ```text
//!             first valid best
//! Unselected ─────────────────► Selected(i)
//!                                  │  best j != i
//!                                  │  and no parameter update this cycle
//!                                  ▼
//!                               Selected(j)
//! ```
//!
//! There is no way back to `Unselected` and no automatic reversion: an
//! instance that lost the vote has to win a later vote on its own.
//!
//! ## Input Feeds
//!
//! Before the first selection every active instance wakes the cycle so the
//! first vote happens as soon as any data arrives. Once an instance is
//! selected only its feed does; the switch clears every feed and registers
//! the new one in the same step, so a handover never has two feeds (or
//! none) driving the cycle.

use crate::constants::buffers::MAX_SENSOR_COUNT;

/// Selection state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Selection {
    /// No instance has won a vote yet
    #[default]
    Unselected,
    /// Instance whose data is published
    Selected(usize),
}

/// A transition applied by [`SelectionController::update`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionChange {
    /// Previously selected instance, `None` for the first selection
    pub from: Option<usize>,
    /// Newly selected instance
    pub to: usize,
}

/// Hysteretic holder of the selected instance
#[derive(Debug, Clone, Default)]
pub struct SelectionController {
    state: Selection,
    feeds: u8,
    switch_count: u32,
}

impl SelectionController {
    /// Unselected, no feeds
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state
    pub fn state(&self) -> Selection {
        self.state
    }

    /// Selected instance, if any
    pub fn selected(&self) -> Option<usize> {
        match self.state {
            Selection::Unselected => None,
            Selection::Selected(index) => Some(index),
        }
    }

    /// Whether `instance` is the selected one
    pub fn is_selected(&self, instance: usize) -> bool {
        self.selected() == Some(instance)
    }

    /// Number of `Selected(i) -> Selected(j)` transitions so far
    pub fn switch_count(&self) -> u32 {
        self.switch_count
    }

    /// Announce a newly active instance
    ///
    /// While nothing is selected its feed starts waking the cycle.
    pub fn feed_available(&mut self, instance: usize) {
        if self.state == Selection::Unselected && instance < MAX_SENSOR_COUNT {
            self.feeds |= 1 << instance;
        }
    }

    /// Whether samples of `instance` should wake the cycle
    pub fn is_feed_active(&self, instance: usize) -> bool {
        instance < MAX_SENSOR_COUNT && self.feeds & (1 << instance) != 0
    }

    /// Number of feeds currently waking the cycle
    pub fn active_feed_count(&self) -> u32 {
        self.feeds.count_ones()
    }

    /// Apply the bank's recommendation
    ///
    /// The first valid best is always taken. Later changes are refused in
    /// a cycle that also applied a parameter update.
    pub fn update(&mut self, best: Option<usize>, parameter_update: bool) -> Option<SelectionChange> {
        let best = best.filter(|&index| index < MAX_SENSOR_COUNT)?;

        let from = match self.state {
            Selection::Selected(current) if current == best => return None,
            Selection::Selected(_) if parameter_update => return None,
            Selection::Selected(current) => {
                self.switch_count += 1;
                Some(current)
            }
            Selection::Unselected => None,
        };

        self.state = Selection::Selected(best);
        self.feeds = 1 << best;

        Some(SelectionChange { from, to: best })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_unselected_with_all_feeds() {
        let mut controller = SelectionController::new();
        controller.feed_available(0);
        controller.feed_available(2);

        assert_eq!(controller.state(), Selection::Unselected);
        assert!(controller.is_feed_active(0));
        assert!(controller.is_feed_active(2));
        assert_eq!(controller.active_feed_count(), 2);
    }

    #[test]
    fn first_selection_ignores_parameter_update() {
        let mut controller = SelectionController::new();
        let change = controller.update(Some(1), true);
        assert_eq!(change, Some(SelectionChange { from: None, to: 1 }));
        assert_eq!(controller.selected(), Some(1));
        assert_eq!(controller.switch_count(), 0);
    }

    #[test]
    fn no_best_keeps_state() {
        let mut controller = SelectionController::new();
        assert_eq!(controller.update(None, false), None);
        controller.update(Some(0), false);
        assert_eq!(controller.update(None, false), None);
        assert_eq!(controller.selected(), Some(0));
    }

    #[test]
    fn switch_swaps_feeds_atomically() {
        let mut controller = SelectionController::new();
        controller.feed_available(0);
        controller.feed_available(1);
        controller.update(Some(0), false);
        assert_eq!(controller.active_feed_count(), 1);

        // late arrivals do not add feeds once selected
        controller.feed_available(2);
        assert!(!controller.is_feed_active(2));

        let change = controller.update(Some(1), false);
        assert_eq!(change, Some(SelectionChange { from: Some(0), to: 1 }));
        assert!(controller.is_feed_active(1));
        assert!(!controller.is_feed_active(0));
        assert_eq!(controller.active_feed_count(), 1);
        assert_eq!(controller.switch_count(), 1);
    }

    #[test]
    fn parameter_update_blocks_switch() {
        let mut controller = SelectionController::new();
        controller.update(Some(0), false);
        assert_eq!(controller.update(Some(1), true), None);
        assert_eq!(controller.selected(), Some(0));

        assert!(controller.update(Some(1), false).is_some());
        assert_eq!(controller.selected(), Some(1));
    }

    #[test]
    fn out_of_range_best_is_ignored() {
        let mut controller = SelectionController::new();
        assert_eq!(controller.update(Some(MAX_SENSOR_COUNT), false), None);
        assert_eq!(controller.state(), Selection::Unselected);
    }
}
