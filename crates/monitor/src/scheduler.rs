//! Picks the networks worth probing for the current block.
//!
//! Networks take turns in a repeating cycle of `totalWindowSize` blocks. Only
//! networks whose window is open, or about to open, are probed.

use tracing::debug;

use keepwatch_core::config::{LookaheadMode, MonitorConfig};
use keepwatch_core::{Network, Window};

use crate::error::MonitorError;

#[derive(Debug, Clone, Copy)]
pub struct WindowScheduler {
    lookahead: u64,
    mode: LookaheadMode,
}

impl WindowScheduler {
    pub fn new(lookahead: u64, mode: LookaheadMode) -> Self {
        Self { lookahead, mode }
    }

    pub fn from_config(config: &MonitorConfig) -> Self {
        Self::new(config.lookahead_blocks, config.lookahead_mode)
    }

    /// Whether a network with `window` should be probed at cycle position `pos`.
    ///
    /// `Literal` mode is `window.start <= pos < window.end()` or
    /// `(pos + lookahead) % total >= window.start`. The second half has no
    /// upper bound, so it also selects windows that already closed earlier in
    /// the cycle.
    ///
    /// `Bounded` mode selects a window when `pos` is inside it (modulo the
    /// cycle) or when its start is at most `lookahead` blocks ahead.
    pub fn is_relevant(&self, pos: u64, total: u64, window: &Window) -> bool {
        if total == 0 {
            return false;
        }
        match self.mode {
            LookaheadMode::Literal => {
                let ahead = ((pos as u128 + self.lookahead as u128) % total as u128) as u64;
                window.contains(pos) || ahead >= window.start
            }
            LookaheadMode::Bounded => {
                if window.length == 0 {
                    return false;
                }
                if window.contains_wrapping(pos, total) {
                    return true;
                }
                let (start, pos) = (window.start % total, pos % total);
                let distance = if start >= pos { start - pos } else { total - (pos - start) };
                distance <= self.lookahead
            }
        }
    }

    /// Filter `windows` down to the networks to probe at `current_block`.
    pub fn relevant(
        &self,
        current_block: u64,
        total: u64,
        windows: &[(Network, Window)],
    ) -> Result<Vec<Network>, MonitorError> {
        let pos = cycle_position(current_block, total).ok_or(MonitorError::EmptyCycle)?;
        let relevant: Vec<Network> = windows
            .iter()
            .filter(|(_, window)| self.is_relevant(pos, total, window))
            .map(|(network, _)| network.clone())
            .collect();

        debug!(
            current_block,
            pos,
            total,
            mode = %self.mode,
            candidates = windows.len(),
            relevant = relevant.len(),
            "Scheduled networks"
        );
        Ok(relevant)
    }
}

/// `current_block mod total`, or `None` for an empty cycle.
pub fn cycle_position(current_block: u64, total: u64) -> Option<u64> {
    current_block.checked_rem(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn literal() -> WindowScheduler {
        WindowScheduler::new(10, LookaheadMode::Literal)
    }

    fn bounded() -> WindowScheduler {
        WindowScheduler::new(10, LookaheadMode::Bounded)
    }

    #[test]
    fn inside_window_is_relevant_in_both_modes() {
        let w = Window::new(40, 10);
        for pos in 40..50 {
            assert!(literal().is_relevant(pos, 100, &w), "literal pos {pos}");
            assert!(bounded().is_relevant(pos, 100, &w), "bounded pos {pos}");
        }
    }

    #[test]
    fn window_opening_soon_is_relevant() {
        let w = Window::new(40, 10);
        assert!(literal().is_relevant(30, 100, &w));
        assert!(bounded().is_relevant(30, 100, &w));
        assert!(!literal().is_relevant(29, 100, &w));
        assert!(!bounded().is_relevant(29, 100, &w));
    }

    #[test]
    fn literal_selects_window_that_already_closed() {
        // pos 60 is past [10, 20); (60 + 10) % 100 = 70 >= 10 still matches.
        let w = Window::new(10, 10);
        assert!(literal().is_relevant(60, 100, &w));
        assert!(!bounded().is_relevant(60, 100, &w));
    }

    #[test]
    fn lookahead_wrapping_past_cycle_end() {
        // pos 95: next window at 2 is 7 blocks away across the cycle boundary.
        let w = Window::new(2, 10);
        assert!(literal().is_relevant(95, 100, &w));
        assert!(bounded().is_relevant(95, 100, &w));

        // (95 + 10) % 100 = 5 < 8, so the literal test misses a start 13 blocks away.
        let far = Window::new(8, 10);
        assert!(!literal().is_relevant(95, 100, &far));
        assert!(!bounded().is_relevant(95, 100, &far));
    }

    #[test]
    fn bounded_handles_window_wrapping_cycle_end() {
        let w = Window::new(95, 10);
        assert!(bounded().is_relevant(2, 100, &w));
        assert!(!bounded().is_relevant(10, 100, &w));
    }

    #[test]
    fn zero_length_window_never_bounded_relevant() {
        assert!(!bounded().is_relevant(5, 100, &Window::new(5, 0)));
    }

    #[test]
    fn relevant_filters_by_cycle_position() {
        let windows = vec![
            (Network::from("a"), Window::new(0, 10)),
            (Network::from("b"), Window::new(10, 10)),
            (Network::from("c"), Window::new(25, 5)),
        ];
        // block 93 -> pos 3 in a 30-block cycle; lookahead reaches 13.
        let relevant = literal().relevant(93, 30, &windows).unwrap();
        assert_eq!(relevant, vec![Network::from("a"), Network::from("b")]);

        let relevant = bounded().relevant(93, 30, &windows).unwrap();
        assert_eq!(relevant, vec![Network::from("a"), Network::from("b")]);
    }

    #[test]
    fn empty_cycle_is_rejected() {
        let windows = vec![(Network::from("a"), Window::new(0, 10))];
        assert!(matches!(
            literal().relevant(100, 0, &windows),
            Err(MonitorError::EmptyCycle)
        ));
        assert_eq!(cycle_position(100, 0), None);
        assert_eq!(cycle_position(105, 48), Some(9));
    }
}
