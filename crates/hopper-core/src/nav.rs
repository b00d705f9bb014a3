//! Result window and grid navigation.
//!
//! The ranked result array is rendered as a 2-column grid with a
//! bounded visible slice. Selection moves clamp at the edges (no
//! wrapping); the window slides in whole rows to keep the selection
//! visible.

use hopper_types::ScrollDirection;
use std::ops::Range;
use tracing::debug;

// Fixed popup layout. Page capacity is derived from these constants,
// never from live measurement.
const POPUP_HEIGHT: usize = 600;
const NAV_BAR_HEIGHT: usize = 30;
const SEARCH_INPUT_HEIGHT: usize = 55;
const IDEAS_PANEL_HEIGHT: usize = 80;
const LIST_PADDING: usize = 16;
const BORDER_HEIGHT: usize = 2;
const ROW_HEIGHT: usize = 33;

pub const COLUMNS: usize = 2;

/// Visible items per page: the full rows that fit in the list area,
/// times the column count.
#[must_use]
pub const fn page_capacity() -> usize {
    let list_height = POPUP_HEIGHT
        - NAV_BAR_HEIGHT
        - SEARCH_INPUT_HEIGHT
        - IDEAS_PANEL_HEIGHT
        - LIST_PADDING
        - BORDER_HEIGHT;
    (list_height / ROW_HEIGHT) * COLUMNS
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// Result-set phase of the palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// No result set has arrived yet
    #[default]
    Idle,
    /// Results present, a selection exists
    Browsing,
    /// The query produced zero results
    Empty,
}

/// The visible slice of the ranked array plus the active selection.
///
/// Invariants: the window always spans exactly [`page_capacity`]
/// positions; the selection, when set, lies in `[0, len)` and inside
/// the window after any accepted move.
#[derive(Debug, Clone)]
pub struct ResultWindow {
    len: usize,
    selected: Option<usize>,
    start: usize,
    end: usize,
    phase: Phase,
}

impl Default for ResultWindow {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultWindow {
    #[must_use]
    pub fn new() -> Self {
        Self {
            len: 0,
            selected: None,
            start: 0,
            end: page_capacity(),
            phase: Phase::Idle,
        }
    }

    /// A new result set arrived: window and selection reset.
    pub fn reset(&mut self, len: usize) {
        self.len = len;
        self.start = 0;
        self.end = page_capacity();
        if len == 0 {
            self.selected = None;
            self.phase = Phase::Empty;
        } else {
            self.selected = Some(0);
            self.phase = Phase::Browsing;
        }
    }

    /// The result set shrank in place (a tab was closed and the query
    /// re-ran): keep the selection at the same or previous position.
    pub fn clamp_after_refresh(&mut self, new_len: usize) {
        self.len = new_len;
        if new_len == 0 {
            self.selected = None;
            self.phase = Phase::Empty;
            self.start = 0;
            self.end = page_capacity();
            return;
        }

        self.phase = Phase::Browsing;
        let selected = self.selected.map_or(0, |s| s.min(new_len - 1));
        self.selected = Some(selected);
        self.slide_to(selected);
    }

    /// Apply a directional move. Returns whether the selection moved;
    /// moves past an edge clamp in place.
    pub fn move_selection(&mut self, direction: Direction) -> bool {
        let Some(current) = self.selected else {
            return false;
        };

        let target = match direction {
            Direction::Up => current.checked_sub(COLUMNS),
            Direction::Down => {
                let below = current + COLUMNS;
                (below < self.len).then_some(below)
            }
            Direction::Left => (current % COLUMNS != 0).then(|| current - 1),
            Direction::Right => {
                (current % COLUMNS != COLUMNS - 1 && current + 1 < self.len).then(|| current + 1)
            }
        };

        let Some(target) = target else {
            return false;
        };

        self.selected = Some(target);
        self.slide_to(target);
        debug!("Selection moved {current} -> {target}");
        true
    }

    /// Map a wheel tick to a row move, honoring the scroll-direction
    /// preference.
    pub fn wheel(&mut self, delta_y: f64, scroll: ScrollDirection) -> bool {
        let up = match scroll {
            ScrollDirection::Default => delta_y < 0.0,
            ScrollDirection::Reversed => delta_y > 0.0,
        };
        self.move_selection(if up { Direction::Up } else { Direction::Down })
    }

    /// Point the selection at an item directly (pointer input on a
    /// visible row).
    pub fn select(&mut self, idx: usize) -> bool {
        if idx >= self.len {
            return false;
        }
        self.selected = Some(idx);
        self.phase = Phase::Browsing;
        true
    }

    /// Slide the window so `idx` is visible: below the window, the
    /// row containing `idx` becomes the first visible row; past the
    /// end, it becomes the last. The window size never changes.
    fn slide_to(&mut self, idx: usize) {
        let capacity = page_capacity();
        if idx < self.start {
            self.start = (idx / COLUMNS) * COLUMNS;
            self.end = self.start + capacity;
        } else if idx >= self.end {
            self.end = (idx + 1).div_ceil(COLUMNS) * COLUMNS;
            self.start = self.end - capacity;
        }
    }

    #[must_use]
    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Bounds of the visible slice of the result array.
    #[must_use]
    pub fn visible_range(&self) -> Range<usize> {
        self.start..self.end.min(self.len)
    }
}
