use std::fmt::{Debug, Formatter};

const FALLBACK_SLIDE_HEIGHT: f64 = 320.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CarouselState {
    pub active_index: usize,
    pub item_count: usize,
}

/// Instruction for the host scroll view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollCommand {
    pub offset: f64,
    pub animated: bool,
}

type IndexListener = Box<dyn FnMut(usize)>;

/// Active-slide tracking for a horizontally paged image list.
///
/// The index only moves on settle events or explicit jumps; intermediate
/// drag positions are never observed.
pub struct CarouselController {
    state: CarouselState,
    page_width: f64,
    on_index_change: Option<IndexListener>,
}

impl CarouselController {
    pub fn new(item_count: usize) -> Self {
        Self {
            state: CarouselState {
                active_index: 0,
                item_count,
            },
            page_width: 0.0,
            on_index_change: None,
        }
    }

    pub fn with_listener(mut self, listener: impl FnMut(usize) + 'static) -> Self {
        self.on_index_change = Some(Box::new(listener));
        self
    }

    pub fn state(&self) -> CarouselState {
        self.state
    }

    pub fn active_index(&self) -> usize {
        self.state.active_index
    }

    pub fn page_width(&self) -> f64 {
        self.page_width
    }

    /// Records the measured page width. When it becomes known the current
    /// slide is re-aligned without animation.
    pub fn set_page_width(&mut self, width: f64) -> Option<ScrollCommand> {
        self.page_width = if width.is_finite() && width > 0.0 {
            width
        } else {
            0.0
        };
        self.offset_for(self.state.active_index, false)
    }

    pub fn set_item_count(&mut self, item_count: usize) {
        self.state.item_count = item_count;
        let clamped = self.clamp(self.state.active_index);
        self.update_index(clamped);
    }

    /// Handles a settle event at horizontal offset `x`. Returns the new
    /// index when it changed.
    pub fn on_scroll_settle(&mut self, x: f64) -> Option<usize> {
        if self.page_width <= 0.0 || !x.is_finite() || self.state.item_count == 0 {
            return None;
        }

        let page = (x / self.page_width).round();
        let max_index = (self.state.item_count - 1) as f64;
        let next = page.clamp(0.0, max_index) as usize;
        self.update_index(next)
    }

    /// Moves to `index` (clamped) and returns where the scroll view should
    /// be positioned, if the page width is known.
    pub fn jump_to(&mut self, index: usize, animated: bool) -> Option<ScrollCommand> {
        let index = self.clamp(index);
        self.update_index(index);
        self.offset_for(index, animated)
    }

    /// Establishes the initial slide without a visible fly-in.
    pub fn initialize(&mut self, index: usize) -> Option<ScrollCommand> {
        self.jump_to(index, false)
    }

    pub fn indicators(&self) -> Vec<bool> {
        (0..self.state.item_count)
            .map(|index| index == self.state.active_index)
            .collect()
    }

    pub fn shows_indicators(&self) -> bool {
        self.state.item_count > 1
    }

    fn clamp(&self, index: usize) -> usize {
        index.min(self.state.item_count.saturating_sub(1))
    }

    fn offset_for(&self, index: usize, animated: bool) -> Option<ScrollCommand> {
        if self.page_width <= 0.0 {
            return None;
        }
        Some(ScrollCommand {
            offset: index as f64 * self.page_width,
            animated,
        })
    }

    fn update_index(&mut self, next: usize) -> Option<usize> {
        if next == self.state.active_index {
            return None;
        }
        self.state.active_index = next;
        if let Some(listener) = self.on_index_change.as_mut() {
            listener(next);
        }
        Some(next)
    }
}

impl Debug for CarouselController {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CarouselController")
            .field("state", &self.state)
            .field("page_width", &self.page_width)
            .field("has_listener", &self.on_index_change.is_some())
            .finish()
    }
}

/// Slide height: explicit height wins, then `page_width / aspect_ratio`
/// (non-positive ratios count as 1), then a fixed fallback while the page
/// width is still unknown.
pub fn resolve_slide_height(height: Option<f64>, aspect_ratio: Option<f64>, page_width: f64) -> f64 {
    if let Some(height) = height {
        return height;
    }
    let ratio = match aspect_ratio {
        Some(ratio) if ratio > 0.0 => ratio,
        _ => 1.0,
    };
    if page_width > 0.0 {
        page_width / ratio
    } else {
        FALLBACK_SLIDE_HEIGHT
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    fn carousel(count: usize, width: f64) -> CarouselController {
        let mut controller = CarouselController::new(count);
        controller.set_page_width(width);
        controller
    }

    #[test]
    fn settle_rounds_offset_to_nearest_page() {
        let mut controller = carousel(5, 300.0);
        assert_eq!(controller.on_scroll_settle(620.0), Some(2));
        assert_eq!(controller.active_index(), 2);
    }

    #[test]
    fn settle_clamps_to_bounds() {
        let mut controller = carousel(5, 300.0);
        controller.jump_to(3, false);
        assert_eq!(controller.on_scroll_settle(-50.0), Some(0));
        assert_eq!(controller.on_scroll_settle(1500.0), Some(4));
        assert_eq!(controller.state().active_index, 4);
    }

    #[test]
    fn unknown_width_leaves_index_unchanged() {
        let mut controller = CarouselController::new(5);
        controller.jump_to(1, false);
        assert_eq!(controller.on_scroll_settle(900.0), None);
        assert_eq!(controller.active_index(), 1);
    }

    #[test]
    fn settle_on_same_page_reports_no_change() {
        let mut controller = carousel(3, 100.0);
        assert_eq!(controller.on_scroll_settle(40.0), None);
    }

    #[test]
    fn jump_positions_scroll_without_animation_on_init() {
        let mut controller = carousel(4, 250.0);
        assert_eq!(
            controller.initialize(2),
            Some(ScrollCommand {
                offset: 500.0,
                animated: false
            })
        );
        assert_eq!(controller.jump_to(10, true).map(|cmd| cmd.offset), Some(750.0));
        assert_eq!(controller.active_index(), 3);
    }

    #[test]
    fn width_becoming_known_realigns_current_slide() {
        let mut controller = CarouselController::new(4);
        assert_eq!(controller.initialize(2), None);
        assert_eq!(
            controller.set_page_width(200.0),
            Some(ScrollCommand {
                offset: 400.0,
                animated: false
            })
        );
    }

    #[test]
    fn listener_is_notified_on_changes_only() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let mut controller =
            CarouselController::new(3).with_listener(move |index| sink.borrow_mut().push(index));
        controller.set_page_width(100.0);
        controller.on_scroll_settle(110.0);
        controller.on_scroll_settle(90.0);
        controller.on_scroll_settle(210.0);
        assert_eq!(*seen.borrow(), vec![1, 2]);
    }

    #[test]
    fn shrinking_item_count_clamps_active_index() {
        let mut controller = carousel(5, 100.0);
        controller.jump_to(4, false);
        controller.set_item_count(2);
        assert_eq!(controller.active_index(), 1);
        controller.set_item_count(0);
        assert_eq!(controller.active_index(), 0);
        assert_eq!(controller.on_scroll_settle(100.0), None);
    }

    #[test]
    fn indicators_mark_exactly_one_active_slide() {
        let mut controller = carousel(3, 100.0);
        controller.jump_to(1, false);
        assert_eq!(controller.indicators(), vec![false, true, false]);
        assert!(controller.shows_indicators());
        assert!(!CarouselController::new(1).shows_indicators());
    }

    #[test]
    fn slide_height_resolution() {
        assert_eq!(resolve_slide_height(Some(200.0), Some(2.0), 400.0), 200.0);
        assert_eq!(resolve_slide_height(None, Some(2.0), 400.0), 200.0);
        assert_eq!(resolve_slide_height(None, Some(0.0), 400.0), 400.0);
        assert_eq!(resolve_slide_height(None, None, 0.0), 320.0);
    }
}
