//! Full-screen image viewer state.
//!
//! The controller owns the visible/index state machine and the sync contract
//! with its caller; a [`ViewerRenderer`] translates that state to and from a
//! particular rendering strategy. Both renderers must leave the controller's
//! observable behaviour identical.

use std::fmt::{Debug, Formatter};

use crate::ScrollCommand;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RendererKind {
    /// Hands paging, swipe-to-close and zoom to a native gesture viewer.
    GestureDelegate,
    /// Pages a plain horizontal scroll view and replicates offsets by hand.
    ScrollPaging,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlatformCapability {
    pub native_gestures: bool,
}

/// What the rendering surface reports once paging comes to rest.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PageSignal {
    Offset(f64),
    Page(usize),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewerEffect {
    ScrollTo(ScrollCommand),
    DelegateIndex {
        index: usize,
        swipe_to_close: bool,
        double_tap_zoom: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseSource {
    CloseControl,
    BackRequest,
    SwipeDismiss,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ViewerState {
    pub visible: bool,
    pub current_index: usize,
}

pub trait ViewerRenderer {
    fn kind(&self) -> RendererKind;

    /// Effect that brings the surface to `index`, if the surface needs one.
    fn present(&mut self, index: usize) -> Option<ViewerEffect>;

    /// Raw page for a settle signal; the controller clamps it.
    fn resolve_page(&self, signal: PageSignal) -> Option<usize>;
}

#[derive(Debug, Default)]
pub struct GestureViewerRenderer;

impl ViewerRenderer for GestureViewerRenderer {
    fn kind(&self) -> RendererKind {
        RendererKind::GestureDelegate
    }

    fn present(&mut self, index: usize) -> Option<ViewerEffect> {
        Some(ViewerEffect::DelegateIndex {
            index,
            swipe_to_close: true,
            double_tap_zoom: true,
        })
    }

    fn resolve_page(&self, signal: PageSignal) -> Option<usize> {
        match signal {
            PageSignal::Page(index) => Some(index),
            PageSignal::Offset(_) => None,
        }
    }
}

#[derive(Debug)]
pub struct ScrollPagingRenderer {
    page_width: f64,
}

impl ScrollPagingRenderer {
    pub fn new(page_width: f64) -> Self {
        Self { page_width }
    }

    fn width_known(&self) -> bool {
        self.page_width.is_finite() && self.page_width > 0.0
    }
}

impl ViewerRenderer for ScrollPagingRenderer {
    fn kind(&self) -> RendererKind {
        RendererKind::ScrollPaging
    }

    fn present(&mut self, index: usize) -> Option<ViewerEffect> {
        if !self.width_known() {
            return None;
        }
        Some(ViewerEffect::ScrollTo(ScrollCommand {
            offset: index as f64 * self.page_width,
            animated: false,
        }))
    }

    fn resolve_page(&self, signal: PageSignal) -> Option<usize> {
        match signal {
            PageSignal::Page(index) => Some(index),
            PageSignal::Offset(x) if self.width_known() && x.is_finite() => {
                Some((x / self.page_width).round().max(0.0) as usize)
            }
            PageSignal::Offset(_) => None,
        }
    }
}

pub fn select_renderer(capability: PlatformCapability, page_width: f64) -> Box<dyn ViewerRenderer> {
    if capability.native_gestures {
        Box::new(GestureViewerRenderer)
    } else {
        Box::new(ScrollPagingRenderer::new(page_width))
    }
}

type IndexListener = Box<dyn FnMut(usize)>;
type CloseHandler = Box<dyn FnMut(CloseSource)>;

pub struct FullScreenViewerController {
    renderer: Box<dyn ViewerRenderer>,
    images: Vec<String>,
    state: ViewerState,
    start_index: usize,
    on_index_change: Option<IndexListener>,
    on_close: Option<CloseHandler>,
}

impl FullScreenViewerController {
    pub fn new(renderer: Box<dyn ViewerRenderer>) -> Self {
        Self {
            renderer,
            images: Vec::new(),
            state: ViewerState::default(),
            start_index: 0,
            on_index_change: None,
            on_close: None,
        }
    }

    pub fn with_index_listener(mut self, listener: impl FnMut(usize) + 'static) -> Self {
        self.on_index_change = Some(Box::new(listener));
        self
    }

    pub fn with_close_handler(mut self, handler: impl FnMut(CloseSource) + 'static) -> Self {
        self.on_close = Some(Box::new(handler));
        self
    }

    pub fn state(&self) -> ViewerState {
        self.state
    }

    pub fn images(&self) -> &[String] {
        &self.images
    }

    pub fn renderer_kind(&self) -> RendererKind {
        self.renderer.kind()
    }

    pub fn open(&mut self, images: Vec<String>, start_index: usize) -> Option<ViewerEffect> {
        self.images = images;
        self.start_index = start_index;
        self.show()
    }

    /// Opens with the images already loaded, starting from the last
    /// externally supplied index.
    pub fn show(&mut self) -> Option<ViewerEffect> {
        self.state.current_index = self.clamp(self.start_index);
        self.state.visible = true;
        self.renderer.present(self.state.current_index)
    }

    /// Applies a new externally supplied start index. While hidden this only
    /// resynchronises the internal index; while visible the surface is moved
    /// too. The caller is not notified of a change it made itself.
    pub fn set_start_index(&mut self, index: usize) -> Option<ViewerEffect> {
        self.start_index = index;
        let clamped = self.clamp(index);
        if !self.state.visible {
            self.state.current_index = clamped;
            return None;
        }
        if clamped == self.state.current_index {
            return None;
        }
        self.state.current_index = clamped;
        self.renderer.present(clamped)
    }

    /// Handles a settle signal while visible, reporting the new index upward
    /// exactly once per change.
    pub fn on_page_settled(&mut self, signal: PageSignal) -> Option<usize> {
        if !self.state.visible || self.images.is_empty() {
            return None;
        }
        let next = self.clamp(self.renderer.resolve_page(signal)?);
        if next == self.state.current_index {
            return None;
        }
        self.state.current_index = next;
        if let Some(listener) = self.on_index_change.as_mut() {
            listener(next);
        }
        Some(next)
    }

    /// Every close path funnels through here; only the first request while
    /// visible reaches the close handler.
    pub fn request_close(&mut self, source: CloseSource) -> bool {
        if !self.state.visible {
            return false;
        }
        self.state.visible = false;
        if let Some(handler) = self.on_close.as_mut() {
            handler(source);
        }
        true
    }

    pub fn close(&mut self) -> bool {
        self.request_close(CloseSource::CloseControl)
    }

    pub fn counter_label(&self) -> String {
        if self.images.is_empty() {
            return String::new();
        }
        format!("{} / {}", self.state.current_index + 1, self.images.len())
    }

    fn clamp(&self, index: usize) -> usize {
        index.min(self.images.len().saturating_sub(1))
    }
}

impl Debug for FullScreenViewerController {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FullScreenViewerController")
            .field("renderer", &self.renderer.kind())
            .field("images", &self.images.len())
            .field("state", &self.state)
            .field("start_index", &self.start_index)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    const WIDTH: f64 = 400.0;

    fn images() -> Vec<String> {
        vec!["a".to_string(), "b".to_string(), "c".to_string()]
    }

    fn settle_on(kind: RendererKind, page: usize) -> PageSignal {
        match kind {
            RendererKind::GestureDelegate => PageSignal::Page(page),
            RendererKind::ScrollPaging => PageSignal::Offset(page as f64 * WIDTH + 30.0),
        }
    }

    struct Harness {
        viewer: FullScreenViewerController,
        reported: Rc<RefCell<Vec<usize>>>,
        closes: Rc<RefCell<Vec<CloseSource>>>,
    }

    fn harness(capability: PlatformCapability) -> Harness {
        let reported = Rc::new(RefCell::new(Vec::new()));
        let closes = Rc::new(RefCell::new(Vec::new()));
        let index_sink = Rc::clone(&reported);
        let close_sink = Rc::clone(&closes);
        let viewer = FullScreenViewerController::new(select_renderer(capability, WIDTH))
            .with_index_listener(move |index| index_sink.borrow_mut().push(index))
            .with_close_handler(move |source| close_sink.borrow_mut().push(source));
        Harness {
            viewer,
            reported,
            closes,
        }
    }

    fn capabilities() -> [PlatformCapability; 2] {
        [
            PlatformCapability {
                native_gestures: true,
            },
            PlatformCapability {
                native_gestures: false,
            },
        ]
    }

    #[test]
    fn swipe_reports_index_once_and_start_index_resyncs_while_closed() {
        for capability in capabilities() {
            let mut h = harness(capability);
            let kind = h.viewer.renderer_kind();

            h.viewer.open(images(), 1);
            assert_eq!(h.viewer.state().current_index, 1);

            assert_eq!(h.viewer.on_page_settled(settle_on(kind, 2)), Some(2));
            assert_eq!(h.viewer.on_page_settled(settle_on(kind, 2)), None);
            assert_eq!(*h.reported.borrow(), vec![2]);

            assert!(h.viewer.close());
            h.viewer.set_start_index(0);
            assert_eq!(h.viewer.state().current_index, 0);
            h.viewer.show();
            assert_eq!(
                h.viewer.state(),
                ViewerState {
                    visible: true,
                    current_index: 0
                }
            );
            assert_eq!(*h.reported.borrow(), vec![2]);
        }
    }

    #[test]
    fn close_paths_reach_handler_exactly_once() {
        for capability in capabilities() {
            let mut h = harness(capability);
            h.viewer.open(images(), 0);
            assert!(h.viewer.request_close(CloseSource::BackRequest));
            assert!(!h.viewer.close());
            assert!(!h.viewer.request_close(CloseSource::BackRequest));
            assert_eq!(*h.closes.borrow(), vec![CloseSource::BackRequest]);
            assert!(!h.viewer.state().visible);
        }
    }

    #[test]
    fn settle_is_ignored_while_hidden() {
        let mut h = harness(PlatformCapability::default());
        h.viewer.open(images(), 0);
        h.viewer.close();
        assert_eq!(h.viewer.on_page_settled(PageSignal::Offset(800.0)), None);
        assert!(h.reported.borrow().is_empty());
    }

    #[test]
    fn settle_beyond_last_page_is_clamped() {
        let mut h = harness(PlatformCapability::default());
        h.viewer.open(images(), 0);
        assert_eq!(h.viewer.on_page_settled(PageSignal::Offset(9_000.0)), Some(2));
    }

    #[test]
    fn scroll_renderer_replicates_offset_without_animation() {
        let mut viewer = FullScreenViewerController::new(Box::new(ScrollPagingRenderer::new(WIDTH)));
        assert_eq!(
            viewer.open(images(), 2),
            Some(ViewerEffect::ScrollTo(ScrollCommand {
                offset: 800.0,
                animated: false
            }))
        );
        assert_eq!(
            viewer.set_start_index(1),
            Some(ViewerEffect::ScrollTo(ScrollCommand {
                offset: 400.0,
                animated: false
            }))
        );
        assert_eq!(viewer.state().current_index, 1);
    }

    #[test]
    fn gesture_renderer_delegates_index_and_gestures() {
        let mut viewer = FullScreenViewerController::new(Box::new(GestureViewerRenderer));
        assert_eq!(
            viewer.open(images(), 5),
            Some(ViewerEffect::DelegateIndex {
                index: 2,
                swipe_to_close: true,
                double_tap_zoom: true
            })
        );
        assert_eq!(viewer.on_page_settled(PageSignal::Offset(0.0)), None);
    }

    #[test]
    fn counter_label_is_one_based() {
        let mut viewer = FullScreenViewerController::new(Box::new(GestureViewerRenderer));
        assert_eq!(viewer.counter_label(), "");
        viewer.open(images(), 1);
        assert_eq!(viewer.counter_label(), "2 / 3");
    }
}
