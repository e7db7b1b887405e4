//! Line-driven session over a listing's carousel and full-screen viewer.

use std::io::{BufRead, Write};

use lite_market_adapters::{present_dots, present_viewer_effect, present_viewer_header};
use lite_market_domain::{
    resolve_slide_height, select_renderer, CarouselController, CloseSource,
    FullScreenViewerController, PageSignal, PlatformCapability, RendererKind, ViewerEffect,
};
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub enum ViewInput {
    /// Carousel scroll came to rest at offset `x`.
    Settle(f64),
    Jump(usize),
    Open,
    /// Viewer paging came to rest: an offset for scroll paging, a page for
    /// the gesture viewer.
    Swipe(f64),
    Back,
    Close,
    /// Externally supplied start index for the viewer.
    Prop(usize),
    Quit,
}

pub fn parse_view_input(line: &str) -> Result<ViewInput, String> {
    let mut parts = line.split_whitespace();
    let command = parts.next().unwrap_or_default();
    let argument = parts.next();

    let number = |name: &str| -> Result<f64, String> {
        let raw = argument.ok_or_else(|| format!("{name} needs a value"))?;
        raw.parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
            .ok_or_else(|| format!("invalid value for {name}: {raw}"))
    };
    let index = |name: &str| -> Result<usize, String> {
        let raw = argument.ok_or_else(|| format!("{name} needs an index"))?;
        raw.parse::<usize>()
            .map_err(|_| format!("invalid index for {name}: {raw}"))
    };

    match command {
        "settle" => number("settle").map(ViewInput::Settle),
        "jump" => index("jump").map(ViewInput::Jump),
        "open" => Ok(ViewInput::Open),
        "swipe" => number("swipe").map(ViewInput::Swipe),
        "back" => Ok(ViewInput::Back),
        "close" => Ok(ViewInput::Close),
        "prop" => index("prop").map(ViewInput::Prop),
        "quit" | "exit" => Ok(ViewInput::Quit),
        "" => Err("empty command".to_string()),
        other => Err(format!("unknown view command: {other}")),
    }
}

pub struct ViewSession {
    images: Vec<String>,
    carousel: CarouselController,
    viewer: FullScreenViewerController,
}

impl ViewSession {
    pub fn new(images: Vec<String>, page_width: f64, native_gestures: bool) -> Self {
        let mut carousel = CarouselController::new(images.len())
            .with_listener(|index| debug!(index, "carousel index changed"));
        carousel.set_page_width(page_width);

        let renderer = select_renderer(PlatformCapability { native_gestures }, page_width);
        let viewer = FullScreenViewerController::new(renderer)
            .with_index_listener(|index| debug!(index, "viewer index changed"))
            .with_close_handler(|source| debug!(?source, "viewer closed"));

        Self {
            images,
            carousel,
            viewer,
        }
    }

    pub fn carousel(&self) -> &CarouselController {
        &self.carousel
    }

    pub fn viewer(&self) -> &FullScreenViewerController {
        &self.viewer
    }

    pub fn summary(&self) -> Vec<String> {
        let height = resolve_slide_height(None, None, self.carousel.page_width());
        let mut lines = vec![format!(
            "{} image(s), slide {}x{}",
            self.images.len(),
            self.carousel.page_width(),
            height
        )];
        lines.extend(self.carousel_lines());
        lines
    }

    /// Applies one input and returns the lines to print.
    pub fn apply(&mut self, input: ViewInput) -> Vec<String> {
        match input {
            ViewInput::Settle(x) => match self.carousel.on_scroll_settle(x) {
                Some(_) => self.carousel_lines(),
                None => vec!["carousel unchanged".to_string()],
            },
            ViewInput::Jump(index) => {
                let mut lines = Vec::new();
                if let Some(command) = self.carousel.jump_to(index, true) {
                    lines.push(format!(
                        "scroll to x={} (animated={})",
                        command.offset, command.animated
                    ));
                }
                lines.extend(self.carousel_lines());
                lines
            }
            ViewInput::Open => {
                if self.images.is_empty() {
                    return vec!["no images to view".to_string()];
                }
                let effect = self
                    .viewer
                    .open(self.images.clone(), self.carousel.active_index());
                self.viewer_lines(effect)
            }
            ViewInput::Swipe(value) => {
                let signal = match self.viewer.renderer_kind() {
                    RendererKind::GestureDelegate => PageSignal::Page(value.max(0.0).round() as usize),
                    RendererKind::ScrollPaging => PageSignal::Offset(value),
                };
                match self.viewer.on_page_settled(signal) {
                    Some(index) => {
                        self.carousel.jump_to(index, false);
                        let mut lines = self.viewer_lines(None);
                        lines.extend(self.carousel_lines());
                        lines
                    }
                    None => vec!["viewer unchanged".to_string()],
                }
            }
            ViewInput::Back => self.close_lines(CloseSource::BackRequest),
            ViewInput::Close => self.close_lines(CloseSource::CloseControl),
            ViewInput::Prop(index) => {
                let effect = self.viewer.set_start_index(index);
                self.viewer_lines(effect)
            }
            ViewInput::Quit => Vec::new(),
        }
    }

    /// Reads commands until `quit` or end of input.
    pub fn run(&mut self, input: impl BufRead, mut output: impl Write) -> std::io::Result<()> {
        for line in self.summary() {
            writeln!(output, "{line}")?;
        }
        for line in input.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match parse_view_input(&line) {
                Ok(ViewInput::Quit) => break,
                Ok(command) => {
                    for rendered in self.apply(command) {
                        writeln!(output, "{rendered}")?;
                    }
                }
                Err(message) => writeln!(output, "error: {message}")?,
            }
        }
        Ok(())
    }

    fn carousel_lines(&self) -> Vec<String> {
        let mut lines = vec![format!("carousel index {}", self.carousel.active_index())];
        let dots = present_dots(&self.carousel.indicators());
        if !dots.is_empty() {
            lines.push(dots);
        }
        lines
    }

    fn viewer_lines(&self, effect: Option<ViewerEffect>) -> Vec<String> {
        let mut lines = vec![present_viewer_header(&self.viewer)];
        if let Some(effect) = effect {
            lines.push(present_viewer_effect(&effect));
        }
        lines
    }

    fn close_lines(&mut self, source: CloseSource) -> Vec<String> {
        if self.viewer.request_close(source) {
            vec![present_viewer_header(&self.viewer)]
        } else {
            vec!["viewer already closed".to_string()]
        }
    }
}
