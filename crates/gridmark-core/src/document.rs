//! Document: source, token cache, layout cache and scroll state
//!
//! The three stages are separate owned buffers, invalidated top-down:
//!
//! - tokens: rebuilt from scratch when the source changes or on request
//! - layout: rebuilt when tokens change, an element is patched by id, or
//!   the target width changes
//! - paint: a pure read of the layout cache for the current viewport
//!
//! [`Document::paint`] never rebuilds anything. Calling it before
//! [`Document::layout`] is a caller bug and returns
//! [`MarkupError::LayoutMissing`].

use crate::color::Color;
use crate::error::{MarkupError, MarkupResult};
use crate::grid::CellGrid;
use crate::layout::LayoutEngine;
use crate::render::{paint_lines, PaintOutput, Viewport};
use crate::script::{ScriptBlock, ScriptExtractor};
use crate::tokenizer::Tokenizer;
use crate::types::{InlineElement, LogicalEntry, PhysicalLine};
use gridmark_config::RenderConfig;
use std::path::{Path, PathBuf};

/// Change applied to every element carrying a given id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementPatch {
    /// Replace text content, or the label of links, buttons and checkboxes
    Text(String),
    Foreground(Color),
    Background(Color),
    /// Tick or untick checkboxes
    Checked(bool),
}

#[derive(Debug, Clone)]
struct LayoutCache {
    width: usize,
    lines: Vec<PhysicalLine>,
}

pub struct Document {
    tokenizer: Tokenizer,
    engine: LayoutEngine,
    extractor: ScriptExtractor,
    path: Option<PathBuf>,
    source: Vec<String>,
    tokens: Option<Vec<LogicalEntry>>,
    layout: Option<LayoutCache>,
    scripts: Vec<ScriptBlock>,
    scroll: usize,
    /// Viewport height from the last scroll call
    scroll_height: usize,
}

impl Document {
    /// Empty document.
    pub fn new(config: &RenderConfig) -> MarkupResult<Self> {
        config.validate()?;
        Ok(Self {
            tokenizer: Tokenizer::new(config),
            engine: LayoutEngine::new(config),
            extractor: ScriptExtractor::new(config.scripts.reserved_decorator.clone()),
            path: None,
            source: Vec::new(),
            tokens: None,
            layout: None,
            scripts: Vec::new(),
            scroll: 0,
            scroll_height: 1,
        })
    }

    pub fn from_source(source: &str, config: &RenderConfig) -> MarkupResult<Self> {
        let mut doc = Self::new(config)?;
        doc.set_source(source);
        Ok(doc)
    }

    pub fn open(path: impl AsRef<Path>, config: &RenderConfig) -> MarkupResult<Self> {
        let mut doc = Self::new(config)?;
        doc.set_path(path)?;
        Ok(doc)
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Replace the source with in-memory text and re-tokenize.
    pub fn set_source(&mut self, source: &str) {
        self.path = None;
        self.source = source.lines().map(str::to_string).collect();
        self.scroll = 0;
        self.retokenize();
    }

    /// Point the document at a file. A changed path is read and
    /// re-tokenized; the same path again is a no-op. Returns whether the
    /// source was reloaded. On I/O failure the previous buffers are kept.
    pub fn set_path(&mut self, path: impl AsRef<Path>) -> MarkupResult<bool> {
        let path = path.as_ref();
        if self.path.as_deref() == Some(path) && self.tokens.is_some() {
            return Ok(false);
        }
        self.load(path)?;
        Ok(true)
    }

    /// Re-read the current file, if the document has one.
    pub fn reload(&mut self) -> MarkupResult<()> {
        match self.path.clone() {
            Some(path) => self.load(&path),
            None => {
                self.retokenize();
                Ok(())
            }
        }
    }

    fn load(&mut self, path: &Path) -> MarkupResult<()> {
        let text = std::fs::read_to_string(path).map_err(|source| MarkupError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), bytes = text.len(), "source loaded");
        self.source = text.lines().map(str::to_string).collect();
        self.path = Some(path.to_path_buf());
        self.scroll = 0;
        self.retokenize();
        Ok(())
    }

    /// Rebuild tokens and script blocks from the source; drops the layout.
    pub fn retokenize(&mut self) {
        let lines = || self.source.iter().map(String::as_str);
        let tokens = self.tokenizer.tokenize_lines(lines());
        let scripts = self.extractor.extract(lines());
        tracing::debug!(
            lines = self.source.len(),
            entries = tokens.len(),
            scripts = scripts.len(),
            "tokens rebuilt"
        );
        self.tokens = Some(tokens);
        self.scripts = scripts;
        self.invalidate_layout();
    }

    pub fn invalidate_layout(&mut self) {
        if self.layout.take().is_some() {
            tracing::trace!("layout cache invalidated");
        }
    }

    /// Make sure the layout cache matches `width`, rebuilding it if missing
    /// or built for another width.
    pub fn layout(&mut self, width: usize) -> MarkupResult<&[PhysicalLine]> {
        if width == 0 {
            return Err(MarkupError::ZeroWidth);
        }
        if self.tokens.is_none() {
            self.retokenize();
        }

        let stale = self.layout.as_ref().is_none_or(|cache| cache.width != width);
        if stale {
            let tokens = self.tokens.as_deref().unwrap_or_default();
            let lines = self.engine.layout(tokens, width);
            self.layout = Some(LayoutCache { width, lines });

            let max = self.max_scroll(self.scroll_height);
            if self.scroll > max {
                tracing::trace!(from = self.scroll, to = max, "scroll clamped to new layout");
                self.scroll = max;
            }
        }

        Ok(self
            .layout
            .as_ref()
            .map(|cache| cache.lines.as_slice())
            .unwrap_or_default())
    }

    pub fn tokens(&self) -> Option<&[LogicalEntry]> {
        self.tokens.as_deref()
    }

    /// Cached physical lines, if a layout exists.
    pub fn physical_lines(&self) -> Option<&[PhysicalLine]> {
        self.layout.as_ref().map(|cache| cache.lines.as_slice())
    }

    /// Width of the current layout cache.
    pub fn layout_width(&self) -> Option<usize> {
        self.layout.as_ref().map(|cache| cache.width)
    }

    pub fn scripts(&self) -> &[ScriptBlock] {
        &self.scripts
    }

    /// Token elements carrying `id`, in source order.
    pub fn elements_by_id(&self, id: &str) -> Vec<&InlineElement> {
        self.tokens
            .iter()
            .flatten()
            .filter_map(|entry| match entry {
                LogicalEntry::Line { elements, .. } => Some(elements),
                _ => None,
            })
            .flatten()
            .filter(|element| element.id() == Some(id))
            .collect()
    }

    /// Apply `patch` to every element with `id`. Only the layout is
    /// invalidated; other token entries are left as they are. Returns the
    /// number of elements changed.
    pub fn patch(&mut self, id: &str, patch: ElementPatch) -> usize {
        let Some(tokens) = self.tokens.as_mut() else {
            return 0;
        };

        let mut changed = 0;
        for entry in tokens.iter_mut() {
            if let LogicalEntry::Line { elements, .. } = entry {
                changed += patch_elements(elements, id, &patch);
            }
        }

        if changed > 0 {
            tracing::debug!(id, changed, "elements patched");
            self.invalidate_layout();
        }
        changed
    }

    /// Paint the visible window of the layout cache.
    pub fn paint(&self, viewport: Viewport, grid: &mut CellGrid) -> MarkupResult<PaintOutput> {
        let cache = self.layout.as_ref().ok_or(MarkupError::LayoutMissing)?;
        Ok(paint_lines(&cache.lines, self.scroll, viewport, grid))
    }

    pub fn scroll(&self) -> usize {
        self.scroll
    }

    /// Largest scroll offset that still fills a viewport of `height` rows.
    pub fn max_scroll(&self, height: usize) -> usize {
        self.physical_lines()
            .map_or(0, |lines| lines.len().saturating_sub(height))
    }

    pub fn scroll_to(&mut self, offset: usize, height: usize) -> usize {
        self.scroll_height = height.max(1);
        self.scroll = offset.min(self.max_scroll(height));
        self.scroll
    }

    pub fn scroll_by(&mut self, delta: isize, height: usize) -> usize {
        let target = self.scroll.saturating_add_signed(delta);
        self.scroll_to(target, height)
    }
}

fn patch_elements(elements: &mut Vec<InlineElement>, id: &str, patch: &ElementPatch) -> usize {
    let mut changed = 0;
    // consecutive text runs sharing the id collapse into the first one
    let mut in_text_run = false;

    elements.retain_mut(|element| {
        if element.id() != Some(id) {
            in_text_run = false;
            return true;
        }

        match (element, patch) {
            (InlineElement::Text { .. }, ElementPatch::Text(_)) if in_text_run => false,
            (InlineElement::Text { content, .. }, ElementPatch::Text(text)) => {
                *content = text.clone();
                in_text_run = true;
                changed += 1;
                true
            }
            (InlineElement::Link { label, .. }, ElementPatch::Text(text)) => {
                *label = text.clone();
                in_text_run = false;
                changed += 1;
                true
            }
            (
                InlineElement::Button { label, meta, .. } | InlineElement::Checkbox { label, meta, .. },
                ElementPatch::Text(text),
            ) => {
                *label = text.clone();
                meta.label = Some(text.clone());
                in_text_run = false;
                changed += 1;
                true
            }
            (InlineElement::Checkbox { meta, .. }, ElementPatch::Checked(checked)) => {
                meta.checked = *checked;
                changed += 1;
                true
            }
            (
                InlineElement::Text { fg, .. }
                | InlineElement::Link { fg, .. }
                | InlineElement::Button { fg, .. }
                | InlineElement::Checkbox { fg, .. }
                | InlineElement::Textbox { fg, .. },
                ElementPatch::Foreground(color),
            ) => {
                *fg = *color;
                changed += 1;
                true
            }
            (
                InlineElement::Text { bg, .. }
                | InlineElement::Link { bg, .. }
                | InlineElement::Button { bg, .. }
                | InlineElement::Checkbox { bg, .. }
                | InlineElement::Textbox { bg, .. },
                ElementPatch::Background(color),
            ) => {
                *bg = *color;
                changed += 1;
                true
            }
            _ => true,
        }
    });

    changed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(source: &str) -> Document {
        Document::from_source(source, &RenderConfig::default()).unwrap()
    }

    #[test]
    fn paint_before_layout_fails_loudly() {
        let doc = doc("hello");
        let mut grid = CellGrid::new(10, 2);
        let err = doc.paint(Viewport::full(&grid), &mut grid).unwrap_err();
        assert!(matches!(err, MarkupError::LayoutMissing));
    }

    #[test]
    fn zero_width_layout_rejected() {
        let mut doc = doc("hello");
        assert!(matches!(doc.layout(0), Err(MarkupError::ZeroWidth)));
    }

    #[test]
    fn layout_rebuilds_only_on_width_change() {
        let mut doc = doc("aaa bbb ccc");
        assert_eq!(doc.layout(20).unwrap().len(), 1);
        assert_eq!(doc.layout_width(), Some(20));
        assert_eq!(doc.layout(4).unwrap().len(), 3);
        assert_eq!(doc.layout_width(), Some(4));
    }

    #[test]
    fn retokenize_drops_layout() {
        let mut doc = doc("x");
        doc.layout(10).unwrap();
        doc.retokenize();
        assert!(doc.physical_lines().is_none());
    }

    #[test]
    fn patch_text_collapses_same_id_runs() {
        let mut doc = doc("<id:\"msg\">old <text:red>value\nkeep");
        doc.layout(40).unwrap();

        assert_eq!(doc.patch("msg", ElementPatch::Text("new".to_string())), 1);
        assert!(doc.physical_lines().is_none());

        let lines = doc.layout(40).unwrap();
        assert_eq!(lines[0].plain_text(), "new");
        assert_eq!(lines[1].plain_text(), "keep");
    }

    #[test]
    fn patch_unknown_id_keeps_layout() {
        let mut doc = doc("<id:\"a\">x");
        doc.layout(10).unwrap();
        assert_eq!(doc.patch("zzz", ElementPatch::Foreground(Color::Red)), 0);
        assert!(doc.physical_lines().is_some());
    }

    #[test]
    fn patch_checkbox_and_colours() {
        let mut doc = doc("<checkbox \"Agree\" id:\"tos\"> <button \"Go\" id:\"tos\">");
        assert_eq!(doc.patch("tos", ElementPatch::Checked(true)), 1);
        assert_eq!(doc.patch("tos", ElementPatch::Background(Color::Blue)), 2);

        let lines = doc.layout(40).unwrap();
        assert_eq!(lines[0].plain_text(), "[x] Agree Go");
        match doc.elements_by_id("tos")[1] {
            InlineElement::Button { bg, .. } => assert_eq!(*bg, Color::Blue),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn scroll_clamps_to_content() {
        let mut doc = doc("1\n2\n3\n4\n5");
        assert_eq!(doc.scroll_by(3, 2), 0);

        doc.layout(5).unwrap();
        assert_eq!(doc.max_scroll(2), 3);
        assert_eq!(doc.scroll_by(10, 2), 3);
        assert_eq!(doc.scroll_by(-1, 2), 2);
        assert_eq!(doc.scroll_by(-10, 2), 0);
    }

    #[test]
    fn wider_layout_pulls_scroll_back() {
        let mut doc = doc("aa bb cc dd ee ff");
        assert_eq!(doc.layout(2).unwrap().len(), 6);
        assert_eq!(doc.scroll_to(4, 2), 4);

        assert_eq!(doc.layout(5).unwrap().len(), 3);
        assert_eq!(doc.scroll(), 1);

        let mut grid = CellGrid::new(5, 2);
        doc.paint(Viewport::full(&grid), &mut grid).unwrap();
        assert_eq!(grid.to_lines()[0].trim_end(), "cc dd");
    }

    #[test]
    fn scripts_extracted_alongside_tokens() {
        let doc = doc("Title\n<script event:\"Load\">\ninit()\n</script>");
        assert_eq!(doc.scripts().len(), 1);
        assert_eq!(doc.scripts()[0].event.as_deref(), Some("Load"));
        assert_eq!(doc.tokens().unwrap().len(), 1);
    }

    #[test]
    fn invalid_config_rejected() {
        let mut config = RenderConfig::default();
        config.widgets.textbox_width = 0;
        assert!(matches!(Document::new(&config), Err(MarkupError::Config(_))));
    }
}
