//! Layout engine
//!
//! Turns logical entries into physical lines for a target width `T`:
//!
//! 1. Inline elements are flattened into fragments. Text splits into
//!    alternating space and word runs; controls stay atomic.
//! 2. Fragments are placed greedily. A soft break ends the row, and a
//!    fragment wider than `T` is cut into `T`-wide chunks first.
//! 3. Each row gets a 1-based `base_x` from the line's alignment.
//!
//! Every produced row satisfies `sum(fragment.width) <= T`.

use crate::color::Color;
use crate::types::{
    Alignment, ElementMeta, Fragment, FragmentKind, InlineElement, LogicalEntry, PhysicalLine,
};
use gridmark_config::RenderConfig;
use unicode_width::UnicodeWidthChar;

/// Display columns of one char. Control characters take none.
pub fn char_width(c: char) -> usize {
    c.width().unwrap_or(0)
}

/// Display columns of a string, measured the same way the grid paints it.
pub fn text_width(text: &str) -> usize {
    text.chars().map(char_width).sum()
}

/// Starting column for a row of width `content` on a `target`-wide line.
pub fn base_x(alignment: Alignment, target: usize, content: usize) -> usize {
    let slack = target.saturating_sub(content);
    match alignment {
        Alignment::Left => 1,
        Alignment::Center => (slack / 2 + 1).max(1),
        Alignment::Right => (slack + 1).max(1),
    }
}

/// Repeat `pattern` until it covers `width` columns, then cut it to exactly
/// `width` (never padded; a wide glyph that would overshoot is left out).
pub fn tile_pattern(pattern: &str, width: usize) -> String {
    let mut out = String::new();
    let mut used = 0;

    while used < width {
        let before = used;
        for c in pattern.chars() {
            let cw = char_width(c);
            if used + cw > width {
                return out;
            }
            out.push(c);
            used += cw;
        }
        if used == before {
            break;
        }
    }
    out
}

enum Piece {
    Fragment(Fragment),
    Break,
}

#[derive(Debug, Clone)]
pub struct LayoutEngine {
    checkbox_unchecked: String,
    checkbox_checked: String,
    drop_wrap_spaces: bool,
}

impl Default for LayoutEngine {
    fn default() -> Self {
        Self::new(&RenderConfig::default())
    }
}

impl LayoutEngine {
    pub fn new(config: &RenderConfig) -> Self {
        Self {
            checkbox_unchecked: config.widgets.checkbox_unchecked.clone(),
            checkbox_checked: config.widgets.checkbox_checked.clone(),
            drop_wrap_spaces: config.layout.drop_wrap_spaces,
        }
    }

    /// Lay out every entry for `width` columns (clamped to at least 1).
    pub fn layout(&self, entries: &[LogicalEntry], width: usize) -> Vec<PhysicalLine> {
        let width = width.max(1);
        let mut lines = Vec::with_capacity(entries.len());

        for entry in entries {
            match entry {
                LogicalEntry::Blank { fill } => lines.push(PhysicalLine::Blank { fill: *fill }),
                LogicalEntry::HorizontalRule {
                    pattern,
                    fg,
                    bg,
                    fill,
                } => lines.push(PhysicalLine::HorizontalRule {
                    text: tile_pattern(pattern, width),
                    fg: *fg,
                    bg: *bg,
                    fill: *fill,
                }),
                LogicalEntry::Line {
                    alignment,
                    elements,
                    fill,
                } => {
                    for fragments in self.wrap(self.flatten(elements), width) {
                        let content: usize = fragments.iter().map(|f| f.width).sum();
                        lines.push(PhysicalLine::Text {
                            fragments,
                            base_x: base_x(*alignment, width, content),
                            align: *alignment,
                            fill: *fill,
                        });
                    }
                }
            }
        }

        tracing::debug!(entries = entries.len(), lines = lines.len(), width, "layout rebuilt");
        lines
    }

    fn flatten(&self, elements: &[InlineElement]) -> Vec<Piece> {
        let mut pieces = Vec::new();

        for element in elements {
            match element {
                InlineElement::Text {
                    content,
                    fg,
                    bg,
                    id,
                } => {
                    let meta = ElementMeta {
                        id: id.clone(),
                        ..Default::default()
                    };
                    for (is_space, run) in runs(content) {
                        let (kind, text) = if is_space {
                            (FragmentKind::Space, " ".repeat(run.chars().count()))
                        } else {
                            (FragmentKind::Word, run.to_string())
                        };
                        push_fragment(&mut pieces, kind, text, *fg, *bg, meta.clone());
                    }
                }
                InlineElement::Link {
                    label,
                    target,
                    fg,
                    bg,
                    id,
                } => {
                    let meta = ElementMeta {
                        id: id.clone(),
                        label: Some(label.clone()),
                        target: Some(target.clone()),
                        ..Default::default()
                    };
                    push_fragment(&mut pieces, FragmentKind::Link, label.clone(), *fg, *bg, meta);
                }
                InlineElement::Button {
                    label,
                    fg,
                    bg,
                    meta,
                } => {
                    push_fragment(&mut pieces, FragmentKind::Button, label.clone(), *fg, *bg, meta.clone());
                }
                InlineElement::Checkbox {
                    label,
                    fg,
                    bg,
                    meta,
                } => {
                    let glyph = if meta.checked {
                        &self.checkbox_checked
                    } else {
                        &self.checkbox_unchecked
                    };
                    let text = format!("{glyph}{label}");
                    push_fragment(&mut pieces, FragmentKind::Checkbox, text, *fg, *bg, meta.clone());
                }
                InlineElement::Textbox {
                    width,
                    fg,
                    bg,
                    meta,
                } => {
                    push_fragment(&mut pieces, FragmentKind::Textbox, " ".repeat(*width), *fg, *bg, meta.clone());
                }
                InlineElement::SoftBreak => pieces.push(Piece::Break),
            }
        }

        pieces
    }

    /// Greedy placement into rows of at most `width` columns.
    fn wrap(&self, pieces: Vec<Piece>, width: usize) -> Vec<Vec<Fragment>> {
        let mut rows = Vec::new();
        let mut current: Vec<Fragment> = Vec::new();
        let mut used = 0;
        let mut continuation = false;

        for piece in pieces {
            let fragment = match piece {
                Piece::Break => {
                    rows.push(std::mem::take(&mut current));
                    used = 0;
                    continuation = false;
                    continue;
                }
                Piece::Fragment(fragment) => fragment,
            };

            let chunks = if fragment.width > width {
                hard_split(fragment, width)
            } else {
                vec![fragment]
            };

            for chunk in chunks {
                if used + chunk.width > width {
                    rows.push(std::mem::take(&mut current));
                    used = 0;
                    continuation = true;
                }
                if used == 0
                    && continuation
                    && self.drop_wrap_spaces
                    && chunk.kind == FragmentKind::Space
                {
                    continue;
                }
                used += chunk.width;
                current.push(chunk);
            }
        }

        if !current.is_empty() || rows.is_empty() {
            rows.push(current);
        }
        rows
    }
}

fn push_fragment(
    pieces: &mut Vec<Piece>,
    kind: FragmentKind,
    text: String,
    fg: Color,
    bg: Color,
    meta: ElementMeta,
) {
    let width = text_width(&text);
    if width == 0 {
        return;
    }
    pieces.push(Piece::Fragment(Fragment {
        kind,
        text,
        width,
        fg,
        bg,
        meta,
    }));
}

/// Split text into maximal whitespace / non-whitespace runs, in order.
fn runs(content: &str) -> Vec<(bool, &str)> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut current: Option<bool> = None;

    for (i, c) in content.char_indices() {
        let is_space = c.is_whitespace();
        match current {
            Some(kind) if kind == is_space => {}
            Some(kind) => {
                out.push((kind, &content[start..i]));
                start = i;
                current = Some(is_space);
            }
            None => current = Some(is_space),
        }
    }
    if let Some(kind) = current {
        out.push((kind, &content[start..]));
    }
    out
}

/// Cut a fragment into chunks no wider than `width`. A glyph wider than the
/// whole line is replaced by U+FFFD so no chunk is empty or overflows.
fn hard_split(fragment: Fragment, width: usize) -> Vec<Fragment> {
    let mut chunks = Vec::new();
    let mut text = String::new();
    let mut used = 0;

    for c in fragment.text.chars() {
        let (c, cw) = match char_width(c) {
            cw if cw > width => ('\u{FFFD}', 1),
            cw => (c, cw),
        };
        if used + cw > width && used > 0 {
            chunks.push(Fragment {
                text: std::mem::take(&mut text),
                width: used,
                ..fragment.clone()
            });
            used = 0;
        }
        text.push(c);
        used += cw;
    }
    if used > 0 {
        chunks.push(Fragment {
            text,
            width: used,
            ..fragment
        });
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proptest_strategies::{arb_markup, arb_width};
    use crate::tokenizer::Tokenizer;
    use proptest::prelude::*;
    use test_case::test_case;

    fn layout(source: &str, width: usize) -> Vec<PhysicalLine> {
        let config = RenderConfig::default();
        let entries = Tokenizer::new(&config).tokenize(source);
        LayoutEngine::new(&config).layout(&entries, width)
    }

    fn rows(lines: &[PhysicalLine]) -> Vec<String> {
        lines.iter().map(PhysicalLine::plain_text).collect()
    }

    #[test]
    fn hr_tiles_and_truncates() {
        assert_eq!(tile_pattern("ab", 10), "ababababab");
        assert_eq!(tile_pattern("abc", 4), "abca");
        assert_eq!(tile_pattern("-", 1), "-");
        assert_eq!(rows(&layout("<hr:\"ab\">", 10)), vec!["ababababab"]);
    }

    #[test]
    fn wide_pattern_never_padded() {
        // each glyph is two columns wide
        let tiled = tile_pattern("日", 5);
        assert_eq!(tiled, "日日");
        assert_eq!(text_width(&tiled), 4);
    }

    #[test_case(Alignment::Left, 20, 9, 1 ; "left")]
    #[test_case(Alignment::Center, 20, 9, 6 ; "center")]
    #[test_case(Alignment::Center, 20, 20, 1 ; "center full")]
    #[test_case(Alignment::Right, 20, 9, 12 ; "right")]
    #[test_case(Alignment::Right, 5, 5, 1 ; "right full")]
    fn base_x_formula(alignment: Alignment, target: usize, content: usize, expected: usize) {
        assert_eq!(base_x(alignment, target, content), expected);
    }

    #[test]
    fn centered_warning_scenario() {
        let lines = layout("## <text:red>Warning<link \"help\",\"?\">", 20);
        assert_eq!(lines.len(), 1);
        let PhysicalLine::Text {
            fragments,
            base_x,
            align,
            ..
        } = &lines[0]
        else {
            panic!("expected text line");
        };
        assert_eq!(*align, Alignment::Center);
        assert_eq!(*base_x, 6);

        let shape: Vec<_> = fragments.iter().map(|f| (f.kind, f.text.as_str(), f.fg)).collect();
        assert_eq!(
            shape,
            vec![
                (FragmentKind::Space, " ", Color::White),
                (FragmentKind::Word, "Warning", Color::Red),
                (FragmentKind::Link, "?", Color::Red),
            ]
        );
        assert_eq!(fragments[2].meta.target.as_deref(), Some("help"));
    }

    #[test]
    fn words_wrap_at_spaces() {
        let lines = layout("the quick brown fox", 10);
        assert_eq!(rows(&lines), vec!["the quick ", "brown fox"]);
    }

    #[test]
    fn wrap_spaces_kept_when_configured() {
        let mut config = RenderConfig::default();
        config.layout.drop_wrap_spaces = false;
        let entries = Tokenizer::new(&config).tokenize("aaaa bbbb");
        let lines = LayoutEngine::new(&config).layout(&entries, 4);
        assert_eq!(rows(&lines), vec!["aaaa", " ", "bbbb"]);
    }

    #[test]
    fn long_word_hard_split() {
        let lines = layout("abcdefghijklmnopqrstuvwxy", 10);
        assert_eq!(rows(&lines), vec!["abcdefghij", "klmnopqrst", "uvwxy"]);
    }

    #[test]
    fn hard_split_chunks_placed_greedily() {
        let lines = layout("ab abcdefghijkl", 5);
        assert_eq!(rows(&lines), vec!["ab ", "abcde", "fghij", "kl"]);
    }

    #[test]
    fn soft_break_forces_new_row() {
        let lines = layout("<id:\"a\">X<id:\"b\">Y", 40);
        assert_eq!(rows(&lines), vec!["X", "Y"]);
    }

    #[test]
    fn inline_br_and_trailing_break() {
        assert_eq!(rows(&layout("a<br><br>b", 40)), vec!["a", "", "b"]);
        assert_eq!(rows(&layout("<id:\"a\">X<id:\"b\">", 40)), vec!["X"]);
    }

    #[test]
    fn empty_line_still_occupies_a_row() {
        let lines = layout("<text:red>", 10);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].content_width(), 0);
    }

    #[test]
    fn checkbox_and_textbox_fragments() {
        let lines = layout("<checkbox \"Ok\"><checkbox \"On\" checked:true><textbox width:3>", 40);
        let PhysicalLine::Text { fragments, .. } = &lines[0] else {
            panic!("expected text line");
        };
        let texts: Vec<_> = fragments.iter().map(|f| f.text.as_str()).collect();
        assert_eq!(texts, vec!["[ ] Ok", "[x] On", "   "]);
        assert_eq!(fragments[2].kind, FragmentKind::Textbox);
    }

    #[test]
    fn wide_glyph_on_one_column_line() {
        let lines = layout("日本", 1);
        for line in &lines {
            assert!(line.content_width() <= 1);
        }
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn tabs_become_single_columns() {
        let lines = layout("a\tb", 10);
        assert_eq!(rows(&lines), vec!["a b"]);
    }

    #[test]
    fn control_character_patterns_terminate() {
        assert_eq!(tile_pattern("\u{1}", 10), "");
        assert_eq!(tile_pattern("\u{301}a", 3), "\u{301}a\u{301}a\u{301}a");
        assert_eq!(rows(&layout("<hr:\"\t\">", 10)), vec!["          "]);
        assert_eq!(rows(&layout("<hr:\"\u{1}\">", 4)), vec!["\u{FFFD}".repeat(4)]);
    }

    #[test]
    fn control_character_words_split_not_dropped() {
        let lines = layout(&"\u{1}".repeat(5), 2);
        assert_eq!(
            rows(&lines),
            vec!["\u{FFFD}\u{FFFD}", "\u{FFFD}\u{FFFD}", "\u{FFFD}"]
        );
        for line in &lines {
            assert_eq!(line.content_width(), text_width(&line.plain_text()));
        }
    }

    #[test]
    fn zero_width_text_from_patches_is_dropped() {
        let engine = LayoutEngine::default();
        let entries = vec![LogicalEntry::Line {
            alignment: Alignment::Left,
            elements: vec![InlineElement::Text {
                content: "\u{1}\u{1}\u{1}".to_string(),
                fg: Color::White,
                bg: Color::Black,
                id: None,
            }],
            fill: None,
        }];
        let lines = engine.layout(&entries, 2);
        assert_eq!(rows(&lines), vec![""]);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn prop_rows_never_exceed_width(source in arb_markup(), width in arb_width()) {
            for line in layout(&source, width) {
                prop_assert!(
                    line.content_width() <= width,
                    "row {:?} wider than {}",
                    line.plain_text(),
                    width
                );
                if let PhysicalLine::Text { fragments, .. } = &line {
                    for f in fragments {
                        prop_assert!(f.width > 0, "zero-width fragment in {:?}", line);
                    }
                }
            }
        }

        #[test]
        fn prop_base_x_matches_alignment(
            words in prop::collection::vec("[a-z]{1,8}", 1..6),
            marker in 0usize..4,
            width in 1usize..60,
        ) {
            let source = format!("{}{}", "#".repeat(marker), words.join(" "));
            for line in layout(&source, width) {
                if let PhysicalLine::Text { base_x: x, align, .. } = &line {
                    let w = line.content_width();
                    let expected = match align {
                        Alignment::Left => 1,
                        Alignment::Center => ((width - w) / 2 + 1).max(1),
                        Alignment::Right => (width - w + 1).max(1),
                    };
                    prop_assert_eq!(*x, expected);
                }
            }
        }

        #[test]
        fn prop_hr_tiling_exact(pattern in "[a-z=~-]{1,5}", width in 1usize..120) {
            let tiled = tile_pattern(&pattern, width);
            prop_assert_eq!(tiled.chars().count(), width);
            prop_assert!(pattern.repeat(width).starts_with(&tiled));
        }
    }
}
