//! Markup tokenizer
//!
//! Consumes source line by line and produces one [`LogicalEntry`] per visible
//! line. Formatting set by tags ([`LineState`]) carries forward until a
//! `reset` tag or the end of the source line; the fill background lives in
//! [`PageState`] and carries across lines until `fillBg:reset`.
//!
//! Nothing here fails: unknown tags are dropped, unknown colours fall back
//! to the palette defaults and an unterminated `<` turns the rest of the line
//! into text.

use crate::color::{Color, Palette};
use crate::preprocess::{protect, restore};
use crate::script::{find_script_close, find_script_open};
use crate::tag::{find_tag_end, parse_tag, Tag};
use crate::types::{Alignment, ElementMeta, InlineElement, LineState, LogicalEntry};
use gridmark_config::RenderConfig;

/// Page-scoped scan state threaded through every line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageState {
    pub in_script: bool,
    pub fill: Option<Color>,
}

#[derive(Debug, Clone)]
pub struct Tokenizer {
    palette: Palette,
    textbox_width: usize,
    textbox_max_width: usize,
    textbox_blink: char,
    rule_pattern: String,
}

impl Tokenizer {
    pub fn new(config: &RenderConfig) -> Self {
        Self {
            palette: Palette::from_config(&config.palette),
            textbox_width: config.widgets.textbox_width.max(1),
            textbox_max_width: config.widgets.textbox_max_width.max(1),
            textbox_blink: config.widgets.textbox_blink,
            rule_pattern: config.layout.rule_pattern.clone(),
        }
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Tokenize a whole source text.
    pub fn tokenize(&self, source: &str) -> Vec<LogicalEntry> {
        self.tokenize_lines(source.lines())
    }

    pub fn tokenize_lines<'a>(&self, lines: impl IntoIterator<Item = &'a str>) -> Vec<LogicalEntry> {
        let mut page = PageState::default();
        lines
            .into_iter()
            .filter_map(|line| self.tokenize_line(line, &mut page))
            .collect()
    }

    /// Tokenize one source line. `None` for lines inside (or opening and
    /// closing) a script region.
    pub fn tokenize_line(&self, raw: &str, page: &mut PageState) -> Option<LogicalEntry> {
        let guarded = protect(raw);

        if page.in_script {
            if find_script_close(&guarded).is_some() {
                page.in_script = false;
            }
            return None;
        }
        if let Some(open) = find_script_open(&guarded) {
            page.in_script = find_script_close(&guarded[open..]).is_none();
            return None;
        }

        let trimmed = guarded.trim();
        if trimmed.is_empty() {
            return Some(LogicalEntry::Blank { fill: page.fill });
        }
        if let Some(entry) = self.structural(trimmed, page) {
            return Some(entry);
        }

        let (alignment, body) = split_alignment(&guarded);
        let mut state = LineState::new(&self.palette);
        let mut elements = Vec::new();
        let mut literal = String::new();
        let mut pos = 0;

        while pos < body.len() {
            let Some(rel) = body[pos..].find('<') else {
                literal.push_str(&body[pos..]);
                break;
            };
            let open = pos + rel;
            literal.push_str(&body[pos..open]);

            let Some(close) = find_tag_end(body, open) else {
                literal.push_str(&body[open..]);
                break;
            };
            match parse_tag(&body[open + 1..close]) {
                Some(tag) if is_inline_tag(&tag.key()) => {
                    flush_text(&mut literal, &state, &mut elements);
                    self.apply_tag(&tag, &mut state, &mut elements, page);
                }
                Some(_) => {}
                None => literal.push_str(&body[open..=close]),
            }
            pos = close + 1;
        }
        flush_text(&mut literal, &state, &mut elements);

        Some(LogicalEntry::Line {
            alignment,
            elements,
            fill: page.fill,
        })
    }

    /// A line holding nothing but one `<hr>` or `<br>` tag.
    fn structural(&self, trimmed: &str, page: &PageState) -> Option<LogicalEntry> {
        if !trimmed.starts_with('<') || find_tag_end(trimmed, 0)? != trimmed.len() - 1 {
            return None;
        }
        let tag = parse_tag(&trimmed[1..trimmed.len() - 1])?;
        match tag.key().as_str() {
            "hr" => {
                let pattern = tag
                    .arg(&["pattern"])
                    .filter(|p| !p.is_empty())
                    .unwrap_or(&self.rule_pattern)
                    .to_string();
                let fg = tag
                    .attr("color")
                    .or_else(|| tag.attr("fg"))
                    .map_or(self.palette.foreground, |c| self.palette.resolve_fg(c));
                let bg = tag
                    .attr("bg")
                    .map_or(self.palette.background, |c| self.palette.resolve_bg(c));
                Some(LogicalEntry::HorizontalRule {
                    pattern,
                    fg,
                    bg,
                    fill: page.fill,
                })
            }
            "br" => Some(LogicalEntry::Blank { fill: page.fill }),
            _ => None,
        }
    }

    fn apply_tag(
        &self,
        tag: &Tag,
        state: &mut LineState,
        elements: &mut Vec<InlineElement>,
        page: &mut PageState,
    ) {
        match tag.key().as_str() {
            "text" | "fg" => {
                state.fg = tag
                    .arg(&["color"])
                    .map_or(self.palette.foreground, |c| self.palette.resolve_fg(c));
            }
            "background" | "bg" => {
                state.bg = tag
                    .arg(&["color"])
                    .map_or(self.palette.background, |c| self.palette.resolve_bg(c));
            }
            "fillbg" => {
                page.fill = match tag.arg(&["color"]) {
                    None => None,
                    Some(c) if c.eq_ignore_ascii_case("reset") => None,
                    Some(c) => Some(self.palette.resolve_bg(c)),
                };
            }
            "reset" => *state = LineState::new(&self.palette),
            "id" => {
                if !elements.is_empty() {
                    elements.push(InlineElement::SoftBreak);
                }
                state.id = tag
                    .arg(&["id"])
                    .filter(|id| !id.is_empty())
                    .map(str::to_string);
            }
            "br" => elements.push(InlineElement::SoftBreak),
            "link" => {
                if let Some(link) = self.link(tag, state) {
                    elements.push(link);
                }
            }
            "button" => {
                if let Some(label) = label_of(tag) {
                    elements.push(InlineElement::Button {
                        meta: ElementMeta {
                            label: Some(label.clone()),
                            press_color: attr_any(tag, &["pressColor", "presscolor"])
                                .and_then(|c| self.palette.lookup(c)),
                            ..self.control_meta(tag, state)
                        },
                        label,
                        fg: state.fg,
                        bg: state.bg,
                    });
                }
            }
            "checkbox" => {
                if let Some(label) = label_of(tag) {
                    elements.push(InlineElement::Checkbox {
                        meta: ElementMeta {
                            label: Some(label.clone()),
                            checked: tag
                                .attr("checked")
                                .is_some_and(|v| v.eq_ignore_ascii_case("true")),
                            ..self.control_meta(tag, state)
                        },
                        label,
                        fg: state.fg,
                        bg: state.bg,
                    });
                }
            }
            "textbox" => {
                let width = tag
                    .attr("width")
                    .and_then(|w| w.trim().parse::<usize>().ok())
                    .filter(|w| *w > 0)
                    .unwrap_or(self.textbox_width)
                    .min(self.textbox_max_width);
                let blink = tag
                    .attr("blink")
                    .and_then(|b| b.chars().next())
                    .unwrap_or(self.textbox_blink);
                elements.push(InlineElement::Textbox {
                    width,
                    fg: state.fg,
                    bg: state.bg,
                    meta: ElementMeta {
                        blink: Some(blink),
                        on_enter: attr_any(tag, &["onEnter", "onenter"]).map(str::to_string),
                        ..self.control_meta(tag, state)
                    },
                });
            }
            _ => {}
        }
    }

    /// `<link "target","label">`, `<link "target">` or
    /// `<link target:"t" label:"l">`.
    fn link(&self, tag: &Tag, state: &LineState) -> Option<InlineElement> {
        let (target, label) = if let Some(target) = tag.attr("target") {
            (target, tag.attr("label").unwrap_or(target))
        } else {
            match tag.positional.as_slice() {
                [target, label, ..] => (target.as_str(), label.as_str()),
                [target] => (target.as_str(), target.as_str()),
                [] => {
                    let target = tag.value.as_deref()?;
                    (target, target)
                }
            }
        };
        if label.is_empty() {
            return None;
        }
        Some(InlineElement::Link {
            label: label.to_string(),
            target: target.to_string(),
            fg: state.fg,
            bg: state.bg,
            id: tag.attr("id").map(str::to_string).or_else(|| state.id.clone()),
        })
    }

    fn control_meta(&self, tag: &Tag, state: &LineState) -> ElementMeta {
        ElementMeta {
            id: tag.attr("id").map(str::to_string).or_else(|| state.id.clone()),
            on_click: attr_any(tag, &["onClick", "onclick"]).map(str::to_string),
            ..Default::default()
        }
    }
}

fn is_inline_tag(key: &str) -> bool {
    matches!(
        key,
        "text"
            | "fg"
            | "background"
            | "bg"
            | "fillbg"
            | "reset"
            | "id"
            | "br"
            | "link"
            | "button"
            | "checkbox"
            | "textbox"
    )
}

fn attr_any<'t>(tag: &'t Tag, keys: &[&str]) -> Option<&'t str> {
    keys.iter().find_map(|k| tag.attr(k))
}

fn label_of(tag: &Tag) -> Option<String> {
    tag.arg(&["label", "text"])
        .filter(|l| !l.is_empty())
        .map(str::to_string)
}

/// Leading `#` markers: none or one is left, two center, three right.
fn split_alignment(line: &str) -> (Alignment, &str) {
    let markers = line.chars().take_while(|c| *c == '#').count().min(3);
    let alignment = match markers {
        2 => Alignment::Center,
        3 => Alignment::Right,
        _ => Alignment::Left,
    };
    (alignment, &line[markers..])
}

fn flush_text(literal: &mut String, state: &LineState, elements: &mut Vec<InlineElement>) {
    if literal.is_empty() {
        return;
    }
    elements.push(InlineElement::Text {
        content: restore(literal),
        fg: state.fg,
        bg: state.bg,
        id: state.id.clone(),
    });
    literal.clear();
}
