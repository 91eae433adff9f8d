//! Script block extraction
//!
//! Scans raw source for `<script ...>` ... `</script>` regions and returns
//! their code for the external script engine. The event a block binds to
//! comes from the opening tag's `event` attribute, or failing that from the
//! first `@Name` decorator line inside the block. The reserved decorator
//! belongs to the engine and never names an event.

use crate::preprocess::protect_mapped;
use crate::tag::{find_tag_end, parse_tag};
use regex::Regex;
use std::sync::LazyLock;

static SCRIPT_OPEN_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<script(?:[\s:>]|$)").expect("script open regex"));

static SCRIPT_CLOSE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"</script\s*>").expect("script close regex"));

static DECORATOR_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*@([A-Za-z_][A-Za-z0-9_]*)").expect("decorator regex"));

/// One extracted script region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptBlock {
    pub event: Option<String>,
    pub code: String,
}

/// Byte offset of a `<script` opening tag in a protected line.
pub(crate) fn find_script_open(guarded: &str) -> Option<usize> {
    SCRIPT_OPEN_REGEX.find(guarded).map(|m| m.start())
}

/// Byte range of a `</script>` closing tag in a protected line.
pub(crate) fn find_script_close(guarded: &str) -> Option<(usize, usize)> {
    SCRIPT_CLOSE_REGEX.find(guarded).map(|m| (m.start(), m.end()))
}

pub struct ScriptExtractor {
    reserved_decorator: String,
}

impl ScriptExtractor {
    pub fn new(reserved_decorator: impl Into<String>) -> Self {
        Self {
            reserved_decorator: reserved_decorator.into(),
        }
    }

    /// Extract every script block in source order. Blocks without any
    /// captured lines are dropped; an unterminated block runs to the end of
    /// the source.
    pub fn extract<'a>(&self, lines: impl IntoIterator<Item = &'a str>) -> Vec<ScriptBlock> {
        let mut blocks = Vec::new();
        let mut open: Option<OpenBlock> = None;

        for raw in lines {
            let (guarded, offsets) = protect_mapped(raw);

            if let Some(block) = open.as_mut() {
                match find_script_close(&guarded) {
                    Some((start, _)) => {
                        let before = &raw[..offsets.raw_offset(start)];
                        if !before.trim().is_empty() {
                            block.lines.push(before.to_string());
                        }
                        if let Some(done) = open.take() {
                            self.finish(done, &mut blocks);
                        }
                    }
                    None => block.lines.push(raw.to_string()),
                }
                continue;
            }

            let Some(start) = find_script_open(&guarded) else {
                continue;
            };
            let event = find_tag_end(&guarded, start)
                .and_then(|end| parse_tag(&guarded[start + 1..end]).map(|tag| (tag, end)));
            let (event, body_start) = match event {
                Some((tag, end)) => (tag.attr("event").map(str::to_string), end + 1),
                None => (None, guarded.len()),
            };
            let mut block = OpenBlock {
                event,
                lines: Vec::new(),
            };

            let rest = &guarded[body_start..];
            match find_script_close(rest) {
                Some((close, _)) => {
                    let from = offsets.raw_offset(body_start);
                    let to = offsets.raw_offset(body_start + close);
                    let inline = &raw[from..to];
                    if !inline.trim().is_empty() {
                        block.lines.push(inline.to_string());
                    }
                    self.finish(block, &mut blocks);
                }
                None => {
                    let from = offsets.raw_offset(body_start);
                    let inline = &raw[from..];
                    if !inline.trim().is_empty() {
                        block.lines.push(inline.to_string());
                    }
                    open = Some(block);
                }
            }
        }

        if let Some(block) = open {
            tracing::debug!("script block not closed before end of source");
            self.finish(block, &mut blocks);
        }

        blocks
    }

    fn finish(&self, mut block: OpenBlock, blocks: &mut Vec<ScriptBlock>) {
        if block.lines.is_empty() {
            return;
        }
        if block.event.is_none() {
            block.event = block.lines.iter().find_map(|line| {
                DECORATOR_REGEX
                    .captures(line)
                    .map(|cap| cap[1].to_string())
                    .filter(|name| *name != self.reserved_decorator)
            });
        }
        blocks.push(ScriptBlock {
            event: block.event,
            code: block.lines.join("\n"),
        });
    }
}

struct OpenBlock {
    event: Option<String>,
    lines: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(source: &str) -> Vec<ScriptBlock> {
        ScriptExtractor::new("Persist").extract(source.lines())
    }

    #[test]
    fn attribute_event_beats_decorator() {
        let blocks = extract("<script event:\"Foo\">\n@Bar\nprint(1)\n</script>");
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].event.as_deref(), Some("Foo"));
        assert_eq!(blocks[0].code, "@Bar\nprint(1)");
    }

    #[test]
    fn decorator_names_event_when_attribute_missing() {
        let blocks = extract("<script>\n@Click\nx = 1\n</script>");
        assert_eq!(blocks[0].event.as_deref(), Some("Click"));
    }

    #[test]
    fn reserved_decorator_skipped() {
        let blocks = extract("<script>\n@Persist\n@Load\nx = 1\n</script>");
        assert_eq!(blocks[0].event.as_deref(), Some("Load"));
        assert!(blocks[0].code.starts_with("@Persist\n@Load"));
    }

    #[test]
    fn no_event_when_nothing_names_one() {
        let blocks = extract("<script>\nx = 1\n</script>");
        assert_eq!(blocks[0].event, None);
        assert_eq!(blocks[0].code, "x = 1");
    }

    #[test]
    fn empty_blocks_dropped() {
        let blocks = extract("<script>\n</script>\n<script event:\"A\"></script>");
        assert!(blocks.is_empty());
    }

    #[test]
    fn blocks_keep_source_order() {
        let source = "text\n<script event:\"One\">\na()\n</script>\nmore\n<script>\n@Two\nb()\n</script>";
        let blocks = extract(source);
        let events: Vec<_> = blocks.iter().map(|b| b.event.as_deref()).collect();
        assert_eq!(events, vec![Some("One"), Some("Two")]);
    }

    #[test]
    fn single_line_block() {
        let blocks = extract("<script event:\"Tick\">count = count + 1</script>");
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].code, "count = count + 1");
        assert_eq!(blocks[0].event.as_deref(), Some("Tick"));
    }

    #[test]
    fn code_lines_kept_verbatim() {
        let blocks = extract("<script>\n  if a < b then\n    s = \"\\<\"\n  end\n</script>");
        assert_eq!(blocks[0].code, "  if a < b then\n    s = \"\\<\"\n  end");
    }

    #[test]
    fn unterminated_block_runs_to_end() {
        let blocks = extract("<script>\n@Open\nx()");
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].event.as_deref(), Some("Open"));
    }

    #[test]
    fn escaped_script_tag_is_text() {
        assert!(extract("\\<script>\nx()\n\\</script>").is_empty());
    }

    #[test]
    fn literal_private_use_before_tag_keeps_offsets() {
        let blocks = extract("\\<\u{E000}<script>é</script>");
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].code, "é");

        let blocks = extract("\u{E002}<script event:\"Go\">\ncode()\n\u{E001}é</script>");
        assert_eq!(blocks[0].code, "code()\n\u{E001}é");
    }
}
