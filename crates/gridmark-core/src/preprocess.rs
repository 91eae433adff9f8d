//! Escape preprocessing
//!
//! `\\`, `\<`, `\>` and `\"` are swapped for private-use sentinels before a
//! line is scanned for tags, so the escaped characters can never open or
//! close a tag or a quoted argument. Every string that leaves the tokenizer
//! goes through [`restore`], which turns the sentinels back into the literal
//! character exactly once.
//!
//! A source character that is itself one of the sentinels is prefixed with
//! U+E004 so [`restore`] hands it back unchanged. Control characters
//! have no display width, so whitespace controls such as tab become a space
//! and the rest become U+FFFD.

const BACKSLASH: char = '\u{E000}';
const LESS: char = '\u{E001}';
const GREATER: char = '\u{E002}';
const QUOTE: char = '\u{E003}';
const LITERAL: char = '\u{E004}';

fn is_reserved(c: char) -> bool {
    (BACKSLASH..=LITERAL).contains(&c)
}

fn visible(c: char) -> char {
    match c {
        c if !c.is_control() => c,
        c if c.is_whitespace() => ' ',
        _ => '\u{FFFD}',
    }
}

/// Byte offsets of a protected line mapped back to its raw line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OffsetMap {
    /// `(protected offset, raw offset)` at the start of every protected char
    points: Vec<(usize, usize)>,
    protected_len: usize,
    raw_len: usize,
}

impl OffsetMap {
    /// Raw byte offset of the protected char containing `offset`. Offsets at
    /// or past the end map to the end of the raw line.
    pub fn raw_offset(&self, offset: usize) -> usize {
        if offset >= self.protected_len {
            return self.raw_len;
        }
        match self.points.binary_search_by_key(&offset, |&(protected, _)| protected) {
            Ok(i) => self.points[i].1,
            Err(i) => i.checked_sub(1).map_or(0, |j| self.points[j].1),
        }
    }
}

/// Replace escape sequences with sentinels.
///
/// A backslash before any other character, or at the end of the line, is
/// kept as-is.
pub fn protect(raw: &str) -> String {
    protect_mapped(raw).0
}

/// [`protect`], also returning where each protected char came from.
pub fn protect_mapped(raw: &str) -> (String, OffsetMap) {
    let mut out = String::with_capacity(raw.len());
    let mut points = Vec::with_capacity(raw.len());
    let mut chars = raw.char_indices().peekable();

    while let Some((at, c)) = chars.next() {
        if is_reserved(c) {
            points.push((out.len(), at));
            out.push(LITERAL);
            points.push((out.len(), at));
            out.push(c);
            continue;
        }
        let sentinel = match (c, chars.peek()) {
            ('\\', Some((_, '\\'))) => BACKSLASH,
            ('\\', Some((_, '<'))) => LESS,
            ('\\', Some((_, '>'))) => GREATER,
            ('\\', Some((_, '"'))) => QUOTE,
            _ => {
                points.push((out.len(), at));
                out.push(visible(c));
                continue;
            }
        };
        chars.next();
        points.push((out.len(), at));
        out.push(sentinel);
    }

    let map = OffsetMap {
        points,
        protected_len: out.len(),
        raw_len: raw.len(),
    };
    (out, map)
}

/// Turn sentinels back into the characters they stand for.
pub fn restore(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();

    while let Some(c) = chars.next() {
        match c {
            LITERAL => out.extend(chars.next()),
            BACKSLASH => out.push('\\'),
            LESS => out.push('<'),
            GREATER => out.push('>'),
            QUOTE => out.push('"'),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_hide_tag_delimiters() {
        let guarded = protect(r#"a \<b\> \"c\" \\"#);
        assert!(!guarded.contains('<'));
        assert!(!guarded.contains('>'));
        assert!(!guarded.contains('"'));
        assert!(!guarded.contains('\\'));
        assert_eq!(restore(&guarded), r#"a <b> "c" \"#);
    }

    #[test]
    fn unescaped_delimiters_untouched() {
        let guarded = protect(r#"<text color:"red">x"#);
        assert_eq!(guarded, r#"<text color:"red">x"#);
    }

    #[test]
    fn double_backslash_then_bracket_is_a_tag_opener() {
        // `\\<` is an escaped backslash followed by a real `<`
        let guarded = protect(r"\\<b>");
        assert!(guarded.ends_with("<b>"));
        assert_eq!(restore(&guarded), r"\<b>");
    }

    #[test]
    fn lone_backslashes_survive() {
        assert_eq!(restore(&protect(r"C:\path\n")), r"C:\path\n");
        assert_eq!(restore(&protect("end\\")), "end\\");
    }

    #[test]
    fn literal_sentinel_chars_round_trip() {
        let raw = "a\u{E001}b\u{E004}\u{E000}\\<";
        let guarded = protect(raw);
        assert_eq!(guarded.matches('<').count(), 0);
        assert_eq!(restore(&guarded), "a\u{E001}b\u{E004}\u{E000}<");
    }

    #[test]
    fn offsets_map_back_to_raw_char_boundaries() {
        let raw = "\\<\u{E000}<script>é";
        let (guarded, map) = protect_mapped(raw);

        let open = guarded.find('<').unwrap();
        assert_eq!(map.raw_offset(open), raw.find("<script").unwrap());
        for offset in 0..=guarded.len() {
            assert!(raw.is_char_boundary(map.raw_offset(offset)));
        }
        assert_eq!(map.raw_offset(guarded.len()), raw.len());
    }

    #[test]
    fn control_chars_made_visible() {
        let (guarded, map) = protect_mapped("a\tb\u{1}\u{9F}c");
        assert_eq!(guarded, "a b\u{FFFD}\u{FFFD}c");
        assert_eq!(map.raw_offset(guarded.find('c').unwrap()), 6);
    }
}
