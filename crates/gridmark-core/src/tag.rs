//! Tag parsing
//!
//! Parses the text between `<` and `>` into a name, keyed attributes and
//! positional arguments. Accepted forms:
//!
//! - `<text:red>` - bare value after the name
//! - `<hr:"=-">` - quoted value after the name (first positional)
//! - `<link "target","label">` - quoted positional arguments
//! - `<button label:"OK" onClick:submit>` - quoted and bare `key:value` pairs
//!
//! Repeated keys keep their first value. Input is expected to have been
//! through [`crate::preprocess::protect`]; every returned string is restored.

use crate::preprocess::restore;
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

static QUOTED_ATTR_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"([A-Za-z0-9_-]+):"([^"]*)""#).expect("quoted attr regex"));

static BARE_ATTR_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([A-Za-z0-9_-]+):([A-Za-z0-9_-]+)").expect("bare attr regex"));

static KEY_SUFFIX_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z0-9_-]+:$").expect("key suffix regex"));

/// One parsed tag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tag {
    pub name: String,
    pub attrs: HashMap<String, String>,
    pub positional: Vec<String>,
    /// Unquoted value directly after `name:`, as in `<text:red>`
    pub value: Option<String>,
}

impl Tag {
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).map(String::as_str)
    }

    /// First of: the listed attributes, the first positional, the bare value.
    pub fn arg(&self, keys: &[&str]) -> Option<&str> {
        keys.iter()
            .find_map(|k| self.attr(k))
            .or_else(|| self.positional.first().map(String::as_str))
            .or(self.value.as_deref())
    }

    /// Tag name folded for dispatch (`fillBg` and `fillbg` are the same tag).
    pub fn key(&self) -> String {
        self.name.to_ascii_lowercase()
    }
}

/// Parse the inner text of a tag. `None` when there is no leading name, in
/// which case the caller keeps the tag as literal text.
pub fn parse_tag(inner: &str) -> Option<Tag> {
    let inner = inner.trim();
    let name_len = inner
        .char_indices()
        .find(|(_, c)| !c.is_ascii_alphanumeric())
        .map(|(i, _)| i)
        .unwrap_or(inner.len());
    if name_len == 0 {
        return None;
    }

    let name = inner[..name_len].to_string();
    let rest = &inner[name_len..];

    let mut positional = quoted_runs(rest, '"');
    if positional.is_empty() {
        positional = quoted_runs(rest, '\'');
    }

    let mut attrs = HashMap::new();
    for cap in QUOTED_ATTR_REGEX.captures_iter(rest) {
        attrs
            .entry(cap[1].to_string())
            .or_insert_with(|| restore(&cap[2]));
    }
    let masked = mask_quoted(rest);
    for cap in BARE_ATTR_REGEX.captures_iter(&masked) {
        attrs
            .entry(cap[1].to_string())
            .or_insert_with(|| restore(&cap[2]));
    }

    let value = rest.strip_prefix(':').and_then(|after| {
        let run: String = after
            .chars()
            .take_while(|c| !c.is_whitespace() && *c != '"' && *c != '\'')
            .collect();
        (!run.is_empty()).then(|| restore(&run))
    });

    Some(Tag {
        name,
        attrs,
        positional: positional.iter().map(|s| restore(s)).collect(),
        value,
    })
}

/// Byte index of the `>` closing a tag opened at `open`, skipping any `>`
/// inside a double-quoted run.
pub fn find_tag_end(line: &str, open: usize) -> Option<usize> {
    let mut in_quote = false;
    for (i, c) in line[open..].char_indices().skip(1) {
        match c {
            '"' => in_quote = !in_quote,
            '>' if !in_quote => return Some(open + i),
            _ => {}
        }
    }
    None
}

/// Quoted runs that are not the value of a `key:` pair.
fn quoted_runs(text: &str, quote: char) -> Vec<&str> {
    let mut runs = Vec::new();
    let mut search = 0;
    while let Some(rel) = text[search..].find(quote) {
        let open = search + rel;
        let body = open + quote.len_utf8();
        let Some(len) = text[body..].find(quote) else {
            break;
        };
        let close = body + len;
        if !KEY_SUFFIX_REGEX.is_match(&text[..open]) {
            runs.push(&text[body..close]);
        }
        search = close + quote.len_utf8();
    }
    runs
}

/// Blank the contents of double-quoted runs so bare pairs inside them are
/// not picked up.
fn mask_quoted(text: &str) -> String {
    let mut in_quote = false;
    text.chars()
        .map(|c| {
            if c == '"' {
                in_quote = !in_quote;
                c
            } else if in_quote {
                ' '
            } else {
                c
            }
        })
        .collect()
}
