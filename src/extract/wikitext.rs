//! Wikitext flattening
//!
//! Reduces MediaWiki markup to plain readable text: templates, tables,
//! references, and comments are dropped; links keep their display text;
//! formatting and heading markup is unwrapped. Nesting-sensitive constructs
//! (templates, tables, links) use depth scanners; the line- and tag-shaped
//! constructs use cached regexes.

use regex::Regex;
use std::sync::OnceLock;

static RE_NOWIKI: OnceLock<Regex> = OnceLock::new();
static RE_PRE: OnceLock<Regex> = OnceLock::new();
static RE_REF_EMPTY: OnceLock<Regex> = OnceLock::new();
static RE_REF_PAIR: OnceLock<Regex> = OnceLock::new();
static RE_EXTERNAL: OnceLock<Regex> = OnceLock::new();
static RE_EXTERNAL_BARE: OnceLock<Regex> = OnceLock::new();
static RE_HEADING: OnceLock<Regex> = OnceLock::new();
static RE_LIST: OnceLock<Regex> = OnceLock::new();
static RE_MAGIC: OnceLock<Regex> = OnceLock::new();

/// Flattens wikitext into plain text
#[derive(Debug, Default)]
pub struct WikiTextCleaner;

impl WikiTextCleaner {
    pub fn new() -> Self {
        Self
    }

    /// Flatten `wikitext` and trim surrounding whitespace.
    ///
    /// Returns an empty string when nothing readable survives, which the
    /// caller treats as "drop this page".
    pub fn clean(&self, wikitext: &str) -> String {
        let text = unwrap_nowiki(wikitext);
        let text = strip_comments(&text);
        let text = strip_refs(&text);
        let text = strip_delimited(&text, ('{', '|'), ('|', '}'));
        let text = strip_delimited(&text, ('{', '{'), ('}', '}'));
        let text = flatten_internal_links(&text);
        let text = flatten_external_links(&text);
        let text = strip_formatting(&text);
        collapse_whitespace(&text)
    }
}

/// Drop <nowiki> and <pre> tags but keep their content.
fn unwrap_nowiki(text: &str) -> String {
    let re_nowiki =
        RE_NOWIKI.get_or_init(|| Regex::new(r"(?is)<nowiki>(.*?)</nowiki>").unwrap());
    let text = re_nowiki.replace_all(text, "${1}");

    let re_pre = RE_PRE.get_or_init(|| Regex::new(r"(?is)<pre>(.*?)</pre>").unwrap());
    re_pre.replace_all(&text, "${1}").into_owned()
}

/// Remove HTML comments. An unterminated comment swallows the rest of the
/// text, matching how renderers treat it.
fn strip_comments(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find("<!--") {
        out.push_str(&rest[..start]);
        match rest[start + 4..].find("-->") {
            Some(end) => rest = &rest[start + 4 + end + 3..],
            None => return out,
        }
    }
    out.push_str(rest);
    out
}

/// Remove <ref .../> markers and <ref>...</ref> bodies, citations included.
fn strip_refs(text: &str) -> String {
    let re_empty = RE_REF_EMPTY.get_or_init(|| Regex::new(r"(?is)<ref[^>]*?/\s*>").unwrap());
    let text = re_empty.replace_all(text, "");

    let re_pair = RE_REF_PAIR.get_or_init(|| Regex::new(r"(?is)<ref[^>]*?>.*?</ref\s*>").unwrap());
    re_pair.replace_all(&text, "").into_owned()
}

/// Remove everything between a two-character opener and closer, tracking
/// nesting depth. Covers templates (`{{ }}`) and tables (`{| |}`).
fn strip_delimited(text: &str, open: (char, char), close: (char, char)) -> String {
    let mut out = String::with_capacity(text.len());
    let mut depth = 0usize;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if c == open.0 && chars.peek() == Some(&open.1) {
            depth += 1;
            chars.next();
        } else if c == close.0 && chars.peek() == Some(&close.1) {
            depth = depth.saturating_sub(1);
            chars.next();
        } else if depth == 0 {
            out.push(c);
        }
    }

    out
}

/// Replace `[[target]]` and `[[target|display]]` with their display text.
/// Category, file, image, and interwiki links vanish entirely.
fn flatten_internal_links(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '[' || chars.peek() != Some(&'[') {
            out.push(c);
            continue;
        }
        chars.next();

        let mut target = String::new();
        let mut depth = 1usize;
        while let Some(ch) = chars.next() {
            if ch == '[' && chars.peek() == Some(&'[') {
                depth += 1;
                chars.next();
                target.push_str("[[");
            } else if ch == ']' && chars.peek() == Some(&']') {
                depth -= 1;
                chars.next();
                if depth == 0 {
                    break;
                }
                target.push_str("]]");
            } else {
                target.push(ch);
            }
        }

        if link_is_hidden(&target) {
            continue;
        }
        let display = match target.find('|') {
            Some(pos) => &target[pos + 1..],
            None => target.as_str(),
        };
        out.push_str(display);
    }

    out
}

/// Links that carry no prose: namespaced media/category links and interwiki
/// links (a 2-3 letter language code before the colon).
fn link_is_hidden(target: &str) -> bool {
    let lower = target.to_lowercase();
    const HIDDEN: [&str; 6] = ["file:", "image:", "category:", "wikipedia:", "wikt:", "wp:"];
    if HIDDEN.iter().any(|prefix| lower.starts_with(prefix)) {
        return true;
    }
    match lower.find(':') {
        Some(pos) => (2..=3).contains(&pos) && lower[..pos].chars().all(|c| c.is_ascii_lowercase()),
        None => false,
    }
}

/// `[url text]` keeps the text, `[url]` keeps the bare url.
fn flatten_external_links(text: &str) -> String {
    let re = RE_EXTERNAL
        .get_or_init(|| Regex::new(r"\[https?://[^\s\]]+\s+([^\]]+)\]").unwrap());
    let text = re.replace_all(text, "${1}");

    let re_bare =
        RE_EXTERNAL_BARE.get_or_init(|| Regex::new(r"\[(https?://[^\s\]]+)\]").unwrap());
    re_bare.replace_all(&text, "${1}").into_owned()
}

/// Unwrap bold/italic quotes, headings, list markers, rules, magic words.
fn strip_formatting(text: &str) -> String {
    let mut result = text.replace("'''''", "");
    result = result.replace("'''", "");
    result = result.replace("''", "");

    let re_heading = RE_HEADING
        .get_or_init(|| Regex::new(r"(?m)^=+[ \t]*(.*?)[ \t]*=+[ \t]*$").unwrap());
    result = re_heading.replace_all(&result, "${1}").into_owned();

    let re_list = RE_LIST.get_or_init(|| Regex::new(r"(?m)^[*#:;]+[ \t]*").unwrap());
    result = re_list.replace_all(&result, "").into_owned();

    result = result.replace("----", "");

    let re_magic = RE_MAGIC.get_or_init(|| Regex::new(r"__[A-Z]+__").unwrap());
    re_magic.replace_all(&result, "").into_owned()
}

/// Collapse runs of spaces to one space and runs of blank lines to one blank
/// line; the result carries no leading or trailing whitespace.
fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut newlines = 0u32;
    let mut pending_space = false;

    for c in text.chars() {
        if c == '\n' {
            newlines += 1;
            pending_space = false;
        } else if c.is_whitespace() {
            pending_space = true;
        } else {
            if !out.is_empty() {
                if newlines > 0 {
                    out.push('\n');
                    if newlines > 1 {
                        out.push('\n');
                    }
                } else if pending_space {
                    out.push(' ');
                }
            }
            newlines = 0;
            pending_space = false;
            out.push(c);
        }
    }

    out
}
