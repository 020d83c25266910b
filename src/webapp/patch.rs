//! Entry document title rewriting
//!
//! Pattern-based, not a DOM parser: only the touched region changes, every
//! other byte of the document is kept as-is.
//!
//! Title rule, first match wins:
//! 1. replace the first `<title>...</title>` (case-insensitive, may span lines)
//! 2. insert `<title>` before the first `</head>`
//! 3. prepend `<head><title>...</title></head>`

use regex::Regex;
use std::ops::Range;
use std::sync::OnceLock;

const SCRIPT_HEAD: &str = "<script>(function(){var t='";
const SCRIPT_TAIL: &str = "';function setTitle(){try{document.title=t;}catch(e){}}\
if(document.readyState==='loading'){document.addEventListener('DOMContentLoaded',setTitle);}\
else{setTitle();}window.addEventListener('load',setTitle);})();</script>";

/// Result of applying the title rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchResult {
    pub html: String,
    /// False when the document already carried this exact title
    pub changed: bool,
}

fn title_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?is)<title>.*?</title>").expect("valid title pattern"))
}

fn head_close_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?i)</head>").expect("valid head pattern"))
}

/// Apply the title rule. Used for the one-time on-disk patch and as the first
/// step of the per-request rewrite.
pub fn patch(html: &str, title: &str) -> PatchResult {
    let element = format!("<title>{title}</title>");
    let patched = match title_pattern().find(html) {
        Some(m) => splice(html, m.range(), &element),
        None => insert_into_head(html, &element),
    };
    let changed = patched != html;
    PatchResult {
        html: patched,
        changed,
    }
}

/// Title rule followed by the runtime-enforcement script.
///
/// The script re-applies the title after `DOMContentLoaded` and `load`, for
/// SPA frameworks that overwrite `document.title` during their own render.
pub fn patch_for_response(html: &str, title: &str) -> String {
    let patched = patch(html, title).html;
    insert_into_head(&patched, &runtime_title_script(title))
}

/// Inline `<script>` that forces `document.title` on the client
pub fn runtime_title_script(title: &str) -> String {
    let escaped = escape_js_string(title);
    let mut script = String::with_capacity(SCRIPT_HEAD.len() + escaped.len() + SCRIPT_TAIL.len());
    script.push_str(SCRIPT_HEAD);
    script.push_str(&escaped);
    script.push_str(SCRIPT_TAIL);
    script
}

/// Escape text for a single-quoted JS string literal inside an inline script.
///
/// `<` is written as `\x3C` so the title can never close the `<script>` element.
pub fn escape_js_string(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() + 8);
    for c in raw.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            '<' => out.push_str("\\x3C"),
            _ => out.push(c),
        }
    }
    out
}

/// Insert `fragment` right before the first `</head>`, or prepend a minimal head
fn insert_into_head(html: &str, fragment: &str) -> String {
    match head_close_pattern().find(html) {
        Some(m) => splice(html, m.start()..m.start(), fragment),
        None => {
            let mut out = String::with_capacity(html.len() + fragment.len() + 13);
            out.push_str("<head>");
            out.push_str(fragment);
            out.push_str("</head>");
            out.push_str(html);
            out
        }
    }
}

// Literal splice; the replacement is never interpreted as a regex template
fn splice(html: &str, range: Range<usize>, replacement: &str) -> String {
    let mut out = String::with_capacity(html.len() - range.len() + replacement.len());
    out.push_str(&html[..range.start]);
    out.push_str(replacement);
    out.push_str(&html[range.end..]);
    out
}
