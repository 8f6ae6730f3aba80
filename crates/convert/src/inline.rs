//! Inline HTML parsing and rendering for formatted run content
//!
//! Persisted string content may carry the four inline marks the editor
//! produces: `<strong>`/`<b>`, `<em>`/`<i>`, `<u>`, `<code>`. The parser
//! is a small by-hand tokenizer; unknown tags are dropped with their text
//! kept, and a mismatched close tag is a malformed-content error so the
//! caller can fall back to stripped text.

use crate::{ConvertError, Result};
use doc_model::{RunFormat, TextRun};
use regex_lite::Regex;

/// Quick check for tag-bearing content.
pub fn has_inline_markup(content: &str) -> bool {
    content.contains('<')
}

/// Parse a (possibly HTML-bearing) string into formatted runs.
///
/// Nested tags compose formats. Unclosed tags are tolerated (the format
/// runs to the end of the string); a close tag that does not match the
/// innermost open tag is an error.
pub fn parse_inline_html(content: &str) -> Result<Vec<TextRun>> {
    let mut runs: Vec<TextRun> = Vec::new();
    let mut stack: Vec<(String, RunFormat)> = Vec::new();
    let mut format = RunFormat::default();
    let mut buf = String::new();
    let mut chars = content.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if c != '<' {
            buf.push(c);
            continue;
        }
        let rest = &content[i + 1..];
        let Some(close) = rest.find('>') else {
            // dangling '<' is literal text
            buf.push(c);
            continue;
        };
        let tag = &rest[..close];
        if tag.is_empty() || tag.starts_with(char::is_whitespace) {
            // not a tag ("a < b"): keep the '<' as literal text
            buf.push(c);
            continue;
        }
        // advance past the tag body and the '>'
        for _ in 0..tag.chars().count() + 1 {
            chars.next();
        }
        let (closing, name) = match tag.strip_prefix('/') {
            Some(name) => (true, name.trim().to_ascii_lowercase()),
            None => (false, tag.trim().trim_end_matches('/').to_ascii_lowercase()),
        };
        let Some(flag) = format_flag(&name) else {
            // unknown tag: drop the tag, keep surrounding text
            continue;
        };
        flush(&mut runs, &mut buf, format);
        if closing {
            match stack.pop() {
                Some((open_name, prev)) if open_name == name => format = prev,
                _ => {
                    return Err(ConvertError::MalformedInline(format!(
                        "unexpected </{name}>"
                    )))
                }
            }
        } else {
            stack.push((name, format));
            apply_flag(&mut format, flag);
        }
    }
    flush(&mut runs, &mut buf, format);

    if runs.is_empty() {
        runs.push(TextRun::empty());
    }
    Ok(runs)
}

/// Render runs back to the persisted string form.
///
/// Plain runs render as-is; formatted runs wrap in canonical tags
/// (`<strong>`, `<em>`, `<u>`, `<code>`, outermost first in that order).
pub fn render_inline_html(runs: &[TextRun]) -> String {
    let mut out = String::new();
    for run in runs {
        let escaped = escape_text(&run.text);
        if run.format.is_plain() {
            out.push_str(&escaped);
            continue;
        }
        let mut open = String::new();
        let mut close = String::new();
        for (set, tag) in [
            (run.format.bold, "strong"),
            (run.format.italic, "em"),
            (run.format.underline, "u"),
            (run.format.code, "code"),
        ] {
            if set {
                open.push_str(&format!("<{tag}>"));
                close.insert_str(0, &format!("</{tag}>"));
            }
        }
        out.push_str(&open);
        out.push_str(&escaped);
        out.push_str(&close);
    }
    out
}

/// Strip every tag and decode entities; the malformed-content fallback.
pub fn strip_tags(content: &str) -> String {
    if let Ok(re) = Regex::new(r"<[^>]*>") {
        decode_entities(&re.replace_all(content, ""))
    } else {
        decode_entities(content)
    }
}

fn format_flag(name: &str) -> Option<u8> {
    match name {
        "strong" | "b" => Some(0),
        "em" | "i" => Some(1),
        "u" => Some(2),
        "code" => Some(3),
        _ => None,
    }
}

fn apply_flag(format: &mut RunFormat, flag: u8) {
    match flag {
        0 => format.bold = true,
        1 => format.italic = true,
        2 => format.underline = true,
        _ => format.code = true,
    }
}

fn flush(runs: &mut Vec<TextRun>, buf: &mut String, format: RunFormat) {
    if buf.is_empty() {
        return;
    }
    let text = decode_entities(buf);
    runs.push(TextRun::formatted(text, format));
    buf.clear();
}

fn decode_entities(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_one_run() {
        let runs = parse_inline_html("Hello world").unwrap();
        assert_eq!(runs, vec![TextRun::plain("Hello world")]);
    }

    #[test]
    fn tags_produce_formatted_runs() {
        let runs = parse_inline_html("a <strong>bold</strong> word").unwrap();
        assert_eq!(runs.len(), 3);
        assert_eq!(runs[1].text, "bold");
        assert!(runs[1].format.bold);
        assert!(runs[0].format.is_plain());
        assert!(runs[2].format.is_plain());
    }

    #[test]
    fn nested_tags_compose() {
        let runs = parse_inline_html("<em><b>x</b></em>").unwrap();
        assert_eq!(runs.len(), 1);
        assert!(runs[0].format.bold);
        assert!(runs[0].format.italic);
    }

    #[test]
    fn legacy_aliases_map_to_canonical_flags() {
        let runs = parse_inline_html("<b>x</b><i>y</i>").unwrap();
        assert!(runs[0].format.bold);
        assert!(runs[1].format.italic);
    }

    #[test]
    fn unknown_tags_keep_text() {
        let runs = parse_inline_html("<span>kept</span>").unwrap();
        assert_eq!(runs, vec![TextRun::plain("kept")]);
    }

    #[test]
    fn mismatched_close_is_malformed() {
        assert!(parse_inline_html("<strong>x</em>").is_err());
    }

    #[test]
    fn empty_content_yields_single_empty_run() {
        assert_eq!(parse_inline_html("").unwrap(), vec![TextRun::empty()]);
    }

    #[test]
    fn entities_decode_and_escape() {
        let runs = parse_inline_html("a &amp; b &lt;c&gt;").unwrap();
        assert_eq!(runs[0].text, "a & b <c>");
        assert_eq!(render_inline_html(&runs), "a &amp; b &lt;c&gt;");
    }

    #[test]
    fn render_round_trips_formatting() {
        let source = "plain <strong>bold</strong> <em><u>mix</u></em>";
        let runs = parse_inline_html(source).unwrap();
        let rendered = render_inline_html(&runs);
        let reparsed = parse_inline_html(&rendered).unwrap();
        assert_eq!(runs, reparsed);
    }

    #[test]
    fn bare_angle_brackets_stay_literal() {
        let runs = parse_inline_html("a < b > c").unwrap();
        assert_eq!(runs, vec![TextRun::plain("a < b > c")]);
    }

    #[test]
    fn strip_tags_removes_markup() {
        assert_eq!(strip_tags("<div>a <b>b</b></div>"), "a b");
    }
}
