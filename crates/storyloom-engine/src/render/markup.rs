use std::sync::LazyLock;

use regex::Regex;

use crate::parsing::blocks::{LineClass, LineKind};

/// Emphasis substitutions, applied in order to already escaped text.
///
/// Content may not contain its own delimiter, so empty pairs such as `****`
/// stay literal.
static EMPHASIS: LazyLock<[(Regex, &'static str); 5]> = LazyLock::new(|| {
    let re = |pattern: &str| Regex::new(pattern).expect("invalid emphasis regex");
    [
        (re(r"\*\*\*([^*]+?)\*\*\*"), "<strong><em>$1</em></strong>"),
        (re(r"\*\*([^*]+?)\*\*"), "<strong>$1</strong>"),
        (re(r"\*([^*]+?)\*"), "<em>$1</em>"),
        (re(r"__([^_]+?)__"), "<strong>$1</strong>"),
        (re(r"_([^_]+?)_"), "<em>$1</em>"),
    ]
});

/// Escapes text and applies emphasis.
pub fn render_inline(text: &str) -> String {
    let mut out = html_escape::encode_text(text).into_owned();
    for (re, replacement) in EMPHASIS.iter() {
        out = re.replace_all(&out, *replacement).into_owned();
    }
    out
}

/// Writes one classified line. `in_list` tracks whether a `<ul>` is open
/// across calls.
pub(crate) fn write_line(line: &str, class: &LineClass, in_list: &mut bool, out: &mut String) {
    let body = line.strip_suffix('\r').unwrap_or(line);
    let content = &body[class.content.clone()];

    if !matches!(class.kind, LineKind::ListItem { .. }) {
        close_list(in_list, out);
    }
    match class.kind {
        LineKind::Rule => out.push_str("<hr>"),
        LineKind::Heading { level } => {
            out.push_str(&format!("<h{level}>{}</h{level}>", render_inline(content)));
        }
        LineKind::ListItem { .. } => {
            if !*in_list {
                out.push_str("<ul>");
                *in_list = true;
            }
            out.push_str(&format!("<li>{}</li>", render_inline(content)));
        }
        LineKind::Blank => out.push_str("<br>"),
        LineKind::Paragraph => {
            out.push_str(&format!("<p>{}</p>", render_inline(content)));
        }
    }
}

/// Writes a line whose kind is not decided yet as plain escaped text.
pub(crate) fn write_undecided(line: &str, in_list: &mut bool, out: &mut String) {
    if line.trim().is_empty() {
        return;
    }
    close_list(in_list, out);
    out.push_str(&format!("<p>{}</p>", html_escape::encode_text(line)));
}

pub(crate) fn close_list(in_list: &mut bool, out: &mut String) {
    if *in_list {
        out.push_str("</ul>");
        *in_list = false;
    }
}
