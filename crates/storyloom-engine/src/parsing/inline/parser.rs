use crate::parsing::rope::span::Span;

use super::{
    cursor::Cursor,
    kinds::{Emphasis, Reference},
    types::InlineNode,
};

/// Parses one line of inline content into [`InlineNode`]s.
///
/// # Arguments
/// - `base`: Byte offset where `s` begins in the document
/// - `s`: The content to parse (a block's content span)
///
/// # Precedence
/// References are tried before emphasis at every position, and an emphasis
/// closer is never searched for inside a reference, so a `*` in an entity
/// name cannot split a token.
///
/// Malformed references (`[[NoSeparator]]`, `[[:Name]]`, unclosed) are
/// plain text.
pub fn parse_inline(base: usize, s: &str) -> Vec<InlineNode> {
    let mut cur = Cursor::new(s, base);
    let mut out = vec![];
    let mut text_start = cur.pos();

    fn flush_text(out: &mut Vec<InlineNode>, start: usize, end: usize) {
        if end > start {
            out.push(InlineNode::Text(Span { start, end }));
        }
    }

    while !cur.eof() {
        let node = try_parse_reference(&mut cur).or_else(|| try_parse_emphasis(&mut cur));
        if let Some(node) = node {
            let span = node.span();
            flush_text(&mut out, text_start, span.start);
            text_start = span.end;
            out.push(node);
            continue;
        }
        cur.bump();
    }

    flush_text(&mut out, text_start, cur.pos());
    out
}

/// Attempts to parse `[[type:name]]` at the current position.
///
/// On failure the cursor is restored and `None` returned.
fn try_parse_reference(cur: &mut Cursor<'_>) -> Option<InlineNode> {
    if !cur.starts_with(Reference::OPEN) {
        return None;
    }

    let saved = cur.clone();
    let parsed = scan_reference(cur);
    if parsed.is_none() {
        *cur = saved;
    }
    parsed
}

fn scan_reference(cur: &mut Cursor<'_>) -> Option<InlineNode> {
    let start = cur.pos();
    cur.bump_n(Reference::OPEN.len());

    let type_start = cur.pos();
    loop {
        match cur.peek()? {
            Reference::SEP => break,
            b'[' | b']' | b'\n' | b'\r' => return None,
            _ => {
                cur.bump();
            }
        }
    }
    let type_end = cur.pos();
    if type_end == type_start {
        return None;
    }
    cur.bump(); // :

    let name_start = cur.pos();
    while !cur.starts_with(Reference::CLOSE) {
        match cur.peek()? {
            b'[' | b']' | b'\n' | b'\r' => return None,
            _ => {
                cur.bump();
            }
        }
    }
    let name_end = cur.pos();
    if name_end == name_start {
        return None;
    }
    cur.bump_n(Reference::CLOSE.len());

    Some(InlineNode::Reference {
        full: Span {
            start,
            end: cur.pos(),
        },
        entity_type: Span {
            start: type_start,
            end: type_end,
        },
        name: Span {
            start: name_start,
            end: name_end,
        },
    })
}

/// Attempts to parse emphasis at the current position, longest delimiter first.
fn try_parse_emphasis(cur: &mut Cursor<'_>) -> Option<InlineNode> {
    if !cur.peek().is_some_and(Emphasis::starts_delimiter) {
        return None;
    }

    for (delim, style) in Emphasis::DELIMITERS {
        if !cur.starts_with(delim.as_bytes()) {
            continue;
        }
        let start = cur.pos();
        let inner_start = start + delim.len();
        let Some(inner_end) = find_closer(cur, inner_start, delim) else {
            continue;
        };
        if inner_end == inner_start {
            continue;
        }

        let end = inner_end + delim.len();
        let children = parse_inline(inner_start, cur.slice(inner_start, inner_end));
        cur.bump_n(end - start);
        return Some(InlineNode::Emphasis {
            full: Span { start, end },
            inner: Span {
                start: inner_start,
                end: inner_end,
            },
            style,
            children,
        });
    }
    None
}

/// Finds the absolute start of the closing delimiter, skipping whole references.
fn find_closer(cur: &Cursor<'_>, from: usize, delim: &str) -> Option<usize> {
    let mut ahead = cur.clone();
    ahead.bump_n(from - cur.pos());
    while !ahead.eof() {
        if let Some(reference) = try_parse_reference(&mut ahead) {
            debug_assert_eq!(reference.span().end, ahead.pos());
            continue;
        }
        if ahead.starts_with(delim.as_bytes()) {
            return Some(ahead.pos());
        }
        ahead.bump();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::inline::kinds::EmphasisStyle;

    fn text_of<'a>(s: &'a str, sp: Span) -> &'a str {
        &s[sp.start..sp.end]
    }

    #[test]
    fn parse_plain_text() {
        let nodes = parse_inline(0, "hello world");
        assert_eq!(nodes, vec![InlineNode::Text(Span { start: 0, end: 11 })]);
    }

    #[test]
    fn parse_reference() {
        let s = "Hello [[character:Elara]] ";
        let nodes = parse_inline(0, s);
        assert_eq!(nodes.len(), 3);
        match &nodes[1] {
            InlineNode::Reference {
                full,
                entity_type,
                name,
            } => {
                assert_eq!(text_of(s, *full), "[[character:Elara]]");
                assert_eq!(text_of(s, *entity_type), "character");
                assert_eq!(text_of(s, *name), "Elara");
            }
            other => panic!("expected Reference, got {other:?}"),
        }
    }

    #[test]
    fn reference_spans_are_offset_by_base() {
        let nodes = parse_inline(100, "[[location:Crystal Cave]]");
        assert_eq!(nodes[0].span(), Span { start: 100, end: 125 });
    }

    #[test]
    fn malformed_references_are_text() {
        for s in [
            "[[NoSeparator]]",
            "[[:Elara]]",
            "[[character:]]",
            "[[character:Elara",
            "[[char[acter:Elara]]",
        ] {
            let nodes = parse_inline(0, s);
            assert!(
                nodes.iter().all(|n| matches!(n, InlineNode::Text(_))),
                "{s:?} parsed as {nodes:?}"
            );
        }
    }

    #[test]
    fn extra_opening_bracket_stays_text() {
        let s = "[[[character:Elara]]";
        let nodes = parse_inline(0, s);
        assert_eq!(nodes.len(), 2);
        assert_eq!(text_of(s, nodes[0].span()), "[");
        assert!(matches!(nodes[1], InlineNode::Reference { .. }));
    }

    #[test]
    fn emphasis_precedence() {
        let s = "***both*** **bold** *it* __b__ _i_";
        let styles: Vec<_> = parse_inline(0, s)
            .into_iter()
            .filter_map(|n| match n {
                InlineNode::Emphasis { style, .. } => Some(style),
                _ => None,
            })
            .collect();
        assert_eq!(
            styles,
            [
                EmphasisStyle::BoldItalic,
                EmphasisStyle::Bold,
                EmphasisStyle::Italic,
                EmphasisStyle::Bold,
                EmphasisStyle::Italic,
            ]
        );
    }

    #[test]
    fn empty_delimiter_pair_is_text() {
        let nodes = parse_inline(0, "****");
        assert_eq!(nodes, vec![InlineNode::Text(Span { start: 0, end: 4 })]);
    }

    #[test]
    fn reference_inside_emphasis() {
        let s = "**[[character:Elara]]**";
        let nodes = parse_inline(0, s);
        assert_eq!(nodes.len(), 1);
        match &nodes[0] {
            InlineNode::Emphasis {
                style, children, ..
            } => {
                assert_eq!(*style, EmphasisStyle::Bold);
                assert!(matches!(children[0], InlineNode::Reference { .. }));
            }
            other => panic!("expected Emphasis, got {other:?}"),
        }
    }

    #[test]
    fn emphasis_closer_is_not_found_inside_reference() {
        let s = "*see [[character:A*B]]";
        let nodes = parse_inline(0, s);
        assert!(nodes.iter().any(|n| matches!(n, InlineNode::Reference { .. })));
        assert!(!nodes.iter().any(|n| matches!(n, InlineNode::Emphasis { .. })));
    }

    #[test]
    fn spans_tile_the_input() {
        let s = "A *quiet* walk to [[location:Harbor]] with __[[character:Elara]]__.";
        let nodes = parse_inline(0, s);
        let rebuilt: String = nodes.iter().map(|n| text_of(s, n.span())).collect();
        assert_eq!(rebuilt, s);
    }

    #[test]
    fn unicode_text_survives() {
        let s = "Zoë met [[character:Ælfric]] — twice";
        let nodes = parse_inline(0, s);
        let rebuilt: String = nodes.iter().map(|n| text_of(s, n.span())).collect();
        assert_eq!(rebuilt, s);
        assert_eq!(nodes.len(), 3);
    }
}
