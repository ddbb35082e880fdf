use std::ops::Range;

use crate::error::AuthoringError;
use crate::parsing::blocks::LineClassifier;
use crate::render::markup::{close_list, write_line, write_undecided};

/// One item of a generation stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    Fragment(String),
    Error(String),
    End,
}

/// Append-only raw text plus how much of it has been turned into markup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamBuffer {
    raw: String,
    committed: usize,
}

impl StreamBuffer {
    pub fn push(&mut self, fragment: &str) {
        self.raw.push_str(fragment);
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Bytes of `raw` already committed.
    pub fn committed(&self) -> usize {
        self.committed
    }

    /// Text after the last committed newline.
    pub fn tail(&self) -> &str {
        &self.raw[self.committed..]
    }

    /// Next newline-terminated line (without the `\n`), advancing the cursor.
    fn next_line(&mut self) -> Option<Range<usize>> {
        let nl = self.tail().find('\n')?;
        let line = self.committed..self.committed + nl;
        self.committed += nl + 1;
        Some(line)
    }

    fn take_tail(&mut self) -> Range<usize> {
        let tail = self.committed..self.raw.len();
        self.committed = self.raw.len();
        tail
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Phase {
    Streaming,
    Finished,
    Failed(String),
}

/// Incremental markdown-to-markup renderer for generated text.
///
/// Only complete lines are committed; the line still being written is
/// rendered provisionally in [`current_markup`](Self::current_markup) and
/// re-rendered on every fragment. Chunk boundaries never change the result.
///
/// ```rust
/// # use storyloom_engine::render::StreamRenderer;
/// let mut r = StreamRenderer::new();
/// for chunk in ["# Tit", "le\n", "body"] {
///     r.feed(chunk);
/// }
/// assert_eq!(r.finish(), "<h1>Title</h1><p>body</p>");
/// ```
#[derive(Debug, Clone)]
pub struct StreamRenderer {
    buffer: StreamBuffer,
    committed_markup: String,
    in_list: bool,
    phase: Phase,
}

impl Default for StreamRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamRenderer {
    pub fn new() -> Self {
        Self {
            buffer: StreamBuffer::default(),
            committed_markup: String::new(),
            in_list: false,
            phase: Phase::Streaming,
        }
    }

    pub fn feed(&mut self, fragment: &str) {
        if self.phase != Phase::Streaming {
            log::debug!("dropping fragment after stream closed");
            return;
        }
        self.buffer.push(fragment);
        while let Some(line) = self.buffer.next_line() {
            let text = &self.buffer.raw()[line];
            let class = LineClassifier.classify(text);
            write_line(text, &class, &mut self.in_list, &mut self.committed_markup);
        }
    }

    /// Flushes the partial last line and closes any open list.
    pub fn finish(&mut self) -> String {
        if self.phase == Phase::Streaming {
            let tail = self.buffer.take_tail();
            let text = &self.buffer.raw()[tail];
            // a closing `\n` leaves an empty last line, which renders as a blank
            if !self.buffer.raw().is_empty() {
                let class = LineClassifier.classify(text);
                write_line(text, &class, &mut self.in_list, &mut self.committed_markup);
            }
            close_list(&mut self.in_list, &mut self.committed_markup);
            self.phase = Phase::Finished;
        }
        self.current_markup()
    }

    /// Stops rendering on a stream error. Nothing from the error is written.
    pub fn fail(&mut self, message: impl Into<String>) -> AuthoringError {
        let message = message.into();
        log::warn!("generation stream failed: {message}");
        if self.phase == Phase::Streaming {
            self.phase = Phase::Failed(message.clone());
        }
        AuthoringError::Collaborator(message)
    }

    /// Routes one stream event. Returns `Ok(true)` once the stream is over.
    pub fn handle(&mut self, event: StreamEvent) -> Result<bool, AuthoringError> {
        match event {
            StreamEvent::Fragment(text) => {
                self.feed(&text);
                Ok(false)
            }
            StreamEvent::End => {
                self.finish();
                Ok(true)
            }
            StreamEvent::Error(message) => Err(self.fail(message)),
        }
    }

    /// Committed markup plus a provisional render of the partial line.
    pub fn current_markup(&self) -> String {
        let mut out = self.committed_markup.clone();
        if self.phase == Phase::Finished {
            return out;
        }
        let mut in_list = self.in_list;
        let tail = self.buffer.tail();
        match LineClassifier.classify_partial(tail) {
            Some(class) => write_line(tail, &class, &mut in_list, &mut out),
            None => write_undecided(tail, &mut in_list, &mut out),
        }
        close_list(&mut in_list, &mut out);
        out
    }

    /// Markup that will never be rewritten.
    pub fn committed_markup(&self) -> &str {
        &self.committed_markup
    }

    /// Raw text received so far.
    pub fn text(&self) -> &str {
        self.buffer.raw()
    }

    pub fn buffer(&self) -> &StreamBuffer {
        &self.buffer
    }

    pub fn is_finished(&self) -> bool {
        self.phase == Phase::Finished
    }

    pub fn error(&self) -> Option<&str> {
        match &self.phase {
            Phase::Failed(message) => Some(message),
            _ => None,
        }
    }
}

/// Renders a complete text in one go.
pub fn render_markdown(text: &str) -> String {
    let mut renderer = StreamRenderer::new();
    renderer.feed(text);
    renderer.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = "# Chapter One\n\nThe *rain* fell on **[[location:Harbor]]**.\n- first\n  * second\n---\n## Aftermath\n__Quiet__ & _still_ <again>";

    #[test]
    fn heading_then_body_scenario() {
        let mut r = StreamRenderer::new();
        r.feed("# Tit");
        r.feed("le\n");
        r.feed("body");
        insta::assert_snapshot!(r.finish(), @"<h1>Title</h1><p>body</p>");
    }

    #[test]
    fn one_fragment_equals_char_by_char() {
        let whole = render_markdown(SAMPLE);

        let mut r = StreamRenderer::new();
        for c in SAMPLE.chars() {
            r.feed(&c.to_string());
        }
        assert_eq!(r.finish(), whole);
    }

    #[test]
    fn full_sample() {
        insta::assert_snapshot!(
            render_markdown(SAMPLE),
            @"<h1>Chapter One</h1><br><p>The <em>rain</em> fell on <strong>[[location:Harbor]]</strong>.</p><ul><li>first</li><li>second</li></ul><hr><h2>Aftermath</h2><p><strong>Quiet</strong> &amp; <em>still</em> &lt;again&gt;</p>"
        );
    }

    #[test]
    fn committed_markup_only_grows() {
        let mut r = StreamRenderer::new();
        let mut last = 0;
        for c in SAMPLE.chars() {
            r.feed(&c.to_string());
            let now = r.committed_markup().len();
            assert!(now >= last);
            last = now;
        }
    }

    #[test]
    fn partial_line_is_provisional() {
        let mut r = StreamRenderer::new();
        r.feed("# Tit");
        assert_eq!(r.committed_markup(), "");
        assert_eq!(r.current_markup(), "<h1>Tit</h1>");
        assert_eq!(r.buffer().committed(), 0);
    }

    #[test]
    fn undecided_tail_is_plain_text() {
        let mut r = StreamRenderer::new();
        r.feed("intro\n#");
        assert_eq!(r.current_markup(), "<p>intro</p><p>#</p>");
        r.feed(" Head");
        assert_eq!(r.current_markup(), "<p>intro</p><h1>Head</h1>");
    }

    #[test]
    fn open_list_is_closed_in_preview() {
        let mut r = StreamRenderer::new();
        r.feed("- one\n- tw");
        assert_eq!(r.committed_markup(), "<ul><li>one</li>");
        assert_eq!(r.current_markup(), "<ul><li>one</li><li>tw</li></ul>");
        r.feed("o\nafter");
        assert_eq!(
            r.current_markup(),
            "<ul><li>one</li><li>two</li></ul><p>after</p>"
        );
    }

    #[test]
    fn trailing_newline_renders_final_blank_line() {
        assert_eq!(render_markdown("text\n"), "<p>text</p><br>");
        assert_eq!(render_markdown("- a\n"), "<ul><li>a</li></ul><br>");
        assert_eq!(render_markdown(""), "");

        let mut r = StreamRenderer::new();
        r.feed("text\n");
        assert_eq!(r.current_markup(), "<p>text</p>");
        assert_eq!(r.finish(), "<p>text</p><br>");
    }

    #[test]
    fn empty_emphasis_pair_stays_literal() {
        assert_eq!(render_markdown("****"), "<p>****</p>");
        assert_eq!(render_markdown("a **** b __ c"), "<p>a **** b __ c</p>");
    }

    #[test]
    fn error_stops_rendering() {
        let mut r = StreamRenderer::new();
        assert_eq!(r.handle(StreamEvent::Fragment("kept\n".into())), Ok(false));
        let err = r.handle(StreamEvent::Error("quota exceeded".into())).unwrap_err();
        assert_eq!(err, AuthoringError::Collaborator("quota exceeded".into()));
        r.feed("ignored\n");
        assert_eq!(r.committed_markup(), "<p>kept</p>");
        assert_eq!(r.error(), Some("quota exceeded"));
        assert!(!r.current_markup().contains("quota"));
    }

    #[test]
    fn end_event_finishes() {
        let mut r = StreamRenderer::new();
        r.handle(StreamEvent::Fragment("- a".into())).unwrap();
        assert_eq!(r.handle(StreamEvent::End), Ok(true));
        assert!(r.is_finished());
        assert_eq!(r.current_markup(), "<ul><li>a</li></ul>");
    }

    #[test]
    fn crlf_lines() {
        assert_eq!(
            render_markdown("# A\r\n- b\r\n"),
            "<h1>A</h1><ul><li>b</li></ul><br>"
        );
    }
}
