use std::path::PathBuf;

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};
use storyloom_engine::authoring::{EditorSession, MenuKey, TriggerConfig};
use storyloom_engine::editing::{Document, RenderInline};
use storyloom_engine::models::EntitySnapshot;
use storyloom_engine::parsing::blocks::BlockKind;

/// Editor state behind the TUI: one document, its session and a status line.
pub struct App {
    session: EditorSession,
    output: Option<PathBuf>,
    pub status: String,
}

impl App {
    pub fn new(
        document: Document,
        directory: EntitySnapshot,
        triggers: TriggerConfig,
        page_size: usize,
        output: Option<PathBuf>,
    ) -> Self {
        let status = if document.is_opaque() {
            "Stored text could not be decoded; showing it verbatim".to_string()
        } else {
            format!("{} entities loaded", directory.len())
        };
        let mut session = EditorSession::with_config(document, directory, triggers, page_size);
        session.focus(true);
        Self {
            session,
            output,
            status,
        }
    }

    pub fn session(&self) -> &EditorSession {
        &self.session
    }

    /// Handles one key press. Returns `Ok(false)` when the app should quit.
    pub fn handle_key(&mut self, key: KeyEvent) -> Result<bool> {
        let menu_open = self.session.menu().is_some();
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('q') => return Ok(false),
                KeyCode::Char('s') => self.save()?,
                _ => {}
            }
            return Ok(true);
        }

        match key.code {
            KeyCode::Esc if menu_open => {
                self.session.key(MenuKey::Escape)?;
            }
            KeyCode::Esc => return Ok(false),
            KeyCode::Up if menu_open => {
                self.session.key(MenuKey::Up)?;
            }
            KeyCode::Down if menu_open => {
                self.session.key(MenuKey::Down)?;
            }
            KeyCode::Enter | KeyCode::Tab if menu_open => {
                if self.session.key(MenuKey::Enter)?.is_some() {
                    self.status = "Inserted".to_string();
                }
            }
            KeyCode::Enter => {
                self.session.type_text("\n");
            }
            KeyCode::Backspace => {
                self.session.backspace();
            }
            KeyCode::Left => self.step_cursor(false),
            KeyCode::Right => self.step_cursor(true),
            KeyCode::Home => self.session.set_cursor(0),
            KeyCode::End => self.session.set_cursor(self.session.document().len()),
            KeyCode::Char(c) => {
                self.session.type_text(c.encode_utf8(&mut [0; 4]));
            }
            _ => {}
        }
        Ok(true)
    }

    fn step_cursor(&mut self, forward: bool) {
        let text = self.session.document().canonical();
        let cursor = self.session.document().cursor();
        let next = if forward {
            text[cursor..]
                .chars()
                .next()
                .map_or(cursor, |c| cursor + c.len_utf8())
        } else {
            text[..cursor]
                .chars()
                .next_back()
                .map_or(cursor, |c| cursor - c.len_utf8())
        };
        self.session.set_cursor(next);
    }

    fn save(&mut self) -> Result<()> {
        match &self.output {
            Some(path) => {
                std::fs::write(path, self.session.document().to_bytes())?;
                log::info!("saved {}", path.display());
                self.status = format!("Saved {}", path.display());
            }
            None => self.status = "No output file given".to_string(),
        }
        Ok(())
    }

    /// Canonical text split into lines, with a bar at the cursor.
    pub fn source_lines(&self) -> Vec<String> {
        let mut text = self.session.document().canonical();
        text.insert(self.session.document().cursor(), '│');
        text.split('\n').map(str::to_string).collect()
    }

    /// Menu rows as `(label, kind, selected)`.
    pub fn menu_rows(&self) -> Vec<(String, String, bool)> {
        let Some(menu) = self.session.menu() else {
            return Vec::new();
        };
        menu.items()
            .iter()
            .enumerate()
            .map(|(i, c)| (c.label.clone(), c.kind.clone(), i == menu.selected()))
            .collect()
    }

    /// The document as a reader sees it, references shown by live label.
    pub fn preview_lines(&self) -> Vec<Line<'static>> {
        self.session
            .snapshot()
            .blocks
            .into_iter()
            .map(|block| {
                let mut spans = match block.kind {
                    BlockKind::Heading { level } => vec![Span::styled(
                        format!("{} ", "#".repeat(level as usize)),
                        Style::default().fg(Color::Yellow),
                    )],
                    BlockKind::ListItem { indent } => {
                        vec![Span::raw(format!("{}• ", " ".repeat(indent)))]
                    }
                    BlockKind::Rule => vec![Span::raw("────────")],
                    BlockKind::Blank | BlockKind::Paragraph => vec![],
                    BlockKind::Opaque => {
                        return Line::from(Span::styled(
                            block.content,
                            Style::default().fg(Color::DarkGray),
                        ));
                    }
                };
                push_inlines(&block.inlines, Style::default(), &mut spans);
                Line::from(spans)
            })
            .collect()
    }
}

fn push_inlines(inlines: &[RenderInline], style: Style, out: &mut Vec<Span<'static>>) {
    for inline in inlines {
        match inline {
            RenderInline::Text(text) => out.push(Span::styled(text.clone(), style)),
            RenderInline::Reference {
                entity_id, label, ..
            } => {
                let color = if entity_id.is_some() {
                    Color::Cyan
                } else {
                    Color::Red
                };
                out.push(Span::styled(label.clone(), style.fg(color)));
            }
            RenderInline::Emphasis { children, .. } => {
                push_inlines(children, style.add_modifier(Modifier::BOLD), out);
            }
        }
    }
}
