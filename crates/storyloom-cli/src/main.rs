mod app;

use anyhow::{Context, Result, bail};
use app::App;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
};
use std::{
    env,
    io::{Read, Stdout, stdout},
    path::{Path, PathBuf},
    process,
};
use storyloom_config::Config;
use storyloom_engine::{
    Document, EntitySnapshot, StreamRenderer, TriggerConfig,
    render::{SseDecoder, StreamEvent},
};

const USAGE: &str = "Usage:
  storyloom-cli [document]            edit a brief with reference and command menus
  storyloom-cli render <file> [chunk] stream a markdown file through the renderer
  storyloom-cli replay <file>         render a recorded `data: {...}` event stream";

fn main() -> Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();

    match args.first().map(String::as_str) {
        Some("render") => {
            init_logging(log::LevelFilter::Info);
            let path = args.get(1).context(USAGE)?;
            let chunk = match args.get(2) {
                Some(n) => n.parse().context("chunk must be a positive number")?,
                None => 1,
            };
            println!("{}", render_file(Path::new(path), chunk)?);
            Ok(())
        }
        Some("replay") => {
            init_logging(log::LevelFilter::Info);
            let path = args.get(1).context(USAGE)?;
            println!("{}", replay_file(Path::new(path))?);
            Ok(())
        }
        Some("-h" | "--help") => {
            println!("{USAGE}");
            Ok(())
        }
        _ if args.len() > 1 => {
            eprintln!("{USAGE}");
            process::exit(1);
        }
        document => {
            // log output would tear the alternate screen
            init_logging(log::LevelFilter::Warn);
            run_editor(document.map(PathBuf::from))
        }
    }
}

fn init_logging(level: log::LevelFilter) {
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();
}

/// Feeds a file to the renderer `chunk` chars at a time.
fn render_file(path: &Path, chunk: usize) -> Result<String> {
    if chunk == 0 {
        bail!("chunk must be a positive number");
    }
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let chars: Vec<char> = text.chars().collect();
    let mut renderer = StreamRenderer::new();
    for part in chars.chunks(chunk) {
        renderer.feed(&part.iter().collect::<String>());
    }
    Ok(renderer.finish())
}

/// Decodes a recorded event stream and renders its fragments.
fn replay_file(path: &Path) -> Result<String> {
    let mut raw = String::new();
    std::fs::File::open(path)
        .and_then(|mut f| f.read_to_string(&mut raw))
        .with_context(|| format!("reading {}", path.display()))?;

    let mut decoder = SseDecoder::default();
    let mut events = decoder.push(&raw);
    events.extend(decoder.finish());
    events.push(StreamEvent::End);

    let mut renderer = StreamRenderer::new();
    for event in events {
        if renderer.handle(event)? {
            break;
        }
    }
    Ok(renderer.current_markup())
}

fn load_directory(config: Option<&Config>) -> Result<EntitySnapshot> {
    let Some(config) = config else {
        return Ok(EntitySnapshot::default());
    };
    let path = &config.bible_path;
    if !path.exists() {
        log::warn!("bible file {} not found, starting empty", path.display());
        return Ok(EntitySnapshot::default());
    }
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading bible file {}", path.display()))?;
    EntitySnapshot::from_json(&json)
        .with_context(|| format!("parsing bible file {}", path.display()))
}

fn run_editor(document_path: Option<PathBuf>) -> Result<()> {
    let config_path = Config::config_path();
    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: Failed to load config file: {e}");
            eprintln!("Config is read from {}", config_path.display());
            process::exit(1);
        }
    };

    let directory = load_directory(config.as_ref())?;
    let triggers = config.as_ref().map_or_else(TriggerConfig::default, |c| TriggerConfig {
        reference: c.reference_trigger,
        command: c.command_trigger,
    });
    let page_size = config.as_ref().map_or(5, |c| c.page_size);

    let document = match &document_path {
        Some(path) if path.exists() => {
            let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
            Document::load(&bytes, &directory)
        }
        _ => Document::from_canonical("", &directory),
    };

    let mut app = App::new(document, directory, triggers, page_size, document_path);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{err:?}");
    }

    Ok(())
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
            && !app.handle_key(key)?
        {
            return Ok(());
        }
    }
}

fn ui(f: &mut Frame, app: &App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(f.area());
    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .margin(1)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[0]);

    let source: Vec<Line> = app.source_lines().into_iter().map(Line::from).collect();
    let source_height = source.len();
    let editor = Paragraph::new(source)
        .block(Block::default().borders(Borders::ALL).title("Brief"))
        .wrap(Wrap { trim: false });
    f.render_widget(editor, panes[0]);

    let preview = Paragraph::new(app.preview_lines())
        .block(Block::default().borders(Borders::ALL).title("Preview"))
        .wrap(Wrap { trim: false });
    f.render_widget(preview, panes[1]);

    let menu = app.menu_rows();
    if !menu.is_empty() {
        let items: Vec<ListItem> = menu
            .iter()
            .map(|(label, kind, selected)| {
                let style = if *selected {
                    Style::default().bg(Color::Yellow).fg(Color::Black)
                } else {
                    Style::default()
                };
                ListItem::new(Line::from(vec![
                    Span::styled(label.clone(), style),
                    Span::styled(format!("  {kind}"), Style::default().fg(Color::DarkGray)),
                ]))
            })
            .collect();
        let area = popup_area(panes[0], source_height as u16 + 1, menu.len() as u16 + 2);
        f.render_widget(Clear, area);
        f.render_widget(
            List::new(items).block(Block::default().borders(Borders::ALL)),
            area,
        );
    }

    let help = Line::from(vec![
        Span::raw("Ctrl-Q/Esc: Quit | Ctrl-S: Save | ↑↓ Enter: Menu | "),
        Span::styled(app.status.clone(), Style::default().fg(Color::Green)),
    ]);
    f.render_widget(Paragraph::new(help), rows[1]);
}

/// Area just below the last source line, clipped to the editor pane.
fn popup_area(pane: Rect, below: u16, height: u16) -> Rect {
    let y = (pane.y + below).min(pane.bottom().saturating_sub(height));
    Rect {
        x: pane.x + 2,
        y,
        width: pane.width.saturating_sub(4).min(40),
        height: height.min(pane.height),
    }
}
