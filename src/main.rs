//! A thumbnail grid TUI with an inline expanding preview.
//!
//! Run the binary on image directories or TOML manifests; click a thumbnail
//! to open its preview below the row.
//! Run with `--init-bash` to print the shell function for your `.bashrc`.

mod app;
mod config;
mod core;
mod shell;
mod ui;

use std::fs::File;
use std::io::{self, stderr};
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, layout::Rect, widgets::Paragraph, Frame, Terminal};
use tracing_subscriber::EnvFilter;

use crate::app::{
    event::spawn_event_reader,
    handler,
    image_runtime::{spawn_image_load, spawn_page_preload, ImageUpdate},
    state::{load_pages, AppState},
};
use crate::config::{AppConfig, CliOverrides, ConfigFile};
use crate::core::preview::ImageSlot;
use crate::core::settings::PreviewOptions;
use crate::core::viewport::CellMetrics;
use crate::shell::integration;
use crate::ui::{
    grid_widget::GridWidget,
    layout::AppLayout,
    preview_widget::{PreviewHitZones, PreviewWidget},
    spinner,
    theme::Theme,
};

/// Wake-up interval when nothing is scheduled.
const IDLE: Duration = Duration::from_millis(500);
/// Spinner frame period.
const SPINNER_PERIOD_MS: u128 = 80;

// ───────────────────────────────────────── CLI ───────────────

#[derive(Parser, Debug)]
#[command(name = env!("CARGO_PKG_NAME"), about = "Thumbnail grid with inline image previews")]
struct Cli {
    /// Image directories or TOML manifests.  The first is shown at start;
    /// the rest load with "Load more".
    #[arg(required_unless_present_any = ["init_bash", "init_zsh"])]
    sources: Vec<PathBuf>,

    /// Minimum preview height in pixels.
    #[arg(long)]
    min_height: Option<f64>,

    /// Open/close transition duration in milliseconds.
    #[arg(long)]
    speed: Option<u64>,

    /// Transition easing (`ease`, `linear`, `ease-in-out`, `cubic-bezier(...)`).
    #[arg(long)]
    easing: Option<String>,

    /// Never show the "Visit website" link.
    #[arg(long)]
    no_visit_button: bool,

    /// Jump heights instead of animating them.
    #[arg(long)]
    no_transitions: bool,

    /// Scan depth for directory sources.
    #[arg(long)]
    depth: Option<usize>,

    /// Include hidden (dot) files when scanning.
    #[arg(long)]
    hidden: bool,

    /// Config file (defaults to `$XDG_CONFIG_HOME/thumbgrid/config.toml`).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write logs to this file instead of stderr.
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Print the bash shell function and exit.
    #[arg(long = "init-bash")]
    init_bash: bool,

    /// Print the zsh shell function and exit.
    #[arg(long = "init-zsh")]
    init_zsh: bool,
}

impl Cli {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            preview: PreviewOptions {
                min_height: self.min_height,
                speed_ms: self.speed,
                easing: self.easing.clone(),
                show_visit_button: self.no_visit_button.then_some(false),
                compact_width: None,
                transitions: self.no_transitions.then_some(false),
            },
            depth: self.depth,
            hidden: self.hidden,
        }
    }
}

fn init_tracing(log_file: Option<&PathBuf>) -> Result<()> {
    match log_file {
        Some(path) => {
            let file = File::create(path).with_context(|| format!("cannot create log file {}", path.display()))?;
            let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(EnvFilter::from_default_env())
                .with_writer(io::stderr) // never pollute stdout
                .init();
        }
    }
    Ok(())
}

// ───────────────────────────────────────── drawing ──────────

fn draw(frame: &mut Frame, state: &mut AppState, now: Instant) {
    let layout = AppLayout::from_area(frame.area());
    let flow = state.flow(now);
    let projection = state.projection();
    let footer = state.footer();
    let compact_width = state.preview.settings().compact_width;

    let buf = frame.buffer_mut();
    state.grid_hits = GridWidget {
        flow: &flow,
        items: &state.items,
        thumbs: &state.thumbs,
        expanded: state.preview.expanded(),
        projection,
        footer,
    }
    .render_and_hit(buf);

    state.preview_hits = PreviewHitZones::default();
    for view in state.preview.panels(now) {
        let Some(rect) = flow.panel_rect(view.anchor, view.panel_height) else {
            continue;
        };
        if rect.height <= 0.0 {
            continue;
        }
        let compact = match view.image {
            Some(ImageSlot::Hidden) => true,
            Some(_) => false,
            None => state.viewport.width < compact_width,
        };
        let pointer = if view.active {
            state.preview.expanded().and_then(|i| flow.thumb_rect(i))
        } else {
            None
        };
        let hits = PreviewWidget {
            view: &view,
            rect,
            pointer,
            projection,
            compact,
            tick: state.tick,
        }
        .render_and_hit(buf);
        if view.active {
            state.preview_hits = hits;
        }
    }

    let status = if !state.wired {
        format!("{} loading thumbnails…", spinner::frame(state.tick))
    } else if let Some(msg) = &state.status_message {
        msg.clone()
    } else {
        format!(
            " {} items │ click a thumbnail to preview │ wheel scrolls │ q quits",
            state.items.len()
        )
    };
    frame.render_widget(Paragraph::new(status).style(Theme::status_bar_style()), layout.status_area);
}

// ───────────────────────────────────────── main ─────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── shell-integration mode ────────────────────────────────
    if cli.init_bash {
        print!("{}", integration::bash_function());
        return Ok(());
    }
    if cli.init_zsh {
        print!("{}", integration::zsh_function());
        return Ok(());
    }

    init_tracing(cli.log_file.as_ref())?;

    // ── configuration and sources ─────────────────────────────
    let file = ConfigFile::load(cli.config.as_deref())?;
    let config = AppConfig::resolve(file, cli.overrides())?;
    let pages = load_pages(&cli.sources, &config.scan)?;
    tracing::info!(pages = pages.len(), "starting");

    // ── terminal setup ────────────────────────────────────────
    enable_raw_mode()?;
    let mut stderr_handle = stderr();
    execute!(stderr_handle, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stderr());
    let mut terminal = Terminal::new(backend)?;

    let size = terminal.size()?;
    let cells = config.cells.unwrap_or_else(|| match crossterm::terminal::window_size() {
        Ok(w) => CellMetrics::from_window(w.columns, w.rows, w.width, w.height),
        Err(_) => CellMetrics::default(),
    });
    tracing::debug!(cell_width = cells.width, cell_height = cells.height, "cell metrics");
    let mut state = AppState::new(config, pages, Rect::new(0, 0, size.width, size.height), cells);

    // ── async channels ────────────────────────────────────────
    let mut events = spawn_event_reader(Duration::from_millis(100));
    let (img_tx, mut img_rx) = tokio::sync::mpsc::unbounded_channel::<ImageUpdate>();
    let started = Instant::now();

    // ── event loop ────────────────────────────────────────────
    loop {
        let now = Instant::now();
        state.settle_resize(now);
        state.advance(now);

        for (preview, src) in state.image_requests.drain(..) {
            spawn_image_load(img_tx.clone(), preview, src);
        }
        let preloads: Vec<usize> = state.preload_requests.drain(..).collect();
        for page in preloads {
            spawn_page_preload(img_tx.clone(), page, state.page_thumb_sources(page));
        }

        state.scroll.tick();
        state.tick = (now.duration_since(started).as_millis() / SPINNER_PERIOD_MS) as u64;
        terminal.draw(|frame| draw(frame, &mut state, now))?;

        let deadline = state.next_deadline(now).unwrap_or(now + IDLE);

        tokio::select! {
            biased;

            Some(event) = events.recv() => {
                handler::handle_event(&mut state, event, Instant::now());
            }

            Some(update) = img_rx.recv() => {
                // Drain everything queued before redrawing.
                handler::handle_image_update(&mut state, update, Instant::now());
                while let Ok(update) = img_rx.try_recv() {
                    handler::handle_image_update(&mut state, update, Instant::now());
                }
            }

            _ = tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)) => {}
        }

        if state.should_quit {
            break;
        }
    }

    // ── teardown ──────────────────────────────────────────────
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    if let Some(url) = &state.visited_url {
        integration::print_visited_url(url);
    }

    Ok(())
}
