use std::io::{self, Read};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use turn_view::ui::terminal::ansi::write_lines;
use turn_view::{AssistantMessageView, AssistantTurn, Settings, TuiMarkdownEngine};

/// Render an assistant turn (JSON) the way the chat transcript shows it.
#[derive(Parser, Debug)]
#[command(name = "turn-view", version = env!("CARGO_PKG_VERSION"))]
struct Args {
    /// Path to the turn JSON; reads stdin when omitted or `-`.
    path: Option<PathBuf>,

    /// Show a "Thinking..." label instead of reasoning text.
    #[arg(long)]
    hide_thinking: bool,

    /// Layout width in columns (defaults to the terminal width).
    #[arg(short, long)]
    width: Option<u16>,

    /// Theme JSON file, overriding the one from settings.
    #[arg(long)]
    theme: Option<PathBuf>,

    /// Settings JSON file.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let mut settings = Settings::load(args.config.as_deref()).context("Failed to load settings")?;
    if args.hide_thinking {
        settings.hide_thinking_block = true;
    }
    if let Some(theme) = args.theme {
        settings.theme = Some(theme);
    }
    let theme = settings.load_theme().context("Failed to load theme")?;
    debug!("Using theme '{}'", theme.name());

    let turn = read_turn(args.path.as_ref())?;
    let width = args
        .width
        .or_else(|| crossterm::terminal::size().ok().map(|(w, _)| w))
        .unwrap_or(80);

    let mut view = AssistantMessageView::from_settings(&settings, Arc::new(theme));
    view.render(turn);

    let lines = view.container().lines(width, &TuiMarkdownEngine);
    let mut stdout = io::stdout().lock();
    write_lines(&mut stdout, &lines).context("Failed to write output")?;
    Ok(())
}

fn read_turn(path: Option<&PathBuf>) -> Result<AssistantTurn> {
    let source = match path.filter(|p| p.as_os_str() != "-") {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut source = String::new();
            io::stdin()
                .read_to_string(&mut source)
                .context("Failed to read turn from stdin")?;
            source
        }
    };
    serde_json::from_str(&source).context("Invalid assistant turn JSON")
}
