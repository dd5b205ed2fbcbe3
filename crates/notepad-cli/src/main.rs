use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};
use notepad_editor_core::{
    DocumentTree, EditorSession, KeyOutcome, ModelCaret, Page, SuggestionKey, SuggestionSource,
    export_page, highlight,
};
use notepad_suggest::{HttpSuggestionSource, SuggestConfig};
use tracing::{debug, info};
use web_time::Instant;

mod telemetry;

#[derive(Parser)]
#[command(version, about = "Notepad - rich-text notes with word completion", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to a suggestion config file (.json or .toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Look up completions for a word
    Suggest {
        /// Prefix to complete
        word: String,
    },
    /// Write a serialized page as a plain-text file
    Export {
        /// JSON file holding a document tree
        tree: PathBuf,

        /// Page number used in the file name
        #[arg(long, default_value_t = 1)]
        page: usize,

        /// Output directory
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Type text into an editor session one keystroke at a time
    Replay {
        /// Text to type
        text: String,

        /// Commit the top suggestion at each space
        #[arg(long)]
        accept: bool,

        /// Delay between keystrokes
        #[arg(long, default_value_t = 30)]
        keystroke_ms: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_miette()?;
    telemetry::init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Suggest { word } => suggest(&config, &word).await?,
        Commands::Export { tree, page, out } => export(&tree, page, out)?,
        Commands::Replay {
            text,
            accept,
            keystroke_ms,
        } => {
            let keystroke = Duration::from_millis(keystroke_ms);
            let typed = replay(&config, &text, accept, keystroke).await?;
            println!("{typed}");
        }
    }

    Ok(())
}

fn default_config_path() -> Option<PathBuf> {
    Some(dirs::config_dir()?.join("notepad").join("config.toml"))
}

/// An explicit `--config` must exist; the default location is optional.
fn load_config(path: Option<&Path>) -> Result<SuggestConfig> {
    let config = match path {
        Some(path) => SuggestConfig::load(path)?,
        None => match default_config_path().filter(|path| path.exists()) {
            Some(path) => SuggestConfig::load(path)?,
            None => SuggestConfig::default(),
        },
    };
    let config = config.with_env_overrides()?;
    debug!(endpoint = %config.endpoint, debounce_ms = config.debounce_ms, "config ready");
    Ok(config)
}

async fn suggest(config: &SuggestConfig, word: &str) -> Result<()> {
    let source = HttpSuggestionSource::new(config).into_diagnostic()?;
    let query = word.to_ascii_lowercase();
    let mut items = source.lookup(&query).await.into_diagnostic()?;
    items.truncate(config.max_items);

    if items.is_empty() {
        println!("No suggestions for {word:?}");
        return Ok(());
    }
    let emphasize = std::io::stdout().is_terminal();
    for (i, item) in items.iter().enumerate() {
        let rendered: String = highlight(item, &query)
            .into_iter()
            .map(|part| {
                if part.matched && emphasize {
                    format!("\x1b[1m{}\x1b[0m", part.text)
                } else {
                    part.text.to_string()
                }
            })
            .collect();
        println!("{:>2}. {rendered}", i + 1);
    }
    Ok(())
}

fn export(tree_path: &Path, page_number: usize, out: Option<PathBuf>) -> Result<()> {
    let json = std::fs::read_to_string(tree_path).into_diagnostic()?;
    let content: DocumentTree = serde_json::from_str(&json).into_diagnostic()?;
    let mut page = Page::new(1);
    page.content = content;

    let export = export_page(&page, page_number);
    let dest = out.unwrap_or_else(|| PathBuf::from(".")).join(&export.filename);
    std::fs::write(&dest, &export.text).into_diagnostic()?;

    println!("Wrote {}", dest.display());
    Ok(())
}

async fn replay(
    config: &SuggestConfig,
    text: &str,
    accept: bool,
    keystroke: Duration,
) -> Result<String> {
    let source = HttpSuggestionSource::new(config).into_diagnostic()?;
    let mut session = EditorSession::new(ModelCaret::new(), config.settings());

    for ch in text.chars() {
        if accept && ch == ' ' && accept_top(&mut session, &source).await {
            // The accepted word already ends in a space.
            continue;
        }
        session.type_text(ch.encode_utf8(&mut [0; 4]), Instant::now());
        tokio::time::sleep(keystroke).await;
        if let Some(query) = session.poll(Instant::now()) {
            session.fetch(&source, &query, None).await;
        }
    }
    if accept {
        accept_top(&mut session, &source).await;
    }

    Ok(session.text())
}

/// Let any pending lookup finish, then commit the first suggestion if one is
/// showing.
async fn accept_top<S: SuggestionSource>(
    session: &mut EditorSession<ModelCaret>,
    source: &S,
) -> bool {
    if let Some(deadline) = session.next_deadline() {
        let now = Instant::now();
        if deadline > now {
            tokio::time::sleep(deadline - now).await;
        }
        if let Some(query) = session.poll(Instant::now()) {
            session.fetch(source, &query, None).await;
        }
    }
    match session.key(SuggestionKey::Tab) {
        Ok(KeyOutcome::Commit(word)) => {
            info!(%word, "accepted suggestion");
            true
        }
        Ok(_) => false,
        Err(e) => {
            debug!(error = %e, "suggestion refused");
            false
        }
    }
}

fn init_miette() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .with_cause_chain()
                .color(true)
                .context_lines(5)
                .tab_width(2)
                .break_words(true)
                .build(),
        )
    }))
    .into_diagnostic()?;
    miette::set_panic_hook();
    Ok(())
}
