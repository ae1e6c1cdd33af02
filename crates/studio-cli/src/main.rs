use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use dotenvy::dotenv;
use futures::stream::StreamExt;
use log::{debug, info, warn};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use studio_core::clipboard::Osc52Clipboard;
use studio_core::secret::Credential;
use studio_core::{ContentType, CopyTarget, SaveOutcome, Studio, StudioConfig};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory holding the history file (overrides STUDIO_DATA_DIR)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate copy for a topic
    Generate {
        /// Your topic or idea
        #[arg(short, long)]
        topic: String,

        /// Content type
        #[arg(
            short = 'k',
            long = "type",
            value_enum,
            default_value_t = ContentKind::InstagramCaption
        )]
        kind: ContentKind,

        /// Hugging Face token (kept in memory, never sent anywhere)
        #[arg(long)]
        token: Option<String>,

        /// Save the result to history once it is fully shown
        #[arg(long)]
        save: bool,

        /// Copy the result to the clipboard
        #[arg(long)]
        copy: bool,

        /// Print the result at once instead of typing it out
        #[arg(long)]
        no_animation: bool,
    },

    /// List saved results, newest first
    History {
        /// Show at most this many entries
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Copy a saved result to the clipboard
    Copy {
        /// Index shown by `history`
        index: usize,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
enum ContentKind {
    InstagramCaption,
    BlogIntro,
    EmailCopy,
}

impl From<ContentKind> for ContentType {
    fn from(kind: ContentKind) -> Self {
        match kind {
            ContentKind::InstagramCaption => ContentType::InstagramCaption,
            ContentKind::BlogIntro => ContentType::BlogIntro,
            ContentKind::EmailCopy => ContentType::EmailCopy,
        }
    }
}

/// Lines of a saved entry shown by `history`.
const PREVIEW_LINES: usize = 3;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenv().ok();

    // Initialize logging
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let cli = Cli::parse();

    let mut config = StudioConfig::from_env();
    if let Some(dir) = &cli.data_dir {
        config = config.with_data_dir(dir);
    }

    match cli.command {
        Commands::Generate { topic, kind, token, save, copy, no_animation } => {
            if no_animation {
                config = config.with_preface_ms(0).with_tick_ms(0);
            }
            let studio = Studio::from_config(&config)
                .context("Failed to open studio")?
                .with_clipboard(Arc::new(Osc52Clipboard));

            studio.set_topic(topic);
            studio.set_content_type(kind.into());
            if let Some(token) = token {
                studio.set_token(Credential::new(token));
            }

            run_generation(&studio, save, copy, no_animation).await?;
        }
        Commands::History { limit } => {
            let studio = Studio::from_config(&config).context("Failed to open studio")?;
            let history = studio.history();

            println!("Saved Results ({})", history.len());
            if history.is_empty() {
                println!("Generate content to see your saved results here");
            }
            for (index, entry) in history.iter().take(limit.unwrap_or(usize::MAX)).enumerate() {
                println!("\n[{}] {}", index, entry.content_type);
                for line in entry.content.lines().take(PREVIEW_LINES) {
                    println!("    {}", line);
                }
            }
        }
        Commands::Copy { index } => {
            let studio = Studio::from_config(&config)
                .context("Failed to open studio")?
                .with_clipboard(Arc::new(Osc52Clipboard));
            if !studio.copy(CopyTarget::History(index)) {
                bail!("No saved result at index {}", index);
            }
            info!("Copied entry {} to clipboard", index);
        }
    }

    Ok(())
}

async fn run_generation<P>(
    studio: &Studio<P>,
    save: bool,
    copy: bool,
    no_animation: bool,
) -> Result<()>
where
    P: studio_core::ContentProvider + 'static,
{
    eprintln!("AI is typing…");
    if let Err(e) = studio.submit().await {
        match e.user_message() {
            Some(message) => bail!("{}", message),
            None => return Err(e).context("Code generation failed"),
        }
    }

    let mut stdout = std::io::stdout().lock();
    let mut deltas = studio.reveal().deltas();
    while let Some(fragment) = deltas.next().await {
        if !no_animation {
            write!(stdout, "{}", fragment)?;
            stdout.flush()?;
        }
    }

    let done = studio
        .reveal()
        .snapshot()
        .filter(|r| r.is_complete())
        .context("Generation was interrupted")?;
    if no_animation {
        writeln!(stdout, "{}", done.revealed_text())?;
    } else {
        writeln!(stdout)?;
    }
    drop(stdout);
    debug!("Revealed {} characters", done.total_len());

    if save {
        match studio.save() {
            SaveOutcome::Saved(count) => info!("Saved to history ({} entries)", count),
            SaveOutcome::AlreadySaved => info!("Already saved"),
            SaveOutcome::NotReady => warn!("Nothing to save"),
        }
    }

    if copy && studio.copy(CopyTarget::Current) {
        info!("Copied to clipboard");
    }

    Ok(())
}
