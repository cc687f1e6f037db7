use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tracing::{debug, error, info, warn};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt::format::FmtSpan, EnvFilter};

use vocab_trainer::app::App;
use vocab_trainer::catalog::WordPool;
use vocab_trainer::config::{api_key_from_env, AppDirs, Config, ConfigStore, FileConfigStore};
use vocab_trainer::error::Result;
use vocab_trainer::report;
use vocab_trainer::store::CACHE_KEY;
use vocab_trainer::trainer::Trainer;
use vocab_trainer::translator::{GroqClient, Offline, Translate, TranslationCache, TranslationService};
use vocab_trainer::types::{AppMode, GameMode, Level};

/// Adaptive English vocabulary quiz in the terminal
#[derive(Parser, Debug)]
#[clap(
    version,
    about,
    long_about = "Practice English words by typing their translation. Words you miss come back more often, words you know well fade out."
)]
struct Cli {
    /// config file (defaults to the platform config dir)
    #[clap(long, global = true)]
    config: Option<PathBuf>,

    /// CSV word list with word,class,level columns
    #[clap(long, global = true)]
    words: Option<PathBuf>,

    /// directory for scores, weights, history and logs (logs always follow
    /// this flag or the platform default)
    #[clap(long, global = true)]
    data_dir: Option<PathBuf>,

    #[clap(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone)]
enum Command {
    /// start a quiz (default)
    Play(PlayArgs),
    /// show high scores, level progress and difficult words
    Stats,
    /// forget progress for one level
    ResetLevel {
        level: Level,
        /// skip the confirmation prompt
        #[clap(long)]
        yes: bool,
    },
    /// delete all saved progress
    FactoryReset {
        /// skip the confirmation prompt
        #[clap(long)]
        yes: bool,
    },
    /// write statistics to a timestamped JSON file
    Export,
    /// drop cached translations
    ClearCache,
}

#[derive(Args, Debug, Clone, Default)]
struct PlayArgs {
    /// CEFR level to practice (a1..c2)
    #[clap(short, long, conflicts_with = "adventure")]
    level: Option<Level>,

    /// draw every word from a random level
    #[clap(short, long)]
    adventure: bool,

    /// end the session after this many correct answers
    #[clap(long)]
    limit: Option<u32>,

    /// seed for reproducible word order
    #[clap(long)]
    seed: Option<u64>,
}

fn setup_logging(data_dir: &Path) -> Result<()> {
    let file_appender =
        RollingFileAppender::new(Rotation::DAILY, data_dir.join("logs"), "vocab_trainer.log");

    // Debug builds log debug and higher, release builds info and higher
    let default_level = if cfg!(debug_assertions) { "debug" } else { "info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(file_appender)
        .with_ansi(false)
        .with_span_events(FmtSpan::CLOSE)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .with_file(true);

    if std::env::var("VOCAB_LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json")) {
        builder.json().init();
    } else {
        builder.init();
    }

    info!("Logging system initialized");
    debug!("Debug logging {}", if cfg!(debug_assertions) { "enabled" } else { "disabled" });
    Ok(())
}

/// Log location, known before any config file is read.
fn log_dir(cli: &Cli) -> PathBuf {
    cli.data_dir.clone().unwrap_or_else(AppDirs::data_dir)
}

fn load_config(cli: &Cli) -> Config {
    let store = match &cli.config {
        Some(path) => FileConfigStore::with_path(path),
        None => FileConfigStore::new(),
    };
    let mut config = store.load();
    config.apply_env();
    if let Some(words) = &cli.words {
        config.word_list = Some(words.clone());
    }
    if let Some(dir) = &cli.data_dir {
        config.data_dir = Some(dir.clone());
    }
    config
}

fn load_pool(config: &Config) -> Result<WordPool> {
    match &config.word_list {
        Some(path) => WordPool::from_path(path),
        None => WordPool::builtin(),
    }
}

fn confirm(question: &str) -> Result<bool> {
    print!("{question} Type 'yes' to confirm: ");
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(answer.trim().eq_ignore_ascii_case("yes"))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    // a missing .env is fine
    let _ = dotenvy::dotenv();

    // Logging comes first so config warnings reach the log file
    setup_logging(&log_dir(&cli))?;
    info!("Starting vocabulary trainer");

    let config = load_config(&cli);
    debug!(data_dir = %config.resolved_data_dir().display(), "Configuration loaded");

    let pool = load_pool(&config)?;
    let command = cli
        .command
        .clone()
        .unwrap_or_else(|| Command::Play(PlayArgs::default()));

    let res = match command {
        Command::Play(args) => play(config, pool, args).await,
        Command::Stats => {
            let trainer = Trainer::load(config, pool, None);
            print!(
                "{}",
                report::statistics(trainer.scores(), trainer.weights(), trainer.history())
            );
            let cache: TranslationCache = trainer.store().load(CACHE_KEY);
            println!("\nCached translations: {}", cache.len());
            Ok(())
        }
        Command::ResetLevel { level, yes } => {
            let mut trainer = Trainer::load(config, pool, None);
            if yes || confirm(&format!("Reset all progress for level {level}?"))? {
                let removed = trainer.reset_level(level)?;
                println!("Level {level} reset ({removed} word records removed)");
            } else {
                println!("Cancelled");
            }
            Ok(())
        }
        Command::FactoryReset { yes } => {
            let mut trainer = Trainer::load(config, pool, None);
            if yes || confirm("Delete ALL scores, history and cached translations?")? {
                let removed = trainer.factory_reset()?;
                println!("Factory reset complete ({removed} files removed)");
            } else {
                println!("Cancelled");
            }
            Ok(())
        }
        Command::Export => {
            let trainer = Trainer::load(config, pool, None);
            let cache: TranslationCache = trainer.store().load(CACHE_KEY);
            let path = trainer.export_statistics(cache.stats(), Utc::now())?;
            println!("Statistics exported to {}", path.display());
            Ok(())
        }
        Command::ClearCache => {
            let trainer = Trainer::load(config, pool, None);
            let mut service = TranslationService::new(Offline, trainer.store().load(CACHE_KEY));
            let cleared = service.clear_cache();
            trainer.store().save(CACHE_KEY, service.cache())?;
            println!("Cleared {cleared} cached translations");
            Ok(())
        }
    };

    if let Err(err) = &res {
        error!("Application error: {}", err);
    }
    info!("Application terminated");
    res
}

async fn play(mut config: Config, pool: WordPool, args: PlayArgs) -> Result<()> {
    let (mode, level) = if args.adventure {
        (GameMode::Adventure, None)
    } else {
        (GameMode::Custom, Some(args.level.unwrap_or(Level::A1)))
    };
    if args.limit.is_some() {
        config.session.correct_limit = args.limit;
    }

    let mut trainer = Trainer::load(config, pool, args.seed);
    trainer.start_session(mode, level)?;
    let cache: TranslationCache = trainer.store().load(CACHE_KEY);

    match api_key_from_env() {
        Some(key) => {
            let client = GroqClient::new(
                key,
                &trainer.config().target_language,
                trainer.config().translator.clone(),
            )?;
            run_tui(App::new(trainer, TranslationService::new(client, cache))).await
        }
        None => {
            warn!("GROQ_API_KEY not set, using the built-in dictionary only");
            run_tui(App::new(trainer, TranslationService::new(Offline, cache))).await
        }
    }
}

async fn run_tui<P: Translate>(mut app: App<P>) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let tick_rate = Duration::from_millis(250);
    let res = run_app(&mut terminal, &mut app, tick_rate).await;

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if app.mode != AppMode::Ended {
        if let Err(e) = app.finish() {
            error!("Failed to close session: {}", e);
        }
    }
    if let Some(summary) = &app.summary {
        print!("{}", report::session_summary(summary));
    }

    res
}

async fn run_app<B: ratatui::backend::Backend, P: Translate>(
    terminal: &mut Terminal<B>,
    app: &mut App<P>,
    tick_rate: Duration,
) -> Result<()> {
    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|f| app.render(f))?;

        if app.pending_word {
            app.next_word().await?;
            continue;
        }

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_secs(0));

        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                match key.code {
                    KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                        app.finish()?;
                        app.should_quit = true;
                    }
                    KeyCode::Char(c) => app.handle_input(c),
                    KeyCode::Enter => app.handle_enter()?,
                    KeyCode::Backspace => app.handle_backspace(),
                    KeyCode::Esc => {
                        app.finish()?;
                        app.should_quit = true;
                    }
                    _ => {}
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
