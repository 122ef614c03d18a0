mod ui;

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Frame, Terminal,
};
use std::{
    error::Error,
    fs::File,
    io::{self, stdin},
    path::{Path, PathBuf},
    sync::Mutex,
    time::{Duration, Instant},
};
use tracing::{info, warn};
use typetest::{
    config::{Config, ConfigStore, FileConfigStore},
    language::SupportedLanguage,
    runtime::{command_for, AppEvent, Command, CrosstermEventSource, Runner, POLL_INTERVAL_MS},
    session::{step_option, OptionChange, TIME_OPTIONS, WORD_COUNT_OPTIONS},
    FixedWordSource, LanguageWordSource, Session, TestMode, WordSource,
};

/// typing speed test with timed and word-count modes
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A typing speed test for the terminal: race a countdown or a word-count target and get live wpm, raw wpm and accuracy."
)]
pub struct Cli {
    /// test mode: countdown timer or fixed number of words
    #[clap(short = 'm', long, value_enum)]
    mode: Option<TestMode>,

    /// number of seconds to run a timed test
    #[clap(short = 's', long)]
    number_of_secs: Option<u32>,

    /// number of words to type in a word-count test
    #[clap(short = 'w', long)]
    number_of_words: Option<usize>,

    /// language to pull words from
    #[clap(short = 'l', long, value_enum)]
    language: Option<SupportedLanguage>,

    /// custom prompt to type instead of random words
    #[clap(short = 'p', long)]
    prompt: Option<String>,

    /// seed for a reproducible word order
    #[clap(long)]
    seed: Option<u64>,

    /// write debug logs to this file
    #[clap(long)]
    log_file: Option<PathBuf>,
}

impl Cli {
    /// Command-line values win over the persisted config for this run.
    fn apply_to(&self, config: &mut Config) {
        if let Some(mode) = self.mode {
            config.mode = mode;
        }
        if let Some(secs) = self.number_of_secs {
            config.duration_secs = secs;
        }
        if let Some(language) = self.language {
            config.language = language;
        }
        match (self.number_of_words, &self.prompt) {
            (Some(words), _) => config.word_count = words,
            (None, Some(prompt)) => config.word_count = prompt.split_whitespace().count(),
            (None, None) => {}
        }
    }

    fn word_source(&self, config: &Config) -> Result<Box<dyn WordSource>, Box<dyn Error>> {
        if let Some(prompt) = &self.prompt {
            let source = FixedWordSource::from_prompt(prompt);
            if source.is_empty() {
                let mut cmd = Cli::command();
                cmd.error(ErrorKind::InvalidValue, "prompt must contain at least one word")
                    .exit();
            }
            return Ok(Box::new(source));
        }

        let language = config.language.load()?;
        Ok(match self.seed {
            Some(seed) => Box::new(LanguageWordSource::with_seed(language, seed)),
            None => Box::new(LanguageWordSource::new(language)),
        })
    }
}

pub struct App {
    pub session: Session,
    pub config: Config,
    store: Option<Box<dyn ConfigStore>>,
}

impl App {
    pub fn new(session: Session, config: Config, store: Option<Box<dyn ConfigStore>>) -> Self {
        Self {
            session,
            config,
            store,
        }
    }

    /// Apply a command; returns false when the app should quit.
    pub fn apply(&mut self, command: Command) -> bool {
        self.apply_at(command, Instant::now())
    }

    pub fn apply_at(&mut self, command: Command, now: Instant) -> bool {
        match command {
            Command::Quit => return false,
            Command::Type(c) => {
                // a key typed after the deadline must not count
                self.session.on_tick_at(now);
                let mut raw = self.session.buffer().to_string();
                raw.push(c);
                self.session.on_input_at(&raw, now);
            }
            Command::Backspace => {
                self.session.on_tick_at(now);
                let mut raw = self.session.buffer().to_string();
                if raw.pop().is_some() {
                    self.session.on_input_at(&raw, now);
                }
            }
            Command::Restart => self.session.restart(),
            Command::ToggleMode => {
                let mode = self.session.mode().toggled();
                self.change_option(OptionChange::Mode(mode));
            }
            Command::PrevOption => self.step_option(false),
            Command::NextOption => self.step_option(true),
        }
        true
    }

    /// Returns true when at least one second ticked and the screen needs a redraw.
    pub fn on_tick(&mut self) -> bool {
        self.session.on_tick() > 0
    }

    fn step_option(&mut self, forward: bool) {
        let current = self.session.config();
        let change = match current.mode {
            TestMode::Time => step_option(&TIME_OPTIONS, current.duration_secs, forward)
                .filter(|secs| *secs != current.duration_secs)
                .map(OptionChange::Duration),
            TestMode::Words => step_option(&WORD_COUNT_OPTIONS, current.word_count, forward)
                .filter(|count| *count != current.word_count)
                .map(OptionChange::WordCount),
        };
        if let Some(change) = change {
            self.change_option(change);
        }
    }

    fn change_option(&mut self, change: OptionChange) {
        if !self.session.change_option(change) {
            return;
        }
        self.config.update_from(self.session.config());
        if let Some(store) = &self.store {
            if let Err(e) = store.save(&self.config) {
                warn!(error = %e, "could not save config");
            }
        }
    }
}

fn init_logging(path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .init();
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    if let Some(path) = &cli.log_file {
        init_logging(path)?;
    }

    let file_store = FileConfigStore::new();
    let mut config = file_store.load();
    info!(path = %file_store.path().display(), "config loaded");
    cli.apply_to(&mut config);

    let session = Session::new(config.session_config(), cli.word_source(&config)?);
    // custom prompts are one-off runs, keep them out of the saved config
    let store: Option<Box<dyn ConfigStore>> = match cli.prompt {
        Some(_) => None,
        None => Some(Box::new(file_store)),
    };
    let mut app = App::new(session, config, store);
    info!(mode = %app.session.mode(), "starting");

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn start_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(
        CrosstermEventSource::new(),
        Duration::from_millis(POLL_INTERVAL_MS),
    );

    terminal.draw(|f| ui(app, f))?;

    loop {
        match runner.step() {
            AppEvent::Tick => {
                if app.on_tick() {
                    terminal.draw(|f| ui(app, f))?;
                }
            }
            AppEvent::Resize => {
                terminal.draw(|f| ui(app, f))?;
            }
            AppEvent::Key(key) => {
                if let Some(command) = command_for(key) {
                    if !app.apply(command) {
                        break;
                    }
                }
                terminal.draw(|f| ui(app, f))?;
            }
        }
    }

    info!("quit");
    Ok(())
}

fn ui(app: &App, f: &mut Frame) {
    f.render_widget(app, f.area());
}
