use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    time::Duration,
};
use tracing::{info, warn};

use typetest::{
    app_dirs::AppDirs,
    config::{Config, ConfigStore, FileConfigStore},
    language::{Language, RandomWordSupply},
    logging::{init_logging, LogConfig},
    runtime::{handle_key, AppEvent, CrosstermEventSource, KeyAction, MonotonicClock, Runner},
    ui::{TuiRenderer, TUI_LINE_TOLERANCE},
    TestDuration, TypingTest,
};

/// Longest the loop sleeps without input; bounds caret blink latency.
const MAX_WAIT_MS: u64 = 100;

/// timed typing test with a scrolling two-line word window
#[derive(Parser, Debug, Clone)]
#[clap(version, about)]
pub struct Cli {
    /// test length in seconds (15, 30 or 60)
    #[clap(short = 'd', long, value_parser = parse_duration)]
    duration: Option<TestDuration>,

    /// drop keystrokes arriving faster than this many milliseconds apart (0 disables)
    #[clap(long)]
    throttle_ms: Option<u64>,

    /// delay before a line scroll is committed, in milliseconds
    #[clap(long)]
    settle_ms: Option<u64>,

    /// keep the caret solid while waiting for the first keystroke
    #[clap(long)]
    no_blink: bool,

    /// write the effective settings back to the config file
    #[clap(long)]
    save: bool,
}

fn parse_duration(s: &str) -> Result<TestDuration, String> {
    let secs: u64 = s.parse().map_err(|_| format!("`{s}` is not a number"))?;
    TestDuration::try_from(secs).map_err(|e| e.to_string())
}

impl Cli {
    /// Flags override the stored config.
    fn apply(&self, mut cfg: Config) -> Config {
        if let Some(duration) = self.duration {
            cfg.duration = duration;
        }
        if let Some(throttle_ms) = self.throttle_ms {
            cfg.throttle_ms = throttle_ms;
        }
        if let Some(settle_ms) = self.settle_ms {
            cfg.settle_delay_ms = settle_ms;
        }
        if self.no_blink {
            cfg.caret_blink = false;
        }
        cfg
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let store = FileConfigStore::new();
    let config = cli.apply(store.load());
    if cli.save {
        store.save(&config)?;
    }

    if let Some(file) = AppDirs::log_path() {
        let log_config = LogConfig {
            level: config.log_level.clone(),
            file,
        };
        // The test runs without logging; say so before the screen is taken over.
        if let Err(err) = init_logging(&log_config) {
            eprintln!("typetest: logging disabled: {err}");
        }
    }
    info!(?config, "starting");

    let supply = RandomWordSupply::new(Language::english()?);

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let width = terminal.size()?.width;
    let mut test = TypingTest::new(
        supply,
        TuiRenderer::new(width),
        config.test_settings(TUI_LINE_TOLERANCE),
    );
    let result = start_tui(&mut terminal, &mut test);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(ref err) = result {
        warn!(%err, "terminal loop failed");
    }
    result
}

fn start_tui<B: Backend>(
    terminal: &mut Terminal<B>,
    test: &mut TypingTest<RandomWordSupply, TuiRenderer>,
) -> Result<(), Box<dyn Error>> {
    let clock = MonotonicClock::start();
    let runner = Runner::new(
        CrosstermEventSource::new(),
        Duration::from_millis(MAX_WAIT_MS),
    );

    loop {
        terminal.draw(|f| test.renderer().draw(f))?;

        let now_ms = clock.now_ms();
        match runner.step(now_ms, test.next_deadline()) {
            AppEvent::Tick => {}
            AppEvent::Resize => {
                let width = terminal.size()?.width;
                test.renderer_mut().resize(width);
            }
            AppEvent::Key(key) => {
                if handle_key(test, key, clock.now_ms()) == KeyAction::Quit {
                    break;
                }
            }
        }
        test.advance_clock(clock.now_ms());
    }

    Ok(())
}
