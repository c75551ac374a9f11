use chrono::{Local, NaiveDate};
use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{DisableBracketedPaste, EnableBracketedPaste},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use engrave::{
    app::{App, RuntimeSettings},
    config::{Config, ConfigStore, FileConfigStore},
    exercise::{
        blanks::{MAX_DAY, MIN_DAY},
        ExerciseType,
    },
    logging,
    progress::{ProgressDb, UserId},
    runtime::{AppEvent, CrosstermEventSource, FixedTicker, Runner},
    ui,
    verse::{catalog::week_day, Catalog, CatalogOrder, Verse, WeeklyVerse},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    path::PathBuf,
    time::Duration,
};

const TICK_RATE_MS: u64 = 100;

/// verse memorization tui with adaptive fill-in-the-blank and progressive typing rounds
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Memorize the verse of the week through typing rounds that hide more of the text each time, fill-in-the-blank drills that get harder as the week goes on, a reference quiz, and guided reflection. Progress is kept in a local database."
)]
pub struct Cli {
    /// open an exercise directly: typing, fill-blanks, reference or reflection
    #[clap(short = 'e', long)]
    exercise: Option<ExerciseType>,

    /// memorization day 1-7, defaults to today's weekday
    #[clap(short = 'd', long, value_parser = clap::value_parser!(u8).range(1..=7))]
    day: Option<u8>,

    /// number of typing rounds, each hiding more of the verse
    #[clap(short = 'r', long, value_parser = clap::value_parser!(u8).range(1..=3))]
    rounds: Option<u8>,

    /// reference of a verse from the built-in catalog, e.g. "Psalms 46:10"
    #[clap(short = 'v', long)]
    verse: Option<String>,

    /// practice your own verse text, labelled with --verse
    #[clap(short = 't', long, requires = "verse")]
    text: Option<String>,

    /// user to record progress for
    #[clap(short = 'u', long)]
    user: Option<String>,

    /// hide first-letter hints in typing rounds
    #[clap(long)]
    no_hints: bool,

    /// keep the first letter of each blank fixed to the right letter
    #[clap(long)]
    lock_first_letter: bool,

    /// seed for blank shuffling and quiz order
    #[clap(long)]
    seed: Option<u64>,

    /// order for walking the catalog week by week: canonical, chronological, narrative or book-type.
    /// Choosing a different order restarts the plan and clears the user's progress.
    #[clap(short = 'o', long)]
    order: Option<CatalogOrder>,

    /// start the weekly plan over from its first verse and clear the user's progress
    #[clap(long)]
    restart: bool,

    /// write the user's completion history as csv and exit
    #[clap(long, value_name = "PATH")]
    export: Option<PathBuf>,

    /// store the effective settings as the new defaults
    #[clap(long)]
    save: bool,
}

impl Cli {
    /// Stored config overridden by whatever was passed on the command line
    fn runtime_settings(&self, cfg: &Config) -> RuntimeSettings {
        let mut settings = RuntimeSettings::from(cfg);
        if self.day.is_some() {
            settings.day_override = self.day;
        }
        if let Some(rounds) = self.rounds {
            settings.typing_rounds = rounds;
        }
        if self.verse.is_some() && self.text.is_none() {
            settings.verse_reference = self.verse.clone();
        }
        if self.user.is_some() {
            settings.user = self.user.clone();
        }
        if self.no_hints {
            settings.show_hints = false;
        }
        if self.lock_first_letter {
            settings.lock_first_letter = true;
        }
        settings.seed = self.seed;
        settings
    }
}

/// Apply `--order` and `--restart` to the stored config.
/// Returns true when the user's progress should be cleared.
fn plan_restart(cli: &Cli, cfg: &mut Config, today: NaiveDate) -> bool {
    let reordered = cli.order.is_some_and(|order| cfg.set_order(order, today));
    if cli.restart && !reordered {
        cfg.restart_plan(today);
    }
    reordered || cli.restart
}

/// Memorization day for this run, clamped to the week
fn effective_day(settings: &RuntimeSettings, today: NaiveDate) -> u8 {
    settings
        .day_override
        .unwrap_or_else(|| week_day(today))
        .clamp(MIN_DAY, MAX_DAY)
}

/// Pick the verse to practice: custom text, a catalog reference, or the verse of the week
fn resolve_verse(
    cli: &Cli,
    settings: &RuntimeSettings,
    catalog: &Catalog,
    today: NaiveDate,
) -> Result<WeeklyVerse, Box<dyn Error>> {
    if let Some(text) = &cli.text {
        let reference = cli.verse.clone().unwrap_or_default();
        return Ok(WeeklyVerse {
            verse: Verse::new(text.as_str(), reference, "custom")?,
            context_before: None,
            context_after: None,
            background: None,
        });
    }

    match &settings.verse_reference {
        Some(reference) => catalog
            .find(reference)
            .cloned()
            .ok_or_else(|| format!("no verse {reference:?} in catalog {}", catalog.name).into()),
        None => Ok(catalog.for_date(today, &settings.schedule).clone()),
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if let Err(e) = logging::init() {
        eprintln!("logging disabled: {e}");
    }

    let today = Local::now().date_naive();
    let store = FileConfigStore::new();
    let mut cfg = store.load();
    let restart = plan_restart(&cli, &mut cfg, today);
    if restart {
        store.save(&cfg)?;
        log::info!("restarted the plan in {} order", cfg.order);
    }

    let settings = cli.runtime_settings(&cfg);
    if cli.save {
        store.save(&Config::from(&settings))?;
        log::info!("saved settings to {}", store.path().display());
    }

    let day = effective_day(&settings, today);
    let mut db = ProgressDb::new()?.with_week_day(day);

    if restart {
        match &settings.user {
            Some(user) => {
                let removed = db.reset(&UserId::new(user.as_str()))?;
                println!("{}: cleared {removed} completions for {user}", cfg.order.title());
            }
            None => println!("{}: plan restarted", cfg.order.title()),
        }
    }

    if let Some(path) = &cli.export {
        let Some(user) = settings.user.clone() else {
            let mut cmd = Cli::command();
            cmd.error(ErrorKind::MissingRequiredArgument, "--export needs --user")
                .exit();
        };
        let count = db.export_csv(&UserId::new(user), path)?;
        println!("exported {count} completions to {}", path.display());
        return Ok(());
    }

    let catalog = Catalog::builtin()?;
    let weekly = resolve_verse(&cli, &settings, &catalog, today)?;
    let completed = match &settings.user {
        Some(user) => db.completed_types(&UserId::new(user.as_str()), weekly.verse.reference())?,
        None => Vec::new(),
    };

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let mut app = App::new(weekly, day, settings, Box::new(db)).with_completed(completed);
    if let Some(exercise) = cli.exercise {
        app.start_exercise(exercise)?;
    }

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableBracketedPaste,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    result
}

fn start_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(Duration::from_millis(TICK_RATE_MS)),
    );

    while !app.should_quit {
        terminal.draw(|f| ui::screen::draw(app, f))?;

        match runner.step() {
            AppEvent::Key(key) => app.on_key(key),
            AppEvent::Paste(text) => app.on_paste(&text),
            AppEvent::Tick => app.on_tick(),
            AppEvent::Resize => {}
        }
    }

    log::info!(
        "leaving with {}/{} exercises done",
        app.completed.len(),
        ExerciseType::ALL.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("engrave").chain(args.iter().copied())).unwrap()
    }

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 12).unwrap()
    }

    #[test]
    fn test_cli_default_values() {
        let cli = parse(&[]);
        assert_eq!(cli.exercise, None);
        assert_eq!(cli.day, None);
        assert!(!cli.save);
        assert_eq!(cli.runtime_settings(&Config::default()), RuntimeSettings::default());
    }

    #[test]
    fn test_cli_exercise_names() {
        assert_eq!(parse(&["-e", "fill-blanks"]).exercise, Some(ExerciseType::FillBlanks));
        assert_eq!(parse(&["--exercise", "reference"]).exercise, Some(ExerciseType::ReferenceQuiz));
        assert!(Cli::try_parse_from(["engrave", "-e", "dance"]).is_err());
    }

    #[test]
    fn test_cli_ranges() {
        assert!(Cli::try_parse_from(["engrave", "-d", "0"]).is_err());
        assert!(Cli::try_parse_from(["engrave", "-d", "8"]).is_err());
        assert!(Cli::try_parse_from(["engrave", "-r", "4"]).is_err());
        assert_eq!(parse(&["-d", "7"]).day, Some(7));
    }

    #[test]
    fn test_cli_text_requires_verse() {
        assert!(Cli::try_parse_from(["engrave", "-t", "Jesus wept."]).is_err());
    }

    #[test]
    fn test_cli_overrides_config() {
        let cfg = Config {
            day: Some(2),
            typing_rounds: 3,
            user: Some("stored".into()),
            ..Config::default()
        };
        let cli = parse(&["-d", "5", "-r", "1", "--no-hints", "--lock-first-letter", "--seed", "9"]);
        let settings = cli.runtime_settings(&cfg);
        assert_eq!(settings.day_override, Some(5));
        assert_eq!(settings.typing_rounds, 1);
        assert!(!settings.show_hints);
        assert!(settings.lock_first_letter);
        assert_eq!(settings.user.as_deref(), Some("stored"));
        assert_eq!(settings.seed, Some(9));
    }

    #[test]
    fn test_resolve_catalog_reference() {
        let catalog = Catalog::builtin().unwrap();
        let cli = parse(&["-v", "Psalms 46:10"]);
        let weekly = resolve_verse(&cli, &cli.runtime_settings(&Config::default()), &catalog, monday())
            .unwrap();
        assert_eq!(weekly.verse.reference(), "Psalms 46:10");

        let cli = parse(&["-v", "Obadiah 1:99"]);
        assert!(resolve_verse(&cli, &cli.runtime_settings(&Config::default()), &catalog, monday())
            .is_err());
    }

    #[test]
    fn test_resolve_custom_text() {
        let catalog = Catalog::builtin().unwrap();
        let cli = parse(&["-v", "John 11:35", "-t", "Jesus wept."]);
        let settings = cli.runtime_settings(&Config::default());
        assert_eq!(settings.verse_reference, None);
        let weekly = resolve_verse(&cli, &settings, &catalog, monday()).unwrap();
        assert_eq!(weekly.verse.text(), "Jesus wept.");

        let cli = parse(&["-v", "John 11:35", "-t", "   "]);
        assert!(resolve_verse(&cli, &settings, &catalog, monday()).is_err());
    }

    #[test]
    fn test_resolve_defaults_to_week() {
        let catalog = Catalog::builtin().unwrap();
        let cli = parse(&[]);
        let weekly =
            resolve_verse(&cli, &cli.runtime_settings(&Config::default()), &catalog, monday())
                .unwrap();
        let schedule = cli.runtime_settings(&Config::default()).schedule;
        assert_eq!(&weekly, catalog.for_date(monday(), &schedule));
    }

    #[test]
    fn test_resolve_follows_stored_order() {
        let catalog = Catalog::builtin().unwrap();
        let cfg = Config {
            order: CatalogOrder::Chronological,
            plan_started: Some(monday()),
            ..Config::default()
        };
        let cli = parse(&[]);
        let in_six_weeks = monday() + chrono::Duration::weeks(5);
        let weekly = resolve_verse(&cli, &cli.runtime_settings(&cfg), &catalog, in_six_weeks).unwrap();
        assert_eq!(weekly.verse.reference(), "James 1:22");
    }

    #[test]
    fn test_cli_order_and_restart() {
        assert_eq!(parse(&["-o", "book-type"]).order, Some(CatalogOrder::BookType));
        assert!(Cli::try_parse_from(["engrave", "--order", "alphabetical"]).is_err());
        assert!(parse(&["--restart"]).restart);
    }

    #[test]
    fn test_new_order_restarts_plan() {
        let mut cfg = Config::default();
        assert!(!plan_restart(&parse(&[]), &mut cfg, monday()));
        assert!(!plan_restart(&parse(&["-o", "canonical"]), &mut cfg, monday()));
        assert_eq!(cfg.plan_started, None);

        assert!(plan_restart(&parse(&["-o", "narrative"]), &mut cfg, monday()));
        assert_eq!(cfg.order, CatalogOrder::Narrative);
        assert_eq!(cfg.plan_started, Some(monday()));

        let later = monday() + chrono::Duration::days(9);
        assert!(plan_restart(&parse(&["--restart"]), &mut cfg, later));
        assert_eq!(cfg.order, CatalogOrder::Narrative);
        assert_eq!(cfg.plan_started, Some(later));
    }

    #[test]
    fn test_effective_day_is_clamped() {
        let stored = |day| Config {
            day: Some(day),
            ..Config::default()
        };
        let cli = parse(&[]);
        assert_eq!(effective_day(&cli.runtime_settings(&stored(9)), monday()), 7);
        assert_eq!(effective_day(&cli.runtime_settings(&stored(0)), monday()), 1);
        assert_eq!(effective_day(&cli.runtime_settings(&stored(4)), monday()), 4);
        assert_eq!(effective_day(&cli.runtime_settings(&Config::default()), monday()), 1);
        let thursday = monday() + chrono::Duration::days(3);
        assert_eq!(effective_day(&cli.runtime_settings(&Config::default()), thursday), 4);
    }
}
