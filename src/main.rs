use std::{
    fs::OpenOptions,
    io,
    path::{Path, PathBuf},
    process::ExitCode,
    sync::Mutex,
    thread::sleep,
    time::Duration,
};

use clap::Parser;
use rand::{rngs::StdRng, SeedableRng};
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Flex, Layout, Rect},
    style::{Color, Style, Stylize},
    widgets::{Block, BorderType, Borders, Paragraph},
    DefaultTerminal, Frame, Terminal,
};
use tracing_subscriber::EnvFilter;
use tui_big_text::{BigText, PixelSize};

mod ai;
mod audio;
mod ball;
mod config;
mod error;
mod game_theme;
mod helpers;
mod input;
mod menu;
mod paddle;
mod render;
mod score;
mod session;

use crate::{
    audio::{Audio, Silent, TerminalBell},
    config::{Config, ConfigStore, DEFAULT_CONFIG_PATH},
    error::AppError,
    helpers::{centered_rect, centered_rect_with_percentage, Ticker},
    input::{InputEvent, InputSource, TerminalInput},
    menu::{MenuCommand, MenuFlow, MenuState, MAIN_MENU_OPTIONS},
    render::Scene,
    score::{PlayerId, ScoreTally},
    session::{Session, SessionState},
};

const MIN_WIDTH: u16 = 80;
const MIN_HEIGHT: u16 = 24;
const WIN_SCREEN_DELAY: Duration = Duration::from_secs(3);

/// Pong in the terminal, against the computer or a friend on the same keyboard.
#[derive(Parser)]
#[command(name = "terminal-pong", version)]
struct Cli {
    /// Settings file, created with defaults when missing
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
    /// Where log output goes (the terminal itself belongs to the game)
    #[arg(long, default_value = "pong.log")]
    log_file: PathBuf,
}

struct App {
    exit: bool,
    store: ConfigStore,
    menu: MenuFlow,
    session: Option<Session>,
    scene: Scene,
    audio: Box<dyn Audio>,
    last_scores: Option<ScoreTally>,
    win_delay: Duration,
}

impl App {
    fn new(store: ConfigStore, config: Config) -> Self {
        let audio: Box<dyn Audio> = if config.sound_enabled {
            Box::new(TerminalBell::new())
        } else {
            Box::new(Silent)
        };

        Self {
            exit: false,
            store,
            scene: Scene::new(config.arena_width as f32, config.arena_height as f32),
            menu: MenuFlow::new(config),
            session: None,
            audio,
            last_scores: None,
            win_delay: WIN_SCREEN_DELAY,
        }
    }

    pub fn run<B: Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
        input: &mut impl InputSource,
    ) -> io::Result<()> {
        let mut ticker = Ticker::new(self.menu.config().tick_duration());

        while !self.exit {
            self.update(terminal, input)?;
            ticker.wait();
        }

        Ok(())
    }

    /// One pass of the loop: poll input, then advance and draw whichever
    /// screen is active.
    fn update<B: Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
        input: &mut impl InputSource,
    ) -> io::Result<()> {
        let events = input.poll_events()?;

        let size = terminal.size()?;
        if size.width < MIN_WIDTH || size.height < MIN_HEIGHT {
            if events.contains(&InputEvent::Close) {
                self.exit();
            }
            terminal.draw(|frame| self.show_terminal_resize_warning(frame))?;
            return Ok(());
        }

        match self.menu.state() {
            MenuState::InSession(_) => self.session_tick(terminal, input, &events)?,
            MenuState::MainMenu | MenuState::Options => {
                for event in events {
                    let command = self.menu.handle(event);
                    self.apply(command);
                    if self.exit || matches!(self.menu.state(), MenuState::InSession(_)) {
                        break;
                    }
                }
                terminal.draw(|frame| self.draw_menu(frame))?;
            }
        }
        Ok(())
    }

    fn apply(&mut self, command: MenuCommand) {
        match command {
            MenuCommand::Nothing => {}
            MenuCommand::StartSession(mode) => {
                let config = self.menu.config();
                self.scene = Scene::new(config.arena_width as f32, config.arena_height as f32);
                self.session = Some(Session::new(config, mode, StdRng::from_os_rng()));
            }
            MenuCommand::SaveConfig(config) => {
                if let Err(e) = self.store.save(&config) {
                    tracing::warn!(error = %e, "options not saved");
                }
            }
            MenuCommand::Quit => self.exit(),
        }
    }

    fn session_tick<B: Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
        input: &mut impl InputSource,
        events: &[InputEvent],
    ) -> io::Result<()> {
        let Some(session) = self.session.as_mut() else {
            self.menu.session_finished();
            return Ok(());
        };

        let state = session.tick(events, input.keys(), &mut *self.audio);
        session.render(&mut self.scene);
        terminal.draw(|frame| session.draw(frame, &self.scene))?;

        if state != SessionState::Finished {
            return Ok(());
        }

        if session.winner().is_some() {
            // winner banner stays up, nothing typed meanwhile reaches the menu
            sleep(self.win_delay);
            input.discard_pending()?;
        }
        self.last_scores = Some(*session.scores());
        self.session = None;
        self.menu.session_finished();

        if events.contains(&InputEvent::Close) {
            self.exit();
        }
        Ok(())
    }

    fn show_terminal_resize_warning(&self, frame: &mut Frame) {
        let colors = self.menu.config().theme.colors();
        let area = frame.area();
        let popup_area = centered_rect_with_percentage(60, 20, area.width, area.height);
        let popup = Paragraph::new(format!(
            "Terminal too small!\nPlease resize to at least {}x{}.",
            MIN_WIDTH, MIN_HEIGHT
        ))
        .block(
            Block::default()
                .title("Warning")
                .borders(Borders::ALL)
                .border_type(BorderType::Thick),
        )
        .style(Style::default().fg(colors.ball))
        .alignment(Alignment::Center);
        frame.render_widget(popup, popup_area);
    }

    fn draw_menu(&self, frame: &mut Frame) {
        match self.menu.state() {
            MenuState::Options => self.draw_options(frame),
            _ => self.draw_main_menu(frame),
        }
    }

    fn draw_main_menu(&self, frame: &mut Frame) {
        let colors = self.menu.config().theme.colors();
        let rows = MAIN_MENU_OPTIONS.len() as u16 * 2 + 1;

        let vertical_layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints(vec![
                Constraint::Length(9),
                Constraint::Length(rows + 2),
                Constraint::Length(1),
            ])
            .flex(Flex::Center)
            .split(frame.area());

        let big_text = BigText::builder()
            .pixel_size(PixelSize::Sextant)
            .style(Style::new().blue())
            .lines(vec![
                "terminal".cyan().into(),
                "PONG".white().into(),
                "~~~~~".light_green().into(),
            ])
            .alignment(Alignment::Center)
            .build();
        frame.render_widget(big_text, vertical_layout[0]);

        let [options_block_area] = Layout::horizontal([Constraint::Length(32)])
            .flex(Flex::Center)
            .areas(vertical_layout[1]);
        let options_block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Double)
            .style(Style::default().fg(colors.accent));
        let inner = options_block.inner(options_block_area);
        frame.render_widget(options_block, options_block_area);

        let option_areas = Layout::vertical(vec![Constraint::Length(1); rows as usize]).split(inner);
        for (i, &option) in MAIN_MENU_OPTIONS.iter().enumerate() {
            let style = if i == self.menu.main_selected() {
                Style::default().fg(Color::White).bold().italic()
            } else {
                Style::default().fg(colors.text)
            };
            let option_widget = Paragraph::new(option)
                .style(style)
                .alignment(Alignment::Center);
            frame.render_widget(option_widget, option_areas[i * 2 + 1]);
        }

        let mut hint = String::from("↑/↓ + Enter, or press 1-4");
        if let Some(scores) = self.last_scores {
            hint.push_str(&format!(
                "   |   last match {} - {}",
                scores.get(PlayerId::One),
                scores.get(PlayerId::Two)
            ));
        }
        frame.render_widget(
            Paragraph::new(hint)
                .style(Style::default().fg(colors.text))
                .alignment(Alignment::Center),
            vertical_layout[2],
        );
    }

    fn draw_options(&self, frame: &mut Frame) {
        let colors = self.menu.draft().theme.colors();
        let area = frame.area();
        let lines = self.menu.option_lines();
        let selected = menu::OPTION_ITEMS
            .iter()
            .position(|item| *item == self.menu.options_selected())
            .unwrap_or(0);

        let line_height: u16 = 2;
        let block_height = lines.len() as u16 * line_height + 3;
        let screen_area = centered_rect(60, block_height + 4, area.width, area.height);
        let [options_area, preview_area] =
            Layout::vertical([Constraint::Length(block_height), Constraint::Length(4)])
                .areas(screen_area);

        let options_block = Block::default()
            .title("Options")
            .title_bottom(" ←/→ adjust   Enter save   Esc cancel ")
            .borders(Borders::ALL)
            .border_type(BorderType::Thick)
            .style(Style::default().fg(colors.accent));
        frame.render_widget(options_block, options_area);

        let start_y = options_area.y + 2;
        for (i, line) in lines.iter().enumerate() {
            let para = if i == selected {
                Paragraph::new(format!("> {} <", line)).style(Style::default().fg(Color::White).bold())
            } else {
                Paragraph::new(format!("  {}  ", line)).style(Style::default().fg(colors.text))
            };
            let line_area = Rect {
                x: options_area.x + 2,
                y: start_y + i as u16 * line_height,
                width: options_area.width.saturating_sub(4),
                height: 1,
            };
            frame.render_widget(para.alignment(Alignment::Center), line_area);
        }

        let swatches = [
            ("Paddle", colors.paddle),
            ("AI", colors.ai_paddle),
            ("Ball", colors.ball),
            ("Text", colors.text),
            ("Accent", colors.accent),
            ("Border", colors.border),
        ];
        let bar_width = preview_area.width.saturating_sub(4);
        let swatch_width = (bar_width / swatches.len() as u16).max(1);
        for (i, (label, color)) in swatches.iter().enumerate() {
            let x = preview_area.x + 2 + i as u16 * swatch_width;
            let swatch = Rect::new(x, preview_area.y + 1, swatch_width, 1);
            frame.render_widget(Paragraph::new("").style(Style::default().bg(*color)), swatch);

            let label_area = Rect::new(x, preview_area.y + 2, swatch_width, 1);
            frame.render_widget(
                Paragraph::new(*label)
                    .style(Style::default().fg(colors.text))
                    .alignment(Alignment::Center),
                label_area,
            );
        }
    }

    fn exit(&mut self) {
        self.exit = true;
    }
}

fn init_logging(path: &Path) -> io::Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn run(
    terminal: &mut DefaultTerminal,
    store: ConfigStore,
    config: Config,
) -> Result<Option<ScoreTally>, AppError> {
    let mut input = TerminalInput::new(config.key_hold());
    let mut app = App::new(store, config);
    app.run(terminal, &mut input)?;
    Ok(app.last_scores)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(e) = init_logging(&cli.log_file) {
        eprintln!("logging disabled, cannot open {}: {}", cli.log_file.display(), e);
    }

    let store = ConfigStore::new(&cli.config);
    let config = store.load();
    tracing::info!(path = %store.path().display(), "starting terminal.pong");

    let mut terminal = ratatui::init();
    let result = run(&mut terminal, store, config);
    ratatui::restore();

    match result {
        Ok(last_scores) => {
            println!("Thanks for playing terminal.pong! 🏓");
            if let Some(scores) = last_scores {
                println!(
                    "Final Score: {} - {}",
                    scores.get(PlayerId::One),
                    scores.get(PlayerId::Two)
                );
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "game loop failed");
            eprintln!("Game ended with error: {}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        input::{Key, KeyState},
        session::Mode,
    };
    use ratatui::backend::TestBackend;
    use std::{
        collections::VecDeque,
        fs,
        sync::atomic::{AtomicUsize, Ordering},
        time::Instant,
    };

    /// Hands out one prepared batch per poll, then nothing.
    struct ScriptedInput {
        script: VecDeque<Vec<InputEvent>>,
        keys: KeyState,
    }

    impl ScriptedInput {
        fn new(batches: impl IntoIterator<Item = Vec<InputEvent>>) -> Self {
            Self {
                script: batches.into_iter().collect(),
                keys: KeyState::with_hold(None),
            }
        }
    }

    impl InputSource for ScriptedInput {
        fn poll_events(&mut self) -> io::Result<Vec<InputEvent>> {
            Ok(self.script.pop_front().unwrap_or_default())
        }

        fn keys(&self) -> &KeyState {
            &self.keys
        }
    }

    fn scratch_path(name: &str) -> PathBuf {
        static COUNTER: AtomicUsize = AtomicUsize::new(0);
        let n = COUNTER.fetch_add(1, Ordering::Relaxed);
        std::env::temp_dir().join(format!(
            "terminal-pong-app-{}-{}-{}.json",
            name,
            std::process::id(),
            n
        ))
    }

    fn quiet_config() -> Config {
        Config {
            sound_enabled: false,
            ..Config::default()
        }
    }

    fn terminal() -> Terminal<TestBackend> {
        Terminal::new(TestBackend::new(80, 24)).unwrap()
    }

    fn key(key: Key) -> InputEvent {
        InputEvent::KeyDown(key)
    }

    #[test]
    fn won_match_holds_the_banner_then_drops_queued_input() {
        let path = scratch_path("won");
        let config = Config {
            max_score: 1,
            ..quiet_config()
        };
        let mut app = App::new(ConfigStore::new(&path), config);
        app.win_delay = Duration::from_millis(50);
        let mut terminal = terminal();
        let mut input = ScriptedInput::new([vec![key(Key::Char('2'))]]);

        app.update(&mut terminal, &mut input).unwrap();
        assert_eq!(app.menu.state(), MenuState::InSession(Mode::Multiplayer));

        // idle paddles sit in the middle, so the first serve always scores
        let mut winning_frame = None;
        for _ in 0..500 {
            input.script.push_back(Vec::new());
            // typed while the winner banner is up; would quit from the main menu
            input.script.push_back(vec![key(Key::Char('4'))]);

            let started = Instant::now();
            app.update(&mut terminal, &mut input).unwrap();
            if app.menu.state() == MenuState::MainMenu {
                winning_frame = Some(started.elapsed());
                break;
            }
            input.script.clear();
        }

        let elapsed = winning_frame.expect("match never finished");
        assert!(elapsed >= Duration::from_millis(50));
        assert!(input.script.is_empty());
        assert!(app.session.is_none());
        assert_eq!(app.last_scores.map(|scores| scores.total()), Some(1));

        app.update(&mut terminal, &mut input).unwrap();
        assert!(!app.exit);
        assert_eq!(app.menu.state(), MenuState::MainMenu);

        let _ = fs::remove_file(path);
    }

    #[test]
    fn quitting_a_match_returns_to_the_menu_with_the_score() {
        let mut app = App::new(ConfigStore::new(scratch_path("quit")), quiet_config());
        let mut terminal = terminal();
        let mut input = ScriptedInput::new([
            vec![key(Key::Char('1'))],
            Vec::new(),
            vec![key(Key::Char('q'))],
        ]);

        app.update(&mut terminal, &mut input).unwrap();
        assert_eq!(app.menu.state(), MenuState::InSession(Mode::Single));
        app.update(&mut terminal, &mut input).unwrap();
        assert!(app.session.is_some());

        app.update(&mut terminal, &mut input).unwrap();
        assert_eq!(app.menu.state(), MenuState::MainMenu);
        assert!(app.session.is_none());
        assert_eq!(app.last_scores, Some(ScoreTally::default()));
        assert!(!app.exit);
    }

    #[test]
    fn close_during_a_match_ends_the_program() {
        let mut app = App::new(ConfigStore::new(scratch_path("close")), quiet_config());
        let mut terminal = terminal();
        let mut input = ScriptedInput::new([vec![key(Key::Char('2'))], vec![InputEvent::Close]]);

        app.update(&mut terminal, &mut input).unwrap();
        app.update(&mut terminal, &mut input).unwrap();

        assert!(app.exit);
        assert!(app.session.is_none());
        assert!(app.last_scores.is_some());
    }

    #[test]
    fn saved_options_reach_the_settings_file() {
        let path = scratch_path("save");
        let mut app = App::new(ConfigStore::new(&path), quiet_config());
        let mut terminal = terminal();
        // Options, difficulty +1, wrap up to "Save & Back", confirm
        let mut input = ScriptedInput::new([vec![
            key(Key::Char('3')),
            key(Key::Right),
            key(Key::Up),
            key(Key::Enter),
        ]]);

        app.update(&mut terminal, &mut input).unwrap();

        assert_eq!(app.menu.state(), MenuState::MainMenu);
        assert_eq!(app.menu.config().ai_difficulty, 6);
        let saved: Config = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(saved.ai_difficulty, 6);

        let _ = fs::remove_file(path);
    }

    #[test]
    fn failed_save_is_not_fatal() {
        // a directory cannot be written as a file
        let mut app = App::new(ConfigStore::new(std::env::temp_dir()), quiet_config());
        let mut terminal = terminal();
        let mut input = ScriptedInput::new([vec![
            key(Key::Char('3')),
            key(Key::Right),
            key(Key::Up),
            key(Key::Enter),
        ]]);

        app.update(&mut terminal, &mut input).unwrap();

        assert!(!app.exit);
        assert_eq!(app.menu.state(), MenuState::MainMenu);
        assert_eq!(app.menu.config().ai_difficulty, 6);
    }

    #[test]
    fn small_terminal_shows_the_warning_and_still_closes() {
        let mut app = App::new(ConfigStore::new(scratch_path("small")), quiet_config());
        let mut terminal = Terminal::new(TestBackend::new(40, 10)).unwrap();
        let mut input = ScriptedInput::new([vec![key(Key::Char('1'))], vec![InputEvent::Close]]);

        app.update(&mut terminal, &mut input).unwrap();
        assert_eq!(app.menu.state(), MenuState::MainMenu);

        app.update(&mut terminal, &mut input).unwrap();
        assert!(app.exit);
    }
}
