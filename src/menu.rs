use crate::{
    config::{Config, DIFFICULTY_RANGE, MAX_SCORE_RANGE},
    input::{InputEvent, Key},
    session::Mode,
};

pub const MAIN_MENU_OPTIONS: [&str; 4] = [
    "1. Single Player",
    "2. Multiplayer",
    "3. Options",
    "4. Quit",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionItem {
    Difficulty,
    MaxScore,
    Theme,
    BoundaryRule,
    SaveAndBack,
}

pub const OPTION_ITEMS: [OptionItem; 5] = [
    OptionItem::Difficulty,
    OptionItem::MaxScore,
    OptionItem::Theme,
    OptionItem::BoundaryRule,
    OptionItem::SaveAndBack,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuState {
    MainMenu,
    Options,
    InSession(Mode),
}

/// What the caller has to do after a menu event.
#[derive(Debug, Clone, PartialEq)]
pub enum MenuCommand {
    Nothing,
    StartSession(Mode),
    SaveConfig(Config),
    Quit,
}

/// Top-level flow: main menu, options, and the hand-off to a session.
///
/// Only `KeyDown` events drive it, so holding a key never skips entries.
#[derive(Debug)]
pub struct MenuFlow {
    state: MenuState,
    config: Config,
    draft: Config,
    main_selected: usize,
    options_selected: usize,
}

impl MenuFlow {
    pub fn new(config: Config) -> Self {
        Self {
            state: MenuState::MainMenu,
            draft: config.clone(),
            config,
            main_selected: 0,
            options_selected: 0,
        }
    }

    pub fn state(&self) -> MenuState {
        self.state
    }

    /// Settings in force for new sessions.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Settings being edited on the options screen.
    pub fn draft(&self) -> &Config {
        &self.draft
    }

    pub fn main_selected(&self) -> usize {
        self.main_selected
    }

    pub fn options_selected(&self) -> OptionItem {
        OPTION_ITEMS[self.options_selected]
    }

    pub fn handle(&mut self, event: InputEvent) -> MenuCommand {
        let key = match event {
            InputEvent::Close => return MenuCommand::Quit,
            InputEvent::KeyDown(key) => key,
        };

        match self.state {
            MenuState::MainMenu => self.handle_main_menu(key),
            MenuState::Options => self.handle_options(key),
            MenuState::InSession(_) => MenuCommand::Nothing,
        }
    }

    /// Called once the running session is over.
    pub fn session_finished(&mut self) {
        self.state = MenuState::MainMenu;
    }

    fn handle_main_menu(&mut self, key: Key) -> MenuCommand {
        let last = MAIN_MENU_OPTIONS.len() - 1;
        match key {
            Key::Up => {
                self.main_selected = if self.main_selected > 0 {
                    self.main_selected - 1
                } else {
                    last
                };
                MenuCommand::Nothing
            }
            Key::Down => {
                self.main_selected = if self.main_selected < last {
                    self.main_selected + 1
                } else {
                    0
                };
                MenuCommand::Nothing
            }
            Key::Enter => self.activate(self.main_selected),
            Key::Char('q') | Key::Esc => MenuCommand::Quit,
            other => match other.digit() {
                Some(d @ 1..=4) => {
                    self.main_selected = d as usize - 1;
                    self.activate(self.main_selected)
                }
                _ => MenuCommand::Nothing,
            },
        }
    }

    fn activate(&mut self, entry: usize) -> MenuCommand {
        match entry {
            0 => self.start(Mode::Single),
            1 => self.start(Mode::Multiplayer),
            2 => {
                self.draft = self.config.clone();
                self.options_selected = 0;
                self.state = MenuState::Options;
                MenuCommand::Nothing
            }
            _ => MenuCommand::Quit,
        }
    }

    fn start(&mut self, mode: Mode) -> MenuCommand {
        self.state = MenuState::InSession(mode);
        MenuCommand::StartSession(mode)
    }

    fn handle_options(&mut self, key: Key) -> MenuCommand {
        let last = OPTION_ITEMS.len() - 1;
        match key {
            Key::Up => {
                self.options_selected = if self.options_selected > 0 {
                    self.options_selected - 1
                } else {
                    last
                };
            }
            Key::Down => {
                self.options_selected = if self.options_selected < last {
                    self.options_selected + 1
                } else {
                    0
                };
            }
            Key::Left | Key::Char('-') => self.adjust(-1),
            Key::Right | Key::Char('+') | Key::Char('=') => self.adjust(1),
            Key::Enter if self.options_selected() == OptionItem::SaveAndBack => {
                self.config = self.draft.clone();
                self.state = MenuState::MainMenu;
                tracing::info!(
                    ai_difficulty = self.config.ai_difficulty,
                    max_score = self.config.max_score,
                    "options confirmed"
                );
                return MenuCommand::SaveConfig(self.config.clone());
            }
            Key::Esc => {
                self.draft = self.config.clone();
                self.state = MenuState::MainMenu;
            }
            _ => {}
        }
        MenuCommand::Nothing
    }

    fn adjust(&mut self, delta: i32) {
        let item = self.options_selected();
        let draft = &mut self.draft;
        match item {
            OptionItem::Difficulty => {
                let value = (draft.ai_difficulty as i32 + delta).clamp(
                    *DIFFICULTY_RANGE.start() as i32,
                    *DIFFICULTY_RANGE.end() as i32,
                );
                draft.ai_difficulty = value as u8;
            }
            OptionItem::MaxScore => {
                let value = (draft.max_score as i32 + delta).clamp(
                    *MAX_SCORE_RANGE.start() as i32,
                    *MAX_SCORE_RANGE.end() as i32,
                );
                draft.max_score = value as u32;
            }
            OptionItem::Theme => {
                draft.theme = if delta > 0 {
                    draft.theme.next()
                } else {
                    draft.theme.prev()
                };
            }
            OptionItem::BoundaryRule => draft.boundary_rule = draft.boundary_rule.toggled(),
            OptionItem::SaveAndBack => {}
        }
    }

    /// One display line per option entry, reflecting the draft.
    pub fn option_lines(&self) -> Vec<String> {
        OPTION_ITEMS
            .iter()
            .map(|item| match item {
                OptionItem::Difficulty => format!("AI Difficulty: {}", self.draft.ai_difficulty),
                OptionItem::MaxScore => format!("Points to Win: {}", self.draft.max_score),
                OptionItem::Theme => format!("Theme: {}", self.draft.theme.label()),
                OptionItem::BoundaryRule => {
                    format!("Top Edge: {}", self.draft.boundary_rule.label())
                }
                OptionItem::SaveAndBack => "Save & Back".to_string(),
            })
            .collect()
    }
}
