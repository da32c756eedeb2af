use std::{
    collections::HashMap,
    fmt, io,
    str::FromStr,
    time::{Duration, Instant},
};

use crossterm::{
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute, terminal,
};
use serde::{Deserialize, Serialize};

/// Logical keys the game understands. Letters are stored lowercase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Key {
    Left,
    Right,
    Up,
    Down,
    Enter,
    Esc,
    Space,
    Char(char),
}

impl Key {
    fn from_code(code: KeyCode) -> Option<Key> {
        match code {
            KeyCode::Left => Some(Key::Left),
            KeyCode::Right => Some(Key::Right),
            KeyCode::Up => Some(Key::Up),
            KeyCode::Down => Some(Key::Down),
            KeyCode::Enter => Some(Key::Enter),
            KeyCode::Esc => Some(Key::Esc),
            KeyCode::Char(' ') => Some(Key::Space),
            KeyCode::Char(c) => Some(Key::Char(c.to_ascii_lowercase())),
            _ => None,
        }
    }

    /// Menu digit, if this key is one.
    pub fn digit(self) -> Option<u32> {
        match self {
            Key::Char(c) => c.to_digit(10),
            _ => None,
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Left => write!(f, "left"),
            Key::Right => write!(f, "right"),
            Key::Up => write!(f, "up"),
            Key::Down => write!(f, "down"),
            Key::Enter => write!(f, "enter"),
            Key::Esc => write!(f, "esc"),
            Key::Space => write!(f, "space"),
            Key::Char(c) => write!(f, "{}", c),
        }
    }
}

impl FromStr for Key {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        match lower.as_str() {
            "left" => Ok(Key::Left),
            "right" => Ok(Key::Right),
            "up" => Ok(Key::Up),
            "down" => Ok(Key::Down),
            "enter" | "return" => Ok(Key::Enter),
            "esc" | "escape" => Ok(Key::Esc),
            "space" => Ok(Key::Space),
            other => {
                let mut chars = other.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) if c.is_ascii_graphic() => Ok(Key::Char(c)),
                    _ => Err(format!("unknown key name '{}'", s)),
                }
            }
        }
    }
}

impl TryFrom<String> for Key {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Key> for String {
    fn from(key: Key) -> Self {
        key.to_string()
    }
}

/// The two directional keys driving one human paddle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyBindings {
    pub left: Key,
    pub right: Key,
}

impl KeyBindings {
    pub const fn new(left: Key, right: Key) -> Self {
        Self { left, right }
    }
}

/// Discrete events drained from the terminal each tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    /// Ctrl+C, the terminal's stand-in for closing the window.
    Close,
    /// A fresh key press. Auto-repeat never produces one when the terminal
    /// reports event kinds.
    KeyDown(Key),
}

/// Keys currently held down.
///
/// When the terminal cannot report releases, a key counts as held for `hold`
/// after its most recent press or repeat.
#[derive(Debug, Clone, Default)]
pub struct KeyState {
    held: HashMap<Key, Instant>,
    hold: Option<Duration>,
}

impl KeyState {
    pub fn with_hold(hold: Option<Duration>) -> Self {
        Self {
            held: HashMap::new(),
            hold,
        }
    }

    pub fn press(&mut self, key: Key, at: Instant) {
        self.held.insert(key, at);
    }

    pub fn release(&mut self, key: Key) {
        self.held.remove(&key);
    }

    pub fn expire(&mut self, now: Instant) {
        if let Some(hold) = self.hold {
            self.held
                .retain(|_, pressed_at| now.saturating_duration_since(*pressed_at) < hold);
        }
    }

    pub fn is_held(&self, key: Key) -> bool {
        self.held.contains_key(&key)
    }

    pub fn clear(&mut self) {
        self.held.clear();
    }
}

pub trait InputSource {
    /// Drains every pending event without blocking.
    fn poll_events(&mut self) -> io::Result<Vec<InputEvent>>;

    fn keys(&self) -> &KeyState;

    /// Throws away anything queued, including held keys.
    fn discard_pending(&mut self) -> io::Result<()> {
        self.poll_events().map(|_| ())
    }
}

/// crossterm-backed input. Releases seen during one poll are applied at the
/// start of the next, so a tap shorter than a tick still moves the paddle once.
pub struct TerminalInput {
    keys: KeyState,
    deferred_releases: Vec<Key>,
    enhanced: bool,
}

impl TerminalInput {
    pub fn new(hold: Duration) -> Self {
        let enhanced = matches!(terminal::supports_keyboard_enhancement(), Ok(true))
            && execute!(
                io::stdout(),
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )
            .is_ok();
        tracing::info!(enhanced, "keyboard input ready");

        Self {
            keys: KeyState::with_hold(if enhanced { None } else { Some(hold) }),
            deferred_releases: Vec::new(),
            enhanced,
        }
    }

    fn handle_key_event(&mut self, key_event: KeyEvent, events: &mut Vec<InputEvent>) {
        if key_event.kind == KeyEventKind::Press
            && key_event.modifiers.contains(KeyModifiers::CONTROL)
            && key_event.code == KeyCode::Char('c')
        {
            events.push(InputEvent::Close);
            return;
        }

        let Some(key) = Key::from_code(key_event.code) else {
            return;
        };

        match key_event.kind {
            KeyEventKind::Press => {
                self.keys.press(key, Instant::now());
                events.push(InputEvent::KeyDown(key));
            }
            KeyEventKind::Repeat => self.keys.press(key, Instant::now()),
            KeyEventKind::Release => self.deferred_releases.push(key),
        }
    }
}

impl InputSource for TerminalInput {
    fn poll_events(&mut self) -> io::Result<Vec<InputEvent>> {
        for key in self.deferred_releases.drain(..) {
            self.keys.release(key);
        }

        let mut events = Vec::new();
        while event::poll(Duration::ZERO)? {
            if let Event::Key(key_event) = event::read()? {
                self.handle_key_event(key_event, &mut events);
            }
        }

        self.keys.expire(Instant::now());
        Ok(events)
    }

    fn keys(&self) -> &KeyState {
        &self.keys
    }

    fn discard_pending(&mut self) -> io::Result<()> {
        self.poll_events()?;
        self.deferred_releases.clear();
        self.keys.clear();
        Ok(())
    }
}

impl Drop for TerminalInput {
    fn drop(&mut self) {
        if self.enhanced {
            let _ = execute!(io::stdout(), PopKeyboardEnhancementFlags);
        }
    }
}
