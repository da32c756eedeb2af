use std::{
    fs, io,
    ops::RangeInclusive,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{
    ball::BoundaryRule,
    error::ConfigError,
    game_theme::GameTheme,
    input::{Key, KeyBindings},
};

pub const DEFAULT_CONFIG_PATH: &str = "pong_config.json";

pub const DIFFICULTY_RANGE: RangeInclusive<u8> = 1..=10;
pub const MAX_SCORE_RANGE: RangeInclusive<u32> = 1..=20;
const TICK_RATE_RANGE: RangeInclusive<u32> = 10..=240;
/// Bounds for every size and speed, in arena units.
const DIMENSION_RANGE: RangeInclusive<u32> = 1..=4000;

/// Every persisted setting. Fields missing from the file take their default,
/// fields this version does not know about ride along in `extra` so that a
/// re-save keeps them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub arena_width: u32,
    pub arena_height: u32,
    pub paddle_width: u32,
    pub paddle_height: u32,
    pub paddle_speed: u32,
    pub ball_radius: u32,
    pub ball_speed: u32,
    pub tick_rate: u32,
    pub ai_enabled: bool,
    pub ai_difficulty: u8,
    pub max_score: u32,
    pub player1_keys: KeyBindings,
    pub player2_keys: KeyBindings,
    pub boundary_rule: BoundaryRule,
    pub theme: GameTheme,
    pub sound_enabled: bool,
    pub key_hold_ms: u64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            arena_width: 800,
            arena_height: 600,
            paddle_width: 100,
            paddle_height: 20,
            paddle_speed: 10,
            ball_radius: 10,
            ball_speed: 4,
            tick_rate: 60,
            ai_enabled: true,
            ai_difficulty: 5,
            max_score: 10,
            player1_keys: KeyBindings::new(Key::Left, Key::Right),
            player2_keys: KeyBindings::new(Key::Char('a'), Key::Char('d')),
            boundary_rule: BoundaryRule::default(),
            theme: GameTheme::default(),
            sound_enabled: true,
            key_hold_ms: 120,
            extra: Map::new(),
        }
    }
}

impl Config {
    /// Pulls every field back into a playable range.
    pub fn sanitized(mut self) -> Self {
        self.ai_difficulty = self
            .ai_difficulty
            .clamp(*DIFFICULTY_RANGE.start(), *DIFFICULTY_RANGE.end());
        self.max_score = self
            .max_score
            .clamp(*MAX_SCORE_RANGE.start(), *MAX_SCORE_RANGE.end());
        self.tick_rate = self
            .tick_rate
            .clamp(*TICK_RATE_RANGE.start(), *TICK_RATE_RANGE.end());

        for value in [
            &mut self.arena_width,
            &mut self.arena_height,
            &mut self.paddle_width,
            &mut self.paddle_height,
            &mut self.paddle_speed,
            &mut self.ball_radius,
            &mut self.ball_speed,
        ] {
            *value = (*value).clamp(*DIMENSION_RANGE.start(), *DIMENSION_RANGE.end());
        }

        // room for both paddles, the ball, and the paddle insets
        self.arena_width = self
            .arena_width
            .max(self.paddle_width.saturating_add(1))
            .max(self.ball_radius.saturating_mul(4));
        self.arena_height = self.arena_height.max(
            self.paddle_height
                .saturating_mul(2)
                .saturating_add(60)
                .saturating_add(self.ball_radius.saturating_mul(4)),
        );
        self
    }

    pub fn tick_duration(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.tick_rate.max(1) as f64)
    }

    pub fn key_hold(&self) -> Duration {
        Duration::from_millis(self.key_hold_ms)
    }
}

/// JSON settings file on disk.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the settings, falling back to defaults on any failure, and
    /// writes the merged result straight back.
    pub fn load(&self) -> Config {
        let config = match self.read() {
            Ok(Some(config)) => {
                tracing::info!(path = %self.path.display(), "settings loaded");
                config
            }
            Ok(None) => {
                tracing::info!(path = %self.path.display(), "no settings file, using defaults");
                Config::default()
            }
            Err(e) => {
                tracing::warn!(error = %e, "settings unusable, using defaults");
                Config::default()
            }
        };

        let config = config.sanitized();
        if let Err(e) = self.save(&config) {
            tracing::warn!(error = %e, "could not persist settings");
        }
        config
    }

    fn read(&self) -> Result<Option<Config>, ConfigError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        Ok(Some(serde_json::from_str(&raw)?))
    }

    pub fn save(&self, config: &Config) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(config)?;
        fs::write(&self.path, json).map_err(|source| ConfigError::Write {
            path: self.path.clone(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn scratch_path(name: &str) -> PathBuf {
        static COUNTER: AtomicUsize = AtomicUsize::new(0);
        let n = COUNTER.fetch_add(1, Ordering::Relaxed);
        std::env::temp_dir().join(format!(
            "terminal-pong-{}-{}-{}.json",
            name,
            std::process::id(),
            n
        ))
    }

    #[test]
    fn missing_file_is_created_with_defaults() {
        let path = scratch_path("missing");
        let store = ConfigStore::new(&path);

        let config = store.load();
        assert_eq!(config, Config::default());
        assert!(path.exists());

        let _ = fs::remove_file(path);
    }

    #[test]
    fn stored_values_win_and_gaps_are_backfilled() {
        let path = scratch_path("partial");
        fs::write(
            &path,
            r#"{ "ai_difficulty": 8, "max_score": 3, "player2_keys": { "left": "j", "right": "l" } }"#,
        )
        .unwrap();

        let config = ConfigStore::new(&path).load();
        assert_eq!(config.ai_difficulty, 8);
        assert_eq!(config.max_score, 3);
        assert_eq!(config.player2_keys, KeyBindings::new(Key::Char('j'), Key::Char('l')));
        assert_eq!(config.arena_width, 800);
        assert_eq!(config.player1_keys, KeyBindings::new(Key::Left, Key::Right));

        let rewritten: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(rewritten["arena_height"], 600);
        assert_eq!(rewritten["ai_difficulty"], 8);

        let _ = fs::remove_file(path);
    }

    #[test]
    fn malformed_file_recovers_to_defaults() {
        let path = scratch_path("malformed");
        fs::write(&path, "{ this is not json").unwrap();

        let config = ConfigStore::new(&path).load();
        assert_eq!(config, Config::default());

        let rewritten = fs::read_to_string(&path).unwrap();
        let parsed: Config = serde_json::from_str(&rewritten).unwrap();
        assert_eq!(parsed, Config::default());

        let _ = fs::remove_file(path);
    }

    #[test]
    fn unknown_fields_survive_a_resave() {
        let path = scratch_path("extra");
        fs::write(&path, r#"{ "window_title": "Pong!", "max_score": 5 }"#).unwrap();

        let store = ConfigStore::new(&path);
        let config = store.load();
        assert_eq!(config.extra.get("window_title"), Some(&Value::from("Pong!")));

        let rewritten: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(rewritten["window_title"], "Pong!");

        let _ = fs::remove_file(path);
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let config = Config {
            ai_difficulty: 0,
            max_score: 99,
            paddle_speed: 0,
            ..Config::default()
        }
        .sanitized();

        assert_eq!(config.ai_difficulty, 1);
        assert_eq!(config.max_score, 20);
        assert_eq!(config.paddle_speed, 1);
    }

    #[test]
    fn huge_sizes_are_capped_instead_of_overflowing() {
        let path = scratch_path("huge");
        fs::write(
            &path,
            r#"{ "ball_radius": 2000000000, "paddle_height": 4294967295, "arena_width": 4294967295 }"#,
        )
        .unwrap();

        let config = ConfigStore::new(&path).load();
        assert_eq!(config.ball_radius, 4000);
        assert_eq!(config.paddle_height, 4000);
        assert_eq!(config.arena_width, 16_000);
        assert_eq!(config.arena_height, 4000 * 2 + 60 + 4000 * 4);
        assert_eq!(config.max_score, 10);

        let _ = fs::remove_file(path);
    }

    #[test]
    fn boundary_rule_is_read_from_file() {
        let path = scratch_path("rule");
        fs::write(&path, r#"{ "boundary_rule": "bounce_top" }"#).unwrap();

        let config = ConfigStore::new(&path).load();
        assert_eq!(config.boundary_rule, BoundaryRule::BounceTop);

        let _ = fs::remove_file(path);
    }
}
