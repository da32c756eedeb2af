use rand::rngs::StdRng;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::Style,
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

use crate::{
    audio::{Audio, Sound},
    ball::{Arena, Ball, BoundaryRule},
    config::Config,
    game_theme::GameTheme,
    input::{InputEvent, Key, KeyBindings, KeyState},
    paddle::{ControlSource, Paddle},
    render::{ArenaRect, Renderer, Scene},
    score::{PlayerId, ScoreTally},
};

const PAUSE_KEY: Key = Key::Char('p');
const QUIT_KEYS: [Key; 2] = [Key::Char('q'), Key::Esc];

/// Distance of player 1's paddle from the top edge.
const TOP_PADDLE_INSET: f32 = 20.0;
/// Distance of player 2's paddle top from the bottom edge.
const BOTTOM_PADDLE_INSET: f32 = 40.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Single,
    Multiplayer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Running,
    Paused,
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    Won(PlayerId),
    Quit,
}

/// One match: two paddles, one ball, first to `max_score`.
#[derive(Debug)]
pub struct Session {
    mode: Mode,
    arena: Arena,
    rule: BoundaryRule,
    max_score: u32,
    paddles: [Paddle; 2],
    ball: Ball,
    scores: ScoreTally,
    state: SessionState,
    end: Option<SessionEnd>,
    ticks: u64,
    theme: GameTheme,
    rng: StdRng,
}

impl Session {
    /// Player 1 defends the top edge with the player-1 keys. Player 2 defends
    /// the bottom edge, played by the computer in single-player mode when the
    /// AI is enabled and by the player-2 keys otherwise.
    pub fn new(config: &Config, mode: Mode, mut rng: StdRng) -> Self {
        let arena = Arena {
            width: config.arena_width as f32,
            height: config.arena_height as f32,
        };
        let width = config.paddle_width as f32;
        let height = config.paddle_height as f32;
        let speed = config.paddle_speed as f32;
        let start_x = (arena.width - width) / 2.0;

        let player2_control = if mode == Mode::Single && config.ai_enabled {
            ControlSource::Ai {
                difficulty: config.ai_difficulty,
            }
        } else {
            ControlSource::Human(config.player2_keys)
        };

        let paddles = [
            Paddle::new(
                start_x,
                TOP_PADDLE_INSET,
                width,
                height,
                speed,
                ControlSource::Human(config.player1_keys),
            ),
            Paddle::new(
                start_x,
                arena.height - BOTTOM_PADDLE_INSET,
                width,
                height,
                speed,
                player2_control,
            ),
        ];
        let ball = Ball::new(
            &arena,
            config.ball_radius as f32,
            config.ball_speed as f32,
            &mut rng,
        );

        tracing::info!(
            ?mode,
            max_score = config.max_score,
            rule = ?config.boundary_rule,
            "session started"
        );

        Self {
            mode,
            arena,
            rule: config.boundary_rule,
            max_score: config.max_score,
            paddles,
            ball,
            scores: ScoreTally::default(),
            state: SessionState::Running,
            end: None,
            ticks: 0,
            theme: config.theme,
            rng,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn winner(&self) -> Option<PlayerId> {
        match self.end {
            Some(SessionEnd::Won(player)) => Some(player),
            _ => None,
        }
    }

    pub fn scores(&self) -> &ScoreTally {
        &self.scores
    }

    /// Applies this tick's events, then advances the simulation one step
    /// unless paused or finished.
    pub fn tick(
        &mut self,
        events: &[InputEvent],
        keys: &KeyState,
        audio: &mut dyn Audio,
    ) -> SessionState {
        if self.state == SessionState::Finished {
            return self.state;
        }

        for event in events {
            self.handle_event(*event);
            if self.state == SessionState::Finished {
                return self.state;
            }
        }

        if self.state == SessionState::Running {
            self.step(keys, audio);
        }
        self.state
    }

    fn handle_event(&mut self, event: InputEvent) {
        match event {
            InputEvent::Close => self.finish(SessionEnd::Quit),
            InputEvent::KeyDown(key) if QUIT_KEYS.contains(&key) => self.finish(SessionEnd::Quit),
            InputEvent::KeyDown(PAUSE_KEY) => self.toggle_pause(),
            InputEvent::KeyDown(_) => {}
        }
    }

    fn toggle_pause(&mut self) {
        self.state = match self.state {
            SessionState::Running => SessionState::Paused,
            SessionState::Paused => SessionState::Running,
            SessionState::Finished => SessionState::Finished,
        };
        tracing::debug!(state = ?self.state, "pause toggled");
    }

    fn finish(&mut self, end: SessionEnd) {
        self.state = SessionState::Finished;
        self.end = Some(end);
        tracing::info!(
            ?end,
            player1 = self.scores.get(PlayerId::One),
            player2 = self.scores.get(PlayerId::Two),
            ticks = self.ticks,
            "session finished"
        );
    }

    fn step(&mut self, keys: &KeyState, audio: &mut dyn Audio) {
        self.ticks += 1;

        let ball_x = self.ball.x;
        for paddle in self.paddles.iter_mut() {
            paddle.update(keys, Some(ball_x), self.arena.width);
        }

        let outcome = self
            .ball
            .advance(&self.arena, self.rule, &self.paddles, &mut self.rng);

        if outcome.paddle_hit {
            audio.play(Sound::PaddleHit);
        } else if outcome.wall_bounce {
            audio.play(Sound::WallBounce);
        }

        if let Some(scorer) = outcome.scored {
            let points = self.scores.award(scorer);
            tracing::debug!(
                %scorer,
                points,
                total = self.scores.total(),
                tick = self.ticks,
                "point scored"
            );

            if let Some(winner) = self.scores.leader_at(self.max_score) {
                audio.play(Sound::Win);
                self.finish(SessionEnd::Won(winner));
            } else {
                audio.play(Sound::Score);
            }
        }
    }

    fn player_label(&self, player: PlayerId) -> &'static str {
        match (player, self.paddles[player.index()].is_ai()) {
            (_, true) => "Computer",
            (PlayerId::One, false) => "Player 1",
            (PlayerId::Two, false) => "Player 2",
        }
    }

    /// Records the arena contents: centre line, paddles, ball, scores, and the
    /// pause or winner banner.
    pub fn render(&self, renderer: &mut impl Renderer) {
        let colors = self.theme.colors();
        let (cx, cy) = self.arena.center();

        renderer.clear();

        let dash = 20.0;
        let mut x = 0.0;
        while x < self.arena.width {
            renderer.draw_rect(
                ArenaRect {
                    x,
                    y: cy - 1.0,
                    width: dash,
                    height: 2.0,
                },
                colors.border,
            );
            x += dash * 2.0;
        }

        for paddle in &self.paddles {
            let color = if paddle.is_ai() {
                colors.ai_paddle
            } else {
                colors.paddle
            };
            renderer.draw_rect(
                ArenaRect {
                    x: paddle.x,
                    y: paddle.y,
                    width: paddle.width,
                    height: paddle.height,
                },
                color,
            );
        }

        renderer.draw_circle((self.ball.x, self.ball.y), self.ball.radius, colors.ball);

        let score_x = self.arena.width - 80.0;
        renderer.draw_text(
            &self.scores.get(PlayerId::One).to_string(),
            (score_x, cy - 50.0),
            colors.text,
            36,
        );
        renderer.draw_text(
            &self.scores.get(PlayerId::Two).to_string(),
            (score_x, cy + 30.0),
            colors.text,
            36,
        );

        match (self.state, self.end) {
            (SessionState::Paused, _) => {
                renderer.draw_text("PAUSED", (cx, cy - 140.0), colors.accent, 64);
                renderer.draw_text(
                    "[P] resume   [Q/Esc] quit",
                    (cx, cy + 80.0),
                    colors.text,
                    24,
                );
            }
            (_, Some(SessionEnd::Won(winner))) => {
                renderer.draw_text(
                    &format!("{} wins!", self.player_label(winner)),
                    (cx, cy - 140.0),
                    colors.accent,
                    64,
                );
            }
            _ => {}
        }

        renderer.present();
    }

    fn controls_text(&self) -> String {
        let keys = |bindings: &KeyBindings| format!("{}/{}", bindings.left, bindings.right);
        let mut text = String::from(" ");
        for (i, paddle) in self.paddles.iter().enumerate() {
            if let ControlSource::Human(bindings) = &paddle.control {
                text.push_str(&format!("P{}: {}  |  ", i + 1, keys(bindings)));
            }
        }
        text.push_str("P=Pause  |  Q/Esc=Quit ");
        text
    }

    fn block_title(&self, app_name: &'static str) -> String {
        let p1_text = format!(
            "{} ({})",
            self.player_label(PlayerId::One),
            self.scores.get(PlayerId::One)
        );
        let p2_text = format!(
            "({}) {}",
            self.scores.get(PlayerId::Two),
            self.player_label(PlayerId::Two)
        );
        let target = format!("{} to {}", app_name, self.max_score);
        let mode = match self.mode {
            Mode::Single => "vs AI",
            Mode::Multiplayer => "2P",
        };
        format!(" {}  ──  {} [{}]  ──  {} ", p1_text, target, mode, p2_text)
    }

    /// Draws the session chrome around the arena scene the way [`render`]
    /// last recorded it.
    ///
    /// [`render`]: Session::render
    pub fn draw(&self, frame: &mut Frame, scene: &Scene) {
        let colors = self.theme.colors();
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints(vec![Constraint::Fill(1), Constraint::Length(3)])
            .split(frame.area());

        let block = Block::default()
            .title(self.block_title("terminal.pong"))
            .borders(Borders::ALL)
            .border_type(BorderType::Thick)
            .style(Style::default().fg(colors.border).bg(colors.background))
            .title_alignment(Alignment::Center);
        scene.paint(frame, layout[0], block);

        let controls = Paragraph::new(self.controls_text())
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .style(Style::default().fg(colors.border)),
            )
            .style(Style::default().fg(colors.text))
            .alignment(Alignment::Center);
        frame.render_widget(controls, layout[1]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::Silent;
    use rand::SeedableRng;
    use std::time::Instant;

    struct Recorder(Vec<Sound>);

    impl Audio for Recorder {
        fn play(&mut self, sound: Sound) {
            self.0.push(sound);
        }
    }

    fn session(mode: Mode) -> Session {
        Session::new(&Config::default(), mode, StdRng::seed_from_u64(42))
    }

    fn idle() -> KeyState {
        KeyState::with_hold(None)
    }

    #[test]
    fn single_player_faces_the_ai() {
        let s = session(Mode::Single);
        assert_eq!(
            s.paddles[0].control,
            ControlSource::Human(Config::default().player1_keys)
        );
        assert_eq!(s.paddles[1].control, ControlSource::Ai { difficulty: 5 });
        assert_eq!(s.state(), SessionState::Running);
        assert_eq!(s.scores().total(), 0);
    }

    #[test]
    fn multiplayer_uses_both_bindings() {
        let s = session(Mode::Multiplayer);
        assert!(!s.paddles[0].is_ai());
        assert_eq!(
            s.paddles[1].control,
            ControlSource::Human(Config::default().player2_keys)
        );
    }

    #[test]
    fn disabled_ai_hands_player_two_to_the_keyboard() {
        let config = Config {
            ai_enabled: false,
            ..Config::default()
        };
        let s = Session::new(&config, Mode::Single, StdRng::seed_from_u64(1));
        assert!(!s.paddles[1].is_ai());
    }

    #[test]
    fn paddles_start_centred_on_their_edges() {
        let s = session(Mode::Multiplayer);
        assert_eq!((s.paddles[0].x, s.paddles[0].y), (350.0, 20.0));
        assert_eq!((s.paddles[1].x, s.paddles[1].y), (350.0, 560.0));
        assert_eq!((s.ball.x, s.ball.y), (400.0, 300.0));
    }

    #[test]
    fn pause_freezes_the_simulation() {
        let mut s = session(Mode::Single);
        let pause = [InputEvent::KeyDown(PAUSE_KEY)];

        assert_eq!(s.tick(&pause, &idle(), &mut Silent), SessionState::Paused);
        let frozen = s.ball.clone();
        for _ in 0..10 {
            s.tick(&[], &idle(), &mut Silent);
        }
        assert_eq!(s.ball, frozen);
        assert_eq!(s.ticks, 0);

        assert_eq!(s.tick(&pause, &idle(), &mut Silent), SessionState::Running);
        assert_ne!(s.ball, frozen);
        assert_eq!(s.ticks, 1);
    }

    #[test]
    fn quit_keys_and_close_end_the_session() {
        for event in [
            InputEvent::KeyDown(Key::Esc),
            InputEvent::KeyDown(Key::Char('q')),
            InputEvent::Close,
        ] {
            let mut s = session(Mode::Multiplayer);
            s.tick(&[InputEvent::KeyDown(PAUSE_KEY)], &idle(), &mut Silent);
            assert_eq!(s.tick(&[event], &idle(), &mut Silent), SessionState::Finished);
            assert_eq!(s.end, Some(SessionEnd::Quit));
            assert_eq!(s.winner(), None);
        }
    }

    #[test]
    fn reaching_max_score_finishes_with_a_winner() {
        let mut s = session(Mode::Multiplayer);
        for _ in 0..9 {
            s.scores.award(PlayerId::One);
        }
        s.ball.x = 200.0;
        s.ball.y = 588.0;
        s.ball.vx = -4.0;
        s.ball.vy = 4.0;

        let mut audio = Recorder(Vec::new());
        assert_eq!(s.tick(&[], &idle(), &mut audio), SessionState::Finished);
        assert_eq!(s.scores().get(PlayerId::One), 10);
        assert_eq!(s.winner(), Some(PlayerId::One));
        assert_eq!(audio.0.last(), Some(&Sound::Win));

        let mut scene = Scene::new(800.0, 600.0);
        s.render(&mut scene);
        assert!(scene.texts().any(|t| t == "Player 1 wins!"));

        let ticks = s.ticks;
        let ball = s.ball.clone();
        s.tick(&[InputEvent::KeyDown(PAUSE_KEY)], &idle(), &mut audio);
        assert_eq!(s.state(), SessionState::Finished);
        assert_eq!(s.ticks, ticks);
        assert_eq!(s.ball, ball);
    }

    #[test]
    fn scores_grow_by_at_most_one_per_tick() {
        let config = Config {
            max_score: 20,
            ..Config::default()
        };
        let mut s = Session::new(&config, Mode::Single, StdRng::seed_from_u64(9));
        let mut audio = Recorder(Vec::new());
        let mut last_total = 0;

        for _ in 0..20_000 {
            if s.tick(&[], &idle(), &mut audio) == SessionState::Finished {
                break;
            }
            let total = s.scores().total();
            assert!(total - last_total <= 1);
            last_total = total;
        }

        let points = audio
            .0
            .iter()
            .filter(|sound| matches!(sound, Sound::Score | Sound::Win))
            .count() as u32;
        assert_eq!(points, s.scores().total());
        assert!(points > 0);
    }

    #[test]
    fn held_keys_move_player_one() {
        let mut s = session(Mode::Multiplayer);
        let mut keys = idle();
        keys.press(Key::Right, Instant::now());

        s.tick(&[], &keys, &mut Silent);
        assert_eq!(s.paddles[0].x, 360.0);
        assert_eq!(s.paddles[1].x, 350.0);
    }

    #[test]
    fn pause_banner_is_rendered() {
        let mut s = session(Mode::Single);
        s.tick(&[InputEvent::KeyDown(PAUSE_KEY)], &idle(), &mut Silent);

        let mut scene = Scene::new(800.0, 600.0);
        s.render(&mut scene);
        assert!(scene.texts().any(|t| t == "PAUSED"));
    }
}
