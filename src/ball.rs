use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{paddle::Paddle, score::PlayerId};

/// What happens when the ball crosses the top or bottom edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryRule {
    /// Top edge scores for player 2, bottom edge for player 1.
    #[default]
    ScoreBoth,
    /// The top edge is a wall. Only the bottom edge scores, for player 1.
    BounceTop,
}

impl BoundaryRule {
    pub fn label(&self) -> &'static str {
        match self {
            BoundaryRule::ScoreBoth => "Score on both edges",
            BoundaryRule::BounceTop => "Bounce off top wall",
        }
    }

    pub fn toggled(&self) -> BoundaryRule {
        match self {
            BoundaryRule::ScoreBoth => BoundaryRule::BounceTop,
            BoundaryRule::BounceTop => BoundaryRule::ScoreBoth,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Arena {
    pub width: f32,
    pub height: f32,
}

impl Arena {
    pub fn center(&self) -> (f32, f32) {
        (self.width / 2.0, self.height / 2.0)
    }
}

/// Result of one physics step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickOutcome {
    pub scored: Option<PlayerId>,
    pub wall_bounce: bool,
    pub paddle_hit: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ball {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub vx: f32,
    pub vy: f32,
    speed: f32,
}

impl Ball {
    /// A ball served from the centre of `arena`.
    pub fn new<R: Rng + ?Sized>(arena: &Arena, radius: f32, speed: f32, rng: &mut R) -> Self {
        let mut ball = Self {
            x: 0.0,
            y: 0.0,
            radius,
            vx: speed,
            vy: speed,
            speed,
        };
        ball.reset(arena, rng);
        ball
    }

    /// Back to the centre with an independently random sign on each axis.
    pub fn reset<R: Rng + ?Sized>(&mut self, arena: &Arena, rng: &mut R) {
        (self.x, self.y) = arena.center();
        self.vx = if rng.random_bool(0.5) { self.speed } else { -self.speed };
        self.vy = if rng.random_bool(0.5) { self.speed } else { -self.speed };
    }

    /// One tick: move, bounce off the side walls, settle the vertical edges,
    /// then bounce off paddles.
    ///
    /// A score resets the ball before the paddle checks run, so a ball that
    /// crosses an edge while touching a paddle still counts as a point, and
    /// one crossing can only ever produce one point.
    pub fn advance<R: Rng + ?Sized>(
        &mut self,
        arena: &Arena,
        rule: BoundaryRule,
        paddles: &[Paddle],
        rng: &mut R,
    ) -> TickOutcome {
        let mut outcome = TickOutcome::default();

        self.x += self.vx;
        self.y += self.vy;

        if self.x - self.radius < 0.0 || self.x + self.radius > arena.width {
            self.vx = -self.vx;
            outcome.wall_bounce = true;
        }

        if self.y - self.radius < 0.0 {
            match rule {
                BoundaryRule::ScoreBoth => outcome.scored = Some(PlayerId::Two),
                BoundaryRule::BounceTop => {
                    self.vy = -self.vy;
                    outcome.wall_bounce = true;
                }
            }
        } else if self.y + self.radius > arena.height {
            outcome.scored = Some(PlayerId::One);
        }

        if outcome.scored.is_some() {
            self.reset(arena, rng);
            return outcome;
        }

        for paddle in paddles {
            if self.overlaps(paddle) {
                self.vy = -self.vy;
                outcome.paddle_hit = true;
            }
        }

        outcome
    }

    /// Bounding square against the paddle rectangle. Touching edges do not count.
    pub fn overlaps(&self, paddle: &Paddle) -> bool {
        self.x - self.radius < paddle.right()
            && self.x + self.radius > paddle.left()
            && self.y - self.radius < paddle.bottom()
            && self.y + self.radius > paddle.top()
    }
}
