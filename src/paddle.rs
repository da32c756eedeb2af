use crate::{
    ai,
    input::{KeyBindings, KeyState},
};

/// Who moves a paddle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlSource {
    Human(KeyBindings),
    Ai { difficulty: u8 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Paddle {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub speed: f32,
    pub control: ControlSource,
}

impl Paddle {
    pub fn new(x: f32, y: f32, width: f32, height: f32, speed: f32, control: ControlSource) -> Self {
        Self {
            x,
            y,
            width,
            height,
            speed,
            control,
        }
    }

    pub fn is_ai(&self) -> bool {
        matches!(self.control, ControlSource::Ai { .. })
    }

    /// Moves the paddle for one tick and returns its new x.
    ///
    /// Human paddles check the left key, then the right key, each against the
    /// position left by the previous check. AI paddles chase `ball_x` and hold
    /// still when there is none. Either way x ends up in
    /// `[0, arena_width - width]`.
    pub fn update(&mut self, keys: &KeyState, ball_x: Option<f32>, arena_width: f32) -> f32 {
        match self.control {
            ControlSource::Human(bindings) => {
                if keys.is_held(bindings.left) && self.x > 0.0 {
                    self.x -= self.speed;
                }
                if keys.is_held(bindings.right) && self.x + self.width < arena_width {
                    self.x += self.speed;
                }
            }
            ControlSource::Ai { difficulty } => {
                if let Some(ball_x) = ball_x {
                    self.x += ai::displacement(ball_x, self.x, self.width, self.speed, difficulty);
                }
            }
        }

        self.clamp_to(arena_width);
        self.x
    }

    fn clamp_to(&mut self, arena_width: f32) {
        let max_x = (arena_width - self.width).max(0.0);
        self.x = self.x.clamp(0.0, max_x);
    }

    pub fn left(&self) -> f32 {
        self.x
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn top(&self) -> f32 {
        self.y
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }
}
