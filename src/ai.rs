//! Proportional paddle controller for the computer opponent.

use crate::config::DIFFICULTY_RANGE;

/// How far an AI paddle at `paddle_x` moves this tick to chase a ball at
/// `ball_x`.
///
/// The paddle aims to centre itself under the ball. It covers at most
/// `speed * difficulty / 10` per tick and snaps onto the target once it is
/// within one step, so difficulty 10 tracks at full paddle speed and
/// difficulty 1 crawls at a tenth of it. Difficulty outside 1..=10 is clamped.
pub fn displacement(ball_x: f32, paddle_x: f32, paddle_width: f32, speed: f32, difficulty: u8) -> f32 {
    let difficulty = difficulty.clamp(*DIFFICULTY_RANGE.start(), *DIFFICULTY_RANGE.end());
    let target = ball_x - paddle_width / 2.0;
    let diff = target - paddle_x;
    let step = speed * (difficulty as f32 / 10.0);

    if diff > step {
        step
    } else if diff < -step {
        -step
    } else {
        diff
    }
}
