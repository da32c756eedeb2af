use std::{
    thread::sleep,
    time::{Duration, Instant},
};

use ratatui::layout::Rect;

pub fn centered_rect_with_percentage(percent_x: u16, percent_y: u16, cols: u16, rows: u16) -> Rect {
    let width = cols * percent_x / 100;
    let height = std::cmp::min(std::cmp::max(rows * percent_y / 100, 5), rows);
    Rect::new((cols - width) / 2, (rows - height) / 2, width, height)
}

pub fn centered_rect(width: u16, height: u16, cols: u16, rows: u16) -> Rect {
    let actual_width = std::cmp::min(width, cols);
    let actual_height = std::cmp::min(height, rows);

    Rect::new(
        (cols - actual_width) / 2,
        (rows - actual_height) / 2,
        actual_width,
        actual_height,
    )
}

/// Paces a loop to a fixed number of iterations per second.
///
/// Boundaries sit on a fixed grid from the first tick. A loop that falls more
/// than one period behind skips ahead instead of bursting to catch up.
#[derive(Debug)]
pub struct Ticker {
    period: Duration,
    next: Instant,
}

impl Ticker {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            next: Instant::now() + period,
        }
    }

    /// How long to wait at `now` before the next boundary, advancing the grid.
    pub fn delay_at(&mut self, now: Instant) -> Duration {
        let delay = self.next.saturating_duration_since(now);
        self.next += self.period;
        if self.next < now {
            self.next = now + self.period;
        }
        delay
    }

    /// Blocks until the next tick boundary.
    pub fn wait(&mut self) {
        let delay = self.delay_at(Instant::now());
        if !delay.is_zero() {
            sleep(delay);
        }
    }
}
