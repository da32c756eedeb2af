use std::io::{self, Write};

/// Cues the session can ask for. None of them affect gameplay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sound {
    PaddleHit,
    WallBounce,
    Score,
    Win,
}

pub trait Audio {
    fn play(&mut self, sound: Sound);
}

/// Rings the terminal bell for points and wins. Bounces are silent.
#[derive(Default)]
pub struct TerminalBell {
    muted: bool,
}

impl TerminalBell {
    pub fn new() -> Self {
        Self::default()
    }

    fn ring(&mut self) -> io::Result<()> {
        let mut stdout = io::stdout().lock();
        stdout.write_all(b"\x07")?;
        stdout.flush()
    }
}

impl Audio for TerminalBell {
    fn play(&mut self, sound: Sound) {
        if self.muted || !matches!(sound, Sound::Score | Sound::Win) {
            return;
        }
        if let Err(e) = self.ring() {
            tracing::warn!(error = %e, ?sound, "terminal bell unavailable, muting audio");
            self.muted = true;
        }
    }
}

/// Plays nothing.
pub struct Silent;

impl Audio for Silent {
    fn play(&mut self, _sound: Sound) {}
}
