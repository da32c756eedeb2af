use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlayerId {
    One,
    Two,
}

impl PlayerId {
    pub fn index(self) -> usize {
        match self {
            PlayerId::One => 0,
            PlayerId::Two => 1,
        }
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayerId::One => write!(f, "Player 1"),
            PlayerId::Two => write!(f, "Player 2"),
        }
    }
}

/// Points per player. Only ever goes up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScoreTally {
    points: [u32; 2],
}

impl ScoreTally {
    pub fn award(&mut self, player: PlayerId) -> u32 {
        let points = &mut self.points[player.index()];
        *points += 1;
        *points
    }

    pub fn get(&self, player: PlayerId) -> u32 {
        self.points[player.index()]
    }

    pub fn total(&self) -> u32 {
        self.points.iter().sum()
    }

    /// The first player at or past `max_score`, if any.
    pub fn leader_at(&self, max_score: u32) -> Option<PlayerId> {
        [PlayerId::One, PlayerId::Two]
            .into_iter()
            .find(|p| self.get(*p) >= max_score)
    }
}
