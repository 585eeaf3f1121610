use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter};

/// The last minute of extra time.
pub const MAX_MINUTE: i32 = 120;

#[derive(Clone, Copy, Debug, Default, Hash, PartialEq, Eq, PartialOrd, Ord, Display, EnumIter, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    #[default]
    Home,
    Away,
}
impl Side {
    pub fn opponent(&self) -> Side {
        match self {
            Side::Home => Side::Away,
            Side::Away => Side::Home,
        }
    }
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Score {
    pub home: u16,
    pub away: u16,
}
impl Score {
    pub fn new(home: u16, away: u16) -> Self {
        Self { home, away }
    }

    pub fn nil_all() -> Self {
        Self { home: 0, away: 0 }
    }

    /// Total goals, saturating at `u16::MAX`.
    pub fn total(&self) -> u16 {
        self.home.saturating_add(self.away)
    }
}

/// Running statistics for one team. Counts are signed so that out-of-range input can be tolerated;
/// the accessors floor everything at zero.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TeamStats {
    pub possession: i32,
    pub shots_on_target: i32,
    pub shots_off_target: i32,
    pub corners: i32,
    pub yellow_cards: i32,
    pub red_cards: i32,
    pub goals: i32,
}
impl Default for TeamStats {
    fn default() -> Self {
        Self {
            possession: 50,
            shots_on_target: 0,
            shots_off_target: 0,
            corners: 0,
            yellow_cards: 0,
            red_cards: 0,
            goals: 0,
        }
    }
}
impl TeamStats {
    pub fn possession(&self) -> f64 {
        self.possession.clamp(0, 100) as f64
    }

    pub fn shots_on_target(&self) -> f64 {
        self.shots_on_target.max(0) as f64
    }

    pub fn shots_off_target(&self) -> f64 {
        self.shots_off_target.max(0) as f64
    }

    pub fn corners(&self) -> f64 {
        self.corners.max(0) as f64
    }

    pub fn yellow_cards(&self) -> f64 {
        self.yellow_cards.max(0) as f64
    }

    pub fn red_cards(&self) -> f64 {
        self.red_cards.max(0) as f64
    }

    pub fn goals(&self) -> u16 {
        self.goals.clamp(0, u16::MAX as i32) as u16
    }

    /// Yellow cards plus red cards counted twice.
    pub fn card_points(&self) -> f64 {
        self.yellow_cards() + 2.0 * self.red_cards()
    }
}

/// A snapshot of a match in progress.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchSnapshot {
    pub home_team: String,
    pub away_team: String,
    pub home: TeamStats,
    pub away: TeamStats,
    pub minute: i32,
    /// The side playing at its own ground.
    pub venue: Side,
    /// Whether the caller wants the diagnostic factor breakdown rendered.
    pub diagnostics: bool,
}
impl MatchSnapshot {
    pub fn stats(&self, side: Side) -> &TeamStats {
        match side {
            Side::Home => &self.home,
            Side::Away => &self.away,
        }
    }

    /// The match minute, confined to \[0, 120\].
    pub fn minute(&self) -> f64 {
        self.minute.clamp(0, MAX_MINUTE) as f64
    }

    pub fn score(&self) -> Score {
        Score::new(self.home.goals(), self.away.goals())
    }

    pub fn team_name(&self, side: Side) -> &str {
        let (name, fallback) = match side {
            Side::Home => (self.home_team.trim(), "Home"),
            Side::Away => (self.away_team.trim(), "Away"),
        };
        if name.is_empty() {
            fallback
        } else {
            name
        }
    }
}

/// A pair of values, one per side.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct PerSide<T> {
    pub home: T,
    pub away: T,
}
impl<T> PerSide<T> {
    pub fn new(home: T, away: T) -> Self {
        Self { home, away }
    }

    pub fn from_fn(mut f: impl FnMut(Side) -> T) -> Self {
        Self {
            home: f(Side::Home),
            away: f(Side::Away),
        }
    }

    pub fn get(&self, side: Side) -> &T {
        match side {
            Side::Home => &self.home,
            Side::Away => &self.away,
        }
    }
}
