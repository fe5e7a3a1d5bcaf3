//! Player crawl data model

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use crate::error::ScrapeError;

/// One flat record per successfully parsed player page.
///
/// Fields absent from the source page keep their neutral default
/// (empty string / zero).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PlayerRecord {
    pub name: String,
    pub age: u32,
    pub nationality: String,
    /// Centimetres
    pub height: u32,
    /// Kilograms
    pub weight: u32,
    pub team: String,
    pub skill: f32,
    pub potential: f32,
    /// Currency text with the "€" symbol stripped, e.g. "12.5m"
    pub current_fee: String,
    /// Highest xTV valuation, "€" stripped
    pub highest_xtv: String,
    pub trophies: u32,
    pub preferred_foot: String,
    pub best_playing_role: String,
    pub season: String,
    pub matches_played: u32,
    pub minutes_played: f32,
    pub goals: u32,
    pub assists: u32,
    pub yellow_cards: u32,
    pub red_cards: u32,
    pub shots: f32,
    pub penalties: u32,
    pub expected_goals: u32,
    pub attacking_challenges: u32,
    pub passes: f32,
    pub key_passes: u32,
    pub crosses: u32,
    pub offsides: u32,
    pub ball_recoveries: u32,
    pub ball_recoveries_opponent_half: u32,
    pub challenges: u32,
    pub air_challenges: u32,
    pub tackles: u32,
    pub ball_interceptions: u32,
    pub lost_balls: u32,
    pub lost_balls_own_half: u32,
    pub errors_leading_to_goal: u32,
}

/// CSV column names, in record declaration order.
pub const FIELD_NAMES: [&str; 37] = [
    "Name",
    "Age",
    "Nationality",
    "Height",
    "Weight",
    "Team",
    "Skill",
    "Pot",
    "Current_Fee",
    "Highest_xTV",
    "num_trophies",
    "Preferred_foot",
    "Best_Playing_Role",
    "Season",
    "Matches_played",
    "Minutes_played",
    "Goals",
    "Assists",
    "Yellow_Cards",
    "Red_Cards",
    "Shots",
    "Penalties",
    "Expected_Goals",
    "Attacking_Challenges",
    "Passes",
    "Key_Passes",
    "Crosses",
    "Offsides",
    "Ball_Recoveries",
    "Ball_Recoveries_Opponent",
    "Challenges",
    "Air_Challenges",
    "Tackles",
    "Ball_Interceptions",
    "Lost_Balls",
    "Lost_Balls_Own",
    "Errors_to_Goal",
];

impl PlayerRecord {
    /// Cells for one CSV row, aligned with [`FIELD_NAMES`].
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.age.to_string(),
            self.nationality.clone(),
            self.height.to_string(),
            self.weight.to_string(),
            self.team.clone(),
            self.skill.to_string(),
            self.potential.to_string(),
            self.current_fee.clone(),
            self.highest_xtv.clone(),
            self.trophies.to_string(),
            self.preferred_foot.clone(),
            self.best_playing_role.clone(),
            self.season.clone(),
            self.matches_played.to_string(),
            self.minutes_played.to_string(),
            self.goals.to_string(),
            self.assists.to_string(),
            self.yellow_cards.to_string(),
            self.red_cards.to_string(),
            self.shots.to_string(),
            self.penalties.to_string(),
            self.expected_goals.to_string(),
            self.attacking_challenges.to_string(),
            self.passes.to_string(),
            self.key_passes.to_string(),
            self.crosses.to_string(),
            self.offsides.to_string(),
            self.ball_recoveries.to_string(),
            self.ball_recoveries_opponent_half.to_string(),
            self.challenges.to_string(),
            self.air_challenges.to_string(),
            self.tackles.to_string(),
            self.ball_interceptions.to_string(),
            self.lost_balls.to_string(),
            self.lost_balls_own_half.to_string(),
            self.errors_leading_to_goal.to_string(),
        ]
    }
}

/// Why a player was dropped instead of recorded.
#[derive(Debug, Error)]
pub enum SkipReason {
    #[error("profile field missing: {0}")]
    MissingField(String),

    #[error("unparseable number in {field}: {value:?}")]
    BadNumber { field: &'static str, value: String },

    #[error("stats tab not present")]
    StatsTabMissing,

    #[error("no stats rows for season {0}")]
    NoSeasonRows(String),

    #[error("browser failure: {0}")]
    Browser(#[from] ScrapeError),
}

/// A dropped player and the reason it was dropped.
#[derive(Debug)]
pub struct SkippedPlayer {
    pub url: String,
    pub reason: SkipReason,
}

/// How a listing page ended up.
#[derive(Debug)]
pub enum PageStatus {
    /// Links were harvested and the players processed
    Harvested,
    /// The page loaded but listed no players
    Empty,
    /// Navigation or harvest failed after all attempts
    Failed(String),
}

/// Everything that happened on one listing page.
#[derive(Debug)]
pub struct PageReport {
    pub page: u32,
    pub url: String,
    pub status: PageStatus,
    pub records: Vec<PlayerRecord>,
    pub skipped: Vec<SkippedPlayer>,
}

impl PageReport {
    pub fn failed(page: u32, url: impl Into<String>, error: &ScrapeError) -> Self {
        Self {
            page,
            url: url.into(),
            status: PageStatus::Failed(error.to_string()),
            records: Vec::new(),
            skipped: Vec::new(),
        }
    }
}

/// Accumulated result of a whole crawl run.
#[derive(Debug, Default)]
pub struct CrawlSummary {
    pub reports: Vec<PageReport>,
}

impl CrawlSummary {
    pub fn records(&self) -> impl Iterator<Item = &PlayerRecord> {
        self.reports.iter().flat_map(|r| r.records.iter())
    }

    pub fn record_count(&self) -> usize {
        self.reports.iter().map(|r| r.records.len()).sum()
    }

    pub fn skipped_count(&self) -> usize {
        self.reports.iter().map(|r| r.skipped.len()).sum()
    }

    pub fn failed_pages(&self) -> usize {
        self.reports
            .iter()
            .filter(|r| matches!(r.status, PageStatus::Failed(_)))
            .count()
    }

    pub fn empty_pages(&self) -> usize {
        self.reports
            .iter()
            .filter(|r| matches!(r.status, PageStatus::Empty))
            .count()
    }
}

/// Final output of a one-shot run.
#[derive(Debug)]
pub struct CrawlOutcome {
    pub csv_path: PathBuf,
    pub summary: CrawlSummary,
}
