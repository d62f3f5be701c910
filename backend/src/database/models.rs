use chrono::NaiveDateTime;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};

use crate::domain::{MatchType, PlayerUpdate, TournamentStatus, TournamentUpdate};
use crate::rating::Participant;

#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub rating: f64,
    pub matches_played: i64,
    pub wins: i64,
    pub losses: i64,
    pub is_active: bool,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Player {
    pub fn participant(&self) -> Participant {
        Participant {
            player_id: self.id,
            rating: self.rating,
            is_active: self.is_active,
        }
    }

    pub fn set_email(&mut self, email: String) {
        self.email = email;
    }

    pub fn set_full_name(&mut self, full_name: String) {
        self.full_name = full_name.trim().to_string();
    }

    pub fn set_avatar_url(&mut self, avatar_url: Option<String>) {
        self.avatar_url = avatar_url;
    }

    pub fn set_bio(&mut self, bio: Option<String>) {
        self.bio = bio;
    }

    pub fn set_active(&mut self, is_active: bool) {
        self.is_active = is_active;
    }

    /// Copies every field present in `update`, leaving the others untouched.
    pub fn apply_update(&mut self, update: PlayerUpdate) {
        if let Some(email) = update.email {
            self.set_email(email);
        }
        if let Some(full_name) = update.full_name {
            self.set_full_name(full_name);
        }
        if let Some(avatar_url) = update.avatar_url {
            self.set_avatar_url(Some(avatar_url));
        }
        if let Some(bio) = update.bio {
            self.set_bio(Some(bio));
        }
        if let Some(is_active) = update.is_active {
            self.set_active(is_active);
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchGame {
    pub game_number: i32,
    pub player1_score: i32,
    pub player2_score: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Match {
    pub id: i64,
    pub match_type: MatchType,
    pub player1_id: i64,
    pub player2_id: i64,
    pub winner_id: i64,
    pub player1_games: i32,
    pub player2_games: i32,
    pub tournament_id: Option<i64>,
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub games: Vec<MatchGame>,
}

impl Match {
    /// Games won by `player_id` in this match.
    pub fn games_won_by(&self, player_id: i64) -> i32 {
        if self.player1_id == player_id {
            self.player1_games
        } else if self.player2_id == player_id {
            self.player2_games
        } else {
            0
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tournament {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub start_date: NaiveDateTime,
    pub end_date: NaiveDateTime,
    pub status: TournamentStatus,
    pub max_players: i32,
    pub registered_players: i64,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Tournament {
    pub fn set_name(&mut self, name: String) {
        self.name = name.trim().to_string();
    }

    pub fn set_description(&mut self, description: Option<String>) {
        self.description = description;
    }

    pub fn set_dates(&mut self, start_date: NaiveDateTime, end_date: NaiveDateTime) {
        self.start_date = start_date;
        self.end_date = end_date;
    }

    pub fn set_max_players(&mut self, max_players: i32) {
        self.max_players = max_players;
    }

    pub fn set_status(&mut self, status: TournamentStatus) {
        self.status = status;
    }

    pub fn is_full(&self) -> bool {
        self.registered_players >= self.max_players as i64
    }

    /// Copies every field present in `update`. Dates are applied as a pair so
    /// the caller can check the resulting range.
    pub fn apply_update(&mut self, update: TournamentUpdate) {
        if let Some(name) = update.name {
            self.set_name(name);
        }
        if let Some(description) = update.description {
            self.set_description(Some(description));
        }
        let start = update.start_date.unwrap_or(self.start_date);
        let end = update.end_date.unwrap_or(self.end_date);
        self.set_dates(start, end);
        if let Some(max_players) = update.max_players {
            self.set_max_players(max_players);
        }
        if let Some(status) = update.status {
            self.set_status(status);
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RatingHistoryEntry {
    pub id: i64,
    pub player_id: i64,
    pub match_id: i64,
    pub old_rating: f64,
    pub new_rating: f64,
    pub delta: f64,
    pub rank: i64,
    pub category: String,
    pub recorded_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StandingRow {
    pub player_id: i64,
    pub full_name: String,
    pub wins: i64,
    pub losses: i64,
}

#[derive(Debug, Clone, Default)]
pub struct PlayerFilter {
    pub search: Option<String>,
    pub active_only: bool,
    pub limit: usize,
    pub offset: usize,
}

#[derive(Debug, Clone, Default)]
pub struct MatchFilter {
    pub player_id: Option<i64>,
    pub tournament_id: Option<i64>,
    pub limit: usize,
    pub offset: usize,
}

#[derive(Debug, Clone, Default)]
pub struct TournamentFilter {
    pub status: Option<TournamentStatus>,
    pub limit: usize,
    pub offset: usize,
}

impl ToSql for MatchType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for MatchType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e: anyhow::Error| FromSqlError::Other(e.into()))
    }
}

impl ToSql for TournamentStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TournamentStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e: anyhow::Error| FromSqlError::Other(e.into()))
    }
}
