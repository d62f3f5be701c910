use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::rating::Side;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchType {
    Friendly,
    Tournament,
    Challenge,
}

impl MatchType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchType::Friendly => "friendly",
            MatchType::Tournament => "tournament",
            MatchType::Challenge => "challenge",
        }
    }
}

impl FromStr for MatchType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "friendly" => Ok(MatchType::Friendly),
            "tournament" => Ok(MatchType::Tournament),
            "challenge" => Ok(MatchType::Challenge),
            other => anyhow::bail!("Unknown match type: {}", other),
        }
    }
}

/// Points scored in a single game, from the recording player's side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameScore {
    pub player_score: i32,
    pub opponent_score: i32,
}

impl GameScore {
    pub fn new(player_score: i32, opponent_score: i32) -> Self {
        Self {
            player_score,
            opponent_score,
        }
    }

    pub fn winner(&self) -> Option<Side> {
        match self.player_score.cmp(&self.opponent_score) {
            std::cmp::Ordering::Greater => Some(Side::First),
            std::cmp::Ordering::Less => Some(Side::Second),
            std::cmp::Ordering::Equal => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMatch {
    pub match_type: MatchType,
    pub player_id: i64,
    pub opponent_id: i64,
    pub tournament_id: Option<i64>,
    pub games: Vec<GameScore>,
    pub notes: Option<String>,
}

/// Non-scoring metadata of a recorded match. Scores are immutable.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchUpdate {
    pub notes: Option<String>,
    pub tournament_id: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPlayer {
    pub username: String,
    pub email: String,
    pub full_name: String,
}

/// Profile fields a player may change. Rating and counters are not here:
/// only the rating engine writes those.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerUpdate {
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub is_active: Option<bool>,
}

impl PlayerUpdate {
    pub fn is_empty(&self) -> bool {
        self.email.is_none()
            && self.full_name.is_none()
            && self.avatar_url.is_none()
            && self.bio.is_none()
            && self.is_active.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentStatus {
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

impl TournamentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TournamentStatus::Pending => "pending",
            TournamentStatus::InProgress => "in_progress",
            TournamentStatus::Completed => "completed",
            TournamentStatus::Cancelled => "cancelled",
        }
    }

    pub fn can_transition_to(&self, next: TournamentStatus) -> bool {
        use TournamentStatus::*;
        matches!(
            (self, next),
            (Pending, Pending)
                | (Pending, InProgress)
                | (Pending, Cancelled)
                | (InProgress, InProgress)
                | (InProgress, Completed)
                | (InProgress, Cancelled)
                | (Completed, Completed)
                | (Cancelled, Cancelled)
        )
    }
}

impl FromStr for TournamentStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(TournamentStatus::Pending),
            "in_progress" => Ok(TournamentStatus::InProgress),
            "completed" => Ok(TournamentStatus::Completed),
            "cancelled" => Ok(TournamentStatus::Cancelled),
            other => anyhow::bail!("Unknown tournament status: {}", other),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTournament {
    pub name: String,
    pub description: Option<String>,
    pub start_date: NaiveDateTime,
    pub end_date: NaiveDateTime,
    pub max_players: i32,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TournamentUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<NaiveDateTime>,
    pub end_date: Option<NaiveDateTime>,
    pub max_players: Option<i32>,
    pub status: Option<TournamentStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_game_winner() {
        assert_eq!(GameScore::new(11, 9).winner(), Some(Side::First));
        assert_eq!(GameScore::new(7, 11).winner(), Some(Side::Second));
        assert_eq!(GameScore::new(10, 10).winner(), None);
    }

    #[test]
    fn test_tournament_status_transitions() {
        use TournamentStatus::*;
        assert!(Pending.can_transition_to(InProgress));
        assert!(InProgress.can_transition_to(Completed));
        assert!(Pending.can_transition_to(Cancelled));
        assert!(!Completed.can_transition_to(Pending));
        assert!(!Pending.can_transition_to(Completed));
        assert!(!Cancelled.can_transition_to(InProgress));
    }

    #[test]
    fn test_status_round_trips_through_storage_text() {
        for status in [
            TournamentStatus::Pending,
            TournamentStatus::InProgress,
            TournamentStatus::Completed,
            TournamentStatus::Cancelled,
        ] {
            assert_eq!(status.as_str().parse::<TournamentStatus>().unwrap(), status);
        }
    }

    #[test]
    fn test_new_match_deserializes_from_camel_case() {
        let body = r#"{
            "matchType": "friendly",
            "playerId": 1,
            "opponentId": 2,
            "games": [{"playerScore": 11, "opponentScore": 9}]
        }"#;
        let parsed: NewMatch = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.match_type, MatchType::Friendly);
        assert_eq!(parsed.games[0], GameScore::new(11, 9));
        assert!(parsed.tournament_id.is_none());
    }
}
