use serde::Serialize;

pub type PlayerId = i64;
pub type RatingValue = f64;

/// One side of a two-player match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    First,
    Second,
}

/// The state of a player the engine needs to rate a match.
#[derive(Debug, Clone, PartialEq)]
pub struct Participant {
    pub player_id: PlayerId,
    pub rating: RatingValue,
    pub is_active: bool,
}

/// Rating outcome for one participant of a rated match.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingUpdate {
    pub player_id: PlayerId,
    pub old_rating: RatingValue,
    pub new_rating: RatingValue,
    pub delta: RatingValue,
    pub category: String,
    pub won: bool,
}

/// Both halves of a rated match, in participant order.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchRating {
    pub first: RatingUpdate,
    pub second: RatingUpdate,
}

impl MatchRating {
    pub fn updates(&self) -> [&RatingUpdate; 2] {
        [&self.first, &self.second]
    }
}
