pub mod models;
pub mod validation;

pub use models::{
    GameScore, MatchType, MatchUpdate, NewMatch, NewPlayer, NewTournament, PlayerUpdate,
    TournamentStatus, TournamentUpdate,
};
pub use validation::{ValidatedMatch, validate_new_match};
