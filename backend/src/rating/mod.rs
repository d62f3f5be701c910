pub mod category;
pub mod elo;
pub mod stats;
pub mod types;

pub use category::CategoryTable;
pub use elo::{RatingEngine, apply_delta, compute_rating_change, expected_score};
pub use stats::{StreakSummary, summarize_streaks, win_rate};
pub use types::{MatchRating, Participant, PlayerId, RatingUpdate, RatingValue, Side};
