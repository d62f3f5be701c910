use crate::config::settings::RatingSettings;
use crate::errors::RatingError;

use super::category::CategoryTable;
use super::types::{MatchRating, Participant, RatingUpdate, RatingValue, Side};

pub const DEFAULT_RATING_SCALE: f64 = 400.0;

/// Expected score of a player rated `rating` against `opponent_rating`.
pub fn expected_score(rating: RatingValue, opponent_rating: RatingValue, scale: f64) -> f64 {
    1.0 / (1.0 + 10f64.powf((opponent_rating - rating) / scale))
}

/// Rating deltas for both sides of a decided match, `(delta_a, delta_b)`.
///
/// The exchange is zero-sum: the loser's delta is the exact negation of
/// the winner's.
pub fn compute_rating_change(
    rating_a: RatingValue,
    rating_b: RatingValue,
    outcome: Side,
    k_factor: f64,
) -> Result<(RatingValue, RatingValue), RatingError> {
    compute_scaled_rating_change(rating_a, rating_b, outcome, k_factor, DEFAULT_RATING_SCALE)
}

fn compute_scaled_rating_change(
    rating_a: RatingValue,
    rating_b: RatingValue,
    outcome: Side,
    k_factor: f64,
    scale: f64,
) -> Result<(RatingValue, RatingValue), RatingError> {
    check_k_factor(k_factor)?;

    let (winner, loser) = match outcome {
        Side::First => (rating_a, rating_b),
        Side::Second => (rating_b, rating_a),
    };
    let expected_winner = expected_score(winner, loser, scale);
    let winner_delta = k_factor * (1.0 - expected_winner);
    let loser_delta = -winner_delta;

    Ok(match outcome {
        Side::First => (winner_delta, loser_delta),
        Side::Second => (loser_delta, winner_delta),
    })
}

fn check_k_factor(k_factor: f64) -> Result<(), RatingError> {
    if !k_factor.is_finite() || k_factor <= 0.0 {
        return Err(RatingError::configuration(format!(
            "k_factor must be a positive number, got {}",
            k_factor
        )));
    }
    Ok(())
}

/// Applies a delta and pins the result to `[min_rating, max_rating]`.
pub fn apply_delta(rating: RatingValue, delta: RatingValue, min_rating: f64, max_rating: f64) -> RatingValue {
    (rating + delta).clamp(min_rating, max_rating)
}

/// Elo engine bound to one validated rating configuration.
#[derive(Debug, Clone)]
pub struct RatingEngine {
    settings: RatingSettings,
    categories: CategoryTable,
}

impl RatingEngine {
    pub fn new(settings: RatingSettings) -> Result<Self, RatingError> {
        check_k_factor(settings.k_factor)?;

        if !settings.rating_scale.is_finite() || settings.rating_scale <= 0.0 {
            return Err(RatingError::configuration(format!(
                "rating_scale must be positive, got {}",
                settings.rating_scale
            )));
        }
        if !(settings.min_rating < settings.max_rating) {
            return Err(RatingError::configuration(format!(
                "min_rating ({}) must be below max_rating ({})",
                settings.min_rating, settings.max_rating
            )));
        }
        if settings.initial_rating < settings.min_rating || settings.initial_rating > settings.max_rating {
            return Err(RatingError::configuration(format!(
                "initial_rating {} is outside [{}, {}]",
                settings.initial_rating, settings.min_rating, settings.max_rating
            )));
        }

        let categories = CategoryTable::new(
            settings.categories.clone(),
            settings.min_rating,
            settings.max_rating,
        )?;

        Ok(Self { settings, categories })
    }

    pub fn settings(&self) -> &RatingSettings {
        &self.settings
    }

    pub fn categories(&self) -> &CategoryTable {
        &self.categories
    }

    pub fn initial_rating(&self) -> RatingValue {
        self.settings.initial_rating
    }

    pub fn expected_score(&self, rating: RatingValue, opponent_rating: RatingValue) -> f64 {
        expected_score(rating, opponent_rating, self.settings.rating_scale)
    }

    pub fn compute_rating_change(
        &self,
        rating_a: RatingValue,
        rating_b: RatingValue,
        outcome: Side,
    ) -> Result<(RatingValue, RatingValue), RatingError> {
        compute_scaled_rating_change(
            rating_a,
            rating_b,
            outcome,
            self.settings.k_factor,
            self.settings.rating_scale,
        )
    }

    pub fn apply_delta(&self, rating: RatingValue, delta: RatingValue) -> RatingValue {
        apply_delta(rating, delta, self.settings.min_rating, self.settings.max_rating)
    }

    pub fn classify_category(&self, rating: RatingValue) -> &str {
        self.categories.classify_category(rating)
    }

    /// Rates a decided match between two participants.
    ///
    /// Pure: the caller reads the participants' current ratings and writes
    /// the returned updates inside its own transaction.
    pub fn rate_match(
        &self,
        first: &Participant,
        second: &Participant,
        winner: Side,
    ) -> Result<MatchRating, RatingError> {
        for participant in [first, second] {
            if !participant.is_active {
                return Err(RatingError::inactive_player(participant.player_id));
            }
        }
        if first.player_id == second.player_id {
            return Err(RatingError::InvalidParticipant {
                player_id: first.player_id,
                reason: "a player cannot play against themselves".to_string(),
            });
        }

        let (delta_first, delta_second) =
            self.compute_rating_change(first.rating, second.rating, winner)?;

        Ok(MatchRating {
            first: self.build_update(first, delta_first, winner == Side::First),
            second: self.build_update(second, delta_second, winner == Side::Second),
        })
    }

    fn build_update(&self, participant: &Participant, delta: RatingValue, won: bool) -> RatingUpdate {
        let new_rating = self.apply_delta(participant.rating, delta);
        RatingUpdate {
            player_id: participant.player_id,
            old_rating: participant.rating,
            new_rating,
            delta,
            category: self.classify_category(new_rating).to_string(),
            won,
        }
    }
}
