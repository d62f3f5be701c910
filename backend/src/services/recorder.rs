use anyhow::{Context, Result};
use chrono::Utc;
use log::{info, warn};
use rusqlite::{Connection, TransactionBehavior};

use crate::database::{self, Match, Player, RatingHistoryEntry};
use crate::domain::validation::validate_match_update;
use crate::domain::{MatchType, MatchUpdate, TournamentStatus, ValidatedMatch};
use crate::errors::{RatingError, ServiceError, ValidationError};
use crate::rating::{MatchRating, RatingEngine};

/// Outcome of a recorded match.
#[derive(Debug, Clone)]
pub struct RecordedMatch {
    pub match_id: i64,
    pub rating: MatchRating,
    pub history: Vec<RatingHistoryEntry>,
}

/// Stores validated matches and applies their rating changes.
pub struct MatchRecorder<'a> {
    engine: &'a RatingEngine,
}

impl<'a> MatchRecorder<'a> {
    pub fn new(engine: &'a RatingEngine) -> Self {
        Self { engine }
    }

    /// Persists the match, both rating updates and both history entries in a
    /// single immediate transaction.
    ///
    /// `BEGIN IMMEDIATE` takes the database write lock before the current
    /// ratings are read, so two recordings touching the same player cannot
    /// interleave their read-modify-write.
    pub fn record_match_outcome(
        &self,
        conn: &mut Connection,
        validated: &ValidatedMatch,
    ) -> Result<RecordedMatch> {
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .context("Failed to start match transaction")?;

        let first = load_participant(&tx, validated.player_id)?;
        let second = load_participant(&tx, validated.opponent_id)?;
        if let Some(tournament_id) = validated.tournament_id {
            check_tournament(&tx, tournament_id)?;
        }

        let rating = match self
            .engine
            .rate_match(&first.participant(), &second.participant(), validated.winner)
        {
            Ok(rating) => rating,
            Err(e) => {
                warn!("Rejected match {} vs {}: {}", first.id, second.id, e);
                return Err(e.into());
            }
        };

        let now = Utc::now().naive_utc();
        let match_id = database::matches::insert_match(&tx, validated, now)?;

        for update in rating.updates() {
            database::players::apply_rating_update(&tx, update, now)?;
        }

        let mut history = Vec::with_capacity(2);
        for update in rating.updates() {
            let rank = database::players::rank_of(&tx, update.player_id, update.new_rating)?;
            history.push(database::ratings::insert_history(&tx, match_id, update, rank, now)?);
        }

        tx.commit().context("Failed to commit match transaction")?;

        info!(
            "Recorded match {}: player {} {:+.2} -> {:.2}, player {} {:+.2} -> {:.2}",
            match_id,
            rating.first.player_id,
            rating.first.delta,
            rating.first.new_rating,
            rating.second.player_id,
            rating.second.delta,
            rating.second.new_rating
        );

        Ok(RecordedMatch {
            match_id,
            rating,
            history,
        })
    }
}

/// Changes notes and tournament of a recorded match; scores stay as they are.
pub fn update_match_metadata(conn: &Connection, match_id: i64, update: MatchUpdate) -> Result<Match> {
    validate_match_update(&update)?;
    let existing = database::matches::find_by_id(conn, match_id)?
        .ok_or(ServiceError::not_found("Match", match_id))?;

    if let Some(tournament_id) = update.tournament_id {
        if existing.match_type != MatchType::Tournament {
            return Err(ValidationError::field(
                "tournamentId",
                format!("{} matches cannot belong to a tournament", existing.match_type.as_str()),
            )
            .into());
        }
        check_tournament(conn, tournament_id)?;
    }

    let notes = update.notes.or(existing.notes);
    let tournament_id = update.tournament_id.or(existing.tournament_id);
    database::matches::update_metadata(conn, match_id, notes.as_deref(), tournament_id, Utc::now().naive_utc())?;

    database::matches::find_by_id(conn, match_id)?.context("Updated match not found")
}

fn load_participant(conn: &Connection, player_id: i64) -> Result<Player> {
    database::players::find_by_id(conn, player_id)?
        .ok_or_else(|| RatingError::missing_player(player_id).into())
}

fn check_tournament(conn: &Connection, tournament_id: i64) -> Result<()> {
    let tournament = database::tournaments::find_by_id(conn, tournament_id)?.ok_or_else(|| {
        ValidationError::field("tournamentId", format!("tournament {} does not exist", tournament_id))
    })?;

    if matches!(
        tournament.status,
        TournamentStatus::Completed | TournamentStatus::Cancelled
    ) {
        return Err(ValidationError::field(
            "tournamentId",
            format!("tournament {} is {}", tournament_id, tournament.status.as_str()),
        )
        .into());
    }
    Ok(())
}
