use anyhow::Result;
use regex::Regex;
use std::sync::LazyLock;

use super::models::{
    GameScore, MatchType, MatchUpdate, NewMatch, NewPlayer, NewTournament, PlayerUpdate,
};
use crate::errors::{RatingError, ValidationError};
use crate::rating::Side;

pub const GAMES_TO_WIN: usize = 3;
pub const MIN_GAMES: usize = 3;
pub const MAX_GAMES: usize = 5;
pub const MIN_POINTS_TO_WIN: i32 = 11;
pub const MIN_POINT_DIFFERENCE: i32 = 2;
pub const MAX_NOTES_LENGTH: usize = 1000;
pub const MIN_TOURNAMENT_PLAYERS: i32 = 4;
pub const MAX_TOURNAMENT_PLAYERS: i32 = 128;

static USERNAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]{3,50}$").expect("valid username pattern"));
static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email pattern"));

/// A match result that passed every scoring rule.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedMatch {
    pub match_type: MatchType,
    pub player_id: i64,
    pub opponent_id: i64,
    pub tournament_id: Option<i64>,
    pub games: Vec<GameScore>,
    pub notes: Option<String>,
    pub winner: Side,
    pub player_games_won: usize,
    pub opponent_games_won: usize,
}

impl ValidatedMatch {
    pub fn winner_id(&self) -> i64 {
        match self.winner {
            Side::First => self.player_id,
            Side::Second => self.opponent_id,
        }
    }
}

/// Checks a single game: the winner reaches at least 11 points and leads
/// by at least 2. Returns the side that took the game.
pub fn validate_game(game_number: usize, game: &GameScore) -> Result<Side, ValidationError> {
    let invalid = |reason: String| ValidationError::InvalidGameScore {
        game: game_number,
        reason,
    };

    if game.player_score < 0 || game.opponent_score < 0 {
        return Err(invalid("scores cannot be negative".to_string()));
    }

    let winner = game
        .winner()
        .ok_or_else(|| invalid(format!("{}-{} has no winner", game.player_score, game.opponent_score)))?;

    let high = game.player_score.max(game.opponent_score);
    let margin = (game.player_score - game.opponent_score).abs();
    if high < MIN_POINTS_TO_WIN {
        return Err(invalid(format!(
            "winner must reach {} points, got {}-{}",
            MIN_POINTS_TO_WIN, game.player_score, game.opponent_score
        )));
    }
    if margin < MIN_POINT_DIFFERENCE {
        return Err(invalid(format!(
            "game must be won by {} points, got {}-{}",
            MIN_POINT_DIFFERENCE, game.player_score, game.opponent_score
        )));
    }

    Ok(winner)
}

/// Tallies a best-of-5 result. Exactly one side must reach three games and
/// no game may follow the deciding one.
pub fn decide_games(games: &[GameScore]) -> Result<(Side, usize, usize)> {
    let winners = games
        .iter()
        .enumerate()
        .map(|(idx, game)| validate_game(idx + 1, game))
        .collect::<Result<Vec<_>, _>>()?;

    if !(MIN_GAMES..=MAX_GAMES).contains(&games.len()) {
        return Err(ValidationError::InvalidGameCount {
            count: games.len(),
            min: MIN_GAMES,
            max: MAX_GAMES,
        }
        .into());
    }

    let mut first_wins = 0;
    let mut second_wins = 0;
    for (idx, winner) in winners.iter().enumerate() {
        if first_wins == GAMES_TO_WIN || second_wins == GAMES_TO_WIN {
            return Err(ValidationError::InvalidGameScore {
                game: idx + 1,
                reason: format!("match was already decided after {} games", idx),
            }
            .into());
        }
        match winner {
            Side::First => first_wins += 1,
            Side::Second => second_wins += 1,
        }
    }

    let winner = if first_wins == GAMES_TO_WIN {
        Side::First
    } else if second_wins == GAMES_TO_WIN {
        Side::Second
    } else {
        return Err(RatingError::MatchNotDecisive {
            reason: format!(
                "games ended {}-{}, one side must win {}",
                first_wins, second_wins, GAMES_TO_WIN
            ),
        }
        .into());
    };

    Ok((winner, first_wins, second_wins))
}

pub fn validate_new_match(new_match: NewMatch) -> Result<ValidatedMatch> {
    if new_match.player_id == new_match.opponent_id {
        return Err(ValidationError::SamePlayers.into());
    }
    if new_match.player_id <= 0 || new_match.opponent_id <= 0 {
        return Err(ValidationError::field("playerId", "player ids must be positive").into());
    }
    check_tournament_reference(new_match.match_type, new_match.tournament_id)?;
    check_notes(new_match.notes.as_deref())?;

    let (winner, player_games_won, opponent_games_won) = decide_games(&new_match.games)?;

    Ok(ValidatedMatch {
        match_type: new_match.match_type,
        player_id: new_match.player_id,
        opponent_id: new_match.opponent_id,
        tournament_id: new_match.tournament_id,
        games: new_match.games,
        notes: new_match.notes,
        winner,
        player_games_won,
        opponent_games_won,
    })
}

fn check_tournament_reference(
    match_type: MatchType,
    tournament_id: Option<i64>,
) -> Result<(), ValidationError> {
    match (match_type, tournament_id) {
        (MatchType::Tournament, None) => Err(ValidationError::field(
            "tournamentId",
            "required for tournament matches",
        )),
        (MatchType::Tournament, Some(_)) => Ok(()),
        (_, Some(_)) => Err(ValidationError::field(
            "tournamentId",
            "only allowed for tournament matches",
        )),
        (_, None) => Ok(()),
    }
}

fn check_notes(notes: Option<&str>) -> Result<(), ValidationError> {
    match notes {
        Some(n) if n.chars().count() > MAX_NOTES_LENGTH => Err(ValidationError::field(
            "notes",
            format!("at most {} characters", MAX_NOTES_LENGTH),
        )),
        _ => Ok(()),
    }
}

pub fn validate_match_update(update: &MatchUpdate) -> Result<(), ValidationError> {
    check_notes(update.notes.as_deref())?;
    if update.tournament_id.is_some_and(|id| id <= 0) {
        return Err(ValidationError::field("tournamentId", "must be positive"));
    }
    Ok(())
}

pub fn validate_new_player(player: &NewPlayer) -> Result<(), ValidationError> {
    if !USERNAME_PATTERN.is_match(&player.username) {
        return Err(ValidationError::field(
            "username",
            "3-50 characters, letters, digits, '_' or '-'",
        ));
    }
    check_email(&player.email)?;
    check_full_name(&player.full_name)
}

pub fn validate_player_update(update: &PlayerUpdate) -> Result<(), ValidationError> {
    if let Some(email) = &update.email {
        check_email(email)?;
    }
    if let Some(full_name) = &update.full_name {
        check_full_name(full_name)?;
    }
    if let Some(url) = &update.avatar_url {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ValidationError::field("avatarUrl", "must be an http(s) URL"));
        }
    }
    Ok(())
}

fn check_email(email: &str) -> Result<(), ValidationError> {
    if !EMAIL_PATTERN.is_match(email) || email.len() > 255 {
        return Err(ValidationError::field("email", "not a valid email address"));
    }
    Ok(())
}

fn check_full_name(full_name: &str) -> Result<(), ValidationError> {
    check_length("fullName", full_name, 3, 100)
}

fn check_length(field: &'static str, value: &str, min: usize, max: usize) -> Result<(), ValidationError> {
    let len = value.trim().chars().count();
    if len < min || len > max {
        return Err(ValidationError::field(
            field,
            format!("must be between {} and {} characters", min, max),
        ));
    }
    Ok(())
}

pub fn validate_new_tournament(tournament: &NewTournament) -> Result<(), ValidationError> {
    check_length("name", &tournament.name, 3, 100)?;
    check_max_players(tournament.max_players)?;
    if tournament.end_date < tournament.start_date {
        return Err(ValidationError::field("endDate", "must not be before startDate"));
    }
    Ok(())
}

pub fn check_max_players(max_players: i32) -> Result<(), ValidationError> {
    if !(MIN_TOURNAMENT_PLAYERS..=MAX_TOURNAMENT_PLAYERS).contains(&max_players) {
        return Err(ValidationError::field(
            "maxPlayers",
            format!(
                "must be between {} and {}",
                MIN_TOURNAMENT_PLAYERS, MAX_TOURNAMENT_PLAYERS
            ),
        ));
    }
    Ok(())
}

pub fn check_tournament_name(name: &str) -> Result<(), ValidationError> {
    check_length("name", name, 3, 100)
}
