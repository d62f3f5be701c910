use anyhow::Result;
use rusqlite::Connection;

use crate::database::{self, Match, Player};
use crate::domain::TournamentStatus;
use crate::errors::{ServiceError, ValidationError};
use crate::rating::{RatingEngine, StreakSummary, summarize_streaks, win_rate};

#[derive(Debug, Clone)]
pub struct PlayerStatistics {
    pub player: Player,
    pub category: String,
    pub win_rate: f64,
    pub streaks: StreakSummary,
    pub games_won: i64,
    pub games_lost: i64,
    pub peak_rating: f64,
    pub lowest_rating: f64,
}

pub fn player_statistics(conn: &Connection, engine: &RatingEngine, player_id: i64) -> Result<PlayerStatistics> {
    let player = database::players::find_by_id(conn, player_id)?
        .ok_or(ServiceError::not_found("Player", player_id))?;

    let matches = database::matches::list_for_player_chronological(conn, player_id)?;
    let results: Vec<bool> = matches.iter().map(|m| m.winner_id == player_id).collect();

    let (games_won, games_lost) = matches.iter().fold((0i64, 0i64), |(won, lost), m| {
        let own = m.games_won_by(player_id) as i64;
        let total = (m.player1_games + m.player2_games) as i64;
        (won + own, lost + total - own)
    });

    let history = database::ratings::list_by_player(conn, player_id, None, None)?;
    let (peak_rating, lowest_rating) = history.iter().fold(
        (player.rating, player.rating),
        |(peak, low), entry| {
            (
                peak.max(entry.old_rating).max(entry.new_rating),
                low.min(entry.old_rating).min(entry.new_rating),
            )
        },
    );

    Ok(PlayerStatistics {
        category: engine.classify_category(player.rating).to_string(),
        win_rate: win_rate(player.wins, player.matches_played),
        streaks: summarize_streaks(&results),
        games_won,
        games_lost,
        peak_rating,
        lowest_rating,
        player,
    })
}

#[derive(Debug, Clone)]
pub struct GlobalStatistics {
    pub total_players: i64,
    pub active_players: i64,
    pub total_matches: i64,
    pub ongoing_tournaments: i64,
    pub average_rating: f64,
    pub category_distribution: Vec<(String, i64)>,
}

pub fn global_statistics(conn: &Connection, engine: &RatingEngine) -> Result<GlobalStatistics> {
    let (total_players, active_players) = database::players::count_players(conn)?;
    let total_matches = database::matches::count_matches(conn)?;
    let ongoing_tournaments = database::tournaments::count_by_status(conn, TournamentStatus::InProgress)?;

    let active = database::players::list_ranked(conn)?;
    let average_rating = if active.is_empty() {
        0.0
    } else {
        active.iter().map(|p| p.rating).sum::<f64>() / active.len() as f64
    };

    let mut category_distribution: Vec<(String, i64)> = engine
        .categories()
        .names()
        .map(|name| (name.to_string(), 0))
        .collect();
    for player in &active {
        let category = engine.classify_category(player.rating);
        if let Some(slot) = category_distribution.iter_mut().find(|(name, _)| name == category) {
            slot.1 += 1;
        }
    }

    Ok(GlobalStatistics {
        total_players,
        active_players,
        total_matches,
        ongoing_tournaments,
        average_rating,
        category_distribution,
    })
}

#[derive(Debug, Clone)]
pub struct HeadToHead {
    pub player1: Player,
    pub player2: Player,
    pub expected_score_player1: f64,
    pub matches: Vec<Match>,
    pub player1_match_wins: i64,
    pub player2_match_wins: i64,
    pub player1_game_wins: i64,
    pub player2_game_wins: i64,
}

pub fn head_to_head(
    conn: &Connection,
    engine: &RatingEngine,
    player1_id: i64,
    player2_id: i64,
) -> Result<HeadToHead> {
    if player1_id == player2_id {
        return Err(ValidationError::SamePlayers.into());
    }
    let player1 = database::players::find_by_id(conn, player1_id)?
        .ok_or(ServiceError::not_found("Player", player1_id))?;
    let player2 = database::players::find_by_id(conn, player2_id)?
        .ok_or(ServiceError::not_found("Player", player2_id))?;

    let matches = database::matches::get_head_to_head_matches(conn, player1_id, player2_id)?;

    let mut h2h = HeadToHead {
        expected_score_player1: engine.expected_score(player1.rating, player2.rating),
        player1,
        player2,
        matches: Vec::new(),
        player1_match_wins: 0,
        player2_match_wins: 0,
        player1_game_wins: 0,
        player2_game_wins: 0,
    };

    for m in &matches {
        if m.winner_id == player1_id {
            h2h.player1_match_wins += 1;
        } else {
            h2h.player2_match_wins += 1;
        }
        h2h.player1_game_wins += m.games_won_by(player1_id) as i64;
        h2h.player2_game_wins += m.games_won_by(player2_id) as i64;
    }
    h2h.matches = matches;

    Ok(h2h)
}
