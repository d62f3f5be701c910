use chrono::NaiveDateTime;
use serde::Serialize;

use crate::database::{Match, Player, RatingHistoryEntry, StandingRow, Tournament};
use crate::domain::{MatchType, TournamentStatus};
use crate::rating::{RatingEngine, RatingUpdate, win_rate};
use crate::services::rankings::RankingEntry;
use crate::services::statistics::{GlobalStatistics, HeadToHead, PlayerStatistics};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: usize,
    pub page_size: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub rating: f64,
    pub category: String,
    pub matches_played: i64,
    pub wins: i64,
    pub losses: i64,
    pub win_rate: f64,
    pub is_active: bool,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl PlayerResponse {
    pub fn new(player: Player, engine: &RatingEngine) -> Self {
        Self {
            category: engine.classify_category(player.rating).to_string(),
            win_rate: win_rate(player.wins, player.matches_played),
            id: player.id,
            username: player.username,
            email: player.email,
            full_name: player.full_name,
            rating: player.rating,
            matches_played: player.matches_played,
            wins: player.wins,
            losses: player.losses,
            is_active: player.is_active,
            avatar_url: player.avatar_url,
            bio: player.bio,
            created_at: player.created_at,
            updated_at: player.updated_at,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStatsResponse {
    pub player_id: i64,
    pub rating: f64,
    pub category: String,
    pub matches_played: i64,
    pub wins: i64,
    pub losses: i64,
    pub win_rate: f64,
    pub current_streak: i32,
    pub longest_win_streak: u32,
    pub games_won: i64,
    pub games_lost: i64,
    pub peak_rating: f64,
    pub lowest_rating: f64,
}

impl From<PlayerStatistics> for PlayerStatsResponse {
    fn from(stats: PlayerStatistics) -> Self {
        Self {
            player_id: stats.player.id,
            rating: stats.player.rating,
            category: stats.category,
            matches_played: stats.player.matches_played,
            wins: stats.player.wins,
            losses: stats.player.losses,
            win_rate: stats.win_rate,
            current_streak: stats.streaks.current,
            longest_win_streak: stats.streaks.longest_win,
            games_won: stats.games_won,
            games_lost: stats.games_lost,
            peak_rating: stats.peak_rating,
            lowest_rating: stats.lowest_rating,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameResponse {
    pub game_number: i32,
    pub player_score: i32,
    pub opponent_score: i32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResponse {
    pub id: i64,
    pub match_type: MatchType,
    pub player_id: i64,
    pub opponent_id: i64,
    pub winner_id: i64,
    pub player_games_won: i32,
    pub opponent_games_won: i32,
    pub tournament_id: Option<i64>,
    pub notes: Option<String>,
    pub games: Vec<GameResponse>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<Match> for MatchResponse {
    fn from(m: Match) -> Self {
        Self {
            id: m.id,
            match_type: m.match_type,
            player_id: m.player1_id,
            opponent_id: m.player2_id,
            winner_id: m.winner_id,
            player_games_won: m.player1_games,
            opponent_games_won: m.player2_games,
            tournament_id: m.tournament_id,
            notes: m.notes,
            games: m
                .games
                .into_iter()
                .map(|g| GameResponse {
                    game_number: g.game_number,
                    player_score: g.player1_score,
                    opponent_score: g.player2_score,
                })
                .collect(),
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingChangeResponse {
    pub player_id: i64,
    pub previous: f64,
    pub new: f64,
    pub change: f64,
    pub category: String,
}

impl From<&RatingUpdate> for RatingChangeResponse {
    fn from(update: &RatingUpdate) -> Self {
        Self {
            player_id: update.player_id,
            previous: update.old_rating,
            new: update.new_rating,
            change: update.delta,
            category: update.category.clone(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordedMatchResponse {
    #[serde(rename = "match")]
    pub recorded: MatchResponse,
    pub player_rating: RatingChangeResponse,
    pub opponent_rating: RatingChangeResponse,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingEntryResponse {
    pub rank: i64,
    pub player_id: i64,
    pub username: String,
    pub full_name: String,
    pub rating: f64,
    pub category: String,
    pub matches_played: i64,
    pub win_rate: f64,
}

impl From<RankingEntry> for RankingEntryResponse {
    fn from(entry: RankingEntry) -> Self {
        Self {
            rank: entry.rank,
            win_rate: win_rate(entry.player.wins, entry.player.matches_played),
            player_id: entry.player.id,
            username: entry.player.username,
            full_name: entry.player.full_name,
            rating: entry.player.rating,
            category: entry.category,
            matches_played: entry.player.matches_played,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingHistoryResponse {
    pub match_id: i64,
    pub old_rating: f64,
    pub new_rating: f64,
    pub delta: f64,
    pub rank: i64,
    pub category: String,
    pub recorded_at: NaiveDateTime,
}

impl From<RatingHistoryEntry> for RatingHistoryResponse {
    fn from(entry: RatingHistoryEntry) -> Self {
        Self {
            match_id: entry.match_id,
            old_rating: entry.old_rating,
            new_rating: entry.new_rating,
            delta: entry.delta,
            rank: entry.rank,
            category: entry.category,
            recorded_at: entry.recorded_at,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TournamentResponse {
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

impl From<Tournament> for TournamentResponse {
    fn from(t: Tournament) -> Self {
        Self {
            id: t.id,
            name: t.name,
            description: t.description,
            start_date: t.start_date,
            end_date: t.end_date,
            status: t.status,
            max_players: t.max_players,
            registered_players: t.registered_players,
            created_at: t.created_at,
            updated_at: t.updated_at,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StandingResponse {
    pub position: usize,
    pub player_id: i64,
    pub full_name: String,
    pub wins: i64,
    pub losses: i64,
}

impl StandingResponse {
    pub fn ranked(rows: Vec<StandingRow>) -> Vec<Self> {
        rows.into_iter()
            .enumerate()
            .map(|(i, row)| Self {
                position: i + 1,
                player_id: row.player_id,
                full_name: row.full_name,
                wins: row.wins,
                losses: row.losses,
            })
            .collect()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryCount {
    pub category: String,
    pub players: i64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalStatsResponse {
    pub total_players: i64,
    pub active_players: i64,
    pub total_matches: i64,
    pub ongoing_tournaments: i64,
    pub average_rating: f64,
    pub category_distribution: Vec<CategoryCount>,
}

impl From<GlobalStatistics> for GlobalStatsResponse {
    fn from(stats: GlobalStatistics) -> Self {
        Self {
            total_players: stats.total_players,
            active_players: stats.active_players,
            total_matches: stats.total_matches,
            ongoing_tournaments: stats.ongoing_tournaments,
            average_rating: (stats.average_rating * 100.0).round() / 100.0,
            category_distribution: stats
                .category_distribution
                .into_iter()
                .map(|(category, players)| CategoryCount { category, players })
                .collect(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeadToHeadStats {
    pub total_matches: usize,
    pub player1_match_wins: i64,
    pub player2_match_wins: i64,
    pub total_games: i64,
    pub player1_game_wins: i64,
    pub player2_game_wins: i64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeadToHeadResponse {
    pub player1: PlayerResponse,
    pub player2: PlayerResponse,
    pub expected_score_player1: f64,
    pub matches: Vec<MatchResponse>,
    pub stats: HeadToHeadStats,
}

impl HeadToHeadResponse {
    pub fn new(h2h: HeadToHead, engine: &RatingEngine) -> Self {
        let stats = HeadToHeadStats {
            total_matches: h2h.matches.len(),
            player1_match_wins: h2h.player1_match_wins,
            player2_match_wins: h2h.player2_match_wins,
            total_games: h2h.player1_game_wins + h2h.player2_game_wins,
            player1_game_wins: h2h.player1_game_wins,
            player2_game_wins: h2h.player2_game_wins,
        };

        Self {
            player1: PlayerResponse::new(h2h.player1, engine),
            player2: PlayerResponse::new(h2h.player2, engine),
            expected_score_player1: h2h.expected_score_player1,
            matches: h2h.matches.into_iter().map(MatchResponse::from).collect(),
            stats,
        }
    }
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}
