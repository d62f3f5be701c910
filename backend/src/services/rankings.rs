use anyhow::Result;
use chrono::NaiveDateTime;
use rusqlite::Connection;

use crate::database::{self, Player, RatingHistoryEntry};
use crate::errors::{ServiceError, ValidationError};
use crate::rating::RatingEngine;

#[derive(Debug, Clone)]
pub struct RankingEntry {
    pub rank: i64,
    pub category: String,
    pub player: Player,
}

/// Leaderboard of active players, rating descending with ties broken by id.
///
/// `rank` is the position on the full leaderboard, the same one stored in
/// rating history; filtering by category or `min_matches` keeps those
/// positions.
pub fn list_rankings(
    conn: &Connection,
    engine: &RatingEngine,
    category: Option<&str>,
    limit: usize,
    min_matches: i64,
) -> Result<Vec<RankingEntry>> {
    if let Some(name) = category {
        if !engine.categories().contains(name) {
            return Err(ValidationError::field("category", format!("unknown category {}", name)).into());
        }
    }

    let entries = database::players::list_ranked(conn)?
        .into_iter()
        .enumerate()
        .map(|(idx, player)| RankingEntry {
            rank: idx as i64 + 1,
            category: engine.classify_category(player.rating).to_string(),
            player,
        })
        .filter(|entry| entry.player.matches_played >= min_matches)
        .filter(|entry| category.is_none_or(|name| entry.category == name))
        .take(limit)
        .collect();

    Ok(entries)
}

/// Rating history of an existing player, oldest first.
pub fn player_history(
    conn: &Connection,
    player_id: i64,
    start: Option<NaiveDateTime>,
    end: Option<NaiveDateTime>,
) -> Result<Vec<RatingHistoryEntry>> {
    if database::players::find_by_id(conn, player_id)?.is_none() {
        return Err(ServiceError::not_found("Player", player_id).into());
    }
    if let (Some(start), Some(end)) = (start, end) {
        if end < start {
            return Err(ValidationError::field("end", "must not be before start").into());
        }
    }

    database::ratings::list_by_player(conn, player_id, start, end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::settings::RatingSettings;
    use crate::database::connection::temp_pool;
    use crate::domain::{GameScore, MatchType, NewMatch, NewPlayer, validate_new_match};
    use crate::services::recorder::MatchRecorder;
    use chrono::Utc;

    fn add_player(conn: &Connection, username: &str, rating: f64) -> Player {
        let new_player = NewPlayer {
            username: username.to_string(),
            email: format!("{}@example.com", username),
            full_name: format!("{} Player", username),
        };
        database::players::insert_player(conn, &new_player, rating, Utc::now().naive_utc()).unwrap()
    }

    #[test]
    fn test_rankings_order_and_category_filter() {
        let (_dir, pool) = temp_pool();
        let conn = pool.get().unwrap();
        let engine = RatingEngine::new(RatingSettings::default()).unwrap();

        let low = add_player(&conn, "lowrated", 900.0);
        let tie_a = add_player(&conn, "tie_a", 1500.0);
        let tie_b = add_player(&conn, "tie_b", 1500.0);
        let top = add_player(&conn, "topseed", 2500.0);

        let all = list_rankings(&conn, &engine, None, 10, 0).unwrap();
        let ids: Vec<i64> = all.iter().map(|e| e.player.id).collect();
        assert_eq!(ids, vec![top.id, tie_a.id, tie_b.id, low.id]);
        assert_eq!(all.iter().map(|e| e.rank).collect::<Vec<_>>(), vec![1, 2, 3, 4]);
        assert_eq!(all[0].category, "elite");

        let intermediate = list_rankings(&conn, &engine, Some("intermediate"), 10, 0).unwrap();
        assert_eq!(intermediate.len(), 2);
        assert_eq!(intermediate[0].rank, 2);

        assert_eq!(list_rankings(&conn, &engine, None, 1, 0).unwrap().len(), 1);
        assert!(list_rankings(&conn, &engine, Some("legend"), 10, 0).is_err());
    }

    #[test]
    fn test_min_matches_keeps_leaderboard_rank() {
        let (_dir, pool) = temp_pool();
        let mut conn = pool.get().unwrap();
        let engine = RatingEngine::new(RatingSettings::default()).unwrap();

        add_player(&conn, "idle_pro", 2000.0);
        let a = add_player(&conn, "alpha", 1000.0);
        let b = add_player(&conn, "bravo", 1000.0);

        let validated = validate_new_match(NewMatch {
            match_type: MatchType::Friendly,
            player_id: a.id,
            opponent_id: b.id,
            tournament_id: None,
            games: [(11, 5), (11, 5), (11, 5)]
                .iter()
                .map(|&(p, o)| GameScore::new(p, o))
                .collect(),
            notes: None,
        })
        .unwrap();
        MatchRecorder::new(&engine)
            .record_match_outcome(&mut conn, &validated)
            .unwrap();

        let played = list_rankings(&conn, &engine, None, 10, 1).unwrap();
        assert_eq!(played.len(), 2);
        assert_eq!(played[0].player.id, a.id);
        assert_eq!(played[0].rank, 2);
        assert_eq!(played[1].rank, 3);

        let history = player_history(&conn, a.id, None, None).unwrap();
        assert_eq!(history.last().unwrap().rank, played[0].rank);
    }

    #[test]
    fn test_history_of_unknown_player() {
        let (_dir, pool) = temp_pool();
        let conn = pool.get().unwrap();
        let err = player_history(&conn, 12, None, None).unwrap_err();
        assert_eq!(
            err.downcast_ref::<ServiceError>(),
            Some(&ServiceError::not_found("Player", 12))
        );
    }
}
