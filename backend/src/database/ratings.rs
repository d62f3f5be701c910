use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use rusqlite::{Connection, params};

use super::models::RatingHistoryEntry;
use crate::rating::RatingUpdate;

const HISTORY_COLUMNS: &str = "id, player_id, match_id, old_rating, new_rating, delta, rank, category, recorded_at";

/// Appends one history entry. History rows are never updated or deleted.
pub fn insert_history(
    conn: &Connection,
    match_id: i64,
    update: &RatingUpdate,
    rank: i64,
    recorded_at: NaiveDateTime,
) -> Result<RatingHistoryEntry> {
    let sql = format!(
        "INSERT INTO rating_history (player_id, match_id, old_rating, new_rating, delta, rank, category, recorded_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8) RETURNING {}",
        HISTORY_COLUMNS
    );

    conn.query_row(
        &sql,
        params![
            update.player_id,
            match_id,
            update.old_rating,
            update.new_rating,
            update.delta,
            rank,
            update.category,
            recorded_at
        ],
        parse_history_row,
    )
    .context("Failed to insert rating history")
}

fn parse_history_row(row: &rusqlite::Row) -> rusqlite::Result<RatingHistoryEntry> {
    Ok(RatingHistoryEntry {
        id: row.get(0)?,
        player_id: row.get(1)?,
        match_id: row.get(2)?,
        old_rating: row.get(3)?,
        new_rating: row.get(4)?,
        delta: row.get(5)?,
        rank: row.get(6)?,
        category: row.get(7)?,
        recorded_at: row.get(8)?,
    })
}

/// History of a player, oldest first, optionally limited to `[start, end]`.
pub fn list_by_player(
    conn: &Connection,
    player_id: i64,
    start: Option<NaiveDateTime>,
    end: Option<NaiveDateTime>,
) -> Result<Vec<RatingHistoryEntry>> {
    let sql = format!(
        "SELECT {} FROM rating_history WHERE player_id = ?1 AND (?2 IS NULL OR recorded_at >= ?2) AND (?3 IS NULL OR recorded_at <= ?3) ORDER BY recorded_at ASC, id ASC",
        HISTORY_COLUMNS
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params![player_id, start, end], parse_history_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}

pub fn count_for_match(conn: &Connection, match_id: i64) -> Result<i64> {
    conn.query_row(
        "SELECT COUNT(*) FROM rating_history WHERE match_id = ?1",
        params![match_id],
        |row| row.get(0),
    )
    .context("Failed to count rating history for match")
}
