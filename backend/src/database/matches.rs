use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use rusqlite::{Connection, OptionalExtension, params};
use std::collections::HashMap;

use super::models::{Match, MatchFilter, MatchGame, StandingRow};
use crate::domain::ValidatedMatch;

const MATCH_COLUMNS: &str = "id, match_type, player1_id, player2_id, winner_id, player1_games, player2_games, tournament_id, notes, created_at, updated_at";

/// Inserts a validated match together with its games. Returns the new id.
pub fn insert_match(conn: &Connection, validated: &ValidatedMatch, now: NaiveDateTime) -> Result<i64> {
    let sql = "INSERT INTO matches (match_type, player1_id, player2_id, winner_id, player1_games, player2_games, tournament_id, notes, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9) RETURNING id";

    let match_id: i64 = conn
        .query_row(
            sql,
            params![
                validated.match_type,
                validated.player_id,
                validated.opponent_id,
                validated.winner_id(),
                validated.player_games_won as i64,
                validated.opponent_games_won as i64,
                validated.tournament_id,
                validated.notes,
                now
            ],
            |row| row.get(0),
        )
        .context("Failed to insert match")?;

    let mut stmt = conn.prepare(
        "INSERT INTO match_games (match_id, game_number, player1_score, player2_score) VALUES (?1, ?2, ?3, ?4)",
    )?;
    for (idx, game) in validated.games.iter().enumerate() {
        stmt.execute(params![
            match_id,
            (idx + 1) as i64,
            game.player_score,
            game.opponent_score
        ])
        .with_context(|| format!("Failed to insert game {} of match {}", idx + 1, match_id))?;
    }

    Ok(match_id)
}

fn parse_match_row(row: &rusqlite::Row) -> rusqlite::Result<Match> {
    Ok(Match {
        id: row.get(0)?,
        match_type: row.get(1)?,
        player1_id: row.get(2)?,
        player2_id: row.get(3)?,
        winner_id: row.get(4)?,
        player1_games: row.get(5)?,
        player2_games: row.get(6)?,
        tournament_id: row.get(7)?,
        notes: row.get(8)?,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
        games: Vec::new(),
    })
}

pub fn find_by_id(conn: &Connection, id: i64) -> Result<Option<Match>> {
    let sql = format!("SELECT {} FROM matches WHERE id = ?1", MATCH_COLUMNS);

    let found = conn
        .query_row(&sql, params![id], parse_match_row)
        .optional()
        .context("Failed to query match by id")?;

    match found {
        Some(m) => Ok(Some(attach_games(conn, vec![m])?.remove(0))),
        None => Ok(None),
    }
}

pub fn list_matches(conn: &Connection, filter: &MatchFilter) -> Result<(Vec<Match>, i64)> {
    let where_clause = "WHERE (?1 IS NULL OR player1_id = ?1 OR player2_id = ?1) AND (?2 IS NULL OR tournament_id = ?2)";

    let total: i64 = conn
        .query_row(
            &format!("SELECT COUNT(*) FROM matches {}", where_clause),
            params![filter.player_id, filter.tournament_id],
            |row| row.get(0),
        )
        .context("Failed to count matches")?;

    let sql = format!(
        "SELECT {} FROM matches {} ORDER BY created_at DESC, id DESC LIMIT ?3 OFFSET ?4",
        MATCH_COLUMNS, where_clause
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(
            params![
                filter.player_id,
                filter.tournament_id,
                filter.limit as i64,
                filter.offset as i64
            ],
            parse_match_row,
        )?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok((attach_games(conn, rows)?, total))
}

/// Every match of a player, oldest first.
pub fn list_for_player_chronological(conn: &Connection, player_id: i64) -> Result<Vec<Match>> {
    let sql = format!(
        "SELECT {} FROM matches WHERE player1_id = ?1 OR player2_id = ?1 ORDER BY created_at ASC, id ASC",
        MATCH_COLUMNS
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params![player_id], parse_match_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}

/// Matches between two players, most recent first.
pub fn get_head_to_head_matches(conn: &Connection, player1_id: i64, player2_id: i64) -> Result<Vec<Match>> {
    let sql = format!(
        "SELECT {} FROM matches WHERE (player1_id = ?1 AND player2_id = ?2) OR (player1_id = ?2 AND player2_id = ?1) ORDER BY created_at DESC, id DESC",
        MATCH_COLUMNS
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params![player1_id, player2_id], parse_match_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    attach_games(conn, rows)
}

fn attach_games(conn: &Connection, mut matches: Vec<Match>) -> Result<Vec<Match>> {
    if matches.is_empty() {
        return Ok(matches);
    }

    let ids = matches
        .iter()
        .map(|m| m.id.to_string())
        .collect::<Vec<_>>()
        .join(",");
    let sql = format!(
        "SELECT match_id, game_number, player1_score, player2_score FROM match_games WHERE match_id IN ({}) ORDER BY match_id, game_number",
        ids
    );

    let mut stmt = conn.prepare(&sql)?;
    let mut by_match: HashMap<i64, Vec<MatchGame>> = HashMap::new();
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, i64>(0)?,
            MatchGame {
                game_number: row.get(1)?,
                player1_score: row.get(2)?,
                player2_score: row.get(3)?,
            },
        ))
    })?;
    for row in rows {
        let (match_id, game) = row?;
        by_match.entry(match_id).or_default().push(game);
    }

    for m in &mut matches {
        m.games = by_match.remove(&m.id).unwrap_or_default();
    }
    Ok(matches)
}

/// Updates the non-scoring metadata of a match.
pub fn update_metadata(
    conn: &Connection,
    match_id: i64,
    notes: Option<&str>,
    tournament_id: Option<i64>,
    now: NaiveDateTime,
) -> Result<()> {
    let sql = "UPDATE matches SET notes = ?1, tournament_id = ?2, updated_at = ?3 WHERE id = ?4";
    conn.execute(sql, params![notes, tournament_id, now, match_id])
        .context("Failed to update match metadata")?;
    Ok(())
}

pub fn count_matches(conn: &Connection) -> Result<i64> {
    conn.query_row("SELECT COUNT(*) FROM matches", [], |row| row.get(0))
        .context("Failed to count matches")
}

/// Wins and losses per player over a tournament's matches.
pub fn tournament_standings(conn: &Connection, tournament_id: i64) -> Result<Vec<StandingRow>> {
    let sql = "
        SELECT
            p.id,
            p.full_name,
            SUM(CASE WHEN m.winner_id = p.id THEN 1 ELSE 0 END) AS wins,
            SUM(CASE WHEN m.winner_id <> p.id THEN 1 ELSE 0 END) AS losses
        FROM matches m
        JOIN players p ON p.id = m.player1_id OR p.id = m.player2_id
        WHERE m.tournament_id = ?1
        GROUP BY p.id, p.full_name
        ORDER BY wins DESC, losses ASC, p.id ASC
    ";

    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params![tournament_id], |row| {
            Ok(StandingRow {
                player_id: row.get(0)?,
                full_name: row.get(1)?,
                wins: row.get(2)?,
                losses: row.get(3)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}
