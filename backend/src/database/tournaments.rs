use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use rusqlite::{Connection, OptionalExtension, params};

use super::models::{Tournament, TournamentFilter};
use crate::domain::{NewTournament, TournamentStatus};

const TOURNAMENT_COLUMNS: &str = "t.id, t.name, t.description, t.start_date, t.end_date, t.status, t.max_players, (SELECT COUNT(*) FROM tournament_players tp WHERE tp.tournament_id = t.id), t.created_at, t.updated_at";

pub fn insert_tournament(conn: &Connection, tournament: &NewTournament, now: NaiveDateTime) -> Result<Tournament> {
    let sql = "INSERT INTO tournaments (name, description, start_date, end_date, status, max_players, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7) RETURNING id";

    let id: i64 = conn
        .query_row(
            sql,
            params![
                tournament.name.trim(),
                tournament.description,
                tournament.start_date,
                tournament.end_date,
                TournamentStatus::Pending,
                tournament.max_players,
                now
            ],
            |row| row.get(0),
        )
        .context("Failed to insert new tournament")?;

    find_by_id(conn, id)?.context("Inserted tournament not found")
}

fn parse_tournament_row(row: &rusqlite::Row) -> rusqlite::Result<Tournament> {
    Ok(Tournament {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        start_date: row.get(3)?,
        end_date: row.get(4)?,
        status: row.get(5)?,
        max_players: row.get(6)?,
        registered_players: row.get(7)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

pub fn find_by_id(conn: &Connection, id: i64) -> Result<Option<Tournament>> {
    let sql = format!("SELECT {} FROM tournaments t WHERE t.id = ?1", TOURNAMENT_COLUMNS);

    conn.query_row(&sql, params![id], parse_tournament_row)
        .optional()
        .context("Failed to query tournament by id")
}

pub fn list_tournaments(conn: &Connection, filter: &TournamentFilter) -> Result<(Vec<Tournament>, i64)> {
    let where_clause = "WHERE (?1 IS NULL OR t.status = ?1)";

    let total: i64 = conn
        .query_row(
            &format!("SELECT COUNT(*) FROM tournaments t {}", where_clause),
            params![filter.status],
            |row| row.get(0),
        )
        .context("Failed to count tournaments")?;

    let sql = format!(
        "SELECT {} FROM tournaments t {} ORDER BY t.start_date DESC, t.id DESC LIMIT ?2 OFFSET ?3",
        TOURNAMENT_COLUMNS, where_clause
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(
            params![filter.status, filter.limit as i64, filter.offset as i64],
            parse_tournament_row,
        )?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok((rows, total))
}

pub fn save_tournament(conn: &Connection, tournament: &Tournament, now: NaiveDateTime) -> Result<Tournament> {
    let sql = "UPDATE tournaments SET name = ?1, description = ?2, start_date = ?3, end_date = ?4, status = ?5, max_players = ?6, updated_at = ?7 WHERE id = ?8";

    conn.execute(
        sql,
        params![
            tournament.name,
            tournament.description,
            tournament.start_date,
            tournament.end_date,
            tournament.status,
            tournament.max_players,
            now,
            tournament.id
        ],
    )
    .context("Failed to update tournament")?;

    find_by_id(conn, tournament.id)?.context("Updated tournament not found")
}

pub fn register_player(conn: &Connection, tournament_id: i64, player_id: i64, now: NaiveDateTime) -> Result<()> {
    let sql = "INSERT INTO tournament_players (tournament_id, player_id, registered_at) VALUES (?1, ?2, ?3)";
    conn.execute(sql, params![tournament_id, player_id, now])
        .context("Failed to register player for tournament")?;
    Ok(())
}

pub fn is_registered(conn: &Connection, tournament_id: i64, player_id: i64) -> Result<bool> {
    let sql = "SELECT EXISTS (SELECT 1 FROM tournament_players WHERE tournament_id = ?1 AND player_id = ?2)";
    conn.query_row(sql, params![tournament_id, player_id], |row| row.get(0))
        .context("Failed to check tournament registration")
}

pub fn count_by_status(conn: &Connection, status: TournamentStatus) -> Result<i64> {
    conn.query_row(
        "SELECT COUNT(*) FROM tournaments WHERE status = ?1",
        params![status],
        |row| row.get(0),
    )
    .context("Failed to count tournaments by status")
}
