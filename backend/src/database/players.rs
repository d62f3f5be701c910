use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use rusqlite::{Connection, OptionalExtension, params};

use super::models::{Player, PlayerFilter};
use crate::domain::NewPlayer;
use crate::rating::RatingUpdate;

const PLAYER_COLUMNS: &str = "id, username, email, full_name, rating, matches_played, wins, losses, is_active, avatar_url, bio, created_at, updated_at";

pub fn insert_player(
    conn: &Connection,
    new_player: &NewPlayer,
    initial_rating: f64,
    now: NaiveDateTime,
) -> Result<Player> {
    let sql = format!(
        "INSERT INTO players (username, email, full_name, rating, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?5) RETURNING {}",
        PLAYER_COLUMNS
    );

    conn.query_row(
        &sql,
        params![
            new_player.username,
            new_player.email.to_lowercase(),
            new_player.full_name.trim(),
            initial_rating,
            now
        ],
        parse_player_row,
    )
    .context("Failed to insert new player")
}

fn parse_player_row(row: &rusqlite::Row) -> rusqlite::Result<Player> {
    Ok(Player {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        full_name: row.get(3)?,
        rating: row.get(4)?,
        matches_played: row.get(5)?,
        wins: row.get(6)?,
        losses: row.get(7)?,
        is_active: row.get(8)?,
        avatar_url: row.get(9)?,
        bio: row.get(10)?,
        created_at: row.get(11)?,
        updated_at: row.get(12)?,
    })
}

pub fn find_by_id(conn: &Connection, id: i64) -> Result<Option<Player>> {
    let sql = format!("SELECT {} FROM players WHERE id = ?1", PLAYER_COLUMNS);

    conn.query_row(&sql, params![id], parse_player_row)
        .optional()
        .context("Failed to query player by id")
}

pub fn list_players(conn: &Connection, filter: &PlayerFilter) -> Result<(Vec<Player>, i64)> {
    let pattern = filter
        .search
        .as_deref()
        .map(|s| format!("%{}%", s.to_lowercase()));
    let where_clause = "WHERE (?1 IS NULL OR lower(username) LIKE ?1 OR lower(full_name) LIKE ?1) AND (?2 = 0 OR is_active = 1)";

    let total: i64 = conn
        .query_row(
            &format!("SELECT COUNT(*) FROM players {}", where_clause),
            params![pattern, filter.active_only],
            |row| row.get(0),
        )
        .context("Failed to count players")?;

    let sql = format!(
        "SELECT {} FROM players {} ORDER BY id ASC LIMIT ?3 OFFSET ?4",
        PLAYER_COLUMNS, where_clause
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(
            params![pattern, filter.active_only, filter.limit as i64, filter.offset as i64],
            parse_player_row,
        )?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok((rows, total))
}

/// Persists the profile fields of `player`. Rating and counters are left alone.
pub fn save_profile(conn: &Connection, player: &Player, now: NaiveDateTime) -> Result<Player> {
    let sql = format!(
        "UPDATE players SET email = ?1, full_name = ?2, avatar_url = ?3, bio = ?4, is_active = ?5, updated_at = ?6 WHERE id = ?7 RETURNING {}",
        PLAYER_COLUMNS
    );

    conn.query_row(
        &sql,
        params![
            player.email.to_lowercase(),
            player.full_name,
            player.avatar_url,
            player.bio,
            player.is_active,
            now,
            player.id
        ],
        parse_player_row,
    )
    .context("Failed to update player profile")
}

/// Writes a rating update produced by the engine and bumps the counters.
pub fn apply_rating_update(conn: &Connection, update: &RatingUpdate, now: NaiveDateTime) -> Result<()> {
    let (wins, losses) = if update.won { (1, 0) } else { (0, 1) };
    let sql = "UPDATE players SET rating = ?1, matches_played = matches_played + 1, wins = wins + ?2, losses = losses + ?3, updated_at = ?4 WHERE id = ?5";

    let changed = conn
        .execute(sql, params![update.new_rating, wins, losses, now, update.player_id])
        .context("Failed to store rating update")?;
    if changed != 1 {
        anyhow::bail!("Player {} vanished while storing rating update", update.player_id);
    }
    Ok(())
}

/// Leaderboard position of an active player: rating descending, id ascending.
pub fn rank_of(conn: &Connection, player_id: i64, rating: f64) -> Result<i64> {
    let sql = "SELECT COUNT(*) + 1 FROM players WHERE is_active = 1 AND id <> ?1 AND (rating > ?2 OR (rating = ?2 AND id < ?1))";

    conn.query_row(sql, params![player_id, rating], |row| row.get(0))
        .context("Failed to compute player rank")
}

/// Active players in leaderboard order.
pub fn list_ranked(conn: &Connection) -> Result<Vec<Player>> {
    let sql = format!(
        "SELECT {} FROM players WHERE is_active = 1 ORDER BY rating DESC, id ASC",
        PLAYER_COLUMNS
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([], parse_player_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}

pub fn count_players(conn: &Connection) -> Result<(i64, i64)> {
    let sql = "SELECT COUNT(*), COALESCE(SUM(is_active), 0) FROM players";
    conn.query_row(sql, [], |row| Ok((row.get(0)?, row.get(1)?)))
        .context("Failed to count players")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::connection::temp_pool;
    use chrono::Utc;

    fn new_player(username: &str) -> NewPlayer {
        NewPlayer {
            username: username.to_string(),
            email: format!("{}@example.com", username),
            full_name: format!("{} Player", username),
        }
    }

    #[test]
    fn test_insert_and_find() {
        let (_dir, pool) = temp_pool();
        let conn = pool.get().unwrap();
        let now = Utc::now().naive_utc();

        let inserted = insert_player(&conn, &new_player("alice"), 1000.0, now).unwrap();
        assert_eq!(inserted.rating, 1000.0);
        assert!(inserted.is_active);
        assert_eq!(inserted.matches_played, 0);

        let found = find_by_id(&conn, inserted.id).unwrap().unwrap();
        assert_eq!(found.username, "alice");
        assert!(find_by_id(&conn, 999).unwrap().is_none());
    }

    #[test]
    fn test_duplicate_username_is_rejected() {
        let (_dir, pool) = temp_pool();
        let conn = pool.get().unwrap();
        let now = Utc::now().naive_utc();

        insert_player(&conn, &new_player("bob"), 1000.0, now).unwrap();
        assert!(insert_player(&conn, &new_player("bob"), 1000.0, now).is_err());
    }

    #[test]
    fn test_rating_update_and_rank() {
        let (_dir, pool) = temp_pool();
        let conn = pool.get().unwrap();
        let now = Utc::now().naive_utc();

        let a = insert_player(&conn, &new_player("anna"), 1000.0, now).unwrap();
        let b = insert_player(&conn, &new_player("bert"), 1000.0, now).unwrap();

        assert_eq!(rank_of(&conn, a.id, a.rating).unwrap(), 1);
        assert_eq!(rank_of(&conn, b.id, b.rating).unwrap(), 2);

        let update = RatingUpdate {
            player_id: b.id,
            old_rating: 1000.0,
            new_rating: 1016.0,
            delta: 16.0,
            category: "beginner".to_string(),
            won: true,
        };
        apply_rating_update(&conn, &update, now).unwrap();

        let b = find_by_id(&conn, b.id).unwrap().unwrap();
        assert_eq!(b.rating, 1016.0);
        assert_eq!((b.matches_played, b.wins, b.losses), (1, 1, 0));
        assert_eq!(rank_of(&conn, b.id, b.rating).unwrap(), 1);

        let ranked = list_ranked(&conn).unwrap();
        assert_eq!(ranked.iter().map(|p| p.id).collect::<Vec<_>>(), vec![b.id, a.id]);
    }

    #[test]
    fn test_list_players_search_and_active_filter() {
        let (_dir, pool) = temp_pool();
        let conn = pool.get().unwrap();
        let now = Utc::now().naive_utc();

        insert_player(&conn, &new_player("carla"), 1000.0, now).unwrap();
        let mut dora = insert_player(&conn, &new_player("dora"), 1000.0, now).unwrap();
        dora.set_active(false);
        save_profile(&conn, &dora, now).unwrap();

        let all = PlayerFilter { limit: 10, ..Default::default() };
        assert_eq!(list_players(&conn, &all).unwrap().1, 2);

        let active = PlayerFilter { active_only: true, limit: 10, ..Default::default() };
        let (rows, total) = list_players(&conn, &active).unwrap();
        assert_eq!(total, 1);
        assert_eq!(rows[0].username, "carla");

        let search = PlayerFilter { search: Some("DOR".to_string()), limit: 10, ..Default::default() };
        assert_eq!(list_players(&conn, &search).unwrap().0[0].username, "dora");

        assert_eq!(count_players(&conn).unwrap(), (2, 1));
    }
}
