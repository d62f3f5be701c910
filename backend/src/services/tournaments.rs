use anyhow::Result;
use chrono::Utc;
use log::info;
use rusqlite::{Connection, TransactionBehavior};

use crate::database::{self, StandingRow, Tournament};
use crate::domain::validation::{check_max_players, check_tournament_name, validate_new_tournament};
use crate::domain::{NewTournament, TournamentStatus, TournamentUpdate};
use crate::errors::{ServiceError, ValidationError};

pub fn create_tournament(conn: &Connection, new_tournament: &NewTournament) -> Result<Tournament> {
    validate_new_tournament(new_tournament)?;
    let tournament = database::tournaments::insert_tournament(conn, new_tournament, Utc::now().naive_utc())?;
    info!("Created tournament {} ({})", tournament.id, tournament.name);
    Ok(tournament)
}

pub fn get_tournament(conn: &Connection, tournament_id: i64) -> Result<Tournament> {
    database::tournaments::find_by_id(conn, tournament_id)?
        .ok_or_else(|| ServiceError::not_found("Tournament", tournament_id).into())
}

/// Applies a partial update. Status changes must follow
/// pending -> in_progress -> completed, with cancellation allowed from
/// either of the first two.
pub fn update_tournament(conn: &Connection, tournament_id: i64, update: TournamentUpdate) -> Result<Tournament> {
    let mut tournament = get_tournament(conn, tournament_id)?;

    if let Some(next) = update.status {
        if !tournament.status.can_transition_to(next) {
            return Err(ValidationError::field(
                "status",
                format!(
                    "cannot move from {} to {}",
                    tournament.status.as_str(),
                    next.as_str()
                ),
            )
            .into());
        }
    }

    tournament.apply_update(update);

    check_tournament_name(&tournament.name)?;
    check_max_players(tournament.max_players)?;
    if tournament.end_date < tournament.start_date {
        return Err(ValidationError::field("endDate", "must not be before startDate").into());
    }
    if (tournament.max_players as i64) < tournament.registered_players {
        return Err(ServiceError::conflict(format!(
            "{} players are already registered",
            tournament.registered_players
        ))
        .into());
    }

    database::tournaments::save_tournament(conn, &tournament, Utc::now().naive_utc())
}

/// Registers an active player while the tournament is still pending.
pub fn register_player(conn: &mut Connection, tournament_id: i64, player_id: i64) -> Result<Tournament> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let tournament = get_tournament(&tx, tournament_id)?;
    if tournament.status != TournamentStatus::Pending {
        return Err(ServiceError::conflict(format!(
            "tournament {} is {}",
            tournament_id,
            tournament.status.as_str()
        ))
        .into());
    }

    let player = database::players::find_by_id(&tx, player_id)?
        .ok_or(ServiceError::not_found("Player", player_id))?;
    if !player.is_active {
        return Err(ValidationError::field("playerId", format!("player {} is inactive", player_id)).into());
    }
    if database::tournaments::is_registered(&tx, tournament_id, player_id)? {
        return Err(ServiceError::conflict(format!(
            "player {} is already registered",
            player_id
        ))
        .into());
    }
    if tournament.is_full() {
        return Err(ServiceError::conflict("tournament is full").into());
    }

    database::tournaments::register_player(&tx, tournament_id, player_id, Utc::now().naive_utc())?;
    let tournament = get_tournament(&tx, tournament_id)?;
    tx.commit()?;

    info!("Registered player {} for tournament {}", player_id, tournament_id);
    Ok(tournament)
}

pub fn standings(conn: &Connection, tournament_id: i64) -> Result<Vec<StandingRow>> {
    get_tournament(conn, tournament_id)?;
    database::matches::tournament_standings(conn, tournament_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::connection::temp_pool;
    use crate::domain::NewPlayer;
    use chrono::NaiveDate;

    fn new_tournament(max_players: i32) -> NewTournament {
        let start = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap().and_hms_opt(9, 0, 0).unwrap();
        NewTournament {
            name: "Spring Open".to_string(),
            description: None,
            start_date: start,
            end_date: start + chrono::Duration::days(2),
            max_players,
        }
    }

    fn add_player(conn: &Connection, username: &str) -> i64 {
        let new_player = NewPlayer {
            username: username.to_string(),
            email: format!("{}@example.com", username),
            full_name: format!("{} Player", username),
        };
        database::players::insert_player(conn, &new_player, 1000.0, Utc::now().naive_utc())
            .unwrap()
            .id
    }

    fn kind<T: std::fmt::Debug>(result: Result<T>) -> String {
        let err = result.unwrap_err();
        if err.downcast_ref::<ServiceError>().is_some() {
            "service".to_string()
        } else if err.downcast_ref::<ValidationError>().is_some() {
            "validation".to_string()
        } else {
            err.to_string()
        }
    }

    #[test]
    fn test_registration_rules() {
        let (_dir, pool) = temp_pool();
        let mut conn = pool.get().unwrap();
        let tournament = create_tournament(&conn, &new_tournament(4)).unwrap();
        let ids: Vec<i64> = ["alpha", "bravo", "charlie", "delta", "echo"]
            .iter()
            .map(|name| add_player(&conn, name))
            .collect();

        for id in &ids[..4] {
            register_player(&mut conn, tournament.id, *id).unwrap();
        }
        assert_eq!(kind(register_player(&mut conn, tournament.id, ids[0])), "service");
        assert_eq!(kind(register_player(&mut conn, tournament.id, ids[4])), "service");
        assert_eq!(kind(register_player(&mut conn, tournament.id, 999)), "service");

        let t = get_tournament(&conn, tournament.id).unwrap();
        assert_eq!(t.registered_players, 4);
        assert!(t.is_full());
    }

    #[test]
    fn test_status_transitions_enforced() {
        let (_dir, pool) = temp_pool();
        let conn = pool.get().unwrap();
        let tournament = create_tournament(&conn, &new_tournament(8)).unwrap();

        let skip = TournamentUpdate {
            status: Some(TournamentStatus::Completed),
            ..Default::default()
        };
        assert_eq!(kind(update_tournament(&conn, tournament.id, skip)), "validation");

        let start = TournamentUpdate {
            status: Some(TournamentStatus::InProgress),
            ..Default::default()
        };
        let updated = update_tournament(&conn, tournament.id, start).unwrap();
        assert_eq!(updated.status, TournamentStatus::InProgress);
    }

    #[test]
    fn test_cannot_shrink_below_registrations() {
        let (_dir, pool) = temp_pool();
        let mut conn = pool.get().unwrap();
        let tournament = create_tournament(&conn, &new_tournament(8)).unwrap();
        for name in ["alpha", "bravo", "charlie", "delta", "echo"] {
            let id = add_player(&conn, name);
            register_player(&mut conn, tournament.id, id).unwrap();
        }

        let shrink = TournamentUpdate {
            max_players: Some(4),
            ..Default::default()
        };
        assert_eq!(kind(update_tournament(&conn, tournament.id, shrink)), "service");
    }

    #[test]
    fn test_standings_requires_tournament() {
        let (_dir, pool) = temp_pool();
        let conn = pool.get().unwrap();
        assert_eq!(kind(standings(&conn, 42)), "service");
    }
}
