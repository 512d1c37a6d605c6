//! Mapping from sqlx errors to the core taxonomy.

use trailbound_core::error::Error;

/// Unique-constraint violations become `Conflict` with a message keyed off
/// the violated index; everything else is a `Database` error whose detail
/// goes to the log, not the caller.
pub(crate) fn map_sqlx(e: sqlx::Error) -> Error {
    if let sqlx::Error::Database(db) = &e {
        if db.is_unique_violation() {
            return Error::conflict(conflict_message(db.constraint()));
        }
    }
    tracing::error!(error = %e, "database operation failed");
    Error::Database(e.to_string())
}

fn conflict_message(constraint: Option<&str>) -> &'static str {
    match constraint {
        Some("tours_name_key") => "a tour with this name already exists",
        Some("reviews_tour_id_user_id_key") => "you have already reviewed this tour",
        Some("bookings_tour_id_user_id_key") => "you have already booked this tour",
        Some("users_email_key") => "an account with this email already exists",
        _ => "duplicate value violates a uniqueness constraint",
    }
}

/// Text columns holding enum names are written exclusively from typed
/// values, so a parse failure on the way out means corrupt data.
pub(crate) fn corrupt(column: &str, value: &str) -> Error {
    tracing::error!(column, value, "unparseable enum value in database");
    Error::Database(format!("corrupt value in column {column}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_constraint_gets_generic_message() {
        assert_eq!(
            conflict_message(Some("something_else")),
            "duplicate value violates a uniqueness constraint"
        );
        assert_eq!(
            conflict_message(Some("bookings_tour_id_user_id_key")),
            "you have already booked this tour"
        );
    }
}
