//! Shared database error helpers.

/// Returns true if a SeaORM error was raised by a unique index.
pub fn is_unique_violation(err: &sea_orm::DbErr) -> bool {
    if let Some(sea_orm::SqlErr::UniqueConstraintViolation(_)) = err.sql_err() {
        return true;
    }
    let msg = err.to_string().to_lowercase();
    msg.contains("unique constraint") || msg.contains("duplicate key")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_by_message() {
        let err = sea_orm::DbErr::Custom("UNIQUE constraint failed: authors.name_key".into());
        assert!(is_unique_violation(&err));
        let err = sea_orm::DbErr::Custom("no such table".into());
        assert!(!is_unique_violation(&err));
    }
}
