//! Database access layer
//!
//! Plain async functions over `sqlx` with hand-written SQL. Every query takes
//! the caller's `tenant_id`; rows of other tenants are simply not found.
//! Functions that must join a caller's transaction take `&mut PgConnection`
//! (pass `&mut *tx`), the rest take any [`sqlx::PgExecutor`].

pub mod audit;
pub mod bookings;
pub mod branches;
pub mod customers;
pub mod expenses;
pub mod orders;
pub mod products;
pub mod rooms;
pub mod sales;
pub mod tables;
pub mod tenants;
pub mod users;

/// `%term%` for ILIKE searches, with LIKE metacharacters escaped
pub fn like_pattern(term: &str) -> String {
    let escaped = term
        .trim()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

/// Optional search term as an ILIKE pattern; blank input means no filter
pub fn search_pattern(term: Option<&str>) -> Option<String> {
    term.map(str::trim)
        .filter(|t| !t.is_empty())
        .map(like_pattern)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_escapes() {
        assert_eq!(like_pattern(" cola "), "%cola%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
    }

    #[test]
    fn test_blank_search_is_no_filter() {
        assert_eq!(search_pattern(Some("   ")), None);
        assert_eq!(search_pattern(None), None);
        assert_eq!(search_pattern(Some("tea")).as_deref(), Some("%tea%"));
    }
}
