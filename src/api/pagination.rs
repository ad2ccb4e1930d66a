//! Resolution of `limit`/`offset` query parameters.

use serde::Serialize;

/// Page size used when the client omits `limit` or sends garbage.
pub const DEFAULT_LIMIT: i64 = 25;

/// Effective page window for a list query.
///
/// `limit` is always positive and `offset` never negative. There is no
/// upper bound on `limit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub limit: i64,
    pub offset: i64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self { limit: DEFAULT_LIMIT, offset: 0 }
    }
}

impl Pagination {
    /// Resolve raw query values. Never fails: anything absent, non-numeric
    /// or out of range falls back to the default for that parameter.
    pub fn resolve(limit: Option<&str>, offset: Option<&str>) -> Self {
        let limit = limit
            .and_then(|s| s.trim().parse::<i64>().ok())
            .filter(|l| *l > 0)
            .unwrap_or(DEFAULT_LIMIT);
        let offset = offset
            .and_then(|s| s.trim().parse::<i64>().ok())
            .filter(|o| *o >= 0)
            .unwrap_or(0);
        Self { limit, offset }
    }
}
