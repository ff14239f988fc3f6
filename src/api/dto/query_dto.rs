//! Query parameters shared by list endpoints.

use serde::Deserialize;
use utoipa::IntoParams;

const DEFAULT_LIMIT: usize = 20;
const MAX_LIMIT: usize = 200;

/// `?limit=` for list endpoints.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct LimitParams {
    /// Maximum number of items (1-200). Defaults to 20.
    #[serde(default)]
    pub limit: Option<usize>,
}

impl LimitParams {
    /// Returns the requested limit clamped to the allowed range.
    #[must_use]
    pub fn clamped(&self) -> usize {
        self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_defaults_and_clamps() {
        assert_eq!(LimitParams::default().clamped(), 20);
        assert_eq!(LimitParams { limit: Some(0) }.clamped(), 1);
        assert_eq!(LimitParams { limit: Some(5_000) }.clamped(), 200);
        assert_eq!(LimitParams { limit: Some(7) }.clamped(), 7);
    }
}
