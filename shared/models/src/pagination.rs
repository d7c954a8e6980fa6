use serde::Serialize;
use thiserror::Error;

pub const DEFAULT_OFFSET: usize = 1;
pub const DEFAULT_LIMIT: usize = 100;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PaginationError {
    #[error("Invalid offset (must be a positive integer): {0}")]
    InvalidOffset(String),
    #[error("Invalid limit (must be a non-negative integer): {0}")]
    InvalidLimit(String),
}

/// A window over an ordered identifier sequence.
///
/// `offset` arrives 1-based on the wire and is stored 0-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub offset: usize,
    pub limit: usize,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: DEFAULT_OFFSET - 1,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl Pagination {
    /// Parses the raw `offset`/`limit` query values. Offsets below 1 clamp to 1.
    pub fn from_params(offset: Option<&str>, limit: Option<&str>) -> Result<Self, PaginationError> {
        let offset = match offset.map(str::trim).filter(|v| !v.is_empty()) {
            Some(raw) => raw
                .parse::<i64>()
                .map_err(|_| PaginationError::InvalidOffset(raw.to_string()))?
                .max(1) as usize,
            None => DEFAULT_OFFSET,
        };
        let limit = match limit.map(str::trim).filter(|v| !v.is_empty()) {
            Some(raw) => raw
                .parse::<usize>()
                .map_err(|_| PaginationError::InvalidLimit(raw.to_string()))?,
            None => DEFAULT_LIMIT,
        };

        Ok(Self {
            offset: offset - 1,
            limit,
        })
    }

    /// 1-based offset of the following page.
    pub fn next_set(&self) -> usize {
        self.offset.saturating_add(self.limit).saturating_add(1)
    }

    /// 1-based position of the last id shown out of `total`.
    pub fn last_shown(&self, total: usize) -> usize {
        self.offset.saturating_add(self.limit).min(total)
    }

    /// Offset marker for the preceding page, never negative.
    pub fn previous_set(&self) -> usize {
        self.offset.saturating_sub(self.limit)
    }

    pub fn window<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let start = self.offset.min(items.len());
        let end = self.offset.saturating_add(self.limit).min(items.len());
        &items[start..end]
    }

    pub fn has_next(&self, total: usize) -> bool {
        self.offset.saturating_add(self.limit) < total
    }
}
