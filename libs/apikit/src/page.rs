use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One page of a search plus the total number of matches ignoring pagination.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Page<T> {
    pub count: u64,
    pub rows: Vec<T>,
}

impl<T> Page<T> {
    pub fn new(count: u64, rows: Vec<T>) -> Self {
        Self { count, rows }
    }

    pub fn empty() -> Self {
        Self {
            count: 0,
            rows: Vec::new(),
        }
    }

    /// Map rows while preserving the count (domain -> DTO mapping convenience).
    pub fn map_rows<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            count: self.count,
            rows: self.rows.into_iter().map(f).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_rows_keeps_count() {
        let page = Page::new(42, vec![1, 2]).map_rows(|n| n.to_string());
        assert_eq!(page.count, 42);
        assert_eq!(page.rows, vec!["1", "2"]);
        assert_eq!(Page::<u8>::empty().count, 0);
    }
}
