//! Expression helpers shared by the search queries.

use sea_orm::sea_query::{Expr, Func, LikeExpr, SimpleExpr};
use sea_orm::{ColumnTrait, Order};

use crate::domain::query::SortDir;

fn qualified<C: ColumnTrait>(col: C) -> SimpleExpr {
    Expr::col((col.entity_name(), col)).into()
}

/// `%`, `_` and `\` match literally.
pub fn escape_like(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Case-insensitive substring match, for search filters.
pub fn ci_contains<C: ColumnTrait>(col: C, needle: &str) -> SimpleExpr {
    let pattern = format!("%{}%", escape_like(&needle.to_lowercase()));
    Expr::expr(Func::lower(qualified(col))).like(LikeExpr::new(pattern).escape('\\'))
}

/// Uniqueness key of a name or title. Computed here rather than with SQL
/// `LOWER()`, which only folds ASCII on SQLite.
pub fn natural_key(value: &str) -> String {
    value.trim().to_lowercase()
}

pub fn order(dir: SortDir) -> Order {
    match dir {
        SortDir::Asc => Order::Asc,
        SortDir::Desc => Order::Desc,
    }
}

/// Trimmed, non-empty filter value.
pub fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_metacharacters_are_escaped() {
        assert_eq!(escape_like("100%_a\\b"), "100\\%\\_a\\\\b");
        assert_eq!(escape_like("plain"), "plain");
    }

    #[test]
    fn natural_keys_fold_non_ascii_case() {
        assert_eq!(natural_key(" Études "), "études");
        assert_eq!(natural_key("ÉTUDES"), natural_key("études"));
        assert_ne!(natural_key("Etudes"), natural_key("Études"));
    }

    #[test]
    fn blank_filters_are_ignored() {
        assert_eq!(present(&Some("  ".into())), None);
        assert_eq!(present(&Some(" tolkien ".into())), Some("tolkien"));
        assert_eq!(present(&None), None);
    }
}
