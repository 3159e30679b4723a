//! Search parameters: a loosely-typed bag from the wire resolved into a typed,
//! validated query before it reaches a repository.

use crate::domain::error::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDir {
    Asc,
    Desc,
}

impl SortDir {
    /// `"asc"` in any case is ascending, anything else descending.
    pub fn parse(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("asc") {
            SortDir::Asc
        } else {
            SortDir::Desc
        }
    }
}

/// A sortable field of one entity.
pub trait SortField: Copy + Sized + Send + Sync + 'static {
    /// Accepts camelCase and snake_case spellings.
    fn parse(name: &str) -> Option<Self>;

    /// Order used when the request gives none.
    fn default_order() -> Vec<(Self, SortDir)>;
}

fn normalize_field(name: &str) -> String {
    name.trim()
        .chars()
        .filter(|c| *c != '_')
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

macro_rules! sort_fields {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => $key:literal),+ $(,)? }
        default: [$(($dvariant:ident, $ddir:ident)),+ $(,)?]
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum $name {
            $($variant),+
        }

        impl SortField for $name {
            fn parse(name: &str) -> Option<Self> {
                match normalize_field(name).as_str() {
                    $($key => Some(Self::$variant),)+
                    _ => None,
                }
            }

            fn default_order() -> Vec<(Self, SortDir)> {
                vec![$((Self::$dvariant, SortDir::$ddir)),+]
            }
        }
    };
}

sort_fields!(RoleSort {
    Name => "name",
    CreatedAt => "createdat",
    UpdatedAt => "updatedat",
} default: [(CreatedAt, Desc)]);

sort_fields!(AuthorSort {
    Name => "name",
    BirthDate => "birthdate",
    CreatedAt => "createdat",
    UpdatedAt => "updatedat",
} default: [(CreatedAt, Desc)]);

sort_fields!(
    /// Categories default to name descending, unlike every other entity.
    CategorySort {
        Name => "name",
        Status => "status",
        CreatedAt => "createdat",
        UpdatedAt => "updatedat",
    } default: [(Name, Desc)]
);

sort_fields!(
    /// `Author` and `Category` sort by the joined name.
    BookSort {
        Title => "title",
        Author => "author",
        Category => "category",
        Isbn => "isbn",
        Publisher => "publisher",
        Quantity => "quantity",
        IssuedBook => "issuedbook",
        Status => "status",
        CreatedAt => "createdat",
        UpdatedAt => "updatedat",
    } default: [(CreatedAt, Desc)]
);

sort_fields!(
    /// `Role` sorts by the joined role name.
    UserSort {
        Name => "name",
        Email => "email",
        Status => "status",
        Role => "role",
        LastLogin => "lastlogin",
        CreatedAt => "createdat",
        UpdatedAt => "updatedat",
    } default: [(CreatedAt, Desc)]
);

sort_fields!(BorrowSort {
    IssueDate => "issuedate",
    ReturnDate => "returndate",
    Status => "status",
    CreatedAt => "createdat",
    UpdatedAt => "updatedat",
} default: [(CreatedAt, Desc)]);

/// Page size bounds applied to every search.
#[derive(Debug, Clone, Copy)]
pub struct PageLimits {
    pub default_limit: u64,
    pub max_limit: u64,
}

impl Default for PageLimits {
    fn default() -> Self {
        Self {
            default_limit: 10,
            max_limit: 100,
        }
    }
}

/// Search request as received: filters plus `[[field, direction]]` ordering.
#[derive(Debug, Clone, Default)]
pub struct SearchParams<F> {
    pub filter: F,
    pub order: Vec<(String, String)>,
    pub offset: Option<u64>,
    pub limit: Option<u64>,
}

impl<F> SearchParams<F> {
    pub fn new(filter: F) -> Self {
        Self {
            filter,
            order: Vec::new(),
            offset: None,
            limit: None,
        }
    }

    pub fn order_by(mut self, field: impl Into<String>, dir: impl Into<String>) -> Self {
        self.order.push((field.into(), dir.into()));
        self
    }

    pub fn page(mut self, offset: u64, limit: u64) -> Self {
        self.offset = Some(offset);
        self.limit = Some(limit);
        self
    }

    /// Resolve sort fields and clamp paging. Unknown fields are rejected.
    pub fn resolve<S: SortField>(
        self,
        limits: PageLimits,
    ) -> Result<SearchQuery<F, S>, DomainError> {
        let mut order = Vec::with_capacity(self.order.len());
        for (field, dir) in &self.order {
            let key = S::parse(field).ok_or_else(|| DomainError::InvalidSortField {
                field: field.clone(),
            })?;
            order.push((key, SortDir::parse(dir)));
        }
        if order.is_empty() {
            order = S::default_order();
        }

        let limit = self
            .limit
            .unwrap_or(limits.default_limit)
            .clamp(1, limits.max_limit.clamp(1, MAX_SQL_INT));

        Ok(SearchQuery {
            filter: self.filter,
            order,
            offset: self.offset.unwrap_or(0).min(MAX_SQL_INT),
            limit,
        })
    }
}

/// Paging values are bound as signed 64-bit integers.
const MAX_SQL_INT: u64 = i64::MAX as u64;

/// Validated search handed to repositories.
#[derive(Debug, Clone)]
pub struct SearchQuery<F, S> {
    pub filter: F,
    pub order: Vec<(S, SortDir)>,
    pub offset: u64,
    pub limit: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_is_case_insensitive_and_defaults_to_desc() {
        assert_eq!(SortDir::parse("ASC"), SortDir::Asc);
        assert_eq!(SortDir::parse("asc"), SortDir::Asc);
        assert_eq!(SortDir::parse("DESC"), SortDir::Desc);
        assert_eq!(SortDir::parse("sideways"), SortDir::Desc);
    }

    #[test]
    fn field_names_accept_camel_and_snake_case() {
        assert_eq!(BookSort::parse("issuedBook"), Some(BookSort::IssuedBook));
        assert_eq!(BookSort::parse("issued_book"), Some(BookSort::IssuedBook));
        assert_eq!(UserSort::parse("lastLogin"), Some(UserSort::LastLogin));
        assert_eq!(BookSort::parse("password"), None);
    }

    #[test]
    fn defaults_apply_when_order_and_paging_are_absent() {
        let q: SearchQuery<(), BookSort> =
            SearchParams::new(()).resolve(PageLimits::default()).unwrap();
        assert_eq!(q.order, vec![(BookSort::CreatedAt, SortDir::Desc)]);
        assert_eq!(q.offset, 0);
        assert_eq!(q.limit, 10);

        let q: SearchQuery<(), CategorySort> =
            SearchParams::new(()).resolve(PageLimits::default()).unwrap();
        assert_eq!(q.order, vec![(CategorySort::Name, SortDir::Desc)]);
    }

    #[test]
    fn limit_is_clamped_to_bounds() {
        let limits = PageLimits {
            default_limit: 10,
            max_limit: 50,
        };
        let q: SearchQuery<(), RoleSort> =
            SearchParams::new(()).page(5, 500).resolve(limits).unwrap();
        assert_eq!(q.limit, 50);
        assert_eq!(q.offset, 5);

        let q: SearchQuery<(), RoleSort> =
            SearchParams::new(()).page(0, 0).resolve(limits).unwrap();
        assert_eq!(q.limit, 1);
    }

    #[test]
    fn offset_and_limit_fit_a_signed_sql_integer() {
        let q: SearchQuery<(), BookSort> = SearchParams::new(())
            .page(u64::MAX, 5)
            .resolve(PageLimits::default())
            .unwrap();
        assert_eq!(q.offset, i64::MAX as u64);

        let unbounded = PageLimits {
            default_limit: 10,
            max_limit: u64::MAX,
        };
        let q: SearchQuery<(), BookSort> =
            SearchParams::new(()).page(0, u64::MAX).resolve(unbounded).unwrap();
        assert_eq!(q.limit, i64::MAX as u64);
    }

    #[test]
    fn unknown_sort_field_is_rejected() {
        let err = SearchParams::new(())
            .order_by("passwordHash", "asc")
            .resolve::<UserSort>(PageLimits::default())
            .unwrap_err();
        assert_eq!(
            err,
            DomainError::InvalidSortField {
                field: "passwordHash".into()
            }
        );
    }

    #[test]
    fn multiple_order_entries_keep_their_sequence() {
        let q: SearchQuery<(), BookSort> = SearchParams::new(())
            .order_by("author", "asc")
            .order_by("title", "desc")
            .resolve(PageLimits::default())
            .unwrap();
        assert_eq!(
            q.order,
            vec![(BookSort::Author, SortDir::Asc), (BookSort::Title, SortDir::Desc)]
        );
    }
}
