//! Limit/offset windows and the totals that come back with them.
//!
//! Listings fetch their window and the size of the whole filtered set in
//! one statement: every row carries `COUNT(*) OVER ()`, which Postgres
//! evaluates before `LIMIT`/`OFFSET` are applied. The total therefore never
//! depends on how many rows the window happened to contain.

use types::ValidationError;

pub const DEFAULT_LIMIT: i64 = 10;
pub const DEFAULT_PAGE: i64 = 1;

/// A 1-indexed page of `limit` rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: i64,
    pub page: i64,
}

impl Page {
    /// Parses `limit` and `p` as given by the caller, falling back to the
    /// defaults when absent. Both must be integers of at least 1.
    pub fn parse(limit: Option<&str>, page: Option<&str>) -> Result<Page, ValidationError> {
        let mut errors = ValidationError::default();
        let limit = positive("limit", limit, DEFAULT_LIMIT, &mut errors);
        let page = positive("p", page, DEFAULT_PAGE, &mut errors);
        errors.or_ok(Page { limit, page })
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    pub fn is_first(&self) -> bool {
        self.page == 1
    }

    /// An empty window past the first page means the caller asked for a
    /// page beyond the data. On page 1 it is just an empty result.
    pub fn overflowed(&self, rows_in_window: usize) -> bool {
        rows_in_window == 0 && !self.is_first()
    }
}

impl Default for Page {
    fn default() -> Self {
        Page {
            limit: DEFAULT_LIMIT,
            page: DEFAULT_PAGE,
        }
    }
}

fn positive(field: &str, raw: Option<&str>, default: i64, errors: &mut ValidationError) -> i64 {
    let raw = match raw {
        Some(raw) => raw.trim(),
        None => return default,
    };
    match raw.parse::<i64>() {
        Ok(value) if value >= 1 => value,
        _ => {
            errors.add_error(field, format!("expected a positive integer, got '{}'", raw));
            default
        }
    }
}

/// A row fetched together with the window count of its result set.
pub trait Windowed {
    type Row;

    fn total_count(&self) -> i64;
    fn into_row(self) -> Self::Row;
}

/// One page of rows plus the size of the whole filtered set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Paginated<T> {
    pub rows: Vec<T>,
    pub total_count: i64,
}

impl<T> Paginated<T> {
    /// Every row of a window carries the same total; an empty window has
    /// none to carry and only occurs on page 1 of an empty set, so it
    /// reports 0.
    pub fn from_window<W>(window: Vec<W>) -> Self
    where
        W: Windowed<Row = T>,
    {
        let total_count = window.first().map_or(0, |row| row.total_count());
        Paginated {
            rows: window.into_iter().map(Windowed::into_row).collect(),
            total_count,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Row(u32, i64);

    impl Windowed for Row {
        type Row = u32;

        fn total_count(&self) -> i64 {
            self.1
        }

        fn into_row(self) -> u32 {
            self.0
        }
    }

    #[test]
    fn defaults_to_first_page_of_ten() {
        assert_eq!(Page::parse(None, None), Ok(Page { limit: 10, page: 1 }));
        assert_eq!(Page::default().offset(), 0);
    }

    #[test]
    fn offset_skips_whole_pages() {
        let page = Page::parse(Some("8"), Some("2")).expect("valid");
        assert_eq!(page.offset(), 8);
        let page = Page { limit: 5, page: 4 };
        assert_eq!(page.offset(), 15);
    }

    #[test]
    fn offset_saturates_instead_of_overflowing() {
        let page = Page {
            limit: i64::max_value(),
            page: 3,
        };
        assert_eq!(page.offset(), i64::max_value());
    }

    #[test]
    fn non_positive_or_non_numeric_values_are_rejected() {
        for raw in &["0", "-1", "ten", "1.5", ""] {
            let errors = Page::parse(Some(*raw), None).expect_err("limit rejected");
            assert!(errors.field("limit").is_some(), "limit={:?}", raw);
            let errors = Page::parse(None, Some(*raw)).expect_err("page rejected");
            assert!(errors.field("p").is_some(), "p={:?}", raw);
        }
    }

    #[test]
    fn both_fields_are_reported_together() {
        let errors = Page::parse(Some("x"), Some("y")).expect_err("rejected");
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn empty_window_overflows_only_past_page_one() {
        assert!(!Page { limit: 10, page: 1 }.overflowed(0));
        assert!(Page { limit: 10, page: 2 }.overflowed(0));
        assert!(!Page { limit: 10, page: 2 }.overflowed(3));
    }

    #[test]
    fn total_comes_from_the_window_not_its_length() {
        let page = Paginated::from_window(vec![Row(9, 12), Row(10, 12), Row(11, 12), Row(12, 12)]);
        assert_eq!(page.rows, vec![9, 10, 11, 12]);
        assert_eq!(page.total_count, 12);
    }

    #[test]
    fn empty_window_totals_zero() {
        let page: Paginated<u32> = Paginated::from_window(Vec::<Row>::new());
        assert!(page.is_empty());
        assert_eq!(page.total_count, 0);
    }
}
