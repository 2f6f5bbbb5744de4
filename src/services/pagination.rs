//! Cursor pagination shared by every listing.
//!
//! The service asks the store for `limit + 1` rows. If the extra probe row comes
//! back there is another page: it is dropped and the cursor points at the last
//! row that was kept. Otherwise this is the last page and there is no cursor.

use crate::domain::{Identified, Page};
use crate::error::AppError;
use crate::utils::cursor;

pub const DEFAULT_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 100;

/// Limit for client-facing listings: default when unset, capped at [`MAX_LIMIT`].
pub fn normalize_limit(limit: i64) -> i64 {
    normalize_limit_within(limit, MAX_LIMIT)
}

pub fn normalize_limit_within(limit: i64, max: i64) -> i64 {
    if limit <= 0 {
        DEFAULT_LIMIT
    } else {
        limit.min(max)
    }
}

/// Decodes an optional cursor. A malformed cursor is a client error, never page one.
pub fn decode_cursor(cursor: Option<&str>) -> Result<Option<String>, AppError> {
    match cursor {
        None | Some("") => Ok(None),
        Some(c) => Ok(Some(cursor::decode(c)?)),
    }
}

/// Builds a page from at most `limit + 1` rows ordered by id descending.
pub fn into_page<T: Identified>(mut rows: Vec<T>, limit: i64) -> Page<T> {
    let limit = usize::try_from(limit).unwrap_or(0);
    if rows.len() <= limit {
        return Page {
            items: rows,
            next_cursor: None,
        };
    }

    rows.truncate(limit);
    let next_cursor = rows.last().map(|last| cursor::encode(last.id()));
    Page {
        items: rows,
        next_cursor,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Row(String);

    impl Identified for Row {
        fn id(&self) -> &str {
            &self.0
        }
    }

    fn rows(ids: &[&str]) -> Vec<Row> {
        ids.iter().map(|id| Row(id.to_string())).collect()
    }

    #[test]
    fn test_normalize_limit() {
        assert_eq!(normalize_limit(0), DEFAULT_LIMIT);
        assert_eq!(normalize_limit(-5), DEFAULT_LIMIT);
        assert_eq!(normalize_limit(3), 3);
        assert_eq!(normalize_limit(10_000), MAX_LIMIT);
    }

    #[test]
    fn test_normalize_limit_within_custom_cap() {
        assert_eq!(normalize_limit_within(150, i64::MAX), 150);
        assert_eq!(normalize_limit_within(0, i64::MAX), DEFAULT_LIMIT);
        assert_eq!(normalize_limit_within(150, 120), 120);
    }

    #[test]
    fn test_decode_cursor_absent_or_empty() {
        assert_eq!(decode_cursor(None).unwrap(), None);
        assert_eq!(decode_cursor(Some("")).unwrap(), None);
    }

    #[test]
    fn test_decode_cursor_malformed_is_validation() {
        let err = decode_cursor(Some("not-base64!!")).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_into_page_last_page() {
        let page = into_page(rows(&["c", "b"]), 2);
        assert_eq!(page.items, rows(&["c", "b"]));
        assert_eq!(page.next_cursor, None);
    }

    #[test]
    fn test_into_page_with_probe_row() {
        let page = into_page(rows(&["c", "b", "a"]), 2);
        assert_eq!(page.items, rows(&["c", "b"]));
        assert_eq!(page.next_cursor, Some(cursor::encode("b")));
    }

    #[test]
    fn test_into_page_huge_limit() {
        let page = into_page(rows(&["b", "a"]), i64::MAX);
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.next_cursor, None);
    }

    #[test]
    fn test_into_page_empty() {
        let page = into_page(Vec::<Row>::new(), 10);
        assert!(page.items.is_empty());
        assert_eq!(page.next_cursor, None);
    }
}
