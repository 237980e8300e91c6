//! Turns a fetched window and its existence check into the listing's
//! outcome.
//!
//! A list request ends in exactly one of: validation failure (returned
//! before anything runs), filter target missing, page overflow, or success.
//! When several apply, they win in that order.

use pagination::{Page, Paginated, Windowed};
use types::{ApiError, ApiResult, NotFound};

/// Result of checking the resource a listing is scoped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterTarget {
    /// The listing was not scoped to anything.
    Unnamed,
    Found,
    Missing(NotFound),
}

impl FilterTarget {
    pub fn checked(exists: bool, missing: NotFound) -> FilterTarget {
        if exists {
            FilterTarget::Found
        } else {
            FilterTarget::Missing(missing)
        }
    }
}

pub fn assemble<W>(
    window: Vec<W>,
    target: FilterTarget,
    page: &Page,
    overflow: NotFound,
) -> ApiResult<Paginated<W::Row>>
where
    W: Windowed,
{
    if let FilterTarget::Missing(missing) = target {
        return Err(ApiError::NotFound(missing));
    }
    if page.overflowed(window.len()) {
        return Err(ApiError::NotFound(overflow));
    }
    Ok(Paginated::from_window(window))
}
