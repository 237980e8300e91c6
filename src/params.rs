//! Listing parameters as they arrive from the caller, and their validated
//! forms. Nothing here touches the store: a request that fails validation
//! never reaches a query.

use filter::TopicFilter;
use pagination::Page;
use sort::{Order, SortKey};
use types::{Validate, ValidationError};

/// Raw query-string parameters of an article listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArticleQuery {
    pub topic: Option<String>,
    pub sort_by: Option<String>,
    pub order: Option<String>,
    pub limit: Option<String>,
    pub p: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArticleListParams {
    pub filter: TopicFilter,
    pub sort: SortKey,
    pub order: Order,
    pub page: Page,
}

impl Validate for ArticleQuery {
    type Output = ArticleListParams;

    fn validate(self) -> Result<ArticleListParams, ValidationError> {
        let mut errors = ValidationError::default();

        let sort = match self.sort_by {
            Some(ref raw) => raw.parse::<SortKey>().map_err(|e| {
                errors.add_error("sort_by", e.to_string());
            }),
            None => Ok(SortKey::default()),
        };

        let order = match self.order {
            Some(ref raw) => raw.trim().parse::<Order>().map_err(|e| {
                errors.add_error("order", e.to_string());
            }),
            None => Ok(Order::default()),
        };

        let page = Page::parse(
            self.limit.as_ref().map(String::as_str),
            self.p.as_ref().map(String::as_str),
        ).map_err(|e| errors.merge(e));

        match (sort, order, page) {
            (Ok(sort), Ok(order), Ok(page)) => errors.or_ok(ArticleListParams {
                filter: TopicFilter::new(self.topic),
                sort,
                order,
                page,
            }),
            _ => Err(errors),
        }
    }
}

/// Raw query-string parameters of a comment listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommentQuery {
    pub limit: Option<String>,
    pub p: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CommentListParams {
    pub page: Page,
}

impl Validate for CommentQuery {
    type Output = CommentListParams;

    fn validate(self) -> Result<CommentListParams, ValidationError> {
        let page = Page::parse(
            self.limit.as_ref().map(String::as_str),
            self.p.as_ref().map(String::as_str),
        )?;
        Ok(CommentListParams { page })
    }
}

/// Parses a path identifier such as `article_id`. Only positive integers
/// that fit a Postgres `INT` are accepted.
pub fn parse_id(field: &str, raw: &str) -> Result<i32, ValidationError> {
    match raw.trim().parse::<i32>() {
        Ok(id) if id >= 1 => Ok(id),
        _ => Err(ValidationError::from(
            field,
            format!("expected a positive integer id, got '{}'", raw),
        )),
    }
}
