//! Whitelisted ordering for article listings.
//!
//! Request text never reaches the ORDER BY clause: a sort key is parsed into
//! a [`SortKey`] and only the static expression mapped to that key is
//! rendered.

use std::fmt;
use std::str::FromStr;

/// Columns an article listing may be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Author,
    Title,
    ArticleId,
    Topic,
    CreatedAt,
    ArticleImgUrl,
    Votes,
    CommentCount,
}

impl SortKey {
    pub const ALL: [SortKey; 8] = [
        SortKey::Author,
        SortKey::Title,
        SortKey::ArticleId,
        SortKey::Topic,
        SortKey::CreatedAt,
        SortKey::ArticleImgUrl,
        SortKey::Votes,
        SortKey::CommentCount,
    ];

    pub fn as_str(&self) -> &'static str {
        match *self {
            SortKey::Author => "author",
            SortKey::Title => "title",
            SortKey::ArticleId => "article_id",
            SortKey::Topic => "topic",
            SortKey::CreatedAt => "created_at",
            SortKey::ArticleImgUrl => "article_img_url",
            SortKey::Votes => "votes",
            SortKey::CommentCount => "comment_count",
        }
    }

    /// SQL expression the key sorts on. Base columns are table-qualified so
    /// they stay unambiguous next to the joined `comments` table;
    /// `comment_count` is computed, so it sorts on the aggregate itself.
    pub fn expression(&self) -> &'static str {
        match *self {
            SortKey::Author => "articles.author",
            SortKey::Title => "articles.title",
            SortKey::ArticleId => "articles.article_id",
            SortKey::Topic => "articles.topic",
            SortKey::CreatedAt => "articles.created_at",
            SortKey::ArticleImgUrl => "articles.article_img_url",
            SortKey::Votes => "articles.votes",
            SortKey::CommentCount => "COUNT(comments.comment_id)",
        }
    }
}

impl Default for SortKey {
    fn default() -> Self {
        SortKey::CreatedAt
    }
}

impl FromStr for SortKey {
    type Err = UnknownSortKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortKey::ALL
            .iter()
            .find(|key| key.as_str() == s)
            .cloned()
            .ok_or_else(|| UnknownSortKey(s.to_owned()))
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownSortKey(pub String);

impl fmt::Display for UnknownSortKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "unknown sort column: {}", self.0)
    }
}

/// Sort direction, parsed case-insensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Asc,
    Desc,
}

impl Order {
    pub fn as_sql(&self) -> &'static str {
        match *self {
            Order::Asc => "ASC",
            Order::Desc => "DESC",
        }
    }
}

impl Default for Order {
    fn default() -> Self {
        Order::Desc
    }
}

impl FromStr for Order {
    type Err = UnknownOrder;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("asc") {
            Ok(Order::Asc)
        } else if s.eq_ignore_ascii_case("desc") {
            Ok(Order::Desc)
        } else {
            Err(UnknownOrder(s.to_owned()))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownOrder(pub String);

impl fmt::Display for UnknownOrder {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "order must be ASC or DESC, got '{}'", self.0)
    }
}

/// ORDER BY body for an article listing. Ties fall back to ascending
/// `article_id` so equal keys come back in a stable order.
pub fn order_clause(key: SortKey, order: Order) -> String {
    match key {
        SortKey::ArticleId => format!("{} {}", key.expression(), order.as_sql()),
        _ => format!(
            "{} {}, articles.article_id ASC",
            key.expression(),
            order.as_sql()
        ),
    }
}
