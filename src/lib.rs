extern crate dotenv;

#[macro_use]
extern crate error_chain;

#[macro_use]
extern crate diesel;
extern crate r2d2;
extern crate r2d2_diesel;

extern crate chrono;
#[macro_use]
extern crate lazy_static;
extern crate regex;
extern crate serde;
#[macro_use]
extern crate serde_derive;
#[macro_use]
extern crate serde_json;

#[macro_use]
extern crate tracing;
extern crate tracing_subscriber;

pub mod article;
pub mod comment;
pub mod config;
pub mod db;
pub mod filter;
pub mod listing;
pub mod logging;
pub mod pagination;
pub mod params;
pub mod sort;
pub mod topic;
pub mod types;
pub mod users;
mod utils;

pub use article::{article_exists, create_article, delete_article, get_article, list_articles,
                  update_article_votes};
pub use comment::{comment_exists, create_comment, delete_comment, list_comments,
                  update_comment_votes};
pub use config::Config;
pub use db::{init_pool, DbConnection, Pool};
pub use pagination::{Page, Paginated};
pub use params::{ArticleQuery, CommentQuery};
pub use topic::{create_topic, list_topics, topic_exists};
pub use types::{ApiError, ApiResult, NotFound, ValidationError};
pub use users::{get_user, list_users, user_exists};
