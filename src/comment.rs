use chrono::NaiveDateTime;
use diesel::dsl::exists;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Integer};
use diesel::{delete as diesel_delete, insert_into, select, sql_query, update};

use article::{Article, VoteUpdate};
use db::schema::comments;
use db::{DbConnection, KeyExists, Pool};
use listing::{assemble, FilterTarget};
use pagination::{Paginated, Windowed};
use params::{parse_id, CommentListParams, CommentQuery};
use types::{ApiError, ApiResult, NotFound, Validate, ValidationError};
use utils::{is_blank, logged, serialize_date};

static SELECT_COMMENT_PAGE: &str = "SELECT comments.comment_id,
       comments.body,
       comments.article_id,
       comments.author,
       comments.votes,
       comments.created_at,
       COUNT(*) OVER () AS total_count
  FROM comments
 WHERE comments.article_id = $1
 ORDER BY comments.created_at DESC, comments.comment_id DESC
 LIMIT $2 OFFSET $3";

#[derive(Debug, PartialEq, Serialize, Queryable, QueryableByName)]
#[table_name = "comments"]
pub struct Comment {
    pub comment_id: i32,
    pub body: String,
    pub article_id: i32,
    pub author: String,
    pub votes: i32,
    #[serde(serialize_with = "serialize_date")]
    pub created_at: NaiveDateTime,
}

#[derive(Debug, QueryableByName)]
pub struct CommentRow {
    #[diesel(embed)]
    comment: Comment,
    #[sql_type = "BigInt"]
    total_count: i64,
}

impl Windowed for CommentRow {
    type Row = Comment;

    fn total_count(&self) -> i64 {
        self.total_count
    }

    fn into_row(self) -> Comment {
        self.comment
    }
}

impl KeyExists for Comment {
    type Key = i32;

    fn exists(id: &i32, connection: &PgConnection) -> ApiResult<bool> {
        let found = select(exists(comments::table.find(*id))).get_result::<bool>(connection)?;
        Ok(found)
    }
}

impl Comment {
    /// One page of an article's comments, newest first. An unknown article
    /// is reported as such rather than as an empty page.
    pub fn list_for_article(
        article_id: i32,
        params: &CommentListParams,
        connection: &PgConnection,
    ) -> ApiResult<Paginated<Comment>> {
        debug!(
            article_id,
            limit = params.page.limit,
            offset = params.page.offset(),
            "loading comment window"
        );
        let window = sql_query(SELECT_COMMENT_PAGE)
            .bind::<Integer, _>(article_id)
            .bind::<BigInt, _>(params.page.limit)
            .bind::<BigInt, _>(params.page.offset())
            .load::<CommentRow>(connection)?;
        let target = FilterTarget::checked(
            Article::exists(&article_id, connection)?,
            NotFound::Article,
        );
        assemble(window, target, &params.page, NotFound::CommentPage)
    }

    pub fn create(
        article_id: i32,
        new_comment: &NewComment,
        connection: &PgConnection,
    ) -> ApiResult<Comment> {
        let comment = insert_into(comments::table)
            .values((
                comments::article_id.eq(article_id),
                comments::author.eq(&new_comment.username),
                comments::body.eq(&new_comment.body),
            ))
            .get_result::<Comment>(connection)?;
        info!(comment_id = comment.comment_id, article_id, "comment created");
        Ok(comment)
    }

    pub fn add_votes(id: i32, delta: i32, connection: &PgConnection) -> ApiResult<Comment> {
        update(comments::table.find(id))
            .set(comments::votes.eq(comments::votes + delta))
            .get_result::<Comment>(connection)
            .optional()?
            .ok_or(ApiError::NotFound(NotFound::Comment))
    }

    pub fn delete(id: i32, connection: &PgConnection) -> ApiResult<()> {
        let removed = diesel_delete(comments::table.find(id)).execute(connection)?;
        if removed == 0 {
            return Err(NotFound::Comment.into());
        }
        info!(comment_id = id, "comment deleted");
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct NewComment {
    pub username: String,
    pub body: String,
}

impl Validate for NewComment {
    type Output = NewComment;

    fn validate(self) -> Result<NewComment, ValidationError> {
        let mut error = ValidationError::default();
        if is_blank(&self.username) {
            error.add_error("username", "empty username");
        }
        if is_blank(&self.body) {
            error.add_error("body", "empty body");
        }
        error.or_ok(self)
    }
}

pub fn list_comments(
    pool: &Pool,
    article_id: &str,
    query: CommentQuery,
) -> ApiResult<Paginated<Comment>> {
    let result = parse_id("article_id", article_id)
        .and_then(|id| Ok((id, query.validate()?)))
        .map_err(ApiError::from)
        .and_then(|(id, params)| {
            let connection = DbConnection::acquire(pool)?;
            Comment::list_for_article(id, &params, &connection)
        });
    logged("list_comments", result)
}

/// Posts a comment. An unknown article or author fails the foreign key and
/// is reported as a bad request.
pub fn create_comment(pool: &Pool, article_id: &str, new_comment: NewComment) -> ApiResult<Comment> {
    let result = parse_id("article_id", article_id)
        .and_then(|id| Ok((id, new_comment.validate()?)))
        .map_err(ApiError::from)
        .and_then(|(id, new_comment)| {
            let connection = DbConnection::acquire(pool)?;
            Comment::create(id, &new_comment, &connection)
        });
    logged("create_comment", result)
}

pub fn update_comment_votes(pool: &Pool, comment_id: &str, votes: VoteUpdate) -> ApiResult<Comment> {
    let result = parse_id("comment_id", comment_id)
        .and_then(|id| Ok((id, votes.validate()?)))
        .map_err(ApiError::from)
        .and_then(|(id, delta)| {
            let connection = DbConnection::acquire(pool)?;
            Comment::add_votes(id, delta, &connection)
        });
    logged("update_comment_votes", result)
}

pub fn delete_comment(pool: &Pool, comment_id: &str) -> ApiResult<()> {
    let result = parse_id("comment_id", comment_id)
        .map_err(ApiError::from)
        .and_then(|id| {
            let connection = DbConnection::acquire(pool)?;
            Comment::delete(id, &connection)
        });
    logged("delete_comment", result)
}

pub fn comment_exists(connection: &PgConnection, comment_id: i32) -> ApiResult<bool> {
    Comment::exists(&comment_id, connection)
}
