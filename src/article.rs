use chrono::NaiveDateTime;
use diesel::dsl::exists;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Integer, Nullable, Text, Timestamp};
use diesel::{delete, insert_into, select, sql_query, update};

use db::schema::{articles, comments};
use db::{DbConnection, KeyExists, Pool};
use listing::{assemble, FilterTarget};
use pagination::{Paginated, Windowed};
use params::{parse_id, ArticleListParams, ArticleQuery};
use sort::order_clause;
use topic::Topic;
use types::{ApiError, ApiResult, NotFound, Validate, ValidationError};
use utils::{is_blank, logged, serialize_date};

static SELECT_ARTICLE_SUMMARY: &str = "SELECT articles.author,
       articles.title,
       articles.article_id,
       articles.topic,
       articles.created_at,
       articles.article_img_url,
       articles.votes,
       COUNT(comments.comment_id) AS comment_count,
       COUNT(*) OVER () AS total_count
  FROM articles LEFT OUTER JOIN comments ON comments.article_id = articles.article_id";

static SELECT_ARTICLE_DETAIL: &str = "SELECT articles.author,
       articles.title,
       articles.article_id,
       articles.body,
       articles.topic,
       articles.created_at,
       articles.article_img_url,
       articles.votes,
       COUNT(comments.comment_id) AS comment_count
  FROM articles LEFT OUTER JOIN comments ON comments.article_id = articles.article_id
 WHERE articles.article_id = $1
 GROUP BY articles.article_id";

#[derive(Queryable, PartialEq, Debug)]
pub struct Article {
    pub article_id: i32,
    pub title: String,
    pub topic: String,
    pub author: String,
    pub body: String,
    pub created_at: NaiveDateTime,
    pub votes: i32,
    pub article_img_url: String,
}

/// A listing row: everything but the body, plus the comment count.
#[derive(Debug, PartialEq, QueryableByName, Serialize)]
pub struct ArticleSummary {
    #[sql_type = "Text"]
    pub author: String,
    #[sql_type = "Text"]
    pub title: String,
    #[sql_type = "Integer"]
    pub article_id: i32,
    #[sql_type = "Text"]
    pub topic: String,
    #[sql_type = "Timestamp"]
    #[serde(serialize_with = "serialize_date")]
    pub created_at: NaiveDateTime,
    #[sql_type = "Text"]
    pub article_img_url: String,
    #[sql_type = "Integer"]
    pub votes: i32,
    #[sql_type = "BigInt"]
    pub comment_count: i64,

    #[sql_type = "BigInt"]
    #[serde(skip_serializing)]
    total_count: i64,
}

impl Windowed for ArticleSummary {
    type Row = ArticleSummary;

    fn total_count(&self) -> i64 {
        self.total_count
    }

    fn into_row(self) -> ArticleSummary {
        self
    }
}

/// A single article as retrieved by id, body included.
#[derive(Debug, PartialEq, QueryableByName, Serialize)]
pub struct ArticleDetail {
    #[sql_type = "Text"]
    pub author: String,
    #[sql_type = "Text"]
    pub title: String,
    #[sql_type = "Integer"]
    pub article_id: i32,
    #[sql_type = "Text"]
    pub body: String,
    #[sql_type = "Text"]
    pub topic: String,
    #[sql_type = "Timestamp"]
    #[serde(serialize_with = "serialize_date")]
    pub created_at: NaiveDateTime,
    #[sql_type = "Text"]
    pub article_img_url: String,
    #[sql_type = "Integer"]
    pub votes: i32,
    #[sql_type = "BigInt"]
    pub comment_count: i64,
}

impl ArticleDetail {
    fn new(article: Article, comment_count: i64) -> Self {
        ArticleDetail {
            author: article.author,
            title: article.title,
            article_id: article.article_id,
            body: article.body,
            topic: article.topic,
            created_at: article.created_at,
            article_img_url: article.article_img_url,
            votes: article.votes,
            comment_count,
        }
    }

    pub fn load(id: i32, connection: &PgConnection) -> ApiResult<Option<ArticleDetail>> {
        let detail = sql_query(SELECT_ARTICLE_DETAIL)
            .bind::<Integer, _>(id)
            .get_result::<ArticleDetail>(connection)
            .optional()?;
        Ok(detail)
    }
}

fn page_sql(params: &ArticleListParams) -> String {
    format!(
        "{select}\n WHERE {predicate}\n GROUP BY articles.article_id\n ORDER BY {order}\n LIMIT $2 OFFSET $3",
        select = SELECT_ARTICLE_SUMMARY,
        predicate = params.filter.predicate(),
        order = order_clause(params.sort, params.order),
    )
}

impl ArticleSummary {
    /// Fetches one window of the filtered, sorted, aggregated listing. Each
    /// row carries the size of the whole filtered set.
    pub fn load_window(
        params: &ArticleListParams,
        connection: &PgConnection,
    ) -> ApiResult<Vec<ArticleSummary>> {
        debug!(
            topic = ?params.filter.topic(),
            sort_by = %params.sort,
            order = params.order.as_sql(),
            limit = params.page.limit,
            offset = params.page.offset(),
            "loading article window"
        );
        let window = sql_query(page_sql(params))
            .bind::<Nullable<Text>, _>(params.filter.bind_value())
            .bind::<BigInt, _>(params.page.limit)
            .bind::<BigInt, _>(params.page.offset())
            .load::<ArticleSummary>(connection)?;
        Ok(window)
    }

    /// The full listing: window, topic existence and overflow, combined.
    pub fn list(
        params: &ArticleListParams,
        connection: &PgConnection,
    ) -> ApiResult<Paginated<ArticleSummary>> {
        let window = ArticleSummary::load_window(params, connection)?;
        let target = match params.filter.topic() {
            Some(slug) => FilterTarget::checked(Topic::exists(slug, connection)?, NotFound::Topic),
            None => FilterTarget::Unnamed,
        };
        assemble(window, target, &params.page, NotFound::ArticlePage)
    }
}

impl KeyExists for Article {
    type Key = i32;

    fn exists(id: &i32, connection: &PgConnection) -> ApiResult<bool> {
        let found = select(exists(articles::table.find(*id))).get_result::<bool>(connection)?;
        Ok(found)
    }
}

impl Article {
    pub fn create(new_article: &NewArticle, connection: &PgConnection) -> ApiResult<ArticleDetail> {
        let article = insert_into(articles::table)
            .values(new_article)
            .get_result::<Article>(connection)?;
        info!(article_id = article.article_id, topic = %article.topic, "article created");
        Ok(ArticleDetail::new(article, 0))
    }

    /// Adds `delta` to the vote count in a single statement, so concurrent
    /// votes never overwrite each other.
    pub fn add_votes(id: i32, delta: i32, connection: &PgConnection) -> ApiResult<ArticleDetail> {
        let updated = update(articles::table.find(id))
            .set(articles::votes.eq(articles::votes + delta))
            .execute(connection)?;
        if updated == 0 {
            return Err(NotFound::Article.into());
        }
        ArticleDetail::load(id, connection)?.ok_or(ApiError::NotFound(NotFound::Article))
    }

    /// Removes the article's comments and then the article, all or nothing.
    pub fn delete(id: i32, connection: &PgConnection) -> ApiResult<()> {
        connection.transaction::<_, ApiError, _>(|| {
            let removed_comments =
                delete(comments::table.filter(comments::article_id.eq(id))).execute(connection)?;
            let removed = delete(articles::table.find(id)).execute(connection)?;
            if removed == 0 {
                return Err(NotFound::Article.into());
            }
            info!(article_id = id, removed_comments, "article deleted");
            Ok(())
        })
    }
}

#[derive(Debug, Deserialize, Insertable)]
#[table_name = "articles"]
pub struct NewArticle {
    pub author: String,
    pub title: String,
    pub body: String,
    pub topic: String,
    pub article_img_url: Option<String>,
}

impl Validate for NewArticle {
    type Output = NewArticle;

    fn validate(self) -> Result<NewArticle, ValidationError> {
        let mut error = ValidationError::default();
        if is_blank(&self.author) {
            error.add_error("author", "empty author");
        }
        if is_blank(&self.title) {
            error.add_error("title", "empty title");
        }
        if is_blank(&self.body) {
            error.add_error("body", "empty body");
        }
        if is_blank(&self.topic) {
            error.add_error("topic", "empty topic");
        }
        if self.article_img_url.as_ref().map_or(false, |url| is_blank(url)) {
            error.add_error("article_img_url", "empty image url");
        }
        error.or_ok(self)
    }
}

/// Body of a vote update: a signed delta applied to the current count.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct VoteUpdate {
    pub inc_votes: Option<i32>,
}

impl Validate for VoteUpdate {
    type Output = i32;

    fn validate(self) -> Result<i32, ValidationError> {
        self.inc_votes
            .ok_or_else(|| ValidationError::from("inc_votes", "missing vote delta"))
    }
}

pub fn list_articles(pool: &Pool, query: ArticleQuery) -> ApiResult<Paginated<ArticleSummary>> {
    let result = query.validate().map_err(ApiError::from).and_then(|params| {
        let connection = DbConnection::acquire(pool)?;
        ArticleSummary::list(&params, &connection)
    });
    logged("list_articles", result)
}

pub fn get_article(pool: &Pool, article_id: &str) -> ApiResult<ArticleDetail> {
    let result = parse_id("article_id", article_id)
        .map_err(ApiError::from)
        .and_then(|id| {
            let connection = DbConnection::acquire(pool)?;
            ArticleDetail::load(id, &connection)?.ok_or(ApiError::NotFound(NotFound::Article))
        });
    logged("get_article", result)
}

pub fn create_article(pool: &Pool, new_article: NewArticle) -> ApiResult<ArticleDetail> {
    let result = new_article.validate().map_err(ApiError::from).and_then(|new_article| {
        let connection = DbConnection::acquire(pool)?;
        Article::create(&new_article, &connection)
    });
    logged("create_article", result)
}

pub fn update_article_votes(
    pool: &Pool,
    article_id: &str,
    votes: VoteUpdate,
) -> ApiResult<ArticleDetail> {
    let result = parse_id("article_id", article_id)
        .and_then(|id| Ok((id, votes.validate()?)))
        .map_err(ApiError::from)
        .and_then(|(id, delta)| {
            let connection = DbConnection::acquire(pool)?;
            Article::add_votes(id, delta, &connection)
        });
    logged("update_article_votes", result)
}

pub fn delete_article(pool: &Pool, article_id: &str) -> ApiResult<()> {
    let result = parse_id("article_id", article_id)
        .map_err(ApiError::from)
        .and_then(|id| {
            let connection = DbConnection::acquire(pool)?;
            Article::delete(id, &connection)
        });
    logged("delete_article", result)
}

pub fn article_exists(connection: &PgConnection, article_id: i32) -> ApiResult<bool> {
    Article::exists(&article_id, connection)
}
