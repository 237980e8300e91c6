use diesel::dsl::exists;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::{insert_into, select};
use regex::Regex;

use db::schema::topics;
use db::{DbConnection, KeyExists, Pool};
use types::{ApiError, ApiResult, Validate, ValidationError};
use utils::{is_blank, logged};

lazy_static! {
    static ref SLUG_RE: Regex = Regex::new(r"\A[a-z0-9][a-z0-9_-]*\z").expect("slug pattern compiles");
}

#[derive(Debug, Clone, PartialEq, Queryable, Insertable, Serialize, Deserialize)]
#[table_name = "topics"]
pub struct Topic {
    pub slug: String,
    pub description: String,
}

impl KeyExists for Topic {
    type Key = str;

    fn exists(slug: &str, connection: &PgConnection) -> ApiResult<bool> {
        let found = select(exists(topics::table.filter(topics::slug.eq(slug))))
            .get_result::<bool>(connection)?;
        Ok(found)
    }
}

impl Topic {
    pub fn load_all(connection: &PgConnection) -> ApiResult<Vec<Topic>> {
        let topics = topics::table
            .order(topics::slug.asc())
            .load::<Topic>(connection)?;
        Ok(topics)
    }

    pub fn create(new_topic: &Topic, connection: &PgConnection) -> ApiResult<Topic> {
        let topic = insert_into(topics::table)
            .values(new_topic)
            .get_result::<Topic>(connection)
            .map_err(|e| match ApiError::from(e) {
                ApiError::UniqueViolation { detail, .. } => ApiError::UniqueViolation {
                    message: "topic already exists",
                    detail,
                },
                other => other,
            })?;
        info!(slug = %topic.slug, "topic created");
        Ok(topic)
    }
}

/// Request body for a new topic.
pub type NewTopic = Topic;

impl Validate for Topic {
    type Output = Topic;

    fn validate(self) -> Result<Topic, ValidationError> {
        let mut error = ValidationError::default();
        if !SLUG_RE.is_match(&self.slug) {
            error.add_error("slug", format!("Invalid slug: {}", self.slug));
        }
        if is_blank(&self.description) {
            error.add_error("description", "empty description");
        }
        error.or_ok(self)
    }
}

pub fn list_topics(pool: &Pool) -> ApiResult<Vec<Topic>> {
    let result = DbConnection::acquire(pool).and_then(|connection| Topic::load_all(&connection));
    logged("list_topics", result)
}

pub fn create_topic(pool: &Pool, new_topic: NewTopic) -> ApiResult<Topic> {
    let result = new_topic.validate().map_err(ApiError::from).and_then(|new_topic| {
        let connection = DbConnection::acquire(pool)?;
        Topic::create(&new_topic, &connection)
    });
    logged("create_topic", result)
}

pub fn topic_exists(connection: &PgConnection, slug: &str) -> ApiResult<bool> {
    Topic::exists(slug, connection)
}
