use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind, Error as DieselError};
use r2d2;
use serde_json::Value;
use std::collections::HashMap;
use std::error::Error as StdError;
use std::fmt;

/// Turns raw, untrusted input into its checked form. Implementations never
/// touch the store.
pub trait Validate
where
    Self: Sized,
{
    type Output;
    fn validate(self) -> Result<Self::Output, ValidationError>;
}

/// The resource a `NotFound` refers to. Callers differentiate "resource
/// absent" from "filter target absent" from "page past the end".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotFound {
    Article,
    Comment,
    Topic,
    User,
    ArticlePage,
    CommentPage,
}

impl NotFound {
    pub fn message(&self) -> &'static str {
        match *self {
            NotFound::Article => "article not found",
            NotFound::Comment => "comment not found",
            NotFound::Topic => "topic not found",
            NotFound::User => "user not found",
            NotFound::ArticlePage => "no more articles to be displayed",
            NotFound::CommentPage => "no more comments to display",
        }
    }
}

#[derive(Debug)]
pub enum ApiError {
    Validation(ValidationError),
    NotFound(NotFound),
    /// `message` is user-visible; `detail` is the store's text, for logs only.
    UniqueViolation {
        message: &'static str,
        detail: String,
    },
    ReferentialIntegrity(String),
    Diesel(DieselError),
    Pool(r2d2::Error),
}

impl From<DieselError> for ApiError {
    fn from(err: DieselError) -> ApiError {
        match err {
            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                ApiError::UniqueViolation {
                    message: "resource already exists",
                    detail: info.message().to_owned(),
                }
            }
            DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, info) => {
                ApiError::ReferentialIntegrity(info.message().to_owned())
            }
            other => ApiError::Diesel(other),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> ApiError {
        ApiError::Validation(err)
    }
}

impl From<r2d2::Error> for ApiError {
    fn from(err: r2d2::Error) -> ApiError {
        ApiError::Pool(err)
    }
}

impl From<NotFound> for ApiError {
    fn from(target: NotFound) -> ApiError {
        ApiError::NotFound(target)
    }
}

impl ApiError {
    /// Status code the boundary layer should answer with.
    pub fn status(&self) -> u16 {
        match *self {
            ApiError::Validation(_) | ApiError::ReferentialIntegrity(_) => 400,
            ApiError::NotFound(_) => 404,
            ApiError::UniqueViolation { .. } => 409,
            ApiError::Diesel(_) | ApiError::Pool(_) => 500,
        }
    }

    /// The user-visible message. Store internals never leak through here.
    pub fn message(&self) -> &str {
        match *self {
            ApiError::Validation(_) | ApiError::ReferentialIntegrity(_) => "bad request",
            ApiError::NotFound(target) => target.message(),
            ApiError::UniqueViolation { message, .. } => message,
            ApiError::Diesel(_) | ApiError::Pool(_) => "internal server error",
        }
    }

    pub fn to_json(&self) -> Value {
        match *self {
            ApiError::Validation(ref errors) => json!({
                "message": self.message(),
                "errors": errors,
            }),
            _ => json!({ "message": self.message() }),
        }
    }

    pub fn is_internal(&self) -> bool {
        self.status() >= 500
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ApiError::ReferentialIntegrity(ref detail) => write!(f, "bad request: {}", detail),
            ApiError::UniqueViolation {
                message,
                ref detail,
            } => write!(f, "{}: {}", message, detail),
            ApiError::Diesel(ref err) => write!(f, "database error: {}", err),
            ApiError::Pool(ref err) => write!(f, "connection pool error: {}", err),
            _ => f.write_str(self.message()),
        }
    }
}

impl StdError for ApiError {
    fn source(&self) -> Option<&(StdError + 'static)> {
        match *self {
            ApiError::Diesel(ref err) => Some(err),
            ApiError::Pool(ref err) => Some(err),
            _ => None,
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Serialize, Default, PartialEq)]
pub struct ValidationError(HashMap<String, Vec<String>>);

impl ValidationError {
    pub fn add_error<K: Into<String>, V: Into<String>>(&mut self, key: K, val: V) {
        let entry = self.0.entry(key.into()).or_insert(Vec::default());
        entry.push(val.into());
    }

    pub fn from<K: Into<String>, V: Into<String>>(key: K, val: V) -> Self {
        let mut error = ValidationError::default();
        error.add_error(key, val);
        error
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn merge(&mut self, other: ValidationError) {
        for (key, errors) in other.0.into_iter() {
            let entry = self.0.entry(key).or_default();
            entry.extend(errors);
        }
    }

    pub fn empty(&self) -> bool {
        self.len() == 0
    }

    pub fn field(&self, key: &str) -> Option<&[String]> {
        self.0.get(key).map(|errors| errors.as_slice())
    }

    /// `Ok(value)` when nothing was recorded, otherwise the collected errors.
    pub fn or_ok<T>(self, value: T) -> Result<T, ValidationError> {
        if self.empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_render_as_bad_request() {
        let err = ApiError::from(ValidationError::from("sort_by", "unknown sort column: body"));
        assert_eq!(err.status(), 400);
        assert_eq!(
            err.to_json(),
            json!({
                "message": "bad request",
                "errors": { "sort_by": ["unknown sort column: body"] }
            })
        );
    }

    #[test]
    fn each_missing_resource_has_its_own_message() {
        let cases = [
            (NotFound::Article, "article not found"),
            (NotFound::Comment, "comment not found"),
            (NotFound::Topic, "topic not found"),
            (NotFound::User, "user not found"),
            (NotFound::ArticlePage, "no more articles to be displayed"),
            (NotFound::CommentPage, "no more comments to display"),
        ];
        for &(target, message) in cases.iter() {
            let err = ApiError::from(target);
            assert_eq!(err.status(), 404);
            assert_eq!(err.to_json(), json!({ "message": message }));
        }
    }

    #[test]
    fn referential_violations_fold_into_bad_request() {
        let err = ApiError::ReferentialIntegrity("violates foreign key constraint".into());
        assert_eq!(err.status(), 400);
        assert_eq!(err.message(), "bad request");
        assert!(err.to_string().contains("foreign key"));
    }

    #[test]
    fn unique_violations_are_conflicts() {
        let err = ApiError::UniqueViolation {
            message: "topic already exists",
            detail: "duplicate key".into(),
        };
        assert_eq!(err.status(), 409);
        assert_eq!(err.to_json(), json!({ "message": "topic already exists" }));
    }

    #[test]
    fn store_text_of_a_conflict_stays_out_of_the_message() {
        let raw = "duplicate key value violates unique constraint \"topics_pkey\"";
        let err = ApiError::from(DieselError::DatabaseError(
            DatabaseErrorKind::UniqueViolation,
            Box::new(raw.to_owned()),
        ));
        assert_eq!(err.status(), 409);
        assert_eq!(err.message(), "resource already exists");
        assert!(!err.to_json().to_string().contains("topics_pkey"));
        assert!(err.to_string().contains("topics_pkey"));
    }

    #[test]
    fn unclassified_store_errors_stay_internal() {
        let err = ApiError::from(DieselError::NotFound);
        assert!(err.is_internal());
        assert_eq!(err.to_json(), json!({ "message": "internal server error" }));
        assert!(err.source().is_some());
    }

    #[test]
    fn merge_keeps_every_message() {
        let mut errors = ValidationError::from("limit", "not a number");
        errors.merge(ValidationError::from("limit", "too small"));
        errors.merge(ValidationError::from("p", "not a number"));
        assert_eq!(errors.len(), 2);
        assert_eq!(errors.field("limit").map(|e| e.len()), Some(2));
        assert!(errors.or_ok(()).is_err());
    }
}
