use diesel::dsl::exists;
use diesel::prelude::*;
use diesel::select;

use db::schema::users;
use db::KeyExists;
use types::{ApiError, ApiResult, NotFound};

#[derive(Debug, Clone, PartialEq, Queryable, Serialize)]
pub struct User {
    pub username: String,
    pub name: String,
    pub avatar_url: Option<String>,
}

impl User {
    pub fn load_all(connection: &PgConnection) -> ApiResult<Vec<User>> {
        let all = users::table
            .order(users::username.asc())
            .load::<User>(connection)?;
        Ok(all)
    }

    pub fn load_by_name(name: &str, connection: &PgConnection) -> ApiResult<User> {
        users::table
            .filter(users::username.eq(name))
            .get_result::<User>(connection)
            .optional()?
            .ok_or(ApiError::NotFound(NotFound::User))
    }
}

impl KeyExists for User {
    type Key = str;

    fn exists(name: &str, connection: &PgConnection) -> ApiResult<bool> {
        let found = select(exists(users::table.filter(users::username.eq(name))))
            .get_result::<bool>(connection)?;
        Ok(found)
    }
}
