use diesel::PgConnection;

use db::{DbConnection, KeyExists, Pool};
use types::ApiResult;
use utils::logged;

pub mod models;

pub use self::models::User;

pub fn list_users(pool: &Pool) -> ApiResult<Vec<User>> {
    let result = DbConnection::acquire(pool).and_then(|connection| User::load_all(&connection));
    logged("list_users", result)
}

pub fn get_user(pool: &Pool, username: &str) -> ApiResult<User> {
    let result = DbConnection::acquire(pool)
        .and_then(|connection| User::load_by_name(username.trim(), &connection));
    logged("get_user", result)
}

pub fn user_exists(connection: &PgConnection, username: &str) -> ApiResult<bool> {
    User::exists(username, connection)
}
