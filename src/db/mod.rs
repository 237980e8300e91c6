use diesel::pg::PgConnection;
use r2d2;
use r2d2_diesel::ConnectionManager;
use std::env;
use std::ops::Deref;

use config::Config;
use types::{ApiError, ApiResult};

pub mod schema;

// An alias to the type for a pool of Diesel Postgres connections.
pub type Pool = r2d2::Pool<ConnectionManager<PgConnection>>;

/// A connection checked out of the pool for the duration of one operation.
/// Dropping it hands the connection back, whichever way the operation exits.
pub struct DbConnection(pub r2d2::PooledConnection<ConnectionManager<PgConnection>>);

error_chain! {
    errors {
        MissingDatabaseUrl {
            description("DATABASE_URL not set")
            display("DATABASE_URL not set")
        }
        InvalidPoolSize(value: String) {
            description("invalid pool size")
            display("invalid DB_POOL_SIZE: '{}'", value)
        }
    }

    foreign_links {
        Var(env::VarError);
        R2D2(r2d2::Error);
    }
}

impl DbConnection {
    /// Checks a connection out of `pool`. Pool exhaustion surfaces as an
    /// unclassified failure rather than any of the request-level errors.
    pub fn acquire(pool: &Pool) -> ApiResult<DbConnection> {
        match pool.get() {
            Ok(conn) => Ok(DbConnection(conn)),
            Err(e) => {
                warn!(error = %e, "could not check out a database connection");
                Err(ApiError::Pool(e))
            }
        }
    }
}

// For the convenience of using an &DbConnection as an &PgConnection.
impl Deref for DbConnection {
    type Target = PgConnection;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

pub fn init_pool(config: &Config) -> Result<Pool> {
    let manager = ConnectionManager::<PgConnection>::new(config.database_url.clone());
    let pool = Pool::builder().max_size(config.pool_size).build(manager)?;
    info!(
        environment = %config.environment,
        pool_size = config.pool_size,
        "database pool ready"
    );
    Ok(pool)
}

/// Existence check against a table's key, used to tell an absent resource
/// apart from one that simply has nothing to list.
pub trait KeyExists {
    type Key: ?Sized;

    fn exists(key: &Self::Key, connection: &PgConnection) -> ApiResult<bool>;
}

/// A pool whose every checkout fails quickly.
#[cfg(test)]
pub fn unreachable_pool() -> Pool {
    use std::time::Duration;

    let manager = ConnectionManager::<PgConnection>::new("postgres://nobody@127.0.0.1:1/nothing");
    Pool::builder()
        .max_size(1)
        .min_idle(Some(0))
        .connection_timeout(Duration::from_millis(50))
        .build_unchecked(manager)
}
