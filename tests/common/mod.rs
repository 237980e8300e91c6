use diesel::connection::SimpleConnection;
use diesel::pg::PgConnection;
use diesel::Connection;
use std::env;

static SEED: &str = include_str!("../fixtures/seed.sql");

/// A seeded connection inside a transaction that is never committed.
///
/// Database tests are `#[ignore]`d; run them with
/// `TEST_DATABASE_URL=postgres://... cargo test -- --ignored`.
pub fn seeded_connection() -> PgConnection {
    let url = env::var("TEST_DATABASE_URL")
        .expect("TEST_DATABASE_URL must point at a scratch Postgres database");
    let connection = PgConnection::establish(&url).expect("test database reachable");
    connection
        .begin_test_transaction()
        .expect("test transaction started");
    connection.batch_execute(SEED).expect("seed data loaded");
    connection
}
