use rusqlite::Connection;

use crate::AccessContext;
use crate::db::{DEFAULT_BUSY_TIMEOUT, bootstrap};

pub const COMPANY_FIXTURE_SQL: &str = include_str!("../../tests/fixtures/company.sql");

/// In-memory database with the schema applied and no rows.
pub fn empty_db() -> Connection {
    let conn = Connection::open_in_memory().expect("open in-memory db");
    bootstrap(&conn, DEFAULT_BUSY_TIMEOUT).expect("bootstrap schema");
    conn
}

/// In-memory database loaded with the company fixture.
pub fn company_db() -> Connection {
    let conn = empty_db();
    conn.execute_batch(COMPANY_FIXTURE_SQL)
        .expect("load company fixture");
    conn
}

pub fn tester() -> AccessContext {
    AccessContext::authorized("tester")
}

pub fn works_on_hours(conn: &Connection, ssn: &str, pno: i64) -> Option<f64> {
    conn.query_row(
        "SELECT hours FROM works_on WHERE essn = ?1 AND pno = ?2",
        rusqlite::params![ssn, pno],
        |row| row.get(0),
    )
    .ok()
}

pub fn works_on_count(conn: &Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM works_on", [], |row| row.get(0))
        .expect("count works_on")
}
