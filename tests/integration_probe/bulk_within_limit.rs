//! Integration: bulk statements rendered from a discovered limit execute on a build with that limit.

use envcaps::{discover_parameter_limit, BulkReplace, SqliteDriver};
use rusqlite::{limits::Limit, params_from_iter, Connection};

#[test]
fn every_batch_executes_under_the_limit() {
    const VARIABLE_LIMIT: usize = 100;
    const ROWS: usize = 257;

    let driver = SqliteDriver::with_variable_limit(VARIABLE_LIMIT).expect("driver");
    let report = discover_parameter_limit(&driver, 1000).expect("probe");
    assert_eq!(report.limit.get(), VARIABLE_LIMIT);

    let conn = Connection::open_in_memory().expect("open");
    let _ = conn.set_limit(Limit::SQLITE_LIMIT_VARIABLE_NUMBER, VARIABLE_LIMIT as i32);
    conn.execute_batch("CREATE TABLE store (id INTEGER PRIMARY KEY, counter INTEGER, label TEXT)")
        .expect("create table");

    let bulk = BulkReplace::new("store", ["id", "counter", "label"]).expect("bulk");
    let statements = bulk.statements(ROWS, report.limit).expect("statements");
    assert_eq!(statements.len(), ROWS.div_ceil(VARIABLE_LIMIT / 3));

    for statement in &statements {
        assert!(statement.parameter_count(bulk.columns_per_row()) <= VARIABLE_LIMIT);
        let mut values: Vec<rusqlite::types::Value> = Vec::new();
        for row in statement.rows.clone() {
            values.push((row as i64).into());
            values.push((row as i64 * 2).into());
            values.push(format!("row-{row}").into());
        }
        conn.execute(&statement.sql, params_from_iter(values))
            .expect("execute batch");
    }

    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM store", [], |row| row.get(0))
        .expect("count");
    assert_eq!(count as usize, ROWS);
}
