use gradebook_core::db::migrations::{latest_version, REQUIRED_TABLES};
use gradebook_core::db::{open_db, open_db_in_memory, DbError};
use gradebook_core::Store;
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "students");
    assert_table_exists(&conn, "subjects");
    assert_table_exists(&conn, "scores");
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("gradebook.db");

    let conn_first = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_first), latest_version());
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    assert_table_exists(&conn_second, "scores");
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn current_version_without_record_tables_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("stamped.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    assert!(matches!(err, DbError::MissingTable("students")));
    assert_eq!(err.to_string(), "gradebook table `students` is missing");
}

#[test]
fn every_required_table_exists_after_migrating() {
    let conn = open_db_in_memory().unwrap();
    for table in REQUIRED_TABLES {
        assert_table_exists(&conn, table);
    }
}

#[test]
fn foreign_keys_are_enforced_without_cascade() {
    let conn = open_db_in_memory().unwrap();
    conn.execute_batch(
        "INSERT INTO students (msv, ten, ngay_sinh) VALUES ('SV01', 'An', '2003-09-01');
         INSERT INTO subjects (ma_mon, ten_mon, so_tin_chi) VALUES ('MH01', 'Toan', 3);
         INSERT INTO scores (msv, ma_mon, diem) VALUES ('SV01', 'MH01', 7.5);",
    )
    .unwrap();

    let orphan = conn.execute(
        "INSERT INTO scores (msv, ma_mon, diem) VALUES ('SV99', 'MH01', 5.0);",
        [],
    );
    assert!(orphan.is_err());

    let parent_delete = conn.execute("DELETE FROM students WHERE msv = 'SV01';", []);
    assert!(parent_delete.is_err());

    let remaining: i64 = conn
        .query_row("SELECT COUNT(*) FROM scores;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(remaining, 1);
}

#[test]
fn file_store_keeps_records_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("gradebook.db");

    let store = Store::open(&path).unwrap();
    store
        .write(|tx| {
            tx.execute(
                "INSERT INTO subjects (ma_mon, ten_mon, so_tin_chi) VALUES ('MH01', 'Toan', 3);",
                [],
            )
            .map_err(DbError::from)
        })
        .unwrap();
    drop(store);

    let conn = open_db(&path).unwrap();
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM subjects;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
