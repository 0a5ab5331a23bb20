use contacts_core::db::migrations::{stored_schema_version, latest_version};
use contacts_core::db::open_db_in_memory;
use contacts_core::{
    ContactDraft, ContactRepository, ConnectionSettings, DbError, SqliteContactRepository,
    StoreError, DEFAULT_PORT,
};
use rusqlite::Connection;

#[test]
fn connect_does_not_create_schema() {
    let repo = SqliteContactRepository::connect(&ConnectionSettings::in_memory()).unwrap();
    assert!(!table_exists(repo.connection().unwrap(), "contacts"));

    let err = repo.list_contacts().unwrap_err();
    assert!(matches!(err, StoreError::Db(_)));
}

#[test]
fn ensure_schema_creates_table_indexes_and_trigger() {
    let mut repo = SqliteContactRepository::connect(&ConnectionSettings::in_memory()).unwrap();
    repo.ensure_schema().unwrap();

    let conn = repo.connection().unwrap();
    assert_eq!(stored_schema_version(conn).unwrap(), latest_version());
    assert!(table_exists(conn, "contacts"));
    assert!(object_exists(conn, "index", "idx_contacts_name"));
    assert!(object_exists(conn, "index", "idx_contacts_email"));
    assert!(object_exists(conn, "trigger", "trg_contacts_touch_updated_at"));

    let name_index_columns: Vec<String> = {
        let mut stmt = conn
            .prepare("SELECT name FROM pragma_index_info('idx_contacts_name') ORDER BY seqno;")
            .unwrap();
        let rows = stmt.query_map([], |row| row.get(0)).unwrap();
        rows.collect::<Result<_, _>>().unwrap()
    };
    assert_eq!(name_index_columns, vec!["last_name", "first_name"]);
}

#[test]
fn ensure_schema_is_idempotent() {
    let mut repo = SqliteContactRepository::connect(&ConnectionSettings::in_memory()).unwrap();
    repo.ensure_schema().unwrap();
    repo.insert_contact(&ContactDraft::new("Ada", "", "", ""))
        .unwrap();

    repo.ensure_schema().unwrap();
    repo.ensure_schema().unwrap();
    assert_eq!(repo.count_contacts().unwrap(), 1);
}

#[test]
fn file_store_persists_across_connections() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("book.db");
    let settings = ConnectionSettings::new(
        "localhost",
        "tester",
        "",
        path.to_str().unwrap(),
        DEFAULT_PORT,
    );

    let mut first = SqliteContactRepository::connect(&settings).unwrap();
    first.ensure_schema().unwrap();
    let id = first
        .insert_contact(&ContactDraft::new("Ada", "Lovelace", "ada@x.io", "+44 1"))
        .unwrap();
    first.close().unwrap();

    let mut second = SqliteContactRepository::connect(&settings).unwrap();
    second.ensure_schema().unwrap();
    let loaded = second.get_contact(id).unwrap().unwrap();
    assert_eq!(loaded.last_name, "Lovelace");
}

#[test]
fn bare_database_name_gets_sqlite_extension() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path().join("address_book");
    let settings = ConnectionSettings::new(
        "localhost",
        "tester",
        "",
        base.to_str().unwrap(),
        DEFAULT_PORT,
    );

    SqliteContactRepository::connect(&settings).unwrap();
    assert!(dir.path().join("address_book.sqlite3").exists());
}

#[test]
fn newer_schema_version_is_a_schema_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let settings =
        ConnectionSettings::new("localhost", "tester", "", path.to_str().unwrap(), DEFAULT_PORT);
    let mut repo = SqliteContactRepository::connect(&settings).unwrap();
    match repo.ensure_schema().unwrap_err() {
        StoreError::Schema(DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        }) => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn incomplete_settings_fail_with_connection_error() {
    for settings in [
        ConnectionSettings::new("", "tester", "", ":memory:", DEFAULT_PORT),
        ConnectionSettings::new("localhost", "", "", ":memory:", DEFAULT_PORT),
        ConnectionSettings::new("localhost", "tester", "", "", DEFAULT_PORT),
        ConnectionSettings::new("localhost", "tester", "", ":memory:", 0),
    ] {
        match SqliteContactRepository::connect(&settings) {
            Err(StoreError::Connection(message)) => {
                assert!(message.contains("database connection error"));
            }
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("settings {settings:?} should be rejected"),
        }
    }
}

#[test]
fn unopenable_path_fails_with_connection_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing-dir").join("book.db");
    let settings =
        ConnectionSettings::new("localhost", "tester", "", path.to_str().unwrap(), DEFAULT_PORT);

    assert!(matches!(
        SqliteContactRepository::connect(&settings),
        Err(StoreError::Connection(_))
    ));
}

#[test]
fn empty_password_is_accepted() {
    let settings = ConnectionSettings::new("localhost", "tester", "", ":memory:", DEFAULT_PORT);
    let repo = SqliteContactRepository::connect(&settings).unwrap();
    assert!(repo.test_connection());
}

#[test]
fn wrapping_an_open_connection_probes_it() {
    let conn = open_db_in_memory().unwrap();
    let mut repo = SqliteContactRepository::from_connection(conn).unwrap();
    repo.ensure_schema().unwrap();
    assert_eq!(repo.count_contacts().unwrap(), 0);
}

fn table_exists(conn: &Connection, table: &str) -> bool {
    object_exists(conn, "table", table)
}

fn object_exists(conn: &Connection, kind: &str, name: &str) -> bool {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = ?1 AND name = ?2
            );",
            [kind, name],
            |row| row.get(0),
        )
        .unwrap();
    exists == 1
}
