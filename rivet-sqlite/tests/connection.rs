#[cfg(test)]
mod tests {
    use rivet::{Connection, Value};
    use rivet_sqlite::SqliteConnection;
    use rivet_tests::{init_logs, silent_logs};
    use std::{fs, path::Path, sync::Mutex};

    static MUTEX: Mutex<()> = Mutex::new(());

    #[test]
    fn create_database() {
        init_logs();
        const DB_PATH: &'static str = "../target/debug/creation.sqlite";
        let _guard = MUTEX.lock().unwrap();
        if Path::new(DB_PATH).exists() {
            fs::remove_file(DB_PATH)
                .expect(format!("Failed to remove test database file {}", DB_PATH).as_str());
        }
        assert!(
            !Path::new(DB_PATH).exists(),
            "Database file should not exist before test"
        );
        SqliteConnection::connect(&format!("sqlite://{}?mode=rwc", DB_PATH))
            .expect("Could not open the database");
        assert!(
            Path::new(DB_PATH).exists(),
            "Database file should be created after connection"
        );
        SqliteConnection::connect(&format!("sqlite://{}?mode=ro", DB_PATH))
            .expect("Could not open the database");
        fs::remove_file(DB_PATH)
            .expect(format!("Failed to remove existing test database file {}", DB_PATH).as_str());
        silent_logs! {
            assert!(
                SqliteConnection::connect(&format!("sqlite://{}?mode=ro", DB_PATH)).is_err(),
                "Should not be able to open in read only unexisting database"
            );
        }
    }

    #[test]
    fn wrong_url() {
        silent_logs! {
            assert!(SqliteConnection::connect("duckdb://some_value").is_err());
        };
    }

    #[test]
    fn execute_and_bind() {
        init_logs();
        let mut connection =
            SqliteConnection::connect("sqlite://:memory:").expect("Could not open the database");
        connection
            .execute(
                "CREATE TABLE sample (id INTEGER PRIMARY KEY, label TEXT, ratio REAL, data BLOB, flag BOOLEAN);",
                &[],
            )
            .expect("Failed to create the table");
        connection
            .execute(
                "INSERT INTO sample (label, ratio, data, flag) VALUES (?, ?, ?, ?);",
                &[
                    "it's".into(),
                    0.25.into(),
                    vec![1u8, 2, 3].into(),
                    true.into(),
                ],
            )
            .expect("Failed to insert");
        connection
            .execute(
                "INSERT INTO sample (label, ratio, data, flag) VALUES (?, ?, ?, ?);",
                &[Value::Varchar(None), Value::Null, Value::Blob(None), false.into()],
            )
            .expect("Failed to insert nulls");
        let rows = connection
            .execute("SELECT id, label, ratio, data, flag FROM sample ORDER BY id;", &[])
            .expect("Failed to select");
        assert_eq!(rows.len(), 2);
        assert_eq!(
            *rows[0],
            [
                Value::Int64(Some(1)),
                Value::Varchar(Some("it's".into())),
                Value::Float64(Some(0.25)),
                Value::Blob(Some([1u8, 2, 3].into())),
                Value::Int64(Some(1)),
            ]
        );
        assert!(rows[1][1..4].iter().all(Value::is_null));
        let first = connection
            .get_first_row("SELECT label FROM sample WHERE id = ?;", &[2.into()])
            .expect("Failed to get the first row")
            .expect("The row should exist");
        assert!(first[0].is_null());
        assert!(
            connection
                .get_first_row("SELECT label FROM sample WHERE id = ?;", &[99.into()])
                .expect("Failed to get the first row")
                .is_none()
        );
        let columns = connection
            .table_info("sample")
            .expect("Failed to introspect the table");
        let columns: Vec<_> = columns
            .iter()
            .map(|c| (c.name(), c.column_type.as_str()))
            .collect();
        assert_eq!(
            columns,
            [
                ("id", "INTEGER"),
                ("label", "TEXT"),
                ("ratio", "REAL"),
                ("data", "BLOB"),
                ("flag", "BOOLEAN"),
            ]
        );
        assert!(
            connection
                .table_info("missing")
                .expect("Introspecting a missing table must succeed")
                .is_empty()
        );
    }

    #[test]
    fn statement_errors() {
        init_logs();
        let mut connection =
            SqliteConnection::connect("sqlite://:memory:").expect("Could not open the database");
        silent_logs! {
            assert!(connection.execute("SELECT 1; SELECT 2;", &[]).is_err());
            assert!(connection.execute("SELECT ?;", &[]).is_err());
            assert!(connection.execute("SELEC 1;", &[]).is_err());
        }
        let rows = connection
            .execute("SELECT 1;  ", &[])
            .expect("Trailing whitespace is not a second statement");
        assert_eq!(*rows[0], [Value::Int64(Some(1))]);
    }
}
