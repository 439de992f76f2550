use crate::{CBox, SqliteSqlWriter, error_message, prepared::SqlitePrepared};
use libsqlite3_sys::{
    SQLITE_OK, SQLITE_OPEN_CREATE, SQLITE_OPEN_READWRITE, SQLITE_OPEN_URI, sqlite3, sqlite3_close,
    sqlite3_open_v2,
};
use rivet_core::{ColumnDef, Connection, Context, Error, Result, Row, SqlWriter, Value};
use std::{ffi::CString, ptr};

pub const URL_PREFIX: &str = "sqlite://";

/// Connection to a sqlite database file or to an in memory database.
///
/// The URL has the form `sqlite://<path>[?mode=ro|rw|rwc|memory]`, `sqlite://:memory:`
/// opens a private in memory database.
pub struct SqliteConnection {
    pub(crate) connection: CBox<*mut sqlite3>,
}

impl SqliteConnection {
    pub(crate) fn prepare(&mut self, sql: &str) -> Result<SqlitePrepared> {
        SqlitePrepared::prepare(*self.connection, sql)
    }
}

impl Connection for SqliteConnection {
    type SqlWriter = SqliteSqlWriter;

    fn connect(url: &str) -> Result<SqliteConnection> {
        if !url.starts_with(URL_PREFIX) {
            let error = Error::msg(format!(
                "Expected sqlite connection url to start with `{}`",
                URL_PREFIX
            ));
            log::error!("{:#}", error);
            return Err(error);
        }
        let context = || format!("Error while decoding connection URL: `{}`", url);
        let path = CString::new(format!("file:{}", url.trim_start_matches(URL_PREFIX)))
            .with_context(context)?;
        let mut connection = CBox::new(ptr::null_mut(), |p| unsafe {
            sqlite3_close(p);
        });
        let rc = unsafe {
            sqlite3_open_v2(
                path.as_ptr(),
                &mut *connection,
                SQLITE_OPEN_URI | SQLITE_OPEN_READWRITE | SQLITE_OPEN_CREATE,
                ptr::null(),
            )
        };
        if rc != SQLITE_OK {
            let message = if connection.is_null() {
                "Out of memory while opening the database".to_string()
            } else {
                error_message(*connection)
            };
            let error = Error::msg(message).context(context());
            log::error!("{:#}", error);
            return Err(error);
        }
        log::debug!("Opened sqlite database `{}`", url);
        Ok(Self { connection })
    }

    fn sql_writer(&self) -> SqliteSqlWriter {
        SqliteSqlWriter::new()
    }

    fn execute(&mut self, sql: &str, params: &[Value]) -> Result<Vec<Row>> {
        let mut prepared = self.prepare(sql)?;
        prepared.bind_all(params)?;
        prepared.run()
    }

    fn table_info(&mut self, table: &str) -> Result<Vec<ColumnDef>> {
        let mut sql = String::with_capacity(32 + table.len());
        sql.push_str("PRAGMA table_info(");
        self.sql_writer().write_identifier_quoted(&mut sql, table);
        sql.push_str(");");
        self.execute(&sql, &[])?
            .into_iter()
            .map(|row| {
                let name = row
                    .get(1)
                    .and_then(Value::as_str)
                    .ok_or_else(|| Error::msg("table_info returned a column without a name"))?;
                let column_type = row.get(2).and_then(Value::as_str).unwrap_or_default();
                Ok(ColumnDef::new(name.to_string(), column_type))
            })
            .collect()
    }
}
