use crate::{CBox, error_message, extract::extract_value};
use libsqlite3_sys::*;
use rivet_core::{Error, Result, Row, Value, truncate_long};
use std::{
    ffi::{CStr, c_char, c_int, c_void},
    ptr,
};

/// One compiled statement.
pub(crate) struct SqlitePrepared {
    pub(crate) statement: CBox<*mut sqlite3_stmt>,
}

impl SqlitePrepared {
    pub(crate) fn prepare(connection: *mut sqlite3, sql: &str) -> Result<Self> {
        let mut statement = CBox::new(ptr::null_mut(), |p| unsafe {
            sqlite3_finalize(p);
        });
        let mut tail: *const c_char = ptr::null();
        let rc = unsafe {
            sqlite3_prepare_v2(
                connection,
                sql.as_ptr() as *const c_char,
                sql.len() as c_int,
                &mut *statement,
                &mut tail,
            )
        };
        if rc != SQLITE_OK {
            return Err(Error::msg(error_message(connection))
                .context(format!("While preparing the query:\n{}", truncate_long!(sql))));
        }
        if !tail.is_null() {
            let consumed = tail as usize - sql.as_ptr() as usize;
            if !sql[consumed.min(sql.len())..].trim().is_empty() {
                return Err(Error::msg("Cannot prepare more than one statement at a time")
                    .context(format!("While preparing the query:\n{}", truncate_long!(sql))));
            }
        }
        if statement.is_null() {
            return Err(Error::msg(format!(
                "The query does not contain any statement: `{}`",
                truncate_long!(sql)
            )));
        }
        Ok(Self { statement })
    }

    /// Bind the values to the placeholders, in order starting from the first one.
    pub(crate) fn bind_all(&mut self, params: &[Value]) -> Result<()> {
        let expected = unsafe { sqlite3_bind_parameter_count(*self.statement) } as usize;
        if expected != params.len() {
            return Err(Error::msg(format!(
                "The query expects {} parameters but {} were provided",
                expected,
                params.len()
            )));
        }
        for (i, value) in params.iter().enumerate() {
            self.bind_index(value, (i + 1) as c_int)?;
        }
        Ok(())
    }

    fn bind_index(&mut self, value: &Value, index: c_int) -> Result<()> {
        let statement = *self.statement;
        unsafe {
            let rc = match value {
                Value::Null
                | Value::Boolean(None)
                | Value::Int64(None)
                | Value::Float64(None)
                | Value::Varchar(None)
                | Value::Blob(None) => sqlite3_bind_null(statement, index),
                Value::Boolean(Some(v)) => sqlite3_bind_int(statement, index, *v as c_int),
                Value::Int64(Some(v)) => sqlite3_bind_int64(statement, index, *v),
                Value::Float64(Some(v)) => sqlite3_bind_double(statement, index, *v),
                Value::Varchar(Some(v)) => sqlite3_bind_text(
                    statement,
                    index,
                    v.as_ptr() as *const c_char,
                    v.len() as c_int,
                    SQLITE_TRANSIENT(),
                ),
                Value::Blob(Some(v)) => sqlite3_bind_blob(
                    statement,
                    index,
                    v.as_ptr() as *const c_void,
                    v.len() as c_int,
                    SQLITE_TRANSIENT(),
                ),
            };
            if rc != SQLITE_OK {
                let query = sqlite3_sql(statement);
                return Err(Error::msg(error_message(sqlite3_db_handle(statement))).context(
                    format!(
                        "Cannot bind parameter {} to query:\n{}",
                        index,
                        truncate_long!(CStr::from_ptr(query).to_string_lossy())
                    ),
                ));
            }
        }
        Ok(())
    }

    /// Step until done collecting every row.
    pub(crate) fn run(&mut self) -> Result<Vec<Row>> {
        let statement = *self.statement;
        let mut rows = Vec::new();
        unsafe {
            let count = sqlite3_column_count(statement);
            loop {
                match sqlite3_step(statement) {
                    SQLITE_BUSY => {
                        continue;
                    }
                    SQLITE_DONE => {
                        break;
                    }
                    SQLITE_ROW => {
                        rows.push(
                            (0..count)
                                .map(|i| extract_value(statement, i))
                                .collect::<Result<Row>>()?,
                        );
                    }
                    _ => {
                        return Err(Error::msg(error_message(sqlite3_db_handle(statement))));
                    }
                }
            }
        }
        Ok(rows)
    }
}
