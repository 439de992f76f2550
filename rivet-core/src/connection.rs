use crate::{ColumnDef, Result, Row, SqlWriter, Value};

/// Blocking handle to a relational backend, implemented by each driver.
pub trait Connection {
    type SqlWriter: SqlWriter;

    /// Open a connection to the given URL
    fn connect(url: &str) -> Result<Self>
    where
        Self: Sized;

    fn sql_writer(&self) -> Self::SqlWriter;

    /// Run a single statement binding `params` to its `?` placeholders in order, return every row.
    ///
    /// Failures are returned without logging them, [`crate::Database`] logs them together with the query.
    fn execute(&mut self, sql: &str, params: &[Value]) -> Result<Vec<Row>>;

    fn get_first_row(&mut self, sql: &str, params: &[Value]) -> Result<Option<Row>> {
        Ok(self.execute(sql, params)?.into_iter().next())
    }

    /// Columns of the table in declaration order, empty when the table does not exist.
    fn table_info(&mut self, table: &str) -> Result<Vec<ColumnDef>>;
}
