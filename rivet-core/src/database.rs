use crate::{
    Connection, Error, Fragment, Model, ModelError, Result, Row, Schema, SqlWriter, TypeValidator,
    Validator,
};
use std::{any::TypeId, collections::HashMap, sync::Arc};

/// Registry every operation goes through: owns the connection, the schema cache and the
/// validator used by the persistence flow.
///
/// Operations borrow it mutably, share it between threads behind a `Mutex`.
pub struct Database<C: Connection> {
    connection: C,
    /// Keyed by record type, each type checks the columns against its own fields.
    schemas: HashMap<TypeId, Arc<Schema>>,
    validator: Box<dyn Validator + Send + Sync>,
}

impl<C: Connection> Database<C> {
    pub fn new(connection: C) -> Self {
        Self {
            connection,
            schemas: HashMap::new(),
            validator: Box::new(TypeValidator::new()),
        }
    }

    pub fn connect(url: &str) -> Result<Self> {
        Ok(Self::new(C::connect(url)?))
    }

    pub fn with_validator(mut self, validator: impl Validator + Send + Sync + 'static) -> Self {
        self.validator = Box::new(validator);
        self
    }

    pub fn connection(&mut self) -> &mut C {
        &mut self.connection
    }

    pub fn into_connection(self) -> C {
        self.connection
    }

    pub fn sql_writer(&self) -> C::SqlWriter {
        self.connection.sql_writer()
    }

    pub fn validator(&self) -> &dyn Validator {
        self.validator.as_ref()
    }

    /// Schema of the table bound to `M`, introspected on first use and cached afterwards.
    pub fn schema<M: Model>(&mut self) -> Result<Arc<Schema>> {
        let table = M::table_name();
        if let Some(schema) = self.schemas.get(&TypeId::of::<M>()) {
            return Ok(schema.clone());
        }
        let columns = self
            .connection
            .table_info(table)
            .map_err(|e| self.query_error(&Fragment::new(format!("table_info({})", table)), e))?;
        let schema = Arc::new(Schema::resolve::<M>(columns)?);
        log::debug!(
            "Resolved the schema of `{}` with columns {:?}",
            table,
            schema.columns()
        );
        self.schemas.insert(TypeId::of::<M>(), schema.clone());
        Ok(schema)
    }

    /// Drop the cached schema of `M`, it will be introspected again on next use.
    pub fn forget_schema<M: Model>(&mut self) {
        self.schemas.remove(&TypeId::of::<M>());
    }

    fn query_error(&self, fragment: &Fragment, error: Error) -> Error {
        let error = Error::new(ModelError::QueryExecution {
            query: fragment.printable(&self.connection.sql_writer()),
            message: format!("{:#}", error),
        });
        log::error!("{:#}", error);
        error
    }

    fn log_query(&self, fragment: &Fragment) {
        if log::log_enabled!(log::Level::Debug) {
            log::debug!("{}", fragment.printable(&self.connection.sql_writer()));
        }
    }

    pub fn fetch(&mut self, fragment: &Fragment) -> Result<Vec<Row>> {
        self.log_query(fragment);
        self.connection
            .execute(&fragment.sql, &fragment.params)
            .map_err(|e| self.query_error(fragment, e))
    }

    pub fn fetch_one(&mut self, fragment: &Fragment) -> Result<Option<Row>> {
        self.log_query(fragment);
        self.connection
            .get_first_row(&fragment.sql, &fragment.params)
            .map_err(|e| self.query_error(fragment, e))
    }

    /// Run a statement whose rows, if any, are not needed.
    pub fn execute(&mut self, fragment: &Fragment) -> Result<()> {
        self.fetch(fragment).map(|_| ())
    }

    /// Identifier assigned by the last insert on this connection.
    pub fn last_insert_id(&mut self) -> Result<i64> {
        let mut sql = String::new();
        self.sql_writer().write_last_insert_id(&mut sql);
        let fragment = Fragment::new(sql);
        let row = self.fetch_one(&fragment)?;
        row.and_then(|row| row.first().and_then(|v| v.as_i64()))
            .ok_or_else(|| {
                let error = Error::msg("The backend did not return the last inserted identifier");
                log::error!("{}", error);
                error
            })
    }
}
