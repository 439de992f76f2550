use crate::{
    ColumnDef, Connection, Database, Error, ID_COLUMN, Model, ModelError, Result, SqlWriter, Value,
};
use std::sync::Arc;

/// Columns of a table with their declared types, in discovery order.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    table: String,
    columns: Vec<ColumnDef>,
}

impl Schema {
    /// Validates the introspected columns against the fields declared by `M`.
    ///
    /// Every column must map to a field and the table must have the identifier column.
    pub fn resolve<M: Model>(columns: Vec<ColumnDef>) -> Result<Self> {
        let table = M::table_name();
        let error = |reason: String| {
            let error = Error::new(ModelError::SchemaResolution {
                table: table.to_string(),
                reason,
            });
            log::error!("{:#}", error);
            error
        };
        if columns.is_empty() {
            return Err(error(format!(
                "the backend reported no columns, check that `{}` maps to an existing table",
                M::type_name()
            )));
        }
        if !columns.iter().any(|c| c.name == ID_COLUMN) {
            return Err(error(format!("missing the `{}` column", ID_COLUMN)));
        }
        let unmapped: Vec<&str> = columns
            .iter()
            .map(ColumnDef::name)
            .filter(|c| !M::fields().contains(c))
            .collect();
        if !unmapped.is_empty() {
            return Err(error(format!(
                "columns {:?} have no field in `{}`",
                unmapped,
                M::type_name()
            )));
        }
        Ok(Self {
            table: table.to_string(),
            columns,
        })
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn column_defs(&self) -> &[ColumnDef] {
        &self.columns
    }

    pub fn columns(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.to_string()).collect()
    }

    /// Writable columns: every column except the identifier.
    pub fn attributes(&self) -> Vec<String> {
        self.columns
            .iter()
            .filter(|c| c.name != ID_COLUMN)
            .map(|c| c.name.to_string())
            .collect()
    }

    pub fn column_type(&self, column: &str) -> Option<&str> {
        self.columns
            .iter()
            .find(|c| c.name == column)
            .map(|c| c.column_type.as_str())
    }
}

/// Table metadata, available on every [`Model`].
pub trait ModelSchema: Model {
    fn table() -> &'static str {
        Self::table_name()
    }

    fn schema<C: Connection>(db: &mut Database<C>) -> Result<Arc<Schema>> {
        db.schema::<Self>()
    }

    fn columns<C: Connection>(db: &mut Database<C>) -> Result<Vec<String>> {
        Ok(db.schema::<Self>()?.columns())
    }

    fn attributes<C: Connection>(db: &mut Database<C>) -> Result<Vec<String>> {
        Ok(db.schema::<Self>()?.attributes())
    }

    /// Number of rows in the table, always asked to the backend.
    fn count<C: Connection>(db: &mut Database<C>) -> Result<u64> {
        let mut sql = String::with_capacity(48);
        db.sql_writer().write_count(&mut sql, Self::table_name());
        let row = db.fetch_one(&sql.into())?;
        let count = row
            .and_then(|row| row.first().and_then(Value::as_i64))
            .unwrap_or_default();
        Ok(u64::try_from(count).unwrap_or_default())
    }
}

impl<M: Model> ModelSchema for M {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Attributes, AsValue};

    #[derive(Default)]
    struct BookAuthor {
        id: Option<i64>,
        name: String,
    }

    impl Model for BookAuthor {
        fn type_name() -> &'static str {
            "BookAuthor"
        }
        fn table_name() -> &'static str {
            "book_author"
        }
        fn fields() -> &'static [&'static str] {
            &["id", "name"]
        }
        fn id(&self) -> Option<i64> {
            self.id
        }
        fn set_id(&mut self, id: Option<i64>) {
            self.id = id;
        }
        fn to_attributes(&self) -> Attributes {
            Attributes::from([
                ("id".to_string(), self.id.as_value()),
                ("name".to_string(), self.name.clone().as_value()),
            ])
        }
        fn from_attributes(mut attributes: Attributes) -> Result<Self> {
            Ok(Self {
                id: AsValue::try_from_value(attributes.remove("id").unwrap_or_default())?,
                name: match attributes.remove("name") {
                    Some(v) => AsValue::try_from_value(v)?,
                    None => Default::default(),
                },
            })
        }
    }

    fn downcast(error: Error) -> ModelError {
        error.downcast::<ModelError>().expect("Expected a ModelError")
    }

    #[test]
    fn resolve() {
        let schema = Schema::resolve::<BookAuthor>(vec![
            ColumnDef::new("id", "INTEGER"),
            ColumnDef::new("name", "TEXT"),
        ])
        .unwrap();
        assert_eq!(schema.table(), "book_author");
        assert_eq!(schema.columns(), vec!["id", "name"]);
        assert_eq!(schema.attributes(), vec!["name"]);
        assert_eq!(schema.column_type("name"), Some("TEXT"));
        assert_eq!(schema.column_type("missing"), None);
    }

    #[test]
    fn resolve_failures() {
        assert!(matches!(
            downcast(Schema::resolve::<BookAuthor>(vec![]).unwrap_err()),
            ModelError::SchemaResolution { .. }
        ));
        assert!(matches!(
            downcast(Schema::resolve::<BookAuthor>(vec![ColumnDef::new("name", "TEXT")]).unwrap_err()),
            ModelError::SchemaResolution { .. }
        ));
        let error = downcast(
            Schema::resolve::<BookAuthor>(vec![
                ColumnDef::new("id", "INTEGER"),
                ColumnDef::new("name", "TEXT"),
                ColumnDef::new("rating", "INTEGER"),
            ])
            .unwrap_err(),
        );
        assert!(error.to_string().contains("rating"));
    }
}
