use crate::{Attributes, ColumnDef, ID_COLUMN, Schema, Value};

/// Decides whether a set of attributes can be written to a table.
pub trait Validator {
    /// First column whose value does not satisfy its declared type, if any.
    fn check<'s>(&self, schema: &'s Schema, attributes: &Attributes) -> Option<&'s ColumnDef>;

    fn validate(&self, schema: &Schema, attributes: &Attributes) -> bool {
        self.check(schema, attributes).is_none()
    }
}

/// Checks each attribute against the affinity of its declared type.
///
/// - `INTEGER` columns take a positive integer.
/// - `TEXT` and `VARCHAR` columns take a string.
/// - Any other declared type accepts everything.
///
/// The identifier column is not checked, a missing attribute is checked as a null.
#[derive(Default, Debug, Clone, Copy)]
pub struct TypeValidator;

impl TypeValidator {
    pub const fn new() -> Self {
        Self {}
    }

    fn accepts(declared: &str, value: &Value) -> bool {
        if declared.contains("INTEGER") {
            matches!(value, Value::Int64(Some(v)) if *v > 0)
        } else if declared.contains("TEXT") || declared.contains("VARCHAR") {
            matches!(value, Value::Varchar(Some(..)))
        } else {
            true
        }
    }
}

impl Validator for TypeValidator {
    fn check<'s>(&self, schema: &'s Schema, attributes: &Attributes) -> Option<&'s ColumnDef> {
        let null = Value::Null;
        schema
            .column_defs()
            .iter()
            .filter(|c| c.name != ID_COLUMN)
            .find(|c| {
                let value = attributes.get(c.name()).unwrap_or(&null);
                !Self::accepts(&c.declared_type(), value)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Model, Result, attrs};

    struct Book;

    impl Model for Book {
        fn type_name() -> &'static str {
            "Book"
        }
        fn table_name() -> &'static str {
            "book"
        }
        fn fields() -> &'static [&'static str] {
            &["id", "title", "pages", "price", "cover"]
        }
        fn id(&self) -> Option<i64> {
            None
        }
        fn set_id(&mut self, _id: Option<i64>) {}
        fn to_attributes(&self) -> Attributes {
            Attributes::new()
        }
        fn from_attributes(_attributes: Attributes) -> Result<Self> {
            Ok(Book)
        }
    }

    fn schema() -> Schema {
        Schema::resolve::<Book>(vec![
            ColumnDef::new("id", "INTEGER"),
            ColumnDef::new("title", "varchar(64)"),
            ColumnDef::new("pages", "INTEGER"),
            ColumnDef::new("price", "REAL"),
            ColumnDef::new("cover", "BLOB"),
        ])
        .unwrap()
    }

    #[test]
    fn accepts_matching_types() {
        let schema = schema();
        let validator = TypeValidator::new();
        assert!(validator.validate(&schema, &attrs! { title: "Dune", pages: 412, price: "n/a" }));
        assert!(validator.validate(
            &schema,
            &attrs! { id: "ignored", title: "Dune", pages: 1, cover: Value::Null }
        ));
    }

    #[test]
    fn rejects_first_mismatch() {
        let schema = schema();
        let validator = TypeValidator::new();
        let failing = validator.check(&schema, &attrs! { title: 3, pages: "many" });
        assert_eq!(failing.map(ColumnDef::name), Some("title"));
        let failing = validator.check(&schema, &attrs! { title: "Dune", pages: 0 });
        assert_eq!(failing.map(ColumnDef::name), Some("pages"));
        let failing = validator.check(&schema, &attrs! { title: "Dune" });
        assert_eq!(failing.map(ColumnDef::name), Some("pages"));
        assert!(!validator.validate(&schema, &attrs! { title: "Dune", pages: -4 }));
    }
}
