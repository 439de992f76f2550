use crate::{Attributes, Result, Row};

/// Name of the identifier column every table must have.
pub const ID_COLUMN: &str = "id";

/// A record type bound to one table.
///
/// Implemented by `#[derive(Model)]`. The struct must declare an `id: Option<i64>` field,
/// every other field is an attribute stored in the column with the same name.
///
/// ```rust,ignore
/// #[derive(Model, Default, Debug)]
/// struct Person {
///     id: Option<i64>,
///     first_name: String,
///     last_name: String,
///     age: i64,
/// }
/// assert_eq!(Person::table_name(), "person");
/// ```
pub trait Model: Sized + 'static {
    /// Name of the Rust type.
    fn type_name() -> &'static str;
    /// Name of the table, computed once.
    fn table_name() -> &'static str;
    /// Declared fields, in declaration order.
    fn fields() -> &'static [&'static str];
    fn id(&self) -> Option<i64>;
    fn set_id(&mut self, id: Option<i64>);
    /// Current value of every declared field keyed by field name.
    fn to_attributes(&self) -> Attributes;
    /// Builds an instance, missing fields take their default value and unknown keys are ignored.
    fn from_attributes(attributes: Attributes) -> Result<Self>;
}

/// Zips the row with the column list of the statement that produced it.
pub fn map_row<M: Model>(columns: &[String], row: Row) -> Result<M> {
    let attributes = columns
        .iter()
        .map(|c| match c.rsplit_once('.') {
            Some((_, name)) => name.to_string(),
            None => c.clone(),
        })
        .zip(row.into_vec())
        .collect::<Attributes>();
    M::from_attributes(attributes)
}
