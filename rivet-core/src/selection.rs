use crate::{
    Attributes, Collection, Condition, Connection, Database, Direction, IDS_PER_STATEMENT, Join,
    Model, Order, Result, Select, Value,
};

/// Read operations, available on every [`Model`].
///
/// Each one is a shortcut over [`Select`], use [`Selection::query`] to combine them.
pub trait Selection: Model {
    fn query() -> Select<Self> {
        Select::new()
    }

    fn find<C: Connection>(db: &mut Database<C>, id: i64) -> Result<Option<Self>> {
        Self::query().filter(Condition::Ids(vec![id])).first(db)
    }

    /// Records with any of these identifiers, in the order the backend returns them.
    ///
    /// Long lists are read with one query every [`IDS_PER_STATEMENT`] identifiers.
    fn find_many<C: Connection>(db: &mut Database<C>, ids: &[i64]) -> Result<Collection<Self>> {
        let mut records = Vec::with_capacity(ids.len());
        for chunk in ids.chunks(IDS_PER_STATEMENT) {
            records.extend(
                Self::query()
                    .filter(Condition::Ids(chunk.to_vec()))
                    .load(db)?
                    .into_vec(),
            );
        }
        Ok(records.into_iter().collect())
    }

    fn find_by<C: Connection>(
        db: &mut Database<C>,
        attribute: &str,
        value: impl Into<Value>,
    ) -> Result<Option<Self>> {
        Self::query()
            .filter(Attributes::from([(attribute.to_string(), value.into())]))
            .first(db)
    }

    /// Record with the lowest identifier.
    fn first<C: Connection>(db: &mut Database<C>) -> Result<Option<Self>> {
        Self::query().by_id(Direction::Asc).first(db)
    }

    /// Record with the highest identifier.
    fn last<C: Connection>(db: &mut Database<C>) -> Result<Option<Self>> {
        Self::query().by_id(Direction::Desc).first(db)
    }

    /// `count` records picked at random, every call samples again.
    fn take<C: Connection>(db: &mut Database<C>, count: u64) -> Result<Collection<Self>> {
        Self::query().random().limit(count, 0).load(db)
    }

    fn take_one<C: Connection>(db: &mut Database<C>) -> Result<Option<Self>> {
        Self::query().random().first(db)
    }

    fn all<C: Connection>(db: &mut Database<C>) -> Result<Collection<Self>> {
        Self::query().load(db)
    }

    /// Records matching the condition, [`Condition::Empty`] matches every record.
    fn filter<C: Connection>(
        db: &mut Database<C>,
        condition: impl Into<Condition>,
    ) -> Result<Collection<Self>> {
        Self::query().filter(condition).load(db)
    }

    /// Records different from every given attribute.
    fn not<C: Connection>(db: &mut Database<C>, attributes: Attributes) -> Result<Collection<Self>> {
        Self::query().filter(Condition::NotEqual(attributes)).load(db)
    }

    fn order<C: Connection, O: Into<Order>>(
        db: &mut Database<C>,
        orders: impl IntoIterator<Item = O>,
    ) -> Result<Collection<Self>> {
        Self::query().orders(orders).load(db)
    }

    fn limit<C: Connection>(
        db: &mut Database<C>,
        count: u64,
        offset: u64,
    ) -> Result<Collection<Self>> {
        Self::query().limit(count, offset).load(db)
    }

    fn group<C: Connection, S: Into<String>>(
        db: &mut Database<C>,
        columns: impl IntoIterator<Item = S>,
    ) -> Result<Collection<Self>> {
        Self::query().group(columns).load(db)
    }

    /// The collection remembers the join clauses, [`Collection::filter`] reuses them.
    fn join<C: Connection>(db: &mut Database<C>, join: impl Into<Join>) -> Result<Collection<Self>> {
        Self::query().join(join).load(db)
    }

    /// Each entry joins an association, `(a, Some(b))` also joins `b` through `a`.
    fn joins<C: Connection, S: Into<String>>(
        db: &mut Database<C>,
        associations: impl IntoIterator<Item = (S, Option<S>)>,
    ) -> Result<Collection<Self>> {
        associations
            .into_iter()
            .fold(Self::query(), |query, (first, second)| match second {
                Some(second) => query.join(Join::nested(first, second)),
                None => query.join(Join::association(first)),
            })
            .load(db)
    }

    /// Records holding only the selected fields, the others take their default value.
    fn select<C: Connection, S: Into<String>>(
        db: &mut Database<C>,
        fields: impl IntoIterator<Item = S>,
    ) -> Result<Collection<Self>> {
        Self::query().select(fields).load(db)
    }
}

impl<M: Model> Selection for M {}
