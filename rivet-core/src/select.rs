use crate::{
    Collection, Condition, Connection, Database, Direction, Fragment, ID_COLUMN, Join, Model,
    Order, OrderBy, Result, SqlWriter, map_row, possibly_parenthesized,
};
use std::marker::PhantomData;

/// Rendered clauses of a select statement, everything but the `WHERE` expression.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct SelectQuery {
    /// Selected columns, `None` selects every column of the schema.
    pub projection: Option<Vec<String>>,
    pub distinct: bool,
    /// One rendered join clause per entry.
    pub joins: Vec<String>,
    pub group: Vec<String>,
    pub order: OrderBy,
    /// Random row order, takes precedence over `order`.
    pub random: bool,
    pub limit: Option<u64>,
    pub offset: u64,
}

/// Composable read query over the table of `M`.
///
/// Nothing touches the backend until [`Select::load`] or [`Select::first`]. Conditions
/// accumulate and are `AND` joined, orders are merged column by column.
///
/// ```rust,ignore
/// let adults = Person::query()
///     .filter(Condition::params("age >= ?", [18]))
///     .order("last_name asc, age desc")
///     .limit(10, 0)
///     .load(&mut db)?;
/// ```
pub struct Select<M: Model> {
    projection: Option<Vec<String>>,
    distinct: bool,
    joins: Vec<Join>,
    conditions: Vec<Condition>,
    group: Vec<String>,
    orders: Vec<Order>,
    random: bool,
    limit: Option<u64>,
    offset: u64,
    _model: PhantomData<fn() -> M>,
}

impl<M: Model> Default for Select<M> {
    fn default() -> Self {
        Self {
            projection: None,
            distinct: false,
            joins: Vec::new(),
            conditions: Vec::new(),
            group: Vec::new(),
            orders: Vec::new(),
            random: false,
            limit: None,
            offset: 0,
            _model: PhantomData,
        }
    }
}

impl<M: Model> Clone for Select<M> {
    fn clone(&self) -> Self {
        Self {
            projection: self.projection.clone(),
            distinct: self.distinct,
            joins: self.joins.clone(),
            conditions: self.conditions.clone(),
            group: self.group.clone(),
            orders: self.orders.clone(),
            random: self.random,
            limit: self.limit,
            offset: self.offset,
            _model: PhantomData,
        }
    }
}

impl<M: Model> Select<M> {
    pub fn new() -> Self {
        Default::default()
    }

    /// Narrow the rows, empty conditions leave the query unchanged.
    pub fn filter(mut self, condition: impl Into<Condition>) -> Self {
        let condition = condition.into();
        if !condition.is_empty() {
            self.conditions.push(condition);
        }
        self
    }

    pub fn order(mut self, order: impl Into<Order>) -> Self {
        self.orders.push(order.into());
        self
    }

    pub fn orders<O: Into<Order>>(mut self, orders: impl IntoIterator<Item = O>) -> Self {
        self.orders.extend(orders.into_iter().map(Into::into));
        self
    }

    pub fn limit(mut self, count: u64, offset: u64) -> Self {
        self.limit = Some(count);
        self.offset = offset;
        self
    }

    /// Random order, re-evaluated by the backend on every execution.
    pub fn random(mut self) -> Self {
        self.random = true;
        self
    }

    pub fn group<S: Into<String>>(mut self, columns: impl IntoIterator<Item = S>) -> Self {
        self.group.extend(columns.into_iter().map(Into::into));
        self
    }

    pub fn join(mut self, join: impl Into<Join>) -> Self {
        self.joins.push(join.into());
        self
    }

    /// Select only these columns, the other fields of the records take their default value.
    pub fn select<S: Into<String>>(mut self, fields: impl IntoIterator<Item = S>) -> Self {
        let fields: Vec<String> = fields.into_iter().map(Into::into).collect();
        self.projection = (!fields.is_empty()).then_some(fields);
        self
    }

    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    /// Join clauses rendered starting from the table of `M`.
    pub fn join_clauses(&self, writer: &dyn SqlWriter) -> Vec<String> {
        self.joins
            .iter()
            .map(|join| {
                let mut out = String::new();
                join.write(writer, &mut out, M::table_name());
                out
            })
            .collect()
    }

    /// Conditions `AND` joined, column names qualified when the query joins other tables.
    pub fn condition(&self, writer: &dyn SqlWriter) -> Result<Fragment> {
        let qualify = (!self.joins.is_empty()).then_some(M::table_name());
        let mut result = Fragment::default();
        let parenthesize = self.conditions.len() > 1;
        for condition in &self.conditions {
            let fragment = condition.to_fragment(writer, qualify)?;
            let mut sql = String::with_capacity(fragment.sql.len() + 2);
            possibly_parenthesized!(sql, parenthesize, sql.push_str(&fragment.sql));
            result.append(" AND ", Fragment::with_params(sql, fragment.params));
        }
        Ok(result)
    }

    /// Statement text and parameters, `columns` is the select list used when there is no projection.
    pub fn to_fragment(&self, writer: &dyn SqlWriter, columns: &[String]) -> Result<Fragment> {
        let query = SelectQuery {
            projection: self.projection.clone(),
            distinct: self.distinct,
            joins: self.join_clauses(writer),
            group: self.group.clone(),
            order: OrderBy::from_orders(&self.orders)?,
            random: self.random,
            limit: self.limit,
            offset: self.offset,
        };
        let condition = self.condition(writer)?;
        let mut sql = String::with_capacity(128);
        writer.write_select(
            &mut sql,
            M::table_name(),
            query.projection.as_deref().unwrap_or(columns),
            &query,
            &condition.sql,
        );
        Ok(Fragment::with_params(sql, condition.params))
    }

    /// Run the query and map every row.
    pub fn load<C: Connection>(&self, db: &mut Database<C>) -> Result<Collection<M>> {
        let columns = match &self.projection {
            Some(projection) => projection.clone(),
            None => db.schema::<M>()?.columns(),
        };
        let writer = db.sql_writer();
        let fragment = self.to_fragment(&writer, &columns)?;
        let records = db
            .fetch(&fragment)?
            .into_iter()
            .map(|row| map_row::<M>(&columns, row))
            .collect::<Result<Vec<_>>>()?;
        let join = self.join_clauses(&writer);
        Ok(Collection::new(
            records,
            (!join.is_empty()).then(|| join.join("\n")),
            self.projection.clone(),
        ))
    }

    /// First row of the query limited to one row, in whatever order the query defines.
    pub fn first<C: Connection>(&self, db: &mut Database<C>) -> Result<Option<M>> {
        let query = self.clone().limit(1, self.offset);
        Ok(query.load(db)?.into_vec().into_iter().next())
    }

    /// Query ordered by identifier in the given direction.
    pub(crate) fn by_id(self, direction: Direction) -> Self {
        self.order((ID_COLUMN, direction))
    }
}
