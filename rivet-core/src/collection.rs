use crate::{
    Attributes, Condition, Connection, Database, Join, Model, Persistence, Result, Select,
    UpdateTarget,
};
use std::{ops::Deref, vec};

/// Records returned by a multi row read.
///
/// Holds no connection: every operation issues a new statement through the record type,
/// restricted to the records it contains or to the joins of the query that produced it.
///
/// The restriction binds one parameter per identifier: `filter`, `group`, `take` and
/// `distinct` on more than 32766 records exceed the parameter limit of SQLite and fail.
/// `update_all` splits the identifiers every [`crate::IDS_PER_STATEMENT`] and has no limit.
#[derive(Debug, Clone, PartialEq)]
pub struct Collection<M: Model> {
    records: Vec<M>,
    join: Option<String>,
    projection: Option<Vec<String>>,
}

impl<M: Model> Default for Collection<M> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            join: None,
            projection: None,
        }
    }
}

impl<M: Model> Collection<M> {
    pub fn new(records: Vec<M>, join: Option<String>, projection: Option<Vec<String>>) -> Self {
        Self {
            records,
            join,
            projection,
        }
    }

    /// Identifiers of the contained records, records without one are skipped.
    pub fn ids(&self) -> Vec<i64> {
        self.records.iter().filter_map(M::id).collect()
    }

    /// Join clauses of the query that produced this collection.
    pub fn join_clause(&self) -> Option<&str> {
        self.join.as_deref()
    }

    pub fn projection(&self) -> Option<&[String]> {
        self.projection.as_deref()
    }

    pub fn into_vec(self) -> Vec<M> {
        self.records
    }

    /// Query over the contained records, keeping the projection they were loaded with.
    ///
    /// Projected records may carry no identifier, those are looked up in the whole table.
    fn restricted(&self) -> Select<M> {
        let mut query = Select::new();
        if let Some(projection) = &self.projection {
            query = query.select(projection.iter().cloned());
        }
        let ids = self.ids();
        if ids.is_empty() && !self.records.is_empty() {
            query
        } else {
            query.filter(Condition::Ids(ids))
        }
    }

    /// Apply the same updates to every contained record, returns the number of statements issued.
    pub fn update_all<C: Connection>(
        &self,
        db: &mut Database<C>,
        updates: Attributes,
    ) -> Result<u64> {
        M::update(db, UpdateTarget::Ids(self.ids(), updates))
    }

    pub fn group<C: Connection, S: Into<String>>(
        &self,
        db: &mut Database<C>,
        columns: impl IntoIterator<Item = S>,
    ) -> Result<Collection<M>> {
        self.restricted().group(columns).load(db)
    }

    /// Distinct rows of the projection this collection was loaded with.
    pub fn distinct<C: Connection>(&self, db: &mut Database<C>) -> Result<Collection<M>> {
        self.restricted().distinct().load(db)
    }

    /// Narrow further: reuses the join clauses when there are any, otherwise restricts to
    /// the contained records.
    pub fn filter<C: Connection>(
        &self,
        db: &mut Database<C>,
        condition: impl Into<Condition>,
    ) -> Result<Collection<M>> {
        let query = match &self.join {
            Some(join) => {
                let query = Select::new().join(Join::Raw(join.clone()));
                match &self.projection {
                    Some(projection) => query.select(projection.iter().cloned()),
                    None => query,
                }
            }
            None => self.restricted(),
        };
        query.filter(condition).load(db)
    }

    /// Random sample of `count` contained records.
    pub fn take<C: Connection>(&self, db: &mut Database<C>, count: u64) -> Result<Collection<M>> {
        self.restricted().random().limit(count, 0).load(db)
    }
}

impl<M: Model> Deref for Collection<M> {
    type Target = [M];

    fn deref(&self) -> &Self::Target {
        &self.records
    }
}

impl<M: Model> IntoIterator for Collection<M> {
    type Item = M;
    type IntoIter = vec::IntoIter<M>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl<'a, M: Model> IntoIterator for &'a Collection<M> {
    type Item = &'a M;
    type IntoIter = std::slice::Iter<'a, M>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

impl<M: Model> FromIterator<M> for Collection<M> {
    fn from_iter<T: IntoIterator<Item = M>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect(), None, None)
    }
}
