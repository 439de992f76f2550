use crate::{
    Attributes, Condition, Connection, Database, Error, Fragment, ID_COLUMN, IDS_PER_STATEMENT,
    Model, ModelError, Result, Select, SqlWriter, Value,
};

/// Rows an [`Persistence::update`] call writes to.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateTarget {
    /// One statement per pair, each row with its own updates.
    Each(Vec<(i64, Attributes)>),
    /// A single row.
    One(i64, Attributes),
    /// Every listed row with the same updates, an empty list writes nothing. Long lists are
    /// split into one statement every [`IDS_PER_STATEMENT`] identifiers.
    Ids(Vec<i64>, Attributes),
    /// Every row of the table.
    All(Attributes),
}

/// Write operations, available on every [`Model`].
pub trait Persistence: Model {
    /// Insert a new row and return the record holding the assigned identifier.
    ///
    /// An `id` in `attributes` is ignored. Attributes are checked by the validator of the
    /// database first, a failure is reported as [`ModelError::Validation`].
    ///
    /// The identifier is read back with a second statement, a concurrent insert on the same
    /// connection in between would be returned instead.
    fn create<C: Connection>(db: &mut Database<C>, mut attributes: Attributes) -> Result<Self> {
        attributes.remove(ID_COLUMN);
        let schema = db.schema::<Self>()?;
        if let Some(column) = db.validator().check(&schema, &attributes) {
            let error = Error::new(ModelError::Validation {
                table: Self::table_name().into(),
                column: column.name().into(),
                declared: column.column_type.clone(),
            });
            log::error!("{:#}", error);
            return Err(error);
        }
        let columns = schema.attributes();
        let mut sql = String::with_capacity(64 + columns.len() * 16);
        db.sql_writer()
            .write_insert(&mut sql, Self::table_name(), &columns);
        let params = columns
            .iter()
            .map(|c| attributes.get(c).cloned().unwrap_or_default())
            .collect();
        db.execute(&Fragment::with_params(sql, params))?;
        let id = db.last_insert_id()?;
        attributes.insert(ID_COLUMN.into(), id.into());
        Self::from_attributes(attributes)
    }

    /// Returns the number of `UPDATE` statements issued.
    fn update<C: Connection>(db: &mut Database<C>, target: UpdateTarget) -> Result<u64> {
        let statements: Vec<(Condition, Attributes)> = match target {
            UpdateTarget::Each(updates) => updates
                .into_iter()
                .map(|(id, attributes)| (Condition::Ids(vec![id]), attributes))
                .collect(),
            UpdateTarget::One(id, attributes) => vec![(Condition::Ids(vec![id]), attributes)],
            UpdateTarget::Ids(ids, attributes) => ids
                .chunks(IDS_PER_STATEMENT)
                .map(|chunk| (Condition::Ids(chunk.to_vec()), attributes.clone()))
                .collect(),
            UpdateTarget::All(attributes) => vec![(Condition::Empty, attributes)],
        };
        let mut issued = 0;
        for (condition, attributes) in statements {
            if update_where::<Self, C>(db, &condition, attributes)? {
                issued += 1;
            }
        }
        Ok(issued)
    }

    /// Delete the rows with these identifiers, nothing when empty.
    fn destroy<C: Connection>(db: &mut Database<C>, ids: &[i64]) -> Result<()> {
        for chunk in ids.chunks(IDS_PER_STATEMENT) {
            delete_where::<Self, C>(db, &Condition::Ids(chunk.to_vec()))?;
        }
        Ok(())
    }

    /// Delete every row, or the rows equal to every given attribute.
    fn destroy_all<C: Connection>(db: &mut Database<C>, conditions: Option<Attributes>) -> Result<()> {
        let condition = conditions.map(Condition::Equal).unwrap_or_default();
        delete_where::<Self, C>(db, &condition)
    }

    /// Insert the record when it has no identifier, update every attribute of its row otherwise.
    ///
    /// After an insert the record is reloaded, values adjusted by the backend are visible.
    fn try_save<C: Connection>(&mut self, db: &mut Database<C>) -> Result<()> {
        let Some(id) = self.id() else {
            let created = Self::create(db, self.to_attributes())?;
            self.set_id(created.id());
            return self.reload(db);
        };
        let schema = db.schema::<Self>()?;
        let mut current = self.to_attributes();
        let attributes = schema
            .attributes()
            .into_iter()
            .map(|c| {
                let value = current.remove(&c).unwrap_or_default();
                (c, value)
            })
            .collect();
        update_where::<Self, C>(db, &Condition::Ids(vec![id]), attributes)?;
        Ok(())
    }

    /// Lenient [`Persistence::try_save`], failures are logged and reported as `false`.
    fn save<C: Connection>(&mut self, db: &mut Database<C>) -> bool {
        match self.try_save(db) {
            Ok(()) => true,
            Err(error) => {
                log::warn!("Could not save a record of `{}`: {:#}", Self::table_name(), error);
                false
            }
        }
    }

    /// Overwrite every field with the values stored in the row.
    fn reload<C: Connection>(&mut self, db: &mut Database<C>) -> Result<()> {
        let id = require_id(self, "reloaded")?;
        match Select::<Self>::new().filter(Condition::Ids(vec![id])).first(db)? {
            Some(stored) => {
                *self = stored;
                Ok(())
            }
            None => {
                let error = Error::new(ModelError::NotFound {
                    table: Self::table_name().into(),
                    id,
                });
                log::error!("{:#}", error);
                Err(error)
            }
        }
    }

    fn update_attribute<C: Connection>(
        &mut self,
        db: &mut Database<C>,
        name: &str,
        value: impl Into<Value>,
    ) -> Result<()> {
        self.update_attributes(db, Attributes::from([(name.to_string(), value.into())]))
    }

    /// Write the attributes to the row of this record and apply them to the record itself.
    fn update_attributes<C: Connection>(
        &mut self,
        db: &mut Database<C>,
        mut attributes: Attributes,
    ) -> Result<()> {
        let id = require_id(self, "updated")?;
        attributes.remove(ID_COLUMN);
        update_where::<Self, C>(db, &Condition::Ids(vec![id]), attributes.clone())?;
        let mut current = self.to_attributes();
        current.extend(attributes);
        *self = Self::from_attributes(current)?;
        Ok(())
    }
}

impl<M: Model> Persistence for M {}

fn require_id<M: Model>(record: &M, action: &'static str) -> Result<i64> {
    record.id().ok_or_else(|| {
        let error = Error::new(ModelError::MissingIdentifier {
            table: M::table_name().into(),
            action,
        });
        log::error!("{:#}", error);
        error
    })
}

/// Returns whether a statement was issued, empty updates write nothing.
fn update_where<M: Model, C: Connection>(
    db: &mut Database<C>,
    condition: &Condition,
    mut attributes: Attributes,
) -> Result<bool> {
    attributes.remove(ID_COLUMN);
    if attributes.is_empty() {
        return Ok(false);
    }
    let writer = db.sql_writer();
    let condition = condition.to_fragment(&writer, None)?;
    let columns: Vec<&str> = attributes.keys().map(String::as_str).collect();
    let mut sql = String::with_capacity(64 + columns.len() * 16);
    writer.write_update(&mut sql, M::table_name(), &columns, &condition.sql);
    let mut params: Vec<Value> = attributes.values().cloned().collect();
    params.extend(condition.params);
    db.execute(&Fragment::with_params(sql, params))?;
    Ok(true)
}

fn delete_where<M: Model, C: Connection>(db: &mut Database<C>, condition: &Condition) -> Result<()> {
    let writer = db.sql_writer();
    let condition = condition.to_fragment(&writer, None)?;
    let mut sql = String::with_capacity(64);
    writer.write_delete(&mut sql, M::table_name(), &condition.sql);
    db.execute(&Fragment::with_params(sql, condition.params))
}
