#[cfg(test)]
mod tests {
    use indoc::indoc;
    use rivet::{
        Attributes, ColumnDef, Connection, Database, Error, GenericSqlWriter, IDS_PER_STATEMENT,
        Model, ModelError, ModelSchema, Persistence, Result, Row, Schema, Selection, UpdateTarget,
        Validator, Value, attrs,
    };
    use std::collections::VecDeque;

    /// Records every statement and answers with queued rows.
    #[derive(Default)]
    struct MockConnection {
        columns: Vec<ColumnDef>,
        statements: Vec<(String, Vec<Value>)>,
        rows: VecDeque<Vec<Row>>,
        introspections: usize,
        broken: bool,
    }

    impl Connection for MockConnection {
        type SqlWriter = GenericSqlWriter;

        fn connect(url: &str) -> Result<Self> {
            if !url.starts_with("mock://") {
                return Err(Error::msg(format!("Unsupported url `{}`", url)));
            }
            Ok(Default::default())
        }

        fn sql_writer(&self) -> GenericSqlWriter {
            GenericSqlWriter::new()
        }

        fn execute(&mut self, sql: &str, params: &[Value]) -> Result<Vec<Row>> {
            if self.broken {
                return Err(Error::msg("disk I/O error"));
            }
            self.statements.push((sql.to_string(), params.to_vec()));
            if sql.contains("last_insert_rowid") {
                return Ok(vec![vec![Value::from(7i64)].into()]);
            }
            Ok(self.rows.pop_front().unwrap_or_default())
        }

        fn table_info(&mut self, _table: &str) -> Result<Vec<ColumnDef>> {
            self.introspections += 1;
            Ok(self.columns.clone())
        }
    }

    #[derive(Model, Default, Debug, Clone, PartialEq)]
    struct Person {
        id: Option<i64>,
        first_name: String,
        age: i64,
    }

    #[derive(Model, Default, Debug)]
    #[table_name("person")]
    struct PersonName {
        id: Option<i64>,
        first_name: String,
    }

    fn database() -> Database<MockConnection> {
        let mut db = Database::<MockConnection>::connect("mock://memory")
            .expect("Failed to connect to the mock");
        db.connection().columns = vec![
            ColumnDef::new("id", "INTEGER"),
            ColumnDef::new("first_name", "TEXT"),
            ColumnDef::new("age", "INTEGER"),
        ];
        db
    }

    fn statements(db: &mut Database<MockConnection>) -> Vec<(String, Vec<Value>)> {
        std::mem::take(&mut db.connection().statements)
    }

    #[test]
    fn connect() {
        assert!(Database::<MockConnection>::connect("postgres://localhost").is_err());
    }

    #[test]
    fn schema_is_cached() {
        let mut db = database();
        assert_eq!(
            Person::columns(&mut db).expect("Failed to get the columns"),
            ["id", "first_name", "age"]
        );
        assert_eq!(
            Person::attributes(&mut db).expect("Failed to get the attributes"),
            ["first_name", "age"]
        );
        Person::all(&mut db).expect("Failed to load");
        assert_eq!(db.connection().introspections, 1);
        db.forget_schema::<Person>();
        Person::schema(&mut db).expect("Failed to get the schema");
        assert_eq!(db.connection().introspections, 2);
    }

    #[test]
    fn schema_per_record_type() {
        let mut db = database();
        Person::all(&mut db).expect("Failed to load");
        let error = PersonName::all(&mut db).expect_err("The age column has no field");
        assert!(format!("{:#}", error).contains("age"));
        assert_eq!(db.connection().introspections, 2);
        PersonName::all(&mut db).expect_err("The failure does not depend on the call order");
        Person::all(&mut db).expect("The schema of person is still cached");
        assert_eq!(db.connection().introspections, 3);
    }

    #[test]
    fn schema_resolution() {
        let mut db = database();
        db.connection().columns.clear();
        let error = Person::all(&mut db).expect_err("A missing table must fail");
        assert!(matches!(
            error.downcast_ref::<ModelError>(),
            Some(ModelError::SchemaResolution { table, .. }) if table == "person"
        ));
        db.connection().columns = vec![ColumnDef::new("first_name", "TEXT")];
        assert!(Person::all(&mut db).is_err(), "The id column is required");
        db.connection().columns = vec![
            ColumnDef::new("id", "INTEGER"),
            ColumnDef::new("nickname", "TEXT"),
        ];
        let error = Person::all(&mut db).expect_err("Every column needs a field");
        assert!(format!("{:#}", error).contains("nickname"));
        assert!(statements(&mut db).is_empty());
    }

    #[test]
    fn create() {
        let mut db = database();
        let person = Person::create(&mut db, attrs! { first_name: "Ada", age: 36, id: 5 })
            .expect("Failed to create");
        assert_eq!(
            person,
            Person {
                id: Some(7),
                first_name: "Ada".into(),
                age: 36,
            }
        );
        assert_eq!(
            statements(&mut db),
            [
                (
                    indoc! {r#"
                        INSERT INTO "person" ("first_name", "age")
                        VALUES (?, ?);
                    "#}
                    .trim()
                    .to_string(),
                    vec![Value::from("Ada"), Value::from(36)],
                ),
                ("SELECT last_insert_rowid();".to_string(), vec![]),
            ]
        );
    }

    #[test]
    fn create_rejected() {
        let mut db = database();
        let error = Person::create(&mut db, attrs! { first_name: "Nobody", age: 0 })
            .expect_err("Age zero is not a positive integer");
        assert_eq!(
            error.downcast_ref::<ModelError>(),
            Some(&ModelError::Validation {
                table: "person".into(),
                column: "age".into(),
                declared: "INTEGER".into(),
            })
        );
        assert!(statements(&mut db).is_empty());
    }

    struct AdultsOnly;

    impl Validator for AdultsOnly {
        fn check<'s>(&self, schema: &'s Schema, attributes: &Attributes) -> Option<&'s ColumnDef> {
            let minor = attributes
                .get("age")
                .and_then(Value::as_i64)
                .is_none_or(|age| age < 18);
            minor
                .then(|| schema.column_defs().iter().find(|c| c.name() == "age"))
                .flatten()
        }
    }

    #[test]
    fn custom_validator() {
        let mut db = database().with_validator(AdultsOnly);
        assert!(Person::create(&mut db, attrs! { age: 17 }).is_err());
        let person = Person::create(&mut db, attrs! { age: 18 })
            .expect("The default validator is replaced");
        assert_eq!(person.first_name, "");
        let schema = Person::schema(&mut db).expect("Failed to get the schema");
        assert!(db.validator().validate(&schema, &attrs! { first_name: 1, age: 40 }));
    }

    #[test]
    fn update_targets() {
        let mut db = database();
        assert_eq!(
            Person::update(&mut db, UpdateTarget::Ids(vec![], attrs! { age: 1 }))
                .expect("Failed to update"),
            0
        );
        assert_eq!(
            Person::update(&mut db, UpdateTarget::All(attrs! { id: 3 }))
                .expect("Failed to update"),
            0
        );
        assert!(statements(&mut db).is_empty());
        assert_eq!(
            Person::update(&mut db, UpdateTarget::One(3, attrs! { age: 4, id: 9 }))
                .expect("Failed to update"),
            1
        );
        assert_eq!(
            statements(&mut db),
            [(
                indoc! {r#"
                    UPDATE "person"
                    SET "age" = ?
                    WHERE "id" = ?;
                "#}
                .trim()
                .to_string(),
                vec![Value::from(4), Value::from(3i64)],
            )]
        );
        Person::update(
            &mut db,
            UpdateTarget::Each(vec![(1, attrs! { age: 20 }), (2, attrs! { first_name: "Bo" })]),
        )
        .expect("Failed to update");
        Person::update(&mut db, UpdateTarget::Ids(vec![1, 2], attrs! { age: 30 }))
            .expect("Failed to update");
        Person::update(&mut db, UpdateTarget::All(attrs! { age: 40 })).expect("Failed to update");
        let sql: Vec<String> = statements(&mut db).into_iter().map(|(sql, _)| sql).collect();
        assert_eq!(
            sql,
            [
                "UPDATE \"person\"\nSET \"age\" = ?\nWHERE \"id\" = ?;",
                "UPDATE \"person\"\nSET \"first_name\" = ?\nWHERE \"id\" = ?;",
                "UPDATE \"person\"\nSET \"age\" = ?\nWHERE \"id\" IN (?, ?);",
                "UPDATE \"person\"\nSET \"age\" = ?;",
            ]
        );
    }

    #[test]
    fn destroy() {
        let mut db = database();
        Person::destroy(&mut db, &[]).expect("Failed to destroy nothing");
        assert!(statements(&mut db).is_empty());
        Person::destroy(&mut db, &[4, 5]).expect("Failed to destroy");
        Person::destroy_all(&mut db, Some(attrs! {})).expect("Failed to destroy");
        Person::destroy_all(&mut db, Some(attrs! { first_name: Value::Null, age: 3 }))
            .expect("Failed to destroy");
        assert_eq!(
            statements(&mut db),
            [
                (
                    "DELETE FROM \"person\"\nWHERE \"id\" IN (?, ?);".to_string(),
                    vec![Value::from(4i64), Value::from(5i64)],
                ),
                ("DELETE FROM \"person\";".to_string(), vec![]),
                (
                    "DELETE FROM \"person\"\nWHERE \"age\" = ? AND \"first_name\" IS NULL;"
                        .to_string(),
                    vec![Value::from(3)],
                ),
            ]
        );
    }

    #[test]
    fn long_id_lists() {
        let mut db = database();
        let ids: Vec<i64> = (1..=IDS_PER_STATEMENT as i64 + 1).collect();
        assert_eq!(
            Person::update(&mut db, UpdateTarget::Ids(ids.clone(), attrs! { age: 50 }))
                .expect("Failed to update"),
            2
        );
        Person::destroy(&mut db, &ids).expect("Failed to destroy");
        Person::find_many(&mut db, &ids).expect("Failed to find");
        let params: Vec<usize> = statements(&mut db)
            .into_iter()
            .map(|(_, params)| params.len())
            .collect();
        assert_eq!(
            params,
            [
                IDS_PER_STATEMENT + 1,
                2,
                IDS_PER_STATEMENT,
                1,
                IDS_PER_STATEMENT,
                1,
            ]
        );
    }

    #[test]
    fn save_existing() {
        let mut db = database();
        let mut person = Person {
            id: Some(2),
            first_name: "Grace".into(),
            age: 0,
        };
        assert!(person.save(&mut db), "Updates are not validated");
        assert_eq!(
            statements(&mut db),
            [(
                "UPDATE \"person\"\nSET \"age\" = ?, \"first_name\" = ?\nWHERE \"id\" = ?;"
                    .to_string(),
                vec![Value::from(0i64), Value::from("Grace"), Value::from(2i64)],
            )]
        );
        let mut unsaved = Person::default();
        let error = unsaved
            .reload(&mut db)
            .expect_err("An unsaved record cannot be reloaded");
        assert!(matches!(
            error.downcast_ref::<ModelError>(),
            Some(ModelError::MissingIdentifier { .. })
        ));
        person.id = Some(9);
        let error = person.reload(&mut db).expect_err("No row is queued");
        assert!(
            error
                .downcast_ref::<ModelError>()
                .is_some_and(ModelError::is_not_found)
        );
    }

    #[test]
    fn load_rows() {
        let mut db = database();
        db.connection().rows.push_back(vec![
            vec![Value::from(1i64), "Ada".into(), Value::from(36i64)].into(),
            vec![Value::from(2i64), "Alan".into(), Value::from("41")].into(),
        ]);
        let people = Person::order(&mut db, ["age desc"]).expect("Failed to load");
        assert_eq!(people.ids(), [1, 2]);
        assert_eq!(people[1].age, 41);
        db.connection().rows.push_back(vec![vec![Value::from(12i64)].into()]);
        assert_eq!(Person::count(&mut db).expect("Failed to count"), 12);
        assert_eq!(
            statements(&mut db),
            [
                (
                    "SELECT \"id\", \"first_name\", \"age\"\nFROM \"person\"\nORDER BY \"age\" DESC;"
                        .to_string(),
                    vec![],
                ),
                ("SELECT COUNT(*) FROM \"person\";".to_string(), vec![]),
            ]
        );
    }

    #[test]
    fn query_error() {
        let mut db = database();
        Person::schema(&mut db).expect("Failed to get the schema");
        db.connection().broken = true;
        let error = Person::filter(&mut db, attrs! { first_name: "O'Hara" })
            .expect_err("A broken connection must fail");
        match error.downcast_ref::<ModelError>() {
            Some(ModelError::QueryExecution { query, message }) => {
                assert_eq!(
                    query,
                    "SELECT \"id\", \"first_name\", \"age\"\nFROM \"person\"\nWHERE \"first_name\" = 'O''Hara';"
                );
                assert_eq!(message, "disk I/O error");
            }
            other => panic!("Expected a query execution error, got {:?}", other),
        }
    }
}
