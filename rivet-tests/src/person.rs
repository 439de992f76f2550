use crate::{setup, silent_logs};
use rivet::{
    Condition, Connection, Database, Direction, Model, ModelError, ModelSchema, Order,
    Persistence, Selection, UpdateTarget, Value, attrs, normalize_keys,
};

#[derive(Model, Default, Debug, Clone, PartialEq)]
pub struct Person {
    pub id: Option<i64>,
    pub first_name: String,
    pub last_name: String,
    pub age: i64,
}

fn names(people: &[Person]) -> Vec<(&str, &str)> {
    people
        .iter()
        .map(|p| (p.first_name.as_str(), p.last_name.as_str()))
        .collect()
}

pub fn person<C: Connection>(db: &mut Database<C>) {
    // Setup
    setup(
        db,
        &[
            "DROP TABLE IF EXISTS person;",
            "CREATE TABLE person (id INTEGER PRIMARY KEY, first_name TEXT, last_name VARCHAR(64), age INTEGER);",
        ],
    );
    db.forget_schema::<Person>();
    assert_eq!(Person::table(), "person");
    assert_eq!(
        Person::columns(db).expect("Failed to get the columns of person"),
        ["id", "first_name", "last_name", "age"]
    );
    assert_eq!(
        Person::attributes(db).expect("Failed to get the attributes of person"),
        ["first_name", "last_name", "age"]
    );

    // Create, find, update, destroy
    let david = Person::create(
        db,
        attrs! { first_name: "David", last_name: "Li", age: 30, id: 99 },
    )
    .expect("Failed to create David");
    assert_eq!(david.id, Some(1));
    assert_eq!(david.first_name, "David");
    let found = Person::find_by(db, "first_name", "David")
        .expect("Failed to query by first_name")
        .expect("David should be found");
    assert_eq!(found, david);
    assert_eq!(
        Person::update(db, UpdateTarget::One(1, attrs! { age: 31 })).expect("Failed to update"),
        1
    );
    let found = Person::find(db, 1)
        .expect("Failed to find David")
        .expect("David should be found");
    assert_eq!(found.age, 31);
    assert_eq!(found.last_name, "Li");
    Person::destroy(db, &[1]).expect("Failed to destroy David");
    assert_eq!(Person::find(db, 1).expect("Failed to query the id"), None);
    assert_eq!(Person::count(db).expect("Failed to count"), 0);
    Person::destroy(db, &[]).expect("Destroying nothing must succeed");

    // Population
    let people: Vec<Person> = [
        ("Ada", "Lovelace", 36),
        ("Alan", "Turing", 41),
        ("Grace", "Hopper", 85),
        ("Alan", "Kay", 84),
        ("Edsger", "Dijkstra", 72),
    ]
    .into_iter()
    .map(|(first_name, last_name, age)| {
        Person::create(
            db,
            attrs! { first_name: first_name, last_name: last_name, age: age },
        )
        .expect("Failed to create a person")
    })
    .collect();
    let ids: Vec<i64> = people.iter().filter_map(|p| p.id).collect();
    assert_eq!(ids.len(), 5);
    assert_eq!(Person::count(db).expect("Failed to count"), 5);

    // Filters
    let all = Person::all(db).expect("Failed to load every person");
    assert_eq!(all.len(), 5);
    assert_eq!(
        *Person::filter(db, Condition::Empty).expect("Failed to filter by nothing"),
        *all
    );
    assert_eq!(
        *Person::filter(db, attrs! {}).expect("Failed to filter by an empty map"),
        *all
    );
    let turing = Person::filter(db, attrs! { first_name: "Alan", age: 41 })
        .expect("Failed to filter by equality");
    let turing_swapped = Person::filter(db, normalize_keys([("age", Value::from(41)), ("first_name", "Alan".into())]))
        .expect("Failed to filter by equality");
    assert_eq!(turing, turing_swapped);
    assert_eq!(names(&turing), [("Alan", "Turing")]);
    let kay = Person::filter(
        db,
        Condition::params("age > ? AND first_name LIKE ?", [Value::from(50), "A%".into()]),
    )
    .expect("Failed to filter with parameters");
    assert_eq!(names(&kay), [("Alan", "Kay")]);
    let young = Person::filter(db, "age < 40").expect("Failed to filter with an expression");
    assert_eq!(names(&young), [("Ada", "Lovelace")]);
    let quoted = Person::filter(db, Condition::params("last_name = ?", ["O'Hara"]))
        .expect("Failed to filter with a quote in the value");
    assert!(quoted.is_empty());
    let not_alan = Person::not(db, attrs! { first_name: "Alan" }).expect("Failed to negate");
    assert_eq!(not_alan.len(), 3);
    assert!(not_alan.iter().all(|p| p.first_name != "Alan"));
    let found = Person::find_many(db, &[ids[0], ids[2]]).expect("Failed to find many");
    assert_eq!(found.len(), 2);
    assert!(
        Person::find_many(db, &[])
            .expect("Failed to find no ids")
            .is_empty()
    );

    // Ordering
    let raw = Person::order(db, ["first_name asc, age desc"]).expect("Failed to order");
    let explicit = Person::order(
        db,
        [
            Order::Column("first_name".into()),
            Order::from(("age", Direction::Desc)),
        ],
    )
    .expect("Failed to order");
    assert_eq!(raw, explicit);
    assert_eq!(
        names(&raw),
        [
            ("Ada", "Lovelace"),
            ("Alan", "Kay"),
            ("Alan", "Turing"),
            ("Edsger", "Dijkstra"),
            ("Grace", "Hopper"),
        ]
    );
    let first = Person::first(db)
        .expect("Failed to get the first")
        .expect("There should be a first");
    assert_eq!(first.first_name, "Ada");
    let last = Person::last(db)
        .expect("Failed to get the last")
        .expect("There should be a last");
    assert_eq!(last.first_name, "Edsger");
    let page = Person::query()
        .order("id")
        .limit(2, 1)
        .load(db)
        .expect("Failed to load a page");
    assert_eq!(names(&page), [("Alan", "Turing"), ("Grace", "Hopper")]);
    assert_eq!(Person::limit(db, 3, 0).expect("Failed to limit").len(), 3);

    // Sampling
    let sample = Person::take(db, 3).expect("Failed to take");
    assert_eq!(sample.len(), 3);
    assert!(sample.ids().iter().all(|id| ids.contains(id)));
    assert_eq!(Person::take(db, 10).expect("Failed to take").len(), 5);
    assert!(
        Person::take_one(db)
            .expect("Failed to take one")
            .is_some()
    );

    // Grouping and projection
    let grouped = Person::group(db, ["first_name"]).expect("Failed to group");
    assert_eq!(grouped.len(), 4);
    let projected = Person::select(db, ["first_name", "age"]).expect("Failed to select");
    assert_eq!(projected.len(), 5);
    assert!(
        projected
            .iter()
            .all(|p| p.id.is_none() && p.last_name.is_empty() && p.age > 0)
    );
    let combined = Person::query()
        .filter(attrs! { first_name: "Alan" })
        .filter("age > 50")
        .select(["last_name"])
        .first(db)
        .expect("Failed to combine the filters")
        .expect("Alan Kay should be found");
    assert_eq!(combined.last_name, "Kay");

    // Updates
    assert_eq!(
        Person::update(db, UpdateTarget::Ids(vec![], attrs! { age: 1 }))
            .expect("Failed to update no ids"),
        0
    );
    assert!(
        Person::filter(db, attrs! { age: 1 })
            .expect("Failed to filter")
            .is_empty()
    );
    assert_eq!(
        Person::update(db, UpdateTarget::Each(vec![]))
            .expect("Failed to update no ids"),
        0
    );
    assert_eq!(
        Person::update(
            db,
            UpdateTarget::Each(vec![
                (ids[0], attrs! { age: 37 }),
                (ids[1], attrs! { age: 42, last_name: "Mathison Turing" }),
            ])
        )
        .expect("Failed to update each"),
        2
    );
    let ada = Person::find(db, ids[0])
        .expect("Failed to find Ada")
        .expect("Ada should be found");
    assert_eq!(ada.age, 37);
    let alan = Person::find(db, ids[1])
        .expect("Failed to find Alan")
        .expect("Alan should be found");
    assert_eq!((alan.last_name.as_str(), alan.age), ("Mathison Turing", 42));
    assert_eq!(
        Person::update(db, UpdateTarget::Ids(vec![ids[2], ids[3]], attrs! { age: 90 }))
            .expect("Failed to update ids"),
        1
    );
    assert_eq!(
        Person::filter(db, attrs! { age: 90 })
            .expect("Failed to filter")
            .len(),
        2
    );

    // Save
    let mut barbara = Person {
        id: None,
        first_name: "Barbara".into(),
        last_name: "Liskov".into(),
        age: 86,
    };
    assert!(barbara.save(db));
    let id = barbara.id.expect("Barbara should have an id after saving");
    barbara.age = 87;
    barbara.try_save(db).expect("Failed to save Barbara again");
    assert_eq!(barbara.id, Some(id));
    let stored = Person::find(db, id)
        .expect("Failed to find Barbara")
        .expect("Barbara should be found");
    assert_eq!(stored, barbara);
    barbara.last_name = "Changed".into();
    barbara.reload(db).expect("Failed to reload Barbara");
    assert_eq!(barbara.last_name, "Liskov");
    barbara
        .update_attribute(db, "age", 88)
        .expect("Failed to update an attribute");
    assert_eq!(barbara.age, 88);
    barbara
        .update_attributes(db, attrs! { first_name: "Barbara Jane", age: 89 })
        .expect("Failed to update the attributes");
    let stored = Person::find(db, id)
        .expect("Failed to find Barbara")
        .expect("Barbara should be found");
    assert_eq!(stored, barbara);
    assert_eq!((stored.first_name.as_str(), stored.age), ("Barbara Jane", 89));

    // Failures
    silent_logs! {
        let mut unsaved = Person {
            first_name: "Nobody".into(),
            ..Default::default()
        };
        let error = unsaved
            .update_attribute(db, "age", 3)
            .expect_err("Updating an unsaved record must fail");
        assert!(matches!(
            error.downcast_ref::<ModelError>(),
            Some(ModelError::MissingIdentifier { .. })
        ));
        assert!(!unsaved.save(db), "Age zero does not satisfy INTEGER");
        assert_eq!(unsaved.id, None);
        Person::destroy(db, &[id]).expect("Failed to destroy Barbara");
        let error = barbara.reload(db).expect_err("Reloading a destroyed record must fail");
        assert!(
            error
                .downcast_ref::<ModelError>()
                .is_some_and(ModelError::is_not_found)
        );
        assert!(Person::filter(db, "no_such_column = 1").is_err());
        assert!(
            Person::find_by(db, "age = 0 OR 1", 1).is_err(),
            "Attribute names are never pasted into the query"
        );
        assert!(Person::not(db, attrs! { "1 OR first_name": "Ada" }).is_err());
        let error = Person::order(db, ["age sideways"]).expect_err("Wrong direction must fail");
        assert!(format!("{:#}", error).contains("sideways"));
    }

    // Destroy
    Person::destroy_all(db, Some(attrs! { first_name: "Alan" })).expect("Failed to destroy Alan");
    assert_eq!(Person::count(db).expect("Failed to count"), 3);
    Person::destroy_all(db, None).expect("Failed to destroy every person");
    assert_eq!(Person::count(db).expect("Failed to count"), 0);
}
