use crate::setup;
use rivet::{Collection, Connection, Database, Join, Model, Persistence, Selection, attrs};
use std::collections::BTreeSet;

#[derive(Model, Default, Debug, Clone, PartialEq)]
pub struct AddressBook {
    pub id: Option<i64>,
    pub name: String,
}

#[derive(Model, Default, Debug, Clone, PartialEq)]
pub struct Entry {
    pub id: Option<i64>,
    pub address_book_id: i64,
    pub name: String,
    pub phone_number: String,
    pub email: Option<String>,
}

#[derive(Model, Default, Debug, Clone, PartialEq)]
#[table_name("comment")]
pub struct EntryComment {
    pub id: Option<i64>,
    pub entry_id: i64,
    pub body: String,
}

pub fn address_book<C: Connection>(db: &mut Database<C>) {
    // Setup
    setup(
        db,
        &[
            "DROP TABLE IF EXISTS comment;",
            "DROP TABLE IF EXISTS entry;",
            "DROP TABLE IF EXISTS address_book;",
            "CREATE TABLE address_book (id INTEGER PRIMARY KEY, name TEXT);",
            "CREATE TABLE entry (id INTEGER PRIMARY KEY, address_book_id INTEGER, name TEXT, phone_number TEXT, email);",
            "CREATE TABLE comment (id INTEGER PRIMARY KEY, entry_id INTEGER, body TEXT);",
        ],
    );
    db.forget_schema::<AddressBook>();
    db.forget_schema::<Entry>();
    db.forget_schema::<EntryComment>();
    assert_eq!(EntryComment::table_name(), "comment");

    let work = AddressBook::create(db, attrs! { name: "Work" }).expect("Failed to create Work");
    let family =
        AddressBook::create(db, attrs! { name: "Family" }).expect("Failed to create Family");
    let (work_id, family_id) = (
        work.id.expect("Work should have an id"),
        family.id.expect("Family should have an id"),
    );
    let entries: Vec<Entry> = [
        (work_id, "Ada", "555-0100", Some("ada@example.com")),
        (work_id, "Alan", "555-0101", None),
        (family_id, "Grace", "555-0102", Some("grace@example.com")),
        (family_id, "Alan", "555-0103", None),
    ]
    .into_iter()
    .map(|(book, name, phone, email)| {
        Entry::create(
            db,
            attrs! {
                address_book_id: book,
                name: name,
                phone_number: phone,
                email: email.map(String::from),
            },
        )
        .expect("Failed to create an entry")
    })
    .collect();
    assert_eq!(entries[0].email.as_deref(), Some("ada@example.com"));
    assert_eq!(entries[1].email, None);
    for (entry, body) in [(0, "call back"), (0, "met at the conference"), (2, "call on monday")] {
        EntryComment::create(
            db,
            attrs! { entry_id: entries[entry].id.expect("Entry should have an id"), body: body },
        )
        .expect("Failed to create a comment");
    }

    // Joins
    let joined = AddressBook::join(db, Join::association("Entry")).expect("Failed to join");
    assert_eq!(joined.len(), 4);
    assert_eq!(
        joined.join_clause(),
        Some(r#"INNER JOIN "entry" ON "entry"."address_book_id" = "address_book"."id""#)
    );
    let work_entries = AddressBook::join(db, Join::association("entry"))
        .expect("Failed to join")
        .filter(db, "entry.name = 'Ada'")
        .expect("Failed to filter the joined collection");
    assert_eq!(work_entries.len(), 1);
    assert_eq!(work_entries[0].name, "Work");
    let commented = AddressBook::joins(db, [("entry", Some("comment"))])
        .expect("Failed to join nested associations");
    assert_eq!(commented.len(), 3);
    let calls = commented
        .filter(db, "comment.body LIKE 'call%'")
        .expect("Failed to filter the joined collection");
    let books: BTreeSet<_> = calls.iter().map(|b| b.name.as_str()).collect();
    assert_eq!(books, BTreeSet::from(["Family", "Work"]));
    let raw = AddressBook::join(
        db,
        "INNER JOIN entry ON entry.address_book_id = address_book.id AND entry.email IS NOT NULL",
    )
    .expect("Failed to join with a raw clause");
    assert_eq!(raw.len(), 2);

    // Collection operations
    let work_entries = Entry::filter(db, attrs! { address_book_id: work_id })
        .expect("Failed to filter the entries");
    assert_eq!(work_entries.len(), 2);
    assert_eq!(
        work_entries
            .update_all(db, attrs! { phone_number: "555-0199" })
            .expect("Failed to update all"),
        1
    );
    let updated = Entry::filter(db, attrs! { phone_number: "555-0199" })
        .expect("Failed to filter the entries");
    assert_eq!(updated.ids(), work_entries.ids());
    let grouped = Entry::all(db)
        .expect("Failed to load the entries")
        .group(db, ["name"])
        .expect("Failed to group");
    assert_eq!(grouped.len(), 3);
    let names = Entry::select(db, ["name"]).expect("Failed to select the names");
    assert_eq!(names.len(), 4);
    assert!(names.ids().is_empty());
    let distinct = names.distinct(db).expect("Failed to get the distinct names");
    let distinct: BTreeSet<_> = distinct.iter().map(|e| e.name.clone()).collect();
    assert_eq!(
        distinct,
        BTreeSet::from(["Ada".to_string(), "Alan".into(), "Grace".into()])
    );
    let alans = names
        .filter(db, attrs! { name: "Alan" })
        .expect("Failed to filter the projected collection");
    assert_eq!(alans.len(), 2);
    assert!(alans.iter().all(|e| e.name == "Alan" && e.phone_number.is_empty()));
    assert_eq!(
        names
            .group(db, ["name"])
            .expect("Failed to group the projected collection")
            .len(),
        3
    );
    assert_eq!(
        names
            .take(db, 1)
            .expect("Failed to take from the projected collection")
            .len(),
        1
    );
    assert!(
        Collection::<Entry>::default()
            .filter(db, attrs! { name: "Alan" })
            .expect("Failed to filter an empty collection")
            .is_empty()
    );
    let family_entries = Entry::filter(db, attrs! { address_book_id: family_id })
        .expect("Failed to filter the entries");
    let narrowed = family_entries
        .filter(db, attrs! { name: "Alan" })
        .expect("Failed to filter the collection");
    assert_eq!(narrowed.len(), 1);
    assert_eq!(narrowed[0].phone_number, "555-0103");
    let sample = family_entries.take(db, 1).expect("Failed to take");
    assert_eq!(sample.len(), 1);
    assert!(family_entries.ids().contains(&sample.ids()[0]));
    let empty = Collection::<Entry>::default();
    assert_eq!(
        empty
            .update_all(db, attrs! { name: "Nobody" })
            .expect("Updating an empty collection must succeed"),
        0
    );
}
