use crate::{setup, silent_logs};
use rivet::{Connection, Database, Model, ModelError, ModelSchema, Persistence, Selection, attrs};

#[derive(Model, Default, Debug, Clone, PartialEq)]
pub struct Book {
    pub id: Option<i64>,
    pub title: String,
    pub pages: i64,
    pub price: Option<f64>,
    pub cover: Option<Vec<u8>>,
    pub in_print: bool,
}

pub fn validation<C: Connection>(db: &mut Database<C>) {
    // Setup
    setup(
        db,
        &[
            "DROP TABLE IF EXISTS book;",
            "CREATE TABLE book (id INTEGER PRIMARY KEY, title TEXT, pages INTEGER, price REAL, cover BLOB, in_print BOOLEAN);",
        ],
    );
    db.forget_schema::<Book>();

    let book = Book::create(
        db,
        attrs! { title: "Dune", pages: 412, price: 9.5, cover: vec![0xCAu8, 0xFE], in_print: true },
    )
    .expect("Failed to create a valid book");
    let stored = Book::find(db, book.id.expect("The book should have an id"))
        .expect("Failed to find the book")
        .expect("The book should be found");
    assert_eq!(stored, book);
    assert_eq!(stored.cover.as_deref(), Some(&[0xCA, 0xFE][..]));
    assert!(stored.in_print);

    let schema = Book::schema(db).expect("Failed to get the schema");
    assert_eq!(schema.column_type("price"), Some("REAL"));
    assert!(
        db.validator()
            .validate(&schema, &attrs! { title: "Emma", pages: 474, price: "n/a" })
    );

    silent_logs! {
        for (attributes, column) in [
            (attrs! { title: "No pages", pages: 0 }, "pages"),
            (attrs! { title: "Negative", pages: -12 }, "pages"),
            (attrs! { title: "Textual", pages: "many" }, "pages"),
            (attrs! { title: 1984, pages: 328 }, "title"),
            (attrs! { pages: 328 }, "title"),
        ] {
            let error = Book::create(db, attributes).expect_err("An invalid book must be rejected");
            match error.downcast_ref::<ModelError>() {
                Some(ModelError::Validation {
                    table,
                    column: failing,
                    ..
                }) => {
                    assert_eq!(table, "book");
                    assert_eq!(failing, column);
                }
                other => panic!("Expected a validation error, got {:?}", other),
            }
        }
        let mut untitled = Book {
            pages: 10,
            ..Default::default()
        };
        assert!(untitled.save(db), "An empty title is still a string");
        untitled.pages = -1;
        assert!(
            untitled.save(db),
            "Updates of a saved record are not validated"
        );
    }
    assert_eq!(Book::count(db).expect("Failed to count the books"), 2);
}
