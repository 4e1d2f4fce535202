use sqlite_wrapper::prelude::*;

fn library(db: &Database) -> Result<(), Box<dyn std::error::Error>> {
    let authors = db
        .create(
            "authors",
            [
                ("id", ColumnSpec::autoincrement()),
                ("name", ColumnSpec::unique(BaseType::Text)),
            ],
            false,
        )?
        .run()?;
    // one foreign key through a handle, one by name
    let books = db
        .create(
            "books",
            [
                ("id", ColumnSpec::autoincrement()),
                ("title", ColumnSpec::not_null(BaseType::Text)),
                ("author", ColumnSpec::foreign(&authors)),
            ],
            false,
        )?
        .run()?;
    db.create(
        "reviews",
        [
            ("book", ColumnSpec::foreign_column("books", "id")),
            ("stars", ColumnSpec::default(3)),
        ],
        false,
    )?
    .run()?;

    authors.add([("name", "le guin")])?.run()?;
    authors.add([("name", "banks")])?.run()?;
    authors.add([("name", "nobody")])?.run()?;
    books
        .add([("title", Value::from("dispossessed")), ("author", Value::Integer(1))])?
        .run()?;
    books
        .add([("title", Value::from("excession")), ("author", Value::Integer(2))])?
        .run()?;
    books
        .add([("title", Value::from("player of games")), ("author", Value::Integer(2))])?
        .run()?;
    Ok(())
}

#[test]
fn foreign_keys_take_the_referenced_type() -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open(":memory:")?;
    library(&db)?;
    let books = db.table("books")?;
    assert_eq!(
        books.column_types()?,
        vec![
            ("id".to_string(), "INTEGER".to_string()),
            ("title".to_string(), "TEXT".to_string()),
            ("author".to_string(), "INTEGER".to_string()),
        ]
    );
    assert_eq!(
        books.foreign_keys()?,
        vec![ForeignKey {
            table: "authors".into(),
            from: "author".into(),
            to: Some("id".into()),
        }]
    );
    assert_eq!(books.primary_keys()?, vec!["id".to_string()]);
    assert_eq!(db.table("reviews")?.columns()?, vec!["book", "stars"]);
    Ok(())
}

#[test]
fn foreign_key_errors() -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open(":memory:")?;
    library(&db)?;
    let other = Database::open(":memory:")?;
    let stranger = other
        .create("stranger", [("id", ColumnSpec::autoincrement())], false)?
        .run()?;

    let cross = db.create("x", [("s", ColumnSpec::foreign(&stranger))], false);
    assert!(matches!(cross, Err(SqliteWrapperError::Instance(_))));

    let missing_table = db.create("x", [("s", ColumnSpec::foreign("ghosts"))], false);
    assert!(matches!(missing_table, Err(SqliteWrapperError::Instance(_))));

    let missing_column = db.create("x", [("s", ColumnSpec::foreign_column("books", "isbn"))], false);
    assert!(matches!(missing_column, Err(SqliteWrapperError::Instance(_))));

    // reviews has no primary key to infer
    let no_key = db.create("x", [("s", ColumnSpec::foreign("reviews"))], false);
    assert!(matches!(no_key, Err(SqliteWrapperError::Instance(_))));
    assert!(!db.exists("x")?);
    Ok(())
}

#[test]
fn joins_infer_columns_from_foreign_keys() -> Result<(), Box<dyn std::error::Error>> {
    for separate_thread in [false, true] {
        let db = Database::builder(":memory:")
            .separate_thread(separate_thread)
            .open()?;
        library(&db)?;
        let books = db.table("books")?;

        let inner = books
            .get_all(["books.title", "authors.name"])
            .inner_join(None, None)?
            .where_("authors.name")?
            .eq("banks")?
            .sort(["books.id"])
            .asc()?;
        assert_eq!(
            inner.query().sql(),
            "SELECT books.title, authors.name FROM books INNER JOIN authors ON books.author=authors.id \
             WHERE authors.name = ? ORDER BY books.id ASC"
        );
        let rows = inner.run()?.into_rows();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get_by_index(0), Some(&Value::from("excession")));

        let authors = db.table("authors")?;
        // one row per book
        let left = books
            .get_all(["authors.name", "books.title"])
            .join(JoinKind::Left, Some("author"), Some("authors.id"))?;
        assert_eq!(left.run()?.len(), 3);
        assert_eq!(authors.rows()?, 3);
        db.close(false)?;
    }
    Ok(())
}

#[test]
fn join_resolution_errors() -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open(":memory:")?;
    library(&db)?;
    let books = db.table("books")?;
    let authors = db.table("authors")?;

    assert!(matches!(
        authors.get_all(["name"]).left_join(None, None),
        Err(SqliteWrapperError::Instance(_))
    ));
    assert!(matches!(
        books.get_all(["title"]).left_join(Some("nope"), None),
        Err(SqliteWrapperError::Instance(_))
    ));
    assert!(matches!(
        books.get_all(["title"]).left_join(Some("author"), Some("id")),
        Err(SqliteWrapperError::Instance(_))
    ));
    assert!(matches!(
        books.get_all(["title"]).left_join(Some("author"), Some("authors.missing")),
        Err(SqliteWrapperError::Instance(_))
    ));

    let pairings = db
        .create(
            "pairings",
            [
                ("first", ColumnSpec::foreign(&authors)),
                ("second", ColumnSpec::foreign(&authors)),
            ],
            false,
        )?
        .run()?;
    assert!(matches!(
        pairings.get_all(["first"]).left_join(None, None),
        Err(SqliteWrapperError::Instance(_))
    ));
    let by_second = pairings.get_all(["authors.name"]).left_join(Some("second"), None)?;
    assert_eq!(
        by_second.query().sql(),
        "SELECT authors.name FROM pairings LEFT JOIN authors ON pairings.second=authors.id"
    );
    Ok(())
}

#[test]
fn add_column_restrictions() -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open(":memory:")?;
    library(&db)?;
    let authors = db.table("authors")?;

    for spec in [
        ColumnSpec::autoincrement(),
        ColumnSpec::primary(BaseType::Text),
        ColumnSpec::unique(BaseType::Text),
        ColumnSpec::not_null(BaseType::Text),
        ColumnSpec::foreign("books"),
    ] {
        assert!(matches!(
            authors.add_column("extra", spec),
            Err(SqliteWrapperError::Type(_))
        ));
    }
    assert!(matches!(
        authors.add_column("name", BaseType::Text),
        Err(SqliteWrapperError::Table(_))
    ));

    let born = authors.add_column("born", ColumnSpec::default(1900))?;
    assert_eq!(
        born.query().sql(),
        "ALTER TABLE authors ADD COLUMN born INTEGER DEFAULT 1900"
    );
    assert!(matches!(born.refit(), Err(SqliteWrapperError::Unimplemented(_))));
    born.run()?;
    authors.add_column("bio", BaseType::Text)?.run()?;

    assert_eq!(authors.columns()?, vec!["id", "name", "born", "bio"]);
    let born_of_banks = authors.get(["born"]).where_("name")?.eq("banks")?.run()?;
    assert_eq!(born_of_banks, Fetched::Value(Value::Integer(1900)));
    assert!(matches!(
        authors.remove_column("bio"),
        Err(SqliteWrapperError::Unimplemented(_))
    ));
    Ok(())
}

#[test]
fn rename_and_drop() -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open(":memory:")?;
    library(&db)?;
    let mut reviews = db.table("reviews")?;

    assert!(matches!(reviews.rename("books"), Err(SqliteWrapperError::Table(_))));
    assert_eq!(reviews.name(), "reviews");

    reviews.rename("critiques")?;
    assert_eq!(reviews.name(), "critiques");
    assert!(reviews.exists()?);
    assert!(!db.exists("reviews")?);

    reviews.drop()?;
    assert_eq!(db.tables()?, vec!["authors".to_string(), "books".to_string()]);
    assert!(matches!(db.table("critiques"), Err(SqliteWrapperError::Table(_))));
    Ok(())
}
