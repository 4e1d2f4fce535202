use sqlite_wrapper::prelude::*;
use tempfile::tempdir;

fn unique_db_path(prefix: &str) -> String {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join(prefix);
    // Leak the tempdir so the file persists for the duration of the test binary.
    std::mem::forget(dir);
    path.to_string_lossy().into_owned()
}

fn names(get: &GetRow<'_>) -> Result<Vec<Value>, SqliteWrapperError> {
    Ok(get.sort(["id"]).asc()?.run()?.into_values())
}

fn users_scenario(db: &Database) -> Result<(), Box<dyn std::error::Error>> {
    let users = db
        .create(
            "users",
            [
                ("id", ColumnSpec::autoincrement()),
                ("name", ColumnSpec::not_null(BaseType::Text)),
            ],
            false,
        )?
        .run()?;
    users.add([("name", "a")])?.run()?;
    users.add([("name", "b")])?.run()?;

    let id = users.get(["id"]).where_("name")?.eq("b")?.run()?;
    assert_eq!(id, Fetched::Value(Value::Integer(2)));

    let names = users.get_all(["name"]).sort(["id"]).desc()?.run()?;
    assert_eq!(
        names,
        Fetched::Values(vec![Value::from("b"), Value::from("a")])
    );

    let missing = users.get(["id"]).where_("name")?.eq("zed")?.run()?;
    assert!(missing.is_no_row());
    assert!(missing.is_empty());

    let everyone = users.get_all(Vec::<String>::new()).run()?.into_rows();
    assert_eq!(everyone.len(), 2);
    let first = &everyone[0];
    assert_eq!(first.get("name"), Some(&Value::from("a")));
    assert_eq!(first.column_names(), &["id".to_string(), "name".to_string()]);
    assert_eq!(first.len(), 2);
    assert!(!first.is_empty());
    assert_eq!(first.values(), &[Value::Integer(1), Value::from("a")]);
    assert_eq!(first.clone().into_values(), vec![Value::Integer(1), Value::from("a")]);
    assert_eq!(users.rows()?, 2);
    Ok(())
}

#[test]
fn users_inline() -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open(unique_db_path("inline"))?;
    assert_eq!(db.name(), "inline");
    assert!(db.path().ends_with("inline.db"));
    users_scenario(&db)?;
    db.close(false)?;
    Ok(())
}

#[test]
fn users_on_worker_thread() -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::builder(unique_db_path("worker"))
        .separate_thread(true)
        .open()?;
    users_scenario(&db)?;
    assert_eq!(db.queue(), 0);
    db.close(false)?;
    assert!(!db.is_alive());
    Ok(())
}

#[test]
fn update_forms_round_trip() -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open(":memory:")?;
    let counters = db
        .create(
            "counters",
            [
                ("name", ColumnSpec::primary(BaseType::Text)),
                ("hits", ColumnSpec::default(0)),
                ("label", ColumnSpec::nullable(BaseType::Text)),
            ],
            false,
        )?
        .run()?;
    counters.add([("name", "home")])?.and_add("label", "x").run()?;

    counters
        .set([("hits", SetValue::increment(3))])?
        .and_set("label", SetValue::concatenate("yz"))?
        .where_("name")?
        .eq("home")?
        .run()?;
    let row = counters
        .get(["hits", "label"])
        .where_("name")?
        .eq("home")?
        .run()?
        .into_row()
        .ok_or("row missing")?;
    assert_eq!(row.get("hits"), Some(&Value::Integer(3)));
    assert_eq!(row.get("label"), Some(&Value::from("xyz")));

    counters
        .set([("label", SetValue::Null)])?
        .where_("name")?
        .eq("home")?
        .run()?;
    let label = counters.get(["label"]).run()?.into_value();
    assert_eq!(label, Some(Value::Null));

    counters.remove().where_("hits")?.gt(1)?.run()?;
    assert_eq!(counters.rows()?, 0);

    // a repeated column keeps its last value
    counters.add([("name", "first")])?.and_add("name", "second").run()?;
    assert_eq!(
        counters.get(["name"]).run()?.into_value(),
        Some(Value::from("second"))
    );
    Ok(())
}

#[test]
fn filters_against_real_rows() -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open(":memory:")?;
    let people = db
        .create(
            "people",
            [
                ("id", ColumnSpec::autoincrement()),
                ("name", ColumnSpec::not_null(BaseType::Text)),
                ("age", ColumnSpec::nullable(BaseType::Integer)),
            ],
            false,
        )?
        .run()?;
    for (name, age) in [("ada", Some(36)), ("bob", None), ("cy", Some(17)), ("adam", Some(50))] {
        people.add([("name", Value::from(name)), ("age", Value::from(age))])?.run()?;
    }

    let base = people.get_all(["name"]);

    assert_eq!(
        names(&base.where_("name")?.starts_with("ad")?)?,
        vec![Value::from("ada"), Value::from("adam")]
    );
    assert_eq!(
        names(&base.where_("age")?.is_null()?)?,
        vec![Value::from("bob")]
    );
    assert_eq!(
        names(&base.where_("age")?.gteq(18)?.and("name")?.not_contains("m")?)?,
        vec![Value::from("ada")]
    );
    assert_eq!(
        names(&base.where_("id")?.is_in([1, 3])?.or("name")?.eq("bob")?)?,
        vec![Value::from("ada"), Value::from("bob"), Value::from("cy")]
    );
    assert_eq!(
        names(&base.where_("name")?.not_in(["ada", "bob"])?)?,
        vec![Value::from("cy"), Value::from("adam")]
    );

    let oldest = people
        .get_all(["name"])
        .where_("age")?
        .is_not_null()?
        .sort(["age"])
        .limit(1)?
        .run()?;
    assert_eq!(oldest, Fetched::Values(vec![Value::from("adam")]));
    Ok(())
}

#[test]
fn statements_render_with_literals() -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open(":memory:")?;
    let notes = db
        .create("notes", [("body", BaseType::Text)], false)?
        .run()?;
    let get = notes.get(["body"]).where_("body")?.eq("it's")?;
    assert_eq!(get.query().sql(), "SELECT body FROM notes WHERE body = ?");
    assert_eq!(
        get.query().to_string(),
        "SELECT body FROM notes WHERE body = 'it''s'"
    );

    // bound, not interpolated
    notes.add([("body", "x'); DROP TABLE notes; --")])?.run()?;
    assert!(notes.exists()?);
    assert_eq!(notes.rows()?, 1);
    Ok(())
}
