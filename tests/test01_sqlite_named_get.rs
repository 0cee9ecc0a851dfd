#![cfg(feature = "sqlite")]

use serde::Deserialize;
use sql_named_ext::prelude::*;

async fn seeded() -> Result<SqliteExecutor, SqlNamedError> {
    let db = SqliteExecutor::open_in_memory().await?;
    db.execute_batch(
        "CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT NOT NULL, age INTEGER, active INTEGER NOT NULL);
         INSERT INTO users (id, name, age, active) VALUES
            (1, 'alice', 31, 1),
            (2, 'bob', NULL, 0),
            (3, 'carol', 31, 1);",
    )
    .await?;
    Ok(db)
}

#[derive(Debug, Deserialize, PartialEq)]
struct User {
    id: i64,
    name: String,
    age: Option<i64>,
}

#[tokio::test]
async fn named_get_scans_scalar_tuple_and_record() -> Result<(), SqlNamedError> {
    let db = seeded().await?;
    let ctx = ExecContext::new();
    let by_id = named_params! { "id" => 2 };

    let mut name = String::new();
    named_get(&ctx, &db, &mut name, "SELECT name FROM users WHERE id = :id", Some(&by_id)).await?;
    assert_eq!(name, "bob");

    let mut pair: (String, Option<i64>) = (String::new(), Some(0));
    named_get(
        &ctx,
        &db,
        &mut pair,
        "SELECT name, age FROM users WHERE id = :id",
        Some(&by_id),
    )
    .await?;
    assert_eq!(pair, ("bob".to_string(), None));

    let mut user = Record(User { id: 0, name: String::new(), age: None });
    named_get(
        &ctx,
        &db,
        &mut user,
        "SELECT id, name, age FROM users WHERE id = :id",
        Some(&named_params! { "id" => 1 }),
    )
    .await?;
    assert_eq!(user.0, User { id: 1, name: "alice".into(), age: Some(31) });
    Ok(())
}

#[tokio::test]
async fn named_get_without_params() -> Result<(), SqlNamedError> {
    let db = seeded().await?;
    let ctx = ExecContext::new();

    let mut count = 0_i64;
    named_get(&ctx, &db, &mut count, "SELECT COUNT(*) FROM users", None).await?;
    assert_eq!(count, 3);
    Ok(())
}

#[tokio::test]
async fn named_get_zero_rows_is_no_rows() -> Result<(), SqlNamedError> {
    let db = seeded().await?;
    let ctx = ExecContext::new();

    let mut name = String::from("untouched");
    let err = named_get(
        &ctx,
        &db,
        &mut name,
        "SELECT name FROM users WHERE id = :id",
        Some(&named_params! { "id" => 99 }),
    )
    .await
    .unwrap_err();
    assert!(err.is_no_rows(), "{err}");
    assert_eq!(name, "untouched");
    Ok(())
}

#[tokio::test]
async fn named_get_many_rows_is_row_count_error() -> Result<(), SqlNamedError> {
    let db = seeded().await?;
    let ctx = ExecContext::new();

    let mut name = String::new();
    let err = named_get(
        &ctx,
        &db,
        &mut name,
        "SELECT name FROM users WHERE age = :age",
        Some(&named_params! { "age" => 31 }),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, SqlNamedError::TooManyRows(2)), "{err}");
    assert!(name.is_empty());
    Ok(())
}

#[tokio::test]
async fn named_get_shape_mismatch_is_scan_error() -> Result<(), SqlNamedError> {
    let db = seeded().await?;
    let ctx = ExecContext::new();

    let mut id = 0_i64;
    let err = named_get(
        &ctx,
        &db,
        &mut id,
        "SELECT id, name FROM users WHERE id = :id",
        Some(&named_params! { "id" => 1 }),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, SqlNamedError::ScanError(_)), "{err}");
    Ok(())
}

#[tokio::test]
async fn named_get_unknown_name_is_bind_error() -> Result<(), SqlNamedError> {
    let db = seeded().await?;
    let ctx = ExecContext::new();

    let mut name = String::new();
    let err = named_get(
        &ctx,
        &db,
        &mut name,
        "SELECT name FROM users WHERE id = :user_id",
        Some(&named_params! { "id" => 1 }),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, SqlNamedError::BindError(ref m) if m.contains("user_id")));
    Ok(())
}

#[derive(Debug, Deserialize, PartialEq)]
struct Status {
    name: String,
    active: bool,
}

#[tokio::test]
async fn booleans_scan_the_same_as_scalar_and_record() -> Result<(), SqlNamedError> {
    let db = seeded().await?;
    let ctx = ExecContext::new();
    exec_sql_for_rows(
        &ctx,
        &db,
        None,
        "UPDATE users SET active = :active WHERE id = :id",
        Some(&named_params! { "active" => true, "id" => 2 }),
    )
    .await?;

    let query = "SELECT name, active FROM users WHERE id = :id";
    let by_id = named_params! { "id" => 2 };

    let mut active = false;
    named_get(&ctx, &db, &mut active, "SELECT active FROM users WHERE id = :id", Some(&by_id))
        .await?;
    assert!(active);

    let mut status = Record(Status { name: String::new(), active: false });
    named_get(&ctx, &db, &mut status, query, Some(&by_id)).await?;
    assert_eq!(status.into_inner(), Status { name: "bob".into(), active: true });

    let mut all: Vec<Record<Status>> = Vec::new();
    named_select(&ctx, &db, Some(&mut all), "SELECT name, active FROM users ORDER BY id", None)
        .await?;
    let flags: Vec<bool> = all.iter().map(|s| s.active).collect();
    assert_eq!(flags, vec![true, true, true]);
    Ok(())
}
