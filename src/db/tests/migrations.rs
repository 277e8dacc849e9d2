use crate::db::Database;
use tempfile::NamedTempFile;

#[tokio::test]
async fn test_new_creates_schema() {
    let temp_file = NamedTempFile::new().unwrap();
    let db = Database::new(temp_file.path()).await.unwrap();

    // Schema is usable right away
    assert_eq!(db.count_items().await.unwrap(), 0);

    // Migration was recorded
    let version: i64 = sqlx::query_scalar("SELECT MAX(version) FROM schema_version")
        .fetch_one(db.pool())
        .await
        .unwrap();
    assert_eq!(version, 1);

    db.close().await;
}

#[tokio::test]
async fn test_reopen_is_idempotent() {
    let temp_file = NamedTempFile::new().unwrap();
    let db_path = temp_file.path();

    let db = Database::new(db_path).await.unwrap();
    db.insert_item(1.into(), "{}").await.unwrap();
    db.close().await;

    // Second startup against the same file must not re-run migrations
    // or disturb existing rows
    let db = Database::new(db_path).await.unwrap();
    assert_eq!(db.count_items().await.unwrap(), 1);

    let versions: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM schema_version")
        .fetch_one(db.pool())
        .await
        .unwrap();
    assert_eq!(versions, 1);

    db.close().await;
}

#[tokio::test]
async fn test_new_creates_parent_directory() {
    let temp_dir = tempfile::tempdir().unwrap();
    let db_path = temp_dir.path().join("nested").join("mirror.db");

    let db = Database::new(&db_path).await.unwrap();
    assert_eq!(db.count_items().await.unwrap(), 0);
    assert!(db_path.exists());

    db.close().await;
}
