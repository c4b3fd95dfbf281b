use chrono::Duration;
use quiz_core::model::{AttemptId, NewAttempt, sort_newest_first};
use quiz_core::time::fixed_now;
use storage::Storage;
use storage::repository::{AttemptRepository, StorageError};
use storage::sqlite::SqliteRepository;

async fn connect(name: &str) -> SqliteRepository {
    let url = format!("sqlite:file:{name}?mode=memory&cache=shared");
    let repo = SqliteRepository::connect(&url).await.expect("connect");
    repo.migrate().await.expect("migrate");
    repo
}

#[tokio::test]
async fn sqlite_roundtrip_persists_attempts() {
    let repo = connect("memdb_attempt_roundtrip").await;
    let now = fixed_now();

    let first = repo
        .append_attempt(&NewAttempt::new(7, 10, now).unwrap())
        .await
        .expect("append");
    let second = repo
        .append_attempt(&NewAttempt::new(10, 10, now + Duration::minutes(2)).unwrap())
        .await
        .expect("append");
    assert!(second.id() > first.id());

    let mut listed = repo.list_attempts().await.expect("list");
    assert_eq!(listed.len(), 2);
    sort_newest_first(&mut listed);
    assert_eq!(listed[0], second);
    assert_eq!(listed[1], first);
    assert_eq!(listed[1].timestamp(), now);
    assert_eq!(listed[1].total_questions(), 10);
}

#[tokio::test]
async fn open_configures_connections_and_schema() {
    let repo = SqliteRepository::open("sqlite:file:memdb_attempt_open?mode=memory&cache=shared")
        .await
        .expect("open");

    let busy: i64 = sqlx::query_scalar("PRAGMA busy_timeout")
        .fetch_one(repo.pool())
        .await
        .expect("busy_timeout");
    assert_eq!(busy, 5000);
    let synchronous: i64 = sqlx::query_scalar("PRAGMA synchronous")
        .fetch_one(repo.pool())
        .await
        .expect("synchronous");
    assert_eq!(synchronous, 1);

    assert!(repo.list_attempts().await.expect("list").is_empty());
}

#[tokio::test]
async fn sqlite_migrations_are_idempotent() {
    let repo = connect("memdb_attempt_migrate_twice").await;
    repo.append_attempt(&NewAttempt::new(1, 10, fixed_now()).unwrap())
        .await
        .unwrap();

    repo.migrate().await.expect("second migrate");
    assert_eq!(repo.list_attempts().await.unwrap().len(), 1);
}

#[tokio::test]
async fn sqlite_never_reuses_ids() {
    let repo = connect("memdb_attempt_autoincrement").await;
    let first = repo
        .append_attempt(&NewAttempt::new(1, 10, fixed_now()).unwrap())
        .await
        .unwrap();
    sqlx::query("DELETE FROM quiz_attempts WHERE id = ?1")
        .bind(first.id().value())
        .execute(repo.pool())
        .await
        .unwrap();

    let second = repo
        .append_attempt(&NewAttempt::new(2, 10, fixed_now()).unwrap())
        .await
        .unwrap();
    assert!(second.id() > first.id());
}

#[tokio::test]
async fn sqlite_rejects_corrupt_rows_on_read() {
    let repo = connect("memdb_attempt_corrupt").await;
    sqlx::query(
        "INSERT INTO quiz_attempts (score, total_questions, completed_at) VALUES (1, 10, 'not-a-date')",
    )
    .execute(repo.pool())
    .await
    .unwrap();

    let err = repo.list_attempts().await.unwrap_err();
    assert!(matches!(err, StorageError::Serialization(_)));
}

#[tokio::test]
async fn storage_sqlite_builds_attempt_repository() {
    let storage = Storage::sqlite("sqlite:file:memdb_attempt_storage?mode=memory&cache=shared")
        .await
        .expect("storage");
    let record = storage
        .attempts
        .append_attempt(&NewAttempt::new(5, 10, fixed_now()).unwrap())
        .await
        .unwrap();
    assert_eq!(record.id(), AttemptId::new(1));
}
