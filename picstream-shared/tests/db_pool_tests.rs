/// Integration tests for the database connection pool
///
/// File databases live in a temporary directory; nothing outside it is
/// touched.

use picstream_shared::db::pool::{
    close_pool, create_pool, get_pool_stats, health_check, DatabaseConfig,
};
use sqlx::Row;
use tempfile::TempDir;

fn file_config(dir: &TempDir, max_connections: u32) -> DatabaseConfig {
    DatabaseConfig {
        url: format!("sqlite://{}", dir.path().join("pool.db").display()),
        max_connections,
        ..Default::default()
    }
}

#[tokio::test]
async fn test_create_file_pool() {
    let dir = TempDir::new().unwrap();
    let pool = create_pool(file_config(&dir, 5)).await.unwrap();

    assert!(dir.path().join("pool.db").exists(), "database file should be created");
    assert!(get_pool_stats(&pool).total_connections > 0);

    let journal: String = sqlx::query_scalar("PRAGMA journal_mode")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(journal.to_lowercase(), "wal");

    close_pool(pool).await;
}

#[tokio::test]
async fn test_create_pool_with_invalid_url() {
    let config = DatabaseConfig {
        url: "sqlite:///nonexistent-picstream-dir/missing/pool.db".to_string(),
        connect_timeout_seconds: 2,
        ..Default::default()
    };

    assert!(create_pool(config).await.is_err());
}

#[tokio::test]
async fn test_foreign_keys_enforced() {
    let pool = create_pool(DatabaseConfig::in_memory()).await.unwrap();

    let enabled: i64 = sqlx::query_scalar("PRAGMA foreign_keys")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(enabled, 1);
}

#[tokio::test]
async fn test_in_memory_pool_keeps_data() {
    let pool = create_pool(DatabaseConfig::in_memory()).await.unwrap();

    sqlx::query("CREATE TABLE t (v INTEGER)")
        .execute(&pool)
        .await
        .unwrap();
    sqlx::query("INSERT INTO t (v) VALUES (42)")
        .execute(&pool)
        .await
        .unwrap();

    // A later acquire must see the same database
    let row = sqlx::query("SELECT v FROM t").fetch_one(&pool).await.unwrap();
    let value: i64 = row.get("v");
    assert_eq!(value, 42);

    health_check(&pool).await.unwrap();
}

#[tokio::test]
async fn test_pool_concurrent_queries() {
    let dir = TempDir::new().unwrap();
    let pool = create_pool(file_config(&dir, 4)).await.unwrap();

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let pool = pool.clone();
            tokio::spawn(async move {
                let value: i64 = sqlx::query_scalar("SELECT ?")
                    .bind(i as i64)
                    .fetch_one(&pool)
                    .await
                    .unwrap();
                value
            })
        })
        .collect();

    let mut total = 0;
    for handle in handles {
        total += handle.await.unwrap();
    }
    assert_eq!(total, (0..8).sum::<i64>());

    let stats = get_pool_stats(&pool);
    assert!(stats.total_connections <= 4);

    close_pool(pool).await;
}

#[tokio::test]
async fn test_pool_transaction_rollback() {
    let pool = create_pool(DatabaseConfig::in_memory()).await.unwrap();
    sqlx::query("CREATE TABLE t (v INTEGER)")
        .execute(&pool)
        .await
        .unwrap();

    let mut tx = pool.begin().await.unwrap();
    sqlx::query("INSERT INTO t (v) VALUES (1)")
        .execute(&mut *tx)
        .await
        .unwrap();
    tx.rollback().await.unwrap();

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM t")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
async fn test_close_pool() {
    let pool = create_pool(DatabaseConfig::in_memory()).await.unwrap();
    let handle = pool.clone();

    close_pool(pool).await;

    assert!(handle.is_closed());
    assert!(health_check(&handle).await.is_err());
}
