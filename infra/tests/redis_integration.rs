//! Redis-backed cache store integration tests
//!
//! These tests require a live Redis server and are ignored by default:
//!
//! ```sh
//! REDIS_URL=redis://localhost:6379 cargo test -p vg_infra -- --ignored
//! ```

use vg_core::services::CacheStore;
use vg_infra::cache::RedisClient;
use vg_shared::config::CacheConfig;

async fn client() -> RedisClient {
    let config = CacheConfig {
        url: std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string()),
        ..Default::default()
    }
    .with_prefix("vg_test");

    RedisClient::new(config).await.expect("redis should be reachable")
}

#[tokio::test]
#[ignore] // Requires actual Redis server
async fn test_set_get_roundtrip() {
    let client = client().await;

    CacheStore::set(&client, "roundtrip", "value", 60).await.unwrap();
    let value = CacheStore::get(&client, "roundtrip").await.unwrap();
    assert_eq!(value, Some("value".to_string()));

    let deleted = CacheStore::delete(&client, "roundtrip").await.unwrap();
    assert!(deleted);
    let value = CacheStore::get(&client, "roundtrip").await.unwrap();
    assert_eq!(value, None);
}

#[tokio::test]
#[ignore] // Requires actual Redis server
async fn test_delete_reports_missing_keys() {
    let client = client().await;

    let deleted = CacheStore::delete(&client, "never-set").await.unwrap();
    assert!(!deleted);
}

#[tokio::test]
#[ignore] // Requires actual Redis server
async fn test_ttl_is_tracked() {
    let client = client().await;

    CacheStore::set(&client, "with-ttl", "1", 60).await.unwrap();
    let ttl = CacheStore::ttl(&client, "with-ttl").await.unwrap().unwrap();
    assert!(ttl > 0 && ttl <= 60);

    let missing = CacheStore::ttl(&client, "no-such-key").await.unwrap();
    assert_eq!(missing, None);

    CacheStore::delete(&client, "with-ttl").await.unwrap();
}

#[tokio::test]
#[ignore] // Requires actual Redis server
async fn test_health_check() {
    let client = client().await;
    assert!(client.health_check().await.unwrap());
}
