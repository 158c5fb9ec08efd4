//! `CacheStore` implementation backed by the Redis client

use async_trait::async_trait;

use vg_core::services::CacheStore;

use super::redis_client::RedisClient;

#[async_trait]
impl CacheStore for RedisClient {
    async fn get(&self, key: &str) -> Result<Option<String>, String> {
        RedisClient::get(self, &self.make_key(key))
            .await
            .map_err(|e| e.to_string())
    }

    async fn set(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<(), String> {
        self.set_with_expiry(&self.make_key(key), value, ttl_seconds)
            .await
            .map_err(|e| e.to_string())
    }

    async fn delete(&self, key: &str) -> Result<bool, String> {
        RedisClient::delete(self, &self.make_key(key))
            .await
            .map_err(|e| e.to_string())
    }

    async fn exists(&self, key: &str) -> Result<bool, String> {
        RedisClient::exists(self, &self.make_key(key))
            .await
            .map_err(|e| e.to_string())
    }

    async fn ttl(&self, key: &str) -> Result<Option<i64>, String> {
        RedisClient::ttl(self, &self.make_key(key))
            .await
            .map_err(|e| e.to_string())
    }
}
