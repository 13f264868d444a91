//! Best-effort redis memoization for similarity results and network
//! statistics.
//!
//! Keys carry the snapshot version, so a pool update naturally invalidates
//! every cached result. The core stays correct with caching entirely
//! absent: every redis failure is logged at warn and treated as a miss.

use redis::AsyncCommands;
use serde::{de::DeserializeOwned, Serialize};
use tracing::warn;

const TTL_SECS: u64 = 600;

/// Cache key for one operation over one snapshot version.
pub fn key(operation: &str, snapshot_version: u64, input: &str) -> String {
    format!("rolodex:{operation}:v{snapshot_version}:{input}")
}

pub async fn get<T: DeserializeOwned>(client: &redis::Client, key: &str) -> Option<T> {
    let mut conn = match client.get_multiplexed_async_connection().await {
        Ok(c) => c,
        Err(e) => {
            warn!("cache unavailable, treating as miss: {e}");
            return None;
        }
    };
    let raw: Option<String> = match conn.get(key).await {
        Ok(v) => v,
        Err(e) => {
            warn!("cache read failed for {key}: {e}");
            return None;
        }
    };
    raw.and_then(|s| serde_json::from_str(&s).ok())
}

pub async fn put<T: Serialize>(client: &redis::Client, key: &str, value: &T) {
    let payload = match serde_json::to_string(value) {
        Ok(p) => p,
        Err(e) => {
            warn!("cache serialization failed for {key}: {e}");
            return;
        }
    };
    let mut conn = match client.get_multiplexed_async_connection().await {
        Ok(c) => c,
        Err(e) => {
            warn!("cache unavailable, skipping write: {e}");
            return;
        }
    };
    if let Err(e) = conn.set_ex::<_, _, ()>(key, payload, TTL_SECS).await {
        warn!("cache write failed for {key}: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_includes_version_and_operation() {
        let k = key("similar", 7, "abc");
        assert!(k.contains(":v7:"));
        assert!(k.starts_with("rolodex:similar:"));
    }

    #[test]
    fn test_distinct_versions_produce_distinct_keys() {
        assert_ne!(key("similar", 1, "x"), key("similar", 2, "x"));
    }

    #[test]
    fn test_distinct_operations_produce_distinct_keys() {
        assert_ne!(key("similar", 1, "all"), key("network_stats", 1, "all"));
    }
}
