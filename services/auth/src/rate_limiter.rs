//! Rate limiter for OTP resend requests
//!
//! Windows are kept in memory and, when the limiter has durable storage,
//! mirrored there so the cooldown also holds across separate runs.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use common::DurableStorage;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{info, warn};

/// Prefix of the storage keys holding persisted windows
pub const STORAGE_PREFIX: &str = "rateLimit:";

/// Rate limiter configuration
#[derive(Debug, Clone)]
pub struct RateLimiterConfig {
    /// Maximum number of requests allowed per window
    pub max_attempts: u32,
    /// Length of the window
    pub window: Duration,
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self {
            max_attempts: 1,
            window: Duration::from_secs(30), // OTP resend cooldown
        }
    }
}

/// Rate limiter entry
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RateLimiterEntry {
    /// Number of attempts in the current window
    attempts: u32,
    /// Start of the current window, in milliseconds since the Unix epoch
    window_start_ms: u64,
}

/// Rate limiter keyed by an arbitrary string (user id and mobile number for OTPs)
#[derive(Clone)]
pub struct RateLimiter {
    /// Rate limiter configuration
    config: RateLimiterConfig,
    /// Rate limiter entries
    entries: Arc<Mutex<HashMap<String, RateLimiterEntry>>>,
    /// Where windows are persisted, if anywhere
    storage: Option<Arc<dyn DurableStorage>>,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(RateLimiterConfig::default())
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("config", &self.config)
            .field("persistent", &self.storage.is_some())
            .finish()
    }
}

fn millis(time: SystemTime) -> u64 {
    time.duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

impl RateLimiter {
    /// Create a new in-memory rate limiter
    pub fn new(config: RateLimiterConfig) -> Self {
        Self {
            config,
            entries: Arc::new(Mutex::new(HashMap::new())),
            storage: None,
        }
    }

    /// Create a rate limiter whose windows survive restarts
    pub fn with_storage(config: RateLimiterConfig, storage: Arc<dyn DurableStorage>) -> Self {
        Self {
            storage: Some(storage),
            ..Self::new(config)
        }
    }

    /// Record an attempt for `key`
    ///
    /// Returns the time left before the next attempt is allowed when the
    /// attempt is refused.
    pub async fn check(&self, key: &str) -> Result<(), Duration> {
        self.check_at(key, SystemTime::now()).await
    }

    async fn check_at(&self, key: &str, now: SystemTime) -> Result<(), Duration> {
        let now_ms = millis(now);
        let window_ms = self.config.window.as_millis() as u64;
        let mut entries = self.entries.lock().await;

        let mut entry = match entries.get(key) {
            Some(entry) => *entry,
            None => self.load(key).unwrap_or(RateLimiterEntry {
                attempts: 0,
                window_start_ms: now_ms,
            }),
        };

        // Check if window has expired
        let elapsed_ms = now_ms.saturating_sub(entry.window_start_ms);
        if elapsed_ms >= window_ms {
            entry.attempts = 0;
            entry.window_start_ms = now_ms;
        }

        if entry.attempts >= self.config.max_attempts {
            let wait = Duration::from_millis(window_ms - elapsed_ms);
            info!("Throttled {} for another {} s", key, wait.as_secs());
            entries.insert(key.to_string(), entry);
            return Err(wait);
        }

        if entry.attempts == 0 {
            entry.window_start_ms = now_ms;
        }
        entry.attempts += 1;

        entries.insert(key.to_string(), entry);
        self.store(key, &entry);
        Ok(())
    }

    fn load(&self, key: &str) -> Option<RateLimiterEntry> {
        let storage = self.storage.as_ref()?;
        match storage.get(&format!("{}{}", STORAGE_PREFIX, key)) {
            Ok(raw) => raw.and_then(|raw| serde_json::from_str(&raw).ok()),
            Err(e) => {
                warn!("Failed to read rate limit for {}: {}", key, e);
                None
            }
        }
    }

    fn store(&self, key: &str, entry: &RateLimiterEntry) {
        let Some(storage) = &self.storage else {
            return;
        };
        let written = serde_json::to_string(entry)
            .map_err(common::StorageError::from)
            .and_then(|raw| storage.set(&format!("{}{}", STORAGE_PREFIX, key), &raw));
        if let Err(e) = written {
            warn!("Failed to persist rate limit for {}: {}", key, e);
        }
    }

    /// Forget every attempt recorded for `key`
    pub async fn reset(&self, key: &str) {
        self.entries.lock().await.remove(key);
        if let Some(storage) = &self.storage {
            if let Err(e) = storage.delete(&format!("{}{}", STORAGE_PREFIX, key)) {
                warn!("Failed to clear rate limit for {}: {}", key, e);
            }
        }
    }

    /// Get the rate limiter configuration
    pub fn config(&self) -> &RateLimiterConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::MemoryStorage;

    #[tokio::test]
    async fn test_second_request_waits_for_cooldown() {
        let limiter = RateLimiter::default();
        let start = SystemTime::now();

        assert!(limiter.check_at("7:9876543210", start).await.is_ok());

        let wait = limiter
            .check_at("7:9876543210", start + Duration::from_secs(10))
            .await
            .expect_err("resend inside the cooldown");
        assert_eq!(wait, Duration::from_secs(20));

        assert!(
            limiter
                .check_at("7:9876543210", start + Duration::from_secs(30))
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn test_keys_are_independent_and_resettable() {
        let limiter = RateLimiter::default();
        let now = SystemTime::now();

        assert!(limiter.check_at("a", now).await.is_ok());
        assert!(limiter.check_at("b", now).await.is_ok());
        assert!(limiter.check_at("a", now).await.is_err());

        limiter.reset("a").await;
        assert!(limiter.check_at("a", now).await.is_ok());
    }

    #[tokio::test]
    async fn test_cooldown_survives_a_new_limiter() {
        let storage = MemoryStorage::new();
        let start = SystemTime::now();

        let first = RateLimiter::with_storage(RateLimiterConfig::default(), Arc::new(storage.clone()));
        assert!(first.check_at("7:9876543210", start).await.is_ok());

        // A later run builds a fresh limiter over the same storage
        let second = RateLimiter::with_storage(RateLimiterConfig::default(), Arc::new(storage.clone()));
        let wait = second
            .check_at("7:9876543210", start + Duration::from_secs(5))
            .await
            .expect_err("cooldown carried over");
        assert_eq!(wait, Duration::from_secs(25));

        second.reset("7:9876543210").await;
        assert!(storage.is_empty());
        let third = RateLimiter::with_storage(RateLimiterConfig::default(), Arc::new(storage));
        assert!(third.check_at("7:9876543210", start).await.is_ok());
    }
}
