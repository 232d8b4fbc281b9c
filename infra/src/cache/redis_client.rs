//! Redis client with retry, backoff and bounded per-command deadlines
//!
//! Commands that are safe to repeat go through `execute_with_retry`. The
//! atomic create-if-absent and get-and-delete run exactly once: a retry after
//! an ambiguous failure could report a value the first attempt already took.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use once_cell::sync::Lazy;
use redis::{aio::MultiplexedConnection, AsyncCommands, Client, RedisError, RedisResult, Script};
use tg_shared::config::CacheConfig;
use tg_shared::utils::mask_url;
use tokio::time::{sleep, timeout};
use tracing::{debug, error, info, warn};

use crate::InfrastructureError;

/// Upper bound for the exponential backoff
const MAX_BACKOFF_MS: u64 = 5000;

/// Keys examined per SCAN round trip
const SCAN_BATCH: usize = 500;

/// Read and delete one key in a single server-side step
static GET_AND_DELETE: Lazy<Script> = Lazy::new(|| {
    Script::new(
        r"
        local value = redis.call('GET', KEYS[1])
        if value then
            redis.call('DEL', KEYS[1])
        end
        return value
        ",
    )
});

type RedisFuture<T> = Pin<Box<dyn Future<Output = RedisResult<T>> + Send>>;

/// Redis client over one multiplexed connection
#[derive(Clone)]
pub struct RedisClient {
    connection: MultiplexedConnection,
    config: CacheConfig,
    max_retries: u32,
    retry_delay_ms: u64,
    response_timeout: Duration,
}

impl RedisClient {
    /// Connect using the configured URL, retry policy and timeouts
    pub async fn new(config: CacheConfig) -> Result<Self, InfrastructureError> {
        info!(url = %mask_url(&config.url), "Creating Redis client");

        let client = Client::open(config.url.as_str()).map_err(|e| {
            error!("Failed to parse Redis URL: {}", e);
            InfrastructureError::Config(format!("Invalid Redis URL: {}", e))
        })?;

        let max_retries = config.max_retries.max(1);
        let retry_delay_ms = config.retry_delay_ms;
        let connection = Self::create_connection_with_retry(
            client,
            max_retries,
            retry_delay_ms,
            Duration::from_secs(config.connection_timeout_secs.max(1)),
        )
        .await?;

        info!("Redis client created successfully");

        Ok(Self {
            connection,
            response_timeout: Duration::from_millis(config.response_timeout_ms.max(1)),
            config,
            max_retries,
            retry_delay_ms,
        })
    }

    async fn create_connection_with_retry(
        client: Client,
        max_retries: u32,
        retry_delay_ms: u64,
        connect_timeout: Duration,
    ) -> Result<MultiplexedConnection, InfrastructureError> {
        let mut attempts = 0;
        let mut delay = retry_delay_ms;

        loop {
            attempts += 1;
            debug!("Attempting to connect to Redis (attempt {})", attempts);

            let error = match timeout(connect_timeout, client.get_multiplexed_async_connection())
                .await
            {
                Ok(Ok(connection)) => {
                    info!("Successfully connected to Redis");
                    return Ok(connection);
                }
                Ok(Err(e)) => InfrastructureError::Cache(e),
                Err(_) => InfrastructureError::Timeout {
                    operation: "connect",
                    timeout_ms: connect_timeout.as_millis() as u64,
                },
            };

            if attempts >= max_retries {
                error!("Failed to connect to Redis after {} attempts: {}", attempts, error);
                return Err(error);
            }
            warn!(
                "Failed to connect to Redis (attempt {}/{}): {}. Retrying in {}ms...",
                attempts, max_retries, error, delay
            );
            sleep(Duration::from_millis(delay)).await;
            delay = (delay * 2).min(MAX_BACKOFF_MS);
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Run `operation` once under the response deadline
    async fn execute_once<T>(
        &self,
        operation_name: &'static str,
        operation: RedisFuture<T>,
    ) -> Result<T, InfrastructureError> {
        match timeout(self.response_timeout, operation).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(InfrastructureError::Cache(e)),
            Err(_) => Err(InfrastructureError::Timeout {
                operation: operation_name,
                timeout_ms: self.response_timeout.as_millis() as u64,
            }),
        }
    }

    /// Run an idempotent command, retrying transient failures with backoff
    async fn execute_with_retry<F, T>(
        &self,
        operation_name: &'static str,
        operation: F,
    ) -> Result<T, InfrastructureError>
    where
        F: Fn(MultiplexedConnection) -> RedisFuture<T>,
    {
        let mut attempts = 0;
        let mut delay = self.retry_delay_ms;

        loop {
            attempts += 1;
            let conn = self.connection.clone();

            match self.execute_once(operation_name, operation(conn)).await {
                Ok(result) => return Ok(result),
                Err(e) if attempts < self.max_retries && e.is_retriable() => {
                    warn!(
                        "Redis {} failed (attempt {}/{}): {}. Retrying in {}ms...",
                        operation_name, attempts, self.max_retries, e, delay
                    );
                    sleep(Duration::from_millis(delay)).await;
                    delay = (delay * 2).min(MAX_BACKOFF_MS);
                }
                Err(e) => {
                    error!(
                        "Redis {} failed after {} attempts: {}",
                        operation_name, attempts, e
                    );
                    return Err(e);
                }
            }
        }
    }

    /// `SET key value PX ttl`
    pub async fn set_with_expiry_ms(
        &self,
        key: &str,
        value: &str,
        ttl_ms: u64,
    ) -> Result<(), InfrastructureError> {
        self.execute_with_retry("set", |mut conn| {
            let key = key.to_string();
            let value = value.to_string();
            Box::pin(async move {
                redis::cmd("SET")
                    .arg(key)
                    .arg(value)
                    .arg("PX")
                    .arg(ttl_ms)
                    .query_async::<_, ()>(&mut conn)
                    .await
            })
        })
        .await
    }

    /// `SET key value NX PX ttl`; true when the key was created
    pub async fn set_if_absent_ms(
        &self,
        key: &str,
        value: &str,
        ttl_ms: u64,
    ) -> Result<bool, InfrastructureError> {
        let mut conn = self.connection.clone();
        let key = key.to_string();
        let value = value.to_string();
        let reply: Option<String> = self
            .execute_once(
                "set_nx",
                Box::pin(async move {
                    redis::cmd("SET")
                        .arg(key)
                        .arg(value)
                        .arg("NX")
                        .arg("PX")
                        .arg(ttl_ms)
                        .query_async::<_, Option<String>>(&mut conn)
                        .await
                }),
            )
            .await?;
        Ok(reply.is_some())
    }

    /// Atomic read-and-delete through a Lua script
    pub async fn get_and_delete(&self, key: &str) -> Result<Option<String>, InfrastructureError> {
        let mut conn = self.connection.clone();
        let key = key.to_string();
        self.execute_once(
            "get_and_delete",
            Box::pin(async move {
                GET_AND_DELETE
                    .key(key)
                    .invoke_async::<_, Option<String>>(&mut conn)
                    .await
            }),
        )
        .await
    }

    pub async fn exists(&self, key: &str) -> Result<bool, InfrastructureError> {
        self.execute_with_retry("exists", |mut conn| {
            let key = key.to_string();
            Box::pin(async move { conn.exists::<_, bool>(key).await })
        })
        .await
    }

    /// True if a key was deleted
    pub async fn delete(&self, key: &str) -> Result<bool, InfrastructureError> {
        let deleted: u32 = self
            .execute_with_retry("del", |mut conn| {
                let key = key.to_string();
                Box::pin(async move { conn.del::<_, u32>(key).await })
            })
            .await?;
        Ok(deleted > 0)
    }

    /// Delete every key starting with `prefix` using SCAN, never KEYS
    pub async fn delete_by_prefix(&self, prefix: &str) -> Result<usize, InfrastructureError> {
        let pattern = format!("{}*", escape_glob(prefix));
        let mut cursor: u64 = 0;
        let mut removed = 0usize;

        loop {
            let (next, keys): (u64, Vec<String>) = self
                .execute_with_retry("scan", |mut conn| {
                    let pattern = pattern.clone();
                    Box::pin(async move {
                        redis::cmd("SCAN")
                            .arg(cursor)
                            .arg("MATCH")
                            .arg(pattern)
                            .arg("COUNT")
                            .arg(SCAN_BATCH)
                            .query_async::<_, (u64, Vec<String>)>(&mut conn)
                            .await
                    })
                })
                .await?;

            if !keys.is_empty() {
                let deleted: usize = self
                    .execute_with_retry("del", |mut conn| {
                        let keys = keys.clone();
                        Box::pin(async move { conn.del::<_, usize>(keys).await })
                    })
                    .await?;
                removed += deleted;
            }

            if next == 0 {
                break;
            }
            cursor = next;
        }

        debug!(removed, "Deleted keys by prefix");
        Ok(removed)
    }

    /// `PING`; true on `PONG`
    pub async fn health_check(&self) -> Result<bool, InfrastructureError> {
        let response: String = self
            .execute_with_retry("ping", |mut conn| {
                Box::pin(async move {
                    redis::cmd("PING")
                        .query_async::<_, String>(&mut conn)
                        .await
                })
            })
            .await?;

        if response == "PONG" {
            debug!("Redis health check passed");
            Ok(true)
        } else {
            warn!("Redis health check returned unexpected response: {}", response);
            Ok(false)
        }
    }

    /// Remaining TTL in milliseconds; `None` for missing or persistent keys
    pub async fn ttl_ms(&self, key: &str) -> Result<Option<u64>, InfrastructureError> {
        let ttl: i64 = self
            .execute_with_retry("pttl", |mut conn| {
                let key = key.to_string();
                Box::pin(async move { conn.pttl::<_, i64>(key).await })
            })
            .await?;
        Ok(u64::try_from(ttl).ok())
    }
}

/// Whether a Redis error is transient
pub(crate) fn is_retriable_error(error: &RedisError) -> bool {
    matches!(
        error.kind(),
        redis::ErrorKind::IoError
            | redis::ErrorKind::ClientError
            | redis::ErrorKind::BusyLoadingError
            | redis::ErrorKind::TryAgain
    )
}

/// Escape glob metacharacters so a key prefix matches literally in SCAN
pub(crate) fn escape_glob(prefix: &str) -> String {
    let mut escaped = String::with_capacity(prefix.len());
    for c in prefix.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
