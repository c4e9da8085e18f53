//! Human-readable sequence codes backed by an atomic counter store.
//!
//! A code looks like `RD-170326-007`: a two-letter category, the day as
//! `DDMMYY`, and the per-day sequence number. Counters live under
//! `{prefix}:{YYYY-MM-DD}:{category}` and expire after two days.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use dashmap::DashMap;
use std::sync::Arc;
use tracing::{debug, error};
use uuid::Uuid;

use crate::entities::material::MaterialType;
use crate::errors::ServiceError;

pub const COUNTER_TTL_SECS: u64 = 172_800;

const REQUEST_COUNTER_PREFIX: &str = "request_counter";
const MATERIAL_COUNTER_PREFIX: &str = "material_counter";

pub const CATEGORY_CUSTOMER: &str = "CUSTOMER";
pub const CATEGORY_OTHER: &str = "OTHER";
pub const CATEGORY_DEFAULT: &str = "DEFAULT";

/// Atomic increment-and-expire counter.
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Increments `key`, (re)sets its expiry and returns the new value.
    async fn increment(&self, key: &str, ttl_secs: u64) -> Result<i64, ServiceError>;
}

/// Redis `INCR` + `EXPIRE` in one MULTI block.
#[derive(Clone)]
pub struct RedisCounterStore {
    client: Arc<redis::Client>,
}

impl RedisCounterStore {
    pub fn new(client: Arc<redis::Client>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CounterStore for RedisCounterStore {
    async fn increment(&self, key: &str, ttl_secs: u64) -> Result<i64, ServiceError> {
        let mut conn = self.client.get_async_connection().await?;
        let (value,): (i64,) = redis::pipe()
            .atomic()
            .cmd("INCR")
            .arg(key)
            .cmd("EXPIRE")
            .arg(key)
            .arg(ttl_secs)
            .ignore()
            .query_async(&mut conn)
            .await?;
        Ok(value)
    }
}

/// Process-local counters. Expiry is not enforced.
#[derive(Debug, Default, Clone)]
pub struct InMemoryCounterStore {
    counters: Arc<DashMap<String, i64>>,
}

impl InMemoryCounterStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CounterStore for InMemoryCounterStore {
    async fn increment(&self, key: &str, _ttl_secs: u64) -> Result<i64, ServiceError> {
        let mut entry = self.counters.entry(key.to_string()).or_insert(0);
        *entry += 1;
        Ok(*entry)
    }
}

/// Two-letter code for a request category.
pub fn request_category_code(category: &str) -> &'static str {
    match category {
        CATEGORY_CUSTOMER => "RD",
        CATEGORY_OTHER => "SA",
        _ => "OT",
    }
}

/// Category a request falls into, derived from what it references.
pub fn request_category(
    customer_id: Option<Uuid>,
    source_other_id: Option<Uuid>,
) -> &'static str {
    if customer_id.is_some() {
        CATEGORY_CUSTOMER
    } else if source_other_id.is_some() {
        CATEGORY_OTHER
    } else {
        CATEGORY_DEFAULT
    }
}

pub fn format_code(code: &str, day: NaiveDate, sequence: i64) -> String {
    format!("{}-{}-{:03}", code, day.format("%d%m%y"), sequence)
}

#[derive(Clone)]
pub struct CodeGenerator {
    store: Arc<dyn CounterStore>,
}

impl CodeGenerator {
    pub fn new(store: Arc<dyn CounterStore>) -> Self {
        Self { store }
    }

    async fn next(&self, prefix: &str, code: &str, day: NaiveDate) -> Result<String, ServiceError> {
        let key = format!("{}:{}:{}", prefix, day.format("%Y-%m-%d"), code);
        let sequence = self
            .store
            .increment(&key, COUNTER_TTL_SECS)
            .await
            .map_err(|e| {
                error!(%key, error = %e, "counter store unavailable");
                metrics::counter!("mfg_codes.failures", 1);
                match e {
                    ServiceError::CacheError(_) => e,
                    other => ServiceError::CacheError(other.to_string()),
                }
            })?;

        let generated = format_code(code, day, sequence);
        debug!(%key, %generated, "code generated");
        metrics::counter!("mfg_codes.generated", 1);
        Ok(generated)
    }

    pub async fn generate_request_code(&self, category: &str) -> Result<String, ServiceError> {
        self.generate_request_code_on(category, Utc::now().date_naive())
            .await
    }

    pub async fn generate_request_code_on(
        &self,
        category: &str,
        day: NaiveDate,
    ) -> Result<String, ServiceError> {
        self.next(REQUEST_COUNTER_PREFIX, request_category_code(category), day)
            .await
    }

    pub async fn generate_material_code(
        &self,
        material_type: MaterialType,
    ) -> Result<String, ServiceError> {
        self.next(
            MATERIAL_COUNTER_PREFIX,
            material_type.code_prefix(),
            Utc::now().date_naive(),
        )
        .await
    }
}
