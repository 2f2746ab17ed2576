//! Resource synchronization.
//!
//! Applies an authenticated notification to the entity store. Each entity is
//! either absent or present, keyed by its Shopify id:
//!
//! ```text
//! create  absent  → present        present → per DuplicatePolicy
//! update  absent  → create         present → overwrite
//! delete  present → absent         absent  → no-op
//! ```
//!
//! A null id marks a test notification and never touches the store. Every
//! notification runs in its own transaction.

pub mod customer;
pub mod payload;
pub mod shop;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::info;

use crate::config::DuplicatePolicy;
use crate::store::Database;
use crate::topic::Topic;

pub use payload::{split_tags, AddressPayload, CustomerPayload, ShopPayload};

/// What a notification did to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Null id; nothing written.
    TestNotification,
    Created,
    Updated,
    /// Create for a stored customer under [`DuplicatePolicy::Ignore`].
    Duplicate,
    Deleted,
    /// Delete for an id that is not stored.
    Absent,
    /// Topic without a synchronizer.
    Ignored,
}

impl SyncOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            SyncOutcome::TestNotification => "test_notification",
            SyncOutcome::Created => "created",
            SyncOutcome::Updated => "updated",
            SyncOutcome::Duplicate => "duplicate",
            SyncOutcome::Deleted => "deleted",
            SyncOutcome::Absent => "absent",
            SyncOutcome::Ignored => "ignored",
        }
    }
}

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("malformed payload: {0}")]
    Payload(#[from] serde_json::Error),

    #[error("invalid timestamp in {field}: {source}")]
    Timestamp {
        field: &'static str,
        source: chrono::ParseError,
    },

    #[error("invalid decimal in {field}: {source}")]
    Decimal {
        field: &'static str,
        source: rust_decimal::Error,
    },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl SyncError {
    /// `true` when re-sending the same payload can never succeed.
    pub fn is_payload_error(&self) -> bool {
        !matches!(self, SyncError::Database(_))
    }
}

/// Applies notifications to the entity store.
#[derive(Clone)]
pub struct Synchronizer {
    db: Database,
    duplicate_policy: DuplicatePolicy,
}

impl Synchronizer {
    pub fn new(db: Database, duplicate_policy: DuplicatePolicy) -> Self {
        Self {
            db,
            duplicate_policy,
        }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Apply the notification `body` received for `topic`.
    pub async fn apply(&self, topic: Topic, body: &[u8]) -> Result<SyncOutcome, SyncError> {
        let outcome = match topic {
            Topic::CustomerCreate => {
                let payload: CustomerPayload = parse(body)?;
                let mut tx = self.db.pool().begin().await?;
                let outcome = customer::create(&mut *tx, &payload, self.duplicate_policy).await?;
                tx.commit().await?;
                outcome
            }
            Topic::CustomerUpdate | Topic::CustomerEnable | Topic::CustomerDisable => {
                let payload: CustomerPayload = parse(body)?;
                let mut tx = self.db.pool().begin().await?;
                let outcome = customer::update(&mut *tx, &payload).await?;
                tx.commit().await?;
                outcome
            }
            Topic::CustomerDelete => {
                let payload: CustomerPayload = parse(body)?;
                let mut tx = self.db.pool().begin().await?;
                let outcome = customer::delete(&mut *tx, &payload).await?;
                tx.commit().await?;
                outcome
            }
            Topic::ShopUpdate => {
                let payload: ShopPayload = parse(body)?;
                let mut tx = self.db.pool().begin().await?;
                let outcome = shop::update(&mut *tx, &payload).await?;
                tx.commit().await?;
                outcome
            }
            _ => SyncOutcome::Ignored,
        };

        info!(topic = %topic, outcome = outcome.as_str(), "shopify_sync_applied");

        Ok(outcome)
    }
}

fn parse<T: DeserializeOwned>(body: &[u8]) -> Result<T, SyncError> {
    Ok(serde_json::from_slice(body)?)
}

/// Parse an optional RFC 3339 timestamp such as `2015-05-27T19:12:18+01:00`.
pub(crate) fn parse_timestamp(
    field: &'static str,
    raw: Option<&str>,
) -> Result<Option<DateTime<Utc>>, SyncError> {
    raw.map(|s| {
        DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|source| SyncError::Timestamp { field, source })
    })
    .transpose()
}

pub(crate) fn parse_decimal(field: &'static str, raw: &str) -> Result<Decimal, SyncError> {
    raw.trim()
        .parse::<Decimal>()
        .map_err(|source| SyncError::Decimal { field, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{customers, memory_database, shops};

    async fn synchronizer() -> Synchronizer {
        Synchronizer::new(memory_database().await, DuplicatePolicy::Ignore)
    }

    #[test]
    fn test_parse_timestamp_converts_to_utc() {
        let parsed = parse_timestamp("created_at", Some("2015-05-27T19:12:18+01:00"))
            .unwrap()
            .unwrap();
        assert_eq!(parsed.to_rfc3339(), "2015-05-27T18:12:18+00:00");
        assert_eq!(parse_timestamp("created_at", None).unwrap(), None);
    }

    #[test]
    fn test_parse_timestamp_rejects_garbage() {
        let err = parse_timestamp("updated_at", Some("yesterday")).unwrap_err();
        assert!(matches!(err, SyncError::Timestamp { field: "updated_at", .. }));
        assert!(err.is_payload_error());
    }

    #[test]
    fn test_parse_decimal_is_exact() {
        let total = parse_decimal("total_spent", "1024.10").unwrap();
        assert_eq!(total.to_string(), "1024.10");
        assert!(parse_decimal("total_spent", "lots").is_err());
    }

    #[tokio::test]
    async fn test_unimplemented_topics_are_ignored() {
        let sync = synchronizer().await;
        for topic in [Topic::OrderCreate, Topic::ProductDelete, Topic::RefundCreate] {
            // Body is not even parsed for these topics.
            let outcome = sync.apply(topic, b"not json").await.unwrap();
            assert_eq!(outcome, SyncOutcome::Ignored);
        }
    }

    #[tokio::test]
    async fn test_malformed_json_is_a_payload_error() {
        let sync = synchronizer().await;
        let err = sync.apply(Topic::CustomerCreate, b"{\"id\": ").await.unwrap_err();
        assert!(matches!(err, SyncError::Payload(_)));
        assert!(err.is_payload_error());
    }

    #[tokio::test]
    async fn test_apply_routes_customer_and_shop_topics() {
        let sync = synchronizer().await;

        let created = sync
            .apply(Topic::CustomerCreate, br#"{"id":1,"tags":"a, b"}"#)
            .await
            .unwrap();
        let updated = sync
            .apply(Topic::CustomerDisable, br#"{"id":1,"state":"disabled"}"#)
            .await
            .unwrap();
        let shop = sync
            .apply(Topic::ShopUpdate, br#"{"id":8711838,"name":"Super Toys"}"#)
            .await
            .unwrap();
        let deleted = sync
            .apply(Topic::CustomerDelete, br#"{"id":1}"#)
            .await
            .unwrap();

        assert_eq!(created, SyncOutcome::Created);
        assert_eq!(updated, SyncOutcome::Updated);
        assert_eq!(shop, SyncOutcome::Created);
        assert_eq!(deleted, SyncOutcome::Deleted);

        let mut conn = sync.database().pool().acquire().await.unwrap();
        assert_eq!(customers::count(&mut conn).await.unwrap(), 0);
        assert_eq!(shops::count(&mut conn).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_failed_notification_rolls_back() {
        let sync = synchronizer().await;

        let err = sync
            .apply(
                Topic::CustomerCreate,
                br#"{"id":5,"tags":"a","total_spent":"not money"}"#,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, SyncError::Decimal { field: "total_spent", .. }));

        let mut conn = sync.database().pool().acquire().await.unwrap();
        assert_eq!(customers::count(&mut conn).await.unwrap(), 0);
    }
}
