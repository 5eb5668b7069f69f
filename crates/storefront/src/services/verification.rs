//! Email verification tokens.
//!
//! Issuing a token produces an opaque 32-character token for the client and a
//! 6-digit code that is emailed to the address being verified. The client
//! proves ownership by presenting both. Tokens expire after a fixed lifetime
//! and are purged by a background task.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use brightwire_core::security::constant_time_eq;
use brightwire_core::{Email, VerificationPurpose, VerificationStatus};
use chrono::{DateTime, TimeDelta, Utc};
use rand::Rng;
use rand::distr::Alphanumeric;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

/// Length of issued tokens.
pub const TOKEN_LENGTH: usize = 32;

/// Wrong codes allowed before a token is destroyed.
pub const MAX_ATTEMPTS: u32 = 5;

/// Errors verifying a token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerificationError {
    #[error("verification token not found")]
    NotFound,

    #[error("verification token has expired")]
    Expired,

    #[error("verification token was already used")]
    AlreadyVerified,

    #[error("incorrect verification code ({remaining} attempts left)")]
    InvalidCode { remaining: u32 },

    #[error("too many incorrect verification codes")]
    TooManyAttempts,
}

/// A stored verification token.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationRecord {
    pub token: String,
    pub email: Email,
    #[serde(skip)]
    pub code: String,
    pub purpose: VerificationPurpose,
    pub status: VerificationStatus,
    #[serde(skip)]
    pub failed_attempts: u32,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl VerificationRecord {
    /// Whether the record has expired at `now`.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// The parts of a freshly issued token that leave the store.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub code: String,
    pub expires_at: DateTime<Utc>,
}

/// In-memory verification tokens, keyed by token.
#[derive(Clone)]
pub struct VerificationStore {
    records: Arc<RwLock<HashMap<String, VerificationRecord>>>,
    ttl: TimeDelta,
}

impl VerificationStore {
    /// Store issuing tokens that live for `ttl`.
    #[must_use]
    pub fn new(ttl: TimeDelta) -> Self {
        Self {
            records: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    /// Store issuing tokens that live for `minutes`.
    #[must_use]
    pub fn with_ttl_minutes(minutes: u32) -> Self {
        Self::new(TimeDelta::minutes(i64::from(minutes)))
    }

    /// Token lifetime.
    #[must_use]
    pub const fn ttl(&self) -> TimeDelta {
        self.ttl
    }

    /// Issue a token for `email`.
    ///
    /// Any pending token for the same email and purpose is replaced.
    pub async fn issue(&self, email: Email, purpose: VerificationPurpose) -> IssuedToken {
        self.issue_at(email, purpose, Utc::now()).await
    }

    /// [`issue`](Self::issue) with an explicit clock.
    pub async fn issue_at(
        &self,
        email: Email,
        purpose: VerificationPurpose,
        now: DateTime<Utc>,
    ) -> IssuedToken {
        let record = VerificationRecord {
            token: generate_token(),
            email,
            code: generate_verification_code(),
            purpose,
            status: VerificationStatus::Pending,
            failed_attempts: 0,
            created_at: now,
            expires_at: now + self.ttl,
        };
        let issued = IssuedToken {
            token: record.token.clone(),
            code: record.code.clone(),
            expires_at: record.expires_at,
        };

        let mut records = self.records.write().await;
        records.retain(|_, existing| {
            !(existing.email == record.email
                && existing.purpose == record.purpose
                && existing.status == VerificationStatus::Pending)
        });
        tracing::debug!(purpose = ?record.purpose, expires_at = %record.expires_at, "issued verification token");
        records.insert(record.token.clone(), record);

        issued
    }

    /// Check `code` against `token` and mark the token verified.
    ///
    /// # Errors
    ///
    /// - [`VerificationError::NotFound`] for unknown tokens
    /// - [`VerificationError::Expired`] for expired tokens, which are deleted
    /// - [`VerificationError::AlreadyVerified`] if the token was used before
    /// - [`VerificationError::InvalidCode`] for a wrong code
    /// - [`VerificationError::TooManyAttempts`] on the final wrong code; the
    ///   token is deleted
    pub async fn verify(&self, token: &str, code: &str) -> Result<VerificationRecord, VerificationError> {
        self.verify_at(token, code, Utc::now()).await
    }

    /// [`verify`](Self::verify) with an explicit clock.
    pub async fn verify_at(
        &self,
        token: &str,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<VerificationRecord, VerificationError> {
        let mut records = self.records.write().await;
        let record = records.get_mut(token).ok_or(VerificationError::NotFound)?;

        if record.is_expired(now) {
            records.remove(token);
            return Err(VerificationError::Expired);
        }

        if record.status == VerificationStatus::Verified {
            return Err(VerificationError::AlreadyVerified);
        }

        if !constant_time_eq(&record.code, code.trim()) {
            record.failed_attempts += 1;
            if record.failed_attempts >= MAX_ATTEMPTS {
                tracing::warn!(purpose = ?record.purpose, "verification token locked after repeated wrong codes");
                records.remove(token);
                return Err(VerificationError::TooManyAttempts);
            }
            return Err(VerificationError::InvalidCode {
                remaining: MAX_ATTEMPTS - record.failed_attempts,
            });
        }

        record.status = VerificationStatus::Verified;
        Ok(record.clone())
    }

    /// Look up a token without changing it.
    pub async fn get(&self, token: &str) -> Option<VerificationRecord> {
        self.records.read().await.get(token).cloned()
    }

    /// Number of stored tokens.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Whether no tokens are stored.
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    /// Delete expired tokens, returning how many were removed.
    pub async fn purge_expired(&self) -> usize {
        self.purge_expired_at(Utc::now()).await
    }

    /// [`purge_expired`](Self::purge_expired) with an explicit clock.
    pub async fn purge_expired_at(&self, now: DateTime<Utc>) -> usize {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|_, record| !record.is_expired(now));
        before - records.len()
    }

    /// Purge expired tokens every `period` until the runtime shuts down.
    #[must_use]
    pub fn spawn_purge_task(&self, period: Duration) -> JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                let purged = store.purge_expired().await;
                if purged > 0 {
                    tracing::info!(purged, "purged expired verification tokens");
                }
            }
        })
    }
}

/// Generate a 6-digit verification code.
#[must_use]
pub fn generate_verification_code() -> String {
    let code: u32 = rand::rng().random_range(100_000..1_000_000);
    code.to_string()
}

/// Generate an opaque alphanumeric token.
#[must_use]
pub fn generate_token() -> String {
    rand::rng()
        .sample_iter(Alphanumeric)
        .take(TOKEN_LENGTH)
        .map(char::from)
        .collect()
}
