//! Reward service client
//!
//! Lists unclaimed submissions for a wallet and fetches the signature
//! needed to claim each one. Both calls are best-effort: failures are
//! logged and reported as "no data".

use alloy::primitives::{Address, Bytes};
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::config::ApiConfig;
use crate::domain::{short_hash, Authorization, RewardEntry};
use crate::error::{ClaimError, Result};

/// Source of claimable rewards and their authorizations
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RewardSource: Send + Sync {
    /// Unclaimed entries in service order; empty on any failure
    async fn list_unclaimed(&self, address: Address) -> Vec<RewardEntry>;

    /// Signed authorization for one entry; `None` on any failure
    async fn get_authorization(&self, address: Address, hash: &str) -> Option<Authorization>;
}

#[derive(Debug, Deserialize)]
struct SubmissionsResponse {
    #[serde(default)]
    submissions: Vec<SubmissionRow>,
}

#[derive(Debug, Deserialize)]
struct SubmissionRow {
    #[serde(default)]
    hashed: Option<String>,
    #[serde(default)]
    id: serde_json::Value,
    #[serde(default)]
    timestamp: serde_json::Value,
}

#[derive(Debug, Serialize)]
struct ClaimRequestBody<'a> {
    hash: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClaimResponseBody {
    signed_message: Option<String>,
}

/// HTTP client for the reward service
#[derive(Clone)]
pub struct HttpRewardSource {
    client: Client,
    base_url: String,
    listing_limit: u32,
}

impl HttpRewardSource {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            listing_limit: config.listing_limit,
        })
    }

    async fn fetch_unclaimed(&self, address: Address) -> Result<Vec<RewardEntry>> {
        let url = format!("{}/address/{}", self.base_url, address);
        info!("Fetching unclaimed rewards from {}", self.base_url);

        let resp = self
            .client
            .get(&url)
            .query(&[
                ("claimed", "false".to_string()),
                ("limit", self.listing_limit.to_string()),
            ])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ClaimError::SourceUnavailable(format!("HTTP {}: {}", status, body)));
        }

        let body: SubmissionsResponse = resp.json().await?;
        Ok(into_entries(body, Utc::now()))
    }

    async fn fetch_authorization(&self, address: Address, hash: &str) -> Result<Authorization> {
        let url = format!("{}/claim/{}", self.base_url, address);
        info!("Requesting signature (hash: {}...)", short_hash(hash));

        let resp = self
            .client
            .post(&url)
            .json(&ClaimRequestBody { hash })
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ClaimError::AuthorizationUnavailable(format!(
                "HTTP {}: {}",
                status, body
            )));
        }

        let body: ClaimResponseBody = resp.json().await?;
        let signed = body
            .signed_message
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| ClaimError::AuthorizationUnavailable("empty signedMessage".into()))?;

        Ok(Authorization {
            for_hash: hash.to_string(),
            signature: decode_signature(&signed)?,
        })
    }
}

#[async_trait]
impl RewardSource for HttpRewardSource {
    async fn list_unclaimed(&self, address: Address) -> Vec<RewardEntry> {
        match self.fetch_unclaimed(address).await {
            Ok(entries) => {
                debug!("Reward service returned {} unclaimed entries", entries.len());
                entries
            }
            Err(e) => {
                error!("Failed to list unclaimed rewards: {}", e);
                Vec::new()
            }
        }
    }

    async fn get_authorization(&self, address: Address, hash: &str) -> Option<Authorization> {
        match self.fetch_authorization(address, hash).await {
            Ok(auth) => Some(auth),
            Err(e) => {
                warn!(
                    "Failed to get signature (hash: {}...): {}",
                    short_hash(hash),
                    e
                );
                None
            }
        }
    }
}

/// Rows without a hash are dropped; the rest keep service order
fn into_entries(body: SubmissionsResponse, fetched_at: DateTime<Utc>) -> Vec<RewardEntry> {
    let total = body.submissions.len();
    let entries: Vec<RewardEntry> = body
        .submissions
        .into_iter()
        .filter_map(|row| {
            let hash = row.hashed.filter(|h| !h.trim().is_empty())?;
            Some(RewardEntry {
                id: json_to_id(&row.id),
                observed_at: parse_timestamp(&row.timestamp).unwrap_or(fetched_at),
                hash,
            })
        })
        .collect();

    if entries.len() < total {
        warn!("Dropped {} submission(s) without a hash", total - entries.len());
    }
    entries
}

fn json_to_id(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Accepts epoch seconds, epoch milliseconds, or RFC 3339
fn parse_timestamp(value: &serde_json::Value) -> Option<DateTime<Utc>> {
    match value {
        serde_json::Value::Number(n) => from_epoch(n.as_i64()?),
        serde_json::Value::String(s) => {
            let s = s.trim();
            if let Ok(n) = s.parse::<i64>() {
                return from_epoch(n);
            }
            DateTime::parse_from_rfc3339(s)
                .ok()
                .map(|dt| dt.with_timezone(&Utc))
        }
        _ => None,
    }
}

fn from_epoch(n: i64) -> Option<DateTime<Utc>> {
    // Anything past ~2286 in seconds is assumed to be milliseconds
    if n > 10_000_000_000 {
        Utc.timestamp_millis_opt(n).single()
    } else {
        Utc.timestamp_opt(n, 0).single()
    }
}

fn decode_signature(raw: &str) -> Result<Bytes> {
    let hex_str = raw.trim().trim_start_matches("0x").trim_start_matches("0X");
    hex::decode(hex_str)
        .map(Bytes::from)
        .map_err(|e| ClaimError::AuthorizationUnavailable(format!("signature is not hex: {}", e)))
}
