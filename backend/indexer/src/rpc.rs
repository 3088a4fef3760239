//! Soroban RPC client — polls `getEvents` and decodes marketplace events.
//!
//! ## Resilience
//!
//! * Exponential back-off is applied when the RPC returns an error or rate-limit
//!   response, up to [`MAX_BACKOFF_SECS`] seconds.
//! * Transient network errors (connection reset, timeout) are retried silently.

use std::time::Duration;

use base64::Engine as _;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::errors::{IndexerError, Result};
use crate::events::{CarbonEvent, EventKind};

const MAX_BACKOFF_SECS: u64 = 60;
const INITIAL_BACKOFF_SECS: u64 = 2;

// ─────────────────────────────────────────────────────────
// JSON-RPC response shapes
// ─────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RpcResponse {
    pub result: Option<EventsResult>,
    pub error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct EventsResult {
    pub events: Vec<RawEvent>,
    pub cursor: Option<String>,
    #[serde(rename = "latestLedger")]
    pub latest_ledger: Option<u64>,
}

#[derive(Debug, Deserialize, Clone)]
#[allow(dead_code)]
pub struct RawEvent {
    /// XDR-encoded topic list
    pub topic: Vec<String>,
    /// XDR-encoded event value / data
    pub value: Value,
    #[serde(rename = "contractId")]
    pub contract_id: Option<String>,
    #[serde(rename = "txHash")]
    pub tx_hash: Option<String>,
    pub id: Option<String>,
    pub ledger: Option<u64>,
    #[serde(rename = "ledgerClosedAt")]
    pub ledger_closed_at: Option<String>,
    #[serde(rename = "inSuccessfulContractCall")]
    pub in_successful_contract_call: Option<bool>,
    #[serde(rename = "pagingToken")]
    pub paging_token: Option<String>,
}

// ─────────────────────────────────────────────────────────
// Public API
// ─────────────────────────────────────────────────────────

/// Fetch a page of events from the RPC.
///
/// * `start_ledger` — the ledger sequence to scan from (inclusive).
/// * `cursor`       — optional opaque pagination cursor from a previous response.
/// * `limit`        — maximum number of events to return.
///
/// Returns `(events, next_cursor, latest_ledger)`.
pub async fn fetch_events(
    client: &Client,
    rpc_url: &str,
    contract_id: &str,
    start_ledger: u32,
    cursor: Option<&str>,
    limit: u32,
) -> Result<(Vec<RawEvent>, Option<String>, Option<u64>)> {
    let mut backoff = INITIAL_BACKOFF_SECS;

    loop {
        let params = build_params(contract_id, start_ledger, cursor, limit);

        let response = client
            .post(rpc_url)
            .json(&json!({
                "jsonrpc": "2.0",
                "id": 1,
                "method": "getEvents",
                "params": params,
            }))
            .send()
            .await;

        match response {
            Err(e) => {
                warn!("RPC request failed (will retry in {backoff}s): {e}");
                tokio::time::sleep(Duration::from_secs(backoff)).await;
                backoff = (backoff * 2).min(MAX_BACKOFF_SECS);
                continue;
            }
            Ok(resp) => {
                let status = resp.status();
                if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                    warn!("Rate-limited by RPC (will retry in {backoff}s)");
                    tokio::time::sleep(Duration::from_secs(backoff)).await;
                    backoff = (backoff * 2).min(MAX_BACKOFF_SECS);
                    continue;
                }

                let body: RpcResponse = resp.json().await?;

                if let Some(err) = body.error {
                    // Code -32600 / -32601 are hard failures; everything else we retry
                    if err.code == -32600 || err.code == -32601 {
                        return Err(IndexerError::Decode(format!(
                            "RPC hard error {}: {}",
                            err.code, err.message
                        )));
                    }
                    warn!(
                        "RPC soft error (will retry in {backoff}s): {} {}",
                        err.code, err.message
                    );
                    tokio::time::sleep(Duration::from_secs(backoff)).await;
                    backoff = (backoff * 2).min(MAX_BACKOFF_SECS);
                    continue;
                }

                let result = body.result.ok_or_else(|| {
                    IndexerError::Decode("Empty result from getEvents".to_string())
                })?;

                debug!(
                    "Fetched {} events (latest_ledger={:?})",
                    result.events.len(),
                    result.latest_ledger
                );

                return Ok((result.events, result.cursor, result.latest_ledger));
            }
        }
    }
}

fn build_params(contract_id: &str, start_ledger: u32, cursor: Option<&str>, limit: u32) -> Value {
    let mut params = json!({
        "filters": [
            {
                "type": "contract",
                "contractIds": [contract_id]
            }
        ],
        "pagination": {
            "limit": limit
        }
    });

    if let Some(cur) = cursor {
        params["pagination"]["cursor"] = json!(cur);
    } else {
        params["startLedger"] = json!(start_ledger);
    }

    params
}

// ─────────────────────────────────────────────────────────
// Event decoding
// ─────────────────────────────────────────────────────────

/// Decode a list of raw RPC events into [`CarbonEvent`] structs.
pub fn decode_events(raw: &[RawEvent], contract_id: &str) -> Vec<CarbonEvent> {
    raw.iter()
        .filter_map(|e| decode_single(e, contract_id))
        .collect()
}

fn decode_single(raw: &RawEvent, contract_id: &str) -> Option<CarbonEvent> {
    // Extract leading topic symbol to determine event type.
    let first_topic = raw.topic.first()?;
    let kind = EventKind::from_topic(&extract_symbol(first_topic));

    let ledger = raw.ledger.unwrap_or(0) as i64;
    let timestamp = raw
        .ledger_closed_at
        .as_deref()
        .and_then(parse_iso_to_unix)
        .unwrap_or(0);

    // The second topic is the project id for lifecycle events, and the
    // subject address for `auditor` / `admin` events.
    let second_topic = raw.topic.get(1).map(|t| extract_topic_value(t));
    let project_id = match kind {
        EventKind::AuditorRegistered | EventKind::AdminTransferred => None,
        _ => second_topic.clone(),
    };

    let fields = decode_data(&raw.value, &kind, second_topic.as_deref());

    Some(CarbonEvent {
        event_type: kind.as_str().to_string(),
        project_id,
        actor: fields.actor,
        counterparty: fields.counterparty,
        amount: fields.amount,
        certificate_id: fields.certificate_id,
        ledger,
        timestamp,
        contract_id: raw
            .contract_id
            .clone()
            .unwrap_or_else(|| contract_id.to_string()),
        tx_hash: raw.tx_hash.as_deref().map(normalize_tx_hash),
    })
}

#[derive(Debug, Default, PartialEq)]
struct DecodedFields {
    actor: Option<String>,
    counterparty: Option<String>,
    amount: Option<String>,
    certificate_id: Option<String>,
}

/// Pull apart the JSON `value` blob that Soroban returns for event data.
/// The XDR is decoded by the RPC into a `{"field": …}` JSON object per
/// payload struct; field names match `contracts/carbon_marketplace/src/events.rs`.
fn decode_data(value: &Value, kind: &EventKind, subject_topic: Option<&str>) -> DecodedFields {
    match kind {
        EventKind::ReductionClaimed => DecodedFields {
            actor: extract_field(value, &["owner", "claimant", "address"]),
            amount: extract_field(value, &["amount"]),
            ..Default::default()
        },
        EventKind::ClaimAudited => DecodedFields {
            actor: extract_field(value, &["auditor", "address"]),
            certificate_id: extract_field(value, &["certificate_id", "nft_id"]),
            ..Default::default()
        },
        EventKind::ProjectListed => DecodedFields {
            actor: extract_field(value, &["seller", "owner"]),
            amount: extract_field(value, &["price"]),
            ..Default::default()
        },
        EventKind::ProjectDelisted => DecodedFields {
            actor: extract_field(value, &["owner", "seller"]),
            ..Default::default()
        },
        EventKind::ProjectSold => DecodedFields {
            actor: extract_field(value, &["buyer"]),
            counterparty: extract_field(value, &["seller"]),
            amount: extract_field(value, &["price"]),
            ..Default::default()
        },
        EventKind::AuditorRegistered => DecodedFields {
            actor: extract_field(value, &["auditor"])
                .or_else(|| subject_topic.map(String::from)),
            counterparty: extract_field(value, &["registered_by"]),
            ..Default::default()
        },
        EventKind::AdminTransferred => DecodedFields {
            actor: extract_field(value, &["new_admin"])
                .or_else(|| subject_topic.map(String::from)),
            counterparty: extract_field(value, &["previous_admin"]),
            ..Default::default()
        },
        EventKind::Unknown => DecodedFields::default(),
    }
}

fn extract_field(value: &Value, keys: &[&str]) -> Option<String> {
    for key in keys {
        if let Some(v) = value.get(key) {
            let s = match v {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => v.as_str().map(String::from),
            };
            if s.is_some() {
                return s;
            }
        }
    }
    None
}

/// Extract a Soroban Symbol from a topic entry.
///
/// Depending on the RPC version the entry is either an XDR-to-JSON object
/// (`{"type":"symbol","value":"claimed"}`), a raw string, or base64 XDR
/// bytes. The base64 path scans the decoded bytes for the trailing printable
/// run, which for a short symbol topic is the symbol text itself.
fn extract_symbol(raw: &str) -> String {
    if let Ok(v) = serde_json::from_str::<Value>(raw) {
        if let Some(s) = v.get("value").and_then(|x| x.as_str()) {
            return s.to_string();
        }
    }
    if let Some(sym) = extract_symbol_from_xdr(raw) {
        return sym;
    }
    // Fallback: treat the raw string as the symbol
    raw.to_string()
}

/// Best-effort symbol recovery from a base64 `ScVal` blob: take the longest
/// trailing run of symbol-legal ASCII (`a-zA-Z0-9_`).
fn extract_symbol_from_xdr(raw: &str) -> Option<String> {
    let bytes = base64::engine::general_purpose::STANDARD.decode(raw).ok()?;
    let run: Vec<u8> = bytes
        .iter()
        .rev()
        .take_while(|b| b.is_ascii_alphanumeric() || **b == b'_')
        .cloned()
        .collect();
    if run.is_empty() {
        return None;
    }
    let sym: String = run.into_iter().rev().map(char::from).collect();
    Some(sym)
}

/// Extract a topic entry that might be a JSON object, raw number, or string.
fn extract_topic_value(raw: &str) -> String {
    if let Ok(v) = serde_json::from_str::<Value>(raw) {
        if let Some(n) = v.get("value").and_then(|x| x.as_u64()) {
            return n.to_string();
        }
        if let Some(s) = v.get("value").and_then(|x| x.as_str()) {
            return s.to_string();
        }
    }
    raw.to_string()
}

/// Lowercase a transaction hash and strip any `0x` prefix, keeping it only
/// if it is well-formed hex; otherwise store the original string untouched.
fn normalize_tx_hash(raw: &str) -> String {
    let stripped = raw.strip_prefix("0x").unwrap_or(raw);
    match hex::decode(stripped) {
        Ok(bytes) => hex::encode(bytes),
        Err(_) => raw.to_string(),
    }
}

/// Parse an ISO-8601 timestamp string into a Unix epoch (seconds).
fn parse_iso_to_unix(s: &str) -> Option<i64> {
    use chrono::DateTime;
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.timestamp())
}

// ─────────────────────────────────────────────────────────
// Unit tests
// ─────────────────────────────────────────────────────────
