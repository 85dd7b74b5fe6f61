//! Firestore REST client backing the document-store collaborator.
//!
//! Thin HTTP wrapper over `documents:runQuery` and single-document reads.
//! Pure decoding in `parse_query_response` / `decode_document` for
//! testability.
//!
//! ERROR HANDLING
//! ==============
//! Transport and status failures map to `ApiError`. Individual field values
//! that cannot be decoded degrade to loosely-typed values instead of failing
//! the whole response; record-level interpretation happens in the dashboard.

#[cfg(test)]
#[path = "firestore_test.rs"]
mod firestore_test;

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::api::{ApiError, DocumentStore};
use super::types::{FieldValue, RawDocument, SharedSession};
use crate::config::{FirestoreConfig, HttpTimeouts};

// =============================================================================
// CLIENT
// =============================================================================

pub struct FirestoreClient {
    http: reqwest::Client,
    config: FirestoreConfig,
    session: SharedSession,
}

impl FirestoreClient {
    /// Build a client for the configured project. Requests carry the session's
    /// id token as a bearer token when one is present.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: FirestoreConfig, timeouts: HttpTimeouts, session: SharedSession) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeouts.request_secs))
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .build()
            .map_err(|e| ApiError::Request(e.to_string()))?;
        Ok(Self { http, config, session })
    }

    #[must_use]
    pub fn config(&self) -> &FirestoreConfig {
        &self.config
    }

    /// Fetch a single document by collection and id.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` for a missing document, or a transport/parse error.
    pub async fn get_document(&self, collection: &str, id: &str) -> Result<RawDocument, ApiError> {
        let url = self.document_url(collection, id)?;
        let request = self.authorize(self.http.get(url)).await;
        let response = request.send().await.map_err(|e| ApiError::Request(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response.text().await.map_err(|e| ApiError::Request(e.to_string()))?;

        if status == 404 {
            return Err(ApiError::NotFound(format!("{collection}/{id}")));
        }
        if status != 200 {
            return Err(ApiError::Response { status, body: text });
        }

        let wire: WireDocument = serde_json::from_str(&text).map_err(|e| ApiError::Parse(e.to_string()))?;
        Ok(decode_document(wire))
    }

    /// URL of one document, with `collection` and `id` percent-encoded as path segments.
    fn document_url(&self, collection: &str, id: &str) -> Result<reqwest::Url, ApiError> {
        let mut url = reqwest::Url::parse(&self.config.documents_url()).map_err(|e| ApiError::Request(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|()| ApiError::Request("documents url cannot carry a path".into()))?
            .push(collection)
            .push(id);
        Ok(url)
    }

    async fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.session.read().await.as_ref() {
            Some(session) => request.bearer_auth(&session.id_token),
            None => request,
        }
    }
}

#[async_trait::async_trait]
impl DocumentStore for FirestoreClient {
    async fn query(&self, collection: &str, field: &str, value: &str) -> Result<Vec<RawDocument>, ApiError> {
        let url = format!("{}:runQuery", self.config.documents_url());
        let body = equality_query(collection, field, value);

        let request = self.authorize(self.http.post(&url).json(&body)).await;
        let response = request.send().await.map_err(|e| ApiError::Request(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response.text().await.map_err(|e| ApiError::Request(e.to_string()))?;

        if status != 200 {
            return Err(ApiError::Response { status, body: text });
        }

        parse_query_response(&text)
    }
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(Debug, Deserialize)]
struct QueryResponseEntry {
    document: Option<WireDocument>,
}

#[derive(Debug, Deserialize)]
struct WireDocument {
    name: String,
    #[serde(default)]
    fields: BTreeMap<String, serde_json::Value>,
}

/// Structured query selecting every document in `collection` where `field == value`.
fn equality_query(collection: &str, field: &str, value: &str) -> serde_json::Value {
    serde_json::json!({
        "structuredQuery": {
            "from": [{ "collectionId": collection }],
            "where": {
                "fieldFilter": {
                    "field": { "fieldPath": field },
                    "op": "EQUAL",
                    "value": { "stringValue": value }
                }
            }
        }
    })
}

// =============================================================================
// PARSING
// =============================================================================

/// Parse a `runQuery` response body. Entries without a document (the
/// read-time marker an empty result carries) are skipped.
fn parse_query_response(text: &str) -> Result<Vec<RawDocument>, ApiError> {
    let entries: Vec<QueryResponseEntry> = serde_json::from_str(text).map_err(|e| ApiError::Parse(e.to_string()))?;
    Ok(entries
        .into_iter()
        .filter_map(|entry| entry.document)
        .map(decode_document)
        .collect())
}

fn decode_document(wire: WireDocument) -> RawDocument {
    let id = document_id(&wire.name).to_owned();
    let fields = wire
        .fields
        .iter()
        .map(|(name, value)| (name.clone(), decode_value(value)))
        .collect();
    RawDocument { id, fields }
}

/// Last path segment of a full document resource name.
fn document_id(name: &str) -> &str {
    name.rsplit('/').next().unwrap_or(name)
}

/// Decode one Firestore typed value (`{"stringValue": ...}` etc.).
fn decode_value(value: &serde_json::Value) -> FieldValue {
    let Some(object) = value.as_object() else {
        return FieldValue::Null;
    };
    let Some((kind, inner)) = object.iter().next() else {
        return FieldValue::Null;
    };

    match kind.as_str() {
        "nullValue" => FieldValue::Null,
        "booleanValue" => inner.as_bool().map_or(FieldValue::Null, FieldValue::Boolean),
        "integerValue" => decode_integer(inner),
        "doubleValue" => decode_double(inner),
        "timestampValue" => decode_timestamp(inner),
        "stringValue" | "referenceValue" | "bytesValue" => {
            inner.as_str().map_or(FieldValue::Null, |s| FieldValue::String(s.to_owned()))
        }
        "geoPointValue" => {
            let mut point = BTreeMap::new();
            for axis in ["latitude", "longitude"] {
                if let Some(n) = inner.get(axis).and_then(serde_json::Value::as_f64) {
                    point.insert(axis.to_owned(), FieldValue::Double(n));
                }
            }
            FieldValue::Map(point)
        }
        "mapValue" => {
            let fields = inner
                .get("fields")
                .and_then(serde_json::Value::as_object)
                .map(|fields| fields.iter().map(|(k, v)| (k.clone(), decode_value(v))).collect())
                .unwrap_or_default();
            FieldValue::Map(fields)
        }
        "arrayValue" => {
            let values = inner
                .get("values")
                .and_then(serde_json::Value::as_array)
                .map(|values| values.iter().map(decode_value).collect())
                .unwrap_or_default();
            FieldValue::Array(values)
        }
        _ => FieldValue::Null,
    }
}

// Integers travel as decimal strings; tolerate bare numbers too.
fn decode_integer(inner: &serde_json::Value) -> FieldValue {
    let parsed = match inner {
        serde_json::Value::String(s) => s.parse::<i64>().ok(),
        serde_json::Value::Number(n) => n.as_i64(),
        _ => None,
    };
    parsed.map_or(FieldValue::Null, FieldValue::Integer)
}

fn decode_double(inner: &serde_json::Value) -> FieldValue {
    let parsed = match inner {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.parse::<f64>().ok(),
        _ => None,
    };
    parsed.map_or(FieldValue::Null, FieldValue::Double)
}

// An unparseable timestamp is kept as a string, which is not date-convertible.
fn decode_timestamp(inner: &serde_json::Value) -> FieldValue {
    let Some(raw) = inner.as_str() else {
        return FieldValue::Null;
    };
    match DateTime::parse_from_rfc3339(raw) {
        Ok(ts) => FieldValue::Timestamp(ts.with_timezone(&Utc)),
        Err(_) => FieldValue::String(raw.to_owned()),
    }
}
