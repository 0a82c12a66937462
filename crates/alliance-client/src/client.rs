//! The Upstream API Client (UAC): a thin JSON client over the
//! upstream alliance/character API. Restructured from the gRPC-based
//! `RemoteSystem`/`StarManager` pair this crate started from into a
//! `reqwest`-backed JSON client, keeping the same "one struct owns a
//! shared transport handle" shape.

use crate::coerce::{coerce_i64, coerce_opt_i64, coerce_timestamp};
use crate::error::ClientError;
use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use serde_json::Value;
use std::time::Duration;

/// Default request timeout for all UAC calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// An alliance detail record after numeric coercion, ready to be
/// handed to the Document Store's `alliances` collection.
#[derive(Debug, Clone, PartialEq)]
pub struct AllianceDetail {
    pub alliance_id: i64,
    pub name: String,
    pub ticker: String,
    pub date_founded: Option<DateTime<Utc>>,
    pub creator_corporation_id: Option<i64>,
    pub creator_character_id: Option<i64>,
    pub executor_corporation_id: Option<i64>,
    pub faction_id: Option<i64>,
}

impl AllianceDetail {
    /// Best-effort normalization: missing or
    /// unparsable fields yield `None`/empty, the record is still built.
    fn from_upstream(alliance_id: i64, raw: &Value) -> Self {
        Self {
            alliance_id,
            name: raw
                .get("name")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            ticker: raw
                .get("ticker")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            date_founded: coerce_timestamp(raw.get("date_founded")),
            creator_corporation_id: coerce_opt_i64(raw.get("creator_corporation_id")),
            creator_character_id: coerce_opt_i64(raw.get("creator_character_id")),
            executor_corporation_id: coerce_opt_i64(raw.get("executor_corporation_id")),
            faction_id: coerce_opt_i64(raw.get("faction_id")),
        }
    }
}

/// Client for the remote alliance/character JSON API.
#[derive(Clone)]
pub struct AllianceClient {
    http: reqwest::Client,
    base_url: String,
}

impl AllianceClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(ClientError::TransientUpstream)?;
        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }

    /// `list-alliances(ctx) -> []int64`. Pagination, if any, is
    /// hidden from the caller.
    pub async fn list_alliances(&self) -> Result<Vec<i64>, ClientError> {
        let mut ids = Vec::new();
        let mut page = self.fetch_alliance_page(None).await?;
        ids.append(&mut page.ids);

        while let Some(cursor) = page.next_cursor {
            page = self.fetch_alliance_page(Some(&cursor)).await?;
            ids.append(&mut page.ids);
        }
        Ok(ids)
    }

    async fn fetch_alliance_page(&self, cursor: Option<&str>) -> Result<AlliancePage, ClientError> {
        let mut request = self.http.get(format!("{}/alliances", self.base_url));
        if let Some(cursor) = cursor {
            request = request.query(&[("cursor", cursor)]);
        }

        let response = request.send().await?;
        let response = self.check_status(response)?;
        let body: Value = response.json().await?;

        let ids = body
            .get("alliance_ids")
            .and_then(Value::as_array)
            .map(|arr| arr.iter().filter_map(coerce_i64_value).collect())
            .unwrap_or_default();
        let next_cursor = body
            .get("next_cursor")
            .and_then(Value::as_str)
            .map(str::to_string);

        Ok(AlliancePage { ids, next_cursor })
    }

    /// `alliance-detail(ctx, id) -> map<string,any>`, normalized with the
    /// same numeric coercion rules as the rest of the client.
    pub async fn alliance_detail(&self, alliance_id: i64) -> Result<AllianceDetail, ClientError> {
        let response = self
            .http
            .get(format!("{}/alliances/{alliance_id}", self.base_url))
            .send()
            .await?;
        let response = self.check_status(response)?;
        let raw: Value = response.json().await?;
        Ok(AllianceDetail::from_upstream(alliance_id, &raw))
    }

    /// `alliance-corporations(ctx, id) -> []int64`.
    pub async fn alliance_corporations(&self, alliance_id: i64) -> Result<Vec<i64>, ClientError> {
        let response = self
            .http
            .get(format!(
                "{}/alliances/{alliance_id}/corporations",
                self.base_url
            ))
            .send()
            .await?;
        let response = self.check_status(response)?;
        let body: Value = response.json().await?;
        Ok(body
            .as_array()
            .map(|arr| arr.iter().filter_map(coerce_i64_value).collect())
            .unwrap_or_default())
    }

    fn check_status(&self, response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
        match response.status() {
            StatusCode::NOT_FOUND => Err(ClientError::NotFound),
            status if status.is_server_error() => Err(ClientError::Data(format!(
                "upstream returned {status}"
            ))),
            _ => Ok(response),
        }
    }
}

fn coerce_i64_value(value: &Value) -> Option<i64> {
    coerce_i64(Some(value))
}

struct AlliancePage {
    ids: Vec<i64>,
    next_cursor: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn alliance_detail_preserves_absent_optional_fields_as_none() {
        let raw = json!({
            "name": "Test Alliance",
            "ticker": "TEST",
            "date_founded": "2020-01-01T00:00:00Z",
            "creator_corporation_id": 100,
            "creator_character_id": 200,
        });
        let detail = AllianceDetail::from_upstream(99_000_001, &raw);
        assert_eq!(detail.alliance_id, 99_000_001);
        assert_eq!(detail.name, "Test Alliance");
        assert!(detail.executor_corporation_id.is_none());
        assert!(detail.faction_id.is_none());
    }

    #[test]
    fn alliance_detail_tolerates_missing_name_and_ticker() {
        let raw = json!({});
        let detail = AllianceDetail::from_upstream(1, &raw);
        assert_eq!(detail.name, "");
        assert_eq!(detail.ticker, "");
        assert!(detail.date_founded.is_none());
    }
}
