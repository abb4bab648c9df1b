//! Typed client for the ledger gateway.
//!
//! Paths are relative to the configured base URL; see the crate docs for
//! the table. Reads go through [`retry_send`](crate::retry::retry_send);
//! `submit` sends exactly once.

use std::time::Duration;

use serde::Deserialize;
use stl_core::{IncidentId, TxId};
use stl_state::Incident;

use crate::call::{SignedCall, TxHandle, TxStatus};
use crate::config::{ConfigError, LedgerConfig};
use crate::error::LedgerError;
use crate::traits::{LedgerReader, LedgerWriter};
use crate::wire::IncidentRecord;

#[derive(Debug, Deserialize)]
struct CountResponse {
    count: u64,
}

/// HTTP implementation of the ledger interface.
#[derive(Debug, Clone)]
pub struct HttpLedgerClient {
    http: reqwest::Client,
    base: String,
    contract: String,
}

impl HttpLedgerClient {
    pub fn new(config: LedgerConfig) -> Result<Self, LedgerError> {
        let mut headers = reqwest::header::HeaderMap::new();
        if let Some(token) = &config.api_token {
            let value = reqwest::header::HeaderValue::from_str(&format!("Bearer {}", token.as_str()))
                .map_err(|_| ConfigError::InvalidToken)?;
            headers.insert(reqwest::header::AUTHORIZATION, value);
        }
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| LedgerError::Http {
                endpoint: "client_init".into(),
                source: e,
            })?;

        Ok(Self {
            http,
            base: config.base_url.as_str().trim_end_matches('/').to_string(),
            contract: config.contract,
        })
    }

    pub fn contract(&self) -> &str {
        &self.contract
    }

    fn contract_url(&self, rest: &str) -> String {
        format!("{}/v1/contracts/{}/{rest}", self.base, self.contract)
    }

    async fn read_error(endpoint: String, resp: reqwest::Response) -> LedgerError {
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        LedgerError::Api {
            endpoint,
            status,
            body,
        }
    }
}

impl LedgerReader for HttpLedgerClient {
    async fn get_incident(&self, id: IncidentId) -> Result<Incident, LedgerError> {
        let endpoint = format!("GET /incidents/{}", id.value());
        let url = self.contract_url(&format!("incidents/{}", id.value()));

        let resp = crate::retry::retry_send(|| self.http.get(&url).send())
            .await
            .map_err(|e| LedgerError::Http {
                endpoint: endpoint.clone(),
                source: e,
            })?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(LedgerError::NotFound(id));
        }
        if !resp.status().is_success() {
            return Err(Self::read_error(endpoint, resp).await);
        }

        let record: IncidentRecord =
            resp.json()
                .await
                .map_err(|e| LedgerError::Deserialization {
                    endpoint: endpoint.clone(),
                    source: e,
                })?;
        if record.id != id {
            return Err(LedgerError::Malformed {
                endpoint,
                reason: format!("asked for incident {id}, got {}", record.id),
            });
        }
        Incident::try_from(record).map_err(|e| LedgerError::Malformed {
            endpoint,
            reason: e.to_string(),
        })
    }

    async fn incident_count(&self) -> Result<u64, LedgerError> {
        let endpoint = "GET /incidents/count".to_string();
        let url = self.contract_url("incidents/count");

        let resp = crate::retry::retry_send(|| self.http.get(&url).send())
            .await
            .map_err(|e| LedgerError::Http {
                endpoint: endpoint.clone(),
                source: e,
            })?;

        if !resp.status().is_success() {
            return Err(Self::read_error(endpoint, resp).await);
        }

        resp.json::<CountResponse>()
            .await
            .map(|c| c.count)
            .map_err(|e| LedgerError::Deserialization {
                endpoint,
                source: e,
            })
    }

    async fn tx_status(&self, tx: &TxId) -> Result<TxStatus, LedgerError> {
        let endpoint = format!("GET /tx/{tx}");
        let url = format!("{}/v1/tx/{tx}", self.base);

        let resp = crate::retry::retry_send(|| self.http.get(&url).send())
            .await
            .map_err(|e| LedgerError::Http {
                endpoint: endpoint.clone(),
                source: e,
            })?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(LedgerError::UnknownTx(tx.clone()));
        }
        if !resp.status().is_success() {
            return Err(Self::read_error(endpoint, resp).await);
        }

        resp.json().await.map_err(|e| LedgerError::Deserialization {
            endpoint,
            source: e,
        })
    }
}

impl LedgerWriter for HttpLedgerClient {
    async fn submit(&self, call: SignedCall) -> Result<TxHandle, LedgerError> {
        let function = call.call.function_name();
        let endpoint = format!("POST /calls ({function})");
        let url = self.contract_url("calls");

        let resp = self
            .http
            .post(&url)
            .json(&call)
            .send()
            .await
            .map_err(|e| LedgerError::Http {
                endpoint: endpoint.clone(),
                source: e,
            })?;

        let status = resp.status();
        if status == reqwest::StatusCode::UNPROCESSABLE_ENTITY
            || status == reqwest::StatusCode::FORBIDDEN
        {
            let reason = resp.text().await.unwrap_or_default();
            return Err(LedgerError::Rejected {
                function: function.to_string(),
                reason,
            });
        }
        if !status.is_success() {
            return Err(Self::read_error(endpoint, resp).await);
        }

        let handle: TxHandle = resp.json().await.map_err(|e| LedgerError::Deserialization {
            endpoint,
            source: e,
        })?;
        tracing::info!(tx = %handle.tx_id, function, "submitted contract call");
        Ok(handle)
    }
}
