// SPDX-License-Identifier: MIT

//! Client for the ministry's fuel-price feed.
//!
//! One GET returns a snapshot of every station nationwide (~8k records)
//! with decimal-comma numeric strings and ministry field names. The records
//! are handed to the sync service untouched; all normalization happens at
//! the ingestion boundary there.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Fuel price feed client.
#[derive(Clone)]
pub struct FuelFeedClient {
    http: reqwest::Client,
    url: String,
}

impl FuelFeedClient {
    /// Create a client with a bounded request timeout.
    ///
    /// The snapshot is large; anything under ~30s risks spurious aborts.
    pub fn new(url: &str, timeout_secs: u64) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| AppError::Internal(anyhow::anyhow!("HTTP client build failed: {}", e)))?;

        Ok(Self {
            http,
            url: url.to_string(),
        })
    }

    /// Fetch the full station snapshot.
    ///
    /// A timeout or HTTP failure surfaces before any storage mutation; the
    /// sync transaction is only opened once this call has succeeded.
    pub async fn fetch_snapshot(&self) -> Result<Vec<RawStationRecord>, AppError> {
        tracing::info!(url = %self.url, "Fetching station snapshot");

        let response = self
            .http
            .get(&self.url)
            .send()
            .await
            .map_err(|e| AppError::FuelApi(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::FuelApi(format!("HTTP {}: {}", status, body)));
        }

        let snapshot: FeedSnapshot = response
            .json()
            .await
            .map_err(|e| AppError::FuelApi(format!("JSON parse error: {}", e)))?;

        tracing::info!(count = snapshot.stations.len(), "Station snapshot fetched");
        Ok(snapshot.stations)
    }
}

/// Top-level feed payload.
#[derive(Debug, Clone, Deserialize)]
struct FeedSnapshot {
    #[serde(rename = "ListaEESSPrecio", default)]
    stations: Vec<RawStationRecord>,
}

/// One station record exactly as the feed ships it.
///
/// Prices and coordinates are strings with a comma decimal separator;
/// missing fields default to empty so a sparse record still deserializes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawStationRecord {
    #[serde(rename = "IDEESS", default)]
    pub id: String,
    #[serde(rename = "Rótulo", default)]
    pub name: String,
    #[serde(rename = "Dirección", default)]
    pub address: String,
    #[serde(rename = "Municipio", default)]
    pub municipality: String,
    #[serde(rename = "Provincia", default)]
    pub province: String,
    #[serde(rename = "Latitud", default)]
    pub latitude: String,
    #[serde(rename = "Longitud (WGS84)", default)]
    pub longitude: String,
    #[serde(rename = "Horario", default)]
    pub schedule: String,
    #[serde(rename = "Precio Gasolina 95 E5", default)]
    pub gasolina_95: String,
    #[serde(rename = "Precio Gasolina 95 E10", default)]
    pub gasolina_95_e10: String,
    #[serde(rename = "Precio Gasolina 98 E5", default)]
    pub gasolina_98: String,
    #[serde(rename = "Precio Gasoleo A", default)]
    pub gasoleo_a: String,
    #[serde(rename = "Precio Gasoleo Premium", default)]
    pub gasoleo_premium: String,
    #[serde(rename = "Precio Gases licuados del petróleo", default)]
    pub glp: String,
    #[serde(rename = "Precio Biodiesel", default)]
    pub biodiesel: String,
    #[serde(rename = "Precio Bioetanol", default)]
    pub bioetanol: String,
    #[serde(rename = "Precio Éster metílico", default)]
    pub ester_metilico: String,
    #[serde(rename = "Precio Hidrogeno", default)]
    pub hidrogeno: String,
}
