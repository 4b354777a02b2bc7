use crate::config::BackendConfig;
use crate::types::{
    BucketCounts, OrganizationReport, RankedOrganization, Snapshot, VulnerabilityPoint,
};
use anyhow::{Context, Result};
use geojson::GeoJson;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// HTTP client for the backend data service. All endpoints are parameterized
/// by country, category, and weeks back; everything except the map snapshot
/// is an opaque fetch-and-render payload.
pub struct DataClient {
    http: reqwest::Client,
    base_url: String,
}

impl DataClient {
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(DataClient {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub async fn fetch_snapshot(
        &self,
        country: &str,
        category: &str,
        weeks_back: u32,
    ) -> Result<Snapshot> {
        let url = format!(
            "{}/data/map/{}/{}/{}/",
            self.base_url, country, category, weeks_back
        );
        tracing::debug!(%url, "requesting map snapshot");
        let body = self
            .http
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Snapshot request failed: {}", url))?
            .error_for_status()
            .with_context(|| format!("Snapshot request rejected: {}", url))?
            .text()
            .await
            .context("Failed to read snapshot body")?;

        let geojson: GeoJson = body.parse().context("Failed to parse snapshot GeoJSON")?;
        Snapshot::from_geojson(geojson)
    }

    pub async fn fetch_report(
        &self,
        country: &str,
        category: &str,
        organization_id: &str,
        weeks_back: u32,
    ) -> Result<OrganizationReport> {
        let url = format!(
            "{}/data/report/{}/{}/{}/{}/",
            self.base_url, country, category, organization_id, weeks_back
        );
        self.fetch_json(&url).await
    }

    pub async fn fetch_top_fail(
        &self,
        country: &str,
        category: &str,
        weeks_back: u32,
    ) -> Result<Vec<RankedOrganization>> {
        let url = format!(
            "{}/data/topfail/{}/{}/{}/",
            self.base_url, country, category, weeks_back
        );
        self.fetch_json(&url).await
    }

    pub async fn fetch_top_win(
        &self,
        country: &str,
        category: &str,
        weeks_back: u32,
    ) -> Result<Vec<RankedOrganization>> {
        let url = format!(
            "{}/data/topwin/{}/{}/{}/",
            self.base_url, country, category, weeks_back
        );
        self.fetch_json(&url).await
    }

    pub async fn fetch_stats(
        &self,
        country: &str,
        category: &str,
        weeks_back: u32,
    ) -> Result<BucketCounts> {
        let url = format!(
            "{}/data/stats/{}/{}/{}/",
            self.base_url, country, category, weeks_back
        );
        self.fetch_json(&url).await
    }

    pub async fn fetch_vulnerability_series(
        &self,
        country: &str,
        category: &str,
        weeks_back: u32,
    ) -> Result<Vec<VulnerabilityPoint>> {
        let url = format!(
            "{}/data/vulnstats/{}/{}/{}/",
            self.base_url, country, category, weeks_back
        );
        self.fetch_json(&url).await
    }

    async fn fetch_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        tracing::debug!(%url, "requesting json payload");
        self.http
            .get(url)
            .send()
            .await
            .with_context(|| format!("Request failed: {}", url))?
            .error_for_status()
            .with_context(|| format!("Request rejected: {}", url))?
            .json::<T>()
            .await
            .with_context(|| format!("Failed to decode response: {}", url))
    }
}
