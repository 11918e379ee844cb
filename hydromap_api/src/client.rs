use hydromap_core::config::{ApiConfig, EndpointConfig};
use hydromap_core::{Dataset, Fetched};
use hydromap_schema::{
    AnalysisRequest, AnalyticsSummary, DemandCenter, HydrogenPlantMarker, InfrastructureAsset,
    Recommendation, RenewableMarker,
};
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::error::ApiError;
use crate::query::{apply_min_score, AssetQuery, FetchParams};

/// Typed client for the infrastructure API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    endpoints: EndpointConfig,
    client: Client,
}

impl ApiClient {
    pub fn from_config(config: &ApiConfig) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(ApiError::Build)?;
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            endpoints: config.endpoints.clone(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn endpoint_url(&self, path: &str) -> Result<Url, ApiError> {
        let raw = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        Url::parse(&raw).map_err(|err| ApiError::InvalidUrl {
            url: raw,
            reason: err.to_string(),
        })
    }

    pub fn assets_url(&self, query: &AssetQuery) -> Result<Url, ApiError> {
        let mut url = self.endpoint_url(&self.endpoints.assets)?;
        query.apply(&mut url);
        Ok(url)
    }

    pub fn recommendations_url(&self, min_score: f64) -> Result<Url, ApiError> {
        let mut url = self.endpoint_url(&self.endpoints.recommendations)?;
        apply_min_score(&mut url, min_score);
        Ok(url)
    }

    /// Fetch one dataset and wrap it for [`hydromap_core::EntityStore`].
    pub async fn fetch(
        &self,
        dataset: Dataset,
        params: &FetchParams,
    ) -> Result<Fetched, ApiError> {
        let fetched = match dataset {
            Dataset::Assets => Fetched::Assets(self.fetch_assets(&params.assets).await?),
            Dataset::HydrogenPlants => {
                Fetched::HydrogenPlants(self.fetch_hydrogen_plants().await?)
            }
            Dataset::Renewables => Fetched::Renewables(self.fetch_renewables().await?),
            Dataset::DemandCenters => Fetched::DemandCenters(self.fetch_demand_centers().await?),
            Dataset::Recommendations => {
                Fetched::Recommendations(self.fetch_recommendations(params.min_score).await?)
            }
        };
        Ok(fetched)
    }

    pub async fn fetch_assets(
        &self,
        query: &AssetQuery,
    ) -> Result<Vec<InfrastructureAsset>, ApiError> {
        self.get_json(self.assets_url(query)?).await
    }

    pub async fn fetch_hydrogen_plants(&self) -> Result<Vec<HydrogenPlantMarker>, ApiError> {
        self.get_json(self.endpoint_url(&self.endpoints.hydrogen_plants)?)
            .await
    }

    pub async fn fetch_renewables(&self) -> Result<Vec<RenewableMarker>, ApiError> {
        self.get_json(self.endpoint_url(&self.endpoints.renewables)?)
            .await
    }

    pub async fn fetch_demand_centers(&self) -> Result<Vec<DemandCenter>, ApiError> {
        self.get_json(self.endpoint_url(&self.endpoints.demand_centers)?)
            .await
    }

    pub async fn fetch_recommendations(
        &self,
        min_score: f64,
    ) -> Result<Vec<Recommendation>, ApiError> {
        self.get_json(self.recommendations_url(min_score)?).await
    }

    pub async fn fetch_analytics(&self) -> Result<AnalyticsSummary, ApiError> {
        self.get_json(self.endpoint_url(&self.endpoints.analytics)?)
            .await
    }

    /// Ask the ranking service to recompute recommendations. The response
    /// body is ignored; callers refetch recommendations afterwards.
    pub async fn trigger_analysis(&self, request: &AnalysisRequest) -> Result<(), ApiError> {
        request.validate()?;
        let url = self.endpoint_url(&self.endpoints.analyze)?;
        let label = url.to_string();
        let response = self
            .client
            .post(url)
            .json(request)
            .send()
            .await
            .map_err(|source| ApiError::Transport {
                url: label.clone(),
                source,
            })?;
        check_status(&label, response).await?;
        info!(
            target: "hydromap::api",
            max_results = request.max_results,
            "analysis.triggered"
        );
        Ok(())
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        let label = url.to_string();
        debug!(target: "hydromap::api", url = %label, "request.get");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| ApiError::Transport {
                url: label.clone(),
                source,
            })?;
        let response = check_status(&label, response).await?;
        let body = response
            .text()
            .await
            .map_err(|source| ApiError::Transport {
                url: label.clone(),
                source,
            })?;
        decode(&label, &body)
    }
}

async fn check_status(
    url: &str,
    response: reqwest::Response,
) -> Result<reqwest::Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<no body>".to_string());
    Err(ApiError::Status {
        url: url.to_string(),
        status: status.as_u16(),
        body,
    })
}

pub(crate) fn decode<T: DeserializeOwned>(url: &str, body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|source| ApiError::Decode {
        url: url.to_string(),
        source,
    })
}
