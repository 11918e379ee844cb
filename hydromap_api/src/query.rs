use hydromap_schema::AssetType;
use reqwest::Url;

/// Server-side narrowing of the asset feed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssetQuery {
    pub asset_type: Option<AssetType>,
    pub region: Option<String>,
}

impl AssetQuery {
    pub fn apply(&self, url: &mut Url) {
        if self.asset_type.is_none() && self.region.is_none() {
            return;
        }
        let mut pairs = url.query_pairs_mut();
        if let Some(asset_type) = self.asset_type {
            pairs.append_pair("type", asset_type.as_str());
        }
        if let Some(region) = &self.region {
            pairs.append_pair("region", region);
        }
    }
}

/// Parameters for a dataset fetch. Each dataset reads only the fields that
/// apply to it.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchParams {
    pub assets: AssetQuery,
    /// Lower bound on recommendation match scores; omitted from the query
    /// when zero or below.
    pub min_score: f64,
}

impl Default for FetchParams {
    fn default() -> Self {
        Self {
            assets: AssetQuery::default(),
            min_score: 80.0,
        }
    }
}

pub(crate) fn apply_min_score(url: &mut Url, min_score: f64) {
    if min_score > 0.0 && min_score.is_finite() {
        url.query_pairs_mut()
            .append_pair("minScore", &min_score.to_string());
    }
}
