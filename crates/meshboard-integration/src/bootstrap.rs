use reqwest::Client;
use tracing::{info, warn};

use crate::error::IntegrationError;
use crate::types::{BootstrapModel, BootstrapReport, FetchedAsset};

const MODELS_BASE_URL: &str =
    "https://raw.githubusercontent.com/schaugo-tech/Proj_491317_1/main/models";

/// Models loaded into an empty session on first run
pub fn default_models() -> Vec<BootstrapModel> {
    ["Proj_491317_SP_model.stl", "general_teeth_U.stl"]
        .into_iter()
        .map(|name| BootstrapModel {
            name: name.to_string(),
            url: format!("{}/{}", MODELS_BASE_URL, name),
        })
        .collect()
}

/// GET a single model
pub(crate) async fn fetch_model(
    client: &Client,
    model: &BootstrapModel,
) -> Result<FetchedAsset, IntegrationError> {
    let response = client.get(&model.url).send().await?;

    let status = response.status();
    if !status.is_success() {
        return Err(IntegrationError::HttpStatus {
            status: status.as_u16(),
            url: model.url.clone(),
        });
    }

    let payload = response.bytes().await?.to_vec();
    info!("Fetched bootstrap model '{}' ({} bytes)", model.name, payload.len());
    Ok(FetchedAsset {
        name: model.name.clone(),
        payload,
    })
}

/// Fetch every model concurrently, keeping request order in the report
pub(crate) async fn fetch_all(client: Client, models: Vec<BootstrapModel>) -> BootstrapReport {
    let handles: Vec<_> = models
        .into_iter()
        .map(|model| {
            let client = client.clone();
            tokio::spawn(async move {
                let result = fetch_model(&client, &model).await;
                (model, result)
            })
        })
        .collect();

    let mut report = BootstrapReport::default();
    for handle in handles {
        match handle.await {
            Ok((_, Ok(asset))) => report.assets.push(asset),
            Ok((model, Err(err))) => {
                warn!("Bootstrap model '{}' unavailable: {}", model.name, err);
                report.failures.push((model.name, err));
            }
            Err(join_err) => {
                warn!("Bootstrap task failed: {}", join_err);
            }
        }
    }
    report
}
