use crate::{ClassificationService, PredictRequest, PredictResponse, ProviderError};
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

#[derive(Clone)]
pub struct HttpClassifierConfig {
    /// Full endpoint URL, e.g. `http://localhost:5000/predict`.
    pub url: String,
    pub timeout: Duration,
}

#[derive(Clone)]
pub struct HttpClassifier {
    client: Client,
    cfg: Arc<HttpClassifierConfig>,
}

impl HttpClassifier {
    pub fn new(cfg: HttpClassifierConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(cfg.timeout)
            .build()
            .map_err(|e| ProviderError::RequestFailed(format!("http client setup: {e}")))?;
        Ok(Self {
            client,
            cfg: Arc::new(cfg),
        })
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

#[async_trait::async_trait]
impl ClassificationService for HttpClassifier {
    async fn predict(&self, req: PredictRequest) -> Result<PredictResponse, ProviderError> {
        let image = Part::bytes(req.image.to_vec())
            .file_name(req.file_name)
            .mime_str(&req.mime)
            .map_err(|e| ProviderError::RequestFailed(e.to_string()))?;
        let form = Form::new()
            .part("image", image)
            .text("model_type", req.model_type);

        let resp = self
            .client
            .post(&self.cfg.url)
            .bearer_auth(&req.token)
            .multipart(form)
            .send()
            .await
            .map_err(|e| ProviderError::RequestFailed(e.to_string()))?;

        let status = resp.status();
        let body = resp
            .bytes()
            .await
            .map_err(|e| ProviderError::RequestFailed(e.to_string()))?;
        debug!(status = status.as_u16(), len = body.len(), "classification response");

        if !status.is_success() {
            let message = serde_json::from_slice::<ErrorBody>(&body)
                .ok()
                .and_then(|b| b.error);
            return Err(ProviderError::Service {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_slice::<PredictResponse>(&body)
            .map_err(|e| ProviderError::MalformedResponse(e.to_string()))
    }
}
