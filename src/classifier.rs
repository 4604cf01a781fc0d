//! Garment recognition
//!
//! The model itself lives behind an inference endpoint. We post the raw
//! image and get back labelled scores in the Hugging Face
//! image-classification format:
//!
//! ```json
//! [{"label": "trench coat", "score": 0.81}, {"label": "cardigan", "score": 0.07}]
//! ```

use anyhow::Result;
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;
use tracing::{debug, info, instrument};

use crate::OutfitAiError;
use crate::config::ClassifierConfig;
use crate::http;
use crate::models::Classification;
use crate::models::garment::rank;

const SERVICE: &str = "Image classifier";

#[async_trait]
pub trait ImageClassifier: Send + Sync {
    /// Ranked predictions, best first
    async fn classify(&self, image: &[u8]) -> Result<Vec<Classification>>;
}

pub struct HttpImageClassifier {
    client: ClientWithMiddleware,
    endpoint: String,
    api_key: Option<String>,
    top_k: usize,
}

#[derive(Debug, Deserialize)]
struct Prediction {
    label: String,
    score: f32,
}

impl HttpImageClassifier {
    pub fn new(config: &ClassifierConfig) -> Result<Self> {
        Ok(Self {
            client: http::build_client(config.timeout_seconds, config.max_retries)?,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
            top_k: config.top_k as usize,
        })
    }
}

#[async_trait]
impl ImageClassifier for HttpImageClassifier {
    #[instrument(skip(self, image), fields(image_bytes = image.len()))]
    async fn classify(&self, image: &[u8]) -> Result<Vec<Classification>> {
        if image.is_empty() {
            return Err(OutfitAiError::validation("Image is empty").into());
        }

        info!("Classifying image");
        let mut request = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/octet-stream")
            .body(image.to_vec());

        if let Some(api_key) = &self.api_key {
            request = request.header(AUTHORIZATION, format!("Bearer {api_key}"));
        }

        let response = request
            .send()
            .await
            .map_err(|e| http::request_failed(SERVICE, e))?;
        let response = http::ensure_success(SERVICE, response).await?;
        let predictions: Vec<Prediction> = http::parse_json(SERVICE, response).await?;

        let ranked = rank(
            predictions
                .into_iter()
                .map(|p| Classification::new(p.label, p.score))
                .collect(),
            self.top_k,
        );

        if let Some(best) = ranked.first() {
            debug!("Detected clothing: {} ({})", best.label, best.format_confidence());
        }
        Ok(ranked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn test_config(endpoint: String, api_key: Option<&str>) -> ClassifierConfig {
        ClassifierConfig {
            endpoint,
            api_key: api_key.map(str::to_string),
            top_k: 2,
            max_retries: 0,
            ..ClassifierConfig::default()
        }
    }

    #[tokio::test]
    async fn test_classify_ranks_predictions() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/models/mobilenet")
            .match_header("authorization", "Bearer hf_test_token")
            .match_header("content-type", "application/octet-stream")
            .match_body(Matcher::Exact("fake-jpeg".to_string()))
            .with_status(200)
            .with_body(
                r#"[{"label":"cardigan","score":0.1},
                    {"label":"trench coat","score":0.8},
                    {"label":"sweatshirt","score":0.05}]"#,
            )
            .create_async()
            .await;

        let classifier = HttpImageClassifier::new(&test_config(
            format!("{}/models/mobilenet", server.url()),
            Some("hf_test_token"),
        ))
        .unwrap();

        let ranked = classifier.classify(b"fake-jpeg").await.unwrap();

        mock.assert_async().await;
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].label, "trench coat");
        assert_eq!(ranked[1].label, "cardigan");
    }

    #[tokio::test]
    async fn test_rate_limit_is_reported() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/")
            .with_status(429)
            .create_async()
            .await;

        let classifier = HttpImageClassifier::new(&test_config(server.url(), None)).unwrap();
        let err = classifier.classify(b"img").await.unwrap_err();

        assert!(matches!(
            err.downcast_ref::<OutfitAiError>(),
            Some(OutfitAiError::RateLimited { .. })
        ));
    }

    #[tokio::test]
    async fn test_empty_image_is_rejected() {
        let classifier =
            HttpImageClassifier::new(&test_config("http://127.0.0.1:9".into(), None)).unwrap();
        let err = classifier.classify(&[]).await.unwrap_err();
        assert!(err.to_string().contains("Image is empty"));
    }
}
