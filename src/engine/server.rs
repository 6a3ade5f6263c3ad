//! CoreNLP server backend.
//!
//! Talks to a running `edu.stanford.nlp.pipeline.StanfordCoreNLPServer`:
//! the text is POSTed as the request body and the pipeline properties travel
//! as a JSON object in the `properties` query parameter.

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::config::{PipelineConfig, StageList};
use crate::models::AnnotationResult;

use super::{wire, AnnotationEngine, EngineError, EngineType};

/// Engine backed by a CoreNLP server.
pub struct CoreNlpServerEngine {
    config: PipelineConfig,
    client: Client,
}

impl CoreNlpServerEngine {
    pub fn new(config: PipelineConfig) -> Result<Self, EngineError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| EngineError::Connection(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    fn base_url(&self) -> &str {
        self.config.endpoint.trim_end_matches('/')
    }
}

#[async_trait]
impl AnnotationEngine for CoreNlpServerEngine {
    fn engine_type(&self) -> EngineType {
        EngineType::Server
    }

    async fn is_available(&self) -> bool {
        let url = format!("{}/ready", self.base_url());
        match self.client.get(&url).send().await {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }

    fn availability_hint(&self) -> String {
        format!(
            "No CoreNLP server at {}. Start one with: java -mx4g -cp \"$CORENLP_HOME/*\" \
             edu.stanford.nlp.pipeline.StanfordCoreNLPServer -port 9000",
            self.config.endpoint
        )
    }

    async fn annotate(
        &self,
        text: &str,
        stages: &StageList,
    ) -> Result<AnnotationResult, EngineError> {
        let properties = serde_json::to_string(&self.config.engine_properties(stages))
            .map_err(|e| EngineError::Failed(e.to_string()))?;
        let url = format!("{}/", self.base_url());

        debug!("POST {} ({} bytes, annotators={})", url, text.len(), stages);
        let resp = self
            .client
            .post(&url)
            .query(&[("properties", properties.as_str())])
            .header(reqwest::header::CONTENT_TYPE, "text/plain; charset=utf-8")
            .body(text.to_owned())
            .send()
            .await
            .map_err(|e| EngineError::Connection(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(EngineError::Api {
                status,
                body: body.trim().to_string(),
            });
        }

        let body = resp
            .text()
            .await
            .map_err(|e| EngineError::Connection(e.to_string()))?;
        wire::decode_str(&body)
    }
}
