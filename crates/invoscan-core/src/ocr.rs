//! Client for the external OCR service.
//!
//! Recognition itself is an opaque external capability: the request carries
//! base64 image content and a language hint, the response yields block/line
//! segments that are concatenated in reading order. Token acquisition and
//! refresh happen outside this process.

use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::STANDARD};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::OcrConfig;
use crate::error::{InvoscanError, OcrError};

/// Converts an image to recognized text. May fail per-call; the scanner
/// treats every failure as recoverable and per-file.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract(&self, image: &[u8], language: &str) -> Result<String, OcrError>;
}

/// OCR client for a Vision-style batchAnalyze endpoint.
pub struct VisionClient {
    client: Client,
    endpoint: String,
    folder_id: String,
    iam_token: String,
}

impl VisionClient {
    pub fn new(config: &OcrConfig) -> Result<Self, InvoscanError> {
        let folder_id = config
            .folder_id
            .clone()
            .ok_or_else(|| InvoscanError::Config("OCR_FOLDER_ID is not set".into()))?;
        let iam_token = config
            .iam_token
            .clone()
            .ok_or_else(|| InvoscanError::Config("OCR_IAM_TOKEN is not set".into()))?;

        Ok(Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(120))
                .build()
                .unwrap_or_else(|_| Client::new()),
            endpoint: config.endpoint.clone(),
            folder_id,
            iam_token,
        })
    }
}

#[derive(Serialize)]
struct AnalyzeRequest {
    #[serde(rename = "folderId")]
    folder_id: String,
    analyze_specs: Vec<AnalyzeSpec>,
}

#[derive(Serialize)]
struct AnalyzeSpec {
    content: String,
    features: Vec<Feature>,
}

#[derive(Serialize)]
struct Feature {
    #[serde(rename = "type")]
    feature_type: String,
    text_detection_config: TextDetectionConfig,
}

#[derive(Serialize)]
struct TextDetectionConfig {
    language_codes: Vec<String>,
}

#[derive(Deserialize)]
struct AnalyzeResponse {
    #[serde(default)]
    results: Vec<SpecResult>,
}

#[derive(Deserialize)]
struct SpecResult {
    #[serde(default)]
    results: Vec<FeatureResult>,
}

#[derive(Deserialize)]
struct FeatureResult {
    #[serde(rename = "textDetection")]
    text_detection: Option<TextDetection>,
}

#[derive(Deserialize)]
struct TextDetection {
    #[serde(default)]
    pages: Vec<Page>,
}

#[derive(Deserialize)]
struct Page {
    #[serde(default)]
    blocks: Vec<Block>,
}

#[derive(Deserialize)]
struct Block {
    #[serde(default)]
    lines: Vec<Line>,
}

#[derive(Deserialize)]
struct Line {
    text: String,
}

impl AnalyzeResponse {
    /// Collect line texts in reading order.
    fn lines(self) -> Vec<String> {
        self.results
            .into_iter()
            .flat_map(|spec| spec.results)
            .filter_map(|feature| feature.text_detection)
            .flat_map(|detection| detection.pages)
            .flat_map(|page| page.blocks)
            .flat_map(|block| block.lines)
            .map(|line| line.text)
            .collect()
    }
}

#[async_trait]
impl TextExtractor for VisionClient {
    async fn extract(&self, image: &[u8], language: &str) -> Result<String, OcrError> {
        let request = AnalyzeRequest {
            folder_id: self.folder_id.clone(),
            analyze_specs: vec![AnalyzeSpec {
                content: STANDARD.encode(image),
                features: vec![Feature {
                    feature_type: "TEXT_DETECTION".to_string(),
                    text_detection_config: TextDetectionConfig {
                        language_codes: vec![language.to_string()],
                    },
                }],
            }],
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.iam_token))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(OcrError::Status { status, body });
        }

        let resp: AnalyzeResponse = response.json().await?;
        let lines = resp.lines();
        if lines.is_empty() {
            return Err(OcrError::NoText);
        }

        debug!("OCR recognized {} lines", lines.len());
        Ok(lines.join("\n"))
    }
}
