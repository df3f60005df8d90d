use std::io::Cursor;

use anyhow::Result;
use base64::{engine::general_purpose, Engine};
use image::{ImageFormat, RgbImage};
use serde::{Deserialize, Serialize};

use crate::models::{BoundingBox, Detection};
use crate::services::DetectorService;

#[derive(Debug, Serialize)]
struct InferenceRequest {
    image: String,
    size: u32,
}

#[derive(Debug, Deserialize)]
struct InferenceResponse {
    detections: Vec<WireDetection>,
}

#[derive(Debug, Deserialize)]
struct WireDetection {
    label: String,
    confidence: f32,
    #[serde(rename = "box")]
    bbox: [f32; 4],
}

/// Client for an external inference server that wraps the detection model.
///
/// The server owns the model weights and all suppression thresholds; this
/// client only ships pixels and reads back detections.
pub struct RemoteDetector {
    base_url: String,
    client: reqwest::Client,
}

impl RemoteDetector {
    pub fn new(base_url: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }
}

/// Re-encode the decoded pixels as a PNG data URL for the JSON payload.
fn encode_image(image: &RgbImage) -> Result<String> {
    let mut png = Cursor::new(Vec::new());
    image.write_to(&mut png, ImageFormat::Png)?;
    let encoded = general_purpose::STANDARD.encode(png.into_inner());
    Ok(format!("data:image/png;base64,{}", encoded))
}

fn parse_detections(body: &str) -> Result<Vec<Detection>> {
    let response: InferenceResponse = serde_json::from_str(body)?;
    let detections = response
        .detections
        .into_iter()
        .map(|wire| Detection {
            label: wire.label,
            confidence: wire.confidence,
            bbox: BoundingBox {
                x1: wire.bbox[0],
                y1: wire.bbox[1],
                x2: wire.bbox[2],
                y2: wire.bbox[3],
            },
        })
        .collect();
    Ok(detections)
}

#[async_trait::async_trait]
impl DetectorService for RemoteDetector {
    async fn detect(&self, image: &RgbImage, size: u32) -> Result<Vec<Detection>> {
        let request = InferenceRequest {
            image: encode_image(image)?,
            size,
        };

        log::debug!(
            "📤 Sending {}x{} image to detector (inference size {})",
            image.width(),
            image.height(),
            size
        );

        let response = self
            .client
            .post(format!("{}/detect", self.base_url))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            log::error!("❌ Detector error response: {}", error_text);
            anyhow::bail!("detector error ({}): {}", status, error_text);
        }

        let body = response.text().await?;
        let detections = parse_detections(&body)?;
        log::debug!("📥 Detector returned {} detections", detections.len());
        Ok(detections)
    }

    async fn health_check(&self) -> Result<()> {
        let response = self
            .client
            .get(format!("{}/health", self.base_url))
            .send()
            .await?;

        if !response.status().is_success() {
            anyhow::bail!("detector health check failed: HTTP {}", response.status());
        }
        Ok(())
    }
}
