use anyhow::Result;
use image::RgbImage;

use crate::models::Detection;

/// Object-detection collaborator.
///
/// The detector is a black box: decoded RGB pixels and a target inference
/// size in, a list of detections out. Confidence cutoff, IoU suppression and
/// max-detection limits are the detector's own configuration and are never
/// set from this side.
#[async_trait::async_trait]
pub trait DetectorService: Send + Sync {
    async fn detect(&self, image: &RgbImage, size: u32) -> Result<Vec<Detection>>;

    /// Probed once at startup; the process refuses traffic on failure.
    async fn health_check(&self) -> Result<()> {
        Ok(())
    }
}

/// Fixed-playback detector for tests and local runs without a model server
/// (select with DETECTOR_BACKEND=mock).
pub struct MockDetector {
    detections: Vec<Detection>,
}

impl MockDetector {
    pub fn new(detections: Vec<Detection>) -> Self {
        Self { detections }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }
}

#[async_trait::async_trait]
impl DetectorService for MockDetector {
    async fn detect(&self, image: &RgbImage, size: u32) -> Result<Vec<Detection>> {
        log::info!(
            "🧪 Mock detector: {}x{} image (inference size {}) -> {} detections",
            image.width(),
            image.height(),
            size,
            self.detections.len()
        );
        Ok(self.detections.clone())
    }
}
