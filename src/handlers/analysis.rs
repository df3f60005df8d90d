use std::collections::BTreeMap;
use std::sync::Arc;

use crate::models::{CalorieValue, Detection, DetectionSummary};
use crate::services::{CalorieTable, DetectorService};

/// Per-request failure at the analysis boundary.
#[derive(Debug)]
pub enum AnalysisError {
    /// Uploaded bytes could not be decoded as an image.
    InvalidImage(String),
    /// The detector collaborator failed for this request.
    DetectorFailure(String),
}

impl std::fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnalysisError::InvalidImage(msg) => write!(f, "invalid image: {}", msg),
            AnalysisError::DetectorFailure(msg) => write!(f, "detector failure: {}", msg),
        }
    }
}

impl std::error::Error for AnalysisError {}

/// Reduce raw detections to per-label counts and calorie estimates.
///
/// Pure and order-invariant: no deduplication by spatial overlap, no
/// filtering. One detected instance counts as a single 100 g serving.
/// Labels with no table value appear as `Unknown` and stay out of the total.
pub fn summarize(table: &CalorieTable, detections: &[Detection]) -> DetectionSummary {
    let mut counts: BTreeMap<String, u32> = BTreeMap::new();
    for detection in detections {
        *counts.entry(detection.label.clone()).or_insert(0) += 1;
    }

    let mut calories: BTreeMap<String, CalorieValue> = BTreeMap::new();
    let mut total_calories: u32 = 0;

    for (label, count) in &counts {
        match table.lookup(label) {
            CalorieValue::Known(per_100g) => {
                let estimate = per_100g * count;
                total_calories += estimate;
                calories.insert(label.clone(), CalorieValue::Known(estimate));
            }
            CalorieValue::Unknown => {
                calories.insert(label.clone(), CalorieValue::Unknown);
            }
        }
    }

    DetectionSummary {
        counts,
        calories,
        total_calories,
    }
}

/// Orchestrates one upload: decode in memory, detect, summarize.
pub struct AnalysisHandler {
    detector: Arc<dyn DetectorService>,
    table: Arc<CalorieTable>,
    inference_size: u32,
}

impl AnalysisHandler {
    pub fn new(
        detector: Arc<dyn DetectorService>,
        table: Arc<CalorieTable>,
        inference_size: u32,
    ) -> Self {
        Self {
            detector,
            table,
            inference_size,
        }
    }

    /// The upload lives only in this scope; nothing touches disk on any
    /// path.
    pub async fn analyze(
        &self,
        filename: Option<&str>,
        bytes: &[u8],
    ) -> Result<DetectionSummary, AnalysisError> {
        log::info!(
            "📸 Analyzing upload '{}' ({} bytes)",
            filename.unwrap_or("<unnamed>"),
            bytes.len()
        );

        let image = image::load_from_memory(bytes)
            .map_err(|e| AnalysisError::InvalidImage(e.to_string()))?
            .to_rgb8();

        let detections = self
            .detector
            .detect(&image, self.inference_size)
            .await
            .map_err(|e| AnalysisError::DetectorFailure(e.to_string()))?;

        let summary = summarize(&self.table, &detections);
        log::info!(
            "🍽️ {} detections across {} foods, {} kcal estimated",
            detections.len(),
            summary.counts.len(),
            summary.total_calories
        );

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BoundingBox;
    use crate::services::MockDetector;
    use std::io::Cursor;

    fn det(label: &str) -> Detection {
        det_at(label, 0.0, 0.0)
    }

    fn det_at(label: &str, x1: f32, y1: f32) -> Detection {
        Detection {
            label: label.to_string(),
            confidence: 0.8,
            bbox: BoundingBox {
                x1,
                y1,
                x2: x1 + 50.0,
                y2: y1 + 50.0,
            },
        }
    }

    fn table() -> CalorieTable {
        CalorieTable::builtin()
    }

    #[test]
    fn test_empty_detection_list() {
        let summary = summarize(&table(), &[]);
        assert_eq!(summary, DetectionSummary::empty());
    }

    #[test]
    fn test_counts_and_calories_scale_with_occurrences() {
        // rice appears twice: 2 * 130 kcal, pizza once: 268 kcal.
        let summary = summarize(&table(), &[det("rice"), det("rice"), det("pizza")]);

        assert_eq!(summary.counts.get("rice"), Some(&2));
        assert_eq!(summary.counts.get("pizza"), Some(&1));
        assert_eq!(summary.calories.get("rice"), Some(&CalorieValue::Known(260)));
        assert_eq!(summary.calories.get("pizza"), Some(&CalorieValue::Known(268)));
        assert_eq!(summary.total_calories, 528);
    }

    #[test]
    fn test_unavailable_marker_is_unknown_and_excluded() {
        let summary = summarize(&table(), &[det("croissant")]);

        assert_eq!(summary.counts.get("croissant"), Some(&1));
        assert_eq!(
            summary.calories.get("croissant"),
            Some(&CalorieValue::Unknown)
        );
        assert_eq!(summary.total_calories, 0);
    }

    #[test]
    fn test_label_absent_from_table_is_unknown() {
        let summary = summarize(&table(), &[det("dragon fruit smoothie")]);

        assert_eq!(summary.counts.get("dragon fruit smoothie"), Some(&1));
        assert_eq!(
            summary.calories.get("dragon fruit smoothie"),
            Some(&CalorieValue::Unknown)
        );
        assert_eq!(summary.total_calories, 0);
    }

    #[test]
    fn test_mixed_known_and_unknown() {
        let summary = summarize(&table(), &[det("rice"), det("eels on rice")]);

        assert_eq!(summary.calories.get("rice"), Some(&CalorieValue::Known(130)));
        assert_eq!(
            summary.calories.get("eels on rice"),
            Some(&CalorieValue::Unknown)
        );
        assert_eq!(summary.total_calories, 130);
    }

    #[test]
    fn test_every_label_unknown_totals_zero() {
        let summary = summarize(&table(), &[det("croissant"), det("chip butty")]);

        assert_eq!(summary.total_calories, 0);
        assert!(summary
            .calories
            .values()
            .all(|v| *v == CalorieValue::Unknown));
    }

    #[test]
    fn test_overlapping_boxes_still_count_separately() {
        // Spatial dedup is the detector's job, not ours.
        let summary = summarize(
            &table(),
            &[det_at("sushi", 10.0, 10.0), det_at("sushi", 12.0, 11.0)],
        );
        assert_eq!(summary.counts.get("sushi"), Some(&2));
        assert_eq!(summary.calories.get("sushi"), Some(&CalorieValue::Known(286)));
    }

    #[test]
    fn test_count_sum_matches_input_length() {
        let detections = vec![
            det("rice"),
            det("rice"),
            det("miso soup"),
            det("croissant"),
            det("sushi"),
        ];
        let summary = summarize(&table(), &detections);

        let count_sum: u32 = summary.counts.values().sum();
        assert_eq!(count_sum as usize, detections.len());
    }

    #[test]
    fn test_counts_and_calories_share_keys() {
        let summary = summarize(&table(), &[det("rice"), det("croissant"), det("nope")]);
        let count_keys: Vec<_> = summary.counts.keys().collect();
        let calorie_keys: Vec<_> = summary.calories.keys().collect();
        assert_eq!(count_keys, calorie_keys);
    }

    #[test]
    fn test_total_equals_sum_of_known_entries() {
        let summary = summarize(
            &table(),
            &[det("rice"), det("pizza"), det("croissant"), det("pizza")],
        );

        let known_sum: u32 = summary
            .calories
            .values()
            .map(|v| match v {
                CalorieValue::Known(kcal) => *kcal,
                CalorieValue::Unknown => 0,
            })
            .sum();
        assert_eq!(summary.total_calories, known_sum);
    }

    #[test]
    fn test_order_invariance_and_idempotence() {
        let forward = vec![det("rice"), det("pizza"), det("rice"), det("croissant")];
        let mut reversed = forward.clone();
        reversed.reverse();

        let first = summarize(&table(), &forward);
        let second = summarize(&table(), &forward);
        let shuffled = summarize(&table(), &reversed);

        assert_eq!(first, second);
        assert_eq!(first, shuffled);
    }

    #[test]
    fn test_injected_table_overrides_builtin() {
        let table = CalorieTable::from_json_str(r#"{"rice": 200}"#).unwrap();
        let summary = summarize(&table, &[det("rice"), det("pizza")]);

        assert_eq!(summary.calories.get("rice"), Some(&CalorieValue::Known(200)));
        assert_eq!(summary.calories.get("pizza"), Some(&CalorieValue::Unknown));
        assert_eq!(summary.total_calories, 200);
    }

    fn png_bytes() -> Vec<u8> {
        let image = image::RgbImage::new(8, 8);
        let mut buffer = Cursor::new(Vec::new());
        image.write_to(&mut buffer, image::ImageFormat::Png).unwrap();
        buffer.into_inner()
    }

    fn handler_with(detections: Vec<Detection>) -> AnalysisHandler {
        AnalysisHandler::new(
            Arc::new(MockDetector::new(detections)),
            Arc::new(CalorieTable::builtin()),
            640,
        )
    }

    #[tokio::test]
    async fn test_analyze_happy_path() {
        let handler = handler_with(vec![det("rice"), det("rice"), det("pizza")]);
        let summary = handler
            .analyze(Some("meal.png"), &png_bytes())
            .await
            .unwrap();

        assert_eq!(summary.total_calories, 528);
    }

    #[tokio::test]
    async fn test_analyze_rejects_undecodable_bytes() {
        let handler = handler_with(vec![]);
        let err = handler
            .analyze(Some("notes.txt"), b"definitely not an image")
            .await
            .unwrap_err();

        assert!(matches!(err, AnalysisError::InvalidImage(_)));
    }

    #[tokio::test]
    async fn test_analyze_empty_detections_is_valid_result() {
        let handler = handler_with(vec![]);
        let summary = handler.analyze(None, &png_bytes()).await.unwrap();
        assert_eq!(summary, DetectionSummary::empty());
    }
}
