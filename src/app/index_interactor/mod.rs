// Index interactor - Builds the reference index and reports on it

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use crate::config::AnalysisConfig;
use crate::error::{ScreenTraceError, ScreenTraceResult};
use crate::features::index::ScreenSummary;
use crate::features::{FeatureExtractor, ReferenceIndex};
use crate::utils::cancel::CancellationToken;
use crate::utils::path::discover_media;

/// Discover reference images in `screens_dir` and index them
///
/// Fails with `EmptyReferenceSet` when nothing usable was found.
pub fn load_reference_index(
    screens_dir: &Path,
    config: &AnalysisConfig,
    cancel: &CancellationToken,
) -> ScreenTraceResult<ReferenceIndex> {
    let images = discover_media(screens_dir, &config.image_extensions)?;
    info!(
        "Found {} reference images in {} ({})",
        images.len(),
        screens_dir.display(),
        config.image_extensions
    );
    if images.is_empty() {
        return Err(ScreenTraceError::EmptyReferenceSet);
    }

    let extractor = FeatureExtractor::new(config.features.clone());
    let index = ReferenceIndex::load(&images, &extractor, config.media_policy, cancel)?;
    if index.is_empty() {
        return Err(ScreenTraceError::EmptyReferenceSet);
    }
    Ok(index)
}

/// Interactor for the reference index report
pub struct IndexInteractor {
    config: AnalysisConfig,
    cancel: CancellationToken,
}

impl IndexInteractor {
    pub fn new(config: AnalysisConfig, cancel: CancellationToken) -> Self {
        Self { config, cancel }
    }

    /// Build the index on a blocking worker and summarise it
    pub async fn execute(&self, request: IndexRequest) -> ScreenTraceResult<IndexResponse> {
        let config = self.config.clone();
        let cancel = self.cancel.clone();
        let screens_dir = request.screens_dir.clone();

        let index = tokio::task::spawn_blocking(move || {
            load_reference_index(&screens_dir, &config, &cancel)
        })
        .await
        .map_err(|e| ScreenTraceError::WorkerError {
            message: e.to_string(),
        })??;

        Ok(IndexResponse {
            screens_dir: request.screens_dir,
            resize_factor: index.settings().resize_factor,
            total_descriptors: index.descriptor_count(),
            screens: index.summary(),
        })
    }
}

/// Request for an index report
#[derive(Debug, Clone)]
pub struct IndexRequest {
    pub screens_dir: PathBuf,
}

/// Reference index statistics
#[derive(Debug, Clone, Serialize)]
pub struct IndexResponse {
    pub screens_dir: PathBuf,
    pub resize_factor: f32,
    pub total_descriptors: usize,
    pub screens: Vec<ScreenSummary>,
}

impl IndexResponse {
    /// Format as human-readable text
    pub fn format_as_text(&self) -> String {
        let mut output = String::new();
        output.push_str(&format!("Reference screens in {}:\n", self.screens_dir.display()));
        output.push_str(&format!("  Resize factor: {}\n", self.resize_factor));
        for screen in &self.screens {
            output.push_str(&format!("  {:<32} {:>5} descriptors\n", screen.id, screen.descriptors));
        }
        output.push_str(&format!(
            "  Total: {} screens, {} descriptors\n",
            self.screens.len(),
            self.total_descriptors
        ));
        output
    }

    /// Format as JSON
    pub fn format_as_json(&self) -> ScreenTraceResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| ScreenTraceError::OutputError {
            message: format!("JSON serialization failed: {}", e),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};
    use imageproc::drawing::draw_filled_rect_mut;
    use imageproc::rect::Rect;

    fn save_screen(dir: &Path, name: &str, offset: i32) {
        let mut image = GrayImage::from_pixel(160, 160, Luma([230u8]));
        for i in 0..4 {
            draw_filled_rect_mut(
                &mut image,
                Rect::at(20 + i * 30, 20 + (offset + i * 23) % 90).of_size(18, 24),
                Luma([(i * 50) as u8]),
            );
        }
        image.save(dir.join(name)).unwrap();
    }

    fn config() -> AnalysisConfig {
        let mut config = AnalysisConfig::default();
        config.features.resize_factor = 1.0;
        config
    }

    #[tokio::test]
    async fn test_index_report() {
        let dir = tempfile::tempdir().unwrap();
        save_screen(dir.path(), "settings.png", 40);
        save_screen(dir.path(), "home.png", 0);
        std::fs::write(dir.path().join("notes.txt"), b"ignored").unwrap();

        let response = IndexInteractor::new(config(), CancellationToken::new())
            .execute(IndexRequest {
                screens_dir: dir.path().to_path_buf(),
            })
            .await
            .unwrap();

        let ids: Vec<_> = response.screens.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["home", "settings"]);
        assert!(response.format_as_text().contains("Total: 2 screens"));

        let json: serde_json::Value =
            serde_json::from_str(&response.format_as_json().unwrap()).unwrap();
        assert_eq!(json["screens"][0]["id"], "home");
    }

    #[test]
    fn test_empty_screens_dir() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_reference_index(dir.path(), &config(), &CancellationToken::new())
            .unwrap_err();
        assert!(matches!(err, ScreenTraceError::EmptyReferenceSet));
    }

    #[test]
    fn test_all_images_unreadable_under_lenient_policy() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("home.png"), b"garbage").unwrap();

        let mut config = config();
        config.media_policy = crate::config::MediaPolicy::Lenient;
        let err = load_reference_index(dir.path(), &config, &CancellationToken::new())
            .unwrap_err();
        assert!(matches!(err, ScreenTraceError::EmptyReferenceSet));
    }
}
