//! Analysis configuration
//!
//! Configuration arrives in layers (defaults, file, environment, command
//! line). Each layer is a [`ConfigLayer`] whose fields are all optional; the
//! merged layer is validated once into an immutable [`AnalysisConfig`] that is
//! passed to the pipeline.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::domain::timeline::DEFAULT_FEATURE_CUTOFF;
use crate::error::{ScreenTraceError, ScreenTraceResult};
use crate::features::FeatureSettings;

pub mod extensions;
pub mod loader;

pub use extensions::ExtensionSet;
pub use loader::{load_configuration, ENV_PREFIX};

/// Default output directory for generated CSV files
pub const DEFAULT_OUTPUT_DIR: &str = "generated_metrics";
/// Default number of samples analysed per second of video
pub const DEFAULT_SAMPLE_RATE: u32 = 2;

/// What to do when a reference image or video cannot be decoded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaPolicy {
    /// Abort the run
    #[default]
    Strict,
    /// Skip the file and report a warning
    Lenient,
}

impl MediaPolicy {
    pub fn from_lenient(lenient: bool) -> Self {
        if lenient {
            Self::Lenient
        } else {
            Self::Strict
        }
    }

    pub fn is_lenient(self) -> bool {
        self == Self::Lenient
    }
}

/// Feature extraction overrides within a layer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FeatureLayer {
    pub max_features: Option<i64>,
    pub fast_threshold: Option<i64>,
    pub pyramid_levels: Option<i64>,
    pub scale_factor: Option<f64>,
}

impl FeatureLayer {
    fn merge(self, higher: FeatureLayer) -> FeatureLayer {
        FeatureLayer {
            max_features: higher.max_features.or(self.max_features),
            fast_threshold: higher.fast_threshold.or(self.fast_threshold),
            pyramid_levels: higher.pyramid_levels.or(self.pyramid_levels),
            scale_factor: higher.scale_factor.or(self.scale_factor),
        }
    }
}

/// One layer of unvalidated settings
///
/// Integer fields are signed so that negative input is reported as a
/// configuration error instead of failing to parse.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigLayer {
    pub sample_rate: Option<i64>,
    pub resize_factor: Option<f64>,
    pub feature_cutoff: Option<i64>,
    pub output_dir: Option<PathBuf>,
    pub write_header: Option<bool>,
    pub lenient: Option<bool>,
    pub jobs: Option<i64>,
    pub image_types: Option<Vec<String>>,
    pub video_types: Option<Vec<String>>,
    pub features: Option<FeatureLayer>,
}

impl ConfigLayer {
    /// Combine with a higher-precedence layer; set fields in `higher` win
    pub fn merge(self, higher: ConfigLayer) -> ConfigLayer {
        let features = match (self.features, higher.features) {
            (Some(low), Some(high)) => Some(low.merge(high)),
            (low, high) => high.or(low),
        };

        ConfigLayer {
            sample_rate: higher.sample_rate.or(self.sample_rate),
            resize_factor: higher.resize_factor.or(self.resize_factor),
            feature_cutoff: higher.feature_cutoff.or(self.feature_cutoff),
            output_dir: higher.output_dir.or(self.output_dir),
            write_header: higher.write_header.or(self.write_header),
            lenient: higher.lenient.or(self.lenient),
            jobs: higher.jobs.or(self.jobs),
            image_types: higher.image_types.or(self.image_types),
            video_types: higher.video_types.or(self.video_types),
            features,
        }
    }
}

/// Validated, immutable settings for one run
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    /// Samples analysed per second of video
    pub sample_rate: u32,
    /// Scores at or below this are low confidence
    pub feature_cutoff: u32,
    pub features: FeatureSettings,
    pub output_dir: PathBuf,
    pub write_header: bool,
    pub media_policy: MediaPolicy,
    /// Videos analysed concurrently
    pub jobs: usize,
    pub image_extensions: ExtensionSet,
    pub video_extensions: ExtensionSet,
}

impl AnalysisConfig {
    /// Validate a merged layer; missing fields take their defaults
    pub fn from_layer(layer: ConfigLayer) -> ScreenTraceResult<Self> {
        let sample_rate = match layer.sample_rate {
            None => DEFAULT_SAMPLE_RATE,
            Some(rate) if rate > 0 && rate <= u32::MAX as i64 => rate as u32,
            Some(rate) => {
                return Err(ScreenTraceError::invalid_config(format!(
                    "sample_rate must be a positive integer, got {}",
                    rate
                )))
            }
        };

        let feature_cutoff = match layer.feature_cutoff {
            None => DEFAULT_FEATURE_CUTOFF,
            Some(cutoff) if (0..=u32::MAX as i64).contains(&cutoff) => cutoff as u32,
            Some(cutoff) => {
                return Err(ScreenTraceError::invalid_config(format!(
                    "feature_cutoff must be non-negative, got {}",
                    cutoff
                )))
            }
        };

        let jobs = match layer.jobs {
            None => num_cpus::get().max(1),
            Some(jobs) if jobs > 0 => jobs as usize,
            Some(jobs) => {
                return Err(ScreenTraceError::invalid_config(format!(
                    "jobs must be positive, got {}",
                    jobs
                )))
            }
        };

        let features = feature_settings(layer.resize_factor, layer.features.unwrap_or_default())?;

        let image_extensions = ExtensionSet::images(layer.image_types.unwrap_or_default())?;
        let video_extensions = ExtensionSet::videos(layer.video_types.unwrap_or_default())?;

        Ok(Self {
            sample_rate,
            feature_cutoff,
            features,
            output_dir: layer
                .output_dir
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR)),
            write_header: layer.write_header.unwrap_or(true),
            media_policy: MediaPolicy::from_lenient(layer.lenient.unwrap_or(false)),
            jobs,
            image_extensions,
            video_extensions,
        })
    }

    /// Milliseconds between analysed frames
    pub fn interval_ms(&self) -> f64 {
        sampling_interval_ms(self.sample_rate)
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            feature_cutoff: DEFAULT_FEATURE_CUTOFF,
            features: FeatureSettings::default(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            write_header: true,
            media_policy: MediaPolicy::Strict,
            jobs: 1,
            image_extensions: ExtensionSet::default_images(),
            video_extensions: ExtensionSet::default_videos(),
        }
    }
}

/// `1000 / sample_rate`
pub fn sampling_interval_ms(sample_rate: u32) -> f64 {
    1000.0 / sample_rate as f64
}

fn feature_settings(
    resize_factor: Option<f64>,
    layer: FeatureLayer,
) -> ScreenTraceResult<FeatureSettings> {
    let defaults = FeatureSettings::default();

    let positive = |name: &str, value: Option<i64>, default: usize| match value {
        None => Ok(default),
        Some(v) if v > 0 => Ok(v as usize),
        Some(v) => Err(ScreenTraceError::invalid_config(format!(
            "{} must be positive, got {}",
            name, v
        ))),
    };

    let fast_threshold = match layer.fast_threshold {
        None => defaults.fast_threshold,
        Some(v) if (1..=255).contains(&v) => v as u8,
        Some(v) => {
            return Err(ScreenTraceError::invalid_config(format!(
                "fast_threshold must be in 1..=255, got {}",
                v
            )))
        }
    };

    let settings = FeatureSettings {
        resize_factor: resize_factor
            .map(|f| f as f32)
            .unwrap_or(defaults.resize_factor),
        max_features: positive("max_features", layer.max_features, defaults.max_features)?,
        fast_threshold,
        pyramid_levels: positive("pyramid_levels", layer.pyramid_levels, defaults.pyramid_levels)?,
        scale_factor: layer
            .scale_factor
            .map(|f| f as f32)
            .unwrap_or(defaults.scale_factor),
    };

    settings
        .validate()
        .map_err(ScreenTraceError::invalid_config)?;
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AnalysisConfig::from_layer(ConfigLayer::default()).unwrap();
        assert_eq!(config.sample_rate, 2);
        assert_eq!(config.feature_cutoff, 10);
        assert_eq!(config.features.resize_factor, 0.25);
        assert_eq!(config.output_dir, PathBuf::from("generated_metrics"));
        assert!(config.write_header);
        assert_eq!(config.media_policy, MediaPolicy::Strict);
        assert!(config.jobs >= 1);
        assert!(config.image_extensions.contains("png"));
        assert!(config.video_extensions.contains("mp4"));
    }

    #[test]
    fn test_interval_is_exact() {
        for rate in [1u32, 2, 3, 7, 30, 1000] {
            let config = AnalysisConfig {
                sample_rate: rate,
                ..AnalysisConfig::default()
            };
            assert_eq!(config.interval_ms(), 1000.0 / rate as f64);
        }
        assert_eq!(sampling_interval_ms(2), 500.0);
    }

    #[test]
    fn test_invalid_sample_rate() {
        for rate in [0, -2] {
            let layer = ConfigLayer {
                sample_rate: Some(rate),
                ..ConfigLayer::default()
            };
            let err = AnalysisConfig::from_layer(layer).unwrap_err();
            assert!(matches!(err, ScreenTraceError::InvalidConfiguration { .. }));
        }
    }

    #[test]
    fn test_invalid_resize_factor() {
        for factor in [0.0, -0.5, 1.01] {
            let layer = ConfigLayer {
                resize_factor: Some(factor),
                ..ConfigLayer::default()
            };
            assert!(AnalysisConfig::from_layer(layer).is_err());
        }
    }

    #[test]
    fn test_negative_cutoff() {
        let layer = ConfigLayer {
            feature_cutoff: Some(-1),
            ..ConfigLayer::default()
        };
        assert!(AnalysisConfig::from_layer(layer).is_err());

        let layer = ConfigLayer {
            feature_cutoff: Some(0),
            ..ConfigLayer::default()
        };
        assert_eq!(AnalysisConfig::from_layer(layer).unwrap().feature_cutoff, 0);
    }

    #[test]
    fn test_merge_precedence() {
        let file = ConfigLayer {
            sample_rate: Some(4),
            resize_factor: Some(0.5),
            features: Some(FeatureLayer {
                max_features: Some(800),
                ..FeatureLayer::default()
            }),
            ..ConfigLayer::default()
        };
        let cli = ConfigLayer {
            sample_rate: Some(1),
            features: Some(FeatureLayer {
                fast_threshold: Some(30),
                ..FeatureLayer::default()
            }),
            ..ConfigLayer::default()
        };

        let config = AnalysisConfig::from_layer(file.merge(cli)).unwrap();
        assert_eq!(config.sample_rate, 1);
        assert_eq!(config.features.resize_factor, 0.5);
        assert_eq!(config.features.max_features, 800);
        assert_eq!(config.features.fast_threshold, 30);
    }

    #[test]
    fn test_extra_extensions() {
        let layer = ConfigLayer {
            image_types: Some(vec!["WEBP".to_string()]),
            video_types: Some(vec![".mkv".to_string()]),
            ..ConfigLayer::default()
        };
        let config = AnalysisConfig::from_layer(layer).unwrap();
        assert!(config.image_extensions.contains("webp"));
        assert!(config.video_extensions.contains("mkv"));
        assert!(config.video_extensions.contains("mov"));
    }

    #[test]
    fn test_lenient_policy() {
        let layer = ConfigLayer {
            lenient: Some(true),
            ..ConfigLayer::default()
        };
        let config = AnalysisConfig::from_layer(layer).unwrap();
        assert!(config.media_policy.is_lenient());
    }
}
