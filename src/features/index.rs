//! Reference screen index
//!
//! Every reference screenshot is reduced to its descriptor set once, before
//! any video is sampled. Screens are kept in id order so that every consumer
//! (notably the classifier's tie-break) iterates them deterministically.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use image::DynamicImage;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::MediaPolicy;
use crate::error::{ScreenTraceError, ScreenTraceResult};
use crate::features::{Descriptor, FeatureExtractor, FeatureSettings};
use crate::utils::cancel::CancellationToken;
use crate::utils::path::screen_id;

/// Descriptors of one labelled reference image
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceScreen {
    /// File stem of the reference image
    pub id: String,
    pub descriptors: Vec<Descriptor>,
    /// Image file the screen was loaded from
    pub source: Option<PathBuf>,
}

/// Per-screen summary used by the `index` command
#[derive(Debug, Clone, Serialize)]
pub struct ScreenSummary {
    pub id: String,
    pub descriptors: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<PathBuf>,
}

/// Immutable map from screen id to descriptor set
#[derive(Debug, Clone)]
pub struct ReferenceIndex {
    screens: BTreeMap<String, ReferenceScreen>,
    settings: FeatureSettings,
}

impl ReferenceIndex {
    /// Build from already decoded images, one parallel task per image
    pub fn build(
        images: Vec<(String, DynamicImage)>,
        extractor: &FeatureExtractor,
    ) -> ScreenTraceResult<Self> {
        let screens: Vec<ReferenceScreen> = images
            .into_par_iter()
            .map(|(id, image)| ReferenceScreen {
                descriptors: extractor.extract(&image),
                id,
                source: None,
            })
            .collect();

        Self::from_screens(screens, extractor.settings().clone())
    }

    /// Decode and index reference images from disk
    ///
    /// Unreadable images abort the build under [`MediaPolicy::Strict`] and are
    /// skipped with a warning under [`MediaPolicy::Lenient`].
    pub fn load(
        paths: &[PathBuf],
        extractor: &FeatureExtractor,
        policy: MediaPolicy,
        cancel: &CancellationToken,
    ) -> ScreenTraceResult<Self> {
        info!("Indexing {} reference images", paths.len());

        let results: Vec<ScreenTraceResult<ReferenceScreen>> = paths
            .par_iter()
            .map(|path| {
                cancel.check()?;
                load_screen(path, extractor)
            })
            .collect();

        let mut screens = Vec::with_capacity(results.len());
        for (path, result) in paths.iter().zip(results) {
            match result {
                Ok(screen) => screens.push(screen),
                Err(e) if policy.is_lenient() && e.is_recoverable_media_error() => {
                    warn!("Skipping reference image {}: {}", path.display(), e);
                }
                Err(e) => return Err(e),
            }
        }

        let index = Self::from_screens(screens, extractor.settings().clone())?;
        info!(
            "Reference index ready: {} screens, {} descriptors",
            index.len(),
            index.descriptor_count()
        );
        Ok(index)
    }

    fn from_screens(
        screens: Vec<ReferenceScreen>,
        settings: FeatureSettings,
    ) -> ScreenTraceResult<Self> {
        let mut map = BTreeMap::new();
        for screen in screens {
            if screen.descriptors.is_empty() {
                warn!("Reference screen '{}' has no features and can never match", screen.id);
            }
            if map.contains_key(&screen.id) {
                return Err(ScreenTraceError::DuplicateScreen { id: screen.id });
            }
            map.insert(screen.id.clone(), screen);
        }
        Ok(Self {
            screens: map,
            settings,
        })
    }

    pub fn len(&self) -> usize {
        self.screens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.screens.is_empty()
    }

    /// Screens in ascending id order
    pub fn screens(&self) -> impl Iterator<Item = &ReferenceScreen> {
        self.screens.values()
    }

    pub fn get(&self, id: &str) -> Option<&ReferenceScreen> {
        self.screens.get(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.screens.keys().map(String::as_str)
    }

    /// Settings the descriptors were extracted with
    pub fn settings(&self) -> &FeatureSettings {
        &self.settings
    }

    /// Total descriptors across every screen
    pub fn descriptor_count(&self) -> usize {
        self.screens.values().map(|s| s.descriptors.len()).sum()
    }

    pub fn summary(&self) -> Vec<ScreenSummary> {
        self.screens
            .values()
            .map(|s| ScreenSummary {
                id: s.id.clone(),
                descriptors: s.descriptors.len(),
                source: s.source.clone(),
            })
            .collect()
    }
}

fn load_screen(path: &Path, extractor: &FeatureExtractor) -> ScreenTraceResult<ReferenceScreen> {
    let id = screen_id(path)?;
    let image = image::open(path).map_err(|e| ScreenTraceError::unreadable(path, e))?;
    let descriptors = extractor.extract(&image);
    debug!("Indexed '{}' with {} descriptors", id, descriptors.len());

    Ok(ReferenceScreen {
        id,
        descriptors,
        source: Some(path.to_path_buf()),
    })
}
