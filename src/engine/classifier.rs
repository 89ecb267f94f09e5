//! Frame classification against the reference index

use std::sync::Arc;

use image::RgbImage;

use crate::domain::model::Classification;
use crate::error::{ScreenTraceError, ScreenTraceResult};
use crate::features::{cross_check_count, Descriptor, FeatureExtractor, ReferenceIndex};

/// Labels a single frame
pub trait PageDetector: Send + Sync {
    /// Best-matching screen and its score
    fn detect(&self, frame: &RgbImage) -> ScreenTraceResult<Classification>;
}

/// Scores a frame against every reference screen by cross-checked matches
pub struct PageClassifier {
    index: Arc<ReferenceIndex>,
    extractor: FeatureExtractor,
}

impl PageClassifier {
    /// Frames are described with the same settings as the index
    pub fn new(index: Arc<ReferenceIndex>) -> Self {
        let extractor = FeatureExtractor::new(index.settings().clone());
        Self { index, extractor }
    }

    pub fn index(&self) -> &ReferenceIndex {
        &self.index
    }

    /// Highest-scoring screen for already extracted frame descriptors
    ///
    /// Screens are visited in id order and only a strictly greater score
    /// replaces the current best, so ties go to the smallest id.
    pub fn classify_descriptors(
        &self,
        descriptors: &[Descriptor],
    ) -> ScreenTraceResult<Classification> {
        let mut best: Option<(&str, u32)> = None;
        for screen in self.index.screens() {
            let score = cross_check_count(descriptors, &screen.descriptors);
            match best {
                Some((_, best_score)) if score <= best_score => {}
                _ => best = Some((screen.id.as_str(), score)),
            }
        }

        best.map(|(id, score)| Classification::new(id, score))
            .ok_or(ScreenTraceError::EmptyReferenceSet)
    }

    pub fn classify(&self, frame: &RgbImage) -> ScreenTraceResult<Classification> {
        if self.index.is_empty() {
            return Err(ScreenTraceError::EmptyReferenceSet);
        }
        self.classify_descriptors(&self.extractor.extract_rgb(frame))
    }
}

impl PageDetector for PageClassifier {
    fn detect(&self, frame: &RgbImage) -> ScreenTraceResult<Classification> {
        self.classify(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::FeatureSettings;
    use image::{DynamicImage, Rgb};
    use imageproc::drawing::draw_filled_rect_mut;
    use imageproc::rect::Rect;

    /// Scattered rectangles; distinct seeds give unrelated layouts
    fn screen(seed: u32, background: u8) -> RgbImage {
        let mut image = RgbImage::from_pixel(240, 240, Rgb([background; 3]));
        let mut state = seed;
        let mut next = move |modulo: u32| {
            state = state.wrapping_mul(1_103_515_245).wrapping_add(12_345);
            (state >> 8) % modulo
        };
        for _ in 0..16 {
            let (x, y) = (next(200), next(200));
            let shade = next(256) as u8;
            draw_filled_rect_mut(
                &mut image,
                Rect::at(x as i32, y as i32).of_size(18 + next(24), 14 + next(20)),
                Rgb([shade, 255 - shade, shade / 2]),
            );
        }
        image
    }

    fn home_screen() -> RgbImage {
        screen(7, 245)
    }

    fn settings_screen() -> RgbImage {
        screen(1234, 30)
    }

    fn index_of(screens: Vec<(&str, RgbImage)>) -> Arc<ReferenceIndex> {
        let extractor = FeatureExtractor::new(FeatureSettings::default().with_resize_factor(1.0));
        let images = screens
            .into_iter()
            .map(|(id, image)| (id.to_string(), DynamicImage::ImageRgb8(image)))
            .collect();
        Arc::new(ReferenceIndex::build(images, &extractor).unwrap())
    }

    #[test]
    fn test_frame_matches_its_own_screen() {
        let classifier = PageClassifier::new(index_of(vec![
            ("home", home_screen()),
            ("settings", settings_screen()),
        ]));

        let home = classifier.detect(&home_screen()).unwrap();
        assert_eq!(home.label, "home");
        assert!(home.score > 0);

        let settings = classifier.detect(&settings_screen()).unwrap();
        assert_eq!(settings.label, "settings");
    }

    #[test]
    fn test_ties_resolve_to_smallest_id() {
        let classifier = PageClassifier::new(index_of(vec![
            ("zeta", home_screen()),
            ("alpha", home_screen()),
        ]));
        let result = classifier.detect(&home_screen()).unwrap();
        assert_eq!(result.label, "alpha");
    }

    #[test]
    fn test_featureless_frame_scores_zero() {
        let classifier = PageClassifier::new(index_of(vec![
            ("home", home_screen()),
            ("about", settings_screen()),
        ]));
        let blank = RgbImage::from_pixel(240, 240, Rgb([128, 128, 128]));
        let result = classifier.detect(&blank).unwrap();
        assert_eq!(result, Classification::new("about", 0));
    }

    #[test]
    fn test_empty_index() {
        let classifier = PageClassifier::new(index_of(vec![]));
        let err = classifier.detect(&home_screen()).unwrap_err();
        assert!(matches!(err, ScreenTraceError::EmptyReferenceSet));
        assert!(matches!(
            classifier.classify_descriptors(&[]),
            Err(ScreenTraceError::EmptyReferenceSet)
        ));
    }
}
