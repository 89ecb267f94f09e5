//! Oriented FAST keypoints with steered binary descriptors

use image::imageops::FilterType;
use image::{DynamicImage, GrayImage, RgbImage};
use imageproc::corners::{corners_fast9, Corner};
use imageproc::filter::gaussian_blur_f32;

use crate::features::{Descriptor, FeatureSettings};

/// Radius of the patch used for orientation
const ORIENTATION_RADIUS: i32 = 15;
/// Half-size of the square the binary tests are drawn from
const PATCH_HALF: i32 = 13;
/// Keypoints closer than this to the border are dropped
const EDGE: u32 = 19;
/// Side of the cells used to thin out clustered corners
const SUPPRESSION_CELL: u32 = 4;
const DESCRIPTOR_BITS: usize = 256;
const SMOOTHING_SIGMA: f32 = 2.0;
const PATTERN_SEED: u64 = 0x5C4E_E17A_CE00_0001;

/// One binary test: compare the smoothed intensity at two patch offsets
#[derive(Debug, Clone, Copy, PartialEq)]
struct TestPair {
    a: (f32, f32),
    b: (f32, f32),
}

/// Extracts descriptors from images using fixed settings
#[derive(Debug, Clone)]
pub struct FeatureExtractor {
    settings: FeatureSettings,
    pattern: Vec<TestPair>,
}

impl FeatureExtractor {
    pub fn new(settings: FeatureSettings) -> Self {
        Self {
            settings,
            pattern: test_pattern(),
        }
    }

    pub fn settings(&self) -> &FeatureSettings {
        &self.settings
    }

    /// Extract descriptors from a decoded image file
    pub fn extract(&self, image: &DynamicImage) -> Vec<Descriptor> {
        self.extract_luma(&image.to_luma8())
    }

    /// Extract descriptors from an RGB video frame
    pub fn extract_rgb(&self, image: &RgbImage) -> Vec<Descriptor> {
        self.extract_luma(&image::imageops::grayscale(image))
    }

    /// Extract descriptors from a full-size grayscale image
    pub fn extract_luma(&self, gray: &GrayImage) -> Vec<Descriptor> {
        let base = downscale(gray, self.settings.resize_factor);
        let levels = self.settings.pyramid_levels.max(1);
        let per_level = self.settings.max_features.div_ceil(levels);

        let mut descriptors = Vec::with_capacity(self.settings.max_features);
        let mut scale = 1.0f32;
        for _ in 0..levels {
            let level = downscale(&base, 1.0 / scale);
            if level.width() <= 2 * EDGE || level.height() <= 2 * EDGE {
                break;
            }
            self.describe_level(&level, per_level, &mut descriptors);
            scale *= self.settings.scale_factor;
        }
        descriptors
    }

    fn describe_level(&self, level: &GrayImage, quota: usize, out: &mut Vec<Descriptor>) {
        let keypoints = select_keypoints(level, self.settings.fast_threshold, quota);
        if keypoints.is_empty() {
            return;
        }

        let smoothed = gaussian_blur_f32(level, SMOOTHING_SIGMA);
        for corner in keypoints {
            let angle = orientation(level, corner.x as i32, corner.y as i32);
            out.push(self.describe(&smoothed, corner.x as i32, corner.y as i32, angle));
        }
    }

    fn describe(&self, smoothed: &GrayImage, x: i32, y: i32, angle: f32) -> Descriptor {
        let (sin, cos) = angle.sin_cos();
        let sample = |(dx, dy): (f32, f32)| {
            let rx = (cos * dx - sin * dy).round() as i32;
            let ry = (sin * dx + cos * dy).round() as i32;
            smoothed.get_pixel((x + rx) as u32, (y + ry) as u32)[0]
        };

        let mut descriptor = Descriptor([0; 4]);
        for (bit, pair) in self.pattern.iter().enumerate() {
            if sample(pair.a) < sample(pair.b) {
                descriptor.set_bit(bit);
            }
        }
        descriptor
    }
}

impl Default for FeatureExtractor {
    fn default() -> Self {
        Self::new(FeatureSettings::default())
    }
}

/// Resize by `factor`, keeping at least one pixel per side
pub fn downscale(image: &GrayImage, factor: f32) -> GrayImage {
    if factor >= 1.0 {
        return image.clone();
    }
    let width = ((image.width() as f32 * factor).round() as u32).max(1);
    let height = ((image.height() as f32 * factor).round() as u32).max(1);
    image::imageops::resize(image, width, height, FilterType::Triangle)
}

/// Strongest FAST corners away from the border, at most one per cell
fn select_keypoints(level: &GrayImage, threshold: u8, quota: usize) -> Vec<Corner> {
    let (width, height) = level.dimensions();
    let mut corners: Vec<Corner> = corners_fast9(level, threshold)
        .into_iter()
        .filter(|c| c.x >= EDGE && c.y >= EDGE && c.x < width - EDGE && c.y < height - EDGE)
        .collect();

    corners.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then(a.y.cmp(&b.y))
            .then(a.x.cmp(&b.x))
    });

    let cells_x = width / SUPPRESSION_CELL + 1;
    let cells_y = height / SUPPRESSION_CELL + 1;
    let mut occupied = vec![false; (cells_x * cells_y) as usize];

    let mut selected = Vec::with_capacity(quota.min(corners.len()));
    for corner in corners {
        if selected.len() == quota {
            break;
        }
        let cell = ((corner.y / SUPPRESSION_CELL) * cells_x + corner.x / SUPPRESSION_CELL) as usize;
        if !occupied[cell] {
            occupied[cell] = true;
            selected.push(corner);
        }
    }
    selected
}

/// Intensity-centroid orientation in radians
fn orientation(level: &GrayImage, x: i32, y: i32) -> f32 {
    let mut m01 = 0i64;
    let mut m10 = 0i64;
    for dy in -ORIENTATION_RADIUS..=ORIENTATION_RADIUS {
        let span = ((ORIENTATION_RADIUS * ORIENTATION_RADIUS - dy * dy) as f32).sqrt() as i32;
        for dx in -span..=span {
            let value = level.get_pixel((x + dx) as u32, (y + dy) as u32)[0] as i64;
            m10 += dx as i64 * value;
            m01 += dy as i64 * value;
        }
    }
    (m01 as f32).atan2(m10 as f32)
}

/// Fixed pseudo-random test pattern; identical for every run
fn test_pattern() -> Vec<TestPair> {
    let mut state = PATTERN_SEED;
    let span = (2 * PATCH_HALF + 1) as u64;
    let mut next_offset = move || {
        // splitmix64
        state = state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^= z >> 31;
        (z % span) as i32 - PATCH_HALF
    };

    let mut pattern = Vec::with_capacity(DESCRIPTOR_BITS);
    while pattern.len() < DESCRIPTOR_BITS {
        let a = (next_offset() as f32, next_offset() as f32);
        let b = (next_offset() as f32, next_offset() as f32);
        if a != b {
            pattern.push(TestPair { a, b });
        }
    }
    pattern
}
