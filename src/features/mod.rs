//! Local feature extraction, matching and the reference screen index
//!
//! Screens are described by oriented FAST keypoints with steered binary
//! descriptors, extracted over a small image pyramid so that matches survive
//! changes of scale and rotation between the reference screenshots and the
//! recorded frames.

use serde::{Deserialize, Serialize};

pub mod index;
pub mod matcher;
pub mod orb;

pub use index::{ReferenceIndex, ReferenceScreen};
pub use matcher::{cross_check_count, cross_check_matches, DescriptorMatch};
pub use orb::FeatureExtractor;

/// Default downscale applied to images before feature extraction
pub const DEFAULT_RESIZE_FACTOR: f32 = 0.25;

/// 256-bit binary descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Descriptor(pub [u64; 4]);

impl Descriptor {
    /// Number of differing bits
    #[inline]
    pub fn hamming(&self, other: &Descriptor) -> u32 {
        self.0
            .iter()
            .zip(other.0.iter())
            .map(|(a, b)| (a ^ b).count_ones())
            .sum()
    }

    /// Set bit `index` (0..256)
    #[inline]
    pub(crate) fn set_bit(&mut self, index: usize) {
        self.0[index / 64] |= 1u64 << (index % 64);
    }
}

/// Feature extraction settings shared by reference images and frames
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureSettings {
    /// Downscale factor in (0, 1] applied before extraction
    pub resize_factor: f32,
    /// Upper bound on keypoints per image, spread across pyramid levels
    pub max_features: usize,
    /// FAST intensity threshold
    pub fast_threshold: u8,
    /// Number of pyramid levels
    pub pyramid_levels: usize,
    /// Scale ratio between consecutive pyramid levels
    pub scale_factor: f32,
}

impl Default for FeatureSettings {
    fn default() -> Self {
        Self {
            resize_factor: DEFAULT_RESIZE_FACTOR,
            max_features: 500,
            fast_threshold: 20,
            pyramid_levels: 4,
            scale_factor: 1.2,
        }
    }
}

impl FeatureSettings {
    /// Settings with a different resize factor
    pub fn with_resize_factor(mut self, resize_factor: f32) -> Self {
        self.resize_factor = resize_factor;
        self
    }

    /// Check ranges; returns a message describing the first violation
    pub fn validate(&self) -> Result<(), String> {
        if !(self.resize_factor > 0.0 && self.resize_factor <= 1.0) {
            return Err(format!(
                "resize_factor must be in (0, 1], got {}",
                self.resize_factor
            ));
        }
        if self.max_features == 0 {
            return Err("max_features must be positive".to_string());
        }
        if self.pyramid_levels == 0 {
            return Err("pyramid_levels must be positive".to_string());
        }
        if !(self.scale_factor > 1.0) {
            return Err(format!(
                "scale_factor must be greater than 1, got {}",
                self.scale_factor
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hamming_distance() {
        let a = Descriptor([0, 0, 0, 0]);
        let b = Descriptor([0b1011, 0, u64::MAX, 1 << 63]);
        assert_eq!(a.hamming(&a), 0);
        assert_eq!(a.hamming(&b), 3 + 64 + 1);
        assert_eq!(b.hamming(&a), a.hamming(&b));
    }

    #[test]
    fn test_set_bit() {
        let mut d = Descriptor([0; 4]);
        d.set_bit(0);
        d.set_bit(65);
        d.set_bit(255);
        assert_eq!(d.0, [1, 2, 0, 1 << 63]);
    }

    #[test]
    fn test_default_settings_are_valid() {
        assert!(FeatureSettings::default().validate().is_ok());
    }

    #[test]
    fn test_resize_factor_range() {
        let settings = FeatureSettings::default();
        assert!(settings.clone().with_resize_factor(1.0).validate().is_ok());
        assert!(settings.clone().with_resize_factor(0.0).validate().is_err());
        assert!(settings.clone().with_resize_factor(1.5).validate().is_err());
        assert!(settings.with_resize_factor(f32::NAN).validate().is_err());
    }
}
