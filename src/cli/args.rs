//! Command-line argument definitions

use std::path::PathBuf;

use clap::Args;
use clap_num::number_range;

use crate::config::ConfigLayer;

fn sample_rate_range(s: &str) -> Result<i64, String> {
    number_range(s, 1, 1000)
}

fn jobs_range(s: &str) -> Result<i64, String> {
    number_range(s, 1, 1024)
}

/// Arguments for the analyze command
#[derive(Args, Debug, Clone)]
pub struct AnalyzeArgs {
    /// Directory of labelled reference screenshots (file stem = screen name)
    pub screens_dir: PathBuf,

    /// Video files, or directories to scan for videos
    #[arg(required = true)]
    pub videos: Vec<PathBuf>,

    /// Directory receiving the timings CSV files [default: generated_metrics]
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Frames analysed per second of video [default: 2]
    #[arg(short, long, value_parser = sample_rate_range)]
    pub sample_rate: Option<i64>,

    /// Downscale factor in (0, 1] applied before feature extraction [default: 0.25]
    #[arg(short, long)]
    pub resize_factor: Option<f64>,

    /// Match scores at or below this are reported as low confidence [default: 10]
    #[arg(short, long)]
    pub feature_cutoff: Option<i64>,

    /// Extra reference image extensions, comma separated
    #[arg(long, value_delimiter = ',')]
    pub image_types: Vec<String>,

    /// Extra video extensions, comma separated
    #[arg(long, value_delimiter = ',')]
    pub video_types: Vec<String>,

    /// Omit the CSV header row
    #[arg(long)]
    pub no_header: bool,

    /// Skip unreadable images and videos instead of aborting
    #[arg(long)]
    pub lenient: bool,

    /// Videos analysed concurrently [default: number of CPUs]
    #[arg(short, long, value_parser = jobs_range)]
    pub jobs: Option<i64>,

    /// Configuration file (TOML or YAML)
    #[arg(short, long, env = "SCREENTRACE_CONFIG")]
    pub config: Option<PathBuf>,
}

impl AnalyzeArgs {
    /// Settings given on the command line; highest precedence
    pub fn config_layer(&self) -> ConfigLayer {
        ConfigLayer {
            sample_rate: self.sample_rate,
            resize_factor: self.resize_factor,
            feature_cutoff: self.feature_cutoff,
            output_dir: self.output_dir.clone(),
            write_header: self.no_header.then_some(false),
            lenient: self.lenient.then_some(true),
            jobs: self.jobs,
            image_types: non_empty(&self.image_types),
            video_types: non_empty(&self.video_types),
            features: None,
        }
    }
}

/// Arguments for the inspect command
#[derive(Args, Debug, Clone)]
pub struct InspectArgs {
    /// Video file to inspect
    pub input: PathBuf,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the index command
#[derive(Args, Debug, Clone)]
pub struct IndexArgs {
    /// Directory of labelled reference screenshots
    pub screens_dir: PathBuf,

    /// Downscale factor in (0, 1] applied before feature extraction [default: 0.25]
    #[arg(short, long)]
    pub resize_factor: Option<f64>,

    /// Extra reference image extensions, comma separated
    #[arg(long, value_delimiter = ',')]
    pub image_types: Vec<String>,

    /// Skip unreadable images instead of aborting
    #[arg(long)]
    pub lenient: bool,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,

    /// Configuration file (TOML or YAML)
    #[arg(short, long, env = "SCREENTRACE_CONFIG")]
    pub config: Option<PathBuf>,
}

impl IndexArgs {
    pub fn config_layer(&self) -> ConfigLayer {
        ConfigLayer {
            resize_factor: self.resize_factor,
            lenient: self.lenient.then_some(true),
            image_types: non_empty(&self.image_types),
            ..ConfigLayer::default()
        }
    }
}

fn non_empty(values: &[String]) -> Option<Vec<String>> {
    (!values.is_empty()).then(|| values.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_rate_range() {
        assert_eq!(sample_rate_range("4"), Ok(4));
        assert!(sample_rate_range("0").is_err());
        assert!(sample_rate_range("-1").is_err());
        assert!(sample_rate_range("two").is_err());
    }

    #[test]
    fn test_jobs_range() {
        assert_eq!(jobs_range("8"), Ok(8));
        assert!(jobs_range("0").is_err());
    }
}
