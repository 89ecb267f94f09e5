//! Media discovery and file naming helpers

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::config::ExtensionSet;
use crate::error::{ScreenTraceError, ScreenTraceResult};

/// Prefix of every generated timings file
pub const OUTPUT_PREFIX: &str = "timings-";

/// Files directly inside `dir` whose extension is in `extensions`, sorted by path
pub fn discover_media(dir: &Path, extensions: &ExtensionSet) -> ScreenTraceResult<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(ScreenTraceError::invalid_config(format!(
            "Not a directory: {}",
            dir.display()
        )));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|e| {
            ScreenTraceError::IoError(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("Failed to read {}: {}", dir.display(), e),
            ))
        })?;
        if entry.file_type().is_file() && extensions.matches(entry.path()) {
            files.push(entry.into_path());
        }
    }
    files.sort();

    debug!("Discovered {} media files in {}", files.len(), dir.display());
    Ok(files)
}

/// Expand video arguments: files are taken as given, directories are scanned
///
/// The result is sorted and free of duplicates. Two videos whose stems would
/// map to the same timings file are rejected.
pub fn resolve_videos(
    inputs: &[PathBuf],
    extensions: &ExtensionSet,
) -> ScreenTraceResult<Vec<PathBuf>> {
    let mut videos = Vec::new();
    for input in inputs {
        if input.is_dir() {
            videos.extend(discover_media(input, extensions)?);
        } else if input.is_file() {
            videos.push(input.clone());
        } else {
            return Err(ScreenTraceError::invalid_config(format!(
                "Input does not exist: {}",
                input.display()
            )));
        }
    }
    videos.sort();
    videos.dedup();

    let mut outputs: BTreeMap<String, &PathBuf> = BTreeMap::new();
    for video in &videos {
        let name = output_file_name(&file_stem(video)?);
        if let Some(previous) = outputs.insert(name.clone(), video) {
            return Err(ScreenTraceError::invalid_config(format!(
                "{} and {} would both be written to {}",
                previous.display(),
                video.display(),
                name
            )));
        }
    }
    Ok(videos)
}

/// Screen id of a reference image: its file stem
pub fn screen_id(path: &Path) -> ScreenTraceResult<String> {
    file_stem(path)
}

/// `timings-<video-stem>.csv`
pub fn output_file_name(video_name: &str) -> String {
    format!("{}{}.csv", OUTPUT_PREFIX, video_name)
}

/// File name without extension
pub fn file_stem(path: &Path) -> ScreenTraceResult<String> {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .filter(|stem| !stem.is_empty())
        .ok_or_else(|| {
            ScreenTraceError::invalid_config(format!("Path has no file name: {}", path.display()))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, b"").unwrap();
        path
    }

    #[test]
    fn test_discover_media_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "settings.PNG");
        touch(dir.path(), "home.jpg");
        touch(dir.path(), "notes.txt");
        fs::create_dir(dir.path().join("nested.png")).unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        touch(&dir.path().join("sub"), "deep.png");

        let images = ExtensionSet::images(Vec::<String>::new()).unwrap();
        let found = discover_media(dir.path(), &images).unwrap();
        let names: Vec<_> = found
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["home.jpg", "settings.PNG"]);
    }

    #[test]
    fn test_discover_media_requires_directory() {
        let images = ExtensionSet::images(Vec::<String>::new()).unwrap();
        assert!(discover_media(Path::new("/no/such/dir"), &images).is_err());
    }

    #[test]
    fn test_resolve_videos() {
        let dir = tempfile::tempdir().unwrap();
        let a = touch(dir.path(), "a.mp4");
        touch(dir.path(), "b.MOV");
        touch(dir.path(), "c.txt");

        let videos = ExtensionSet::videos(Vec::<String>::new()).unwrap();
        let resolved =
            resolve_videos(&[dir.path().to_path_buf(), a.clone()], &videos).unwrap();
        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved[0], a);

        let missing = dir.path().join("missing.mp4");
        assert!(resolve_videos(&[missing], &videos).is_err());
    }

    #[test]
    fn test_resolve_videos_rejects_colliding_stems() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("day1")).unwrap();
        fs::create_dir(dir.path().join("day2")).unwrap();
        let first = touch(&dir.path().join("day1"), "session.mp4");
        let second = touch(&dir.path().join("day2"), "session.mp4");
        let videos = ExtensionSet::videos(Vec::<String>::new()).unwrap();

        let err = resolve_videos(&[first.clone(), second], &videos).unwrap_err();
        assert!(matches!(err, ScreenTraceError::InvalidConfiguration { .. }));
        assert!(err.to_string().contains("timings-session.csv"));

        // same stem, different container
        let other = touch(&dir.path().join("day1"), "session.mov");
        assert!(resolve_videos(&[first.clone(), other], &videos).is_err());

        // the same file named twice is not a collision
        let resolved = resolve_videos(&[first.clone(), first.clone()], &videos).unwrap();
        assert_eq!(resolved, vec![first]);
    }

    #[test]
    fn test_names() {
        assert_eq!(
            output_file_name(&file_stem(Path::new("/recordings/session 1.mp4")).unwrap()),
            "timings-session 1.csv"
        );
        assert_eq!(screen_id(Path::new("screens/Home.png")).unwrap(), "Home");
        assert!(screen_id(Path::new("/")).is_err());
    }
}
