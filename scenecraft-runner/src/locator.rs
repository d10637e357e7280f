//! Rendered artifact discovery
//!
//! After an engine run the video can be found three ways, tried in order:
//! a path printed in the engine output, the conventional
//! `media/videos/**/<scene>.mp4` location under the run directory, or the
//! newest video anywhere under `media/videos`.

use regex::Regex;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::debug;

const VIDEO_EXTENSION: &str = "mp4";

/// Locates the video produced by an engine run
#[derive(Debug, Clone, Copy, Default)]
pub struct ArtifactLocator;

impl ArtifactLocator {
    pub fn new() -> Self {
        Self
    }

    /// Finds the produced video, or `None` if no existing file qualifies
    ///
    /// # Arguments
    /// * `output` - Combined stdout and stderr of the run
    /// * `scene` - Scene class that was rendered
    /// * `run_dir` - Run directory the engine worked in
    pub fn locate(&self, output: &str, scene: &str, run_dir: &Path) -> Option<PathBuf> {
        if let Some(path) = path_from_output(output) {
            debug!("Artifact reported by engine: {}", path.display());
            return Some(path);
        }

        let media = run_dir.join("media").join("videos");
        let mut videos = Vec::new();
        collect_videos(&media, &mut videos);

        let expected = format!("{}.{}", scene, VIDEO_EXTENSION);
        let named = newest(
            videos
                .iter()
                .filter(|(path, _)| path.file_name().is_some_and(|name| name == expected.as_str())),
        );
        if let Some(path) = named {
            debug!("Artifact found by scene name: {}", path.display());
            return Some(path);
        }

        let any = newest(videos.iter());
        if let Some(path) = &any {
            debug!("Artifact found by extension: {}", path.display());
        }
        any
    }
}

/// First existing video path printed in the output, scanning line by line
fn path_from_output(output: &str) -> Option<PathBuf> {
    let re = Regex::new(r"([A-Za-z]:)?[/\\][^\s]+\.mp4").ok()?;

    output
        .lines()
        .filter_map(|line| re.find(line))
        .map(|found| PathBuf::from(found.as_str()))
        .find(|path| path.is_file())
}

fn collect_videos(dir: &Path, videos: &mut Vec<(PathBuf, SystemTime)>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        let Ok(metadata) = entry.metadata() else {
            continue;
        };

        if metadata.is_dir() {
            collect_videos(&path, videos);
        } else if path.extension().is_some_and(|ext| ext == VIDEO_EXTENSION) {
            let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
            videos.push((path, modified));
        }
    }
}

fn newest<'a>(videos: impl Iterator<Item = &'a (PathBuf, SystemTime)>) -> Option<PathBuf> {
    videos
        .max_by_key(|(_, modified)| *modified)
        .map(|(path, _)| path.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{File, FileTimes};
    use std::time::Duration;

    fn touch(path: &Path, age_secs: u64) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        let file = File::create(path).unwrap();
        let modified = SystemTime::now() - Duration::from_secs(age_secs);
        file.set_times(FileTimes::new().set_modified(modified)).unwrap();
    }

    #[test]
    fn test_path_printed_in_output() {
        let dir = tempfile::tempdir().unwrap();
        let video = dir.path().join("elsewhere").join("out.mp4");
        touch(&video, 0);

        let output = format!("INFO rendering\nFile ready at {}\nDone", video.display());
        let found = ArtifactLocator::new().locate(&output, "Demo", dir.path());
        assert_eq!(found, Some(video));
    }

    #[test]
    fn test_printed_path_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let found = ArtifactLocator::new().locate(
            "File ready at /nonexistent/scenecraft/Demo.mp4",
            "Demo",
            dir.path(),
        );
        assert_eq!(found, None);
    }

    #[test]
    fn test_scene_named_video_wins_over_newer_video() {
        let dir = tempfile::tempdir().unwrap();
        let media = dir.path().join("media").join("videos").join("scene_script");
        let named = media.join("720p30").join("Demo.mp4");
        let other = media.join("1080p60").join("Other.mp4");
        touch(&named, 60);
        touch(&other, 0);

        let found = ArtifactLocator::new().locate("no paths here", "Demo", dir.path());
        assert_eq!(found, Some(named));
    }

    #[test]
    fn test_newest_video_when_scene_name_missing() {
        let dir = tempfile::tempdir().unwrap();
        let media = dir.path().join("media").join("videos");
        let old = media.join("a").join("Old.mp4");
        let new = media.join("b").join("New.mp4");
        touch(&old, 120);
        touch(&new, 0);
        touch(&media.join("b").join("notes.txt"), 0);

        let found = ArtifactLocator::new().locate("", "Demo", dir.path());
        assert_eq!(found, Some(new));
    }

    #[test]
    fn test_nothing_found() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(ArtifactLocator::new().locate("", "Demo", dir.path()), None);
    }
}
