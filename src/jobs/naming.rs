use std::path::{Path, PathBuf};

use crate::effects::Effect;

/// `<prefix><stem>_<effect>.<extension>` inside `directory`.
///
/// An empty extension produces a bare name, which is what a PNG frame
/// directory wants.
pub fn output_path_for(
    input: &Path,
    directory: &Path,
    effect: Effect,
    prefix: &str,
    extension: &str,
) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("image");

    let mut name = format!("{}{}_{}", prefix, stem, effect.file_slug());
    if !extension.is_empty() {
        name.push('.');
        name.push_str(extension);
    }
    directory.join(name)
}

/// Return `path` if nothing exists there, otherwise the first free
/// `<stem>_<n>.<ext>` with n counting up from 1.
///
/// `path` is treated as a file with an extension; see [`unique_dir_path`]
/// for extension-less outputs.
pub fn unique_path(path: &Path) -> PathBuf {
    unique_path_with(path, true)
}

/// Like [`unique_path`] for names without an extension (PNG frame
/// directories): the counter always goes after the full name.
pub fn unique_dir_path(path: &Path) -> PathBuf {
    unique_path_with(path, false)
}

fn unique_path_with(path: &Path, has_extension: bool) -> PathBuf {
    if !path.exists() {
        return path.to_path_buf();
    }

    let parent = path.parent().unwrap_or_else(|| Path::new(""));

    // Frame directories carry no extension, so a dotted stem such as
    // `trip.2024_zoom_in` must not be split at its dot.
    let (stem, extension) = if has_extension {
        (path.file_stem(), path.extension().and_then(|s| s.to_str()))
    } else {
        (path.file_name(), None)
    };
    let stem = stem.and_then(|s| s.to_str()).unwrap_or("output");

    (1u32..)
        .map(|counter| {
            let name = match extension {
                Some(ext) => format!("{}_{}.{}", stem, counter, ext),
                None => format!("{}_{}", stem, counter),
            };
            parent.join(name)
        })
        .find(|candidate| !candidate.exists())
        .unwrap_or_else(|| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_output_name_includes_prefix_and_effect() {
        let path = output_path_for(
            Path::new("/photos/beach.jpg"),
            Path::new("/videos"),
            Effect::KenBurns,
            "yt_",
            "mp4",
        );
        assert_eq!(path, PathBuf::from("/videos/yt_beach_ken_burns.mp4"));
    }

    #[test]
    fn test_output_name_without_extension() {
        let path = output_path_for(
            Path::new("beach.png"),
            Path::new("out"),
            Effect::SlideLeft,
            "",
            "",
        );
        assert_eq!(path, PathBuf::from("out/beach_slide_left"));
    }

    #[test]
    fn test_unique_dir_path_keeps_dotted_stem() {
        let dir = tempdir().unwrap();
        let target = output_path_for(Path::new("trip.2024.png"), dir.path(), Effect::ZoomIn, "", "");
        assert_eq!(target, dir.path().join("trip.2024_zoom_in"));
        assert_eq!(unique_dir_path(&target), target);

        std::fs::create_dir(&target).unwrap();
        assert_eq!(unique_dir_path(&target), dir.path().join("trip.2024_zoom_in_1"));
    }

    #[test]
    fn test_unique_path_counts_up() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("beach_zoom_in.mp4");
        assert_eq!(unique_path(&target), target);

        std::fs::write(&target, b"").unwrap();
        let first = unique_path(&target);
        assert_eq!(first, dir.path().join("beach_zoom_in_1.mp4"));

        std::fs::write(&first, b"").unwrap();
        assert_eq!(unique_path(&target), dir.path().join("beach_zoom_in_2.mp4"));
    }
}
