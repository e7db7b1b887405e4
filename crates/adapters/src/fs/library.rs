use std::path::{Path, PathBuf};

use lite_market_application::{
    ApplicationError, MediaLibrary, PermissionStatus, PickerOptions, PickerOutcome,
};
use lite_market_domain::LocalImageHandle;
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

const SUPPORTED_EXTENSIONS: [(&str, &str); 4] = [
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("png", "image/png"),
    ("webp", "image/webp"),
];

/// A device photo library backed by a directory. Picking returns every
/// supported image under the root, ordered by path; an empty library reads
/// as a cancelled pick.
#[derive(Debug, Clone)]
pub struct FsMediaLibrary {
    root: PathBuf,
    permission: PermissionStatus,
}

impl FsMediaLibrary {
    pub fn new(root: impl Into<PathBuf>, permission: PermissionStatus) -> Self {
        Self {
            root: root.into(),
            permission,
        }
    }
}

/// Walks `root` in path order. Entries that cannot be read are logged and
/// skipped; the second value counts them.
fn readable_entries(root: &Path) -> (Vec<DirEntry>, usize) {
    let mut entries = Vec::new();
    let mut skipped = 0;
    for entry in WalkDir::new(root).sort_by_file_name() {
        match entry {
            Ok(entry) => entries.push(entry),
            Err(error) => {
                skipped += 1;
                warn!(
                    error = %error,
                    path = ?error.path(),
                    "skipping unreadable library entry"
                );
            }
        }
    }
    (entries, skipped)
}

fn mime_for_path(path: &Path) -> Option<&'static str> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    SUPPORTED_EXTENSIONS
        .iter()
        .find(|(candidate, _)| *candidate == extension)
        .map(|(_, mime)| *mime)
}

impl MediaLibrary for FsMediaLibrary {
    fn request_permission(&self) -> Result<PermissionStatus, ApplicationError> {
        Ok(self.permission)
    }

    fn launch_picker(&self, options: &PickerOptions) -> Result<PickerOutcome, ApplicationError> {
        if !self.root.is_dir() {
            return Err(ApplicationError::Picker(format!(
                "library folder does not exist or is not a directory: {}",
                self.root.display()
            )));
        }

        let (entries, skipped) = readable_entries(&self.root);
        let mut picked = Vec::new();
        for entry in entries {
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            let Some(mime) = mime_for_path(path) else {
                continue;
            };

            let canonical = path
                .canonicalize()
                .map_err(|error| ApplicationError::Io(error.to_string()))?;
            let dimensions = image::image_dimensions(&canonical).ok();
            picked.push(LocalImageHandle {
                uri: format!("file://{}", canonical.display()),
                width: dimensions.map(|(width, _)| width),
                height: dimensions.map(|(_, height)| height),
                file_name: entry.file_name().to_str().map(str::to_string),
                mime_type: Some(mime.to_string()),
                file_size: entry.metadata().ok().map(|metadata| metadata.len()),
            });

            if !options.allows_multiple {
                break;
            }
        }

        debug!(
            root = %self.root.display(),
            picked = picked.len(),
            skipped,
            "library pick finished"
        );
        if picked.is_empty() {
            return Ok(PickerOutcome::Cancelled);
        }
        Ok(PickerOutcome::Picked(picked))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb};
    use std::fs;
    use tempfile::TempDir;

    fn seed(dir: &TempDir) {
        let nested = dir.path().join("camera");
        fs::create_dir_all(&nested).expect("mkdir");
        ImageBuffer::from_fn(6, 4, |_x, _y| Rgb([9_u8, 9_u8, 9_u8]))
            .save(nested.join("b.png"))
            .expect("save png");
        ImageBuffer::from_fn(3, 2, |_x, _y| Rgb([9_u8, 9_u8, 9_u8]))
            .save(dir.path().join("a.jpg"))
            .expect("save jpg");
        fs::write(dir.path().join("notes.txt"), b"skip me").expect("write");
    }

    #[test]
    fn picks_supported_images_with_metadata() {
        let dir = TempDir::new().expect("tempdir");
        seed(&dir);
        let library = FsMediaLibrary::new(dir.path(), PermissionStatus::Granted);

        let PickerOutcome::Picked(images) = library
            .launch_picker(&PickerOptions::default())
            .expect("pick")
        else {
            panic!("expected picked images");
        };

        let names: Vec<_> = images
            .iter()
            .map(|image| image.file_name.clone().unwrap_or_default())
            .collect();
        assert_eq!(names, vec!["a.jpg", "b.png"]);
        assert_eq!(images[1].width, Some(6));
        assert_eq!(images[1].mime_type.as_deref(), Some("image/png"));
        assert!(images[0].uri.starts_with("file://"));
    }

    #[test]
    fn single_pick_returns_first_image() {
        let dir = TempDir::new().expect("tempdir");
        seed(&dir);
        let library = FsMediaLibrary::new(dir.path(), PermissionStatus::Granted);
        let outcome = library
            .launch_picker(&PickerOptions {
                allows_multiple: false,
                ..PickerOptions::default()
            })
            .expect("pick");
        assert!(matches!(outcome, PickerOutcome::Picked(images) if images.len() == 1));
    }

    #[test]
    fn unreadable_entries_are_counted_not_dropped() {
        let dir = TempDir::new().expect("tempdir");
        seed(&dir);

        let (entries, skipped) = readable_entries(dir.path());
        assert_eq!(skipped, 0);
        assert!(entries
            .iter()
            .any(|entry| entry.file_name() == "b.png"));

        let (entries, skipped) = readable_entries(&dir.path().join("missing"));
        assert!(entries.is_empty());
        assert_eq!(skipped, 1);
    }

    #[test]
    fn empty_library_reads_as_cancelled() {
        let dir = TempDir::new().expect("tempdir");
        let library = FsMediaLibrary::new(dir.path(), PermissionStatus::Denied);
        assert_eq!(
            library.request_permission().expect("permission"),
            PermissionStatus::Denied
        );
        assert_eq!(
            library.launch_picker(&PickerOptions::default()).expect("pick"),
            PickerOutcome::Cancelled
        );
    }
}
