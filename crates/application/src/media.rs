use lite_market_domain::{ImageSelection, LocalImageHandle};
use tracing::{debug, warn};

use crate::{ApplicationError, MediaLibrary, PermissionStatus, PickerOptions, PickerOutcome};

pub struct MediaPicker {
    library: Box<dyn MediaLibrary>,
}

impl MediaPicker {
    pub fn new(library: Box<dyn MediaLibrary>) -> Self {
        Self { library }
    }

    /// Asks for library access, then runs the chooser. A refused permission
    /// never reaches the chooser.
    pub fn pick_images_from_library(&self) -> Result<Vec<LocalImageHandle>, ApplicationError> {
        let permission = self
            .library
            .request_permission()
            .map_err(|error| ApplicationError::Picker(error.to_string()))?;
        if permission != PermissionStatus::Granted {
            return Err(ApplicationError::PermissionDenied);
        }

        match self.library.launch_picker(&PickerOptions::default()) {
            Ok(PickerOutcome::Cancelled) => Err(ApplicationError::Cancelled),
            Ok(PickerOutcome::Picked(images)) => {
                debug!(count = images.len(), "picked images from library");
                Ok(images)
            }
            Err(error) => Err(ApplicationError::Picker(error.to_string())),
        }
    }
}

/// Form-local picker state: the current selection plus the busy flag and the
/// last message to show.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImagePickerState {
    pub selection: ImageSelection,
    pub is_picking: bool,
    pub error: Option<String>,
}

impl ImagePickerState {
    pub fn with_images(images: &[String]) -> Self {
        Self {
            selection: ImageSelection::from_references(images.iter().cloned()),
            ..Self::default()
        }
    }

    /// Returns how many new references were appended.
    pub fn pick_from_library(&mut self, picker: &MediaPicker) -> usize {
        self.is_picking = true;
        self.error = None;

        let result = picker.pick_images_from_library();
        self.is_picking = false;

        match result {
            Ok(images) => self
                .selection
                .add(images.into_iter().map(|image| image.uri)),
            Err(ApplicationError::Cancelled) => 0,
            Err(ApplicationError::PermissionDenied) => {
                self.error = Some("Media library permission denied.".to_string());
                0
            }
            Err(error) => {
                warn!(error = %error, "failed to pick images");
                self.error = Some("Failed to pick images.".to_string());
                0
            }
        }
    }

    pub fn remove(&mut self, reference: &str) -> bool {
        self.selection.remove(reference)
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
