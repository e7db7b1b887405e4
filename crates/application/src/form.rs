use lite_market_domain::{format_price_cents, parse_price_cents, Listing, ListingId};

use crate::{ApplicationError, FieldErrors, ImagePickerState, ListingDraft};

const TITLE_REQUIRED: &str = "Title is required.";
const PRICE_REQUIRED: &str = "Price is required.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(ListingId),
}

/// Controlled state behind the create/edit listing screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingForm {
    pub mode: FormMode,
    pub title: String,
    pub description: String,
    pub price_text: String,
    pub images: ImagePickerState,
    pub errors: FieldErrors,
    pub banner: Option<String>,
    pub submitting: bool,
}

impl ListingForm {
    pub fn for_create() -> Self {
        Self {
            mode: FormMode::Create,
            title: String::new(),
            description: String::new(),
            price_text: format_price_cents(0),
            images: ImagePickerState::default(),
            errors: FieldErrors::default(),
            banner: None,
            submitting: false,
        }
    }

    pub fn for_edit(listing: &Listing) -> Self {
        Self {
            mode: FormMode::Edit(listing.id.clone()),
            title: listing.title.clone(),
            description: listing.description.clone(),
            price_text: format_price_cents(listing.price_cents),
            images: ImagePickerState::with_images(&listing.images),
            errors: FieldErrors::default(),
            banner: None,
            submitting: false,
        }
    }

    pub fn submit_label(&self) -> &'static str {
        match self.mode {
            FormMode::Create => "Create item",
            FormMode::Edit(_) => "Save changes",
        }
    }

    pub fn can_submit(&self) -> bool {
        !self.submitting && !self.images.is_picking
    }

    /// Checks the fields, recording inline errors. Returns the draft to hand
    /// to the pipeline when everything is valid.
    pub fn validate(&mut self) -> Option<ListingDraft> {
        let mut errors = FieldErrors::default();
        if self.title.trim().is_empty() {
            errors.title = Some(TITLE_REQUIRED.to_string());
        }
        let price_cents = match parse_price_cents(&self.price_text) {
            Ok(cents) => Some(cents),
            Err(_) => {
                errors.price = Some(PRICE_REQUIRED.to_string());
                None
            }
        };

        let valid = errors.is_empty();
        self.errors = errors;
        if !valid {
            return None;
        }

        Some(ListingDraft {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            price_cents: price_cents?,
            images: self.images.selection.clone().into_vec(),
        })
    }

    /// Runs one submission through `submit`. Validation problems stay inline
    /// and never reach `submit`; other failures become the banner while the
    /// entered values are kept for a manual retry. A create that saved its
    /// record before failing turns the form into an edit of that record.
    pub fn submit_with<F>(&mut self, submit: F) -> Result<Listing, ApplicationError>
    where
        F: FnOnce(&FormMode, &ListingDraft) -> Result<Listing, ApplicationError>,
    {
        if self.submitting {
            return Err(ApplicationError::SubmissionInFlight);
        }
        let Some(draft) = self.validate() else {
            return Err(ApplicationError::Validation(self.errors.clone()));
        };

        self.submitting = true;
        self.banner = None;
        let result = submit(&self.mode, &draft);
        self.submitting = false;

        match &result {
            Ok(listing) => {
                if self.mode == FormMode::Create {
                    self.mode = FormMode::Edit(listing.id.clone());
                }
                self.images = ImagePickerState::with_images(&listing.images);
            }
            Err(error) => {
                if self.mode == FormMode::Create {
                    if let Some(listing_id) = error.created_listing() {
                        self.mode = FormMode::Edit(listing_id.clone());
                    }
                }
                self.banner = error.user_message();
            }
        }
        result
    }
}
