//! Create/edit of a listing, turning the form's mixed local/remote image
//! references into an ordered list of remote references.
//!
//! Images are processed one at a time in form order. The first failure
//! stops the submission; blobs uploaded before it stay in storage and are
//! overwritten on retry because upload paths are deterministic. A create
//! that fails after its record exists reports the record's id so the retry
//! can edit it.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use lite_market_domain::{DomainError, ImageRef, Listing, ListingId, ListingStatus, UserId};
use tracing::{debug, warn};

use crate::{
    ApplicationError, Clock, FieldErrors, ImageCompressor, ImageUploader, ListingPatch,
    NewListing, RecordStore,
};

/// What a listing form hands over on submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingDraft {
    pub title: String,
    pub description: String,
    pub price_cents: i64,
    pub images: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionStage {
    Idle,
    Validating,
    Creating,
    Updating,
    UploadingImages,
    PersistingImageRefs,
    Done,
    Failed,
}

struct ValidatedDraft {
    title: String,
    description: String,
    price_cents: i64,
    images: Vec<ImageRef>,
}

struct InFlight<'a>(&'a Cell<bool>);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a Cell<bool>) -> Result<Self, ApplicationError> {
        if flag.replace(true) {
            return Err(ApplicationError::SubmissionInFlight);
        }
        Ok(Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

pub struct ListingSubmissionPipeline {
    records: Rc<dyn RecordStore>,
    compressor: Box<dyn ImageCompressor>,
    uploader: ImageUploader,
    clock: Box<dyn Clock>,
    in_flight: Cell<bool>,
    stages: RefCell<Vec<SubmissionStage>>,
}

impl ListingSubmissionPipeline {
    pub fn new(
        records: Rc<dyn RecordStore>,
        compressor: Box<dyn ImageCompressor>,
        uploader: ImageUploader,
        clock: Box<dyn Clock>,
    ) -> Self {
        Self {
            records,
            compressor,
            uploader,
            clock,
            in_flight: Cell::new(false),
            stages: RefCell::new(vec![SubmissionStage::Idle]),
        }
    }

    pub fn stage(&self) -> SubmissionStage {
        self.stages
            .borrow()
            .last()
            .copied()
            .unwrap_or(SubmissionStage::Idle)
    }

    /// Stages visited by the most recent submission, starting at `Idle`.
    pub fn stage_history(&self) -> Vec<SubmissionStage> {
        self.stages.borrow().clone()
    }

    pub fn is_submitting(&self) -> bool {
        self.in_flight.get()
    }

    pub fn create(&self, seller_id: &UserId, draft: &ListingDraft) -> Result<Listing, ApplicationError> {
        let _guard = InFlight::acquire(&self.in_flight)?;
        self.reset_stages();
        let result = self.run_create(seller_id, draft);
        self.finish(&result, None);
        result
    }

    pub fn edit(
        &self,
        seller_id: &UserId,
        listing_id: &ListingId,
        draft: &ListingDraft,
    ) -> Result<Listing, ApplicationError> {
        let _guard = InFlight::acquire(&self.in_flight)?;
        self.reset_stages();
        let result = self.run_edit(seller_id, listing_id, draft);
        self.finish(&result, Some(listing_id));
        result
    }

    fn run_create(&self, seller_id: &UserId, draft: &ListingDraft) -> Result<Listing, ApplicationError> {
        self.enter(SubmissionStage::Validating);
        let validated = validate_draft(draft)?;

        self.enter(SubmissionStage::Creating);
        let created = self.records.create_listing(&NewListing {
            title: validated.title,
            description: validated.description,
            price_cents: validated.price_cents,
            images: Vec::new(),
            status: ListingStatus::default(),
            seller_id: seller_id.clone(),
            created_at: self.clock.now_timestamp_string(),
        })?;
        debug!(listing_id = %created.id, "created listing record");

        let listing_id = created.id.clone();
        self.attach_images(seller_id, created, &validated.images)
            .map_err(|error| ApplicationError::PartiallySaved {
                listing_id,
                source: Box::new(error),
            })
    }

    fn attach_images(
        &self,
        seller_id: &UserId,
        created: Listing,
        images: &[ImageRef],
    ) -> Result<Listing, ApplicationError> {
        self.enter(SubmissionStage::UploadingImages);
        let images = self.resolve_images(images, seller_id, &created.id)?;
        if images.is_empty() {
            return Ok(created);
        }

        self.enter(SubmissionStage::PersistingImageRefs);
        self.records.update_listing(
            &created.id,
            seller_id,
            &ListingPatch {
                images: Some(images),
                ..ListingPatch::default()
            },
        )
    }

    fn run_edit(
        &self,
        seller_id: &UserId,
        listing_id: &ListingId,
        draft: &ListingDraft,
    ) -> Result<Listing, ApplicationError> {
        self.enter(SubmissionStage::Validating);
        let validated = validate_draft(draft)?;

        self.enter(SubmissionStage::UploadingImages);
        let images = self.resolve_images(&validated.images, seller_id, listing_id)?;

        self.enter(SubmissionStage::Updating);
        self.records.update_listing(
            listing_id,
            seller_id,
            &ListingPatch {
                title: Some(validated.title),
                description: Some(validated.description),
                price_cents: Some(validated.price_cents),
                images: Some(images),
                status: None,
            },
        )
    }

    /// Maps each reference to a remote one, keeping form order. Remote
    /// references pass through untouched.
    fn resolve_images(
        &self,
        images: &[ImageRef],
        seller_id: &UserId,
        listing_id: &ListingId,
    ) -> Result<Vec<String>, ApplicationError> {
        let mut resolved = Vec::with_capacity(images.len());
        for (index, image) in images.iter().enumerate() {
            match image {
                ImageRef::Remote(url) => resolved.push(url.clone()),
                ImageRef::Local(local) => {
                    let compressed = self.compressor.compress(local).map_err(|error| match error {
                        ApplicationError::CompressionFailed { .. } => error,
                        other => ApplicationError::CompressionFailed {
                            uri: local.uri.clone(),
                            message: other.to_string(),
                        },
                    })?;
                    let url = self.uploader.upload(&compressed, seller_id, listing_id)?;
                    debug!(index, source = %local.uri, url = %url, "resolved local image");
                    resolved.push(url);
                }
            }
        }
        Ok(resolved)
    }

    fn reset_stages(&self) {
        *self.stages.borrow_mut() = vec![SubmissionStage::Idle];
    }

    fn enter(&self, stage: SubmissionStage) {
        debug!(?stage, "listing submission stage");
        self.stages.borrow_mut().push(stage);
    }

    fn finish(&self, result: &Result<Listing, ApplicationError>, listing_id: Option<&ListingId>) {
        match result {
            Ok(listing) => {
                self.enter(SubmissionStage::Done);
                debug!(listing_id = %listing.id, images = listing.images.len(), "listing submitted");
            }
            Err(error) => {
                let failed_at = self.stage();
                self.enter(SubmissionStage::Failed);
                warn!(
                    error = %error,
                    kind = ?error.kind(),
                    stage = ?failed_at,
                    listing_id = listing_id.map(ListingId::as_str),
                    "listing submission failed"
                );
            }
        }
    }
}

fn validate_draft(draft: &ListingDraft) -> Result<ValidatedDraft, ApplicationError> {
    let title = draft.title.trim();
    let mut fields = FieldErrors::default();
    if title.is_empty() {
        fields.title = Some(DomainError::EmptyTitle.to_string());
    }
    if draft.price_cents <= 0 {
        fields.price = Some(DomainError::NonPositivePrice(draft.price_cents).to_string());
    }
    if !fields.is_empty() {
        return Err(ApplicationError::Validation(fields));
    }

    let images = draft
        .images
        .iter()
        .map(|reference| ImageRef::classify(reference))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ValidatedDraft {
        title: title.to_string(),
        description: draft.description.trim().to_string(),
        price_cents: draft.price_cents,
        images,
    })
}
