use std::rc::Rc;

use lite_market_domain::{Listing, ListingId, ListingStatus};

use crate::{
    ApplicationError, BlobStore, BootstrapCommand, Clock, CreateListingCommand,
    EditListingCommand, FormMode, IdentityProvider, ImageCompressor, ImagePickerState,
    ImageUploader, ListAvailableQuery, ListingFilter, ListingForm, ListingOrder, ListingQuery,
    ListingSubmissionPipeline, LocalImageReader, MediaLibrary, MediaPicker, MyListingsQuery,
    RecordStore, RowRange, Session, SessionStore, ShowListingQuery, SignInCommand,
};

pub const MAX_PAGE_SIZE: i64 = 100;

pub struct ApplicationService {
    records: Rc<dyn RecordStore>,
    session: SessionStore,
    picker: MediaPicker,
    pipeline: ListingSubmissionPipeline,
}

impl ApplicationService {
    pub fn new(
        records: Rc<dyn RecordStore>,
        identity: Box<dyn IdentityProvider>,
        library: Box<dyn MediaLibrary>,
        compressor: Box<dyn ImageCompressor>,
        blobs: Box<dyn BlobStore>,
        reader: Box<dyn LocalImageReader>,
        clock: Box<dyn Clock>,
    ) -> Self {
        let pipeline = ListingSubmissionPipeline::new(
            Rc::clone(&records),
            compressor,
            ImageUploader::new(blobs, reader),
            clock,
        );
        Self {
            records,
            session: SessionStore::new(identity),
            picker: MediaPicker::new(library),
            pipeline,
        }
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn pipeline(&self) -> &ListingSubmissionPipeline {
        &self.pipeline
    }

    pub fn bootstrap(&self, _command: BootstrapCommand) -> Result<(), ApplicationError> {
        self.records.initialize()?;
        self.session.bootstrap()
    }

    pub fn sign_in(&self, command: SignInCommand) -> Result<Session, ApplicationError> {
        self.session.sign_in(&command.email, &command.password)
    }

    /// Public feed: `available` listings, newest first, one offset/limit page.
    pub fn list_available(&self, query: ListAvailableQuery) -> Result<Vec<Listing>, ApplicationError> {
        let limit = query.limit.clamp(1, MAX_PAGE_SIZE) as usize;
        let offset = query.offset.max(0) as usize;

        self.records.select_listings(&ListingQuery {
            filters: vec![ListingFilter::Status(ListingStatus::Available)],
            order: ListingOrder::CreatedAtDesc,
            range: Some(RowRange {
                from: offset,
                to: offset + limit - 1,
            }),
        })
    }

    pub fn show_listing(&self, query: ShowListingQuery) -> Result<Option<Listing>, ApplicationError> {
        let trimmed = query.listing_id.trim();
        if trimmed.is_empty() {
            return Err(ApplicationError::InvalidInput("missing item id".to_string()));
        }
        let listing_id = ListingId::new(trimmed)?;

        let mut found = self.records.select_listings(&ListingQuery {
            filters: vec![ListingFilter::Id(listing_id)],
            order: ListingOrder::default(),
            range: Some(RowRange { from: 0, to: 0 }),
        })?;
        Ok(found.pop())
    }

    pub fn my_listings(&self, _query: MyListingsQuery) -> Result<Vec<Listing>, ApplicationError> {
        let seller_id = self.session.require_user_id()?;
        self.records.select_listings(&ListingQuery {
            filters: vec![ListingFilter::Seller(seller_id)],
            order: ListingOrder::IdDesc,
            range: None,
        })
    }

    pub fn create_listing(&self, command: CreateListingCommand) -> Result<Listing, ApplicationError> {
        let seller_id = self.session.require_user_id()?;
        self.pipeline.create(&seller_id, &command.draft)
    }

    pub fn edit_listing(&self, command: EditListingCommand) -> Result<Listing, ApplicationError> {
        let seller_id = self.session.require_user_id()?;
        self.pipeline
            .edit(&seller_id, &command.listing_id, &command.draft)
    }

    pub fn pick_images(&self, state: &mut ImagePickerState) -> usize {
        state.pick_from_library(&self.picker)
    }

    pub fn submit_form(&self, form: &mut ListingForm) -> Result<Listing, ApplicationError> {
        form.submit_with(|mode, draft| match mode {
            FormMode::Create => self.create_listing(CreateListingCommand {
                draft: draft.clone(),
            }),
            FormMode::Edit(listing_id) => self.edit_listing(EditListingCommand {
                listing_id: listing_id.clone(),
                draft: draft.clone(),
            }),
        })
    }
}
