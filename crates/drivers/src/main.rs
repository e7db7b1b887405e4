mod config;
mod logging;
mod view;

use std::io;
use std::process::ExitCode;
use std::rc::Rc;

use clap::{Parser, Subcommand};
use config::AppConfig;
use lite_market_adapters::{
    present_listing_detail, present_listing_row, FsBlobStore, FsLocalImageReader, FsMediaLibrary,
    ImageCrateCompressor, MockIdentityProvider, SqliteRecordStore, SystemClock,
};
use lite_market_application::{
    ApplicationError, ApplicationService, BootstrapCommand, ImagePickerState, ListAvailableQuery,
    ListingForm, MyListingsQuery, ShowListingQuery, SignInCommand,
};
use lite_market_domain::Listing;
use tracing::{info, warn};
use view::ViewSession;

#[derive(Debug, Parser)]
#[command(name = "lite-market", about = "Local marketplace listings with image uploads")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Available listings, newest first.
    List {
        #[arg(long, default_value_t = 20, allow_negative_numbers = true)]
        limit: i64,
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        offset: i64,
    },
    /// Listings owned by the signed-in seller.
    Mine,
    Show {
        id: String,
    },
    /// Pick images from the configured library folder.
    Pick,
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        price: String,
        #[arg(long, default_value = "")]
        description: String,
        /// Local paths, `file://` URIs or already-public URLs, in display order.
        images: Vec<String>,
    },
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        price: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// Drop the listing's current images before adding new ones.
        #[arg(long)]
        clear_images: bool,
        images: Vec<String>,
    },
    /// Browse a listing's images; reads viewer commands from stdin.
    View {
        id: String,
        /// Use the native gesture viewer instead of scroll paging.
        #[arg(long)]
        native: bool,
    },
}

#[derive(Debug, Clone)]
enum CommandError {
    Usage(String),
    Runtime(String),
}

fn main() -> ExitCode {
    logging::init_logging();
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(error) => {
            let _ = error.print();
            return if error.use_stderr() {
                ExitCode::from(2)
            } else {
                ExitCode::SUCCESS
            };
        }
    };
    let config = AppConfig::from_env();

    let service = build_application_service(&config);
    if let Err(error) = start_session(&service, &config) {
        eprintln!("failed to start lite-market: {error}");
        return ExitCode::from(1);
    }

    match run_command(cli.command, &service, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(CommandError::Usage(msg)) => {
            eprintln!("{msg}");
            ExitCode::from(2)
        }
        Err(CommandError::Runtime(msg)) => {
            eprintln!("{msg}");
            ExitCode::from(1)
        }
    }
}

fn build_application_service(config: &AppConfig) -> ApplicationService {
    ApplicationService::new(
        Rc::new(SqliteRecordStore::new(config.database_path.clone())),
        Box::new(MockIdentityProvider::new()),
        Box::new(FsMediaLibrary::new(
            config.library_root.clone(),
            config.media_permission,
        )),
        Box::new(ImageCrateCompressor::new(config.compressed_dir.clone())),
        Box::new(FsBlobStore::new(
            config.blob_root.clone(),
            config.bucket.clone(),
            config.public_base_url.clone(),
        )),
        Box::new(FsLocalImageReader),
        Box::new(SystemClock),
    )
}

fn start_session(service: &ApplicationService, config: &AppConfig) -> Result<(), ApplicationError> {
    service.bootstrap(BootstrapCommand)?;
    if service.session().current().is_none() && config.has_session_credentials() {
        let session = service.sign_in(SignInCommand {
            email: config.session_email.clone(),
            password: config.session_password.clone(),
        })?;
        info!(user_id = %session.user_id, "session ready");
    }
    Ok(())
}

fn runtime(context: &str, error: ApplicationError) -> CommandError {
    warn!(error = %error, kind = ?error.kind(), "{context} failed");
    let message = error.user_message().unwrap_or_else(|| error.to_string());
    CommandError::Runtime(format!("{context} failed: {message}"))
}

fn run_command(
    command: Command,
    service: &ApplicationService,
    config: &AppConfig,
) -> Result<(), CommandError> {
    match command {
        Command::List { limit, offset } => {
            let listings = service
                .list_available(ListAvailableQuery { limit, offset })
                .map_err(|error| runtime("list", error))?;
            print_rows(&listings, "no available listings");
            Ok(())
        }
        Command::Mine => {
            let listings = service
                .my_listings(MyListingsQuery)
                .map_err(|error| runtime("mine", error))?;
            print_rows(&listings, "you have no listings");
            Ok(())
        }
        Command::Show { id } => {
            let listing = find_listing(service, id)?;
            println!("{}", present_listing_detail(&listing));
            Ok(())
        }
        Command::Pick => {
            let mut picker = ImagePickerState::default();
            let added = service.pick_images(&mut picker);
            if let Some(message) = picker.error {
                return Err(CommandError::Runtime(message));
            }
            if added == 0 {
                println!("no images picked");
                return Ok(());
            }
            for reference in picker.selection.as_slice() {
                println!("{reference}");
            }
            Ok(())
        }
        Command::Create {
            title,
            price,
            description,
            images,
        } => {
            let mut form = ListingForm::for_create();
            form.title = title;
            form.price_text = price;
            form.description = description;
            form.images.selection.add(images);
            submit(service, &mut form)
        }
        Command::Edit {
            id,
            title,
            price,
            description,
            clear_images,
            images,
        } => {
            let listing = find_listing(service, id)?;
            let mut form = ListingForm::for_edit(&listing);
            if let Some(title) = title {
                form.title = title;
            }
            if let Some(price) = price {
                form.price_text = price;
            }
            if let Some(description) = description {
                form.description = description;
            }
            if clear_images {
                form.images.clear();
            }
            form.images.selection.add(images);
            submit(service, &mut form)
        }
        Command::View { id, native } => {
            let listing = find_listing(service, id)?;
            let mut session = ViewSession::new(listing.images, config.page_width, native);
            session
                .run(io::stdin().lock(), io::stdout().lock())
                .map_err(|error| CommandError::Runtime(format!("view failed: {error}")))
        }
    }
}

fn find_listing(service: &ApplicationService, id: String) -> Result<Listing, CommandError> {
    match service.show_listing(ShowListingQuery { listing_id: id }) {
        Ok(Some(listing)) => Ok(listing),
        Ok(None) => Err(CommandError::Runtime("item not found".to_string())),
        Err(ApplicationError::InvalidInput(message)) => Err(CommandError::Usage(message)),
        Err(error) => Err(runtime("lookup", error)),
    }
}

fn submit(service: &ApplicationService, form: &mut ListingForm) -> Result<(), CommandError> {
    println!("{}...", form.submit_label());
    match service.submit_form(form) {
        Ok(listing) => {
            println!("{}", present_listing_detail(&listing));
            Ok(())
        }
        Err(ApplicationError::Validation(errors)) => Err(CommandError::Usage(errors.to_string())),
        Err(error) => {
            warn!(error = %error, stage = ?service.pipeline().stage(), "submission failed");
            let mut banner = form
                .banner
                .clone()
                .unwrap_or_else(|| error.to_string());
            if let Some(listing_id) = error.created_listing() {
                banner.push_str(&format!(
                    "\nlisting {listing_id} was saved; finish it with `lite-market edit {listing_id}`"
                ));
            }
            Err(CommandError::Runtime(banner))
        }
    }
}

fn print_rows(listings: &[Listing], empty_message: &str) {
    if listings.is_empty() {
        println!("{empty_message}");
        return;
    }
    for listing in listings {
        println!("{}", present_listing_row(listing));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_create_with_images_in_order() {
        let cli = Cli::try_parse_from([
            "lite-market",
            "create",
            "--title",
            "Desk",
            "--price",
            "120.00",
            "a.jpg",
            "https://cdn.test/b.jpg",
        ])
        .expect("create should parse");
        let Command::Create { images, description, .. } = cli.command else {
            panic!("expected create");
        };
        assert_eq!(images, vec!["a.jpg", "https://cdn.test/b.jpg"]);
        assert_eq!(description, "");
    }

    #[test]
    fn parse_list_accepts_out_of_range_values() {
        let cli = Cli::try_parse_from(["lite-market", "list", "--limit", "500", "--offset", "-4"])
            .expect("list should parse");
        assert!(matches!(
            cli.command,
            Command::List {
                limit: 500,
                offset: -4
            }
        ));
    }

    #[test]
    fn parse_view_flags() {
        let cli = Cli::try_parse_from(["lite-market", "view", "item-1", "--native"])
            .expect("view should parse");
        assert!(matches!(cli.command, Command::View { native: true, .. }));
    }

    #[test]
    fn create_requires_title_and_price() {
        assert!(Cli::try_parse_from(["lite-market", "create", "--price", "1"]).is_err());
        assert!(Cli::try_parse_from(["lite-market", "show"]).is_err());
    }
}
