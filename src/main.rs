//! # invitare
//!
//! invitare lets organizers create themed event invitations and share them as
//! standalone html pages with an RSVP link.
#![warn(missing_docs)]
#![cfg_attr(
    feature = "rorm-main",
    allow(dead_code, unused_variables, unused_imports)
)]

use std::fs::read_to_string;
use std::path::{Path, PathBuf};

use actix_toolbox::logging::setup_logging;
use clap::{Args, Parser, Subcommand};
use log::{error, info, warn};
use rorm::{Database, DatabaseConfiguration, DatabaseDriver};
use uuid::Uuid;

use crate::config::{Config, DatabaseConfig};
use crate::ingest::{ImageIngestor, SelectedFile};
use crate::lifecycle::{Action, Field, LifecycleController, NoticeKind, View};
use crate::render::TemplateRenderer;
use crate::repository::InvitationRepository;
use crate::server::start_server;
use crate::store::{DataStore, DatabaseStore, MemoryStore, Store};

pub mod config;
pub mod ingest;
pub mod invitation;
pub mod lifecycle;
pub mod models;
pub mod render;
pub mod repository;
pub mod server;
pub mod store;
pub mod theme;

/// The form fields of a new invitation
#[derive(Args)]
pub struct CreateArgs {
    #[clap(long)]
    #[clap(help = "The name of the event")]
    title: String,
    #[clap(long = "date")]
    #[clap(help = "Date and time of the event, e.g. 2025-03-15T19:00")]
    event_date_time: String,
    #[clap(long)]
    #[clap(help = "Where the event takes place")]
    location: String,
    #[clap(long)]
    #[clap(help = "Name of the organizer")]
    organizer: String,
    #[clap(long, default_value_t = String::new())]
    description: String,
    #[clap(long = "whatsapp", default_value_t = String::new())]
    #[clap(help = "Phone number that receives RSVPs")]
    whatsapp_number: String,
    #[clap(long = "color", default_value_t = String::from("purple"))]
    #[clap(help = "One of purple, pink, blue, green, orange, pastel")]
    color_theme: String,
    #[clap(long = "font", default_value_t = String::from("elegant"))]
    #[clap(help = "One of elegant, modern, playful")]
    font_theme: String,
    #[clap(long = "image")]
    #[clap(help = "Image file to attach, can be given multiple times")]
    images: Vec<PathBuf>,
}

/// The possible commands for invitare
#[derive(Subcommand)]
pub enum Command {
    /// Start the server
    Start,
    /// Create a new invitation
    Create(CreateArgs),
    /// List all invitations, the most recent first
    List,
    /// Render an invitation into a html file and count the view
    Render {
        /// The uuid of the invitation
        uuid: Uuid,
        #[clap(long)]
        #[clap(help = "Where to write the document, defaults to <uuid>.html")]
        output: Option<PathBuf>,
    },
}

/// The cli parser for invitare
#[derive(Parser)]
#[clap(version, about = "Themed event invitations")]
pub struct Cli {
    #[clap(long = "config-path")]
    #[clap(help = "Specify an alternative path to the config file")]
    #[clap(default_value_t = String::from("/etc/invitare/config.toml"))]
    config_path: String,

    #[clap(subcommand)]
    command: Command,
}

#[rorm::rorm_main]
#[tokio::main]
async fn main() -> Result<(), String> {
    let cli = Cli::parse();

    let conf = get_conf(&cli.config_path)?;

    setup_logging(&conf.logging)?;

    let repository = InvitationRepository::new(get_store(&conf).await?)
        .with_max_view_retries(conf.invitations.max_view_retries);

    let renderer = TemplateRenderer::new(
        conf.invitations.locale,
        &conf.invitations.country_code,
        &conf.invitations.messaging_host,
    );

    match cli.command {
        Command::Start => {
            if let Err(err) = start_server(&conf, repository, renderer).await {
                error!("Error while starting server: {err}");
                return Err(err.to_string());
            }
        }
        Command::Create(args) => {
            let ingestor = ImageIngestor::new(conf.invitations.max_image_size);
            let mut controller = LifecycleController::new(repository, ingestor, renderer);
            create(&mut controller, args).await?;
            print_listing(&controller);
        }
        Command::List => {
            let ingestor = ImageIngestor::new(conf.invitations.max_image_size);
            let mut controller = LifecycleController::new(repository, ingestor, renderer);
            controller.dispatch(Action::SwitchView(View::Listing));
            controller.refresh().await;
            check_notice(&controller)?;
            print_listing(&controller);
        }
        Command::Render { uuid, output } => {
            let ingestor = ImageIngestor::new(conf.invitations.max_image_size);
            let mut controller = LifecycleController::new(repository, ingestor, renderer);

            let document = controller.open(uuid).await.ok_or_else(|| notice_text(&controller))?;

            let output = output.unwrap_or_else(|| PathBuf::from(format!("{uuid}.html")));
            tokio::fs::write(&output, document)
                .await
                .map_err(|err| format!("Could not write {}: {err}", output.display()))?;

            info!("Wrote invitation to {}", output.display());
            check_notice(&controller)?;
        }
    }

    Ok(())
}

/// Fill the draft from the command line, attach the images and submit it
async fn create<S: DataStore>(
    controller: &mut LifecycleController<S>,
    args: CreateArgs,
) -> Result<(), String> {
    for (field, value) in [
        (Field::Title, args.title),
        (Field::EventDateTime, args.event_date_time),
        (Field::Location, args.location),
        (Field::Description, args.description),
        (Field::Organizer, args.organizer),
        (Field::WhatsappNumber, args.whatsapp_number),
        (Field::ColorTheme, args.color_theme),
        (Field::FontTheme, args.font_theme),
    ] {
        controller.dispatch(Action::EditField(field, value));
    }

    let mut files = Vec::with_capacity(args.images.len());
    for path in &args.images {
        let file = SelectedFile::read(path)
            .await
            .map_err(|err| format!("Could not read {}: {err}", path.display()))?;
        files.push(file);
    }
    controller.select_files(files).await;

    let record = controller.submit().await.ok_or_else(|| notice_text(controller))?;

    println!("{}", record.uuid);
    Ok(())
}

fn notice_text<S: DataStore>(controller: &LifecycleController<S>) -> String {
    controller
        .state()
        .notice
        .as_ref()
        .map(|notice| notice.text.clone())
        .unwrap_or_else(|| "Unknown error".to_string())
}

/// Fail if the last flow ended with an error notice
fn check_notice<S: DataStore>(controller: &LifecycleController<S>) -> Result<(), String> {
    match &controller.state().notice {
        Some(notice) if notice.kind == NoticeKind::Error => Err(notice.text.clone()),
        _ => Ok(()),
    }
}

fn print_listing<S: DataStore>(controller: &LifecycleController<S>) {
    for invitation in &controller.state().invitations {
        println!(
            "{}  {}  {}  {} views  {}",
            invitation.uuid,
            invitation.event_date_time.format("%Y-%m-%d %H:%M"),
            invitation.created_at.format("%Y-%m-%d %H:%M:%S"),
            invitation.view_count,
            invitation.title,
        );
    }
}

/// Retrieve a [Config] by Path
///
/// **Parameter**:
/// - `config_path`: [&str]
fn get_conf(config_path: &str) -> Result<Config, String> {
    let path = Path::new(config_path);

    if !path.exists() {
        return Err(format!("File {config_path} does not exist"));
    }

    if !path.is_file() {
        return Err(format!("{config_path} is a directory"));
    }

    let config_str =
        read_to_string(path).map_err(|err| format!("Could not read config file: {err}"))?;

    let config: Config =
        toml::from_str(&config_str).map_err(|err| format!("Could not parse config file: {err}"))?;

    Ok(config)
}

/// Open the configured store and check that it is reachable
async fn get_store(config: &Config) -> Result<Store, String> {
    let store = match &config.database {
        Some(database) => {
            let db = get_db(database).await?;
            info!("Connected to database");
            Store::Database(DatabaseStore::new(db))
        }
        None => {
            warn!("No database configured, invitations are only kept in memory");
            Store::Memory(MemoryStore::new(config.invitations.memory_limit))
        }
    };

    let count = InvitationRepository::new(store.clone())
        .count()
        .await
        .map_err(|err| format!("Store is not reachable: {err}"))?;
    info!("Store holds {count} invitations");

    Ok(store)
}

/// Retrieves the database using the provided config.
///
/// If the connection fails, an error is returned
async fn get_db(config: &DatabaseConfig) -> Result<Database, String> {
    let c = DatabaseConfiguration {
        driver: DatabaseDriver::Postgres {
            host: config.host.clone(),
            port: config.port,
            name: config.name.clone(),
            user: config.user.clone(),
            password: config.password.clone(),
        },
        min_connections: 2,
        max_connections: 20,
        disable_logging: Some(true),
        statement_log_level: None,
        slow_statement_log_level: None,
    };

    Database::connect(c)
        .await
        .map_err(|e| format!("Error connecting to database: {e}"))
}
