mod commands;

use clap::Parser;
use colored::Colorize;
use commands::{Cli, Commands, OutputFormat, ViewCommands, ViewTarget};
use homefav_core::native::{FileStorage, NativeHttpClient};
use homefav_core::view_mode::{load_view, save_view};
use homefav_core::{
    badge_text, CatalogView, CoreError, FavoriteId, FavoritesEvent, FavoritesPage, FavoritesStore,
    FavoritesView, PageState, PropertyApi, PropertySummary, Settings, StorageBackend,
};
use log::{debug, info};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Duration;

type AppError = CoreError;

const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging
    if cli.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }

    if let Err(error) = run(cli).await {
        eprintln!("{} {}", "ERROR:".red(), error);
        std::process::exit(1);
    }
}

/// Config path precedence: --config, HOMEFAV_CONFIG_PATH, ./config.toml
fn resolve_config_path(cli: &Cli) -> PathBuf {
    cli.config
        .clone()
        .or_else(|| std::env::var("HOMEFAV_CONFIG_PATH").ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

fn load_settings(cli: &Cli) -> Result<Settings, AppError> {
    let config_path = resolve_config_path(cli);
    let mut settings = if config_path.exists() {
        debug!("Loading config from {}", config_path.display());
        Settings::from_file(&config_path.to_string_lossy())?
    } else {
        debug!("No config at {}, using defaults", config_path.display());
        Settings::default()
    };
    if let Some(dir) = &cli.storage_dir {
        settings.storage_dir = dir.to_string_lossy().into_owned();
    }
    settings.validate()?;
    Ok(settings)
}

fn open_store(storage_dir: &Path) -> FavoritesStore<FileStorage> {
    let store = FavoritesStore::new(FileStorage::new(storage_dir.to_path_buf()));
    store.subscribe(|event| {
        if let FavoritesEvent::Changed { id, is_favorite, count } = event {
            info!("favorite {} is_favorite={} count={}", id, is_favorite, count);
        }
    });
    store
}

async fn run(cli: Cli) -> Result<(), AppError> {
    let settings = load_settings(&cli)?;
    let store = open_store(Path::new(&settings.storage_dir));

    match &cli.command {
        Commands::List { format } => {
            let ids = store.get_all();
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string(&ids)?),
                OutputFormat::Plain => {
                    for id in ids {
                        println!("{}", id);
                    }
                }
            }
        }

        Commands::Has { id } => {
            let present = FavoriteId::new(*id).map(|id| store.has(id)).unwrap_or(false);
            println!("{}", present);
        }

        Commands::Toggle { id } => {
            if FavoriteId::new(*id).is_none() {
                return Err(AppError::InvalidInput(format!("favorite id must be a positive integer, got {}", id)));
            }
            if store.toggle(*id) {
                println!("{} {}", "Added to favorites:".green(), id);
            } else {
                println!("{} {}", "Removed from favorites:".yellow(), id);
            }
        }

        Commands::Clear => {
            let removed = store.count();
            store.clear();
            println!("Favorites cleared ({} removed)", removed);
        }

        Commands::Count => println!("{}", store.count()),

        Commands::Badge => {
            if let Some(text) = badge_text(store.count()) {
                println!("{}", text);
            }
        }

        Commands::View { command } => handle_view_command(&store, command)?,

        Commands::Keys => {
            let storage = store.storage();
            for key in storage.list_keys()? {
                let value = storage.get_item(&key)?.unwrap_or_default();
                println!("{} = {}", key.bold(), value);
            }
        }

        Commands::Fetch { format } => {
            let http = NativeHttpClient::with_timeout(Duration::from_secs(settings.request_timeout_secs))?;
            let api = PropertyApi::new(http, settings.api_base_url.clone(), settings.favorite_properties_path.clone());
            let page = FavoritesPage::new(Rc::new(store), api);

            match page.reload().await {
                PageState::Empty | PageState::Loading => println!("No favorites yet"),
                PageState::Error(e) => {
                    return Err(AppError::Api(format!("error loading favorites: {}", e)));
                }
                PageState::Loaded(properties) => match format {
                    OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&properties)?),
                    OutputFormat::Plain => print_properties(&properties),
                },
            }
        }
    }

    Ok(())
}

fn handle_view_command(store: &FavoritesStore<FileStorage>, command: &ViewCommands) -> Result<(), AppError> {
    let storage = store.storage();
    match command {
        ViewCommands::Get { target } => match target {
            ViewTarget::Favorites => println!("{}", load_view::<FavoritesView, _>(storage)),
            ViewTarget::Catalog => println!("{}", load_view::<CatalogView, _>(storage)),
        },
        ViewCommands::Set { target, value } => {
            match target {
                ViewTarget::Favorites => {
                    let view: FavoritesView = value.parse().map_err(AppError::InvalidInput)?;
                    save_view(storage, view);
                }
                ViewTarget::Catalog => {
                    let view: CatalogView = value.parse().map_err(AppError::InvalidInput)?;
                    save_view(storage, view);
                }
            }
            println!("View set to {}", value);
        }
    }
    Ok(())
}

fn print_properties(properties: &[PropertySummary]) {
    for p in properties {
        println!(
            "{:>6}  {:<53} {:>16}  {}",
            p.id.to_string().bold(),
            p.card_title(),
            p.price_display,
            p.district_name
        );
    }
}
