//! Lumen CLI
//!
//! Resolves the application theme from a settings file, a cache directory,
//! and the OS preference, and renders it as CSS variables.
//!
//! ```text
//! lumen resolve --authenticated      # print the stylesheet
//! lumen set-mode dark                # record an explicit mode
//! lumen palette '#1f6feb'            # show derived shades
//! lumen watch                        # re-render on changes
//! ```

mod config;
mod css;
mod remote;
mod watch;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use config::{LumenConfig, CONFIG_FILE};
use css::CssTarget;
use lumen_core::HexColor;
use lumen_platform::FileStorage;
use lumen_theme::platform::parse_scheme_name;
use lumen_theme::{
    shade_hex, ColorScheme, PreferenceSignal, ShadeSet, ShadeVariant, ThemeEvent, ThemeMode,
    ThemePreset, ThemeStore,
};
use remote::JsonFileSettingsClient;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "lumen")]
#[command(author, version, about = "Lumen theme resolver", long_about = None)]
struct Cli {
    /// Config file, or a directory containing lumen.toml
    #[arg(short, long, global = true, default_value = CONFIG_FILE)]
    config: PathBuf,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Theme cache directory (overrides [storage] dir)
    #[arg(long, global = true)]
    storage_dir: Option<PathBuf>,

    /// Remote settings JSON file (overrides [remote] settings_file)
    #[arg(long, global = true)]
    settings_file: Option<PathBuf>,

    /// Stylesheet output path (overrides [output] css_file)
    #[arg(long, global = true)]
    css_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default lumen.toml
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Reconcile the theme and print the resulting stylesheet
    Resolve {
        /// Consult the remote settings
        #[arg(long)]
        authenticated: bool,

        /// Pretend the OS prefers this scheme
        #[arg(long, value_parser = parse_scheme)]
        scheme: Option<ColorScheme>,
    },

    /// Shift every channel of a color by an amount
    Shade {
        color: String,
        #[arg(allow_negative_numbers = true)]
        amount: i32,
    },

    /// Print the derived shades of a color
    Palette { color: String },

    /// List the built-in presets
    Presets,

    /// Record an explicit mode (light, dark, system, custom)
    SetMode { mode: ThemeMode },

    /// Flip between light and dark
    Toggle,

    /// Re-render whenever the settings file or the OS scheme changes
    Watch {
        /// Consult the remote settings
        #[arg(long)]
        authenticated: bool,

        /// OS scheme poll interval in seconds
        #[arg(long, default_value = "2")]
        poll_secs: u64,
    },
}

fn parse_scheme(raw: &str) -> std::result::Result<ColorScheme, String> {
    parse_scheme_name(raw).ok_or_else(|| format!("expected `light` or `dark`, got `{raw}`"))
}

fn init_logging(level: &str, verbose: u8) {
    let level = match verbose {
        0 => level,
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Open the store against the configured cache, settings file and stylesheet
fn open_store(
    config: &LumenConfig,
    scheme: Option<ColorScheme>,
) -> Result<(Rc<ThemeStore<JsonFileSettingsClient>>, CssTarget)> {
    let storage = FileStorage::open(&config.storage.dir)
        .with_context(|| format!("Failed to open cache at {}", config.storage.dir.display()))?;
    let client = JsonFileSettingsClient::new(config.remote.settings_file.clone());
    let target = CssTarget::new(config.output.css_file.clone());
    let signal = Rc::new(match scheme {
        Some(scheme) => PreferenceSignal::new(scheme),
        None => PreferenceSignal::detect(),
    });

    let store = ThemeStore::new(client, storage, target.clone(), signal);
    store.init();
    Ok((store, target))
}

fn print_summary(store: &ThemeStore<JsonFileSettingsClient>) {
    let colors = store.colors();
    eprintln!(
        "mode: {}  scheme: {}  theme: {}  primary: {}  accent: {}",
        store.mode(),
        if store.is_dark() { "dark" } else { "light" },
        colors.theme_name,
        colors.primary_color,
        colors.accent_color,
    );
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = LumenConfig::load(&cli.config)?;
    if let Some(dir) = cli.storage_dir {
        config.storage.dir = dir;
    }
    if let Some(file) = cli.settings_file {
        config.remote.settings_file = Some(file);
    }
    if let Some(file) = cli.css_file {
        config.output.css_file = Some(file);
    }

    init_logging(&config.logging.level, cli.verbose);

    match cli.command {
        Commands::Init { force } => {
            let path = if cli.config.is_dir() {
                cli.config.join(CONFIG_FILE)
            } else {
                cli.config
            };
            if path.exists() && !force {
                anyhow::bail!("{} already exists (use --force to overwrite)", path.display());
            }
            std::fs::write(&path, LumenConfig::default().to_toml()?)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Created {}", path.display());
        }

        Commands::Resolve {
            authenticated,
            scheme,
        } => {
            let (store, target) = open_store(&config, scheme)?;
            let authenticated = authenticated || config.remote.authenticated;
            store
                .dispatch(ThemeEvent::AuthStateChanged(authenticated))
                .await;
            print_summary(&store);
            print!("{}", target.css());
            store.dispose();
        }

        Commands::Shade { color, amount } => {
            let shaded = shade_hex(&color, amount)
                .with_context(|| format!("Invalid color `{color}`"))?;
            println!("{shaded}");
        }

        Commands::Palette { color } => {
            let base = HexColor::parse(&color).with_context(|| format!("Invalid color `{color}`"))?;
            let shades = ShadeSet::derive(base);
            for &variant in ShadeVariant::all() {
                println!(
                    "{:<8} {:>4}  {}",
                    variant.suffix().unwrap_or("base"),
                    variant.amount(),
                    shades.get(variant)
                );
            }
        }

        Commands::Presets => {
            for preset in ThemePreset::all() {
                println!(
                    "{:<8} {:<10} {}  {}",
                    preset.id(),
                    preset.display_name(),
                    preset.primary(),
                    preset.accent()
                );
            }
        }

        Commands::SetMode { mode } => {
            let (store, _) = open_store(&config, None)?;
            store.set_mode(mode);
            print_summary(&store);
            store.dispose();
        }

        Commands::Toggle => {
            let (store, _) = open_store(&config, None)?;
            store.toggle_theme();
            print_summary(&store);
            store.dispose();
        }

        Commands::Watch {
            authenticated,
            poll_secs,
        } => {
            let (store, target) = open_store(&config, None)?;
            let authenticated = authenticated || config.remote.authenticated;
            store
                .dispatch(ThemeEvent::AuthStateChanged(authenticated))
                .await;
            print_summary(&store);
            if target.path().is_none() {
                tracing::warn!("no css_file configured, watch only updates the cache");
            }

            watch::run(
                store,
                config.remote.settings_file.as_deref(),
                Duration::from_secs(poll_secs.max(1)),
            )
            .await?;
        }
    }

    Ok(())
}
