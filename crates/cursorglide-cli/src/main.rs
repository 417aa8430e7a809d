use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cursorglide_core::AppConfig;

mod commands;

use commands::click::ClickButton;

#[derive(Parser)]
#[command(name = "cursorglide")]
#[command(author, version, about = "Smooth pointer motion and rate-limited wheel scrolling")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Pointer backend: auto, enigo or virtual
    #[arg(long, global = true)]
    backend: Option<String>,

    /// Motion speed in pixels per second
    #[arg(long, global = true)]
    speed: Option<f64>,

    /// Updates per second for motion and scrolling
    #[arg(long, global = true)]
    frame_rate: Option<u32>,

    /// Wheel units per second
    #[arg(long, global = true)]
    scroll_rate: Option<f64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Glide the pointer to an absolute position
    Move {
        #[arg(allow_negative_numbers = true)]
        x: i32,
        #[arg(allow_negative_numbers = true)]
        y: i32,
    },
    /// Scroll the wheel (positive = up, negative = down)
    Scroll {
        #[arg(allow_negative_numbers = true)]
        delta: i32,
    },
    /// Click a mouse button
    Click {
        #[arg(value_enum, default_value_t = ClickButton::Left)]
        button: ClickButton,
    },
    /// Show the addressable area and the pointer position
    Bounds,
    /// Read pointer commands from stdin
    Interactive,
    /// Inspect or change the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Validate and save the rates given with --speed, --frame-rate and --scroll-rate
    Set,
}

impl Cli {
    /// Apply one-off flag overrides on top of the file configuration
    fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(backend) = &self.backend {
            config.general.backend = backend.clone();
        }
        commands::config::apply(config, self.speed, self.frame_rate, self.scroll_rate);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let file_config = AppConfig::load()?;

    // Initialize logging; stderr keeps the interactive prompt clean
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| file_config.general.log_level.clone()),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let mut config = file_config.clone();
    cli.apply_overrides(&mut config);
    config.validate()?;

    match cli.command {
        Some(Commands::Move { x, y }) => commands::move_to::run(&config, x, y).await,
        Some(Commands::Scroll { delta }) => commands::scroll::run(&config, delta).await,
        Some(Commands::Click { button }) => commands::click::run(&config, button),
        Some(Commands::Bounds) => commands::bounds::run(&config),
        Some(Commands::Interactive) | None => commands::interactive::run(&config).await,
        Some(Commands::Config { action }) => match action {
            ConfigAction::Show => commands::config::show(&config),
            ConfigAction::Set => {
                commands::config::set(file_config, cli.speed, cli.frame_rate, cli.scroll_rate)
            }
        },
    }
}
