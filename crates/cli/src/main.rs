use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

/// Operator tool for the TrafficEye report pipeline and session services.
#[derive(Parser, Debug)]
#[clap(name = "trafficeye", version)]
struct Cli {
    /// Key/value store holding the session and onboarding flag
    #[clap(long, env = "SESSION_STORE_PATH", default_value = ".trafficeye/session.json")]
    store: String,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract plate number and violation type from an image
    Analyze {
        /// Path or file:// URI of the image
        image: String,
    },

    /// Sign in with email and password
    SignIn {
        #[clap(long)]
        email: String,
        #[clap(long, env = "TRAFFICEYE_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Officer sign-in with badge id and password
    SignInBadge {
        #[clap(long)]
        badge: String,
        #[clap(long, env = "TRAFFICEYE_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Sign out and forget the stored session
    SignOut,

    /// Send a password reset email
    ResetPassword {
        #[clap(long)]
        email: String,
    },

    /// Reverse geocode a position the way the report flow does
    Geocode {
        #[clap(long, allow_hyphen_values = true)]
        lat: f64,
        #[clap(long, allow_hyphen_values = true)]
        lon: f64,
    },

    /// Mark onboarding as seen
    Onboard,

    /// Resolve the view the app would mount for the stored session
    Route,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "trafficeye=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Analyze { image } => commands::analyze(&image).await,
        Command::SignIn { email, password } => {
            commands::sign_in(&cli.store, &email, &password).await
        }
        Command::SignInBadge { badge, password } => {
            commands::sign_in_badge(&cli.store, &badge, &password).await
        }
        Command::SignOut => commands::sign_out(&cli.store).await,
        Command::ResetPassword { email } => commands::reset_password(&cli.store, &email).await,
        Command::Geocode { lat, lon } => commands::geocode(lat, lon).await,
        Command::Onboard => commands::onboard(&cli.store).await,
        Command::Route => commands::route(&cli.store).await,
    }
}
