use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use delivery_lib::application::services::{PingOutcome, SubmitOutcome};
use delivery_lib::domain::entities::{Attachment, LocationPing, ProofOfDelivery};
use delivery_lib::domain::value_objects::{Coordinates, StopStatus};
use delivery_lib::shared::config::Platform;
use delivery_lib::{AppConfig, AppState};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser)]
#[command(name = "driver_harness")]
#[command(about = "Drives the delivery client core from the command line", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Backend base URL
    #[arg(long, env = "DELIVERY_API_BASE_URL")]
    api_base_url: Option<String>,

    /// Platform used for navigation links
    #[arg(long, value_enum)]
    platform: Option<PlatformArg>,
}

#[derive(Clone, Copy, ValueEnum)]
enum PlatformArg {
    Android,
    Ios,
    Web,
}

impl From<PlatformArg> for Platform {
    fn from(value: PlatformArg) -> Self {
        match value {
            PlatformArg::Android => Platform::Android,
            PlatformArg::Ios => Platform::Ios,
            PlatformArg::Web => Platform::Web,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum QueueArg {
    Location,
    Pod,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and persist the access token
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "DELIVERY_PASSWORD")]
        password: String,
    },
    /// Sign out and clear local state
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Go on or off duty
    Duty {
        #[arg(action = clap::ArgAction::Set)]
        on: bool,
    },
    /// Change the account password
    ChangePassword {
        #[arg(long)]
        current: String,
        #[arg(long)]
        new: String,
        #[arg(long)]
        confirm: String,
    },
    /// List assigned routes
    Routes {
        /// Read the locally cached list instead of the server
        #[arg(long)]
        cached: bool,
    },
    /// Show one route with its stops
    Route { route_id: String },
    /// Set a stop status
    StopStatus { stop_id: String, status: StopStatus },
    /// Re-sequence a route; pass every stop id in the new order
    Reorder {
        route_id: String,
        #[arg(required = true)]
        stop_ids: Vec<String>,
    },
    /// Move one stop to another position (0-based)
    MoveStop {
        route_id: String,
        from: usize,
        to: usize,
    },
    /// Submit proof of delivery
    Pod {
        stop_id: String,
        #[arg(long)]
        recipient: String,
        #[arg(long)]
        comment: Option<String>,
        #[arg(long)]
        signature: Option<PathBuf>,
        #[arg(long = "photo")]
        photos: Vec<PathBuf>,
        #[arg(long, requires = "lng")]
        lat: Option<f64>,
        #[arg(long, requires = "lat")]
        lng: Option<f64>,
    },
    /// Report a location fix
    Ping {
        lat: f64,
        lng: f64,
        #[arg(long)]
        accuracy: Option<f64>,
    },
    /// Look up an ERP document by scanned barcode
    Scan { barcode: String },
    /// Push a status for a scanned ERP document
    ErpStatus { barcode: String, status: String },
    /// Print (or open) map links for a stop
    Navigate {
        route_id: String,
        stop_id: String,
        #[arg(long)]
        open: bool,
    },
    /// Inspect or clear an offline queue
    Queue {
        #[arg(value_enum)]
        which: QueueArg,
        #[arg(long)]
        clear: bool,
    },
    /// Read a preference from the local shadow
    PrefGet {
        key: String,
        /// Pull the server value first
        #[arg(long)]
        reconcile: bool,
    },
    /// Set a preference (JSON value)
    PrefSet { key: String, value: String },
    /// Fetch admin reference lists
    Fleet,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    delivery_lib::init_logging();

    let mut config = AppConfig::from_env();
    if let Some(url) = cli.api_base_url {
        config.api.base_url = url;
    }
    if let Some(platform) = cli.platform {
        config.platform = platform.into();
    }

    let state = AppState::new(config)
        .await
        .context("failed to initialise client core")?;
    let outcome = run(&state, cli.command).await;
    state.shutdown().await;
    outcome
}

async fn run(state: &AppState, command: Commands) -> Result<()> {
    match command {
        Commands::Login { email, password } => {
            let user = state.auth.login(&email, &password).await.map_err(alert)?;
            println!("Signed in as {} ({:?})", user.display_name(), user.role);
        }
        Commands::Logout => {
            state.auth.logout().await.map_err(alert)?;
            println!("Signed out");
        }
        Commands::Whoami => match state.auth.restore_session().await.map_err(alert)? {
            Some(user) => print_json(&user)?,
            None => println!("Not signed in"),
        },
        Commands::Duty { on } => {
            state.auth.restore_session().await.map_err(alert)?;
            let user = state.auth.set_duty_status(on).await.map_err(alert)?;
            println!("On duty: {}", user.on_duty);
        }
        Commands::ChangePassword {
            current,
            new,
            confirm,
        } => {
            state
                .auth
                .change_password(&current, &new, &confirm)
                .await
                .map_err(alert)?;
            println!("Password changed");
        }
        Commands::Routes { cached } => {
            let routes = if cached {
                state.routes.load_cached_routes().await.map_err(alert)?
            } else {
                state.routes.fetch_routes().await.map_err(alert)?
            };
            for route in routes {
                println!("{}\t{}\t{} stops", route.id, route.name, route.stops.len());
            }
        }
        Commands::Route { route_id } => {
            let route = state.routes.select_route(&route_id).await.map_err(alert)?;
            for stop in &route.stops {
                println!(
                    "{:>3}  {:<12} {:<10} {}",
                    stop.sequence, stop.id, stop.status, stop.address
                );
            }
        }
        Commands::StopStatus { stop_id, status } => {
            state.routes.fetch_routes().await.map_err(alert)?;
            state
                .routes
                .update_stop_status(&stop_id, status)
                .await
                .map_err(alert)?;
            println!("Stop {stop_id} is now {status}");
        }
        Commands::Reorder { route_id, stop_ids } => {
            state.routes.select_route(&route_id).await.map_err(alert)?;
            state
                .routes
                .reorder_stops(&route_id, stop_ids)
                .await
                .map_err(alert)?;
            println!("Route {route_id} re-sequenced");
        }
        Commands::MoveStop { route_id, from, to } => {
            state.routes.select_route(&route_id).await.map_err(alert)?;
            let order = state
                .routes
                .move_stop(&route_id, from, to)
                .await
                .map_err(alert)?;
            println!("New order: {}", order.join(", "));
        }
        Commands::Pod {
            stop_id,
            recipient,
            comment,
            signature,
            photos,
            lat,
            lng,
        } => {
            let location = match (lat, lng) {
                (Some(lat), Some(lng)) => Some(Coordinates::new(lat, lng).map_err(alert)?),
                _ => None,
            };
            let signature = match signature {
                Some(path) => Some(read_attachment(&path).await?),
                None => None,
            };
            let mut photo_attachments = Vec::with_capacity(photos.len());
            for path in &photos {
                photo_attachments.push(read_attachment(path).await?);
            }
            let pod = ProofOfDelivery {
                stop_id,
                recipient_name: recipient,
                comment,
                location,
                signature,
                photos: photo_attachments,
            };
            match state.pod.submit(&pod).await.map_err(alert)? {
                SubmitOutcome::Submitted => println!("Proof of delivery submitted"),
                SubmitOutcome::Queued(id) => println!("Offline: queued as #{id}"),
            }
        }
        Commands::Ping { lat, lng, accuracy } => {
            state.auth.restore_session().await.map_err(alert)?;
            let coordinates = Coordinates::new(lat, lng).map_err(alert)?;
            let outcome = state
                .tracking
                .record(LocationPing::new(coordinates, accuracy))
                .await
                .map_err(alert)?;
            match outcome {
                PingOutcome::Sent => println!("Location sent"),
                PingOutcome::Queued(id) => println!("Offline: queued as #{id}"),
                PingOutcome::Skipped => println!("Off duty, nothing sent"),
            }
        }
        Commands::Scan { barcode } => {
            let document = state.erp.lookup(&barcode).await.map_err(alert)?;
            print_json(&document)?;
        }
        Commands::ErpStatus { barcode, status } => {
            let document = state.erp.lookup(&barcode).await.map_err(alert)?;
            state
                .erp
                .push_status(&document, &status)
                .await
                .map_err(alert)?;
            println!("Status pushed");
        }
        Commands::Navigate {
            route_id,
            stop_id,
            open,
        } => {
            let route = state.routes.select_route(&route_id).await.map_err(alert)?;
            let stop = route
                .find_stop(&stop_id)
                .with_context(|| format!("stop {stop_id} is not on route {route_id}"))?;
            if open {
                let url = state.navigation.open(stop).await.map_err(alert)?;
                println!("Opened {url}");
            } else {
                let links = state.navigation.links_for(stop).map_err(alert)?;
                if let Some(native) = links.native {
                    println!("{native}");
                }
                println!("{}", links.web);
            }
        }
        Commands::Queue { which, clear } => {
            let (pending, cleared) = match which {
                QueueArg::Location => {
                    let pending = state.location_queue.pending_count().await.map_err(alert)?;
                    let cleared = if clear {
                        Some(state.location_queue.clear_pending().await.map_err(alert)?)
                    } else {
                        None
                    };
                    (pending, cleared)
                }
                QueueArg::Pod => {
                    let pending = state.pod_queue.pending_count().await.map_err(alert)?;
                    let cleared = if clear {
                        Some(state.pod_queue.clear_pending().await.map_err(alert)?)
                    } else {
                        None
                    };
                    (pending, cleared)
                }
            };
            println!("{pending} pending");
            if let Some(cleared) = cleared {
                println!("{cleared} cleared");
            }
        }
        Commands::PrefGet { key, reconcile } => {
            let value = if reconcile {
                state.preferences.reconcile(&key).await.map_err(alert)?
            } else {
                state.preferences.get(&key).await.map_err(alert)?
            };
            match value {
                Some(value) => println!("{value}"),
                None => println!("(unset)"),
            }
        }
        Commands::PrefSet { key, value } => {
            let value: serde_json::Value =
                serde_json::from_str(&value).context("preference value must be JSON")?;
            state.preferences.set(&key, value).await.map_err(alert)?;
            info!("Preference '{key}' scheduled for sync");
        }
        Commands::Fleet => {
            let vehicles = state.fleet.fetch_vehicles().await.map_err(alert)?;
            let drivers = state.fleet.fetch_drivers().await.map_err(alert)?;
            let partners = state.fleet.fetch_partners().await.map_err(alert)?;
            let orders = state.fleet.fetch_orders().await.map_err(alert)?;
            println!(
                "{} vehicles, {} drivers, {} partners, {} orders",
                vehicles.len(),
                drivers.len(),
                partners.len(),
                orders.len()
            );
        }
    }
    Ok(())
}

/// Converts a core error into the text the app would show in its alert.
fn alert(err: delivery_lib::AppError) -> anyhow::Error {
    anyhow::anyhow!("{} ({err})", err.user_message())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn read_attachment(path: &Path) -> Result<Attachment> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "attachment".to_string());
    let is_png = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("png"))
        .unwrap_or(false);
    Ok(if is_png {
        Attachment::png(file_name, bytes)
    } else {
        Attachment::jpeg(file_name, bytes)
    })
}
