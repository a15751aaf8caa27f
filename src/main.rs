//! Command-line front end for the planner's external services.
//!
//! Calls one capability and prints the canonical result as JSON. With no API
//! key for the provider, prints mock data instead of calling out.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde::Serialize;

use planner_services::config::{load_config, ClientConfig};
use planner_services::observability::{logging, metrics};
use planner_services::{ForecastResult, GeoPoint, RouteProvider, RouteResult, ServiceClient, ServiceError};

#[derive(Parser)]
#[command(name = "planner-services")]
#[command(about = "Query the planner's routing and weather providers", long_about = None)]
struct Cli {
    /// TOML configuration file (built-in defaults when omitted).
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Driving route between two points
    Route {
        /// Origin as "lat,lng"
        #[arg(long, allow_hyphen_values = true)]
        from: GeoPoint,
        /// Destination as "lat,lng"
        #[arg(long, allow_hyphen_values = true)]
        to: GeoPoint,
        /// Provider: directions or routing
        #[arg(long, default_value = "directions")]
        provider: RouteProvider,
        /// Directions provider key
        #[arg(long, env = "DIRECTIONS_API_KEY", hide_env_values = true)]
        directions_key: Option<String>,
        /// Routing provider key
        #[arg(long, env = "ROUTING_API_KEY", hide_env_values = true)]
        routing_key: Option<String>,
    },
    /// Current forecast at a point
    Forecast {
        /// Location as "lat,lng"
        #[arg(long, allow_hyphen_values = true)]
        at: GeoPoint,
        /// Weather provider key
        #[arg(long, env = "WEATHER_API_KEY", hide_env_values = true)]
        api_key: Option<String>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => match load_config(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error: {}", e);
                return ExitCode::FAILURE;
            }
        },
        None => ClientConfig::default(),
    };

    if let Err(e) = logging::init_logging(&config.observability) {
        eprintln!("Error: failed to initialise logging: {}", e);
        return ExitCode::FAILURE;
    }

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let client = ServiceClient::new(config);

    match cli.command {
        Commands::Route {
            from,
            to,
            provider,
            directions_key,
            routing_key,
        } => {
            let key = match provider {
                RouteProvider::Directions => directions_key,
                RouteProvider::Routing => routing_key,
            };
            match key {
                Some(key) => print_json(client.route_with(provider, from, to, &key).await),
                None => {
                    tracing::warn!(provider = %provider, "No API key configured, using mock route");
                    print_json(Ok(mock_route(from, to)))
                }
            }
        }
        Commands::Forecast { at, api_key } => match api_key {
            Some(key) => print_json(client.get_forecast(at, &key).await),
            None => {
                tracing::warn!("No API key configured, using mock forecast");
                print_json(Ok(mock_forecast()))
            }
        },
    }
}

fn print_json<T: Serialize>(result: Result<T, ServiceError>) -> ExitCode {
    match result {
        Ok(value) => match serde_json::to_string_pretty(&value) {
            Ok(json) => {
                println!("{}", json);
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("Error: failed to encode result: {}", e);
                ExitCode::FAILURE
            }
        },
        Err(ServiceError::Api(e)) => {
            eprintln!(
                "Error: {} (status: {}, retryable: {})",
                e,
                e.status.map(|s| s.to_string()).unwrap_or_else(|| "-".to_string()),
                e.retryable
            );
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Straight line between the points at an assumed 60 km/h.
fn mock_route(from: GeoPoint, to: GeoPoint) -> RouteResult {
    let meters = haversine_meters(from, to);
    RouteResult::from_meters_seconds(meters, meters / 1000.0 * 60.0, vec![[from.lng, from.lat], [to.lng, to.lat]])
}

fn mock_forecast() -> ForecastResult {
    ForecastResult {
        temperature: 20,
        rain_chance: 10,
        wind_speed: 12,
        description: "clear sky".to_string(),
    }
}

fn haversine_meters(a: GeoPoint, b: GeoPoint) -> f64 {
    const EARTH_RADIUS_M: f64 = 6_371_000.0;
    let (lat1, lat2) = (a.lat.to_radians(), b.lat.to_radians());
    let dlat = lat2 - lat1;
    let dlng = (b.lng - a.lng).to_radians();
    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * h.sqrt().asin()
}
