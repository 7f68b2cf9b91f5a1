use std::env;
use std::sync::Arc;
use travelshare::config::Config;
use travelshare::models::Coordinates;
use travelshare::services::backend::HttpRouteBackend;
use travelshare::services::credentials::SessionCredential;
use travelshare::services::google_directions::GoogleDirectionsClient;
use travelshare::services::persistence::RoutePersistenceClient;
use travelshare::services::resolver::RouteResolver;
use travelshare::services::weather::WeatherClient;
use travelshare::{ResolveOutcome, RoutePlanner};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn print_help() {
    eprintln!(
        "\
Usage: travelshare [OPTIONS] LAT,LNG LAT,LNG [LAT,LNG ...]

Plans a driving route through 2 to 10 points, in the given order.

Options:
  --no-optimize         Keep intermediate stops in the given order
  --weather             Show current weather at the start and end points
  --save=NAME           Save the route under NAME (needs TRAVELSHARE_AUTH_TOKEN)
  --description=TEXT    Description stored with --save
  --share               Print a public share link for the saved route
  --help                Show this help message"
    );
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "travelshare=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Parse CLI args
    let args: Vec<String> = env::args().skip(1).collect();

    if args.is_empty() || args.iter().any(|a| a == "--help") {
        print_help();
        return Ok(());
    }

    let show_weather = args.iter().any(|a| a == "--weather");
    let no_optimize = args.iter().any(|a| a == "--no-optimize");
    let share = args.iter().any(|a| a == "--share");
    let save_name = args.iter().find_map(|a| a.strip_prefix("--save="));
    let description = args.iter().find_map(|a| a.strip_prefix("--description="));

    let points = args
        .iter()
        .filter(|a| !a.starts_with("--"))
        .map(|a| a.parse::<Coordinates>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| format!("Invalid point: {}", e))?;

    let config = Config::from_env().map_err(|e| format!("Failed to load configuration: {}", e))?;

    // Initialize services
    let directions = GoogleDirectionsClient::with_config(
        config.google_maps_api_key.clone(),
        config.google_directions_base_url.clone(),
        config.request_timeout(),
    )?;
    let resolver = RouteResolver::new(Arc::new(directions))
        .with_optimize_order(config.optimize_waypoints && !no_optimize)
        .with_timeout(config.request_timeout());
    let planner = RoutePlanner::new(resolver);

    // All or nothing: a list over the cap is rejected rather than truncated
    if let Err(e) = planner.replace_all(points) {
        eprintln!("{}", e.notice().message);
        std::process::exit(1);
    }

    let route = match planner.resolve().await {
        Ok(ResolveOutcome::Applied(route)) => route,
        Ok(ResolveOutcome::Discarded) => return Ok(()),
        Err(e) => {
            eprintln!("{}", e.notice().message);
            std::process::exit(1);
        }
    };

    println!(
        "Route through {} points: {}",
        planner.waypoints().len(),
        route.metrics
    );
    let ordered = route
        .visit_order
        .iter()
        .map(|i| (i + 1).to_string())
        .collect::<Vec<_>>()
        .join(" -> ");
    println!("Visit order: {}", ordered);

    if show_weather {
        match config.openweather_api_key.clone() {
            Some(api_key) => {
                let weather = WeatherClient::with_config(
                    api_key,
                    config.openweather_base_url.clone(),
                    config.request_timeout(),
                )?;
                let coords = planner.coordinates();
                for (label, point) in [("Start", coords.first()), ("End", coords.last())] {
                    let Some(point) = point else { continue };
                    match weather.current_by_coordinates(point).await {
                        Ok(w) => println!(
                            "{} weather: {:.1}°C, {}",
                            label, w.temperature_c, w.conditions
                        ),
                        Err(e) => eprintln!("{} weather: {}", label, e.notice().message),
                    }
                }
            }
            None => eprintln!("OPENWEATHER_API_KEY is not set, skipping weather"),
        }
    }

    if let Some(name) = save_name {
        let credentials = Arc::new(SessionCredential::new(config.auth_token.clone()));
        let backend = HttpRouteBackend::new(
            config.api_base_url.clone(),
            credentials,
            config.request_timeout(),
        )?;
        let persistence = RoutePersistenceClient::new(Arc::new(backend), config.public_base_url);

        let saved = match persistence
            .save(name, description, &planner.coordinates(), planner.metrics())
            .await
        {
            Ok(saved) => saved,
            Err(e) => {
                eprintln!("{}", e.notice().message);
                std::process::exit(1);
            }
        };
        println!("Saved route {} '{}'", saved.id, saved.name);

        if share {
            match persistence.generate_share_link(saved.id).await {
                Ok(link) => println!("Share link: {}", link.url),
                Err(e) => eprintln!("{}", e.notice().message),
            }
        }
    }

    Ok(())
}
