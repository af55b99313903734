use clap::Parser;
use MissionPlanner::config::PlannerConfig;
use MissionPlanner::engine::geomath::{format_coordinate, format_distance};
use MissionPlanner::engine::mission::MissionState;
use MissionPlanner::engine::models::Coordinate;
use MissionPlanner::engine::route::RouteView;
use MissionPlanner::engine::waypoints::{SurfaceEvent, WaypointStore};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use std::time::Duration;

/// Headless mission planner debugger
#[derive(Parser, Debug)]
#[command(name = "mission_cli")]
struct Args {
    /// Waypoint as LAT,LNG (repeatable, in route order)
    #[arg(short, long = "point", value_parser = parse_point)]
    points: Vec<Coordinate>,

    /// Remove the waypoint at this 1-based order after placing all points (repeatable)
    #[arg(short, long = "remove")]
    removals: Vec<usize>,

    /// Simulate this many mission seconds
    #[arg(long, default_value_t = 0)]
    simulate: u64,

    /// Seed of the metrics simulation
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Print the render model as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct Report<'a> {
    route: &'a RouteView,
    status: String,
    metrics: MissionPlanner::engine::models::Metrics,
}

fn parse_point(s: &str) -> Result<Coordinate, String> {
    let (lat, lng) = s
        .split_once(',')
        .ok_or_else(|| format!("expected LAT,LNG, got '{}'", s))?;
    let lat: f64 = lat.trim().parse().map_err(|e| format!("bad latitude '{}': {}", lat, e))?;
    let lng: f64 = lng.trim().parse().map_err(|e| format!("bad longitude '{}': {}", lng, e))?;
    let coord = Coordinate::new(lat, lng);
    if !coord.is_valid() {
        return Err(format!("coordinate out of range: {},{}", lat, lng));
    }
    Ok(coord)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();
    let config = PlannerConfig::load_or_default();

    let mut store = WaypointStore::new();
    for point in &args.points {
        store.apply(&SurfaceEvent::Clicked { lat: point.lat, lng: point.lng });
    }

    // Resolve every order against the initial sequence so later removals are not shifted
    let targets: Vec<_> = args
        .removals
        .iter()
        .filter_map(|order| order.checked_sub(1).and_then(|i| store.waypoints().get(i)))
        .map(|wp| wp.id.clone())
        .collect();
    for id in targets {
        store.apply(&SurfaceEvent::RemoveRequested(id));
    }

    let mut mission = MissionState::new(config.mission.initial_metrics, config.mission.tick_interval());
    if args.simulate > 0 {
        if mission.start(store.len()) {
            let mut rng = StdRng::seed_from_u64(args.seed);
            for _ in 0..args.simulate {
                mission.tick(Duration::from_secs(1), &mut rng);
            }
        } else {
            eprintln!("Mission not started: no waypoints");
        }
    }

    let route = RouteView::build(store.waypoints());

    if args.json {
        let report = Report {
            route: &route,
            status: mission.status().to_string(),
            metrics: *mission.metrics(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("--- Mission Planner CLI Debugger ---");
    if route.is_empty() {
        println!("No waypoints. Pass --point LAT,LNG to add some.");
    }
    for (view, segment) in route.waypoints.iter().zip(route.segments.iter().map(Some).chain(std::iter::repeat(None))) {
        let title = view.role().list_title(view.order);
        print!(
            "{:>3}  {:<12} {:>12} {:>12}",
            view.order,
            title,
            format_coordinate(view.lat),
            format_coordinate(view.lng)
        );
        if let Some(segment) = segment {
            print!("  next: {:>9}  bearing: {:>7.2}°", segment.distance_label, segment.bearing_deg);
        }
        println!();
    }
    if route.has_path() {
        println!("Total distance: {}", format_distance(route.total_distance_m));
    }

    let metrics = mission.metrics();
    println!("\nMission status: {}", mission.status());
    println!(
        "Battery: {}%  Wind: {:.1} kts  Speed: {:.1} kts  Temp: {}°",
        metrics.battery.round(),
        metrics.wind_speed,
        metrics.speed,
        metrics.temperature.round()
    );
    Ok(())
}
