use std::process::ExitCode;

use chrono::{TimeZone, Utc};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use pnr_router::demo;
use pnr_router::domain::{Vehicle, format_hhmm, seconds_of_day};
use pnr_router::graph::Graph;
use pnr_router::planner::{Router, SearchConfig, TripRequest, TwoWayPath};
use pnr_router::precompute::{PrecomputeConfig, build_annotations};
use pnr_router::spt::GraphPath;

fn print_trip(graph: &Graph, title: &str, path: &GraphPath) {
    println!("  {title} (weight {:.0})", path.weight());
    for leg in path.legs() {
        println!(
            "    {} -> {}  {:?} by {:?}, {} to {}",
            format_hhmm(seconds_of_day(leg.start_time) as u32),
            format_hhmm(seconds_of_day(leg.end_time) as u32),
            leg.phase,
            leg.mode,
            graph.vertex(leg.from).label,
            graph.vertex(leg.to).label,
        );
    }
}

fn print_itineraries(graph: &Graph, paths: &[TwoWayPath]) {
    for (i, path) in paths.iter().enumerate() {
        println!(
            "Itinerary {} via {} (total weight {:.0})",
            i + 1,
            graph.vertex(path.parking).label,
            path.weight()
        );
        print_trip(graph, "outbound", &path.outbound);
        if let Some(inbound) = &path.inbound {
            print_trip(graph, "return", inbound);
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => match SearchConfig::from_json_file(&path) {
            Ok(config) => config,
            Err(e) => {
                error!("{e}");
                return ExitCode::FAILURE;
            }
        },
        None => SearchConfig::default(),
    };

    let vehicle = match std::env::args().nth(2).as_deref().map(Vehicle::parse) {
        Some(Ok(vehicle)) => vehicle,
        Some(Err(e)) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
        None => Vehicle::Car,
    };

    let net = match vehicle {
        Vehicle::Car => demo::grid_with_line(),
        Vehicle::Bicycle => demo::grid_with_bike_park(),
    };
    let (annotations, summary) = build_annotations(&net.graph, &config, &PrecomputeConfig::default());
    info!(
        annotated = annotations.len(),
        parking = summary.car_parking.vertices,
        %vehicle,
        "demo network ready"
    );
    let router = Router::new(&net.graph, &annotations, &config);

    let Some(morning) = Utc.with_ymd_and_hms(2024, 3, 15, 9, 0, 0).single() else {
        return ExitCode::FAILURE;
    };
    let evening = morning + chrono::Duration::hours(8);
    let requests = [
        (
            "One way from A at 09:00, driving the last stretch",
            TripRequest::one_way(net.a, net.b, morning).vehicle(vehicle),
        ),
        (
            "Round trip, at work by 09:00 and leaving at 17:00",
            TripRequest::two_way(net.b, net.a, morning, Some(evening)).vehicle(vehicle),
        ),
    ];

    let mut status = ExitCode::SUCCESS;
    for (title, request) in &requests {
        println!("{title}");
        match router.search(request).and_then(|tree| tree.paths()) {
            Ok(paths) => print_itineraries(&net.graph, &paths),
            Err(e) => {
                error!(%e, "search failed");
                status = ExitCode::FAILURE;
            }
        }
        println!();
    }
    status
}
