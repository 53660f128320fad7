use crate::infra::{build_catalog, build_geocoder};
use clap::Args;
use parkmap::catalog::ListingId;
use parkmap::config::AppConfig;
use parkmap::detail::DetailController;
use parkmap::error::AppError;
use parkmap::geo::Coordinate;
use parkmap::map::{GeolocationError, MapEvent, MapMachine, MapPhase, MapSession};
use parkmap::nearby::{valid_radius, NearbySearch};
use parkmap::telemetry;
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct NearbyArgs {
    /// Latitude of the reference point (requires --lng)
    #[arg(long, requires = "lng", conflicts_with = "place", value_parser = parse_latitude)]
    pub(crate) lat: Option<f64>,
    /// Longitude of the reference point (requires --lat)
    #[arg(long, requires = "lat", value_parser = parse_longitude)]
    pub(crate) lng: Option<f64>,
    /// Free-text place to geocode and use as the reference point
    #[arg(long)]
    pub(crate) place: Option<String>,
    /// Search radius in kilometers (defaults to NEARBY_RADIUS_KM)
    #[arg(long, value_parser = parse_radius)]
    pub(crate) radius_km: Option<f64>,
    /// Listing id to highlight and open in the detail panel
    #[arg(long)]
    pub(crate) select: Option<String>,
}

fn parse_degrees(raw: &str, limit: f64, name: &str) -> Result<f64, String> {
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| format!("{name} must be a number, got '{raw}'"))?;
    if (-limit..=limit).contains(&value) {
        Ok(value)
    } else {
        Err(format!("{name} must be within [-{limit}, {limit}]"))
    }
}

fn parse_latitude(raw: &str) -> Result<f64, String> {
    parse_degrees(raw, 90.0, "latitude")
}

fn parse_longitude(raw: &str) -> Result<f64, String> {
    parse_degrees(raw, 180.0, "longitude")
}

fn parse_radius(raw: &str) -> Result<f64, String> {
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| format!("radius must be a number, got '{raw}'"))?;
    if valid_radius(value) {
        Ok(value)
    } else {
        Err("radius must be a finite, non-negative number of kilometers".to_string())
    }
}

pub(crate) async fn run_nearby(args: NearbyArgs) -> Result<(), AppError> {
    let NearbyArgs {
        lat,
        lng,
        place,
        radius_km,
        select,
    } = args;

    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let catalog = build_catalog(&config)?;
    let geocoder = Arc::new(build_geocoder(&config)?);
    let mut settings = config.nearby;
    if let Some(radius_km) = radius_km {
        settings.radius_km = radius_km;
    }
    let nearby = NearbySearch::new(Arc::clone(&catalog), settings);
    let mut session = MapSession::new(config.map.default_center, nearby, geocoder);

    match (place, lat.zip(lng)) {
        (Some(place), _) => {
            session.search_place(&place).await;
        }
        (None, Some((latitude, longitude))) => {
            let here = Coordinate {
                latitude,
                longitude,
            };
            session.dispatch(MapEvent::GeolocationResolved(here));
        }
        (None, None) => {
            session.dispatch(MapEvent::GeolocationUnavailable(
                GeolocationError::Unsupported,
            ));
        }
    }
    session.settle().await;

    render_map(session.machine(), settings.radius_km);

    if *session.machine().phase() == MapPhase::Idle {
        return Ok(());
    }

    if let Some(id) = select {
        let id = ListingId(id);
        session.dispatch(MapEvent::MarkerClicked(id.clone()));
        if session.machine().highlighted_id() != Some(&id) {
            println!("\n'{id}' is not among the nearby listings");
            return Ok(());
        }
        session.dispatch(MapEvent::ViewDetails);

        let mut panel = DetailController::new(catalog);
        panel.load(id).await;
        render_detail(&panel);
    }

    Ok(())
}

fn render_map(machine: &MapMachine, radius_km: f64) {
    let view = machine.view();

    if let Some(notice) = &view.notice {
        println!("Notice: {notice}");
    }

    let Some(reference) = &view.reference else {
        println!("No reference location; nothing to search around.");
        return;
    };

    println!(
        "Reference: {:.5}, {:.5} ({}) | zoom {}",
        reference.coordinate.latitude,
        reference.coordinate.longitude,
        reference.address.as_deref().unwrap_or("address pending"),
        view.zoom
    );

    let markers = machine.markers();
    println!("{} listing(s) within {radius_km} km:", markers.len());
    for listing in markers {
        let distance = listing
            .coordinate()
            .map(|coordinate| reference.coordinate.distance_km(&coordinate))
            .unwrap_or_default();
        let address = listing
            .location
            .as_ref()
            .map(|location| location.address.as_str())
            .unwrap_or("");
        println!(
            "  - [{}] {} | {:.1} km | {}",
            listing.id, listing.name, distance, address
        );
    }
}

fn render_detail<C>(panel: &DetailController<C>)
where
    C: parkmap::catalog::ContentClient + 'static,
{
    if let Some(message) = panel.error_message() {
        println!("\nDetail unavailable: {message}");
        return;
    }
    let Some(listing) = panel.listing() else {
        return;
    };

    println!("\n{}", listing.name);
    if let Some(description) = &listing.description {
        println!("{description}");
    }
    if let Some(category) = &listing.category_tag {
        println!("Category: {category}");
    }
    if listing.pickup == Some(true) {
        println!("Featured pick");
    }
    if let Some(content) = panel.rendered_content().filter(|html| !html.is_empty()) {
        println!("{content}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degree_parsers_enforce_ranges() {
        assert_eq!(parse_latitude(" 35.5 "), Ok(35.5));
        assert!(parse_latitude("-90.5").is_err());
        assert_eq!(parse_longitude("-180"), Ok(-180.0));
        assert!(parse_longitude("east").is_err());
    }

    #[test]
    fn radius_parser_rejects_negative_and_nan() {
        assert_eq!(parse_radius("25"), Ok(25.0));
        assert_eq!(parse_radius("0"), Ok(0.0));
        assert!(parse_radius("-5").is_err());
        assert!(parse_radius("NaN").is_err());
        assert!(parse_radius("inf").is_err());
    }
}
