use chrono::{Duration, NaiveTime};
use rand::Rng;
use shared::{Itinerary, ItineraryStep, StepKind, TripRequest};

use crate::{
    catalog::{self, PointOfInterest},
    transit::{self, TransitKind},
};

const START_HOUR: u32 = 12;
const NAVIGATION_BASE_URL: &str = "https://www.google.com/maps/dir/";
const NAVIGATION_ORIGIN: &str = "Current+Location";

/// Build an ordered tour that fits the request's time budget.
///
/// # Algorithm: first-fit packing
///
/// Catalog stops matching the requested interests are visited in catalog
/// order. Each visit costs a travel hop (transit kind drawn from `rng`
/// among the user's preferences) plus the stop's stay time. The first
/// visit that would overflow the budget ends the tour; later stops are
/// dropped, never deferred.
///
/// The sequence is bookended by a zero-length start marker and, when an
/// end location was given, a zero-length end marker. Timestamps count
/// from 12:00 PM.
pub fn generate_itinerary<R: Rng + ?Sized>(req: &TripRequest, rng: &mut R) -> Vec<ItineraryStep> {
    let budget = req.duration.minutes();
    let candidates = catalog::matching(&req.interests);
    let mut builder = StepBuilder::default();

    let start_description = if req.start.is_empty() {
        "Starting location".to_string()
    } else {
        req.start.clone()
    };
    builder.push(
        StepKind::Poi,
        format!("Start at {}", place_label(&req.start)),
        start_description,
        0,
    );

    for poi in candidates {
        let kind = transit::pick_kind(&req.transit, rng);
        let travel = kind.travel_minutes();

        if builder.elapsed + travel + poi.duration_minutes > budget {
            tracing::debug!(
                "stopping before {}: {} + {} + {} min exceeds {} min budget",
                poi.name,
                builder.elapsed,
                travel,
                poi.duration_minutes,
                budget
            );
            break;
        }

        builder.push_travel(kind, travel);
        builder.push_stay(poi);
    }

    if !req.end.is_empty() {
        builder.push(
            StepKind::Poi,
            format!("End at {}", place_label(&req.end)),
            "Final destination".to_string(),
            0,
        );
    }

    builder.steps
}

/// Timestamp of the last step, or an empty string for an empty itinerary.
pub fn end_time(steps: &[ItineraryStep]) -> String {
    steps
        .last()
        .map(|step| step.timestamp.clone())
        .unwrap_or_default()
}

/// Google Maps directions link visiting every stop in order.
pub fn navigation_url(steps: &[ItineraryStep], mode_label: Option<&str>) -> String {
    let stops: Vec<String> = std::iter::once(NAVIGATION_ORIGIN.to_string())
        .chain(
            steps
                .iter()
                .filter(|step| step.kind == StepKind::Poi)
                .map(|step| urlencoding::encode(&step.name).into_owned()),
        )
        .collect();

    format!(
        "{NAVIGATION_BASE_URL}{}?travelmode={}",
        stops.join("/"),
        transit::navigation_mode(mode_label)
    )
}

pub fn plan<R: Rng + ?Sized>(req: &TripRequest, rng: &mut R) -> Itinerary {
    let steps = generate_itinerary(req, rng);
    let end_time = end_time(&steps);
    let navigation_url = navigation_url(&steps, req.transit.first().map(String::as_str));

    Itinerary {
        steps,
        end_time,
        navigation_url,
    }
}

/// Render minutes past the 12:00 start as `H:MM AM/PM`.
pub fn clock_label(elapsed_minutes: u32) -> String {
    let start = NaiveTime::from_hms_opt(START_HOUR, 0, 0).unwrap_or_default();
    (start + Duration::minutes(i64::from(elapsed_minutes)))
        .format("%-I:%M %p")
        .to_string()
}

fn place_label(place: &str) -> &str {
    place.split(',').next().unwrap_or_default()
}

#[derive(Default)]
struct StepBuilder {
    steps: Vec<ItineraryStep>,
    elapsed: u32,
}

impl StepBuilder {
    /// Append a step stamped with the current clock, then advance it.
    fn push(&mut self, kind: StepKind, name: String, description: String, minutes: u32) {
        self.steps.push(ItineraryStep {
            id: (self.steps.len() + 1).to_string(),
            kind,
            name,
            description,
            duration_minutes: minutes,
            timestamp: clock_label(self.elapsed),
        });
        self.elapsed += minutes;
    }

    fn push_travel(&mut self, kind: TransitKind, minutes: u32) {
        self.push(
            kind.into(),
            "Travel to next location".to_string(),
            format!("{} miles", transit::HOP_DISTANCE_MILES),
            minutes,
        );
    }

    fn push_stay(&mut self, poi: &PointOfInterest) {
        self.push(
            StepKind::Poi,
            poi.name.to_string(),
            poi.description.to_string(),
            poi.duration_minutes,
        );
    }
}
