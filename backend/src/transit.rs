use rand::{seq::SliceRandom, Rng};
use shared::StepKind;

/// Placeholder hop length between two stops, in miles.
pub const HOP_DISTANCE_MILES: f64 = 0.4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransitKind {
    Walking,
    Subway,
    Bike,
    Car,
}

/// User-facing transit labels and the kind each one travels as.
pub const TRANSIT_LABELS: &[(&str, TransitKind)] = &[
    ("walk", TransitKind::Walking),
    ("subway", TransitKind::Subway),
    ("Uber", TransitKind::Car),
    ("Citibike", TransitKind::Bike),
    ("ferry", TransitKind::Subway),
];

/// Average speed per kind, in miles per hour.
pub const TRANSIT_SPEEDS: &[(TransitKind, f64)] = &[
    (TransitKind::Walking, 3.0),
    (TransitKind::Subway, 20.0),
    (TransitKind::Bike, 10.0),
    (TransitKind::Car, 25.0),
];

/// User-facing transit labels and the Google Maps `travelmode` token for each.
pub const NAVIGATION_MODES: &[(&str, &str)] = &[
    ("walk", "walking"),
    ("Uber", "driving"),
    ("Citibike", "bicycling"),
    ("subway", "transit"),
    ("ferry", "transit"),
];

pub const DEFAULT_NAVIGATION_MODE: &str = "walking";

impl TransitKind {
    pub fn from_label(label: &str) -> Option<Self> {
        TRANSIT_LABELS
            .iter()
            .find(|(known, _)| *known == label)
            .map(|(_, kind)| *kind)
    }

    pub fn speed_mph(self) -> f64 {
        TRANSIT_SPEEDS
            .iter()
            .find(|(kind, _)| *kind == self)
            .map(|(_, speed)| *speed)
            .unwrap_or(3.0)
    }

    /// Whole minutes needed to cover one placeholder hop, rounded up.
    pub fn travel_minutes(self) -> u32 {
        (HOP_DISTANCE_MILES / self.speed_mph() * 60.0).ceil() as u32
    }
}

impl From<TransitKind> for StepKind {
    fn from(kind: TransitKind) -> Self {
        match kind {
            TransitKind::Walking => StepKind::Walking,
            TransitKind::Subway => StepKind::Subway,
            TransitKind::Bike => StepKind::Bike,
            TransitKind::Car => StepKind::Car,
        }
    }
}

/// Kinds of every recognised label, in label order. Repeats are kept.
pub fn matched_kinds(labels: &[String]) -> Vec<TransitKind> {
    labels
        .iter()
        .filter_map(|label| TransitKind::from_label(label))
        .collect()
}

/// Uniform draw among the kinds the labels map to; walking when none match.
pub fn pick_kind<R: Rng + ?Sized>(labels: &[String], rng: &mut R) -> TransitKind {
    matched_kinds(labels)
        .choose(rng)
        .copied()
        .unwrap_or(TransitKind::Walking)
}

pub fn navigation_mode(label: Option<&str>) -> &'static str {
    let label = label.unwrap_or("walk");
    NAVIGATION_MODES
        .iter()
        .find(|(known, _)| *known == label)
        .map(|(_, mode)| *mode)
        .unwrap_or(DEFAULT_NAVIGATION_MODE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn labels(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn label_table_matches_known_labels() {
        assert_eq!(TransitKind::from_label("walk"), Some(TransitKind::Walking));
        assert_eq!(TransitKind::from_label("Uber"), Some(TransitKind::Car));
        assert_eq!(TransitKind::from_label("Citibike"), Some(TransitKind::Bike));
        assert_eq!(TransitKind::from_label("ferry"), Some(TransitKind::Subway));
        assert_eq!(TransitKind::from_label("uber"), None);
        assert_eq!(TransitKind::from_label("rocket"), None);
    }

    #[test]
    fn travel_minutes_per_kind() {
        assert_eq!(TransitKind::Walking.travel_minutes(), 8);
        assert_eq!(TransitKind::Subway.travel_minutes(), 2);
        assert_eq!(TransitKind::Bike.travel_minutes(), 3);
        assert_eq!(TransitKind::Car.travel_minutes(), 1);
    }

    #[test]
    fn empty_or_unknown_preferences_fall_back_to_walking() {
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(pick_kind(&[], &mut rng), TransitKind::Walking);
        assert_eq!(pick_kind(&labels(&["jetpack"]), &mut rng), TransitKind::Walking);
    }

    #[test]
    fn single_preference_is_deterministic() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..20 {
            assert_eq!(pick_kind(&labels(&["Citibike"]), &mut rng), TransitKind::Bike);
        }
    }

    #[test]
    fn draw_stays_within_matched_set() {
        let prefs = labels(&["subway", "Uber", "unknown"]);
        let allowed = matched_kinds(&prefs);
        assert_eq!(allowed, vec![TransitKind::Subway, TransitKind::Car]);

        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..100 {
            assert!(allowed.contains(&pick_kind(&prefs, &mut rng)));
        }
    }

    #[test]
    fn navigation_mode_lookup() {
        assert_eq!(navigation_mode(Some("Uber")), "driving");
        assert_eq!(navigation_mode(Some("Citibike")), "bicycling");
        assert_eq!(navigation_mode(Some("ferry")), "transit");
        assert_eq!(navigation_mode(Some("hovercraft")), "walking");
        assert_eq!(navigation_mode(None), "walking");
    }
}
