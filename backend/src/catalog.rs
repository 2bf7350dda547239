use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointOfInterest {
    pub name: &'static str,
    pub description: &'static str,
    pub duration_minutes: u32,
    pub category: &'static str,
}

const fn poi(
    name: &'static str,
    description: &'static str,
    duration_minutes: u32,
    category: &'static str,
) -> PointOfInterest {
    PointOfInterest {
        name,
        description,
        duration_minutes,
        category,
    }
}

pub const CATEGORIES: [&str; 6] = ["coffee", "food", "bookstores", "parks", "art", "hidden gems"];

/// Reference stops, grouped by category. Order matters: the builder is first-fit.
pub const CATALOG: &[PointOfInterest] = &[
    poi("Devoción Coffee", "coffee shop", 20, "coffee"),
    poi("Birch Coffee", "local roastery", 25, "coffee"),
    poi("Blue Bottle Bryant Park", "minimalist café", 20, "coffee"),
    poi("Sunday in Brooklyn", "restaurant", 40, "food"),
    poi("Los Tacos No.1", "Mexican street food", 30, "food"),
    poi("Prince Street Pizza", "famous slice spot", 25, "food"),
    poi("McNally Jackson Books", "bookstore", 25, "bookstores"),
    poi("Books Are Magic", "indie bookstore", 20, "bookstores"),
    poi("Strand Bookstore", "18 miles of books", 30, "bookstores"),
    poi("Domino Park", "riverfront park", 30, "parks"),
    poi("Washington Square Park", "famous arch & culture", 25, "parks"),
    poi("Bryant Park", "midtown oasis", 20, "parks"),
    poi("Museum of Street Art", "graffiti museum", 30, "art"),
    poi("MoMA PS1", "contemporary art hub", 45, "art"),
    poi("Poster House", "graphic design museum", 35, "art"),
    poi("Mmuseumm", "tiny museum of oddities", 20, "hidden gems"),
    poi("The Earth Room", "gallery filled with soil", 15, "hidden gems"),
    poi("Dream House", "light + drone installation", 30, "hidden gems"),
];

/// Catalog entries whose category is one of `interests`, in catalog order.
pub fn matching(interests: &BTreeSet<String>) -> Vec<&'static PointOfInterest> {
    CATALOG
        .iter()
        .filter(|poi| interests.contains(poi.category))
        .collect()
}
