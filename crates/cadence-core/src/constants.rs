/// Route component constants shared across crates
pub const API_ROUTE_COMPONENT: &str = "api";
pub const API_ROUTE_PREFIX: &str = const_str::concat!("/", API_ROUTE_COMPONENT);

pub const BOOKINGS_ROUTE_COMPONENT: &str = "bookings";
pub const BOOKINGS_ROUTE_PREFIX: &str =
    const_str::concat!(API_ROUTE_PREFIX, "/", BOOKINGS_ROUTE_COMPONENT);

pub const RECURRING_ROUTE_COMPONENT: &str = "recurring";
pub const RECURRING_ROUTE_PREFIX: &str =
    const_str::concat!(BOOKINGS_ROUTE_PREFIX, "/", RECURRING_ROUTE_COMPONENT);

pub const SERIES_ROUTE_COMPONENT: &str = "series";
pub const SERIES_ROUTE_PREFIX: &str =
    const_str::concat!(BOOKINGS_ROUTE_PREFIX, "/", SERIES_ROUTE_COMPONENT);

/// Upper bound on generated occurrences when a request does not override it.
pub const DEFAULT_SAFETY_CAP: usize = 500;
