pub mod api {

    pub const BASE_URL: &str = "https://site.ontopo.work/api";

    pub const MARKETPLACE_ID: &str = "15380287";

    pub const LOCALE: &str = "en";

    pub const GEOCODES: &[&str] = &["belgrade"];

    pub const REQUEST_TIMEOUT_SECONDS: u64 = 30;

    pub const USER_AGENT: &str = "OntopoFinder/1.0";
}

pub mod schedule {

    pub const TIMEZONE: &str = "Europe/Belgrade";

    pub const DEFAULT_OPENING_HOUR: u32 = 8;

    /// Booking for today closes at this local hour.
    pub const DEFAULT_CUTOFF_HOUR: u32 = 22;

    pub const LAST_SLOT_HOUR: u32 = 23;
}

pub mod limits {

    pub const DEFAULT_SEARCH_PAGES: u32 = 1;

    pub const MAX_SEARCH_PAGES: u32 = 20;
}
