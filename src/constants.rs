use std::time::Duration;

/// Inactivity window before a search-text change triggers a provider re-fetch.
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(350);

/// Valid page sizes for the order list.
pub const PAGE_SIZE_CHOICES: [u32; 4] = [6, 12, 24, 48];

pub const DEFAULT_PAGE_SIZE: u32 = 12;

pub const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(5);
pub const CLIENT_TIMEOUT: Duration = Duration::from_secs(30);
