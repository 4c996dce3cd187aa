/// Trades requested per page when a market does not override it
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Pause between two successful page requests, in seconds
pub const DEFAULT_SLEEP_TIME_SEC: u64 = 10;

/// Pause after the source blocks us, in seconds
pub const DEFAULT_SLEEP_TIME_AFTER_BLOCK: u64 = 300;

/// Pause between two catch-up passes, in seconds
pub const DEFAULT_POLL_INTERVAL_SEC: u64 = 3_600;

/// Buda public markets endpoint
pub const DEFAULT_BUDA_BASE_URL: &str = "https://www.buda.com/api/v2/markets/";

/// Markets recovered out of the box, as (local id, remote id)
pub const DEFAULT_MARKETS: [(&str, &str); 4] = [
    ("btc", "btc-clp"),
    ("eth", "eth-clp"),
    ("ltc", "ltc-clp"),
    ("bch", "bch-clp"),
];

/// Consecutive blocked retries logged at warn level before throttling
pub const BLOCKED_WARN_BURST: u32 = 3;

/// Once throttled, every n-th blocked retry is still logged at warn level
pub const BLOCKED_WARN_EVERY: u32 = 10;
