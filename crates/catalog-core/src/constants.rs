//! Fixed catalog constants shared by the cache, transformer and synchronizer.

/// Supported language codes, in the order locale fields are derived and joined.
pub const LANGUAGES: [&str; 6] = ["en", "ja", "de", "fr", "cn", "kr"];

/// The language whose name field gates whether a record is indexed at all.
pub const PRIMARY_LANGUAGE: &str = "en";

/// Default bulk batch size threshold.
pub const MAX_BULK_DOCUMENTS: usize = 250;

/// Content types that are synchronized, in processing order. Each maps 1:1 to
/// a lowercase index name.
pub const CONTENT_TYPES: [&str; 21] = [
    "Achievement",
    "Action",
    "Balloon",
    "BNpcName",
    "Companion",
    "CraftAction",
    "ENpcResident",
    "Emote",
    "Fate",
    "InstanceContent",
    "Item",
    "Leve",
    "Mount",
    "Orchestrion",
    "PlaceName",
    "Quest",
    "Recipe",
    "Status",
    "Title",
    "Trait",
    "Weather",
];

/// Refresh interval value that disables near-real-time visibility.
pub const REFRESH_DISABLED: &str = "-1";

/// Default interactive refresh interval restored after a bulk load.
pub const DEFAULT_REFRESH_INTERVAL: &str = "1s";

/// Default lifetime of the persisted indexed-id set (three years).
pub const DEFAULT_CACHE_TTL_SECS: u64 = 60 * 60 * 24 * 365 * 3;
