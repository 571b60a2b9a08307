//! Shared constants for the ppd workspace.
//!
//! Configuration keys, units, icons and device classes used by the
//! schemas and the code emitter. Single source of truth, imported by all
//! crates.

// ─── Configuration Keys ─────────────────────────────────────────────

/// Component identifier key.
pub const CONF_ID: &str = "id";
/// Platform selector key inside a component domain block.
pub const CONF_PLATFORM: &str = "platform";
/// Serial bus reference key.
pub const CONF_UART_ID: &str = "uart_id";
/// PM2.5 channel key.
pub const CONF_PM_2_5: &str = "pm_2_5";
/// PM10.0 channel key.
pub const CONF_PM_10_0: &str = "pm_10_0";
/// Update interval key.
pub const CONF_UPDATE_INTERVAL: &str = "update_interval";
/// Setup priority override key.
pub const CONF_SETUP_PRIORITY: &str = "setup_priority";

// ─── Units & Icons ──────────────────────────────────────────────────

/// Micrograms per cubic meter.
pub const UNIT_MICROGRAMS_PER_CUBIC_METER: &str = "µg/m³";

/// Icon used for particulate channels.
pub const ICON_CHEMICAL_WEAPON: &str = "mdi:chemical-weapon";

// ─── Device Classes ─────────────────────────────────────────────────

/// Particulate matter below 2.5 µm.
pub const DEVICE_CLASS_PM25: &str = "pm25";
/// Particulate matter below 10 µm.
pub const DEVICE_CLASS_PM10: &str = "pm10";

/// Device classes accepted by the measurement sensor schema.
pub const KNOWN_DEVICE_CLASSES: &[&str] = &[
    "aqi",
    "atmospheric_pressure",
    "carbon_dioxide",
    "carbon_monoxide",
    "current",
    "distance",
    "duration",
    "energy",
    "frequency",
    "humidity",
    "illuminance",
    "nitrogen_dioxide",
    "ozone",
    "pm1",
    "pm10",
    "pm25",
    "power",
    "pressure",
    "signal_strength",
    "temperature",
    "voltage",
    "volatile_organic_compounds",
];

// ─── Serial Defaults ────────────────────────────────────────────────

/// Default UART receive buffer size in bytes.
pub const DEFAULT_RX_BUFFER_SIZE: u32 = 256;

/// Default UART data bits.
pub const DEFAULT_DATA_BITS: u8 = 8;

/// Default UART stop bits.
pub const DEFAULT_STOP_BITS: u8 = 1;

// ─── Identifiers ────────────────────────────────────────────────────

/// Maximum length of a firmware node name.
pub const MAX_NODE_NAME_LEN: usize = 31;

/// Words that cannot be used as component identifiers.
pub const RESERVED_IDS: &[&str] = &[
    "App", "alignas", "alignof", "and", "auto", "bool", "break", "case", "catch", "char", "class",
    "const", "constexpr", "continue", "default", "delete", "do", "double", "else", "enum",
    "explicit", "extern", "false", "float", "for", "friend", "goto", "if", "inline", "int",
    "long", "loop", "mutable", "namespace", "new", "noexcept", "not", "nullptr", "operator",
    "or", "private", "protected", "public", "register", "return", "setup", "short", "signed",
    "sizeof", "static", "struct", "switch", "template", "this", "throw", "true", "try",
    "typedef", "typename", "union", "unsigned", "using", "virtual", "void", "volatile", "while",
];
