//! Application constants for the facility merger
//!
//! This module contains the default values, lookup tables and keywords used
//! throughout the pipeline. Anything a user may want to tune is copied into
//! [`crate::config::Config`] at start-up rather than read from here directly.

// =============================================================================
// Encoding Detection
// =============================================================================

/// Number of leading bytes inspected when detecting a file's encoding
pub const DEFAULT_SAMPLE_SIZE: usize = 200_000;

/// Ordered candidate encodings tried when statistical detection is disabled
///
/// Names follow the labels Japanese open-data portals commonly use. The
/// order matters: many files labelled UTF-8 are really Shift-JIS family.
pub const CANDIDATE_ENCODINGS: &[&str] = &["utf-8-sig", "utf-8", "cp932", "shift_jis", "euc_jp"];

/// Encoding used when every candidate fails to decode
pub const FALLBACK_ENCODING: &str = "utf-8";

// =============================================================================
// Target Schema
// =============================================================================

/// Default header patterns per target field (matched after trim + lower-case)
pub mod field_patterns {
    pub const NAME: &[&str] = &["名称", "施設名", "name"];
    pub const ADDRESS: &[&str] = &["住所", "所在地", "address"];
    pub const URL: &[&str] = &["url", "ホームページ"];
    pub const LATITUDE: &[&str] = &["緯度", "latitude", "lat"];
    pub const LONGITUDE: &[&str] = &["経度", "longitude", "lon", "lng"];
    pub const CATEGORY: &[&str] = &["種別", "カテゴリ", "分類", "category"];
}

/// Keyword that skips the current file during interactive mapping
pub const SKIP_FILE_KEYWORD: &str = "skipfile";

/// Separator used when several source columns feed one field
pub const CONCAT_SEPARATOR: &str = " ";

/// Maximum absolute latitude in decimal degrees
pub const MAX_LATITUDE: f64 = 90.0;

/// Maximum absolute longitude in decimal degrees
pub const MAX_LONGITUDE: f64 = 180.0;

// =============================================================================
// Category Colours
// =============================================================================

/// Marker palette, assigned to categories by lexicographic rank
pub const MARKER_PALETTE: &[&str] = &[
    "red",
    "blue",
    "green",
    "purple",
    "orange",
    "darkred",
    "lightred",
    "beige",
    "darkblue",
    "darkgreen",
    "cadetblue",
    "darkpurple",
    "white",
    "pink",
    "lightblue",
    "lightgreen",
    "gray",
    "black",
    "lightgray",
];

/// Smallest palette accepted by configuration validation
pub const MIN_PALETTE_SIZE: usize = 19;

/// Hex values for the marker palette names
pub const MARKER_HEX: &[(&str, &str)] = &[
    ("red", "#d63e2a"),
    ("blue", "#38aadd"),
    ("green", "#72b026"),
    ("purple", "#d252b9"),
    ("orange", "#f69730"),
    ("darkred", "#a23336"),
    ("lightred", "#ff8e7f"),
    ("beige", "#ffcb92"),
    ("darkblue", "#0067a3"),
    ("darkgreen", "#728224"),
    ("cadetblue", "#436978"),
    ("darkpurple", "#5b396b"),
    ("white", "#fbfbfb"),
    ("pink", "#ff91ea"),
    ("lightblue", "#8adaff"),
    ("lightgreen", "#bbf970"),
    ("gray", "#575757"),
    ("black", "#303030"),
    ("lightgray", "#a3a3a3"),
];

/// Colour used for categories missing from the colour table
pub const FALLBACK_COLOR: &str = "gray";

// =============================================================================
// Input and Output
// =============================================================================

/// Default directory scanned for input CSV files
pub const DEFAULT_DATA_DIR: &str = "data";

/// Glob pattern for input files inside the data directory
pub const INPUT_FILE_PATTERN: &str = "*.csv";

/// Default merged CSV output filename
pub const DEFAULT_OUTPUT_FILENAME: &str = "public_facilities_merged.csv";

/// Default map centre (Tokyo Station)
pub const DEFAULT_MAP_CENTER: (f64, f64) = (35.681236, 139.767125);

/// Rows shown in the interactive file preview
pub const DEFAULT_PREVIEW_ROWS: usize = 5;

/// Characters shown per cell in the interactive file preview
pub const PREVIEW_CELL_WIDTH: usize = 80;

/// UTF-8 byte order mark written at the start of the merged CSV
pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Environment variable overriding the data directory
pub const ENV_DATA_DIR: &str = "FACILITY_MERGER_DATA_DIR";

/// Environment variable overriding the merged CSV path
pub const ENV_OUTPUT: &str = "FACILITY_MERGER_OUTPUT";

/// Config directory name under the platform config root
pub const CONFIG_DIR_NAME: &str = "facility-merger";
