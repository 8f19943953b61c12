//! Housing dataset schema.
//!
//! The input format is fixed: CSV files with five numeric feature columns
//! and a numeric `Price` target, matched by header name. Unknown columns
//! (the source dataset carries an `Address` column) are ignored.

/// Number of feature columns.
pub const FEATURE_COUNT: usize = 5;

/// Feature column headers, in model weight order.
pub const FEATURE_COLUMNS: [&str; FEATURE_COUNT] = [
    "Avg. Area Income",
    "Avg. Area House Age",
    "Avg. Area Number of Rooms",
    "Avg. Area Number of Bedrooms",
    "Area Population",
];

/// Target column header.
pub const TARGET_COLUMN: &str = "Price";

/// File extension for ingestable data files.
pub const DATA_EXTENSION: &str = "csv";

/// Returns all required column headers (features + target).
pub fn required_columns() -> impl Iterator<Item = &'static str> {
    FEATURE_COLUMNS.iter().copied().chain(std::iter::once(TARGET_COLUMN))
}
