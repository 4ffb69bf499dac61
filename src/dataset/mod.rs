//! Housing dataset handling: parsing, yes/no encoding and train/test split.

pub mod encoder;
pub mod split;
pub mod table;

pub use encoder::encode_boolean_columns;
pub use split::{SplitConfig, SplitResult, split};
pub use table::{Column, Table, TableSummary};

/// The yes/no columns used as model features, in feature order.
pub const BOOLEAN_COLUMNS: [&str; 6] = [
    "mainroad",
    "guestroom",
    "basement",
    "hotwaterheating",
    "airconditioning",
    "prefarea",
];

/// The label column.
pub const TARGET_COLUMN: &str = "price";
