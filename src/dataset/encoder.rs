//! Yes/no encoding of the categorical housing columns.

use log::{debug, error, info};

use crate::dataset::table::{Column, Table};
use crate::dataset::BOOLEAN_COLUMNS;
use crate::error::Result;

/// Replace `"yes"` with `"1"` and `"no"` with `"0"` in the boolean columns.
///
/// Returns a new table; the input is left untouched. Any other value in those
/// columns passes through as-is, which makes the encoding idempotent. Columns
/// outside [`BOOLEAN_COLUMNS`] share their storage with the input.
///
/// Fails with `MissingField` when one of the boolean columns is absent.
pub fn encode_boolean_columns(table: &Table) -> Result<Table> {
    info!("encoding yes/no columns as 1/0");
    debug!(
        "initial shape: {} rows x {} columns, columns: {:?}",
        table.n_rows(),
        table.n_columns(),
        table.column_names()
    );

    for name in BOOLEAN_COLUMNS {
        if let Err(e) = table.require_column(name) {
            error!("failed to encode dataset - {e}");
            return Err(e);
        }
    }

    let columns = table
        .columns()
        .iter()
        .map(|column| {
            if BOOLEAN_COLUMNS.contains(&column.name()) {
                Column::new(column.name(), column.values().iter().map(|v| encode(v)).collect())
            } else {
                column.clone()
            }
        })
        .collect();

    let encoded = Table::new(columns)?;
    debug!("encoded {} rows", encoded.n_rows());
    Ok(encoded)
}

fn encode(value: &str) -> String {
    match value {
        "yes" => "1".to_string(),
        "no" => "0".to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipelineError;

    fn sample_table() -> Table {
        Table::from_csv_str(
            "price,area,mainroad,guestroom,basement,hotwaterheating,airconditioning,prefarea\n\
             100000,1000,yes,no,yes,no,yes,no\n\
             200000,2000,no,yes,yes,no,no,yes\n\
             300000,3000,yes,no,no,yes,yes,no\n",
        )
        .unwrap()
    }

    #[test]
    fn test_encodes_boolean_columns() {
        let encoded = encode_boolean_columns(&sample_table()).unwrap();

        assert_eq!(encoded.column("mainroad").unwrap().values(), &["1", "0", "1"]);
        assert_eq!(encoded.column("prefarea").unwrap().values(), &["0", "1", "0"]);
    }

    #[test]
    fn test_does_not_modify_input() {
        let table = sample_table();
        let original = table.clone();

        encode_boolean_columns(&table).unwrap();

        assert_eq!(table, original);
        assert_eq!(table.column("guestroom").unwrap().values(), &["no", "yes", "no"]);
    }

    #[test]
    fn test_preserves_shape_and_order() {
        let table = sample_table();
        let encoded = encode_boolean_columns(&table).unwrap();

        assert_eq!(encoded.n_rows(), table.n_rows());
        assert_eq!(encoded.column_names(), table.column_names());
    }

    #[test]
    fn test_other_columns_share_storage() {
        let table = sample_table();
        let encoded = encode_boolean_columns(&table).unwrap();

        for name in ["price", "area"] {
            assert!(encoded
                .column(name)
                .unwrap()
                .shares_storage_with(table.column(name).unwrap()));
        }
        assert!(!encoded
            .column("mainroad")
            .unwrap()
            .shares_storage_with(table.column("mainroad").unwrap()));
    }

    #[test]
    fn test_padded_values_are_not_matched() {
        let table = Table::from_csv_str(
            "price,mainroad,guestroom,basement,hotwaterheating,airconditioning,prefarea\n\
             1, yes,no ,yes,no,yes,no\n",
        )
        .unwrap();

        let encoded = encode_boolean_columns(&table).unwrap();

        assert_eq!(encoded.column("mainroad").unwrap().values(), &[" yes"]);
        assert_eq!(encoded.column("guestroom").unwrap().values(), &["no "]);
        assert_eq!(encoded.column("basement").unwrap().values(), &["1"]);
    }

    #[test]
    fn test_unexpected_values_pass_through() {
        let table = Table::from_csv_str(
            "price,mainroad,guestroom,basement,hotwaterheating,airconditioning,prefarea\n\
             1,Yes,maybe,,no,yes,1\n",
        )
        .unwrap();

        let encoded = encode_boolean_columns(&table).unwrap();

        assert_eq!(encoded.column("mainroad").unwrap().values(), &["Yes"]);
        assert_eq!(encoded.column("guestroom").unwrap().values(), &["maybe"]);
        assert_eq!(encoded.column("basement").unwrap().values(), &[""]);
        assert_eq!(encoded.column("prefarea").unwrap().values(), &["1"]);
    }

    #[test]
    fn test_encoding_is_idempotent() {
        let once = encode_boolean_columns(&sample_table()).unwrap();
        let twice = encode_boolean_columns(&once).unwrap();

        assert_eq!(once, twice);
    }

    #[test]
    fn test_missing_column_fails() {
        let table = Table::from_csv_str("price,mainroad\n1,yes\n").unwrap();

        let err = encode_boolean_columns(&table).unwrap_err();
        assert!(matches!(err, PipelineError::MissingField(ref f) if f == "guestroom"));
    }
}
