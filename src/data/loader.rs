//! CSV Data Loader Module
//! Reads the sales export with Polars and checks it carries the report columns.

use polars::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Cell values read as missing. Excludes `\N`, the unknown-category
/// sentinel, which aggregation drops instead.
pub const NULL_TOKENS: [&str; 18] = [
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Columns of the export the report uses, minus the category column whose
/// name is configurable.
pub const BASE_COLUMNS: [&str; 7] = [
    "item_id",
    "status",
    "created_at",
    "price",
    "qty_ordered",
    "grand_total",
    "discount_amount",
];

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Input file not found: {0}")]
    InputMissing(PathBuf),
    #[error("Failed to load CSV: {0}")]
    CsvError(#[from] PolarsError),
    #[error("Expected column '{0}' is missing from the input")]
    SchemaMismatch(String),
}

/// Handles CSV file loading with Polars.
pub struct DataLoader {
    required: Vec<String>,
}

impl DataLoader {
    pub fn new(category_column: &str) -> Self {
        let mut required: Vec<String> = BASE_COLUMNS.iter().map(|c| c.to_string()).collect();
        required.insert(6, category_column.to_string());
        Self { required }
    }

    pub fn required_columns(&self) -> &[String] {
        &self.required
    }

    /// Load the export and keep only the report columns.
    pub fn load_csv(&self, file_path: &Path) -> Result<DataFrame, LoaderError> {
        if !file_path.is_file() {
            return Err(LoaderError::InputMissing(file_path.to_path_buf()));
        }

        // Scan every row for the schema so stray text surfaces as a string
        // column instead of being nulled out
        let df = LazyCsvReader::new(file_path)
            .with_has_header(true)
            .with_infer_schema_length(None)
            .with_null_values(Some(NullValues::AllColumns(
                NULL_TOKENS.iter().map(|t| (*t).into()).collect(),
            )))
            .finish()?
            .collect()?;
        info!(
            path = %file_path.display(),
            rows = df.height(),
            columns = df.width(),
            "loaded sales export"
        );

        self.check_schema(&df)?;
        let selected = df.select(self.required_columns().iter().map(|c| c.as_str()))?;
        debug!(columns = ?self.required, "selected report columns");
        Ok(selected)
    }

    fn check_schema(&self, df: &DataFrame) -> Result<(), LoaderError> {
        match self
            .required
            .iter()
            .find(|name| df.get_column_index(name).is_none())
        {
            Some(missing) => Err(LoaderError::SchemaMismatch(missing.clone())),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const HEADER: &str =
        "item_id,status,created_at,sku,price,qty_ordered,grand_total,category_name_1,discount_amount";

    fn write_csv(body: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "{}", body).unwrap();
        file
    }

    #[test]
    fn loads_and_selects_report_columns() {
        let file = write_csv(&format!(
            "{HEADER}\n1,complete,2017-07-01,SKU1,100,2,0,Appliances,10\n\
             2,canceled,2018-07-01,SKU2,50,1,50,Beauty,0"
        ));
        let loader = DataLoader::new("category_name_1");
        let df = loader.load_csv(file.path()).unwrap();

        assert_eq!(df.height(), 2);
        assert_eq!(df.width(), 8);
        assert!(df.get_column_index("sku").is_none());
        assert_eq!(df.get_column_index("category_name_1"), Some(6));
    }

    #[test]
    fn missing_column_is_schema_mismatch() {
        let file = write_csv(
            "item_id,status,created_at,price,qty_ordered,grand_total,discount_amount\n\
             1,complete,2017-07-01,100,2,0,10",
        );
        let loader = DataLoader::new("category_name_1");
        match loader.load_csv(file.path()) {
            Err(LoaderError::SchemaMismatch(column)) => assert_eq!(column, "category_name_1"),
            other => panic!("expected schema mismatch, got {other:?}"),
        }
    }

    #[test]
    fn missing_value_tokens_drop_the_row() {
        use crate::config::ReportConfig;
        use crate::data::DataProcessor;

        let loader = DataLoader::new("category_name_1");
        let config = ReportConfig::default();
        for token in NULL_TOKENS {
            for body in [
                format!("2,complete,2018-07-01,SKU2,{token},1,100,Books,0"),
                format!("2,complete,2018-07-01,SKU2,50,1,100,{token},0"),
                format!("2,complete,2018-07-01,SKU2,50,1,100,Books,{token}"),
            ] {
                let file = write_csv(&format!(
                    "{HEADER}\n1,complete,2018-07-02,SKU1,100,2,0,Books,10\n{body}"
                ));
                let df = loader.load_csv(file.path()).unwrap();
                let (records, stats) = DataProcessor::clean(&df, &config).unwrap();

                assert_eq!(stats.incomplete, 1, "token {token:?} in row {body}");
                assert_eq!(stats.retained, 1, "token {token:?} in row {body}");
                assert_eq!(records[0].grand_total, 190.0);
            }
        }
    }

    #[test]
    fn unknown_category_sentinel_is_not_missing() {
        let file = write_csv(&format!(
            "{HEADER}\n1,complete,2018-07-02,SKU1,100,2,0,\\N,10"
        ));
        let df = DataLoader::new("category_name_1")
            .load_csv(file.path())
            .unwrap();
        let categories = df.column("category_name_1").unwrap().str().unwrap().clone();
        assert_eq!(categories.get(0), Some(r"\N"));
    }

    #[test]
    fn missing_file_is_input_missing() {
        let loader = DataLoader::new("category_name_1");
        let result = loader.load_csv(Path::new("/nonexistent/sales.csv"));
        assert!(matches!(result, Err(LoaderError::InputMissing(_))));
    }

    #[test]
    fn category_column_is_configurable() {
        let loader = DataLoader::new("category");
        assert_eq!(loader.required_columns().len(), 8);
        assert!(loader.required_columns().iter().any(|c| c == "category"));
    }
}
