mod csv_import;
mod detect;
mod manual;

pub(crate) use csv_import::{CsvImporter, CsvProfile, ImportBatch};
pub(crate) use detect::detect_columns;
pub(crate) use manual::{manual_entry, parse_amount};
