pub mod spreadsheet;

pub use spreadsheet::{SpreadsheetExporter, placeholder_endpoint};
