pub mod delimited;
pub mod spreadsheet;
