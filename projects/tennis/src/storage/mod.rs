pub mod json_file;
pub mod stats_csv;
