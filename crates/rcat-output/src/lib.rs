pub mod csv_writer;
pub mod json_writer;

pub use csv_writer::write_csv;
pub use json_writer::write_json;
