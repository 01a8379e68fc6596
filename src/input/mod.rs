pub mod line_parser;
pub mod log_reader;

pub use line_parser::LineParser;
pub use log_reader::LogReader;
