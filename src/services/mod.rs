pub mod key_assigner;
pub mod table_extractor;
pub mod table_writer;

pub use key_assigner::{assign_keys, DocumentInput};
pub use table_extractor::{ExtractedTable, TableExtractor};
pub use table_writer::TableWriter;
