pub mod discovery;
pub mod raw;
pub mod workbook;

pub use discovery::{discover_files, DEFAULT_EXTENSIONS};
pub use raw::{RawRecord, RawValue};
pub use workbook::{read_workbook, read_workbooks, ReadBatch, SkippedFile, WorkbookRead};
