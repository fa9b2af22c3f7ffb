use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Regex for document collection names, which are interpolated into SQL as table names
    /// - Valid: "files", "file_records", "_staging2"
    /// - Invalid: "2files", "Files", "file-records", "files;drop", ""
    pub static ref COLLECTION_NAME_REGEX: Regex = Regex::new(r"^[a-z_][a-z0-9_]{0,62}$").unwrap();
}
