/// Bucket holding every uploaded object; fixed for the whole system
pub const OBJECT_CONTAINER_NAME: &str = "files";

/// Nominal uploader recorded on every file; there is no identity system
pub const DEFAULT_UPLOADER: &str = "demo-user";

/// Content type used when the upload part does not declare one
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Title shown on the upload page
pub const PAGE_TITLE: &str = "Cloud File Management System";
