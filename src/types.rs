/// Index of a page inside its storage file, start from 0.
pub type PageNum = i32;

/// Log sequence number stamped on a page by the last logged change.
pub type Lsn = i64;

/// Opaque handle of the storage file a page belongs to.
pub type FileDesc = i32;

/// Page number of a frame that has not been assigned to any page yet.
pub const INVALID_PAGE_NUM: PageNum = -1;

/// File handle of a frame that has not been assigned to any file yet.
pub const INVALID_FILE_DESC: FileDesc = -1;
