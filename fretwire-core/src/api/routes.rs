use std::fmt::Display;

macro_rules! v1_path {
    ($path:literal) => {
        concat!("/api/v1", $path)
    };
}

/// Versioned API route definitions shared with the backend pipeline
pub mod v1 {
    pub const ROOT: &str = "/api/v1";
    pub const VERSION: &str = "v1";

    pub mod segments {
        pub const ITEM: &str = v1_path!("/segments/{id}");
        pub const STATUS: &str = v1_path!("/segments/{id}/status");
        pub const REDO: &str = v1_path!("/segments/{id}/redo");
        pub const RESTART: &str =
            v1_path!("/segments/{id}/restart-entire-processing");
        pub const ABORT: &str = v1_path!("/segments/{id}/abort");
        pub const REVIEW: &str = v1_path!("/segments/{id}/review");
        pub const SEARCH: &str = v1_path!("/segments/search");
    }

    pub mod catalog {
        pub const COURSES: &str = v1_path!("/catalog/courses");
        pub const DOWNLOAD_ALL: &str =
            v1_path!("/catalog/download-all-courses");
        pub const BULK_STATUS: &str =
            v1_path!("/catalog/bulk-download-status");
        pub const BULK_STATS: &str = v1_path!("/catalog/bulk-download-stats");
    }
}

/// Substitute the `{id}` placeholder in a route template.
pub fn with_id(route: &str, id: impl Display) -> String {
    route.replace("{id}", &id.to_string())
}
