use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Well-known locations
// ---------------------------------------------------------------------------

/// File name of the per-request status record inside its request directory.
pub const STATUS_FILE: &str = "status";

/// Default agent configuration file, resolved against the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "emissary.yaml";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

/// Directory owned by one dispatched request.
pub fn request_dir(spool_root: &Path, request_id: &str) -> PathBuf {
    spool_root.join(request_id)
}

/// Location of the status record for `request_id`, derived deterministically
/// so any component knowing the identifier can find it.
pub fn status_path(spool_root: &Path, request_id: &str) -> PathBuf {
    request_dir(spool_root, request_id).join(STATUS_FILE)
}
