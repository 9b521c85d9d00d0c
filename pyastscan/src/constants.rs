/// Maximum recursion depth for the traversal engine to prevent stack
/// overflow on deeply nested code.
pub const MAX_RECURSION_DEPTH: usize = 400;

/// File extensions scanned when none are given on the command line.
pub const DEFAULT_EXTENSIONS: &[&str] = &["py"];

/// Directory names skipped when none are given on the command line.
pub const DEFAULT_SKIP_DIRS: &[&str] = &["tests"];
