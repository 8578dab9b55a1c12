//! Constants shared across the crate

/// File name of the indexer executable inside the install path
pub const INDEXER_BINARY_NAME: &str = "indexer";

/// Hint appended to startup failures
pub const CONFIG_HINT: &str =
	"Check that fusion.json exists in the working directory or pass --config <PATH>";
