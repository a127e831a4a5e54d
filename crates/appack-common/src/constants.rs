//! Package layout constants and well-known names.

/// Suffix shared by single-file packages and multi-file package directories.
pub const APP_EXTENSION: &str = ".dockerapp";

/// Metadata document inside a multi-file package.
pub const METADATA_FILE_NAME: &str = "metadata.yml";

/// Compose template inside a multi-file package.
pub const COMPOSE_FILE_NAME: &str = "docker-compose.yml";

/// Parameter schema inside a multi-file package.
pub const PARAMETERS_FILE_NAME: &str = "parameters.yml";

/// The three component documents, in single-file order.
pub const COMPONENT_FILE_NAMES: [&str; 3] =
    [METADATA_FILE_NAME, COMPOSE_FILE_NAME, PARAMETERS_FILE_NAME];

/// Document separator line of the single-file encoding.
pub const DOCUMENT_SEPARATOR: &str = "---";

/// Default value seeded for a parameter with no discoverable default.
pub const FILL_ME_PLACEHOLDER: &str = "FILL ME";

/// Conventional environment file read by `init`.
pub const ENV_FILE_NAME: &str = ".env";

/// Version given to freshly initialized packages.
pub const DEFAULT_APP_VERSION: &str = "0.1.0";

/// Compose template used by `init` when no compose file is available.
pub const SKELETON_COMPOSE: &str = "version: \"3.6\"\nservices: {}\n";

