use thiserror::Error;

/// Result type for crate-level operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Fatal setup problems. Nothing is rasterized with a bad configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required configuration: {0}")]
    Missing(&'static str),

    #[error("invalid configuration value for {name}: {value}")]
    Invalid { name: &'static str, value: f64 },

    #[error("unknown unit name: {0}")]
    UnknownUnit(String),

    #[error("geometry has no sensitive faces")]
    NoFaces,

    #[error("wire plane {0} has no plane configuration")]
    MissingPlane(usize),

    #[error("bad wire plane description: {0}")]
    BadPlane(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Problems with one event's input. They abort the event, never the run.
#[derive(Error, Debug)]
pub enum InputError {
    #[error("inconsistent size of {what}: expected {expected}, found {found}")]
    InconsistentSize {
        what: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("deposition {index} is invalid: {reason}")]
    BadDepo { index: usize, reason: &'static str },
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Input(#[from] InputError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[cfg(feature = "im-io")]
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}
