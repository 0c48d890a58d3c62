use actix_web::ResponseError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("could not parse config file {path}: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },
    #[error("invalid endpoint {endpoint:?}: {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },
    #[error("invalid container selector {0:?}")]
    InvalidSelector(String),
    #[error("invalid value {value:?} for {var}")]
    InvalidValue { var: &'static str, value: String },
}

/// Why a single record was left out of a collection.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecordError {
    #[error("record is not an object")]
    NotAnObject,
    #[error("record has neither a username nor a message")]
    MissingFields,
}

/// The response body as a whole could not be used.
#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("payload is not valid JSON: {0}")]
    NotJson(#[from] serde_json::Error),
    #[error("payload is a JSON {0}, expected an array or an object")]
    NotACollection(&'static str),
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {reason}")]
    Transport { url: String, reason: String },
    #[error("{url} answered with status {status}")]
    Status { url: String, status: u16 },
    #[error("could not read body from {url}: {reason}")]
    Body { url: String, reason: String },
    #[error("malformed payload from {url}: {source}")]
    Malformed { url: String, source: PayloadError },
}

#[derive(Debug, Error)]
#[error("template rendering failed: {0}")]
pub struct RenderError(#[from] pub tera::Error);

impl ResponseError for RenderError {}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("page load already {0}, it runs once")]
pub struct LifecycleError(pub &'static str);
