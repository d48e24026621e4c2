use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum PreflightError {
    #[error("failed to load config from {path}")]
    ConfigLoad {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config from {path}: {message}")]
    ConfigParse { path: String, message: String },

    #[error("failed to write config to {path}")]
    ConfigWrite {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("validation error: {message}")]
    Validation { message: String },

    #[error("no password provided")]
    #[diagnostic(help(
        "pass it as an argument or export PROXMOX_PASSWORD='your-password'"
    ))]
    MissingPassword,

    #[error("password prompt cancelled")]
    PromptCancelled,

    #[error("failed to open log file {path}")]
    LogFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to build HTTP client: {message}")]
    HttpClient { message: String },
}

/// Failures at the API boundary. Checks turn these into failing results;
/// they never reach the process level.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("cannot connect to {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{what} timed out after {secs}s")]
    Timeout { what: String, secs: u64 },

    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned status code {status}")]
    Status { url: String, status: u16 },

    #[error("malformed response from {url}: {message}")]
    Decode { url: String, message: String },

    #[error("authentication rejected for {user}")]
    AuthRejected { user: String },

    #[error("invalid API URL: {message}")]
    Url { message: String },
}
