//! Errors raised by the HTTP exchanges the page scripts make.

/// Why a request to the server did not produce the expected answer.
#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum RequestError {
    /// The server understood the request and answered `success: false`.
    ///
    /// `message` carries the server's explanation when it sent one.
    #[error("the server rejected the request{}", rejection_suffix(.message))]
    Rejected { message: Option<String> },

    /// The server answered with a non-success HTTP status and no usable
    /// JSON body.
    #[error("the server responded with status {0}")]
    Status(u16),

    /// The body could not be read as the expected JSON document.
    #[error("could not decode the server response: {0}")]
    Decode(String),

    /// The request never completed (offline, CORS, aborted...).
    #[error("network request failed: {0}")]
    Network(String),
}

fn rejection_suffix(message: &Option<String>) -> String {
    match message {
        Some(message) => format!(": {message}"),
        None => String::new(),
    }
}

impl RequestError {
    /// True for failures of the exchange itself rather than a refusal by
    /// the application.
    pub fn is_transport(&self) -> bool {
        !matches!(self, RequestError::Rejected { .. })
    }

    /// A short reason suitable for showing to the user.
    pub fn reason(&self) -> String {
        match self {
            RequestError::Rejected { message } => message.clone().unwrap_or_default(),
            RequestError::Status(code) => format!("the server responded with status {code}"),
            RequestError::Decode(_) => "the server sent an unexpected response".to_string(),
            RequestError::Network(_) => "the server could not be reached".to_string(),
        }
    }
}

impl From<gloo_net::Error> for RequestError {
    fn from(err: gloo_net::Error) -> Self {
        match err {
            gloo_net::Error::SerdeError(err) => RequestError::Decode(err.to_string()),
            other => RequestError::Network(other.to_string()),
        }
    }
}
