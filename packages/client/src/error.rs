#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("No Locker host configured (pass one explicitly or set LOCKER_HOST)")]
    MissingHost,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("HTTP {status} {reason} for {url}: {body}")]
    Status {
        status: u16,
        reason: String,
        url: String,
        body: String,
    },

    #[error("Response is missing header {name}")]
    MissingHeader { name: &'static str },

    #[error("Invalid value for header {name}: {value:?}")]
    InvalidHeader { name: &'static str, value: String },

    #[error("Invalid header value: {0}")]
    InvalidHeaderValue(#[from] http::header::InvalidHeaderValue),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// HTTP status code behind this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Status { status, .. } => Some(*status),
            Error::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_exposes_code() {
        let error = Error::Status {
            status: 404,
            reason: "Not Found".to_string(),
            url: "https://locker.example.com/app/missing".to_string(),
            body: "no such file".to_string(),
        };

        assert_eq!(error.status(), Some(404));
        assert!(error.is_not_found());
        assert_eq!(
            error.to_string(),
            "HTTP 404 Not Found for https://locker.example.com/app/missing: no such file"
        );
    }

    #[test]
    fn non_status_errors_have_no_code() {
        assert_eq!(Error::MissingHost.status(), None);
        assert!(!Error::MissingHeader { name: "X-FileSize" }.is_not_found());
    }
}
