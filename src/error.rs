use std::fmt;

use thiserror::Error;

/// Failure of a single sitemap or page. Never fatal to a batch.
#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned http {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("could not gunzip {url}: {source}")]
    Decompress {
        url: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed sitemap xml: {0}")]
    Parse(#[from] quick_xml::Error),

    #[error("malformed sitemap xml: {0}")]
    IllFormed(&'static str),

    #[error("no node for field '{field}' on {url}")]
    SelectorMiss { url: String, field: &'static str },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Transport,
    Decompress,
    Parse,
    SelectorMiss,
}

impl ScrapeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Transport { .. } | Self::Status { .. } => ErrorKind::Transport,
            Self::Decompress { .. } => ErrorKind::Decompress,
            Self::Parse(_) | Self::IllFormed(_) => ErrorKind::Parse,
            Self::SelectorMiss { .. } => ErrorKind::SelectorMiss,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Transport => "transport",
            Self::Decompress => "decompress",
            Self::Parse => "parse",
            Self::SelectorMiss => "selector_miss",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_counts_as_transport() {
        let err = ScrapeError::Status {
            url: "https://example.com/x".into(),
            status: reqwest::StatusCode::NOT_FOUND,
        };
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert_eq!(err.to_string(), "https://example.com/x returned http 404 Not Found");
    }

    #[test]
    fn selector_miss_message_names_field() {
        let err = ScrapeError::SelectorMiss {
            url: "https://example.com/m/1".into(),
            field: "Weather",
        };
        assert_eq!(err.kind(), ErrorKind::SelectorMiss);
        assert!(err.to_string().contains("'Weather'"));
    }
}
