use std::fmt;
use thiserror::Error;

/// User-visible name of each request the client makes. Used as the prefix of
/// the error banner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    LoadTags,
    LoadBookmarks,
    CreateTag,
    DeleteTag,
    CreateBookmark,
    UpdateBookmark,
    DeleteBookmark,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Operation::LoadTags => "GET /api/tags",
            Operation::LoadBookmarks => "GET /api/bookmarks",
            Operation::CreateTag => "Create tag",
            Operation::DeleteTag => "Delete tag",
            Operation::CreateBookmark => "Create bookmark",
            Operation::UpdateBookmark => "Update",
            Operation::DeleteBookmark => "Delete",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Error)]
pub enum ClientError {
    /// Rejected before any request was sent.
    #[error("{0}")]
    Validation(String),

    #[error("{operation} failed ({status}){}", body_suffix(.body))]
    Http { operation: Operation, status: u16, body: String },

    #[error("{operation} failed: {source}")]
    Transport {
        operation: Operation,
        #[source]
        source: reqwest::Error,
    },

    #[error("{operation} failed: unexpected response ({source})")]
    Decode {
        operation: Operation,
        #[source]
        source: serde_json::Error,
    },

    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: i64 },

    #[error("config error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ClientError {
    pub fn validation(msg: impl Into<String>) -> Self {
        ClientError::Validation(msg.into())
    }

    /// HTTP status of a failed request, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Http { status, .. } => Some(*status),
            ClientError::Transport { source, .. } => {
                source.status().map(|s| s.as_u16())
            }
            _ => None,
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, ClientError::Validation(_))
    }
}

// The body is shown exactly as the server sent it.
fn body_suffix(body: &str) -> String {
    if body.is_empty() {
        String::new()
    } else {
        format!(": {body}")
    }
}
