use std::fmt;

use reqwest::StatusCode;
use serde::Serialize;
use tokio::task::JoinError;
use url::ParseError;

use crate::graphql::UserError;

/// A single constraint violation found by the input gate
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

impl FieldViolation {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.field.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.field, self.message)
        }
    }
}

/// What a tool was doing when it failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Fetch,
    Update,
    Create,
    Search,
}

impl Action {
    fn verb(self) -> &'static str {
        match self {
            Action::Fetch => "fetch",
            Action::Update => "update",
            Action::Create => "create",
            Action::Search => "search",
        }
    }
}

/// The "Failed to <action> <subject>" prefix attached to remote failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorContext {
    action: Action,
    subject: &'static str,
}

impl ErrorContext {
    pub const fn fetch(subject: &'static str) -> Self {
        Self {
            action: Action::Fetch,
            subject,
        }
    }

    pub const fn update(subject: &'static str) -> Self {
        Self {
            action: Action::Update,
            subject,
        }
    }

    pub const fn create(subject: &'static str) -> Self {
        Self {
            action: Action::Create,
            subject,
        }
    }

    pub const fn search(subject: &'static str) -> Self {
        Self {
            action: Action::Search,
            subject,
        }
    }

    /// Wrap a transport failure with this context
    pub fn transport(self, source: TransportError) -> ToolError {
        ToolError::Transport {
            context: self,
            source,
        }
    }

    /// Fail if the mutation payload carried any business-rule rejections
    pub fn reject_user_errors(self, user_errors: Vec<UserError>) -> Result<(), ToolError> {
        if user_errors.is_empty() {
            Ok(())
        } else {
            Err(ToolError::RemoteUser {
                context: self,
                user_errors,
            })
        }
    }

    pub fn not_found(self, resource: &'static str, id: impl Into<String>) -> ToolError {
        ToolError::NotFound {
            context: self,
            resource,
            id: id.into(),
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Failed to {} {}", self.action.verb(), self.subject)
    }
}

/// The kind of a [`ToolError`], for callers that branch on failure class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolErrorKind {
    InvalidInput,
    Uninitialized,
    NotFound,
    RemoteUser,
    Transport,
}

/// The single failure channel every tool reports through
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("Invalid input for {tool}: {}", join(violations))]
    InvalidInput {
        tool: &'static str,
        violations: Vec<FieldViolation>,
    },

    #[error("Tool {tool} is not initialized: no Shopify client has been bound to it")]
    Uninitialized { tool: &'static str },

    #[error("{context}: {resource} with ID {id} not found")]
    NotFound {
        context: ErrorContext,
        resource: &'static str,
        id: String,
    },

    #[error("{context}: {}", join(user_errors))]
    RemoteUser {
        context: ErrorContext,
        user_errors: Vec<UserError>,
    },

    #[error("{context}: {source}")]
    Transport {
        context: ErrorContext,
        #[source]
        source: TransportError,
    },
}

impl ToolError {
    pub fn kind(&self) -> ToolErrorKind {
        match self {
            ToolError::InvalidInput { .. } => ToolErrorKind::InvalidInput,
            ToolError::Uninitialized { .. } => ToolErrorKind::Uninitialized,
            ToolError::NotFound { .. } => ToolErrorKind::NotFound,
            ToolError::RemoteUser { .. } => ToolErrorKind::RemoteUser,
            ToolError::Transport { .. } => ToolErrorKind::Transport,
        }
    }
}

fn join<T: fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// A failure of the remote-call capability itself
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("{0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("{}", .0.join(", "))]
    GraphQL(Vec<String>),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("response contained no data")]
    MissingData,
}

/// An error in server initialization
#[derive(Debug)]
pub enum ServerError {
    MissingCredential(&'static str),
    HttpClient(reqwest::Error),
    UrlParseError(ParseError),
    ReadFile(std::io::Error),
    StartupError(JoinError),
    McpInitializeError(Box<rmcp::service::ServerInitializeError>),
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerError::MissingCredential(name) => write!(f, "{} is required.", name),
            ServerError::HttpClient(e) => write!(f, "Failed to build HTTP client: {}", e),
            ServerError::UrlParseError(e) => write!(f, "Invalid Shopify endpoint: {}", e),
            ServerError::ReadFile(e) => write!(f, "Could not open file: {}", e),
            ServerError::StartupError(e) => write!(f, "Failed to start server: {}", e),
            ServerError::McpInitializeError(e) => {
                write!(f, "Failed to initialize MCP server: {}", e)
            }
        }
    }
}

impl std::error::Error for ServerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ServerError::HttpClient(e) => Some(e),
            ServerError::UrlParseError(e) => Some(e),
            ServerError::ReadFile(e) => Some(e),
            ServerError::StartupError(e) => Some(e),
            ServerError::McpInitializeError(e) => Some(e.as_ref()),
            ServerError::MissingCredential(_) => None,
        }
    }
}

impl From<ParseError> for ServerError {
    fn from(e: ParseError) -> Self {
        ServerError::UrlParseError(e)
    }
}

impl From<std::io::Error> for ServerError {
    fn from(e: std::io::Error) -> Self {
        ServerError::ReadFile(e)
    }
}

impl From<JoinError> for ServerError {
    fn from(e: JoinError) -> Self {
        ServerError::StartupError(e)
    }
}

impl From<Box<rmcp::service::ServerInitializeError>> for ServerError {
    fn from(e: Box<rmcp::service::ServerInitializeError>) -> Self {
        ServerError::McpInitializeError(e)
    }
}

/// An MCP tool error
pub type McpError = rmcp::model::ErrorData;

#[cfg(test)]
mod tests {
    use super::*;

    fn user_error(field: Option<&str>, message: &str) -> UserError {
        UserError {
            field: field.map(str::to_string),
            message: message.to_string(),
        }
    }

    #[test]
    fn remote_user_errors_list_every_field_and_message() {
        let error = ErrorContext::update("collection")
            .reject_user_errors(vec![
                user_error(Some("title"), "too long"),
                user_error(Some("handle"), "has already been taken"),
                user_error(None, "Collection is locked"),
            ])
            .unwrap_err();

        assert_eq!(error.kind(), ToolErrorKind::RemoteUser);
        assert_eq!(
            error.to_string(),
            "Failed to update collection: title: too long, handle: has already been taken, Collection is locked"
        );
    }

    #[test]
    fn empty_user_errors_pass() {
        assert!(
            ErrorContext::update("page")
                .reject_user_errors(vec![])
                .is_ok()
        );
    }

    #[test]
    fn transport_errors_keep_the_original_message() {
        let error = ErrorContext::fetch("orders").transport(TransportError::GraphQL(vec![
            "Throttled".to_string(),
            "Access denied for orders field".to_string(),
        ]));

        assert_eq!(error.kind(), ToolErrorKind::Transport);
        assert_eq!(
            error.to_string(),
            "Failed to fetch orders: Throttled, Access denied for orders field"
        );
    }

    #[test]
    fn invalid_input_reports_every_violation() {
        let error = ToolError::InvalidInput {
            tool: "get-customer-orders",
            violations: vec![
                FieldViolation::new("customerId", "\"abc\" does not match \"^\\\\d+$\""),
                FieldViolation::new("limit", "0 is less than the minimum of 1"),
            ],
        };

        insta::assert_snapshot!(error, @r#"Invalid input for get-customer-orders: customerId: "abc" does not match "^\\d+$", limit: 0 is less than the minimum of 1"#);
    }

    #[test]
    fn not_found_names_the_resource() {
        let error =
            ErrorContext::fetch("article").not_found("Article", "gid://shopify/Article/1");

        assert_eq!(error.kind(), ToolErrorKind::NotFound);
        assert_eq!(
            error.to_string(),
            "Failed to fetch article: Article with ID gid://shopify/Article/1 not found"
        );
    }

    #[test]
    fn search_context_reads_naturally() {
        assert_eq!(
            ErrorContext::search("Shopify").to_string(),
            "Failed to search Shopify"
        );
    }
}
