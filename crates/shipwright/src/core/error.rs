//! Core error types for the editing pipeline
//!
//! Per-render errors are terminal to one render attempt only; nothing in this
//! module is fatal to the process.

use thiserror::Error;

/// Core error types for diagram editing
#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Markup error: {message}")]
    Markup { message: String },

    #[error("Path data error: {message} in {input:?}")]
    PathData { message: String, input: String },

    #[error("Unknown node: {id}")]
    UnknownNode { id: String },

    #[error("Render error: {message}")]
    Render { message: String },

    #[error("Config error: {message}")]
    Config { message: String },

    #[error("IO error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl EditorError {
    /// Create a new markup error
    pub fn markup_error(message: impl Into<String>) -> Self {
        Self::Markup {
            message: message.into(),
        }
    }

    /// Create a new path data error
    pub fn path_data_error(message: impl Into<String>, input: impl Into<String>) -> Self {
        Self::PathData {
            message: message.into(),
            input: input.into(),
        }
    }

    /// Create a new unknown node error
    pub fn unknown_node(id: impl Into<String>) -> Self {
        Self::UnknownNode { id: id.into() }
    }

    /// Create a new render error
    pub fn render_error(message: impl Into<String>) -> Self {
        Self::Render {
            message: message.into(),
        }
    }

    /// Create a new config error
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

impl From<roxmltree::Error> for EditorError {
    fn from(err: roxmltree::Error) -> Self {
        Self::markup_error(err.to_string())
    }
}

impl From<serde_json::Error> for EditorError {
    fn from(err: serde_json::Error) -> Self {
        Self::config_error(err.to_string())
    }
}

/// Result alias for library operations
pub type EditorResult<T> = std::result::Result<T, EditorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markup_error() {
        let error = EditorError::markup_error("unexpected end of stream");
        let error_msg = format!("{}", error);
        assert!(error_msg.contains("Markup error"));
        assert!(error_msg.contains("unexpected end of stream"));
    }

    #[test]
    fn test_path_data_error() {
        let error = EditorError::path_data_error("bad number", "M 1 x");
        let error_msg = format!("{}", error);
        assert!(error_msg.contains("Path data error"));
        assert!(error_msg.contains("M 1 x"));
    }

    #[test]
    fn test_unknown_node() {
        let error = EditorError::unknown_node("flowchart-A-0");
        assert_eq!(error.to_string(), "Unknown node: flowchart-A-0");
    }

    #[test]
    fn test_render_error() {
        let error = EditorError::render_error("Parse error on line 2");
        assert!(error.to_string().contains("Render error"));
    }

    #[test]
    fn test_config_error_from_json() {
        let json_err = serde_json::from_str::<u32>("nope").unwrap_err();
        let error: EditorError = json_err.into();
        assert!(error.to_string().starts_with("Config error"));
    }

    #[test]
    fn test_io_error_conversion() {
        use std::io;
        let io_err = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let error: EditorError = io_err.into();
        let error_msg = format!("{}", error);
        assert!(error_msg.contains("IO error"));
        assert!(error_msg.contains("File not found"));
    }
}
