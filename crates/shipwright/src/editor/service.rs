//! The external rendering service and the text sent to it

use futures::future::LocalBoxFuture;
use thiserror::Error;

use crate::core::Theme;

/// Diagram grammar whose compiler caches layout between identical inputs
const CACHE_BUST_KEYWORD: &str = "erDiagram";

/// Error reported by the rendering service
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ServiceError {
    pub message: String,
}

impl ServiceError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Markup returned by a successful render
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOutput {
    pub markup: String,
}

/// Text-to-SVG compiler consumed by the editor
///
/// Calls may complete in any order. The editor runs on one thread, so the
/// futures are not required to be `Send`.
pub trait RenderService {
    /// Re-initialize with a theme; called before every render
    fn initialize(&self, theme: Theme);

    /// Render `text`; `id` is unique per render request
    fn render<'a>(
        &'a self,
        id: &'a str,
        text: &'a str,
    ) -> LocalBoxFuture<'a, Result<RenderOutput, ServiceError>>;

    /// Check `text` for syntax errors without producing graphics
    fn parse<'a>(&'a self, text: &'a str) -> LocalBoxFuture<'a, Result<(), ServiceError>>;
}

/// Remove one fenced code block wrapper (```` ``` ```` or `~~~`)
///
/// Text that is not entirely one fenced block is returned unchanged.
pub fn strip_fence(text: &str) -> &str {
    let trimmed = text.trim();
    for marker in ["```", "~~~"] {
        if !trimmed.starts_with(marker) {
            continue;
        }
        let Some((_opening, rest)) = trimmed.split_once('\n') else {
            continue;
        };
        let (inner, closing) = match rest.rfind('\n') {
            Some(pos) => (&rest[..pos], &rest[pos + 1..]),
            None => ("", rest),
        };
        let fence_char = marker.chars().next().unwrap_or('`');
        let closing = closing.trim();
        if closing.len() >= marker.len() && closing.chars().all(|c| c == fence_char) {
            return inner.strip_suffix('\r').unwrap_or(inner);
        }
    }
    text
}

/// First line that is not blank and not a `%%` comment
pub fn first_meaningful_line(text: &str) -> Option<&str> {
    text.lines()
        .map(str::trim)
        .find(|line| !line.is_empty() && !line.starts_with("%%"))
}

/// Text to submit for `source`, or `None` when there is nothing to render
pub fn prepare_source(source: &str, render_id: &str) -> Option<String> {
    if source.trim().is_empty() {
        return None;
    }
    let body = strip_fence(source);
    if body.trim().is_empty() {
        return None;
    }

    let needs_bust = first_meaningful_line(body)
        .is_some_and(|line| line.starts_with(CACHE_BUST_KEYWORD));
    if needs_bust {
        let separator = if body.ends_with('\n') { "" } else { "\n" };
        Some(format!("{}{}%% render:{}", body, separator, render_id))
    } else {
        Some(body.to_string())
    }
}

/// First line of an error message, as shown to the user
pub fn first_line(message: &str) -> String {
    message
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or("Unknown render error")
        .to_string()
}

/// Syntax-check `source`; returns the first error line, if any
pub async fn lint<S>(service: &S, source: &str) -> Option<String>
where
    S: RenderService + ?Sized,
{
    let body = strip_fence(source);
    if body.trim().is_empty() {
        return None;
    }
    service
        .parse(body)
        .await
        .err()
        .map(|err| first_line(&err.message))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_fence() {
        assert_eq!(strip_fence("```mermaid\ngraph TD\nA-->B\n```"), "graph TD\nA-->B");
        assert_eq!(strip_fence("  ~~~\nflowchart LR\n~~~~  "), "flowchart LR");
        assert_eq!(strip_fence("```\n```"), "");
        assert_eq!(strip_fence("graph TD\nA-->B"), "graph TD\nA-->B");
        // unterminated fences are left alone
        assert_eq!(strip_fence("```\ngraph TD"), "```\ngraph TD");
    }

    #[test]
    fn test_prepare_source() {
        assert_eq!(prepare_source("   \n", "r1"), None);
        assert_eq!(prepare_source("```\n\n```", "r1"), None);
        assert_eq!(
            prepare_source("graph TD\nA-->B", "r1").as_deref(),
            Some("graph TD\nA-->B")
        );
        assert_eq!(
            prepare_source("```mermaid\n%% comment\nerDiagram\n  A ||--o{ B : has\n```", "r7")
                .as_deref(),
            Some("%% comment\nerDiagram\n  A ||--o{ B : has\n%% render:r7")
        );
    }

    #[test]
    fn test_first_line() {
        assert_eq!(first_line("Parse error on line 2:\n...A-->\n---^"), "Parse error on line 2:");
        assert_eq!(first_line("\n  \n"), "Unknown render error");
    }
}
