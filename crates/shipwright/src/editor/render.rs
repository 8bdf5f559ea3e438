//! Text-to-graphic render cycle with last-request-wins supersession
//!
//! The controller never awaits anything itself. [`RenderLifecycle::begin`]
//! hands out a ticket, the caller runs the service, and
//! [`RenderLifecycle::complete`] decides whether the result still matters.
//! A newer `begin`, a `clear` or a snapshot `restore` retires every ticket
//! issued before it.

use serde::Serialize;
use tracing::{debug, info, warn};

use super::service::{first_line, prepare_source, RenderOutput, ServiceError};
use crate::core::{SvgDocument, Theme};

/// Source of unique ids for render requests
pub trait IdGenerator {
    fn next_id(&mut self) -> String;
}

/// `<prefix>-<n>` ids counting up from zero
#[derive(Debug, Clone)]
pub struct SequentialIds {
    prefix: String,
    next: u64,
}

impl SequentialIds {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 0,
        }
    }
}

impl Default for SequentialIds {
    fn default() -> Self {
        Self::new("shipwright")
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&mut self) -> String {
        let id = format!("{}-{}", self.prefix, self.next);
        self.next += 1;
        id
    }
}

/// One in-flight render request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderTicket {
    /// Generation this ticket was issued in; only the latest one applies
    pub id: u64,
    /// Id passed to the rendering service
    pub render_id: String,
    /// Prepared text (fence stripped, cache-busted)
    pub text: String,
    pub theme: Theme,
}

/// What the caller should do after [`RenderLifecycle::begin`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum RenderRequest {
    /// Source is empty: remove the graphic
    Clear,
    /// Call the service with this ticket
    Render(RenderTicket),
}

/// Result of handing a service response back
#[derive(Debug, Clone)]
pub enum RenderOutcome {
    /// New graphic, `overflow: visible` already forced
    Applied(SvgDocument),
    /// First line of the error; the previous graphic stays
    Failed(String),
    /// A newer request was issued meanwhile; result dropped
    Superseded,
}

/// Owns the render cycle state for one editor
pub struct RenderLifecycle {
    ids: Box<dyn IdGenerator>,
    generation: u64,
    in_flight: Option<u64>,
    theme: Theme,
    last_error: Option<String>,
}

impl std::fmt::Debug for RenderLifecycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderLifecycle")
            .field("generation", &self.generation)
            .field("in_flight", &self.in_flight)
            .field("theme", &self.theme)
            .field("last_error", &self.last_error)
            .finish()
    }
}

impl Default for RenderLifecycle {
    fn default() -> Self {
        Self::new(Box::new(SequentialIds::default()))
    }
}

impl RenderLifecycle {
    pub fn new(ids: Box<dyn IdGenerator>) -> Self {
        Self {
            ids,
            generation: 0,
            in_flight: None,
            theme: Theme::default(),
            last_error: None,
        }
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
    }

    pub fn is_rendering(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Message of the most recent failed render, cleared by a success
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Start a render for `source`, retiring any request in flight
    pub fn begin(&mut self, source: &str) -> RenderRequest {
        self.generation += 1;
        if self.in_flight.take().is_some() {
            debug!(generation = self.generation, "Superseding in-flight render");
        }

        let render_id = self.ids.next_id();
        let Some(text) = prepare_source(source, &render_id) else {
            info!("Empty source, clearing graphic");
            self.last_error = None;
            return RenderRequest::Clear;
        };

        self.in_flight = Some(self.generation);
        info!(generation = self.generation, render_id = %render_id, "Render started");
        RenderRequest::Render(RenderTicket {
            id: self.generation,
            render_id,
            text,
            theme: self.theme,
        })
    }

    /// Accept the service response for ticket `id`
    pub fn complete(
        &mut self,
        id: u64,
        result: Result<RenderOutput, ServiceError>,
    ) -> RenderOutcome {
        if self.in_flight != Some(id) {
            debug!(ticket = id, current = self.generation, "Dropping superseded render");
            return RenderOutcome::Superseded;
        }
        self.in_flight = None;

        let parsed = result
            .map_err(|err| err.message)
            .and_then(|output| SvgDocument::parse(&output.markup).map_err(|err| err.to_string()));
        match parsed {
            Ok(mut document) => {
                force_overflow_visible(&mut document);
                self.last_error = None;
                info!(ticket = id, "Render applied");
                RenderOutcome::Applied(document)
            }
            Err(message) => {
                let message = first_line(&message);
                warn!(ticket = id, error = %message, "Render failed");
                self.last_error = Some(message.clone());
                RenderOutcome::Failed(message)
            }
        }
    }

    /// Install captured markup directly, bypassing the service
    ///
    /// Any render in flight is retired. Unreadable markup is logged and
    /// ignored.
    pub fn restore(&mut self, markup: &str) -> Option<SvgDocument> {
        self.generation += 1;
        self.in_flight = None;
        match SvgDocument::parse(markup) {
            Ok(document) => {
                debug!(generation = self.generation, "Snapshot restored");
                Some(document)
            }
            Err(err) => {
                warn!(error = %err, "Snapshot restore failed");
                None
            }
        }
    }
}

/// Set `overflow: visible` on the root element, replacing any other value
pub fn force_overflow_visible(document: &mut SvgDocument) {
    let root = document.root();
    let mut declarations: Vec<String> = document
        .attr(root, "style")
        .unwrap_or("")
        .split(';')
        .map(str::trim)
        .filter(|decl| !decl.is_empty())
        .filter(|decl| {
            decl.split(':')
                .next()
                .is_some_and(|property| !property.trim().eq_ignore_ascii_case("overflow"))
        })
        .map(str::to_string)
        .collect();
    declarations.push("overflow: visible".to_string());
    document.set_attr(root, "style", format!("{};", declarations.join("; ")));
}
