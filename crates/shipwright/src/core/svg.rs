//! Owned, mutable SVG element tree
//!
//! The rendering service hands back markup; interaction mutates it (node
//! transforms, connector paths, z-order) and snapshots serialize it again.
//! Elements live in an arena so a handle stays valid when its element is
//! moved within its parent.

use std::fmt::Write as _;

use super::{EditorError, EditorResult};

const XLINK_NS: &str = "http://www.w3.org/1999/xlink";
const XML_NS: &str = "http://www.w3.org/XML/1998/namespace";

/// Handle to an element of an [`SvgDocument`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(usize);

#[derive(Debug, Clone, PartialEq)]
struct Attribute {
    name: String,
    value: String,
}

#[derive(Debug, Clone, PartialEq)]
enum Child {
    Element(ElementId),
    Text(String),
}

#[derive(Debug, Clone)]
struct ElementData {
    name: String,
    namespace: Option<String>,
    attributes: Vec<Attribute>,
    children: Vec<Child>,
    parent: Option<ElementId>,
}

/// A parsed SVG graphic
#[derive(Debug, Clone)]
pub struct SvgDocument {
    elements: Vec<ElementData>,
    root: ElementId,
    uses_xlink: bool,
}

impl SvgDocument {
    /// Parse markup; the root element must be `<svg>`
    pub fn parse(markup: &str) -> EditorResult<Self> {
        let options = roxmltree::ParsingOptions {
            allow_dtd: true,
            ..roxmltree::ParsingOptions::default()
        };
        let source = roxmltree::Document::parse_with_options(markup, options)?;
        let source_root = source.root_element();
        if source_root.tag_name().name() != "svg" {
            return Err(EditorError::markup_error(format!(
                "expected <svg> root, found <{}>",
                source_root.tag_name().name()
            )));
        }

        let mut document = SvgDocument {
            elements: Vec::new(),
            root: ElementId(0),
            uses_xlink: false,
        };
        document.root = document.import(source_root, None);
        Ok(document)
    }

    fn import(&mut self, node: roxmltree::Node<'_, '_>, parent: Option<ElementId>) -> ElementId {
        let id = ElementId(self.elements.len());
        let attributes = node
            .attributes()
            .map(|attr| {
                let name = match attr.namespace() {
                    Some(XLINK_NS) => {
                        self.uses_xlink = true;
                        format!("xlink:{}", attr.name())
                    }
                    Some(XML_NS) => format!("xml:{}", attr.name()),
                    _ => attr.name().to_string(),
                };
                Attribute {
                    name,
                    value: attr.value().to_string(),
                }
            })
            .collect();

        self.elements.push(ElementData {
            name: node.tag_name().name().to_string(),
            namespace: node.tag_name().namespace().map(str::to_string),
            attributes,
            children: Vec::new(),
            parent,
        });

        for child in node.children() {
            if child.is_element() {
                let child_id = self.import(child, Some(id));
                self.elements[id.0].children.push(Child::Element(child_id));
            } else if child.is_text() {
                if let Some(text) = child.text() {
                    self.elements[id.0].children.push(Child::Text(text.to_string()));
                }
            }
        }
        id
    }

    /// The `<svg>` element
    pub fn root(&self) -> ElementId {
        self.root
    }

    /// Local tag name, e.g. `g` or `path`
    pub fn name(&self, id: ElementId) -> &str {
        &self.elements[id.0].name
    }

    pub fn parent(&self, id: ElementId) -> Option<ElementId> {
        self.elements[id.0].parent
    }

    pub fn attr(&self, id: ElementId, name: &str) -> Option<&str> {
        self.elements[id.0]
            .attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    pub fn set_attr(&mut self, id: ElementId, name: &str, value: impl Into<String>) {
        let value = value.into();
        let attributes = &mut self.elements[id.0].attributes;
        match attributes.iter_mut().find(|a| a.name == name) {
            Some(existing) => existing.value = value,
            None => attributes.push(Attribute {
                name: name.to_string(),
                value,
            }),
        }
    }

    /// Whitespace separated tokens of the `class` attribute
    pub fn classes(&self, id: ElementId) -> impl Iterator<Item = &str> {
        self.attr(id, "class").unwrap_or("").split_whitespace()
    }

    pub fn has_class(&self, id: ElementId, class: &str) -> bool {
        self.classes(id).any(|c| c == class)
    }

    pub fn add_class(&mut self, id: ElementId, class: &str) {
        if self.has_class(id, class) {
            return;
        }
        let value = match self.attr(id, "class") {
            Some(existing) if !existing.trim().is_empty() => format!("{} {}", existing.trim(), class),
            _ => class.to_string(),
        };
        self.set_attr(id, "class", value);
    }

    pub fn remove_class(&mut self, id: ElementId, class: &str) {
        if !self.has_class(id, class) {
            return;
        }
        let value = self
            .classes(id)
            .filter(|c| *c != class)
            .collect::<Vec<_>>()
            .join(" ");
        self.set_attr(id, "class", value);
    }

    /// Child elements in document order
    pub fn children(&self, id: ElementId) -> impl Iterator<Item = ElementId> + '_ {
        self.elements[id.0].children.iter().filter_map(|c| match c {
            Child::Element(child) => Some(*child),
            Child::Text(_) => None,
        })
    }

    /// All elements below `id` in document order, `id` itself excluded
    pub fn descendants(&self, id: ElementId) -> Vec<ElementId> {
        let mut out = Vec::new();
        let mut stack: Vec<ElementId> = self.children(id).collect();
        stack.reverse();
        while let Some(next) = stack.pop() {
            out.push(next);
            let mut children: Vec<ElementId> = self.children(next).collect();
            children.reverse();
            stack.extend(children);
        }
        out
    }

    /// Concatenated text of the element and everything below it
    pub fn text_content(&self, id: ElementId) -> String {
        let mut text = String::new();
        self.collect_text(id, &mut text);
        text
    }

    fn collect_text(&self, id: ElementId, out: &mut String) {
        for child in &self.elements[id.0].children {
            match child {
                Child::Text(t) => out.push_str(t),
                Child::Element(e) => self.collect_text(*e, out),
            }
        }
    }

    /// Move an element to the end of its parent, painting it above its siblings
    pub fn raise(&mut self, id: ElementId) {
        let Some(parent) = self.parent(id) else {
            return;
        };
        let children = &mut self.elements[parent.0].children;
        if let Some(pos) = children
            .iter()
            .position(|c| matches!(c, Child::Element(e) if *e == id))
        {
            let child = children.remove(pos);
            children.push(child);
        }
    }

    /// First element (document order) carrying `attr="value"`
    pub fn find_by_attr(&self, attr: &str, value: &str) -> Option<ElementId> {
        std::iter::once(self.root)
            .chain(self.descendants(self.root))
            .find(|id| self.attr(*id, attr) == Some(value))
    }

    /// Serialize back to markup
    pub fn to_markup(&self) -> String {
        let mut out = String::new();
        self.write_element(self.root, None, &mut out);
        out
    }

    fn write_element(&self, id: ElementId, parent_ns: Option<&str>, out: &mut String) {
        let element = &self.elements[id.0];
        let _ = write!(out, "<{}", element.name);

        let ns = element.namespace.as_deref();
        if ns.is_some() && ns != parent_ns {
            let _ = write!(out, " xmlns=\"{}\"", escape(ns.unwrap_or_default(), true));
        }
        if id == self.root
            && self.uses_xlink
            && !element.attributes.iter().any(|a| a.name == "xmlns:xlink")
        {
            let _ = write!(out, " xmlns:xlink=\"{}\"", XLINK_NS);
        }
        for attr in &element.attributes {
            let _ = write!(out, " {}=\"{}\"", attr.name, escape(&attr.value, true));
        }

        if element.children.is_empty() {
            out.push_str("/>");
            return;
        }
        out.push('>');
        for child in &element.children {
            match child {
                Child::Text(text) => out.push_str(&escape(text, false)),
                Child::Element(child_id) => self.write_element(*child_id, ns, out),
            }
        }
        let _ = write!(out, "</{}>", element.name);
    }
}

fn escape(text: &str, attribute: bool) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
