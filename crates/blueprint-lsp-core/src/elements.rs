//! Typed API Elements (refract) parse trees.
//!
//! The parser emits a generic `{element, meta, attributes, content}` tree.
//! Only the element kinds the outline and diagnostics need get their own
//! variant; everything else is kept as [`Element::Other`] so its children
//! are still walked.
//!
//! Both refract serializations drafter has produced are accepted: the
//! compact one (`"classes": ["warning"]`, `"code": 6`) and the fully
//! wrapped one where every value is itself an element
//! (`{"element": "number", "content": 6}`).

use crate::position::{SourceMap, SourceSpan};
use crate::types::DiagnosticCode;
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ElementsReadError {
    #[error("invalid JSON: {0}")]
    InvalidJson(String),

    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("invalid type: {0}")]
    InvalidType(String),
}

type Result<T> = std::result::Result<T, ElementsReadError>;

/// A title or other string value together with where it came from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Located {
    pub content: String,
    pub source_map: Option<SourceMap>,
}

/// A `category` element: the API itself, or a resource group within it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Category {
    pub title: Option<Located>,
    pub classes: Vec<String>,
    pub children: Vec<Element>,
}

/// A `resource` element.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Resource {
    pub title: Option<Located>,
    pub href: Option<String>,
    pub children: Vec<Element>,
}

/// An `annotation` element: a parser warning or error.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Annotation {
    pub classes: Vec<String>,
    pub code: Option<DiagnosticCode>,
    pub message: String,
    pub source_map: Option<SourceMap>,
}

/// Any element the analysis does not interpret.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Other {
    pub tag: String,
    pub children: Vec<Element>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Element {
    Category(Category),
    Resource(Resource),
    Annotation(Annotation),
    Other(Other),
}

impl Element {
    /// The refract element name.
    pub fn tag(&self) -> &str {
        match self {
            Element::Category(_) => "category",
            Element::Resource(_) => "resource",
            Element::Annotation(_) => "annotation",
            Element::Other(other) => &other.tag,
        }
    }

    pub fn children(&self) -> &[Element] {
        match self {
            Element::Category(category) => &category.children,
            Element::Resource(resource) => &resource.children,
            Element::Annotation(_) => &[],
            Element::Other(other) => &other.children,
        }
    }
}

/// The root of a parse: the top-level elements of a `parseResult`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParseResult {
    pub content: Vec<Element>,
}

impl ParseResult {
    pub fn new(content: Vec<Element>) -> Self {
        Self { content }
    }

    /// Read a parse result from API Elements JSON text.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let value: Value =
            serde_json::from_str(json).map_err(|e| ElementsReadError::InvalidJson(e.to_string()))?;
        Self::from_value(&value)
    }

    /// Read a parse result from an API Elements JSON value.
    ///
    /// A bare element that is not a `parseResult` is treated as the only
    /// top-level element.
    pub fn from_value(value: &Value) -> Result<Self> {
        let obj = value.as_object().ok_or_else(|| {
            ElementsReadError::InvalidType("expected object for parse result".to_string())
        })?;
        let tag = read_tag(obj)?;

        if tag == "parseResult" {
            let content = match obj.get("content") {
                Some(content) => read_elements(content)?,
                None => Vec::new(),
            };
            Ok(Self { content })
        } else {
            Ok(Self {
                content: vec![read_element(value)?],
            })
        }
    }

    /// The first top-level category, which describes the API.
    pub fn api(&self) -> Option<&Category> {
        self.content.iter().find_map(|element| match element {
            Element::Category(category) => Some(category),
            _ => None,
        })
    }

    /// Every annotation in the tree, depth first, in document order.
    pub fn annotations(&self) -> Vec<&Annotation> {
        let mut annotations = Vec::new();
        collect_annotations(&self.content, &mut annotations);
        annotations
    }
}

impl Category {
    /// Categories nested under this one (resource groups), in document order.
    ///
    /// The search stops at each category it finds.
    pub fn groups(&self) -> Vec<&Category> {
        let mut groups = Vec::new();
        collect_categories(&self.children, &mut groups);
        groups
    }

    /// Resources nested under this category, in document order.
    pub fn resources(&self) -> Vec<&Resource> {
        let mut resources = Vec::new();
        collect_resources(&self.children, &mut resources);
        resources
    }
}

fn collect_annotations<'a>(elements: &'a [Element], out: &mut Vec<&'a Annotation>) {
    for element in elements {
        match element {
            Element::Annotation(annotation) => out.push(annotation),
            Element::Category(_) | Element::Resource(_) | Element::Other(_) => {
                collect_annotations(element.children(), out)
            }
        }
    }
}

fn collect_categories<'a>(elements: &'a [Element], out: &mut Vec<&'a Category>) {
    for element in elements {
        match element {
            Element::Category(category) => out.push(category),
            Element::Resource(_) | Element::Annotation(_) => {}
            Element::Other(other) => collect_categories(&other.children, out),
        }
    }
}

fn collect_resources<'a>(elements: &'a [Element], out: &mut Vec<&'a Resource>) {
    for element in elements {
        match element {
            Element::Resource(resource) => out.push(resource),
            Element::Annotation(_) => {}
            Element::Category(_) | Element::Other(_) => collect_resources(element.children(), out),
        }
    }
}

// ============================================================================
// JSON reading
// ============================================================================

fn read_tag(obj: &Map<String, Value>) -> Result<&str> {
    obj.get("element")
        .and_then(Value::as_str)
        .ok_or(ElementsReadError::MissingField("element"))
}

fn read_elements(value: &Value) -> Result<Vec<Element>> {
    match value {
        Value::Array(items) => items
            .iter()
            .filter(|item| is_element(item))
            .map(read_element)
            .collect(),
        _ => Ok(Vec::new()),
    }
}

fn read_element(value: &Value) -> Result<Element> {
    let obj = value.as_object().ok_or_else(|| {
        ElementsReadError::InvalidType("expected object for element".to_string())
    })?;
    let tag = read_tag(obj)?;
    let meta = obj.get("meta").and_then(Value::as_object);
    let attributes = obj.get("attributes").and_then(Value::as_object);
    let content = obj.get("content");

    let children = || match content {
        Some(content) => read_elements(content),
        None => Ok(Vec::new()),
    };

    match tag {
        "category" => Ok(Element::Category(Category {
            title: meta.and_then(|m| m.get("title")).and_then(read_located),
            classes: meta.and_then(|m| m.get("classes")).map(read_strings).unwrap_or_default(),
            children: children()?,
        })),
        "resource" => Ok(Element::Resource(Resource {
            title: meta.and_then(|m| m.get("title")).and_then(read_located),
            href: attributes.and_then(|a| a.get("href")).and_then(read_string),
            children: children()?,
        })),
        "annotation" => Ok(Element::Annotation(Annotation {
            classes: meta.and_then(|m| m.get("classes")).map(read_strings).unwrap_or_default(),
            code: attributes.and_then(|a| a.get("code")).and_then(read_code),
            message: content.and_then(read_string).unwrap_or_default(),
            source_map: attributes.and_then(|a| a.get("sourceMap")).and_then(read_source_map),
        })),
        _ => Ok(Element::Other(Other {
            tag: tag.to_string(),
            children: children()?,
        })),
    }
}

fn is_element(value: &Value) -> bool {
    value.get("element").is_some_and(Value::is_string)
}

static NULL: Value = Value::Null;

/// Strip refract value wrappers: `{"element": "string", "content": "x"}` is `"x"`.
fn unwrap_value(value: &Value) -> &Value {
    match value {
        Value::Object(obj) if obj.contains_key("element") => {
            obj.get("content").map_or(&NULL, unwrap_value)
        }
        _ => value,
    }
}

fn read_string(value: &Value) -> Option<String> {
    unwrap_value(value).as_str().map(str::to_string)
}

fn read_strings(value: &Value) -> Vec<String> {
    match unwrap_value(value) {
        Value::Array(items) => items.iter().filter_map(read_string).collect(),
        _ => Vec::new(),
    }
}

fn read_code(value: &Value) -> Option<DiagnosticCode> {
    match unwrap_value(value) {
        Value::Number(n) => n.as_i64().map(DiagnosticCode::Number),
        Value::String(s) => Some(DiagnosticCode::String(s.clone())),
        _ => None,
    }
}

/// A title is either a plain string or a string element with its own source map.
fn read_located(value: &Value) -> Option<Located> {
    let content = read_string(value)?;
    let source_map = value
        .get("attributes")
        .and_then(|attributes| attributes.get("sourceMap"))
        .and_then(read_source_map);
    Some(Located {
        content,
        source_map,
    })
}

/// Collect every `[offset, length]` pair under a `sourceMap` attribute, in order.
fn read_source_map(value: &Value) -> Option<SourceMap> {
    let mut spans = Vec::new();
    collect_spans(value, &mut spans);
    if spans.is_empty() {
        None
    } else {
        Some(SourceMap::new(spans))
    }
}

fn collect_spans(value: &Value, spans: &mut Vec<SourceSpan>) {
    let Value::Array(items) = unwrap_value(value) else {
        return;
    };
    let pair: Vec<u64> = items
        .iter()
        .filter_map(|item| unwrap_value(item).as_u64())
        .collect();

    if items.len() == 2 && pair.len() == 2 {
        spans.push(SourceSpan::new(pair[0] as usize, pair[1] as usize));
    } else {
        for item in items {
            collect_spans(item, spans);
        }
    }
}
