//! Minimal element tree read with quick-xml
//!
//! Builders walk this tree instead of the event stream so they can look
//! ahead and report failures with an element path such as
//! `map[0]:layer[2]:data[0]` (the index counts siblings of the same name).

use crate::error::LoadError;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// An element with its attributes, child elements and text content
#[derive(Debug, Clone, PartialEq, Default)]
pub struct XmlElement {
    name: String,
    path: String,
    attributes: Vec<(String, String)>,
    children: Vec<XmlElement>,
    text: String,
}

impl XmlElement {
    /// Parse a whole document and return its root element. `file` only
    /// labels error messages.
    pub fn parse(source: &str, file: &str) -> Result<XmlElement, LoadError> {
        let xml_error = |message: String| LoadError::Xml {
            file: file.to_string(),
            message,
        };

        let mut reader = Reader::from_str(source);
        reader.config_mut().trim_text(true);

        let mut stack: Vec<XmlElement> = Vec::new();
        let mut root: Option<XmlElement> = None;
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => {
                    let element = Self::open(&e, stack.last(), root.is_some()).map_err(xml_error)?;
                    stack.push(element);
                }
                Ok(Event::Empty(e)) => {
                    let element = Self::open(&e, stack.last(), root.is_some()).map_err(xml_error)?;
                    Self::close(element, &mut stack, &mut root);
                }
                Ok(Event::End(_)) => {
                    if let Some(element) = stack.pop() {
                        Self::close(element, &mut stack, &mut root);
                    }
                }
                Ok(Event::Text(e)) => {
                    let text = e.unescape().map_err(|e| xml_error(e.to_string()))?;
                    if let Some(current) = stack.last_mut() {
                        current.text.push_str(&text);
                    }
                }
                Ok(Event::CData(e)) => {
                    let bytes = e.into_inner();
                    let text = std::str::from_utf8(&bytes).map_err(|e| xml_error(e.to_string()))?;
                    if let Some(current) = stack.last_mut() {
                        current.text.push_str(text);
                    }
                }
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(e) => return Err(xml_error(e.to_string())),
            }
            buf.clear();
        }

        if !stack.is_empty() {
            return Err(xml_error("unexpected end of document".to_string()));
        }
        root.ok_or_else(|| xml_error("document has no root element".to_string()))
    }

    fn open(e: &BytesStart, parent: Option<&XmlElement>, has_root: bool) -> Result<XmlElement, String> {
        let name = std::str::from_utf8(e.name().as_ref())
            .map_err(|e| e.to_string())?
            .to_string();

        let path = match parent {
            Some(parent) => {
                let index = parent.children.iter().filter(|c| c.name == name).count();
                format!("{}:{}[{}]", parent.path, name, index)
            }
            None if has_root => return Err(format!("second root element <{name}>")),
            None => format!("{name}[0]"),
        };

        let mut attributes = Vec::new();
        for attr in e.attributes() {
            let attr = attr.map_err(|e| format!("Failed to parse attribute: {e}"))?;
            let key = std::str::from_utf8(attr.key.as_ref())
                .map_err(|e| e.to_string())?
                .to_string();
            let value = attr.unescape_value().map_err(|e| e.to_string())?.into_owned();
            attributes.push((key, value));
        }

        Ok(XmlElement {
            name,
            path,
            attributes,
            children: Vec::new(),
            text: String::new(),
        })
    }

    fn close(element: XmlElement, stack: &mut [XmlElement], root: &mut Option<XmlElement>) {
        match stack.last_mut() {
            Some(parent) => parent.children.push(element),
            None => *root = Some(element),
        }
    }

    /// Create a detached element, mostly useful in tests
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            path: format!("{name}[0]"),
            name,
            ..Default::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Location of this element in its document
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Raw attribute value
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    pub fn children(&self) -> &[XmlElement] {
        &self.children
    }

    /// First child named `name`
    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Text content, trimmed at both ends
    pub fn text(&self) -> &str {
        self.text.trim()
    }
}
