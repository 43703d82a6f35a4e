//! Owned element tree for layout documents

/// A single attribute of an element
///
/// Attributes are kept as a sequence rather than a map so that document
/// order survives a parse/serialize round trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Attribute name
    pub name: String,
    /// Attribute value (unescaped text)
    pub value: String,
}

/// One piece of element content, in document order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    /// Literal character data
    Text(String),
    /// A nested child element, owned by its parent
    Element(Element),
}

/// An XML element with its attributes and ordered contents
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Element {
    /// Tag name
    pub tag: String,
    /// Attributes in document order
    pub attrs: Vec<Attribute>,
    /// Text and child elements in document order
    pub contents: Vec<Content>,
}

impl Element {
    /// Create an empty element with the given tag name
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: Vec::new(),
            contents: Vec::new(),
        }
    }

    /// Look up an attribute value by name
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    /// Set an attribute, replacing an existing value or appending a new one
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attrs.iter_mut().find(|a| a.name == name) {
            Some(attr) => attr.value = value,
            None => self.attrs.push(Attribute { name, value }),
        }
    }

    /// Append a child element
    pub fn push_child(&mut self, child: Element) {
        self.contents.push(Content::Element(child));
    }

    /// Iterate over child elements, skipping text content
    pub fn children(&self) -> impl Iterator<Item = &Element> {
        self.contents.iter().filter_map(|c| match c {
            Content::Element(e) => Some(e),
            Content::Text(_) => None,
        })
    }
}
