//! Generic element tree produced by the streaming parser.

/// An XML element with its attributes, direct text and child elements.
///
/// Children keep document order and every occurrence of a repeated element
/// is retained, so `<account>` nested inside `<account>` or a list of
/// `<posting>` elements come out as ordered sequences.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlNode {
    /// Element name
    pub name: String,
    /// Attributes in document order
    pub attributes: Vec<(String, String)>,
    /// Concatenated character data directly inside this element
    pub text: String,
    /// Child elements in document order
    pub children: Vec<XmlNode>,
}

impl XmlNode {
    /// Create an element without attributes, text or children.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Value of the attribute `key`, if present.
    #[must_use]
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// First child element named `name`.
    #[must_use]
    pub fn child(&self, name: &str) -> Option<&Self> {
        self.children.iter().find(|c| c.name == name)
    }

    /// All child elements named `name`, in document order.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Self> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Text content with surrounding whitespace removed.
    #[must_use]
    pub fn text(&self) -> &str {
        self.text.trim()
    }

    /// Trimmed text of the first child named `name`.
    #[must_use]
    pub fn child_text(&self, name: &str) -> Option<&str> {
        self.child(name).map(Self::text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node() -> XmlNode {
        let mut root = XmlNode::new("account");
        root.attributes.push(("id".into(), "a1".into()));
        let mut name = XmlNode::new("name");
        name.text = "  Assets \n".into();
        root.children.push(name);
        root.children.push(XmlNode::new("account"));
        root.children.push(XmlNode::new("depth"));
        root.children.push(XmlNode::new("account"));
        root
    }

    #[test]
    fn test_attr() {
        let n = node();
        assert_eq!(n.attr("id"), Some("a1"));
        assert_eq!(n.attr("ref"), None);
    }

    #[test]
    fn test_children_named_collects_repeats() {
        let n = node();
        assert_eq!(n.children_named("account").count(), 2);
        assert_eq!(n.children_named("posting").count(), 0);
    }

    #[test]
    fn test_child_text_is_trimmed() {
        let n = node();
        assert_eq!(n.child_text("name"), Some("Assets"));
        assert_eq!(n.child_text("depth"), Some(""));
        assert_eq!(n.child_text("fullname"), None);
    }
}
