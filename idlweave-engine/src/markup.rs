//! Rendered markup
//!
//! A small typed tree for the annotated IDL: four element tags and text. The renderer
//! builds it; the host can walk it directly or take the HTML produced by [Markup::to_html],
//! which goes through an html5ever DOM so escaping follows the HTML serializer.

use crate::error::RenderError;
use html5ever::{
    ns, serialize, serialize::SerializeOpts, serialize::TraversalScope, Attribute, LocalName,
    QualName,
};
use markup5ever_rcdom::{Handle, Node, NodeData, SerializableHandle};
use serde::Serialize;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tag {
    Pre,
    Span,
    A,
    Dfn,
}

impl Tag {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tag::Pre => "pre",
            Tag::Span => "span",
            Tag::A => "a",
            Tag::Dfn => "dfn",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Element {
    pub tag: Tag,
    pub classes: Vec<String>,
    /// Attributes other than `class`, in insertion order.
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Markup>,
}

impl Element {
    pub fn new(tag: Tag) -> Self {
        Self {
            tag,
            classes: Vec::new(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn span(class: &str) -> Self {
        Self::new(Tag::Span).class(class)
    }

    pub fn class(mut self, class: &str) -> Self {
        self.add_class(class);
        self
    }

    pub fn add_class(&mut self, class: &str) {
        if !self.has_class(class) {
            self.classes.push(class.to_string());
        }
    }

    pub fn attr(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attrs.iter_mut().find(|(key, _)| key == name) {
            Some(slot) => slot.1 = value,
            None => self.attrs.push((name.to_string(), value)),
        }
    }

    pub fn child(mut self, child: Markup) -> Self {
        self.push(child);
        self
    }

    /// Append a child; adjacent text is merged.
    pub fn push(&mut self, child: Markup) {
        match (self.children.last_mut(), child) {
            (_, Markup::Text(text)) if text.is_empty() => {}
            (Some(Markup::Text(last)), Markup::Text(text)) => last.push_str(&text),
            (_, child) => self.children.push(child),
        }
    }

    pub fn text(&mut self, text: &str) {
        self.push(Markup::Text(text.to_string()));
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn id(&self) -> Option<&str> {
        self.get_attr("id")
    }

    pub fn text_content(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            child.write_text(&mut out);
        }
        out
    }

    /// Descendant elements with `class`, in document order.
    pub fn find_by_class(&self, class: &str) -> Vec<&Element> {
        let mut found = Vec::new();
        self.walk(&mut |element| {
            if element.has_class(class) {
                found.push(element);
            }
        });
        found
    }

    /// Descendant elements with this tag, in document order.
    pub fn find_by_tag(&self, tag: Tag) -> Vec<&Element> {
        let mut found = Vec::new();
        self.walk(&mut |element| {
            if element.tag == tag {
                found.push(element);
            }
        });
        found
    }

    /// First descendant whose `attr` equals `value`.
    pub fn find_by_attr(&self, attr: &str, value: &str) -> Option<&Element> {
        let mut found = None;
        self.walk(&mut |element| {
            if found.is_none() && element.get_attr(attr) == Some(value) {
                found = Some(element);
            }
        });
        found
    }

    fn walk<'e>(&'e self, visit: &mut dyn FnMut(&'e Element)) {
        for child in &self.children {
            if let Markup::Element(element) = child {
                visit(element);
                element.walk(visit);
            }
        }
    }

    fn to_node(&self) -> Handle {
        let mut attrs: Vec<(String, String)> = Vec::new();
        if !self.classes.is_empty() {
            attrs.push(("class".to_string(), self.classes.join(" ")));
        }
        attrs.extend(self.attrs.iter().cloned());
        let node = create_element(self.tag.as_str(), &attrs);
        for child in &self.children {
            let handle = match child {
                Markup::Element(element) => element.to_node(),
                Markup::Text(text) => create_text(text),
            };
            node.children.borrow_mut().push(handle);
        }
        node
    }

    /// Serialize the element and its subtree.
    pub fn to_html(&self) -> Result<String, RenderError> {
        let handle = self.to_node();
        let mut output = Vec::new();
        let opts = SerializeOpts {
            traversal_scope: TraversalScope::IncludeNode,
            ..Default::default()
        };
        serialize(&mut output, &SerializableHandle::from(handle), opts).map_err(|e| {
            RenderError::SerializationError(format!("HTML serialization failed: {}", e))
        })?;
        String::from_utf8(output)
            .map_err(|e| RenderError::SerializationError(format!("UTF-8 conversion failed: {}", e)))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Markup {
    Element(Element),
    Text(String),
}

impl Markup {
    fn write_text(&self, out: &mut String) {
        match self {
            Markup::Element(element) => {
                for child in &element.children {
                    child.write_text(out);
                }
            }
            Markup::Text(text) => out.push_str(text),
        }
    }

    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.write_text(&mut out);
        out
    }
}

impl From<Element> for Markup {
    fn from(element: Element) -> Self {
        Markup::Element(element)
    }
}

fn create_element(tag: &str, attrs: &[(String, String)]) -> Handle {
    let qual_name = QualName::new(None, ns!(html), LocalName::from(tag));
    let attributes = attrs
        .iter()
        .map(|(name, value)| Attribute {
            name: QualName::new(None, ns!(), LocalName::from(name.as_str())),
            value: value.clone().into(),
        })
        .collect();

    Rc::new(Node {
        parent: Cell::new(None),
        children: RefCell::new(Vec::new()),
        data: NodeData::Element {
            name: qual_name,
            attrs: RefCell::new(attributes),
            template_contents: Default::default(),
            mathml_annotation_xml_integration_point: false,
        },
    })
}

fn create_text(text: &str) -> Handle {
    Rc::new(Node {
        parent: Cell::new(None),
        children: RefCell::new(Vec::new()),
        data: NodeData::Text {
            contents: RefCell::new(text.to_string().into()),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Element {
        let mut pre = Element::new(Tag::Pre).class("idl");
        let mut wrapper = Element::span("idlInterface").attr("id", "idl-def-a");
        wrapper.text("interface ");
        wrapper.push(
            Element::new(Tag::Dfn)
                .class("idlID")
                .attr("id", "dom-a")
                .child(Markup::Text("A".into()))
                .into(),
        );
        wrapper.text(" {");
        wrapper.text("};");
        pre.push(wrapper.into());
        pre
    }

    #[test]
    fn test_text_merging_and_queries() {
        let pre = sample();
        assert_eq!(pre.text_content(), "interface A {};");
        let wrapper = &pre.find_by_class("idlInterface")[0];
        assert_eq!(wrapper.children.len(), 3);
        assert_eq!(pre.find_by_tag(Tag::Dfn)[0].id(), Some("dom-a"));
        assert!(pre.find_by_attr("id", "idl-def-a").is_some());
    }

    #[test]
    fn test_to_html_escapes_text() {
        let mut span = Element::span("idlType");
        span.text("sequence<DOMString>");
        assert_eq!(
            span.to_html().unwrap(),
            "<span class=\"idlType\">sequence&lt;DOMString&gt;</span>"
        );
    }

    #[test]
    fn test_to_html_nested() {
        let html = sample().to_html().unwrap();
        assert_eq!(
            html,
            "<pre class=\"idl\"><span class=\"idlInterface\" id=\"idl-def-a\">interface <dfn class=\"idlID\" id=\"dom-a\">A</dfn> {};</span></pre>"
        );
    }
}
