use std::collections::BTreeMap;

use roxmltree::{Document, Node, NodeType};
use sp_core::ParticipantError;

#[derive(Debug, Clone, PartialEq)]
pub struct XmlDocument {
    pub root: XmlElementNode,
}

#[derive(Debug, Clone, PartialEq)]
pub enum XmlNode {
    Element(XmlElementNode),
    Text(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct XmlElementNode {
    pub name: String,
    pub attributes: BTreeMap<String, String>,
    pub children: Vec<XmlNode>,
    pub line: u32,
}

impl XmlElementNode {
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn elements(&self) -> impl Iterator<Item = &XmlElementNode> {
        self.children.iter().filter_map(|child| match child {
            XmlNode::Element(element) => Some(element),
            XmlNode::Text(_) => None,
        })
    }

    pub fn child(&self, name: &str) -> Option<&XmlElementNode> {
        self.elements().find(|element| element.name == name)
    }

    /// Concatenation of direct text and CDATA children, untrimmed.
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|child| match child {
                XmlNode::Text(value) => Some(value.as_str()),
                XmlNode::Element(_) => None,
            })
            .collect()
    }
}

pub fn parse_xml_document(source: &str) -> Result<XmlDocument, ParticipantError> {
    let document = Document::parse(source)
        .map_err(|error| ParticipantError::config("CONFIG_XML_PARSE_ERROR", error.to_string()))?;

    let Some(root) = document.root().children().find(|node| node.is_element()) else {
        return Err(ParticipantError::config(
            "CONFIG_XML_PARSE_ERROR",
            "XML document must contain a root element.",
        ));
    };

    Ok(XmlDocument {
        root: parse_element(&document, root),
    })
}

fn parse_element(document: &Document<'_>, node: Node<'_, '_>) -> XmlElementNode {
    let mut attributes = BTreeMap::new();
    for attribute in node.attributes() {
        attributes.insert(attribute.name().to_string(), attribute.value().to_string());
    }

    let mut children = Vec::new();
    for child in node.children() {
        match child.node_type() {
            NodeType::Element => children.push(XmlNode::Element(parse_element(document, child))),
            NodeType::Text => {
                let value = child.text().unwrap_or_default();
                if !value.is_empty() {
                    children.push(XmlNode::Text(value.to_string()));
                }
            }
            _ => {}
        }
    }

    XmlElementNode {
        name: node.tag_name().name().to_string(),
        attributes,
        children,
        line: document.text_pos_at(node.range().start).row,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_xml_document_builds_tree_with_attributes_and_text() {
        let source = r#"<participant realm="r"><commit>log.info("x");</commit></participant>"#;
        let document = parse_xml_document(source).expect("xml should parse");
        assert_eq!(document.root.name, "participant");
        assert_eq!(document.root.attribute("realm"), Some("r"));
        let commit = document.root.child("commit").expect("commit element");
        assert_eq!(commit.text(), r#"log.info("x");"#);
        assert_eq!(commit.line, 1);
    }

    #[test]
    fn text_joins_cdata_and_skips_comments() {
        let source = "<p><abort>a<!--c--><![CDATA[ < b ]]></abort></p>";
        let document = parse_xml_document(source).expect("xml should parse");
        let abort = document.root.child("abort").expect("abort element");
        assert_eq!(abort.text(), "a < b ");
    }

    #[test]
    fn empty_element_has_empty_text() {
        let document = parse_xml_document("<p><prepare/></p>").expect("xml should parse");
        let prepare = document.root.child("prepare").expect("prepare element");
        assert_eq!(prepare.text(), "");
        assert!(prepare.children.is_empty());
    }

    #[test]
    fn parse_xml_document_returns_parse_error_for_invalid_xml() {
        let error = parse_xml_document("<participant>").expect_err("invalid xml should fail");
        assert_eq!(error.code, "CONFIG_XML_PARSE_ERROR");
        assert!(error.is_configuration());
    }

    #[test]
    fn parse_xml_document_returns_parse_error_when_root_element_is_missing() {
        let error = parse_xml_document("<?xml version=\"1.0\"?><!---->")
            .expect_err("missing root element should fail");
        assert_eq!(error.code, "CONFIG_XML_PARSE_ERROR");
    }
}
