//! XML to JSON conversion in the `xmltodict` convention.
//!
//! - attributes become `"@name"` keys
//! - text next to attributes or child elements goes under `"#text"`
//! - an element holding only text becomes a string, an empty one becomes `null`
//! - repeated child elements collapse into an array

use crate::error::{EtlError, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde_json::{Map, Value};

struct Node {
    name: String,
    fields: Map<String, Value>,
    text: String,
}

impl Node {
    fn open(start: &BytesStart<'_>) -> Result<Self> {
        let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let mut fields = Map::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|e| EtlError::Xml(e.to_string()))?;
            let key = format!("@{}", String::from_utf8_lossy(attr.key.as_ref()));
            let value = attr
                .unescape_value()
                .map_err(|e| EtlError::Xml(e.to_string()))?;
            fields.insert(key, Value::String(value.into_owned()));
        }
        Ok(Self {
            name,
            fields,
            text: String::new(),
        })
    }

    fn finish(self) -> (String, Value) {
        let text = self.text.trim().to_string();
        let value = if self.fields.is_empty() {
            if text.is_empty() {
                Value::Null
            } else {
                Value::String(text)
            }
        } else {
            let mut fields = self.fields;
            if !text.is_empty() {
                fields.insert("#text".to_string(), Value::String(text));
            }
            Value::Object(fields)
        };
        (self.name, value)
    }
}

fn insert_child(fields: &mut Map<String, Value>, key: String, value: Value) {
    match fields.get_mut(&key) {
        Some(Value::Array(items)) => items.push(value),
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, value]);
        }
        None => {
            fields.insert(key, value);
        }
    }
}

/// Convert an XML document into a JSON object keyed by its root element.
pub fn xml_to_json(xml: &str) -> Result<Value> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Node> = Vec::new();
    let mut root: Option<(String, Value)> = None;

    let mut close = |stack: &mut Vec<Node>, node: Node| {
        let (name, value) = node.finish();
        match stack.last_mut() {
            Some(parent) => insert_child(&mut parent.fields, name, value),
            None => root = Some((name, value)),
        }
    };

    loop {
        match reader.read_event().map_err(|e| EtlError::Xml(e.to_string()))? {
            Event::Start(start) => stack.push(Node::open(&start)?),
            Event::Empty(start) => {
                let node = Node::open(&start)?;
                close(&mut stack, node);
            }
            Event::Text(text) => {
                if let Some(node) = stack.last_mut() {
                    let text = text.unescape().map_err(|e| EtlError::Xml(e.to_string()))?;
                    node.text.push_str(&text);
                }
            }
            Event::CData(data) => {
                if let Some(node) = stack.last_mut() {
                    node.text.push_str(&String::from_utf8_lossy(&data.into_inner()));
                }
            }
            Event::End(_) => {
                let node = stack
                    .pop()
                    .ok_or_else(|| EtlError::Xml("unbalanced closing tag".to_string()))?;
                close(&mut stack, node);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(EtlError::Xml("unexpected end of document".to_string()));
    }
    let (name, value) = root.ok_or_else(|| EtlError::Xml("empty document".to_string()))?;
    let mut doc = Map::new();
    doc.insert(name, value);
    Ok(Value::Object(doc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_attributes_and_text() {
        let doc = xml_to_json(r#"<TAG unit="years">42</TAG>"#).unwrap();
        assert_eq!(doc, json!({"TAG": {"@unit": "years", "#text": "42"}}));
    }

    #[test]
    fn test_repeated_children_become_array() {
        let doc = xml_to_json("<SET><S>a</S><S>b</S><T/></SET>").unwrap();
        assert_eq!(doc, json!({"SET": {"S": ["a", "b"], "T": null}}));
    }

    #[test]
    fn test_escaped_text() {
        let doc = xml_to_json("<T>a &amp; b</T>").unwrap();
        assert_eq!(doc, json!({"T": "a & b"}));
    }

    #[test]
    fn test_empty_input_is_error() {
        assert!(matches!(xml_to_json(""), Err(EtlError::Xml(_))));
    }
}
