//! # Message Model
//!
//! HTTP-style messages: an ordered attribute list plus an optional body.
//!
//! Attributes are `name: value` pairs parsed one per line. Order of
//! appearance is significant — the first attribute identifies the verb
//! (`POST` in this protocol) — names may repeat, and no uniqueness is
//! enforced. The body is a raw byte sequence that this protocol treats
//! as text.

use bytes::Bytes;

/// A single `name: value` pair parsed from one header-style line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Parse one attribute line of the form `name: value`.
    ///
    /// The split happens at the first `:`; the value has surrounding
    /// whitespace trimmed (which also swallows a stray `\r`). A line with
    /// no colon becomes an attribute with an empty value.
    pub fn parse(line: &str) -> Self {
        match line.split_once(':') {
            Some((name, value)) => Self::new(name.trim(), value.trim()),
            None => Self::new(line.trim(), ""),
        }
    }

    /// Render the attribute as a wire line, without the terminator.
    pub fn to_line(&self) -> String {
        format!("{}: {}", self.name, self.value)
    }
}

/// An ordered attribute list plus an optional body — the unit handed to
/// the downstream consumer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Message {
    attributes: Vec<Attribute>,
    body: Bytes,
}

impl Message {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an attribute, preserving insertion order.
    pub fn add_attribute(&mut self, attribute: Attribute) {
        self.attributes.push(attribute);
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// Name of the first attribute, which identifies the verb.
    pub fn verb(&self) -> Option<&str> {
        self.attributes.first().map(|a| a.name.as_str())
    }

    /// Value of the first attribute with the given name.
    pub fn find_value(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    /// Remove every attribute with the given name.
    pub fn remove_attribute(&mut self, name: &str) {
        self.attributes.retain(|a| a.name != name);
    }

    pub fn set_body(&mut self, body: impl Into<Bytes>) {
        self.body = body.into();
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// The body interpreted as text (lossy for non-UTF-8 bytes).
    pub fn body_str(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    /// Encode the message for the wire: one line per attribute, a blank
    /// line ending the block, then the raw body bytes with no terminator.
    pub fn to_wire_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for attribute in &self.attributes {
            out.extend_from_slice(attribute.to_line().as_bytes());
            out.push(b'\n');
        }
        out.push(b'\n');
        out.extend_from_slice(&self.body);
        out
    }
}
