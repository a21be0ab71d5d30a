//! Typed error type for the importer crate.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    /// The document is not well-formed markup.
    #[error("malformed document: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error(transparent)]
    Model(#[from] model::ModelError),

    #[error("attribute error: {0}")]
    Attribute(#[from] quick_xml::events::attributes::AttrError),

    /// The document ended with `open` element(s) still unclosed.
    #[error("document ended with {open} unclosed element(s)")]
    Unbalanced { open: usize },

    #[error("document contains no elements")]
    Empty,

    #[error("<{element}> is missing required attribute '{attribute}'")]
    MissingAttribute {
        element: String,
        attribute: &'static str,
    },

    #[error("duplicate element id '{0}'")]
    DuplicateId(String),

    /// A sequence flow points at an id that is not a known node.
    #[error("sequence flow '{flow_id}' references unknown node '{node_id}' ({side} side)")]
    UnknownReference {
        flow_id: String,
        node_id: String,
        side: &'static str,
    },
}
