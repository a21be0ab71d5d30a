//! Two-pass diagram reader.
//!
//! Pass 1 walks the markup once and collects every node and sequence flow
//! the importer understands. Pass 2 turns nodes into states and resolves each
//! flow's `sourceRef`/`targetRef` against them, so flows may appear anywhere
//! in the document relative to the nodes they connect.

use std::collections::{HashMap, HashSet};

use model::{State, StateId, StateKind, Transition, TransitionId};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::debug;

use crate::{Diagram, ParseError};

/// Local tag names imported as plain states.
const PLAIN_TAGS: &[&str] = &[
    "task",
    "userTask",
    "serviceTask",
    "scriptTask",
    "manualTask",
    "sendTask",
    "receiveTask",
    "businessRuleTask",
    "subProcess",
    "callActivity",
    "intermediateCatchEvent",
    "intermediateThrowEvent",
    "exclusiveGateway",
    "inclusiveGateway",
];

const FLOW_TAG: &str = "sequenceFlow";

// ---------------------------------------------------------------------------
// Raw elements (pass 1)
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct RawNode {
    id: String,
    name: Option<String>,
    kind: StateKind,
}

#[derive(Debug)]
struct RawFlow {
    id: Option<String>,
    name: Option<String>,
    source_ref: String,
    target_ref: String,
}

#[derive(Debug, Default)]
struct Attributes {
    id: Option<String>,
    name: Option<String>,
    source_ref: Option<String>,
    target_ref: Option<String>,
}

impl Attributes {
    fn read(element: &BytesStart<'_>) -> Result<Self, ParseError> {
        let mut attrs = Attributes::default();
        for attr in element.attributes() {
            let attr = attr?;
            let slot = match attr.key.local_name().as_ref() {
                b"id" => &mut attrs.id,
                b"name" => &mut attrs.name,
                b"sourceRef" => &mut attrs.source_ref,
                b"targetRef" => &mut attrs.target_ref,
                _ => continue,
            };
            let value = attr.unescape_value()?;
            // An empty attribute counts as absent, so labels fall back to ids.
            *slot = (!value.is_empty()).then(|| value.into_owned());
        }
        Ok(attrs)
    }
}

fn classify(tag: &str) -> Option<StateKind> {
    match tag {
        "startEvent" => Some(StateKind::Entry),
        "endEvent" => Some(StateKind::Exit),
        t if PLAIN_TAGS.contains(&t) => Some(StateKind::Plain),
        _ => None,
    }
}

#[derive(Debug, Default)]
struct Collected {
    nodes: Vec<RawNode>,
    flows: Vec<RawFlow>,
}

impl Collected {
    fn visit(&mut self, element: &BytesStart<'_>) -> Result<(), ParseError> {
        let tag = String::from_utf8_lossy(element.local_name().as_ref()).into_owned();

        if tag == FLOW_TAG {
            let attrs = Attributes::read(element)?;
            let source_ref = attrs.source_ref.ok_or_else(|| ParseError::MissingAttribute {
                element: tag.clone(),
                attribute: "sourceRef",
            })?;
            let target_ref = attrs.target_ref.ok_or_else(|| ParseError::MissingAttribute {
                element: tag.clone(),
                attribute: "targetRef",
            })?;
            self.flows.push(RawFlow {
                id: attrs.id,
                name: attrs.name,
                source_ref,
                target_ref,
            });
            return Ok(());
        }

        let Some(kind) = classify(&tag) else {
            return Ok(());
        };

        let attrs = Attributes::read(element)?;
        match attrs.id {
            Some(id) => self.nodes.push(RawNode {
                id,
                name: attrs.name,
                kind,
            }),
            // Nothing can reference it, so it can never take part in a flow.
            None => debug!("skipping <{tag}> without an id"),
        }
        Ok(())
    }
}

fn collect(document: &str) -> Result<Collected, ParseError> {
    let mut reader = Reader::from_str(document);
    let mut collected = Collected::default();
    let mut depth = 0usize;
    let mut seen_element = false;

    loop {
        match reader.read_event()? {
            Event::Start(element) => {
                depth += 1;
                seen_element = true;
                collected.visit(&element)?;
            }
            Event::Empty(element) => {
                seen_element = true;
                collected.visit(&element)?;
            }
            Event::End(_) => depth = depth.saturating_sub(1),
            Event::Eof => break,
            _ => {}
        }
    }

    if depth > 0 {
        return Err(ParseError::Unbalanced { open: depth });
    }
    if !seen_element {
        return Err(ParseError::Empty);
    }
    Ok(collected)
}

// ---------------------------------------------------------------------------
// Graph construction (pass 2)
// ---------------------------------------------------------------------------

/// Parse `document` and build its states and transitions.
pub(crate) fn parse(document: &str) -> Result<Diagram, ParseError> {
    let collected = collect(document)?;

    let mut seen_ids: HashSet<&str> = HashSet::new();
    let ids = collected
        .nodes
        .iter()
        .map(|n| n.id.as_str())
        .chain(collected.flows.iter().filter_map(|f| f.id.as_deref()));
    for id in ids {
        if !seen_ids.insert(id) {
            return Err(ParseError::DuplicateId(id.to_owned()));
        }
    }

    let mut states = Vec::with_capacity(collected.nodes.len());
    let mut by_id: HashMap<&str, State> = HashMap::with_capacity(collected.nodes.len());
    for node in &collected.nodes {
        let label = node.name.as_deref().unwrap_or(&node.id);
        let state = State::with_id(StateId::from_key(&node.id), label, node.kind)?;
        by_id.insert(node.id.as_str(), state.clone());
        states.push(state);
    }

    let mut transitions = Vec::with_capacity(collected.flows.len());
    for (index, flow) in collected.flows.iter().enumerate() {
        let (key, id) = match &flow.id {
            Some(id) => (id.clone(), TransitionId::from_key(id)),
            None => {
                let key = format!("{}->{}#{index}", flow.source_ref, flow.target_ref);
                let id = TransitionId::from_anonymous_key(&key);
                (key, id)
            }
        };
        let resolve = |node_id: &str, side: &'static str| {
            by_id
                .get(node_id)
                .cloned()
                .ok_or_else(|| ParseError::UnknownReference {
                    flow_id: key.clone(),
                    node_id: node_id.to_owned(),
                    side,
                })
        };
        let source = resolve(&flow.source_ref, "source")?;
        let target = resolve(&flow.target_ref, "target")?;

        let label = flow.name.clone().unwrap_or_else(|| key.clone());
        let mut transition = Transition::with_id(id, label);
        transition.set_in_state(source);
        transition.set_out_state(target);
        transitions.push(transition);
    }

    Ok(Diagram { states, transitions })
}
