use super::graph::*;
use super::xml::{self, XmlElement};
use crate::error::ProcessParseError;
use ahash::AHashMap;
use std::path::Path;
use tracing::{debug, warn};

/// Diagram bounds keyed by the `bpmnElement` they describe.
type ShapeIndex = AHashMap<String, Position>;

/// Reads BPMN documents into [`ProcessGraph`]s.
///
/// Every `<process>` element in a document becomes its own graph, in document order.
pub struct ProcessParser;

impl ProcessParser {
    pub fn parse_file(path: &Path) -> Result<Vec<ProcessGraph>, ProcessParseError> {
        let content = std::fs::read_to_string(path).map_err(|source| ProcessParseError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse_str(&content)
    }

    pub fn parse_str(content: &str) -> Result<Vec<ProcessGraph>, ProcessParseError> {
        let root = xml::parse_document(content)?;

        let processes: Vec<&XmlElement> = if root.name == "process" {
            vec![&root]
        } else {
            root.descendants_named("process")
        };
        if processes.is_empty() {
            return Err(ProcessParseError::NoProcess);
        }

        let shapes = collect_shapes(&root);
        let participants = collect_participants(&root);
        let message_flows = collect_message_flows(&root);

        let graphs = processes
            .into_iter()
            .map(|element| {
                let mut graph = build_graph(element, &shapes);
                let process_id = graph.process_id.clone();
                graph.pool = participants.get(&process_id).cloned();
                attach_message_flows(&mut graph, &message_flows);
                complete_node_flows(&mut graph);

                for flow in graph.dangling_flows() {
                    warn!(
                        process = %graph.process_id,
                        flow = %flow.id,
                        source = %flow.source_ref,
                        target = %flow.target_ref,
                        "Flow references an unknown node"
                    );
                }
                debug!(
                    process = %graph.process_id,
                    nodes = graph.nodes.len(),
                    flows = graph.flows.len(),
                    "Parsed BPMN process"
                );
                graph
            })
            .collect();
        Ok(graphs)
    }

    /// Convenience for callers that only care about the first process of a document.
    pub fn parse_first_process(content: &str) -> Result<ProcessGraph, ProcessParseError> {
        Self::parse_str(content)?
            .into_iter()
            .next()
            .ok_or(ProcessParseError::NoProcess)
    }
}

fn build_graph(process: &XmlElement, shapes: &ShapeIndex) -> ProcessGraph {
    let mut graph = ProcessGraph::new(process.attr_or_empty("id"), process.attr_or_empty("name"));

    for element in process.descendants() {
        let tag = element.name.as_str();

        let kind = if let Some(kind) = GatewayKind::from_tag(tag) {
            Some(NodeKind::Gateway(kind))
        } else if let Some(kind) = EventKind::from_tag(tag) {
            Some(NodeKind::Event(kind))
        } else {
            TaskKind::from_tag(tag).map(NodeKind::Task)
        };

        if let Some(kind) = kind {
            let node = build_node(element, kind, shapes);
            let id = node.id.clone();
            if !graph.add_node(node) {
                warn!(
                    process = %graph.process_id,
                    node = %id,
                    tag,
                    "Skipping node with empty or duplicate id"
                );
            }
            continue;
        }

        match tag {
            "sequenceFlow" => graph.flows.push(Flow {
                id: element.attr_or_empty("id"),
                name: element.attr_or_empty("name"),
                source_ref: element.attr_or_empty("sourceRef"),
                target_ref: element.attr_or_empty("targetRef"),
                kind: FlowKind::Sequence,
                condition_expression: element
                    .child("conditionExpression")
                    .map(|c| c.trimmed_text().to_string())
                    .filter(|c| !c.is_empty()),
            }),
            "dataObject" => {
                let id = element.attr_or_empty("id");
                graph.data_objects.push(DataObject {
                    name: element.attr_or_empty("name"),
                    data_object_ref: id.clone(),
                    is_collection: element
                        .attr("isCollection")
                        .is_some_and(|v| v.eq_ignore_ascii_case("true")),
                    position: lookup_position(shapes, &id),
                    id,
                })
            }
            "dataObjectReference" => {
                let id = element.attr_or_empty("id");
                graph.data_objects.push(DataObject {
                    name: element.attr_or_empty("name"),
                    data_object_ref: element.attr_or_empty("dataObjectRef"),
                    is_collection: false,
                    position: lookup_position(shapes, &id),
                    id,
                })
            }
            "lane" => graph.lanes.push(build_lane(element)),
            _ => {}
        }
    }
    graph
}

fn build_node(element: &XmlElement, kind: NodeKind, shapes: &ShapeIndex) -> Node {
    let id = element.attr_or_empty("id");
    let flow_refs = |name: &str| -> Vec<String> {
        element
            .children_named(name)
            .map(|c| c.trimmed_text().to_string())
            .filter(|r| !r.is_empty())
            .collect()
    };

    let event_definitions = match kind {
        NodeKind::Event(_) => element
            .children
            .iter()
            .filter_map(|c| c.name.strip_suffix("EventDefinition"))
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    };

    Node {
        name: element.attr_or_empty("name"),
        position: lookup_position(shapes, &id),
        incoming: flow_refs("incoming"),
        outgoing: flow_refs("outgoing"),
        event_definitions,
        attached_to: element.attr("attachedToRef").map(str::to_string),
        kind,
        id,
    }
}

fn build_lane(element: &XmlElement) -> Lane {
    let mut node_refs: Vec<String> = element
        .children_named("flowNodeRef")
        .map(|c| c.trimmed_text().to_string())
        .filter(|r| !r.is_empty())
        .collect();
    if node_refs.is_empty() {
        if let Some(refs) = element.attr("flowNodeRefs") {
            node_refs = refs.split_whitespace().map(str::to_string).collect();
        }
    }
    Lane {
        id: element.attr_or_empty("id"),
        name: element.attr_or_empty("name"),
        node_refs,
    }
}

/// Two-step DI lookup: a node without a shape, or a shape without bounds, has no position.
fn lookup_position(shapes: &ShapeIndex, id: &str) -> Option<Position> {
    shapes.get(id).copied()
}

fn collect_shapes(root: &XmlElement) -> ShapeIndex {
    let mut shapes = ShapeIndex::new();
    for shape in root.descendants_named("BPMNShape") {
        let Some(element_id) = shape.attr("bpmnElement") else {
            continue;
        };
        let Some(bounds) = shape.child("Bounds") else {
            continue;
        };
        let coord = |key: &str| bounds.attr(key).and_then(|v| v.parse::<f64>().ok());
        if let (Some(x), Some(y), Some(width), Some(height)) =
            (coord("x"), coord("y"), coord("width"), coord("height"))
        {
            shapes.insert(
                element_id.to_string(),
                Position {
                    x,
                    y,
                    width,
                    height,
                },
            );
        }
    }
    shapes
}

/// Maps `processRef` to the participant (pool) that carries it.
fn collect_participants(root: &XmlElement) -> AHashMap<String, Pool> {
    root.descendants_named("participant")
        .into_iter()
        .filter_map(|p| {
            let process_ref = p.attr("processRef")?;
            Some((
                process_ref.to_string(),
                Pool {
                    id: p.attr_or_empty("id"),
                    name: p.attr_or_empty("name"),
                },
            ))
        })
        .collect()
}

fn collect_message_flows(root: &XmlElement) -> Vec<Flow> {
    root.descendants_named("messageFlow")
        .into_iter()
        .map(|element| Flow {
            id: element.attr_or_empty("id"),
            name: element.attr_or_empty("name"),
            source_ref: element.attr_or_empty("sourceRef"),
            target_ref: element.attr_or_empty("targetRef"),
            kind: FlowKind::Message,
            condition_expression: None,
        })
        .collect()
}

/// Keeps the message flows that touch this process, either through one of its
/// nodes or through its pool.
fn attach_message_flows(graph: &mut ProcessGraph, message_flows: &[Flow]) {
    let pool_id = graph.pool.as_ref().map(|p| p.id.clone());
    let touches = |id: &str| graph.contains(id) || pool_id.as_deref() == Some(id);
    let relevant: Vec<Flow> = message_flows
        .iter()
        .filter(|f| touches(&f.source_ref) || touches(&f.target_ref))
        .cloned()
        .collect();
    graph.flows.extend(relevant);
}

/// Completes declared `incoming`/`outgoing` lists with the flows that reference
/// each node, so graphs written without those child elements still carry them.
fn complete_node_flows(graph: &mut ProcessGraph) {
    let mut incoming: AHashMap<String, Vec<String>> = AHashMap::new();
    let mut outgoing: AHashMap<String, Vec<String>> = AHashMap::new();
    for flow in &graph.flows {
        if flow.id.is_empty() {
            continue;
        }
        incoming
            .entry(flow.target_ref.clone())
            .or_default()
            .push(flow.id.clone());
        outgoing
            .entry(flow.source_ref.clone())
            .or_default()
            .push(flow.id.clone());
    }

    for node in &mut graph.nodes {
        for flow_id in incoming.remove(&node.id).unwrap_or_default() {
            if !node.incoming.contains(&flow_id) {
                node.incoming.push(flow_id);
            }
        }
        for flow_id in outgoing.remove(&node.id).unwrap_or_default() {
            if !node.outgoing.contains(&flow_id) {
                node.outgoing.push(flow_id);
            }
        }
    }
}
