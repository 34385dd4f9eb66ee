use ahash::{AHashMap, AHashSet};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;

/// The canonical, parsed form of a single BPMN `<process>`.
/// Everything downstream of the parser works on this structure only.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "GraphFields")]
pub struct ProcessGraph {
    pub process_id: String,
    pub process_name: String,
    pub nodes: Vec<Node>,
    pub flows: Vec<Flow>,
    pub data_objects: Vec<DataObject>,
    pub lanes: Vec<Lane>,
    pub pool: Option<Pool>,
    #[serde(skip)]
    index: AHashMap<String, usize>,
}

/// The serialized fields of a [`ProcessGraph`]; the id index is rebuilt on load.
#[derive(Deserialize)]
struct GraphFields {
    process_id: String,
    process_name: String,
    nodes: Vec<Node>,
    flows: Vec<Flow>,
    data_objects: Vec<DataObject>,
    lanes: Vec<Lane>,
    pool: Option<Pool>,
}

impl From<GraphFields> for ProcessGraph {
    fn from(fields: GraphFields) -> Self {
        let mut graph = ProcessGraph {
            process_id: fields.process_id,
            process_name: fields.process_name,
            nodes: fields.nodes,
            flows: fields.flows,
            data_objects: fields.data_objects,
            lanes: fields.lanes,
            pool: fields.pool,
            index: AHashMap::new(),
        };
        graph.reindex();
        graph
    }
}

impl PartialEq for ProcessGraph {
    fn eq(&self, other: &Self) -> bool {
        self.process_id == other.process_id
            && self.process_name == other.process_name
            && self.nodes == other.nodes
            && self.flows == other.flows
            && self.data_objects == other.data_objects
            && self.lanes == other.lanes
            && self.pool == other.pool
    }
}

/// A flow node (task, gateway or event) in the process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    pub name: String,
    pub kind: NodeKind,
    pub position: Option<Position>,
    pub incoming: Vec<String>,
    pub outgoing: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub event_definitions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attached_to: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "category", content = "subtype", rename_all = "snake_case")]
pub enum NodeKind {
    Task(TaskKind),
    Gateway(GatewayKind),
    Event(EventKind),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TaskKind {
    Task,
    UserTask,
    ManualTask,
    ServiceTask,
    BusinessRuleTask,
    ScriptTask,
    SendTask,
    ReceiveTask,
    CallActivity,
    SubProcess,
    Transaction,
    /// An element whose tag merely ends in "task"; the raw local name is kept.
    Other(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GatewayKind {
    ExclusiveGateway,
    ParallelGateway,
    InclusiveGateway,
    EventBasedGateway,
    ComplexGateway,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventKind {
    StartEvent,
    EndEvent,
    IntermediateThrowEvent,
    IntermediateCatchEvent,
    BoundaryEvent,
}

/// Diagram rectangle taken from the BPMN-DI section, when present.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// A connection between two nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flow {
    pub id: String,
    pub name: String,
    pub source_ref: String,
    pub target_ref: String,
    pub kind: FlowKind,
    pub condition_expression: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowKind {
    Sequence,
    Message,
}

/// A data object or a data-object reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataObject {
    pub id: String,
    pub name: String,
    /// The id of the underlying data object. Equal to `id` for a plain data object.
    pub data_object_ref: String,
    pub is_collection: bool,
    pub position: Option<Position>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lane {
    pub id: String,
    pub name: String,
    pub node_refs: Vec<String>,
}

/// The collaboration participant that owns this process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pool {
    pub id: String,
    pub name: String,
}

impl TaskKind {
    /// Maps a BPMN local element name onto a task subtype.
    pub fn from_tag(tag: &str) -> Option<Self> {
        let kind = match tag {
            "task" => TaskKind::Task,
            "userTask" => TaskKind::UserTask,
            "manualTask" => TaskKind::ManualTask,
            "serviceTask" => TaskKind::ServiceTask,
            "businessRuleTask" => TaskKind::BusinessRuleTask,
            "scriptTask" => TaskKind::ScriptTask,
            "sendTask" => TaskKind::SendTask,
            "receiveTask" => TaskKind::ReceiveTask,
            "callActivity" => TaskKind::CallActivity,
            "subProcess" | "adHocSubProcess" => TaskKind::SubProcess,
            "transaction" => TaskKind::Transaction,
            other if other.to_ascii_lowercase().ends_with("task") => {
                TaskKind::Other(other.to_string())
            }
            _ => return None,
        };
        Some(kind)
    }
}

impl GatewayKind {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "exclusiveGateway" => Some(GatewayKind::ExclusiveGateway),
            "parallelGateway" => Some(GatewayKind::ParallelGateway),
            "inclusiveGateway" => Some(GatewayKind::InclusiveGateway),
            "eventBasedGateway" => Some(GatewayKind::EventBasedGateway),
            "complexGateway" => Some(GatewayKind::ComplexGateway),
            _ => None,
        }
    }
}

impl EventKind {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "startEvent" => Some(EventKind::StartEvent),
            "endEvent" => Some(EventKind::EndEvent),
            "intermediateThrowEvent" => Some(EventKind::IntermediateThrowEvent),
            "intermediateCatchEvent" => Some(EventKind::IntermediateCatchEvent),
            "boundaryEvent" => Some(EventKind::BoundaryEvent),
            _ => None,
        }
    }
}

impl NodeKind {
    pub fn is_task(&self) -> bool {
        matches!(self, NodeKind::Task(_))
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            TaskKind::Task => "task",
            TaskKind::UserTask => "userTask",
            TaskKind::ManualTask => "manualTask",
            TaskKind::ServiceTask => "serviceTask",
            TaskKind::BusinessRuleTask => "businessRuleTask",
            TaskKind::ScriptTask => "scriptTask",
            TaskKind::SendTask => "sendTask",
            TaskKind::ReceiveTask => "receiveTask",
            TaskKind::CallActivity => "callActivity",
            TaskKind::SubProcess => "subProcess",
            TaskKind::Transaction => "transaction",
            TaskKind::Other(tag) => tag,
        };
        f.write_str(tag)
    }
}

impl Node {
    /// The node name, or its id when the name is empty.
    pub fn label(&self) -> &str {
        if self.name.is_empty() { &self.id } else { &self.name }
    }

    pub fn task_kind(&self) -> Option<&TaskKind> {
        match &self.kind {
            NodeKind::Task(kind) => Some(kind),
            _ => None,
        }
    }
}

impl ProcessGraph {
    pub fn new(process_id: impl Into<String>, process_name: impl Into<String>) -> Self {
        Self {
            process_id: process_id.into(),
            process_name: process_name.into(),
            ..Default::default()
        }
    }

    /// Adds a node, keeping ids unique. Returns `false` if the id was already taken
    /// or empty, in which case the node is discarded.
    pub fn add_node(&mut self, node: Node) -> bool {
        if node.id.is_empty() || self.index.contains_key(&node.id) {
            return false;
        }
        self.index.insert(node.id.clone(), self.nodes.len());
        self.nodes.push(node);
        true
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Rebuilds the id lookup from `nodes`.
    pub fn reindex(&mut self) {
        self.index = self
            .nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.id.clone(), i))
            .collect();
    }

    pub fn tasks(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(|n| n.kind.is_task())
    }

    pub fn gateway_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| matches!(n.kind, NodeKind::Gateway(_)))
            .count()
    }

    pub fn event_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| matches!(n.kind, NodeKind::Event(_)))
            .count()
    }

    pub fn sequence_flows(&self) -> impl Iterator<Item = &Flow> {
        self.flows.iter().filter(|f| f.kind == FlowKind::Sequence)
    }

    /// Sequence flows whose source or target does not name a node of this graph.
    /// Message flows cross pool boundaries, so only one of their ends is ever local.
    pub fn dangling_flows(&self) -> Vec<&Flow> {
        self.sequence_flows()
            .filter(|f| !self.contains(&f.source_ref) || !self.contains(&f.target_ref))
            .collect()
    }

    /// Number of sequence-flow edges on the shortest path from any root node
    /// (a node with no incoming sequence flow) to every reachable node.
    /// Unreachable nodes are absent from the map.
    pub fn sequence_depths(&self) -> AHashMap<String, usize> {
        let mut successors: AHashMap<&str, Vec<&str>> = AHashMap::new();
        let mut has_incoming: AHashSet<&str> = AHashSet::new();
        for flow in self.sequence_flows() {
            successors
                .entry(flow.source_ref.as_str())
                .or_default()
                .push(flow.target_ref.as_str());
            has_incoming.insert(flow.target_ref.as_str());
        }

        let mut depths: AHashMap<String, usize> = AHashMap::new();
        let mut queue: VecDeque<(&str, usize)> = self
            .nodes
            .iter()
            .filter(|n| !has_incoming.contains(n.id.as_str()))
            .map(|n| (n.id.as_str(), 0))
            .collect();

        while let Some((id, depth)) = queue.pop_front() {
            if depths.contains_key(id) {
                continue;
            }
            depths.insert(id.to_string(), depth);
            if let Some(next) = successors.get(id) {
                for &target in next {
                    if !depths.contains_key(target) {
                        queue.push_back((target, depth + 1));
                    }
                }
            }
        }
        depths
    }
}
