//! Domain entities: projects, phases, pre-allocations and allocation trees
//!
//! Field names and rule tags follow the JSON shape written by the tree editor,
//! so project files deserialize straight into these types.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// How a node claims its share of the parent's amount.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AllocRule {
    /// Absolute amount, independent of the parent's magnitude
    Fixed { value: f64 },
    /// Percent (0-100 scale) of the parent's amount
    Percentage { value: f64 },
    /// Equal share of whatever is left after fixed and percentage siblings
    Remainder,
}

impl AllocRule {
    /// Numeric payload of the rule; `None` for remainder nodes.
    pub fn value(&self) -> Option<f64> {
        match self {
            AllocRule::Fixed { value } | AllocRule::Percentage { value } => Some(*value),
            AllocRule::Remainder => None,
        }
    }
}

/// Node of an allocation tree. Children are owned; order is significant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocNode {
    pub id: String,
    pub name: String,
    pub rule: AllocRule,
    #[serde(default)]
    pub children: Vec<AllocNode>,
}

impl AllocNode {
    /// Create a childless node with a freshly generated id.
    pub fn new(name: impl Into<String>, rule: AllocRule) -> Self {
        Self::with_id(uuid::Uuid::new_v4().to_string(), name, rule)
    }

    pub fn with_id(id: impl Into<String>, name: impl Into<String>, rule: AllocRule) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            rule,
            children: Vec::new(),
        }
    }

    /// Append a child, builder style.
    pub fn with_child(mut self, child: AllocNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = AllocNode>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Off-the-top deduction rule. Percentages refer to the phase's gross value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PreAllocRule {
    Fixed { value: f64 },
    Percentage { value: f64 },
}

impl PreAllocRule {
    pub fn value(&self) -> f64 {
        match self {
            PreAllocRule::Fixed { value } | PreAllocRule::Percentage { value } => *value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreAllocation {
    pub id: String,
    pub name: String,
    pub rule: PreAllocRule,
}

impl PreAllocation {
    pub fn new(id: impl Into<String>, name: impl Into<String>, rule: PreAllocRule) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            rule,
        }
    }
}

/// Per-node layout preference of the tree editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeLayout {
    Collapsed,
    Horizontal,
    #[default]
    Vertical,
}

/// Editor view state. Opaque to the allocation engine.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseView {
    #[serde(default)]
    pub node_layouts: BTreeMap<String, NodeLayout>,
}

impl PhaseView {
    pub fn is_collapsed(&self, node_id: &str) -> bool {
        matches!(self.node_layouts.get(node_id), Some(NodeLayout::Collapsed))
    }
}

/// One allocation round of a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseData {
    pub id: String,
    pub name: String,
    pub phase_value: f64,
    #[serde(default)]
    pub pre_allocations: Vec<PreAllocation>,
    pub root_node: AllocNode,
    #[serde(default)]
    pub view: PhaseView,
}

impl PhaseData {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        phase_value: f64,
        root_node: AllocNode,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            phase_value,
            pre_allocations: Vec::new(),
            root_node,
            view: PhaseView::default(),
        }
    }

    pub fn with_pre_allocation(mut self, pre_allocation: PreAllocation) -> Self {
        self.pre_allocations.push(pre_allocation);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectData {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub phases: Vec<PhaseData>,
}

impl ProjectData {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            phases: Vec::new(),
        }
    }

    pub fn with_phase(mut self, phase: PhaseData) -> Self {
        self.phases.push(phase);
        self
    }

    /// Find a phase by id, falling back to name.
    pub fn find_phase(&self, selector: &str) -> Option<&PhaseData> {
        self.phases
            .iter()
            .find(|p| p.id == selector)
            .or_else(|| self.phases.iter().find(|p| p.name == selector))
    }
}
