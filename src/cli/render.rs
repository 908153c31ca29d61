//! Rendering of computed allocation trees with termtree.

use colored::Colorize;
use termtree::Tree;

use crate::cli::output::{format_money, format_percent};
use crate::config::DisplayConfig;
use crate::domain::{AllocNode, AllocRule, CalculationMap, NodeStatus, PhaseView};

/// Renders one phase tree, annotated with its calculation results.
pub struct TreeRenderer<'a> {
    pub results: &'a CalculationMap,
    pub view: &'a PhaseView,
    pub display: &'a DisplayConfig,
    /// Ignore collapsed layouts and show every node
    pub expand: bool,
}

impl TreeRenderer<'_> {
    /// Build the display tree. `root_label` replaces the root's (usually empty) name.
    pub fn render(&self, root: &AllocNode, root_label: &str) -> Tree<String> {
        let label = format!("{} {}", root_label.bold(), self.amounts(root, true));
        self.with_children(root, Tree::new(label))
    }

    fn render_node(&self, node: &AllocNode) -> Tree<String> {
        let label = format!(
            "{} [{}] {}",
            node.name,
            rule_label(&node.rule),
            self.amounts(node, false)
        );
        self.with_children(node, Tree::new(label))
    }

    fn with_children(&self, node: &AllocNode, mut tree: Tree<String>) -> Tree<String> {
        if node.is_leaf() {
            return tree;
        }
        if !self.expand && self.view.is_collapsed(&node.id) {
            tree.push(Tree::new(format!("… {} hidden", node.children.len())));
            return tree;
        }
        for child in &node.children {
            tree.push(self.render_node(child));
        }
        tree
    }

    fn amounts(&self, node: &AllocNode, is_root: bool) -> String {
        let Some(result) = self.results.get(&node.id) else {
            return "(not calculated)".dimmed().to_string();
        };

        let mut text = format_money(result.amount, self.display);
        if !is_root {
            text = format!("{} ({})", text, format_percent(result.percent_of_parent));
        }
        if !node.is_leaf() && result.unallocated.abs() > crate::domain::EPSILON {
            text = format!(
                "{}, unallocated {}",
                text,
                format_money(result.unallocated, self.display)
            );
        }

        match result.status() {
            NodeStatus::Error => format!("{} {}", text.red(), "✗".red()),
            NodeStatus::Warning => format!("{} {}", text.yellow(), "!".yellow()),
            NodeStatus::Ok => text,
        }
    }
}

/// Short description of a rule, e.g. `fixed 300`, `50%`, `rest`.
pub fn rule_label(rule: &AllocRule) -> String {
    match rule {
        AllocRule::Fixed { value } => format!("fixed {}", value),
        AllocRule::Percentage { value } => format!("{}%", value),
        AllocRule::Remainder => "rest".to_string(),
    }
}
