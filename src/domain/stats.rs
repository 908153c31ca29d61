//! Cross-project aggregation of leaf amounts by recipient name.

use std::cmp::Ordering;
use std::collections::HashMap;

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, instrument};

use crate::domain::allocation::calculate_tree;
use crate::domain::arena::AllocArena;
use crate::domain::model::ProjectData;
use crate::domain::preallocation::compute_rest_value;

/// Where one contribution to a recipient's total came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceData {
    pub project_id: String,
    pub phase_id: String,
    /// Ancestor names between the root and the leaf, both excluded
    pub path: Vec<String>,
    pub amount: f64,
}

/// Aggregated total for one recipient name.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonStat {
    pub name: String,
    pub total_amount: f64,
    pub sources: Vec<SourceData>,
}

/// Run every phase of every project and sum leaf amounts per recipient name.
///
/// Sorted by total descending, then name ascending. Projects are computed in
/// parallel but merged in input order, so `sources` are ordered by project,
/// phase and preorder leaf position.
#[instrument(level = "debug", skip(projects), fields(projects = projects.len()))]
pub fn aggregate_stats(projects: &[ProjectData]) -> Vec<PersonStat> {
    let contributions: Vec<Vec<(String, SourceData)>> =
        projects.par_iter().map(project_contributions).collect();

    let mut by_name: HashMap<String, PersonStat> = HashMap::new();
    for (name, source) in contributions.into_iter().flatten() {
        let stat = by_name.entry(name).or_insert_with_key(|name| PersonStat {
            name: name.clone(),
            total_amount: 0.0,
            sources: Vec::new(),
        });
        stat.total_amount += source.amount;
        stat.sources.push(source);
    }

    let mut stats: Vec<PersonStat> = by_name.into_values().collect();
    stats.sort_by(compare_stats);
    debug!("aggregate_stats: {} recipients", stats.len());
    stats
}

fn compare_stats(a: &PersonStat, b: &PersonStat) -> Ordering {
    b.total_amount
        .total_cmp(&a.total_amount)
        .then_with(|| a.name.cmp(&b.name))
}

fn project_contributions(project: &ProjectData) -> Vec<(String, SourceData)> {
    let mut out = Vec::new();
    for phase in &project.phases {
        let rest_value = compute_rest_value(phase.phase_value, &phase.pre_allocations);
        let results = calculate_tree(&phase.root_node, rest_value);

        for leaf in AllocArena::from_root(&phase.root_node).leaves() {
            // Only reachable for trees changed between calculation and traversal
            let Some(result) = results.get(&leaf.node.id) else {
                continue;
            };
            out.push((
                leaf.node.name.clone(),
                SourceData {
                    project_id: project.id.clone(),
                    phase_id: phase.id.clone(),
                    path: leaf.path,
                    amount: result.amount,
                },
            ));
        }
    }
    out
}
