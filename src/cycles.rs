//! Recursive type analysis
//!
//! Builds the containment graph of complex types (an edge for every member
//! element whose type is complex), computes strongly connected components
//! and marks the members that close a cycle. An emitter must put those
//! members behind an indirection; every other member can be stored inline.

use std::collections::{BTreeSet, HashMap};

use petgraph::algo::kosaraju_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;

use crate::classifier::{element_type, particle_group};
use crate::components::{ComplexTypeId, ElementId, GroupId, Particle, SchemaModel, TypeRef};

/// A group of mutually recursive types
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecursiveGroup {
    /// Member types, in arena order
    pub types: Vec<ComplexTypeId>,
}

/// Result of the cycle analysis
#[derive(Debug, Clone, Default)]
pub struct CycleAnalysis {
    groups: Vec<RecursiveGroup>,
    boxed: BTreeSet<(ComplexTypeId, ElementId)>,
}

impl CycleAnalysis {
    /// Non-trivial strongly connected components
    pub fn groups(&self) -> &[RecursiveGroup] {
        &self.groups
    }

    /// Whether a member element of a type needs indirection
    pub fn is_boxed(&self, owner: ComplexTypeId, element: ElementId) -> bool {
        self.boxed.contains(&(owner, element))
    }

    /// Whether an element needs indirection in any type that contains it
    pub fn is_boxed_member(&self, element: ElementId) -> bool {
        self.boxed.iter().any(|&(_, e)| e == element)
    }

    /// Number of boxed members
    pub fn boxed_count(&self) -> usize {
        self.boxed.len()
    }

    /// Check if the type graph has no cycles
    pub fn is_acyclic(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Member elements of a type's content, through nested and referenced groups
pub fn member_elements(model: &SchemaModel, id: ComplexTypeId) -> Vec<ElementId> {
    let mut out = Vec::new();
    if let Some(group) = model.complex_type(id).content.and_then(|c| c.group()) {
        collect_elements(model, group, &mut out, &mut Vec::new());
    }
    out
}

fn collect_elements(model: &SchemaModel, group: GroupId, out: &mut Vec<ElementId>, seen: &mut Vec<GroupId>) {
    if seen.contains(&group) {
        return;
    }
    seen.push(group);
    for particle in &model.group(group).particles {
        match particle {
            Particle::Element(id) => out.push(*id),
            other => {
                if let Some(nested) = particle_group(other) {
                    collect_elements(model, nested, out, seen);
                }
            }
        }
    }
}

/// Analyze the classified model and flag recursive types
pub fn analyze(model: &mut SchemaModel) -> CycleAnalysis {
    let mut graph: DiGraph<ComplexTypeId, ElementId> = DiGraph::new();
    let mut nodes: HashMap<ComplexTypeId, NodeIndex> = HashMap::new();

    let types: Vec<ComplexTypeId> = model.complex_types().map(|(id, _)| id).collect();
    for &id in &types {
        nodes.insert(id, graph.add_node(id));
    }
    for &owner in &types {
        for element in member_elements(model, owner) {
            if let Some(TypeRef::Complex(target)) = element_type(model, element) {
                graph.add_edge(nodes[&owner], nodes[&target], element);
            }
        }
    }

    let mut component_of = vec![usize::MAX; graph.node_count()];
    let mut analysis = CycleAnalysis::default();

    for (index, scc) in kosaraju_scc(&graph).into_iter().enumerate() {
        for node in &scc {
            component_of[node.index()] = index;
        }
        let self_loop = scc.len() == 1 && graph.contains_edge(scc[0], scc[0]);
        if scc.len() > 1 || self_loop {
            let mut members: Vec<ComplexTypeId> = scc.iter().map(|n| graph[*n]).collect();
            members.sort();
            analysis.groups.push(RecursiveGroup { types: members });
        }
    }

    for edge in graph.edge_references() {
        // An edge inside one component is either a self loop or part of a non-trivial cycle
        if component_of[edge.source().index()] == component_of[edge.target().index()] {
            analysis.boxed.insert((graph[edge.source()], *edge.weight()));
        }
    }

    analysis.groups.sort_by_key(|g| g.types.first().copied());
    for group in &analysis.groups {
        for &id in &group.types {
            model.complex_type_mut(id).recursive = true;
        }
    }

    tracing::debug!(
        recursive_groups = analysis.groups.len(),
        boxed = analysis.boxed.len(),
        "cycle analysis completed"
    );
    analysis
}
