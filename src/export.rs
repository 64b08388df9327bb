// src/export.rs

//! Graphviz export of the dependency graph.
//!
//! One node per task, one edge per producer → consumer relation. Edges are
//! labelled with the linking resource and, when the resource declares
//! fields, with those field names.

use std::collections::HashMap;

use petgraph::dot::{Config, Dot};
use petgraph::graph::{DiGraph, NodeIndex};

use crate::errors::Result;
use crate::pipeline::Pipeline;

pub fn to_dot(pipeline: &Pipeline) -> Result<String> {
    let graph = pipeline.graph()?;

    let mut fields: HashMap<&str, &[String]> = HashMap::new();
    for task in pipeline.tasks() {
        for resource in task.outputs() {
            if let Some(f) = resource.fields() {
                fields.insert(resource.name(), f);
            }
        }
    }

    let mut dot_graph: DiGraph<String, String> = DiGraph::new();
    let mut node_indices: HashMap<&str, NodeIndex> = HashMap::new();

    for name in graph.tasks() {
        let idx = dot_graph.add_node(name.to_string());
        node_indices.insert(name, idx);
    }

    for edge in graph.edges() {
        let (Some(&from), Some(&to)) = (
            node_indices.get(edge.producer.as_str()),
            node_indices.get(edge.consumer.as_str()),
        ) else {
            continue;
        };
        let label = match fields.get(edge.resource.as_str()) {
            Some(f) if !f.is_empty() => format!("{}\n{}", edge.resource, f.join(", ")),
            _ => edge.resource.clone(),
        };
        dot_graph.add_edge(from, to, label);
    }

    let dot = Dot::with_attr_getters(
        &dot_graph,
        &[Config::EdgeNoLabel],
        &|_, edge| format!("label = \"{}\" fontsize = 10", escape(edge.weight())),
        &|_, _| "shape = box".to_string(),
    );

    Ok(format!("{dot}"))
}

fn escape(label: &str) -> String {
    label
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}
