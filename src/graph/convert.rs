use std::hash::Hash;

use anyhow::{anyhow, ensure, Result};
use candle_core::{Device, Tensor};
use petgraph::visit::{GraphProp, IntoEdgeReferences, IntoNodeReferences, NodeRef};

use super::{Adjacency, EdgeWeight, NodeAttributes};
use crate::data::GraphSample;

/// Stack the attributes named by `keys` into a `(num_nodes, width)` matrix.
///
/// Each row concatenates the node's attribute values in key order. Every
/// node must carry every key with the same length.
pub fn node_features<G>(graph: G, keys: &[&str], device: &Device) -> Result<Tensor>
where
    G: IntoNodeReferences,
    G::NodeWeight: NodeAttributes,
{
    let mut features = Vec::new();
    let mut width = None;
    let mut num_nodes = 0;
    for node in graph.node_references() {
        let start = features.len();
        for key in keys {
            let value = node
                .weight()
                .attribute(key)
                .ok_or_else(|| anyhow!("node {num_nodes} has no attribute {key:?}"))?;
            features.extend_from_slice(value);
        }
        let row_width = features.len() - start;
        match width {
            None => width = Some(row_width),
            Some(expected) => ensure!(
                expected == row_width,
                "node {num_nodes} has {row_width} feature values, expected {expected}"
            ),
        }
        num_nodes += 1;
    }
    Ok(Tensor::from_vec(
        features,
        (num_nodes, width.unwrap_or(0)),
        device,
    )?)
}

/// Convert a graph into a [`GraphSample`] with node features taken from
/// `attributes` and the edge index taken from its adjacency matrix.
pub fn from_graph<G>(graph: G, attributes: &[&str], device: &Device) -> Result<GraphSample>
where
    G: IntoNodeReferences + IntoEdgeReferences + GraphProp,
    G::NodeId: Hash + Eq,
    G::NodeWeight: NodeAttributes,
    G::EdgeWeight: EdgeWeight,
{
    let x = node_features(graph, attributes, device)?;
    let edge_index = Adjacency::from_graph(graph)?.edge_index(device)?;
    GraphSample::new(x, edge_index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use petgraph::graph::UnGraph;

    fn atom(charge: f32, one_hot: [f32; 2]) -> HashMap<String, Vec<f32>> {
        HashMap::from([
            ("charge".to_owned(), vec![charge]),
            ("one_hot".to_owned(), one_hot.to_vec()),
        ])
    }

    #[test]
    fn features_concatenate_in_key_order() -> Result<()> {
        let mut g = UnGraph::<_, ()>::new_undirected();
        let a = g.add_node(atom(1.0, [1.0, 0.0]));
        let b = g.add_node(atom(-1.0, [0.0, 1.0]));
        g.add_edge(a, b, ());

        let sample = from_graph(&g, &["one_hot", "charge"], &Device::Cpu)?;
        assert_eq!(sample.x.dims(), &[2, 3]);
        assert_eq!(
            sample.x.to_vec2::<f32>()?,
            vec![vec![1.0, 0.0, 1.0], vec![0.0, 1.0, -1.0]]
        );
        assert_eq!(sample.edge_index.to_vec2::<u32>()?, vec![vec![0, 1], vec![1, 0]]);
        Ok(())
    }

    #[test]
    fn missing_attribute_is_an_error() {
        let mut g = UnGraph::<_, ()>::new_undirected();
        g.add_node(atom(0.0, [1.0, 0.0]));
        g.add_node(HashMap::from([("charge".to_owned(), vec![0.0])]));
        assert!(node_features(&g, &["charge", "one_hot"], &Device::Cpu).is_err());
    }

    #[test]
    fn ragged_attribute_is_an_error() {
        let mut g = UnGraph::<_, ()>::new_undirected();
        g.add_node(HashMap::from([("v".to_owned(), vec![0.0, 1.0])]));
        g.add_node(HashMap::from([("v".to_owned(), vec![0.0])]));
        assert!(node_features(&g, &["v"], &Device::Cpu).is_err());
    }

    #[test]
    fn no_keys_gives_empty_rows() -> Result<()> {
        let mut g = UnGraph::<(), ()>::new_undirected();
        g.add_node(());
        g.add_node(());
        let x = node_features(&g, &[], &Device::Cpu)?;
        assert_eq!(x.dims(), &[2, 0]);
        Ok(())
    }
}
