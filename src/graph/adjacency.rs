use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

use anyhow::{anyhow, Result};
use candle_core::{Device, Tensor};
use log::debug;
use petgraph::visit::{EdgeRef, GraphProp, IntoEdgeReferences, IntoNodeIdentifiers};

use super::EdgeWeight;

/// Adjacency matrix of a graph in coordinate (COO) form.
///
/// Coordinates are sorted row-major (by source, then target). Parallel edges
/// are summed into one coordinate. Undirected edges appear in both
/// directions, self loops once.
#[derive(Debug, Clone, PartialEq)]
pub struct Adjacency {
    pub num_nodes: usize,
    pub rows: Vec<u32>,
    pub cols: Vec<u32>,
    pub values: Vec<f32>,
}

impl Adjacency {
    pub fn from_graph<G>(graph: G) -> Result<Self>
    where
        G: IntoNodeIdentifiers + IntoEdgeReferences + GraphProp,
        G::NodeId: Hash + Eq,
        G::EdgeWeight: EdgeWeight,
    {
        let mut position = HashMap::new();
        for (i, id) in graph.node_identifiers().enumerate() {
            position.insert(id, u32::try_from(i)?);
        }
        let locate = |id: G::NodeId| {
            position
                .get(&id)
                .copied()
                .ok_or_else(|| anyhow!("edge endpoint is not a node of the graph"))
        };

        let directed = graph.is_directed();
        let mut coords: BTreeMap<(u32, u32), f32> = BTreeMap::new();
        for edge in graph.edge_references() {
            let u = locate(edge.source())?;
            let v = locate(edge.target())?;
            let w = edge.weight().weight();
            *coords.entry((u, v)).or_insert(0.0) += w;
            if !directed && u != v {
                *coords.entry((v, u)).or_insert(0.0) += w;
            }
        }

        let mut rows = Vec::with_capacity(coords.len());
        let mut cols = Vec::with_capacity(coords.len());
        let mut values = Vec::with_capacity(coords.len());
        for ((u, v), w) in coords {
            rows.push(u);
            cols.push(v);
            values.push(w);
        }
        debug!(
            "adjacency: {} nodes, {} coordinates ({})",
            position.len(),
            rows.len(),
            if directed { "directed" } else { "undirected" },
        );
        Ok(Self {
            num_nodes: position.len(),
            rows,
            cols,
            values,
        })
    }

    /// Number of stored coordinates.
    pub fn nnz(&self) -> usize {
        self.rows.len()
    }

    /// `(2, nnz)` u32 tensor: sources on row 0, targets on row 1.
    pub fn edge_index(&self, device: &Device) -> Result<Tensor> {
        let mut index = Vec::with_capacity(2 * self.nnz());
        index.extend_from_slice(&self.rows);
        index.extend_from_slice(&self.cols);
        Ok(Tensor::from_vec(index, (2, self.nnz()), device)?)
    }

    /// `(nnz,)` f32 tensor aligned with [`Adjacency::edge_index`].
    pub fn edge_weight(&self, device: &Device) -> Result<Tensor> {
        Ok(Tensor::from_slice(&self.values, self.nnz(), device)?)
    }
}

pub fn create_edge_index<G>(graph: G, device: &Device) -> Result<Tensor>
where
    G: IntoNodeIdentifiers + IntoEdgeReferences + GraphProp,
    G::NodeId: Hash + Eq,
    G::EdgeWeight: EdgeWeight,
{
    Adjacency::from_graph(graph)?.edge_index(device)
}

/// Edge index together with the adjacency values of each coordinate.
pub fn create_weighted_edge_index<G>(graph: G, device: &Device) -> Result<(Tensor, Tensor)>
where
    G: IntoNodeIdentifiers + IntoEdgeReferences + GraphProp,
    G::NodeId: Hash + Eq,
    G::EdgeWeight: EdgeWeight,
{
    let adjacency = Adjacency::from_graph(graph)?;
    Ok((adjacency.edge_index(device)?, adjacency.edge_weight(device)?))
}
