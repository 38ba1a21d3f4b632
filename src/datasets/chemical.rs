use std::hash::Hash;

use anyhow::Result;
use candle_core::{Device, Tensor};
use log::debug;
use petgraph::visit::{GraphProp, IntoEdgeReferences, IntoNodeReferences};

use super::in_memory::InMemoryDataset;
use super::traits::Dataset;
use crate::data::GraphSample;
use crate::graph::{node_features, Adjacency, EdgeWeight, NodeAttributes};

/// Pre-built molecule samples collated into one in-memory dataset.
#[derive(Debug, Clone)]
pub struct ChemicalDataset {
    inner: InMemoryDataset,
}

impl ChemicalDataset {
    pub fn new(data_list: &[GraphSample]) -> Result<Self> {
        debug!("chemical dataset from {} samples", data_list.len());
        Ok(Self {
            inner: InMemoryDataset::new(data_list)?,
        })
    }

    pub fn with_transform<F>(self, transform: F) -> Self
    where
        F: Fn(GraphSample) -> Result<GraphSample> + Send + Sync + 'static,
    {
        Self {
            inner: self.inner.with_transform(transform),
        }
    }

    pub fn in_memory(&self) -> &InMemoryDataset {
        &self.inner
    }
    pub fn num_node_features(&self) -> usize {
        self.inner.num_node_features()
    }
    pub fn num_classes(&self) -> Result<usize> {
        self.inner.num_classes()
    }
}

impl Dataset for ChemicalDataset {
    fn len(&self) -> usize {
        self.inner.len()
    }
    fn get(&self, idx: usize) -> Result<GraphSample> {
        self.inner.get(idx)
    }
}

/// Build a graph-level sample from one molecule.
///
/// `label` becomes a one-element `y`. With `weighted`, bond values from the
/// adjacency matrix are kept as `edge_weight`.
pub fn molecule_sample<G>(
    mol: G,
    label: u32,
    attributes: &[&str],
    weighted: bool,
    device: &Device,
) -> Result<GraphSample>
where
    G: IntoNodeReferences + IntoEdgeReferences + GraphProp,
    G::NodeId: Hash + Eq,
    G::NodeWeight: NodeAttributes,
    G::EdgeWeight: EdgeWeight,
{
    let adjacency = Adjacency::from_graph(mol)?;
    let x = node_features(mol, attributes, device)?;
    let sample = GraphSample::new(x, adjacency.edge_index(device)?)?
        .with_y(Tensor::new(&[label], device)?)?;
    if weighted {
        sample.with_edge_weight(adjacency.edge_weight(device)?)
    } else {
        Ok(sample)
    }
}
