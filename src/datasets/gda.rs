use std::hash::Hash;

use anyhow::{ensure, Result};
use candle_core::{Device, Tensor};
use log::info;
use petgraph::visit::{GraphProp, IntoEdgeReferences, IntoNodeReferences};

use super::in_memory::InMemoryDataset;
use super::split::{attach_split_masks, stratified_split, NodeSplit, SplitConfig};
use super::traits::Dataset;
use crate::data::GraphSample;
use crate::graph::{from_graph, EdgeWeight, NodeAttributes};

/// A single graph prepared for node classification.
///
/// Nodes are labelled and split into train/val/test masks with a stratified
/// 70/15/15 split.
#[derive(Debug, Clone)]
pub struct GdaDataset {
    inner: InMemoryDataset,
    split: NodeSplit,
}

impl GdaDataset {
    pub const DEFAULT_NUM_CLASSES: usize = 2;

    pub fn new<G>(
        graph: G,
        labels: &[u32],
        attributes: &[&str],
        num_classes: usize,
        device: &Device,
    ) -> Result<Self>
    where
        G: IntoNodeReferences + IntoEdgeReferences + GraphProp,
        G::NodeId: Hash + Eq,
        G::NodeWeight: NodeAttributes,
        G::EdgeWeight: EdgeWeight,
    {
        Self::with_config(
            graph,
            labels,
            attributes,
            num_classes,
            &SplitConfig::default(),
            device,
        )
    }

    /// Binary node classification.
    pub fn with_default_classes<G>(
        graph: G,
        labels: &[u32],
        attributes: &[&str],
        device: &Device,
    ) -> Result<Self>
    where
        G: IntoNodeReferences + IntoEdgeReferences + GraphProp,
        G::NodeId: Hash + Eq,
        G::NodeWeight: NodeAttributes,
        G::EdgeWeight: EdgeWeight,
    {
        Self::new(graph, labels, attributes, Self::DEFAULT_NUM_CLASSES, device)
    }

    pub fn with_config<G>(
        graph: G,
        labels: &[u32],
        attributes: &[&str],
        num_classes: usize,
        config: &SplitConfig,
        device: &Device,
    ) -> Result<Self>
    where
        G: IntoNodeReferences + IntoEdgeReferences + GraphProp,
        G::NodeId: Hash + Eq,
        G::NodeWeight: NodeAttributes,
        G::EdgeWeight: EdgeWeight,
    {
        let sample = from_graph(graph, attributes, device)?;
        let num_nodes = sample.num_nodes();
        ensure!(
            labels.len() == num_nodes,
            "{} labels for a graph of {num_nodes} nodes",
            labels.len()
        );
        let y = Tensor::from_slice(labels, num_nodes, device)?;
        let sample = sample.with_y(y)?.with_num_classes(num_classes);

        let split = stratified_split(labels, config)?;
        info!(
            "node split of {num_nodes} nodes: train {}, val {}, test {}",
            split.train.len(),
            split.val.len(),
            split.test.len()
        );
        let sample = attach_split_masks(sample, &split, device)?;
        Ok(Self {
            inner: InMemoryDataset::new(&[sample])?,
            split,
        })
    }

    /// The pre-split graph.
    pub fn data(&self) -> &GraphSample {
        self.inner.data()
    }
    pub fn split(&self) -> &NodeSplit {
        &self.split
    }
    pub fn num_node_features(&self) -> usize {
        self.inner.num_node_features()
    }
    pub fn num_classes(&self) -> Result<usize> {
        self.inner.num_classes()
    }
}

impl Dataset for GdaDataset {
    fn len(&self) -> usize {
        self.inner.len()
    }
    fn get(&self, idx: usize) -> Result<GraphSample> {
        self.inner.get(idx)
    }
}
