use anyhow::{ensure, Result};
use candle_core::Tensor;
use log::debug;

use crate::data::GraphSample;

/// Offset tables of a collated dataset.
///
/// Each table has `len + 1` entries starting at 0; sample `i` occupies
/// `table[i]..table[i + 1]` of the matching buffer. Masks share the node
/// table, edge weights the edge table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slices {
    pub nodes: Vec<usize>,
    pub edges: Vec<usize>,
    pub y: Option<Vec<usize>>,
}

impl Slices {
    pub fn len(&self) -> usize {
        self.nodes.len() - 1
    }
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
    pub fn node_range(&self, idx: usize) -> (usize, usize) {
        (self.nodes[idx], self.nodes[idx + 1] - self.nodes[idx])
    }
    pub fn edge_range(&self, idx: usize) -> (usize, usize) {
        (self.edges[idx], self.edges[idx + 1] - self.edges[idx])
    }
    pub fn y_range(&self, idx: usize) -> Option<(usize, usize)> {
        self.y.as_ref().map(|y| (y[idx], y[idx + 1] - y[idx]))
    }
}

fn all_or_none(samples: &[GraphSample], name: &str, present: impl Fn(&GraphSample) -> bool) -> Result<bool> {
    let count = samples.iter().filter(|s| present(s)).count();
    ensure!(
        count == 0 || count == samples.len(),
        "{name} is set on {count} of {} samples",
        samples.len()
    );
    Ok(count > 0)
}

fn cat_optional(parts: Vec<Option<&Tensor>>, dim: usize) -> Result<Option<Tensor>> {
    let parts: Option<Vec<&Tensor>> = parts.into_iter().collect();
    match parts {
        Some(parts) => Ok(Some(Tensor::cat(&parts, dim)?)),
        None => Ok(None),
    }
}

/// Merge samples into one [`GraphSample`] plus its [`Slices`].
///
/// Node-level tensors are concatenated along dim 0 and the edge index along
/// dim 1. With `increment`, each sample's edge index is shifted by the number
/// of nodes before it, so the result is one disconnected graph.
pub fn collate(samples: &[GraphSample], increment: bool) -> Result<(GraphSample, Slices)> {
    ensure!(!samples.is_empty(), "cannot collate an empty list of samples");
    let has_weight = all_or_none(samples, "edge_weight", |s| s.edge_weight.is_some())?;
    let has_y = all_or_none(samples, "y", |s| s.y.is_some())?;
    let has_masks = all_or_none(samples, "train/val/test masks", GraphSample::has_masks)?;

    let mut nodes = vec![0];
    let mut edges = vec![0];
    let mut ys = vec![0];
    let mut edge_indices = Vec::with_capacity(samples.len());
    for sample in samples {
        let offset = nodes[nodes.len() - 1];
        let edge_index = if increment && offset > 0 {
            let shift = Tensor::new(u32::try_from(offset)?, sample.edge_index.device())?;
            sample.edge_index.broadcast_add(&shift)?
        } else {
            sample.edge_index.clone()
        };
        edge_indices.push(edge_index);
        nodes.push(offset + sample.num_nodes());
        edges.push(edges[edges.len() - 1] + sample.num_edges());
        if let Some(y) = &sample.y {
            ys.push(ys[ys.len() - 1] + y.dims().first().copied().unwrap_or(1));
        }
    }

    let xs = samples.iter().map(|s| &s.x).collect::<Vec<_>>();
    let data = GraphSample {
        x: Tensor::cat(&xs, 0)?,
        edge_index: Tensor::cat(&edge_indices, 1)?,
        edge_weight: cat_optional(samples.iter().map(|s| s.edge_weight.as_ref()).collect(), 0)?,
        y: cat_optional(samples.iter().map(|s| s.y.as_ref()).collect(), 0)?,
        num_classes: samples.iter().filter_map(|s| s.num_classes).max(),
        train_mask: cat_optional(samples.iter().map(|s| s.train_mask.as_ref()).collect(), 0)?,
        val_mask: cat_optional(samples.iter().map(|s| s.val_mask.as_ref()).collect(), 0)?,
        test_mask: cat_optional(samples.iter().map(|s| s.test_mask.as_ref()).collect(), 0)?,
    };
    debug!(
        "collated {} samples: {} nodes, {} edges (weights: {has_weight}, y: {has_y}, masks: {has_masks})",
        samples.len(),
        data.num_nodes(),
        data.num_edges(),
    );
    let slices = Slices {
        nodes,
        edges,
        y: has_y.then_some(ys),
    };
    Ok((data, slices))
}
