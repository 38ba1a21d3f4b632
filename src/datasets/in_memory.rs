use std::sync::Arc;

use anyhow::{bail, ensure, Result};
use candle_core::{Tensor, D};

use super::collate::{collate, Slices};
use super::traits::Dataset;
use crate::data::GraphSample;

pub type Transform = Arc<dyn Fn(GraphSample) -> Result<GraphSample> + Send + Sync>;

/// Samples collated into one set of buffers, sliced back out on access.
#[derive(Clone)]
pub struct InMemoryDataset {
    data: GraphSample,
    slices: Slices,
    transform: Option<Transform>,
}

impl std::fmt::Debug for InMemoryDataset {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("InMemoryDataset")
            .field("len", &self.slices.len())
            .field("num_nodes", &self.data.num_nodes())
            .field("num_edges", &self.data.num_edges())
            .field("transform", &self.transform.is_some())
            .finish()
    }
}

impl InMemoryDataset {
    pub fn new(samples: &[GraphSample]) -> Result<Self> {
        let (data, slices) = collate(samples, false)?;
        Ok(Self {
            data,
            slices,
            transform: None,
        })
    }

    /// Apply `transform` to every sample returned by [`Dataset::get`].
    pub fn with_transform<F>(self, transform: F) -> Self
    where
        F: Fn(GraphSample) -> Result<GraphSample> + Send + Sync + 'static,
    {
        Self {
            transform: Some(Arc::new(transform)),
            ..self
        }
    }

    /// The collated buffers.
    pub fn data(&self) -> &GraphSample {
        &self.data
    }
    pub fn slices(&self) -> &Slices {
        &self.slices
    }

    pub fn num_node_features(&self) -> usize {
        self.data.num_node_features()
    }

    /// Stored class count, otherwise `max(y) + 1`.
    pub fn num_classes(&self) -> Result<usize> {
        if let Some(num_classes) = self.data.num_classes {
            return Ok(num_classes);
        }
        match &self.data.y {
            Some(y) if y.elem_count() > 0 => {
                let max = y.flatten_all()?.max(D::Minus1)?.to_scalar::<u32>()?;
                Ok(max as usize + 1)
            }
            Some(_) => Ok(0),
            None => bail!("dataset has no labels"),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = Result<GraphSample>> + '_ {
        (0..self.len()).map(|idx| self.get(idx))
    }

    fn slice(&self, idx: usize) -> Result<GraphSample> {
        let narrow = |t: &Tensor, dim: usize, (start, len): (usize, usize)| t.narrow(dim, start, len);
        let nodes = self.slices.node_range(idx);
        let edges = self.slices.edge_range(idx);
        let masks = |m: &Option<Tensor>| m.as_ref().map(|m| narrow(m, 0, nodes)).transpose();

        let y = match (&self.data.y, self.slices.y_range(idx)) {
            (Some(y), Some(range)) => Some(narrow(y, 0, range)?),
            _ => None,
        };
        Ok(GraphSample {
            x: narrow(&self.data.x, 0, nodes)?,
            edge_index: narrow(&self.data.edge_index, 1, edges)?,
            edge_weight: self
                .data
                .edge_weight
                .as_ref()
                .map(|w| narrow(w, 0, edges))
                .transpose()?,
            y,
            num_classes: self.data.num_classes,
            train_mask: masks(&self.data.train_mask)?,
            val_mask: masks(&self.data.val_mask)?,
            test_mask: masks(&self.data.test_mask)?,
        })
    }
}

impl Dataset for InMemoryDataset {
    fn len(&self) -> usize {
        self.slices.len()
    }
    fn get(&self, idx: usize) -> Result<GraphSample> {
        ensure!(
            idx < self.len(),
            "index {idx} is out of range for a dataset of {} samples",
            self.len()
        );
        let sample = self.slice(idx)?;
        match &self.transform {
            Some(transform) => transform(sample),
            None => Ok(sample),
        }
    }
}
