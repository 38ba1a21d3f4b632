use anyhow::Result;
use candle_core::Tensor;
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

use super::collate::collate;
use super::traits::Dataset;
use crate::data::GraphSample;

/// Samples merged into one disconnected graph.
///
/// `batch[n]` is the position within the batch of the sample that node `n`
/// belongs to; `ptr` holds the node offset of each sample.
#[derive(Debug, Clone)]
pub struct Batch {
    pub data: GraphSample,
    pub batch: Tensor,
    pub ptr: Vec<usize>,
}

impl Batch {
    pub fn from_samples(samples: &[GraphSample]) -> Result<Self> {
        let (data, slices) = collate(samples, true)?;
        let mut batch = Vec::with_capacity(data.num_nodes());
        for (graph, w) in slices.nodes.windows(2).enumerate() {
            batch.extend(std::iter::repeat(graph as u32).take(w[1] - w[0]));
        }
        let batch = Tensor::from_vec(batch, data.num_nodes(), data.x.device())?;
        Ok(Self {
            data,
            batch,
            ptr: slices.nodes,
        })
    }

    pub fn num_graphs(&self) -> usize {
        self.ptr.len() - 1
    }
}

pub struct DataLoader<'a, T> {
    dataset: &'a T,
    batch_size: usize,
    order: Vec<usize>,
    position: usize,
}

impl<'a, T: Dataset + 'a> DataLoader<'a, T> {
    pub fn new(dataset: &'a T, batch_size: usize) -> Self {
        Self {
            dataset,
            batch_size: batch_size.max(1),
            order: (0..dataset.len()).collect(),
            position: 0,
        }
    }

    /// One batch holding the whole dataset.
    pub fn full_batch(dataset: &'a T) -> Self {
        Self::new(dataset, dataset.len())
    }

    /// Visit samples in an order shuffled by `seed`.
    pub fn shuffled(mut self, seed: u64) -> Self {
        self.order.shuffle(&mut StdRng::seed_from_u64(seed));
        self
    }

    pub fn num_batches(&self) -> usize {
        self.order.len().div_ceil(self.batch_size)
    }
}

impl<'a, T: Dataset> Iterator for DataLoader<'a, T> {
    type Item = Result<Batch>;
    fn next(&mut self) -> Option<Self::Item> {
        if self.position >= self.order.len() {
            return None;
        }
        let end = (self.position + self.batch_size).min(self.order.len());
        let chunk = &self.order[self.position..end];
        self.position = end;
        let samples: Result<Vec<_>> = chunk.iter().map(|&idx| self.dataset.get(idx)).collect();
        Some(samples.and_then(|samples| Batch::from_samples(&samples)))
    }
}
