use anyhow::Result;

use crate::data::GraphSample;

/// Indexable collection of graph samples.
pub trait Dataset {
    fn len(&self) -> usize;
    fn get(&self, idx: usize) -> Result<GraphSample>;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
