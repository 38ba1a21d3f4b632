use anyhow::{ensure, Result};
use candle_core::{DType, Tensor};

/// One graph as tensors.
///
/// - `x`: `(num_nodes, num_features)` f32
/// - `edge_index`: `(2, num_edges)` u32
/// - `edge_weight`: `(num_edges,)` f32
/// - `y`: u32 class ids, one per node or one per graph
/// - masks: `(num_nodes,)` u8, 1 marks membership
#[derive(Debug, Clone)]
pub struct GraphSample {
    pub x: Tensor,
    pub edge_index: Tensor,
    pub edge_weight: Option<Tensor>,
    pub y: Option<Tensor>,
    pub num_classes: Option<usize>,
    pub train_mask: Option<Tensor>,
    pub val_mask: Option<Tensor>,
    pub test_mask: Option<Tensor>,
}

impl GraphSample {
    pub fn new(x: Tensor, edge_index: Tensor) -> Result<Self> {
        ensure!(
            x.rank() == 2,
            "node features must be a matrix, got shape {:?}",
            x.dims()
        );
        ensure!(
            edge_index.rank() == 2 && edge_index.dims()[0] == 2,
            "edge index must have shape (2, num_edges), got {:?}",
            edge_index.dims()
        );
        Ok(Self {
            x: x.to_dtype(DType::F32)?,
            edge_index: edge_index.to_dtype(DType::U32)?,
            edge_weight: None,
            y: None,
            num_classes: None,
            train_mask: None,
            val_mask: None,
            test_mask: None,
        })
    }

    pub fn with_edge_weight(self, edge_weight: Tensor) -> Result<Self> {
        ensure!(
            edge_weight.dims() == [self.num_edges()],
            "edge weight shape {:?} does not match {} edges",
            edge_weight.dims(),
            self.num_edges()
        );
        Ok(Self {
            edge_weight: Some(edge_weight.to_dtype(DType::F32)?),
            ..self
        })
    }

    pub fn with_y(self, y: Tensor) -> Result<Self> {
        Ok(Self {
            y: Some(y.to_dtype(DType::U32)?),
            ..self
        })
    }

    pub fn with_num_classes(self, num_classes: usize) -> Self {
        Self {
            num_classes: Some(num_classes),
            ..self
        }
    }

    /// Attach train/val/test masks, each of length `num_nodes`.
    pub fn with_masks(self, train_mask: Tensor, val_mask: Tensor, test_mask: Tensor) -> Result<Self> {
        let n = self.num_nodes();
        for (name, mask) in [("train", &train_mask), ("val", &val_mask), ("test", &test_mask)] {
            ensure!(
                mask.dims() == [n],
                "{name} mask shape {:?} does not match {n} nodes",
                mask.dims()
            );
        }
        Ok(Self {
            train_mask: Some(train_mask.to_dtype(DType::U8)?),
            val_mask: Some(val_mask.to_dtype(DType::U8)?),
            test_mask: Some(test_mask.to_dtype(DType::U8)?),
            ..self
        })
    }

    pub fn num_nodes(&self) -> usize {
        self.x.dims()[0]
    }
    pub fn num_edges(&self) -> usize {
        self.edge_index.dims()[1]
    }
    pub fn num_node_features(&self) -> usize {
        self.x.dims()[1]
    }
    pub fn has_masks(&self) -> bool {
        self.train_mask.is_some() && self.val_mask.is_some() && self.test_mask.is_some()
    }
}
