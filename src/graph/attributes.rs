use std::collections::{BTreeMap, HashMap};

/// Named numeric attributes carried by a node.
///
/// A scalar attribute is a slice of length one. Attributes selected for the
/// feature matrix are concatenated in the order of the requested keys.
pub trait NodeAttributes {
    fn attribute(&self, key: &str) -> Option<&[f32]>;
}

impl NodeAttributes for HashMap<String, Vec<f32>> {
    fn attribute(&self, key: &str) -> Option<&[f32]> {
        self.get(key).map(Vec::as_slice)
    }
}

impl NodeAttributes for BTreeMap<String, Vec<f32>> {
    fn attribute(&self, key: &str) -> Option<&[f32]> {
        self.get(key).map(Vec::as_slice)
    }
}

// Featureless nodes; only an empty key list can be requested.
impl NodeAttributes for () {
    fn attribute(&self, _key: &str) -> Option<&[f32]> {
        None
    }
}

/// Value stored in the adjacency matrix for an edge.
pub trait EdgeWeight {
    fn weight(&self) -> f32;
}

impl EdgeWeight for () {
    fn weight(&self) -> f32 {
        1.0
    }
}

macro_rules! numeric_edge_weight {
    ($($t:ty),*) => {
        $(
            impl EdgeWeight for $t {
                fn weight(&self) -> f32 {
                    *self as f32
                }
            }
        )*
    };
}
numeric_edge_weight!(f32, f64, u8, u16, u32, u64, usize, i32, i64);
