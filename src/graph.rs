mod attributes;
pub use attributes::{EdgeWeight, NodeAttributes};

mod adjacency;
pub use adjacency::{create_edge_index, create_weighted_edge_index, Adjacency};

mod convert;
pub use convert::{from_graph, node_features};
