pub mod data;
pub mod datasets;
pub mod graph;
pub mod utils;

pub use data::GraphSample;

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use anyhow::Result;
    use candle_core::Device;
    use petgraph::graph::Graph;

    use super::datasets::{ChemicalDataset, DataLoader, Dataset, GdaDataset};
    use super::graph::{create_weighted_edge_index, from_graph};

    type Node = HashMap<String, Vec<f32>>;

    fn node(feature: f32) -> Node {
        HashMap::from([("feature".to_owned(), vec![feature])])
    }

    // directed interaction graph; the adjacency is not symmetrized
    fn interactions(n: usize) -> Graph<Node, f32> {
        let mut g = Graph::new();
        let nodes: Vec<_> = (0..n).map(|i| g.add_node(node(i as f32))).collect();
        for i in 0..n {
            g.add_edge(nodes[i], nodes[(i + 3) % n], 0.5);
            g.add_edge(nodes[i], nodes[(i + 7) % n], 1.5);
        }
        g
    }

    #[test]
    fn node_classification_pipeline() -> Result<()> {
        let device = Device::Cpu;
        let g = interactions(20);
        let labels: Vec<u32> = (0..20).map(|i| (i % 4 == 0) as u32).collect();
        let dataset = GdaDataset::with_default_classes(&g, &labels, &["feature"], &device)?;

        let (edge_index, edge_weight) = create_weighted_edge_index(&g, &device)?;
        assert_eq!(edge_index.dims(), &[2, 40]);
        assert_eq!(edge_weight.dims(), &[40]);

        let batch = DataLoader::full_batch(&dataset)
            .next()
            .transpose()?
            .map(|b| b.data.edge_index.to_vec2::<u32>())
            .transpose()?;
        assert_eq!(batch, Some(edge_index.to_vec2::<u32>()?));

        let split = dataset.split();
        assert_eq!(split.train.len() + split.val.len() + split.test.len(), 20);
        assert_eq!(split.train.len(), 14);
        Ok(())
    }

    #[test]
    fn graphs_as_molecules() -> Result<()> {
        let device = Device::Cpu;
        let samples = [5, 8, 13]
            .into_iter()
            .map(|n| from_graph(&interactions(n), &["feature"], &device))
            .collect::<Result<Vec<_>>>()?;
        let dataset = ChemicalDataset::new(&samples)?;
        assert_eq!(dataset.len(), 3);
        assert_eq!(dataset.get(2)?.num_nodes(), 13);
        assert_eq!(dataset.get(0)?.num_edges(), 10);
        Ok(())
    }
}
