use std::collections::HashMap;

use candle_core::Device;
use petgraph::graph::UnGraph;

use candle_graph_datasets::datasets::{DataLoader, GdaDataset};
use candle_graph_datasets::utils::mask_to_index;

// RUST_LOG=info cargo run --example gda_split
fn main() -> anyhow::Result<()> {
    env_logger::init();
    let device = Device::Cpu;

    // gene-disease association graph: two communities joined by one bridge
    let mut g = UnGraph::new_undirected();
    let mut labels = Vec::new();
    let nodes: Vec<_> = (0..30)
        .map(|i| {
            let community = (i >= 15) as u32;
            labels.push(community);
            g.add_node(HashMap::from([
                ("expression".to_owned(), vec![i as f32 / 30.0]),
                ("community".to_owned(), vec![community as f32]),
            ]))
        })
        .collect();
    for i in 0..15 {
        g.add_edge(nodes[i], nodes[(i + 1) % 15], ());
        g.add_edge(nodes[15 + i], nodes[15 + (i + 1) % 15], ());
    }
    g.add_edge(nodes[0], nodes[15], ());

    let dataset = GdaDataset::with_default_classes(&g, &labels, &["expression", "community"], &device)?;
    let data = dataset.data();
    println!(
        "nodes: {} edges: {} features: {} classes: {}",
        data.num_nodes(),
        data.num_edges(),
        dataset.num_node_features(),
        dataset.num_classes()?,
    );
    for (name, mask) in [
        ("train", &data.train_mask),
        ("val", &data.val_mask),
        ("test", &data.test_mask),
    ] {
        if let Some(mask) = mask {
            println!("{name:5}: {:?}", mask_to_index(mask)?.to_vec1::<u32>()?);
        }
    }

    for batch in DataLoader::full_batch(&dataset) {
        let batch = batch?;
        println!("full batch of {} graph(s)", batch.num_graphs());
    }
    Ok(())
}
