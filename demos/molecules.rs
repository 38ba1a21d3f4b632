use std::collections::BTreeMap;

use candle_core::Device;
use petgraph::graph::UnGraph;

use candle_graph_datasets::datasets::{molecule_sample, ChemicalDataset, DataLoader, Dataset};

type Atom = BTreeMap<String, Vec<f32>>;

fn atom(number: f32, aromatic: bool) -> Atom {
    BTreeMap::from([
        ("atomic_number".to_owned(), vec![number]),
        ("aromatic".to_owned(), vec![aromatic as u8 as f32]),
    ])
}

// carbon ring of `n` atoms, with alternating bond orders when aromatic
fn ring(n: usize, aromatic: bool) -> UnGraph<Atom, f32> {
    let mut g = UnGraph::new_undirected();
    let atoms: Vec<_> = (0..n).map(|_| g.add_node(atom(6.0, aromatic))).collect();
    for i in 0..n {
        let order = if aromatic && i % 2 == 0 { 2.0 } else { 1.0 };
        g.add_edge(atoms[i], atoms[(i + 1) % n], order);
    }
    g
}

// cargo run --example molecules
fn main() -> anyhow::Result<()> {
    env_logger::init();
    let device = Device::Cpu;

    let keys = ["atomic_number", "aromatic"];
    let data_list = vec![
        molecule_sample(&ring(6, true), 1, &keys, true, &device)?,
        molecule_sample(&ring(6, false), 0, &keys, true, &device)?,
        molecule_sample(&ring(5, false), 0, &keys, true, &device)?,
        molecule_sample(&ring(7, false), 0, &keys, true, &device)?,
    ];
    let dataset = ChemicalDataset::new(&data_list)?;
    println!(
        "{} molecules, {} node features, {} classes",
        dataset.len(),
        dataset.num_node_features(),
        dataset.num_classes()?
    );
    println!("node offsets: {:?}", dataset.in_memory().slices().nodes);

    for (i, batch) in DataLoader::new(&dataset, 3).shuffled(0).enumerate() {
        let batch = batch?;
        println!(
            "batch {i}: {} graphs, {} nodes, {} edges",
            batch.num_graphs(),
            batch.data.num_nodes(),
            batch.data.num_edges()
        );
    }
    Ok(())
}
