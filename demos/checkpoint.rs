use fcnet::{checkpoint, Network, NetworkDescriptor};

/// Builds an MNIST-sized network, checkpoints it, and restores it.
fn main() {
    env_logger::init();

    let descriptor = NetworkDescriptor::new(784, 10, vec![128, 64]).expect("valid descriptor");
    let mut network = Network::new(descriptor, 0.2);

    let path = std::env::temp_dir().join("fcnet-demo-checkpoint.json");
    checkpoint::save(&network, &path).expect("save checkpoint");
    println!("saved checkpoint to {}", path.display());

    let mut restored = checkpoint::load(&path).expect("load checkpoint");
    println!("restored hidden sizes: {:?}", restored.descriptor().hidden_sizes);

    let input: Vec<f64> = (0..784).map(|i| (i % 3) as f64 / 3.0).collect();
    let a = network.forward(&input);
    let b = restored.forward(&input);
    let max_diff = a
        .iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).abs())
        .fold(0.0_f64, f64::max);
    println!("max forward-pass difference after reload: {max_diff:e}");

    std::fs::remove_file(&path).ok();
}
