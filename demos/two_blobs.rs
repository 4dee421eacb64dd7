use fcnet::{one_hot, Network, NetworkDescriptor, Sgd, TrainConfig, train_loop};
use rand::Rng;

/// Trains a small classifier to separate two Gaussian-ish blobs in 2D.
fn main() {
    env_logger::init();

    let mut rng = rand::thread_rng();
    let mut inputs = Vec::new();
    let mut labels = Vec::new();
    for _ in 0..200 {
        let jx: f64 = rng.gen::<f64>() - 0.5;
        let jy: f64 = rng.gen::<f64>() - 0.5;
        inputs.push(vec![1.5 + jx, 1.5 + jy]);
        labels.push(one_hot(0, 2));
        inputs.push(vec![-1.5 + jx, -1.5 + jy]);
        labels.push(one_hot(1, 2));
    }

    let descriptor = NetworkDescriptor::new(2, 2, vec![16, 8]).expect("valid descriptor");
    let mut network = Network::new(descriptor, 0.1);

    let optimizer = Sgd::new(0.2);
    let config = TrainConfig::new(20, 8);
    let loss = train_loop(&mut network, &inputs, &labels, None, None, &optimizer, &config);
    println!("final training loss: {loss:.6}");

    for point in [[1.4, 1.6], [-1.2, -1.7], [2.0, 1.0]] {
        let log_probs = network.forward(&point);
        let probs: Vec<f64> = log_probs.iter().map(|lp| lp.exp()).collect();
        println!(
            "({:+.1}, {:+.1}) -> class {} with p = {:.4}",
            point[0],
            point[1],
            network.predict(&point),
            probs.iter().cloned().fold(f64::MIN, f64::max),
        );
    }
}
