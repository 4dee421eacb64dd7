use std::sync::atomic::Ordering;
use std::time::Instant;

use log::info;
use rand::seq::SliceRandom;

use crate::loss::nll::NllLoss;
use crate::network::network::{argmax, Mode, Network};
use crate::optim::sgd::Sgd;
use crate::train::epoch_stats::EpochStats;
use crate::train::train_config::TrainConfig;

// ---------------------------------------------------------------------------
// Public entry point
// ---------------------------------------------------------------------------

/// Trains `network` for `config.epochs` epochs and returns the mean training
/// loss of the **last completed epoch**.
///
/// Training is strictly sequential: each mini-batch is fully processed
/// (accumulators cleared, forward, loss, backward, update) before the next
/// begins. The network is left in `Mode::Eval` when the loop returns.
///
/// # Arguments
/// - `network`      — mutable reference to the network; modified in place
/// - `train_inputs` — training samples, each a `Vec<f64>` of length `input_size`
/// - `train_labels` — one-hot targets, same length as `train_inputs`
/// - `val_inputs`   — optional validation samples
/// - `val_labels`   — optional validation targets (required iff `val_inputs` is `Some`)
/// - `optimizer`    — SGD optimizer (carries learning rate)
/// - `config`       — hyperparameters, optional progress channel, optional stop flag
///
/// # Early termination
/// The loop breaks before the next epoch if:
/// - the `progress_tx` receiver has been dropped, **or**
/// - `config.stop_flag` is set to `true`.
///
/// # Panics
/// Panics if `train_inputs` is empty, lengths mismatch, or `batch_size == 0`.
/// Arithmetic failures (non-finite loss) are not caught or retried; they
/// propagate to the caller through the returned loss values.
pub fn train_loop(
    network: &mut Network,
    train_inputs: &[Vec<f64>],
    train_labels: &[Vec<f64>],
    val_inputs: Option<&[Vec<f64>]>,
    val_labels: Option<&[Vec<f64>]>,
    optimizer: &Sgd,
    config: &TrainConfig,
) -> f64 {
    assert!(!train_inputs.is_empty(), "train_inputs must not be empty");
    assert_eq!(
        train_inputs.len(),
        train_labels.len(),
        "train_inputs and train_labels must have equal length"
    );
    assert!(config.batch_size > 0, "batch_size must be at least 1");

    let mut last_train_loss = 0.0;

    for epoch in 1..=config.epochs {
        if let Some(ref flag) = config.stop_flag {
            if flag.load(Ordering::Relaxed) {
                break;
            }
        }

        let t_start = Instant::now();

        // ── One full pass over the training data ───────────────────────────
        network.set_mode(Mode::Train);
        let train_loss = run_one_epoch(
            network,
            train_inputs,
            train_labels,
            optimizer,
            config.batch_size,
        );
        last_train_loss = train_loss;

        let elapsed_ms = t_start.elapsed().as_millis() as u64;

        // ── Evaluation (dropout off) ───────────────────────────────────────
        network.set_mode(Mode::Eval);
        let train_accuracy = compute_accuracy(network, train_inputs, train_labels);

        let (val_loss, val_accuracy) = if let (Some(vi), Some(vl)) = (val_inputs, val_labels) {
            (
                Some(compute_eval_loss(network, vi, vl)),
                Some(compute_accuracy(network, vi, vl)),
            )
        } else {
            (None, None)
        };

        info!(
            "epoch {epoch}/{total}: train_loss={train_loss:.6} train_acc={train_accuracy:.4}{val}",
            total = config.epochs,
            val = match (val_loss, val_accuracy) {
                (Some(l), Some(a)) => format!(" val_loss={l:.6} val_acc={a:.4}"),
                _ => String::new(),
            }
        );

        let stats = EpochStats {
            epoch,
            total_epochs: config.epochs,
            train_loss,
            val_loss,
            train_accuracy,
            val_accuracy,
            elapsed_ms,
        };

        if let Some(ref tx) = config.progress_tx {
            // If the receiver has been dropped, stop training.
            if tx.send(stats).is_err() {
                break;
            }
        }
    }

    network.set_mode(Mode::Eval);
    last_train_loss
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

/// Runs one full epoch of mini-batch SGD over the training data.
/// Returns the mean loss over all samples.
fn run_one_epoch(
    network: &mut Network,
    inputs: &[Vec<f64>],
    labels: &[Vec<f64>],
    optimizer: &Sgd,
    batch_size: usize,
) -> f64 {
    let n = inputs.len();
    let mut total_loss = 0.0;

    // Shuffle sample order each epoch.
    let mut indices: Vec<usize> = (0..n).collect();
    indices.shuffle(&mut rand::thread_rng());

    for batch in indices.chunks(batch_size) {
        // Accumulators start from zero for every mini-batch.
        network.zero_grad();

        for &idx in batch {
            let log_probs = network.forward(&inputs[idx]);
            total_loss += NllLoss::loss(&log_probs, &labels[idx]);

            let delta = NllLoss::derivative(&log_probs, &labels[idx]);
            network.backward(&delta);
        }

        // Gradients were summed over the batch; step averages them.
        optimizer.step(network, batch.len());
    }

    total_loss / n as f64
}

/// Mean loss over a full dataset without touching the accumulators.
fn compute_eval_loss(network: &mut Network, inputs: &[Vec<f64>], labels: &[Vec<f64>]) -> f64 {
    let n = inputs.len();
    if n == 0 {
        return 0.0;
    }
    let total: f64 = inputs
        .iter()
        .zip(labels.iter())
        .map(|(input, label)| NllLoss::loss(&network.forward(input), label))
        .sum();
    total / n as f64
}

/// Fraction of samples classified correctly (argmax match).
fn compute_accuracy(network: &mut Network, inputs: &[Vec<f64>], labels: &[Vec<f64>]) -> f64 {
    let n = inputs.len();
    if n == 0 {
        return 0.0;
    }
    let correct: usize = inputs
        .iter()
        .zip(labels.iter())
        .filter(|(input, label)| network.predict(input) == argmax(label))
        .count();
    correct as f64 / n as f64
}
