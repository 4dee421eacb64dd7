// This binary crate is intentionally minimal.
// All classifier logic lives in the library (src/lib.rs and its modules).
// Run examples with:
//   cargo run --example two_blobs
fn main() {
    env_logger::init();
    println!("fcnet: a small feed-forward classifier library in Rust.");
    println!("Run `cargo run --example two_blobs` to train a toy classifier.");
    println!("Run `cargo run --example checkpoint` for a save/load round trip.");
}
