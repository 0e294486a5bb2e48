//! # Voxel Mesher Entry Point
//!
//! Calls into the library's `run()` function and turns a failed load into a
//! non-zero exit status.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --release -- [config.json]
//! ```

fn main() {
    if voxel_mesher::run().is_err() {
        std::process::exit(1);
    }
}
