// This binary is intentionally minimal.
// All model logic lives in the library (src/lib.rs and its modules).
// Run the demos with:
//   cargo run --example xor
//   cargo run --example linreg
use std::env;
use std::process;

use ferrite_ml::data::read_csv;

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        println!("ferrite-ml: dense matrices and sequential networks in Rust.");
        println!("usage: ferrite-ml <file.csv> <n_features> [delimiter]");
        println!("Run `cargo run --example xor` to see the XOR demo.");
        return;
    }

    let n_features: usize = match args[2].parse() {
        Ok(n) => n,
        Err(_) => {
            eprintln!("error: n_features must be a non-negative integer, got '{}'", args[2]);
            process::exit(2);
        }
    };
    let delimiter = args.get(3).and_then(|d| d.chars().next()).unwrap_or(',');

    match read_csv(&args[1], n_features, delimiter, true) {
        Ok((x, y)) => {
            println!("{}: {} samples, {} features, {} targets", args[1], x.rows(), x.cols(), y.cols());
        }
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}
