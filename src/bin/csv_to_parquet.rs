use newsfold::merge::export_parquet;
use std::{env, path::Path, process::exit};
use tracing_subscriber::{fmt, EnvFilter};

fn main() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(env_filter).init();

    // Expect exactly two CLI arguments: input CSV and output Parquet.
    let args: Vec<String> = env::args().collect();
    if args.len() != 3 {
        eprintln!("Usage: {} <CSV_FILE> <PARQUET_FILE>", args[0]);
        exit(1);
    }
    let (csv_path, parquet_path) = (Path::new(&args[1]), Path::new(&args[2]));

    println!("Reading CSV file from: {}", csv_path.display());
    match export_parquet(csv_path, parquet_path) {
        Ok(rows) => println!("Wrote {} rows to {}", rows, parquet_path.display()),
        Err(e) => {
            eprintln!("Error: {}", e);
            exit(1);
        }
    }
}
