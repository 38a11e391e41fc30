use std::path::PathBuf;

use tracing::info;
use tracing_subscriber::EnvFilter;

fn usage() -> ! {
    eprintln!("Usage: tuple_ledger_report <snapshot> [out_path] [--json <json_path>]");
    eprintln!();
    eprintln!("Example:");
    eprintln!("  tuple_ledger_report ledger.snap report.html --json report.json");
    std::process::exit(2);
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let mut args = std::env::args().skip(1).collect::<Vec<_>>();
    let mut json_out = None;
    if let Some(pos) = args.iter().position(|a| a == "--json") {
        if pos + 1 >= args.len() {
            usage();
        }
        json_out = Some(PathBuf::from(args.remove(pos + 1)));
        args.remove(pos);
    }

    if args.is_empty() {
        usage();
    }

    let snapshot = PathBuf::from(args.remove(0));
    let out_path = if args.is_empty() {
        PathBuf::from("report.html")
    } else {
        PathBuf::from(args.remove(0))
    };

    if !args.is_empty() {
        usage();
    }

    match tuple_ledger::report::generate_report(&snapshot, &out_path, json_out.as_ref()) {
        Ok(report) => {
            info!(
                height = report.height,
                traintuples = report.traintuples.len(),
                testtuples = report.testtuples.len(),
                "report written"
            );
        }
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    }

    println!("{}", out_path.display());
}
