use load_sim::cli;
use load_sim::error::Result;

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = cli::parse_args()?;
    cli::init_logging(args.verbose);
    let output = cli::execute(args)?;
    print!("{}", output);
    Ok(())
}
