use clap::Parser;
use plant_app::app::run;
use plant_app::cli::Cli;

fn main() {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        eprintln!("regador: {err:#}");
        std::process::exit(1);
    }
}
