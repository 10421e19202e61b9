use clap::{Parser as ClapParser, Subcommand};
use std::process;

use pairgc::{
    DEFAULT_GROWTH_FACTOR, DEFAULT_INITIAL_THRESHOLD, DEFAULT_STACK_CAPACITY,
    MachineSettings,
    scenarios::{self, SCENARIOS},
};

#[derive(ClapParser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Number of roots the operand stack can hold
    #[arg(long, default_value_t = DEFAULT_STACK_CAPACITY)]
    stack_capacity: usize,

    /// Allocation count that triggers the first collection
    #[arg(long, default_value_t = DEFAULT_INITIAL_THRESHOLD)]
    initial_threshold: usize,

    /// Threshold multiplier applied to the surviving objects
    #[arg(long, default_value_t = DEFAULT_GROWTH_FACTOR)]
    growth_factor: usize,

    /// Hard cap on live objects
    #[arg(long)]
    max_objects: Option<usize>,

    /// Print roots and allocations after each scenario
    #[arg(long)]
    dump: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the canonical collector checks (default)
    Scenarios,
    /// Allocate and drop nested pairs in a loop
    Stress {
        #[arg(long, default_value_t = 1000)]
        iterations: usize,
    },
}

fn main() {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info"),
    )
    .init();

    let cli = Cli::parse();
    let settings = MachineSettings {
        stack_capacity: cli.stack_capacity,
        initial_threshold: cli.initial_threshold,
        growth_factor: cli.growth_factor,
        max_objects: cli.max_objects,
        ..Default::default()
    };
    if let Err(err) = settings.validate() {
        eprintln!("Invalid settings: {}", err);
        process::exit(1);
    }

    match cli.command.unwrap_or(Command::Scenarios) {
        Command::Scenarios => {
            for scenario in SCENARIOS {
                if let Err(err) = scenario.run(&settings, cli.dump) {
                    eprintln!("Scenario '{}' failed: {}", scenario.name, err);
                    process::exit(1);
                }
            }
            println!("{} scenarios passed", SCENARIOS.len());
        }
        Command::Stress { iterations } => {
            match scenarios::stress(&settings, iterations) {
                Ok(stats) => println!(
                    "allocated {}, collected {}, collections {}",
                    stats.allocated, stats.collected, stats.collections
                ),
                Err(err) => {
                    eprintln!("Stress run failed: {}", err);
                    process::exit(1);
                }
            }
        }
    }
}
