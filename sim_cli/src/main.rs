//! # Scheduler Simulation Driver
//!
//! Main entry point for running a process definition file.

use sim_cli::{
    render_report, render_timeline, render_trace, CliError, Overrides, Simulation,
    SimulationConfig, StopReason,
};
use std::env;
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process;

/// Parsed command line
#[derive(Debug, Default)]
struct CliArgs {
    input: Option<PathBuf>,
    config: Option<PathBuf>,
    overrides: Overrides,
    json: bool,
    trace: bool,
}

fn main() {
    let args: Vec<String> = env::args().collect();
    let program = args.first().map_or("sim_cli", String::as_str);

    let cli = parse_args(&args).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        print_usage(program);
        process::exit(1);
    });

    if let Err(e) = run(&cli) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(cli: &CliArgs) -> Result<(), CliError> {
    let mut config = match &cli.config {
        Some(path) => SimulationConfig::load(path)?,
        None => SimulationConfig::default(),
    };
    cli.overrides.apply(&mut config)?;

    let definitions = read_input(cli.input.as_ref())?;
    let mut simulation = Simulation::new(config)?;
    let added = simulation.load_definitions(&definitions)?;
    for rejected in simulation.rejected() {
        eprintln!(
            "Skipping line {}: {} ({})",
            rejected.line, rejected.error, rejected.text
        );
    }
    if added == 0 {
        eprintln!("Warning: no processes defined");
    }

    let reason = simulation.run();
    let report = simulation.finish();

    if cli.trace {
        print!("{}", render_trace(simulation.scheduler())?);
    }
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        let stopped = match reason {
            StopReason::CycleLimit => "cycle limit reached",
            StopReason::Idle => "no work left",
        };
        println!(
            "Stopped after {} cycles: {}",
            simulation.cycles_run(),
            stopped
        );
        println!();
        print!("{}", render_report(&report));
        println!();
        println!("Timeline: {}", render_timeline(simulation.scheduler().timeline()));
    }
    Ok(())
}

fn read_input(path: Option<&PathBuf>) -> Result<String, CliError> {
    match path {
        Some(path) => fs::read_to_string(path).map_err(|source| CliError::Read {
            path: path.clone(),
            source,
        }),
        None => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .map_err(|source| CliError::Read {
                    path: PathBuf::from("<stdin>"),
                    source,
                })?;
            Ok(text)
        }
    }
}

fn parse_args(args: &[String]) -> Result<CliArgs, String> {
    let mut cli = CliArgs::default();
    let mut i = 1;

    while i < args.len() {
        let flag = args[i].as_str();
        match flag {
            "--json" => cli.json = true,
            "--trace" => cli.trace = true,
            "--help" | "-h" => {
                print_usage(&args[0]);
                process::exit(0);
            }
            "--input" | "-i" | "--config" | "-c" | "--algorithm" | "-a" | "--quantum" | "-q"
            | "--frames" | "-f" | "--replacement" | "-r" | "--max-cycles" | "--idle-limit" => {
                i += 1;
                let Some(value) = args.get(i).cloned() else {
                    return Err(format!("Missing value for {}", flag));
                };
                match flag {
                    "--input" | "-i" => cli.input = Some(PathBuf::from(value)),
                    "--config" | "-c" => cli.config = Some(PathBuf::from(value)),
                    "--algorithm" | "-a" => cli.overrides.algorithm = Some(value),
                    "--quantum" | "-q" => cli.overrides.quantum = Some(value),
                    "--frames" | "-f" => cli.overrides.frames = Some(value),
                    "--replacement" | "-r" => cli.overrides.replacement = Some(value),
                    "--max-cycles" => cli.overrides.max_cycles = Some(value),
                    _ => cli.overrides.idle_limit = Some(value),
                }
            }
            other => {
                return Err(format!("Unknown option: {}", other));
            }
        }
        i += 1;
    }

    Ok(cli)
}

fn print_usage(program: &str) {
    eprintln!("Usage: {} [OPTIONS]", program);
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -i, --input <FILE>         Process definition file (default: stdin)");
    eprintln!("  -c, --config <FILE>        JSON simulation config");
    eprintln!("  -a, --algorithm <NAME>     fcfs (default), sjf, rr or priority");
    eprintln!("  -q, --quantum <N>          Round-robin quantum (default 2)");
    eprintln!("  -f, --frames <N>           Physical frames (default 7)");
    eprintln!("  -r, --replacement <NAME>   fifo (default), lru or optimal");
    eprintln!("  --max-cycles <N>           Maximum cycles to run (0 = unlimited, default 50)");
    eprintln!("  --idle-limit <N>           Stop after N cycles with no work (default 3)");
    eprintln!("  --json                     Print the report as JSON");
    eprintln!("  --trace                    Print every audit event as JSON lines");
    eprintln!("  -h, --help                 Show this help message");
    eprintln!();
    eprintln!("Examples:");
    eprintln!("  {} --input demos/mixed.txt --algorithm rr --quantum 3", program);
    eprintln!("  {} -i demos/mixed.txt -f 3 -r lru --json", program);
}
