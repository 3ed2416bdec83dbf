use std::process::ExitCode;

use eld_solver::{RunSummary, Simulation, SimulationParameters};

fn usage() {
    eprintln!("usage: eld-cli run <config.json>");
}

fn print_summary(summary: &RunSummary) {
    println!("num_steps: {}", summary.num_steps);
    println!("num_dofs: {}", summary.num_dofs);
    println!("final_time: {}", summary.final_time);
}

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();
    if args.len() != 3 || args[1] != "run" {
        usage();
        return ExitCode::from(2);
    }

    let config = match std::fs::read_to_string(&args[2]) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("read error: {err}");
            return ExitCode::from(1);
        }
    };
    let params: SimulationParameters = match serde_json::from_str(&config) {
        Ok(params) => params,
        Err(err) => {
            eprintln!("config error: {err}");
            return ExitCode::from(1);
        }
    };

    eprintln!("started: {}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S"));
    let result = Simulation::new(params).run();
    eprintln!("finished: {}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S"));

    match result {
        Ok(summary) => {
            print_summary(&summary);
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("solver error: {err}");
            ExitCode::from(1)
        }
    }
}
