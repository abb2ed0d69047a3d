//! Demo student program: read scores in the graphical console and report
//! their average.

use lectern::{require, Runtime};

fn main() -> Result<(), String> {
    let args: Vec<String> = std::env::args().collect();

    // Handle --help and --version before initializing the GUI
    for arg in args.iter().skip(1) {
        if arg == "--help" || arg == "-h" {
            print_help();
            std::process::exit(0);
        } else if arg == "--version" || arg == "-v" {
            print_version();
            std::process::exit(0);
        }
    }

    let mut runtime = Runtime::new();
    runtime.initialize(&args)?;

    let handle = runtime.handle();
    // Programs should end by returning from the body, not by exiting
    handle.set_exit_enabled(false);

    let console = runtime
        .console()
        .ok_or_else(|| "graphical console unavailable (is NOCONSOLE set?)".to_string())?;

    let status = runtime.run(move || {
        console.write_line("Enter scores between 0 and 100. Blank line to finish.");

        let mut scores: Vec<f64> = Vec::new();
        loop {
            console.write("score> ");
            let line = match console.read_line() {
                Ok(line) => line,
                Err(_) => break,
            };
            let trimmed = line.trim();
            if trimmed.is_empty() {
                break;
            }
            match trimmed.parse::<f64>() {
                Ok(score) => {
                    require::in_range(score, 0.0, 100.0, "record_score", "score", "");
                    scores.push(score);
                }
                Err(_) => console.write_line("That is not a number, try again."),
            }
        }

        if scores.is_empty() {
            console.write_line("No scores entered.");
            return 1;
        }

        let average = scores.iter().sum::<f64>() / scores.len() as f64;
        console.write_line(format!("Average of {} scores: {:.2}", scores.len(), average));
        0
    })?;

    runtime.shutdown();
    eprintln!("[DEMO] Program finished with status {}", status);
    Ok(())
}

fn print_help() {
    println!("Lectern demo v{} ({}, built {})", env!("CARGO_PKG_VERSION"), lectern::GIT_HASH, lectern::BUILD_DATE);
    println!();
    println!("USAGE:");
    println!("    lectern-demo [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("    -h, --help       Print help information");
    println!("    -v, --version    Print version information");
    println!();
    println!("Set NOCONSOLE=true to suppress the graphical console.");
}

fn print_version() {
    println!("Lectern demo {} ({}, built {})", env!("CARGO_PKG_VERSION"), lectern::GIT_HASH, lectern::BUILD_DATE);
}
