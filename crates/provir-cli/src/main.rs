use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "provir")]
#[command(about = "provir - intraprocedural source-to-sink flow discovery")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    Analyze {
        input: PathBuf,

        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,

        #[arg(long)]
        show_blocks: bool,

        #[arg(short, long)]
        report: Option<PathBuf>,

        #[arg(short, long)]
        verbose: bool,
    },

    Validate {
        input: PathBuf,

        #[arg(short, long)]
        verbose: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            input,
            output_dir,
            show_blocks,
            report,
            verbose,
        } => cmd_analyze(input, output_dir, show_blocks, report, verbose),
        Commands::Validate { input, verbose } => cmd_validate(input, verbose),
    }
}

fn cmd_analyze(
    input: PathBuf,
    output_dir: PathBuf,
    show_blocks: bool,
    report: Option<PathBuf>,
    verbose: bool,
) -> Result<()> {
    use colored::*;
    use indexmap::IndexMap;
    use provir_core::analysis::{AnalysisPass, FlowAnalysisPass, PosixCallSemantics};
    use provir_core::Module;
    use provir_emit::{DotEmitter, EmitContext, Emitter, FlowGraph, ModuleReport, NameTable};
    use std::fs;

    if verbose {
        println!("{}", " provir flow analysis".bright_blue().bold());
        println!("{}", "=".repeat(50).bright_blue());
        println!(" Input: {}", input.display());
        println!(" Output: {}", output_dir.display());
        println!();
    }

    let text = fs::read_to_string(&input)?;
    let module = Module::from_json(&text)?;
    fs::create_dir_all(&output_dir)?;

    let pass = FlowAnalysisPass::new(PosixCallSemantics);
    let dot = DotEmitter::with_blocks(show_blocks);
    let mut analyses = IndexMap::new();

    for (name, function) in &module.functions {
        if verbose {
            println!(" Analyzing {}...", name.bright_yellow());
        }
        let analysis = pass.analyze(function)?;

        if verbose {
            println!("   {} flow edges", analysis.flows.len());
            let mut names = NameTable::with_module(&module, function);
            for chain in &analysis.chains {
                let mut sinks: Vec<String> =
                    chain.sinks.iter().map(|v| names.name(v)).collect();
                sinks.sort();
                println!(
                    "   {} {} -> {}",
                    "chain:".bright_green(),
                    names.name(&chain.source),
                    sinks.join(", ")
                );
            }
        }

        // A graph we cannot open or write is reported and skipped; the
        // remaining functions are still analyzed.
        let dot_path = output_dir.join(format!("{}-dataflow.dot", name));
        match fs::File::create(&dot_path) {
            Ok(mut file) => {
                let graph = FlowGraph::with_module(&module, function, &analysis.flows);
                match dot.emit(&graph, &mut file, &mut EmitContext::new()) {
                    Ok(()) => {
                        if verbose {
                            println!("   Wrote {}", dot_path.display());
                        }
                    }
                    Err(e) => {
                        eprintln!("provir: cannot write {}: {}", dot_path.display(), e);
                    }
                }
            }
            Err(e) => {
                eprintln!("provir: cannot open {}: {}", dot_path.display(), e);
            }
        }

        analyses.insert(name.clone(), analysis);
    }

    if let Some(report_path) = report {
        let yaml = ModuleReport::build(&module, &analyses).to_yaml()?;
        fs::write(&report_path, yaml)?;
        if verbose {
            println!("\n Report: {}", report_path.display());
        }
    }

    if verbose {
        println!(
            "\n {} Analyzed {} function(s)",
            "SUCCESS:".bright_green().bold(),
            module.functions.len()
        );
    }

    Ok(())
}

fn cmd_validate(input: PathBuf, verbose: bool) -> Result<()> {
    use colored::*;
    use provir_core::Module;
    use std::fs;

    if verbose {
        println!("{}", " Validating module".bright_cyan().bold());
        println!(" Input: {}", input.display());
        println!();
    }

    let text = fs::read_to_string(&input)?;
    match Module::from_json(&text) {
        Ok(module) => {
            println!("{}", " VALID".bright_green().bold());
            if verbose {
                println!(
                    "   {} function(s), {} global(s)",
                    module.functions.len(),
                    module.globals.len()
                );
                for (name, function) in &module.functions {
                    println!(
                        "   {}: {} block(s)",
                        name,
                        function.body.blocks.len()
                    );
                }
            }
            Ok(())
        }
        Err(e) => {
            println!("{}", " INVALID".bright_red().bold());
            println!("\n{}", "Parse Error:".bright_red());
            println!("{}", e);
            Err(anyhow::anyhow!("Validation failed"))
        }
    }
}
