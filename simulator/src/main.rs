use anyhow::Context;
use clap::Parser;
use generator::profile::build_signal;
use std::fs;
use std::path::PathBuf;
use workflow::config::WorkflowConfig;
use workflow::runner::Runner;

mod generator;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "MUSIC and chirp-z spectral estimation driver")]
struct Args {
    /// Load a workflow config from YAML
    #[arg(long)]
    workflow: Option<PathBuf>,
    /// Snapshot length (rows of the snapshot matrix)
    #[arg(long, default_value_t = 1000)]
    rows: usize,
    /// Signal-subspace dimensions to evaluate
    #[arg(long, value_delimiter = ',', default_values_t = vec![1, 2, 3, 4])]
    p: Vec<usize>,
    /// Hop between sliding snapshots; disjoint blocks when omitted
    #[arg(long)]
    snapshot_jump: Option<usize>,
    #[arg(long, default_value_t = false)]
    forward_backward: bool,
    #[arg(long, default_value_t = false)]
    signal_numerator: bool,
    /// Override the generator seed
    #[arg(long)]
    seed: Option<u64>,
    /// Where to write the JSON report
    #[arg(long, default_value = "tools/data/spectrum_report.json")]
    output: PathBuf,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut workflow_config = if let Some(path) = args.workflow {
        WorkflowConfig::load(path)?
    } else {
        WorkflowConfig::from_args(
            args.rows,
            args.p,
            args.snapshot_jump,
            args.forward_backward,
            args.signal_numerator,
        )
    };
    if let Some(seed) = args.seed {
        workflow_config.generator.seed = seed;
    }

    let signal = build_signal(&workflow_config.generator)?;
    let runner = Runner::new(workflow_config);
    let report = runner.execute(&signal)?;

    for trace in &report.traces {
        let peaks: Vec<String> = trace
            .peaks
            .iter()
            .map(|peak| format!("{:.3} Hz", peak.frequency_hz))
            .collect();
        println!("p={} -> peaks [{}]", trace.p, peaks.join(", "));
    }
    if let Some(czt) = &report.czt {
        let peaks: Vec<String> = czt
            .peaks
            .iter()
            .map(|peak| format!("{:.3} Hz ({:.1})", peak.frequency_hz, peak.value))
            .collect();
        println!(
            "czt {}..{} Hz -> peaks [{}]",
            czt.band.f1,
            czt.band.f2,
            peaks.join(", ")
        );
    }

    let json = report.to_json()?;
    if let Some(parent) = args.output.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&args.output, json)
        .with_context(|| format!("writing report {}", args.output.display()))?;
    println!("report written to {}", args.output.display());

    Ok(())
}
