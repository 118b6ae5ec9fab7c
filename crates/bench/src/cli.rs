//! CLI wiring for the gridsweep benchmarks.

use crate::io::{safe_name, write_ppm};
use anyhow::Result;
use clap::{Parser, Subcommand};
use gridsweep_engine::{BlockGrid, Domain, Policy};
use gridsweep_harness::{ConfigSweep, Nesting, RunConfig, SweepCase, SweepReport};
use gridsweep_kernels::{MandelbrotKernel, MatmulCells, UlamKernel};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "gridsweep", about = "Partitioning and scheduling benchmarks")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Render the Mandelbrot set across a ladder of worker counts.
    ThreadSweep {
        #[arg(long, default_value_t = 1000)]
        width: usize,
        #[arg(long, default_value_t = 1000)]
        height: usize,
        #[arg(long, value_delimiter = ',', default_value = "1,2,4,8,16")]
        workers: Vec<usize>,
        #[arg(long)]
        image_dir: Option<PathBuf>,
        #[arg(long)]
        report: Option<PathBuf>,
        #[arg(long)]
        baseline: Option<PathBuf>,
    },
    /// Render the Mandelbrot set across the eight schedule variants.
    ScheduleSweep {
        #[arg(long, default_value_t = 1000)]
        width: usize,
        #[arg(long, default_value_t = 1000)]
        height: usize,
        #[arg(long, default_value_t = 8)]
        workers: usize,
        #[arg(long)]
        image_dir: Option<PathBuf>,
        #[arg(long)]
        report: Option<PathBuf>,
        #[arg(long)]
        baseline: Option<PathBuf>,
    },
    /// Ulam spiral: nested block grid vs flat strips with the same total
    /// thread count.
    NestedCompare {
        #[arg(long, default_value_t = 999)]
        size: usize,
        #[arg(long, default_value_t = 2)]
        blocks_x: usize,
        #[arg(long, default_value_t = 2)]
        blocks_y: usize,
        #[arg(long)]
        image_dir: Option<PathBuf>,
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// Matrix-multiply cells across a ladder of worker counts.
    MatmulSweep {
        #[arg(long, default_value_t = 512)]
        m: usize,
        #[arg(long, default_value_t = 512)]
        n: usize,
        #[arg(long, default_value_t = 512)]
        k: usize,
        #[arg(long, value_delimiter = ',', default_value = "1,2,4,8,16")]
        workers: Vec<usize>,
        #[arg(long, default_value_t = 42)]
        seed: u64,
        #[arg(long)]
        report: Option<PathBuf>,
        #[arg(long)]
        baseline: Option<PathBuf>,
    },
}

pub fn run_cli(cli: Cli) -> Result<()> {
    tracing_subscriber::fmt::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .init();

    match cli.command {
        Command::ThreadSweep {
            width,
            height,
            workers,
            image_dir,
            report,
            baseline,
        } => {
            let domain = Domain::grid(height, width);
            let sweep = ConfigSweep::thread_ladder(domain, &workers, Policy::contiguous());
            let (sweep_report, images) =
                sweep.run_collect(|config| MandelbrotKernel::new(domain, config.workers))?;

            if let Some(dir) = image_dir {
                std::fs::create_dir_all(&dir)?;
                for (case, image) in sweep.cases().iter().zip(&images) {
                    let path = dir.join(format!("mandelbrot_{}_threads.ppm", case.config.workers));
                    write_ppm(&path, width, height, image)?;
                    info!(path = %path.display(), "image saved");
                }
            }
            finish(sweep_report, report, baseline)
        }
        Command::ScheduleSweep {
            width,
            height,
            workers,
            image_dir,
            report,
            baseline,
        } => {
            let domain = Domain::grid(height, width);
            let sweep = ConfigSweep::schedule_suite(domain, workers);
            let (sweep_report, images) =
                sweep.run_collect(|config| MandelbrotKernel::new(domain, config.workers))?;

            if let Some(dir) = image_dir {
                std::fs::create_dir_all(&dir)?;
                for (case, image) in sweep.cases().iter().zip(&images) {
                    let path =
                        dir.join(format!("mandelbrot_schedule_{}.ppm", safe_name(&case.name)));
                    write_ppm(&path, width, height, image)?;
                    info!(path = %path.display(), "image saved");
                }
            }
            finish(sweep_report, report, baseline)
        }
        Command::NestedCompare {
            size,
            blocks_x,
            blocks_y,
            image_dir,
            report,
        } => {
            let domain = Domain::grid(size, size);
            let grid = BlockGrid::new(blocks_x, blocks_y);
            let total = grid.blocks();
            let cases = vec![
                SweepCase::new(
                    format!("nested {blocks_x}x{blocks_y}"),
                    RunConfig::nested(domain, grid, blocks_y, blocks_x, Policy::contiguous()),
                ),
                SweepCase::new(
                    format!("horizontal ({total} threads)"),
                    RunConfig::flat(domain, total, Policy::contiguous()),
                ),
            ];
            let sweep = ConfigSweep::new(cases);
            let (sweep_report, images) = sweep.run_collect(|config| {
                let colors = match config.nesting {
                    Nesting::Blocks { grid, .. } => grid.blocks(),
                    Nesting::Flat => config.workers,
                };
                UlamKernel::new(size, colors)
            })?;

            if let Some(dir) = image_dir {
                std::fs::create_dir_all(&dir)?;
                for (case, image) in sweep.cases().iter().zip(&images) {
                    let path = dir.join(format!("ulam_{}.ppm", safe_name(&case.name)));
                    write_ppm(&path, size, size, image)?;
                    info!(path = %path.display(), "image saved");
                }
            }
            finish(sweep_report, report, None)
        }
        Command::MatmulSweep {
            m,
            n,
            k,
            workers,
            seed,
            report,
            baseline,
        } => {
            let domain = Domain::grid(m, n);
            let sweep = ConfigSweep::thread_ladder(domain, &workers, Policy::contiguous());
            // Same seed per case, so every configuration multiplies the
            // same matrices.
            let sweep_report = sweep.run(|_| MatmulCells::random(m, n, k, seed))?;
            finish(sweep_report, report, baseline)
        }
    }
}

fn finish(
    report: SweepReport,
    output: Option<PathBuf>,
    baseline: Option<PathBuf>,
) -> Result<()> {
    println!("{}", report.render_table());

    if let Some(path) = baseline {
        if path.exists() {
            let baseline_report = SweepReport::load(&path)?;
            for (case, delta) in report.diff(&baseline_report) {
                println!(
                    "Δ {}: elapsed_ms={:+.3} speedup={:+.2}",
                    case, delta.elapsed_ms_delta, delta.speedup_delta
                );
            }
        } else {
            info!(path = %path.display(), "baseline report not found; skipping diff");
        }
    }

    if let Some(path) = output {
        report.save(&path)?;
        info!(path = %path.display(), "report saved");
    }
    Ok(())
}
