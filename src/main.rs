use heatbench::{
  compare,
  config::HeatbenchConfig,
  eval_points::EvalPoints,
  fe::{EvaluationStencil, FeFunction, PointLocator},
  io::{self, vtk::VtkSeriesWriter},
  mesh::cartesian::CartesianMeshInfo,
  problems::heat::{HeatProblem, HeatSolver, ObserverChain, SamplingObserver},
  study,
};

use anyhow::Context;
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use tracing::info;

/// FEM reference solutions and PINN comparison for the 2D transient heat benchmark.
#[derive(Parser, Debug)]
#[command(name = "heatbench", version, about)]
struct Cli {
  /// TOML configuration. Flags override its values.
  #[arg(long, global = true)]
  config: Option<PathBuf>,

  #[command(subcommand)]
  cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Write a tensor grid of evaluation points and times.
  GenPoints {
    #[arg(long, default_value_t = 60)]
    nx: usize,
    #[arg(long, default_value_t = 60)]
    ny: usize,
    #[arg(long, default_value_t = 1e-2)]
    dt: f64,
    #[arg(long, default_value_t = 1.0)]
    tfinal: f64,
    #[arg(long)]
    out: Option<PathBuf>,
  },
  /// Solve on a fine mesh and sample the solution at the evaluation points.
  GroundTruth {
    /// Cells per axis.
    #[arg(long)]
    ns: Option<usize>,
    #[arg(long)]
    points: Option<PathBuf>,
    #[arg(long)]
    out: Option<PathBuf>,
    #[arg(long)]
    vtk_dir: Option<PathBuf>,
    #[arg(long)]
    no_vtk: bool,
  },
  /// Measure error and cost over a sequence of meshes.
  Study {
    #[arg(long, value_delimiter = ',')]
    ns: Option<Vec<usize>>,
    #[arg(long)]
    points: Option<PathBuf>,
    #[arg(long)]
    truth: Option<PathBuf>,
    #[arg(long)]
    out: Option<PathBuf>,
  },
  /// Tabulate error against time for PINN and FEM results.
  Compare {
    #[arg(long)]
    pinns: Option<PathBuf>,
    #[arg(long)]
    fem: Option<PathBuf>,
    #[arg(long)]
    out: Option<PathBuf>,
  },
}

/// Step 0 is the initial state and isn't reported.
fn progress_message(step: usize, t: f64) -> Option<String> {
  (step > 0).then(|| format!("Time step {step}, t = {t:.4}"))
}

fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt::init();

  let cli = Cli::parse();
  let config = HeatbenchConfig::load_or_default(cli.config.as_deref())
    .context("failed to load configuration")?;

  match cli.cmd {
    Command::GenPoints {
      nx,
      ny,
      dt,
      tfinal,
      out,
    } => {
      let out = out.unwrap_or(config.output.eval_points);
      let points = EvalPoints::generate_grid(nx, ny, dt, tfinal)?;
      io::write_eval_points(&out, &points)
        .with_context(|| format!("failed to write {}", out.display()))?;
      info!(
        "wrote {} points x {} times to {}",
        points.npoints(),
        points.ntimes(),
        out.display()
      );
    }
    Command::GroundTruth {
      ns,
      points,
      out,
      vtk_dir,
      no_vtk,
    } => {
      let ns = ns.unwrap_or(config.mesh.ns);
      let points_path = points.unwrap_or(config.output.eval_points);
      let out = out.unwrap_or(config.output.solutions);
      let vtk_dir = vtk_dir.unwrap_or(config.output.vtk_dir);
      let write_vtk = config.output.write_vtk && !no_vtk;

      let points = io::read_eval_points(&points_path)
        .with_context(|| format!("failed to read {}", points_path.display()))?;
      let mesh = CartesianMeshInfo::new_unit(2, ns).compute_mesh()?;
      let locator = PointLocator::new(&mesh);
      let stencil = EvaluationStencil::new(&mesh, &locator, points.coords())?;
      let mut solver = HeatSolver::new(&mesh, HeatProblem::gaussian_pulse(), config.solver)?;

      let pb = ProgressBar::new(points.ntimes() as u64);
      pb.set_style(
        ProgressStyle::default_bar()
          .template("{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} {msg}")?
          .progress_chars("█░"),
      );

      let mut sampler = SamplingObserver::new(&stencil);
      let mut vtk = match write_vtk {
        true => Some(VtkSeriesWriter::new(&mesh, &vtk_dir, config.output.vtk_interval)?),
        false => None,
      };
      let mut progress = |step: usize, t: f64, _: &FeFunction| -> heatbench::Result<()> {
        if let Some(msg) = progress_message(step, t) {
          pb.println(msg);
        }
        pb.inc(1);
        Ok(())
      };

      {
        let mut observers = ObserverChain::new().with(&mut sampler).with(&mut progress);
        if let Some(vtk) = vtk.as_mut() {
          observers = observers.with(vtk);
        }
        solver.solve(points.times(), &mut observers)?;
      }
      pb.finish_with_message("done");

      if let Some(vtk) = vtk {
        let pvd = vtk.finish()?;
        info!("wrote VTK series {}", pvd.display());
      }

      let solutions = sampler.into_samples();
      io::write_solutions(&out, &solutions)
        .with_context(|| format!("failed to write {}", out.display()))?;
      info!(
        "wrote solutions of shape ({}, {}) to {}",
        solutions.len(),
        points.npoints(),
        out.display()
      );
    }
    Command::Study {
      ns,
      points,
      truth,
      out,
    } => {
      let mesh_nums = ns.unwrap_or(config.study.mesh_nums);
      let points_path = points.unwrap_or(config.output.eval_points);
      let truth_path = truth.unwrap_or(config.study.truth);
      let out = out.unwrap_or(config.study.results);

      let points = io::read_eval_points(&points_path)
        .with_context(|| format!("failed to read {}", points_path.display()))?;
      let truth = io::read_solutions(&truth_path)
        .with_context(|| format!("failed to read {}", truth_path.display()))?;

      let (results, _) = study::run_fem_study(
        &mesh_nums,
        &points,
        &truth,
        &config.solver,
        HeatProblem::gaussian_pulse,
      )?;
      io::write_fem_results(&out, &results)
        .with_context(|| format!("failed to write {}", out.display()))?;
      info!("wrote FEM results to {}", out.display());
    }
    Command::Compare { pinns, fem, out } => {
      let pinns_path = pinns.unwrap_or(config.compare.pinns);
      let fem_path = fem.unwrap_or(config.compare.fem);
      let out = out.unwrap_or(config.compare.out);

      let pinns = io::read_pinn_results(&pinns_path)
        .with_context(|| format!("failed to read {}", pinns_path.display()))?;
      let fem = io::read_fem_results(&fem_path)
        .with_context(|| format!("failed to read {}", fem_path.display()))?;

      let rows = compare::comparison_rows(&pinns, &fem)?;
      compare::log_comparison(&rows);
      compare::save_comparison_csv(&out, &rows)
        .with_context(|| format!("failed to write {}", out.display()))?;
      info!("wrote comparison table to {}", out.display());
    }
  }

  Ok(())
}
