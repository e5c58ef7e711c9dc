//! Module for the Heat Equation, the prototypical parabolic PDE.
//!
//! $partial_t u - kappa Delta u = f$ with Dirichlet data $u = g$,
//! discretized by Lagrangian P1 elements in space and Backward Euler in time.

use crate::{
  assemble,
  error::{Error, Result},
  fe::{self, EvaluationStencil, FeFunction},
  geometry::CoordRef,
  linalg::{
    faer::FaerCholesky,
    nalgebra::{masked_norm, CsrMatrix, Vector},
  },
  mesh::SimplicialMesh,
  operators::{DofIdx, LaplaceElmat, ScalarLumpedMassElmat, ScalarMassElmat},
  sparse::SparseMatrix,
  util,
};

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use tracing::{debug, info};

/// Time steps whose relative difference is below this share a factorization.
const DT_REUSE_RTOL: f64 = 1e-12;

pub type SpaceFn = Box<dyn Fn(CoordRef) -> f64 + Send + Sync>;
pub type SpaceTimeFn = Box<dyn Fn(CoordRef, f64) -> f64 + Send + Sync>;

pub struct HeatProblem {
  pub diffusivity: f64,
  pub initial: SpaceFn,
  pub source: SpaceTimeFn,
  pub boundary: SpaceTimeFn,
}

impl HeatProblem {
  pub fn new<I, S, B>(diffusivity: f64, initial: I, source: S, boundary: B) -> Self
  where
    I: Fn(CoordRef) -> f64 + Send + Sync + 'static,
    S: Fn(CoordRef, f64) -> f64 + Send + Sync + 'static,
    B: Fn(CoordRef, f64) -> f64 + Send + Sync + 'static,
  {
    Self {
      diffusivity,
      initial: Box::new(initial),
      source: Box::new(source),
      boundary: Box::new(boundary),
    }
  }

  /// Gaussian pulse in the unit square, driven by an oscillating source.
  ///
  /// $u_0 = exp(-50 norm(x - (0.5, 0.5))^2)$,
  /// $f = 10 sin(pi x) sin(pi y) cos(2 pi t)$,
  /// homogeneous Dirichlet boundary.
  pub fn gaussian_pulse() -> Self {
    Self::new(
      1.0,
      |x| (-50.0 * ((x[0] - 0.5).powi(2) + (x[1] - 0.5).powi(2))).exp(),
      |x, t| 10.0 * (PI * x[0]).sin() * (PI * x[1]).sin() * (2.0 * PI * t).cos(),
      |_, _| 0.0,
    )
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeatSolverConfig {
  pub max_newton_iters: usize,
  pub abs_tol: f64,
  pub rel_tol: f64,
  pub lumped_mass: bool,
}
impl Default for HeatSolverConfig {
  fn default() -> Self {
    Self {
      max_newton_iters: 50,
      abs_tol: 1e-10,
      rel_tol: 1e-9,
      lumped_mass: false,
    }
  }
}

/// Callback invoked with every computed state, including the initial one.
pub trait StepObserver {
  fn observe(&mut self, step: usize, time: f64, state: &FeFunction) -> Result<()>;
}

impl<F> StepObserver for F
where
  F: FnMut(usize, f64, &FeFunction) -> Result<()>,
{
  fn observe(&mut self, step: usize, time: f64, state: &FeFunction) -> Result<()> {
    self(step, time, state)
  }
}

/// Runs several observers in order. Stops at the first error.
#[derive(Default)]
pub struct ObserverChain<'a> {
  observers: Vec<&'a mut dyn StepObserver>,
}
impl<'a> ObserverChain<'a> {
  pub fn new() -> Self {
    Self::default()
  }
  pub fn with(mut self, observer: &'a mut dyn StepObserver) -> Self {
    self.observers.push(observer);
    self
  }
}
impl StepObserver for ObserverChain<'_> {
  fn observe(&mut self, step: usize, time: f64, state: &FeFunction) -> Result<()> {
    self
      .observers
      .iter_mut()
      .try_for_each(|observer| observer.observe(step, time, state))
  }
}

/// Samples every state at fixed points.
pub struct SamplingObserver<'a> {
  stencil: &'a EvaluationStencil,
  samples: Vec<Vec<f64>>,
}
impl<'a> SamplingObserver<'a> {
  pub fn new(stencil: &'a EvaluationStencil) -> Self {
    Self {
      stencil,
      samples: Vec::new(),
    }
  }
  pub fn samples(&self) -> &[Vec<f64>] {
    &self.samples
  }
  pub fn into_samples(self) -> Vec<Vec<f64>> {
    self.samples
  }
}
impl StepObserver for SamplingObserver<'_> {
  fn observe(&mut self, _step: usize, _time: f64, state: &FeFunction) -> Result<()> {
    self.samples.push(self.stencil.evaluate(state));
    Ok(())
  }
}

#[derive(Debug, Clone)]
pub struct HeatSolution {
  pub times: Vec<f64>,
  pub states: Vec<FeFunction>,
}
impl HeatSolution {
  pub fn nsteps(&self) -> usize {
    self.states.len() - 1
  }
  pub fn last(&self) -> &FeFunction {
    &self.states[self.states.len() - 1]
  }
}

struct FactorizationCache {
  entry: Option<(f64, FaerCholesky)>,
  nfactorizations: usize,
}
impl FactorizationCache {
  fn get<F>(&mut self, dt: f64, build_system: F) -> Result<&FaerCholesky>
  where
    F: FnOnce() -> CsrMatrix,
  {
    let cached = self
      .entry
      .take()
      .filter(|(cached_dt, _)| util::rel_diff(*cached_dt, dt) <= DT_REUSE_RTOL);
    let entry = match cached {
      Some(entry) => entry,
      None => {
        debug!("factorizing Backward Euler system for dt={dt:e}");
        self.nfactorizations += 1;
        (dt, FaerCholesky::new(build_system())?)
      }
    };
    Ok(&self.entry.insert(entry).1)
  }
}

/// Backward Euler time stepper for the heat equation.
///
/// The Galerkin matrices are assembled once on construction.
pub struct HeatSolver<'m> {
  mesh: &'m SimplicialMesh,
  problem: HeatProblem,
  config: HeatSolverConfig,

  mass: SparseMatrix,
  laplace: SparseMatrix,
  mass_csr: CsrMatrix,
  laplace_csr: CsrMatrix,

  boundary_dofs: Vec<DofIdx>,
  boundary_flags: Vec<bool>,
  cache: FactorizationCache,
}

impl<'m> HeatSolver<'m> {
  pub fn new(
    mesh: &'m SimplicialMesh,
    problem: HeatProblem,
    config: HeatSolverConfig,
  ) -> Result<Self> {
    if !(problem.diffusivity > 0.0 && problem.diffusivity.is_finite()) {
      return Err(Error::InvalidProblem(format!(
        "diffusivity must be positive, got {}",
        problem.diffusivity
      )));
    }

    let laplace = assemble::assemble_galmat(mesh, LaplaceElmat);
    let mass = if config.lumped_mass {
      assemble::assemble_galmat(mesh, ScalarLumpedMassElmat)
    } else {
      assemble::assemble_galmat(mesh, ScalarMassElmat)
    };
    let mass_csr = mass.to_nalgebra_csr();
    let laplace_csr = laplace.to_nalgebra_csr();

    let boundary_dofs = mesh.boundary_vertices();
    let boundary_flags = util::indicies_to_flags(&boundary_dofs, mesh.nvertices());

    info!(
      "assembled heat equation on {} vertices ({} on boundary), {} cells",
      mesh.nvertices(),
      boundary_dofs.len(),
      mesh.ncells()
    );

    Ok(Self {
      mesh,
      problem,
      config,
      mass,
      laplace,
      mass_csr,
      laplace_csr,
      boundary_dofs,
      boundary_flags,
      cache: FactorizationCache {
        entry: None,
        nfactorizations: 0,
      },
    })
  }

  pub fn nfactorizations(&self) -> usize {
    self.cache.nfactorizations
  }

  /// Runs Backward Euler over the given time points.
  ///
  /// The first time is the initial time. The observer sees all states in order.
  pub fn solve(&mut self, times: &[f64], observer: &mut dyn StepObserver) -> Result<HeatSolution> {
    validate_times(times)?;
    let nsteps = times.len() - 1;

    let initial = fe::interpolate(self.mesh, &self.problem.initial);
    observer.observe(0, times[0], &initial)?;

    let mut states = Vec::with_capacity(times.len());
    states.push(initial);

    for istep in 0..nsteps {
      let (t_prev, t_next) = (times[istep], times[istep + 1]);
      let next = self.step(istep + 1, &states[istep], t_prev, t_next)?;
      debug!("Time step {}/{nsteps}, t = {t_next:.4}", istep + 1);
      observer.observe(istep + 1, t_next, &next)?;
      states.push(next);
    }

    info!(
      "solved heat equation: {nsteps} steps up to t={:.4}, {} factorizations",
      times[nsteps],
      self.nfactorizations()
    );

    Ok(HeatSolution {
      times: times.to_vec(),
      states,
    })
  }

  /// Single Backward Euler step, solved as Newton iteration on the residual
  /// $R(u) = M (u - u_"prev") + kappa tau A u - tau M f(t_"next")$.
  ///
  /// The Jacobian $M + kappa tau A$ is restricted to the interior dofs,
  /// while the boundary dofs are set to the Dirichlet data.
  fn step(&mut self, step: usize, prev: &FeFunction, t_prev: f64, t_next: f64) -> Result<FeFunction> {
    let tau = t_next - t_prev;
    let kappa_tau = self.problem.diffusivity * tau;

    let mesh = self.mesh;
    let problem = &self.problem;
    let source = fe::interpolate(mesh, |x| (problem.source)(x, t_next));
    let load = &self.mass_csr * source.coeffs();
    let mass_prev = &self.mass_csr * prev.coeffs();

    let mut u = prev.coeffs().clone();
    for &idof in &self.boundary_dofs {
      u[idof] = (problem.boundary)(mesh.coord(idof), t_next);
    }

    let residual = |u: &Vector| -> Vector {
      let mut r = &self.mass_csr * u + kappa_tau * (&self.laplace_csr * u) - &mass_prev - tau * &load;
      for &idof in &self.boundary_dofs {
        r[idof] = 0.0;
      }
      r
    };

    let (mass, laplace, boundary_dofs) = (&self.mass, &self.laplace, &self.boundary_dofs);
    let jacobian = self.cache.get(tau, || {
      build_system_matrix(mass, laplace, kappa_tau, boundary_dofs).to_nalgebra_csr()
    })?;

    let mut r = residual(&u);
    let r0_norm = masked_norm(&r, &self.boundary_flags);
    let mut niters = 0;
    loop {
      let r_norm = masked_norm(&r, &self.boundary_flags);
      let r_rel = if r0_norm > 0.0 { r_norm / r0_norm } else { 0.0 };
      debug!("Newton iteration {niters}: r (abs) = {r_norm:.3e}, r (rel) = {r_rel:.3e}");

      if r_norm <= self.config.abs_tol || r_norm <= self.config.rel_tol * r0_norm {
        break;
      }
      if niters >= self.config.max_newton_iters {
        return Err(Error::NewtonDiverged {
          step,
          niters,
          residual: r_norm,
        });
      }

      let du = jacobian.solve(&-&r);
      u += du;
      niters += 1;
      r = residual(&u);
    }

    Ok(FeFunction::new(u))
  }
}

/// $M + kappa tau A$ with the rows and columns of the fixed dofs replaced by identity.
fn build_system_matrix(
  mass: &SparseMatrix,
  laplace: &SparseMatrix,
  kappa_tau: f64,
  fixed_dofs: &[DofIdx],
) -> SparseMatrix {
  let mut system = SparseMatrix::lincomb(1.0, mass, kappa_tau, laplace);
  let fixed_flags = util::indicies_to_flags(fixed_dofs, system.nrows());
  system.set_zero(|r, c| fixed_flags[r] || fixed_flags[c]);
  for &idof in fixed_dofs {
    system.push(idof, idof, 1.0);
  }
  system
}

fn validate_times(times: &[f64]) -> Result<()> {
  if times.is_empty() {
    return Err(Error::InvalidTimes("no time points given".into()));
  }
  if let Some(t) = times.iter().find(|t| !t.is_finite()) {
    return Err(Error::InvalidTimes(format!("non-finite time {t}")));
  }
  if let Some(i) = (1..times.len()).find(|&i| times[i] <= times[i - 1]) {
    return Err(Error::InvalidTimes(format!(
      "times must be strictly increasing, but t[{}]={} <= t[{}]={}",
      i,
      times[i],
      i - 1,
      times[i - 1]
    )));
  }
  Ok(())
}

/// Samples every state of a solution at fixed points.
pub fn sample_solution(solution: &HeatSolution, stencil: &EvaluationStencil) -> Vec<Vec<f64>> {
  solution
    .states
    .iter()
    .map(|state| stencil.evaluate(state))
    .collect()
}
