//! Simulation runner and result recording.

use tracing::warn;

use crate::error::{SimError, SimResult};
use crate::integrator::{ForwardEuler, Integrator, RK4};
use crate::model::TransientModel;

/// Integrator selection for simulation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum IntegratorType {
    /// 4th-order Runge-Kutta (default, 4 rhs calls per step).
    #[default]
    RK4,
    /// Forward Euler (1st-order, 1 rhs call per step).
    ForwardEuler,
}

/// Options for simulation runs.
#[derive(Clone, Debug)]
pub struct SimOptions {
    /// Nominal time step (seconds)
    pub dt: f64,
    /// Final simulation time (seconds)
    pub t_end: f64,
    /// Maximum number of steps (safety limit)
    pub max_steps: usize,
    /// Record every N-th step (decimation)
    pub record_every: usize,
    pub integrator: IntegratorType,
    /// Smallest step a cut-back may produce
    pub min_dt: f64,
    /// Cut-backs allowed within one step
    pub max_retries: usize,
    /// Step reduction per retry, in (0, 1)
    pub cutback_factor: f64,
    /// Step growth after a successful step, back towards `dt`
    pub grow_factor: f64,
}

impl Default for SimOptions {
    fn default() -> Self {
        Self {
            dt: 60.0,
            t_end: 86_400.0,
            max_steps: 1_000_000,
            record_every: 60,
            integrator: IntegratorType::default(),
            min_dt: 1e-3,
            max_retries: 8,
            cutback_factor: 0.5,
            grow_factor: 2.0,
        }
    }
}

impl SimOptions {
    fn validate(&self) -> SimResult<()> {
        if !(self.dt > 0.0 && self.dt.is_finite()) {
            return Err(SimError::InvalidArg {
                what: "dt must be positive",
            });
        }
        if !(self.t_end >= 0.0 && self.t_end.is_finite()) {
            return Err(SimError::InvalidArg {
                what: "t_end must be non-negative",
            });
        }
        if self.max_steps == 0 {
            return Err(SimError::InvalidArg {
                what: "max_steps must be positive",
            });
        }
        if self.record_every == 0 {
            return Err(SimError::InvalidArg {
                what: "record_every must be positive",
            });
        }
        if !(self.cutback_factor > 0.0 && self.cutback_factor < 1.0) {
            return Err(SimError::InvalidArg {
                what: "cutback_factor must be in (0, 1)",
            });
        }
        if !(self.grow_factor >= 1.0) {
            return Err(SimError::InvalidArg {
                what: "grow_factor must be >= 1",
            });
        }
        Ok(())
    }
}

/// Record of simulation results.
#[derive(Clone, Debug)]
pub struct SimRecord<S> {
    /// Time points (seconds)
    pub t: Vec<f64>,
    /// State snapshots
    pub x: Vec<S>,
    /// Accepted steps
    pub steps: usize,
    /// Cut-backs over the whole run
    pub cutback_retries: usize,
}

/// Progress snapshot passed to the callback after every accepted step.
#[derive(Clone, Copy, Debug)]
pub struct SimProgress {
    pub step: usize,
    pub sim_time: f64,
    pub t_end: f64,
    pub fraction_complete: f64,
    pub cutback_retries: usize,
}

/// Run a transient simulation with the fixed-step integrator of `opts`.
pub fn run_sim<M: TransientModel>(
    model: &mut M,
    opts: &SimOptions,
) -> SimResult<SimRecord<M::State>> {
    run_sim_with_progress(model, opts, None)
}

/// Like [`run_sim`], reporting progress after every accepted step.
///
/// A step failing with `SimError::Retryable` is repeated from the same state
/// with the step scaled by `cutback_factor`, at most `max_retries` times and
/// never below `min_dt`. After every accepted step the step size grows back
/// towards `dt` by `grow_factor`.
pub fn run_sim_with_progress<M: TransientModel>(
    model: &mut M,
    opts: &SimOptions,
    mut progress: Option<&mut dyn FnMut(SimProgress)>,
) -> SimResult<SimRecord<M::State>> {
    opts.validate()?;

    let mut t = 0.0;
    let mut x = model.initial_state();

    let mut t_record = vec![t];
    let mut x_record = vec![x.clone()];

    let t_eps = 1e-12 * opts.t_end.max(1.0);
    let mut dt = opts.dt;
    let mut step = 0;
    let mut cutback_retries = 0;

    while opts.t_end - t > t_eps && step < opts.max_steps {
        let mut h = dt.min(opts.t_end - t);
        let mut attempts = 0;
        let x_new = loop {
            match integrate(opts.integrator, model, t, &x, h) {
                Ok(x_new) => break x_new,
                Err(SimError::Retryable { message }) => {
                    attempts += 1;
                    cutback_retries += 1;
                    let next = h * opts.cutback_factor;
                    if attempts > opts.max_retries || next < opts.min_dt {
                        return Err(SimError::RetriesExhausted { t, dt: h, message });
                    }
                    warn!(t, dt = h, next_dt = next, %message, "step failed, cutting back");
                    h = next;
                }
                Err(e) => return Err(e),
            }
        };

        t += h;
        x = x_new;
        step += 1;
        // a cut-back step restarts growth from the step that succeeded
        let base = if attempts > 0 { h } else { dt };
        dt = (base * opts.grow_factor).min(opts.dt);

        if step % opts.record_every == 0 {
            t_record.push(t);
            x_record.push(x.clone());
        }

        if let Some(cb) = progress.as_mut() {
            cb(SimProgress {
                step,
                sim_time: t,
                t_end: opts.t_end,
                fraction_complete: if opts.t_end > 0.0 { t / opts.t_end } else { 1.0 },
                cutback_retries,
            });
        }
    }

    // Always record final state
    if step % opts.record_every != 0 {
        t_record.push(t);
        x_record.push(x);
    }

    Ok(SimRecord {
        t: t_record,
        x: x_record,
        steps: step,
        cutback_retries,
    })
}

fn integrate<M: TransientModel>(
    integrator: IntegratorType,
    model: &mut M,
    t: f64,
    x: &M::State,
    dt: f64,
) -> SimResult<M::State> {
    match integrator {
        IntegratorType::RK4 => RK4.step(model, t, x, dt),
        IntegratorType::ForwardEuler => ForwardEuler.step(model, t, x, dt),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Constant;

    impl TransientModel for Constant {
        type State = f64;

        fn initial_state(&self) -> f64 {
            0.0
        }

        fn rhs(&mut self, _t: f64, _x: &f64) -> SimResult<f64> {
            Ok(1.0)
        }

        fn add(&self, a: &f64, b: &f64) -> f64 {
            a + b
        }

        fn scale(&self, a: &f64, s: f64) -> f64 {
            a * s
        }
    }

    #[test]
    fn sim_options_invalid() {
        let opts = SimOptions {
            dt: 0.0,
            ..SimOptions::default()
        };
        assert!(matches!(run_sim(&mut Constant, &opts), Err(SimError::InvalidArg { .. })));

        let opts = SimOptions {
            cutback_factor: 1.5,
            ..SimOptions::default()
        };
        assert!(run_sim(&mut Constant, &opts).is_err());
    }

    #[test]
    fn records_decimated_and_final_state() {
        let opts = SimOptions {
            dt: 1.0,
            t_end: 5.0,
            record_every: 2,
            ..SimOptions::default()
        };
        let record = run_sim(&mut Constant, &opts).unwrap();
        assert_eq!(record.t, vec![0.0, 2.0, 4.0, 5.0]);
        assert!((record.x[3] - 5.0).abs() < 1e-12);
        assert_eq!(record.steps, 5);
        assert_eq!(record.cutback_retries, 0);
    }

    #[test]
    fn last_step_is_shortened_to_hit_t_end() {
        let opts = SimOptions {
            dt: 0.4,
            t_end: 1.0,
            record_every: 1,
            ..SimOptions::default()
        };
        let mut seen = Vec::new();
        let mut on_step = |p: SimProgress| seen.push(p.sim_time);
        let record = run_sim_with_progress(&mut Constant, &opts, Some(&mut on_step)).unwrap();
        assert!((record.t.last().unwrap() - 1.0).abs() < 1e-12);
        assert_eq!(seen.len(), 3);
    }

    /// Fails recoverably on the first `failures` evaluations.
    struct Stubborn {
        failures: usize,
    }

    impl TransientModel for Stubborn {
        type State = f64;

        fn initial_state(&self) -> f64 {
            0.0
        }

        fn rhs(&mut self, _t: f64, _x: &f64) -> SimResult<f64> {
            if self.failures > 0 {
                self.failures -= 1;
                return Err(SimError::Retryable {
                    message: "not yet".to_string(),
                });
            }
            Ok(1.0)
        }

        fn add(&self, a: &f64, b: &f64) -> f64 {
            a + b
        }

        fn scale(&self, a: &f64, s: f64) -> f64 {
            a * s
        }
    }

    #[test]
    fn step_grows_back_right_after_a_cutback() {
        let opts = SimOptions {
            dt: 8.0,
            t_end: 16.0,
            record_every: 1,
            min_dt: 0.1,
            ..SimOptions::default()
        };
        let record = run_sim(&mut Stubborn { failures: 2 }, &opts).unwrap();
        assert_eq!(record.cutback_retries, 2);
        assert_eq!(record.t, vec![0.0, 2.0, 6.0, 14.0, 16.0]);
        assert!((record.x[4] - 16.0).abs() < 1e-12);
    }
}
