//! Integration of a wired model graph with output sampling.

use tracing::info;
use zf_model::{ModelGraph, ModelIndex};
use zf_project::{IntegratorDef, IntegratorKind, Project};

use crate::builder::{BuiltGraph, build_model_graph};
use crate::error::{SimError, SimResult};
use crate::model::TransientModel;
use crate::models::OutputHandler;
use crate::sim::{IntegratorType, SimOptions, SimProgress, SimRecord, run_sim_with_progress};

impl TransientModel for ModelGraph {
    type State = Vec<f64>;

    fn initial_state(&self) -> Vec<f64> {
        self.y_initial()
    }

    fn rhs(&mut self, t: f64, x: &Vec<f64>) -> SimResult<Vec<f64>> {
        let mut ydot = vec![0.0; x.len()];
        self.evaluate(t, x, &mut ydot)?;
        Ok(ydot)
    }

    fn add(&self, a: &Vec<f64>, b: &Vec<f64>) -> Vec<f64> {
        a.iter().zip(b).map(|(a, b)| a + b).collect()
    }

    fn scale(&self, a: &Vec<f64>, scale: f64) -> Vec<f64> {
        a.iter().map(|a| a * scale).collect()
    }
}

impl SimOptions {
    /// Runner options of a project; outputs are recorded every
    /// `output_interval_s`, rounded to whole steps.
    pub fn from_integrator_def(def: &IntegratorDef) -> Self {
        let record_every = if def.dt_s > 0.0 {
            (def.output_interval_s / def.dt_s).round().max(1.0) as usize
        } else {
            1
        };
        Self {
            dt: def.dt_s,
            t_end: def.t_end_s,
            record_every,
            integrator: match def.method {
                IntegratorKind::Rk4 => IntegratorType::RK4,
                IntegratorKind::ForwardEuler => IntegratorType::ForwardEuler,
            },
            min_dt: def.min_dt_s,
            max_retries: def.max_retries,
            cutback_factor: def.cutback_factor,
            grow_factor: def.grow_factor,
            ..Self::default()
        }
    }
}

/// A project's model graph bound to the fixed-step runner.
pub struct Simulation {
    graph: ModelGraph,
    output: ModelIndex,
    options: SimOptions,
}

impl Simulation {
    pub fn from_project(project: &Project) -> SimResult<Self> {
        let BuiltGraph { graph, output } = build_model_graph(project)?;
        Ok(Self {
            graph,
            output,
            options: SimOptions::from_integrator_def(&project.integrator),
        })
    }

    pub fn graph(&self) -> &ModelGraph {
        &self.graph
    }

    pub fn options(&self) -> &SimOptions {
        &self.options
    }

    pub fn output(&self) -> Option<&OutputHandler> {
        self.graph.downcast_ref::<OutputHandler>(self.output)
    }

    fn output_mut(&mut self) -> SimResult<&mut OutputHandler> {
        self.graph
            .downcast_mut::<OutputHandler>(self.output)
            .ok_or(SimError::InvalidArg {
                what: "output handler missing from the model graph",
            })
    }

    /// Integrate from 0 to `t_end` and sample the outputs at every recorded
    /// state.
    pub fn run(&mut self) -> SimResult<SimRecord<Vec<f64>>> {
        self.run_with_progress(None)
    }

    pub fn run_with_progress(
        &mut self,
        progress: Option<&mut dyn FnMut(SimProgress)>,
    ) -> SimResult<SimRecord<Vec<f64>>> {
        let record = run_sim_with_progress(&mut self.graph, &self.options, progress)?;

        self.output_mut()?.clear();
        // re-evaluate so every output sees the recorded state
        let mut ydot = vec![0.0; self.graph.n_states()];
        for (t, x) in record.t.iter().zip(&record.x) {
            self.graph.evaluate(*t, x, &mut ydot)?;
            self.output_mut()?.sample(*t);
        }
        info!(
            steps = record.steps,
            samples = record.t.len(),
            cutbacks = record.cutback_retries,
            "simulation finished"
        );
        Ok(record)
    }
}
