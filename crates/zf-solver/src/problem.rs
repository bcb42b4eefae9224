//! Hydraulic network problem definition.

use crate::error::{SolverError, SolverResult};
use nalgebra::DVector;
use zf_components::{FlowContext, HydraulicComponent};
use zf_core::NodeId;
use zf_fluids::HydraulicFluid;
use zf_graph::Graph;

/// Mass flux and pressure problem of one network.
///
/// Unknown vector layout: `[mdot_0 .. mdot_{E-1}, p_0 .. p_{N-1}]` with
/// elements and nodes in graph order.
pub struct HydraulicProblem<'a> {
    pub graph: &'a Graph,
    pub fluid: &'a HydraulicFluid,
    /// One component per flow element, in graph order
    pub components: &'a [Box<dyn HydraulicComponent>],
    /// Mean fluid temperature per element [K]
    pub element_temperatures: &'a [f64],
    /// Node whose pressure is fixed
    pub reference_node: NodeId,
    pub reference_pressure: f64,
}

impl<'a> HydraulicProblem<'a> {
    pub fn new(
        graph: &'a Graph,
        fluid: &'a HydraulicFluid,
        components: &'a [Box<dyn HydraulicComponent>],
        element_temperatures: &'a [f64],
        reference_node: NodeId,
        reference_pressure: f64,
    ) -> SolverResult<Self> {
        let problem = Self {
            graph,
            fluid,
            components,
            element_temperatures,
            reference_node,
            reference_pressure,
        };
        problem.validate()?;
        Ok(problem)
    }

    pub fn validate(&self) -> SolverResult<()> {
        let element_count = self.graph.elements().len();
        if self.components.len() != element_count {
            return Err(SolverError::ProblemSetup {
                what: format!(
                    "component count mismatch: {} != {}",
                    self.components.len(),
                    element_count
                ),
            });
        }
        if self.element_temperatures.len() != element_count {
            return Err(SolverError::ProblemSetup {
                what: format!(
                    "element temperature count mismatch: {} != {}",
                    self.element_temperatures.len(),
                    element_count
                ),
            });
        }
        if self.graph.node(self.reference_node).is_none() {
            return Err(SolverError::ProblemSetup {
                what: format!("reference node {} does not exist", self.reference_node),
            });
        }
        if !self.reference_pressure.is_finite() {
            return Err(SolverError::ProblemSetup {
                what: "reference pressure must be finite".into(),
            });
        }
        Ok(())
    }

    pub fn element_count(&self) -> usize {
        self.graph.elements().len()
    }

    pub fn node_count(&self) -> usize {
        self.graph.nodes().len()
    }

    /// Number of unknowns (and equations).
    pub fn dimension(&self) -> usize {
        self.element_count() + self.node_count()
    }

    /// Residual vector: element equations followed by node equations.
    pub fn residuals(&self, x: &DVector<f64>) -> SolverResult<DVector<f64>> {
        let ne = self.element_count();
        let mut r = DVector::zeros(self.dimension());

        for (i, element) in self.graph.elements().iter().enumerate() {
            let mdot = x[i];
            let dp = x[ne + element.inlet.idx()] - x[ne + element.outlet.idx()];
            let ctx = FlowContext {
                fluid: self.fluid,
                temperature_k: self.element_temperatures[i],
            };
            r[i] = self.components[i].residual(ctx, mdot, dp)?;
        }

        for node in self.graph.nodes() {
            let row = ne + node.id.idx();
            if node.id == self.reference_node {
                r[row] = x[row] - self.reference_pressure;
                continue;
            }
            let inflow: f64 = self.graph.inflow_elements(node.id).map(|e| x[e.idx()]).sum();
            let outflow: f64 = self.graph.outflow_elements(node.id).map(|e| x[e.idx()]).sum();
            r[row] = inflow - outflow;
        }

        Ok(r)
    }

    /// Starting point: component seed mass fluxes and uniform reference pressure.
    pub fn initial_guess(&self) -> DVector<f64> {
        let ne = self.element_count();
        DVector::from_fn(self.dimension(), |i, _| {
            if i < ne {
                self.components[i].initial_mass_flux()
            } else {
                self.reference_pressure
            }
        })
    }
}
