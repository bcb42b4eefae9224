//! Hydraulic network: mass fluxes and pressures of a piping network.

use tracing::{debug, trace};
use zf_components::{ConstantMassFluxPump, ConstantPressurePump, HydraulicComponent, Pipe, ZetaLoss};
use zf_core::ObjectId;
use zf_core::units::{kgps, m, pa};
use zf_fluids::HydraulicFluid;
use zf_model::{
    InputReference, Model, ModelError, ModelInfo, ModelKind, ModelResult, QuantityDescription,
    QuantityName, ReferenceType, ResultAllocator, ResultSet, StateDependency, ValueRef, ValueStore,
    check_input_order,
};
use zf_project::{ComponentModelType, NetworkDef, NetworkElementDef};
use zf_solver::{HydraulicProblem, NetworkSolution, NewtonConfig, SolverError, solve_network};

use super::network::{NetworkTopology, network_fluid};
use crate::quantities as q;

/// Solves the network for the current fluid temperatures on every update.
///
/// The last converged solution warm-starts the next solve. A solve that does
/// not converge is reported as recoverable and leaves the published results
/// and the stored solution untouched.
#[derive(Debug)]
pub struct HydraulicNetworkModel {
    id: ObjectId,
    topology: NetworkTopology,
    fluid: HydraulicFluid,
    components: Vec<Box<dyn HydraulicComponent>>,
    reference_pressure: f64,
    initial_temperature: f64,
    element_temperatures: Vec<f64>,
    newton: NewtonConfig,
    solution: Option<NetworkSolution>,
    results: ResultSet,
    mass_fluxes: Option<ValueRef>,
    pressure_differences: Option<ValueRef>,
    nodal_pressures: Option<ValueRef>,
    fluid_temperatures: Option<ValueRef>,
    refs: Vec<InputReference>,
}

impl HydraulicNetworkModel {
    pub fn new(def: &NetworkDef, topology: NetworkTopology) -> ModelResult<Self> {
        let model = format!("HydraulicNetworkModel(#{})", def.id);
        let fluid = network_fluid(def)?;
        let components = def
            .elements
            .iter()
            .map(|element| hydraulic_component(&model, def, element))
            .collect::<ModelResult<Vec<_>>>()?;
        debug!(network = def.id, elements = components.len(), "hydraulic network built");
        Ok(Self {
            id: def.id,
            element_temperatures: vec![def.initial_fluid_temperature_k; components.len()],
            topology,
            fluid,
            components,
            reference_pressure: def.reference_pressure_pa,
            initial_temperature: def.initial_fluid_temperature_k,
            newton: NewtonConfig::default(),
            solution: None,
            results: ResultSet::new(),
            mass_fluxes: None,
            pressure_differences: None,
            nodal_pressures: None,
            fluid_temperatures: None,
            refs: Vec::new(),
        })
    }

    /// Last converged solution.
    pub fn solution(&self) -> Option<&NetworkSolution> {
        self.solution.as_ref()
    }

    pub fn topology(&self) -> &NetworkTopology {
        &self.topology
    }
}

/// Flow characteristic of one element from its component (and pipe) entry.
fn hydraulic_component(
    model: &str,
    def: &NetworkDef,
    element: &NetworkElementDef,
) -> ModelResult<Box<dyn HydraulicComponent>> {
    let component = def.component(element.component_id).ok_or_else(|| ModelError::MissingReference {
        model: model.to_string(),
        what: format!("component #{} of flow element #{}", element.component_id, element.id),
    })?;
    let parameter = |value: Option<f64>, name: &str| {
        value.ok_or_else(|| {
            ModelError::missing_parameter(
                model,
                format!("{name} of component #{} ({})", component.id, component.name),
            )
        })
    };
    let invalid = |e: zf_components::ComponentError| {
        ModelError::invalid_arg(model, format!("flow element #{}: {e}", element.id))
    };
    let name = element.name.clone();

    let built: Box<dyn HydraulicComponent> = match component.model_type {
        ComponentModelType::SimplePipe | ComponentModelType::DynamicPipe => {
            let pipe_id = element.pipe_id.ok_or_else(|| ModelError::MissingReference {
                model: model.to_string(),
                what: format!("pipe properties of flow element #{}", element.id),
            })?;
            let pipe = def.pipe(pipe_id).ok_or_else(|| ModelError::MissingReference {
                model: model.to_string(),
                what: format!("pipe #{pipe_id} of flow element #{}", element.id),
            })?;
            let length = element
                .length_m
                .ok_or_else(|| {
                    let what = format!("length of flow element #{}", element.id);
                    ModelError::missing_parameter(model, what)
                })?;
            Box::new(
                Pipe::new(name, m(length), m(pipe.diameter_inside_m), m(pipe.roughness_m))
                    .map_err(invalid)?,
            )
        }
        ComponentModelType::ConstantPressurePump => {
            let head = parameter(component.pressure_head_pa, "pressure head")?;
            Box::new(ConstantPressurePump::new(name, pa(head)).map_err(invalid)?)
        }
        ComponentModelType::ConstantMassFluxPump => {
            let mass_flux = parameter(component.mass_flux_kg_s, "mass flux")?;
            Box::new(ConstantMassFluxPump::new(name, kgps(mass_flux)).map_err(invalid)?)
        }
        ComponentModelType::HeatExchanger | ComponentModelType::HeatPumpIdealCarnot => {
            let zeta = parameter(component.zeta, "zeta")?;
            let diameter = parameter(component.hydraulic_diameter_m, "hydraulic diameter")?;
            Box::new(ZetaLoss::new(name, zeta, diameter).map_err(invalid)?)
        }
    };
    Ok(built)
}

impl Model for HydraulicNetworkModel {
    fn reference_type(&self) -> Option<ReferenceType> {
        Some(ReferenceType::Network)
    }

    fn id(&self) -> ObjectId {
        self.id
    }

    fn display_name(&self) -> String {
        format!("HydraulicNetworkModel(#{})", self.id)
    }

    fn kind(&self) -> ModelKind {
        ModelKind::HydraulicNetwork { network_id: self.id }
    }

    fn init_results(
        &mut self,
        _models: &[ModelInfo],
        alloc: &mut ResultAllocator<'_>,
    ) -> ModelResult<()> {
        let elements = self.topology.element_ids();
        let nodes = self.topology.node_ids();

        let r = alloc.algebraic(elements.len());
        self.mass_fluxes = Some(self.results.push(
            QuantityDescription::keyed(
                q::MASS_FLUXES,
                "kg/s",
                "Mass flux per flow element, inlet to outlet",
                elements.clone(),
            ),
            r,
        ));
        let r = alloc.algebraic(elements.len());
        self.pressure_differences = Some(self.results.push(
            QuantityDescription::keyed(
                q::PRESSURE_DIFFERENCES,
                "Pa",
                "Pressure difference inlet minus outlet",
                elements,
            ),
            r,
        ));
        let r = alloc.algebraic(nodes.len());
        self.nodal_pressures = Some(self.results.push(
            QuantityDescription::keyed(q::NODAL_PRESSURES, "Pa", "Pressure per node", nodes),
            r,
        ));
        Ok(())
    }

    fn result_descriptions(&self, out: &mut Vec<QuantityDescription>) {
        self.results.descriptions(out);
    }

    fn result_value_refs(&self, out: &mut Vec<ValueRef>) {
        self.results.value_refs(out);
    }

    fn result_value_ref(&self, quantity: &QuantityName) -> Option<ValueRef> {
        self.results.lookup(quantity)
    }

    fn as_state_dependency(&self) -> Option<&dyn StateDependency> {
        Some(self)
    }

    fn as_state_dependency_mut(&mut self) -> Option<&mut dyn StateDependency> {
        Some(self)
    }
}

impl StateDependency for HydraulicNetworkModel {
    fn init_input_references(&mut self, _models: &[ModelInfo]) -> ModelResult<()> {
        // temperatures for the viscosity; without a thermal network the
        // initial fluid temperature is used throughout
        self.refs = vec![InputReference::optional(
            ReferenceType::Network,
            self.id,
            QuantityName::new(q::FLUID_TEMPERATURES),
        )];
        Ok(())
    }

    fn input_references(&self, out: &mut Vec<InputReference>) {
        out.clear();
        out.extend(self.refs.iter().cloned());
    }

    fn set_input_value_refs(
        &mut self,
        refs: &[InputReference],
        resolved: &[Option<ValueRef>],
    ) -> ModelResult<()> {
        check_input_order(&self.display_name(), &self.refs, refs, resolved)?;
        self.fluid_temperatures = resolved[0];
        if let Some(r) = self.fluid_temperatures {
            if r.len != self.components.len() {
                return Err(ModelError::invalid_arg(
                    self.display_name(),
                    format!("expected {} fluid temperatures, got {}", self.components.len(), r.len),
                ));
            }
        }
        Ok(())
    }

    fn update(&mut self, store: &mut ValueStore) -> ModelResult<()> {
        match self.fluid_temperatures {
            Some(r) => self.element_temperatures.copy_from_slice(store.slice(r)),
            None => self.element_temperatures.fill(self.initial_temperature),
        }

        let problem = HydraulicProblem::new(
            &self.topology.graph,
            &self.fluid,
            &self.components,
            &self.element_temperatures,
            self.topology.reference_node,
            self.reference_pressure,
        )
        .map_err(|e| ModelError::invalid_arg(self.display_name(), e.to_string()))?;

        let solution = match solve_network(&problem, &self.newton, self.solution.as_ref()) {
            Ok(solution) => solution,
            Err(e @ (SolverError::ProblemSetup { .. } | SolverError::Graph(_))) => {
                return Err(ModelError::invalid_arg(self.display_name(), e.to_string()));
            }
            Err(e) => {
                return Err(ModelError::Recoverable {
                    model: self.display_name(),
                    what: format!("hydraulic solve failed: {e}"),
                });
            }
        };
        trace!(
            network = self.id,
            iterations = solution.iterations,
            residual = solution.residual_norm,
            "hydraulic network solved"
        );

        let dp = solution.pressure_differences(&problem);
        if let Some(r) = self.mass_fluxes {
            store.write(r, &solution.mass_fluxes);
        }
        if let Some(r) = self.pressure_differences {
            store.write(r, &dp);
        }
        if let Some(r) = self.nodal_pressures {
            store.write(r, &solution.pressures);
        }
        self.solution = Some(solution);
        Ok(())
    }
}
