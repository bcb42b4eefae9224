//! Lumped construction (wall, floor, ceiling) balance.

use zf_core::ObjectId;
use zf_model::{
    BalanceModel, InputReference, Model, ModelError, ModelInfo, ModelKind, ModelResult,
    QuantityDescription, QuantityName, ReferenceType, ResultAllocator, ResultSet, StateDependency,
    StateModel, ValueRef, ValueStore, check_input_order,
};
use zf_project::ConstructionDef;

use crate::quantities as q;

/// One face of a construction.
#[derive(Debug, Clone, Copy)]
struct Side {
    zone: Option<ObjectId>,
    /// Surface heat transfer coefficient [W/m2K]
    h: f64,
    /// Resolved zone air temperature; `None` for the outside
    air_temperature: Option<ValueRef>,
    flux: Option<ValueRef>,
}

/// Construction with a single thermal mass in its core.
///
/// The state is the internal energy of the layer, `U = c A T_wall`. Each side
/// exchanges heat with its zone (or the outside) through the surface
/// resistance plus half the layer resistance. Published fluxes are positive
/// from the room into the wall.
#[derive(Debug)]
pub struct ConstructionBalanceModel {
    id: ObjectId,
    area: f64,
    heat_capacity: f64,
    resistance: f64,
    outside_temperature: f64,
    initial_temperature: f64,
    sides: [Side; 2],
    results: ResultSet,
    wall_temperature: Option<ValueRef>,
    ydot: Option<ValueRef>,
    refs: Vec<InputReference>,
}

impl ConstructionBalanceModel {
    pub fn new(
        def: &ConstructionDef,
        outside_temperature_k: f64,
        initial_temperature_k: f64,
    ) -> ModelResult<Self> {
        let model = format!("ConstructionInstance(#{})", def.id);
        if !(def.area_m2 > 0.0) {
            return Err(ModelError::invalid_arg(model, "area must be positive"));
        }
        if !(def.areal_heat_capacity_j_m2k > 0.0) {
            return Err(ModelError::invalid_arg(model, "areal heat capacity must be positive"));
        }
        if !(def.thermal_resistance_m2k_w >= 0.0) {
            return Err(ModelError::invalid_arg(model, "thermal resistance must not be negative"));
        }
        if def.zone_a.is_none() && def.zone_b.is_none() {
            return Err(ModelError::MissingReference {
                model,
                what: "a zone on at least one side".into(),
            });
        }
        let side = |zone, h| Side {
            zone,
            h,
            air_temperature: None,
            flux: None,
        };
        Ok(Self {
            id: def.id,
            area: def.area_m2,
            heat_capacity: def.areal_heat_capacity_j_m2k * def.area_m2,
            resistance: def.thermal_resistance_m2k_w,
            outside_temperature: outside_temperature_k,
            initial_temperature: initial_temperature_k,
            sides: [
                side(def.zone_a, def.surface_coefficient_a_w_m2k),
                side(def.zone_b, def.surface_coefficient_b_w_m2k),
            ],
            results: ResultSet::new(),
            wall_temperature: None,
            ydot: None,
            refs: Vec::new(),
        })
    }

    /// Conductance [W/K] from one side's air to the wall core.
    fn conductance(&self, side: &Side) -> f64 {
        let r = self.resistance / 2.0 + if side.h > 0.0 { 1.0 / side.h } else { f64::INFINITY };
        self.area / r
    }

    fn side_temperature(&self, side: &Side, store: &ValueStore) -> f64 {
        side.air_temperature.map_or(self.outside_temperature, |r| store.get(r))
    }
}

impl Model for ConstructionBalanceModel {
    fn reference_type(&self) -> Option<ReferenceType> {
        Some(ReferenceType::ConstructionInstance)
    }

    fn id(&self) -> ObjectId {
        self.id
    }

    fn kind(&self) -> ModelKind {
        ModelKind::ConstructionBalance {
            zone_a: self.sides[0].zone,
            zone_b: self.sides[1].zone,
        }
    }

    fn init_results(
        &mut self,
        _models: &[ModelInfo],
        alloc: &mut ResultAllocator<'_>,
    ) -> ModelResult<()> {
        let r = alloc.state_derived(1);
        self.wall_temperature = Some(self.results.push(
            QuantityDescription::scalar(
                q::WALL_TEMPERATURE,
                "K",
                "Temperature of the construction core",
            ),
            r,
        ));
        let names = [q::FLUX_HEAT_CONDUCTION_A, q::FLUX_HEAT_CONDUCTION_B];
        for (side, name) in self.sides.iter_mut().zip(names) {
            let r = alloc.algebraic(1);
            side.flux = Some(self.results.push(
                QuantityDescription::scalar(
                    name,
                    "W",
                    "Heat conduction flux from the adjacent air into the construction",
                ),
                r,
            ));
        }
        let r = alloc.algebraic(1);
        self.ydot = Some(self.results.push(
            QuantityDescription::whole_only(
                q::YDOT,
                "W",
                "Derivative of the construction internal energy",
                1,
            ),
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

    fn as_state_model(&self) -> Option<&dyn StateModel> {
        Some(self)
    }

    fn as_state_model_mut(&mut self) -> Option<&mut dyn StateModel> {
        Some(self)
    }

    fn as_balance_model(&self) -> Option<&dyn BalanceModel> {
        Some(self)
    }
}

impl StateDependency for ConstructionBalanceModel {
    fn init_input_references(&mut self, _models: &[ModelInfo]) -> ModelResult<()> {
        self.refs = self
            .sides
            .iter()
            .filter_map(|s| s.zone)
            .map(|zone| InputReference::required(
                ReferenceType::Zone,
                zone,
                QuantityName::new(q::AIR_TEMPERATURE),
            ))
            .collect();
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
        let mut resolved = resolved.iter();
        for side in self.sides.iter_mut().filter(|s| s.zone.is_some()) {
            side.air_temperature = resolved.next().copied().flatten();
        }
        Ok(())
    }

    fn state_dependencies(&self, out: &mut Vec<(ValueRef, ValueRef)>) {
        let Some(ydot) = self.ydot else { return };
        for side in &self.sides {
            if let Some(flux) = side.flux {
                if let Some(t) = side.air_temperature {
                    out.push((flux, t));
                }
                out.push((ydot, flux));
            }
        }
    }

    fn update(&mut self, store: &mut ValueStore) -> ModelResult<()> {
        let t_wall = self.wall_temperature.map_or(self.initial_temperature, |r| store.get(r));
        let mut sum = 0.0;
        for side in &self.sides {
            let flux = self.conductance(side) * (self.side_temperature(side, store) - t_wall);
            if let Some(r) = side.flux {
                store.set(r, flux);
            }
            sum += flux;
        }
        if let Some(r) = self.ydot {
            store.set(r, sum);
        }
        Ok(())
    }
}

impl StateModel for ConstructionBalanceModel {
    fn n(&self) -> usize {
        1
    }

    fn state_key(&self) -> (ReferenceType, ObjectId) {
        (ReferenceType::ConstructionInstance, self.id)
    }

    fn y_initial(&self, y: &mut [f64]) {
        y[0] = self.heat_capacity * self.initial_temperature;
    }

    fn set_states(&mut self, y: &[f64], store: &mut ValueStore) -> ModelResult<()> {
        let t = y[0] / self.heat_capacity;
        if !t.is_finite() {
            return Err(ModelError::Recoverable {
                model: self.display_name(),
                what: format!("non-finite wall temperature from internal energy {}", y[0]),
            });
        }
        if let Some(r) = self.wall_temperature {
            store.set(r, t);
        }
        Ok(())
    }
}

impl BalanceModel for ConstructionBalanceModel {
    fn state_key(&self) -> (ReferenceType, ObjectId) {
        (ReferenceType::ConstructionInstance, self.id)
    }

    fn ydot(&self, store: &ValueStore, out: &mut [f64]) {
        if let Some(r) = self.ydot {
            out[0] = store.get(r);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wall() -> ConstructionDef {
        ConstructionDef {
            id: 10,
            name: "wall".into(),
            zone_a: Some(1),
            zone_b: None,
            area_m2: 10.0,
            areal_heat_capacity_j_m2k: 50_000.0,
            thermal_resistance_m2k_w: 2.0,
            surface_coefficient_a_w_m2k: 8.0,
            surface_coefficient_b_w_m2k: 25.0,
        }
    }

    #[test]
    fn fluxes_point_from_air_into_wall() {
        let mut model = ConstructionBalanceModel::new(&wall(), 263.15, 283.15).unwrap();
        let mut store = ValueStore::new();
        model.init_results(&[], &mut store.allocator(0)).unwrap();
        model.init_input_references(&[]).unwrap();

        // zone air temperature lives in a slot owned by another model
        let t_zone = store.allocator(1).state_derived(1);
        store.set(t_zone, 293.15);
        let refs = model.refs.clone();
        model.set_input_value_refs(&refs, &[Some(t_zone)]).unwrap();

        let mut y = [0.0];
        model.y_initial(&mut y);
        model.set_states(&y, &mut store).unwrap();
        model.update(&mut store).unwrap();

        let flux = |name: &str| {
            let r = model.result_value_ref(&QuantityName::new(name)).unwrap();
            store.get(r)
        };
        let a = flux(q::FLUX_HEAT_CONDUCTION_A);
        let b = flux(q::FLUX_HEAT_CONDUCTION_B);
        // 10 m2 / (1/8 + 1) * 10 K
        assert!((a - 100.0 / 1.125).abs() < 1e-9);
        // outside: 10 m2 / (1/25 + 1) * -20 K
        assert!((b + 200.0 / 1.04).abs() < 1e-9);

        let mut ydot = [0.0];
        BalanceModel::ydot(&model, &store, &mut ydot);
        assert!((ydot[0] - (a + b)).abs() < 1e-12);
    }

    #[test]
    fn rejects_construction_without_zone() {
        let def = ConstructionDef {
            zone_a: None,
            ..wall()
        };
        assert!(matches!(
            ConstructionBalanceModel::new(&def, 263.15, 283.15),
            Err(ModelError::MissingReference { .. })
        ));
    }
}
