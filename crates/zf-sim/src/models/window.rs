//! Windows embedded in constructions.

use zf_core::ObjectId;
use zf_model::{
    InputReference, Model, ModelError, ModelInfo, ModelKind, ModelResult, QuantityDescription,
    QuantityName, ReferenceType, ResultAllocator, ResultSet, StateDependency, ValueRef, ValueStore,
    check_input_order,
};
use zf_project::WindowDef;

use crate::quantities as q;

/// Steady-state conduction through a glazing, `Q = U A (T_a - T_b)`.
///
/// Sides follow the host construction; a side without zone is the outside.
/// `FluxHeatConductionA` is positive out of side A, `FluxHeatConductionB`
/// positive out of side B.
#[derive(Debug)]
pub struct WindowModel {
    id: ObjectId,
    conductance: f64,
    zones: [Option<ObjectId>; 2],
    outside_temperature: f64,
    temperatures: [Option<ValueRef>; 2],
    results: ResultSet,
    flux_a: Option<ValueRef>,
    flux_b: Option<ValueRef>,
    refs: Vec<InputReference>,
}

impl WindowModel {
    pub fn new(
        def: &WindowDef,
        zone_a: Option<ObjectId>,
        zone_b: Option<ObjectId>,
        outside_temperature_k: f64,
    ) -> ModelResult<Self> {
        if !(def.area_m2 > 0.0 && def.u_value_w_m2k >= 0.0) {
            return Err(ModelError::invalid_arg(
                format!("EmbeddedObject(#{})", def.id),
                "area must be positive and U-value non-negative",
            ));
        }
        Ok(Self {
            id: def.id,
            conductance: def.u_value_w_m2k * def.area_m2,
            zones: [zone_a, zone_b],
            outside_temperature: outside_temperature_k,
            temperatures: [None; 2],
            results: ResultSet::new(),
            flux_a: None,
            flux_b: None,
            refs: Vec::new(),
        })
    }
}

impl Model for WindowModel {
    fn reference_type(&self) -> Option<ReferenceType> {
        Some(ReferenceType::EmbeddedObject)
    }

    fn id(&self) -> ObjectId {
        self.id
    }

    fn kind(&self) -> ModelKind {
        ModelKind::EmbeddedObject {
            zone_a: self.zones[0],
            zone_b: self.zones[1],
        }
    }

    fn init_results(
        &mut self,
        _models: &[ModelInfo],
        alloc: &mut ResultAllocator<'_>,
    ) -> ModelResult<()> {
        let r = alloc.algebraic(1);
        self.flux_a = Some(self.results.push(
            QuantityDescription::scalar(
                q::FLUX_HEAT_CONDUCTION_A,
                "W",
                "Heat conduction out of side A",
            ),
            r,
        ));
        let r = alloc.algebraic(1);
        self.flux_b = Some(self.results.push(
            QuantityDescription::scalar(
                q::FLUX_HEAT_CONDUCTION_B,
                "W",
                "Heat conduction out of side B",
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
}

impl StateDependency for WindowModel {
    fn init_input_references(&mut self, _models: &[ModelInfo]) -> ModelResult<()> {
        self.refs = self
            .zones
            .iter()
            .flatten()
            .map(|&zone| InputReference::required(
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
        for (zone, slot) in self.zones.iter().zip(self.temperatures.iter_mut()) {
            if zone.is_some() {
                *slot = resolved.next().copied().flatten();
            }
        }
        Ok(())
    }

    fn update(&mut self, store: &mut ValueStore) -> ModelResult<()> {
        let [t_a, t_b] = self.temperatures.map(|r| r.map_or(
            self.outside_temperature,
            |r| store.get(r),
        ));
        let q = self.conductance * (t_a - t_b);
        if let Some(r) = self.flux_a {
            store.set(r, q);
        }
        if let Some(r) = self.flux_b {
            store.set(r, -q);
        }
        Ok(())
    }
}
