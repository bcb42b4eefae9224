//! Natural ventilation (infiltration) with a constant air change rate.

use zf_core::ObjectId;
use zf_core::constants::{AIR_DENSITY, AIR_SPECIFIC_HEAT_CAPACITY, SECONDS_PER_HOUR};
use zf_model::{
    InputReference, Model, ModelError, ModelInfo, ModelKind, ModelResult, QuantityDescription,
    QuantityName, ReferenceType, ResultAllocator, ResultSet, StateDependency, ValueRef, ValueStore,
    check_input_order,
};
use zf_project::NaturalVentilationDef;

use crate::quantities as q;

/// Outside air conditions the ventilation exchanges with.
#[derive(Debug, Clone, Copy)]
pub struct OutsideAir {
    pub temperature_k: f64,
    pub moisture_density_kg_m3: f64,
}

#[derive(Debug, Clone)]
struct Zone {
    id: ObjectId,
    volume: f64,
    air_temperature: Option<ValueRef>,
    moisture_density: Option<ValueRef>,
}

/// Heat and moisture exchanged with outside air per zone:
///
/// - `InfiltrationHeatFlux = n/3600 * V * rho * cp * (T_out - T_zone)`
/// - `InfiltrationMoistureMassFlux = n/3600 * V * (rho_v,out - rho_v,zone)`
#[derive(Debug)]
pub struct NaturalVentilationModel {
    id: ObjectId,
    air_change_rate: f64,
    moisture_balance: bool,
    outside: OutsideAir,
    zones: Vec<Zone>,
    results: ResultSet,
    heat_flux: Option<ValueRef>,
    moisture_flux: Option<ValueRef>,
    refs: Vec<InputReference>,
}

impl NaturalVentilationModel {
    /// `zones` pairs each zone id of `def` with its air volume.
    pub fn new(
        def: &NaturalVentilationDef,
        zones: Vec<(ObjectId, f64)>,
        moisture_balance: bool,
        outside: OutsideAir,
    ) -> ModelResult<Self> {
        if !(def.air_change_rate_per_h >= 0.0 && def.air_change_rate_per_h.is_finite()) {
            return Err(ModelError::invalid_arg(
                format!("Model(#{})", def.id),
                format!("air change rate must be non-negative, got {}", def.air_change_rate_per_h),
            ));
        }
        Ok(Self {
            id: def.id,
            air_change_rate: def.air_change_rate_per_h / SECONDS_PER_HOUR,
            moisture_balance,
            outside,
            zones: zones
                .into_iter()
                .map(|(id, volume)| Zone {
                    id,
                    volume,
                    air_temperature: None,
                    moisture_density: None,
                })
                .collect(),
            results: ResultSet::new(),
            heat_flux: None,
            moisture_flux: None,
            refs: Vec::new(),
        })
    }

    fn zone_ids(&self) -> Vec<ObjectId> {
        self.zones.iter().map(|z| z.id).collect()
    }
}

impl Model for NaturalVentilationModel {
    fn reference_type(&self) -> Option<ReferenceType> {
        Some(ReferenceType::Model)
    }

    fn id(&self) -> ObjectId {
        self.id
    }

    fn display_name(&self) -> String {
        format!("NaturalVentilationModel(#{})", self.id)
    }

    fn kind(&self) -> ModelKind {
        ModelKind::NaturalVentilation { zone_ids: self.zone_ids() }
    }

    fn init_results(
        &mut self,
        _models: &[ModelInfo],
        alloc: &mut ResultAllocator<'_>,
    ) -> ModelResult<()> {
        let keys = self.zone_ids();
        let r = alloc.algebraic(keys.len());
        self.heat_flux = Some(self.results.push(
            QuantityDescription::keyed(
                q::INFILTRATION_HEAT_FLUX,
                "W",
                "Ventilation heat flux into the zone",
                keys.clone(),
            ),
            r,
        ));
        if self.moisture_balance {
            let r = alloc.algebraic(keys.len());
            self.moisture_flux = Some(self.results.push(
                QuantityDescription::keyed(
                    q::INFILTRATION_MOISTURE_MASS_FLUX,
                    "kg/s",
                    "Ventilation moisture flux into the zone",
                    keys,
                ),
                r,
            ));
        }
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

impl StateDependency for NaturalVentilationModel {
    fn init_input_references(&mut self, _models: &[ModelInfo]) -> ModelResult<()> {
        let mut refs = Vec::new();
        for zone in &self.zones {
            refs.push(InputReference::required(
                ReferenceType::Zone,
                zone.id,
                QuantityName::new(q::AIR_TEMPERATURE),
            ));
            if self.moisture_balance {
                refs.push(InputReference::required(
                    ReferenceType::Zone,
                    zone.id,
                    QuantityName::new(q::MOISTURE_MASS_DENSITY),
                ));
            }
        }
        self.refs = refs;
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
        let mut resolved = resolved.iter().copied();
        for zone in &mut self.zones {
            zone.air_temperature = resolved.next().flatten();
            if self.moisture_balance {
                zone.moisture_density = resolved.next().flatten();
            }
        }
        Ok(())
    }

    fn update(&mut self, store: &mut ValueStore) -> ModelResult<()> {
        let rho_cp = AIR_DENSITY * AIR_SPECIFIC_HEAT_CAPACITY;
        for (k, zone) in self.zones.iter().enumerate() {
            let flow = self.air_change_rate * zone.volume;
            if let Some(r) = self.heat_flux.and_then(|r| r.element(k)) {
                let t = store.get_or_zero(zone.air_temperature);
                store.set(r, flow * rho_cp * (self.outside.temperature_k - t));
            }
            if let Some(r) = self.moisture_flux.and_then(|r| r.element(k)) {
                let rho_v = store.get_or_zero(zone.moisture_density);
                store.set(r, flow * (self.outside.moisture_density_kg_m3 - rho_v));
            }
        }
        Ok(())
    }
}
