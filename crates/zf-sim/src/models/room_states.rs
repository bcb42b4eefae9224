//! Zone air states.

use zf_core::constants::{AIR_DENSITY, AIR_SPECIFIC_HEAT_CAPACITY, GAS_CONSTANT_VAPOUR};
use zf_core::{ObjectId, saturation_pressure};
use zf_model::{
    Model, ModelError, ModelInfo, ModelKind, ModelResult, QuantityDescription, QuantityName,
    ReferenceType, ResultAllocator, ResultSet, StateModel, ValueRef, ValueStore,
};

use crate::quantities as q;

/// Owns the zone air states: internal energy [J] and, with the moisture
/// balance, the water vapour mass [kg].
///
/// The derivatives come from the [`RoomBalanceModel`](super::RoomBalanceModel)
/// of the same zone.
#[derive(Debug)]
pub struct RoomStatesModel {
    id: ObjectId,
    volume: f64,
    moisture_balance: bool,
    initial_temperature: f64,
    initial_relative_humidity: f64,
    results: ResultSet,
    air_temperature: Option<ValueRef>,
    moisture_density: Option<ValueRef>,
    relative_humidity: Option<ValueRef>,
}

impl RoomStatesModel {
    pub fn new(
        id: ObjectId,
        volume_m3: f64,
        moisture_balance: bool,
        initial_temperature_k: f64,
        initial_relative_humidity: f64,
    ) -> ModelResult<Self> {
        if !(volume_m3.is_finite() && volume_m3 > 0.0) {
            return Err(ModelError::invalid_arg(
                format!("Zone(#{id})"),
                format!("volume must be positive, got {volume_m3}"),
            ));
        }
        Ok(Self {
            id,
            volume: volume_m3,
            moisture_balance,
            initial_temperature: initial_temperature_k,
            initial_relative_humidity,
            results: ResultSet::new(),
            air_temperature: None,
            moisture_density: None,
            relative_humidity: None,
        })
    }

    /// Heat capacity of the zone air [J/K].
    pub fn heat_capacity(&self) -> f64 {
        AIR_DENSITY * AIR_SPECIFIC_HEAT_CAPACITY * self.volume
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }
}

/// Vapour density [kg/m3] at relative humidity `rh` and temperature `t_k`.
pub fn vapour_density(rh: f64, t_k: f64) -> f64 {
    rh * saturation_pressure(t_k) / (GAS_CONSTANT_VAPOUR * t_k)
}

impl Model for RoomStatesModel {
    fn reference_type(&self) -> Option<ReferenceType> {
        Some(ReferenceType::Zone)
    }

    fn id(&self) -> ObjectId {
        self.id
    }

    fn kind(&self) -> ModelKind {
        ModelKind::RoomStates
    }

    fn init_results(
        &mut self,
        _models: &[ModelInfo],
        alloc: &mut ResultAllocator<'_>,
    ) -> ModelResult<()> {
        let r = alloc.state_derived(1);
        self.air_temperature = Some(self.results.push(
            QuantityDescription::scalar(q::AIR_TEMPERATURE, "K", "Zone air temperature"),
            r,
        ));
        if self.moisture_balance {
            let r = alloc.state_derived(1);
            self.moisture_density = Some(self.results.push(
                QuantityDescription::scalar(
                    q::MOISTURE_MASS_DENSITY,
                    "kg/m3",
                    "Water vapour density of the zone air",
                ),
                r,
            ));
            let r = alloc.state_derived(1);
            self.relative_humidity = Some(self.results.push(
                QuantityDescription::scalar(
                    q::RELATIVE_HUMIDITY,
                    "---",
                    "Relative humidity of the zone air",
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

    fn as_state_model(&self) -> Option<&dyn StateModel> {
        Some(self)
    }

    fn as_state_model_mut(&mut self) -> Option<&mut dyn StateModel> {
        Some(self)
    }
}

impl StateModel for RoomStatesModel {
    fn n(&self) -> usize {
        if self.moisture_balance { 2 } else { 1 }
    }

    fn state_key(&self) -> (ReferenceType, ObjectId) {
        (ReferenceType::Zone, self.id)
    }

    fn y_initial(&self, y: &mut [f64]) {
        y[0] = self.heat_capacity() * self.initial_temperature;
        if self.moisture_balance {
            y[1] = vapour_density(
                self.initial_relative_humidity,
                self.initial_temperature,
            ) * self.volume;
        }
    }

    fn set_states(&mut self, y: &[f64], store: &mut ValueStore) -> ModelResult<()> {
        let t = y[0] / self.heat_capacity();
        if !t.is_finite() {
            return Err(ModelError::Recoverable {
                model: self.display_name(),
                what: format!("non-finite air temperature from internal energy {}", y[0]),
            });
        }
        if let Some(r) = self.air_temperature {
            store.set(r, t);
        }
        if let (Some(rho_v), Some(rh)) = (self.moisture_density, self.relative_humidity) {
            let density = y[1] / self.volume;
            store.set(rho_v, density);
            store.set(rh, density * GAS_CONSTANT_VAPOUR * t / saturation_pressure(t));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn published(model: &RoomStatesModel, store: &ValueStore, name: &str) -> f64 {
        store.get(model.result_value_ref(&QuantityName::new(name)).unwrap())
    }

    #[test]
    fn initial_states_round_trip_to_temperature() {
        let mut model = RoomStatesModel::new(3, 50.0, true, 295.15, 0.4).unwrap();
        let mut store = ValueStore::new();
        model.init_results(&[], &mut store.allocator(0)).unwrap();

        let mut y = vec![0.0; model.n()];
        model.y_initial(&mut y);
        model.set_states(&y, &mut store).unwrap();

        assert!((published(&model, &store, q::AIR_TEMPERATURE) - 295.15).abs() < 1e-9);
        assert!((published(&model, &store, q::RELATIVE_HUMIDITY) - 0.4).abs() < 1e-9);
        assert!(published(&model, &store, q::MOISTURE_MASS_DENSITY) > 0.0);
    }

    #[test]
    fn thermal_only_zone_has_one_state() {
        let mut model = RoomStatesModel::new(1, 30.0, false, 293.15, 0.5).unwrap();
        let mut store = ValueStore::new();
        model.init_results(&[], &mut store.allocator(0)).unwrap();
        assert_eq!(model.n(), 1);
        assert!(model.result_value_ref(&QuantityName::new(q::MOISTURE_MASS_DENSITY)).is_none());
        assert!(RoomStatesModel::new(1, 0.0, false, 293.15, 0.5).is_err());
    }
}
