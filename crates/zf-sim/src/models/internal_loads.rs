//! Scheduled internal loads: equipment, persons and lighting.

use zf_core::ObjectId;
use zf_core::constants::{SECONDS_PER_DAY, SECONDS_PER_HOUR};
use zf_model::{
    InputReference, Model, ModelError, ModelInfo, ModelKind, ModelResult, QuantityDescription,
    QuantityName, ReferenceType, ResultAllocator, ResultSet, StateDependency, TimeDependency,
    ValueRef, ValueStore, check_input_order,
};
use zf_project::InternalLoadsDef;

use crate::quantities as q;

#[derive(Debug, Clone, Copy)]
struct LoadKind {
    name: &'static str,
    /// Convective load per floor area [W/m2]
    specific_load: f64,
}

/// Convective internal loads per zone, `area * load * fraction * schedule(hour)`.
#[derive(Debug)]
pub struct InternalLoadsModel {
    id: ObjectId,
    /// (zone id, floor area)
    zones: Vec<(ObjectId, f64)>,
    kinds: [LoadKind; 3],
    schedule: [f64; 24],
    multiplier: f64,
    results: ResultSet,
    slots: Vec<ValueRef>,
}

impl InternalLoadsModel {
    /// `zones` pairs each zone id of `def` with its floor area.
    pub fn new(def: &InternalLoadsDef, zones: Vec<(ObjectId, f64)>) -> ModelResult<Self> {
        let model = format!("Model(#{})", def.id);
        let mut schedule = [1.0; 24];
        if let Some(values) = &def.daily_schedule {
            if values.len() != schedule.len() {
                return Err(ModelError::invalid_arg(
                    model,
                    format!("daily schedule needs 24 values, got {}", values.len()),
                ));
            }
            schedule.copy_from_slice(values);
        }
        let kind = |name, load: f64, fraction: f64| LoadKind {
            name,
            specific_load: load * fraction,
        };
        Ok(Self {
            id: def.id,
            zones,
            kinds: [
                kind(
                    q::CONVECTIVE_EQUIPMENT_HEAT_LOAD,
                    def.equipment_w_m2,
                    def.equipment_convective_fraction,
                ),
                kind(
                    q::CONVECTIVE_PERSON_HEAT_LOAD,
                    def.person_w_m2,
                    def.person_convective_fraction,
                ),
                kind(
                    q::CONVECTIVE_LIGHTING_HEAT_LOAD,
                    def.lighting_w_m2,
                    def.lighting_convective_fraction,
                ),
            ],
            schedule,
            multiplier: schedule[0],
            results: ResultSet::new(),
            slots: Vec::new(),
        })
    }

    fn zone_ids(&self) -> Vec<ObjectId> {
        self.zones.iter().map(|(id, _)| *id).collect()
    }
}

impl Model for InternalLoadsModel {
    fn reference_type(&self) -> Option<ReferenceType> {
        Some(ReferenceType::Model)
    }

    fn id(&self) -> ObjectId {
        self.id
    }

    fn display_name(&self) -> String {
        format!("InternalLoadsModel(#{})", self.id)
    }

    fn kind(&self) -> ModelKind {
        ModelKind::InternalLoads { zone_ids: self.zone_ids() }
    }

    fn init_results(
        &mut self,
        _models: &[ModelInfo],
        alloc: &mut ResultAllocator<'_>,
    ) -> ModelResult<()> {
        let keys = self.zone_ids();
        for kind in self.kinds {
            let r = alloc.algebraic(keys.len());
            self.slots.push(self.results.push(
                QuantityDescription::keyed(
                    kind.name,
                    "W",
                    "Convective internal heat load per zone",
                    keys.clone(),
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

    fn as_time_dependency_mut(&mut self) -> Option<&mut dyn TimeDependency> {
        Some(self)
    }
}

impl StateDependency for InternalLoadsModel {
    fn init_input_references(&mut self, _models: &[ModelInfo]) -> ModelResult<()> {
        Ok(())
    }

    fn input_references(&self, out: &mut Vec<InputReference>) {
        out.clear();
    }

    fn set_input_value_refs(
        &mut self,
        refs: &[InputReference],
        resolved: &[Option<ValueRef>],
    ) -> ModelResult<()> {
        check_input_order(&self.display_name(), &[], refs, resolved)
    }

    fn update(&mut self, store: &mut ValueStore) -> ModelResult<()> {
        for (kind, &slot) in self.kinds.iter().zip(&self.slots) {
            let values = store.slice_mut(slot);
            for (value, (_, area)) in values.iter_mut().zip(&self.zones) {
                *value = area * kind.specific_load * self.multiplier;
            }
        }
        Ok(())
    }
}

impl TimeDependency for InternalLoadsModel {
    fn set_time(&mut self, t: f64) -> ModelResult<()> {
        let hour = (t.rem_euclid(SECONDS_PER_DAY) / SECONDS_PER_HOUR) as usize;
        self.multiplier = self.schedule[hour.min(23)];
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn office() -> InternalLoadsDef {
        let mut schedule = vec![0.0; 24];
        for v in &mut schedule[8..18] {
            *v = 1.0;
        }
        InternalLoadsDef {
            id: 7,
            name: "office".into(),
            zone_ids: vec![1, 2],
            equipment_w_m2: 10.0,
            person_w_m2: 5.0,
            lighting_w_m2: 4.0,
            equipment_convective_fraction: 0.5,
            person_convective_fraction: 1.0,
            lighting_convective_fraction: 1.0,
            daily_schedule: Some(schedule),
        }
    }

    #[test]
    fn loads_follow_area_and_schedule() {
        let mut model = InternalLoadsModel::new(&office(), vec![(1, 20.0), (2, 40.0)]).unwrap();
        let mut store = ValueStore::new();
        model.init_results(&[], &mut store.allocator(0)).unwrap();

        let equipment = |model: &InternalLoadsModel, zone| {
            model
                .result_value_ref(&QuantityName::indexed(q::CONVECTIVE_EQUIPMENT_HEAT_LOAD, zone))
                .unwrap()
        };

        model.set_time(SECONDS_PER_DAY + 9.5 * SECONDS_PER_HOUR).unwrap();
        model.update(&mut store).unwrap();
        assert!((store.get(equipment(&model, 1)) - 100.0).abs() < 1e-12);
        assert!((store.get(equipment(&model, 2)) - 200.0).abs() < 1e-12);

        model.set_time(22.0 * SECONDS_PER_HOUR).unwrap();
        model.update(&mut store).unwrap();
        assert_eq!(store.get(equipment(&model, 2)), 0.0);
    }

    #[test]
    fn short_schedule_is_rejected() {
        let def = InternalLoadsDef {
            daily_schedule: Some(vec![1.0; 12]),
            ..office()
        };
        assert!(InternalLoadsModel::new(&def, vec![(1, 20.0)]).is_err());
    }
}
