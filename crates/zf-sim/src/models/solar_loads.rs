//! Solar gains through windows, simplified to a daily half-sine.

use std::f64::consts::PI;

use zf_core::ObjectId;
use zf_core::constants::{SECONDS_PER_DAY, SECONDS_PER_HOUR};
use zf_model::{
    InputReference, Model, ModelError, ModelInfo, ModelKind, ModelResult, QuantityDescription,
    QuantityName, ReferenceType, ResultAllocator, ResultSet, StateDependency, TimeDependency,
    ValueRef, ValueStore, check_input_order,
};
use zf_project::SolarLoadsDef;

use crate::quantities as q;

/// Publishes `WindowSolarRadiationFluxSum` per zone under the `Location`
/// reference type.
#[derive(Debug)]
pub struct SolarLoadsModel {
    id: ObjectId,
    zone_ids: Vec<ObjectId>,
    peak_flux: f64,
    sunrise_h: f64,
    sunset_h: f64,
    flux: f64,
    results: ResultSet,
    flux_sum: Option<ValueRef>,
}

impl SolarLoadsModel {
    pub fn new(def: &SolarLoadsDef) -> ModelResult<Self> {
        if !(def.sunrise_h >= 0.0 && def.sunrise_h < def.sunset_h && def.sunset_h <= 24.0) {
            return Err(ModelError::invalid_arg(
                format!("Location(#{})", def.id),
                format!(
                    "need 0 <= sunrise < sunset <= 24, got {} / {}",
                    def.sunrise_h,
                    def.sunset_h
                ),
            ));
        }
        Ok(Self {
            id: def.id,
            zone_ids: def.zone_ids.clone(),
            peak_flux: def.peak_flux_w,
            sunrise_h: def.sunrise_h,
            sunset_h: def.sunset_h,
            flux: 0.0,
            results: ResultSet::new(),
            flux_sum: None,
        })
    }

    /// Transmitted flux at `hour` of the day.
    pub fn flux_at(&self, hour: f64) -> f64 {
        if hour <= self.sunrise_h || hour >= self.sunset_h {
            return 0.0;
        }
        self.peak_flux * (PI * (hour - self.sunrise_h) / (self.sunset_h - self.sunrise_h)).sin()
    }
}

impl Model for SolarLoadsModel {
    fn reference_type(&self) -> Option<ReferenceType> {
        Some(ReferenceType::Location)
    }

    fn id(&self) -> ObjectId {
        self.id
    }

    fn display_name(&self) -> String {
        format!("SolarLoadsModel(#{})", self.id)
    }

    fn kind(&self) -> ModelKind {
        ModelKind::SolarLoads {
            zone_ids: self.zone_ids.clone(),
        }
    }

    fn init_results(
        &mut self,
        _models: &[ModelInfo],
        alloc: &mut ResultAllocator<'_>,
    ) -> ModelResult<()> {
        let r = alloc.algebraic(self.zone_ids.len());
        self.flux_sum = Some(self.results.push(
            QuantityDescription::keyed(
                q::WINDOW_SOLAR_RADIATION_FLUX_SUM,
                "W",
                "Solar radiation transmitted through all windows of the zone",
                self.zone_ids.clone(),
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

    fn as_time_dependency_mut(&mut self) -> Option<&mut dyn TimeDependency> {
        Some(self)
    }
}

impl StateDependency for SolarLoadsModel {
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
        if let Some(r) = self.flux_sum {
            store.slice_mut(r).fill(self.flux);
        }
        Ok(())
    }
}

impl TimeDependency for SolarLoadsModel {
    fn set_time(&mut self, t: f64) -> ModelResult<()> {
        self.flux = self.flux_at(t.rem_euclid(SECONDS_PER_DAY) / SECONDS_PER_HOUR);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn half_sine_between_sunrise_and_sunset() {
        let model = SolarLoadsModel::new(&SolarLoadsDef {
            id: 1,
            name: "site".into(),
            zone_ids: vec![1],
            peak_flux_w: 800.0,
            sunrise_h: 6.0,
            sunset_h: 18.0,
        })
        .unwrap();
        assert_eq!(model.flux_at(3.0), 0.0);
        assert!((model.flux_at(12.0) - 800.0).abs() < 1e-9);
        assert!((model.flux_at(9.0) - 800.0 * (PI / 4.0).sin()).abs() < 1e-9);
        assert_eq!(model.flux_at(20.0), 0.0);
    }
}
