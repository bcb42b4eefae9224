//! Zone energy (and moisture) balance.

use tracing::debug;
use zf_core::ObjectId;
use zf_model::{
    BalanceModel, InputReference, Model, ModelError, ModelInfo, ModelKind, ModelResult,
    QuantityDescription, QuantityName, ReferenceType, ResultAllocator, ResultSet, StateDependency,
    ValueRef, ValueStore, check_input_order,
};

use crate::quantities as q;

/// Result slots, in publication order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomResult {
    ConstructionHeatConductionLoad,
    WindowHeatConductionLoad,
    WindowSolarRadiationLoad,
    InfiltrationHeatLoad,
    ConvectiveEquipmentHeatLoad,
    ConvectivePersonHeatLoad,
    ConvectiveLightingHeatLoad,
    NetworkHeatLoad,
    CompleteThermalLoad,
    InfiltrationMoistureLoad,
    CompleteMoistureLoad,
}

impl RoomResult {
    const THERMAL: [RoomResult; 9] = [
        RoomResult::ConstructionHeatConductionLoad,
        RoomResult::WindowHeatConductionLoad,
        RoomResult::WindowSolarRadiationLoad,
        RoomResult::InfiltrationHeatLoad,
        RoomResult::ConvectiveEquipmentHeatLoad,
        RoomResult::ConvectivePersonHeatLoad,
        RoomResult::ConvectiveLightingHeatLoad,
        RoomResult::NetworkHeatLoad,
        RoomResult::CompleteThermalLoad,
    ];
    const MOISTURE: [RoomResult; 2] = [
        RoomResult::InfiltrationMoistureLoad,
        RoomResult::CompleteMoistureLoad,
    ];

    fn description(self) -> QuantityDescription {
        let (name, unit, description) = match self {
            RoomResult::ConstructionHeatConductionLoad => (
                q::CONSTRUCTION_HEAT_CONDUCTION_LOAD,
                "W",
                "Sum of heat conduction fluxes from construction surfaces into the room",
            ),
            RoomResult::WindowHeatConductionLoad => (
                q::WINDOW_HEAT_CONDUCTION_LOAD,
                "W",
                "Sum of heat conduction fluxes through windows into the room",
            ),
            RoomResult::WindowSolarRadiationLoad => (
                q::WINDOW_SOLAR_RADIATION_LOAD,
                "W",
                "Solar radiation through windows that heats the room air directly",
            ),
            RoomResult::InfiltrationHeatLoad => (
                q::INFILTRATION_HEAT_LOAD,
                "W",
                "Infiltration/natural ventilation heat flux into the room",
            ),
            RoomResult::ConvectiveEquipmentHeatLoad => (
                q::CONVECTIVE_EQUIPMENT_HEAT_LOAD,
                "W",
                "Convective equipment heat load",
            ),
            RoomResult::ConvectivePersonHeatLoad => (
                q::CONVECTIVE_PERSON_HEAT_LOAD,
                "W",
                "Convective person heat load",
            ),
            RoomResult::ConvectiveLightingHeatLoad => (
                q::CONVECTIVE_LIGHTING_HEAT_LOAD,
                "W",
                "Convective lighting heat load",
            ),
            RoomResult::NetworkHeatLoad => (
                q::NETWORK_HEAT_LOAD,
                "W",
                "Heat load from hydraulic network elements",
            ),
            RoomResult::CompleteThermalLoad => (
                q::COMPLETE_THERMAL_LOAD,
                "W",
                "Sum of all heat fluxes into the room",
            ),
            RoomResult::InfiltrationMoistureLoad => (
                q::INFILTRATION_MOISTURE_LOAD,
                "kg/s",
                "Infiltration/natural ventilation moisture flux into the room",
            ),
            RoomResult::CompleteMoistureLoad => (
                q::COMPLETE_MOISTURE_LOAD,
                "kg/s",
                "Sum of all moisture fluxes into the room",
            ),
        };
        QuantityDescription::scalar(name, unit, description)
    }
}

/// Length of each input group, in request order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct InputGroups {
    constructions: usize,
    windows: usize,
    solar: usize,
    infiltration: usize,
    /// Number of internal-loads models; each contributes a triple
    internal_loads: usize,
    network: usize,
    moisture: usize,
}

/// Resolved inputs, after the presence checks.
#[derive(Debug, Clone, Default)]
struct Inputs {
    constructions: Vec<ValueRef>,
    windows: Vec<ValueRef>,
    solar: Option<ValueRef>,
    infiltration: Option<ValueRef>,
    /// equipment, person, lighting
    internal_loads: Option<[ValueRef; 3]>,
    network: Vec<ValueRef>,
    moisture: Option<ValueRef>,
}

/// Sums all heat (and moisture) fluxes into one zone and provides the
/// derivatives of the zone states.
///
/// The conserved quantity is the internal energy of the zone air, so
/// `ydot[0]` is the complete thermal load in W.
#[derive(Debug)]
pub struct RoomBalanceModel {
    id: ObjectId,
    moisture_balance: bool,
    radiation_load_fraction_zone: f64,
    results: ResultSet,
    slots: Vec<(RoomResult, ValueRef)>,
    ydot: Option<ValueRef>,
    refs: Vec<InputReference>,
    groups: InputGroups,
    inputs: Inputs,
}

impl RoomBalanceModel {
    pub fn new(id: ObjectId, moisture_balance: bool, radiation_load_fraction_zone: f64) -> Self {
        Self {
            id,
            moisture_balance,
            radiation_load_fraction_zone,
            results: ResultSet::new(),
            slots: Vec::new(),
            ydot: None,
            refs: Vec::new(),
            groups: InputGroups::default(),
            inputs: Inputs::default(),
        }
    }

    fn slot(&self, which: RoomResult) -> Option<ValueRef> {
        self.slots.iter().find(|(r, _)| *r == which).map(|(_, v)| *v)
    }

    /// Current value of a result slot, `None` if the slot is not published.
    pub fn result(&self, store: &ValueStore, which: RoomResult) -> Option<f64> {
        self.slot(which).map(|r| store.get(r))
    }

    /// Inputs feeding each thermal load slot.
    fn load_inputs(&self) -> Vec<(RoomResult, Vec<ValueRef>)> {
        let i = &self.inputs;
        let load = |k: usize| i.internal_loads.map(|l| l[k]).into_iter().collect();
        vec![
            (RoomResult::ConstructionHeatConductionLoad, i.constructions.clone()),
            (RoomResult::WindowHeatConductionLoad, i.windows.clone()),
            (RoomResult::WindowSolarRadiationLoad, i.solar.into_iter().collect()),
            (RoomResult::InfiltrationHeatLoad, i.infiltration.into_iter().collect()),
            (RoomResult::ConvectiveEquipmentHeatLoad, load(0)),
            (RoomResult::ConvectivePersonHeatLoad, load(1)),
            (RoomResult::ConvectiveLightingHeatLoad, load(2)),
            (RoomResult::NetworkHeatLoad, i.network.clone()),
        ]
    }

    fn name(&self) -> String {
        self.display_name()
    }
}

impl Model for RoomBalanceModel {
    fn reference_type(&self) -> Option<ReferenceType> {
        Some(ReferenceType::Zone)
    }

    fn id(&self) -> ObjectId {
        self.id
    }

    fn display_name(&self) -> String {
        format!("RoomBalanceModel(#{})", self.id)
    }

    fn kind(&self) -> ModelKind {
        ModelKind::RoomBalance
    }

    fn init_results(
        &mut self,
        _models: &[ModelInfo],
        alloc: &mut ResultAllocator<'_>,
    ) -> ModelResult<()> {
        let moisture: &[RoomResult] = if self.moisture_balance {
            &RoomResult::MOISTURE
        } else {
            &[]
        };
        for &which in RoomResult::THERMAL.iter().chain(moisture) {
            let r = alloc.algebraic(1);
            self.slots.push((which, self.results.push(which.description(), r)));
        }
        let n = if self.moisture_balance { 2 } else { 1 };
        let r = alloc.algebraic(n);
        self.ydot = Some(self.results.push(
            QuantityDescription::whole_only(q::YDOT, "W", "Derivatives of the zone states", n),
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

    fn as_balance_model(&self) -> Option<&dyn BalanceModel> {
        Some(self)
    }
}

impl StateDependency for RoomBalanceModel {
    fn init_input_references(&mut self, models: &[ModelInfo]) -> ModelResult<()> {
        let zone = self.id;
        let index = i64::from(zone);
        let mut refs = Vec::new();
        let mut groups = InputGroups::default();

        // conduction through construction surfaces facing this zone
        for m in models {
            if let ModelKind::ConstructionBalance { zone_a, zone_b } = m.kind {
                push_sides(
                    &mut refs,
                    &mut groups.constructions,
                    ReferenceType::ConstructionInstance,
                    m.id,
                    zone_a,
                    zone_b,
                    zone,
                );
            }
        }
        for m in models {
            if let ModelKind::EmbeddedObject { zone_a, zone_b } = m.kind {
                push_sides(
                    &mut refs,
                    &mut groups.windows,
                    ReferenceType::EmbeddedObject,
                    m.id,
                    zone_a,
                    zone_b,
                    zone,
                );
            }
        }

        // solar: a single producer per zone
        let mut solar = models.iter().filter(
            |m| matches!(&m.kind, ModelKind::SolarLoads { zone_ids } if zone_ids.contains(&zone)),
        );
        if let Some(first) = solar.next() {
            if let Some(second) = solar.next() {
                return Err(ModelError::DuplicateDefinition {
                    model: self.name(),
                    quantity: q::WINDOW_SOLAR_RADIATION_FLUX_SUM.to_string(),
                    target: format!(
                        "Zone(#{zone}), produced by {} and {}",
                        first.display_name,
                        second.display_name
                    ),
                });
            }
            refs.push(InputReference::required(
                ReferenceType::Location,
                first.id,
                QuantityName::indexed(q::WINDOW_SOLAR_RADIATION_FLUX_SUM, index),
            ));
            groups.solar = 1;
        }

        // every ventilation model is asked; only the one covering this zone resolves
        for m in models {
            if matches!(m.kind, ModelKind::NaturalVentilation { .. }) {
                refs.push(InputReference::optional(
                    ReferenceType::Model,
                    m.id,
                    QuantityName::indexed(q::INFILTRATION_HEAT_FLUX, index),
                ));
                groups.infiltration += 1;
            }
        }

        for m in models {
            if matches!(m.kind, ModelKind::InternalLoads { .. }) {
                for name in [
                    q::CONVECTIVE_EQUIPMENT_HEAT_LOAD,
                    q::CONVECTIVE_PERSON_HEAT_LOAD,
                    q::CONVECTIVE_LIGHTING_HEAT_LOAD,
                ] {
                    refs.push(InputReference::optional(
                        ReferenceType::Model,
                        m.id,
                        QuantityName::indexed(name, index),
                    ));
                }
                groups.internal_loads += 1;
            }
        }

        for m in models {
            if let ModelKind::ThermalNetwork { network_id, .. } = m.kind {
                refs.push(InputReference::optional(
                    ReferenceType::Network,
                    network_id,
                    QuantityName::indexed(q::NETWORK_ZONE_HEAT_LOAD, index),
                ));
                groups.network += 1;
            }
        }

        if self.moisture_balance {
            for m in models {
                if matches!(m.kind, ModelKind::NaturalVentilation { .. }) {
                    refs.push(InputReference::optional(
                        ReferenceType::Model,
                        m.id,
                        QuantityName::indexed(q::INFILTRATION_MOISTURE_MASS_FLUX, index),
                    ));
                    groups.moisture += 1;
                }
            }
        }

        debug!(zone, references = refs.len(), "room balance inputs collected");
        self.refs = refs;
        self.groups = groups;
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
        let name = self.name();
        check_input_order(&name, &self.refs, refs, resolved)?;

        let g = self.groups;
        let mut rest = resolved;
        let constructions = split_front(&mut rest, g.constructions);
        let windows = split_front(&mut rest, g.windows);
        let solar = split_front(&mut rest, g.solar);
        let infiltration = split_front(&mut rest, g.infiltration);
        let internal_loads = split_front(&mut rest, 3 * g.internal_loads);
        let network = split_front(&mut rest, g.network);
        let moisture = split_front(&mut rest, g.moisture);

        let mut inputs = Inputs {
            constructions: required_all(&name, &self.refs, constructions, 0)?,
            windows: required_all(&name, &self.refs, windows, g.constructions)?,
            solar: solar.first().copied().flatten(),
            network: network.iter().flatten().copied().collect(),
            ..Inputs::default()
        };

        let infiltration_start = g.constructions + g.windows + g.solar;
        inputs.infiltration = single_producer(
            &name,
            &self.refs[infiltration_start..],
            infiltration,
            self.id,
        )?;
        let moisture_start = infiltration_start + g.infiltration + 3 * g.internal_loads + g.network;
        inputs.moisture = single_producer(&name, &self.refs[moisture_start..], moisture, self.id)?;

        for triple in internal_loads.chunks_exact(3) {
            let loads = match (triple[0], triple[1], triple[2]) {
                (None, None, None) => continue,
                (Some(e), Some(p), Some(l)) => [e, p, l],
                _ => {
                    return Err(ModelError::PartialInternalLoads {
                        model: name,
                        zone: self.id,
                    });
                }
            };
            if inputs.internal_loads.is_some() {
                return Err(ModelError::DuplicateDefinition {
                    model: name,
                    quantity: "internal loads".to_string(),
                    target: format!("Zone(#{})", self.id),
                });
            }
            inputs.internal_loads = Some(loads);
        }

        self.inputs = inputs;
        Ok(())
    }

    fn state_dependencies(&self, out: &mut Vec<(ValueRef, ValueRef)>) {
        let Some(complete) = self.slot(RoomResult::CompleteThermalLoad) else {
            return;
        };
        for (which, inputs) in self.load_inputs() {
            let Some(r) = self.slot(which) else { continue };
            out.extend(inputs.into_iter().map(|input| (r, input)));
            out.push((complete, r));
        }
        if let Some(ydot) = self.ydot {
            out.push((ydot, complete));
        }
    }

    fn update(&mut self, store: &mut ValueStore) -> ModelResult<()> {
        let i = &self.inputs;
        // producers publish fluxes out of the room-facing surface
        let construction = -i.constructions.iter().map(|&r| store.get(r)).sum::<f64>();
        let window = -i.windows.iter().map(|&r| store.get(r)).sum::<f64>();
        let solar = self.radiation_load_fraction_zone * store.get_or_zero(i.solar);
        let infiltration = store.get_or_zero(i.infiltration);
        let [equipment, person, lighting] = match i.internal_loads {
            Some(refs) => refs.map(|r| store.get(r)),
            None => [0.0; 3],
        };
        let network = i.network.iter().map(|&r| store.get(r)).sum::<f64>();
        let complete =
            construction + window + solar + infiltration + equipment + person + lighting + network;

        let moisture = store.get_or_zero(i.moisture);

        for &(which, r) in &self.slots {
            let value = match which {
                RoomResult::ConstructionHeatConductionLoad => construction,
                RoomResult::WindowHeatConductionLoad => window,
                RoomResult::WindowSolarRadiationLoad => solar,
                RoomResult::InfiltrationHeatLoad => infiltration,
                RoomResult::ConvectiveEquipmentHeatLoad => equipment,
                RoomResult::ConvectivePersonHeatLoad => person,
                RoomResult::ConvectiveLightingHeatLoad => lighting,
                RoomResult::NetworkHeatLoad => network,
                RoomResult::CompleteThermalLoad => complete,
                RoomResult::InfiltrationMoistureLoad | RoomResult::CompleteMoistureLoad => moisture,
            };
            store.set(r, value);
        }
        if let Some(ydot) = self.ydot {
            let out = store.slice_mut(ydot);
            out[0] = complete;
            if let Some(m) = out.get_mut(1) {
                *m = moisture;
            }
        }
        Ok(())
    }
}

impl BalanceModel for RoomBalanceModel {
    fn state_key(&self) -> (ReferenceType, ObjectId) {
        (ReferenceType::Zone, self.id)
    }

    fn ydot(&self, store: &ValueStore, out: &mut [f64]) {
        if let Some(ydot) = self.ydot {
            out.copy_from_slice(store.slice(ydot));
        }
    }
}

/// One request per side of `target` that faces `zone`.
fn push_sides(
    refs: &mut Vec<InputReference>,
    count: &mut usize,
    reference_type: ReferenceType,
    target: ObjectId,
    zone_a: Option<ObjectId>,
    zone_b: Option<ObjectId>,
    zone: ObjectId,
) {
    for (side, name) in [(zone_a, q::FLUX_HEAT_CONDUCTION_A), (zone_b, q::FLUX_HEAT_CONDUCTION_B)] {
        if side == Some(zone) {
            refs.push(InputReference::required(reference_type, target, QuantityName::new(name)));
            *count += 1;
        }
    }
}

/// Required groups never contain `None` after resolution; enforce it anyway.
fn required_all(
    model: &str,
    refs: &[InputReference],
    resolved: &[Option<ValueRef>],
    offset: usize,
) -> ModelResult<Vec<ValueRef>> {
    resolved
        .iter()
        .enumerate()
        .map(|(k, r)| {
            r.ok_or_else(|| ModelError::UnresolvedInput {
                model: model.to_string(),
                reference: refs[offset + k].to_string(),
            })
        })
        .collect()
}

/// At most one of the candidate producers may resolve.
fn single_producer(
    model: &str,
    refs: &[InputReference],
    resolved: &[Option<ValueRef>],
    zone: ObjectId,
) -> ModelResult<Option<ValueRef>> {
    let mut found: Option<(usize, ValueRef)> = None;
    for (k, r) in resolved.iter().enumerate() {
        let Some(r) = r else { continue };
        if let Some((first, _)) = found {
            return Err(ModelError::DuplicateDefinition {
                model: model.to_string(),
                quantity: refs[k].name.name.clone(),
                target: format!(
                    "Zone(#{zone}), produced by Model(#{}) and Model(#{})",
                    refs[first].id,
                    refs[k].id
                ),
            });
        }
        found = Some((k, *r));
    }
    Ok(found.map(|(_, r)| r))
}

fn split_front<'a, T>(rest: &mut &'a [T], n: usize) -> &'a [T] {
    let (head, tail) = rest.split_at(n);
    *rest = tail;
    head
}
