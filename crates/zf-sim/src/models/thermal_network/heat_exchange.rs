//! Heat exchange between flow elements and their surroundings.

use std::f64::consts::PI;

use zf_core::ObjectId;
use zf_model::{ModelError, ModelResult};
use zf_project::{ComponentModelType, HeatExchangeDef, HeatExchangeType, NetworkElementDef, PipeDef};

/// Ambient coupling of one flow element.
///
/// Exactly one coupling is active; an ambient temperature always comes
/// together with a heat transfer coefficient.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HeatExchange {
    /// Adiabatic
    None,
    /// Fixed ambient temperature.
    Temperature {
        ambient_k: f64,
        heat_transfer_coefficient: f64,
        /// Conductance fluid to ambient [W/K]
        ua: f64,
    },
    /// Air temperature of a zone, refreshed on every update.
    Zone {
        zone_id: ObjectId,
        ambient_k: f64,
        heat_transfer_coefficient: f64,
        ua: f64,
    },
    /// Heat extracted from the fluid [W], independent of temperatures.
    HeatFlux { heat_flux_w: f64 },
}

impl HeatExchange {
    /// Heat [W] the fluid at `fluid_k` loses to the surroundings.
    pub fn heat_loss(&self, fluid_k: f64) -> f64 {
        match *self {
            HeatExchange::None => 0.0,
            HeatExchange::Temperature { ambient_k, ua, .. }
            | HeatExchange::Zone { ambient_k, ua, .. } => ua * (fluid_k - ambient_k),
            HeatExchange::HeatFlux { heat_flux_w } => heat_flux_w,
        }
    }

    pub fn ambient_temperature(&self) -> Option<f64> {
        match *self {
            HeatExchange::Temperature { ambient_k, .. } | HeatExchange::Zone { ambient_k, .. } => {
                Some(ambient_k)
            }
            _ => None,
        }
    }

    pub fn heat_transfer_coefficient(&self) -> Option<f64> {
        match *self {
            HeatExchange::Temperature {
                heat_transfer_coefficient,
                ..
            }
            | HeatExchange::Zone {
                heat_transfer_coefficient,
                ..
            } => Some(heat_transfer_coefficient),
            _ => None,
        }
    }

    pub fn heat_flux(&self) -> Option<f64> {
        match *self {
            HeatExchange::HeatFlux { heat_flux_w } => Some(heat_flux_w),
            _ => None,
        }
    }

    pub fn zone_id(&self) -> Option<ObjectId> {
        match *self {
            HeatExchange::Zone { zone_id, .. } => Some(zone_id),
            _ => None,
        }
    }

    /// Update the ambient temperature of a zone coupling; no-op otherwise.
    pub fn set_ambient_temperature(&mut self, t_k: f64) {
        if let HeatExchange::Zone { ambient_k, .. } = self {
            *ambient_k = t_k;
        }
    }
}

/// Pipe conductance [W/K]: outer surface resistance in series with the wall.
///
/// Zero when either resistance is infinite.
pub fn pipe_conductance(pipe: &PipeDef, length_m: f64, heat_transfer_coefficient: f64) -> f64 {
    if heat_transfer_coefficient <= 0.0 || pipe.u_value_wall_w_mk <= 0.0 {
        return 0.0;
    }
    let outer = 1.0 / (heat_transfer_coefficient * PI * pipe.diameter_outside_m);
    let wall = 1.0 / pipe.u_value_wall_w_mk;
    length_m / (outer + wall)
}

/// Resolve the heat exchange of `element`, checking that the component type
/// supports it and that every parameter it needs is present.
///
/// `pipe` and `length_m` are given for pipe components only.
pub fn resolve_heat_exchange(
    model: &str,
    element: &NetworkElementDef,
    model_type: ComponentModelType,
    pipe: Option<(&PipeDef, f64)>,
    initial_ambient_k: f64,
) -> ModelResult<HeatExchange> {
    let def = &element.heat_exchange;
    let supported = match model_type {
        ComponentModelType::SimplePipe | ComponentModelType::DynamicPipe => true,
        ComponentModelType::HeatExchanger => {
            matches!(def.kind, HeatExchangeType::None | HeatExchangeType::HeatFluxConstant)
        }
        ComponentModelType::ConstantPressurePump | ComponentModelType::ConstantMassFluxPump => {
            def.kind == HeatExchangeType::None
        }
        ComponentModelType::HeatPumpIdealCarnot => false,
    };
    if !supported {
        return Err(ModelError::UnsupportedHeatExchange {
            model: model.to_string(),
            element: element.id,
            heat_exchange: def.kind.name().to_string(),
        });
    }

    let param = |value: Option<f64>, name: &str| {
        value.ok_or_else(|| {
            ModelError::missing_parameter(
                model,
                format!(
                    "{name} for heat exchange {} of flow element #{}",
                    def.kind.name(),
                    element.id
                ),
            )
        })
    };
    let conductance = |def: &HeatExchangeDef| -> ModelResult<(f64, f64)> {
        let h = param(def.heat_transfer_coefficient_w_m2k, "heat_transfer_coefficient_w_m2k")?;
        let ua = pipe.map_or(0.0, |(pipe, length)| pipe_conductance(pipe, length, h));
        Ok((h, ua))
    };

    Ok(match def.kind {
        HeatExchangeType::None => HeatExchange::None,
        HeatExchangeType::TemperatureConstant => {
            let ambient_k = param(def.temperature_k, "temperature_k")?;
            let (heat_transfer_coefficient, ua) = conductance(def)?;
            HeatExchange::Temperature {
                ambient_k,
                heat_transfer_coefficient,
                ua,
            }
        }
        HeatExchangeType::TemperatureZone => {
            let zone_id = def.zone_id.ok_or_else(|| ModelError::MissingReference {
                model: model.to_string(),
                what: format!("zone of flow element #{}", element.id),
            })?;
            let (heat_transfer_coefficient, ua) = conductance(def)?;
            HeatExchange::Zone {
                zone_id,
                ambient_k: initial_ambient_k,
                heat_transfer_coefficient,
                ua,
            }
        }
        HeatExchangeType::HeatFluxConstant => HeatExchange::HeatFlux {
            heat_flux_w: param(def.heat_flux_w, "heat_flux_w")?,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pipe() -> PipeDef {
        PipeDef {
            id: 1,
            name: "PE 25".into(),
            diameter_inside_m: 0.02,
            diameter_outside_m: 0.025,
            roughness_m: 7e-6,
            u_value_wall_w_mk: 2.0,
        }
    }

    fn element(heat_exchange: HeatExchangeDef) -> NetworkElementDef {
        NetworkElementDef {
            id: 5,
            name: "pipe".into(),
            inlet_node_id: 1,
            outlet_node_id: 2,
            component_id: 1,
            pipe_id: Some(1),
            length_m: Some(10.0),
            discretization_length_m: None,
            heat_exchange,
        }
    }

    #[test]
    fn temperature_coupling_carries_coefficient() {
        let def = HeatExchangeDef {
            kind: HeatExchangeType::TemperatureConstant,
            temperature_k: Some(283.15),
            heat_transfer_coefficient_w_m2k: Some(10.0),
            ..HeatExchangeDef::default()
        };
        let p = pipe();
        let hx = resolve_heat_exchange(
            "m",
            &element(def),
            ComponentModelType::SimplePipe,
            Some((&p, 10.0)),
            293.15,
        )
        .unwrap();
        assert_eq!(hx.ambient_temperature(), Some(283.15));
        assert_eq!(hx.heat_transfer_coefficient(), Some(10.0));
        assert_eq!(hx.heat_flux(), None);

        let ua = pipe_conductance(&p, 10.0, 10.0);
        assert!(ua > 0.0);
        assert!((hx.heat_loss(293.15) - ua * 10.0).abs() < 1e-9);
    }

    #[test]
    fn missing_parameter_is_reported() {
        let def = HeatExchangeDef {
            kind: HeatExchangeType::TemperatureConstant,
            heat_transfer_coefficient_w_m2k: Some(10.0),
            ..HeatExchangeDef::default()
        };
        let p = pipe();
        let err = resolve_heat_exchange(
            "m",
            &element(def),
            ComponentModelType::SimplePipe,
            Some((&p, 10.0)),
            293.15,
        )
        .unwrap_err();
        match err {
            ModelError::MissingParameter { parameter, .. } => {
                assert!(parameter.contains("temperature_k"));
            }
            other => panic!("unexpected {other}"),
        }
    }

    #[test]
    fn pumps_reject_heat_exchange() {
        let def = HeatExchangeDef {
            kind: HeatExchangeType::HeatFluxConstant,
            heat_flux_w: Some(100.0),
            ..HeatExchangeDef::default()
        };
        let err = resolve_heat_exchange(
            "m",
            &element(def),
            ComponentModelType::ConstantMassFluxPump,
            None,
            293.15,
        )
        .unwrap_err();
        assert!(matches!(err, ModelError::UnsupportedHeatExchange { element: 5, .. }));
    }
}
