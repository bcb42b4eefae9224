use zf_project::schema::*;
use zf_project::{ValidationError, validate_project};

fn zone(id: u32) -> ZoneDef {
    ZoneDef {
        id,
        name: format!("Zone {id}"),
        volume_m3: 50.0,
        area_m2: 20.0,
        initial_temperature_k: None,
    }
}

fn wall(id: u32, zone_a: Option<u32>, zone_b: Option<u32>) -> ConstructionDef {
    ConstructionDef {
        id,
        name: format!("Wall {id}"),
        zone_a,
        zone_b,
        area_m2: 10.0,
        areal_heat_capacity_j_m2k: 40_000.0,
        thermal_resistance_m2k_w: 1.0,
        surface_coefficient_a_w_m2k: 7.7,
        surface_coefficient_b_w_m2k: 25.0,
    }
}

fn loop_network() -> NetworkDef {
    NetworkDef {
        id: 1,
        name: "Loop".to_string(),
        fluid: FluidDef::Water,
        reference_node_id: 1,
        reference_pressure_pa: 2e5,
        initial_fluid_temperature_k: 313.15,
        nodes: vec![
            NetworkNodeDef {
                id: 1,
                name: "Plant".to_string(),
                kind: NetworkNodeKind::Source,
            },
            NetworkNodeDef {
                id: 2,
                name: "House".to_string(),
                kind: NetworkNodeKind::Building,
            },
        ],
        pipes: vec![PipeDef {
            id: 1,
            name: "DN20".to_string(),
            diameter_inside_m: 0.02,
            diameter_outside_m: 0.025,
            roughness_m: 1e-5,
            u_value_wall_w_mk: 2.0,
        }],
        components: vec![ComponentDef {
            id: 1,
            name: "Pipe".to_string(),
            model_type: ComponentModelType::SimplePipe,
            pressure_head_pa: None,
            mass_flux_kg_s: None,
            zeta: None,
            hydraulic_diameter_m: None,
            volume_m3: None,
            carnot_efficiency: None,
        }],
        elements: vec![NetworkElementDef {
            id: 1,
            name: "Supply".to_string(),
            inlet_node_id: 1,
            outlet_node_id: 2,
            component_id: 1,
            pipe_id: Some(1),
            length_m: Some(10.0),
            discretization_length_m: None,
            heat_exchange: HeatExchangeDef::default(),
        }],
    }
}

#[test]
fn valid_project_passes() {
    let mut project = Project::new("ok");
    project.zones = vec![zone(1), zone(2)];
    project.constructions = vec![wall(1, Some(1), Some(2)), wall(2, Some(1), None)];
    project.networks = vec![loop_network()];
    validate_project(&project).unwrap();
}

#[test]
fn duplicate_zone_id_is_rejected() {
    let mut project = Project::new("dup");
    project.zones = vec![zone(1), zone(1)];
    let err = validate_project(&project).unwrap_err();
    assert!(matches!(err, ValidationError::DuplicateId { ref context, .. } if context == "zones"));
}

#[test]
fn model_ids_are_shared_between_loads_and_ventilation() {
    let mut project = Project::new("dup models");
    project.zones = vec![zone(1)];
    project.internal_loads = vec![InternalLoadsDef {
        id: 7,
        name: "Loads".to_string(),
        zone_ids: vec![1],
        equipment_w_m2: 1.0,
        person_w_m2: 1.0,
        lighting_w_m2: 1.0,
        equipment_convective_fraction: 1.0,
        person_convective_fraction: 1.0,
        lighting_convective_fraction: 1.0,
        daily_schedule: None,
    }];
    project.natural_ventilation = vec![NaturalVentilationDef {
        id: 7,
        name: "Vent".to_string(),
        zone_ids: vec![1],
        air_change_rate_per_h: 0.5,
    }];
    let err = validate_project(&project).unwrap_err();
    assert!(matches!(err, ValidationError::DuplicateId { .. }));
}

#[test]
fn construction_must_touch_a_zone() {
    let mut project = Project::new("floating wall");
    project.zones = vec![zone(1)];
    project.constructions = vec![wall(1, None, None)];
    let err = validate_project(&project).unwrap_err();
    assert!(err.to_string().contains("at least one side"));

    project.constructions = vec![wall(1, Some(9), None)];
    let err = validate_project(&project).unwrap_err();
    assert!(matches!(err, ValidationError::MissingReference { ref id, .. } if id == "9"));
}

#[test]
fn window_needs_existing_construction() {
    let mut project = Project::new("window");
    project.zones = vec![zone(1)];
    project.windows = vec![WindowDef {
        id: 1,
        name: "W".to_string(),
        construction_id: 3,
        area_m2: 1.0,
        u_value_w_m2k: 1.0,
    }];
    let err = validate_project(&project).unwrap_err();
    assert!(matches!(err, ValidationError::MissingReference { .. }));
}

#[test]
fn schedule_must_have_24_values() {
    let mut project = Project::new("schedule");
    project.zones = vec![zone(1)];
    project.internal_loads = vec![InternalLoadsDef {
        id: 1,
        name: "Loads".to_string(),
        zone_ids: vec![1],
        equipment_w_m2: 1.0,
        person_w_m2: 0.0,
        lighting_w_m2: 0.0,
        equipment_convective_fraction: 1.0,
        person_convective_fraction: 1.0,
        lighting_convective_fraction: 1.0,
        daily_schedule: Some(vec![1.0; 12]),
    }];
    let err = validate_project(&project).unwrap_err();
    assert!(err.to_string().contains("24 hourly values"));
}

#[test]
fn network_references_are_checked() {
    let mut project = Project::new("net");
    project.zones = vec![zone(1)];

    let mut net = loop_network();
    net.reference_node_id = 99;
    project.networks = vec![net];
    let err = validate_project(&project).unwrap_err();
    assert!(err.to_string().contains("reference_node_id"));

    let mut net = loop_network();
    net.elements[0].outlet_node_id = 5;
    project.networks = vec![net];
    let err = validate_project(&project).unwrap_err();
    assert!(err.to_string().contains("outlet_node_id"));

    let mut net = loop_network();
    net.elements[0].pipe_id = Some(8);
    project.networks = vec![net];
    assert!(validate_project(&project).is_err());

    let mut net = loop_network();
    net.elements[0].heat_exchange = HeatExchangeDef {
        kind: HeatExchangeType::TemperatureZone,
        zone_id: Some(4),
        ..HeatExchangeDef::default()
    };
    project.networks = vec![net];
    let err = validate_project(&project).unwrap_err();
    assert!(err.to_string().contains("heat_exchange zone_id"));
}

#[test]
fn integrator_settings_are_checked() {
    let mut project = Project::new("integrator");
    project.integrator.cutback_factor = 1.0;
    assert!(validate_project(&project).is_err());

    let mut project = Project::new("integrator");
    project.integrator.dt_s = 0.0;
    assert!(validate_project(&project).is_err());
}

#[test]
fn newer_versions_are_rejected() {
    let mut project = Project::new("future");
    project.version = LATEST_VERSION + 1;
    assert!(matches!(
        validate_project(&project),
        Err(ValidationError::UnsupportedVersion { .. })
    ));
}
