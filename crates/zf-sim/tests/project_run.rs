//! The bundled demo projects load, wire and integrate.

use std::path::{Path, PathBuf};

use zf_sim::Simulation;

fn demo(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../../demos/projects")
        .join(name)
}

fn run(name: &str, t_end_s: f64) -> Simulation {
    let mut project = zf_project::load(&demo(name)).unwrap();
    project.integrator.t_end_s = t_end_s;
    let mut sim = Simulation::from_project(&project).unwrap();
    let record = sim.run().unwrap();
    assert_eq!(record.t.last().copied(), Some(t_end_s));
    sim
}

#[test]
fn single_zone_runs_a_few_hours() {
    let sim = run("01_single_zone.yaml", 4.0 * 3600.0);
    let output = sim.output().unwrap();

    assert_eq!(output.columns().len(), 6);
    assert_eq!(output.times(), &[0.0, 3600.0, 7200.0, 10800.0, 14400.0]);
    for row in output.rows() {
        assert!(row.iter().all(|v| v.is_finite()));
    }

    // cold outside, no heating: the zone cools during the night
    let first = output.rows()[0][0];
    let last = output.rows()[4][0];
    assert!(last < first, "{first} -> {last}");
    // relative humidity stays physical
    for row in output.rows() {
        assert!(row[1] > 0.0 && row[1] < 1.5, "relative humidity {}", row[1]);
    }
}

#[test]
fn heating_loop_drops_the_unresolved_humidity_column() {
    let sim = run("02_heating_loop.yaml", 1200.0);
    let output = sim.output().unwrap();

    let headers: Vec<String> = output.columns().iter().map(|c| c.header()).collect();
    assert_eq!(headers.len(), 6);
    assert!(!headers.iter().any(|h| h.contains("RelativeHumidity")));
    assert_eq!(output.rows().len(), 3);

    for row in output.rows() {
        assert!(row.iter().all(|v| v.is_finite()));
        // pump mass flux through the radiator
        assert!((row[2] - 0.03).abs() < 1e-6);
        // the radiator heats the zone by what it hands over
        assert_eq!(row[1], row[5]);
        assert!(row[1] > 0.0);
    }

    let mut tsv = Vec::new();
    output.write_tsv(&mut tsv).unwrap();
    let tsv = String::from_utf8(tsv).unwrap();
    assert!(tsv.starts_with("time [s]\tZone(#1).AirTemperature\t"));
    assert_eq!(tsv.lines().count(), 4);
}

#[test]
fn rerun_replaces_the_previous_samples() {
    let mut sim = run("01_single_zone.yaml", 2.0 * 3600.0);
    let first = sim.output().unwrap().rows().to_vec();
    assert_eq!(first.len(), 3);

    sim.run().unwrap();
    let output = sim.output().unwrap();
    assert_eq!(output.times(), &[0.0, 3600.0, 7200.0]);
    assert_eq!(output.rows().len(), first.len());
    for (a, b) in output.rows().iter().zip(&first) {
        for (x, y) in a.iter().zip(b) {
            assert!((x - y).abs() <= 1e-9 * y.abs().max(1.0));
        }
    }
}
