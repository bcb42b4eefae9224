//! Smoke tests across the component library.

use proptest::prelude::*;
use zf_components::{
    ConstantPressurePump, FlowContext, HydraulicComponent, Pipe, ZetaLoss, friction_factor,
};
use zf_core::units::{m, pa};
use zf_fluids::HydraulicFluid;

#[test]
fn components_as_trait_objects() {
    let parts: Vec<Box<dyn HydraulicComponent>> = vec![
        Box::new(Pipe::new("pipe", m(20.0), m(0.04), m(1e-5)).unwrap()),
        Box::new(ZetaLoss::new("hx", 3.0, 0.04).unwrap()),
        Box::new(ConstantPressurePump::new("pump", pa(10_000.0)).unwrap()),
    ];
    let water = HydraulicFluid::water();
    let ctx = FlowContext {
        fluid: &water,
        temperature_k: 330.0,
    };
    let total: f64 = parts
        .iter()
        .map(|c| c.pressure_loss(ctx, 0.3).unwrap())
        .sum();
    assert!(total.is_finite());
    assert_eq!(parts[2].name(), "pump");
}

proptest! {
    #[test]
    fn pipe_loss_monotonic_in_mass_flux(a in 0.0f64..5.0, b in 0.0f64..5.0) {
        let water = HydraulicFluid::water();
        let ctx = FlowContext { fluid: &water, temperature_k: 320.0 };
        let pipe = Pipe::new("p", m(30.0), m(0.05), m(1e-5)).unwrap();
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let dp_lo = pipe.pressure_loss(ctx, lo).unwrap();
        let dp_hi = pipe.pressure_loss(ctx, hi).unwrap();
        prop_assert!(dp_lo <= dp_hi + 1e-9);
    }

    #[test]
    fn friction_factor_positive(re in 1.0f64..1e7, eps in 0.0f64..0.05) {
        let f = friction_factor(re, eps);
        prop_assert!(f.is_finite() && f > 0.0);
    }
}
