// zf-core/src/units.rs

use uom::si::f64::{
    Area as UomArea, Length as UomLength, MassRate as UomMassRate, Power as UomPower,
    Pressure as UomPressure, Ratio as UomRatio,
    ThermodynamicTemperature as UomThermodynamicTemperature, Time as UomTime, Volume as UomVolume,
};

// Public canonical unit types (SI, f64)
pub type Area = UomArea;
pub type Length = UomLength;
pub type MassRate = UomMassRate;
pub type Power = UomPower;
pub type Pressure = UomPressure;
pub type Ratio = UomRatio;
pub type Temperature = UomThermodynamicTemperature;
pub type Time = UomTime;
pub type Volume = UomVolume;

#[inline]
pub fn pa(v: f64) -> Pressure {
    use uom::si::pressure::pascal;
    Pressure::new::<pascal>(v)
}

#[inline]
pub fn k(v: f64) -> Temperature {
    use uom::si::thermodynamic_temperature::kelvin;
    Temperature::new::<kelvin>(v)
}

#[inline]
pub fn kgps(v: f64) -> MassRate {
    use uom::si::mass_rate::kilogram_per_second;
    MassRate::new::<kilogram_per_second>(v)
}

#[inline]
pub fn m(v: f64) -> Length {
    use uom::si::length::meter;
    Length::new::<meter>(v)
}

#[inline]
pub fn m2(v: f64) -> Area {
    use uom::si::area::square_meter;
    Area::new::<square_meter>(v)
}

#[inline]
pub fn m3(v: f64) -> Volume {
    use uom::si::volume::cubic_meter;
    Volume::new::<cubic_meter>(v)
}

#[inline]
pub fn w(v: f64) -> Power {
    use uom::si::power::watt;
    Power::new::<watt>(v)
}

#[inline]
pub fn s(v: f64) -> Time {
    use uom::si::time::second;
    Time::new::<second>(v)
}

#[inline]
pub fn unitless(v: f64) -> Ratio {
    use uom::si::ratio::ratio;
    Ratio::new::<ratio>(v)
}

pub mod constants {
    pub const SECONDS_PER_HOUR: f64 = 3600.0;
    pub const SECONDS_PER_DAY: f64 = 86_400.0;

    /// Dry air density at 20 C [kg/m3].
    pub const AIR_DENSITY: f64 = 1.205;
    /// Dry air specific heat capacity [J/kgK].
    pub const AIR_SPECIFIC_HEAT_CAPACITY: f64 = 1006.0;
    /// Specific gas constant of water vapour [J/kgK].
    pub const GAS_CONSTANT_VAPOUR: f64 = 461.89;
}

/// Saturation vapour pressure over water [Pa] (Magnus formula, T in K).
pub fn saturation_pressure(t_k: f64) -> f64 {
    let t_c = t_k - 273.15;
    611.2 * (17.62 * t_c / (243.12 + t_c)).exp()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_smoke() {
        assert_eq!(pa(101_325.0).value, 101_325.0);
        assert_eq!(k(293.15).value, 293.15);
        assert_eq!(kgps(1.2).value, 1.2);
        assert_eq!(m(2.0).value, 2.0);
        assert_eq!(m2(3.0).value, 3.0);
        assert_eq!(m3(4.0).value, 4.0);
        assert_eq!(w(5.0).value, 5.0);
        let _dt = s(0.1);
        let _r = unitless(0.5);
    }

    #[test]
    fn saturation_pressure_at_20c() {
        let p = saturation_pressure(293.15);
        assert!((p - 2337.0).abs() < 15.0, "got {p}");
    }

    proptest::proptest! {
        #[test]
        fn saturation_pressure_grows_with_temperature(t in 243.15f64..333.15, dt in 0.01f64..10.0) {
            proptest::prop_assert!(saturation_pressure(t + dt) > saturation_pressure(t));
        }
    }
}
