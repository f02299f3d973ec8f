//! Thin flat plates carrying bending waves

use std::f64::consts::PI;

use super::{angular, Mobility, WaveSystem};
use crate::model::{SubsystemId, SubsystemKind};

/// Rectangular isotropic plate
#[derive(Debug, Clone, PartialEq)]
pub struct PlateSystem {
    pub id: SubsystemId,
    pub lx: f64,
    pub ly: f64,
    pub thickness: f64,
    pub density: f64,
    pub youngs_modulus: f64,
    pub poisson_ratio: f64,
    pub loss_factor: f64,
}

impl PlateSystem {
    pub fn area(&self) -> f64 {
        self.lx * self.ly
    }

    pub fn perimeter(&self) -> f64 {
        2.0 * (self.lx + self.ly)
    }

    /// Shortest edge
    pub fn min_edge(&self) -> f64 {
        self.lx.min(self.ly)
    }

    /// Surface mass m″ in kg/m²
    pub fn mass_per_area(&self) -> f64 {
        self.density * self.thickness
    }

    /// Bending stiffness D = Eh³ / 12(1 − ν²)
    pub fn bending_stiffness(&self) -> f64 {
        self.youngs_modulus * self.thickness.powi(3)
            / (12.0 * (1.0 - self.poisson_ratio * self.poisson_ratio))
    }

    /// Free bending wavenumber (ω² m″ / D)^¼
    pub fn bending_wavenumber(&self, frequency: f64) -> f64 {
        let omega = angular(frequency);
        (omega * omega * self.mass_per_area() / self.bending_stiffness()).powf(0.25)
    }

    /// Frequency where the bending speed equals the speed of sound `c0`
    pub fn critical_frequency(&self, c0: f64) -> f64 {
        c0 * c0 / (2.0 * PI) * (self.mass_per_area() / self.bending_stiffness()).sqrt()
    }

    /// Radiation efficiency into a fluid with sound speed `c0`
    ///
    /// Edge-mode radiation below coincidence, `1/√(1 − fc/f)` above, both
    /// capped by the value at coincidence.
    pub fn radiation_efficiency(&self, frequency: f64, c0: f64) -> f64 {
        let fc = self.critical_frequency(c0);
        let coincident_wavelength = c0 / fc;
        let peak = (self.lx / coincident_wavelength).sqrt() + (self.ly / coincident_wavelength).sqrt();

        let sigma = if frequency < fc {
            self.perimeter() * c0 / (PI * PI * self.area() * fc) * (frequency / fc).sqrt()
        } else if frequency > fc {
            1.0 / (1.0 - fc / frequency).sqrt()
        } else {
            peak
        };
        sigma.min(peak)
    }

    /// Drive-point mobility of the infinite plate, 1 / (8√(D m″))
    pub fn drive_point_mobility(&self) -> Mobility {
        Mobility::new(
            1.0 / (8.0 * (self.bending_stiffness() * self.mass_per_area()).sqrt()),
            0.0,
        )
    }
}

impl WaveSystem for PlateSystem {
    fn id(&self) -> SubsystemId {
        self.id
    }

    fn kind(&self) -> SubsystemKind {
        SubsystemKind::Plate
    }

    /// n(f) = (A/2)√(m″/D), flat in frequency
    fn modal_density(&self, _frequency: f64) -> f64 {
        0.5 * self.area() * (self.mass_per_area() / self.bending_stiffness()).sqrt()
    }

    fn wave_speed(&self, frequency: f64) -> f64 {
        angular(frequency) / self.bending_wavenumber(frequency)
    }

    fn group_velocity(&self, frequency: f64) -> f64 {
        2.0 * self.wave_speed(frequency)
    }

    fn loss_factor(&self, _frequency: f64) -> f64 {
        self.loss_factor
    }

    fn mass(&self) -> f64 {
        self.mass_per_area() * self.area()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn steel_plate() -> PlateSystem {
        PlateSystem {
            id: SubsystemId(1),
            lx: 1.2,
            ly: 0.8,
            thickness: 0.002,
            density: 7800.0,
            youngs_modulus: 210e9,
            poisson_ratio: 0.3,
            loss_factor: 0.01,
        }
    }

    #[test]
    fn test_modal_density_textbook_form() {
        // n(f) = √3 A / (h c_L) with c_L = √(E / ρ(1 − ν²))
        let plate = steel_plate();
        let c_l = (plate.youngs_modulus / (plate.density * (1.0 - 0.09))).sqrt();
        let expected = 3.0_f64.sqrt() * plate.area() / (plate.thickness * c_l);
        assert_relative_eq!(plate.modal_density(250.0), expected, max_relative = 1e-12);
        assert_relative_eq!(plate.modal_density(4000.0), expected, max_relative = 1e-12);
    }

    #[test]
    fn test_dispersion() {
        let plate = steel_plate();
        let c1 = plate.wave_speed(100.0);
        let c4 = plate.wave_speed(400.0);
        // Bending waves: c ∝ √f
        assert_relative_eq!(c4 / c1, 2.0, max_relative = 1e-12);
        assert_relative_eq!(plate.group_velocity(100.0), 2.0 * c1);
    }

    #[test]
    fn test_critical_frequency_of_thin_steel() {
        // ≈ 12.4 / h kHz·mm for steel in air
        let fc = steel_plate().critical_frequency(343.0);
        assert!(fc > 5500.0 && fc < 6500.0, "fc = {}", fc);
    }

    #[test]
    fn test_radiation_efficiency_regimes() {
        let plate = steel_plate();
        let fc = plate.critical_frequency(343.0);
        let low = plate.radiation_efficiency(0.1 * fc, 343.0);
        let mid = plate.radiation_efficiency(0.5 * fc, 343.0);
        let high = plate.radiation_efficiency(10.0 * fc, 343.0);
        assert!(low > 0.0 && low < mid);
        assert!(mid < 1.0);
        assert_relative_eq!(high, 1.0 / (0.9_f64).sqrt(), max_relative = 1e-12);
    }
}
