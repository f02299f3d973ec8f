//! Standard material library

use crate::model::Material;

/// Density of air at 20 °C in kg/m³
pub const AIR_DENSITY: f64 = 1.21;

/// Speed of sound in air at 20 °C in m/s
pub const AIR_SPEED_OF_SOUND: f64 = 343.0;

/// Names of all predefined materials
pub fn list_materials() -> Vec<&'static str> {
    vec!["steel", "aluminium", "concrete", "glass", "plywood", "air"]
}

/// Look up a predefined material, ignoring case
pub fn standard_material(name: &str) -> Option<Material> {
    let material = match name.to_lowercase().as_str() {
        "steel" => Material::solid("steel", 7800.0, 210e9, 0.3, 0.001),
        "aluminium" | "aluminum" => Material::solid("aluminium", 2700.0, 70e9, 0.33, 0.001),
        "concrete" => Material::solid("concrete", 2400.0, 30e9, 0.2, 0.01),
        "glass" => Material::solid("glass", 2500.0, 70e9, 0.22, 0.002),
        "plywood" => Material::solid("plywood", 600.0, 8e9, 0.3, 0.02),
        "air" => Material::fluid("air", AIR_DENSITY, AIR_SPEED_OF_SOUND, 0.0),
        _ => return None,
    };
    Some(material)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("steel", 7800.0 ; "steel")]
    #[test_case("aluminium", 2700.0 ; "aluminium")]
    #[test_case("aluminum", 2700.0 ; "aluminum alias")]
    #[test_case("concrete", 2400.0 ; "concrete")]
    #[test_case("air", 1.21 ; "air")]
    fn test_standard_density(name: &str, density: f64) {
        assert_eq!(standard_material(name).unwrap().density, density);
    }

    #[test]
    fn test_every_listed_material_resolves() {
        for name in list_materials() {
            let material = standard_material(name).unwrap();
            assert_eq!(material.name, name);
            assert!(material.validate().is_ok());
        }
    }

    #[test]
    fn test_lookup_ignores_case() {
        assert_eq!(standard_material("Steel"), standard_material("steel"));
        assert!(standard_material("AIR").unwrap().is_fluid());
        assert!(standard_material("unobtainium").is_none());
    }
}
