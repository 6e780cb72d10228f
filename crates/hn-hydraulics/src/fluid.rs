//! Built-in liquid property table (≈20 °C).

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FluidProperties {
    pub canonical_id: &'static str,
    pub display_name: &'static str,
    pub aliases: &'static [&'static str],
    /// kg/m³
    pub density: f64,
    /// m²/s
    pub kinematic_viscosity: f64,
    /// Pa
    pub vapor_pressure: f64,
}

impl FluidProperties {
    pub fn matches_id(&self, id: &str) -> bool {
        let id = id.trim();
        self.canonical_id.eq_ignore_ascii_case(id)
            || self.aliases.iter().any(|alias| alias.eq_ignore_ascii_case(id))
    }
}

const CATALOG: [FluidProperties; 5] = [
    FluidProperties {
        canonical_id: "water",
        display_name: "Water",
        aliases: &["h2o", "fresh water"],
        density: 998.2,
        kinematic_viscosity: 1.004e-6,
        vapor_pressure: 2_339.0,
    },
    FluidProperties {
        canonical_id: "seawater",
        display_name: "Seawater",
        aliases: &["sea water", "brine"],
        density: 1_025.0,
        kinematic_viscosity: 1.05e-6,
        vapor_pressure: 2_300.0,
    },
    FluidProperties {
        canonical_id: "glycol30",
        display_name: "Ethylene glycol 30%",
        aliases: &["glycol", "eg30"],
        density: 1_040.0,
        kinematic_viscosity: 2.5e-6,
        vapor_pressure: 2_000.0,
    },
    FluidProperties {
        canonical_id: "diesel",
        display_name: "Diesel fuel",
        aliases: &["gasoil"],
        density: 832.0,
        kinematic_viscosity: 3.0e-6,
        vapor_pressure: 400.0,
    },
    FluidProperties {
        canonical_id: "oil",
        display_name: "Hydraulic oil ISO VG 46",
        aliases: &["hydraulic oil", "vg46"],
        density: 870.0,
        kinematic_viscosity: 4.6e-5,
        vapor_pressure: 10.0,
    },
];

pub fn catalog() -> &'static [FluidProperties] {
    &CATALOG
}

pub fn lookup(id: &str) -> Option<&'static FluidProperties> {
    CATALOG.iter().find(|f| f.matches_id(id))
}

pub fn water() -> &'static FluidProperties {
    &CATALOG[0]
}
