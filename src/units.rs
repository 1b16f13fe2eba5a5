// System of units.
//
// Lengths are in millimeters, times in nanoseconds and energies in MeV.
// Multiply a number by a unit to bring it into the system, divide by a unit to
// express an internal quantity in that unit.

pub const MM: f64 = 1.0;
pub const CM: f64 = 10.0 * MM;
pub const M: f64 = 1000.0 * MM;

pub const NS: f64 = 1.0;
pub const US: f64 = 1000.0 * NS;
pub const MS: f64 = 1000.0 * US;

pub const MEV: f64 = 1.0;
pub const KEV: f64 = 1.0e-3 * MEV;

/// Resolves a unit name as it appears in JSON descriptions.
pub fn by_name(name: &str) -> Option<f64> {
    let v = match name {
        "mm" => MM,
        "cm" => CM,
        "m" => M,
        "ns" => NS,
        "us" => US,
        "ms" => MS,
        "MeV" => MEV,
        "keV" => KEV,
        _ => return None,
    };
    Some(v)
}
