//! Conversions between the model's native units (decimal feet) and metric.

/// Millimetres per foot.
pub const MM_PER_FOOT: f64 = 304.8;

/// Square metres per square foot.
pub const M2_PER_SQ_FOOT: f64 = 0.092_903_04;

#[must_use]
pub fn mm_to_feet(mm: f64) -> f64 {
    mm / MM_PER_FOOT
}

#[must_use]
pub fn feet_to_mm(feet: f64) -> f64 {
    feet * MM_PER_FOOT
}

#[must_use]
pub fn sq_feet_to_m2(sq_feet: f64) -> f64 {
    sq_feet * M2_PER_SQ_FOOT
}

#[must_use]
pub fn m2_to_sq_feet(m2: f64) -> f64 {
    m2 / M2_PER_SQ_FOOT
}
