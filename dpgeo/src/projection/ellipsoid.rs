//! Ellipsoïde de référence du RGF93

/// GRS80, ellipsoïde de Lambert 93 (écart avec WGS84 négligeable à l'échelle d'un plan)
pub struct GRS80;

impl GRS80 {
    /// Demi-grand axe (m)
    pub const A: f64 = 6_378_137.0;

    /// Aplatissement inverse
    pub const INV_F: f64 = 298.257_222_101;

    pub const F: f64 = 1.0 / Self::INV_F;

    /// Excentricité au carré
    pub const E2: f64 = Self::F * (2.0 - Self::F);

    /// Excentricité (racine de `E2`)
    pub const E: f64 = 0.081_819_191_042_815_8;
}
