//! Position source driven by test code.

use skyscore_audio::PositionSource;
use skyscore_core::{BiomeId, PlanetId};

/// Position that stays wherever it was last moved to.
#[derive(Debug, Clone, Default)]
pub struct ScriptedPosition {
    planet: Option<PlanetId>,
    biome: Option<BiomeId>,
    coordinates: (f64, f64),
}

impl ScriptedPosition {
    /// Start above `planet` (and `biome`, if given).
    pub fn at(planet: &str, biome: Option<&str>) -> Self {
        let mut position = Self::default();
        position.goto(planet, biome);
        position
    }

    /// Start with no known planet.
    pub fn nowhere() -> Self {
        Self::default()
    }

    /// Move above `planet`. Blank names read as unknown.
    pub fn goto(&mut self, planet: &str, biome: Option<&str>) {
        self.planet = PlanetId::new(planet);
        self.biome = biome.and_then(BiomeId::new);
    }

    /// Forget the planet, as when no vessel is active.
    pub fn lose_signal(&mut self) {
        self.planet = None;
        self.biome = None;
    }

    /// Set the reported latitude and longitude.
    pub fn set_coordinates(&mut self, latitude: f64, longitude: f64) {
        self.coordinates = (latitude, longitude);
    }
}

impl PositionSource for ScriptedPosition {
    fn current_planet(&self) -> Option<PlanetId> {
        self.planet.clone()
    }

    fn coordinates(&self) -> (f64, f64) {
        self.coordinates
    }

    fn current_biome(&self, _latitude: f64, _longitude: f64) -> Option<BiomeId> {
        self.biome.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn goto_changes_sample() {
        let mut position = ScriptedPosition::at("Kerbin", Some("Desert"));
        assert_eq!(position.sample().to_string(), "Kerbin/Desert");
        position.goto("Mun", None);
        assert_eq!(position.sample().to_string(), "Mun");
        position.lose_signal();
        assert!(position.sample().planet.is_none());
    }
}
