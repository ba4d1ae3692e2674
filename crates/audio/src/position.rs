//! Vessel position sampling.

use skyscore_core::{BiomeId, PlanetId};
use std::fmt;

/// One sampled location.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Location {
    /// Body the vessel is orbiting or flying over; `None` when unknown.
    pub planet: Option<PlanetId>,
    /// Biome below the vessel, if the host can tell.
    pub biome: Option<BiomeId>,
}

impl Location {
    /// Location on a planet with no biome information.
    pub fn planet(planet: PlanetId) -> Self {
        Self {
            planet: Some(planet),
            biome: None,
        }
    }

    /// Location on a planet above a specific biome.
    pub fn biome(planet: PlanetId, biome: BiomeId) -> Self {
        Self {
            planet: Some(planet),
            biome: Some(biome),
        }
    }

    /// Nowhere known (no active vessel, unknown body).
    pub fn nowhere() -> Self {
        Self::default()
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.planet, &self.biome) {
            (Some(planet), Some(biome)) => write!(f, "{planet}/{biome}"),
            (Some(planet), None) => write!(f, "{planet}"),
            (None, _) => f.write_str("<unknown>"),
        }
    }
}

/// Where the vessel is.
pub trait PositionSource {
    /// Body currently below the vessel.
    fn current_planet(&self) -> Option<PlanetId>;

    /// Latitude and longitude in degrees.
    fn coordinates(&self) -> (f64, f64);

    /// Biome at the given coordinates on the current planet.
    fn current_biome(&self, latitude: f64, longitude: f64) -> Option<BiomeId>;

    /// Take one sample. The biome is only queried when the planet is known.
    fn sample(&self) -> Location {
        let planet = self.current_planet();
        let biome = if planet.is_some() {
            let (latitude, longitude) = self.coordinates();
            self.current_biome(latitude, longitude)
        } else {
            None
        };
        Location { planet, biome }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct Probe {
        planet: Option<&'static str>,
        biome_queries: Cell<u32>,
    }

    impl PositionSource for Probe {
        fn current_planet(&self) -> Option<PlanetId> {
            self.planet.and_then(PlanetId::new)
        }

        fn coordinates(&self) -> (f64, f64) {
            (-0.1, 74.5)
        }

        fn current_biome(&self, latitude: f64, _longitude: f64) -> Option<BiomeId> {
            self.biome_queries.set(self.biome_queries.get() + 1);
            if latitude < 0.0 {
                BiomeId::new("Shores")
            } else {
                BiomeId::new("Highlands")
            }
        }
    }

    #[test]
    fn sample_queries_biome_at_coordinates() {
        let probe = Probe {
            planet: Some("Kerbin"),
            biome_queries: Cell::new(0),
        };
        let location = probe.sample();
        assert_eq!(location.to_string(), "Kerbin/Shores");
        assert_eq!(probe.biome_queries.get(), 1);
    }

    #[test]
    fn unknown_planet_skips_biome_lookup() {
        let probe = Probe {
            planet: None,
            biome_queries: Cell::new(0),
        };
        assert_eq!(probe.sample(), Location::nowhere());
        assert_eq!(probe.biome_queries.get(), 0);
    }
}
