use anyhow::{Context, Result};
use serde::Deserialize;
use skyscore_audio::PositionSource;
use skyscore_core::{BiomeId, PlanetId};
use std::{fs, path::Path};

#[derive(Debug, Deserialize)]
struct FlightFile {
    steps: Vec<FlightStep>,
}

/// One leg of a scripted flight.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct FlightStep {
    /// How many ticks the vessel stays here.
    pub ticks: u64,
    /// Body below the vessel; absent means no active vessel.
    #[serde(default)]
    pub planet: Option<String>,
    #[serde(default)]
    pub biome: Option<String>,
    #[serde(default)]
    pub latitude: f64,
    #[serde(default)]
    pub longitude: f64,
}

/// Replays a JSON flight plan one tick at a time.
pub struct ScriptedFlight {
    steps: Vec<FlightStep>,
    elapsed: u64,
}

impl ScriptedFlight {
    pub fn from_path(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read flight script {}", path.display()))?;
        Self::from_json(&contents)
            .with_context(|| format!("Failed to parse flight script {}", path.display()))
    }

    pub fn from_json(contents: &str) -> Result<Self> {
        let file: FlightFile = serde_json::from_str(contents)?;
        Self::new(file.steps)
    }

    pub fn new(steps: Vec<FlightStep>) -> Result<Self> {
        if steps.is_empty() {
            anyhow::bail!("flight script contains no steps");
        }
        Ok(Self { steps, elapsed: 0 })
    }

    /// Ticks covered by the whole script.
    pub fn total_ticks(&self) -> u64 {
        self.steps.iter().map(|step| step.ticks).sum()
    }

    pub fn finished(&self) -> bool {
        self.elapsed >= self.total_ticks()
    }

    /// Move one tick forward. Past the end the vessel stays on the last step.
    pub fn advance(&mut self) {
        self.elapsed = self.elapsed.saturating_add(1);
    }

    /// Step covering the current tick.
    pub fn current_step(&self) -> &FlightStep {
        let mut remaining = self.elapsed;
        for step in &self.steps {
            if remaining < step.ticks {
                return step;
            }
            remaining -= step.ticks;
        }
        // new() rejects empty scripts
        &self.steps[self.steps.len() - 1]
    }
}

impl PositionSource for ScriptedFlight {
    fn current_planet(&self) -> Option<PlanetId> {
        self.current_step().planet.as_deref().and_then(PlanetId::new)
    }

    fn coordinates(&self) -> (f64, f64) {
        let step = self.current_step();
        (step.latitude, step.longitude)
    }

    fn current_biome(&self, _latitude: f64, _longitude: f64) -> Option<BiomeId> {
        self.current_step().biome.as_deref().and_then(BiomeId::new)
    }
}
