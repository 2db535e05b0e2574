use serde::{Deserialize, Serialize};
use std::fs;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct WorldConfig {
    pub width: u16,
    pub height: u16,
    /// Seed for the simulation RNG; `None` picks one from entropy.
    pub seed: Option<u64>,
    pub initial_flowers: usize,
    pub initial_insects: usize,
    pub initial_birds: usize,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ClimateConfig {
    pub base_temperature: f64,
    pub temperature_amplitude: f64,
    pub base_humidity: f64,
    pub humidity_amplitude: f64,
    /// Length of a full four-season cycle, in ticks.
    pub season_length: u64,
    pub wind_dx: i32,
    pub wind_dy: i32,
    /// Probability that the wind-side cell is preferred when placing a seed.
    pub wind_strength: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct WeatherConfig {
    /// Per-tick chance that a weather event starts while none is active.
    pub event_chance: f64,
    pub min_duration: u32,
    pub max_duration: u32,
    pub heatwave_temp_increase: f64,
    pub coldsnap_temp_decrease: f64,
    pub heavy_rain_humidity_increase: f64,
    pub drought_humidity_decrease: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct HerbicideConfig {
    /// Health lost per tick by a flower standing in smoke.
    pub damage: f64,
    pub cooldown: u32,
    /// Fraction of cells holding a flower or seed that triggers a sweep.
    pub flower_density_threshold: f64,
    pub smoke_lifespan: u32,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct EvolutionConfig {
    /// Forwarded to the flower service; genome synthesis happens there.
    pub mutation_chance: f32,
    pub mutation_amount: f32,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct InsectConfig {
    pub reproduction_cooldown: u32,
    /// Chance that an insect picks up or deposits pollen on a flower it lands on.
    pub pollination_chance: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotificationMode {
    All,
    Important,
    None,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub tick_ms: u64,
    pub notification_mode: NotificationMode,
    /// Forwarded to the flower service for image synthesis.
    pub flower_detail_radius: u32,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SimulationParams {
    pub world: WorldConfig,
    pub climate: ClimateConfig,
    pub weather: WeatherConfig,
    pub herbicide: HerbicideConfig,
    pub evolution: EvolutionConfig,
    pub insect: InsectConfig,
    pub engine: EngineConfig,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            world: WorldConfig {
                width: 40,
                height: 30,
                seed: None,
                initial_flowers: 20,
                initial_insects: 12,
                initial_birds: 2,
            },
            climate: ClimateConfig {
                base_temperature: 20.0,
                temperature_amplitude: 12.0,
                base_humidity: 0.5,
                humidity_amplitude: 0.2,
                season_length: 400,
                wind_dx: 1,
                wind_dy: 0,
                wind_strength: 0.3,
            },
            weather: WeatherConfig {
                event_chance: 0.01,
                min_duration: 10,
                max_duration: 40,
                heatwave_temp_increase: 15.0,
                coldsnap_temp_decrease: 15.0,
                heavy_rain_humidity_increase: 0.3,
                drought_humidity_decrease: 0.3,
            },
            herbicide: HerbicideConfig {
                damage: 25.0,
                cooldown: 100,
                flower_density_threshold: 0.6,
                smoke_lifespan: 5,
            },
            evolution: EvolutionConfig {
                mutation_chance: 0.1,
                mutation_amount: 0.2,
            },
            insect: InsectConfig {
                reproduction_cooldown: 20,
                pollination_chance: 1.0,
            },
            engine: EngineConfig {
                tick_ms: 100,
                notification_mode: NotificationMode::Important,
                flower_detail_radius: 64,
            },
        }
    }
}

impl SimulationParams {
    pub fn load() -> Self {
        if let Ok(content) = fs::read_to_string("evogarden.toml") {
            if let Ok(params) = toml::from_str(&content) {
                return params;
            }
            tracing::warn!("evogarden.toml is present but unreadable, using defaults");
        }
        Self::default()
    }

    pub fn cell_count(&self) -> usize {
        self.world.width as usize * self.world.height as usize
    }
}
