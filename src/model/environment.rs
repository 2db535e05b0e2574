use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

use crate::model::config::{ClimateConfig, WeatherConfig};
use crate::model::events::{EngineEvent, Importance};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Season {
    Spring,
    Summer,
    Autumn,
    Winter,
}

impl Season {
    pub fn from_progress(progress: f64) -> Self {
        if progress < 0.25 {
            Season::Spring
        } else if progress < 0.5 {
            Season::Summer
        } else if progress < 0.75 {
            Season::Autumn
        } else {
            Season::Winter
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Season::Spring => "🌱 Spring",
            Season::Summer => "☀️ Summer",
            Season::Autumn => "🍂 Autumn",
            Season::Winter => "❄️ Winter",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeatherKind {
    None,
    Heatwave,
    ColdSnap,
    HeavyRain,
    Drought,
}

impl WeatherKind {
    pub fn label(&self) -> &'static str {
        match self {
            WeatherKind::None => "clear skies",
            WeatherKind::Heatwave => "heatwave",
            WeatherKind::ColdSnap => "cold snap",
            WeatherKind::HeavyRain => "heavy rain",
            WeatherKind::Drought => "drought",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherEvent {
    pub kind: WeatherKind,
    pub duration: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentState {
    pub current_temperature: f64,
    pub current_humidity: f64,
    pub season: Season,
    pub weather: WeatherEvent,
}

impl Default for EnvironmentState {
    fn default() -> Self {
        Self {
            current_temperature: 20.0,
            current_humidity: 0.5,
            season: Season::Spring,
            weather: WeatherEvent {
                kind: WeatherKind::None,
                duration: 0,
            },
        }
    }
}

impl EnvironmentState {
    /// Advances the seasonal cycle and the weather-event state machine for
    /// one tick. Weather modifiers apply while the event's duration lasts;
    /// the tick after it runs out emits the "ended" event.
    pub fn update(
        &mut self,
        tick: u64,
        climate: &ClimateConfig,
        weather: &WeatherConfig,
        rng: &mut ChaCha8Rng,
        events: &mut Vec<EngineEvent>,
    ) {
        let progress = (tick % climate.season_length) as f64 / climate.season_length as f64;
        let angle = TAU * progress;
        let mut temperature =
            climate.base_temperature + angle.sin() * climate.temperature_amplitude;
        let mut humidity = climate.base_humidity + angle.sin() * climate.humidity_amplitude;
        self.season = Season::from_progress(progress);

        if self.weather.kind == WeatherKind::None && weather.event_chance > 0.0 {
            if rng.gen_bool(weather.event_chance.min(1.0)) {
                let kind = match rng.gen_range(0..4) {
                    0 => WeatherKind::Heatwave,
                    1 => WeatherKind::ColdSnap,
                    2 => WeatherKind::HeavyRain,
                    _ => WeatherKind::Drought,
                };
                let duration = rng.gen_range(weather.min_duration..=weather.max_duration);
                self.weather = WeatherEvent { kind, duration };
                events.push(EngineEvent::info(
                    tick,
                    Importance::High,
                    format!("A {} has started", kind.label()),
                ));
            }
        }

        if self.weather.kind != WeatherKind::None {
            if self.weather.duration > 0 {
                match self.weather.kind {
                    WeatherKind::Heatwave => temperature += weather.heatwave_temp_increase,
                    WeatherKind::ColdSnap => temperature -= weather.coldsnap_temp_decrease,
                    WeatherKind::HeavyRain => humidity += weather.heavy_rain_humidity_increase,
                    WeatherKind::Drought => humidity -= weather.drought_humidity_decrease,
                    WeatherKind::None => {}
                }
                self.weather.duration -= 1;
            } else {
                events.push(EngineEvent::info(
                    tick,
                    Importance::Low,
                    format!("The {} has ended", self.weather.kind.label()),
                ));
                self.weather.kind = WeatherKind::None;
            }
        }

        self.current_temperature = temperature;
        self.current_humidity = humidity.clamp(0.0, 1.0);
    }
}
