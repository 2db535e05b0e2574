use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::constants::{INSECT_LIFESPAN, INSECT_SPECIES};

/// Ids come from the simulation RNG so that runs are replayable under a
/// fixed seed.
pub fn generate_id(rng: &mut ChaCha8Rng) -> Uuid {
    Uuid::from_u128(rng.gen())
}

pub fn random_species(rng: &mut ChaCha8Rng) -> char {
    INSECT_SPECIES[rng.gen_range(0..INSECT_SPECIES.len())]
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Coord {
    pub x: u16,
    pub y: u16,
}

impl Coord {
    pub fn new(x: u16, y: u16) -> Self {
        Self { x, y }
    }

    pub fn distance_sq(&self, other: Coord) -> i64 {
        let dx = self.x as i64 - other.x as i64;
        let dy = self.y as i64 - other.y as i64;
        dx * dx + dy * dy
    }
}

/// Opaque genome handle. Synthesis and crossover happen in the external
/// flower service; the core only carries it around.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(transparent)]
pub struct Genome(pub String);

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Sex {
    Male,
    Female,
    Both,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Default)]
pub struct FlowerEffects {
    pub vitality: f32,
    pub agility: f32,
    pub strength: f32,
    pub intelligence: f32,
    pub luck: f32,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Flower {
    pub genome: Genome,
    /// Rendered blob from the flower service; stripped on save and
    /// regenerated on load.
    pub image: String,
    pub health: f64,
    pub max_health: f64,
    pub stamina: f64,
    pub max_stamina: f64,
    pub nutrient_efficiency: f64,
    pub min_temp: f64,
    pub max_temp: f64,
    pub maturation_period: u32,
    pub sex: Sex,
    pub toxicity_rate: f64,
    pub effects: FlowerEffects,
    pub age: u32,
    pub is_mature: bool,
}

impl Flower {
    pub fn refresh_maturity(&mut self) {
        self.is_mature = self.age >= self.maturation_period;
    }
}

/// Placeholder occupying a cell while the flower service synthesizes the
/// real flower. Its id doubles as the factory request id.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct FlowerSeed {
    pub image: String,
    pub health: f64,
    pub max_health: f64,
    pub age: u32,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Pollen {
    pub genome: Genome,
    /// Weak reference: the flower may die while the pollen is carried.
    pub source_flower_id: Uuid,
}

fn default_insect_emoji() -> char {
    INSECT_SPECIES[0]
}

fn default_insect_lifespan() -> u32 {
    INSECT_LIFESPAN
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Insect {
    pub pollen: Option<Pollen>,
    // Older saves predate these two fields; back-fill on load.
    #[serde(default = "default_insect_emoji")]
    pub emoji: char,
    #[serde(default = "default_insect_lifespan")]
    pub lifespan: u32,
    #[serde(default)]
    pub reproduction_cooldown: u32,
}

impl Insect {
    pub fn hatch(emoji: char) -> Self {
        Self {
            pollen: None,
            emoji,
            lifespan: INSECT_LIFESPAN,
            reproduction_cooldown: 0,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct Bird {
    pub target: Option<Coord>,
    pub patrol_target: Option<Coord>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct Eagle {
    pub target: Option<Coord>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Egg {
    pub hatch_timer: u32,
    pub insect_emoji: char,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Nutrient {
    pub lifespan: u32,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct HerbicidePlane {
    pub dx: i32,
    pub dy: i32,
    pub turn_dx: i32,
    pub turn_dy: i32,
    pub stride: u32,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct HerbicideSmoke {
    pub lifespan: u32,
    /// Freshly dropped smoke expands to its 8 neighbors once; the
    /// expanded cells never do.
    pub can_be_expanded: u32,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActorKind {
    Flower(Flower),
    FlowerSeed(FlowerSeed),
    Insect(Insect),
    Bird(Bird),
    Eagle(Eagle),
    Egg(Egg),
    Nutrient(Nutrient),
    HerbicidePlane(HerbicidePlane),
    HerbicideSmoke(HerbicideSmoke),
}

impl ActorKind {
    pub fn tag(&self) -> &'static str {
        match self {
            ActorKind::Flower(_) => "flower",
            ActorKind::FlowerSeed(_) => "flower_seed",
            ActorKind::Insect(_) => "insect",
            ActorKind::Bird(_) => "bird",
            ActorKind::Eagle(_) => "eagle",
            ActorKind::Egg(_) => "egg",
            ActorKind::Nutrient(_) => "nutrient",
            ActorKind::HerbicidePlane(_) => "herbicide_plane",
            ActorKind::HerbicideSmoke(_) => "herbicide_smoke",
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Actor {
    pub id: Uuid,
    pub x: u16,
    pub y: u16,
    #[serde(flatten)]
    pub kind: ActorKind,
}

impl Actor {
    pub fn new(id: Uuid, x: u16, y: u16, kind: ActorKind) -> Self {
        Self { id, x, y, kind }
    }

    pub fn pos(&self) -> Coord {
        Coord::new(self.x, self.y)
    }

    pub fn is_flower_or_seed(&self) -> bool {
        matches!(
            self.kind,
            ActorKind::Flower(_) | ActorKind::FlowerSeed(_)
        )
    }

    pub fn as_flower(&self) -> Option<&Flower> {
        match &self.kind {
            ActorKind::Flower(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_flower_mut(&mut self) -> Option<&mut Flower> {
        match &mut self.kind {
            ActorKind::Flower(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_insect(&self) -> Option<&Insect> {
        match &self.kind {
            ActorKind::Insect(i) => Some(i),
            _ => None,
        }
    }

    pub fn as_insect_mut(&mut self) -> Option<&mut Insect> {
        match &mut self.kind {
            ActorKind::Insect(i) => Some(i),
            _ => None,
        }
    }
}
