//! Fixed tuning constants. Anything a host is expected to tune lives in
//! `SimulationParams` instead.

/// Max points per quadtree node before it subdivides.
pub const QUADTREE_NODE_CAPACITY: usize = 4;

/// Ring length for the insect/bird count histories.
pub const POPULATION_TREND_WINDOW: usize = 10;
/// Weighted rate-of-change above which a population counts as growing.
pub const TREND_GROWTH_THRESHOLD: f64 = 0.05;
/// Weighted rate-of-change below which (negated) a population counts as declining.
pub const TREND_DECLINE_THRESHOLD: f64 = 0.05;

/// Ticks between dynamically spawned birds.
pub const BIRD_SPAWN_COOLDOWN: u32 = 50;
/// Ticks between dynamically spawned eagles.
pub const EAGLE_SPAWN_COOLDOWN: u32 = 80;
/// Eagles are only spawned while more than this many birds are alive.
pub const EAGLE_MIN_BIRDS: usize = 2;

pub const INSECT_LIFESPAN: u32 = 200;
pub const INSECT_VISION_RADIUS: i32 = 5;
/// Chance per tick that two adjacent, paired-up insects lay an egg.
pub const INSECT_REPRODUCTION_CHANCE: f64 = 0.25;
/// Lifespan ticks lost per unit of flower toxicity when landing on it.
pub const INSECT_TOXICITY_DAMAGE: f64 = 10.0;

pub const BIRD_VISION_RADIUS: i32 = 8;
pub const BIRD_DROP_NUTRIENT_CHANCE: f64 = 0.02;
pub const EAGLE_VISION_RADIUS: i32 = 12;

pub const EGG_HATCH_TIME: u32 = 30;

/// Lifespan of a nutrient dropped by a bird after eating an insect.
pub const NUTRIENT_FROM_PREY_LIFESPAN: u32 = 30;
/// Lifespan of a randomly dropped nutrient.
pub const NUTRIENT_LIFESPAN: u32 = 60;
/// Base healing applied to each adjacent flower, scaled by its nutrient efficiency.
pub const FLOWER_NUTRIENT_HEAL: f64 = 10.0;

pub const FLOWER_STAMINA_REGEN: f64 = 1.0;
/// Health lost per degree outside the flower's tolerated range, per tick.
pub const FLOWER_TEMP_STRESS_RATE: f64 = 0.5;
/// Fraction of max stamina a mature flower needs before it may self-seed.
pub const FLOWER_SELF_SEED_STAMINA_THRESHOLD: f64 = 0.9;
pub const FLOWER_SELF_SEED_CHANCE: f64 = 0.02;
pub const FLOWER_SELF_SEED_STAMINA_COST: f64 = 40.0;

/// Floor for the estimated health of a freshly requested seed.
pub const FLOWER_SEED_MIN_HEALTH: f64 = 1.0;
/// Stem image shared by every seed until synthesis completes.
pub const SEED_STEM_IMAGE: &str = "stem.svg";

pub const HERBICIDE_PLANE_STRIDE: u32 = 3;

pub const INSECT_SPECIES: &[char] = &['🐝', '🦋', '🐞', '🦗'];

/// How long the engine waits for the factory port before giving up on startup.
pub const FACTORY_INIT_TIMEOUT_MS: u64 = 10_000;
