use std::sync::Once;
use uuid::Uuid;

use evogarden::model::actor::{
    Actor, ActorKind, Bird, Eagle, Egg, Flower, FlowerEffects, FlowerSeed, Genome, HerbicideSmoke,
    Insect, Nutrient, Sex,
};
use evogarden::model::config::SimulationParams;
use evogarden::model::factory::{factory_channel, FactoryWorker};
use evogarden::model::grid::Grid;
use evogarden::Garden;

static TRACING: Once = Once::new();

/// Installs a test-writer subscriber honoring `RUST_LOG`, once per test
/// binary. The crate itself never installs one.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Test harness around [`Garden`]: quiet climate, empty initial
/// populations, a connected factory double and hand-placed actors.
#[allow(dead_code)]
pub struct GardenBuilder {
    params: SimulationParams,
    actors: Vec<Actor>,
}

#[allow(dead_code)]
impl GardenBuilder {
    pub fn new(width: u16, height: u16) -> Self {
        let mut params = SimulationParams::default();
        params.world.width = width;
        params.world.height = height;
        params.world.seed = Some(42);
        params.world.initial_flowers = 0;
        params.world.initial_insects = 0;
        params.world.initial_birds = 0;
        params.climate.temperature_amplitude = 0.0;
        params.climate.humidity_amplitude = 0.0;
        params.climate.wind_strength = 0.0;
        params.weather.event_chance = 0.0;
        Self {
            params,
            actors: Vec::new(),
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.params.world.seed = Some(seed);
        self
    }

    pub fn with_params<F>(mut self, modifier: F) -> Self
    where
        F: FnOnce(&mut SimulationParams),
    {
        modifier(&mut self.params);
        self
    }

    pub fn with_actor(mut self, actor: Actor) -> Self {
        self.actors.push(actor);
        self
    }

    pub fn build(self) -> (Garden, FactoryWorker) {
        init_tracing();
        let (link, worker) = factory_channel();
        let mut garden = Garden::new(self.params);
        garden.connect_factory(link);
        garden.grid = Grid::from_actors(
            garden.params.world.width,
            garden.params.world.height,
            self.actors,
        );
        (garden, worker)
    }
}

#[allow(dead_code)]
pub struct FlowerBuilder {
    id: Uuid,
    x: u16,
    y: u16,
    health: f64,
    max_health: f64,
    stamina: f64,
    maturation_period: u32,
    age: u32,
    toxicity_rate: f64,
    min_temp: f64,
    max_temp: f64,
    nutrient_efficiency: f64,
}

#[allow(dead_code)]
impl FlowerBuilder {
    pub fn new(id: u128) -> Self {
        Self {
            id: Uuid::from_u128(id),
            x: 0,
            y: 0,
            health: 50.0,
            max_health: 100.0,
            stamina: 50.0,
            maturation_period: 10,
            age: 20,
            toxicity_rate: 0.0,
            min_temp: 0.0,
            max_temp: 40.0,
            nutrient_efficiency: 1.0,
        }
    }

    pub fn at(mut self, x: u16, y: u16) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    pub fn health(mut self, health: f64) -> Self {
        self.health = health;
        self.max_health = self.max_health.max(health);
        self
    }

    pub fn immature(mut self) -> Self {
        self.age = 0;
        self
    }

    pub fn toxicity(mut self, rate: f64) -> Self {
        self.toxicity_rate = rate;
        self
    }

    pub fn temperature_range(mut self, min: f64, max: f64) -> Self {
        self.min_temp = min;
        self.max_temp = max;
        self
    }

    pub fn build(self) -> Actor {
        Actor::new(
            self.id,
            self.x,
            self.y,
            ActorKind::Flower(Flower {
                genome: Genome(format!("genome-{}", self.id.as_u128())),
                image: "bloom.svg".into(),
                health: self.health,
                max_health: self.max_health,
                stamina: self.stamina,
                max_stamina: 100.0,
                nutrient_efficiency: self.nutrient_efficiency,
                min_temp: self.min_temp,
                max_temp: self.max_temp,
                maturation_period: self.maturation_period,
                sex: Sex::Both,
                toxicity_rate: self.toxicity_rate,
                effects: FlowerEffects::default(),
                age: self.age,
                is_mature: self.age >= self.maturation_period,
            }),
        )
    }
}

/// Flower payload as the factory double would synthesize it.
#[allow(dead_code)]
pub fn flower_payload(genome: &str) -> Flower {
    Flower {
        genome: Genome(genome.into()),
        image: "bloom.svg".into(),
        health: 50.0,
        max_health: 100.0,
        stamina: 50.0,
        max_stamina: 100.0,
        nutrient_efficiency: 1.0,
        min_temp: 0.0,
        max_temp: 40.0,
        maturation_period: 10,
        sex: Sex::Both,
        toxicity_rate: 0.0,
        effects: FlowerEffects::default(),
        age: 0,
        is_mature: false,
    }
}

#[allow(dead_code)]
pub fn insect_at(id: u128, x: u16, y: u16) -> Actor {
    Actor::new(Uuid::from_u128(id), x, y, ActorKind::Insect(Insect::hatch('🐝')))
}

#[allow(dead_code)]
pub fn insect_with_lifespan(id: u128, x: u16, y: u16, lifespan: u32) -> Actor {
    let mut actor = insect_at(id, x, y);
    if let ActorKind::Insect(insect) = &mut actor.kind {
        insect.lifespan = lifespan;
    }
    actor
}

#[allow(dead_code)]
pub fn bird_at(id: u128, x: u16, y: u16) -> Actor {
    Actor::new(Uuid::from_u128(id), x, y, ActorKind::Bird(Bird::default()))
}

#[allow(dead_code)]
pub fn eagle_at(id: u128, x: u16, y: u16) -> Actor {
    Actor::new(Uuid::from_u128(id), x, y, ActorKind::Eagle(Eagle::default()))
}

#[allow(dead_code)]
pub fn egg_at(id: u128, x: u16, y: u16, hatch_timer: u32) -> Actor {
    Actor::new(
        Uuid::from_u128(id),
        x,
        y,
        ActorKind::Egg(Egg {
            hatch_timer,
            insect_emoji: '🐝',
        }),
    )
}

#[allow(dead_code)]
pub fn nutrient_at(id: u128, x: u16, y: u16, lifespan: u32) -> Actor {
    Actor::new(
        Uuid::from_u128(id),
        x,
        y,
        ActorKind::Nutrient(Nutrient { lifespan }),
    )
}

#[allow(dead_code)]
pub fn seed_at(id: u128, x: u16, y: u16) -> Actor {
    Actor::new(
        Uuid::from_u128(id),
        x,
        y,
        ActorKind::FlowerSeed(FlowerSeed {
            image: "stem.svg".into(),
            health: 10.0,
            max_health: 10.0,
            age: 0,
        }),
    )
}

#[allow(dead_code)]
pub fn smoke_at(id: u128, x: u16, y: u16, lifespan: u32) -> Actor {
    Actor::new(
        Uuid::from_u128(id),
        x,
        y,
        ActorKind::HerbicideSmoke(HerbicideSmoke {
            lifespan,
            can_be_expanded: 0,
        }),
    )
}

/// First actor of a kind matching `pick`, from the committed grid.
#[allow(dead_code)]
pub fn find_actor<'a>(garden: &'a Garden, pick: &dyn Fn(&Actor) -> bool) -> Option<&'a Actor> {
    garden.grid.iter().find(|a| pick(a))
}

#[allow(dead_code)]
pub fn count_actors(garden: &Garden, pick: &dyn Fn(&Actor) -> bool) -> usize {
    garden.grid.iter().filter(|a| pick(a)).count()
}
