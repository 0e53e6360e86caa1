//! Random city events.
//!
//! The manager holds an immutable catalog of event templates. Once per cycle
//! it may clone one into an active instance: a global low-probability gate
//! runs first, then every eligible template rolls its own probability, and
//! one survivor is picked uniformly at random. Additive deltas land
//! immediately; multipliers and block flags persist through
//! [`CycleModifiers`] for the event's duration.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::city::City;
use crate::rng::SystemRng;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventCategory {
    Natural,
    Social,
    Economic,
    Technical,
    Entertainment,
    Seasonal,
    Health,
    Transport,
    Wildlife,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventSeverity {
    Minor,
    Moderate,
    Major,
    Critical,
}

/// Full effect bundle of an event. Additive fields apply once when the event
/// triggers; multiplicative fields and block flags hold for `duration`
/// cycles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEffect {
    pub satisfaction_multiplier: f64,
    pub satisfaction_change: f64,
    pub pollution_multiplier: f64,
    pub pollution_change: f64,
    pub water_consumption_multiplier: f64,
    pub electricity_consumption_multiplier: f64,
    pub budget_change: f64,
    pub budget_multiplier: f64,
    pub population_change: i64,
    pub block_park_effects: bool,
    pub block_commercial_income: bool,
    pub block_job_assignment: bool,
    /// Cycles the event stays active. 1 = this cycle only.
    pub duration: u32,
}

impl Default for EventEffect {
    fn default() -> Self {
        Self {
            satisfaction_multiplier: 1.0,
            satisfaction_change: 0.0,
            pollution_multiplier: 1.0,
            pollution_change: 0.0,
            water_consumption_multiplier: 1.0,
            electricity_consumption_multiplier: 1.0,
            budget_change: 0.0,
            budget_multiplier: 1.0,
            population_change: 0,
            block_park_effects: false,
            block_commercial_income: false,
            block_job_assignment: false,
            duration: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: u32,
    pub name: String,
    pub description: String,
    pub category: EventCategory,
    pub severity: EventSeverity,
    /// Per-cycle trigger chance in [0, 1], rolled after the global gate.
    pub probability: f64,
    pub effect: EventEffect,
}

impl Event {
    fn new(
        id: u32,
        name: &str,
        description: &str,
        category: EventCategory,
        severity: EventSeverity,
        probability: f64,
        effect: EventEffect,
    ) -> Self {
        Self {
            id,
            name: name.to_string(),
            description: description.to_string(),
            category,
            severity,
            probability,
            effect,
        }
    }

    /// Eligibility predicate. Events that take lives need someone to take
    /// them from; everything else may always occur.
    pub fn can_occur(&self, city: &City) -> bool {
        if self.effect.population_change < 0 {
            return city.population() > 0;
        }
        true
    }

    /// Apply the additive deltas: satisfaction and pollution through the
    /// city's clamping setters, budget unclamped, population floored at zero.
    pub fn apply(&self, city: &mut City) {
        info!(event = %self.name, severity = ?self.severity, "{}", self.description);
        let effect = &self.effect;
        if effect.satisfaction_change != 0.0 {
            city.set_satisfaction(city.satisfaction() + effect.satisfaction_change as i32);
        }
        if effect.pollution_change != 0.0 {
            city.set_pollution(city.pollution() + effect.pollution_change);
        }
        if effect.budget_change != 0.0 {
            city.set_budget(city.budget() + effect.budget_change);
        }
        if effect.population_change != 0 {
            let next = (city.population() as i64 + effect.population_change).max(0);
            city.set_population(next as u32);
        }
    }

    pub fn modifiers(&self) -> CycleModifiers {
        CycleModifiers {
            water_consumption: self.effect.water_consumption_multiplier,
            electricity_consumption: self.effect.electricity_consumption_multiplier,
            budget: self.effect.budget_multiplier,
            satisfaction: self.effect.satisfaction_multiplier,
            pollution: self.effect.pollution_multiplier,
            block_park_effects: self.effect.block_park_effects,
            block_commercial_income: self.effect.block_commercial_income,
            block_job_assignment: self.effect.block_job_assignment,
        }
    }
}

/// The active event's persistent influence on a cycle evaluation. The
/// default is the identity: every multiplier 1.0, nothing blocked.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleModifiers {
    pub water_consumption: f64,
    pub electricity_consumption: f64,
    pub budget: f64,
    pub satisfaction: f64,
    pub pollution: f64,
    pub block_park_effects: bool,
    pub block_commercial_income: bool,
    pub block_job_assignment: bool,
}

impl Default for CycleModifiers {
    fn default() -> Self {
        Self {
            water_consumption: 1.0,
            electricity_consumption: 1.0,
            budget: 1.0,
            satisfaction: 1.0,
            pollution: 1.0,
            block_park_effects: false,
            block_commercial_income: false,
            block_job_assignment: false,
        }
    }
}

/// An event instance cloned from the catalog, counting down its duration.
#[derive(Debug, Clone)]
pub struct ActiveEvent {
    pub event: Event,
    pub remaining_cycles: u32,
}

impl ActiveEvent {
    pub fn new(event: Event) -> Self {
        let remaining_cycles = event.effect.duration.max(1);
        Self {
            event,
            remaining_cycles,
        }
    }

    pub fn modifiers(&self) -> CycleModifiers {
        self.event.modifiers()
    }
}

pub struct EventManager {
    catalog: Vec<Event>,
    base_trigger_chance: f64,
}

impl EventManager {
    pub fn new(base_trigger_chance: f64) -> Self {
        Self {
            catalog: builtin_catalog(),
            base_trigger_chance,
        }
    }

    /// Replace the catalog, mainly for tests that need controlled odds.
    pub fn with_catalog(catalog: Vec<Event>, base_trigger_chance: f64) -> Self {
        Self {
            catalog,
            base_trigger_chance,
        }
    }

    pub fn catalog(&self) -> &[Event] {
        &self.catalog
    }

    pub fn event(&self, id: u32) -> Option<&Event> {
        self.catalog.iter().find(|e| e.id == id)
    }

    pub fn events_in_category(&self, category: EventCategory) -> Vec<&Event> {
        self.catalog
            .iter()
            .filter(|e| e.category == category)
            .collect()
    }

    /// Maybe produce this cycle's event. Two independent probability gates
    /// (global, then per-event), then a uniform pick among the survivors.
    /// The returned event is a clone; the catalog stays untouched.
    pub fn roll(&self, city: &City, rng: &mut SystemRng<'_>) -> Option<Event> {
        if self.catalog.is_empty() {
            return None;
        }
        if rng.gen::<f64>() >= self.base_trigger_chance {
            return None;
        }

        let mut candidates: Vec<&Event> = Vec::new();
        for event in &self.catalog {
            if event.can_occur(city) && rng.gen::<f64>() < event.probability {
                candidates.push(event);
            }
        }
        if candidates.is_empty() {
            return None;
        }
        Some(candidates[rng.gen_range(0..candidates.len())].clone())
    }
}

fn builtin_catalog() -> Vec<Event> {
    use EventCategory::*;
    use EventSeverity::*;

    vec![
        Event::new(
            1,
            "Great Fire",
            "A major fire tears through several blocks before the crews contain it.",
            Natural,
            Major,
            0.08,
            EventEffect {
                satisfaction_change: -20.0,
                pollution_change: 15.0,
                budget_change: -500.0,
                ..Default::default()
            },
        ),
        Event::new(
            2,
            "Flash Flood",
            "Torrential rain floods whole districts and damages the water network.",
            Natural,
            Critical,
            0.05,
            EventEffect {
                satisfaction_change: -25.0,
                water_consumption_multiplier: 0.5,
                budget_change: -700.0,
                ..Default::default()
            },
        ),
        Event::new(
            3,
            "Earthquake",
            "A quake shakes the city; buildings crumble and residents panic.",
            Natural,
            Critical,
            0.03,
            EventEffect {
                satisfaction_change: -30.0,
                budget_change: -1000.0,
                population_change: -20,
                ..Default::default()
            },
        ),
        Event::new(
            4,
            "Hurricane",
            "A category-4 hurricane makes landfall. Massive damage, but the air is scrubbed clean.",
            Natural,
            Critical,
            0.02,
            EventEffect {
                satisfaction_change: -35.0,
                budget_change: -1200.0,
                pollution_change: -10.0,
                population_change: -30,
                ..Default::default()
            },
        ),
        Event::new(
            5,
            "Meteor Shower",
            "A dazzling night-sky show draws stargazing tourists from everywhere.",
            Natural,
            Minor,
            0.04,
            EventEffect {
                satisfaction_change: 20.0,
                budget_change: 700.0,
                ..Default::default()
            },
        ),
        Event::new(
            6,
            "Heatwave",
            "A crushing heatwave sends water and electricity demand through the roof.",
            Seasonal,
            Moderate,
            0.12,
            EventEffect {
                satisfaction_change: -15.0,
                water_consumption_multiplier: 2.0,
                electricity_consumption_multiplier: 1.8,
                duration: 2,
                ..Default::default()
            },
        ),
        Event::new(
            7,
            "Blizzard",
            "Snow blocks the roads and shutters every storefront until the plows catch up.",
            Seasonal,
            Major,
            0.06,
            EventEffect {
                satisfaction_change: -18.0,
                budget_change: -400.0,
                block_commercial_income: true,
                duration: 2,
                ..Default::default()
            },
        ),
        Event::new(
            8,
            "General Strike",
            "The workforce walks out. No production, no services, no hiring.",
            Social,
            Major,
            0.10,
            EventEffect {
                satisfaction_change: -20.0,
                block_job_assignment: true,
                block_commercial_income: true,
                duration: 2,
                ..Default::default()
            },
        ),
        Event::new(
            9,
            "Gardeners' Strike",
            "Park crews down tools; the green spaces go to seed.",
            Social,
            Moderate,
            0.09,
            EventEffect {
                satisfaction_change: -20.0,
                block_park_effects: true,
                duration: 2,
                ..Default::default()
            },
        ),
        Event::new(
            10,
            "Mass Protest",
            "Thousands march through the center; policing the crowds is expensive.",
            Social,
            Minor,
            0.15,
            EventEffect {
                satisfaction_change: -12.0,
                budget_change: -200.0,
                ..Default::default()
            },
        ),
        Event::new(
            11,
            "Economic Boom",
            "The economy surges; commercial income jumps by half while it lasts.",
            Economic,
            Major,
            0.05,
            EventEffect {
                satisfaction_change: 20.0,
                budget_change: 1000.0,
                budget_multiplier: 1.5,
                duration: 2,
                ..Default::default()
            },
        ),
        Event::new(
            12,
            "Stock Market Crash",
            "Markets collapse; commercial income is cut in half.",
            Economic,
            Major,
            0.06,
            EventEffect {
                satisfaction_change: -25.0,
                budget_change: -800.0,
                budget_multiplier: 0.5,
                duration: 2,
                ..Default::default()
            },
        ),
        Event::new(
            13,
            "Tax Revolt",
            "Citizens refuse to pay up; municipal income sags by a third.",
            Economic,
            Moderate,
            0.10,
            EventEffect {
                satisfaction_change: -20.0,
                budget_multiplier: 0.7,
                duration: 2,
                ..Default::default()
            },
        ),
        Event::new(
            14,
            "Generous Donation",
            "A lottery winner hands their fortune to the city treasury.",
            Economic,
            Minor,
            0.02,
            EventEffect {
                satisfaction_change: 10.0,
                budget_change: 2000.0,
                ..Default::default()
            },
        ),
        Event::new(
            15,
            "Giant Power Outage",
            "A cascading blackout sends electricity consumption soaring.",
            Technical,
            Moderate,
            0.11,
            EventEffect {
                satisfaction_change: -15.0,
                electricity_consumption_multiplier: 1.5,
                ..Default::default()
            },
        ),
        Event::new(
            16,
            "Burst Water Mains",
            "The main pipes rupture and water pours into the streets.",
            Technical,
            Moderate,
            0.10,
            EventEffect {
                satisfaction_change: -10.0,
                budget_change: -350.0,
                water_consumption_multiplier: 2.0,
                ..Default::default()
            },
        ),
        Event::new(
            17,
            "Nuclear Scare",
            "A reactor threatens meltdown; panic, evacuations and a toxic plume.",
            Technical,
            Critical,
            0.01,
            EventEffect {
                satisfaction_change: -45.0,
                pollution_change: 30.0,
                population_change: -50,
                budget_change: -1500.0,
                ..Default::default()
            },
        ),
        Event::new(
            18,
            "Flu Epidemic",
            "A vicious flu keeps a third of the workforce in bed.",
            Health,
            Moderate,
            0.10,
            EventEffect {
                satisfaction_change: -15.0,
                budget_change: -350.0,
                block_job_assignment: true,
                duration: 2,
                ..Default::default()
            },
        ),
        Event::new(
            19,
            "Pandemic",
            "A devastating pandemic forces a general lockdown; the economy stops.",
            Health,
            Critical,
            0.01,
            EventEffect {
                satisfaction_change: -40.0,
                population_change: -100,
                budget_change: -1500.0,
                block_job_assignment: true,
                duration: 3,
                ..Default::default()
            },
        ),
        Event::new(
            20,
            "Medical Breakthrough",
            "A local researcher announces a landmark cure; the city makes headlines.",
            Health,
            Minor,
            0.03,
            EventEffect {
                satisfaction_change: 15.0,
                budget_change: 500.0,
                ..Default::default()
            },
        ),
        Event::new(
            21,
            "Total Gridlock",
            "Every bus is stuck; nobody can get to work.",
            Transport,
            Major,
            0.13,
            EventEffect {
                satisfaction_change: -25.0,
                block_job_assignment: true,
                ..Default::default()
            },
        ),
        Event::new(
            22,
            "Bridge Collapse",
            "A major bridge gives way, cutting off whole districts.",
            Transport,
            Critical,
            0.04,
            EventEffect {
                satisfaction_change: -30.0,
                budget_change: -900.0,
                population_change: -10,
                ..Default::default()
            },
        ),
        Event::new(
            23,
            "Cultural Festival",
            "A huge festival draws visitors from around the world.",
            Entertainment,
            Minor,
            0.12,
            EventEffect {
                satisfaction_change: 15.0,
                budget_change: 300.0,
                ..Default::default()
            },
        ),
        Event::new(
            24,
            "Celebrity Visit",
            "A world-famous star tours the city; the crowds spend freely.",
            Entertainment,
            Minor,
            0.08,
            EventEffect {
                satisfaction_change: 12.0,
                budget_change: 400.0,
                ..Default::default()
            },
        ),
        Event::new(
            25,
            "Pigeon Invasion",
            "Flocks of oversized pigeons descend; the cleanup crews despair.",
            Wildlife,
            Moderate,
            0.12,
            EventEffect {
                satisfaction_change: -15.0,
                pollution_change: 10.0,
                ..Default::default()
            },
        ),
        Event::new(
            26,
            "Rat Infestation",
            "Rats overrun the sewers and climb into the housing stock.",
            Wildlife,
            Moderate,
            0.09,
            EventEffect {
                satisfaction_change: -22.0,
                pollution_change: 15.0,
                budget_change: -300.0,
                ..Default::default()
            },
        ),
        Event::new(
            27,
            "Dolphin Pod Visit",
            "Dolphins settle in the harbor and the tourists follow.",
            Wildlife,
            Minor,
            0.05,
            EventEffect {
                satisfaction_change: 15.0,
                budget_change: 300.0,
                ..Default::default()
            },
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Tuning;
    use crate::types::Resources;

    fn city(population: u32) -> City {
        City::new(
            "Testville",
            1000.0,
            population,
            Resources::default(),
            Tuning::default(),
        )
    }

    #[test]
    fn catalog_covers_every_category() {
        let manager = EventManager::new(0.02);
        for category in [
            EventCategory::Natural,
            EventCategory::Social,
            EventCategory::Economic,
            EventCategory::Technical,
            EventCategory::Entertainment,
            EventCategory::Seasonal,
            EventCategory::Health,
            EventCategory::Transport,
            EventCategory::Wildlife,
        ] {
            assert!(
                !manager.events_in_category(category).is_empty(),
                "no events in {category:?}"
            );
        }
    }

    #[test]
    fn catalog_probabilities_are_sane() {
        let manager = EventManager::new(0.02);
        for event in manager.catalog() {
            assert!((0.0..=1.0).contains(&event.probability), "{}", event.name);
            assert!(event.effect.duration >= 1, "{}", event.name);
        }
    }

    #[test]
    fn apply_clamps_satisfaction_and_pollution() {
        let mut city = city(100);
        city.set_satisfaction(10);
        city.set_pollution(95.0);
        let manager = EventManager::new(0.02);
        let scare = manager.event(17).unwrap();
        scare.apply(&mut city);
        assert_eq!(city.satisfaction(), 0);
        assert_eq!(city.pollution(), 100.0);
        assert_eq!(city.population(), 50);
        assert_eq!(city.budget(), -500.0);
    }

    #[test]
    fn apply_floors_population_at_zero() {
        let mut city = city(5);
        let manager = EventManager::new(0.02);
        manager.event(19).unwrap().apply(&mut city);
        assert_eq!(city.population(), 0);
    }

    #[test]
    fn deadly_events_need_a_population() {
        let city = city(0);
        let manager = EventManager::new(0.02);
        assert!(!manager.event(3).unwrap().can_occur(&city));
        assert!(manager.event(23).unwrap().can_occur(&city));
    }

    #[test]
    fn modifiers_mirror_the_effect_bundle() {
        let manager = EventManager::new(0.02);
        let strike = manager.event(8).unwrap();
        let modifiers = strike.modifiers();
        assert!(modifiers.block_job_assignment);
        assert!(modifiers.block_commercial_income);
        assert!(!modifiers.block_park_effects);
        assert_eq!(modifiers.budget, 1.0);
    }

    #[test]
    fn roll_is_deterministic_for_a_seed() {
        use crate::rng::RngManager;
        let city = city(200);
        let manager = EventManager::new(1.0);
        let pick = |seed: u64| {
            let mut rng = RngManager::new(seed);
            manager
                .roll(&city, &mut rng.stream("events"))
                .map(|e| e.id)
        };
        assert_eq!(pick(42), pick(42));
    }

    #[test]
    fn roll_respects_the_global_gate() {
        use crate::rng::RngManager;
        let city = city(200);
        let manager = EventManager::new(0.0);
        let mut rng = RngManager::new(1);
        for _ in 0..50 {
            assert!(manager.roll(&city, &mut rng.stream("events")).is_none());
        }
    }

    #[test]
    fn roll_always_triggers_with_certain_odds() {
        use crate::rng::RngManager;
        let city = city(200);
        let sure_thing = Event::new(
            99,
            "Sure Thing",
            "Always happens.",
            EventCategory::Entertainment,
            EventSeverity::Minor,
            1.0,
            EventEffect::default(),
        );
        let manager = EventManager::with_catalog(vec![sure_thing], 1.0);
        let mut rng = RngManager::new(3);
        let mut stream = rng.stream("events");
        for _ in 0..20 {
            assert_eq!(manager.roll(&city, &mut stream).map(|e| e.id), Some(99));
        }
    }
}
