//! Exercise catalog: primary lifts plus the assistance menu.
//!
//! The catalog supplies the entry defaults used when a set is recorded
//! without an explicit weight or rep count.

use crate::config::AssistanceConfig;
use crate::Lift;
use once_cell::sync::Lazy;

/// Cached built-in catalog
static DEFAULT_CATALOG: Lazy<Catalog> = Lazy::new(build_default_catalog);

/// Default weight (kg) and reps prefilled for an exercise
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EntryDefaults {
    pub weight: f64,
    pub reps: u32,
}

const PRIMARY_DEFAULTS: EntryDefaults = EntryDefaults {
    weight: 60.0,
    reps: 10,
};

const ASSISTANCE_DEFAULTS: EntryDefaults = EntryDefaults {
    weight: 20.0,
    reps: 10,
};

/// A named exercise and its entry defaults
#[derive(Clone, Debug, PartialEq)]
pub struct ExerciseDef {
    pub name: String,
    pub lift: Option<Lift>,
    pub defaults: EntryDefaults,
}

#[derive(Clone, Debug)]
pub struct Catalog {
    pub exercises: Vec<ExerciseDef>,
}

/// Get a reference to the cached default catalog
pub fn get_default_catalog() -> &'static Catalog {
    &DEFAULT_CATALOG
}

/// Build the built-in catalog
pub fn build_default_catalog() -> Catalog {
    let mut exercises: Vec<ExerciseDef> = Lift::ALL
        .into_iter()
        .map(|lift| ExerciseDef {
            name: lift.name().to_string(),
            lift: Some(lift),
            defaults: PRIMARY_DEFAULTS,
        })
        .collect();

    exercises.extend(
        [
            "Dumbbell Press",
            "Shoulder Press",
            "Chin-up",
            "Dip",
            "Lunge",
            "Rowing",
        ]
        .into_iter()
        .map(|name| ExerciseDef {
            name: name.to_string(),
            lift: None,
            defaults: ASSISTANCE_DEFAULTS,
        }),
    );

    Catalog { exercises }
}

impl Catalog {
    /// Default catalog extended with user-configured assistance exercises
    pub fn with_custom(config: &AssistanceConfig) -> Self {
        let mut catalog = get_default_catalog().clone();
        for name in &config.custom {
            let name = name.trim();
            if name.is_empty() || catalog.find(name).is_some() {
                tracing::debug!("Skipping custom assistance exercise {:?}", name);
                continue;
            }
            catalog.exercises.push(ExerciseDef {
                name: name.to_string(),
                lift: None,
                defaults: ASSISTANCE_DEFAULTS,
            });
        }
        catalog
    }

    pub fn find(&self, name: &str) -> Option<&ExerciseDef> {
        self.exercises.iter().find(|e| e.name == name)
    }

    pub fn assistance(&self) -> impl Iterator<Item = &ExerciseDef> {
        self.exercises.iter().filter(|e| e.lift.is_none())
    }

    /// Entry defaults for `name`; unknown exercises get the assistance defaults
    pub fn defaults_for(&self, name: &str) -> EntryDefaults {
        self.find(name)
            .map(|e| e.defaults)
            .unwrap_or(ASSISTANCE_DEFAULTS)
    }
}
