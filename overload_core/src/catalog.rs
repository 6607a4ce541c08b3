//! Default catalog of exercises and routines.
//!
//! This module provides the built-in exercises a new log is seeded with and
//! the lookups the CLI uses to resolve exercise IDs.

use crate::types::*;
use crate::{Error, Result};
use once_cell::sync::Lazy;
use std::collections::{BTreeMap, HashMap};

/// Exercise and routine definitions
#[derive(Clone, Debug)]
pub struct Catalog {
    pub exercises: HashMap<String, ExerciseDefinition>,
    pub routines: HashMap<String, Routine>,
}

/// Cached default catalog - built once and reused across all operations
static DEFAULT_CATALOG: Lazy<Catalog> = Lazy::new(build_default_catalog);

/// Get a reference to the cached default catalog
pub fn get_default_catalog() -> &'static Catalog {
    &DEFAULT_CATALOG
}

fn exercise(
    id: &str,
    name: &str,
    muscle_group: &str,
    equipment_type: EquipmentType,
    default_rest_seconds: u32,
    target_sets: u32,
    target_reps_range: &str,
) -> ExerciseDefinition {
    ExerciseDefinition {
        id: id.into(),
        name: name.into(),
        muscle_group: muscle_group.into(),
        equipment_type,
        default_rest_seconds,
        target_sets,
        target_reps_range: target_reps_range.into(),
    }
}

/// Builds a fresh copy of the built-in catalog
///
/// Callers that only read should use `get_default_catalog()`, which builds it once.
pub fn build_default_catalog() -> Catalog {
    let defaults = vec![
        exercise("bench_press", "Flat Bench Press", "Chest", EquipmentType::Barbell, 120, 4, "8-10"),
        exercise("overhead_press", "Barbell Overhead Press", "Shoulders", EquipmentType::Barbell, 90, 3, "10"),
        exercise("dumbbell_fly", "Dumbbell Flyes", "Chest", EquipmentType::Dumbbell, 60, 3, "12"),
        exercise("lateral_raise", "Lateral Raises", "Shoulders", EquipmentType::Dumbbell, 60, 4, "15"),
        exercise("skull_crusher", "Skull Crushers", "Triceps", EquipmentType::Barbell, 60, 3, "10-12"),
        exercise("cable_pushdown", "Cable Triceps Pushdown", "Triceps", EquipmentType::Cable, 60, 3, "12-15"),
    ];

    let routine = Routine {
        id: "push_day".into(),
        name: "Push Day".into(),
        exercise_ids: defaults.iter().map(|e| e.id.clone()).collect(),
    };

    Catalog {
        exercises: defaults.into_iter().map(|e| (e.id.clone(), e)).collect(),
        routines: HashMap::from([(routine.id.clone(), routine)]),
    }
}

impl Catalog {
    /// Look up an exercise definition by ID
    pub fn exercise(&self, id: &str) -> Result<&ExerciseDefinition> {
        self.exercises
            .get(id)
            .ok_or_else(|| Error::Catalog(format!("Unknown exercise '{}'", id)))
    }

    /// Look up a routine by ID
    pub fn routine(&self, id: &str) -> Result<&Routine> {
        self.routines
            .get(id)
            .ok_or_else(|| Error::Catalog(format!("Unknown routine '{}'", id)))
    }

    /// Exercises grouped by muscle group, each group sorted by name
    pub fn by_muscle_group(&self) -> BTreeMap<&str, Vec<&ExerciseDefinition>> {
        let mut groups: BTreeMap<&str, Vec<&ExerciseDefinition>> = BTreeMap::new();
        for def in self.exercises.values() {
            let group = if def.muscle_group.is_empty() {
                "Other"
            } else {
                def.muscle_group.as_str()
            };
            groups.entry(group).or_default().push(def);
        }
        for defs in groups.values_mut() {
            defs.sort_by(|a, b| a.name.cmp(&b.name));
        }
        groups
    }

    /// Muscle groups used by the catalog plus user-defined ones, sorted
    pub fn muscle_groups(&self, custom: &[String]) -> Vec<String> {
        let mut groups: Vec<String> = self
            .exercises
            .values()
            .map(|e| e.muscle_group.clone())
            .chain(custom.iter().cloned())
            .filter(|g| !g.is_empty())
            .collect();
        groups.sort();
        groups.dedup();
        groups
    }

    /// Validate the catalog for consistency and completeness
    ///
    /// Returns a list of validation errors, or empty Vec if valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        for (id, def) in &self.exercises {
            if id.is_empty() || def.id.is_empty() {
                errors.push("Exercise has empty ID".to_string());
            }
            if id != &def.id {
                errors.push(format!(
                    "Exercise key '{}' doesn't match exercise.id '{}'",
                    id, def.id
                ));
            }
            if def.name.is_empty() {
                errors.push(format!("Exercise '{}' has empty name", id));
            }
            if def.target_sets == 0 {
                errors.push(format!("Exercise '{}' has zero target sets", id));
            }

            let range = RepRange::parse(&def.target_reps_range);
            if range.min > range.max {
                errors.push(format!(
                    "Exercise '{}': min reps {} > max {}",
                    id, range.min, range.max
                ));
            }
        }

        for (id, routine) in &self.routines {
            if id != &routine.id {
                errors.push(format!(
                    "Routine key '{}' doesn't match routine.id '{}'",
                    id, routine.id
                ));
            }
            for exercise_id in &routine.exercise_ids {
                if !self.exercises.contains_key(exercise_id) {
                    errors.push(format!(
                        "Routine '{}' references non-existent exercise '{}'",
                        id, exercise_id
                    ));
                }
            }
        }

        errors
    }
}
