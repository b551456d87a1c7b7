//! One-time resolution of model class names to ids.
//!
//! The model maps class ids to names ("Dice", "Pip"). Resolving the lookup
//! once at model-load time keeps the per-frame path free of string searches.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::IngestError;

pub const DIE_CLASS_NAME: &str = "Dice";
pub const PIP_CLASS_NAME: &str = "Pip";

/// The two class ids ingest cares about, resolved from the model's name map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassBindings {
    pub die_class_id: u32,
    pub pip_class_id: u32,
}

impl ClassBindings {
    /// Resolve from a `class_id -> name` map. A missing name means the
    /// loaded model is not the die-detection model.
    pub fn resolve(names: &HashMap<u32, String>) -> Result<Self, IngestError> {
        let find = |name: &'static str| {
            names
                .iter()
                .find(|(_, n)| n.as_str() == name)
                .map(|(&id, _)| id)
                .ok_or(IngestError::MissingClass { name })
        };
        Ok(Self {
            die_class_id: find(DIE_CLASS_NAME)?,
            pip_class_id: find(PIP_CLASS_NAME)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(pairs: &[(u32, &str)]) -> HashMap<u32, String> {
        pairs.iter().map(|&(id, n)| (id, n.to_string())).collect()
    }

    #[test]
    fn test_resolve_both_classes() {
        let map = names(&[(0, "Dice"), (1, "Pip")]);
        let bindings = ClassBindings::resolve(&map).unwrap();
        assert_eq!(bindings.die_class_id, 0);
        assert_eq!(bindings.pip_class_id, 1);
    }

    #[test]
    fn test_ids_need_not_be_ordered() {
        let map = names(&[(7, "Pip"), (3, "Dice")]);
        let bindings = ClassBindings::resolve(&map).unwrap();
        assert_eq!(bindings.die_class_id, 3);
        assert_eq!(bindings.pip_class_id, 7);
    }

    #[test]
    fn test_missing_class_is_an_error() {
        let map = names(&[(0, "Dice")]);
        let err = ClassBindings::resolve(&map).unwrap_err();
        assert!(matches!(err, IngestError::MissingClass { name: "Pip" }));
    }
}
