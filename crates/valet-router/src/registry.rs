// SPDX-FileCopyrightText: 2026 Valet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Talent descriptor registry with stable priority ordering.

use valet_core::error::ValetError;
use valet_core::types::TalentDescriptor;
use valet_core::FALLBACK_TALENT;

/// Owns the routing metadata of every registered talent.
///
/// Descriptors are kept in registration order; [`TalentRegistry::candidates`]
/// sorts by priority with a stable sort so equal priorities keep their
/// registration order for tie-breaking.
#[derive(Default)]
pub struct TalentRegistry {
    descriptors: Vec<TalentDescriptor>,
}

impl TalentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a talent descriptor.
    ///
    /// Rejects duplicate names, and keyword-less talents other than the
    /// fallback (a talent with no keywords could never be routed to).
    pub fn register(&mut self, descriptor: TalentDescriptor) -> Result<(), ValetError> {
        if descriptor.name.trim().is_empty() {
            return Err(ValetError::Config(
                "talent name must not be empty".to_string(),
            ));
        }
        if self.get(&descriptor.name).is_some() {
            return Err(ValetError::Config(format!(
                "talent `{}` is already registered",
                descriptor.name
            )));
        }
        if descriptor.keywords.is_empty() && descriptor.name != FALLBACK_TALENT {
            return Err(ValetError::Config(format!(
                "talent `{}` declares no keywords and is not the fallback",
                descriptor.name
            )));
        }
        self.descriptors.push(descriptor);
        Ok(())
    }

    /// Enables or disables a registered talent.
    pub fn set_enabled(&mut self, name: &str, enabled: bool) -> Result<(), ValetError> {
        match self.descriptors.iter_mut().find(|d| d.name == name) {
            Some(d) => {
                d.enabled = enabled;
                Ok(())
            }
            None => Err(ValetError::TalentNotFound {
                name: name.to_string(),
            }),
        }
    }

    pub fn get(&self, name: &str) -> Option<&TalentDescriptor> {
        self.descriptors.iter().find(|d| d.name == name)
    }

    /// Descriptors sorted by descending priority, registration order on ties.
    pub fn candidates(&self) -> Vec<&TalentDescriptor> {
        let mut sorted: Vec<&TalentDescriptor> = self.descriptors.iter().collect();
        sorted.sort_by(|a, b| b.priority.cmp(&a.priority));
        sorted
    }

    /// All descriptors in registration order.
    pub fn all(&self) -> &[TalentDescriptor] {
        &self.descriptors
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_and_get() {
        let mut registry = TalentRegistry::new();
        registry
            .register(TalentDescriptor::new("weather", "forecasts").with_keywords(["weather"]))
            .unwrap();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("weather").unwrap().priority, 50);
        assert!(registry.get("news").is_none());
    }

    #[test]
    fn duplicate_name_rejected() {
        let mut registry = TalentRegistry::new();
        registry
            .register(TalentDescriptor::new("weather", "forecasts").with_keywords(["weather"]))
            .unwrap();
        let err = registry
            .register(TalentDescriptor::new("weather", "other").with_keywords(["sun"]))
            .unwrap_err();
        assert!(err.to_string().contains("already registered"));
    }

    #[test]
    fn keywordless_talent_rejected_unless_fallback() {
        let mut registry = TalentRegistry::new();
        assert!(registry
            .register(TalentDescriptor::new("silent", "no keywords"))
            .is_err());
        assert!(registry
            .register(TalentDescriptor::new(FALLBACK_TALENT, "general chat"))
            .is_ok());
    }

    #[test]
    fn candidates_sorted_by_priority_stable_ties() {
        let mut registry = TalentRegistry::new();
        registry
            .register(TalentDescriptor::new("first", "a").with_priority(50).with_keywords(["a"]))
            .unwrap();
        registry
            .register(TalentDescriptor::new("high", "b").with_priority(80).with_keywords(["b"]))
            .unwrap();
        registry
            .register(TalentDescriptor::new("second", "c").with_priority(50).with_keywords(["c"]))
            .unwrap();

        let names: Vec<&str> = registry.candidates().iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["high", "first", "second"]);
    }

    #[test]
    fn set_enabled_toggles_and_errors_on_unknown() {
        let mut registry = TalentRegistry::new();
        registry
            .register(TalentDescriptor::new("weather", "forecasts").with_keywords(["weather"]))
            .unwrap();

        registry.set_enabled("weather", false).unwrap();
        assert!(!registry.get("weather").unwrap().enabled);

        let err = registry.set_enabled("missing", true).unwrap_err();
        assert!(matches!(err, ValetError::TalentNotFound { .. }));
    }
}
