//! Named variable storage shared by a pipeline's local scope and the
//! process-global scope, with read-only protection.

use crate::error::PipelineError;
use crate::hooks::HookRegistry;
use std::collections::HashMap;
use std::sync::RwLock;

/// Strip a leading `$` (variable-reference sigil) and lowercase — applied
/// to every key on every store and lookup, so `$Name`, `name`, and `NAME`
/// all address the same slot.
pub fn normalize_variable_name(raw: &str) -> String {
    raw.strip_prefix('$').unwrap_or(raw).to_lowercase()
}

/// Fired before a variable lookup resolves; may rewrite the key that will
/// actually be looked up.
#[derive(Debug, Clone)]
pub struct VariableRetrievingEvent {
    pub name: String,
}

/// Fired after a variable lookup resolves; may rewrite the value that will
/// be returned to the caller.
#[derive(Debug, Clone)]
pub struct VariableRetrievedEvent {
    pub value: String,
}

#[derive(Clone, Debug)]
struct Slot {
    value: String,
    read_only: bool,
}

/// A name -> (value, read-only) map. The same shape backs both the
/// process-global store and each pipeline's local store; which store is
/// consulted, and in what order, is the caller's concern (see
/// [`VariableStore::get`]'s `global` parameter).
#[derive(Default)]
pub struct VariableStore {
    slots: RwLock<HashMap<String, Slot>>,
}

impl VariableStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a value, bypassing the read-only check. Reserved for engine
    /// bookkeeping (seeding `__global` at dispatch, applying
    /// [`crate::config::PipelineConfig`] seeds, or a hook rewriting a
    /// result) — scripts only ever reach [`VariableStore::safe_set`].
    pub fn set(&self, key: &str, value: impl Into<String>, read_only: bool) {
        let key = normalize_variable_name(key);
        self.slots
            .write()
            .expect("variable store lock poisoned")
            .insert(key, Slot { value: value.into(), read_only });
    }

    /// Store a value, honoring read-only protection. Returns
    /// [`PipelineError::ReadOnlyViolation`] if the slot is currently marked
    /// read-only.
    pub fn safe_set(&self, key: &str, value: impl Into<String>) -> Result<(), PipelineError> {
        let key = normalize_variable_name(key);
        let mut slots = self.slots.write().expect("variable store lock poisoned");
        if let Some(slot) = slots.get(&key) {
            if slot.read_only {
                return Err(PipelineError::ReadOnlyViolation { name: key });
            }
        }
        slots.insert(key, Slot { value: value.into(), read_only: false });
        Ok(())
    }

    pub fn is_set(&self, key: &str) -> bool {
        let key = normalize_variable_name(key);
        self.slots.read().expect("variable store lock poisoned").contains_key(&key)
    }

    fn raw_get(&self, key: &str) -> Option<String> {
        self.slots.read().expect("variable store lock poisoned").get(key).map(|s| s.value.clone())
    }

    fn raw_get_with_flag(&self, key: &str) -> Option<(String, bool)> {
        self.slots.read().expect("variable store lock poisoned").get(key).map(|s| (s.value.clone(), s.read_only))
    }

    /// Drop every stored slot. Used to reset the process-global store
    /// between independent test runs or host sessions.
    pub fn clear_globals(&self) {
        self.slots.write().expect("variable store lock poisoned").clear();
    }

    pub fn unset_global(&self, key: &str) {
        let key = normalize_variable_name(key);
        self.slots.write().expect("variable store lock poisoned").remove(&key);
    }

    /// Retrieve a value, firing the retrieving/retrieved hooks around the
    /// lookup. When `fallback_to_global` is set and the key is absent
    /// locally, `global` (if given) is consulted before giving up — and if
    /// found there, the value *and its read-only flag* are copied into
    /// this store, so a local variable that inherits a read-only global
    /// stays protected by a later `safeSet` even though the read happened
    /// through the fallback path rather than an explicit `set`.
    pub fn get(
        &self,
        key: &str,
        fallback_to_global: bool,
        global: Option<&VariableStore>,
        retrieving_hooks: &HookRegistry<VariableRetrievingEvent>,
        retrieved_hooks: &HookRegistry<VariableRetrievedEvent>,
    ) -> Result<String, PipelineError> {
        let mut retrieving = VariableRetrievingEvent { name: normalize_variable_name(key) };
        retrieving_hooks.fire(&mut retrieving);
        let key = normalize_variable_name(&retrieving.name);

        let value = match self.raw_get(&key) {
            Some(v) => v,
            None if fallback_to_global => {
                let Some((value, read_only)) = global.and_then(|g| g.raw_get_with_flag(&key)) else {
                    return Err(PipelineError::UnknownVariable { name: key });
                };
                self.slots
                    .write()
                    .expect("variable store lock poisoned")
                    .insert(key.clone(), Slot { value: value.clone(), read_only });
                value
            }
            None => return Err(PipelineError::UnknownVariable { name: key }),
        };

        let mut retrieved = VariableRetrievedEvent { value };
        retrieved_hooks.fire(&mut retrieved);
        Ok(retrieved.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_hooks() -> (HookRegistry<VariableRetrievingEvent>, HookRegistry<VariableRetrievedEvent>) {
        (HookRegistry::new(), HookRegistry::new())
    }

    #[test]
    fn set_then_get_round_trips() {
        let store = VariableStore::new();
        store.set("$Name", "Bond", false);
        let (retrieving, retrieved) = no_hooks();
        let value = store.get("name", false, None, &retrieving, &retrieved).unwrap();
        assert_eq!(value, "Bond");
    }

    #[test]
    fn safe_set_rejects_read_only() {
        let store = VariableStore::new();
        store.set("pin", "1234", true);
        let err = store.safe_set("pin", "0000").unwrap_err();
        assert!(matches!(err, PipelineError::ReadOnlyViolation { name } if name == "pin"));
    }

    #[test]
    fn get_falls_back_to_global_when_requested() {
        let local = VariableStore::new();
        let global = VariableStore::new();
        global.set("shared", "from-global", false);
        let (retrieving, retrieved) = no_hooks();
        let value = local.get("shared", true, Some(&global), &retrieving, &retrieved).unwrap();
        assert_eq!(value, "from-global");
    }

    #[test]
    fn get_without_fallback_does_not_consult_global() {
        let local = VariableStore::new();
        let global = VariableStore::new();
        global.set("shared", "from-global", false);
        let (retrieving, retrieved) = no_hooks();
        let err = local.get("shared", false, Some(&global), &retrieving, &retrieved).unwrap_err();
        assert!(matches!(err, PipelineError::UnknownVariable { name } if name == "shared"));
    }

    #[test]
    fn unknown_variable_is_an_error() {
        let store = VariableStore::new();
        let (retrieving, retrieved) = no_hooks();
        let err = store.get("missing", false, None, &retrieving, &retrieved).unwrap_err();
        assert!(matches!(err, PipelineError::UnknownVariable { name } if name == "missing"));
    }

    #[test]
    fn retrieving_hook_can_redirect_the_lookup() {
        let store = VariableStore::new();
        store.set("real", "value", false);
        let retrieving: HookRegistry<VariableRetrievingEvent> = HookRegistry::new();
        retrieving.subscribe(|event| event.name = "real".to_string());
        let retrieved = HookRegistry::new();
        let value = store.get("decoy", false, None, &retrieving, &retrieved).unwrap();
        assert_eq!(value, "value");
    }

    #[test]
    fn retrieved_hook_can_rewrite_the_value() {
        let store = VariableStore::new();
        store.set("greeting", "hello", false);
        let retrieving = HookRegistry::new();
        let retrieved: HookRegistry<VariableRetrievedEvent> = HookRegistry::new();
        retrieved.subscribe(|event| event.value = event.value.to_uppercase());
        let value = store.get("greeting", false, None, &retrieving, &retrieved).unwrap();
        assert_eq!(value, "HELLO");
    }

    #[test]
    fn fallback_read_inherits_the_global_slots_read_only_flag() {
        let local = VariableStore::new();
        let global = VariableStore::new();
        global.set("pin", "1234", true);
        let (retrieving, retrieved) = no_hooks();
        let value = local.get("pin", true, Some(&global), &retrieving, &retrieved).unwrap();
        assert_eq!(value, "1234");

        let err = local.safe_set("pin", "0000").unwrap_err();
        assert!(matches!(err, PipelineError::ReadOnlyViolation { name } if name == "pin"));
    }

    #[test]
    fn clear_globals_and_unset_global_remove_slots() {
        let store = VariableStore::new();
        store.set("a", "1", false);
        store.set("b", "2", false);
        store.unset_global("a");
        assert!(!store.is_set("a"));
        assert!(store.is_set("b"));
        store.clear_globals();
        assert!(!store.is_set("b"));
    }
}
