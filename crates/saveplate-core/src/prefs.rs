use saveplate_types::Role;

use crate::storage::{KeyValueStore, StoreError};

/// Storage key of each role's dark-mode flag. The NGO key predates the
/// per-role naming and is kept for compatibility with existing stores.
pub fn dark_mode_key(role: Role) -> &'static str {
    match role {
        Role::Donor => "donorDarkMode",
        Role::Ngo => "darkMode",
        Role::Orphanage => "orphanageDarkMode",
    }
}

pub fn dark_mode(store: &dyn KeyValueStore, role: Role) -> Result<bool, StoreError> {
    Ok(store.get(dark_mode_key(role))?.as_deref() == Some("true"))
}

pub fn set_dark_mode(store: &dyn KeyValueStore, role: Role, on: bool) -> Result<(), StoreError> {
    store.set(dark_mode_key(role), if on { "true" } else { "false" })
}

/// Flip the flag and return the new value.
pub fn toggle_dark_mode(store: &dyn KeyValueStore, role: Role) -> Result<bool, StoreError> {
    let on = !dark_mode(store, role)?;
    set_dark_mode(store, role, on)?;
    Ok(on)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn missing_and_garbage_values_read_as_off() {
        let store = MemoryStore::new();
        assert!(!dark_mode(&store, Role::Donor).unwrap());
        store.set("donorDarkMode", "yes").unwrap();
        assert!(!dark_mode(&store, Role::Donor).unwrap());
    }

    #[test]
    fn toggle_touches_only_its_role() {
        let store = MemoryStore::new();
        assert!(toggle_dark_mode(&store, Role::Ngo).unwrap());
        assert_eq!(store.get("darkMode").unwrap().as_deref(), Some("true"));
        assert!(!dark_mode(&store, Role::Donor).unwrap());
        assert!(!dark_mode(&store, Role::Orphanage).unwrap());
        assert!(!toggle_dark_mode(&store, Role::Ngo).unwrap());
        assert_eq!(store.get("darkMode").unwrap().as_deref(), Some("false"));
    }
}
