use crate::medium::PersistenceMedium;
use crate::store::StoreError;

/// Key the greeting name persists under.
pub const USER_KEY: &str = "@regador:user";

/// Name shown by the greeting header. Never saved is `None`, not an error.
pub fn load_user_name(medium: &dyn PersistenceMedium) -> Result<Option<String>, StoreError> {
    medium.get(USER_KEY).map_err(StoreError::Read)
}

pub fn save_user_name(medium: &dyn PersistenceMedium, name: &str) -> Result<(), StoreError> {
    medium.set(USER_KEY, name).map_err(StoreError::Write)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::medium::MemoryMedium;

    #[test]
    fn user_name_round_trips() {
        let medium = MemoryMedium::new();
        assert!(load_user_name(&medium).unwrap().is_none());
        save_user_name(&medium, "Luiza").unwrap();
        assert_eq!(load_user_name(&medium).unwrap().as_deref(), Some("Luiza"));
    }
}
