//! # Pokemon and Party
//!
//! Script-visible monsters and the player's party that holds them.

use ditto_scripting::{HostError, ObjectHandle, Scriptable, Value, Wait};

/// Largest party a player can carry
pub const MAX_PARTY_SIZE: usize = 6;

/// A single monster
///
/// # Purpose
/// Created by the `generatePokemon` command and handed to scripts as an
/// opaque value they can pass on, e.g. to `PLAYER.addToParty`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pokemon {
    pub species: String,
    pub level: i64,
}

impl Pokemon {
    /// Create a new pokemon
    ///
    /// # Arguments
    /// * `species` - Species name
    /// * `level` - Starting level
    #[inline]
    pub fn new(species: impl Into<String>, level: i64) -> Self {
        let species = species.into();
        tracing::debug!("Generating {} at level {}", species, level);

        Self { species, level }
    }
}

impl Scriptable for Pokemon {
    fn type_name(&self) -> &'static str {
        "pokemon"
    }

    fn get_var(&self, name: &str) -> Result<Value, HostError> {
        match name {
            "species" => Ok(Value::from(self.species.as_str())),
            "level" => Ok(Value::Number(self.level)),
            _ => Err(HostError::lookup(name)),
        }
    }

    fn set_var(&mut self, name: &str, value: Value) -> Result<(), HostError> {
        match name {
            "level" => {
                self.level = value
                    .as_number()
                    .ok_or_else(|| HostError::arguments("level", "level must be a number"))?;
                Ok(())
            }
            _ => Err(HostError::lookup(name)),
        }
    }
}

/// The player's party
#[derive(Default)]
pub struct Party {
    members: Vec<ObjectHandle>,
}

impl Party {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn members(&self) -> &[ObjectHandle] {
        &self.members
    }

    /// Add a member
    ///
    /// # Arguments
    /// * `member` - Handle of a `pokemon` object
    ///
    /// # Returns
    /// An arguments error if the party is full or the handle is not a pokemon
    pub fn add(&mut self, member: ObjectHandle) -> Result<(), HostError> {
        if self.members.len() >= MAX_PARTY_SIZE {
            return Err(HostError::arguments("addToParty", "party is full"));
        }

        // A locked member is one being commanded right now, never a stored pokemon
        let is_pokemon = member
            .try_lock()
            .map(|object| object.type_name() == "pokemon")
            .unwrap_or(false);
        if !is_pokemon {
            return Err(HostError::arguments("addToParty", "only pokemon can join the party"));
        }

        self.members.push(member);
        Ok(())
    }
}

impl Scriptable for Party {
    fn type_name(&self) -> &'static str {
        "party"
    }

    fn get_object(&self, name: &str) -> Result<ObjectHandle, HostError> {
        match name {
            "first" => self.members.first().cloned().ok_or_else(|| HostError::lookup(name)),
            "last" => self.members.last().cloned().ok_or_else(|| HostError::lookup(name)),
            _ => Err(HostError::lookup(name)),
        }
    }

    fn get_var(&self, name: &str) -> Result<Value, HostError> {
        match name {
            "size" => Ok(Value::Number(self.members.len() as i64)),
            _ => Err(HostError::lookup(name)),
        }
    }

    fn call(&mut self, name: &str, _args: &[Value], _wait: &mut Wait<'_>) -> Result<Value, HostError> {
        match name {
            "heal" => {
                tracing::info!("Party of {} healed", self.members.len());
                Ok(Value::None)
            }
            _ => Err(HostError::lookup(name)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ditto_scripting::handle;

    #[test]
    fn test_pokemon_vars() {
        let mut pokemon = Pokemon::new("pidgey", 3);
        assert_eq!(pokemon.get_var("species").unwrap(), Value::from("pidgey"));
        pokemon.set_var("level", Value::from(4)).unwrap();
        assert_eq!(pokemon.level, 4);
        assert!(pokemon.set_var("level", Value::from("high")).is_err());
        assert!(pokemon.get_var("moves").is_err());
    }

    #[test]
    fn test_party_accepts_only_pokemon() {
        let mut party = Party::new();
        party.add(handle(Pokemon::new("rattata", 2))).unwrap();
        assert_eq!(party.get_var("size").unwrap(), Value::from(1));

        let err = party.add(handle(Party::new())).unwrap_err();
        assert!(matches!(err, HostError::Arguments { .. }));

        let first = party.get_object("first").unwrap();
        assert_eq!(first.lock().get_var("species").unwrap(), Value::from("rattata"));
    }

    #[test]
    fn test_party_is_bounded() {
        let mut party = Party::new();
        for level in 0..MAX_PARTY_SIZE as i64 {
            party.add(handle(Pokemon::new("magikarp", level))).unwrap();
        }
        assert!(party.add(handle(Pokemon::new("magikarp", 9))).is_err());
        assert_eq!(party.len(), MAX_PARTY_SIZE);
    }
}
