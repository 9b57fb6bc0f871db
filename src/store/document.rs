// The single persisted aggregate holding every entity

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::auth::models::User;
use crate::chirps::models::Chirp;
use crate::store::error::StoreError;

/// Whole-database document
///
/// Maps are keyed by entity id and serialize with stringified keys.
/// The `next_*_id` counters only ever grow, so ids are never handed out twice
/// even after deletions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub chirps: BTreeMap<i32, Chirp>,
    #[serde(default)]
    pub users: BTreeMap<i32, User>,
    #[serde(default)]
    pub next_chirp_id: i32,
    #[serde(default)]
    pub next_user_id: i32,
}

impl Document {
    /// Repairs counters missing from documents written without them.
    /// A counter never points at or below an id already in use.
    pub fn normalize_counters(&mut self) -> Result<(), StoreError> {
        let chirp_floor = next_after(self.chirps.keys().max(), "chirp")?;
        if self.next_chirp_id < chirp_floor {
            self.next_chirp_id = chirp_floor;
        }

        let user_floor = next_after(self.users.keys().max(), "user")?;
        if self.next_user_id < user_floor {
            self.next_user_id = user_floor;
        }
        Ok(())
    }

    pub fn allocate_chirp_id(&mut self) -> Result<i32, StoreError> {
        self.normalize_counters()?;
        let id = self.next_chirp_id;
        self.next_chirp_id = next_after(Some(&id), "chirp")?;
        Ok(id)
    }

    pub fn allocate_user_id(&mut self) -> Result<i32, StoreError> {
        self.normalize_counters()?;
        let id = self.next_user_id;
        self.next_user_id = next_after(Some(&id), "user")?;
        Ok(id)
    }

    pub fn user_by_email(&self, email: &str) -> Option<&User> {
        self.users.values().find(|user| user.email == email)
    }
}

fn next_after(id: Option<&i32>, entity: &'static str) -> Result<i32, StoreError> {
    id.copied()
        .unwrap_or(0)
        .checked_add(1)
        .ok_or(StoreError::IdsExhausted { entity })
}
