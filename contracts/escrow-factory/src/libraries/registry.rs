use soroban_sdk::{BytesN, Env};
use escrow::{EscrowError, EscrowId};

use crate::storage::{self, DataKey};

/// Records `params_hash -> id` and marks the instance valid.
/// Entries are write-once; a second registration of the same hash fails.
pub fn register(env: &Env, params_hash: &BytesN<32>, id: &EscrowId) -> Result<(), EscrowError> {
    let key = DataKey::Registry(params_hash.clone());
    if env.storage().persistent().has(&key) {
        return Err(EscrowError::EscrowAlreadyExists);
    }
    storage::set_persistent(env, &key, id);
    storage::set_persistent(env, &DataKey::Valid(id.clone()), &true);
    Ok(())
}

pub fn escrow_of(env: &Env, params_hash: &BytesN<32>) -> Option<EscrowId> {
    env.storage()
        .persistent()
        .get(&DataKey::Registry(params_hash.clone()))
}

pub fn is_valid(env: &Env, id: &EscrowId) -> bool {
    env.storage()
        .persistent()
        .get(&DataKey::Valid(id.clone()))
        .unwrap_or(false)
}
