use soroban_sdk::{contracttype, BytesN, Env};

use crate::{error::EscrowError, instance::EscrowRecord};

pub const DAY_IN_LEDGERS: u32 = 17_280;
pub const PERSISTENT_BUMP_AMOUNT: u32 = 30 * DAY_IN_LEDGERS;
pub const PERSISTENT_LIFETIME_THRESHOLD: u32 = PERSISTENT_BUMP_AMOUNT - DAY_IN_LEDGERS;

pub type EscrowId = BytesN<32>;

#[derive(Clone)]
#[contracttype]
pub enum EscrowKey {
    Escrow(EscrowId),
    Lock(EscrowId),
}

pub(crate) fn has_record(env: &Env, id: &EscrowId) -> bool {
    env.storage().persistent().has(&EscrowKey::Escrow(id.clone()))
}

pub fn load_record(env: &Env, id: &EscrowId) -> Option<EscrowRecord> {
    let key = EscrowKey::Escrow(id.clone());
    let record = env.storage().persistent().get(&key);
    if record.is_some() {
        env.storage()
            .persistent()
            .extend_ttl(&key, PERSISTENT_LIFETIME_THRESHOLD, PERSISTENT_BUMP_AMOUNT);
    }
    record
}

pub(crate) fn save_record(env: &Env, id: &EscrowId, record: &EscrowRecord) {
    let key = EscrowKey::Escrow(id.clone());
    env.storage().persistent().set(&key, record);
    env.storage()
        .persistent()
        .extend_ttl(&key, PERSISTENT_LIFETIME_THRESHOLD, PERSISTENT_BUMP_AMOUNT);
}

/// Per-instance mutual exclusion held for the duration of a mutating call.
/// Released when dropped, on success and on early error returns alike.
pub(crate) struct InstanceLock {
    env: Env,
    key: EscrowKey,
}

impl InstanceLock {
    pub(crate) fn acquire(env: &Env, id: &EscrowId) -> Result<Self, EscrowError> {
        let key = EscrowKey::Lock(id.clone());
        if env.storage().temporary().has(&key) {
            return Err(EscrowError::Reentrancy);
        }
        env.storage().temporary().set(&key, &true);
        Ok(Self {
            env: env.clone(),
            key,
        })
    }
}

impl Drop for InstanceLock {
    fn drop(&mut self) {
        self.env.storage().temporary().remove(&self.key);
    }
}
