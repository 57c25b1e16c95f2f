use soroban_sdk::{log, symbol_short, Address, Env};
use escrow::EscrowError;

use crate::storage::{self, DataKey, Role};

pub fn admin(env: &Env) -> Result<Address, EscrowError> {
    env.storage()
        .instance()
        .get(&DataKey::Admin)
        .ok_or(EscrowError::NotInitialized)
}

/// Loads the admin and requires its authorization.
pub fn require_admin(env: &Env) -> Result<Address, EscrowError> {
    let admin = admin(env)?;
    admin.require_auth();
    Ok(admin)
}

pub fn set_admin(env: &Env, admin: &Address) {
    env.storage().instance().set(&DataKey::Admin, admin);
    storage::bump_instance(env);
    env.events().publish((symbol_short!("admin"),), admin.clone());
    log!(env, "admin set: {}", admin.clone());
}

pub fn has_role(env: &Env, role: Role, account: &Address) -> bool {
    env.storage()
        .persistent()
        .get(&DataKey::Role(role, account.clone()))
        .unwrap_or(false)
}

pub fn require_role(env: &Env, role: Role, account: &Address) -> Result<(), EscrowError> {
    if !has_role(env, role, account) {
        return Err(EscrowError::MissingRole);
    }
    Ok(())
}

pub fn set_role(env: &Env, role: Role, account: &Address, granted: bool) {
    let key = DataKey::Role(role, account.clone());
    if granted {
        storage::set_persistent(env, &key, &true);
    } else {
        env.storage().persistent().remove(&key);
    }
    env.events()
        .publish((symbol_short!("role"), role, account.clone()), granted);
    log!(env, "role updated: account={}, granted={}", account.clone(), granted);
}

pub fn is_paused(env: &Env) -> bool {
    env.storage().instance().get(&DataKey::Paused).unwrap_or(false)
}

pub fn set_paused(env: &Env, paused: bool) {
    env.storage().instance().set(&DataKey::Paused, &paused);
    storage::bump_instance(env);
    let topic = if paused {
        symbol_short!("paused")
    } else {
        symbol_short!("unpaused")
    };
    env.events().publish((topic,), ());
    log!(env, "factory paused: {}", paused);
}

/// Creation and order filling stop while paused; withdraw and cancel do not.
pub fn require_not_paused(env: &Env) -> Result<(), EscrowError> {
    if is_paused(env) {
        return Err(EscrowError::ContractPaused);
    }
    Ok(())
}
