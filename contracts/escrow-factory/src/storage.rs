use soroban_sdk::{contracttype, Address, BytesN, Env};
use escrow::storage::{DAY_IN_LEDGERS, PERSISTENT_BUMP_AMOUNT, PERSISTENT_LIFETIME_THRESHOLD};
use escrow::{EscrowError, EscrowId};

pub(crate) const INSTANCE_BUMP_AMOUNT: u32 = 7 * DAY_IN_LEDGERS;
pub(crate) const INSTANCE_LIFETIME_THRESHOLD: u32 = INSTANCE_BUMP_AMOUNT - DAY_IN_LEDGERS;

/// Capabilities the admin can grant.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Role {
    Creator,  // may create escrows
    Resolver, // may fill orders into escrows
}

#[derive(Clone)]
#[contracttype]
pub enum DataKey {
    Admin,
    NativeAsset,
    Paused,
    Role(Role, Address),
    Registry(BytesN<32>), // params hash -> escrow id
    Valid(EscrowId),
}

pub(crate) fn bump_instance(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(INSTANCE_LIFETIME_THRESHOLD, INSTANCE_BUMP_AMOUNT);
}

pub(crate) fn set_persistent<V>(env: &Env, key: &DataKey, value: &V)
where
    V: soroban_sdk::IntoVal<Env, soroban_sdk::Val>,
{
    env.storage().persistent().set(key, value);
    env.storage()
        .persistent()
        .extend_ttl(key, PERSISTENT_LIFETIME_THRESHOLD, PERSISTENT_BUMP_AMOUNT);
}

pub(crate) fn native_asset(env: &Env) -> Result<Address, EscrowError> {
    env.storage()
        .instance()
        .get(&DataKey::NativeAsset)
        .ok_or(EscrowError::NotInitialized)
}
