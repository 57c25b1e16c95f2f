use soroban_sdk::{
    contracttype,
    xdr::{FromXdr, ToXdr},
    Address, Bytes, BytesN, Env, U256,
};
use timelocks::TimelockSchedule;

use crate::error::EscrowError;

/// Safety deposit is a thousandth of the escrowed amount.
pub const SAFETY_DEPOSIT_DIVISOR: i128 = 1_000;

/// Immutable description of one leg of a swap.
///
/// `depositor` funds the leg and may reclaim it after cancellation opens,
/// `beneficiary` receives it when the secret is revealed. The two roles are
/// swapped between the source and the destination leg of the same swap.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SwapParameters {
    pub depositor: Address,
    pub beneficiary: Address,
    pub asset: Address,
    pub amount: i128,
    pub safety_deposit: i128,
    pub hashlock: BytesN<32>, // SHA-256 of the secret
    pub timelocks: TimelockSchedule,
    pub swap_reference: BytesN<32>, // links the leg to the negotiated order
    pub target_ledger_id: u32,
}

// Wire form: identical field order with the schedule packed into one word.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
struct PackedSwapParameters {
    depositor: Address,
    beneficiary: Address,
    asset: Address,
    amount: i128,
    safety_deposit: i128,
    hashlock: BytesN<32>,
    timelocks: U256,
    swap_reference: BytesN<32>,
    target_ledger_id: u32,
}

impl SwapParameters {
    pub fn encode(&self, env: &Env) -> Bytes {
        PackedSwapParameters {
            depositor: self.depositor.clone(),
            beneficiary: self.beneficiary.clone(),
            asset: self.asset.clone(),
            amount: self.amount,
            safety_deposit: self.safety_deposit,
            hashlock: self.hashlock.clone(),
            timelocks: self.timelocks.pack(env),
            swap_reference: self.swap_reference.clone(),
            target_ledger_id: self.target_ledger_id,
        }
        .to_xdr(env)
    }

    pub fn decode(env: &Env, bytes: &Bytes) -> Result<Self, EscrowError> {
        let packed =
            PackedSwapParameters::from_xdr(env, bytes).map_err(|_| EscrowError::InvalidImmutables)?;
        Ok(Self {
            depositor: packed.depositor,
            beneficiary: packed.beneficiary,
            asset: packed.asset,
            amount: packed.amount,
            safety_deposit: packed.safety_deposit,
            hashlock: packed.hashlock,
            timelocks: TimelockSchedule::unpack(&packed.timelocks),
            swap_reference: packed.swap_reference,
            target_ledger_id: packed.target_ledger_id,
        })
    }

    /// Content hash identifying the swap leg; the registry key.
    pub fn hash(&self, env: &Env) -> BytesN<32> {
        env.crypto().sha256(&self.encode(env)).to_bytes()
    }

    /// Checks the parameter invariants. Registry uniqueness is checked by the factory.
    pub fn validate(&self, now: u64) -> bool {
        self.amount > 0
            && self.safety_deposit >= 1
            && self.hashlock.to_array() != [0u8; 32]
            && self.target_ledger_id > 0
            && self.timelocks.is_valid(now)
    }

    pub fn matches_secret(&self, env: &Env, secret: &BytesN<32>) -> bool {
        hashlock_of(env, secret) == self.hashlock
    }
}

pub fn safety_deposit(amount: i128) -> i128 {
    core::cmp::max(amount / SAFETY_DEPOSIT_DIVISOR, 1)
}

pub fn hashlock_of(env: &Env, secret: &BytesN<32>) -> BytesN<32> {
    env.crypto().sha256(&Bytes::from(secret.clone())).to_bytes()
}
