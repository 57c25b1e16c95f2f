use soroban_sdk::{contracttype, log, Address, Bytes, BytesN, Env};
use timelocks::{Leg, WithdrawalPhase};

use crate::{
    custody,
    error::EscrowError,
    events,
    params::SwapParameters,
    profile::LegProfile,
    storage::{self, EscrowId, InstanceLock},
};

/// Runtime state of one escrow instance.
///
/// Written once by `initialize` and once more by either `withdraw` or
/// `cancel`; never removed afterwards.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EscrowRecord {
    pub leg: Leg,
    pub params: SwapParameters,
    pub deposit_asset: Address, // asset the safety deposit was paid in
    pub initialized: bool,
    pub withdrawn: bool,
    pub cancelled: bool,
    pub funded: bool,
    pub revealed_secret: Option<BytesN<32>>,
    pub src_cancellation_deadline: Option<u64>, // destination leg only
}

impl EscrowRecord {
    pub fn profile(&self) -> LegProfile {
        LegProfile::of(self.leg)
    }
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EscrowStatus {
    pub initialized: bool,
    pub withdrawn: bool,
    pub cancelled: bool,
    pub funded: bool,
    pub in_withdrawal_window: bool,
    pub in_cancellation_window: bool,
    pub src_cancellation_deadline: Option<u64>,
}

/// Arguments of [`initialize`] beyond the encoded parameters.
pub struct Initialization {
    pub src_cancellation_deadline: Option<u64>,
    pub supplied_deposit: i128,
    pub deposit_asset: Address,
}

pub fn initialize(
    env: &Env,
    id: &EscrowId,
    profile: &LegProfile,
    encoded_params: &Bytes,
    init: Initialization,
) -> Result<EscrowRecord, EscrowError> {
    if storage::has_record(env, id) {
        return Err(EscrowError::AlreadyInitialized);
    }
    let params = SwapParameters::decode(env, encoded_params)?;

    match (profile.requires_coordination, init.src_cancellation_deadline) {
        (true, Some(deadline)) if u64::from(params.timelocks.dst_cancellation) < deadline => {}
        (false, None) => {}
        _ => return Err(EscrowError::InvalidTimelockCoordination),
    }
    if init.supplied_deposit != params.safety_deposit {
        return Err(EscrowError::InvalidSafetyDeposit);
    }

    let record = EscrowRecord {
        leg: profile.leg,
        params,
        deposit_asset: init.deposit_asset,
        initialized: true,
        withdrawn: false,
        cancelled: false,
        funded: false,
        revealed_secret: None,
        src_cancellation_deadline: init.src_cancellation_deadline,
    };
    storage::save_record(env, id, &record);

    events::escrow_created(env, id, &record);
    log!(
        env,
        "escrow initialized: id={}, depositor={}, beneficiary={}, amount={}",
        id.clone(),
        record.params.depositor.clone(),
        record.params.beneficiary.clone(),
        record.params.amount
    );
    Ok(record)
}

fn load_active(env: &Env, id: &EscrowId) -> Result<EscrowRecord, EscrowError> {
    let record = storage::load_record(env, id).ok_or(EscrowError::NotInitialized)?;
    if !record.initialized {
        return Err(EscrowError::NotInitialized);
    }
    if record.withdrawn {
        return Err(EscrowError::AlreadyWithdrawn);
    }
    if record.cancelled {
        return Err(EscrowError::AlreadyCancelled);
    }
    Ok(record)
}

/// Pulls the escrowed amount from `from` into custody.
pub fn fund(env: &Env, id: &EscrowId, from: &Address) -> Result<EscrowRecord, EscrowError> {
    let _lock = InstanceLock::acquire(env, id)?;
    let mut record = load_active(env, id)?;
    if record.funded {
        return Err(EscrowError::AlreadyFunded);
    }
    record.funded = true;
    storage::save_record(env, id, &record);

    custody::transfer(
        env,
        &record.params.asset,
        from,
        &env.current_contract_address(),
        record.params.amount,
    )?;
    events::escrow_funded(env, id, from, record.params.amount);
    log!(env, "escrow funded: id={}, from={}", id.clone(), from.clone());
    Ok(record)
}

/// Records funds that reached custody without a direct transfer, e.g. an
/// order fill. `amount` is what the host observed arriving; the host is
/// responsible for measuring it.
pub fn mark_funded(
    env: &Env,
    id: &EscrowId,
    from: &Address,
    amount: i128,
) -> Result<EscrowRecord, EscrowError> {
    let _lock = InstanceLock::acquire(env, id)?;
    let mut record = load_active(env, id)?;
    if record.funded {
        return Err(EscrowError::AlreadyFunded);
    }
    if amount < record.params.amount {
        return Err(EscrowError::InsufficientEscrowBalance);
    }
    record.funded = true;
    storage::save_record(env, id, &record);

    events::escrow_funded(env, id, from, amount);
    log!(env, "escrow funding recorded: id={}, from={}", id.clone(), from.clone());
    Ok(record)
}

/// Releases the escrowed amount to the beneficiary against the secret.
///
/// In the private phase only the beneficiary may call and receives the
/// safety deposit. In the public phase (source leg only) anyone holding the
/// secret may call, the amount still goes to the beneficiary and the safety
/// deposit goes to the caller.
pub fn withdraw(
    env: &Env,
    id: &EscrowId,
    caller: &Address,
    secret: &BytesN<32>,
) -> Result<EscrowRecord, EscrowError> {
    let _lock = InstanceLock::acquire(env, id)?;
    let mut record = load_active(env, id)?;

    if !record.params.matches_secret(env, secret) {
        return Err(EscrowError::InvalidSecret);
    }
    let now = env.ledger().timestamp();
    let phase = record
        .profile()
        .withdrawal_phase(&record.params.timelocks, now)
        .ok_or(EscrowError::NotInWithdrawalWindow)?;
    if phase == WithdrawalPhase::Private && *caller != record.params.beneficiary {
        return Err(EscrowError::UnauthorizedCaller);
    }
    if !record.funded {
        return Err(EscrowError::InsufficientEscrowBalance);
    }

    record.withdrawn = true;
    record.revealed_secret = Some(secret.clone());
    storage::save_record(env, id, &record);

    let params = &record.params;
    let deposit_recipient = match phase {
        WithdrawalPhase::Private => params.beneficiary.clone(),
        WithdrawalPhase::Public => caller.clone(),
    };
    let contract = env.current_contract_address();
    custody::transfer(env, &params.asset, &contract, &params.beneficiary, params.amount)?;
    custody::transfer(
        env,
        &record.deposit_asset,
        &contract,
        &deposit_recipient,
        params.safety_deposit,
    )?;

    events::secret_revealed(env, id, secret);
    events::funds_withdrawn(env, id, &params.beneficiary, params.amount, &deposit_recipient);
    log!(
        env,
        "escrow withdrawn: id={}, caller={}, beneficiary={}",
        id.clone(),
        caller.clone(),
        params.beneficiary.clone()
    );
    Ok(record)
}

/// Returns the escrowed amount and the safety deposit to the depositor once
/// the leg's cancellation boundary has passed.
pub fn cancel(env: &Env, id: &EscrowId, caller: &Address) -> Result<EscrowRecord, EscrowError> {
    let _lock = InstanceLock::acquire(env, id)?;
    let mut record = load_active(env, id)?;

    let now = env.ledger().timestamp();
    if !record.params.timelocks.can_cancel(record.leg, now) {
        return Err(EscrowError::NotInCancellationWindow);
    }
    if *caller != record.params.depositor {
        return Err(EscrowError::UnauthorizedCaller);
    }

    record.cancelled = true;
    storage::save_record(env, id, &record);

    let params = &record.params;
    let contract = env.current_contract_address();
    let refunded = if record.funded { params.amount } else { 0 };
    custody::transfer(env, &params.asset, &contract, &params.depositor, refunded)?;
    custody::transfer(
        env,
        &record.deposit_asset,
        &contract,
        &params.depositor,
        params.safety_deposit,
    )?;

    events::escrow_cancelled(env, id, &params.depositor, refunded);
    log!(env, "escrow cancelled: id={}, depositor={}", id.clone(), params.depositor.clone());
    Ok(record)
}

pub fn status(env: &Env, id: &EscrowId) -> EscrowStatus {
    let Some(record) = storage::load_record(env, id) else {
        return EscrowStatus {
            initialized: false,
            withdrawn: false,
            cancelled: false,
            funded: false,
            in_withdrawal_window: false,
            in_cancellation_window: false,
            src_cancellation_deadline: None,
        };
    };
    let now = env.ledger().timestamp();
    let timelocks = &record.params.timelocks;
    // windows only matter while a terminal transition is still possible
    let active = record.initialized && !record.withdrawn && !record.cancelled;
    EscrowStatus {
        initialized: record.initialized,
        withdrawn: record.withdrawn,
        cancelled: record.cancelled,
        funded: record.funded,
        in_withdrawal_window: active && record.profile().withdrawal_phase(timelocks, now).is_some(),
        in_cancellation_window: active && timelocks.can_cancel(record.leg, now),
        src_cancellation_deadline: record.src_cancellation_deadline,
    }
}
