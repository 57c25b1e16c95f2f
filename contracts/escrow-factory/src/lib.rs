#![no_std]
use soroban_sdk::{contract, contractimpl, contractmeta, log, Address, Bytes, BytesN, Env};

use escrow::{
    custody, instance, EscrowError, EscrowId, EscrowStatus, Initialization, Leg, LegProfile,
    SwapParameters,
};

mod interfaces;
mod libraries;
mod storage;

pub use interfaces::OrderVenueClient;
pub use libraries::{access, registry};
pub use storage::{DataKey, Role};

contractmeta!(
    key = "Description",
    val = "Cross-chain atomic swap escrow factory and registry"
);

#[contract]
pub struct EscrowFactory;

#[contractimpl]
impl EscrowFactory {
    pub fn __constructor(env: Env, admin: Address, native_asset: Address) {
        access::set_admin(&env, &admin);
        env.storage().instance().set(&DataKey::NativeAsset, &native_asset);
        env.storage().instance().set(&DataKey::Paused, &false);
    }

    // Create the source leg. It is funded afterwards through `fund` or `fill_order`.
    pub fn create_src(
        env: Env,
        creator: Address,
        params: SwapParameters,
        deposit: i128,
    ) -> Result<BytesN<32>, EscrowError> {
        creator.require_auth();
        Self::create(&env, &creator, &LegProfile::SOURCE, &params, None, deposit)
    }

    // Create the destination leg and pull its amount from the depositor.
    pub fn create_dst(
        env: Env,
        creator: Address,
        params: SwapParameters,
        src_cancellation_deadline: u64,
        deposit: i128,
    ) -> Result<BytesN<32>, EscrowError> {
        creator.require_auth();
        if params.depositor != creator {
            params.depositor.require_auth();
        }
        let id = Self::create(
            &env,
            &creator,
            &LegProfile::DESTINATION,
            &params,
            Some(src_cancellation_deadline),
            deposit,
        )?;
        instance::fund(&env, &id, &params.depositor)?;
        Ok(id)
    }

    pub fn create_pair(
        env: Env,
        creator: Address,
        src_params: SwapParameters,
        dst_params: SwapParameters,
        deposit: i128,
    ) -> Result<(BytesN<32>, BytesN<32>), EscrowError> {
        creator.require_auth();
        if dst_params.depositor != creator {
            dst_params.depositor.require_auth();
        }
        let required = src_params
            .safety_deposit
            .checked_add(dst_params.safety_deposit)
            .ok_or(EscrowError::InvalidSafetyDeposit)?;
        if deposit != required {
            return Err(EscrowError::InvalidSafetyDeposit);
        }
        // both legs settle from one secret with the roles swapped
        if src_params.hashlock != dst_params.hashlock
            || src_params.swap_reference != dst_params.swap_reference
            || src_params.depositor != dst_params.beneficiary
            || src_params.beneficiary != dst_params.depositor
        {
            return Err(EscrowError::InvalidImmutables);
        }

        let src_id = Self::create(
            &env,
            &creator,
            &LegProfile::SOURCE,
            &src_params,
            None,
            src_params.safety_deposit,
        )?;
        let deadline = u64::from(src_params.timelocks.src_cancellation);
        let dst_id = Self::create(
            &env,
            &creator,
            &LegProfile::DESTINATION,
            &dst_params,
            Some(deadline),
            dst_params.safety_deposit,
        )?;
        instance::fund(&env, &dst_id, &dst_params.depositor)?;
        Ok((src_id, dst_id))
    }

    /// Id an escrow with these parameters gets on the given leg. Pure.
    pub fn address_of(env: Env, params: SwapParameters, leg: Leg) -> BytesN<32> {
        LegProfile::of(leg).escrow_id(&env, &params.hash(&env))
    }

    pub fn fund(env: Env, escrow_id: BytesN<32>, from: Address) -> Result<(), EscrowError> {
        from.require_auth();
        instance::fund(&env, &escrow_id, &from)?;
        Ok(())
    }

    /// Fills `order` on `venue` with the factory as receiver and credits the
    /// delivered funds to a source escrow.
    pub fn fill_order(
        env: Env,
        resolver: Address,
        venue: Address,
        order: Bytes,
        escrow_id: BytesN<32>,
    ) -> Result<(), EscrowError> {
        resolver.require_auth();
        access::require_role(&env, Role::Resolver, &resolver)?;
        access::require_not_paused(&env)?;
        if !registry::is_valid(&env, &escrow_id) {
            return Err(EscrowError::EscrowNotFound);
        }
        let record = escrow::storage::load_record(&env, &escrow_id)
            .ok_or(EscrowError::EscrowNotFound)?;
        if record.withdrawn {
            return Err(EscrowError::AlreadyWithdrawn);
        }
        if record.cancelled {
            return Err(EscrowError::AlreadyCancelled);
        }
        // destination legs are funded at creation
        if record.funded || record.leg != Leg::Source {
            return Err(EscrowError::AlreadyFunded);
        }

        let params = &record.params;
        let receiver = env.current_contract_address();
        let before = custody::balance(&env, &params.asset, &receiver);
        let filled = OrderVenueClient::new(&env, &venue).try_fill_order(&order, &receiver, &params.amount);
        if !matches!(filled, Ok(Ok(()))) {
            return Err(EscrowError::TransferFailed);
        }
        let after = custody::balance(&env, &params.asset, &receiver);

        let delivered = after.saturating_sub(before);
        log!(
            &env,
            "order filled: escrow={}, venue={}, delivered={}",
            escrow_id.clone(),
            venue.clone(),
            delivered
        );
        // custody keeps exactly `amount` per instance
        let excess = delivered.saturating_sub(params.amount);
        if excess > 0 {
            custody::transfer(&env, &params.asset, &receiver, &venue, excess)?;
        }
        instance::mark_funded(&env, &escrow_id, &venue, delivered - excess)?;
        Ok(())
    }

    pub fn withdraw(
        env: Env,
        escrow_id: BytesN<32>,
        caller: Address,
        secret: BytesN<32>,
    ) -> Result<(), EscrowError> {
        caller.require_auth();
        instance::withdraw(&env, &escrow_id, &caller, &secret)?;
        Ok(())
    }

    pub fn cancel(env: Env, escrow_id: BytesN<32>, caller: Address) -> Result<(), EscrowError> {
        caller.require_auth();
        instance::cancel(&env, &escrow_id, &caller)?;
        Ok(())
    }

    pub fn status(env: Env, escrow_id: BytesN<32>) -> EscrowStatus {
        instance::status(&env, &escrow_id)
    }

    pub fn get_parameters(env: Env, escrow_id: BytesN<32>) -> Result<SwapParameters, EscrowError> {
        escrow::storage::load_record(&env, &escrow_id)
            .map(|record| record.params)
            .ok_or(EscrowError::EscrowNotFound)
    }

    pub fn get_revealed_secret(env: Env, escrow_id: BytesN<32>) -> Option<BytesN<32>> {
        escrow::storage::load_record(&env, &escrow_id).and_then(|record| record.revealed_secret)
    }

    pub fn escrow_of(env: Env, params_hash: BytesN<32>) -> Option<BytesN<32>> {
        registry::escrow_of(&env, &params_hash)
    }

    pub fn is_valid_escrow(env: Env, escrow_id: BytesN<32>) -> bool {
        registry::is_valid(&env, &escrow_id)
    }

    pub fn hash_parameters(env: Env, params: SwapParameters) -> BytesN<32> {
        params.hash(&env)
    }

    pub fn is_paused(env: Env) -> bool {
        access::is_paused(&env)
    }

    pub fn admin(env: Env) -> Result<Address, EscrowError> {
        access::admin(&env)
    }

    pub fn native_asset(env: Env) -> Result<Address, EscrowError> {
        storage::native_asset(&env)
    }

    pub fn pause(env: Env) -> Result<(), EscrowError> {
        access::require_admin(&env)?;
        access::set_paused(&env, true);
        Ok(())
    }

    pub fn unpause(env: Env) -> Result<(), EscrowError> {
        access::require_admin(&env)?;
        access::set_paused(&env, false);
        Ok(())
    }

    pub fn grant_role(env: Env, role: Role, account: Address) -> Result<(), EscrowError> {
        access::require_admin(&env)?;
        access::set_role(&env, role, &account, true);
        Ok(())
    }

    pub fn revoke_role(env: Env, role: Role, account: Address) -> Result<(), EscrowError> {
        access::require_admin(&env)?;
        access::set_role(&env, role, &account, false);
        Ok(())
    }

    pub fn has_role(env: Env, role: Role, account: Address) -> bool {
        access::has_role(&env, role, &account)
    }

    pub fn set_admin(env: Env, new_admin: Address) -> Result<(), EscrowError> {
        access::require_admin(&env)?;
        access::set_admin(&env, &new_admin);
        Ok(())
    }
}

impl EscrowFactory {
    fn create(
        env: &Env,
        creator: &Address,
        profile: &LegProfile,
        params: &SwapParameters,
        src_cancellation_deadline: Option<u64>,
        deposit: i128,
    ) -> Result<EscrowId, EscrowError> {
        access::require_role(env, Role::Creator, creator)?;
        access::require_not_paused(env)?;
        if !params.validate(env.ledger().timestamp()) {
            return Err(EscrowError::InvalidImmutables);
        }
        if deposit != params.safety_deposit {
            return Err(EscrowError::InvalidSafetyDeposit);
        }

        let params_hash = params.hash(env);
        let id = profile.escrow_id(env, &params_hash);
        registry::register(env, &params_hash, &id)?;

        let native_asset = storage::native_asset(env)?;
        custody::transfer(env, &native_asset, creator, &env.current_contract_address(), deposit)?;
        instance::initialize(
            env,
            &id,
            profile,
            &params.encode(env),
            Initialization {
                src_cancellation_deadline,
                supplied_deposit: deposit,
                deposit_asset: native_asset,
            },
        )?;
        storage::bump_instance(env);
        Ok(id)
    }
}
