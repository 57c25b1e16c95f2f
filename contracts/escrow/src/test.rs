#![cfg(test)]

use soroban_sdk::{
    contract, contractimpl,
    testutils::{Address as _, Ledger},
    token, Address, BytesN, Env,
};
use timelocks::TimelockSchedule;

use crate::{
    instance, params::safety_deposit, storage::EscrowKey, EscrowError, EscrowId, EscrowRecord,
    Initialization, LegProfile, SwapParameters,
};

const NOW: u64 = 1_700_000_000;
const AMOUNT: i128 = 1_000;

#[contract]
struct Host;

#[contractimpl]
impl Host {
    pub fn version() -> u32 {
        1
    }
}

struct Setup<'a> {
    env: Env,
    host: Address,
    asset: token::TokenClient<'a>,
    native: token::TokenClient<'a>,
    depositor: Address,
    beneficiary: Address,
    secret: BytesN<32>,
    params: SwapParameters,
}

impl<'a> Setup<'a> {
    fn new() -> Self {
        let env = Env::default();
        env.mock_all_auths_allowing_non_root_auth();
        env.ledger().set_timestamp(NOW);

        let host = env.register(Host, ());
        let token_admin = Address::generate(&env);
        let asset_address = env.register_stellar_asset_contract_v2(token_admin.clone()).address();
        let native_address = env.register_stellar_asset_contract_v2(token_admin).address();

        let depositor = Address::generate(&env);
        let beneficiary = Address::generate(&env);
        token::StellarAssetClient::new(&env, &asset_address).mint(&depositor, &AMOUNT);

        let secret = BytesN::from_array(&env, &[42u8; 32]);
        let params = SwapParameters {
            depositor: depositor.clone(),
            beneficiary: beneficiary.clone(),
            asset: asset_address.clone(),
            amount: AMOUNT,
            safety_deposit: safety_deposit(AMOUNT),
            hashlock: crate::hashlock_of(&env, &secret),
            timelocks: TimelockSchedule::create(3600, NOW).unwrap(),
            swap_reference: BytesN::from_array(&env, &[7u8; 32]),
            target_ledger_id: 2,
        };

        Setup {
            asset: token::TokenClient::new(&env, &asset_address),
            native: token::TokenClient::new(&env, &native_address),
            env,
            host,
            depositor,
            beneficiary,
            secret,
            params,
        }
    }

    fn id(&self, profile: &LegProfile) -> EscrowId {
        profile.escrow_id(&self.env, &self.params.hash(&self.env))
    }

    fn initialize(
        &self,
        profile: &LegProfile,
        deadline: Option<u64>,
        deposit: i128,
    ) -> Result<EscrowRecord, EscrowError> {
        let encoded = self.params.encode(&self.env);
        // the deposit is normally collected by the factory before initialization
        if deposit > 0 {
            token::StellarAssetClient::new(&self.env, &self.native.address).mint(&self.host, &deposit);
        }
        self.env.as_contract(&self.host, || {
            instance::initialize(
                &self.env,
                &self.id(profile),
                profile,
                &encoded,
                Initialization {
                    src_cancellation_deadline: deadline,
                    supplied_deposit: deposit,
                    deposit_asset: self.native.address.clone(),
                },
            )
        })
    }

    fn source(&self) -> EscrowId {
        self.initialize(&LegProfile::SOURCE, None, self.params.safety_deposit).unwrap();
        self.id(&LegProfile::SOURCE)
    }

    fn destination(&self) -> EscrowId {
        let deadline = u64::from(self.params.timelocks.src_cancellation);
        self.initialize(&LegProfile::DESTINATION, Some(deadline), self.params.safety_deposit)
            .unwrap();
        self.id(&LegProfile::DESTINATION)
    }

    fn fund(&self, id: &EscrowId) {
        self.env
            .as_contract(&self.host, || instance::fund(&self.env, id, &self.depositor))
            .unwrap();
    }

    fn withdraw(
        &self,
        id: &EscrowId,
        caller: &Address,
        secret: &BytesN<32>,
    ) -> Result<EscrowRecord, EscrowError> {
        self.env
            .as_contract(&self.host, || instance::withdraw(&self.env, id, caller, secret))
    }

    fn cancel(&self, id: &EscrowId, caller: &Address) -> Result<EscrowRecord, EscrowError> {
        self.env
            .as_contract(&self.host, || instance::cancel(&self.env, id, caller))
    }

    fn status(&self, id: &EscrowId) -> crate::EscrowStatus {
        self.env.as_contract(&self.host, || instance::status(&self.env, id))
    }

    fn jump_to(&self, timestamp: u32) {
        self.env.ledger().set_timestamp(u64::from(timestamp));
    }
}

#[test]
fn test_codec_round_trip_keeps_hash() {
    let s = Setup::new();
    let encoded = s.params.encode(&s.env);
    let decoded = SwapParameters::decode(&s.env, &encoded).unwrap();

    assert_eq!(decoded, s.params);
    assert_eq!(decoded.hash(&s.env), s.params.hash(&s.env));

    let mut other = s.params.clone();
    other.swap_reference = BytesN::from_array(&s.env, &[8u8; 32]);
    assert_ne!(other.hash(&s.env), s.params.hash(&s.env));
}

#[test]
fn test_safety_deposit() {
    assert_eq!(safety_deposit(0), 1);
    assert_eq!(safety_deposit(999), 1);
    assert_eq!(safety_deposit(1_000), 1);
    assert_eq!(safety_deposit(2_500_000), 2_500);
}

#[test]
fn test_validate() {
    let s = Setup::new();
    assert!(s.params.validate(NOW));

    let mut p = s.params.clone();
    p.amount = 0;
    assert!(!p.validate(NOW));

    let mut p = s.params.clone();
    p.safety_deposit = 0;
    assert!(!p.validate(NOW));

    let mut p = s.params.clone();
    p.hashlock = BytesN::from_array(&s.env, &[0u8; 32]);
    assert!(!p.validate(NOW));

    let mut p = s.params.clone();
    p.target_ledger_id = 0;
    assert!(!p.validate(NOW));

    let mut p = s.params.clone();
    p.timelocks.dst_cancellation = p.timelocks.src_withdrawal;
    assert!(!p.validate(NOW));
}

#[test]
fn test_escrow_id_is_deterministic_per_leg() {
    let s = Setup::new();
    let hash = s.params.hash(&s.env);

    assert_eq!(
        LegProfile::SOURCE.escrow_id(&s.env, &hash),
        LegProfile::SOURCE.escrow_id(&s.env, &s.params.clone().hash(&s.env))
    );
    assert_ne!(
        LegProfile::SOURCE.escrow_id(&s.env, &hash),
        LegProfile::DESTINATION.escrow_id(&s.env, &hash)
    );
}

#[test]
fn test_destination_rejects_late_cancellation() {
    let s = Setup::new();
    let id = s.id(&LegProfile::DESTINATION);
    let dst_cancellation = u64::from(s.params.timelocks.dst_cancellation);
    let deposit = s.params.safety_deposit;

    for deadline in [Some(dst_cancellation), Some(dst_cancellation - 1), None] {
        assert_eq!(
            s.initialize(&LegProfile::DESTINATION, deadline, deposit).err(),
            Some(EscrowError::InvalidTimelockCoordination)
        );
    }
    assert!(!s.status(&id).initialized);

    assert!(s
        .initialize(&LegProfile::DESTINATION, Some(dst_cancellation + 1), deposit)
        .is_ok());
    assert_eq!(s.status(&id).src_cancellation_deadline, Some(dst_cancellation + 1));
}

#[test]
fn test_source_rejects_coordination_deadline() {
    let s = Setup::new();
    assert_eq!(
        s.initialize(&LegProfile::SOURCE, Some(u64::MAX), s.params.safety_deposit).err(),
        Some(EscrowError::InvalidTimelockCoordination)
    );
}

#[test]
fn test_initialize_requires_exact_deposit() {
    let s = Setup::new();
    let deposit = s.params.safety_deposit;
    assert_eq!(
        s.initialize(&LegProfile::SOURCE, None, deposit + 1).err(),
        Some(EscrowError::InvalidSafetyDeposit)
    );
    assert_eq!(
        s.initialize(&LegProfile::SOURCE, None, deposit - 1).err(),
        Some(EscrowError::InvalidSafetyDeposit)
    );
    assert!(s.initialize(&LegProfile::SOURCE, None, deposit).is_ok());
    assert_eq!(
        s.initialize(&LegProfile::SOURCE, None, deposit).err(),
        Some(EscrowError::AlreadyInitialized)
    );
}

#[test]
fn test_withdraw_with_wrong_secret() {
    let s = Setup::new();
    let id = s.destination();
    s.fund(&id);
    s.jump_to(s.params.timelocks.dst_withdrawal + 1);

    let wrong = BytesN::from_array(&s.env, &[1u8; 32]);
    assert_eq!(
        s.withdraw(&id, &s.beneficiary, &wrong).err(),
        Some(EscrowError::InvalidSecret)
    );

    let status = s.status(&id);
    assert!(!status.withdrawn);
    assert!(status.in_withdrawal_window);
    assert_eq!(s.asset.balance(&s.host), AMOUNT);
}

#[test]
fn test_withdraw_requires_funding() {
    let s = Setup::new();
    let id = s.source();
    s.jump_to(s.params.timelocks.src_withdrawal);

    assert_eq!(
        s.withdraw(&id, &s.beneficiary, &s.secret).err(),
        Some(EscrowError::InsufficientEscrowBalance)
    );
}

#[test]
fn test_source_window_exclusivity() {
    let s = Setup::new();
    let id = s.source();
    s.fund(&id);
    let t = s.params.timelocks;

    s.jump_to(t.src_withdrawal - 1);
    assert_eq!(
        s.withdraw(&id, &s.beneficiary, &s.secret).err(),
        Some(EscrowError::NotInWithdrawalWindow)
    );
    assert_eq!(
        s.cancel(&id, &s.depositor).err(),
        Some(EscrowError::NotInCancellationWindow)
    );

    s.jump_to(t.src_cancellation - 1);
    assert_eq!(
        s.cancel(&id, &s.depositor).err(),
        Some(EscrowError::NotInCancellationWindow)
    );

    s.jump_to(t.src_cancellation);
    assert_eq!(
        s.withdraw(&id, &s.beneficiary, &s.secret).err(),
        Some(EscrowError::NotInWithdrawalWindow)
    );
    assert!(s.cancel(&id, &s.depositor).is_ok());
    assert_eq!(s.asset.balance(&s.depositor), AMOUNT);
    assert_eq!(s.native.balance(&s.depositor), s.params.safety_deposit);
}

#[test]
fn test_private_phase_is_beneficiary_only() {
    let s = Setup::new();
    let src = s.source();
    s.fund(&src);
    let stranger = Address::generate(&s.env);

    s.jump_to(s.params.timelocks.src_withdrawal);
    assert_eq!(
        s.withdraw(&src, &stranger, &s.secret).err(),
        Some(EscrowError::UnauthorizedCaller)
    );
}

#[test]
fn test_destination_has_no_public_phase() {
    let s = Setup::new();
    let dst = s.destination();
    s.fund(&dst);
    let stranger = Address::generate(&s.env);

    s.jump_to(s.params.timelocks.dst_cancellation - 1);
    assert_eq!(
        s.withdraw(&dst, &stranger, &s.secret).err(),
        Some(EscrowError::UnauthorizedCaller)
    );
    assert!(s.withdraw(&dst, &s.beneficiary, &s.secret).is_ok());
}

#[test]
fn test_cancel_is_depositor_only() {
    let s = Setup::new();
    let id = s.source();
    s.jump_to(s.params.timelocks.src_cancellation + 1);

    assert_eq!(
        s.cancel(&id, &s.beneficiary).err(),
        Some(EscrowError::UnauthorizedCaller)
    );
    // never funded: only the deposit goes back
    assert!(s.cancel(&id, &s.depositor).is_ok());
    assert_eq!(s.asset.balance(&s.depositor), AMOUNT);
    assert_eq!(s.native.balance(&s.depositor), s.params.safety_deposit);
}

#[test]
fn test_terminal_transition_happens_once() {
    let s = Setup::new();
    let id = s.source();
    s.fund(&id);
    let t = s.params.timelocks;

    s.jump_to(t.src_withdrawal);
    let record = s.withdraw(&id, &s.beneficiary, &s.secret).unwrap();
    assert!(record.withdrawn);
    assert_eq!(record.revealed_secret, Some(s.secret.clone()));
    assert_eq!(s.asset.balance(&s.beneficiary), AMOUNT);

    for at in [t.src_withdrawal, t.src_public_withdrawal, t.src_cancellation + 10] {
        s.jump_to(at);
        assert_eq!(
            s.withdraw(&id, &s.beneficiary, &s.secret).err(),
            Some(EscrowError::AlreadyWithdrawn)
        );
        assert_eq!(
            s.cancel(&id, &s.depositor).err(),
            Some(EscrowError::AlreadyWithdrawn)
        );
    }
}

#[test]
fn test_reentrant_call_is_rejected() {
    let s = Setup::new();
    let id = s.source();
    s.fund(&id);
    s.jump_to(s.params.timelocks.src_withdrawal);

    s.env.as_contract(&s.host, || {
        s.env
            .storage()
            .temporary()
            .set(&EscrowKey::Lock(id.clone()), &true);
    });
    assert_eq!(
        s.withdraw(&id, &s.beneficiary, &s.secret).err(),
        Some(EscrowError::Reentrancy)
    );

    s.env.as_contract(&s.host, || {
        s.env.storage().temporary().remove(&EscrowKey::Lock(id.clone()));
    });
    assert!(s.withdraw(&id, &s.beneficiary, &s.secret).is_ok());
}

#[test]
fn test_status_of_unknown_escrow() {
    let s = Setup::new();
    let status = s.status(&s.id(&LegProfile::SOURCE));
    assert!(!status.initialized);
    assert!(!status.in_withdrawal_window);
    assert!(!status.in_cancellation_window);
    assert_eq!(
        s.withdraw(&s.id(&LegProfile::SOURCE), &s.beneficiary, &s.secret).err(),
        Some(EscrowError::NotInitialized)
    );
}

#[test]
fn test_mark_funded_checks_observed_amount() {
    let s = Setup::new();
    let id = s.source();
    let venue = Address::generate(&s.env);

    let short = s.env.as_contract(&s.host, || {
        instance::mark_funded(&s.env, &id, &venue, AMOUNT - 1)
    });
    assert_eq!(short, Err(EscrowError::InsufficientEscrowBalance));
    assert!(!s.status(&id).funded);

    let record = s
        .env
        .as_contract(&s.host, || instance::mark_funded(&s.env, &id, &venue, AMOUNT))
        .unwrap();
    assert!(record.funded);

    let again = s.env.as_contract(&s.host, || {
        instance::mark_funded(&s.env, &id, &venue, AMOUNT)
    });
    assert_eq!(again, Err(EscrowError::AlreadyFunded));

    let unknown = s.id(&LegProfile::DESTINATION);
    let missing = s.env.as_contract(&s.host, || {
        instance::mark_funded(&s.env, &unknown, &venue, AMOUNT)
    });
    assert_eq!(missing, Err(EscrowError::NotInitialized));
}

#[test]
fn test_status_windows_close_after_terminal_transition() {
    let s = Setup::new();
    let t = s.params.timelocks;

    let src = s.source();
    s.fund(&src);
    s.jump_to(t.src_withdrawal);
    assert!(s.status(&src).in_withdrawal_window);
    s.withdraw(&src, &s.beneficiary, &s.secret).unwrap();

    let status = s.status(&src);
    assert!(status.withdrawn);
    assert!(!status.in_withdrawal_window);
    s.jump_to(t.src_cancellation + 1);
    assert!(!s.status(&src).in_cancellation_window);

    let dst = s.destination();
    assert!(s.status(&dst).in_cancellation_window);
    s.cancel(&dst, &s.depositor).unwrap();

    let status = s.status(&dst);
    assert!(status.cancelled);
    assert!(!status.in_cancellation_window);
    assert!(!status.in_withdrawal_window);
}
