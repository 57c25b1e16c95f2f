use soroban_sdk::contracterror;
use timelocks::TimelockError;

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum EscrowError {
    // lifecycle
    AlreadyInitialized = 1,
    NotInitialized = 2,
    AlreadyWithdrawn = 3,
    AlreadyCancelled = 4,
    // authorization
    UnauthorizedCaller = 5,
    MissingRole = 6,
    // hashlock
    InvalidSecret = 7,
    // timing
    NotInWithdrawalWindow = 8,
    NotInCancellationWindow = 9,
    // parameters
    InvalidImmutables = 10,
    InvalidSafetyDeposit = 11,
    InvalidTimelockCoordination = 12,
    InvalidTimelocks = 13,
    // registry
    EscrowAlreadyExists = 14,
    EscrowNotFound = 15,
    // funding
    InsufficientEscrowBalance = 16,
    AlreadyFunded = 17,
    TransferFailed = 18,
    // administration
    ContractPaused = 19,
    Reentrancy = 20,
}

impl From<TimelockError> for EscrowError {
    fn from(_error: TimelockError) -> Self {
        EscrowError::InvalidTimelocks
    }
}
