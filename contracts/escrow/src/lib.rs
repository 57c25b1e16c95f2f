#![no_std]
//! Hash time-locked escrow for one leg of a two-ledger swap.
//!
//! Both legs run the same state machine ([`instance`]); a [`LegProfile`]
//! selects the role mapping, the withdrawal sub-phases and whether the
//! source leg's cancellation deadline is required at initialization.
//! Instances live in the storage of the hosting contract, keyed by an id
//! derived from the content hash of their [`SwapParameters`].

pub mod custody;
pub mod error;
mod events;
pub mod instance;
pub mod params;
pub mod profile;
pub mod storage;

pub use error::EscrowError;
pub use instance::{EscrowRecord, EscrowStatus, Initialization};
pub use params::{hashlock_of, safety_deposit, SwapParameters};
pub use profile::LegProfile;
pub use storage::EscrowId;
pub use timelocks::{Leg, TimelockSchedule, WithdrawalPhase};

mod test;
