#![no_std]
use soroban_sdk::{contracterror, contracttype, Bytes, Env, U256};

/// Minimum base duration of a swap, long enough for both ledgers to finalize.
pub const MIN_CROSS_CHAIN_DELAY: u32 = 1_800;
/// Maximum base duration of a swap (7 days).
pub const MAX_DURATION: u32 = 604_800;
/// Gap between consecutive phase boundaries on the source leg.
pub const SAFETY_BUFFER: u32 = 300;

/// The leg of a two-ledger swap a schedule is evaluated for.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Leg {
    Source,
    Destination,
}

/// Withdrawal sub-phase. Only the source leg has a public phase.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum WithdrawalPhase {
    Private,
    Public,
}

/// Represents the boundaries stored in a schedule.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Stage {
    SrcWithdrawal,
    SrcPublicWithdrawal,
    SrcCancellation,
    SrcDeployedAt,
    DstWithdrawal,
    DstCancellation,
    DstDeployedAt,
}

impl From<Stage> for u32 {
    fn from(stage: Stage) -> Self {
        match stage {
            Stage::SrcWithdrawal => 0,
            Stage::SrcPublicWithdrawal => 1,
            Stage::SrcCancellation => 2,
            Stage::SrcDeployedAt => 3,
            Stage::DstWithdrawal => 4,
            Stage::DstCancellation => 5,
            Stage::DstDeployedAt => 6,
        }
    }
}

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum TimelockError {
    DurationOutOfRange = 1,
    TimestampOverflow = 2,
}

/// Bounds used when building a schedule from a single base duration.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct TimelockPolicy {
    pub min_cross_chain_delay: u32,
    pub max_duration: u32,
    pub safety_buffer: u32,
}

impl TimelockPolicy {
    pub const DEFAULT: TimelockPolicy = TimelockPolicy {
        min_cross_chain_delay: MIN_CROSS_CHAIN_DELAY,
        max_duration: MAX_DURATION,
        safety_buffer: SAFETY_BUFFER,
    };

    /// Builds a schedule anchored at `now`.
    ///
    /// Source withdrawal opens at `now + base_duration`, public withdrawal and
    /// cancellation each add one buffer. The destination leg opens at
    /// `now + base_duration / 2` and is cancellable one buffer before the
    /// source withdrawal window opens.
    pub fn create(&self, base_duration: u32, now: u64) -> Result<TimelockSchedule, TimelockError> {
        if base_duration < self.min_cross_chain_delay || base_duration > self.max_duration {
            return Err(TimelockError::DurationOutOfRange);
        }
        let now: u32 = now.try_into().map_err(|_| TimelockError::TimestampOverflow)?;
        let at = |offset: u32| now.checked_add(offset).ok_or(TimelockError::TimestampOverflow);

        let src_withdrawal = at(base_duration)?;
        let src_public_withdrawal = at(base_duration.saturating_add(self.safety_buffer))?;
        let src_cancellation = at(base_duration.saturating_add(self.safety_buffer.saturating_mul(2)))?;

        Ok(TimelockSchedule {
            src_withdrawal,
            src_public_withdrawal,
            src_cancellation,
            src_deployed_at: now,
            dst_withdrawal: at(base_duration / 2)?,
            dst_cancellation: at(base_duration.saturating_sub(self.safety_buffer))?,
            dst_deployed_at: now,
        })
    }
}

impl Default for TimelockPolicy {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Absolute phase boundaries (ledger timestamps, seconds) for both legs of a swap.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct TimelockSchedule {
    pub src_withdrawal: u32,
    pub src_public_withdrawal: u32,
    pub src_cancellation: u32,
    pub src_deployed_at: u32,
    pub dst_withdrawal: u32,
    pub dst_cancellation: u32,
    pub dst_deployed_at: u32,
}

impl TimelockSchedule {
    /// Builds a schedule with the default policy.
    pub fn create(base_duration: u32, now: u64) -> Result<Self, TimelockError> {
        TimelockPolicy::DEFAULT.create(base_duration, now)
    }

    /// Gets the absolute time at which the given stage starts
    pub fn get(&self, stage: Stage) -> u32 {
        match stage {
            Stage::SrcWithdrawal => self.src_withdrawal,
            Stage::SrcPublicWithdrawal => self.src_public_withdrawal,
            Stage::SrcCancellation => self.src_cancellation,
            Stage::SrcDeployedAt => self.src_deployed_at,
            Stage::DstWithdrawal => self.dst_withdrawal,
            Stage::DstCancellation => self.dst_cancellation,
            Stage::DstDeployedAt => self.dst_deployed_at,
        }
    }

    fn fields(&self) -> [u32; 7] {
        [
            self.src_withdrawal,
            self.src_public_withdrawal,
            self.src_cancellation,
            self.src_deployed_at,
            self.dst_withdrawal,
            self.dst_cancellation,
            self.dst_deployed_at,
        ]
    }

    /// Big-endian 256-bit layout: seven 32-bit fields, most significant
    /// first, followed by a zeroed 32-bit gap.
    pub fn to_be_bytes(&self) -> [u8; 32] {
        let mut word = [0u8; 32];
        for (i, field) in self.fields().iter().enumerate() {
            word[i * 4..i * 4 + 4].copy_from_slice(&field.to_be_bytes());
        }
        word
    }

    pub fn from_be_bytes(word: &[u8; 32]) -> Self {
        let field = |stage: Stage| {
            let offset = u32::from(stage) as usize * 4;
            let mut buf = [0u8; 4];
            buf.copy_from_slice(&word[offset..offset + 4]);
            u32::from_be_bytes(buf)
        };
        Self {
            src_withdrawal: field(Stage::SrcWithdrawal),
            src_public_withdrawal: field(Stage::SrcPublicWithdrawal),
            src_cancellation: field(Stage::SrcCancellation),
            src_deployed_at: field(Stage::SrcDeployedAt),
            dst_withdrawal: field(Stage::DstWithdrawal),
            dst_cancellation: field(Stage::DstCancellation),
            dst_deployed_at: field(Stage::DstDeployedAt),
        }
    }

    pub fn pack(&self, env: &Env) -> U256 {
        U256::from_be_bytes(env, &Bytes::from_array(env, &self.to_be_bytes()))
    }

    pub fn unpack(word: &U256) -> Self {
        let mut buf = [0u8; 32];
        word.to_be_bytes().copy_into_slice(&mut buf);
        Self::from_be_bytes(&buf)
    }

    /// Checks the ordering of every boundary, the cross-chain safety
    /// invariant and that the source leg is not deployed in the future.
    pub fn is_valid(&self, now: u64) -> bool {
        self.src_withdrawal > self.src_deployed_at
            && self.src_public_withdrawal > self.src_withdrawal
            && self.src_cancellation > self.src_public_withdrawal
            && self.dst_withdrawal > self.dst_deployed_at
            && self.dst_cancellation > self.dst_withdrawal
            // the destination leg must be reclaimable before the source leg can be claimed
            && self.dst_cancellation < self.src_withdrawal
            && now >= u64::from(self.src_deployed_at)
    }

    /// The withdrawal sub-phase the leg is in at `now`, if any.
    pub fn withdrawal_phase(&self, leg: Leg, now: u64) -> Option<WithdrawalPhase> {
        match leg {
            Leg::Source => {
                if now < u64::from(self.src_withdrawal) || now >= u64::from(self.src_cancellation) {
                    None
                } else if now < u64::from(self.src_public_withdrawal) {
                    Some(WithdrawalPhase::Private)
                } else {
                    Some(WithdrawalPhase::Public)
                }
            }
            Leg::Destination => {
                if now >= u64::from(self.dst_withdrawal) && now < u64::from(self.dst_cancellation) {
                    Some(WithdrawalPhase::Private)
                } else {
                    None
                }
            }
        }
    }

    pub fn can_withdraw(&self, leg: Leg, phase: WithdrawalPhase, now: u64) -> bool {
        self.withdrawal_phase(leg, now) == Some(phase)
    }

    pub fn in_withdrawal_window(&self, leg: Leg, now: u64) -> bool {
        self.withdrawal_phase(leg, now).is_some()
    }

    pub fn cancellation_start(&self, leg: Leg) -> u32 {
        match leg {
            Leg::Source => self.src_cancellation,
            Leg::Destination => self.dst_cancellation,
        }
    }

    pub fn can_cancel(&self, leg: Leg, now: u64) -> bool {
        now >= u64::from(self.cancellation_start(leg))
    }
}
