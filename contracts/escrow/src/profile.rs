use soroban_sdk::{Bytes, BytesN, Env};
use timelocks::{Leg, TimelockSchedule, WithdrawalPhase};

/// Role mapping and phase layout of one escrow variant.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct LegProfile {
    pub leg: Leg,
    /// Whether anyone may withdraw once the public phase opens.
    pub public_withdrawal: bool,
    /// Whether initialization needs the source leg's cancellation deadline.
    pub requires_coordination: bool,
}

impl LegProfile {
    pub const SOURCE: LegProfile = LegProfile {
        leg: Leg::Source,
        public_withdrawal: true,
        requires_coordination: false,
    };

    pub const DESTINATION: LegProfile = LegProfile {
        leg: Leg::Destination,
        public_withdrawal: false,
        requires_coordination: true,
    };

    pub fn of(leg: Leg) -> Self {
        match leg {
            Leg::Source => Self::SOURCE,
            Leg::Destination => Self::DESTINATION,
        }
    }

    fn salt_tag(&self) -> u8 {
        match self.leg {
            Leg::Source => 0x01,
            Leg::Destination => 0x02,
        }
    }

    pub fn withdrawal_phase(&self, timelocks: &TimelockSchedule, now: u64) -> Option<WithdrawalPhase> {
        match timelocks.withdrawal_phase(self.leg, now) {
            Some(WithdrawalPhase::Public) if !self.public_withdrawal => None,
            phase => phase,
        }
    }

    /// Deterministic instance id for the parameters with the given content hash.
    pub fn escrow_id(&self, env: &Env, params_hash: &BytesN<32>) -> BytesN<32> {
        let mut salt = Bytes::new(env);
        salt.push_back(self.salt_tag());
        salt.append(&Bytes::from(params_hash.clone()));
        env.crypto().sha256(&salt).to_bytes()
    }
}
