use soroban_sdk::{symbol_short, Address, BytesN, Env};

use crate::{instance::EscrowRecord, storage::EscrowId};

pub(crate) fn escrow_created(env: &Env, id: &EscrowId, record: &EscrowRecord) {
    let params = &record.params;
    env.events().publish(
        (symbol_short!("created"), id.clone()),
        (
            record.leg,
            params.depositor.clone(),
            params.beneficiary.clone(),
            params.amount,
            params.hashlock.clone(),
            record.src_cancellation_deadline,
        ),
    );
}

pub(crate) fn escrow_funded(env: &Env, id: &EscrowId, from: &Address, amount: i128) {
    env.events()
        .publish((symbol_short!("funded"), id.clone()), (from.clone(), amount));
}

pub(crate) fn secret_revealed(env: &Env, id: &EscrowId, secret: &BytesN<32>) {
    env.events()
        .publish((symbol_short!("secret"), id.clone()), (secret.clone(),));
}

pub(crate) fn funds_withdrawn(
    env: &Env,
    id: &EscrowId,
    beneficiary: &Address,
    amount: i128,
    deposit_recipient: &Address,
) {
    env.events().publish(
        (symbol_short!("withdrawn"), id.clone()),
        (beneficiary.clone(), amount, deposit_recipient.clone()),
    );
}

pub(crate) fn escrow_cancelled(env: &Env, id: &EscrowId, depositor: &Address, amount: i128) {
    env.events()
        .publish((symbol_short!("cancelled"), id.clone()), (depositor.clone(), amount));
}
