use soroban_sdk::{token, Address, Env};

use crate::error::EscrowError;

/// Moves `amount` of `asset` through the asset contract's `transfer`.
/// Any failure of the asset contract surfaces as `TransferFailed`.
pub fn transfer(
    env: &Env,
    asset: &Address,
    from: &Address,
    to: &Address,
    amount: i128,
) -> Result<(), EscrowError> {
    if amount == 0 {
        return Ok(());
    }
    match token::TokenClient::new(env, asset).try_transfer(from, to, &amount) {
        Ok(Ok(())) => Ok(()),
        _ => Err(EscrowError::TransferFailed),
    }
}

pub fn balance(env: &Env, asset: &Address, of: &Address) -> i128 {
    token::TokenClient::new(env, asset).balance(of)
}
