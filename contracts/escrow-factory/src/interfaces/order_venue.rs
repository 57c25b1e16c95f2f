use soroban_sdk::{contractclient, Address, Bytes, Env};

/// External limit-order venue. Filling `order` delivers `amount` of the
/// order's asset to `receiver`.
#[contractclient(name = "OrderVenueClient")]
pub trait OrderVenue {
    fn fill_order(env: Env, order: Bytes, receiver: Address, amount: i128);
}
