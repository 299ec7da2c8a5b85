use soroban_sdk::{symbol_short, Address, Env, Symbol};

use crate::{events, LedgerError};

const OPERATOR: Symbol = symbol_short!("OPERATOR");

/// The all-zero ed25519 account. Stellar has no zero address, so this is
/// the identity operator rotation refuses.
pub const NULL_ACCOUNT: &str = "GAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAWHF";

pub fn get_operator(env: &Env) -> Option<Address> {
    env.storage().instance().get(&OPERATOR)
}

pub(crate) fn set_initial_operator(env: &Env, operator: &Address) {
    env.storage().instance().set(&OPERATOR, operator);
}

pub fn is_null_identity(env: &Env, address: &Address) -> bool {
    *address == Address::from_str(env, NULL_ACCOUNT)
}

/// Hand the operator role to `new_operator`. Callers enforce `require_auth`.
pub fn set_operator(env: &Env, caller: &Address, new_operator: Address) -> Result<(), LedgerError> {
    let current = get_operator(env).ok_or(LedgerError::NotInitialized)?;
    if *caller != current {
        return Err(LedgerError::Unauthorized);
    }
    if is_null_identity(env, &new_operator) {
        return Err(LedgerError::ZeroAddress);
    }

    env.storage().instance().set(&OPERATOR, &new_operator);
    events::publish_operator_changed(env, current, new_operator);

    Ok(())
}
