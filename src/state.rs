/// state.rs -> program objects, (de)serializing state

use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::pubkey::Pubkey;

use crate::error::DecodeError;


/// Size of the contract state account: owner key (32) + last token id (8)
pub const CONTRACT_STATE_LEN: usize = 40;


/* ==========================================================================
					Account State: Contract
============================================================================= */

/// State stored in the contract account
#[derive(BorshSerialize, BorshDeserialize, Debug, Default, Clone, PartialEq, Eq)]
pub struct ContractState {

	/// Contract owner account's public-key
	pub contract_owner: Pubkey,

	/// Last minted token id (only grows on the ledger)
	pub last_token_id: u64,
}

impl ContractState {

	/// Decodes the raw account bytes. Fails on any length other than [CONTRACT_STATE_LEN].
	pub fn unpack(data: &[u8]) -> Result<Self, DecodeError> {
		if data.len() < CONTRACT_STATE_LEN {
			return Err(DecodeError::AccountDataTooShort { expected: CONTRACT_STATE_LEN, actual: data.len() });
		}
		if data.len() > CONTRACT_STATE_LEN {
			return Err(DecodeError::TrailingAccountData { expected: CONTRACT_STATE_LEN, actual: data.len() });
		}
		Self::try_from_slice(data).map_err(|e| DecodeError::InvalidAccountData(e.to_string()))
	}
}


/* ==========================================================================
					Mint Permission
============================================================================= */

/// Permission for `user` to mint a token for `game_id`.
/// Only ever encoded here (as a `GrantMint` request).
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct MintPermission {
	pub user: Pubkey,
	pub game_id: String,
	pub token_uri: String,
}


/// Decodes a fetched contract account snapshot
pub fn decode_contract_state(data: &[u8]) -> Result<ContractState, DecodeError> {
	ContractState::unpack(data)
}
