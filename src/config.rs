/// config.rs -> connection & program settings handed to the ledger client

use std::time::Duration;

use solana_program::{native_token::LAMPORTS_PER_SOL, pubkey::Pubkey};
use solana_sdk::commitment_config::CommitmentConfig;


pub const DEFAULT_RPC_URL: &str = "http://127.0.0.1:8899";

/// Settings for one run. Passed to [crate::ledger::RpcLedger::new] and the session.
#[derive(Debug, Clone)]
pub struct Config {

	/// JSON-RPC endpoint of the cluster
	pub rpc_url: String,

	/// Address the game NFT program is deployed at
	pub program_id: Pubkey,

	pub commitment: CommitmentConfig,

	/// Lamports requested from the faucet for the payer (0 skips the airdrop)
	pub airdrop_lamports: u64,

	/// Number of confirmation polls before giving up on an airdrop
	pub confirm_attempts: u32,

	/// Delay between confirmation polls
	pub confirm_interval: Duration,
}

impl Config {
	pub fn new(rpc_url: impl Into<String>, program_id: Pubkey) -> Self {
		Self {
			rpc_url: rpc_url.into(),
			program_id,
			commitment: CommitmentConfig::confirmed(),
			airdrop_lamports: LAMPORTS_PER_SOL,
			confirm_attempts: 10,
			confirm_interval: Duration::from_millis(500),
		}
	}
}


#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn defaults() {
		let program_id = Pubkey::new_unique();
		let config = Config::new(DEFAULT_RPC_URL, program_id);
		assert_eq!(config.rpc_url, "http://127.0.0.1:8899");
		assert_eq!(config.program_id, program_id);
		assert_eq!(config.commitment, CommitmentConfig::confirmed());
		assert_eq!(config.airdrop_lamports, 1_000_000_000);
		assert_eq!(config.confirm_attempts, 10);
	}
}
