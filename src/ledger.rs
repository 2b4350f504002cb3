/// ledger.rs -> submitting requests & fetching accounts over RPC

use std::{convert::TryFrom, thread};

use log::{debug, error, info, warn};
use solana_client::rpc_client::RpcClient;
use solana_program::{instruction::{Instruction, InstructionError}, pubkey::Pubkey};
use solana_sdk::{
	message::Message,
	signature::{Keypair, Signature, Signer},
	transaction::{Transaction, TransactionError},
};

use crate::{
	config::Config,
	error::{LedgerError, RemoteProgramError},
	instruction::Opcode,
};


/// Remote execution environment the session talks to
pub trait Ledger {

	/// Signs with `payer` (fee payer) plus `signers` and waits for confirmation
	fn submit(&self, instructions: &[Instruction], payer: &Keypair, signers: &[&Keypair]) -> Result<Signature, LedgerError>;

	/// Raw data of the account at `address`. A missing account is an error.
	fn fetch_account(&self, address: &Pubkey) -> Result<Vec<u8>, LedgerError>;

	/// Test-network faucet
	fn request_funds(&self, address: &Pubkey, lamports: u64) -> Result<Signature, LedgerError>;

	fn minimum_balance_for_rent_exemption(&self, data_len: usize) -> Result<u64, LedgerError>;
}


/// [Ledger] backed by a blocking JSON-RPC client
pub struct RpcLedger {
	rpc: RpcClient,
	config: Config,
}

impl RpcLedger {
	pub fn new(config: Config) -> Self {
		let rpc = RpcClient::new_with_commitment(config.rpc_url.clone(), config.commitment);
		Self { rpc, config }
	}

	/// Logs which request failed and maps custom program codes to [RemoteProgramError]
	fn classify_failure(&self, err: solana_client::client_error::ClientError, instructions: &[Instruction]) -> LedgerError {
		if let Some(TransactionError::InstructionError(index, ix_error)) = err.get_transaction_error() {
			let opcode = instructions
				.get(index as usize)
				.filter(|ix| ix.program_id == self.config.program_id)
				.and_then(|ix| ix.data.first())
				.and_then(|&tag| Opcode::try_from(tag).ok());

			if let (Some(opcode), InstructionError::Custom(code)) = (opcode, &ix_error) {
				if let Some(program_error) = RemoteProgramError::from_code(*code) {
					error!("[GameNft] ERROR: {:?} rejected by program: {}", opcode, program_error);
					return LedgerError::Program(program_error);
				}
			}
			error!("[GameNft] ERROR: instruction #{} ({:?}) failed: {}", index, opcode, ix_error);
		} else {
			error!("[GameNft] ERROR: transaction submission failed: {}", err);
		}
		LedgerError::Rpc(err)
	}
}

impl Ledger for RpcLedger {
	fn submit(&self, instructions: &[Instruction], payer: &Keypair, signers: &[&Keypair]) -> Result<Signature, LedgerError> {
		let blockhash = self.rpc.get_latest_blockhash()?;

		let mut all_signers: Vec<&Keypair> = vec![payer];
		all_signers.extend(signers.iter().copied().filter(|kp| kp.pubkey() != payer.pubkey()));

		let mut tx = Transaction::new_unsigned(Message::new(instructions, Some(&payer.pubkey())));
		tx.try_sign(&all_signers, blockhash)?;

		match self.rpc.send_and_confirm_transaction(&tx) {
			Ok(signature) => {
				info!("[GameNft] Transaction confirmed: {}", signature);
				Ok(signature)
			}
			Err(err) => Err(self.classify_failure(err, instructions)),
		}
	}

	fn fetch_account(&self, address: &Pubkey) -> Result<Vec<u8>, LedgerError> {
		let account = self
			.rpc
			.get_account_with_commitment(address, self.config.commitment)?
			.value
			.ok_or(LedgerError::AccountNotFound(*address))?;
		debug!("[GameNft] Fetched {} bytes from {}", account.data.len(), address);
		Ok(account.data)
	}

	fn request_funds(&self, address: &Pubkey, lamports: u64) -> Result<Signature, LedgerError> {
		let signature = self.rpc.request_airdrop(address, lamports)?;
		info!("[GameNft] Requested airdrop of {} lamports to {}", lamports, address);

		for attempt in 1..=self.config.confirm_attempts {
			if self.rpc.confirm_transaction(&signature)? {
				return Ok(signature);
			}
			debug!("[GameNft] Airdrop not confirmed yet (attempt {})", attempt);
			thread::sleep(self.config.confirm_interval);
		}

		warn!("[GameNft] Airdrop {} still unconfirmed", signature);
		Err(LedgerError::AirdropNotConfirmed { attempts: self.config.confirm_attempts })
	}

	fn minimum_balance_for_rent_exemption(&self, data_len: usize) -> Result<u64, LedgerError> {
		Ok(self.rpc.get_minimum_balance_for_rent_exemption(data_len)?)
	}
}


#[cfg(test)]
mod tests {
	use super::*;
	use solana_client::client_error::{ClientError, ClientErrorKind};

	use crate::instruction::initialize_contract;

	fn ledger(program_id: Pubkey) -> RpcLedger {
		RpcLedger::new(Config::new(crate::config::DEFAULT_RPC_URL, program_id))
	}

	fn failed(index: u8, code: u32) -> ClientError {
		ClientError::from(ClientErrorKind::TransactionError(TransactionError::InstructionError(
			index,
			InstructionError::Custom(code),
		)))
	}

	fn create_and_init(program_id: &Pubkey) -> Vec<Instruction> {
		let payer = Pubkey::new_unique();
		let contract = Pubkey::new_unique();
		vec![
			solana_program::system_instruction::create_account(&payer, &contract, 1, 40, program_id),
			initialize_contract(program_id, &contract, &payer),
		]
	}

	#[test]
	fn custom_code_on_program_instruction_is_named() {
		let program_id = Pubkey::new_unique();
		let err = ledger(program_id).classify_failure(failed(1, 1), &create_and_init(&program_id));
		assert!(matches!(err, LedgerError::Program(RemoteProgramError::MintNotPermitted)));
	}

	#[test]
	fn custom_code_on_system_instruction_stays_rpc() {
		let program_id = Pubkey::new_unique();
		let err = ledger(program_id).classify_failure(failed(0, 1), &create_and_init(&program_id));
		assert!(matches!(err, LedgerError::Rpc(_)));
	}

	#[test]
	fn unknown_custom_code_stays_rpc() {
		let program_id = Pubkey::new_unique();
		let err = ledger(program_id).classify_failure(failed(1, 4), &create_and_init(&program_id));
		assert!(matches!(err, LedgerError::Rpc(_)));
	}
}
