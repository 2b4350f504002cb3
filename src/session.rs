/// session.rs -> ordered request sequence against the game NFT program

use log::info;
use solana_program::{pubkey::Pubkey, system_instruction};
use solana_sdk::signature::{Keypair, Signature, Signer};

use crate::{
	error::{LedgerError, SessionError},
	instruction,
	ledger::Ledger,
	state::{decode_contract_state, ContractState, MintPermission, CONTRACT_STATE_LEN},
};


/// One payer driving one contract account. Each step waits for confirmation before returning.
pub struct NftSession<L: Ledger> {
	ledger: L,
	program_id: Pubkey,
	payer: Keypair,
	contract: Keypair,
}

impl<L: Ledger> NftSession<L> {

	pub fn new(ledger: L, program_id: Pubkey, payer: Keypair, contract: Keypair) -> Self {
		Self { ledger, program_id, payer, contract }
	}

	pub fn ledger(&self) -> &L {
		&self.ledger
	}

	pub fn payer(&self) -> Pubkey {
		self.payer.pubkey()
	}

	pub fn contract_address(&self) -> Pubkey {
		self.contract.pubkey()
	}

	pub fn fund_payer(&self, lamports: u64) -> Result<Signature, LedgerError> {
		self.ledger.request_funds(&self.payer.pubkey(), lamports)
	}

	/// Creates the rent-exempt contract account (owned by the program) and sets the payer as owner
	pub fn initialize(&self) -> Result<Signature, LedgerError> {
		let lamports = self.ledger.minimum_balance_for_rent_exemption(CONTRACT_STATE_LEN)?;
		let create = system_instruction::create_account(
			&self.payer.pubkey(),
			&self.contract.pubkey(),
			lamports,
			CONTRACT_STATE_LEN as u64,
			&self.program_id,
		);
		let init = instruction::initialize_contract(&self.program_id, &self.contract.pubkey(), &self.payer.pubkey());

		info!("[GameNft] Initializing contract {} (owner {})", self.contract.pubkey(), self.payer.pubkey());
		self.ledger.submit(&[create, init], &self.payer, &[&self.contract])
	}

	/// Grants a mint permission, signed by the payer as contract owner
	pub fn grant_mint(&self, permission: &MintPermission) -> Result<Signature, LedgerError> {
		let ix = instruction::grant_mint(&self.program_id, &self.contract.pubkey(), &self.payer.pubkey(), permission);

		info!("[GameNft] Granting mint permission to {} for game `{}`", permission.user, permission.game_id);
		self.ledger.submit(&[ix], &self.payer, &[])
	}

	pub fn mint(&self, mint: &Pubkey, receiver: &Pubkey, game_id: &str) -> Result<Signature, LedgerError> {
		let ix = instruction::mint(&self.program_id, &self.contract.pubkey(), mint, receiver, game_id);

		info!("[GameNft] Minting token for game `{}` to {}", game_id, receiver);
		self.ledger.submit(&[ix], &self.payer, &[])
	}

	pub fn transfer(&self, owner: &Keypair, receiver: &Pubkey, token_id: u64) -> Result<Signature, LedgerError> {
		let ix = instruction::transfer(&self.program_id, &owner.pubkey(), receiver, token_id);

		info!("[GameNft] Transferring token {} from {} to {}", token_id, owner.pubkey(), receiver);
		self.ledger.submit(&[ix], &self.payer, &[owner])
	}

	pub fn burn(&self, owner: &Keypair, mint: &Pubkey, token_id: u64) -> Result<Signature, LedgerError> {
		let ix = instruction::burn(&self.program_id, &owner.pubkey(), mint, token_id);

		info!("[GameNft] Burning token {} held by {}", token_id, owner.pubkey());
		self.ledger.submit(&[ix], &self.payer, &[owner])
	}

	/// Fetches and decodes the contract account; a missing account or bad layout is an error
	pub fn read_state(&self) -> Result<ContractState, SessionError> {
		let data = self.ledger.fetch_account(&self.contract.pubkey())?;
		let state = decode_contract_state(&data)?;

		info!("[GameNft] Contract state: {:?}", state);
		Ok(state)
	}

	/// initialize -> grant-permission -> mint -> read-state, stopping at the first failure
	pub fn run_demo(&self, mint: &Pubkey, game_id: &str, token_uri: &str) -> Result<ContractState, SessionError> {
		let permission = MintPermission {
			user: self.payer.pubkey(),
			game_id: game_id.to_owned(),
			token_uri: token_uri.to_owned(),
		};

		self.initialize()?;
		self.grant_mint(&permission)?;
		self.mint(mint, &self.payer.pubkey(), game_id)?;
		self.read_state()
	}
}
