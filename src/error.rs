/// error.rs -> codec, ledger & remote program errors

use thiserror::Error;

use solana_program::pubkey::Pubkey;


/// Raised when bytes coming back from the ledger (or a request buffer being inspected)
/// do not match the expected layout. Never recovered from: the caller aborts the sequence.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
	/// Empty buffer or unknown opcode
	#[error("Invalid Instruction")]
	InvalidInstruction,

	/// A fixed-width field runs past the end of the buffer
	#[error("Truncated Field `{field}`: expected {expected} bytes, got {actual}")]
	TruncatedField {
		field: &'static str,
		expected: usize,
		actual: usize,
	},

	/// A string field is not valid UTF-8
	#[error("Invalid UTF-8 In Field `{0}`")]
	InvalidUtf8(&'static str),

	/// Account data shorter than the declared layout
	#[error("Account Data Too Short: expected {expected} bytes, got {actual}")]
	AccountDataTooShort { expected: usize, actual: usize },

	/// Account data longer than the declared layout (no padding is allowed)
	#[error("Trailing Account Data: expected {expected} bytes, got {actual}")]
	TrailingAccountData { expected: usize, actual: usize },

	/// Schema decoder rejected the bytes
	#[error("Invalid Account Data: {0}")]
	InvalidAccountData(String),
}


/// Raised while building a request from raw parts, before anything is submitted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodingPreconditionError {
	/// Identity keys are exactly 32 bytes
	#[error("Invalid Key Length For `{field}`: expected 32 bytes, got {actual}")]
	InvalidKeyLength { field: &'static str, actual: usize },

	/// String fields are appended as raw UTF-8
	#[error("Invalid UTF-8 In Field `{0}`")]
	InvalidUtf8(&'static str),
}


/// Custom error codes returned by the on-chain program (`ProgramError::Custom(code)`)
#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum RemoteProgramError {
	/// Signer is not the contract owner
	#[error("Not Admin")]
	NotAdmin,

	/// No matching mint permission for the game id
	#[error("Mint Not Permitted")]
	MintNotPermitted,

	/// Transfer requested by someone other than the token owner
	#[error("Not Token Owner")]
	NotTokenOwner,

	/// Program could not parse the request
	#[error("Invalid Instruction")]
	InvalidInstruction,
}

impl RemoteProgramError {
	pub fn from_code(code: u32) -> Option<Self> {
		match code {
			0 => Some(Self::NotAdmin),
			1 => Some(Self::MintNotPermitted),
			2 => Some(Self::NotTokenOwner),
			3 => Some(Self::InvalidInstruction),
			_ => None,
		}
	}
}


/// Failures from the ledger client
#[derive(Error, Debug)]
pub enum LedgerError {
	#[error("RPC Error: {0}")]
	Rpc(#[from] solana_client::client_error::ClientError),

	/// Fetching an address with no account behind it
	#[error("Account Not Found: {0}")]
	AccountNotFound(Pubkey),

	#[error("Airdrop Not Confirmed After {attempts} Attempts")]
	AirdropNotConfirmed { attempts: u32 },

	#[error("Signing Failed: {0}")]
	Signing(#[from] solana_sdk::signer::SignerError),

	/// Transaction reached the program and failed with one of its custom codes
	#[error("Program Error: {0}")]
	Program(RemoteProgramError),
}


/// Anything that stops the operation sequence
#[derive(Error, Debug)]
pub enum SessionError {
	#[error(transparent)]
	Ledger(#[from] LedgerError),

	#[error(transparent)]
	Decode(#[from] DecodeError),
}
