/// instruction.rs -> program API, (de)serializing instruction data

use solana_program::{
	instruction::{AccountMeta, Instruction},
	pubkey::Pubkey,
	sysvar,
};
use std::convert::{TryFrom, TryInto};

use crate::error::{DecodeError, EncodingPreconditionError};
use crate::state::MintPermission;


/// Width of an identity key inside a request
pub const KEY_LEN: usize = 32;

/// Width of a token id inside a request
pub const TOKEN_ID_LEN: usize = 8;


/// Single-byte discriminant at the head of every request
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[repr(u8)]
pub enum Opcode {
	InitializeContract = 0,
	GrantMint = 1,
	Mint = 2,
	Transfer = 3,
	Burn = 4,
}

impl TryFrom<u8> for Opcode {
	type Error = DecodeError;

	fn try_from(tag: u8) -> Result<Self, Self::Error> {
		Ok(match tag {
			0 => Self::InitializeContract,
			1 => Self::GrantMint,
			2 => Self::Mint,
			3 => Self::Transfer,
			4 => Self::Burn,
			_ => return Err(DecodeError::InvalidInstruction),
		})
	}
}


/// Requests understood by the game NFT program.
///
/// Fixed-width fields come first. String fields are appended last as raw UTF-8 with
/// no length prefix or separator; the program reads a string up to the end of the buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameNftInstruction {

	/// Set the contract owner and reset the token counter.
	///
	/// Accounts expected:
	/// 0. `[writable]` The contract state account (owned by program_id)
	/// 1. `[]` Sysvar Rent Account to validate rent exemption (SYSVAR_RENT_PUBKEY)
	InitializeContract { owner: Pubkey },

	/// Allow `user` to mint a token for `game_id` (contract owner signs, see [grant_mint])
	GrantMint {
		user: Pubkey,
		game_id: String,
		token_uri: String,
	},

	/// Mint the next token id for `game_id` to `receiver`.
	///
	/// Accounts expected:
	/// 0. `[writable]` The contract state account
	/// 1. `[writable]` Token mint account
	/// 2. `[writable]` Receiver token account
	Mint { receiver: Pubkey, game_id: String },

	/// Move a token from `owner` to `receiver`.
	///
	/// Accounts expected:
	/// 0. `[signer]` Owner account (keypair)
	/// 1. `[writable]` Receiver account
	Transfer {
		token_id: u64,
		owner: Pubkey,
		receiver: Pubkey,
	},

	/// Burn a token held by the signer.
	///
	/// Accounts expected:
	/// 0. `[signer, writable]` Owner account (keypair)
	/// 1. `[writable]` Token mint account
	Burn { token_id: u64 },
}

impl GameNftInstruction {

	pub fn opcode(&self) -> Opcode {
		match self {
			Self::InitializeContract { .. } => Opcode::InitializeContract,
			Self::GrantMint { .. } => Opcode::GrantMint,
			Self::Mint { .. } => Opcode::Mint,
			Self::Transfer { .. } => Opcode::Transfer,
			Self::Burn { .. } => Opcode::Burn,
		}
	}

	/// Packs a [GameNftInstruction] into a byte buffer
	pub fn pack(&self) -> Vec<u8> {
		let mut buf = Vec::with_capacity(self.packed_len());
		buf.push(self.opcode() as u8);

		match self {
			Self::InitializeContract { owner } => {
				buf.extend_from_slice(owner.as_ref());
			}

			Self::GrantMint { user, game_id, token_uri } => {
				buf.extend_from_slice(user.as_ref());
				buf.extend_from_slice(game_id.as_bytes());
				buf.extend_from_slice(token_uri.as_bytes());
			}

			Self::Mint { receiver, game_id } => {
				buf.extend_from_slice(receiver.as_ref());
				buf.extend_from_slice(game_id.as_bytes());
			}

			Self::Transfer { token_id, owner, receiver } => {
				buf.extend_from_slice(&token_id.to_le_bytes());
				buf.extend_from_slice(owner.as_ref());
				buf.extend_from_slice(receiver.as_ref());
			}

			Self::Burn { token_id } => {
				buf.extend_from_slice(&token_id.to_le_bytes());
			}
		}

		buf
	}

	/// Exact size of [Self::pack]'s output
	pub fn packed_len(&self) -> usize {
		1 + match self {
			Self::InitializeContract { .. } => KEY_LEN,
			Self::GrantMint { game_id, token_uri, .. } => KEY_LEN + game_id.len() + token_uri.len(),
			Self::Mint { game_id, .. } => KEY_LEN + game_id.len(),
			Self::Transfer { .. } => TOKEN_ID_LEN + 2 * KEY_LEN,
			Self::Burn { .. } => TOKEN_ID_LEN,
		}
	}

	/// Unpacks a byte buffer into a [GameNftInstruction], reading it the way the program does.
	///
	/// A string field swallows everything after the fixed fields, so a packed `GrantMint`
	/// comes back with `game_id || token_uri` as its game id and an empty token uri.
	pub fn unpack(input: &[u8]) -> Result<Self, DecodeError> {
		let (&tag, rest) = input
			.split_first()
			.ok_or(DecodeError::InvalidInstruction)?;

		Ok(match Opcode::try_from(tag)? {
			Opcode::InitializeContract => {
				let (owner, _) = Self::unpack_pubkey(rest, "owner")?;
				Self::InitializeContract { owner }
			}

			Opcode::GrantMint => {
				let (user, rest) = Self::unpack_pubkey(rest, "user")?;
				let (game_id, rest) = Self::unpack_string(rest, "game_id")?;
				let (token_uri, _) = Self::unpack_string(rest, "token_uri")?;
				Self::GrantMint { user, game_id, token_uri }
			}

			Opcode::Mint => {
				let (receiver, rest) = Self::unpack_pubkey(rest, "receiver")?;
				let (game_id, _) = Self::unpack_string(rest, "game_id")?;
				Self::Mint { receiver, game_id }
			}

			Opcode::Transfer => {
				let (token_id, rest) = Self::unpack_u64(rest, "token_id")?;
				let (owner, rest) = Self::unpack_pubkey(rest, "owner")?;
				let (receiver, _) = Self::unpack_pubkey(rest, "receiver")?;
				Self::Transfer { token_id, owner, receiver }
			}

			Opcode::Burn => {
				let (token_id, _) = Self::unpack_u64(rest, "token_id")?;
				Self::Burn { token_id }
			}
		})
	}

	/// Builds an `InitializeContract` from an unchecked key
	pub fn initialize_from_parts(owner: &[u8]) -> Result<Self, EncodingPreconditionError> {
		Ok(Self::InitializeContract { owner: key_from_slice(owner, "owner")? })
	}

	/// Builds a `GrantMint` from unchecked key & string bytes
	pub fn grant_mint_from_parts(user: &[u8], game_id: &[u8], token_uri: &[u8]) -> Result<Self, EncodingPreconditionError> {
		Ok(Self::GrantMint {
			user: key_from_slice(user, "user")?,
			game_id: string_from_slice(game_id, "game_id")?,
			token_uri: string_from_slice(token_uri, "token_uri")?,
		})
	}

	/// Builds a `Mint` from unchecked key & string bytes
	pub fn mint_from_parts(receiver: &[u8], game_id: &[u8]) -> Result<Self, EncodingPreconditionError> {
		Ok(Self::Mint {
			receiver: key_from_slice(receiver, "receiver")?,
			game_id: string_from_slice(game_id, "game_id")?,
		})
	}

	fn unpack_pubkey<'a>(input: &'a [u8], field: &'static str) -> Result<(Pubkey, &'a [u8]), DecodeError> {
		if input.len() < KEY_LEN {
			return Err(DecodeError::TruncatedField { field, expected: KEY_LEN, actual: input.len() });
		}
		let (key, rest) = input.split_at(KEY_LEN);
		let bytes: [u8; KEY_LEN] = key
			.try_into()
			.map_err(|_| DecodeError::TruncatedField { field, expected: KEY_LEN, actual: key.len() })?;
		Ok((Pubkey::new_from_array(bytes), rest))
	}

	fn unpack_u64<'a>(input: &'a [u8], field: &'static str) -> Result<(u64, &'a [u8]), DecodeError> {
		let value = input
			.get(..TOKEN_ID_LEN)
			.and_then(|slice| slice.try_into().ok())
			.map(u64::from_le_bytes)
			.ok_or(DecodeError::TruncatedField { field, expected: TOKEN_ID_LEN, actual: input.len() })?;
		Ok((value, &input[TOKEN_ID_LEN..]))
	}

	fn unpack_string<'a>(input: &'a [u8], field: &'static str) -> Result<(String, &'a [u8]), DecodeError> {
		let string = std::str::from_utf8(input)
			.map_err(|_| DecodeError::InvalidUtf8(field))?
			.to_owned();
		Ok((string, &input[input.len()..]))
	}
}

impl From<MintPermission> for GameNftInstruction {
	fn from(permission: MintPermission) -> Self {
		Self::GrantMint {
			user: permission.user,
			game_id: permission.game_id,
			token_uri: permission.token_uri,
		}
	}
}


/// `[0x00] || owner`
pub fn encode_initialize(owner: &Pubkey) -> Vec<u8> {
	GameNftInstruction::InitializeContract { owner: *owner }.pack()
}

/// `[0x01] || user || utf8(game_id) || utf8(token_uri)`
pub fn encode_grant_permission(user: &Pubkey, game_id: &str, token_uri: &str) -> Vec<u8> {
	GameNftInstruction::GrantMint {
		user: *user,
		game_id: game_id.to_owned(),
		token_uri: token_uri.to_owned(),
	}
	.pack()
}

/// `[0x02] || receiver || utf8(game_id)`
pub fn encode_mint(receiver: &Pubkey, game_id: &str) -> Vec<u8> {
	GameNftInstruction::Mint { receiver: *receiver, game_id: game_id.to_owned() }.pack()
}

/// `[0x03] || token_id (LE) || owner || receiver`
pub fn encode_transfer(token_id: u64, owner: &Pubkey, receiver: &Pubkey) -> Vec<u8> {
	GameNftInstruction::Transfer { token_id, owner: *owner, receiver: *receiver }.pack()
}

/// `[0x04] || token_id (LE)`
pub fn encode_burn(token_id: u64) -> Vec<u8> {
	GameNftInstruction::Burn { token_id }.pack()
}


/* ==========================================================================
					Instruction builders (data + accounts)
============================================================================= */

/// Creates an `InitializeContract` instruction
pub fn initialize_contract(program_id: &Pubkey, contract: &Pubkey, owner: &Pubkey) -> Instruction {
	Instruction {
		program_id: *program_id,
		accounts: vec![
			AccountMeta::new(*contract, false),
			AccountMeta::new_readonly(sysvar::rent::id(), false),
		],
		data: encode_initialize(owner),
	}
}

/// Creates a `GrantMint` instruction, signed by the contract owner
pub fn grant_mint(program_id: &Pubkey, contract: &Pubkey, admin: &Pubkey, permission: &MintPermission) -> Instruction {
	Instruction {
		program_id: *program_id,
		accounts: vec![
			AccountMeta::new(*contract, false),
			AccountMeta::new_readonly(*admin, true),
		],
		data: encode_grant_permission(&permission.user, &permission.game_id, &permission.token_uri),
	}
}

/// Creates a `Mint` instruction
pub fn mint(program_id: &Pubkey, contract: &Pubkey, mint: &Pubkey, receiver: &Pubkey, game_id: &str) -> Instruction {
	Instruction {
		program_id: *program_id,
		accounts: vec![
			AccountMeta::new(*contract, false),
			AccountMeta::new(*mint, false),
			AccountMeta::new(*receiver, false),
		],
		data: encode_mint(receiver, game_id),
	}
}

/// Creates a `Transfer` instruction, signed by the token owner
pub fn transfer(program_id: &Pubkey, owner: &Pubkey, receiver: &Pubkey, token_id: u64) -> Instruction {
	Instruction {
		program_id: *program_id,
		accounts: vec![
			AccountMeta::new_readonly(*owner, true),
			AccountMeta::new(*receiver, false),
		],
		data: encode_transfer(token_id, owner, receiver),
	}
}

/// Creates a `Burn` instruction, signed by the token owner
pub fn burn(program_id: &Pubkey, owner: &Pubkey, mint: &Pubkey, token_id: u64) -> Instruction {
	Instruction {
		program_id: *program_id,
		accounts: vec![
			AccountMeta::new(*owner, true),
			AccountMeta::new(*mint, false),
		],
		data: encode_burn(token_id),
	}
}


fn key_from_slice(bytes: &[u8], field: &'static str) -> Result<Pubkey, EncodingPreconditionError> {
	let array: [u8; KEY_LEN] = bytes
		.try_into()
		.map_err(|_| EncodingPreconditionError::InvalidKeyLength { field, actual: bytes.len() })?;
	Ok(Pubkey::new_from_array(array))
}

fn string_from_slice(bytes: &[u8], field: &'static str) -> Result<String, EncodingPreconditionError> {
	std::str::from_utf8(bytes)
		.map(str::to_owned)
		.map_err(|_| EncodingPreconditionError::InvalidUtf8(field))
}


#[cfg(test)]
mod tests {
	use super::*;

	fn payer() -> Pubkey {
		Pubkey::new_from_array([0xAA; 32])
	}

	#[test]
	fn opcode_leads_every_request() {
		let key = payer();
		assert_eq!(encode_initialize(&key)[0], 0);
		assert_eq!(encode_grant_permission(&key, "g", "u")[0], 1);
		assert_eq!(encode_mint(&key, "g")[0], 2);
		assert_eq!(encode_transfer(7, &key, &key)[0], 3);
		assert_eq!(encode_burn(7)[0], 4);
	}

	#[test]
	fn initialize_carries_key_after_opcode() {
		let key = Pubkey::new_unique();
		let data = encode_initialize(&key);
		assert_eq!(data.len(), 33);
		assert_eq!(&data[1..], key.as_ref());
	}

	#[test]
	fn grant_permission_has_no_separator_between_strings() {
		let key = payer();
		let mut expected = vec![1u8];
		expected.extend_from_slice(key.as_ref());
		expected.extend_from_slice(b"game_id");
		expected.extend_from_slice(b"token_uri");
		assert_eq!(encode_grant_permission(&key, "game_id", "token_uri"), expected);
	}

	#[test]
	fn demo_sequence_lengths_and_bytes() {
		let key = payer();
		let init = encode_initialize(&key);
		let grant = encode_grant_permission(&key, "g1", "u1");
		let mint = encode_mint(&key, "g1");

		assert_eq!((init.len(), grant.len(), mint.len()), (33, 37, 35));

		assert_eq!(init[0], 0x00);
		assert!(init[1..].iter().all(|&b| b == 0xAA));

		assert_eq!(grant[0], 0x01);
		assert!(grant[1..33].iter().all(|&b| b == 0xAA));
		assert_eq!(&grant[33..], b"g1u1");

		assert_eq!(mint[0], 0x02);
		assert!(mint[1..33].iter().all(|&b| b == 0xAA));
		assert_eq!(&mint[33..], b"g1");
	}

	#[test]
	fn encoding_is_deterministic() {
		let key = Pubkey::new_unique();
		assert_eq!(encode_grant_permission(&key, "a", "b"), encode_grant_permission(&key, "a", "b"));
		assert_eq!(encode_mint(&key, "a"), encode_mint(&key, "a"));
	}

	#[test]
	fn transfer_and_burn_layout() {
		let owner = Pubkey::new_unique();
		let receiver = Pubkey::new_unique();
		let data = encode_transfer(0x0102, &owner, &receiver);
		assert_eq!(data.len(), 1 + 8 + 64);
		assert_eq!(&data[1..9], &[0x02, 0x01, 0, 0, 0, 0, 0, 0]);
		assert_eq!(&data[9..41], owner.as_ref());
		assert_eq!(&data[41..], receiver.as_ref());

		assert_eq!(encode_burn(5), vec![4, 5, 0, 0, 0, 0, 0, 0, 0]);
	}

	#[test]
	fn packed_len_matches_pack() {
		let ix = GameNftInstruction::GrantMint {
			user: payer(),
			game_id: "héllo".into(),
			token_uri: "ipfs://x".into(),
		};
		assert_eq!(ix.pack().len(), ix.packed_len());
	}

	#[test]
	fn unpack_reads_strings_to_end_of_buffer() {
		let key = payer();
		let unpacked = GameNftInstruction::unpack(&encode_grant_permission(&key, "g1", "u1")).unwrap();
		assert_eq!(
			unpacked,
			GameNftInstruction::GrantMint { user: key, game_id: "g1u1".into(), token_uri: String::new() }
		);

		let unpacked = GameNftInstruction::unpack(&encode_transfer(9, &key, &key)).unwrap();
		assert_eq!(unpacked, GameNftInstruction::Transfer { token_id: 9, owner: key, receiver: key });
	}

	#[test]
	fn unpack_rejects_bad_input() {
		assert_eq!(GameNftInstruction::unpack(&[]), Err(DecodeError::InvalidInstruction));
		assert_eq!(GameNftInstruction::unpack(&[9]), Err(DecodeError::InvalidInstruction));
		assert_eq!(
			GameNftInstruction::unpack(&[0, 1, 2]),
			Err(DecodeError::TruncatedField { field: "owner", expected: 32, actual: 2 })
		);
		assert_eq!(
			GameNftInstruction::unpack(&[4, 1]),
			Err(DecodeError::TruncatedField { field: "token_id", expected: 8, actual: 1 })
		);

		let mut data = encode_mint(&payer(), "");
		data.push(0xFF);
		assert_eq!(GameNftInstruction::unpack(&data), Err(DecodeError::InvalidUtf8("game_id")));
	}

	#[test]
	fn raw_parts_are_checked() {
		assert_eq!(
			GameNftInstruction::initialize_from_parts(&[1; 31]),
			Err(EncodingPreconditionError::InvalidKeyLength { field: "owner", actual: 31 })
		);
		assert_eq!(
			GameNftInstruction::grant_mint_from_parts(&[1; 32], b"g", &[0xC3]),
			Err(EncodingPreconditionError::InvalidUtf8("token_uri"))
		);
		assert_eq!(
			GameNftInstruction::mint_from_parts(&[0xAA; 32], b"g1").unwrap().pack(),
			encode_mint(&payer(), "g1")
		);
	}

	#[test]
	fn builders_attach_expected_accounts() {
		let program_id = Pubkey::new_unique();
		let contract = Pubkey::new_unique();
		let admin = Pubkey::new_unique();

		let ix = initialize_contract(&program_id, &contract, &admin);
		assert_eq!(ix.program_id, program_id);
		assert_eq!(ix.accounts, vec![AccountMeta::new(contract, false), AccountMeta::new_readonly(sysvar::rent::id(), false)]);
		assert_eq!(ix.data, encode_initialize(&admin));

		let permission = MintPermission { user: admin, game_id: "g1".into(), token_uri: "u1".into() };
		let ix = grant_mint(&program_id, &contract, &admin, &permission);
		assert!(ix.accounts[1].is_signer);
		assert!(!ix.accounts[1].is_writable);
		assert_eq!(ix.data.len(), 37);

		let ix = burn(&program_id, &admin, &contract, 3);
		assert!(ix.accounts[0].is_signer && ix.accounts[0].is_writable);
	}

	#[test]
	fn mint_permission_converts_to_grant() {
		let permission = MintPermission { user: payer(), game_id: "g1".into(), token_uri: "u1".into() };
		let ix: GameNftInstruction = permission.into();
		assert_eq!(ix.pack(), encode_grant_permission(&payer(), "g1", "u1"));
	}
}
