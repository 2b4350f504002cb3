/// lib.rs -> Registering the modules

pub mod config;
pub mod error;
pub mod instruction;
pub mod ledger;
pub mod session;
pub mod state;

pub use config::Config;
pub use error::{DecodeError, EncodingPreconditionError, LedgerError, SessionError};
pub use instruction::{encode_burn, encode_grant_permission, encode_initialize, encode_mint, encode_transfer, GameNftInstruction, Opcode};
pub use ledger::{Ledger, RpcLedger};
pub use session::NftSession;
pub use state::{decode_contract_state, ContractState, MintPermission};
