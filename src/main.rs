/// main.rs -> drives initialize, grant-permission, mint & read-state against a cluster

use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info};
use solana_program::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signer};

use game_nft_client::{
	config::{Config, DEFAULT_RPC_URL},
	GameNftInstruction, MintPermission, NftSession, RpcLedger,
};


#[derive(Parser, Debug)]
#[command(name = "game-nft")]
#[command(about = "Initialize the game NFT contract, grant a mint permission, mint and read back the state")]
struct Args {
	/// Cluster JSON-RPC URL
	#[arg(short, long, default_value = DEFAULT_RPC_URL)]
	url: String,

	/// Address of the deployed game NFT program
	#[arg(short, long)]
	program_id: Pubkey,

	/// Token mint account passed to the mint request (a fresh address if omitted)
	#[arg(short, long)]
	mint: Option<Pubkey>,

	#[arg(short, long, default_value = "game_id")]
	game_id: String,

	#[arg(short, long, default_value = "token_uri")]
	token_uri: String,

	/// Lamports to airdrop to the payer before starting (0 to skip)
	#[arg(short, long, default_value_t = 1_000_000_000)]
	airdrop: u64,

	/// Print the encoded requests without touching the network
	#[arg(long)]
	dry_run: bool,
}

fn main() -> Result<()> {
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

	let args = Args::parse();
	let payer = Keypair::new();
	let contract = Keypair::new();
	let mint = args.mint.unwrap_or_else(|| Keypair::new().pubkey());

	if args.dry_run {
		return print_requests(&payer.pubkey(), &args.game_id, &args.token_uri);
	}

	let mut config = Config::new(args.url, args.program_id);
	config.airdrop_lamports = args.airdrop;

	info!("[GameNft] Connecting to {} (program {})", config.rpc_url, config.program_id);
	let session = NftSession::new(RpcLedger::new(config.clone()), config.program_id, payer, contract);

	if config.airdrop_lamports > 0 {
		session
			.fund_payer(config.airdrop_lamports)
			.context("Failed to fund payer")?;
	}

	match session.run_demo(&mint, &args.game_id, &args.token_uri) {
		Ok(state) => {
			info!("[GameNft] Contract owner: {}", state.contract_owner);
			info!("[GameNft] Last token id: {}", state.last_token_id);
			Ok(())
		}
		Err(err) => {
			error!("[GameNft] ERROR: sequence aborted: {}", err);
			Err(err).context("Game NFT sequence failed")
		}
	}
}

fn print_requests(payer: &Pubkey, game_id: &str, token_uri: &str) -> Result<()> {
	let requests = [
		GameNftInstruction::InitializeContract { owner: *payer },
		MintPermission { user: *payer, game_id: game_id.to_owned(), token_uri: token_uri.to_owned() }.into(),
		GameNftInstruction::Mint { receiver: *payer, game_id: game_id.to_owned() },
	];

	for request in requests.iter() {
		let data = request.pack();
		let hex: String = data.iter().map(|b| format!("{:02x}", b)).collect();
		let as_read = GameNftInstruction::unpack(&data).context("Encoded request does not parse back")?;
		info!("[GameNft] {:?} ({} bytes): {}", request.opcode(), data.len(), hex);
		info!("[GameNft]   read by program as {:?}", as_read);
	}

	Ok(())
}
