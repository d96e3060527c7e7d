//! strand daemon — CLI entry point.
//!
//! Exit codes: 0 success, 1 usage error, 2 operational error.

mod wallet;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;

use strand_crypto::{decode_address, encode_address, generate_keypair};
use strand_ledger::{Ledger, LedgerConstants};
use strand_node::{init_logging, Node, NodeConfig};
use strand_store::LedgerStore;
use strand_types::{Account, NetworkId};

#[derive(Parser)]
#[command(name = "strand-daemon", about = "strand ledger node daemon")]
struct Cli {
    /// Network to join: live, test or dev.
    #[arg(long, default_value = "dev")]
    network: String,

    /// Data directory for ledger storage and the wallet file.
    #[arg(long, default_value = "./strand_data")]
    data_dir: PathBuf,

    /// Optional TOML config file; CLI flags override it.
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Run the node.
    #[command(name = "node")]
    Node,

    /// Generate a new keypair and print it.
    #[command(name = "account_create")]
    AccountCreate {
        /// Also add the new key to the wallet file.
        #[arg(long)]
        wallet: bool,
    },

    /// Show ledger state for an account.
    #[command(name = "account_get")]
    AccountGet { address: String },

    /// Add a hex private key to the wallet file.
    #[command(name = "wallet_add")]
    WalletAdd { private_key: String },

    /// Delete the wallet file.
    #[command(name = "wallet_destroy")]
    WalletDestroy,

    /// Compact the data file in place.
    #[command(name = "vacuum")]
    Vacuum,

    /// Write a dated, compacted backup of the data file.
    #[command(name = "snapshot")]
    Snapshot,

    /// Print table counts and schema version.
    #[command(name = "diagnostics")]
    Diagnostics,
}

fn parse_network(value: &str) -> Result<NetworkId, String> {
    match value {
        "live" => Ok(NetworkId::Live),
        "test" => Ok(NetworkId::Test),
        "dev" => Ok(NetworkId::Dev),
        other => Err(format!("unknown network '{other}'")),
    }
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // Help and version requests are successful exits.
            if err.use_stderr() {
                eprintln!("{err}");
                return ExitCode::from(1);
            }
            let _ = err.print();
            return ExitCode::SUCCESS;
        }
    };

    let network = match parse_network(&cli.network) {
        Ok(network) => network,
        Err(message) => {
            eprintln!("{message}");
            return ExitCode::from(1);
        }
    };

    match run(cli, network) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(2)
        }
    }
}

fn run(cli: Cli, network: NetworkId) -> anyhow::Result<()> {
    let data_dir = cli.data_dir.clone();
    let store_path = data_dir.join(network.as_str());

    match cli.command {
        Command::Node => {
            let mut config = match &cli.config {
                Some(path) => NodeConfig::from_toml_file(path)?,
                None => NodeConfig::default(),
            };
            config.network = network;
            config.data_dir = data_dir;
            init_logging(&config);
            run_node(config)
        }
        Command::AccountCreate { wallet: add } => {
            let keys = generate_keypair();
            let account = Account::from(keys.public);
            println!("address: {}", encode_address(&account));
            println!("public:  {}", hex::encode(keys.public.as_bytes()));
            println!("private: {}", hex::encode(keys.private.as_bytes()));
            if add {
                wallet::add_key(&data_dir, &hex::encode(keys.private.as_bytes()))?;
                println!("added to {}", wallet::wallet_path(&data_dir).display());
            }
            Ok(())
        }
        Command::AccountGet { address } => {
            let account = decode_address(&address)?;
            let store = Arc::new(LedgerStore::open(&store_path)?);
            let ledger = Ledger::new(Arc::clone(&store), LedgerConstants::for_network(network))?;
            let rtxn = store.read_txn()?;
            match store.account().get(&rtxn, &account)? {
                Some(info) => {
                    let confirmed = store.confirmation_height().get(&rtxn, &account)?;
                    println!("address:             {}", address);
                    println!("balance:             {}", info.balance.raw());
                    println!("head:                {}", info.head);
                    println!("open_block:          {}", info.open_block);
                    println!("representative:      {}", encode_address(&info.representative));
                    println!("block_count:         {}", info.block_count);
                    println!("epoch:               {}", info.epoch.as_u8());
                    println!("confirmation_height: {}", confirmed.height);
                    println!("voting_weight:       {}", ledger.weight(&account).raw());
                    Ok(())
                }
                None => anyhow::bail!("account not found"),
            }
        }
        Command::WalletAdd { private_key } => {
            let address = wallet::add_key(&data_dir, &private_key)?;
            println!("added {address}");
            Ok(())
        }
        Command::WalletDestroy => {
            if wallet::destroy(&data_dir)? {
                println!("wallet destroyed");
            } else {
                println!("no wallet file present");
            }
            Ok(())
        }
        Command::Vacuum => {
            let store = LedgerStore::open(&store_path)?;
            strand_store::vacuum(store)?;
            println!("vacuum complete");
            Ok(())
        }
        Command::Snapshot => {
            let store = LedgerStore::open(&store_path)?;
            let path = strand_store::snapshot(&store)?;
            println!("snapshot written to {}", path.display());
            Ok(())
        }
        Command::Diagnostics => {
            let store = LedgerStore::open(&store_path)?;
            let rtxn = store.read_txn()?;
            println!("schema_version:      {}", store.meta().schema_version(&rtxn)?);
            println!("blocks:              {}", store.block().count(&rtxn)?);
            println!("accounts:            {}", store.account().count(&rtxn)?);
            println!("pending:             {}", store.pending().count(&rtxn)?);
            println!("pruned:              {}", store.pruned().count(&rtxn)?);
            println!("unchecked:           {}", store.unchecked().count(&rtxn)?);
            println!("final_votes:         {}", store.final_vote().count(&rtxn)?);
            println!("confirmation_height: {}", store.confirmation_height().count(&rtxn)?);
            println!("frontiers:           {}", store.frontier().count(&rtxn)?);
            println!("online_weight:       {}", store.online_weight().count(&rtxn)?);
            println!("peers:               {}", store.peer().count(&rtxn)?);
            Ok(())
        }
    }
}

fn run_node(config: NodeConfig) -> anyhow::Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        tracing::info!(
            network = config.network.as_str(),
            "starting strand node"
        );
        let node = Arc::new(Node::new(config)?);
        let runner = Arc::clone(&node);
        let handle = tokio::spawn(async move { runner.run().await });

        tokio::signal::ctrl_c().await?;
        tracing::info!("shutdown requested");
        node.stop();
        handle.await??;
        Ok(())
    })
}
