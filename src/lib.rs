//! Chain interaction and aggregation layer for managing Bittensor wallets.
//!
//! The crate is organised bottom-up:
//! - [`utils`]: units, SS58 and dynamic value decoding
//! - [`chain`]: the connection with endpoint fallback and the extrinsic
//!   submission protocol
//! - [`queries`]: read-only façade that degrades to defaults
//! - [`operations`]: transfers, staking and burn registration
//! - [`stats`]: registration cache, wallet snapshots and subnet overviews
//! - [`cli`]: the `btmanager` command-line front end

pub mod chain;
pub mod cli;
pub mod config;
pub mod core;
pub mod errors;
pub mod logging;
pub mod operations;
pub mod queries;
pub mod stats;
pub mod types;
pub mod utils;

pub use chain::{
    compose_and_submit, compose_and_submit_checked, signer_from_seed, CallDescriptor,
    ChainConnection, ChainRpc, ConnectionState, Error as ChainError, ExtrinsicOutcome,
    ExtrinsicReceipt, KeySigner, PairSigner, RetryConfig, SubmissionStatus, SubmitOptions,
};
pub use config::{determine_chain_endpoint_and_network, Config, Network};
pub use errors::{
    BtManagerError, BtManagerResult, ChainConnectionError, ExtrinsicFailure, PreconditionFailure,
    QueryDegradation,
};
pub use logging::{init_logging, is_initialized, LogFormat, LoggingConfig};

pub use types::*;

pub use queries::*;

pub use operations::*;

pub use stats::{
    build_global_registration_cache, build_registration_cache, get_subnet_overview,
    get_wallet_snapshot, summarize_wallets, HttpPriceFeed, KnownPrice, PriceSource,
    RegistrationCache, SubnetOverview, SubnetStakeRow, WalletSnapshot,
};

pub use utils::balance_newtypes::{rao_to_tao, tao_to_rao, Alpha, Rao, Tao};
pub use utils::decoders::Record;
pub use utils::ss58::{is_valid_ss58_address, ss58_decode, ss58_encode};
