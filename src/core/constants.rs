//! Core constants of the Bittensor chain as seen by this manager

/// TAO/RAO conversion factor (1 TAO = 1_000_000_000 RAO).
/// Alpha shares the same scale.
pub const RAOPERTAO: u128 = 1_000_000_000;

#[allow(dead_code)]
const _: () = assert!(RAOPERTAO == 10u128.pow(9), "RAOPERTAO must equal 10^9");

/// Divisor for the fixed-point `bits` field carried by subnet prices.
pub const PRICE_FIXED_POINT_DIVISOR: f64 = 4_294_967_296.0; // 2^32

/// Incentive, trust and similar neuron fields are u16 scaled fractions.
pub const U16_FRACTION_DIVISOR: f64 = 65_535.0;

/// SS58 format for Bittensor addresses
pub const SS58_FORMAT: u16 = 42;

/// The root subnet; stake there is TAO, valued 1:1.
pub const ROOT_NETUID: u16 = 0;

/// Subnets fetched per wave when building the registration cache.
pub const NEURON_BATCH_SIZE: usize = 25;

/// Fallback existential deposit in RAO when the chain constant can't be read.
pub const DEFAULT_EXISTENTIAL_DEPOSIT: u128 = 500;

/// Currency symbols
pub const TAO_SYMBOL: char = '\u{03C4}'; // τ
pub const ALPHA_SYMBOL: char = '\u{03B1}'; // α

/// Network names
pub const NETWORK_FINNEY: &str = "finney";
pub const NETWORK_TEST: &str = "test";
pub const NETWORK_ARCHIVE: &str = "archive";
pub const NETWORK_LOCAL: &str = "local";

/// Default network
pub const DEFAULT_NETWORK: &str = NETWORK_FINNEY;

/// Network endpoints
pub const FINNEY_ENDPOINT: &str = "wss://entrypoint-finney.opentensor.ai:443";
pub const FINNEY_TEST_ENDPOINT: &str = "wss://test.finney.opentensor.ai:443";
pub const ARCHIVE_ENDPOINT: &str = "wss://archive.chain.opentensor.ai:443";
pub const LOCAL_ENDPOINT: &str = "ws://127.0.0.1:9944";

/// Default endpoint
pub const DEFAULT_ENDPOINT: &str = FINNEY_ENDPOINT;

/// Pallet names
pub const SUBTENSOR_MODULE: &str = "SubtensorModule";
pub const BALANCES_MODULE: &str = "Balances";
pub const SYSTEM_MODULE: &str = "System";

/// Runtime API names
pub const STAKE_INFO_API: &str = "StakeInfoRuntimeApi";
pub const SUBNET_INFO_API: &str = "SubnetInfoRuntimeApi";
pub const NEURON_INFO_API: &str = "NeuronInfoRuntimeApi";

/// Price feed endpoints
pub const BINANCE_TAO_PRICE_URL: &str =
    "https://api.binance.com/api/v3/ticker/price?symbol=TAOUSDT";
pub const COINGECKO_TAO_PRICE_URL: &str =
    "https://api.coingecko.com/api/v3/simple/price?ids=bittensor&vs_currencies=usd";
