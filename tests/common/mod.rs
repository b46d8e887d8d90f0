//! In-memory chain backend for integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use btmanager::chain::connection::Connector;
use btmanager::chain::{
    CallDescriptor, ChainRpc, Error as ChainError, ExtrinsicReceipt, KeySigner, SubmitError,
    SubmitOptions,
};
use btmanager::{ss58_decode, ss58_encode, ChainConnection};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use subxt::dynamic::Value;
use subxt::utils::H256;

/// Canned answer for one read.
#[derive(Debug, Clone)]
pub enum Reply {
    Value(Value),
    /// Storage key without a value
    Empty,
    /// Transient RPC failure
    Fail(String),
}

/// Scripted node. Reads are answered from exact keys first
/// (`"Module.entry:{keys:?}"`), then from the bare `"Module.entry"`.
/// Unknown reads fail.
#[derive(Default)]
pub struct MockRpc {
    pub url: String,
    replies: Mutex<HashMap<String, Reply>>,
    entries: Mutex<HashMap<String, Vec<(Vec<Value>, Value)>>>,
    constants: Mutex<HashMap<String, Value>>,
    block: Mutex<Option<u64>>,
    receipts: Mutex<VecDeque<Result<ExtrinsicReceipt, SubmitError>>>,
    submitted: Mutex<Vec<CallDescriptor>>,
    calls: Mutex<Vec<String>>,
    delay: Mutex<Option<Duration>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    broken: Mutex<bool>,
}

pub fn keyed(path: &str, keys: &[Value]) -> String {
    format!("{path}:{keys:?}")
}

impl MockRpc {
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            ..Default::default()
        }
    }

    pub fn reply(&self, path: &str, reply: Reply) -> &Self {
        self.replies.lock().unwrap().insert(path.to_string(), reply);
        self
    }

    pub fn reply_for(&self, path: &str, keys: &[Value], reply: Reply) -> &Self {
        self.reply(&keyed(path, keys), reply)
    }

    pub fn entries(&self, path: &str, entries: Vec<(Vec<Value>, Value)>) -> &Self {
        self.entries
            .lock()
            .unwrap()
            .insert(path.to_string(), entries);
        self
    }

    pub fn constant(&self, path: &str, value: Value) -> &Self {
        self.constants
            .lock()
            .unwrap()
            .insert(path.to_string(), value);
        self
    }

    pub fn set_block(&self, block: u64) {
        *self.block.lock().unwrap() = Some(block);
    }

    pub fn push_receipt(&self, receipt: Result<ExtrinsicReceipt, SubmitError>) {
        self.receipts.lock().unwrap().push_back(receipt);
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    /// Make every read fail with a transient error.
    pub fn set_broken(&self, broken: bool) {
        *self.broken.lock().unwrap() = broken;
    }

    pub fn submitted(&self) -> Vec<CallDescriptor> {
        self.submitted.lock().unwrap().clone()
    }

    /// Paths of every read, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self, path: &str) -> usize {
        self.calls().iter().filter(|c| c.as_str() == path).count()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    async fn answer(&self, path: String, keys: &[Value]) -> Result<Option<Value>, ChainError> {
        self.calls.lock().unwrap().push(path.clone());
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);
        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if *self.broken.lock().unwrap() {
            return Err(ChainError::Rpc(format!("{} is down", self.url)));
        }
        let replies = self.replies.lock().unwrap();
        let reply = replies
            .get(&keyed(&path, keys))
            .or_else(|| replies.get(&path))
            .cloned();
        match reply {
            Some(Reply::Value(v)) => Ok(Some(v)),
            Some(Reply::Empty) => Ok(None),
            Some(Reply::Fail(msg)) => Err(ChainError::Rpc(msg)),
            None => Err(ChainError::Rpc(format!("no reply scripted for {path}"))),
        }
    }
}

#[async_trait]
impl ChainRpc for MockRpc {
    fn endpoint(&self) -> String {
        self.url.clone()
    }

    async fn storage(
        &self,
        module: &str,
        entry: &str,
        keys: Vec<Value>,
    ) -> Result<Option<Value>, ChainError> {
        self.answer(format!("{module}.{entry}"), &keys).await
    }

    async fn storage_entries(
        &self,
        module: &str,
        entry: &str,
    ) -> Result<Vec<(Vec<Value>, Value)>, ChainError> {
        let path = format!("{module}.{entry}");
        self.calls.lock().unwrap().push(path.clone());
        if *self.broken.lock().unwrap() {
            return Err(ChainError::Rpc(format!("{} is down", self.url)));
        }
        self.entries
            .lock()
            .unwrap()
            .get(&path)
            .cloned()
            .ok_or_else(|| ChainError::Rpc(format!("no entries scripted for {path}")))
    }

    async fn runtime_api(
        &self,
        api: &str,
        method: &str,
        params: Vec<Value>,
    ) -> Result<Value, ChainError> {
        self.answer(format!("{api}.{method}"), &params)
            .await?
            .ok_or_else(|| ChainError::Decoding(format!("{api}.{method} returned nothing")))
    }

    async fn constant(&self, pallet: &str, name: &str) -> Result<Value, ChainError> {
        let path = format!("{pallet}.{name}");
        self.constants
            .lock()
            .unwrap()
            .get(&path)
            .cloned()
            .ok_or_else(|| ChainError::Rpc(format!("no constant {path}")))
    }

    async fn chain_head(&self) -> Result<H256, ChainError> {
        if *self.broken.lock().unwrap() {
            return Err(ChainError::Rpc(format!("{} is down", self.url)));
        }
        match *self.block.lock().unwrap() {
            Some(_) => Ok(H256::repeat_byte(0xab)),
            None => Err(ChainError::Rpc("no head".into())),
        }
    }

    async fn block_number(&self, _hash: H256) -> Result<Option<u64>, ChainError> {
        Ok(*self.block.lock().unwrap())
    }

    async fn submit_extrinsic(
        &self,
        call: &CallDescriptor,
        _signer: &dyn KeySigner,
        _options: &SubmitOptions,
    ) -> Result<ExtrinsicReceipt, SubmitError> {
        self.submitted.lock().unwrap().push(call.clone());
        self.receipts
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(ExtrinsicReceipt::included("0xfeed", "0xb10c", vec![])))
    }
}

/// Hands out scripted backends by URL; unknown or `down` URLs are refused.
#[derive(Default)]
pub struct MockConnector {
    backends: HashMap<String, Arc<MockRpc>>,
    down: Mutex<HashSet<String>>,
    attempts: Mutex<Vec<String>>,
}

impl MockConnector {
    pub fn new(backends: Vec<Arc<MockRpc>>) -> Self {
        Self {
            backends: backends
                .into_iter()
                .map(|rpc| (rpc.url.clone(), rpc))
                .collect(),
            ..Default::default()
        }
    }

    pub fn take_down(&self, url: &str) {
        self.down.lock().unwrap().insert(url.to_string());
    }

    pub fn attempts(&self) -> Vec<String> {
        self.attempts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Connector for MockConnector {
    async fn connect(&self, url: &str) -> Result<Arc<dyn ChainRpc>, ChainError> {
        self.attempts.lock().unwrap().push(url.to_string());
        if self.down.lock().unwrap().contains(url) {
            return Err(ChainError::Rpc(format!("{url} refused connection")));
        }
        match self.backends.get(url) {
            Some(rpc) => Ok(Arc::clone(rpc) as Arc<dyn ChainRpc>),
            None => Err(ChainError::Rpc(format!("{url} unknown"))),
        }
    }
}

pub fn connected(rpc: &Arc<MockRpc>) -> ChainConnection {
    ChainConnection::from_rpc(Arc::clone(rpc) as Arc<dyn ChainRpc>)
}

/// Deterministic test address.
pub fn address(seed: u8) -> String {
    ss58_encode(&[seed; 32])
}

/// Storage key / call argument for an address, as the library encodes it.
pub fn account_key(address: &str) -> Value {
    Value::from_bytes(ss58_decode(address).unwrap())
}

pub fn netuid_key(netuid: u16) -> Value {
    Value::u128(netuid as u128)
}

pub fn account_info(free: u128) -> Value {
    Value::named_composite([
        ("nonce", Value::u128(0)),
        (
            "data",
            Value::named_composite([
                ("free", Value::u128(free)),
                ("reserved", Value::u128(0)),
                ("frozen", Value::u128(0)),
            ]),
        ),
    ])
}

/// Fixed-point price in the chain's `{ bits }` form.
pub fn price_bits(price: f64) -> Value {
    Value::named_composite([("bits", Value::u128((price * 4_294_967_296.0) as u128))])
}

pub fn dynamic_info(netuid: u16, name: &str, price: f64, tempo: u64) -> Value {
    Value::named_composite([
        ("netuid", Value::u128(netuid as u128)),
        ("tempo", Value::u128(tempo as u128)),
        ("tao_in", Value::u128(1_000_000_000_000)),
        ("alpha_in", Value::u128(2_000_000_000_000)),
        ("alpha_out", Value::u128(3_000_000_000_000)),
        ("moving_price", price_bits(price)),
        ("token_symbol", Value::from_bytes("α".as_bytes())),
        ("subnet_name", Value::from_bytes(name.as_bytes())),
        ("owner_coldkey", Value::from_bytes([1u8; 32])),
        ("owner_hotkey", Value::from_bytes([2u8; 32])),
    ])
}

pub fn stake_info(hotkey: &str, coldkey: &str, netuid: u16, stake: u128) -> Value {
    Value::named_composite([
        ("hotkey", account_key(hotkey)),
        ("coldkey", account_key(coldkey)),
        ("netuid", Value::u128(netuid as u128)),
        ("stake", Value::u128(stake)),
        ("emission", Value::u128(0)),
        ("tao_emission", Value::u128(0)),
        ("is_registered", Value::bool(false)),
    ])
}

pub fn neuron_lite(hotkey: &str, netuid: u16, uid: u16, emission: u128, incentive: u16) -> Value {
    Value::named_composite([
        ("hotkey", account_key(hotkey)),
        ("coldkey", Value::from_bytes([0u8; 32])),
        ("netuid", Value::u128(netuid as u128)),
        ("uid", Value::u128(uid as u128)),
        ("emission", Value::u128(emission)),
        ("incentive", Value::u128(incentive as u128)),
        ("active", Value::bool(true)),
        ("validator_permit", Value::bool(false)),
    ])
}

pub fn list(values: Vec<Value>) -> Value {
    Value::unnamed_composite(values)
}
