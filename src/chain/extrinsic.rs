//! Extrinsic submission protocol.
//!
//! Every mutating operation goes through the same pipeline:
//! compose a [`CallDescriptor`], sign it with the caller's coldkey, submit,
//! optionally wait for inclusion or finalization, then classify the result.
//! [`compose_and_submit_checked`] never returns an error: whatever happens is
//! folded into an [`ExtrinsicOutcome`] carrying `(success, error)`.
//!
//! Failed submissions are not retried here.

use crate::chain::{ChainConnection, KeySigner};
use crate::errors::ExtrinsicFailure;
use serde::Serialize;
use std::fmt;
use subxt::dynamic::Value;
use subxt::ext::scale_value::Composite;
use thiserror::Error;
use tracing::{debug, error, info};

/// A runtime call, addressed by pallet and function with named parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct CallDescriptor {
    pub pallet: String,
    pub function: String,
    pub params: Vec<(String, Value)>,
}

impl CallDescriptor {
    pub fn new(pallet: impl Into<String>, function: impl Into<String>) -> Self {
        Self {
            pallet: pallet.into(),
            function: function.into(),
            params: Vec::new(),
        }
    }

    /// Append a named parameter.
    pub fn param(mut self, name: impl Into<String>, value: Value) -> Self {
        self.params.push((name.into(), value));
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.params
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Call fields in the shape subxt's dynamic encoder expects.
    pub fn fields(&self) -> Composite<()> {
        Composite::named(self.params.clone())
    }
}

impl fmt::Display for CallDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.pallet, self.function)
    }
}

/// Waiting and signing options for one submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitOptions {
    pub wait_for_inclusion: bool,
    pub wait_for_finalization: bool,
    /// Explicit nonce; fetched from the chain when `None`.
    pub nonce: Option<u64>,
    /// Mortality in blocks; immortal when `None`.
    pub era_period: Option<u64>,
}

impl Default for SubmitOptions {
    fn default() -> Self {
        Self {
            wait_for_inclusion: true,
            wait_for_finalization: false,
            nonce: None,
            era_period: None,
        }
    }
}

impl SubmitOptions {
    pub fn finalized() -> Self {
        Self {
            wait_for_finalization: true,
            ..Self::default()
        }
    }

    pub fn fire_and_forget() -> Self {
        Self {
            wait_for_inclusion: false,
            ..Self::default()
        }
    }

    pub fn with_nonce(mut self, nonce: u64) -> Self {
        self.nonce = Some(nonce);
        self
    }

    pub fn with_era_period(mut self, period: u64) -> Self {
        self.era_period = Some(period);
        self
    }

    pub fn waits(&self) -> bool {
        self.wait_for_inclusion || self.wait_for_finalization
    }
}

/// An event emitted by the extrinsic, with its fields in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct ChainEvent {
    pub pallet: String,
    pub variant: String,
    pub fields: Vec<(Option<String>, Value)>,
}

impl ChainEvent {
    pub fn is(&self, pallet: &str, variant: &str) -> bool {
        self.pallet == pallet && self.variant == variant
    }

    /// Field by name, falling back to its position for tuple-style events.
    pub fn field(&self, name: &str, index: usize) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(n, _)| n.as_deref() == Some(name))
            .or_else(|| self.fields.get(index))
            .map(|(_, v)| v)
    }
}

/// How the chain dispatched an included extrinsic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Success,
    Failed(String),
    /// Submitted without waiting; nothing is known yet.
    Unknown,
}

/// What the node reported back for a submitted extrinsic.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtrinsicReceipt {
    pub extrinsic_hash: String,
    pub block_hash: Option<String>,
    pub dispatch: DispatchOutcome,
    pub events: Vec<ChainEvent>,
}

impl ExtrinsicReceipt {
    /// Receipt for a submission that did not wait for inclusion.
    pub fn pending(extrinsic_hash: impl Into<String>) -> Self {
        Self {
            extrinsic_hash: extrinsic_hash.into(),
            block_hash: None,
            dispatch: DispatchOutcome::Unknown,
            events: Vec::new(),
        }
    }

    /// Receipt for an extrinsic included in `block_hash` that dispatched
    /// successfully.
    pub fn included(
        extrinsic_hash: impl Into<String>,
        block_hash: impl Into<String>,
        events: Vec<ChainEvent>,
    ) -> Self {
        Self {
            extrinsic_hash: extrinsic_hash.into(),
            block_hash: Some(block_hash.into()),
            dispatch: DispatchOutcome::Success,
            events,
        }
    }

    pub fn failed(
        extrinsic_hash: impl Into<String>,
        block_hash: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            extrinsic_hash: extrinsic_hash.into(),
            block_hash: Some(block_hash.into()),
            dispatch: DispatchOutcome::Failed(error.into()),
            events: Vec::new(),
        }
    }

    /// Not-failed counts as success, matching a submission that was not
    /// awaited.
    pub fn is_success(&self) -> bool {
        !matches!(self.dispatch, DispatchOutcome::Failed(_))
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.dispatch {
            DispatchOutcome::Failed(e) => Some(e),
            _ => None,
        }
    }
}

/// Pipeline step at which a submission broke off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SubmissionStep {
    Connect,
    Compose,
    Sign,
    Submit,
    AwaitInclusion,
}

impl fmt::Display for SubmissionStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SubmissionStep::Connect => "connect",
            SubmissionStep::Compose => "compose",
            SubmissionStep::Sign => "sign",
            SubmissionStep::Submit => "submit",
            SubmissionStep::AwaitInclusion => "await inclusion",
        };
        f.write_str(s)
    }
}

/// A submission that never produced a receipt.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct SubmitError {
    pub step: SubmissionStep,
    pub message: String,
}

impl SubmitError {
    pub fn new(step: SubmissionStep, message: impl fmt::Display) -> Self {
        Self {
            step,
            message: message.to_string(),
        }
    }
}

/// Terminal state of one submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SubmissionStatus {
    /// Submitted without waiting for a block.
    Submitted,
    IncludedSuccess,
    IncludedFailure,
    SubmitError,
    /// Rejected locally before anything was sent.
    PreconditionFailed,
}

/// `(success, error)` verdict for a mutating operation.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtrinsicOutcome {
    pub success: bool,
    pub error: Option<String>,
    pub status: SubmissionStatus,
    pub receipt: Option<ExtrinsicReceipt>,
}

impl ExtrinsicOutcome {
    pub fn from_receipt(receipt: ExtrinsicReceipt) -> Self {
        match &receipt.dispatch {
            DispatchOutcome::Success => Self {
                success: true,
                error: None,
                status: SubmissionStatus::IncludedSuccess,
                receipt: Some(receipt),
            },
            DispatchOutcome::Unknown => Self {
                success: true,
                error: None,
                status: SubmissionStatus::Submitted,
                receipt: Some(receipt),
            },
            DispatchOutcome::Failed(e) => {
                let error = if e.is_empty() {
                    "Unknown error".to_string()
                } else {
                    e.clone()
                };
                Self {
                    success: false,
                    error: Some(error),
                    status: SubmissionStatus::IncludedFailure,
                    receipt: Some(receipt),
                }
            }
        }
    }

    pub fn submit_error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(message.into()),
            status: SubmissionStatus::SubmitError,
            receipt: None,
        }
    }

    pub fn precondition_failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(message.into()),
            status: SubmissionStatus::PreconditionFailed,
            receipt: None,
        }
    }

    /// The `(success, error)` pair.
    pub fn as_pair(&self) -> (bool, Option<&str>) {
        (self.success, self.error.as_deref())
    }

    /// `Ok` on success, otherwise the failure attributed to `pallet.call`.
    pub fn check(&self, pallet: &str, call: &str) -> Result<(), ExtrinsicFailure> {
        if self.success {
            return Ok(());
        }
        let message = self.error.as_deref().unwrap_or("Unknown error");
        Err(ExtrinsicFailure::new(message, pallet, call))
    }

    pub fn events(&self) -> &[ChainEvent] {
        self.receipt
            .as_ref()
            .map(|r| r.events.as_slice())
            .unwrap_or_default()
    }
}

/// Submit a call and return the node's receipt.
///
/// Errors when not connected or when the call never reached a block. A
/// receipt is returned even if the chain rejected the call at dispatch.
pub async fn compose_and_submit(
    conn: &ChainConnection,
    call: &CallDescriptor,
    signer: &dyn KeySigner,
    options: &SubmitOptions,
) -> Result<ExtrinsicReceipt, SubmitError> {
    let rpc = conn
        .rpc()
        .map_err(|e| SubmitError::new(SubmissionStep::Connect, e))?;
    debug!(
        call = %call,
        signer = %signer.ss58_address(),
        nonce = ?options.nonce,
        "Submitting extrinsic"
    );
    rpc.submit_extrinsic(call, signer, options).await
}

/// Submit a call and fold every outcome into a `(success, error)` verdict.
pub async fn compose_and_submit_checked(
    conn: &ChainConnection,
    call: &CallDescriptor,
    signer: &dyn KeySigner,
    options: &SubmitOptions,
) -> ExtrinsicOutcome {
    match compose_and_submit(conn, call, signer, options).await {
        Ok(receipt) => {
            let outcome = ExtrinsicOutcome::from_receipt(receipt);
            match &outcome.error {
                None => info!(call = %call, status = ?outcome.status, "Extrinsic accepted"),
                Some(e) => error!(call = %call, error = %e, "Extrinsic failed on chain"),
            }
            outcome
        }
        Err(e) => {
            error!(call = %call, step = %e.step, error = %e.message, "Extrinsic not submitted");
            ExtrinsicOutcome::submit_error(e.message)
        }
    }
}
