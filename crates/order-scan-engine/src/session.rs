//! Per-session scan pipeline and its explicit state machine.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use order_scan_core::FrameView;
use order_scan_symbology::{DecodeConfig, DecodeError, Decoder};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::matcher::{match_code, MatchConfig, MatchError, MatchResult};
use crate::store::{OrderStore, OrderStoreError};
use crate::validate::{ValidationError, Validator, ValidatorConfig};

/// Stage of one scan pass.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanStage {
    Idle,
    Decoding,
    Validating,
    Matching,
    Done,
    Failed,
}

/// Legal stage transitions. Kept as an explicit table so the reachability
/// of `Failed` and the per-frame reset edges are auditable in one place.
const TRANSITIONS: &[(ScanStage, ScanStage)] = &[
    (ScanStage::Idle, ScanStage::Decoding),
    (ScanStage::Decoding, ScanStage::Validating),
    (ScanStage::Validating, ScanStage::Matching),
    (ScanStage::Matching, ScanStage::Done),
    // Per-frame resets: a frame-local failure re-arms the session.
    (ScanStage::Decoding, ScanStage::Idle),
    (ScanStage::Validating, ScanStage::Idle),
    (ScanStage::Matching, ScanStage::Idle),
    (ScanStage::Done, ScanStage::Idle),
    // Unrecoverable failures absorb from any active stage.
    (ScanStage::Idle, ScanStage::Failed),
    (ScanStage::Decoding, ScanStage::Failed),
    (ScanStage::Validating, ScanStage::Failed),
    (ScanStage::Matching, ScanStage::Failed),
];

impl ScanStage {
    /// Whether the transition `self -> next` is in the table.
    pub fn can_step(self, next: ScanStage) -> bool {
        TRANSITIONS.contains(&(self, next))
    }

    /// `Failed` never re-arms; `Done` does, between frames.
    pub fn is_terminal(self) -> bool {
        self == ScanStage::Failed
    }
}

/// What one frame produced.
///
/// Everything here is frame-local: after any of these the session is armed
/// for the next frame.
#[derive(Debug)]
pub enum FrameOutcome {
    /// Nothing readable in the frame. The surface keeps scanning.
    NoSymbol,
    /// Decode or lookup ran over its budget; retry on the next frame.
    TimedOut { budget: Duration },
    /// A payload was decoded but failed validation.
    Rejected { error: ValidationError },
    /// The pipeline ran to completion.
    Matched(MatchResult),
}

/// Errors that end up with the caller rather than in a [`FrameOutcome`].
#[derive(thiserror::Error, Debug)]
pub enum SessionError {
    /// The order store failed; the session is dead.
    #[error(transparent)]
    Store(#[from] OrderStoreError),

    /// A frame was submitted to a session already in `Failed`.
    #[error("scan session has already failed")]
    SessionFailed,

    /// The validator table failed to compile.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Configuration for a scan session.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default)]
    pub decode: DecodeConfig,
    #[serde(default)]
    pub validator: ValidatorConfig,
    #[serde(default)]
    pub matching: MatchConfig,
}

/// One scan session: a decoder, a validator, a match policy and a store
/// handle, plus the stage of the scan in flight.
///
/// Sessions own their pipeline and share no mutable state, so concurrent
/// camera callbacks get one session each. Backpressure is the caller's
/// job: submit a frame only when the previous call returned.
pub struct ScanSession<S: OrderStore> {
    decoder: Decoder,
    validator: Validator,
    matching: MatchConfig,
    store: S,
    stage: ScanStage,
}

impl<S: OrderStore> ScanSession<S> {
    /// Build a session from configuration and a store handle.
    pub fn new(config: SessionConfig, store: S) -> Result<Self, SessionError> {
        Ok(Self {
            decoder: Decoder::new(config.decode),
            validator: Validator::new(&config.validator)?,
            matching: config.matching,
            store,
            stage: ScanStage::Idle,
        })
    }

    /// Current stage.
    #[inline]
    pub fn stage(&self) -> ScanStage {
        self.stage
    }

    /// Store handle.
    #[inline]
    pub fn store(&self) -> &S {
        &self.store
    }

    fn step(&mut self, next: ScanStage) {
        debug_assert!(
            self.stage.can_step(next),
            "illegal scan transition {:?} -> {next:?}",
            self.stage
        );
        self.stage = next;
    }

    /// Run the full pipeline on one frame.
    ///
    /// Frame-local failures come back as a [`FrameOutcome`] with the
    /// session re-armed; a store failure moves the session to `Failed`
    /// permanently.
    #[cfg_attr(feature = "tracing", instrument(level = "info", skip(self, frame)))]
    pub fn process_frame(
        &mut self,
        frame: &FrameView<'_>,
    ) -> Result<FrameOutcome, SessionError> {
        if self.stage.is_terminal() {
            return Err(SessionError::SessionFailed);
        }

        self.step(ScanStage::Decoding);
        let symbols = match self.decoder.decode(frame) {
            Ok(symbols) => symbols,
            Err(DecodeError::Timeout { budget }) => {
                self.step(ScanStage::Idle);
                return Ok(FrameOutcome::TimedOut { budget });
            }
            Err(DecodeError::InvalidFrame(err)) => {
                // Unreachable through a validated FrameView; kept for the
                // raw-buffer entry points.
                self.step(ScanStage::Idle);
                log::warn!("invalid frame submitted to scan session: {err}");
                return Ok(FrameOutcome::NoSymbol);
            }
        };

        let Some(symbol) = symbols.into_iter().next() else {
            self.step(ScanStage::Idle);
            return Ok(FrameOutcome::NoSymbol);
        };

        self.step(ScanStage::Validating);
        let code = match self.validator.validate(&symbol) {
            Ok(code) => code,
            Err(error) => {
                self.step(ScanStage::Idle);
                return Ok(FrameOutcome::Rejected { error });
            }
        };

        self.step(ScanStage::Matching);
        let result = match match_code(&code, &self.store, &self.matching) {
            Ok(result) => result,
            Err(MatchError::LookupTimeout { budget }) => {
                self.step(ScanStage::Idle);
                return Ok(FrameOutcome::TimedOut { budget });
            }
            Err(MatchError::Store(err)) => {
                self.step(ScanStage::Failed);
                return Err(SessionError::Store(err));
            }
        };

        self.step(ScanStage::Done);
        self.step(ScanStage::Idle);
        Ok(FrameOutcome::Matched(result))
    }
}
