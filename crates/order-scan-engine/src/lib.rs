//! Scan-to-order pipeline: validate decoded payloads, match them against an
//! order store, and drive the per-session state machine.
//!
//! The decode half lives in `order-scan-symbology`; this crate owns what
//! happens after a payload exists. See [`ScanSession`] for the per-frame
//! entry point.

mod matcher;
mod session;
mod store;
mod validate;

pub use matcher::{match_code, MatchConfig, MatchError, MatchReason, MatchResult};
pub use session::{FrameOutcome, ScanSession, ScanStage, SessionConfig, SessionError};
pub use store::{
    InMemoryOrderStore, OrderRecord, OrderStatus, OrderStore, OrderStoreError, StoreIoError,
};
pub use validate::{
    CodePattern, CodeType, NormalizeRule, ValidatedCode, ValidationError, Validator,
    ValidatorConfig,
};
