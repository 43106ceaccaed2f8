// src/lib.rs
pub mod config;
pub mod document;
pub mod error;
pub mod ledger;
pub mod logging;
pub mod pipeline;
pub mod sinks;
pub mod soap;
pub mod system_code;
pub mod worker;

pub use error::*;
pub use pipeline::*;

pub use document::{Record, Row, SourceDocument};
pub use ledger::{FailureLedger, ResumeSet};
pub use sinks::{Dispatcher, LiveDispatcher};
pub use system_code::SystemCodeTable;
