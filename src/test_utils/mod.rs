#![allow(missing_docs)]

pub(crate) mod http;
pub(crate) mod stores;

pub(crate) use http::{get_test_server, log_in};
pub(crate) use stores::{FailingLedger, FakeBudgetStore, FakeLedger};
