//! Shared test utilities

#![allow(dead_code)]

mod fakes;

pub use fakes::{CheckoutEvent, FakeCheckout, FakeQuery, gauge_value};
