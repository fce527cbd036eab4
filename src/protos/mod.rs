//! Hand-declared subset of the Hyperledger Fabric protobuf schema.
//!
//! Only the messages and fields the gateway client reads or writes are
//! declared; tags match the upstream `.proto` files so unknown fields are
//! skipped on decode.

pub mod common;
pub mod gateway;
pub mod msp;
pub mod peer;
