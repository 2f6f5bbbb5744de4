//! Primary key generation.
//!
//! Ids look like `pay-0190f5a2b1c47d3e8f00112233445566`: a fixed prefix, then a
//! UUIDv7 in lowercase hex. The first 48 bits of a v7 UUID are the Unix
//! timestamp in milliseconds and the uuid crate keeps a process-wide counter
//! behind `now_v7`, so ids from one process sort in creation order. Stores
//! order by id and the pagination cursor is derived from it.

use uuid::Uuid;

pub const PAYMENT_PREFIX: &str = "pay";
pub const PAYMENT_SETTING_PREFIX: &str = "pset";

pub fn generate_pk(prefix: &str) -> String {
    format!("{}-{}", prefix, Uuid::now_v7().simple())
}
