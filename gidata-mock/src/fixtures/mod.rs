//! Canned identifiers and payload builders shared by driver tests.

use uuid::Uuid;

/// GraphQL response builders.
pub mod gql;
/// REST response builders.
pub mod rest;

/// Buffer source used throughout the fixtures.
pub const SID: Uuid = Uuid::from_u128(0x0000_0000_0000_4000_8000_0000_0000_00a1);
/// Second buffer source.
pub const SID_2: Uuid = Uuid::from_u128(0x0000_0000_0000_4000_8000_0000_0000_00a2);
/// Variable of [`SID`].
pub const VID: Uuid = Uuid::from_u128(0x0000_0000_0000_4000_8000_0000_0000_0b01);
/// Second variable of [`SID`].
pub const VID_2: Uuid = Uuid::from_u128(0x0000_0000_0000_4000_8000_0000_0000_0b02);
/// Variable of [`SID_2`].
pub const VID_3: Uuid = Uuid::from_u128(0x0000_0000_0000_4000_8000_0000_0000_0b03);
/// Fixed "now" of the fixture clock.
pub const NOW_MS: f64 = 1_650_000_000_000.0;
