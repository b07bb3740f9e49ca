// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Plugin-boundary protocol between the plugin host and the provider.
//!
//! Wire format: 4-byte length prefix (big-endian) + JSON payload.
//! Every frame is an [`Envelope`] whose `id` pairs a response with its
//! request, so several operations can be in flight at once.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod request;
mod response;
mod wire;

pub use request::{Envelope, Request};
pub use response::Response;
pub use wire::{decode, encode, read_message, write_message, ProtocolError, MAX_MESSAGE_LEN};
pub use wire::{read_envelope, write_envelope};
