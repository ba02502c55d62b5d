// Copyright (c) 2025 tempo contributors. All rights reserved.
// SPDX-License-Identifier: MIT

//! Concrete scheduled jobs registered with the dispatcher at startup.

pub mod heartbeat;
pub mod send_email;

pub use heartbeat::HeartbeatJob;
pub use send_email::SendTestEmailJob;
