// Copyright (c) 2025 tempo contributors. All rights reserved.
// SPDX-License-Identifier: MIT

//! tempo server library: HTTP surface, email service, and the concrete
//! scheduled jobs wired together by the binary in `main.rs`.

pub mod email;
pub mod jobs;
pub mod routes;

pub use routes::{create_router, AppState};
