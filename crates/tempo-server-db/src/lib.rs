// Copyright (c) 2025 tempo contributors. All rights reserved.
// SPDX-License-Identifier: MIT

//! Database layer for tempo: pool creation, schema initialization, and
//! the email log repository.

pub mod email_log;
pub mod error;
pub mod pool;
pub mod schema;
pub mod testing;

pub use email_log::{EmailLogEntry, EmailLogRepository};
pub use error::{DbError, Result};
pub use pool::create_pool;
pub use schema::init_schema;
