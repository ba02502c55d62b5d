// Copyright (c) 2025 tempo contributors. All rights reserved.
// SPDX-License-Identifier: MIT

//! Configuration sections, each with a resolved struct and a partial
//! `*Layer` counterpart used during merging.

pub mod database;
pub mod email;
pub mod http;
pub mod logging;
pub mod scheduler;
pub mod smtp;

pub use database::{DatabaseConfig, DatabaseConfigLayer};
pub use email::{EmailConfig, EmailConfigLayer};
pub use http::{HttpConfig, HttpConfigLayer};
pub use logging::{LoggingConfig, LoggingConfigLayer};
pub use scheduler::{SchedulerConfig, SchedulerConfigLayer};
pub use smtp::SmtpConfigLayer;
