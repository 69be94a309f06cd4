// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
pub mod agent;
pub mod api;
pub mod config;
pub mod errors;
pub mod events;
pub mod mailbox;
pub mod network;
pub mod receiver;
pub mod source;
pub mod telemetry;
