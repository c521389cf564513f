//! CLI subcommand modules.
//!
//! This module contains the implementations for all ronda CLI subcommands.

pub(crate) mod calendar;
pub(crate) mod compute;
pub(crate) mod delete;
pub(crate) mod factors;
pub(crate) mod update;
