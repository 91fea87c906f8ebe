//! Shared test harness modules for the relaxroute CLI.

use super::*;

#[cfg(unix)]
mod compare_steps;
mod helpers;
mod unit;
