//! Unit tests for message port services.

mod helpers;
mod send_tests;
