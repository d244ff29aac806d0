//! Integration test suite for flowstate.
//!
//! These tests drive the public service API the way a transport layer
//! would: register definitions, start instances, execute actions.
//!
//! # Test Categories
//!
//! - `scenarios`: document-review walkthroughs and rejection cases
//! - `concurrency`: shared registry and engine under parallel callers
//! - `properties`: randomized checks of the transition invariants
//! - `files`: definitions loaded from JSON and TOML on disk


mod concurrency;
mod scenarios;
