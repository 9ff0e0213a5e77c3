//! Unit tests for annotation format implementations.
//!
//! These tests verify the ISI layout, header and tag tolerance, and
//! export/import round trips.

mod roundtrip_tests;
