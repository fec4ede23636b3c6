//! jbridge Benchmarks
//!
//! This crate contains performance benchmarks for the conversion dispatchers.
//! Run with: cargo bench -p jbridge-benchmarks

// This file exists only to satisfy Cargo's requirement for a lib target.
// The actual benchmarks are in benches/dispatch_benchmarks.rs
