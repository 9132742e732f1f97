//! Vital-signs monitoring engine
//!
//! Turns a stream of camera frames (or pre-reduced brightness samples) into
//! heart-rate readings with zone classification and per-session statistics.
//! Camera access, rendering, and persistence live in the host application;
//! this crate is pure signal plumbing.

pub mod config;
pub mod session;
pub mod vitals;
