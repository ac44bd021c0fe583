//! Cross-crate tests for the scan engine, driven by scripted collaborators.

pub mod fakes;

#[cfg(test)]
mod discovery;
