//! Integration test suite for sitepipe.
//!
//! These tests run real targets against a temporary project tree and
//! check the files left in `dist/`.
//!
//! # Test Categories
//!
//! - `dev_build`: development pipeline outputs
//! - `prod_build`: production pipeline, staging cleanup and path rewriting
//! - `failure`: aborted sequences and missing inputs
//! - `ordering`: prerequisite, group and concatenation order
//! - `watch`: preview server and rebuild loop
//!
//! # CI Compatibility
//!
//! Style and script tools are replaced by an in-process fake toolchain, so
//! no Node tooling is needed.

mod fixtures;

mod dev_build;
mod failure;
mod ordering;
mod prod_build;
