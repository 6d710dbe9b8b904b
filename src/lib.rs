//! `MealBuddy` - recommendation and analytics core of a food-ordering service
//!
//! This crate suggests meals from order history, cart contents and dietary
//! preferences, computes the admin dashboard figures, and keeps the order,
//! payment and preference records they are computed from.

// Deny the most critical lints that could lead to bugs or security issues
#![deny(
    // Security and correctness
    unsafe_code,
    unsafe_op_in_unsafe_fn,

    // Code quality - things that are almost always bugs
    unreachable_code,
    unreachable_patterns,
    unused_must_use,

    // Documentation - broken links are bugs
    rustdoc::broken_intra_doc_links,
    rustdoc::private_intra_doc_links,
)]
// Warn on things that should be fixed but aren't necessarily bugs
#![warn(
    missing_docs,

    // Clippy categories for overall code quality
    clippy::all,
    clippy::pedantic,
    clippy::nursery,

    // Performance
    clippy::inefficient_to_string,
    clippy::large_types_passed_by_value,
    clippy::needless_pass_by_value,
    clippy::unnecessary_wraps,

    // Correctness
    clippy::clone_on_ref_ptr,
    clippy::dbg_macro,
    clippy::exit,
    clippy::expect_used,
    clippy::float_cmp,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::unwrap_used,

    // Complexity and readability
    clippy::cognitive_complexity,
    clippy::large_enum_variant,
    clippy::match_same_arms,
    clippy::too_many_lines,

    // Style consistency
    clippy::enum_glob_use,
    clippy::inconsistent_struct_constructor,
    clippy::must_use_candidate,
    clippy::redundant_closure_for_method_calls,
    clippy::semicolon_if_nothing_returned,
    clippy::wildcard_imports,

    future_incompatible,
    rust_2018_idioms,
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,        // Will add gradually
    clippy::missing_panics_doc,
)]

/// Configuration management for storage and admin settings
pub mod config;
/// Core business logic - recommendations, dashboard analytics and record keeping
pub mod core;
/// `SeaORM` entity definitions for the `SQLite` backend
pub mod entities;
/// Unified error types and result handling
pub mod errors;
/// Record types persisted in the collections
pub mod models;
/// Whole-collection storage backends
pub mod store;

#[cfg(test)]
pub mod test_utils;
