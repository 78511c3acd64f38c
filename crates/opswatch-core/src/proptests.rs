//! Property-based tests for record normalization.
