//! Test module for hopper-core
//!
//! This module contains tests for:
//! - Per-source query pipeline ordering and degradation
//! - Category cache TTL, eviction, and failure absorption
//! - Categorization orchestration (flags, cache, classifier, merge)
//! - Grid navigation clamping and window slides
//! - Palette session debounce, stale guard, and activation flow
//! - Settings snapshot loading and change folding

mod pipeline_tests;
