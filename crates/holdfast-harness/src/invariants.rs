//! Invariant checks shared by scenario and property tests.

use holdfast_core::{Geometry, SurfaceRegistry};

use crate::backend::BackendCall;

/// At most one live surface is the home surface.
///
/// # Panics
///
/// Panics with `context` when the invariant is violated.
pub fn assert_at_most_one_home(registry: &SurfaceRegistry, context: &str) {
    let homes = registry.iter().filter(|surface| surface.is_home).count();
    assert!(homes <= 1, "home invariant violated ({context}): {homes} home surfaces");
    match registry.home() {
        Some(id) => assert!(
            registry.get(id).is_some_and(|surface| surface.is_home),
            "home invariant violated ({context}): stale home id {id}"
        ),
        None => assert_eq!(homes, 0, "home invariant violated ({context}): unindexed home"),
    }
}

/// Every geometry the backend was told to enforce equals the output's.
///
/// # Panics
///
/// Panics with `context` when any fullscreen call used another geometry.
pub fn assert_fullscreen_geometry(calls: &[BackendCall], expected: Geometry, context: &str) {
    for call in calls {
        if let BackendCall::Fullscreen { surface, geometry } = call {
            assert_eq!(
                *geometry, expected,
                "fullscreen invariant violated ({context}): surface {surface} got {geometry}"
            );
        }
    }
}
