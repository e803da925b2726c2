//! Surface registry: the authoritative set of live client windows.
//!
//! Tracks every surface the backend has announced, its visibility, and
//! which one (at most) is the home application's window. All mutation
//! happens synchronously on the event-loop thread, so no locking is
//! required.
//!
//! # Invariant
//!
//! At most one live surface has `is_home == true`. [`on_created`] enforces
//! this regardless of what the caller claims.
//!
//! [`on_created`]: SurfaceRegistry::on_created

use std::collections::HashMap;

use crate::event::{Pid, SurfaceId};

/// One live client window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Surface {
    /// Backend-native handle.
    pub id: SurfaceId,
    /// Owning process, when the backend reported one.
    pub owner: Option<Pid>,
    /// Whether the backend has signaled the surface visible.
    pub mapped: bool,
    /// Whether this is the home application's window.
    pub is_home: bool,
}

/// Home attribution offered for a newly created surface.
///
/// Computed by the session from supervisor state; the registry applies it
/// only when no home surface currently exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HomeClaim {
    /// The surface is home iff its reported owner matches this pid.
    OwnerPid(Pid),
    /// The backend reports no pids and a supervised launch is awaiting its
    /// first surface; this one takes the attribution.
    FirstSurface,
    /// No pending claim.
    None,
}

/// Registry of live surfaces in creation order.
#[derive(Debug, Default)]
pub struct SurfaceRegistry {
    surfaces: HashMap<SurfaceId, Surface>,
    /// Creation order, oldest first. Drives most-recently-created refocus.
    order: Vec<SurfaceId>,
    home: Option<SurfaceId>,
}

impl SurfaceRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new surface and resolve its home attribution.
    ///
    /// Returns `true` iff the surface was attributed as home. A duplicate
    /// create for a known id is ignored (stale protocol race) and returns
    /// `false`.
    pub fn on_created(&mut self, id: SurfaceId, owner: Option<Pid>, claim: HomeClaim) -> bool {
        if self.surfaces.contains_key(&id) {
            tracing::debug!(surface = %id, "duplicate create for known surface, ignoring");
            return false;
        }

        let is_home = self.home.is_none()
            && match claim {
                HomeClaim::OwnerPid(pid) => owner == Some(pid),
                HomeClaim::FirstSurface => true,
                HomeClaim::None => false,
            };

        self.surfaces.insert(id, Surface { id, owner, mapped: false, is_home });
        self.order.push(id);
        if is_home {
            self.home = Some(id);
        }
        is_home
    }

    /// Mark a surface visible. Returns `false` for unknown ids.
    pub fn on_mapped(&mut self, id: SurfaceId) -> bool {
        match self.surfaces.get_mut(&id) {
            Some(surface) => {
                surface.mapped = true;
                true
            },
            None => false,
        }
    }

    /// Mark a surface invisible. Returns `false` for unknown ids.
    ///
    /// An unmap is not a destroy: the surface stays registered (and stays
    /// home, if it was) until the backend reports destruction.
    pub fn on_unmapped(&mut self, id: SurfaceId) -> bool {
        match self.surfaces.get_mut(&id) {
            Some(surface) => {
                surface.mapped = false;
                true
            },
            None => false,
        }
    }

    /// Remove a destroyed surface, returning its final state.
    ///
    /// `None` for unknown ids: destroy events for surfaces that were never
    /// announced (or already removed) are a normal protocol race.
    pub fn on_destroyed(&mut self, id: SurfaceId) -> Option<Surface> {
        let surface = self.surfaces.remove(&id)?;
        self.order.retain(|other| *other != id);
        if self.home == Some(id) {
            self.home = None;
        }
        Some(surface)
    }

    /// All surface ids except `excluded`, in creation order.
    pub fn all_except(&self, excluded: Option<SurfaceId>) -> Vec<SurfaceId> {
        self.order.iter().copied().filter(|id| Some(*id) != excluded).collect()
    }

    /// The home surface, if one currently exists.
    pub fn home(&self) -> Option<SurfaceId> {
        self.home
    }

    /// The most recently created surface, if any.
    pub fn most_recent(&self) -> Option<SurfaceId> {
        self.order.last().copied()
    }

    /// Look up a surface by id.
    pub fn get(&self, id: SurfaceId) -> Option<&Surface> {
        self.surfaces.get(&id)
    }

    /// Whether a surface is currently registered.
    pub fn contains(&self, id: SurfaceId) -> bool {
        self.surfaces.contains_key(&id)
    }

    /// Ids of all mapped surfaces, in creation order.
    pub fn mapped(&self) -> impl Iterator<Item = SurfaceId> + '_ {
        self.order.iter().copied().filter(|id| self.surfaces.get(id).is_some_and(|s| s.mapped))
    }

    /// All live surfaces, in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &Surface> + '_ {
        self.order.iter().filter_map(|id| self.surfaces.get(id))
    }

    /// Number of live surfaces.
    pub fn len(&self) -> usize {
        self.surfaces.len()
    }

    /// Whether no surface is registered.
    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }
}
