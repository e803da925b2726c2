//! Session: the single owned root of all kiosk policy state.
//!
//! The session folds [`DisplayEvent`]s into registry/hotkey/supervisor
//! state and returns [`KioskAction`]s for the run loop to execute. It
//! performs no I/O and reads no clock; time is passed into every method.
//!
//! # Architecture
//!
//! ```text
//! Session
//!   ├─ registry: SurfaceRegistry     (live surfaces, home attribution)
//!   ├─ outputs: Vec<OutputInfo>      (first entry is primary)
//!   ├─ hotkey: Hotkey<I>             (hold-to-trigger gesture)
//!   ├─ supervisor: HomeSupervisor<I> (launch/respawn policy)
//!   └─ pending_closes                (polite closes awaiting escalation)
//! ```
//!
//! Exactly one session exists per process and exactly one thread mutates
//! it. Events may arrive in any interleaving the protocol permits; every
//! handler tolerates unknown ids and missing outputs.

use std::{ops::Sub, time::Duration};

use crate::{
    config::{CloseEscalation, KioskConfig},
    event::{DisplayEvent, Geometry, KeyState, KeySym, KioskAction, OutputId, OutputInfo, Pid,
        SurfaceId},
    hotkey::Hotkey,
    registry::SurfaceRegistry,
    supervisor::{ChildExit, HomeSupervisor},
};

/// A polite close awaiting either a destroy event or escalation.
#[derive(Debug, Clone, Copy)]
struct PendingClose<I> {
    surface: SurfaceId,
    requested_at: I,
}

/// Kiosk policy engine for one display session.
#[derive(Debug)]
pub struct Session<I> {
    config: KioskConfig,
    registry: SurfaceRegistry,
    outputs: Vec<OutputInfo>,
    hotkey: Hotkey<I>,
    supervisor: HomeSupervisor<I>,
    focused: Option<SurfaceId>,
    pending_closes: Vec<PendingClose<I>>,
}

impl<I> Session<I>
where
    I: Copy + Ord + Sub<Output = Duration>,
{
    /// Create a session from policy configuration. No action is produced
    /// until [`startup`](Self::startup) runs.
    pub fn new(config: KioskConfig) -> Self {
        let hotkey = Hotkey::new(config.hold_threshold);
        let supervisor = HomeSupervisor::new(config.respawn_delay);
        Self {
            config,
            registry: SurfaceRegistry::new(),
            outputs: Vec::new(),
            hotkey,
            supervisor,
            focused: None,
            pending_closes: Vec::new(),
        }
    }

    /// The live surface set.
    #[must_use]
    pub fn registry(&self) -> &SurfaceRegistry {
        &self.registry
    }

    /// The surface currently holding keyboard focus, if any.
    #[must_use]
    pub fn focused(&self) -> Option<SurfaceId> {
        self.focused
    }

    /// Pid of the running home process, if any.
    #[must_use]
    pub fn home_pid(&self) -> Option<Pid> {
        self.supervisor.home_pid()
    }

    /// Initial actions: launch the home application.
    pub fn startup(&mut self, now: I) -> Vec<KioskAction> {
        self.maybe_spawn(now)
    }

    /// Process one display event and return the actions it implies.
    pub fn process_event(&mut self, event: DisplayEvent, now: I) -> Vec<KioskAction> {
        match event {
            DisplayEvent::OutputAdded { output } => self.handle_output_added(output),
            DisplayEvent::OutputRemoved { output } => self.handle_output_removed(output),
            DisplayEvent::SurfaceCreated { surface, owner } => {
                self.handle_surface_created(surface, owner)
            },
            DisplayEvent::SurfaceMapped { surface } => {
                if !self.registry.on_mapped(surface) {
                    tracing::debug!(%surface, "map for unknown surface");
                }
                Vec::new()
            },
            DisplayEvent::SurfaceUnmapped { surface } => {
                if !self.registry.on_unmapped(surface) {
                    tracing::debug!(%surface, "unmap for unknown surface");
                }
                Vec::new()
            },
            DisplayEvent::SurfaceDestroyed { surface } => {
                self.handle_surface_destroyed(surface, now)
            },
            DisplayEvent::ConfigureRequested { surface, width, height } => {
                self.handle_configure_request(surface, width, height)
            },
            DisplayEvent::Key { sym, state } => self.handle_key(sym, state, now),
            DisplayEvent::InputDeviceAdded { name } => {
                tracing::debug!(device = %name, "input device attached");
                Vec::new()
            },
        }
    }

    /// Timer-driven work: hold re-check, close escalation, deferred
    /// respawn. Called when the event wait times out.
    pub fn tick(&mut self, now: I) -> Vec<KioskAction> {
        let mut actions = self.hold_check(now);
        actions.extend(self.escalate_closes(now));
        actions.extend(self.maybe_spawn(now));
        actions
    }

    /// Event-wait timeout for the next loop iteration.
    ///
    /// The minimum of: the hold poll interval while the hotkey is down,
    /// the earliest close-escalation deadline, and a pending respawn
    /// delay. `None` means nothing is timed and the wait may block
    /// indefinitely.
    #[must_use]
    pub fn poll_timeout(&self, now: I) -> Option<Duration> {
        let mut timeout: Option<Duration> = None;
        let mut consider = |candidate: Option<Duration>| {
            if let Some(c) = candidate {
                timeout = Some(timeout.map_or(c, |t| t.min(c)));
            }
        };

        if self.hotkey.is_pressed() {
            consider(Some(self.config.hold_poll_interval));
        }
        consider(self.earliest_escalation(now));
        consider(self.supervisor.spawn_deadline(now));
        timeout
    }

    /// Record a successful home launch (called by the run loop after the
    /// process host spawned the child).
    pub fn home_launched(&mut self, pid: Pid, now: I) {
        tracing::info!(%pid, path = %self.config.home_path.display(), "home application launched");
        self.supervisor.launched(pid, now);
    }

    /// Record a failed spawn attempt; retried after the respawn delay.
    pub fn home_launch_failed(&mut self, now: I) {
        self.supervisor.launch_failed(now);
    }

    /// Feed a reaped child exit. Produces a respawn when the home process
    /// is the one that died (deduplicated against the surface-destroy
    /// signal for the same death).
    pub fn process_child_exit(&mut self, exit: ChildExit, now: I) -> Vec<KioskAction> {
        if self.supervisor.child_exited(exit.pid) {
            tracing::info!(pid = %exit.pid, code = ?exit.code, "home process exited");
            self.maybe_spawn(now)
        } else {
            tracing::debug!(pid = %exit.pid, code = ?exit.code, "reaped child");
            Vec::new()
        }
    }

    fn handle_output_added(&mut self, output: OutputInfo) -> Vec<KioskAction> {
        match self.outputs.iter_mut().find(|existing| existing.id == output.id) {
            Some(existing) => *existing = output,
            None => self.outputs.push(output),
        }
        tracing::info!(output = %output.id, width = output.width, height = output.height,
            "output added");
        self.refullscreen_mapped()
    }

    fn handle_output_removed(&mut self, id: OutputId) -> Vec<KioskAction> {
        self.outputs.retain(|output| output.id != id);
        tracing::info!(output = %id, remaining = self.outputs.len(), "output removed");
        if self.outputs.is_empty() {
            return Vec::new();
        }
        self.refullscreen_mapped()
    }

    fn handle_surface_created(&mut self, id: SurfaceId, owner: Option<Pid>) -> Vec<KioskAction> {
        let claim = self.supervisor.claim(owner);
        let is_home = self.registry.on_created(id, owner, claim);
        if is_home {
            self.supervisor.surface_attributed();
        }
        tracing::info!(surface = %id, owner = ?owner, is_home, "surface created");

        let mut actions = Vec::new();
        if let Some(geometry) = self.primary_geometry() {
            actions.push(KioskAction::Fullscreen { surface: id, geometry });
        } else {
            tracing::warn!(surface = %id, "no output yet, deferring fullscreen enforcement");
        }
        actions.push(KioskAction::RaiseAndFocus { surface: id });
        self.focused = Some(id);
        actions
    }

    fn handle_surface_destroyed(&mut self, id: SurfaceId, now: I) -> Vec<KioskAction> {
        self.pending_closes.retain(|pending| pending.surface != id);

        let Some(surface) = self.registry.on_destroyed(id) else {
            tracing::debug!(surface = %id, "destroy for unknown surface");
            return Vec::new();
        };

        if self.focused == Some(id) {
            self.focused = None;
        }

        if surface.is_home {
            tracing::info!(surface = %id, "home surface destroyed");
            if self.supervisor.home_surface_destroyed() {
                return self.maybe_spawn(now);
            }
            return Vec::new();
        }

        tracing::info!(surface = %id, "surface destroyed");
        if self.focused.is_none() {
            if let Some(next) = self.registry.most_recent() {
                self.focused = Some(next);
                return vec![KioskAction::RaiseAndFocus { surface: next }];
            }
        }
        Vec::new()
    }

    fn handle_configure_request(&mut self, id: SurfaceId, width: u16, height: u16)
    -> Vec<KioskAction> {
        // Deny-and-override: the answer is always the full output, never
        // the client's requested geometry. Unknown ids are configured too;
        // stacking clients may configure before they map.
        let Some(geometry) = self.primary_geometry() else {
            tracing::warn!(surface = %id, "configure request with no output, ignoring");
            return Vec::new();
        };
        tracing::debug!(surface = %id, requested_width = width, requested_height = height,
            enforced = %geometry, "overriding configure request");
        vec![KioskAction::Fullscreen { surface: id, geometry }]
    }

    fn handle_key(&mut self, sym: KeySym, state: KeyState, now: I) -> Vec<KioskAction> {
        if sym != self.config.hotkey {
            return vec![KioskAction::ForwardKey { sym, state }];
        }
        match state {
            KeyState::Pressed => {
                self.hotkey.on_press(now);
                // Auto-repeat can outpace the poll tick; re-check here so
                // the hold cannot starve.
                self.hold_check(now)
            },
            KeyState::Released => {
                self.hotkey.on_release();
                Vec::new()
            },
        }
    }

    fn hold_check(&mut self, now: I) -> Vec<KioskAction> {
        if self.hotkey.check_hold(now) {
            self.close_all_except_home(now)
        } else {
            Vec::new()
        }
    }

    /// The hotkey gesture fired: politely close everything except home,
    /// then put home back on top.
    fn close_all_except_home(&mut self, now: I) -> Vec<KioskAction> {
        let home = self.registry.home();
        let victims = self.registry.all_except(home);
        tracing::info!(count = victims.len(), home = ?home, "hotkey held, closing all except home");

        let mut actions = Vec::with_capacity(victims.len() + 1);
        for surface in victims {
            actions.push(KioskAction::RequestClose { surface });
            if matches!(self.config.close_escalation, CloseEscalation::ForceAfter(_)) {
                self.pending_closes.push(PendingClose { surface, requested_at: now });
            }
        }
        if let Some(home) = home {
            actions.push(KioskAction::RaiseAndFocus { surface: home });
            self.focused = Some(home);
        }
        actions
    }

    /// Force-destroy surfaces whose polite close went unanswered past the
    /// grace period.
    fn escalate_closes(&mut self, now: I) -> Vec<KioskAction> {
        let CloseEscalation::ForceAfter(grace) = self.config.close_escalation else {
            return Vec::new();
        };

        let mut actions = Vec::new();
        self.pending_closes.retain(|pending| {
            if now - pending.requested_at < grace {
                return true;
            }
            tracing::warn!(surface = %pending.surface, ?grace,
                "close request ignored, destroying surface");
            actions.push(KioskAction::ForceDestroy { surface: pending.surface });
            false
        });
        actions
    }

    fn earliest_escalation(&self, now: I) -> Option<Duration> {
        let CloseEscalation::ForceAfter(grace) = self.config.close_escalation else {
            return None;
        };
        self.pending_closes
            .iter()
            .map(|pending| grace.checked_sub(now - pending.requested_at).unwrap_or(Duration::ZERO))
            .min()
    }

    fn maybe_spawn(&mut self, now: I) -> Vec<KioskAction> {
        if self.supervisor.wants_spawn(now) {
            vec![KioskAction::SpawnHome { path: self.config.home_path.clone() }]
        } else {
            Vec::new()
        }
    }

    fn refullscreen_mapped(&self) -> Vec<KioskAction> {
        let Some(geometry) = self.primary_geometry() else {
            return Vec::new();
        };
        self.registry
            .mapped()
            .map(|surface| KioskAction::Fullscreen { surface, geometry })
            .collect()
    }

    fn primary_geometry(&self) -> Option<Geometry> {
        self.outputs.first().map(Geometry::fullscreen)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOME_PID: Pid = Pid(100);

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn output() -> OutputInfo {
        OutputInfo { id: OutputId(1), width: 1920, height: 1080 }
    }

    fn session() -> Session<Duration> {
        let mut session = Session::new(KioskConfig::new("/bin/home"));
        session.process_event(DisplayEvent::OutputAdded { output: output() }, ms(0));
        session
    }

    /// Session with home launched and its surface (id 1) created+mapped.
    fn session_with_home() -> Session<Duration> {
        let mut session = session();
        let actions = session.startup(ms(0));
        assert!(matches!(actions[..], [KioskAction::SpawnHome { .. }]));
        session.home_launched(HOME_PID, ms(0));
        session.process_event(
            DisplayEvent::SurfaceCreated { surface: SurfaceId(1), owner: Some(HOME_PID) },
            ms(10),
        );
        session.process_event(DisplayEvent::SurfaceMapped { surface: SurfaceId(1) }, ms(10));
        session
    }

    #[test]
    fn startup_spawns_home_once() {
        let mut session = session();

        let actions = session.startup(ms(0));
        assert_eq!(actions.len(), 1);
        assert!(matches!(actions[0], KioskAction::SpawnHome { .. }));

        session.home_launched(HOME_PID, ms(0));
        assert!(session.tick(ms(100)).is_empty());
    }

    #[test]
    fn home_surface_is_attributed_and_fullscreened() {
        let session = session_with_home();

        let surface = session.registry().get(SurfaceId(1));
        assert!(surface.is_some_and(|s| s.is_home && s.mapped));
        assert_eq!(session.registry().home(), Some(SurfaceId(1)));
        assert_eq!(session.focused(), Some(SurfaceId(1)));
    }

    #[test]
    fn new_surface_gets_fullscreen_and_focus() {
        let mut session = session_with_home();

        let actions = session.process_event(
            DisplayEvent::SurfaceCreated { surface: SurfaceId(2), owner: Some(Pid(200)) },
            ms(100),
        );

        assert_eq!(
            actions,
            vec![
                KioskAction::Fullscreen {
                    surface: SurfaceId(2),
                    geometry: Geometry { x: 0, y: 0, width: 1920, height: 1080 },
                },
                KioskAction::RaiseAndFocus { surface: SurfaceId(2) },
            ]
        );
        assert_eq!(session.focused(), Some(SurfaceId(2)));
        // Home attribution is untouched.
        assert_eq!(session.registry().home(), Some(SurfaceId(1)));
    }

    #[test]
    fn configure_request_is_denied_and_overridden() {
        let mut session = session_with_home();
        session.process_event(
            DisplayEvent::SurfaceCreated { surface: SurfaceId(2), owner: Some(Pid(200)) },
            ms(100),
        );

        let actions = session.process_event(
            DisplayEvent::ConfigureRequested { surface: SurfaceId(2), width: 400, height: 300 },
            ms(200),
        );

        assert_eq!(
            actions,
            vec![KioskAction::Fullscreen {
                surface: SurfaceId(2),
                geometry: Geometry { x: 0, y: 0, width: 1920, height: 1080 },
            }]
        );
    }

    #[test]
    fn configure_request_is_idempotent() {
        let mut session = session_with_home();

        let first = session.process_event(
            DisplayEvent::ConfigureRequested { surface: SurfaceId(1), width: 640, height: 480 },
            ms(100),
        );
        let second = session.process_event(
            DisplayEvent::ConfigureRequested { surface: SurfaceId(1), width: 300, height: 200 },
            ms(150),
        );

        assert_eq!(first, second);
    }

    #[test]
    fn held_hotkey_closes_all_except_home() {
        let mut session = session_with_home();
        session.process_event(
            DisplayEvent::SurfaceCreated { surface: SurfaceId(2), owner: Some(Pid(200)) },
            ms(100),
        );
        session.process_event(DisplayEvent::SurfaceMapped { surface: SurfaceId(2) }, ms(100));

        session.process_event(
            DisplayEvent::Key { sym: KeySym::SUPER_L, state: KeyState::Pressed },
            ms(1000),
        );
        assert_eq!(session.poll_timeout(ms(1000)), Some(ms(50)));

        // Short of the threshold: nothing happens.
        assert!(session.tick(ms(2000)).is_empty());

        let actions = session.tick(ms(3000));
        assert_eq!(
            actions,
            vec![
                KioskAction::RequestClose { surface: SurfaceId(2) },
                KioskAction::RaiseAndFocus { surface: SurfaceId(1) },
            ]
        );

        // Latched: further ticks fire nothing new until the grace period
        // escalation, which is a different action.
        let later = session.tick(ms(3100));
        assert!(!later.iter().any(|a| matches!(a, KioskAction::RequestClose { .. })));
    }

    #[test]
    fn released_hotkey_cancels_hold() {
        let mut session = session_with_home();
        session.process_event(
            DisplayEvent::SurfaceCreated { surface: SurfaceId(2), owner: Some(Pid(200)) },
            ms(100),
        );

        session.process_event(
            DisplayEvent::Key { sym: KeySym::SUPER_L, state: KeyState::Pressed },
            ms(1000),
        );
        session.process_event(
            DisplayEvent::Key { sym: KeySym::SUPER_L, state: KeyState::Released },
            ms(1500),
        );

        assert!(session.tick(ms(10_000)).is_empty());
        assert_eq!(session.poll_timeout(ms(10_000)), None);
    }

    #[test]
    fn auto_repeat_triggers_without_tick() {
        let mut session = session_with_home();
        session.process_event(
            DisplayEvent::SurfaceCreated { surface: SurfaceId(2), owner: Some(Pid(200)) },
            ms(100),
        );

        session.process_event(
            DisplayEvent::Key { sym: KeySym::SUPER_L, state: KeyState::Pressed },
            ms(200),
        );
        // Repeats flood in faster than the poll interval.
        assert!(
            session
                .process_event(
                    DisplayEvent::Key { sym: KeySym::SUPER_L, state: KeyState::Pressed },
                    ms(1200),
                )
                .is_empty()
        );
        let actions = session.process_event(
            DisplayEvent::Key { sym: KeySym::SUPER_L, state: KeyState::Pressed },
            ms(2300),
        );
        assert!(actions.iter().any(|a| matches!(a, KioskAction::RequestClose { .. })));
    }

    #[test]
    fn other_keys_are_forwarded() {
        let mut session = session_with_home();

        let actions = session.process_event(
            DisplayEvent::Key { sym: KeySym(0x0061), state: KeyState::Pressed },
            ms(100),
        );
        assert_eq!(
            actions,
            vec![KioskAction::ForwardKey { sym: KeySym(0x0061), state: KeyState::Pressed }]
        );
    }

    #[test]
    fn ignored_close_escalates_after_grace() {
        let mut session = session_with_home();
        session.process_event(
            DisplayEvent::SurfaceCreated { surface: SurfaceId(2), owner: Some(Pid(200)) },
            ms(0),
        );

        session.process_event(
            DisplayEvent::Key { sym: KeySym::SUPER_L, state: KeyState::Pressed },
            ms(0),
        );
        session.tick(ms(2000)); // close-all fires, grace starts

        assert_eq!(session.poll_timeout(ms(2000)), Some(ms(2000)));
        assert!(session.tick(ms(3999)).is_empty());

        let actions = session.tick(ms(4000));
        assert_eq!(actions, vec![KioskAction::ForceDestroy { surface: SurfaceId(2) }]);
        // One escalation per close request.
        assert!(session.tick(ms(5000)).is_empty());
    }

    #[test]
    fn destroy_before_grace_cancels_escalation() {
        let mut session = session_with_home();
        session.process_event(
            DisplayEvent::SurfaceCreated { surface: SurfaceId(2), owner: Some(Pid(200)) },
            ms(0),
        );

        session.process_event(
            DisplayEvent::Key { sym: KeySym::SUPER_L, state: KeyState::Pressed },
            ms(0),
        );
        session.tick(ms(2000));
        session.process_event(DisplayEvent::SurfaceDestroyed { surface: SurfaceId(2) }, ms(2500));

        assert!(session.tick(ms(10_000)).is_empty());
    }

    #[test]
    fn never_policy_does_not_escalate() {
        let mut config = KioskConfig::new("/bin/home");
        config.close_escalation = CloseEscalation::Never;
        let mut session = Session::new(config);
        session.process_event(DisplayEvent::OutputAdded { output: output() }, ms(0));
        session.startup(ms(0));
        session.home_launched(HOME_PID, ms(0));
        session.process_event(
            DisplayEvent::SurfaceCreated { surface: SurfaceId(1), owner: Some(HOME_PID) },
            ms(0),
        );
        session.process_event(
            DisplayEvent::SurfaceCreated { surface: SurfaceId(2), owner: Some(Pid(200)) },
            ms(0),
        );

        session.process_event(
            DisplayEvent::Key { sym: KeySym::SUPER_L, state: KeyState::Pressed },
            ms(0),
        );
        session.tick(ms(2000));

        assert!(session.tick(ms(60_000)).is_empty());
    }

    #[test]
    fn home_destroy_respawns_once() {
        let mut session = session_with_home();

        let actions =
            session.process_event(DisplayEvent::SurfaceDestroyed { surface: SurfaceId(1) }, ms(5000));
        assert!(matches!(actions[..], [KioskAction::SpawnHome { .. }]));

        // The pid exit for the same death must not spawn again.
        let actions =
            session.process_child_exit(ChildExit { pid: HOME_PID, code: Some(0) }, ms(5100));
        assert!(actions.is_empty());
    }

    #[test]
    fn home_exit_respawns_once() {
        let mut session = session_with_home();

        let actions =
            session.process_child_exit(ChildExit { pid: HOME_PID, code: Some(1) }, ms(5000));
        assert!(matches!(actions[..], [KioskAction::SpawnHome { .. }]));

        let actions =
            session.process_event(DisplayEvent::SurfaceDestroyed { surface: SurfaceId(1) }, ms(5100));
        assert!(actions.is_empty());
    }

    #[test]
    fn no_premature_home_attribution_after_respawn() {
        let mut session = session_with_home();
        session.process_event(DisplayEvent::SurfaceDestroyed { surface: SurfaceId(1) }, ms(5000));

        // A stray surface between home death and relaunch is not home.
        session.process_event(
            DisplayEvent::SurfaceCreated { surface: SurfaceId(9), owner: Some(HOME_PID) },
            ms(5100),
        );
        assert_eq!(session.registry().home(), None);

        // The relaunched process's surface is.
        session.home_launched(Pid(101), ms(6000));
        session.process_event(
            DisplayEvent::SurfaceCreated { surface: SurfaceId(10), owner: Some(Pid(101)) },
            ms(6100),
        );
        assert_eq!(session.registry().home(), Some(SurfaceId(10)));
    }

    #[test]
    fn rapid_home_death_defers_respawn_to_tick() {
        let mut session = session_with_home();

        // Death right after launch: the spawn waits out the delay.
        let actions =
            session.process_event(DisplayEvent::SurfaceDestroyed { surface: SurfaceId(1) }, ms(200));
        assert!(actions.is_empty());
        assert_eq!(session.poll_timeout(ms(200)), Some(ms(800)));

        let actions = session.tick(ms(1000));
        assert!(matches!(actions[..], [KioskAction::SpawnHome { .. }]));
    }

    #[test]
    fn destroyed_focused_surface_refocuses_most_recent() {
        let mut session = session_with_home();
        session.process_event(
            DisplayEvent::SurfaceCreated { surface: SurfaceId(2), owner: Some(Pid(200)) },
            ms(100),
        );
        session.process_event(
            DisplayEvent::SurfaceCreated { surface: SurfaceId(3), owner: Some(Pid(300)) },
            ms(200),
        );

        let actions =
            session.process_event(DisplayEvent::SurfaceDestroyed { surface: SurfaceId(3) }, ms(300));
        assert_eq!(actions, vec![KioskAction::RaiseAndFocus { surface: SurfaceId(2) }]);
        assert_eq!(session.focused(), Some(SurfaceId(2)));
    }

    #[test]
    fn output_hotplug_reenforces_mapped_surfaces() {
        let mut session = session_with_home();
        session.process_event(
            DisplayEvent::SurfaceCreated { surface: SurfaceId(2), owner: Some(Pid(200)) },
            ms(100),
        );
        session.process_event(DisplayEvent::SurfaceMapped { surface: SurfaceId(2) }, ms(100));

        let actions = session.process_event(
            DisplayEvent::OutputAdded {
                output: OutputInfo { id: OutputId(1), width: 1280, height: 720 },
            },
            ms(200),
        );

        let expected = Geometry { x: 0, y: 0, width: 1280, height: 720 };
        assert_eq!(
            actions,
            vec![
                KioskAction::Fullscreen { surface: SurfaceId(1), geometry: expected },
                KioskAction::Fullscreen { surface: SurfaceId(2), geometry: expected },
            ]
        );
    }

    #[test]
    fn surface_before_any_output_is_enforced_on_hotplug() {
        let mut session = Session::new(KioskConfig::new("/bin/home"));
        session.startup(ms(0));
        session.home_launched(HOME_PID, ms(0));

        let actions = session.process_event(
            DisplayEvent::SurfaceCreated { surface: SurfaceId(1), owner: Some(HOME_PID) },
            ms(10),
        );
        // No output: only focus, no geometry to enforce yet.
        assert_eq!(actions, vec![KioskAction::RaiseAndFocus { surface: SurfaceId(1) }]);

        session.process_event(DisplayEvent::SurfaceMapped { surface: SurfaceId(1) }, ms(10));
        let actions =
            session.process_event(DisplayEvent::OutputAdded { output: output() }, ms(20));
        assert_eq!(
            actions,
            vec![KioskAction::Fullscreen {
                surface: SurfaceId(1),
                geometry: Geometry { x: 0, y: 0, width: 1920, height: 1080 },
            }]
        );
    }
}
