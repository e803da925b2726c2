//! Property tests over randomized event interleavings.
//!
//! The backend may deliver lifecycle events in any order the protocol
//! permits (including events for ids the session never saw, and destroys
//! racing close requests). Whatever the interleaving, two properties must
//! hold: at most one live surface is home, and every geometry the session
//! enforces equals the primary output's.

use std::time::Duration;

use holdfast_core::{
    ChildExit, DisplayEvent, Geometry, KeyState, KeySym, KioskConfig, KioskAction, OutputId,
    OutputInfo, Pid, Session, SurfaceId,
};
use holdfast_harness::invariants::assert_at_most_one_home;
use proptest::prelude::*;

const HOME_PID: Pid = Pid(1000);

#[derive(Debug, Clone)]
enum Op {
    Created { surface: u64, owner: Option<i32> },
    Mapped { surface: u64 },
    Unmapped { surface: u64 },
    Destroyed { surface: u64 },
    Configure { surface: u64, width: u16, height: u16 },
    KeyDown,
    KeyUp,
    ChildExit { pid: i32 },
    Wait { ms: u64 },
}

fn op_strategy() -> impl Strategy<Value = Op> {
    let surface = 1u64..6;
    let owner = prop_oneof![
        Just(None),
        Just(Some(HOME_PID.0)),
        (2000i32..2005).prop_map(Some),
    ];
    prop_oneof![
        (surface.clone(), owner).prop_map(|(surface, owner)| Op::Created { surface, owner }),
        surface.clone().prop_map(|surface| Op::Mapped { surface }),
        surface.clone().prop_map(|surface| Op::Unmapped { surface }),
        surface.clone().prop_map(|surface| Op::Destroyed { surface }),
        (surface, 1u16..4000, 1u16..4000)
            .prop_map(|(surface, width, height)| Op::Configure { surface, width, height }),
        Just(Op::KeyDown),
        Just(Op::KeyUp),
        prop_oneof![Just(HOME_PID.0), Just(7777i32)].prop_map(|pid| Op::ChildExit { pid }),
        (0u64..3000).prop_map(|ms| Op::Wait { ms }),
    ]
}

fn apply(session: &mut Session<Duration>, op: Op, now: &mut Duration) -> Vec<KioskAction> {
    *now += Duration::from_millis(10);
    match op {
        Op::Created { surface, owner } => session.process_event(
            DisplayEvent::SurfaceCreated {
                surface: SurfaceId(surface),
                owner: owner.map(Pid),
            },
            *now,
        ),
        Op::Mapped { surface } => {
            session.process_event(DisplayEvent::SurfaceMapped { surface: SurfaceId(surface) }, *now)
        },
        Op::Unmapped { surface } => session
            .process_event(DisplayEvent::SurfaceUnmapped { surface: SurfaceId(surface) }, *now),
        Op::Destroyed { surface } => session
            .process_event(DisplayEvent::SurfaceDestroyed { surface: SurfaceId(surface) }, *now),
        Op::Configure { surface, width, height } => session.process_event(
            DisplayEvent::ConfigureRequested { surface: SurfaceId(surface), width, height },
            *now,
        ),
        Op::KeyDown => session.process_event(
            DisplayEvent::Key { sym: KeySym::SUPER_L, state: KeyState::Pressed },
            *now,
        ),
        Op::KeyUp => session.process_event(
            DisplayEvent::Key { sym: KeySym::SUPER_L, state: KeyState::Released },
            *now,
        ),
        Op::ChildExit { pid } => {
            session.process_child_exit(ChildExit { pid: Pid(pid), code: Some(0) }, *now)
        },
        Op::Wait { ms } => {
            *now += Duration::from_millis(ms);
            session.tick(*now)
        },
    }
}

proptest! {
    /// No interleaving of lifecycle, input, timer, and reaper events can
    /// produce two home surfaces or a stale home id.
    #[test]
    fn at_most_one_home_under_any_interleaving(
        ops in proptest::collection::vec(op_strategy(), 0..80),
    ) {
        let mut session = Session::new(KioskConfig::new("/bin/home"));
        let mut now = Duration::ZERO;
        session.process_event(
            DisplayEvent::OutputAdded {
                output: OutputInfo { id: OutputId(1), width: 1920, height: 1080 },
            },
            now,
        );
        session.startup(now);
        session.home_launched(HOME_PID, now);

        for op in ops {
            apply(&mut session, op, &mut now);
            assert_at_most_one_home(session.registry(), "interleaving");
        }
    }

    /// Every geometry the session ever enforces equals the primary
    /// output's fullscreen geometry, no matter what clients request.
    #[test]
    fn enforced_geometry_always_matches_output(
        ops in proptest::collection::vec(op_strategy(), 0..80),
    ) {
        let expected = Geometry { x: 0, y: 0, width: 1366, height: 768 };
        let mut session = Session::new(KioskConfig::new("/bin/home"));
        let mut now = Duration::ZERO;
        session.process_event(
            DisplayEvent::OutputAdded {
                output: OutputInfo { id: OutputId(1), width: 1366, height: 768 },
            },
            now,
        );
        session.startup(now);
        session.home_launched(HOME_PID, now);

        for op in ops {
            for action in apply(&mut session, op, &mut now) {
                if let KioskAction::Fullscreen { geometry, .. } = action {
                    prop_assert_eq!(geometry, expected);
                }
            }
        }
    }

    /// A hold shorter than the threshold never closes anything; reaching
    /// the threshold closes each non-home surface at most once per hold.
    #[test]
    fn close_all_fires_at_most_once_per_hold(hold_ms in 0u64..6000) {
        let mut session = Session::new(KioskConfig::new("/bin/home"));
        let mut now = Duration::ZERO;
        session.process_event(
            DisplayEvent::OutputAdded {
                output: OutputInfo { id: OutputId(1), width: 1920, height: 1080 },
            },
            now,
        );
        session.startup(now);
        session.home_launched(HOME_PID, now);
        session.process_event(
            DisplayEvent::SurfaceCreated { surface: SurfaceId(1), owner: Some(HOME_PID) },
            now,
        );
        session.process_event(
            DisplayEvent::SurfaceCreated { surface: SurfaceId(2), owner: Some(Pid(2000)) },
            now,
        );

        session.process_event(
            DisplayEvent::Key { sym: KeySym::SUPER_L, state: KeyState::Pressed },
            now,
        );

        let mut closes = 0usize;
        let mut elapsed = 0u64;
        while elapsed < hold_ms {
            elapsed = (elapsed + 50).min(hold_ms);
            now = Duration::from_millis(elapsed);
            closes += session
                .tick(now)
                .iter()
                .filter(|a| matches!(a, KioskAction::RequestClose { .. }))
                .count();
        }
        session.process_event(
            DisplayEvent::Key { sym: KeySym::SUPER_L, state: KeyState::Released },
            now,
        );

        let expected = usize::from(hold_ms >= 2000);
        prop_assert_eq!(closes, expected);
    }
}
