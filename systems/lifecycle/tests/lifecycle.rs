use std::time::Duration;

use quickcheck::{Arbitrary, Gen};
use quickcheck_macros::quickcheck;
use tunnel_hive_core::LifecycleState;
use tunnel_hive_system_lifecycle::{EnemyLifecycle, HiveLifecycle};

#[derive(Clone, Copy, Debug)]
enum Step {
    Hit,
    Tick(u16),
}

impl Arbitrary for Step {
    fn arbitrary(g: &mut Gen) -> Self {
        if bool::arbitrary(g) {
            Step::Hit
        } else {
            Step::Tick(u16::arbitrary(g) % 400)
        }
    }
}

fn rank(state: LifecycleState) -> u8 {
    match state {
        LifecycleState::Moving => 0,
        LifecycleState::Dying => 1,
        LifecycleState::Removed => 2,
    }
}

#[quickcheck]
fn enemy_states_never_move_backwards(steps: Vec<Step>) -> bool {
    let mut lifecycle = EnemyLifecycle::new();
    let mut highest = rank(lifecycle.state());
    let mut removals = 0;

    for step in steps {
        if lifecycle.state() == LifecycleState::Removed {
            break;
        }
        match step {
            Step::Hit => {
                let before = lifecycle.dying_elapsed();
                let started = lifecycle.hit().expect("enemy is not removed");
                if !started && lifecycle.dying_elapsed() != before {
                    return false;
                }
            }
            Step::Tick(millis) => {
                if lifecycle.tick(Duration::from_millis(u64::from(millis))) == Ok(true) {
                    removals += 1;
                }
            }
        }

        let current = rank(lifecycle.state());
        if current < highest {
            return false;
        }
        highest = current;
    }

    removals <= 1
}

#[quickcheck]
fn death_progress_stays_below_one(ticks: Vec<u16>) -> bool {
    let mut lifecycle = EnemyLifecycle::new();
    let _ = lifecycle.hit();
    for millis in ticks {
        if lifecycle.tick(Duration::from_millis(u64::from(millis % 300))) == Ok(true) {
            return lifecycle.death_progress().is_none();
        }
        match lifecycle.death_progress() {
            Some(progress) if (0.0..1.0).contains(&progress) => {}
            _ => return false,
        }
    }
    true
}

#[test]
fn hive_opens_and_falls_once() {
    let mut hive = HiveLifecycle::default();
    let transitions = [hive.upgrade(), hive.upgrade(), hive.strike(), hive.strike()];
    assert_eq!(transitions, [true, false, true, false]);
}
