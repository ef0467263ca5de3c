#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! One-way state machines for enemies and the hive.
//!
//! Enemies progress `Moving → Dying → Removed`; the hive progresses
//! `Closed → Open → Destroyed`. Neither machine ever moves backwards. Time is
//! supplied explicitly through `dt` so replays are independent of the wall
//! clock.

use std::time::Duration;

use tunnel_hive_core::{HiveState, LifecycleError, LifecycleState};

/// Time an enemy spends dying before it is removed.
pub const DYING_DURATION: Duration = Duration::from_secs(1);

/// Largest death progress fraction ever reported.
const PROGRESS_CEILING: f32 = 1.0 - f32::EPSILON;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Stage {
    Moving,
    Dying { elapsed: Duration },
    Removed,
}

/// Lifecycle of a single enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EnemyLifecycle {
    stage: Stage,
    dying_duration: Duration,
}

impl EnemyLifecycle {
    /// Creates a moving lifecycle using [`DYING_DURATION`].
    #[must_use]
    pub const fn new() -> Self {
        Self::with_dying_duration(DYING_DURATION)
    }

    /// Creates a moving lifecycle with a custom death duration.
    #[must_use]
    pub const fn with_dying_duration(dying_duration: Duration) -> Self {
        Self {
            stage: Stage::Moving,
            dying_duration,
        }
    }

    /// Coarse state visible to other systems.
    #[must_use]
    pub const fn state(&self) -> LifecycleState {
        match self.stage {
            Stage::Moving => LifecycleState::Moving,
            Stage::Dying { .. } => LifecycleState::Dying,
            Stage::Removed => LifecycleState::Removed,
        }
    }

    /// Reports whether the enemy still walks.
    #[must_use]
    pub const fn is_moving(&self) -> bool {
        matches!(self.stage, Stage::Moving)
    }

    /// Time spent dying so far, present only while dying.
    #[must_use]
    pub const fn dying_elapsed(&self) -> Option<Duration> {
        match self.stage {
            Stage::Dying { elapsed } => Some(elapsed),
            _ => None,
        }
    }

    /// Fraction of the death elapsed, clamped to `[0, 1)`.
    #[must_use]
    pub fn death_progress(&self) -> Option<f32> {
        let elapsed = self.dying_elapsed()?;
        if self.dying_duration.is_zero() {
            return Some(0.0);
        }
        let fraction = elapsed.as_secs_f32() / self.dying_duration.as_secs_f32();
        Some(fraction.clamp(0.0, PROGRESS_CEILING))
    }

    /// Registers a laser hit.
    ///
    /// Returns `Ok(true)` when the enemy started dying and `Ok(false)` when it
    /// was already dying, in which case the death timer is left untouched.
    ///
    /// # Errors
    ///
    /// Hitting a removed enemy is an ordering bug and reports
    /// [`LifecycleError::InvalidStateTransition`].
    pub fn hit(&mut self) -> Result<bool, LifecycleError> {
        match self.stage {
            Stage::Moving => {
                self.stage = Stage::Dying {
                    elapsed: Duration::ZERO,
                };
                Ok(true)
            }
            Stage::Dying { .. } => Ok(false),
            Stage::Removed => Err(LifecycleError::InvalidStateTransition {
                state: LifecycleState::Removed,
                action: "hit",
            }),
        }
    }

    /// Advances the death timer by `dt`.
    ///
    /// Returns `Ok(true)` exactly once, on the tick the enemy becomes removed.
    ///
    /// # Errors
    ///
    /// Ticking a removed enemy reports
    /// [`LifecycleError::InvalidStateTransition`].
    pub fn tick(&mut self, dt: Duration) -> Result<bool, LifecycleError> {
        match self.stage {
            Stage::Moving => Ok(false),
            Stage::Dying { elapsed } => {
                let elapsed = elapsed.saturating_add(dt);
                if elapsed >= self.dying_duration {
                    self.stage = Stage::Removed;
                    Ok(true)
                } else {
                    self.stage = Stage::Dying { elapsed };
                    Ok(false)
                }
            }
            Stage::Removed => Err(LifecycleError::InvalidStateTransition {
                state: LifecycleState::Removed,
                action: "tick",
            }),
        }
    }
}

impl Default for EnemyLifecycle {
    fn default() -> Self {
        Self::new()
    }
}

/// Lifecycle of the hive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HiveLifecycle {
    state: HiveState,
}

impl HiveLifecycle {
    /// Creates a closed hive.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: HiveState::Closed,
        }
    }

    /// Current stage of the hive.
    #[must_use]
    pub const fn state(&self) -> HiveState {
        self.state
    }

    /// Reports whether the hive still produces enemies.
    #[must_use]
    pub const fn is_spawning(&self) -> bool {
        !matches!(self.state, HiveState::Destroyed)
    }

    /// Opens a closed hive. Returns whether the state changed.
    pub fn upgrade(&mut self) -> bool {
        if self.state == HiveState::Closed {
            self.state = HiveState::Open;
            true
        } else {
            false
        }
    }

    /// Registers a projectile hit. Only an open hive is destroyed; returns
    /// whether the state changed.
    pub fn strike(&mut self) -> bool {
        if self.state == HiveState::Open {
            self.state = HiveState::Destroyed;
            true
        } else {
            false
        }
    }
}

impl Default for HiveLifecycle {
    fn default() -> Self {
        Self::new()
    }
}
