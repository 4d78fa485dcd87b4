//! Homing sequence.
//!
//! Locates the minimum endstop and establishes step position 0 on its
//! switching edge:
//!
//! | State                | Condition                  | Action                         | Next                 |
//! |----------------------|----------------------------|--------------------------------|----------------------|
//! | `NotHomed`           | contact                    | retract `+backoff`             | `BackoffPostContact` |
//! | `NotHomed`           | no contact                 | –                              | `BackoffPreCheck`    |
//! | `BackoffPreCheck`    | idle, no contact           | approach `-max_travel`         | `MoveFast`           |
//! | `BackoffPreCheck`    | idle, contact              | –                              | `Error`              |
//! | `MoveFast`           | moving, contact            | zero position and target       | `MoveFast`           |
//! | `MoveFast`           | idle, contact              | retract `+backoff`             | `BackoffPostContact` |
//! | `MoveFast`           | idle, no contact           | –                              | `Error`              |
//! | `BackoffPostContact` | idle, no contact           | –                              | `MoveSlow`           |
//! | `BackoffPostContact` | idle, contact              | –                              | `Error`              |
//! | `MoveSlow`           | contact                    | zero position, hard stop       | `Finished`           |
//! | `MoveSlow`           | idle, no contact           | creep `-1`                     | `MoveSlow`           |
//!
//! `Finished` and `Error` are inert; only the `homing()` command re-arms.

use lift_common::axis::fault::FaultReason;
use lift_common::axis::state::HomingState;
use lift_common::hal::MotionPrimitive;

use super::{SequenceProfile, Transition};

/// Evaluate the homing sequence for one tick.
///
/// `contact` is the minimum endstop as sampled at the start of the tick.
pub fn step<M: MotionPrimitive>(
    state: HomingState,
    contact: bool,
    motion: &mut M,
    profile: &SequenceProfile,
) -> Transition<HomingState> {
    let moving = motion.is_moving();
    match state {
        HomingState::NotHomed => {
            if contact {
                retract(motion, profile);
                Transition::to(HomingState::BackoffPostContact)
            } else {
                Transition::to(HomingState::BackoffPreCheck)
            }
        }
        HomingState::BackoffPreCheck => match (contact, moving) {
            (false, false) => {
                motion.set_speed_limit(profile.approach_speed);
                motion.move_by(-profile.max_travel);
                Transition::to(HomingState::MoveFast)
            }
            (true, false) => Transition::faulted(HomingState::Error, FaultReason::ContactStuck),
            _ => Transition::to(state),
        },
        HomingState::MoveFast => match (contact, moving) {
            (true, true) => {
                // Cancel residual travel; the reference is refined by the creep.
                motion.set_current_position(0);
                motion.move_to(0);
                Transition::to(state)
            }
            (true, false) => {
                retract(motion, profile);
                Transition::to(HomingState::BackoffPostContact)
            }
            (false, false) => Transition::faulted(HomingState::Error, FaultReason::NoContact),
            (false, true) => Transition::to(state),
        },
        HomingState::BackoffPostContact => match (contact, moving) {
            (false, false) => Transition::to(HomingState::MoveSlow),
            (true, false) => Transition::faulted(HomingState::Error, FaultReason::BackoffFailed),
            _ => Transition::to(state),
        },
        HomingState::MoveSlow => {
            if contact {
                motion.set_current_position(0);
                motion.move_to(0);
                motion.stop();
                Transition::completed(HomingState::Finished)
            } else {
                if !moving {
                    motion.set_speed_limit(profile.creep_speed);
                    motion.move_by(-profile.creep);
                }
                Transition::to(state)
            }
        }
        HomingState::Finished | HomingState::Error => Transition::to(state),
    }
}

fn retract<M: MotionPrimitive>(motion: &mut M, profile: &SequenceProfile) {
    motion.set_speed_limit(profile.retract_speed);
    motion.move_by(profile.backoff);
}
