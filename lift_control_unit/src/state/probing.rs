//! Probing sequence.
//!
//! Finds the workpiece surface by driving towards positive positions until
//! the probe closes, retracting, then creeping back one step at a time. The
//! step position at the final contact becomes the work origin; recording it
//! is the controller's job on [`SequenceOutcome::Completed`].
//!
//! Only evaluated once homing is `Finished`.
//!
//! [`SequenceOutcome::Completed`]: super::SequenceOutcome::Completed

use lift_common::axis::fault::FaultReason;
use lift_common::axis::state::ProbingState;
use lift_common::hal::MotionPrimitive;

use super::{SequenceProfile, Transition};

/// Evaluate the probing sequence for one tick.
///
/// `contact` is the probe input as sampled at the start of the tick.
pub fn step<M: MotionPrimitive>(
    state: ProbingState,
    contact: bool,
    motion: &mut M,
    profile: &SequenceProfile,
) -> Transition<ProbingState> {
    let moving = motion.is_moving();
    match state {
        ProbingState::NotProbed => {
            if contact {
                retract(motion, profile);
                Transition::to(ProbingState::BackoffPostContact)
            } else {
                motion.set_speed_limit(profile.approach_speed);
                motion.move_by(profile.max_travel);
                Transition::to(ProbingState::MoveFast)
            }
        }
        ProbingState::MoveFast => match (contact, moving) {
            (true, true) => {
                motion.stop();
                Transition::to(state)
            }
            (true, false) => {
                retract(motion, profile);
                Transition::to(ProbingState::BackoffPostContact)
            }
            (false, false) => Transition::faulted(ProbingState::Error, FaultReason::NoContact),
            (false, true) => Transition::to(state),
        },
        ProbingState::BackoffPostContact => match (contact, moving) {
            (false, false) => Transition::to(ProbingState::MoveSlow),
            (true, false) => Transition::faulted(ProbingState::Error, FaultReason::BackoffFailed),
            _ => Transition::to(state),
        },
        ProbingState::MoveSlow => {
            if contact {
                motion.stop();
                Transition::completed(ProbingState::Finished)
            } else {
                if !moving {
                    motion.set_speed_limit(profile.creep_speed);
                    motion.move_by(profile.creep);
                }
                Transition::to(state)
            }
        }
        ProbingState::Finished | ProbingState::Error => Transition::to(state),
    }
}

fn retract<M: MotionPrimitive>(motion: &mut M, profile: &SequenceProfile) {
    motion.set_speed_limit(profile.retract_speed);
    motion.move_by(-profile.backoff);
}
