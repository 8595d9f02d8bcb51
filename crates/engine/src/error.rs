use thiserror::Error;

use crate::sim::{ActorId, Direction};

/// Invariant violations raised inside a tick. These point at a programming
/// defect in the caller, never at bad runtime input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimError {
    #[error("actor {0:?} is not registered in the world")]
    UnknownActor(ActorId),
    #[error("actor {actor:?} is chatting with {partner:?}, which no longer exists")]
    MissingChatPartner { actor: ActorId, partner: ActorId },
    #[error("actor {0:?} is not autonomous and cannot chat")]
    NotAutonomous(ActorId),
    #[error("no wander candidates left after excluding {excluded:?}")]
    NoWanderCandidates { excluded: Vec<Direction> },
    #[error("character sheet '{0}' is not in the asset bundle")]
    UnknownCharacter(String),
}
