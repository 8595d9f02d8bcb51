mod actor;
mod animation;
mod autonomous;
mod chat;
mod clock;
mod direction;
mod footprint;
mod layout;
mod player;
mod seeding;
mod world;
mod wrap;

pub use actor::{Actor, ActorId, ActorKind, ActorSpec};
pub use animation::{WalkCycle, WalkFrames};
pub use autonomous::{wander_candidates, AutonomousPhase, AutonomousState, ChatSession};
pub use chat::{synthesize_conversation, ChatBubble, ConversationShape, BLANK_BUBBLE_INDEX};
pub use clock::SimClock;
pub use direction::{Direction, DirectionStack};
pub use footprint::{footprints_collide, Footprint};
pub use layout::{LayoutProvider, ObstacleSpot};
pub use player::{PlayerState, SoundCue};
pub use seeding::open_spots;
pub use world::{Obstacle, TickOutcome, World};
pub use wrap::{wrap_ghost, WrapEdge, WrapGhost};
