pub mod node_chain;
pub mod slot_arena;

pub use node_chain::{ChainCursor, NodeChain};
pub use slot_arena::{SlotArena, SlotId};
