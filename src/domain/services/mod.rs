pub mod actions;
mod chats;
mod context;
pub mod correction;
#[cfg(test)]
pub mod fake_backend;
mod local_store;
mod orchestrator;
mod profiles;
mod resolver;

pub use chats::*;
pub use context::*;
pub use local_store::*;
pub use orchestrator::*;
pub use profiles::*;
pub use resolver::*;
