mod action;
mod backend;
mod event;
mod formats;
mod intent;
mod layer;
mod message;
mod profile;
mod responder;
mod session;
mod slash_commands;
mod storage;
mod structure;
mod workflow;

pub use action::*;
pub use backend::*;
pub use event::*;
pub use formats::*;
pub use intent::*;
pub use layer::*;
pub use message::*;
pub use profile::*;
pub use responder::*;
pub use session::*;
pub use slash_commands::*;
pub use storage::*;
pub use structure::*;
pub use workflow::*;
