//! Command Handlers 实现
//!
//! 所有 CommandHandler 的具体实现

mod recommend_handler;
mod session_command_handlers;

pub use recommend_handler::RecommendNextHandler;
pub use session_command_handlers::*;
