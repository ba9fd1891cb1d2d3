pub mod discord;
pub mod dispatcher;
pub mod responder;
