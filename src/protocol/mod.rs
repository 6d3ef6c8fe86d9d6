//! # RPC Protocol Layer
//!
//! Message schemas and packet dispatch.
//!
//! ## Components
//! - **Message**: `PlayerState`, `ChatMessage`, `GameObject` and the `Message` enum
//! - **Dispatcher**: decode table keyed by message type, routing to handlers
//!
//! ## Decode Path
//! ```text
//! header -> type byte -> payload slice -> BitReader + record codec   (PlayerUpdate, ChatMessage)
//!                                      -> FieldReader + tagged codec (ObjectUpdate)
//!                                      -> nothing                    (Ping)
//! ```

pub mod dispatcher;
pub mod message;
