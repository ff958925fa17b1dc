//! Contact Messages Domain
//!
//! Messages sent through the storefront's contact form. Anyone may send
//! one; only admins read and delete them.

pub mod entity;
pub mod error;
pub mod handlers;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod service;

pub use error::{MessageError, MessageResult};
pub use models::{ContactMessage, CreateMessage, MessageListResponse, MessageResponse, NewMessage};
pub use postgres::PgMessageRepository;
pub use repository::{InMemoryMessageRepository, MessageRepository};
pub use service::MessageService;
