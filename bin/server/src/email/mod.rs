//! Mail routes for the mailbridge server.
//!
//! This module provides:
//! - The Gmail account-link handshake (consent dance chained behind the
//!   identity login)
//! - The mail API surface (message listing with caller-supplied
//!   credentials, provider-dispatched unread/send/mark-read)

pub mod link;
pub mod routes;

pub use link::{MailLinkClient, connect, link_callback, link_start};
pub use routes::{gmail_messages, mark_read, send, unread};
