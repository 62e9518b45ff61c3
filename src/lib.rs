//! Miskatonic: terminal admin client for the Miskatonic book manager
//!
//! Students, books and borrow codes live on a REST server. This crate keeps a
//! client-side cache of those collections ([`store::DataCache`]), tracks what
//! the user is looking at ([`store::FocusState`]) and routes every change
//! through one message bus ([`dispatch`]). The interactive TUI and the
//! headless commands both drive a [`Session`].

pub mod cli;
pub mod commands;
pub mod config;
pub mod dispatch;
pub mod gateway;
pub mod http;
pub mod logging;
pub mod models;
pub mod session;
pub mod store;
pub mod tui;

pub use config::{AppConfig, Environment};
pub use dispatch::{DataAction, Dispatcher, FocusAction, Message, RawAction, ViewChange};
pub use gateway::{Gateway, GatewayError, HttpGateway};
pub use models::{Item, ItemData, ItemType, Scope};
pub use session::Session;
pub use store::{DataCache, FocusState};
