/// State management module
///
/// This module handles all catalog state:
/// - Database access, one connection per statement (library.rs)
/// - Shared data structures (data.rs)
/// - Client and client-type operations (clients.rs)

pub mod clients;
pub mod data;
pub mod library;
