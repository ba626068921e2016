/// State management module
///
/// This module handles all application state, including:
/// - Shared data structures (data.rs)
/// - The session controller and its transitions (session.rs)
/// - The result comparator and its derived artifacts (comparator.rs)
/// - Persisted user preferences (settings.rs)

pub mod comparator;
pub mod data;
pub mod session;
pub mod settings;
