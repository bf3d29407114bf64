pub mod extract;
pub mod middleware;
pub mod rest;
pub mod router;
pub mod state;

// Re-export the router builder so the binary can mount it directly.
pub use middleware::assign_session;
pub use router::build_router;
