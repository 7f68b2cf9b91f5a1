pub mod backend;
pub mod credentials;
pub mod directions;
pub mod google_directions;
pub mod persistence;
pub mod resolver;
pub mod weather;
