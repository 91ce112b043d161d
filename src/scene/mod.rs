pub mod bodies;
pub mod glow;
pub mod orbit;
pub mod theme;
