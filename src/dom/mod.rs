pub mod panel;
pub mod tooltips;
