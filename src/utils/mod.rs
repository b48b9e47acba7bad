pub mod consolidation;
pub mod data;
pub mod ev_analysis;
pub mod ev_calculator;
