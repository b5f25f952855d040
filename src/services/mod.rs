pub mod machines;
pub mod material_calc;
pub mod material_requests;
pub mod orders;
pub mod reconciliation;
pub mod recipes;
pub mod shift_reports;
