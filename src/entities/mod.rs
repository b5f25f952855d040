pub mod machine;
pub mod material_request;
pub mod material_request_item;
pub mod production_order;
pub mod recipe;
pub mod recipe_component;
pub mod shift_report;
pub mod shift_report_row;
