pub mod header;
pub mod login_form;
pub mod product_form;
pub mod product_table;
pub mod search_panel;
pub mod upload_area;
