pub mod estimate_panel;
pub mod tier_table;
pub mod toast;
