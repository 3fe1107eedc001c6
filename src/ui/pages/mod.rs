pub mod quote;
pub mod saved;
pub mod settings;

pub use quote::QuotePage;
pub use saved::SavedQuotesPage;
pub use settings::SettingsPage;
