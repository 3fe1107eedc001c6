pub const APP_NAME: &str = "HaulQuote";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
pub const GIT_TAG: Option<&str> = option_env!("GIT_TAG");

/// Release tag when built from one, otherwise the crate version.
pub fn version_label() -> String {
    match GIT_TAG {
        Some(tag) if !tag.trim().is_empty() => tag.trim().to_string(),
        _ => format!("v{APP_VERSION}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_is_never_empty() {
        let label = version_label();
        assert!(label.starts_with('v') || GIT_TAG.is_some());
        assert!(!label.is_empty());
    }
}
