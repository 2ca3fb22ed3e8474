use crate::domain::CanonicalProduct;

pub const STYLE_ELEMENT_ID: &str = "cc-earn-widget-styles";
pub const MOUNT_CLASS: &str = "cc-earn-widget-container";

pub const LOADING_MESSAGE: &str = "Loading Earn products...";
pub const EMPTY_MESSAGE: &str = "No products available";
pub const ERROR_MESSAGE: &str = "Failed to load Earn products. Please try again later.";

pub const WIDGET_STYLES: &str = r#"
.cc-earn-widget { font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, Helvetica, Arial, sans-serif; max-width: 500px; margin: 0 auto; border: 1px solid #e2e8f0; border-radius: 8px; padding: 16px; background-color: #ffffff; color: #0f172a; }
.cc-earn-widget-header { font-weight: 700; font-size: 1.25rem; margin-bottom: 16px; }
.cc-earn-product { padding: 16px; margin-bottom: 12px; border: 1px solid #e2e8f0; border-radius: 8px; background-color: #f8fafc; }
.cc-earn-product-header { display: flex; justify-content: space-between; align-items: flex-start; margin-bottom: 12px; }
.cc-earn-product-name { font-weight: 600; font-size: 1.125rem; }
.cc-earn-product-apy { font-weight: 700; font-size: 1.25rem; color: #059669; }
.cc-earn-product-button { background-color: #1e3a8a; color: white; border: none; border-radius: 4px; padding: 8px 16px; font-weight: 500; cursor: pointer; width: 100%; }
.cc-earn-product-button:hover { background-color: #1e40af; }
.cc-earn-loading { text-align: center; padding: 24px; }
.cc-earn-error { text-align: center; padding: 24px; color: #dc2626; }
"#;

/// What the mount point shows.
#[derive(Debug, Clone, PartialEq)]
pub enum WidgetView {
    Loading,
    Products(Vec<CanonicalProduct>),
    Empty,
    Error,
}

impl WidgetView {
    pub fn message(&self) -> Option<&'static str> {
        match self {
            WidgetView::Loading => Some(LOADING_MESSAGE),
            WidgetView::Empty => Some(EMPTY_MESSAGE),
            WidgetView::Error => Some(ERROR_MESSAGE),
            WidgetView::Products(_) => None,
        }
    }
}

/// A view plus the theme class to put on the widget root.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub theme_class: Option<String>,
    pub view: WidgetView,
}

/// `dark` and `partner-*` themes get a class; anything else uses the default look.
pub fn theme_class(theme: &str) -> Option<String> {
    if theme == "dark" {
        Some("theme-dark".to_string())
    } else if theme.starts_with("partner-") {
        Some(format!("theme-{}", theme))
    } else {
        None
    }
}
