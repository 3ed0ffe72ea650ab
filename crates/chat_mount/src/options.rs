//! Options handed to the widget's configuration step.
//!
//! Presentation values are fixed; only the client secret varies per mount.

use std::fmt;
use std::rc::Rc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::MountError;

/// Source of session secrets for a configured widget.
///
/// The widget calls it on startup and again whenever its current secret
/// needs replacing.
#[async_trait(?Send)]
pub trait ClientSecretProvider {
    async fn get_client_secret(&self) -> Result<String, MountError>;
}

#[derive(Clone)]
pub struct ApiOptions {
    provider: Rc<dyn ClientSecretProvider>,
}

impl ApiOptions {
    pub fn new(provider: Rc<dyn ClientSecretProvider>) -> Self {
        Self { provider }
    }

    pub async fn get_client_secret(&self) -> Result<String, MountError> {
        self.provider.get_client_secret().await
    }
}

#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetOptions {
    /// Called by the widget, never serialized.
    #[serde(skip)]
    pub api: ApiOptions,
    #[serde(flatten)]
    pub presentation: Presentation,
}

impl WidgetOptions {
    pub fn new(api: ApiOptions, presentation: Presentation) -> Self {
        Self { api, presentation }
    }
}

impl fmt::Debug for WidgetOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WidgetOptions")
            .field("api", &"<client secret provider>")
            .field("presentation", &self.presentation)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Presentation {
    pub theme: Theme,
    pub composer: Composer,
    pub start_screen: StartScreen,
    pub history: History,
    pub locale: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Theme {
    pub color_scheme: String,
    pub color: ThemeColor,
    pub radius: String,
    pub density: String,
    pub typography: Typography,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeColor {
    pub accent: Accent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Accent {
    pub primary: String,
    pub level: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Typography {
    pub font_family: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Composer {
    pub placeholder: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartScreen {
    pub greeting: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct History {
    pub enabled: bool,
}

impl Default for Presentation {
    /// Dark minimal theme with the yellow accent.
    fn default() -> Self {
        Self {
            theme: Theme {
                color_scheme: "dark".to_string(),
                color: ThemeColor {
                    accent: Accent {
                        primary: "#FFD400".to_string(),
                        level: 2,
                    },
                },
                radius: "round".to_string(),
                density: "compact".to_string(),
                typography: Typography {
                    font_family: "'Inter', system-ui, sans-serif".to_string(),
                },
            },
            composer: Composer {
                placeholder: "Ask about the Nikon D700…".to_string(),
            },
            start_screen: StartScreen {
                greeting: "What can I help you with?".to_string(),
            },
            history: History { enabled: true },
            locale: "en-US".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedSecret(&'static str);

    #[async_trait(?Send)]
    impl ClientSecretProvider for FixedSecret {
        async fn get_client_secret(&self) -> Result<String, MountError> {
            Ok(self.0.to_string())
        }
    }

    fn options() -> WidgetOptions {
        WidgetOptions::new(
            ApiOptions::new(Rc::new(FixedSecret("sk_abc"))),
            Presentation::default(),
        )
    }

    #[test]
    fn serializes_with_widget_keys() {
        let json = serde_json::to_value(options()).unwrap();

        assert!(json.get("api").is_none());
        assert_eq!(json["theme"]["colorScheme"], "dark");
        assert_eq!(json["theme"]["color"]["accent"]["primary"], "#FFD400");
        assert_eq!(json["theme"]["typography"]["fontFamily"], "'Inter', system-ui, sans-serif");
        assert_eq!(json["composer"]["placeholder"], "Ask about the Nikon D700…");
        assert_eq!(json["startScreen"]["greeting"], "What can I help you with?");
        assert_eq!(json["history"]["enabled"], true);
        assert_eq!(json["locale"], "en-US");
    }

    #[tokio::test]
    async fn api_delegates_to_provider() {
        let secret = options().api.get_client_secret().await.unwrap();
        assert_eq!(secret, "sk_abc");
    }

    #[test]
    fn debug_output_has_no_secret() {
        assert!(!format!("{:?}", options()).contains("sk_abc"));
    }
}
