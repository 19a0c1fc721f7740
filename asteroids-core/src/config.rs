use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_FIELD_HEIGHT, DEFAULT_FIELD_WIDTH, DEFAULT_GLYPH_ADVANCE, DEFAULT_LABEL_CHAR_SIZE,
    DEFAULT_TEXT_SIZE, FIELD_SIDE_MAX, TRANSMISSION_LABEL, TRANSMISSION_MESSAGE, TRANSMISSION_STATIC_LABEL,
};
use crate::error::ConfigError;
use crate::geometry::Bounds;

/// Everything a host supplies once when it creates a game.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub seed: u32,
    pub x_width: f32,
    pub y_height: f32,
    /// Digit glyph scale for score gains, relative to the field size.
    pub text_size: f32,
    /// Glyph height used for transmission text before any shrink-to-fit.
    pub label_char_size: f32,
    /// Horizontal advance of one transmission glyph as a fraction of its height.
    pub glyph_advance: f32,
    pub transmission_label: String,
    pub static_label: String,
    pub message: String,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            seed: 0xDEAD_BEEF,
            x_width: DEFAULT_FIELD_WIDTH,
            y_height: DEFAULT_FIELD_HEIGHT,
            text_size: DEFAULT_TEXT_SIZE,
            label_char_size: DEFAULT_LABEL_CHAR_SIZE,
            glyph_advance: DEFAULT_GLYPH_ADVANCE,
            transmission_label: TRANSMISSION_LABEL.to_string(),
            static_label: TRANSMISSION_STATIC_LABEL.to_string(),
            message: TRANSMISSION_MESSAGE.to_string(),
        }
    }
}

impl GameConfig {
    pub fn with_seed(seed: u32) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::centered(self.x_width, self.y_height)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let numbers = [
            ("x_width", self.x_width),
            ("y_height", self.y_height),
            ("text_size", self.text_size),
            ("label_char_size", self.label_char_size),
            ("glyph_advance", self.glyph_advance),
        ];
        for (field, value) in numbers {
            if !value.is_finite() {
                return Err(ConfigError::NonFinite { field });
            }
        }

        if self.x_width <= 0.0 || self.y_height <= 0.0 {
            return Err(ConfigError::FieldTooSmall {
                width: self.x_width,
                height: self.y_height,
            });
        }
        if self.x_width > FIELD_SIDE_MAX || self.y_height > FIELD_SIDE_MAX {
            return Err(ConfigError::FieldTooLarge {
                width: self.x_width,
                height: self.y_height,
                max: FIELD_SIDE_MAX,
            });
        }

        if self.text_size <= 0.0 || self.text_size >= 1.0 {
            return Err(ConfigError::TextSizeOutOfRange {
                text_size: self.text_size,
            });
        }
        if self.label_char_size <= 0.0 || self.glyph_advance <= 0.0 {
            return Err(ConfigError::TextSizeOutOfRange {
                text_size: self.label_char_size,
            });
        }

        let texts = [
            ("transmission_label", &self.transmission_label),
            ("static_label", &self.static_label),
            ("message", &self.message),
        ];
        for (field, text) in texts {
            if text.trim().is_empty() {
                return Err(ConfigError::EmptyText { field });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        GameConfig::default()
            .validate()
            .expect("default config must validate");
    }

    #[test]
    fn rejects_degenerate_field() {
        let config = GameConfig {
            x_width: 0.0,
            ..GameConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::FieldTooSmall { .. })
        ));

        let config = GameConfig {
            y_height: f32::NAN,
            ..GameConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::NonFinite { field: "y_height" })
        );
    }

    #[test]
    fn rejects_oversized_field() {
        let config = GameConfig {
            x_width: 1.0e5,
            y_height: 1.0e5,
            ..GameConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::FieldTooLarge { .. })
        ));

        let config = GameConfig {
            x_width: FIELD_SIDE_MAX,
            y_height: FIELD_SIDE_MAX,
            ..GameConfig::default()
        };
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn rejects_blank_message() {
        let config = GameConfig {
            message: "   ".to_string(),
            ..GameConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::EmptyText { field: "message" })
        );
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config: GameConfig =
            serde_json::from_str(r#"{"seed": 7, "x_width": 2.0}"#).expect("config json");
        assert_eq!(config.seed, 7);
        assert_eq!(config.x_width, 2.0);
        assert_eq!(config.y_height, DEFAULT_FIELD_HEIGHT);
        assert_eq!(config.message, TRANSMISSION_MESSAGE);
    }
}
