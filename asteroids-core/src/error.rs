use core::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RuleCode {
    ShipHeadingRange,
    ShipNonFinite,
    ShipDamageRange,
    PhotonLimit,
    PhotonState,
    AsteroidVertexCount,
    AsteroidState,
    DebrisState,
    ScoreGainState,
    ParticleState,
    TransmissionTiming,
}

impl fmt::Display for RuleCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ShipHeadingRange => write!(f, "SHIP_HEADING_RANGE"),
            Self::ShipNonFinite => write!(f, "SHIP_NON_FINITE"),
            Self::ShipDamageRange => write!(f, "SHIP_DAMAGE_RANGE"),
            Self::PhotonLimit => write!(f, "PHOTON_LIMIT"),
            Self::PhotonState => write!(f, "PHOTON_STATE"),
            Self::AsteroidVertexCount => write!(f, "ASTEROID_VERTEX_COUNT"),
            Self::AsteroidState => write!(f, "ASTEROID_STATE"),
            Self::DebrisState => write!(f, "DEBRIS_STATE"),
            Self::ScoreGainState => write!(f, "SCORE_GAIN_STATE"),
            Self::ParticleState => write!(f, "PARTICLE_STATE"),
            Self::TransmissionTiming => write!(f, "TRANSMISSION_TIMING"),
        }
    }
}

impl std::error::Error for RuleCode {}

#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    FieldTooSmall { width: f32, height: f32 },
    FieldTooLarge { width: f32, height: f32, max: f32 },
    NonFinite { field: &'static str },
    TextSizeOutOfRange { text_size: f32 },
    EmptyText { field: &'static str },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FieldTooSmall { width, height } => write!(
                f,
                "play field too small: {width}x{height} (both sides must be positive)"
            ),
            Self::FieldTooLarge { width, height, max } => write!(
                f,
                "play field too large: {width}x{height} (each side must be at most {max})"
            ),
            Self::NonFinite { field } => write!(f, "config value `{field}` is not finite"),
            Self::TextSizeOutOfRange { text_size } => {
                write!(f, "text size out of range: {text_size} (expected 0 < size < 1)")
            }
            Self::EmptyText { field } => write!(f, "config text `{field}` must not be empty"),
        }
    }
}

impl std::error::Error for ConfigError {}
