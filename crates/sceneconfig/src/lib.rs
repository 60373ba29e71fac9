//! Scene documents consumed by the `shading` host.
//!
//! A document names one or more scenes, each selecting a shading variant and
//! optionally overriding the palette, shape and folding parameters that the
//! variant would otherwise take from its built-in preset. Every table carries
//! serde defaults so sparse files stay valid; `SceneDocument::validate` and
//! `SceneEntry::validate` reject parameters that would make the stage produce
//! non-finite pixels.
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to parse scene document: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid scene document: {0}")]
    Invalid(String),
}

/// Shading strategy selected by a scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum VariantKind {
    TwinRings,
    Highlight,
    Tunnel,
}

impl VariantKind {
    pub const ALL: [VariantKind; 3] = [
        VariantKind::TwinRings,
        VariantKind::Highlight,
        VariantKind::Tunnel,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            VariantKind::TwinRings => "twin-rings",
            VariantKind::Highlight => "highlight",
            VariantKind::Tunnel => "tunnel",
        }
    }
}

impl fmt::Display for VariantKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VariantKind {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized = raw.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "twin-rings" | "twin_rings" | "rings" | "a" => Ok(VariantKind::TwinRings),
            "highlight" | "b" => Ok(VariantKind::Highlight),
            "tunnel" | "kaleidoscope" | "c" => Ok(VariantKind::Tunnel),
            other => Err(format!(
                "unknown variant '{other}'; expected twin-rings, highlight, or tunnel"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FadeCurve {
    Linear,
    #[default]
    Smoothstep,
    EaseInOut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AntialiasSetting {
    Auto,
    Off,
    Samples2,
    Samples4,
    Samples8,
    Samples16,
}

impl AntialiasSetting {
    pub fn from_samples(samples: u32) -> Option<Self> {
        match samples {
            0 | 1 => Some(Self::Off),
            2 => Some(Self::Samples2),
            4 => Some(Self::Samples4),
            8 => Some(Self::Samples8),
            16 => Some(Self::Samples16),
            _ => None,
        }
    }
}

/// Color channel addressed by palette modulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Red,
    #[default]
    Green,
    Blue,
}

impl Channel {
    pub fn index(self) -> usize {
        match self {
            Channel::Red => 0,
            Channel::Green => 1,
            Channel::Blue => 2,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SceneDocument {
    pub version: u32,
    #[serde(default)]
    pub defaults: Defaults,
    #[serde(default)]
    pub scenes: BTreeMap<String, SceneEntry>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Defaults {
    pub scene: Option<String>,
    #[serde(default, deserialize_with = "deserialize_size_opt")]
    pub size: Option<(u32, u32)>,
    pub fps: Option<f32>,
    #[serde(default, deserialize_with = "deserialize_antialias_opt")]
    pub antialias: Option<AntialiasSetting>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SceneEntry {
    pub variant: VariantKind,
    #[serde(
        default,
        deserialize_with = "deserialize_duration_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub fade_in: Option<Duration>,
    #[serde(default)]
    pub fade_curve: FadeCurve,
    #[serde(default)]
    pub fade: Option<f32>,
    #[serde(default)]
    pub mouse: Option<[f32; 2]>,
    #[serde(default)]
    pub palette: Option<PaletteTable>,
    #[serde(default)]
    pub rings: RingsTable,
    #[serde(default)]
    pub highlight: HighlightTable,
    #[serde(default)]
    pub tunnel: TunnelTable,
    #[serde(default)]
    pub transform: Option<TransformTable>,
}

/// Cosine palette coefficients, one entry per RGB channel.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct PaletteTable {
    pub bias: [f32; 3],
    pub amplitude: [f32; 3],
    pub frequency: [f32; 3],
    pub phase: [f32; 3],
}

impl PaletteTable {
    fn components(&self) -> impl Iterator<Item = f32> + '_ {
        self.bias
            .iter()
            .chain(&self.amplitude)
            .chain(&self.frequency)
            .chain(&self.phase)
            .copied()
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RingsTable {
    /// Horizontal distance of each ring center from the screen center.
    pub offset: f32,
    /// Radius the ring band is centered on, in doubled screen units.
    pub radius: f32,
    /// Number of angular lobes on the ring threshold mask.
    pub lobes: f32,
    /// Angular velocity of the lobes in radians per second.
    pub spin_rate: f32,
    /// Width of the smoothstep edge on the ring mask.
    pub edge: f32,
    pub guide: Option<GuideTable>,
}

impl Default for RingsTable {
    fn default() -> Self {
        Self {
            offset: 0.5,
            radius: 0.5,
            lobes: 10.0,
            spin_rate: 0.04,
            edge: 0.02,
            guide: None,
        }
    }
}

/// Optional segment overlay drawn on top of the rings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct GuideTable {
    pub from: [f32; 2],
    pub to: [f32; 2],
    pub divisor: [f32; 3],
    /// Exponent applied to time before it scales the green divisor.
    pub time_exponent: f32,
}

impl Default for GuideTable {
    fn default() -> Self {
        Self {
            from: [-1.0, 0.0],
            to: [1.0, 0.0],
            divisor: [3.0, 2.0, 1.0],
            time_exponent: 8.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct HighlightTable {
    pub half_diagonals: [f32; 2],
    pub palette: Option<PaletteTable>,
    pub modulation_rate: f32,
    pub modulated_channel: Channel,
}

impl Default for HighlightTable {
    fn default() -> Self {
        Self {
            half_diagonals: [0.6, 0.3],
            palette: None,
            modulation_rate: 0.1,
            modulated_channel: Channel::Green,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TunnelTable {
    pub fold_scale: f32,
    pub fold_offset: f32,
    pub wobble: f32,
    pub wobble_rate: f32,
    pub half_diagonals: [f32; 2],
    pub capsule: CapsuleTable,
    pub palette_offsets: [f32; 3],
    pub palette_speed: f32,
}

impl Default for TunnelTable {
    fn default() -> Self {
        Self {
            fold_scale: 1.5,
            fold_offset: 0.5,
            wobble: 0.25,
            wobble_rate: 5.0,
            half_diagonals: [0.3, 0.15],
            capsule: CapsuleTable::default(),
            palette_offsets: [0.0, 0.4, 0.8],
            palette_speed: 0.4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CapsuleTable {
    pub start_radius: f32,
    pub end_radius: f32,
    pub height: f32,
}

impl Default for CapsuleTable {
    fn default() -> Self {
        Self {
            start_radius: 0.1,
            end_radius: 0.05,
            height: 0.2,
        }
    }
}

/// Perspective transform applied by the vertex stage.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TransformTable {
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub translate: [f32; 3],
}

impl Default for TransformTable {
    fn default() -> Self {
        Self {
            fov_degrees: 90.0,
            near: 0.1,
            far: 100.0,
            translate: [0.0, 0.0, -1.0],
        }
    }
}

impl SceneEntry {
    /// Built-in scene for a variant, equivalent to a file that only names it.
    ///
    /// The highlight variant reads `fade`, so its preset binds a constant
    /// fully-visible fade.
    pub fn preset(variant: VariantKind) -> Self {
        Self {
            variant,
            fade_in: None,
            fade_curve: FadeCurve::default(),
            fade: matches!(variant, VariantKind::Highlight).then_some(1.0),
            mouse: None,
            palette: None,
            rings: RingsTable::default(),
            highlight: HighlightTable::default(),
            tunnel: TunnelTable::default(),
            transform: None,
        }
    }

    pub fn validate(&self, name: &str) -> Result<(), ConfigError> {
        if let Some(palette) = &self.palette {
            validate_palette(name, "palette", palette)?;
        }

        if let Some(fade) = self.fade {
            if !(0.0..=1.0).contains(&fade) {
                return Err(ConfigError::Invalid(format!(
                    "scene '{name}' fade must be within [0, 1]"
                )));
            }
            if self.fade_in.is_some() {
                return Err(ConfigError::Invalid(format!(
                    "scene '{name}' sets both fade and fade_in; pick one"
                )));
            }
        }

        if let Some(mouse) = self.mouse {
            if mouse.iter().any(|v| !v.is_finite()) {
                return Err(ConfigError::Invalid(format!(
                    "scene '{name}' mouse position must be finite"
                )));
            }
        }

        let rings = &self.rings;
        let ring_values = [
            rings.offset,
            rings.radius,
            rings.lobes,
            rings.spin_rate,
            rings.edge,
        ];
        if ring_values.iter().any(|v| !v.is_finite()) {
            return Err(ConfigError::Invalid(format!(
                "scene '{name}' ring parameters must be finite"
            )));
        }
        if rings.edge <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "scene '{name}' rings.edge must be greater than zero"
            )));
        }
        if let Some(guide) = &rings.guide {
            let endpoints = guide.from.iter().chain(&guide.to);
            if endpoints.chain([&guide.time_exponent]).any(|v| !v.is_finite()) {
                return Err(ConfigError::Invalid(format!(
                    "scene '{name}' rings.guide endpoints and time_exponent must be finite"
                )));
            }
            if guide.divisor.iter().any(|v| *v == 0.0 || !v.is_finite()) {
                return Err(ConfigError::Invalid(format!(
                    "scene '{name}' rings.guide.divisor components must be finite and non-zero"
                )));
            }
        }

        let highlight = &self.highlight;
        validate_half_diagonals(name, "highlight", highlight.half_diagonals)?;
        if let Some(palette) = &highlight.palette {
            validate_palette(name, "highlight.palette", palette)?;
        }
        if !highlight.modulation_rate.is_finite() {
            return Err(ConfigError::Invalid(format!(
                "scene '{name}' highlight.modulation_rate must be finite"
            )));
        }

        let tunnel = &self.tunnel;
        if !tunnel.fold_scale.is_finite() || tunnel.fold_scale == 0.0 {
            return Err(ConfigError::Invalid(format!(
                "scene '{name}' tunnel.fold_scale must be finite and non-zero"
            )));
        }
        let tunnel_values = [
            tunnel.fold_offset,
            tunnel.wobble,
            tunnel.wobble_rate,
            tunnel.palette_speed,
        ];
        if tunnel_values
            .iter()
            .chain(&tunnel.palette_offsets)
            .any(|v| !v.is_finite())
        {
            return Err(ConfigError::Invalid(format!(
                "scene '{name}' tunnel parameters must be finite"
            )));
        }
        validate_half_diagonals(name, "tunnel", tunnel.half_diagonals)?;
        let capsule = &tunnel.capsule;
        let radii = [capsule.start_radius, capsule.end_radius];
        if radii.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(ConfigError::Invalid(format!(
                "scene '{name}' tunnel.capsule radii must be finite and non-negative"
            )));
        }
        if !capsule.height.is_finite() || capsule.height <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "scene '{name}' tunnel.capsule.height must be greater than zero"
            )));
        }

        if let Some(transform) = &self.transform {
            if !(1.0..179.0).contains(&transform.fov_degrees) {
                return Err(ConfigError::Invalid(format!(
                    "scene '{name}' transform.fov_degrees must be within [1, 179)"
                )));
            }
            let clip = [transform.near, transform.far];
            if clip.iter().any(|v| !v.is_finite())
                || transform.near <= 0.0
                || transform.far <= transform.near
            {
                return Err(ConfigError::Invalid(format!(
                    "scene '{name}' transform requires 0 < near < far"
                )));
            }
            if transform.translate.iter().any(|v| !v.is_finite()) {
                return Err(ConfigError::Invalid(format!(
                    "scene '{name}' transform.translate must be finite"
                )));
            }
        }

        Ok(())
    }
}

fn validate_palette(scene: &str, field: &str, palette: &PaletteTable) -> Result<(), ConfigError> {
    if palette.components().any(|v| !v.is_finite()) {
        return Err(ConfigError::Invalid(format!(
            "scene '{scene}' {field} components must be finite"
        )));
    }
    Ok(())
}

fn validate_half_diagonals(scene: &str, field: &str, value: [f32; 2]) -> Result<(), ConfigError> {
    if value.iter().any(|v| !v.is_finite() || *v <= 0.0) {
        return Err(ConfigError::Invalid(format!(
            "scene '{scene}' {field}.half_diagonals must be positive"
        )));
    }
    Ok(())
}

impl SceneDocument {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let raw: SceneDocument = toml::from_str(input)?;
        raw.validate()?;
        Ok(raw)
    }

    pub fn scene(&self, name: &str) -> Option<&SceneEntry> {
        self.scenes.get(name)
    }

    pub fn default_scene(&self) -> Option<&str> {
        self.defaults.scene.as_deref()
    }

    /// Picks the requested scene, then the declared default, then the only
    /// scene when the document holds exactly one.
    pub fn select(&self, name: Option<&str>) -> Result<(&str, &SceneEntry), ConfigError> {
        let wanted = match name.or(self.default_scene()) {
            Some(wanted) => wanted,
            None if self.scenes.len() == 1 => {
                let (name, entry) = self
                    .scenes
                    .iter()
                    .next()
                    .ok_or_else(|| ConfigError::Invalid("document defines no scenes".into()))?;
                return Ok((name.as_str(), entry));
            }
            None => {
                return Err(ConfigError::Invalid(
                    "document defines several scenes but no defaults.scene; name one explicitly"
                        .into(),
                ))
            }
        };

        self.scenes
            .get_key_value(wanted)
            .map(|(name, entry)| (name.as_str(), entry))
            .ok_or_else(|| ConfigError::Invalid(format!("unknown scene '{wanted}'")))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version != 1 {
            return Err(ConfigError::Invalid(format!(
                "unsupported scene document version {}; expected 1",
                self.version
            )));
        }

        if self.scenes.is_empty() {
            return Err(ConfigError::Invalid(
                "scene document must define at least one scene".into(),
            ));
        }

        for (name, entry) in &self.scenes {
            if name.trim().is_empty() {
                return Err(ConfigError::Invalid("scene names may not be empty".into()));
            }
            entry.validate(name)?;
        }

        if let Some(default_scene) = &self.defaults.scene {
            if !self.scenes.contains_key(default_scene) {
                return Err(ConfigError::Invalid(format!(
                    "defaults.scene references unknown scene '{default_scene}'"
                )));
            }
        }

        if let Some(fps) = self.defaults.fps {
            if !fps.is_finite() || fps <= 0.0 {
                return Err(ConfigError::Invalid("defaults.fps must be > 0".into()));
            }
        }

        Ok(())
    }
}

/// Parses `WIDTHxHEIGHT` into non-zero pixel dimensions.
pub fn parse_size(raw: &str) -> Result<(u32, u32), String> {
    let (w, h) = raw
        .trim()
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("invalid size '{raw}'; expected WIDTHxHEIGHT"))?;
    let width = w
        .trim()
        .parse::<u32>()
        .map_err(|_| format!("invalid width in size '{raw}'"))?;
    let height = h
        .trim()
        .parse::<u32>()
        .map_err(|_| format!("invalid height in size '{raw}'"))?;
    if width == 0 || height == 0 {
        return Err(format!("size '{raw}' must be greater than zero"));
    }
    Ok((width, height))
}

pub fn parse_antialias(raw: &str) -> Result<AntialiasSetting, String> {
    let normalized = raw.trim().to_ascii_lowercase();
    match normalized.as_str() {
        "auto" | "max" | "default" => Ok(AntialiasSetting::Auto),
        "off" | "none" | "disable" | "disabled" => Ok(AntialiasSetting::Off),
        other => other
            .parse::<u32>()
            .ok()
            .and_then(AntialiasSetting::from_samples)
            .ok_or_else(|| format!("invalid antialias setting '{other}'")),
    }
}

/// Parses a duration given as plain seconds (`"2.5"`) or in humantime form
/// (`"1s 500ms"`).
pub fn parse_duration(raw: &str) -> Result<Duration, String> {
    let trimmed = raw.trim();
    if let Ok(seconds) = trimmed.parse::<f64>() {
        if !seconds.is_finite() || seconds < 0.0 {
            return Err(format!("duration '{raw}' must be a non-negative number of seconds"));
        }
        return Ok(Duration::from_secs_f64(seconds));
    }
    humantime::parse_duration(trimmed).map_err(|err| format!("invalid duration '{raw}': {err}"))
}

fn deserialize_duration_opt<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
where
    D: Deserializer<'de>,
{
    struct Visitor;
    impl<'de> de::Visitor<'de> for Visitor {
        type Value = Option<Duration>;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            formatter.write_str("a duration as number of seconds or human-readable string")
        }

        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            parse_duration(v).map(Some).map_err(E::custom)
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Some(Duration::from_secs(v)))
        }

        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if v < 0 {
                return Err(E::custom("duration must be non-negative"));
            }
            Ok(Some(Duration::from_secs(v as u64)))
        }

        fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if v.is_nan() || v.is_sign_negative() {
                return Err(E::custom("duration must be non-negative"));
            }
            Ok(Some(Duration::from_secs_f64(v)))
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }
    }

    deserializer.deserialize_any(Visitor)
}

fn deserialize_size_opt<'de, D>(deserializer: D) -> Result<Option<(u32, u32)>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Helper {
        Str(String),
        Pair([u32; 2]),
    }

    let helper: Option<Helper> = Option::deserialize(deserializer)?;
    match helper {
        None => Ok(None),
        Some(Helper::Str(raw)) => parse_size(&raw).map(Some).map_err(de::Error::custom),
        Some(Helper::Pair([width, height])) => {
            if width == 0 || height == 0 {
                return Err(de::Error::custom("size must be greater than zero"));
            }
            Ok(Some((width, height)))
        }
    }
}

fn deserialize_antialias_opt<'de, D>(deserializer: D) -> Result<Option<AntialiasSetting>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Helper {
        Str(String),
        Num(i64),
    }

    let helper: Option<Helper> = Option::deserialize(deserializer)?;
    match helper {
        None => Ok(None),
        Some(Helper::Str(raw)) => parse_antialias(&raw).map(Some).map_err(de::Error::custom),
        Some(Helper::Num(value)) => u32::try_from(value)
            .ok()
            .and_then(AntialiasSetting::from_samples)
            .map(Some)
            .ok_or_else(|| de::Error::custom(format!("invalid antialias setting '{value}'"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
version = 1

[defaults]
scene = "rings"
size = "640x360"
fps = 24
antialias = 4

[scenes.rings]
variant = "twin-rings"
fade_in = "1.5s"
fade_curve = "ease-in-out"

[scenes.rings.rings]
lobes = 6
guide = { from = [-0.5, 0.0], to = [0.5, 0.0] }

[scenes.glow]
variant = "highlight"
fade = 0.5

[scenes.glow.highlight]
half_diagonals = [0.4, 0.2]
modulated_channel = "blue"

[scenes.glow.highlight.palette]
bias = [0.5, 0.5, 0.5]
amplitude = [0.5, 0.5, 0.5]
frequency = [1.0, 1.0, 1.0]
phase = [0.0, 0.33, 0.67]

[scenes.deep]
variant = "tunnel"

[scenes.deep.tunnel]
fold_scale = 2.0
capsule = { start_radius = 0.2, end_radius = 0.1, height = 0.3 }

[scenes.deep.transform]
fov_degrees = 60
"#;

    #[test]
    fn parses_sample_document() {
        let doc = SceneDocument::from_toml_str(SAMPLE).expect("parse document");
        assert_eq!(doc.version, 1);
        assert_eq!(doc.default_scene(), Some("rings"));
        assert_eq!(doc.defaults.size, Some((640, 360)));
        assert_eq!(doc.defaults.antialias, Some(AntialiasSetting::Samples4));

        let rings = doc.scene("rings").unwrap();
        assert_eq!(rings.variant, VariantKind::TwinRings);
        assert_eq!(rings.fade_in, Some(Duration::from_millis(1500)));
        assert_eq!(rings.fade_curve, FadeCurve::EaseInOut);
        assert_eq!(rings.rings.lobes, 6.0);
        assert_eq!(rings.rings.radius, 0.5);
        let guide = rings.rings.guide.as_ref().unwrap();
        assert_eq!(guide.divisor, [3.0, 2.0, 1.0]);

        let glow = doc.scene("glow").unwrap();
        assert_eq!(glow.highlight.modulated_channel, Channel::Blue);
        assert_eq!(glow.highlight.modulation_rate, 0.1);
        assert!(glow.highlight.palette.is_some());

        let deep = doc.scene("deep").unwrap();
        assert_eq!(deep.tunnel.fold_scale, 2.0);
        assert_eq!(deep.tunnel.capsule.height, 0.3);
        assert_eq!(deep.transform.as_ref().unwrap().fov_degrees, 60.0);
        assert_eq!(deep.transform.as_ref().unwrap().near, 0.1);
    }

    #[test]
    fn selects_default_then_single_scene() {
        let doc = SceneDocument::from_toml_str(SAMPLE).unwrap();
        assert_eq!(doc.select(None).unwrap().0, "rings");
        assert_eq!(doc.select(Some("deep")).unwrap().0, "deep");
        assert!(doc.select(Some("missing")).is_err());

        let single = SceneDocument::from_toml_str(
            r#"
version = 1
[scenes.only]
variant = "tunnel"
"#,
        )
        .unwrap();
        assert_eq!(single.select(None).unwrap().0, "only");
    }

    #[test]
    fn rejects_unknown_default_scene() {
        let doc = r#"
version = 1

[defaults]
scene = "missing"

[scenes.main]
variant = "tunnel"
"#;
        let err = SceneDocument::from_toml_str(doc).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_unknown_variant_at_parse_time() {
        let doc = r#"
version = 1

[scenes.main]
variant = "plasma"
"#;
        let err = SceneDocument::from_toml_str(doc).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn rejects_degenerate_shapes() {
        let zero_height = r#"
version = 1

[scenes.main]
variant = "tunnel"

[scenes.main.tunnel.capsule]
height = 0.0
"#;
        assert!(matches!(
            SceneDocument::from_toml_str(zero_height).unwrap_err(),
            ConfigError::Invalid(_)
        ));

        let flat_rhombus = r#"
version = 1

[scenes.main]
variant = "highlight"
fade = 1.0

[scenes.main.highlight]
half_diagonals = [0.0, 0.3]
"#;
        assert!(matches!(
            SceneDocument::from_toml_str(flat_rhombus).unwrap_err(),
            ConfigError::Invalid(_)
        ));
    }

    #[test]
    fn rejects_non_finite_shape_parameters() {
        let nan_radius = r#"
version = 1

[scenes.deep]
variant = "tunnel"

[scenes.deep.tunnel.capsule]
start_radius = nan
"#;
        assert!(matches!(
            SceneDocument::from_toml_str(nan_radius).unwrap_err(),
            ConfigError::Invalid(_)
        ));

        let infinite_guide = r#"
version = 1

[scenes.r]
variant = "twin-rings"

[scenes.r.rings.guide]
from = [inf, 0.0]
"#;
        assert!(matches!(
            SceneDocument::from_toml_str(infinite_guide).unwrap_err(),
            ConfigError::Invalid(_)
        ));

        let steep_guide = r#"
version = 1

[scenes.r]
variant = "twin-rings"

[scenes.r.rings.guide]
time_exponent = -inf
"#;
        assert!(SceneDocument::from_toml_str(steep_guide).is_err());

        let far_camera = r#"
version = 1

[scenes.deep]
variant = "tunnel"

[scenes.deep.transform]
translate = [0.0, nan, -1.0]
"#;
        assert!(SceneDocument::from_toml_str(far_camera).is_err());
    }

    #[test]
    fn rejects_conflicting_fades() {
        let doc = r#"
version = 1

[scenes.main]
variant = "twin-rings"
fade = 0.5
fade_in = "2s"
"#;
        assert!(matches!(
            SceneDocument::from_toml_str(doc).unwrap_err(),
            ConfigError::Invalid(_)
        ));
    }

    #[test]
    fn highlight_preset_binds_constant_fade() {
        let preset = SceneEntry::preset(VariantKind::Highlight);
        assert_eq!(preset.fade, Some(1.0));
        assert!(preset.validate("preset").is_ok());
        assert_eq!(SceneEntry::preset(VariantKind::Tunnel).fade, None);
    }

    #[test]
    fn parses_sizes_and_variants() {
        assert_eq!(parse_size("1280x720"), Ok((1280, 720)));
        assert_eq!(parse_size(" 2X2 "), Ok((2, 2)));
        assert!(parse_size("0x10").is_err());
        assert!(parse_size("wide").is_err());
        assert_eq!("Tunnel".parse::<VariantKind>(), Ok(VariantKind::Tunnel));
        assert!("plasma".parse::<VariantKind>().is_err());
        assert_eq!(AntialiasSetting::from_samples(8), Some(AntialiasSetting::Samples8));
        assert_eq!(AntialiasSetting::from_samples(3), None);
        assert_eq!(parse_antialias("16"), Ok(AntialiasSetting::Samples16));
        assert_eq!(parse_antialias("1"), Ok(AntialiasSetting::Off));
        assert!(parse_antialias("3").is_err());
    }

    #[test]
    fn parses_plain_and_humantime_durations() {
        assert_eq!(parse_duration("2.5"), Ok(Duration::from_millis(2500)));
        assert_eq!(parse_duration("1s 500ms"), Ok(Duration::from_millis(1500)));
        assert!(parse_duration("-1").is_err());
        assert!(parse_duration("soon").is_err());
    }
}
