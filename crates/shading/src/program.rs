//! Compiling scenes into fragment programs and linking them with a vertex
//! stage.
//!
//! Compilation turns scene source (TOML text or an in-memory `SceneEntry`)
//! into a boxed evaluator, rejecting anything the stage cannot render.
//! Linking checks that the vertex stage matches the layout the fragment stage
//! was authored for and that every uniform it reads is bound by the host.

use std::fmt;
use std::time::Duration;

use glam::{Mat4, Vec2, Vec3, Vec4};
use sceneconfig::{ConfigError, FadeCurve, SceneDocument, SceneEntry, TransformTable, VariantKind};

use crate::palette::Palette;
use crate::scene::{
    Evaluator, Highlight, HighlightConfig, RingsConfig, StageInterface, Tunnel, TunnelConfig,
    TwinRings, VertexLayout,
};
use crate::timeline::{CrossfadeCurve, FadeEnvelope, FadeSource};
use crate::uniforms::{FrameUniforms, UniformSet};

#[derive(Debug, thiserror::Error)]
pub enum ProgramError {
    #[error("failed to compile scene '{scene}': {reason}")]
    Compile { scene: String, reason: String },
    #[error("failed to link program: {reason}")]
    Link { reason: String },
}

impl ProgramError {
    fn compile(scene: impl Into<String>, reason: impl fmt::Display) -> Self {
        ProgramError::Compile {
            scene: scene.into(),
            reason: reason.to_string(),
        }
    }
}

/// Caller-supplied values layered over a scene before it is compiled.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneOverrides {
    pub fade: Option<f32>,
    pub fade_in: Option<Duration>,
    pub fade_curve: Option<FadeCurve>,
    pub mouse: Option<[f32; 2]>,
}

impl SceneOverrides {
    pub fn apply(&self, entry: &mut SceneEntry) {
        if let Some(fade) = self.fade {
            entry.fade = Some(fade);
            entry.fade_in = None;
        }
        if let Some(fade_in) = self.fade_in {
            entry.fade_in = Some(fade_in);
            entry.fade = None;
        }
        if let Some(curve) = self.fade_curve {
            entry.fade_curve = curve;
        }
        if let Some(mouse) = self.mouse {
            entry.mouse = Some(mouse);
        }
    }
}

/// A compiled fragment stage together with the scene it came from.
pub struct FragmentProgram {
    name: String,
    entry: SceneEntry,
    evaluator: Box<dyn Evaluator>,
}

impl FragmentProgram {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn entry(&self) -> &SceneEntry {
        &self.entry
    }

    pub fn evaluator(&self) -> &dyn Evaluator {
        self.evaluator.as_ref()
    }

    pub fn interface(&self) -> StageInterface {
        self.evaluator.interface()
    }

    /// Uniform values the host binds for this scene.
    pub fn bindings(&self) -> UniformBindings {
        UniformBindings::from_entry(&self.entry)
    }
}

impl fmt::Debug for FragmentProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FragmentProgram")
            .field("name", &self.name)
            .field("variant", &self.entry.variant)
            .finish_non_exhaustive()
    }
}

/// Parses scene source text, reporting syntax and validation failures as
/// compile errors.
pub fn parse_document(source: &str) -> Result<SceneDocument, ProgramError> {
    SceneDocument::from_toml_str(source).map_err(|err| match err {
        ConfigError::Parse(parse) => ProgramError::compile("<source>", parse),
        ConfigError::Invalid(reason) => ProgramError::compile("<source>", reason),
    })
}

/// Compiles the named scene (or the document's default) from `document`.
pub fn compile_scene(
    document: &SceneDocument,
    scene: Option<&str>,
    overrides: &SceneOverrides,
) -> Result<FragmentProgram, ProgramError> {
    let (name, entry) = document
        .select(scene)
        .map_err(|err| ProgramError::compile(scene.unwrap_or("<default>"), err))?;
    let mut entry = entry.clone();
    overrides.apply(&mut entry);
    compile_fragment(name, &entry)
}

/// Parses and compiles in one step.
pub fn compile_source(
    source: &str,
    scene: Option<&str>,
    overrides: &SceneOverrides,
) -> Result<FragmentProgram, ProgramError> {
    let document = parse_document(source)?;
    compile_scene(&document, scene, overrides)
}

/// Compiles a variant's built-in scene.
pub fn compile_preset(
    variant: VariantKind,
    overrides: &SceneOverrides,
) -> Result<FragmentProgram, ProgramError> {
    let mut entry = SceneEntry::preset(variant);
    overrides.apply(&mut entry);
    compile_fragment(variant.as_str(), &entry)
}

/// Validates `entry` and builds its evaluator.
pub fn compile_fragment(name: &str, entry: &SceneEntry) -> Result<FragmentProgram, ProgramError> {
    entry
        .validate(name)
        .map_err(|err| ProgramError::compile(name, err))?;

    let palette = match &entry.palette {
        Some(table) => Some(
            Palette::from_table(table)
                .ok_or_else(|| ProgramError::compile(name, "palette must be finite"))?,
        ),
        None => None,
    };

    let rings = || {
        TwinRings::new(
            palette.unwrap_or(Palette::TWIN_RINGS),
            RingsConfig::from(&entry.rings),
        )
    };

    let evaluator: Box<dyn Evaluator> = match entry.variant {
        VariantKind::TwinRings => Box::new(rings()),
        VariantKind::Highlight => {
            let highlight_palette = match &entry.highlight.palette {
                Some(table) => Palette::from_table(table).ok_or_else(|| {
                    ProgramError::compile(name, "highlight palette must be finite")
                })?,
                None => Palette::HIGHLIGHT,
            };
            Box::new(Highlight::new(
                rings(),
                highlight_palette,
                HighlightConfig::from(&entry.highlight),
            ))
        }
        VariantKind::Tunnel => Box::new(Tunnel::new(
            palette.unwrap_or(Palette::TUNNEL),
            TunnelConfig::from(&entry.tunnel),
        )),
    };

    tracing::debug!(scene = name, variant = %entry.variant, "compiled fragment program");

    Ok(FragmentProgram {
        name: name.to_string(),
        entry: entry.clone(),
        evaluator,
    })
}

/// Host-side sources for the optional uniforms.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct UniformBindings {
    pub fade: FadeSource,
    pub mouse: Option<Vec2>,
}

impl UniformBindings {
    pub fn from_entry(entry: &SceneEntry) -> Self {
        let fade = match (entry.fade, entry.fade_in) {
            (Some(level), _) => FadeSource::Constant(level),
            (None, Some(duration)) => {
                match FadeEnvelope::new(duration, CrossfadeCurve::from(entry.fade_curve)) {
                    Some(envelope) => FadeSource::Envelope(envelope),
                    // A zero-length fade-in is already complete.
                    None => FadeSource::Constant(1.0),
                }
            }
            (None, None) => FadeSource::Unbound,
        };
        Self {
            fade,
            mouse: entry.mouse.map(Vec2::from_array),
        }
    }

    pub fn bound(&self) -> UniformSet {
        let mut set = UniformSet::RESOLUTION | UniformSet::TIME;
        if self.fade.is_bound() {
            set = set | UniformSet::FADE;
        }
        if self.mouse.is_some() {
            set = set | UniformSet::MOUSE;
        }
        set
    }

    /// Writes the bound values for the frame at `uniforms.time`.
    pub fn apply(&self, uniforms: &mut FrameUniforms) {
        uniforms.fade = self.fade.sample(uniforms.time);
        uniforms.mouse = self.mouse;
    }
}

/// Maps quad positions to clip space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VertexStage {
    Passthrough,
    Transformed { projection: Mat4, model_view: Mat4 },
}

impl VertexStage {
    pub fn identity() -> Self {
        VertexStage::Transformed {
            projection: Mat4::IDENTITY,
            model_view: Mat4::IDENTITY,
        }
    }

    /// Perspective camera looking down -z, with the quad moved by
    /// `translate`.
    pub fn perspective(table: &TransformTable, aspect: f32) -> Self {
        VertexStage::Transformed {
            projection: Mat4::perspective_rh_gl(
                table.fov_degrees.to_radians(),
                aspect.max(f32::EPSILON),
                table.near,
                table.far,
            ),
            model_view: Mat4::from_translation(Vec3::from_array(table.translate)),
        }
    }

    /// The vertex stage a scene asks for at the given viewport aspect.
    ///
    /// Scenes authored for a transformed stage fall back to identity matrices
    /// when they do not configure a camera.
    pub fn for_entry(entry: &SceneEntry, aspect: f32) -> Self {
        match (&entry.transform, StageInterface::for_variant(entry.variant).vertex) {
            (Some(table), _) => Self::perspective(table, aspect),
            (None, VertexLayout::Transformed) => Self::identity(),
            (None, VertexLayout::Passthrough) => VertexStage::Passthrough,
        }
    }

    pub fn layout(&self) -> VertexLayout {
        match self {
            VertexStage::Passthrough => VertexLayout::Passthrough,
            VertexStage::Transformed { .. } => VertexLayout::Transformed,
        }
    }

    pub fn to_clip(&self, position: Vec2) -> Vec4 {
        let position = position.extend(0.0).extend(1.0);
        match self {
            VertexStage::Passthrough => position,
            VertexStage::Transformed {
                projection,
                model_view,
            } => *projection * *model_view * position,
        }
    }
}

/// A linked vertex + fragment pair ready for rasterization.
#[derive(Debug)]
pub struct Program {
    vertex: VertexStage,
    fragment: FragmentProgram,
}

impl Program {
    pub fn vertex(&self) -> &VertexStage {
        &self.vertex
    }

    pub fn fragment(&self) -> &FragmentProgram {
        &self.fragment
    }

    pub fn evaluator(&self) -> &dyn Evaluator {
        self.fragment.evaluator()
    }

    pub fn name(&self) -> &str {
        self.fragment.name()
    }
}

pub fn link(
    vertex: VertexStage,
    fragment: FragmentProgram,
    bound: UniformSet,
) -> Result<Program, ProgramError> {
    let interface = fragment.interface();

    if vertex.layout() != interface.vertex {
        return Err(ProgramError::Link {
            reason: format!(
                "scene '{}' ({}) expects a {} vertex stage but got {}",
                fragment.name(),
                fragment.entry().variant,
                interface.vertex,
                vertex.layout(),
            ),
        });
    }

    let missing = interface.required.missing_from(bound);
    if !missing.is_empty() {
        return Err(ProgramError::Link {
            reason: format!(
                "scene '{}' ({}) reads uniforms the host does not bind: {missing}",
                fragment.name(),
                fragment.entry().variant,
            ),
        });
    }

    tracing::debug!(
        scene = fragment.name(),
        vertex = %vertex.layout(),
        bound = %bound,
        "linked program"
    );

    Ok(Program { vertex, fragment })
}
