use std::fmt;

use anyhow::{anyhow, Result};
use naga::valid::{Capabilities, ValidationFlags, Validator};

use super::assets::{FRAGMENT_SHADER_PATH, VERTEX_SHADER_PATH};
use super::{RenderBackend, ShaderAssets, VertexLayout};

/// Pipeline stage a shader source is compiled for.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    pub fn as_str(self) -> &'static str {
        match self {
            ShaderStage::Vertex => "vertex",
            ShaderStage::Fragment => "fragment",
        }
    }

    fn to_naga(self) -> naga::ShaderStage {
        match self {
            ShaderStage::Vertex => naga::ShaderStage::Vertex,
            ShaderStage::Fragment => naga::ShaderStage::Fragment,
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// WGSL text plus the logical path it was loaded from.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ShaderSource {
    pub path: String,
    pub text: String,
}

impl ShaderSource {
    pub fn new(path: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            text: text.into(),
        }
    }
}

/// Shape of a value passed through one `@location` slot.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct SlotType {
    pub scalar: naga::Scalar,
    /// 1 for a scalar, 2..=4 for a vector.
    pub components: u32,
}

impl SlotType {
    pub fn is_float(&self) -> bool {
        self.scalar.kind == naga::ScalarKind::Float
    }

    fn of(inner: &naga::TypeInner) -> Option<Self> {
        match *inner {
            naga::TypeInner::Scalar(scalar) => Some(Self { scalar, components: 1 }),
            naga::TypeInner::Vector { size, scalar } => Some(Self {
                scalar,
                components: size as u32,
            }),
            _ => None,
        }
    }
}

impl fmt::Display for SlotType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match self.scalar.kind {
            naga::ScalarKind::Float => "f",
            naga::ScalarKind::Sint => "i",
            naga::ScalarKind::Uint => "u",
            naga::ScalarKind::Bool => return f.write_str("bool"),
            _ => "abstract-",
        };
        let bits = u32::from(self.scalar.width) * 8;
        if self.components == 1 {
            write!(f, "{prefix}{bits}")
        } else {
            write!(f, "vec{}<{prefix}{bits}>", self.components)
        }
    }
}

/// One user-defined input or output of an entry point.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Slot {
    pub location: u32,
    pub ty: SlotType,
    /// Explicit interpolation, or the default for the slot's type.
    pub interpolation: naga::Interpolation,
}

/// `@location` slots read and written by one entry point (built-ins excluded).
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct StageInterface {
    /// Sorted by location.
    pub inputs: Vec<Slot>,
    /// Sorted by location.
    pub outputs: Vec<Slot>,
}

impl StageInterface {
    fn of(module: &naga::Module, entry: &naga::EntryPoint) -> Self {
        let mut inputs = Vec::new();
        for arg in &entry.function.arguments {
            collect_slots(module, arg.ty, arg.binding.as_ref(), &mut inputs);
        }

        let mut outputs = Vec::new();
        if let Some(result) = &entry.function.result {
            collect_slots(module, result.ty, result.binding.as_ref(), &mut outputs);
        }

        inputs.sort_unstable_by_key(|s| s.location);
        outputs.sort_unstable_by_key(|s| s.location);

        Self { inputs, outputs }
    }

    pub fn output(&self, location: u32) -> Option<&Slot> {
        self.outputs.iter().find(|s| s.location == location)
    }

    pub fn input_locations(&self) -> Vec<u32> {
        self.inputs.iter().map(|s| s.location).collect()
    }

    pub fn output_locations(&self) -> Vec<u32> {
        self.outputs.iter().map(|s| s.location).collect()
    }
}

fn collect_slots(
    module: &naga::Module,
    ty: naga::Handle<naga::Type>,
    binding: Option<&naga::Binding>,
    out: &mut Vec<Slot>,
) {
    match binding {
        Some(naga::Binding::Location {
            location,
            interpolation,
            ..
        }) => {
            // The validator only admits scalars and vectors at locations.
            if let Some(ty) = SlotType::of(&module.types[ty].inner) {
                let interpolation = interpolation.unwrap_or(if ty.is_float() {
                    naga::Interpolation::Perspective
                } else {
                    naga::Interpolation::Flat
                });
                out.push(Slot {
                    location: *location,
                    ty,
                    interpolation,
                });
            }
        }
        Some(naga::Binding::BuiltIn(_)) => {}
        // Unbound struct: the members carry the bindings.
        None => {
            if let naga::TypeInner::Struct { members, .. } = &module.types[ty].inner {
                for m in members {
                    collect_slots(module, m.ty, m.binding.as_ref(), out);
                }
            }
        }
    }
}

/// A validated single-stage shader.
#[derive(Debug)]
pub struct CompiledShader {
    stage: ShaderStage,
    path: String,
    entry_point: String,
    interface: StageInterface,
    module: naga::Module,
}

impl CompiledShader {
    pub fn stage(&self) -> ShaderStage {
        self.stage
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn entry_point(&self) -> &str {
        &self.entry_point
    }

    pub fn interface(&self) -> &StageInterface {
        &self.interface
    }

    pub fn into_module(self) -> naga::Module {
        self.module
    }
}

fn compile_error(stage: ShaderStage, source: &ShaderSource, log: impl fmt::Display) -> anyhow::Error {
    anyhow!(
        "shader compilation failed for {} ({stage} stage): {log}",
        source.path
    )
}

/// Parses and validates `source`, then locates its single `stage` entry point.
///
/// The error names the source path and stage and carries naga's rendered
/// diagnostic.
pub fn compile(stage: ShaderStage, source: &ShaderSource) -> Result<CompiledShader> {
    let module = naga::front::wgsl::parse_str(&source.text)
        .map_err(|e| compile_error(stage, source, e.emit_to_string(&source.text)))?;

    Validator::new(ValidationFlags::all(), Capabilities::default())
        .validate(&module)
        .map_err(|e| compile_error(stage, source, e.emit_to_string(&source.text)))?;

    let mut entries = module
        .entry_points
        .iter()
        .filter(|ep| ep.stage == stage.to_naga());

    let entry = entries
        .next()
        .ok_or_else(|| compile_error(stage, source, format_args!("no @{stage} entry point")))?;

    if let Some(extra) = entries.next() {
        return Err(compile_error(
            stage,
            source,
            format_args!(
                "multiple @{stage} entry points (`{}`, `{}`)",
                entry.name, extra.name
            ),
        ));
    }

    let entry_point = entry.name.clone();
    let interface = StageInterface::of(&module, entry);

    log::debug!(
        "compiled {} ({stage} stage, entry `{entry_point}`)",
        source.path
    );

    Ok(CompiledShader {
        stage,
        path: source.path.clone(),
        entry_point,
        interface,
        module,
    })
}

/// A vertex/fragment pair whose interfaces agree with each other and with
/// the vertex layout. Consumed by [`RenderBackend::create_program`].
#[derive(Debug)]
pub struct LinkedProgram {
    vertex: CompiledShader,
    fragment: CompiledShader,
    layout: VertexLayout,
}

impl LinkedProgram {
    pub fn vertex(&self) -> &CompiledShader {
        &self.vertex
    }

    pub fn fragment(&self) -> &CompiledShader {
        &self.fragment
    }

    pub fn into_parts(self) -> (CompiledShader, CompiledShader, VertexLayout) {
        (self.vertex, self.fragment, self.layout)
    }
}

fn link_error(log: impl fmt::Display) -> anyhow::Error {
    anyhow!("shader program linking failed: {log}")
}

/// Checks the stage interfaces and pairs the shaders into one program.
///
/// Rules:
/// - every vertex input is fed by a `layout` attribute of the same width (f32 only)
/// - every fragment input is written by the vertex stage with the same type
///   and interpolation
/// - the fragment stage writes a float color at location 0
pub fn link(
    vertex: CompiledShader,
    fragment: CompiledShader,
    layout: &VertexLayout,
) -> Result<LinkedProgram> {
    if vertex.stage != ShaderStage::Vertex {
        return Err(link_error(format_args!(
            "{} was compiled for the {} stage, expected vertex",
            vertex.path, vertex.stage
        )));
    }
    if fragment.stage != ShaderStage::Fragment {
        return Err(link_error(format_args!(
            "{} was compiled for the {} stage, expected fragment",
            fragment.path, fragment.stage
        )));
    }

    for input in &vertex.interface.inputs {
        let loc = input.location;
        let Some(attr) = layout.attribute(loc) else {
            return Err(link_error(format_args!(
                "vertex input @location({loc}) in {} has no matching vertex attribute",
                vertex.path
            )));
        };
        let supplied = SlotType {
            scalar: naga::Scalar::F32,
            components: u32::from(attr.components),
        };
        if input.ty != supplied {
            return Err(link_error(format_args!(
                "vertex input @location({loc}) in {} is {} but the attribute supplies {supplied}",
                vertex.path, input.ty
            )));
        }
    }

    for input in &fragment.interface.inputs {
        let loc = input.location;
        let Some(output) = vertex.interface.output(loc) else {
            return Err(link_error(format_args!(
                "fragment input @location({loc}) in {} is not written by {}",
                fragment.path, vertex.path
            )));
        };
        if input.ty != output.ty {
            return Err(link_error(format_args!(
                "fragment input @location({loc}) in {} is {} but {} writes {}",
                fragment.path, input.ty, vertex.path, output.ty
            )));
        }
        if input.interpolation != output.interpolation {
            return Err(link_error(format_args!(
                "@location({loc}) is interpolated {:?} in {} but {:?} in {}",
                output.interpolation, vertex.path, input.interpolation, fragment.path
            )));
        }
    }

    match fragment.interface.output(0) {
        None => {
            return Err(link_error(format_args!(
                "{} does not write color @location(0)",
                fragment.path
            )));
        }
        Some(color) if !color.ty.is_float() => {
            return Err(link_error(format_args!(
                "color @location(0) in {} is {}, the color target needs a float output",
                fragment.path, color.ty
            )));
        }
        Some(_) => {}
    }

    log::debug!("linked {} + {}", vertex.path, fragment.path);

    Ok(LinkedProgram {
        vertex,
        fragment,
        layout: layout.clone(),
    })
}

/// Loads, compiles and links the vertex/fragment pair and hands it to the backend.
#[derive(Debug, Clone)]
pub struct ShaderPipelineBuilder {
    pub vertex_path: String,
    pub fragment_path: String,
}

impl Default for ShaderPipelineBuilder {
    fn default() -> Self {
        Self {
            vertex_path: VERTEX_SHADER_PATH.to_string(),
            fragment_path: FRAGMENT_SHADER_PATH.to_string(),
        }
    }
}

impl ShaderPipelineBuilder {
    pub fn new(vertex_path: impl Into<String>, fragment_path: impl Into<String>) -> Self {
        Self {
            vertex_path: vertex_path.into(),
            fragment_path: fragment_path.into(),
        }
    }

    /// Any failure is fatal to the caller; there is no fallback shader.
    pub fn build<G: RenderBackend>(
        &self,
        assets: &ShaderAssets,
        layout: &VertexLayout,
        gfx: &mut G,
    ) -> Result<G::Program> {
        let vertex = compile(ShaderStage::Vertex, &assets.load(&self.vertex_path)?)?;
        let fragment = compile(ShaderStage::Fragment, &assets.load(&self.fragment_path)?)?;
        let linked = link(vertex, fragment, layout)?;
        gfx.create_program(linked)
    }
}
