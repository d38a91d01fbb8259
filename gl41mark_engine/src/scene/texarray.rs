/// gl41-texarray: instanced quads sampling a 2D texture array
///
/// Each instance picks layer `i % layers`. Changing the layer count or the
/// texture size rebuilds the array texture; other options only refill the
/// instance buffer or the bias uniform.

use crate::capability::Feature;
use crate::device::{
    BufferId, BufferTarget, BufferUsage, GlDevice, PrimitiveMode, ProgramId, ShaderStage, TextureFilter,
    TextureId, TextureTarget, TextureWrap, UniformLocation, VertexArrayId,
};
use crate::error::Result;
use crate::params::SceneOptions;
use crate::resource::{self, ResourceSet};
use crate::scene::scene::{centered_grid, probe_features, spin_matrix, FrameInfo, Scene, SceneContext};
use crate::shader::{build_program, require_attrib, require_uniform, require_uniform_block, sources, ProgramDesc};
use crate::state::{StateGuard, StateMask};

const SOURCE: &str = "gl41mark::scene::texarray";

pub const DEFAULT_INSTANCES: u32 = 4096;
pub const DEFAULT_LAYERS: u32 = 64;
pub const DEFAULT_TEX_SIZE: u32 = 64;
pub const DEFAULT_BIAS: f32 = 0.75;

const MATRICES_BINDING: u32 = 0;
const SAMPLER_UNIT: u32 = 0;

/// RGBA8 pixels of one layer: an 8x8 checker of the layer colour and its complement
pub fn layer_pixels(layer: u32, size: u32) -> Vec<u8> {
    let colour = [
        (layer.wrapping_mul(7) & 255) as u8,
        (layer.wrapping_mul(13) & 255) as u8,
        (layer.wrapping_mul(23) & 255) as u8,
    ];
    let mut pixels = Vec::with_capacity((size * size * 4) as usize);
    for y in 0..size {
        for x in 0..size {
            let checker = ((x >> 3) ^ (y >> 3)) & 1 == 1;
            for channel in colour {
                pixels.push(if checker { channel } else { 255 - channel });
            }
            pixels.push(255);
        }
    }
    pixels
}

#[derive(Debug, Default)]
pub struct TexArrayResources {
    pub program: ProgramId,
    pub vertex_array: VertexArrayId,
    pub quad_buffer: BufferId,
    pub instance_buffer: BufferId,
    pub uniform_buffer: BufferId,
    pub texture: TextureId,
}

impl ResourceSet for TexArrayResources {
    fn release(&mut self, device: &dyn GlDevice) {
        if self.uniform_buffer.is_allocated() {
            device.bind_buffer_base(BufferTarget::Uniform, MATRICES_BINDING, BufferId::NONE);
        }
        resource::destroy_vertex_array(device, &mut self.vertex_array);
        resource::destroy_buffer(device, &mut self.quad_buffer);
        resource::destroy_buffer(device, &mut self.instance_buffer);
        resource::destroy_buffer(device, &mut self.uniform_buffer);
        resource::destroy_texture(device, &mut self.texture);
        resource::destroy_program(device, &mut self.program);
    }

    fn is_released(&self) -> bool {
        !self.program.is_allocated()
            && !self.vertex_array.is_allocated()
            && !self.quad_buffer.is_allocated()
            && !self.instance_buffer.is_allocated()
            && !self.uniform_buffer.is_allocated()
            && !self.texture.is_allocated()
    }
}

pub struct TexArrayScene {
    options: SceneOptions,
    resources: TexArrayResources,
    bias_location: UniformLocation,
    instances: u32,
    /// Dimensions of the live texture; 0 when none exists
    layers: u32,
    tex_size: u32,
    bias: f32,
}

impl TexArrayScene {
    pub const NAME: &'static str = "gl41-texarray";

    pub fn new() -> Self {
        Self {
            options: SceneOptions::new()
                .declare("instances", "4096", "Number of instances to draw")
                .declare("layers", "64", "Texture array layers (1..256)")
                .declare("tex-size", "64", "Texture size per layer (8..512)")
                .declare("bias", "0.75", "LOD bias (-4..4)"),
            resources: TexArrayResources::default(),
            bias_location: UniformLocation::default(),
            instances: 0,
            layers: 0,
            tex_size: 0,
            bias: DEFAULT_BIAS,
        }
    }

    pub fn resources(&self) -> &TexArrayResources {
        &self.resources
    }

    pub fn instances(&self) -> u32 {
        self.instances
    }

    pub fn layers(&self) -> u32 {
        self.layers
    }

    pub fn tex_size(&self) -> u32 {
        self.tex_size
    }

    pub fn bias(&self) -> f32 {
        self.bias
    }

    /// Destroy the array texture and build a new one of `layers x size x size`
    fn rebuild_texture(&mut self, device: &dyn GlDevice, layers: u32, size: u32) -> Result<()> {
        let texture = &mut self.resources.texture;
        resource::destroy_texture(device, texture);
        self.layers = 0;
        self.tex_size = 0;

        resource::create_texture(device, texture, "texarray")?;
        let target = TextureTarget::Texture2DArray;
        device.bind_texture(target, *texture);
        device.texture_filter(target, TextureFilter::LinearMipmapLinear, TextureFilter::Linear);
        device.texture_wrap(target, TextureWrap::Repeat);

        let extent = size as i32;
        device.tex_image_3d_rgba8(target, extent, extent, layers as i32, None);
        for layer in 0..layers {
            device.tex_sub_image_3d_rgba8(target, layer as i32, extent, extent, &layer_pixels(layer, size));
        }
        device.generate_mipmap(target);
        device.bind_texture(target, TextureId::NONE);

        self.layers = layers;
        self.tex_size = size;
        Ok(())
    }
}

impl Default for TexArrayScene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene for TexArrayScene {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn options(&self) -> &SceneOptions {
        &self.options
    }

    fn options_mut(&mut self) -> &mut SceneOptions {
        &mut self.options
    }

    fn supported(&self, ctx: &SceneContext<'_>) -> bool {
        probe_features(ctx, SOURCE, &[Feature::GenerateMipmap], ctx.config.show_errors).is_ok()
    }

    fn load(&mut self, ctx: &SceneContext<'_>) -> Result<()> {
        let device = ctx.device;
        probe_features(ctx, SOURCE, &[Feature::GenerateMipmap], false)?;

        let stages = [
            (ShaderStage::Vertex, sources::TEXARRAY_VS),
            (ShaderStage::Fragment, sources::TEXARRAY_FS),
        ];
        let res = &mut self.resources;
        res.program = build_program(device, ctx.rewriter, &ProgramDesc::new(Self::NAME, &stages), SOURCE)?;

        let position = require_attrib(device, res.program, "position", SOURCE)?;
        let instance = require_attrib(device, res.program, "instanceData", SOURCE)?;
        let sampler = require_uniform(device, res.program, "uTex", SOURCE)?;
        self.bias_location = require_uniform(device, res.program, "uBias", SOURCE)?;
        let block = require_uniform_block(device, res.program, "Matrices", SOURCE)?;
        device.uniform_block_binding(res.program, block, MATRICES_BINDING);

        {
            let _guard = StateGuard::new(device, StateMask::PROGRAM);
            device.use_program(res.program);
            device.uniform_1_i32(sampler, SAMPLER_UNIT as i32);
        }

        let quad: [[f32; 2]; 6] = [[-1.0, -1.0], [1.0, -1.0], [1.0, 1.0], [-1.0, -1.0], [1.0, 1.0], [-1.0, 1.0]];
        resource::create_vertex_array(device, &mut res.vertex_array, "texarray vao")?;
        device.bind_vertex_array(res.vertex_array);
        resource::create_buffer(device, &mut res.quad_buffer, "texarray quad")?;
        device.bind_buffer(BufferTarget::Array, res.quad_buffer);
        device.buffer_data(BufferTarget::Array, bytemuck::cast_slice(quad.as_slice()), BufferUsage::StaticDraw);
        device.enable_vertex_attrib_array(position);
        device.vertex_attrib_pointer_f32(position, 2, 0, 0);

        resource::create_buffer(device, &mut res.instance_buffer, "texarray instances")?;
        device.bind_buffer(BufferTarget::Array, res.instance_buffer);
        device.enable_vertex_attrib_array(instance);
        device.vertex_attrib_pointer_f32(instance, 3, 0, 0);
        device.vertex_attrib_divisor(instance, 1);
        device.bind_vertex_array(VertexArrayId::NONE);
        device.bind_buffer(BufferTarget::Array, BufferId::NONE);

        resource::create_buffer(device, &mut res.uniform_buffer, "texarray matrices")?;
        device.bind_buffer(BufferTarget::Uniform, res.uniform_buffer);
        device.buffer_data_size(BufferTarget::Uniform, std::mem::size_of::<[f32; 16]>(), BufferUsage::DynamicDraw);
        device.bind_buffer_base(BufferTarget::Uniform, MATRICES_BINDING, res.uniform_buffer);
        device.bind_buffer(BufferTarget::Uniform, BufferId::NONE);

        self.rebuild_texture(device, DEFAULT_LAYERS, DEFAULT_TEX_SIZE)
    }

    fn setup(&mut self, ctx: &SceneContext<'_>) -> Result<()> {
        let device = ctx.device;
        let instances = self.options.u32_in("instances", DEFAULT_INSTANCES, 1, 16384);
        let layers = self.options.u32_in("layers", DEFAULT_LAYERS, 1, 256);
        let tex_size = self.options.u32_in("tex-size", DEFAULT_TEX_SIZE, 8, 512);
        self.bias = self.options.f32_in("bias", DEFAULT_BIAS, -4.0, 4.0);
        self.instances = instances;

        let instance_data: Vec<[f32; 3]> = centered_grid(instances)
            .into_iter()
            .zip(0u32..)
            .map(|([x, y], i)| [x, y, (i % layers) as f32])
            .collect();
        device.bind_buffer(BufferTarget::Array, self.resources.instance_buffer);
        device.buffer_data(
            BufferTarget::Array,
            bytemuck::cast_slice(instance_data.as_slice()),
            BufferUsage::StaticDraw,
        );
        device.bind_buffer(BufferTarget::Array, BufferId::NONE);

        if layers != self.layers || tex_size != self.tex_size {
            self.rebuild_texture(device, layers, tex_size)?;
        }

        let _guard = StateGuard::new(device, StateMask::PROGRAM);
        device.use_program(self.resources.program);
        device.uniform_1_f32(self.bias_location, self.bias);
        Ok(())
    }

    fn draw(&mut self, ctx: &SceneContext<'_>, frame: &FrameInfo) {
        let device = ctx.device;
        let res = &self.resources;
        let _guard = StateGuard::new(
            device,
            StateMask::PROGRAM
                | StateMask::VERTEX_ARRAY
                | StateMask::ACTIVE_TEXTURE
                | StateMask::UNIFORM_BUFFER,
        );

        let mvp = spin_matrix(frame.frame);
        device.use_program(res.program);
        device.active_texture(SAMPLER_UNIT);
        let previous_texture = device.texture_binding(TextureTarget::Texture2DArray);
        device.bind_texture(TextureTarget::Texture2DArray, res.texture);

        device.bind_buffer(BufferTarget::Uniform, res.uniform_buffer);
        device.buffer_sub_data(BufferTarget::Uniform, 0, bytemuck::cast_slice(mvp.as_slice()));
        device.bind_buffer_base(BufferTarget::Uniform, MATRICES_BINDING, res.uniform_buffer);

        device.bind_vertex_array(res.vertex_array);
        device.draw_arrays_instanced(PrimitiveMode::Triangles, 0, 6, self.instances as i32);
        device.bind_texture(TextureTarget::Texture2DArray, previous_texture);
    }

    fn unload(&mut self, device: &dyn GlDevice) {
        self.resources.release(device);
        self.instances = 0;
        self.layers = 0;
        self.tex_size = 0;
    }

    fn is_released(&self) -> bool {
        self.resources.is_released()
    }
}
