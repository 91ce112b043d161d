use wasm_bindgen::prelude::*;
use web_sys::{WebGlRenderingContext, WebGlProgram, WebGlBuffer, WebGlUniformLocation, HtmlCanvasElement, WebGlTexture, HtmlImageElement};
use nalgebra::Matrix4;
use crate::engine::mesh::{Mesh, VERTEX_STRIDE};
use wasm_bindgen::JsCast;

const VERTEX_SHADER: &str = r#"
    attribute vec3 aPosition;
    attribute vec3 aColor;
    attribute vec2 aTexCoord;
    uniform mat4 uModel;
    uniform mat4 uView;
    uniform mat4 uProjection;
    uniform float uPointSize;
    uniform float uPointScale;
    varying vec3 vColor;
    varying vec2 vTexCoord;
    varying vec3 vWorldPos;
    varying vec3 vNormal;
    void main() {
        vec4 world = uModel * vec4(aPosition, 1.0);
        vec4 viewPos = uView * world;
        gl_Position = uProjection * viewPos;
        gl_PointSize = uPointSize * uPointScale / max(-viewPos.z, 0.001);
        vWorldPos = world.xyz;
        vNormal = (uModel * vec4(aPosition, 0.0)).xyz;
        vColor = aColor;
        vTexCoord = aTexCoord;
    }
"#;

const FRAGMENT_SHADER: &str = r#"
    precision mediump float;
    varying vec3 vColor;
    varying vec2 vTexCoord;
    varying vec3 vWorldPos;
    varying vec3 vNormal;
    uniform sampler2D uTexture;
    uniform int uUseTexture;
    uniform bool uUseVertexColor;
    uniform vec3 uColor;
    uniform float uOpacity;
    uniform bool uLit;
    uniform vec3 uEmissive;
    uniform float uAmbient;
    uniform float uLightIntensity;
    uniform float uLightRange;
    uniform float uLightDecay;
    uniform vec3 uLightColor;

    void main() {
        vec3 color = uUseVertexColor ? vColor : uColor;
        float alpha = uOpacity;

        if (uUseTexture == 1) {
            vec4 texColor = texture2D(uTexture, vTexCoord);
            color *= texColor.rgb;
            alpha *= texColor.a;
        }

        if (uLit) {
            // Point light at the sun (origin) with range cutoff and decay.
            vec3 toLight = -vWorldPos;
            float dist = length(toLight);
            float diffuse = max(dot(normalize(vNormal), toLight / max(dist, 0.0001)), 0.0);
            float falloff = pow(clamp(1.0 - dist / uLightRange, 0.0, 1.0), uLightDecay);
            vec3 light = vec3(uAmbient) + uLightColor * uLightIntensity * diffuse * falloff;
            color = color * light + uEmissive;
        }

        gl_FragColor = vec4(color, alpha);
    }
"#;

// Scene lighting
const AMBIENT: f32 = 0.14;
const SUN_LIGHT_COLOR: (f32, f32, f32) = (1.0, 0.949, 0.741);
const SUN_LIGHT_INTENSITY: f32 = 2.5;
const SUN_LIGHT_RANGE: f32 = 120.0;
const SUN_LIGHT_DECAY: f32 = 1.4;

/// Mesh uploaded to GPU buffers.
pub struct GpuMesh {
    vertex_buffer: WebGlBuffer,
    index_buffer: WebGlBuffer,
    index_count: i32,
}

/// Point cloud uploaded to a GPU buffer, `[x, y, z, r, g, b]` per point.
pub struct GpuPoints {
    buffer: WebGlBuffer,
    count: i32,
}

#[derive(Clone, Copy)]
pub enum Shading {
    /// Flat color, no light.
    Unlit,
    /// Lit by the sun with an additive emissive tint.
    Lit { emissive: (f32, f32, f32) },
}

pub struct DrawParams<'a> {
    pub model: Matrix4<f32>,
    pub color: (f32, f32, f32),
    pub opacity: f32,
    pub texture: Option<&'a WebGlTexture>,
    pub shading: Shading,
}

pub struct Renderer {
    pub gl: WebGlRenderingContext,
    program: WebGlProgram,
    u_model: WebGlUniformLocation,
    u_view: WebGlUniformLocation,
    u_projection: WebGlUniformLocation,
    u_point_size: WebGlUniformLocation,
    u_point_scale: WebGlUniformLocation,
    u_use_texture: WebGlUniformLocation,
    u_use_vertex_color: WebGlUniformLocation,
    u_color: WebGlUniformLocation,
    u_opacity: WebGlUniformLocation,
    u_lit: WebGlUniformLocation,
    u_emissive: WebGlUniformLocation,
}

impl Renderer {
    pub fn new(gl: WebGlRenderingContext) -> Result<Self, JsValue> {
        let program = create_program(&gl)?;
        gl.use_program(Some(&program));

        let uniform = |name: &str| -> Result<WebGlUniformLocation, JsValue> {
            gl.get_uniform_location(&program, name)
                .ok_or_else(|| JsValue::from_str(&format!("Failed to get {} location", name)))
        };

        let renderer = Renderer {
            u_model: uniform("uModel")?,
            u_view: uniform("uView")?,
            u_projection: uniform("uProjection")?,
            u_point_size: uniform("uPointSize")?,
            u_point_scale: uniform("uPointScale")?,
            u_use_texture: uniform("uUseTexture")?,
            u_use_vertex_color: uniform("uUseVertexColor")?,
            u_color: uniform("uColor")?,
            u_opacity: uniform("uOpacity")?,
            u_lit: uniform("uLit")?,
            u_emissive: uniform("uEmissive")?,
            gl: gl.clone(),
            program: program.clone(),
        };

        // Lighting is fixed for the lifetime of the scene
        let (lr, lg, lb) = SUN_LIGHT_COLOR;
        gl.uniform1f(uniform("uAmbient").ok().as_ref(), AMBIENT);
        gl.uniform1f(uniform("uLightIntensity").ok().as_ref(), SUN_LIGHT_INTENSITY);
        gl.uniform1f(uniform("uLightRange").ok().as_ref(), SUN_LIGHT_RANGE);
        gl.uniform1f(uniform("uLightDecay").ok().as_ref(), SUN_LIGHT_DECAY);
        gl.uniform3f(uniform("uLightColor").ok().as_ref(), lr, lg, lb);

        Ok(renderer)
    }

    pub fn clear(&self, (r, g, b): (f32, f32, f32)) {
        self.gl.clear_color(r, g, b, 1.0);
        self.gl.clear(WebGlRenderingContext::COLOR_BUFFER_BIT | WebGlRenderingContext::DEPTH_BUFFER_BIT);
    }

    pub fn enable_depth_test(&self) {
        self.gl.enable(WebGlRenderingContext::DEPTH_TEST);
    }

    pub fn enable_blend(&self) {
        self.gl.enable(WebGlRenderingContext::BLEND);
        self.gl.blend_func(WebGlRenderingContext::SRC_ALPHA, WebGlRenderingContext::ONE_MINUS_SRC_ALPHA);
    }

    /// Transparent sprites are drawn without writing depth.
    pub fn set_depth_write(&self, enabled: bool) {
        self.gl.depth_mask(enabled);
    }

    pub fn resize(&self, width: i32, height: i32) {
        self.gl.viewport(0, 0, width, height);
        self.gl.uniform1f(Some(&self.u_point_scale), height as f32 / 2.0);
    }

    pub fn canvas(&self) -> Option<HtmlCanvasElement> {
        self.gl.canvas()?.dyn_into::<HtmlCanvasElement>().ok()
    }

    pub fn set_camera(&self, view: &Matrix4<f32>, projection: &Matrix4<f32>) {
        self.gl.uniform_matrix4fv_with_f32_array(Some(&self.u_view), false, view.as_slice());
        self.gl.uniform_matrix4fv_with_f32_array(Some(&self.u_projection), false, projection.as_slice());
    }

    pub fn upload(&self, mesh: &Mesh) -> Result<GpuMesh, JsValue> {
        let vertex_buffer = self.gl.create_buffer().ok_or("Failed to create vertex buffer")?;
        let index_buffer = self.gl.create_buffer().ok_or("Failed to create index buffer")?;

        self.gl.bind_buffer(WebGlRenderingContext::ARRAY_BUFFER, Some(&vertex_buffer));
        unsafe {
            let vert_array = js_sys::Float32Array::view(&mesh.vertices);
            self.gl.buffer_data_with_array_buffer_view(
                WebGlRenderingContext::ARRAY_BUFFER,
                &vert_array,
                WebGlRenderingContext::STATIC_DRAW
            );
        }

        self.gl.bind_buffer(WebGlRenderingContext::ELEMENT_ARRAY_BUFFER, Some(&index_buffer));
        unsafe {
            let idx_array = js_sys::Uint16Array::view(&mesh.indices);
            self.gl.buffer_data_with_array_buffer_view(
                WebGlRenderingContext::ELEMENT_ARRAY_BUFFER,
                &idx_array,
                WebGlRenderingContext::STATIC_DRAW
            );
        }

        Ok(GpuMesh { vertex_buffer, index_buffer, index_count: mesh.indices.len() as i32 })
    }

    pub fn upload_points(&self, vertices: &[f32]) -> Result<GpuPoints, JsValue> {
        let buffer = self.gl.create_buffer().ok_or("Failed to create point buffer")?;
        self.gl.bind_buffer(WebGlRenderingContext::ARRAY_BUFFER, Some(&buffer));
        unsafe {
            let vert_array = js_sys::Float32Array::view(vertices);
            self.gl.buffer_data_with_array_buffer_view(
                WebGlRenderingContext::ARRAY_BUFFER,
                &vert_array,
                WebGlRenderingContext::STATIC_DRAW
            );
        }
        Ok(GpuPoints { buffer, count: (vertices.len() / 6) as i32 })
    }

    pub fn release_points(&self, points: GpuPoints) {
        self.gl.delete_buffer(Some(&points.buffer));
    }

    pub fn draw(&self, mesh: &GpuMesh, params: &DrawParams) {
        self.gl.bind_buffer(WebGlRenderingContext::ARRAY_BUFFER, Some(&mesh.vertex_buffer));
        self.gl.bind_buffer(WebGlRenderingContext::ELEMENT_ARRAY_BUFFER, Some(&mesh.index_buffer));

        let stride = (VERTEX_STRIDE * 4) as i32;
        let pos_loc = self.gl.get_attrib_location(&self.program, "aPosition") as u32;
        let col_loc = self.gl.get_attrib_location(&self.program, "aColor") as u32;
        let tex_loc = self.gl.get_attrib_location(&self.program, "aTexCoord") as u32;

        self.gl.vertex_attrib_pointer_with_i32(pos_loc, 3, WebGlRenderingContext::FLOAT, false, stride, 0);
        self.gl.enable_vertex_attrib_array(pos_loc);

        self.gl.vertex_attrib_pointer_with_i32(col_loc, 3, WebGlRenderingContext::FLOAT, false, stride, 12);
        self.gl.enable_vertex_attrib_array(col_loc);

        self.gl.vertex_attrib_pointer_with_i32(tex_loc, 2, WebGlRenderingContext::FLOAT, false, stride, 24);
        self.gl.enable_vertex_attrib_array(tex_loc);

        match params.texture {
            Some(tex) => {
                self.gl.active_texture(WebGlRenderingContext::TEXTURE0);
                self.gl.bind_texture(WebGlRenderingContext::TEXTURE_2D, Some(tex));
                self.gl.uniform1i(Some(&self.u_use_texture), 1);
            }
            None => self.gl.uniform1i(Some(&self.u_use_texture), 0),
        }

        let (r, g, b) = params.color;
        self.gl.uniform1i(Some(&self.u_use_vertex_color), 0);
        self.gl.uniform3f(Some(&self.u_color), r, g, b);
        self.gl.uniform1f(Some(&self.u_opacity), params.opacity);

        match params.shading {
            Shading::Unlit => self.gl.uniform1i(Some(&self.u_lit), 0),
            Shading::Lit { emissive: (er, eg, eb) } => {
                self.gl.uniform1i(Some(&self.u_lit), 1);
                self.gl.uniform3f(Some(&self.u_emissive), er, eg, eb);
            }
        }

        self.gl.uniform_matrix4fv_with_f32_array(Some(&self.u_model), false, params.model.as_slice());

        self.gl.draw_elements_with_i32(
            WebGlRenderingContext::TRIANGLES,
            mesh.index_count,
            WebGlRenderingContext::UNSIGNED_SHORT,
            0
        );
    }

    pub fn draw_points(&self, points: &GpuPoints, size: f32, opacity: f32) {
        self.gl.bind_buffer(WebGlRenderingContext::ARRAY_BUFFER, Some(&points.buffer));

        let pos_loc = self.gl.get_attrib_location(&self.program, "aPosition") as u32;
        let col_loc = self.gl.get_attrib_location(&self.program, "aColor") as u32;
        let tex_loc = self.gl.get_attrib_location(&self.program, "aTexCoord") as u32;

        self.gl.vertex_attrib_pointer_with_i32(pos_loc, 3, WebGlRenderingContext::FLOAT, false, 24, 0);
        self.gl.enable_vertex_attrib_array(pos_loc);
        self.gl.vertex_attrib_pointer_with_i32(col_loc, 3, WebGlRenderingContext::FLOAT, false, 24, 12);
        self.gl.enable_vertex_attrib_array(col_loc);
        self.gl.disable_vertex_attrib_array(tex_loc);

        self.gl.uniform1i(Some(&self.u_use_vertex_color), 1);
        self.gl.uniform1i(Some(&self.u_use_texture), 0);
        self.gl.uniform1i(Some(&self.u_lit), 0);
        self.gl.uniform1f(Some(&self.u_opacity), opacity);
        self.gl.uniform1f(Some(&self.u_point_size), size);
        self.gl.uniform_matrix4fv_with_f32_array(Some(&self.u_model), false, Matrix4::<f32>::identity().as_slice());

        self.gl.draw_arrays(WebGlRenderingContext::POINTS, 0, points.count);
    }

    /// Texture filled from raw RGBA bytes.
    pub fn create_texture_rgba(&self, width: i32, height: i32, pixels: &[u8]) -> Result<WebGlTexture, JsValue> {
        let texture = self.gl.create_texture().ok_or("Failed to create texture")?;
        self.gl.bind_texture(WebGlRenderingContext::TEXTURE_2D, Some(&texture));
        self.gl.tex_image_2d_with_i32_and_i32_and_i32_and_format_and_type_and_opt_u8_array(
            WebGlRenderingContext::TEXTURE_2D, 0, WebGlRenderingContext::RGBA as i32, width, height, 0,
            WebGlRenderingContext::RGBA, WebGlRenderingContext::UNSIGNED_BYTE, Some(pixels)
        )?;
        set_clamped_linear(&self.gl);
        Ok(texture)
    }

    /// Texture that shows a single white pixel until the image at `url` loads.
    pub fn create_texture(&self, url: &str) -> Result<WebGlTexture, JsValue> {
        let texture = self.create_texture_rgba(1, 1, &[255, 255, 255, 255])?;

        let img = HtmlImageElement::new()?;
        img.set_cross_origin(Some("anonymous"));

        let gl = self.gl.clone();
        let texture_clone = texture.clone();
        let img_clone = img.clone();
        let src = url.to_string();

        let onload = Closure::wrap(Box::new(move || {
            gl.bind_texture(WebGlRenderingContext::TEXTURE_2D, Some(&texture_clone));
            let uploaded = gl.tex_image_2d_with_u32_and_u32_and_image(
                WebGlRenderingContext::TEXTURE_2D, 0, WebGlRenderingContext::RGBA as i32, WebGlRenderingContext::RGBA, WebGlRenderingContext::UNSIGNED_BYTE, &img_clone
            );
            if let Err(e) = uploaded {
                log::warn!("texture upload failed for {}: {:?}", src, e);
                return;
            }

            if is_power_of_2(img_clone.width()) && is_power_of_2(img_clone.height()) {
                gl.generate_mipmap(WebGlRenderingContext::TEXTURE_2D);
                gl.tex_parameteri(WebGlRenderingContext::TEXTURE_2D, WebGlRenderingContext::TEXTURE_MIN_FILTER, WebGlRenderingContext::LINEAR_MIPMAP_LINEAR as i32);
            } else {
                set_clamped_linear(&gl);
            }
            log::debug!("texture loaded: {}", src);
        }) as Box<dyn FnMut()>);

        img.set_onload(Some(onload.as_ref().unchecked_ref()));
        onload.forget();

        img.set_src(url);

        Ok(texture)
    }
}

fn set_clamped_linear(gl: &WebGlRenderingContext) {
    gl.tex_parameteri(WebGlRenderingContext::TEXTURE_2D, WebGlRenderingContext::TEXTURE_WRAP_S, WebGlRenderingContext::CLAMP_TO_EDGE as i32);
    gl.tex_parameteri(WebGlRenderingContext::TEXTURE_2D, WebGlRenderingContext::TEXTURE_WRAP_T, WebGlRenderingContext::CLAMP_TO_EDGE as i32);
    gl.tex_parameteri(WebGlRenderingContext::TEXTURE_2D, WebGlRenderingContext::TEXTURE_MIN_FILTER, WebGlRenderingContext::LINEAR as i32);
}

fn is_power_of_2(value: u32) -> bool {
    value != 0 && (value & (value - 1)) == 0
}

fn create_program(gl: &WebGlRenderingContext) -> Result<WebGlProgram, JsValue> {
    let vert_shader = compile_shader(gl, WebGlRenderingContext::VERTEX_SHADER, VERTEX_SHADER)?;
    let frag_shader = compile_shader(gl, WebGlRenderingContext::FRAGMENT_SHADER, FRAGMENT_SHADER)?;

    let program = gl.create_program().ok_or("Unable to create program")?;
    gl.attach_shader(&program, &vert_shader);
    gl.attach_shader(&program, &frag_shader);
    gl.link_program(&program);

    if gl.get_program_parameter(&program, WebGlRenderingContext::LINK_STATUS).as_bool().unwrap_or(false) {
        Ok(program)
    } else {
        Err(JsValue::from_str(&gl.get_program_info_log(&program).unwrap_or_default()))
    }
}

fn compile_shader(gl: &WebGlRenderingContext, shader_type: u32, source: &str) -> Result<web_sys::WebGlShader, JsValue> {
    let shader = gl.create_shader(shader_type).ok_or("Unable to create shader")?;
    gl.shader_source(&shader, source);
    gl.compile_shader(&shader);

    if gl.get_shader_parameter(&shader, WebGlRenderingContext::COMPILE_STATUS).as_bool().unwrap_or(false) {
        Ok(shader)
    } else {
        Err(JsValue::from_str(&gl.get_shader_info_log(&shader).unwrap_or_default()))
    }
}
