// Renderer struct that handles WebGl calls: it owns the point shader and the
// GPU buffers, and each frame re-uploads the packed particle buffers as a
// whole before drawing them as points seen through the game camera.

use crate::camera::Camera;
use crate::error::{Result, SurferError};
use crate::webgl_helpers;
use wasm_bindgen::JsCast;
use web_sys::{WebGlBuffer, WebGlProgram, WebGlRenderingContext, WebGlUniformLocation};
extern crate nalgebra_glm as glm;
use glm::TMat4;

const POINT_VERTEX_SHADER: &str = r#"
    attribute vec3 a_Position;
    attribute vec3 a_Color;

    uniform mat4 u_ViewProj;
    uniform float u_PointSize;

    varying vec3 v_Color;

    void main() {
        gl_Position = u_ViewProj * vec4(a_Position, 1.0);
        gl_PointSize = u_PointSize;
        v_Color = a_Color;
    }
"#;

const POINT_FRAGMENT_SHADER: &str = r#"
    precision mediump float;

    uniform float u_Opacity;

    varying vec3 v_Color;

    void main() {
        gl_FragColor = vec4(v_Color, u_Opacity);
    }
"#;

pub const PARTICLE_SIZE: f32 = 1.0;
pub const PARTICLE_OPACITY: f32 = 0.5;
const MARKER_SIZE: f32 = 10.0;
// white player, amber goal
const MARKER_COLORS: [f32; 6] = [1.0, 1.0, 1.0, 1.0, 0.85, 0.2];

pub struct Renderer {
    context: WebGlRenderingContext,
    point_shader: WebGlProgram,
    position_buffer: WebGlBuffer,
    color_buffer: WebGlBuffer,
    position_location: u32,
    color_location: u32,
    u_view_proj: WebGlUniformLocation,
    u_point_size: WebGlUniformLocation,
    u_opacity: WebGlUniformLocation,
}

impl Renderer {
    // Grabs the WebGl context from the canvas and builds the point program
    pub fn new(canvas: &web_sys::HtmlCanvasElement) -> Result<Self> {
        let context = canvas
            .get_context("webgl")
            .map_err(|_| SurferError::WebGl("get_context threw".to_owned()))?
            .ok_or_else(|| SurferError::WebGl("webgl is not available".to_owned()))?
            .dyn_into::<WebGlRenderingContext>()
            .map_err(|_| SurferError::WebGl("context is not a WebGlRenderingContext".to_owned()))?;

        let point_shader =
            webgl_helpers::link_program(&context, POINT_VERTEX_SHADER, POINT_FRAGMENT_SHADER)?;

        let position_location = attrib_location(&context, &point_shader, "a_Position")?;
        let color_location = attrib_location(&context, &point_shader, "a_Color")?;
        let u_view_proj = uniform_location(&context, &point_shader, "u_ViewProj")?;
        let u_point_size = uniform_location(&context, &point_shader, "u_PointSize")?;
        let u_opacity = uniform_location(&context, &point_shader, "u_Opacity")?;

        context.enable(WebGlRenderingContext::BLEND);
        context.blend_func(
            WebGlRenderingContext::SRC_ALPHA,
            WebGlRenderingContext::ONE_MINUS_SRC_ALPHA,
        );
        context.viewport(0, 0, canvas.width() as i32, canvas.height() as i32);

        let position_buffer = webgl_helpers::create_buffer(&context)?;
        let color_buffer = webgl_helpers::create_buffer(&context)?;

        log::info!("webgl renderer ready ({}x{})", canvas.width(), canvas.height());

        Ok(Renderer {
            context,
            point_shader,
            position_buffer,
            color_buffer,
            position_location,
            color_location,
            u_view_proj,
            u_point_size,
            u_opacity,
        })
    }

    pub fn resize(&self, width: u32, height: u32) {
        self.context.viewport(0, 0, width as i32, height as i32);
    }

    pub fn clear_screen(&self) {
        self.context.clear_color(0.0, 0.0, 0.0, 1.0);
        self.context.clear(WebGlRenderingContext::COLOR_BUFFER_BIT);
    }

    /// Draws `positions.len() / 3` points. Both slices are uploaded in full.
    pub fn draw_points(
        &self,
        positions: &[f32],
        colors: &[f32],
        camera: &Camera,
        point_size: f32,
        opacity: f32,
    ) {
        let count = (positions.len() / 3).min(colors.len() / 3);
        if count == 0 {
            return;
        }
        self.context.use_program(Some(&self.point_shader));
        webgl_helpers::upload_attribute(
            &self.context,
            &self.position_buffer,
            self.position_location,
            3,
            positions,
        );
        webgl_helpers::upload_attribute(
            &self.context,
            &self.color_buffer,
            self.color_location,
            3,
            colors,
        );

        let view_proj = view_projection(camera);
        self.context
            .uniform_matrix4fv_with_f32_array(Some(&self.u_view_proj), false, view_proj.as_slice());
        self.context.uniform1f(Some(&self.u_point_size), point_size);
        self.context.uniform1f(Some(&self.u_opacity), opacity);

        self.context
            .draw_arrays(WebGlRenderingContext::POINTS, 0, count as i32);
    }

    /// Player and goal as two large opaque points.
    pub fn draw_markers(&self, player: [f64; 2], goal: [f64; 2], camera: &Camera) {
        let positions = [
            player[0] as f32,
            player[1] as f32,
            0.0,
            goal[0] as f32,
            goal[1] as f32,
            0.0,
        ];
        self.draw_points(&positions, &MARKER_COLORS, camera, MARKER_SIZE, 1.0);
    }
}

/// Orthographic projection of the camera extents after undoing the camera's
/// position and roll.
pub fn view_projection(camera: &Camera) -> TMat4<f32> {
    let zoom = camera.zoom as f32;
    let projection = glm::ortho(
        camera.left as f32 / zoom,
        camera.right as f32 / zoom,
        camera.bottom as f32 / zoom,
        camera.top as f32 / zoom,
        -1.0,
        1.0,
    );
    let roll = glm::rotate_z(&glm::identity(), -(camera.rotation as f32));
    let view = glm::translate(
        &roll,
        &glm::vec3(
            -(camera.position.x as f32),
            -(camera.position.y as f32),
            0.0,
        ),
    );
    projection * view
}

fn attrib_location(
    context: &WebGlRenderingContext,
    program: &WebGlProgram,
    name: &str,
) -> Result<u32> {
    let location = context.get_attrib_location(program, name);
    if location < 0 {
        return Err(SurferError::WebGl(format!("missing attribute {}", name)));
    }
    Ok(location as u32)
}

fn uniform_location(
    context: &WebGlRenderingContext,
    program: &WebGlProgram,
    name: &str,
) -> Result<WebGlUniformLocation> {
    context
        .get_uniform_location(program, name)
        .ok_or_else(|| SurferError::WebGl(format!("missing uniform {}", name)))
}
