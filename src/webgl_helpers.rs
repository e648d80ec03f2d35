// Helper functions for dealing with shaders, compiling and linking them into
// shader programs, and creating the buffers the point renderer streams into.

use crate::error::{Result, SurferError};
use web_sys::{WebGlBuffer, WebGlProgram, WebGlRenderingContext, WebGlShader};

pub fn compile_shader(
    context: &WebGlRenderingContext,
    shader_type: u32,
    source: &str,
) -> Result<WebGlShader> {
    let shader = context
        .create_shader(shader_type)
        .ok_or_else(|| SurferError::Shader("unable to create shader object".to_owned()))?;
    context.shader_source(&shader, source);
    context.compile_shader(&shader);

    let compiled = context
        .get_shader_parameter(&shader, WebGlRenderingContext::COMPILE_STATUS)
        .as_bool()
        .unwrap_or(false);
    if compiled {
        Ok(shader)
    } else {
        let log = context
            .get_shader_info_log(&shader)
            .unwrap_or_else(|| "unknown error compiling shader".to_owned());
        context.delete_shader(Some(&shader));
        Err(SurferError::Shader(log))
    }
}

pub fn link_program(
    context: &WebGlRenderingContext,
    vertex_source: &str,
    fragment_source: &str,
) -> Result<WebGlProgram> {
    let vertex_shader =
        compile_shader(context, WebGlRenderingContext::VERTEX_SHADER, vertex_source)?;
    let fragment_shader =
        compile_shader(context, WebGlRenderingContext::FRAGMENT_SHADER, fragment_source)?;
    let program = context
        .create_program()
        .ok_or_else(|| SurferError::Shader("unable to create program object".to_owned()))?;
    context.attach_shader(&program, &vertex_shader);
    context.attach_shader(&program, &fragment_shader);
    context.link_program(&program);

    let linked = context
        .get_program_parameter(&program, WebGlRenderingContext::LINK_STATUS)
        .as_bool()
        .unwrap_or(false);
    if linked {
        Ok(program)
    } else {
        Err(SurferError::Shader(
            context
                .get_program_info_log(&program)
                .unwrap_or_else(|| "unknown error linking program".to_owned()),
        ))
    }
}

pub fn create_buffer(context: &WebGlRenderingContext) -> Result<WebGlBuffer> {
    context
        .create_buffer()
        .ok_or_else(|| SurferError::WebGl("failed to create buffer".to_owned()))
}

/// Streams `data` into `buffer` and points `location` at it as `size`-wide
/// float attributes.
pub fn upload_attribute(
    context: &WebGlRenderingContext,
    buffer: &WebGlBuffer,
    location: u32,
    size: i32,
    data: &[f32],
) {
    context.bind_buffer(WebGlRenderingContext::ARRAY_BUFFER, Some(buffer));
    // The view is consumed before anything else can allocate in wasm memory.
    unsafe {
        let view = js_sys::Float32Array::view(data);
        context.buffer_data_with_array_buffer_view(
            WebGlRenderingContext::ARRAY_BUFFER,
            &view,
            WebGlRenderingContext::DYNAMIC_DRAW,
        );
    }
    context.vertex_attrib_pointer_with_i32(location, size, WebGlRenderingContext::FLOAT, false, 0, 0);
    context.enable_vertex_attrib_array(location);
}
