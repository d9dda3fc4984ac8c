// render.rs - WebGL rendering sink
//
// Owns the shader program and the position buffer. The simulation hands over
// a flat [x0, y0, x1, y1, ...] buffer once per frame; an empty frame uploads
// and draws nothing.

use thiserror::Error;

/// Failures surfaced by the GL boundary, each carrying the driver's info log.
/// All of them abort initialization; the app collapses every variant into the
/// same user-facing "webgl unsupported" message.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("shader failed to compile: {0}")]
    ShaderCompile(String),
    #[error("program failed to link: {0}")]
    ProgramLink(String),
    #[error("could not allocate webgl {0}")]
    Allocation(&'static str),
}

#[cfg(target_arch = "wasm32")]
pub use webgl::Renderer;

#[cfg(target_arch = "wasm32")]
mod webgl {
    use js_sys::Float32Array;
    use web_sys::{WebGlBuffer, WebGlProgram, WebGlRenderingContext as GL, WebGlShader};

    use super::RenderError;
    use crate::shaders;
    use crate::sim::RADIUS;

    /// Point-sprite renderer over a WebGL 1 context.
    pub struct Renderer {
        gl: GL,
        _program: WebGlProgram,
        _position_buffer: WebGlBuffer,
    }

    impl Renderer {
        /// Compile and link the bundled shaders, then bind the static vertex
        /// layout: `position` as two tightly packed floats, `radius` set once.
        pub fn new(gl: GL) -> Result<Self, RenderError> {
            let program = link_program(&gl, shaders::VERTEX, shaders::FRAGMENT)?;
            gl.use_program(Some(&program));

            let position = gl.get_attrib_location(&program, "position") as u32;
            let buffer = gl.create_buffer().ok_or(RenderError::Allocation("buffer"))?;
            gl.bind_buffer(GL::ARRAY_BUFFER, Some(&buffer));
            gl.enable_vertex_attrib_array(position);
            gl.vertex_attrib_pointer_with_i32(position, 2, GL::FLOAT, false, 0, 0);

            let radius = gl.get_uniform_location(&program, "radius");
            gl.uniform1f(radius.as_ref(), RADIUS as f32);

            Ok(Self {
                gl,
                _program: program,
                _position_buffer: buffer,
            })
        }

        pub fn set_viewport(&self, width: u32, height: u32) {
            self.gl.viewport(0, 0, width as i32, height as i32);
        }

        /// Upload one frame of particle positions to the bound buffer.
        pub fn upload_positions(&self, positions: &[f32]) {
            // The view aliases wasm memory directly; nothing may allocate
            // while it is alive.
            unsafe {
                let view = Float32Array::view(positions);
                self.gl
                    .buffer_data_with_array_buffer_view(GL::ARRAY_BUFFER, &view, GL::STATIC_DRAW);
            }
        }

        pub fn draw_points(&self, count: usize) {
            self.gl.draw_arrays(GL::POINTS, 0, count as i32);
        }
    }

    fn compile_shader(gl: &GL, kind: u32, source: &str) -> Result<WebGlShader, RenderError> {
        let shader = gl.create_shader(kind).ok_or(RenderError::Allocation("shader"))?;
        gl.shader_source(&shader, source);
        gl.compile_shader(&shader);

        if gl
            .get_shader_parameter(&shader, GL::COMPILE_STATUS)
            .as_bool()
            .unwrap_or(false)
        {
            Ok(shader)
        } else {
            let log = gl.get_shader_info_log(&shader).unwrap_or_default();
            gl.delete_shader(Some(&shader));
            Err(RenderError::ShaderCompile(log))
        }
    }

    fn link_program(
        gl: &GL,
        vertex_src: &str,
        fragment_src: &str,
    ) -> Result<WebGlProgram, RenderError> {
        let vertex = compile_shader(gl, GL::VERTEX_SHADER, vertex_src)?;
        let fragment = compile_shader(gl, GL::FRAGMENT_SHADER, fragment_src)?;

        let program = gl.create_program().ok_or(RenderError::Allocation("program"))?;
        gl.attach_shader(&program, &vertex);
        gl.attach_shader(&program, &fragment);
        gl.link_program(&program);

        if gl
            .get_program_parameter(&program, GL::LINK_STATUS)
            .as_bool()
            .unwrap_or(false)
        {
            Ok(program)
        } else {
            let log = gl.get_program_info_log(&program).unwrap_or_default();
            gl.delete_program(Some(&program));
            Err(RenderError::ProgramLink(log))
        }
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_carry_the_driver_log() {
        let err = RenderError::ShaderCompile("0:1: syntax error".into());
        assert_eq!(err.to_string(), "shader failed to compile: 0:1: syntax error");

        let err = RenderError::ProgramLink("missing main".into());
        assert_eq!(err.to_string(), "program failed to link: missing main");
    }
}
