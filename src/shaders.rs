// shaders.rs - GLSL sources for the point-sprite program
//
// The interface is fixed: a 2-component `position` attribute fed once per
// frame and a scalar `radius` uniform set once at program setup.

pub const VERTEX: &str = r#"
attribute vec2 position;
uniform float radius;

void main() {
    gl_Position = vec4(position, 0.0, 1.0);
    gl_PointSize = radius;
}
"#;

pub const FRAGMENT: &str = r#"
precision mediump float;

void main() {
    vec2 offset = gl_PointCoord - vec2(0.5);
    if (dot(offset, offset) > 0.25) {
        discard;
    }
    gl_FragColor = vec4(0.35, 0.65, 0.95, 1.0);
}
"#;
