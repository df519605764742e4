//! Scene lighting state
//!
//! A fixed small lighting model: one directional light plus a bounded array
//! of point lights. The environment is owned by the renderer (passed in at
//! construction or mutated between frames), never global state, so tests and
//! multiple renderers stay isolated.
//!
//! Light uniforms are pushed into each shader program at its first use within
//! a frame and memoized for the rest of that frame; mutating the environment
//! mid-frame would serve stale data to programs drawn earlier, so callers
//! must only change lights between frames.

use crate::foundation::math::Vec3;
use crate::render::api::RenderBackend;
use crate::render::shader::ShaderProgram;

/// Maximum number of point lights uploaded to a program
pub const MAX_POINT_LIGHTS: usize = 4;

/// Parallel-ray light source (sun, distant lights)
#[derive(Debug, Clone, PartialEq)]
pub struct DirectionalLight {
    /// Direction the light travels, world space
    pub direction: Vec3,
    /// Light color (linear RGB)
    pub color: Vec3,
    /// Diffuse intensity multiplier
    pub intensity: f32,
    /// Ambient floor applied regardless of surface orientation
    pub ambient: f32,
}

impl Default for DirectionalLight {
    fn default() -> Self {
        Self {
            direction: Vec3::new(-0.3, -1.0, -0.3).normalize(),
            color: Vec3::new(1.0, 1.0, 1.0),
            intensity: 1.0,
            ambient: 0.1,
        }
    }
}

/// Omnidirectional light emitted from a point
#[derive(Debug, Clone, PartialEq)]
pub struct PointLight {
    /// World-space position
    pub position: Vec3,
    /// Light color (linear RGB)
    pub color: Vec3,
    /// Diffuse intensity multiplier
    pub intensity: f32,
    /// Distance at which attenuation reaches zero
    pub range: f32,
}

impl PointLight {
    /// Create a white point light at a position
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            color: Vec3::new(1.0, 1.0, 1.0),
            intensity: 1.0,
            range: 10.0,
        }
    }
}

/// Complete lighting setup for a scene
#[derive(Debug, Clone, Default)]
pub struct LightingEnvironment {
    /// The single directional light
    pub directional: DirectionalLight,
    point_lights: Vec<PointLight>,
}

impl LightingEnvironment {
    /// Environment with a default sun and no point lights
    pub fn new() -> Self {
        Self::default()
    }

    /// Neutral outdoor preset: bright overhead sun, low ambient
    pub fn outdoor_daylight() -> Self {
        Self {
            directional: DirectionalLight {
                direction: Vec3::new(-0.2, -1.0, -0.1).normalize(),
                color: Vec3::new(1.0, 0.98, 0.92),
                intensity: 1.2,
                ambient: 0.15,
            },
            point_lights: Vec::new(),
        }
    }

    /// Warm indoor preset: dim sun substitute plus a warm fill light
    pub fn indoor_warm() -> Self {
        let mut env = Self {
            directional: DirectionalLight {
                direction: Vec3::new(0.0, -1.0, 0.2).normalize(),
                color: Vec3::new(1.0, 0.9, 0.7),
                intensity: 0.4,
                ambient: 0.25,
            },
            point_lights: Vec::new(),
        };
        env.add_point_light(PointLight {
            position: Vec3::new(0.0, 2.0, 0.0),
            color: Vec3::new(1.0, 0.85, 0.6),
            intensity: 0.8,
            range: 8.0,
        });
        env
    }

    /// Add a point light; lights beyond [`MAX_POINT_LIGHTS`] are ignored
    pub fn add_point_light(&mut self, light: PointLight) {
        if self.point_lights.len() >= MAX_POINT_LIGHTS {
            log::warn!("point light limit ({MAX_POINT_LIGHTS}) reached, light dropped");
            return;
        }
        self.point_lights.push(light);
    }

    /// Remove all point lights
    pub fn clear_point_lights(&mut self) {
        self.point_lights.clear();
    }

    /// The active point lights
    pub fn point_lights(&self) -> &[PointLight] {
        &self.point_lights
    }

    /// Push the environment into a program's lighting uniforms
    pub(crate) fn upload(&self, backend: &mut dyn RenderBackend, program: &ShaderProgram) {
        let dir = &self.directional;
        program.set_vec3(backend, "u_dir_light.direction", dir.direction.into());
        program.set_vec3(backend, "u_dir_light.color", dir.color.into());
        program.set_f32(backend, "u_dir_light.intensity", dir.intensity);
        program.set_f32(backend, "u_dir_light.ambient", dir.ambient);

        program.set_i32(backend, "u_point_light_count", self.point_lights.len() as i32);
        for (i, light) in self.point_lights.iter().enumerate() {
            program.set_vec3(backend, &format!("u_point_lights[{i}].position"), light.position.into());
            program.set_vec3(backend, &format!("u_point_lights[{i}].color"), light.color.into());
            program.set_f32(backend, &format!("u_point_lights[{i}].intensity"), light.intensity);
            program.set_f32(backend, &format!("u_point_lights[{i}].range"), light.range);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_light_limit_is_enforced() {
        let mut env = LightingEnvironment::new();
        for i in 0..(MAX_POINT_LIGHTS + 3) {
            env.add_point_light(PointLight::at(Vec3::new(i as f32, 0.0, 0.0)));
        }
        assert_eq!(env.point_lights().len(), MAX_POINT_LIGHTS);
    }

    #[test]
    fn presets_have_normalized_sun_direction() {
        for env in [LightingEnvironment::outdoor_daylight(), LightingEnvironment::indoor_warm()] {
            let len = env.directional.direction.norm();
            assert!((len - 1.0).abs() < 1e-5);
        }
    }
}
