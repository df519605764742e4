//! Scene viewer demo
//!
//! Builds a small scene (a lit spinning cube, a sprite, and a text overlay),
//! runs a fixed number of frames against the headless backend, and prints the
//! renderer statistics for the final frame. This is the engine's smoke-test
//! application; a windowed build would swap the backend and feed real input.

use std::rc::Rc;

use prism_engine::prelude::*;
use prism_engine::render::backends::HeadlessBackend;
use prism_engine::render::PointLight;

const VIEWPORT: (u32, u32) = (1280, 720);
const FRAME_COUNT: u32 = 120;
const TIMESTEP: f32 = 1.0 / 60.0;

struct ViewerApp {
    renderer: Renderer,
    world: World,
    camera: Camera,
    cube: Entity,
}

impl ViewerApp {
    fn new() -> Result<Self, RenderError> {
        let config = RendererConfig::load_or_default("viewer.toml");
        let mut renderer =
            Renderer::new(Box::new(HeadlessBackend::new()), config, VIEWPORT)?;

        let mut lighting = LightingEnvironment::outdoor_daylight();
        lighting.add_point_light(PointLight::at(Vec3::new(2.0, 3.0, 2.0)));
        *renderer.lighting_mut() = lighting;

        let mut world = World::new();

        let cube_mesh = renderer.create_cube()?;
        let cube_shader = renderer.register_shader("default", "default");
        let cube = world.create_entity();
        world.add_component(cube, TransformComponent::identity());
        world.add_component(cube, MeshRendererComponent::new(cube_mesh, cube_shader));
        world.add_component(cube, MaterialComponent::from_color([0.8, 0.7, 0.5, 1.0]));

        // The texture handle would come from the asset loader in a windowed
        // build; any non-zero handle works against the headless backend.
        let sprite_entity = world.create_entity();
        let mut sprite = SpriteComponent::new(TextureHandle(1000), 512, 256);
        sprite.lock = AspectRatioLock::Height;
        world.add_component(
            sprite_entity,
            TransformComponent::from_position_scale(Vec3::new(3.0, 0.0, -2.0), 1.5),
        );
        world.add_component(sprite_entity, sprite);

        let label = world.create_entity();
        world.add_component(
            label,
            TransformComponent::from_position(Vec3::new(16.0, 690.0, 0.0)),
        );
        world.add_component(label, TextComponent::new("prism viewer", demo_font()));

        let camera = Camera::new(Vec3::new(0.0, 1.5, 5.0), -90.0, -12.0);

        Ok(Self { renderer, world, camera, cube })
    }

    fn run(&mut self) {
        let mut input = InputState::new();
        input.press_key(KeyCode::W);

        for frame in 0..FRAME_COUNT {
            self.camera.process_input(&input, TIMESTEP);
            if let Some(transform) =
                self.world.get_component_mut::<TransformComponent>(self.cube)
            {
                transform.rotation_degrees.y = frame as f32 * 1.5;
            }
            self.renderer.draw_entities(&self.world, &self.camera, VIEWPORT);
        }

        let stats = self.renderer.rendering_statistics();
        println!("frames rendered: {FRAME_COUNT}");
        println!(
            "3d pass:     {} entities, {} vertices, {} draw calls ({:.3} ms)",
            stats.entities_3d, stats.vertices_3d, stats.draw_calls_3d, stats.pass_3d_ms
        );
        println!(
            "2d pass:     {} sprites, {} draw calls ({:.3} ms)",
            stats.entities_2d, stats.draw_calls_2d, stats.pass_2d_ms
        );
        println!(
            "text pass:   {} labels, {} glyph instances, {} draw calls ({:.3} ms)",
            stats.entities_text, stats.glyph_instances, stats.draw_calls_text, stats.pass_text_ms
        );
        println!("camera:      position {:?}", self.camera.position);
    }

    fn shutdown(&mut self) {
        self.renderer.shutdown();
    }
}

/// Fixed-metric stand-in for a rasterized font; the real atlas comes from the
/// (external) font loader.
fn demo_font() -> Rc<FontAtlas> {
    let mut atlas = FontAtlas::new(18.0);
    let mut texture = 2000u32;
    for ch in ('a'..='z').chain('A'..='Z').chain('0'..='9') {
        atlas.add_glyph(
            ch,
            GlyphInfo {
                texture: TextureHandle(texture),
                width: 9.0,
                height: 14.0,
                bearing: Vec2::new(0.0, 0.0),
                advance: 10.0,
            },
        );
        texture += 1;
    }
    atlas.add_glyph(
        ' ',
        GlyphInfo {
            texture: TextureHandle::NONE,
            width: 0.0,
            height: 0.0,
            bearing: Vec2::zeros(),
            advance: 6.0,
        },
    );
    Rc::new(atlas)
}

fn main() {
    env_logger::init();
    log::info!("starting viewer");

    let mut app = match ViewerApp::new() {
        Ok(app) => app,
        Err(err) => {
            log::error!("failed to initialize renderer: {err}");
            std::process::exit(1);
        }
    };
    app.run();
    app.shutdown();
}
