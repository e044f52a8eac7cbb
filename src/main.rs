// main.rs
mod audio;

use raylib::core::texture::RaylibTexture2D; // trait para .update_texture()
use raylib::prelude::*;

use data_dungeon::config::Config;
use data_dungeon::core::game::{Game, GameEvent, Intents};
use data_dungeon::render::Renderer;
use data_dungeon::render::framebuffer::Color as Rgba;
use data_dungeon::render::textures::{Texture, TextureSet};

use audio::AudioManager;

const CONFIG_PATH: &str = "config.json";

/// First image that loads from `paths`, converted to an engine texture.
fn load_first(paths: &[&str], label: &str) -> Option<Texture> {
    for path in paths {
        let Ok(img) = Image::load_image(path) else { continue };
        let (w, h) = (img.width().max(1) as u32, img.height().max(1) as u32);
        let px: Vec<Rgba> = img.get_image_data().iter().map(|c| Rgba::new(c.r, c.g, c.b, c.a)).collect();
        match Texture::from_colors(w, h, px) {
            Ok(tex) => {
                log::info!("{label}: loaded {path} ({w}x{h})");
                return Some(tex);
            }
            Err(e) => log::warn!("{label}: {path}: {e}"),
        }
    }
    log::warn!("{label}: not found, using procedural fallback");
    None
}

fn load_textures() -> TextureSet {
    TextureSet {
        enemy: load_first(&["lib/DataDungeon_enemy.png", "assets/enemy.png"], "enemy"),
        player_walk: load_first(&["lib/PlayerWalk.png", "assets/player_walk.png"], "player walk"),
        player_punch: load_first(&["lib/PlayerPunch.png", "assets/player_punch.png"], "player punch"),
    }
}

fn read_intents(rl: &RaylibHandle) -> Intents {
    let axis = |pos: KeyboardKey, neg: KeyboardKey| -> f32 {
        (rl.is_key_down(pos) as i32 - rl.is_key_down(neg) as i32) as f32
    };
    Intents {
        forward: axis(KeyboardKey::KEY_W, KeyboardKey::KEY_S),
        strafe: axis(KeyboardKey::KEY_D, KeyboardKey::KEY_A),
        turn: axis(KeyboardKey::KEY_RIGHT, KeyboardKey::KEY_LEFT),
        mouse_dx: rl.get_mouse_delta().x,
        attack: rl.is_key_pressed(KeyboardKey::KEY_SPACE)
            || rl.is_mouse_button_pressed(MouseButton::MOUSE_BUTTON_LEFT),
        restart: rl.is_key_pressed(KeyboardKey::KEY_R),
        toggle_map: rl.is_key_pressed(KeyboardKey::KEY_N),
        toggle_dither: rl.is_key_pressed(KeyboardKey::KEY_T),
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cfg = match Config::load_or_default(CONFIG_PATH) {
        Ok(cfg) => cfg,
        Err(e) => {
            log::error!("{CONFIG_PATH}: {e}; falling back to defaults");
            Config::default()
        }
    };
    let (iw, ih) = (cfg.render.internal_width, cfg.render.internal_height);
    let scale = cfg.render.scale.max(1) as i32;
    let (window_width, window_height) = (iw as i32 * scale, ih as i32 * scale);

    let (mut window, raylib_thread) = raylib::init()
        .size(window_width, window_height)
        .title("The Data Dungeon")
        .build();
    window.set_target_fps(60);
    // capturar el cursor para mouse look
    window.disable_cursor();

    let textures = load_textures();

    let mut audio = match AudioManager::new() {
        Ok(mut a) => {
            a.load_sfx_auto();
            a.play_music_loop_auto();
            Some(a)
        }
        Err(e) => {
            log::warn!("{e}; running without sound");
            None
        }
    };

    let seed = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    let mut game = Game::new(cfg, seed);
    let mut renderer = Renderer::new(iw, ih);

    // textura persistente del tamaño interno; se actualiza cada frame
    let blank = Image::gen_image_color(iw as i32, ih as i32, Color::BLACK);
    let mut screen_tex = match window.load_texture_from_image(&raylib_thread, &blank) {
        Ok(t) => t,
        Err(e) => {
            log::error!("could not create the screen texture: {e}");
            return;
        }
    };

    while !window.window_should_close() {
        let dt = window.get_frame_time();
        let time = window.get_time() as f32;
        let intents = read_intents(&window);

        if window.is_key_pressed(KeyboardKey::KEY_M) {
            if let Some(a) = audio.as_mut() { a.toggle_mute(); }
        }

        for ev in game.update(dt, &intents) {
            let Some(a) = audio.as_ref() else { break };
            match ev {
                GameEvent::Swing => a.play_swing(),
                GameEvent::PlayerHurt => a.play_hurt(),
                _ => {}
            }
        }

        renderer.render_game(&game, &textures, time);
        let _ = screen_tex.update_texture(&renderer.fb.to_rgba_bytes());

        let fps_now = window.get_fps();
        let muted = audio.as_ref().map_or(true, |a| a.is_muted());
        {
            let mut d = window.begin_drawing(&raylib_thread);
            d.clear_background(Color::BLACK);

            let src = Rectangle::new(0.0, 0.0, iw as f32, ih as f32);
            let dest = Rectangle::new(0.0, 0.0, window_width as f32, window_height as f32);
            d.draw_texture_pro(&screen_tex, src, dest, Vector2::zero(), 0.0, Color::WHITE);

            let hud = format!(
                "Floor: {}   Health: {}   Enemies Left: {}",
                game.floor,
                game.player.hp.max(0),
                game.enemies_remaining()
            );
            d.draw_text(&hud, 10, 10, 20, Color::RAYWHITE);
            d.draw_text(&format!("FPS: {fps_now}"), window_width - 90, 10, 20, Color::GRAY);
            d.draw_text(
                &format!(
                    "WASD move  Mouse/arrows turn  Space/click swing  N map  T dither  M {}  R reboot",
                    if muted { "unmute" } else { "mute" }
                ),
                10,
                window_height - 24,
                16,
                Color::LIGHTGRAY,
            );

            if let Some(b) = game.banner() {
                let tw = d.measure_text(&b.title, 40);
                d.draw_text(&b.title, (window_width - tw) / 2, window_height / 2 - 40, 40, Color::WHITE);
                let dw = d.measure_text(&b.detail, 20);
                d.draw_text(&b.detail, (window_width - dw) / 2, window_height / 2 + 8, 20, Color::LIGHTGRAY);
            }
        }
    }
}
