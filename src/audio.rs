//! Background music and a couple of one-shot effects through rodio.
use std::fs::File;
use std::io::{BufReader, Cursor, Read};
use std::sync::Arc;

use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};

use data_dungeon::error::{Error, Result};

const MUSIC_VOLUME: f32 = 0.6;

fn load_bytes(path: &str) -> Option<Vec<u8>> {
    let mut f = File::open(path).ok()?;
    let mut buf = Vec::new();
    f.read_to_end(&mut buf).ok()?;
    Some(buf)
}

fn load_bytes_any(paths: &[&str]) -> Option<Vec<u8>> {
    let found = paths.iter().find_map(|p| load_bytes(p).map(|b| (p, b)));
    match found {
        Some((p, b)) => {
            log::debug!("audio: loaded {p}");
            Some(b)
        }
        None => {
            log::warn!("audio: none of {paths:?} found");
            None
        }
    }
}

pub struct AudioManager {
    _stream: OutputStream,
    handle: OutputStreamHandle,
    music: Option<Sink>,
    swing: Option<Arc<Vec<u8>>>,
    hurt: Option<Arc<Vec<u8>>>,
    muted: bool,
}

impl AudioManager {
    pub fn new() -> Result<Self> {
        let (_stream, handle) = OutputStream::try_default().map_err(|e| Error::Audio(e.to_string()))?;
        Ok(Self { _stream, handle, music: None, swing: None, hurt: None, muted: false })
    }

    pub fn load_sfx_auto(&mut self) {
        self.swing = load_bytes_any(&["lib/swing.wav", "assets/sounds/swing.wav"]).map(Arc::new);
        self.hurt = load_bytes_any(&["lib/hurt.wav", "assets/sounds/hurt.wav"]).map(Arc::new);
    }

    pub fn play_music_loop_auto(&mut self) {
        if self.music.is_some() { return; }
        let Some(bytes) = load_bytes_any(&["lib/ES_Tiger Tracks - Lexica.mp3", "lib/music.ogg", "assets/sounds/music.wav"]) else {
            return;
        };
        let Ok(dec) = Decoder::new_looped(Cursor::new(bytes)) else {
            log::warn!("audio: music track could not be decoded");
            return;
        };
        if let Ok(sink) = Sink::try_new(&self.handle) {
            sink.append(dec);
            sink.set_volume(if self.muted { 0.0 } else { MUSIC_VOLUME });
            self.music = Some(sink);
        }
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn toggle_mute(&mut self) {
        self.muted = !self.muted;
        if let Some(s) = &self.music {
            s.set_volume(if self.muted { 0.0 } else { MUSIC_VOLUME });
        }
        log::info!("music {}", if self.muted { "muted" } else { "on" });
    }

    pub fn play_swing(&self) {
        self.play_one_shot(self.swing.clone(), 0.8);
    }

    pub fn play_hurt(&self) {
        self.play_one_shot(self.hurt.clone(), 1.0);
    }

    /// Each effect gets its own detached sink so overlapping shots all play.
    fn play_one_shot(&self, data: Option<Arc<Vec<u8>>>, volume: f32) {
        if self.muted { return; }
        let Some(d) = data else { return };
        if let Ok(dec) = Decoder::new(BufReader::new(Cursor::new(d.as_ref().clone()))) {
            if let Ok(sink) = Sink::try_new(&self.handle) {
                sink.append(dec.amplify(volume));
                sink.detach();
            }
        }
    }
}
