// Copyright 2025 John Brosnihan
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//! Rhythm scene driven through the scene controller

use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

use image::{ImageFormat, Rgba, RgbaImage};
use runner_engine::config::GameConfig;
use runner_engine::platform::assets::{ImageCache, PngDecoder};
use runner_engine::platform::input::{InputKind, ScriptedInput};
use runner_engine::render::RecordingSurface;
use runner_engine::scene::karaoke::{KaraokeBackground, KaraokeInput, KaraokeSession, SESSION_FORMAT_VERSION};
use runner_engine::scene::{GameScenes, SceneController, SceneId};
use runner_engine::EngineError;
use semver::Version;

const DT: Duration = Duration::from_millis(100);

fn png(color: [u8; 4]) -> Vec<u8> {
    let mut bytes = Vec::new();
    RgbaImage::from_pixel(4, 4, Rgba(color))
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}

fn session(first_background: Vec<u8>) -> KaraokeSession {
    KaraokeSession {
        format_version: Version::parse(SESSION_FORMAT_VERSION).unwrap(),
        title: "integration".into(),
        music_duration_ms: 3_000,
        inputs: vec![
            KaraokeInput {
                sound: 0,
                target_hit_ms: 1_000,
            },
            KaraokeInput {
                sound: 1,
                target_hit_ms: 2_000,
            },
        ],
        backgrounds: vec![
            KaraokeBackground {
                image: first_background,
                duration_ms: 1_500,
                fade_in_ms: 200,
            },
            KaraokeBackground {
                image: png([0, 0, 255, 255]),
                duration_ms: 1_500,
                fade_in_ms: 200,
            },
        ],
    }
}

fn controller(session: KaraokeSession) -> SceneController {
    let cache = Arc::new(ImageCache::new(Arc::new(PngDecoder)));
    let scenes = GameScenes::new(GameConfig::default(), 1, cache).with_karaoke(session);
    SceneController::new(Box::new(scenes), SceneId::Title).unwrap()
}

#[test]
fn test_menu_to_karaoke_and_back() {
    let mut controller = controller(session(png([255, 0, 0, 255])));
    let mut input = ScriptedInput::new(vec![vec![InputKind::MoveDown], vec![InputKind::Confirm]]);
    // 3 s fade-in, then the first note is due 1 s into the music
    input.hold(&[], 39);
    input.hold(&[InputKind::KaraokeA], 1);
    input.hold(&[], 20);
    input.hold(&[InputKind::Confirm], 1);

    let mut surface = RecordingSurface::new();
    for _ in 0..2 {
        controller.frame(DT, &mut input, &mut surface).unwrap();
    }
    assert_eq!(controller.active(), SceneId::Karaoke);

    for _ in 0..60 {
        controller.frame(DT, &mut input, &mut surface).unwrap();
    }
    let texts = surface.texts();
    assert!(texts.contains(&"Perfect"));
    assert!(texts.contains(&"SCORE 81"));
    assert_eq!(controller.active(), SceneId::Karaoke);

    controller.frame(DT, &mut input, &mut surface).unwrap();
    assert_eq!(controller.active(), SceneId::Title);
    assert_eq!(controller.frames(), 63);
}

#[test]
fn test_undecodable_background_keeps_title() {
    let mut controller = controller(session(vec![0, 1, 2]));
    let mut input = ScriptedInput::new(vec![vec![InputKind::MoveDown], vec![InputKind::Confirm]]);
    let mut surface = RecordingSurface::new();

    controller.frame(DT, &mut input, &mut surface).unwrap();
    let err = controller.frame(DT, &mut input, &mut surface).unwrap_err();
    assert!(matches!(err, EngineError::AssetDecodeFailure(_)));
    assert_eq!(controller.active(), SceneId::Title);
    assert!(controller.is_running());
}

#[test]
fn test_session_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("song.json");
    let original = session(png([1, 2, 3, 255]));
    std::fs::write(&path, original.to_json().unwrap()).unwrap();

    assert_eq!(KaraokeSession::load(&path).unwrap(), original);

    std::fs::write(&path, r#"{"format_version": "2.0.0"}"#).unwrap();
    assert!(KaraokeSession::load(&path).is_err());
}
