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
//! Headless run
//!
//! Drives the scene controller with scripted input and a recording surface:
//! the title menu starts a run, the player walks right and jumps now and
//! then, and the draw commands are counted per layer.
//!
//! ```text
//! cargo run --example headless_run -- --frames 600 --seed 7
//! ```

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use runner_engine::config::GameConfig;
use runner_engine::logging::init_logging;
use runner_engine::platform::assets::{ImageCache, PngDecoder};
use runner_engine::platform::input::{InputKind, ScriptedInput};
use runner_engine::render::RecordingSurface;
use runner_engine::scene::karaoke::KaraokeSession;
use runner_engine::scene::{GameScenes, SceneController, SceneId};

#[derive(Parser, Debug)]
#[command(about = "Run the game without a window")]
struct Args {
    /// Frames to simulate
    #[arg(long, default_value_t = 600)]
    frames: u32,

    /// Level seed
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// RON config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Karaoke session JSON, enables the rhythm scene
    #[arg(long)]
    session: Option<PathBuf>,
}

fn script(frames: u32) -> ScriptedInput {
    let mut input = ScriptedInput::new(vec![vec![InputKind::Confirm]]);
    let mut remaining = frames.saturating_sub(1) as usize;
    while remaining > 0 {
        let walk = remaining.min(90);
        input.hold(&[InputKind::MoveRight], walk);
        remaining -= walk;
        let jump = remaining.min(10);
        input.hold(&[InputKind::MoveRight, InputKind::Jump, InputKind::Shoot], jump);
        remaining -= jump;
    }
    input
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = match &args.config {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };
    init_logging(Some(&config.debug));

    let cache = Arc::new(ImageCache::new(Arc::new(PngDecoder)));
    let mut scenes = GameScenes::new(config, args.seed, cache);
    if let Some(path) = &args.session {
        scenes = scenes.with_karaoke(KaraokeSession::load(path)?);
    }
    let mut controller = SceneController::new(Box::new(scenes), SceneId::Title)?;

    let mut input = script(args.frames);
    let mut surface = RecordingSurface::new();
    let dt = Duration::from_secs_f64(1.0 / 60.0);
    let mut visits: BTreeMap<String, u32> = BTreeMap::new();

    for _ in 0..args.frames {
        *visits.entry(controller.active().to_string()).or_default() += 1;
        if !controller.frame(dt, &mut input, &mut surface)? {
            break;
        }
    }
    controller.shutdown()?;

    let mut per_layer: BTreeMap<String, usize> = BTreeMap::new();
    for layer in surface.layers() {
        *per_layer.entry(format!("{:?}", layer)).or_default() += 1;
    }

    println!("frames run: {}", controller.frames());
    for (scene, frames) in &visits {
        println!("  {:<10} {} frames", scene, frames);
    }
    println!("draw commands by layer:");
    for (layer, count) in &per_layer {
        println!("  {:<10} {}", layer, count);
    }
    Ok(())
}
