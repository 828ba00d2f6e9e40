// Copyright 2025 eraflo
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

use anyhow::{anyhow, Result};
use clap::Parser;
use lumen_sdk::logging::init_logging;
use lumen_sdk::prelude::*;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

const SHARED_MATERIALS: [&str; 4] = ["stone", "wood", "metal", "glass"];

#[derive(Parser, Debug)]
#[command(about = "Loads scenes on worker threads and renders a few frames")]
struct Args {
    /// Engine configuration file (`.ron` or `.json`).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of scenes, each loaded on its own thread.
    #[arg(long, default_value_t = 4)]
    scenes: usize,

    /// Number of frames rendered while every scene is loaded.
    #[arg(long, default_value_t = 3)]
    frames: u32,
}

struct Material {
    name: String,
    ready: AtomicBool,
}

impl Material {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ready: AtomicBool::new(false),
        }
    }
}

impl CacheElement for Material {
    const TYPE_NAME: &'static str = "Material";

    fn name(&self) -> &str {
        &self.name
    }
}

impl Initialise for Material {
    fn initialise(&self) -> anyhow::Result<()> {
        log::debug!("Uploading material '{}'", self.name);
        self.ready.store(true, Ordering::SeqCst);
        Ok(())
    }
}

impl Cleanup for Material {
    fn cleanup(&self) {
        log::debug!("Releasing material '{}'", self.name);
        self.ready.store(false, Ordering::SeqCst);
    }
}

/// A scene only tears down the materials it introduced.
struct Scene {
    name: String,
    materials: CacheView<Material>,
}

impl Scene {
    fn load(index: usize, materials: Arc<Cache<Material>>) -> Self {
        let name = format!("scene_{index}");
        let view = CacheView::new(materials);
        for material in SHARED_MATERIALS {
            view.add(material.to_string(), ());
        }
        view.add(format!("{name}_decal"), ());

        log::info!("Loaded '{}' (owns {} material(s))", name, view.len());
        Self {
            name,
            materials: view,
        }
    }
}

fn render(engine: &Engine, frames: u32) {
    for _ in 0..frames {
        if !engine.render_frame() {
            log::warn!("Frame {} had failing events.", engine.frame_count());
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = match &args.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    init_logging(&config.log_filter);

    let engine = Engine::new(config);
    let materials = Arc::new(engine.resource_cache(|name: &String, ()| Material::new(name)));

    let mut scenes = thread::scope(|scope| {
        let handles: Vec<_> = (0..args.scenes)
            .map(|index| {
                let materials = materials.clone();
                scope.spawn(move || Scene::load(index, materials))
            })
            .collect();

        handles
            .into_iter()
            .map(|handle| handle.join().map_err(|_| anyhow!("Scene loader thread panicked")))
            .collect::<Result<Vec<_>>>()
    })?;

    render(&engine, args.frames);
    let ready = materials
        .elements()
        .iter()
        .filter(|material| material.ready.load(Ordering::SeqCst))
        .count();
    log::info!("{} of {} material(s) ready on the GPU.", ready, materials.len());

    if let Some(scene) = scenes.pop() {
        log::info!(
            "Unloading '{}' ({} owned material(s))",
            scene.name,
            scene.materials.len()
        );
        drop(scene);
        render(&engine, 1);
        log::info!("{} material(s) remain cached.", materials.len());
    }

    drop(scenes);
    render(&engine, 1);
    log::info!(
        "Sandbox finished after {} frame(s); {} material(s) remain cached.",
        engine.frame_count(),
        materials.len()
    );

    Ok(())
}
