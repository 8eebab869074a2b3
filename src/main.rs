use std::time::Instant;

use anyhow::{anyhow, bail, Context, Result};
use log::info;

use bottle_world::viz::{self, RenderMode, RunPlan};
use bottle_world::{Simulation, TerrainConfig, World};

const USAGE: &str = "usage: bottle-world <topo|hydro|thermo|watershed|waterspeed> \
[--overture N] [--speed N] [--duration N] [--seed N] [--out PATH]";

#[derive(Debug)]
struct Args {
    mode: RenderMode,
    plan: RunPlan,
    seed: Option<u64>,
    out: String,
}

fn parse_number(flag: &str, value: Option<String>) -> Result<u64> {
    let value = value.ok_or_else(|| anyhow!("{flag} needs a value\n{USAGE}"))?;
    value
        .parse::<u64>()
        .with_context(|| format!("bad value {value:?} for {flag}\n{USAGE}"))
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Args> {
    let mode: RenderMode = args
        .next()
        .ok_or_else(|| anyhow!("missing render mode\n{USAGE}"))?
        .parse()?;

    let mut plan = RunPlan::for_mode(mode);
    let mut seed = None;
    let mut out = viz::default_output(mode);

    while let Some(flag) = args.next() {
        match flag.as_str() {
            "--overture" => plan.overture = parse_number(&flag, args.next())?,
            "--speed" => plan.speed = parse_number(&flag, args.next())?,
            "--duration" => plan.duration = parse_number(&flag, args.next())?,
            "--seed" => seed = Some(parse_number(&flag, args.next())?),
            "--out" => {
                out = args
                    .next()
                    .ok_or_else(|| anyhow!("--out needs a value\n{USAGE}"))?
            }
            other => bail!("unknown argument {other:?}\n{USAGE}"),
        }
    }
    if plan.speed == 0 {
        bail!("--speed must be at least 1");
    }
    if mode != RenderMode::Topo && plan.duration == 0 {
        bail!("--duration must be at least 1 for {mode}");
    }

    Ok(Args {
        mode,
        plan,
        seed,
        out,
    })
}

fn main() -> Result<()> {
    env_logger::init();
    let args = parse_args(std::env::args().skip(1))?;

    let mut config = TerrainConfig::default();
    if let Some(seed) = args.seed {
        config = config.reseeded(seed);
    }

    let start = Instant::now();
    let world = World::synthesize(&config).context("terrain synthesis failed")?;
    info!("Terrain synthesis took: {:?}", start.elapsed());

    let sim_start = Instant::now();
    let mut sim = Simulation::new(world);
    let frames = viz::record(&mut sim, &args.plan, args.mode);
    info!(
        "Water remaining: {} of {}",
        sim.current().total_water(),
        config.total_water
    );
    if frames.is_empty() {
        bail!("no frames captured; check --duration, --speed and --overture");
    }
    info!(
        "Simulation took: {:?} for {} frames",
        sim_start.elapsed(),
        frames.len()
    );

    let save_start = Instant::now();
    // A single still may also go out as PNG.
    if frames.len() == 1 && args.out.ends_with(".png") {
        frames[0]
            .save(&args.out)
            .with_context(|| format!("writing {}", args.out))?;
    } else {
        viz::write_gif(&args.out, frames).with_context(|| format!("writing {}", args.out))?;
    }
    info!("Saving took: {:?}", save_start.elapsed());
    println!("{} saved as {}", args.mode, args.out);
    Ok(())
}
