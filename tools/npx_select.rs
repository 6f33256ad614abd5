// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Electrode Selection Tool

Reads a blueprint table (JSON, 5 rows by N electrodes: shank, column, row, state,
category), runs the configured selector and prints the resulting channel map
as JSON on stdout.

Usage:
  cargo run --bin npx_select -- <blueprint.json> [--config <file>] [--key=value ...]

Overrides use the configuration CLI keys, e.g. `--selector=weaker`,
`--seed=7`, `--sample_times=100`, `--option.ignore_exclude=1`.
Debug flags (`--debug-neurocarto-probe-npx`, `--debug-all`) raise log levels.

Exits with code 1 when the selected map leaves channels unused.
*/

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{info, warn};

use neurocarto::config::{self, ConfigError, NeurocartoConfig};
use neurocarto::observability::{self, LoggingConfig};
use neurocarto::prelude::*;

struct Args {
    blueprint: PathBuf,
    config: Option<PathBuf>,
    overrides: HashMap<String, String>,
}

fn usage(program: &str) -> String {
    format!(
        "Usage: {} <blueprint.json> [--config <file>] [--key=value ...]\n\n{}",
        program,
        observability::debug_flags_help()
    )
}

fn parse_args(args: &[String]) -> Result<Args> {
    let program = args.first().map(String::as_str).unwrap_or("npx_select");
    let mut blueprint = None;
    let mut config = None;
    let mut overrides = HashMap::new();

    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        if arg == "--config" {
            let path = iter.next().context("--config needs a file argument")?;
            config = Some(PathBuf::from(path));
        } else if arg.starts_with("--debug-") {
            continue;
        } else if let Some(pair) = arg.strip_prefix("--") {
            let (key, value) = pair
                .split_once('=')
                .with_context(|| format!("expected --key=value, got '{}'", arg))?;
            overrides.insert(key.to_string(), value.to_string());
        } else if blueprint.is_none() {
            blueprint = Some(PathBuf::from(arg));
        } else {
            bail!("unexpected argument '{}'\n{}", arg, usage(program));
        }
    }

    let blueprint = blueprint.with_context(|| usage(program))?;
    Ok(Args {
        blueprint,
        config,
        overrides,
    })
}

/// Configuration file when one exists, otherwise defaults; overrides apply either way.
fn resolve_config(args: &Args) -> Result<NeurocartoConfig> {
    let loaded = config::load_config(args.config.as_deref(), Some(&args.overrides));
    let cfg = match loaded {
        Ok(cfg) => cfg,
        Err(ConfigError::FileNotFound(_)) if args.config.is_none() => {
            let mut cfg = NeurocartoConfig::default();
            config::apply_environment_overrides(&mut cfg);
            config::apply_cli_overrides(&mut cfg, &args.overrides);
            cfg
        }
        Err(e) => return Err(e.into()),
    };
    config::validate_config(&cfg)?;
    Ok(cfg)
}

fn read_blueprint(path: &PathBuf) -> Result<ProbeBlueprint> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read blueprint {}", path.display()))?;
    let rows: Vec<Vec<i32>> = serde_json::from_str(&text)
        .with_context(|| format!("Blueprint {} is not a JSON integer table", path.display()))?;

    let n = rows.first().map_or(0, Vec::len);
    if rows.iter().any(|r| r.len() != n) {
        bail!("Blueprint {} has rows of different length", path.display());
    }
    let table = Array2::from_shape_vec((rows.len(), n), rows.into_iter().flatten().collect())?;
    Ok(ProbeBlueprint::from_array(&table)?)
}

fn run(args: &Args, cfg: &NeurocartoConfig) -> Result<bool> {
    let blueprint = read_blueprint(&args.blueprint)?;
    let expected = cfg.probe.probe_type()?;
    if blueprint.probe_type() != expected {
        warn!(
            "[NPX-SELECT] blueprint is {} but configuration says {}, using the blueprint",
            blueprint.probe_type(),
            expected
        );
    }

    let selection = &cfg.selection;
    let seed = selection.seed.unwrap_or_else(rand::random);
    let registry = SelectorRegistry::with_defaults();
    info!(
        "[NPX-SELECT] selector '{}' on {}, seed {}, {} sample(s)",
        selection.selector,
        blueprint.probe_type(),
        seed,
        selection.sample_times
    );

    let chmap = if selection.sample_times > 1 {
        let mut selector = registry.new_selector(&selection.selector)?;
        for (key, value) in &selection.options {
            selector.set_option(key, value)?;
        }
        let best = select_best_efficiency(
            selector.as_ref(),
            &blueprint,
            selection.sample_times,
            seed,
            selection.parallel,
        )?;
        match best {
            Some(best) => {
                info!("[NPX-SELECT] best run is sample {}", best.sample);
                best.chmap
            }
            None => {
                warn!("[NPX-SELECT] no sample produced a complete map, keeping the first run");
                let mut rng = StdRng::seed_from_u64(seed);
                selector.select(&blueprint, &mut rng)?
            }
        }
    } else {
        let mut rng = StdRng::seed_from_u64(seed);
        registry.select_with_options(&selection.selector, &selection.options, &blueprint, &mut rng)?
    };

    let efficiency = channel_efficiency(&blueprint, &chmap);
    println!("{}", serde_json::to_string_pretty(&chmap.snapshot())?);
    eprintln!(
        "channels {}/{}, area efficiency {:.3}, wasted {:.3}, efficiency {:.3}",
        chmap.size(),
        chmap.capacity(),
        efficiency.area,
        efficiency.wasted_rate(),
        efficiency.efficiency()
    );

    Ok(chmap.is_complete())
}

fn main() -> Result<()> {
    let argv: Vec<String> = env::args().collect();
    let debug_flags = observability::parse_debug_flags();
    let args = parse_args(&argv)?;
    let cfg = resolve_config(&args)?;

    let logging = LoggingConfig::from_settings(&cfg.logging.level, &cfg.logging.format)
        .map_err(anyhow::Error::msg)?;
    let guard = observability::init_logging(&debug_flags, &logging)?;

    let complete = run(&args, &cfg)?;
    if !complete {
        warn!("[NPX-SELECT] channel map is incomplete");
    }
    drop(guard);
    if !complete {
        std::process::exit(1);
    }
    Ok(())
}
