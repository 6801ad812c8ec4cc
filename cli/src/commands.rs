use std::fs;
use std::path::{Path, PathBuf};

use progchart_core::{
    AbilityCatalog, AppConfigExt, Attempt, FetchOptions, JsonFileCache, LoadedMilestones,
    MilestoneDefinition, ProgressionSummary, ReportFetcher, ResolvedAttempt, evaluate,
};
use progchart_render::{ChartInput, ChartRenderer, ResolvedFont, format_hms, format_mmss};
use progchart_types::ChartMode;

use crate::{CliContext, CliError};

/// Overrides for `run` taken from the command line
#[derive(Debug, Default)]
pub struct RunOptions {
    pub milestones: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub mode: Option<ChartMode>,
    pub refresh: bool,
    pub animate: bool,
}

/// Fetch, evaluate, render and print the summary.
pub async fn run(ctx: &mut CliContext, options: RunOptions) -> Result<(), CliError> {
    if let Some(mode) = options.mode {
        ctx.config.chart.mode = mode;
    }
    if let Some(output) = options.output {
        ctx.config.chart.output_path = output;
    }
    if options.animate {
        ctx.config.chart.animate = true;
    }

    let user_id = ctx.require_api_settings()?;
    let loaded = ctx.milestones(options.milestones.as_deref())?;

    let zone_id = loaded.zone_id(ctx.config.zone_id);
    let encounter_id = loaded.encounter_id(ctx.config.encounter_id);

    let client = ctx.authorized_client().await?;
    let cache = JsonFileCache::open(ctx.config.resolved_cache_path())?;
    let fetch_options = FetchOptions {
        refresh: options.refresh,
        encounter_id,
    };
    let mut fetcher = ReportFetcher::new(client, cache, fetch_options);

    let attempts = fetcher.fetch_attempts(user_id, zone_id).await?;
    let title = chart_title(&fetcher, zone_id, &loaded).await;

    let resolved = evaluate(&attempts, &loaded.set);

    let settings = &ctx.config.chart;
    tracing::info!(pulls = attempts.len(), mode = ?settings.mode, "Plotting pull data");
    let mut renderer = ChartRenderer::new(settings);
    let input = ChartInput {
        title: &title,
        attempts: &attempts,
        resolved: &resolved,
        milestones: &loaded.set,
        settings,
    };
    let outcome = if settings.animate {
        renderer.render_animation(&input, &animation_path(&settings.output_path))?
    } else {
        renderer.render(&input, &settings.output_path)?
    };

    print_summary(&attempts, &resolved, &loaded);
    match outcome.font {
        ResolvedFont::Named(_) => {}
        ResolvedFont::SansSerif => {
            println!("Font '{}' unavailable, used sans-serif", settings.font_family)
        }
        ResolvedFont::Unavailable => println!("No fonts installed, chart drawn without text"),
    }
    println!(
        "Chart written to {} ({} frame(s))",
        outcome.path.display(),
        outcome.frames
    );
    Ok(())
}

/// Animations are always written with a `.gif` extension.
fn animation_path(output_path: &Path) -> PathBuf {
    output_path.with_extension("gif")
}

/// Zone name from the API, falling back to the milestone file header.
async fn chart_title(
    fetcher: &ReportFetcher<JsonFileCache>,
    zone_id: u32,
    loaded: &LoadedMilestones,
) -> String {
    match fetcher.zone_name(zone_id).await {
        Ok(Some(name)) => return name,
        Ok(None) => tracing::warn!(zone_id, "Zone not found"),
        Err(e) => tracing::warn!(zone_id, error = %e, "Could not resolve zone name"),
    }

    loaded
        .encounter
        .as_ref()
        .map(|e| e.name.clone())
        .unwrap_or_else(|| format!("Zone {zone_id}"))
}

/// Evaluate an exported attempt list without touching the network.
pub fn evaluate_file(
    ctx: &CliContext,
    attempts_path: &Path,
    milestones: Option<&Path>,
) -> Result<(), CliError> {
    let content = fs::read_to_string(attempts_path).map_err(|source| CliError::ReadAttempts {
        path: attempts_path.to_path_buf(),
        source,
    })?;
    let attempts: Vec<Attempt> =
        serde_json::from_str(&content).map_err(|source| CliError::ParseAttempts {
            path: attempts_path.to_path_buf(),
            source,
        })?;

    let loaded = ctx.milestones(milestones)?;
    let resolved = evaluate(&attempts, &loaded.set);

    for (attempt, result) in attempts.iter().zip(&resolved) {
        println!(
            "#{:<5} {:<20} {:>6} {:>5} casts  {}",
            result.ordinal,
            format!("{}/{}", attempt.report_code, attempt.fight_id),
            format_mmss(attempt.duration_secs()),
            attempt.cast_count(),
            milestone_label(result, &loaded),
        );
    }
    println!();
    print_summary(&attempts, &resolved, &loaded);
    Ok(())
}

/// Load and validate a milestone file, then list its definitions.
pub fn validate(ctx: &CliContext, milestones: Option<&Path>) -> Result<(), CliError> {
    let loaded = ctx.milestones(milestones)?;

    println!("{} is valid", loaded.origin.display());
    if let Some(encounter) = &loaded.encounter {
        let zone = encounter.zone_id.map_or("-".to_string(), |z| z.to_string());
        let boss = encounter.encounter_id.map_or("-".to_string(), |e| e.to_string());
        println!("Encounter: {} (zone {zone}, encounter {boss})", encounter.name);
    }
    println!();
    println!("{:<6} {:<8} {:<40} Abilities", "Index", "Type", "Label");
    println!("{}", "-".repeat(70));

    for definition in &loaded.set {
        let (kind, abilities) = match definition {
            MilestoneDefinition::Ability { ability_ids, .. } => (
                "ability",
                ability_ids.iter().map(i64::to_string).collect::<Vec<_>>().join(", "),
            ),
            MilestoneDefinition::Victory { .. } => ("victory", String::new()),
        };
        println!(
            "{:<6} {:<8} {:<40} {abilities}",
            definition.index(),
            kind,
            definition.label()
        );
    }
    Ok(())
}

/// Print the ability catalog, fetching it on first use.
pub async fn abilities(ctx: &mut CliContext, search: Option<&str>) -> Result<(), CliError> {
    let path = ctx.abilities_path();

    let catalog = match AbilityCatalog::load(&path)? {
        Some(catalog) => catalog,
        None => {
            let client = ctx.authorized_client().await?;
            AbilityCatalog::load_or_fetch(&path, &client).await?
        }
    };

    let mut shown = 0;
    for (id, name) in catalog.search(search.unwrap_or_default()) {
        println!("{id:>8}  {name}");
        shown += 1;
    }
    println!("{shown} of {} abilities ({})", catalog.len(), path.display());
    Ok(())
}

/// Print the configuration file location and its values, secrets masked.
pub fn show_config(ctx: &CliContext) -> Result<(), CliError> {
    let path = ctx.config_path()?;
    let rendered =
        toml::to_string_pretty(&ctx.config.masked()).map_err(CliError::ShowConfig)?;

    println!("# {}", path.display());
    println!("# cache: {}", ctx.config.resolved_cache_path().display());
    println!("{rendered}");
    Ok(())
}

fn milestone_label<'a>(result: &ResolvedAttempt, loaded: &'a LoadedMilestones) -> &'a str {
    result
        .milestone
        .and_then(|index| loaded.set.get(index))
        .map_or("-", |m| m.label())
}

fn print_summary(attempts: &[Attempt], resolved: &[ResolvedAttempt], loaded: &LoadedMilestones) {
    let summary = ProgressionSummary::from_resolved(resolved, &loaded.set);

    println!("{:<6} {:<40} {:>6}", "Index", "Milestone", "Pulls");
    println!("{}", "-".repeat(54));
    for definition in &loaded.set {
        println!(
            "{:<6} {:<40} {:>6}",
            definition.index(),
            definition.label(),
            summary.count(definition.index())
        );
    }
    if summary.unresolved > 0 {
        println!("{:<6} {:<40} {:>6}", "-", "No milestone", summary.unresolved);
    }
    println!("{}", "-".repeat(54));

    let total_secs: f64 = attempts.iter().map(Attempt::duration_secs).sum();
    let deepest = summary
        .deepest
        .and_then(|index| loaded.set.get(index))
        .map_or("-", |m| m.label());
    let sessions = first_and_last_day(attempts);

    println!("Total pulls:           {}", summary.total_attempts);
    println!("Total time:            {}", format_hms(total_secs));
    println!("Deepest milestone:     {deepest}");
    println!("Kills:                 {}", summary.kills);
    if let Some(first_kill) = summary.first_kill {
        println!("First kill on pull:    #{first_kill}");
    }
    println!("Pulls since last kill: {}", summary.pulls_since_last_kill);
    if let Some((first, last)) = sessions {
        println!("Progression:           {first} to {last}");
    }
}

fn first_and_last_day(attempts: &[Attempt]) -> Option<(String, String)> {
    let first = attempts.first()?.started_at()?;
    let last = attempts.last()?.started_at()?;
    Some((
        first.format("%Y-%m-%d").to_string(),
        last.format("%Y-%m-%d").to_string(),
    ))
}
