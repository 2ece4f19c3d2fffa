use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use relay::{Action, DrainReport, ScreenHost};
use screens::{
    episode_details_screen,
    memory::{InMemoryEpisodeRepository, InMemoryPopularShows, InMemoryWatchedRepository},
    popular_screen, watched_screen, BackStackNavigator, NavigationSnapshot, HOME_ROUTE,
};
use serde::Serialize;
use shared::{domain::EpisodeId, nav::NavTarget};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod config;
mod script;

use config::load_settings;
use script::{parse_script, Step, Token};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ScreenKind {
    EpisodeDetails,
    Popular,
    Watched,
}

/// Hosts one screen, replays a scripted session against it and prints the
/// resulting navigation, drain report and view state.
#[derive(Parser, Debug)]
struct Args {
    #[arg(long, value_enum)]
    screen: ScreenKind,
    /// Comma-separated steps, e.g. `start,open-show:42,wait:10,close`.
    #[arg(long)]
    script: String,
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long, default_value_t = 7)]
    episode_id: i64,
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Serialize)]
struct SessionOutcome<S> {
    screen: &'static str,
    instance_id: String,
    rejected: Vec<String>,
    report: Option<DrainReport>,
    navigation: NavigationSnapshot,
    state: S,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let settings = load_settings(args.config.as_deref())?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&settings.log_filter))
        .init();

    let steps = parse_script(&args.script)?;
    let relay_config = settings.relay_config();
    info!(screen = ?args.screen, steps = steps.len(), ?relay_config, "starting scripted session");

    let rendered = match args.screen {
        ScreenKind::EpisodeDetails => {
            let episode_id = EpisodeId(args.episode_id);
            let navigator = Arc::new(BackStackNavigator::with_stack(
                HOME_ROUTE,
                [NavTarget::Episode(episode_id)],
            ));
            let screen = episode_details_screen(
                episode_id,
                Arc::new(InMemoryEpisodeRepository::seeded()),
                navigator.clone(),
                relay_config,
            );
            let outcome =
                run_session(screen, &navigator, &steps, script::episode_details_action).await?;
            render(&outcome, args.json)?
        }
        ScreenKind::Popular => {
            let navigator = Arc::new(BackStackNavigator::new(HOME_ROUTE));
            let screen = popular_screen(
                Arc::new(InMemoryPopularShows::new(250)),
                navigator.clone(),
                relay_config,
            );
            let outcome = run_session(screen, &navigator, &steps, script::popular_action).await?;
            render(&outcome, args.json)?
        }
        ScreenKind::Watched => {
            let navigator = Arc::new(BackStackNavigator::new(HOME_ROUTE));
            let screen = watched_screen(
                Arc::new(InMemoryWatchedRepository::seeded()),
                navigator.clone(),
                relay_config,
            );
            let outcome = run_session(screen, &navigator, &steps, script::watched_action).await?;
            render(&outcome, args.json)?
        }
    };

    println!("{rendered}");
    Ok(())
}

async fn run_session<S, A>(
    mut screen: ScreenHost<S, A>,
    navigator: &BackStackNavigator,
    steps: &[Step],
    to_action: fn(&Token) -> Result<A>,
) -> Result<SessionOutcome<S>>
where
    S: Clone + Send + Sync + Serialize + 'static,
    A: Action,
{
    let actions = steps
        .iter()
        .filter_map(|step| match step {
            Step::Offer(token) => Some(to_action(token)),
            _ => None,
        })
        .collect::<Result<Vec<A>>>()?;
    let mut actions = actions.into_iter();

    screen.on_create();
    let actioner = screen.actioner();
    let mut rejected = Vec::new();

    for step in steps {
        match step {
            Step::Start => screen
                .on_start()
                .with_context(|| format!("failed to start {} screen", screen.name()))?,
            Step::Stop => screen.on_stop(),
            Step::Resume => screen.on_resume(),
            Step::Pause => screen.on_pause(),
            Step::Wait(duration) => tokio::time::sleep(*duration).await,
            Step::Offer(_) => {
                let Some(action) = actions.next() else {
                    continue;
                };
                let name = action.name();
                if let Err(err) = actioner.offer(action) {
                    warn!(action = name, error = %err, "offer rejected");
                    rejected.push(format!("{name}: {err}"));
                }
            }
        }
    }

    let report = screen.on_destroy().await;
    Ok(SessionOutcome {
        screen: screen.name(),
        instance_id: screen.instance_id().to_string(),
        rejected,
        report,
        navigation: navigator.snapshot(),
        state: screen.view_model().state(),
    })
}

fn render<S: Serialize>(outcome: &SessionOutcome<S>, json: bool) -> Result<String> {
    if json {
        return Ok(serde_json::to_string_pretty(outcome)?);
    }

    let mut out = format!("screen: {} ({})\n", outcome.screen, outcome.instance_id);
    match &outcome.report {
        Some(report) => out.push_str(&format!(
            "drain: exit={:?} delivered={} navigated={} submitted={} failed={} discarded={}\n",
            report.exit,
            report.delivered,
            report.navigated,
            report.submitted,
            report.failed,
            report.discarded
        )),
        None => out.push_str("drain: never started\n"),
    }
    for rejected in &outcome.rejected {
        out.push_str(&format!("rejected: {rejected}\n"));
    }
    out.push_str(&format!(
        "back stack: {}\n",
        outcome.navigation.back_stack.join(" > ")
    ));
    out.push_str(&format!("state: {}", serde_json::to_string(&outcome.state)?));
    Ok(out)
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
