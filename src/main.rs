use std::{fs, process::ExitCode};

use tokio::runtime;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use twilight_mention::Mention;

use discord_framework::config::{Config, DemoConfig};
use discord_framework::framework::{Framework, FrameworkEvent, ReactionEvent, ReactionHandler, ReactionMessage};

const EVENT_CHANNEL_CAPACITY: usize = 100;

struct VoteLogger;

impl ReactionHandler for VoteLogger {
    fn on_add_reaction(&self, event: &ReactionEvent, data: &[String]) {
        info!(data = ?data, "{} voted {} on {}", event.user_id.mention(), event.emoji, event.message_id);
    }

    fn on_remove_reaction(&self, event: &ReactionEvent, _data: &[String]) {
        info!("{} withdrew {} on {}", event.user_id.mention(), event.emoji, event.message_id);
    }
}

fn main() -> ExitCode {
    let config_file = match fs::read_to_string("./config.toml") {
        Ok(contents) => contents,
        Err(err) => {
            eprintln!("Could not read ./config.toml: {}", err);
            return ExitCode::FAILURE
        },
    };

    let config = match Config::load(&config_file) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Invalid config: {}", err);
            return ExitCode::FAILURE
        },
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_filter.as_deref().unwrap_or("info")));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let runtime = match runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(err) => {
            error!("Could not start runtime: {}", err);
            return ExitCode::FAILURE
        },
    };

    runtime.block_on(run(config))
}

async fn run(config: Config) -> ExitCode {
    let framework = match Framework::new(&config) {
        Ok(framework) => framework,
        Err(err) => {
            error!("Could not create framework: {}", err);
            return ExitCode::FAILURE
        },
    };

    let mut events = framework.subscribe(EVENT_CHANNEL_CAPACITY).await;
    let dispatcher = framework.start();

    while let Some(event) = events.recv().await {
        match event {
            FrameworkEvent::Connected { user_id } => {
                info!("Connected as {}", user_id);

                if let Some(demo) = &config.demo {
                    let framework = framework.clone();
                    let demo = demo.clone();
                    tokio::spawn(async move { run_demo(&framework, &demo).await });
                }
            },
            FrameworkEvent::MessageError { message, status } => {
                warn!(?status, "{}", message);
            },
            FrameworkEvent::GatewayClosed => break,
            _ => (),
        }
    }

    let _ = dispatcher.await;
    info!("Gateway closed, exiting");

    ExitCode::SUCCESS
}

async fn run_demo(framework: &Framework, demo: &DemoConfig) {
    let channel_id = match demo.channel_id() {
        Ok(channel_id) => channel_id,
        Err(err) => {
            error!("{}", err);
            return
        },
    };

    let poll = ReactionMessage::text(
        demo.prompt.clone(),
        demo.reactions.clone(),
        demo.data.clone(),
        VoteLogger,
    );

    if let Err(err) = framework.send_reaction_message(channel_id, poll).await {
        error!("Demo poll could not be sent: {}", err);
    }

    if let Err(err) = framework.send_timed_message(channel_id, "This notice removes itself shortly.").await {
        error!("Demo notice could not be sent: {}", err);
    }
}
