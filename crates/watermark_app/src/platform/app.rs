use std::collections::VecDeque;
use std::io::{self, Write};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use watermark_core::{update, AppState, AppViewModel, Msg, SessionState};
use watermark_engine::{ensure_output_dir, EngineHandle};
use watermark_logging::{wm_debug, wm_info};

use super::effects::EffectRunner;
use super::render::render;
use crate::cli::Cli;
use crate::config::{load_config, ResolvedConfig};

const EVENT_WAIT: Duration = Duration::from_millis(250);

pub fn run_app(cli: Cli) -> anyhow::Result<ExitCode> {
    let mut config = load_config(cli.config.as_deref())?;
    cli.apply_to(&mut config);
    let config: ResolvedConfig = config.resolve()?;

    ensure_output_dir(&config.output_dir)
        .with_context(|| format!("output directory {:?}", config.output_dir))?;
    wm_info!(
        "Starting batch of {} files against {}",
        cli.files.len(),
        config.service.base_url
    );

    let engine = EngineHandle::new(config.service.clone(), config.output_dir.clone())
        .context("cannot start engine")?;
    let runner = EffectRunner::new(engine, config.zip, config.options.lang);
    let mut session = Session::new(AppState::with_policy(config.policy.clone()), runner);

    session.dispatch(Msg::OptionsChanged(config.options.clone()));
    session.dispatch(Msg::FilesSelected(cli.files.clone()));
    session.dispatch(Msg::ProcessClicked);

    if session.state.session() != SessionState::Running {
        // Nothing was sent: the notice explains why.
        return Ok(ExitCode::FAILURE);
    }

    while !session.state.is_settled() {
        match session.runner.next_msg(EVENT_WAIT) {
            Some(msg) => session.dispatch(msg),
            None => session.dispatch(Msg::Tick),
        }
    }
    session.runner.shutdown();

    let view = session.state.view();
    wm_info!(
        "Batch settled: {} succeeded, {} failed",
        view.batch.succeeded,
        view.batch.failed
    );
    Ok(if view.batch.failed == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

struct Session {
    state: AppState,
    runner: EffectRunner,
    last_view: Option<AppViewModel>,
    inbox: VecDeque<Msg>,
}

impl Session {
    fn new(state: AppState, runner: EffectRunner) -> Self {
        Self {
            state,
            runner,
            last_view: None,
            inbox: VecDeque::new(),
        }
    }

    /// Applies `msg` and every message its effects produce synchronously.
    fn dispatch(&mut self, msg: Msg) {
        self.inbox.push_back(msg);
        while let Some(msg) = self.inbox.pop_front() {
            wm_debug!("dispatch {:?}", msg);
            let state = std::mem::take(&mut self.state);
            let (state, effects) = update(state, msg);
            self.state = state;
            if self.state.consume_dirty() {
                self.render();
            }
            let follow_ups = self.runner.enqueue(effects);
            self.inbox.extend(follow_ups);
        }
    }

    fn render(&mut self) {
        let view = self.state.view();
        let lines = render(self.last_view.as_ref(), &view);
        let mut stdout = io::stdout().lock();
        for line in lines {
            let _ = writeln!(stdout, "{line}");
        }
        let _ = stdout.flush();
        self.last_view = Some(view);
    }
}
