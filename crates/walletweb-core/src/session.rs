//! Export dialog state machine with asynchronous, cancellable generation

use chrono::Local;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;

use crate::error::{CoreError, CoreResult};
use crate::export::{build_report, ExportHistory, ExportOptions, ReportDescriptor};
use crate::models::Transaction;
use crate::summary::summarize;

/// Shared handle to the export session
pub type SessionRef = Arc<Mutex<ExportSession>>;

/// Where the export dialog currently is
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum ExportState {
    Idle,
    Generating { generation: u64, options: ExportOptions },
    Ready { report: ReportDescriptor },
    Failed { message: String },
}

impl ExportState {
    pub fn name(&self) -> &'static str {
        match self {
            ExportState::Idle => "idle",
            ExportState::Generating { .. } => "generating",
            ExportState::Ready { .. } => "ready",
            ExportState::Failed { .. } => "failed",
        }
    }
}

/// Handed to the generation task when a run starts
#[derive(Debug)]
pub struct GenerationTicket {
    pub generation: u64,
    pub options: ExportOptions,
    pub delay: Duration,
    cancel: watch::Receiver<bool>,
}

/// Export session plus the history of reports it has produced
#[derive(Debug)]
pub struct ExportSession {
    state: ExportState,
    generation: u64,
    cancel: Option<watch::Sender<bool>>,
    delay: Duration,
    history: ExportHistory,
}

impl ExportSession {
    pub fn new(delay: Duration, history_capacity: usize) -> Self {
        Self {
            state: ExportState::Idle,
            generation: 0,
            cancel: None,
            delay,
            history: ExportHistory::new(history_capacity),
        }
    }

    /// Wrap in a shared handle
    pub fn shared(self) -> SessionRef {
        Arc::new(Mutex::new(self))
    }

    pub fn state(&self) -> &ExportState {
        &self.state
    }

    pub fn is_generating(&self) -> bool {
        matches!(self.state, ExportState::Generating { .. })
    }

    pub fn history(&self) -> &ExportHistory {
        &self.history
    }

    pub fn report(&self, id: &str) -> Option<&ReportDescriptor> {
        self.history.get(id)
    }

    /// Move to `Generating`. Fails with `AlreadyGenerating` while a run is in
    /// flight; from `Ready` or `Failed` the previous result is discarded.
    pub fn begin(&mut self, options: ExportOptions) -> CoreResult<GenerationTicket> {
        if self.is_generating() {
            return Err(CoreError::AlreadyGenerating);
        }

        self.generation += 1;
        let (tx, rx) = watch::channel(false);
        self.cancel = Some(tx);
        self.state = ExportState::Generating {
            generation: self.generation,
            options: options.clone(),
        };
        log::debug!("export generation {} started ({})", self.generation, options.format);

        Ok(GenerationTicket {
            generation: self.generation,
            options,
            delay: self.delay,
            cancel: rx,
        })
    }

    /// Record the outcome of run `generation`. Returns false, leaving the
    /// state untouched, when that run is no longer current.
    pub fn finish(&mut self, generation: u64, result: CoreResult<ReportDescriptor>) -> bool {
        let current = matches!(
            self.state,
            ExportState::Generating { generation: g, .. } if g == generation
        );
        if !current {
            log::debug!("discarding result of stale export generation {}", generation);
            return false;
        }

        self.cancel = None;
        self.state = match result {
            Ok(report) => {
                log::info!("report {} ready ({} transactions)", report.id, report.transaction_count);
                self.history.push(report.clone());
                ExportState::Ready { report }
            }
            Err(e) => {
                log::warn!("export generation {} failed: {}", generation, e);
                ExportState::Failed { message: e.to_string() }
            }
        };
        true
    }

    /// Abort the run in flight and return to `Idle`. Returns false when
    /// nothing was generating.
    pub fn cancel(&mut self) -> bool {
        if !self.is_generating() {
            return false;
        }
        if let Some(tx) = self.cancel.take() {
            let _ = tx.send(true);
        }
        log::info!("export generation {} cancelled", self.generation);
        self.state = ExportState::Idle;
        true
    }

    /// Close a finished dialog. `Generating` is left alone.
    pub fn dismiss(&mut self) {
        if matches!(self.state, ExportState::Ready { .. } | ExportState::Failed { .. }) {
            self.state = ExportState::Idle;
        }
    }
}

async fn cancelled(rx: &mut watch::Receiver<bool>) {
    loop {
        if *rx.borrow() {
            return;
        }
        if rx.changed().await.is_err() {
            if *rx.borrow() {
                return;
            }
            std::future::pending::<()>().await;
        }
    }
}

/// Start generating a report from `transactions` in a background task
pub async fn start_export(
    session: &SessionRef,
    transactions: Vec<Transaction>,
    options: ExportOptions,
) -> CoreResult<JoinHandle<()>> {
    let ticket = session.lock().await.begin(options)?;
    let session = Arc::clone(session);
    Ok(tokio::spawn(run_generation(session, ticket, transactions)))
}

async fn run_generation(session: SessionRef, mut ticket: GenerationTicket, transactions: Vec<Transaction>) {
    tokio::select! {
        _ = tokio::time::sleep(ticket.delay) => {}
        _ = cancelled(&mut ticket.cancel) => {
            log::debug!("export generation {} observed cancellation", ticket.generation);
            return;
        }
    }

    let summary = summarize(&transactions);
    let result = build_report(&transactions, &summary, &ticket.options, Local::now().naive_local());
    session.lock().await.finish(ticket.generation, result);
}
