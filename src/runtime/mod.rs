/// The dashboard event loop.
///
/// A single thread owns the [`Dashboard`] and applies events one at a time.
/// Every fetch runs on its own short-lived worker thread and reports its
/// [`Completion`] over a channel, so completions are applied in the order
/// their responses arrive, not the order they were issued. Refresher ticks
/// fire on schedule whether or not the previous tick's fetch has finished.
///
/// There is no cancellation: when the loop exits, completions still in
/// flight are sent into a closed channel and dropped.
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::{Duration, Instant};

use crate::client::Backend;
use crate::dashboard::{Completion, Dashboard, FetchRequest};
use crate::logging::{EventLog, FetchEvent};

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// An interactive command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    LoadMore,
    Redraw,
    Quit,
}

/// Parse one line of interactive input.
///
/// An empty line means "load more", matching a click on the control.
pub fn parse_command(line: &str) -> Option<Command> {
    match line.trim().to_ascii_lowercase().as_str() {
        "" | "m" | "more" => Some(Command::LoadMore),
        "r" | "redraw" => Some(Command::Redraw),
        "q" | "quit" | "exit" => Some(Command::Quit),
        _ => None,
    }
}

/// Something the loop must react to.
#[derive(Debug)]
pub enum Event {
    Completed(Completion),
    Input(Command),
}

// ---------------------------------------------------------------------------
// Fetch execution
// ---------------------------------------------------------------------------

/// Execute a request, timing it and recording it in the fetch log.
pub fn execute_logged(backend: &dyn Backend, log: &EventLog, request: FetchRequest) -> Completion {
    let start = Instant::now();
    let completion = request.execute(backend);
    let latency_ms = start.elapsed().as_millis() as u64;
    log.record(&FetchEvent::new(
        completion.endpoint(),
        completion.error(),
        latency_ms,
    ));
    completion
}

// ---------------------------------------------------------------------------
// Runtime
// ---------------------------------------------------------------------------

/// Owns the event channel and the set of in-flight fetches.
pub struct Runtime {
    backend: Arc<dyn Backend>,
    log: EventLog,
    tx: Sender<Event>,
    rx: Receiver<Event>,
    pending: usize,
}

impl Runtime {
    pub fn new(backend: Arc<dyn Backend>, log: EventLog) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            backend,
            log,
            tx,
            rx,
            pending: 0,
        }
    }

    /// A sender for feeding [`Event::Input`] from another thread.
    pub fn sender(&self) -> Sender<Event> {
        self.tx.clone()
    }

    /// Fetches issued but not yet applied.
    pub fn pending(&self) -> usize {
        self.pending
    }

    /// Start a fetch on a worker thread.
    pub fn dispatch(&mut self, request: FetchRequest) {
        let backend = Arc::clone(&self.backend);
        let log = self.log.clone();
        let tx = self.tx.clone();
        self.pending += 1;

        thread::spawn(move || {
            let completion = execute_logged(&*backend, &log, request);
            let _ = tx.send(Event::Completed(completion));
        });
    }

    pub fn dispatch_all(&mut self, requests: impl IntoIterator<Item = FetchRequest>) {
        for request in requests {
            self.dispatch(request);
        }
    }

    fn apply(&mut self, dashboard: &mut Dashboard, completion: Completion) {
        self.pending = self.pending.saturating_sub(1);
        dashboard.apply(completion);
    }

    /// Apply completions until nothing is in flight or `timeout` elapses.
    ///
    /// Input events arriving meanwhile are discarded. Returns `true` if every
    /// fetch completed.
    pub fn drain(&mut self, dashboard: &mut Dashboard, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while self.pending > 0 {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.rx.recv_timeout(remaining) {
                Ok(Event::Completed(completion)) => self.apply(dashboard, completion),
                Ok(Event::Input(_)) => {}
                Err(_) => return false,
            }
        }
        true
    }

    /// Run the interactive loop until [`Command::Quit`].
    ///
    /// Issues the startup requests, then reacts to completions, commands and
    /// refresher ticks. `on_update` is called after every change.
    pub fn run(&mut self, dashboard: &mut Dashboard, mut on_update: impl FnMut(&Dashboard)) {
        let requests = dashboard.start();
        self.dispatch_all(requests);
        on_update(&*dashboard);

        let interval = dashboard.refresh_interval();
        let mut next_tick = interval.map(|i| Instant::now() + i);

        loop {
            let event = match next_tick {
                Some(due) => {
                    let wait = due.saturating_duration_since(Instant::now());
                    self.rx.recv_timeout(wait)
                }
                None => self.rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
            };

            match event {
                Ok(Event::Completed(completion)) => {
                    self.apply(dashboard, completion);
                    on_update(&*dashboard);
                }
                Ok(Event::Input(Command::LoadMore)) => {
                    if let Some(request) = dashboard.load_more() {
                        self.dispatch(request);
                        on_update(&*dashboard);
                    }
                }
                Ok(Event::Input(Command::Redraw)) => on_update(&*dashboard),
                Ok(Event::Input(Command::Quit)) => break,
                Err(RecvTimeoutError::Timeout) => {
                    if let Some(request) = dashboard.tick() {
                        self.dispatch(request);
                    }
                    if let (Some(due), Some(interval)) = (next_tick, interval) {
                        next_tick = Some(next_tick_after(due, interval, Instant::now()));
                    }
                }
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
    }
}

/// The deadline following a tick that was due at `due`.
///
/// Missed ticks are not replayed: once the schedule has fallen behind `now`
/// it restarts one interval from `now`.
fn next_tick_after(due: Instant, interval: Duration, now: Instant) -> Instant {
    let next = due + interval;
    if next <= now { now + interval } else { next }
}

/// Forward stdin lines as commands until a quit command. End of input
/// counts as quit.
pub fn spawn_stdin_reader(tx: Sender<Event>) {
    thread::spawn(move || {
        let stdin = std::io::stdin();
        let mut line = String::new();
        loop {
            line.clear();
            match stdin.read_line(&mut line) {
                Ok(0) | Err(_) => {
                    let _ = tx.send(Event::Input(Command::Quit));
                    break;
                }
                Ok(_) => {
                    if let Some(command) = parse_command(&line) {
                        let quit = command == Command::Quit;
                        if tx.send(Event::Input(command)).is_err() || quit {
                            break;
                        }
                    }
                }
            }
        }
    });
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn on_schedule_tick_keeps_cadence() {
        let start = Instant::now();
        let interval = Duration::from_millis(100);
        let due = start + interval;
        assert_eq!(
            next_tick_after(due, interval, due + Duration::from_millis(3)),
            due + interval
        );
    }

    #[test]
    fn stalled_schedule_restarts_from_now() {
        let start = Instant::now();
        let interval = Duration::from_millis(100);
        let due = start + interval;
        // Woke up long after several ticks were due
        let now = due + Duration::from_secs(5);
        assert_eq!(next_tick_after(due, interval, now), now + interval);
    }

    #[test]
    fn parse_command_variants() {
        assert_eq!(parse_command(""), Some(Command::LoadMore));
        assert_eq!(parse_command("m\n"), Some(Command::LoadMore));
        assert_eq!(parse_command("MORE"), Some(Command::LoadMore));
        assert_eq!(parse_command("r"), Some(Command::Redraw));
        assert_eq!(parse_command(" q "), Some(Command::Quit));
        assert_eq!(parse_command("exit"), Some(Command::Quit));
        assert_eq!(parse_command("hello"), None);
    }
}
