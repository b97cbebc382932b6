//! Event loop wiring the session to the backend client and the timers.
//!
//! Single logical thread of control: every external input funnels into one
//! mpsc queue and is applied to the session one event at a time. Effects
//! that need I/O (verification calls, timer ticks) are executed on spawned
//! tasks that feed their results back into the same queue; decoder-control
//! effects are left to the observer, which owns the decoder (if any).

use crate::event::{Effect, Event, Timer};
use crate::session::{GateSession, COOLDOWN_TICKS};
use aboor_client::Client;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::debug;

const CHANNEL_CAPACITY: usize = 64;

/// Timer intervals, injectable so tests do not wait wall-clock seconds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GateTimings {
    /// Interval between cooldown ticks.
    pub cooldown_tick: Duration,
    /// Delay before rearming after a failed first verification.
    pub recovery_delay: Duration,
}

impl Default for GateTimings {
    fn default() -> Self {
        Self {
            cooldown_tick: Duration::from_secs(1),
            recovery_delay: Duration::from_millis(3000),
        }
    }
}

/// Owns the session and the event queue for one gate lane.
pub struct Gate {
    session: GateSession,
    client: Arc<Client>,
    // Weak so the loop ends once all external senders are gone; effect
    // tasks upgrade for as long as they run.
    tx: mpsc::WeakSender<Event>,
    rx: mpsc::Receiver<Event>,
    timings: GateTimings,
}

impl Gate {
    /// Create a gate and the sender used to feed it events.
    pub fn new(client: Client) -> (Self, mpsc::Sender<Event>) {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        let gate = Self {
            session: GateSession::new(),
            client: Arc::new(client),
            tx: tx.downgrade(),
            rx,
            timings: GateTimings::default(),
        };
        (gate, tx)
    }

    pub fn with_timings(mut self, timings: GateTimings) -> Self {
        self.timings = timings;
        self
    }

    pub fn session(&self) -> &GateSession {
        &self.session
    }

    /// Consume events until every external sender is dropped. `observe`
    /// runs after each transition with the updated session and the effects
    /// it produced (decoder-control effects included, for whoever owns the
    /// decoder).
    pub async fn run<F>(&mut self, mut observe: F)
    where
        F: FnMut(&GateSession, &[Effect]),
    {
        while let Some(event) = self.rx.recv().await {
            let effects = self.session.apply(event);
            for effect in &effects {
                self.execute(effect);
            }
            observe(&self.session, &effects);
        }
        debug!("event queue closed, gate loop ending");
    }

    fn execute(&self, effect: &Effect) {
        match effect {
            Effect::Verify(phase, code) => {
                let Some(tx) = self.tx.upgrade() else { return };
                let client = self.client.clone();
                let phase = *phase;
                let code = code.clone();
                tokio::spawn(async move {
                    let result = client.verify(phase, &code).await;
                    // Receiver gone means the gate shut down mid-call.
                    let _ = tx.send(Event::VerifyOutcome(phase, result)).await;
                });
            }
            Effect::StartCooldown => {
                let Some(tx) = self.tx.upgrade() else { return };
                let tick = self.timings.cooldown_tick;
                tokio::spawn(async move {
                    for _ in 0..COOLDOWN_TICKS {
                        tokio::time::sleep(tick).await;
                        if tx.send(Event::TimerTick(Timer::Cooldown)).await.is_err() {
                            break;
                        }
                    }
                });
            }
            Effect::ScheduleRecovery => {
                let Some(tx) = self.tx.upgrade() else { return };
                let delay = self.timings.recovery_delay;
                tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    let _ = tx.send(Event::TimerTick(Timer::Recovery)).await;
                });
            }
            Effect::PauseDecoder
            | Effect::ResumeDecoder
            | Effect::StartDecoder
            | Effect::StopDecoder => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::OperatorAction;
    use aboor_simulator::{Api, Simulator};
    use aboor_types::{Outcome, ScanStep, Ticket, User};
    use std::net::SocketAddr;
    use tokio::sync::watch;

    fn fast_timings() -> GateTimings {
        GateTimings {
            cooldown_tick: Duration::from_millis(10),
            recovery_delay: Duration::from_millis(20),
        }
    }

    fn demo_ticket(holder: &str) -> Ticket {
        Ticket {
            ticket_id: Some("T-ABC123".to_string()),
            status: Some("valid".to_string()),
            user: Some(User {
                name: holder.to_string(),
            }),
            ..Ticket::default()
        }
    }

    async fn serve(simulator: Arc<Simulator>) -> (String, tokio::task::JoinHandle<()>) {
        let addr = SocketAddr::from(([127, 0, 0, 1], 0));
        let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let router = Api::new(simulator).router();
        let handle = tokio::spawn(async move {
            axum::serve(listener, router.into_make_service())
                .await
                .unwrap();
        });
        tokio::time::sleep(Duration::from_millis(50)).await;
        (base_url, handle)
    }

    /// Spawn the gate loop, mirroring every session snapshot into a watch
    /// channel the test can wait on.
    fn spawn_gate(
        client: Client,
    ) -> (
        mpsc::Sender<Event>,
        watch::Receiver<GateSession>,
        tokio::task::JoinHandle<GateSession>,
    ) {
        let (mut gate, tx) = Gate::new(client);
        gate = gate.with_timings(fast_timings());
        let (state_tx, state_rx) = watch::channel(GateSession::new());
        let handle = tokio::spawn(async move {
            gate.run(|session, _| {
                let _ = state_tx.send(session.clone());
            })
            .await;
            gate.session().clone()
        });
        (tx, state_rx, handle)
    }

    async fn wait_for<F>(rx: &mut watch::Receiver<GateSession>, what: &str, predicate: F)
    where
        F: Fn(&GateSession) -> bool,
    {
        let outcome = tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                {
                    let session = rx.borrow_and_update();
                    if predicate(&session) {
                        return;
                    }
                }
                if rx.changed().await.is_err() {
                    panic!("gate loop ended before reaching: {what}");
                }
            }
        })
        .await;
        outcome.unwrap_or_else(|_| panic!("timed out waiting for: {what}"));
    }

    #[tokio::test]
    async fn full_flow_admits_a_live_ticket() {
        let simulator = Arc::new(Simulator::new());
        simulator.register("1AAA", "2BBB", demo_ticket("Salem"));
        let (base_url, server) = serve(simulator.clone()).await;

        let client = Client::new(&base_url).unwrap();
        let (tx, mut state, handle) = spawn_gate(client);

        tx.send(Event::CodeScanned(r#"{"qrCode":"1AAA"}"#.to_string()))
            .await
            .unwrap();
        wait_for(&mut state, "second scan prompt", |session| {
            session.step() == ScanStep::AwaitingSecond
        })
        .await;

        tx.send(Event::CodeScanned("2BBB".to_string())).await.unwrap();
        wait_for(&mut state, "admission", |session| {
            session.step() == ScanStep::Resolved(Outcome::Accepted)
        })
        .await;

        drop(tx);
        let session = handle.await.unwrap();
        let ticket = session.ticket().expect("merged ticket");
        assert_eq!(ticket.ticket_id.as_deref(), Some("T-ABC123"));
        assert_eq!(ticket.user.as_ref().unwrap().name, "Salem");
        assert_eq!(simulator.primary_calls(), 1);
        assert_eq!(simulator.secondary_calls(), 1);

        server.abort();
    }

    #[tokio::test]
    async fn duplicate_second_scan_never_reaches_backend() {
        let simulator = Arc::new(Simulator::new());
        simulator.register("1AAA", "2BBB", demo_ticket("Salem"));
        let (base_url, server) = serve(simulator.clone()).await;

        let client = Client::new(&base_url).unwrap();
        let (tx, mut state, handle) = spawn_gate(client);

        tx.send(Event::CodeScanned("1AAA".to_string())).await.unwrap();
        wait_for(&mut state, "second scan prompt", |session| {
            session.step() == ScanStep::AwaitingSecond
        })
        .await;

        // Screenshot: the same code again.
        tx.send(Event::CodeScanned("1AAA".to_string())).await.unwrap();
        wait_for(&mut state, "fraud resolution", |session| {
            session.step() == ScanStep::Resolved(Outcome::Fraud)
        })
        .await;

        drop(tx);
        handle.await.unwrap();
        assert_eq!(simulator.primary_calls(), 1);
        assert_eq!(simulator.secondary_calls(), 0);

        server.abort();
    }

    #[tokio::test]
    async fn rejected_first_scan_rearms_after_recovery_delay() {
        let simulator = Arc::new(Simulator::new());
        let (base_url, server) = serve(simulator).await;

        let client = Client::new(&base_url).unwrap();
        let (tx, mut state, handle) = spawn_gate(client);

        tx.send(Event::CodeScanned("UNKNOWN".to_string()))
            .await
            .unwrap();
        wait_for(&mut state, "rejection status", |session| {
            session
                .status()
                .is_some_and(|status| status.details == "Invalid QR code")
        })
        .await;
        wait_for(&mut state, "automatic unpause", |session| {
            !session.paused() && session.step() == ScanStep::AwaitingFirst
        })
        .await;

        drop(tx);
        handle.await.unwrap();
        server.abort();
    }

    #[tokio::test]
    async fn reset_clears_a_resolved_session() {
        let simulator = Arc::new(Simulator::new());
        simulator.register("1AAA", "2BBB", demo_ticket("Salem"));
        let (base_url, server) = serve(simulator.clone()).await;

        let client = Client::new(&base_url).unwrap();
        let (tx, mut state, handle) = spawn_gate(client);

        tx.send(Event::CodeScanned("1AAA".to_string())).await.unwrap();
        wait_for(&mut state, "second scan prompt", |session| {
            session.step() == ScanStep::AwaitingSecond
        })
        .await;
        tx.send(Event::CodeScanned("1AAA".to_string())).await.unwrap();
        wait_for(&mut state, "fraud resolution", |session| {
            session.step() == ScanStep::Resolved(Outcome::Fraud)
        })
        .await;

        tx.send(Event::Operator(OperatorAction::Reset)).await.unwrap();
        wait_for(&mut state, "reset", |session| {
            session.step() == ScanStep::AwaitingFirst && !session.paused()
        })
        .await;

        drop(tx);
        let session = handle.await.unwrap();
        assert_eq!(session.first_code(), None);
        assert_eq!(session.ticket(), None);

        server.abort();
    }
}
