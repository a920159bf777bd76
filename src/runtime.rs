//! Event loop for hosts without a frame clock.
//!
//! Events arrive on a channel and are handled one at a time; animation ticks
//! come from an [`IntervalScheduler`]. The loop only ever blocks in `select!`
//! waiting for the next event or the next due tick.

use std::time::Instant;

use crossbeam_channel::{at, never, select, Receiver};
use tracing::{debug, info};

use crate::models::Millis;
use crate::scroll::IntervalScheduler;
use crate::session::{InputMode, LyricsView, Session};
use crate::transcript::RecognitionResult;

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Fragment { text: String, is_final: bool },
    Results(Vec<RecognitionResult>),
    AudioLevel(u8),
    SetInputMode(InputMode),
    Stop,
}

/// Drive `session` until `Stop` arrives or every sender is dropped. The
/// session is started if needed and stopped (reset) before it is returned.
pub fn run<V: LyricsView>(
    mut session: Session<IntervalScheduler, V>,
    events: Receiver<SessionEvent>,
) -> Session<IntervalScheduler, V> {
    let origin = Instant::now();
    session.start(elapsed_ms(origin, origin));

    let mut handled: u64 = 0;
    loop {
        let timer = session.scheduler().deadline().map_or_else(never, at);
        select! {
            recv(events) -> event => {
                let event = match event {
                    Ok(SessionEvent::Stop) | Err(_) => break,
                    Ok(event) => event,
                };
                handled += 1;
                let now = elapsed_ms(origin, Instant::now());
                handle(&mut session, event, now);
            }
            recv(timer) -> fired => {
                let fired_at = fired.unwrap_or_else(|_| Instant::now());
                if session.scheduler_mut().fire(fired_at) {
                    let frame_ms = fired_at.duration_since(origin).as_secs_f64() * 1_000.0;
                    session.on_tick(frame_ms);
                }
            }
        }
    }

    info!(events = handled, line = session.current_line_index(), "runtime: loop finished");
    session.stop();
    session
}

fn handle<V: LyricsView>(session: &mut Session<IntervalScheduler, V>, event: SessionEvent, now: Millis) {
    match event {
        SessionEvent::Fragment { text, is_final } => {
            session.on_fragment(&text, is_final, now);
        }
        SessionEvent::Results(results) => {
            session.on_results(&results, now);
        }
        SessionEvent::AudioLevel(level) => {
            session.on_audio_level(level, now);
        }
        SessionEvent::SetInputMode(mode) => session.set_input_mode(mode, now),
        SessionEvent::Stop => debug!("runtime: stop handled by loop"),
    }
}

fn elapsed_ms(origin: Instant, now: Instant) -> Millis {
    now.duration_since(origin).as_millis() as Millis
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::lyrics::LineIndex;
    use crate::view::SimulatedView;
    use crossbeam_channel::unbounded;
    use std::thread;
    use std::time::Duration;

    fn session() -> Session<IntervalScheduler, SimulatedView> {
        let lines = LineIndex::from_text("primera linea\nsegunda linea\ntercera linea\ncuarta linea");
        Session::new(
            lines,
            Config::default(),
            IntervalScheduler::new(Duration::from_millis(1)),
            SimulatedView::new(4, 600.0, 30.0, 40.0),
        )
    }

    #[test]
    fn test_handles_events_in_order_then_stops() {
        let (tx, rx) = unbounded();
        let worker = thread::spawn(move || run(session(), rx));

        tx.send(SessionEvent::Fragment {
            text: "segunda linea".into(),
            is_final: true,
        })
        .unwrap();
        tx.send(SessionEvent::Results(vec![RecognitionResult::final_text("cuarta linea")]))
            .unwrap();
        tx.send(SessionEvent::Stop).unwrap();

        let session = worker.join().unwrap();
        assert_eq!(session.view().positions, vec![1, 3]);
        assert!(!session.is_listening());
        assert_eq!(session.current_line_index(), 0);
    }

    #[test]
    fn test_disconnect_ends_loop() {
        let (tx, rx) = unbounded();
        let worker = thread::spawn(move || run(session(), rx));
        tx.send(SessionEvent::Fragment {
            text: "tercera linea".into(),
            is_final: true,
        })
        .unwrap();
        drop(tx);
        let session = worker.join().unwrap();
        assert_eq!(session.view().positions, vec![2]);
    }
}
