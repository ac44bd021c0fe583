use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode},
};
use hostsweep_common::network::target::TargetSpec;
use hostsweep_common::signal::StopSignal;
use hostsweep_common::warn;

const PROMPT: &str = "Enter CIDR notation (e.g., 192.168.1.0/24): ";
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Watches the keyboard on its own thread and raises `stop` on `q` or Ctrl-C.
///
/// Raw mode swallows SIGINT, so Ctrl-C is read as a key here.
pub struct KeyWatcher {
    done: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl KeyWatcher {
    pub fn start(stop: StopSignal) -> Option<Self> {
        if let Err(e) = enable_raw_mode() {
            warn!("Keyboard input unavailable: {e}");
            return None;
        }

        let done = Arc::new(AtomicBool::new(false));
        let thread_done = done.clone();
        let handle = thread::spawn(move || {
            while !thread_done.load(Ordering::Relaxed) && !stop.is_stopped() {
                match event::poll(POLL_INTERVAL) {
                    Ok(true) => {
                        if let Ok(Event::Key(key_event)) = event::read() {
                            let is_q = key_event.code == KeyCode::Char('q');
                            let is_ctrl_c = key_event.code == KeyCode::Char('c')
                                && key_event.modifiers.contains(KeyModifiers::CONTROL);

                            if (is_q || is_ctrl_c) && key_event.kind == KeyEventKind::Press {
                                stop.stop();
                            }
                        }
                    }
                    Ok(false) => {}
                    Err(_) => break,
                }
            }
            let _ = disable_raw_mode();
        });

        Some(Self {
            done,
            handle: Some(handle),
        })
    }
}

impl Drop for KeyWatcher {
    fn drop(&mut self) {
        self.done.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
        let _ = disable_raw_mode();
    }
}

/// Asks for a target expression on stdin.
pub fn prompt_target() -> anyhow::Result<TargetSpec> {
    let mut stdout = io::stdout();
    write!(stdout, "{PROMPT}")?;
    stdout.flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    parse_answer(&line)
}

fn parse_answer(line: &str) -> anyhow::Result<TargetSpec> {
    let answer = line.trim();
    if answer.is_empty() {
        anyhow::bail!("no target given");
    }
    Ok(answer.parse()?)
}
