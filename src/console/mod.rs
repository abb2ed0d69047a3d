//! Graphical console replacement for standard input/output.
//!
//! The console is split across threads:
//! - [`ConsoleSession`] is created by the bootstrap and consumed by the GUI
//!   event loop on the designated main thread
//! - [`ConsoleHandle`] is the cloneable I/O handle the program body uses
//!   from its background thread
//! - [`ConsoleBuffer`] holds the transcript and pending input line inside
//!   the event loop
//!
//! Output travels handle -> session over a channel; each `read_line` sends a
//! one-shot reply channel and blocks until the event loop answers it with a
//! submitted line.

mod buffer;
pub mod render;

pub use buffer::ConsoleBuffer;

use std::io::{self, Write};
use std::sync::mpsc::{self, Receiver, Sender};

/// Event-loop side of the console: receivers for program output and read
/// requests. Dropping the session closes the console; handle operations
/// start failing gracefully.
pub struct ConsoleSession {
    pub(crate) output_rx: Receiver<String>,
    pub(crate) request_rx: Receiver<Sender<String>>,
    handle: ConsoleHandle,
}

impl ConsoleSession {
    pub fn new(echo: bool) -> Self {
        let (output_tx, output_rx) = mpsc::channel();
        let (request_tx, request_rx) = mpsc::channel();
        ConsoleSession {
            output_rx,
            request_rx,
            handle: ConsoleHandle {
                output_tx,
                request_tx,
                echo,
            },
        }
    }

    /// A fresh I/O handle for the program body.
    pub fn handle(&self) -> ConsoleHandle {
        self.handle.clone()
    }
}

/// Student-facing console I/O handle. Cheap to clone and safe to move into
/// the program body.
#[derive(Clone)]
pub struct ConsoleHandle {
    output_tx: Sender<String>,
    request_tx: Sender<Sender<String>>,
    echo: bool,
}

impl ConsoleHandle {
    /// Append text to the console transcript.
    ///
    /// When echo is on, the text is mirrored to the real stdout as well.
    /// Writing to a closed console is a silent no-op.
    pub fn write<S: AsRef<str>>(&self, text: S) {
        let text = text.as_ref();
        if self.echo {
            print!("{}", text);
            let _ = io::stdout().flush();
        }
        let _ = self.output_tx.send(text.to_string());
    }

    /// Append text plus a newline to the console transcript.
    pub fn write_line<S: AsRef<str>>(&self, text: S) {
        self.write(format!("{}\n", text.as_ref()));
    }

    /// Block until a line is entered in the console window.
    ///
    /// Fails when the console has been closed or shut down while waiting.
    pub fn read_line(&self) -> Result<String, String> {
        let (reply_tx, reply_rx) = mpsc::channel();
        self.request_tx
            .send(reply_tx)
            .map_err(|_| "console is not available".to_string())?;
        reply_rx
            .recv()
            .map_err(|_| "console closed while waiting for input".to_string())
    }
}
