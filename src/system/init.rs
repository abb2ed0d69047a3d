//! One-time library bootstrap and program-body handoff.
//!
//! Student programs go through three calls, in order:
//! - [`Runtime::initialize`]: one-time setup of the GUI subsystem and the
//!   graphical console (idempotent; later calls are no-ops)
//! - [`Runtime::run`] / [`Runtime::run_void`]: hand the program body to a
//!   background thread while the calling thread owns the GUI event loop
//! - [`Runtime::shutdown`]: tear down the console session
//!
//! The process-wide flags (initialized, exit-enabled) live on the `Runtime`
//! context and cross thread boundaries only through [`RuntimeHandle`].

use std::panic;
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Receiver;
use std::sync::Arc;
use std::thread;

#[cfg(feature = "console")]
use crate::console::{ConsoleHandle, ConsoleSession};
use crate::error;
use crate::gui::{self, GuiSubsystem};
use crate::settings::{self, Settings};
use crate::system::cli::{self, LaunchContext};

/// Process-lifetime flags shared between the runtime and its handles.
struct RuntimeFlags {
    /// Set once by the first `initialize` call, never reset
    initialized: AtomicBool,
    /// Whether the program may terminate the process directly
    exit_enabled: AtomicBool,
}

/// Process context owned by the program's entry point.
pub struct Runtime {
    flags: Arc<RuntimeFlags>,
    launch: Option<LaunchContext>,
    gui: Option<GuiSubsystem>,
    settings: Settings,
    #[cfg(feature = "console")]
    console: Option<ConsoleSession>,
    #[cfg(not(target_os = "windows"))]
    signal_rx: Option<Receiver<i32>>,
}

impl Runtime {
    pub fn new() -> Self {
        Runtime {
            flags: Arc::new(RuntimeFlags {
                initialized: AtomicBool::new(false),
                exit_enabled: AtomicBool::new(true),
            }),
            launch: None,
            gui: None,
            settings: Settings::default(),
            #[cfg(feature = "console")]
            console: None,
            #[cfg(not(target_os = "windows"))]
            signal_rx: None,
        }
    }

    /// Claim the one-time initialization gate.
    ///
    /// Returns true for exactly one caller; everyone after sees false.
    fn enter_once(&self) -> bool {
        !self.flags.initialized.swap(true, Ordering::SeqCst)
    }

    /// Run the one-time bootstrap sequence.
    ///
    /// Must be called on the thread that will own the GUI event loop.
    /// Subsequent calls after the first are no-ops.
    pub fn initialize(&mut self, args: &[String]) -> Result<(), String> {
        if !self.enter_once() {
            return Ok(());
        }

        gui::mark_main_thread();

        let launch = LaunchContext::from_args(args);
        eprintln!(
            "[INIT] {} starting (built: {})",
            launch.program_name,
            crate::BUILD_DATE
        );

        // Programs launched from inside a macOS bundle expect relative file
        // access to work from the bundle's parent directory
        #[cfg(target_os = "macos")]
        if let Some(arg0) = launch.program_path.as_ref().and_then(|p| p.to_str()) {
            if let Some(dir) = cli::bundle_parent_dir(arg0) {
                if let Err(e) = std::env::set_current_dir(&dir) {
                    eprintln!("[INIT] Failed to change directory to {}: {}", dir.display(), e);
                }
            }
        }

        let console_suppressed = cli::console_suppressed();
        if console_suppressed {
            eprintln!("[INIT] NOCONSOLE is set, graphical console disabled");
        }

        #[cfg(not(target_os = "windows"))]
        {
            self.signal_rx = Some(setup_signal_handlers()?);
        }

        self.settings = settings::load_settings().unwrap_or_else(|e| {
            eprintln!("[INIT] Failed to load settings, using defaults: {}", e);
            Settings::default()
        });

        self.gui = Some(GuiSubsystem::initialize()?);

        #[cfg(feature = "console")]
        if !console_suppressed {
            self.console = Some(ConsoleSession::new(self.settings.console.echo));
            eprintln!("[INIT] Graphical console session ready");
        }

        self.launch = Some(launch);
        Ok(())
    }

    /// Hand the program body to a background thread and own the GUI event
    /// loop until both finish. Returns the body's status code.
    pub fn run<F>(&mut self, program_body: F) -> Result<i32, String>
    where
        F: FnOnce() -> i32 + Send + 'static,
    {
        if !self.flags.initialized.load(Ordering::SeqCst) {
            return Err("run called before initialize".to_string());
        }
        if !gui::is_main_thread() {
            return Err("run must be called from the thread that initialized the library".to_string());
        }

        let done = Arc::new(AtomicBool::new(false));
        let thread_done = Arc::clone(&done);
        let worker = thread::Builder::new()
            .name("program-body".to_string())
            .spawn(move || {
                let outcome = panic::catch_unwind(panic::AssertUnwindSafe(program_body));
                thread_done.store(true, Ordering::SeqCst);
                outcome
            })
            .map_err(|e| format!("Failed to spawn program thread: {}", e))?;

        #[cfg(feature = "console")]
        if let Some(session) = self.console.as_ref() {
            let gui = self
                .gui
                .as_ref()
                .ok_or_else(|| "GUI subsystem not initialized".to_string())?;
            let title = self
                .launch
                .as_ref()
                .map(|l| l.program_name.clone())
                .unwrap_or_else(|| "Console".to_string());

            #[cfg(not(target_os = "windows"))]
            let signal_rx = self.signal_rx.as_ref();
            #[cfg(target_os = "windows")]
            let signal_rx: Option<&Receiver<i32>> = None;

            gui::run_event_loop(gui, session, &title, &self.settings, signal_rx, &done)?;
        }

        match worker.join() {
            Ok(Ok(status)) => Ok(status),
            Ok(Err(payload)) => {
                let message = panic_message(payload.as_ref());
                eprintln!("[RUNTIME] Program body raised a fatal error: {}", message);
                Err(message)
            }
            Err(_) => Err("program thread terminated abnormally".to_string()),
        }
    }

    /// Variant of [`Runtime::run`] for program bodies that return nothing.
    pub fn run_void<F>(&mut self, program_body: F) -> Result<(), String>
    where
        F: FnOnce() + Send + 'static,
    {
        self.run(move || {
            program_body();
            0
        })
        .map(|_| ())
    }

    /// Tear down the graphical console session.
    pub fn shutdown(&mut self) {
        #[cfg(feature = "console")]
        if self.console.take().is_some() {
            eprintln!("[RUNTIME] Console shut down");
        }
    }

    /// A cheap cloneable handle carrying the process-wide flags.
    pub fn handle(&self) -> RuntimeHandle {
        RuntimeHandle {
            flags: Arc::clone(&self.flags),
        }
    }

    /// Student-facing console I/O handle, if the console is active.
    #[cfg(feature = "console")]
    pub fn console(&self) -> Option<ConsoleHandle> {
        self.console.as_ref().map(ConsoleSession::handle)
    }

    /// Display name captured from the invocation arguments.
    pub fn program_name(&self) -> Option<&str> {
        self.launch.as_ref().map(|l| l.program_name.as_str())
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}

/// Cloneable, thread-safe view of the runtime's process-wide flags.
#[derive(Clone)]
pub struct RuntimeHandle {
    flags: Arc<RuntimeFlags>,
}

impl RuntimeHandle {
    pub fn is_initialized(&self) -> bool {
        self.flags.initialized.load(Ordering::SeqCst)
    }

    pub fn exit_enabled(&self) -> bool {
        self.flags.exit_enabled.load(Ordering::SeqCst)
    }

    pub fn set_exit_enabled(&self, enabled: bool) {
        self.flags.exit_enabled.store(enabled, Ordering::SeqCst);
    }

    /// Request process termination with `status`.
    ///
    /// When direct termination has been disabled, this raises a fatal error
    /// instead; the program body is expected to end through normal control
    /// flow.
    pub fn exit(&self, status: i32) -> ! {
        if self.exit_enabled() {
            process::exit(status);
        }
        error::fatal(format!(
            "Program tried to call exit({}) to quit. This function has been disabled; \
             the program body should end through normal control flow.",
            status
        ));
    }
}

/// Register Unix signal handlers that request an orderly console shutdown.
#[cfg(not(target_os = "windows"))]
fn setup_signal_handlers() -> Result<Receiver<i32>, String> {
    use signal_hook::consts::signal::{SIGHUP, SIGINT, SIGTERM};
    use signal_hook::iterator::Signals;

    let mut signals =
        Signals::new([SIGTERM, SIGINT, SIGHUP]).map_err(|e| format!("Failed to register signal handlers: {}", e))?;

    let (signal_tx, signal_rx) = std::sync::mpsc::channel::<i32>();
    thread::spawn(move || {
        for sig in signals.forever() {
            eprintln!("[SIGNAL] Received signal: {}", sig);
            let _ = signal_tx.send(sig);
        }
    });

    Ok(signal_rx)
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = payload.downcast_ref::<&'static str>() {
        (*s).to_string()
    } else {
        "unknown error".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enter_once_admits_exactly_one_caller() {
        let runtime = Runtime::new();
        assert!(runtime.enter_once());
        assert!(!runtime.enter_once());
        assert!(!runtime.enter_once());
    }

    #[test]
    fn test_handle_sees_initialization() {
        let runtime = Runtime::new();
        let handle = runtime.handle();
        assert!(!handle.is_initialized());
        assert!(runtime.enter_once());
        assert!(handle.is_initialized());
    }

    #[test]
    fn test_exit_enabled_by_default() {
        let handle = Runtime::new().handle();
        assert!(handle.exit_enabled());
        handle.set_exit_enabled(false);
        assert!(!handle.exit_enabled());
        handle.set_exit_enabled(true);
        assert!(handle.exit_enabled());
    }

    #[test]
    fn test_handle_clones_share_flags() {
        let runtime = Runtime::new();
        let first = runtime.handle();
        let second = first.clone();
        first.set_exit_enabled(false);
        assert!(!second.exit_enabled());
    }

    #[test]
    fn test_disabled_exit_raises_with_status_code() {
        let handle = Runtime::new().handle();
        handle.set_exit_enabled(false);

        let result = std::panic::catch_unwind(|| {
            handle.exit(2);
        });
        let payload = result.expect_err("exit must not return while disabled");
        let message = payload
            .downcast_ref::<String>()
            .expect("fatal messages are strings");
        assert!(message.contains("exit(2)"), "got: {}", message);
        assert!(message.contains("disabled"), "got: {}", message);
        assert!(message.contains("normal control flow"), "got: {}", message);
    }

    #[test]
    fn test_run_before_initialize_is_an_error() {
        let mut runtime = Runtime::new();
        let result = runtime.run(|| 0);
        assert!(result.is_err());
    }

    #[test]
    fn test_panic_message_formats() {
        assert_eq!(panic_message(&"boom".to_string()), "boom");
        let payload: Box<dyn std::any::Any + Send> = Box::new("static boom");
        assert_eq!(panic_message(payload.as_ref()), "static boom");
        let payload: Box<dyn std::any::Any + Send> = Box::new(17_u8);
        assert_eq!(panic_message(payload.as_ref()), "unknown error");
    }
}
