use super::*;
use std::sync::Mutex;

#[derive(Default)]
struct RecordingTerminal {
    calls: Mutex<Vec<&'static str>>,
    fail_enter: bool,
}

impl TerminalOps for RecordingTerminal {
    fn enter(&self) -> io::Result<()> {
        self.calls.lock().unwrap().push("enter");
        if self.fail_enter {
            return Err(io::Error::new(io::ErrorKind::Other, "no tty"));
        }
        Ok(())
    }

    fn leave(&self) -> io::Result<()> {
        self.calls.lock().unwrap().push("leave");
        Ok(())
    }
}

#[test]
fn test_guard_leaves_on_drop() {
    let ops = Arc::new(RecordingTerminal::default());
    {
        let _guard = TerminalGuard::with_ops(ops.clone()).unwrap();
    }
    assert_eq!(&*ops.calls.lock().unwrap(), &["enter", "leave"]);
}

#[test]
fn test_restorer_runs_once() {
    let ops = Arc::new(RecordingTerminal::default());
    let guard = TerminalGuard::with_ops(ops.clone()).unwrap();
    let restorer = guard.restorer();

    restorer.restore().unwrap();
    restorer.restore().unwrap();
    drop(guard);

    assert_eq!(&*ops.calls.lock().unwrap(), &["enter", "leave"]);
}

#[test]
fn test_failed_enter_is_fatal_and_does_not_leave() {
    let ops = Arc::new(RecordingTerminal {
        fail_enter: true,
        ..Default::default()
    });
    assert!(TerminalGuard::with_ops(ops.clone()).is_err());
    assert_eq!(&*ops.calls.lock().unwrap(), &["enter"]);
}

#[test]
fn test_signal_exit_codes() {
    assert_eq!(TerminationSignal::Interrupt.exit_code(), 130);
    assert_eq!(TerminationSignal::Terminate.exit_code(), 143);
}
