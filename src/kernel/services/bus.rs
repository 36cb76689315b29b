use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::time::Duration;

use crate::core::event::InputEvent;
use crate::kernel::effect::{Location, LocationKind};

/// Everything that wakes the editor loop.
#[derive(Debug)]
pub enum KernelMessage {
    Input(InputEvent),
    Tick,
    Formatted {
        tick: u64,
        result: Result<String, String>,
    },
    Locations {
        kind: LocationKind,
        result: Result<Vec<Location>, String>,
    },
    Branches {
        root: PathBuf,
        result: Result<Vec<String>, String>,
        current: Option<String>,
    },
    /// A termination signal arrived; the payload is the exit code.
    Terminate(i32),
}

#[derive(Clone)]
pub struct KernelBusSender {
    tx: Sender<KernelMessage>,
}

pub struct KernelBusReceiver {
    rx: Receiver<KernelMessage>,
}

pub fn kernel_bus() -> (KernelBusSender, KernelBusReceiver) {
    let (tx, rx) = mpsc::channel();
    (KernelBusSender { tx }, KernelBusReceiver { rx })
}

impl KernelBusSender {
    pub fn send(&self, msg: KernelMessage) -> Result<(), mpsc::SendError<KernelMessage>> {
        self.tx.send(msg)
    }

    pub fn send_input(&self, event: InputEvent) -> Result<(), mpsc::SendError<KernelMessage>> {
        self.send(KernelMessage::Input(event))
    }
}

impl KernelBusReceiver {
    pub fn recv(&self) -> Option<KernelMessage> {
        self.rx.recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Result<KernelMessage, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }

    pub fn try_recv(&self) -> Result<KernelMessage, TryRecvError> {
        self.rx.try_recv()
    }
}
