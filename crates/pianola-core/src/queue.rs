use crate::ipc::Command;
use parking_lot::Mutex;
use rtrb::{Consumer, Producer, RingBuffer};
use std::sync::Arc;

#[derive(thiserror::Error, Debug)]
pub enum QueueError {
    #[error("command queue full")]
    Full,
}

#[derive(Clone)]
pub struct CommandSender {
    producer: Arc<Mutex<Producer<Command>>>,
}

pub struct CommandReceiver {
    consumer: Consumer<Command>,
}

pub fn command_queue(capacity: usize) -> (CommandSender, CommandReceiver) {
    let (producer, consumer) = RingBuffer::new(capacity.max(1));
    (
        CommandSender {
            producer: Arc::new(Mutex::new(producer)),
        },
        CommandReceiver { consumer },
    )
}

impl CommandSender {
    pub fn send(&self, cmd: Command) -> Result<(), QueueError> {
        self.producer.lock().push(cmd).map_err(|_| QueueError::Full)
    }
}

impl CommandReceiver {
    pub fn drain(&mut self) -> Vec<Command> {
        let mut pending = Vec::new();
        while let Ok(cmd) = self.consumer.pop() {
            pending.push(cmd);
        }
        pending
    }
}
