//! Bounded command mailbox between producers and the control loop.
//!
//! Producers (network handlers, UI tasks, interrupts) post [`JointCommand`]s
//! through a [`CommandSender`]; the control loop takes them through a
//! [`CommandReceiver`] at the start of each tick. Access is guarded by
//! `critical-section`, so the mailbox can live in a `static`.
//!
//! Every queued command is applied in the same tick, so only the newest
//! command per joint matters for the outcome. When the queue is full, a new
//! command overwrites the newest queued command of the same kind instead of
//! being lost. It is dropped only if no such command is queued.

use core::cell::RefCell;

use critical_section::Mutex;
use heapless::Deque;

#[cfg(feature = "esp32-log")]
use esp_println::println;

use crate::command::JointCommand;

/// How a posted command was accepted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Posted {
    /// Appended to the queue
    Queued,
    /// Queue was full; replaced a queued command of the same kind
    Superseded,
}

/// The queue is full and holds nothing the command could replace.
/// Carries the rejected command back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MailboxFull(pub JointCommand);

/// Fixed-capacity FIFO of joint commands
pub struct CommandMailbox<const SIZE: usize> {
    queue: Mutex<RefCell<Deque<JointCommand, SIZE>>>,
}

impl<const SIZE: usize> CommandMailbox<SIZE> {
    pub const fn new() -> Self {
        Self {
            queue: Mutex::new(RefCell::new(Deque::new())),
        }
    }

    /// Producer handle. Any number may exist at once.
    pub const fn sender(&self) -> CommandSender<'_, SIZE> {
        CommandSender { mailbox: self }
    }

    /// Consumer handle, normally owned by the control loop.
    pub const fn receiver(&self) -> CommandReceiver<'_, SIZE> {
        CommandReceiver { mailbox: self }
    }

    fn post(&self, command: JointCommand) -> Result<Posted, MailboxFull> {
        critical_section::with(|cs| {
            let mut queue = self.queue.borrow(cs).borrow_mut();
            let Err(command) = queue.push_back(command) else {
                return Ok(Posted::Queued);
            };

            match queue
                .iter_mut()
                .rev()
                .find(|queued| command.same_kind(**queued))
            {
                Some(queued) => {
                    *queued = command;
                    Ok(Posted::Superseded)
                }
                None => {
                    #[cfg(feature = "esp32-log")]
                    println!("[CommandMailbox.post] dropped, queue full: {:?}", command);
                    Err(MailboxFull(command))
                }
            }
        })
    }

    fn take(&self) -> Option<JointCommand> {
        critical_section::with(|cs| self.queue.borrow(cs).borrow_mut().pop_front())
    }
}

impl<const SIZE: usize> Default for CommandMailbox<SIZE> {
    fn default() -> Self {
        Self::new()
    }
}

/// Producer side of a [`CommandMailbox`]
#[derive(Clone, Copy)]
pub struct CommandSender<'a, const SIZE: usize> {
    mailbox: &'a CommandMailbox<SIZE>,
}

impl<const SIZE: usize> CommandSender<'_, SIZE> {
    /// Queue a command for the next control tick.
    pub fn post(&self, command: JointCommand) -> Result<Posted, MailboxFull> {
        self.mailbox.post(command)
    }
}

/// Consumer side of a [`CommandMailbox`]
#[derive(Clone, Copy)]
pub struct CommandReceiver<'a, const SIZE: usize> {
    mailbox: &'a CommandMailbox<SIZE>,
}

impl<const SIZE: usize> CommandReceiver<'_, SIZE> {
    /// Take the oldest queued command
    pub fn take(&self) -> Option<JointCommand> {
        self.mailbox.take()
    }
}
