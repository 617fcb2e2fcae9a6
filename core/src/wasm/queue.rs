//! Command queue
//!
//! Collects drawing intents while the module's setup or frame runs, then
//! drains them into outgoing messages in the order they were recorded.

use easel_shared::{Control, DrawCommand, ToHost};

/// Pending drawing intents for one setup call or one frame
#[derive(Debug, Default)]
pub struct CommandQueue {
    commands: Vec<DrawCommand>,
}

impl CommandQueue {
    pub fn push(&mut self, command: DrawCommand) {
        tracing::trace!("queued {}", command.kind());
        self.commands.push(command);
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Drain every pending command, leaving the queue empty
    pub fn take(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Drain into outgoing messages
    ///
    /// Batched framing yields a single `multiple` message; otherwise one
    /// message per command. An empty queue yields nothing.
    pub fn flush(&mut self, batched: bool) -> Vec<ToHost> {
        if self.commands.is_empty() {
            return Vec::new();
        }
        let commands = self.take();
        if batched {
            vec![ToHost::Message(Control::Batch { commands }.into())]
        } else {
            commands
                .into_iter()
                .map(|command| ToHost::Message(command.into()))
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use easel_shared::{Color, ModuleMessage};
    use glam::DVec2;

    fn rect(x: f64) -> DrawCommand {
        DrawCommand::Rect {
            pos: DVec2::new(x, 0.0),
            size: DVec2::ONE,
            color: Color::WHITE,
        }
    }

    #[test]
    fn test_flush_batched_preserves_order() {
        let mut queue = CommandQueue::default();
        queue.push(rect(0.1));
        queue.push(rect(0.2));
        queue.push(rect(0.3));

        let out = queue.flush(true);
        assert!(queue.is_empty());
        assert_eq!(
            out,
            vec![ToHost::Message(ModuleMessage::Control(Control::Batch {
                commands: vec![rect(0.1), rect(0.2), rect(0.3)]
            }))]
        );
    }

    #[test]
    fn test_flush_unbatched_sends_each_command() {
        let mut queue = CommandQueue::default();
        queue.push(rect(0.1));
        queue.push(DrawCommand::Fullscreen { full: true });

        let out = queue.flush(false);
        assert_eq!(
            out,
            vec![
                ToHost::Message(ModuleMessage::Draw(rect(0.1))),
                ToHost::Message(ModuleMessage::Draw(DrawCommand::Fullscreen { full: true })),
            ]
        );
    }

    #[test]
    fn test_flush_empty_queue_sends_nothing() {
        let mut queue = CommandQueue::default();
        assert!(queue.flush(true).is_empty());
        assert!(queue.flush(false).is_empty());
    }

    #[test]
    fn test_flush_resets_between_frames() {
        let mut queue = CommandQueue::default();
        queue.push(rect(0.5));
        assert_eq!(queue.len(), 1);
        let _ = queue.flush(true);
        queue.push(rect(0.6));
        assert_eq!(queue.take(), vec![rect(0.6)]);
    }
}
